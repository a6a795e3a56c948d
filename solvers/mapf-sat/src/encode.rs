//! Top-level `encode(T)` orchestration: builds a fresh [`VarTable`] and
//! clause set for one bound and packages them with the bookkeeping the
//! driver and decoder need.

use mapf_core::{Problem, Reachability};

use crate::clauses::{self, EncodeConfig, GenerateOutcome};
use crate::cnf::ClauseSet;
use crate::vars::VarTable;

/// Everything produced by one `encode(T)` call: the variable table (kept
/// for decoding) and the clause set (kept for WCNF emission), plus the
/// derived counts used both by the WCNF header and by the driver's SOC
/// bookkeeping.
pub struct EncodedInstance {
    pub vars: VarTable,
    pub clauses: ClauseSet,
    pub horizon: u32,
    pub base_cost: u64,
    pub num_soft_clauses: u64,
}

/// Outcome of `encode`: either a complete instance, or a detected-UNSAT
/// marker at this bound — the driver responds by incrementing `T` without
/// invoking the solver.
pub enum EncodeOutcome {
    Instance(EncodedInstance),
    InfeasibleAtBound,
}

pub fn encode(problem: &Problem, reach: &Reachability, horizon: u32, config: &EncodeConfig) -> EncodeOutcome {
    let vars = VarTable::build(problem, reach, horizon);
    match clauses::generate(problem, reach, &vars, horizon, config) {
        GenerateOutcome::InfeasibleAtBound => EncodeOutcome::InfeasibleAtBound,
        GenerateOutcome::Clauses(clause_set) => {
            let num_soft_clauses = clauses::num_soft_clauses(problem, reach, horizon);
            EncodeOutcome::Instance(EncodedInstance {
                vars,
                clauses: clause_set,
                horizon,
                base_cost: reach.best_possible_cost(),
                num_soft_clauses,
            })
        }
    }
}
