//! A small in-process reference [`MaxSatSolver`] (test/dev only — the
//! driver and decoder need *something* runnable without an external binary
//! to be testable).
//!
//! Not competitive: plain DPLL with unit propagation over the hard clauses,
//! plus a linear search over the falsified-soft-clause bound (each bound
//! re-encoded as an at-most-k over the negated soft literals via the same
//! cardinality adapter the main encoder uses).

use crate::cardinality::CardinalityKind;
use crate::cnf::Lit;
use crate::solver::{MaxSatSolver, SolveOutcome, SolverError};
use crate::wcnf::{Model, Wcnf};

/// In-process DPLL MaxSAT solver for tests and small instances. Does not
/// honor `ResourceLimits` — callers needing real timeouts should use
/// [`crate::solver::ExternalProcessSolver`] instead.
#[derive(Debug, Default)]
pub struct ReferenceSolver {
    amo_kind: CardinalityKind,
}

impl ReferenceSolver {
    pub fn new() -> Self {
        Self {
            amo_kind: CardinalityKind::Totalizer,
        }
    }
}

impl MaxSatSolver for ReferenceSolver {
    fn solve(&mut self, wcnf: &Wcnf, warm_start: Option<&[Lit]>) -> Result<SolveOutcome, SolverError> {
        if sat(&wcnf.hard, wcnf.num_vars, warm_start).is_none() {
            return Ok(SolveOutcome::Unsatisfiable);
        }

        for bound in 0..=wcnf.soft.len() {
            let mut clauses = wcnf.hard.clone();
            let mut next_var = wcnf.num_vars;
            if bound < wcnf.soft.len() {
                // "soft clause `l` is falsified" means `l` is false, i.e.
                // `-l` is true; bound the count of such negations.
                let falsified_lits: Vec<Lit> = wcnf.soft.iter().map(|&l| -l).collect();
                let mut cs = crate::cnf::ClauseSet::new(next_var);
                self.amo_kind.encode_at_most(&mut cs, &falsified_lits, bound);
                next_var = cs.num_vars();
                clauses.extend(cs.hard);
            }
            if let Some(assignment) = sat(&clauses, next_var, warm_start) {
                let model = Model {
                    assignment: assignment[..wcnf.num_vars as usize].to_vec(),
                    cost: bound as u64,
                };
                return Ok(SolveOutcome::Optimum { model });
            }
        }

        Ok(SolveOutcome::Unknown { best_model: None })
    }
}

/// Plain recursive DPLL with unit propagation and pure-literal elimination,
/// seeded by `hint` (tried as decision literals before falling back to
/// first-undecided — this is the "warm start" the driver passes in).
fn sat(clauses: &[Vec<Lit>], num_vars: u32, hint: Option<&[Lit]>) -> Option<Vec<bool>> {
    let mut assignment: Vec<Option<bool>> = vec![None; num_vars as usize];
    let order = decision_order(num_vars, hint);
    dpll(clauses, &mut assignment, &order)
}

fn decision_order(num_vars: u32, hint: Option<&[Lit]>) -> Vec<u32> {
    let mut seen = vec![false; num_vars as usize + 1];
    let mut order = Vec::with_capacity(num_vars as usize);
    if let Some(hint) = hint {
        for &lit in hint {
            let v = lit.unsigned_abs() as u32;
            if v >= 1 && v <= num_vars && !seen[v as usize] {
                seen[v as usize] = true;
                order.push(v);
            }
        }
    }
    for v in 1..=num_vars {
        if !seen[v as usize] {
            order.push(v);
        }
    }
    order
}

fn dpll(clauses: &[Vec<Lit>], assignment: &mut Vec<Option<bool>>, order: &[u32]) -> Option<Vec<bool>> {
    match propagate_units(clauses, assignment) {
        PropagateResult::Conflict => return None,
        PropagateResult::Ok => {}
    }

    let Some(&var) = order.iter().find(|&&v| assignment[(v - 1) as usize].is_none()) else {
        if satisfied(clauses, assignment) {
            return Some(assignment.iter().map(|v| v.unwrap_or(false)).collect());
        }
        return None;
    };

    for &value in &[true, false] {
        let mut trial = assignment.clone();
        trial[(var - 1) as usize] = Some(value);
        if let Some(result) = dpll(clauses, &mut trial, order) {
            return Some(result);
        }
    }
    None
}

enum PropagateResult {
    Ok,
    Conflict,
}

fn propagate_units(clauses: &[Vec<Lit>], assignment: &mut [Option<bool>]) -> PropagateResult {
    loop {
        let mut changed = false;
        for clause in clauses {
            let mut unassigned = None;
            let mut satisfied = false;
            let mut unassigned_count = 0;
            for &lit in clause {
                match lit_value(lit, assignment) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        unassigned_count += 1;
                        unassigned = Some(lit);
                    }
                }
            }
            if satisfied {
                continue;
            }
            if unassigned_count == 0 {
                return PropagateResult::Conflict;
            }
            if unassigned_count == 1 {
                if let Some(lit) = unassigned {
                    let idx = (lit.unsigned_abs() - 1) as usize;
                    assignment[idx] = Some(lit > 0);
                    changed = true;
                }
            }
        }
        if !changed {
            return PropagateResult::Ok;
        }
    }
}

fn satisfied(clauses: &[Vec<Lit>], assignment: &[Option<bool>]) -> bool {
    clauses.iter().all(|clause| clause.iter().any(|&lit| lit_value(lit, assignment) == Some(true)))
}

fn lit_value(lit: Lit, assignment: &[Option<bool>]) -> Option<bool> {
    let idx = (lit.unsigned_abs() - 1) as usize;
    assignment.get(idx).copied().flatten().map(|v| if lit > 0 { v } else { !v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_trivial_satisfiable_instance() {
        let wcnf = Wcnf {
            num_vars: 2,
            hard: vec![vec![1, 2], vec![-1, 2]],
            soft: vec![-2],
            top: 1,
        };
        let mut solver = ReferenceSolver::new();
        match solver.solve(&wcnf, None).unwrap() {
            SolveOutcome::Optimum { model } => {
                assert!(model.value(2));
            }
            other => panic!("expected optimum, got {other:?}"),
        }
    }

    #[test]
    fn reports_unsatisfiable() {
        let wcnf = Wcnf {
            num_vars: 1,
            hard: vec![vec![1], vec![-1]],
            soft: vec![],
            top: 1,
        };
        let mut solver = ReferenceSolver::new();
        assert!(matches!(solver.solve(&wcnf, None).unwrap(), SolveOutcome::Unsatisfiable));
    }
}
