//! Clause generator: C1–C9 plus the soft clauses that realize
//! sum-of-costs minimization, for a fixed time horizon `T`.
//!
//! Each `C*` function below handles one clause family as a separate pass
//! over the same [`VarTable`], rather than one monolithic loop nest.

use mapf_core::{Op, Problem, Reachability, INFINITE};

use crate::cardinality::CardinalityKind;
use crate::cnf::{neg, pos, ClauseSet};
use crate::vars::VarTable;

/// Which of C5/C9 are skipped in this encoding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// Mode 0: emit C1–C9 in full.
    Full,
    /// Mode 1: omit C9 (agent-at-one-cell).
    NoC9,
    /// Mode 2: omit C5 (position existence).
    NoC5,
}

impl EncodingMode {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Full),
            1 => Some(Self::NoC9),
            2 => Some(Self::NoC5),
            _ => None,
        }
    }
}

/// Which conflict rule C7 enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formulation {
    /// F=0: swap (edge) conflicts only.
    SwapOnly,
    /// F=1: swap and follow conflicts.
    SwapAndFollow,
}

impl Formulation {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::SwapOnly),
            1 => Some(Self::SwapAndFollow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EncodeConfig {
    pub encoding_mode: EncodingMode,
    pub formulation: Formulation,
    /// Kind used for the general at-most-k calls this encoding happens to
    /// need (currently none — every cardinality constraint below is an
    /// at-most-one — kept for forward compatibility with the adapter's
    /// general contract).
    pub cardinality_kind: CardinalityKind,
    /// Kind used for every at-most-one in C6/C8/C9.
    pub amo_kind: CardinalityKind,
}

/// Result of one `generate` call.
pub enum GenerateOutcome {
    Clauses(ClauseSet),
    /// A required start or goal `on` variable was pruned away by
    /// reachability at this bound — the bound is infeasible outright.
    InfeasibleAtBound,
}

/// Emit C1–C9 and the soft clauses for bound `horizon`, per `config`.
pub fn generate(
    problem: &Problem,
    reach: &Reachability,
    vars: &VarTable,
    horizon: u32,
    config: &EncodeConfig,
) -> GenerateOutcome {
    let mut cs = ClauseSet::new(vars.num_vars());

    if !c1_c2_start_goal_pinning(problem, vars, horizon, &mut cs) {
        return GenerateOutcome::InfeasibleAtBound;
    }
    c3_final_state_semantics(problem, reach, vars, horizon, &mut cs);
    c4_transition_coupling(problem, vars, horizon, &mut cs);
    if config.encoding_mode != EncodingMode::NoC5 {
        c5_position_existence(problem, vars, horizon, &mut cs);
    }
    c6_exactly_one_shift(problem, vars, horizon, config.amo_kind, &mut cs);
    c7_conflict_avoidance(problem, vars, horizon, config.formulation, &mut cs);
    c8_one_agent_per_cell(problem, vars, horizon, config.amo_kind, &mut cs);
    if config.encoding_mode != EncodingMode::NoC9 {
        c9_agent_at_one_cell(problem, vars, horizon, config.amo_kind, &mut cs);
    }
    soft_clauses(problem, reach, vars, horizon, &mut cs);

    GenerateOutcome::Clauses(cs)
}

/// C1 (start pinning) + C2 (goal pinning + `finalState(a,T)`).
fn c1_c2_start_goal_pinning(problem: &Problem, vars: &VarTable, horizon: u32, cs: &mut ClauseSet) -> bool {
    for (a, agent) in problem.agents.iter().enumerate() {
        let Some(start_var) = vars.on(agent.start_x, agent.start_y, a, 0) else {
            return false;
        };
        cs.add_hard(vec![pos(start_var)]);

        let Some(goal_var) = vars.on(agent.goal_x, agent.goal_y, a, horizon) else {
            return false;
        };
        cs.add_hard(vec![pos(goal_var)]);
        cs.add_hard(vec![pos(vars.final_state(a, horizon))]);
    }
    true
}

/// C3: `finalState` monotonicity and goal-residency coupling.
fn c3_final_state_semantics(problem: &Problem, reach: &Reachability, vars: &VarTable, horizon: u32, cs: &mut ClauseSet) {
    for (a, agent) in problem.agents.iter().enumerate() {
        let spl = reach.spl(a);
        if spl == INFINITE {
            continue;
        }
        for t in spl..horizon {
            let f_t = vars.final_state(a, t);
            let f_t1 = vars.final_state(a, t + 1);
            // finalState(a,t) -> finalState(a,t+1)
            cs.add_hard(vec![neg(f_t), pos(f_t1)]);
            if let Some(on_goal_t) = vars.on(agent.goal_x, agent.goal_y, a, t) {
                // finalState(a,t) -> on(goal(a),a,t)
                cs.add_hard(vec![neg(f_t), pos(on_goal_t)]);
                // on(goal(a),a,t) & finalState(a,t+1) -> finalState(a,t)
                cs.add_hard(vec![neg(on_goal_t), neg(f_t1), pos(f_t)]);
            }
        }
    }
}

/// C4: transition coupling between `on` and `shift`.
fn c4_transition_coupling(problem: &Problem, vars: &VarTable, horizon: u32, cs: &mut ClauseSet) {
    let grid = &problem.grid;
    for (x, y) in grid.free_cells() {
        for &op in grid.compatible_ops(x, y) {
            let Some((tx, ty)) = grid.target(x, y, op) else {
                continue;
            };
            for a in 0..problem.num_agents() {
                for t in 0..horizon {
                    let Some(on_here) = vars.on(x, y, a, t) else {
                        continue;
                    };
                    let Some(shift_var) = vars.shift(x, y, op, t) else {
                        continue;
                    };
                    match vars.on(tx, ty, a, t + 1) {
                        Some(on_there) => {
                            cs.add_hard(vec![neg(on_here), neg(shift_var), pos(on_there)]);
                            cs.add_hard(vec![neg(on_here), neg(on_there), pos(shift_var)]);
                        }
                        None => {
                            cs.add_hard(vec![neg(on_here), neg(shift_var)]);
                        }
                    }
                }
            }
        }
    }
}

/// C5: every allocated `on(x,y,a,t)` has at least one successor and one
/// predecessor `on` (skipped in encoding mode 2).
fn c5_position_existence(problem: &Problem, vars: &VarTable, horizon: u32, cs: &mut ClauseSet) {
    let grid = &problem.grid;
    for (x, y) in grid.free_cells() {
        for a in 0..problem.num_agents() {
            for t in 0..=horizon {
                let Some(here) = vars.on(x, y, a, t) else {
                    continue;
                };
                if t < horizon {
                    let mut clause = vec![neg(here)];
                    for &op in grid.compatible_ops(x, y) {
                        if let Some((tx, ty)) = grid.target(x, y, op) {
                            if let Some(there) = vars.on(tx, ty, a, t + 1) {
                                clause.push(pos(there));
                            }
                        }
                    }
                    if clause.len() > 1 {
                        cs.add_hard(clause);
                    }
                }
                if t > 0 {
                    let mut clause = vec![neg(here)];
                    for op in Op::ALL {
                        if let Some((px, py)) = grid.target(x, y, op.opposite()) {
                            if grid.obstacle(px, py) {
                                continue;
                            }
                            if let Some(prev) = vars.on(px, py, a, t - 1) {
                                clause.push(pos(prev));
                            }
                        }
                    }
                    if clause.len() > 1 {
                        cs.add_hard(clause);
                    }
                }
            }
        }
    }
}

/// C6: every non-obstacle cell performs exactly one operation per time step.
fn c6_exactly_one_shift(problem: &Problem, vars: &VarTable, horizon: u32, amo_kind: CardinalityKind, cs: &mut ClauseSet) {
    let grid = &problem.grid;
    for (x, y) in grid.free_cells() {
        for t in 0..horizon {
            let lits: Vec<i32> = grid
                .compatible_ops(x, y)
                .iter()
                .filter_map(|&op| vars.shift(x, y, op, t))
                .map(pos)
                .collect();
            if lits.is_empty() {
                continue;
            }
            cs.add_hard(lits.clone());
            amo_kind.encode_at_most_one(cs, &lits);
        }
    }
}

/// C7: conflict avoidance, either swap-only (F=0) or swap+follow (F=1).
fn c7_conflict_avoidance(problem: &Problem, vars: &VarTable, horizon: u32, formulation: Formulation, cs: &mut ClauseSet) {
    let grid = &problem.grid;
    for (x, y) in grid.free_cells() {
        for &op in grid.compatible_ops(x, y) {
            if op == Op::Stay {
                continue;
            }
            let Some((tx, ty)) = grid.target(x, y, op) else {
                continue;
            };
            for t in 0..horizon {
                let Some(shift_here) = vars.shift(x, y, op, t) else {
                    continue;
                };
                let target_op = match formulation {
                    Formulation::SwapOnly => op.opposite(),
                    Formulation::SwapAndFollow => Op::Stay,
                };
                if let Some(shift_target) = vars.shift(tx, ty, target_op, t) {
                    cs.add_hard(vec![neg(shift_here), pos(shift_target)]);
                }
            }
        }
    }
}

/// C8: at most one agent per non-obstacle cell per time step.
fn c8_one_agent_per_cell(problem: &Problem, vars: &VarTable, horizon: u32, amo_kind: CardinalityKind, cs: &mut ClauseSet) {
    let grid = &problem.grid;
    for (x, y) in grid.free_cells() {
        for t in 0..=horizon {
            let lits: Vec<i32> = (0..problem.num_agents()).filter_map(|a| vars.on(x, y, a, t)).map(pos).collect();
            if lits.len() < 2 {
                continue;
            }
            amo_kind.encode_at_most_one(cs, &lits);
        }
    }
}

/// C9: each agent occupies exactly one cell per time step (skipped in
/// encoding mode 1).
fn c9_agent_at_one_cell(problem: &Problem, vars: &VarTable, horizon: u32, amo_kind: CardinalityKind, cs: &mut ClauseSet) {
    let grid = &problem.grid;
    for a in 0..problem.num_agents() {
        for t in 1..=horizon {
            let lits: Vec<i32> = grid.free_cells().filter_map(|(x, y)| vars.on(x, y, a, t)).map(pos).collect();
            if lits.is_empty() {
                continue;
            }
            cs.add_hard(lits.clone());
            amo_kind.encode_at_most_one(cs, &lits);
        }
    }
}

/// Soft clauses realizing sum-of-costs minimization: one unit soft clause
/// `finalState(a,t)` per agent per time step after its shortest path length.
fn soft_clauses(problem: &Problem, reach: &Reachability, vars: &VarTable, horizon: u32, cs: &mut ClauseSet) {
    for a in 0..problem.num_agents() {
        let spl = reach.spl(a);
        if spl == INFINITE {
            continue;
        }
        for t in spl..horizon {
            cs.add_soft_unit(pos(vars.final_state(a, t)));
        }
    }
}

/// `numSoftClauses = Σ_a max(0, T − SPL(a))`.
pub fn num_soft_clauses(problem: &Problem, reach: &Reachability, horizon: u32) -> u64 {
    (0..problem.num_agents())
        .map(|a| {
            let spl = reach.spl(a);
            if spl == INFINITE || spl >= horizon {
                0
            } else {
                (horizon - spl) as u64
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapf_core::ReachabilityMode;

    fn config(encoding_mode: EncodingMode, formulation: Formulation) -> EncodeConfig {
        EncodeConfig {
            encoding_mode,
            formulation,
            cardinality_kind: CardinalityKind::Pairwise,
            amo_kind: CardinalityKind::Pairwise,
        }
    }

    #[test]
    fn two_agent_swap_on_2x2_is_generated_without_infeasibility() {
        let input = "1\nGrid:\n2,2\n..\n..\nAgents:\n2\n0,0,0,1,1\n1,1,1,0,0\n";
        let problem = Problem::parse(input).unwrap();
        let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
        let horizon = reach.initial_bound();
        let vars = VarTable::build(&problem, &reach, horizon);
        let outcome = generate(&problem, &reach, &vars, horizon, &config(EncodingMode::Full, Formulation::SwapOnly));
        assert!(matches!(outcome, GenerateOutcome::Clauses(_)));
    }

    #[test]
    fn num_soft_clauses_matches_formula() {
        let input = "1\nGrid:\n1,3\n...\nAgents:\n1\n0,0,0,0,2\n";
        let problem = Problem::parse(input).unwrap();
        let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
        assert_eq!(num_soft_clauses(&problem, &reach, 4), 2);
        assert_eq!(num_soft_clauses(&problem, &reach, 2), 0);
    }

    #[test]
    fn agent_already_at_goal_has_no_soft_clauses() {
        let input = "1\nGrid:\n2,2\n..\n..\nAgents:\n1\n0,1,1,1,1\n";
        let problem = Problem::parse(input).unwrap();
        let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
        assert_eq!(reach.spl(0), 0);
        let vars = VarTable::build(&problem, &reach, 1);
        let outcome = generate(&problem, &reach, &vars, 1, &config(EncodingMode::Full, Formulation::SwapAndFollow));
        match outcome {
            GenerateOutcome::Clauses(cs) => assert!(cs.soft.is_empty()),
            GenerateOutcome::InfeasibleAtBound => panic!("expected feasible encoding"),
        }
    }
}
