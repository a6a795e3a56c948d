//! Makespan→SOC driver: iterative deepening over the time horizon, then a
//! single warm-started re-solve at the SOC-optimal bound.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mapf_core::{Problem, Reachability, INFINITE};
use tracing::{info, warn};

use crate::clauses::EncodeConfig;
use crate::cnf::pos;
use crate::decode::{decode, DecodeError, Plan};
use crate::encode::{encode, EncodeOutcome};
use crate::solver::{MaxSatSolver, SolveOutcome, SolverError};
use crate::wcnf::Wcnf;

/// Threaded through the driver instead of module-level globals for solver
/// handle, timing and signal state.
///
/// `interrupted` is a shared flag rather than a plain `bool` so the hosting
/// CLI's signal handler can flip it *while* the deepening loop is running
/// (a bound can take arbitrarily long to solve) and have the next
/// iteration boundary observe it, instead of only a snapshot taken before
/// `run` was called.
#[derive(Debug, Clone)]
pub struct DriverContext {
    pub interrupted: Arc<AtomicBool>,
}

impl Default for DriverContext {
    fn default() -> Self {
        Self {
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl DriverContext {
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("solver reported an optimum model but it failed to decode into a valid plan")]
    InvalidModel,
}

/// Outcome of the full driver run.
pub enum DriveOutcome {
    /// A makespan-optimal (and, if `soc_optimal` is true, SOC-optimal) plan.
    Plan { plan: Plan, soc_optimal: bool },
    /// The CPU/memory budget or a user interrupt cut the search short
    /// before a provably optimal plan was found.
    Unknown { best_plan: Option<Plan> },
}

/// Run the two-phase search, using `solver` for both phases (the driver
/// does not care whether phase 1 and phase 2 use different algorithms —
/// that distinction lives entirely in how the caller configures/selects
/// the `MaxSatSolver` passed in for each phase).
pub fn run(
    problem: &Problem,
    reach: &Reachability,
    config: &EncodeConfig,
    solver: &mut dyn MaxSatSolver,
    ctx: &DriverContext,
) -> Result<DriveOutcome, DriveError> {
    if (0..problem.num_agents()).any(|a| reach.spl(a) == INFINITE) {
        // Some agent's goal is unreachable from its start at any bound;
        // infeasible at start, not worth iterating.
        return Ok(DriveOutcome::Unknown { best_plan: None });
    }

    let mut horizon = reach.initial_bound();

    loop {
        if ctx.is_interrupted() {
            return Ok(DriveOutcome::Unknown { best_plan: None });
        }

        info!(horizon, "encoding phase 1");
        let instance = match encode(problem, reach, horizon, config) {
            EncodeOutcome::InfeasibleAtBound => {
                horizon += 1;
                continue;
            }
            EncodeOutcome::Instance(instance) => instance,
        };

        let wcnf = Wcnf::from_clauses(instance.clauses, instance.num_soft_clauses);
        match solver.solve(&wcnf, None)? {
            SolveOutcome::Unsatisfiable => {
                horizon += 1;
                continue;
            }
            SolveOutcome::Unknown { best_model } => {
                let best_plan = best_model.and_then(|m| decode(problem, &instance.vars, &m, horizon).ok());
                return Ok(DriveOutcome::Unknown { best_plan });
            }
            SolveOutcome::Optimum { model } => {
                let plan = decode(problem, &instance.vars, &model, horizon).map_err(|_| DriveError::InvalidModel)?;
                let soc = instance.base_cost + model.cost;
                let soc_optimal_horizon = reach
                    .initial_bound()
                    .saturating_add((soc.saturating_sub(reach.best_possible_cost())).saturating_sub(1) as u32);

                if soc_optimal_horizon <= horizon {
                    return Ok(DriveOutcome::Plan { plan, soc_optimal: true });
                }

                info!(horizon = soc_optimal_horizon, "rebuilding at SOC-optimal bound, phase 2");
                let warm_start = warm_start_hint(&instance.vars, &plan, horizon);
                let phase2 = match encode(problem, reach, soc_optimal_horizon, config) {
                    EncodeOutcome::InfeasibleAtBound => {
                        warn!("phase 2 bound was unexpectedly infeasible, returning phase 1 plan");
                        return Ok(DriveOutcome::Plan { plan, soc_optimal: false });
                    }
                    EncodeOutcome::Instance(instance) => instance,
                };
                let wcnf2 = Wcnf::from_clauses(phase2.clauses, phase2.num_soft_clauses);
                match solver.solve(&wcnf2, Some(&warm_start))? {
                    SolveOutcome::Optimum { model } => {
                        let plan2 = decode(problem, &phase2.vars, &model, soc_optimal_horizon).map_err(|_| DriveError::InvalidModel)?;
                        return Ok(DriveOutcome::Plan { plan: plan2, soc_optimal: true });
                    }
                    SolveOutcome::Unknown { best_model } => {
                        let best_plan = best_model
                            .and_then(|m| decode(problem, &phase2.vars, &m, soc_optimal_horizon).ok())
                            .or(Some(plan));
                        return Ok(DriveOutcome::Unknown { best_plan });
                    }
                    SolveOutcome::Unsatisfiable => {
                        warn!("phase 2 bound was unexpectedly unsatisfiable, returning phase 1 plan");
                        return Ok(DriveOutcome::Plan { plan, soc_optimal: false });
                    }
                }
            }
        }
    }
}

/// Build the warm-start hint handed to the solver for phase 2: every
/// position and shift variable true in the phase-1 plan, restricted to
/// variables that still exist at the new (larger) horizon.
fn warm_start_hint(vars: &crate::vars::VarTable, plan: &Plan, old_horizon: u32) -> Vec<crate::cnf::Lit> {
    let mut hint = Vec::new();
    for agent_plan in &plan.agents {
        for (t, &(x, y)) in agent_plan.positions.iter().enumerate() {
            if t as u32 > old_horizon {
                continue;
            }
            if let Some(v) = vars.on(x, y, agent_plan.agent, t as u32) {
                hint.push(pos(v));
            }
        }
    }
    for shift in &plan.shifts {
        if let Some(v) = vars.shift(shift.x, shift.y, shift.op, shift.t) {
            hint.push(pos(v));
        }
    }
    hint
}
