//! Plan decoder: reads a satisfying assignment back into per-time-step
//! agent positions and cell operations, plus the derived per-agent arrival
//! time and total SOC.

use mapf_core::{Op, Problem};

use crate::vars::VarTable;
use crate::wcnf::Model;

/// One agent's decoded trajectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPlan {
    pub agent: usize,
    /// `positions[t] = (x, y)` for `0 <= t <= T`.
    pub positions: Vec<(u32, u32)>,
    /// Time of first (and, by monotonicity, permanent) arrival at the goal.
    pub arrival_time: u32,
}

/// One cell's decoded outgoing operation per time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellShift {
    pub x: u32,
    pub y: u32,
    pub t: u32,
    pub op: Op,
}

/// A fully decoded joint plan.
#[derive(Debug, Clone)]
pub struct Plan {
    pub horizon: u32,
    pub agents: Vec<AgentPlan>,
    pub shifts: Vec<CellShift>,
    pub soc: u64,
}

/// Errors that indicate the model handed to the decoder doesn't actually
/// satisfy the encoding invariants — these should never occur for a model
/// the solver itself reports SAT for.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("agent {agent} has no true `on` variable at time {t}")]
    MissingPosition { agent: usize, t: u32 },
    #[error("agent {agent} has more than one true `on` variable at time {t}")]
    AmbiguousPosition { agent: usize, t: u32 },
    #[error("cell ({x},{y}) has no true `shift` variable at time {t}")]
    MissingShift { x: u32, y: u32, t: u32 },
}

/// Decode `model` into a [`Plan`]. `T` must match the horizon the model's
/// variable table was built with.
pub fn decode(problem: &Problem, vars: &VarTable, model: &Model, horizon: u32) -> Result<Plan, DecodeError> {
    let mut agents = Vec::with_capacity(problem.num_agents());
    let mut total_soc: u64 = 0;

    for a in 0..problem.num_agents() {
        let mut positions = Vec::with_capacity(horizon as usize + 1);
        for t in 0..=horizon {
            let mut found = None;
            for (x, y) in problem.grid.free_cells() {
                if let Some(v) = vars.on(x, y, a, t) {
                    if model.value(v) {
                        if found.is_some() {
                            return Err(DecodeError::AmbiguousPosition { agent: a, t });
                        }
                        found = Some((x, y));
                    }
                }
            }
            positions.push(found.ok_or(DecodeError::MissingPosition { agent: a, t })?);
        }

        // finalState(a,t) is only allocated for t >= SPL(a); skip the
        // unallocated prefix instead of treating it as false.
        let arrival_time = (0..=horizon)
            .filter_map(|t| vars.final_state_if_allocated(a, t).map(|v| (t, v)))
            .find(|&(_, v)| model.value(v))
            .map(|(t, _)| t)
            .unwrap_or(horizon);

        total_soc += arrival_time as u64;
        agents.push(AgentPlan {
            agent: a,
            positions,
            arrival_time,
        });
    }

    let mut shifts = Vec::new();
    for (x, y) in problem.grid.free_cells() {
        for t in 0..horizon {
            let mut found = None;
            for &op in problem.grid.compatible_ops(x, y) {
                if let Some(v) = vars.shift(x, y, op, t) {
                    if model.value(v) {
                        found = Some(op);
                        break;
                    }
                }
            }
            let op = found.ok_or(DecodeError::MissingShift { x, y, t })?;
            shifts.push(CellShift { x, y, t, op });
        }
    }

    Ok(Plan {
        horizon,
        agents,
        shifts,
        soc: total_soc,
    })
}
