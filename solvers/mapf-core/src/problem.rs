//! Problem input file parser.
//!
//! ```text
//! <problemId>
//! Grid:
//! <X>,<Y>
//! <row0>            # X rows of Y characters: '.' = free, any other = obstacle
//! ...
//! Agents:
//! <A>
//! <id>,<sx>,<sy>,<gx>,<gy>   # A lines
//! ```

use thiserror::Error;

use crate::grid::Grid;

/// Errors from parsing a problem input file.
#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("missing section header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid problem id: {0}")]
    InvalidProblemId(String),

    #[error("invalid grid dimensions: {0}")]
    InvalidGridDimensions(String),

    #[error("grid row {row} width mismatch: expected {expected}, got {got}")]
    RowWidthMismatch { row: u32, expected: u32, got: u32 },

    #[error("grid has {expected} rows declared but only {got} were present")]
    MissingGridRows { expected: u32, got: u32 },

    #[error("invalid agent count: {0}")]
    InvalidAgentCount(String),

    #[error("malformed agent record on agent line {line}: {reason}")]
    MalformedAgent { line: usize, reason: String },

    #[error("agent {agent} start ({x},{y}) is outside the grid")]
    StartOutOfBounds { agent: u32, x: u32, y: u32 },

    #[error("agent {agent} goal ({x},{y}) is outside the grid")]
    GoalOutOfBounds { agent: u32, x: u32, y: u32 },
}

/// Start/goal cells for a single agent, index `0 <= a < A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    pub start_x: u32,
    pub start_y: u32,
    pub goal_x: u32,
    pub goal_y: u32,
}

/// Reasons a parsed-but-not-yet-planned instance is trivially infeasible,
/// detected without running the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    StartOnObstacle(u32),
    GoalOnObstacle(u32),
}

/// A fully parsed MAPF instance: grid plus per-agent start/goal cells.
#[derive(Debug, Clone)]
pub struct Problem {
    pub id: u32,
    pub grid: Grid,
    pub agents: Vec<Agent>,
}

impl Problem {
    pub fn parse(input: &str) -> Result<Self, ProblemError> {
        let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());

        let id = lines
            .next()
            .ok_or(ProblemError::MissingHeader("problem id"))?
            .parse::<u32>()
            .map_err(|_| ProblemError::InvalidProblemId("not an integer".to_string()))?;

        let grid_header = lines.next().ok_or(ProblemError::MissingHeader("Grid:"))?;
        if !grid_header.eq_ignore_ascii_case("Grid:") {
            return Err(ProblemError::MissingHeader("Grid:"));
        }

        let dims = lines.next().ok_or(ProblemError::MissingHeader("grid dimensions"))?;
        let (x_dim, y_dim) = dims
            .split_once(',')
            .and_then(|(x, y)| Some((x.trim().parse::<u32>().ok()?, y.trim().parse::<u32>().ok()?)))
            .ok_or_else(|| ProblemError::InvalidGridDimensions(dims.to_string()))?;

        let mut rows = Vec::with_capacity(x_dim as usize);
        for row_idx in 0..x_dim {
            let line = lines.next().ok_or(ProblemError::MissingGridRows {
                expected: x_dim,
                got: row_idx,
            })?;
            if line.chars().count() != y_dim as usize {
                return Err(ProblemError::RowWidthMismatch {
                    row: row_idx,
                    expected: y_dim,
                    got: line.chars().count() as u32,
                });
            }
            rows.push(line.chars().map(|c| c == '.').collect::<Vec<bool>>());
        }
        let grid = Grid::new(x_dim, y_dim, &rows);

        let agents_header = lines.next().ok_or(ProblemError::MissingHeader("Agents:"))?;
        if !agents_header.eq_ignore_ascii_case("Agents:") {
            return Err(ProblemError::MissingHeader("Agents:"));
        }

        let num_agents = lines
            .next()
            .ok_or(ProblemError::MissingHeader("agent count"))?
            .parse::<usize>()
            .map_err(|_| ProblemError::InvalidAgentCount("not an integer".to_string()))?;

        let mut agents: Vec<Option<Agent>> = vec![None; num_agents];
        for (line_no, line) in lines.by_ref().take(num_agents).enumerate() {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() != 5 {
                return Err(ProblemError::MalformedAgent {
                    line: line_no + 1,
                    reason: format!("expected 5 comma-separated fields, got {}", parts.len()),
                });
            }
            let field = |idx: usize, name: &str| -> Result<u32, ProblemError> {
                parts[idx].parse().map_err(|_| ProblemError::MalformedAgent {
                    line: line_no + 1,
                    reason: format!("invalid {name}: {}", parts[idx]),
                })
            };
            let id = field(0, "id")? as usize;
            let agent = Agent {
                start_x: field(1, "sx")?,
                start_y: field(2, "sy")?,
                goal_x: field(3, "gx")?,
                goal_y: field(4, "gy")?,
            };
            if id >= num_agents {
                return Err(ProblemError::MalformedAgent {
                    line: line_no + 1,
                    reason: format!("agent id {id} out of range 0..{num_agents}"),
                });
            }
            agents[id] = Some(agent);
        }
        let agents: Vec<Agent> = agents
            .into_iter()
            .enumerate()
            .map(|(id, a)| {
                a.ok_or_else(|| ProblemError::MalformedAgent {
                    line: id,
                    reason: "missing agent record".to_string(),
                })
            })
            .collect::<Result<_, _>>()?;

        let problem = Self { id, grid, agents };
        problem.check_bounds()?;
        Ok(problem)
    }

    fn check_bounds(&self) -> Result<(), ProblemError> {
        for (a, agent) in self.agents.iter().enumerate() {
            if !self.grid.in_bounds(agent.start_x, agent.start_y) {
                return Err(ProblemError::StartOutOfBounds {
                    agent: a as u32,
                    x: agent.start_x,
                    y: agent.start_y,
                });
            }
            if !self.grid.in_bounds(agent.goal_x, agent.goal_y) {
                return Err(ProblemError::GoalOutOfBounds {
                    agent: a as u32,
                    x: agent.goal_x,
                    y: agent.goal_y,
                });
            }
        }
        Ok(())
    }

    /// Detect the trivially-infeasible cases: a start or goal cell sitting
    /// on an obstacle. Connectivity-based infeasibility (an unreachable
    /// goal) is detected later by the reachability oracle via an infinite
    /// `SPL(a)`.
    pub fn check_obstacle_feasibility(&self) -> Result<(), Infeasibility> {
        for (a, agent) in self.agents.iter().enumerate() {
            if self.grid.obstacle(agent.start_x, agent.start_y) {
                return Err(Infeasibility::StartOnObstacle(a as u32));
            }
            if self.grid.obstacle(agent.goal_x, agent.goal_y) {
                return Err(Infeasibility::GoalOnObstacle(a as u32));
            }
        }
        Ok(())
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        "7\nGrid:\n2,2\n..\n..\nAgents:\n2\n0,0,0,1,1\n1,1,1,0,0\n"
    }

    #[test]
    fn parses_minimal_instance() {
        let p = Problem::parse(sample()).expect("should parse");
        assert_eq!(p.id, 7);
        assert_eq!(p.grid.x_dim(), 2);
        assert_eq!(p.grid.y_dim(), 2);
        assert_eq!(p.agents.len(), 2);
        assert_eq!(p.agents[0].start_x, 0);
        assert_eq!(p.agents[0].goal_x, 1);
        assert!(p.check_obstacle_feasibility().is_ok());
    }

    #[test]
    fn rejects_row_width_mismatch() {
        let bad = "1\nGrid:\n2,2\n...\n..\nAgents:\n0\n";
        assert!(matches!(Problem::parse(bad), Err(ProblemError::RowWidthMismatch { .. })));
    }

    #[test]
    fn rejects_agent_on_obstacle() {
        let input = "1\nGrid:\n1,2\n.#\nAgents:\n1\n0,0,0,0,1\n";
        let p = Problem::parse(input).expect("should parse");
        assert_eq!(p.check_obstacle_feasibility(), Err(Infeasibility::GoalOnObstacle(0)));
    }

    #[test]
    fn rejects_out_of_bounds_start() {
        let input = "1\nGrid:\n1,1\n.\nAgents:\n1\n0,5,5,0,0\n";
        assert!(matches!(Problem::parse(input), Err(ProblemError::StartOutOfBounds { .. })));
    }
}
