//! Tests for the problem input format and its boundary cases: obstacle
//! starts/goals, an agent already at its goal, and a disconnected grid.

use mapf_core::{Infeasibility, Problem, ProblemError, Reachability, ReachabilityMode};
use pretty_assertions::assert_eq;

const TWO_BY_TWO_SWAP: &str = "7\nGrid:\n2,2\n..\n..\nAgents:\n2\n0,0,0,1,1\n1,1,1,0,0\n";

#[test]
fn parses_two_by_two_swap_instance() {
    let p = Problem::parse(TWO_BY_TWO_SWAP).expect("parse failed");
    assert_eq!(p.id, 7);
    assert_eq!(p.grid.x_dim(), 2);
    assert_eq!(p.grid.y_dim(), 2);
    assert_eq!(p.agents.len(), 2);
    assert_eq!((p.agents[0].start_x, p.agents[0].start_y), (0, 0));
    assert_eq!((p.agents[0].goal_x, p.agents[0].goal_y), (1, 1));
    assert!(p.check_obstacle_feasibility().is_ok());
}

#[test]
fn rejects_missing_grid_header() {
    let bad = "1\n2,2\n..\n..\nAgents:\n0\n";
    assert!(matches!(Problem::parse(bad), Err(ProblemError::MissingHeader(_))));
}

#[test]
fn rejects_truncated_grid_rows() {
    let bad = "1\nGrid:\n2,2\n..\n";
    assert!(matches!(Problem::parse(bad), Err(ProblemError::MissingGridRows { expected: 2, got: 1 })));
}

#[test]
fn rejects_malformed_agent_record() {
    let bad = "1\nGrid:\n1,1\n.\nAgents:\n1\n0,x,0,0,0\n";
    assert!(matches!(Problem::parse(bad), Err(ProblemError::MalformedAgent { .. })));
}

#[test]
fn agent_start_on_obstacle_is_infeasible_at_start() {
    let input = "1\nGrid:\n1,2\n#.\nAgents:\n1\n0,0,0,0,1\n";
    let p = Problem::parse(input).expect("parse failed");
    assert_eq!(p.check_obstacle_feasibility(), Err(Infeasibility::StartOnObstacle(0)));
}

#[test]
fn agent_goal_on_obstacle_is_infeasible_at_start() {
    let input = "1\nGrid:\n1,2\n.#\nAgents:\n1\n0,0,0,0,1\n";
    let p = Problem::parse(input).expect("parse failed");
    assert_eq!(p.check_obstacle_feasibility(), Err(Infeasibility::GoalOnObstacle(0)));
}

#[test]
fn agent_already_at_goal_has_zero_spl() {
    let input = "1\nGrid:\n2,2\n..\n..\nAgents:\n1\n0,1,1,1,1\n";
    let p = Problem::parse(input).expect("parse failed");
    let reach = Reachability::compute(&p, ReachabilityMode::Dijkstra);
    assert_eq!(reach.spl(0), 0);
    assert_eq!(reach.best_possible_cost(), 0);
}

#[test]
fn disconnected_grid_gives_infinite_spl_not_a_parse_error() {
    // A wall with no gap splits the grid; the goal is parseable and
    // in-bounds, but unreachable.
    let input = "1\nGrid:\n3,3\n.#.\n.#.\n.#.\nAgents:\n1\n0,0,0,0,2\n";
    let p = Problem::parse(input).expect("parse failed");
    assert!(p.check_obstacle_feasibility().is_ok());
    let reach = Reachability::compute(&p, ReachabilityMode::Dijkstra);
    assert_eq!(reach.spl(0), mapf_core::INFINITE);
}
