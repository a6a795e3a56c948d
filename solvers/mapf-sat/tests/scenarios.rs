//! End-to-end scenarios exercising the full encode → solve → decode
//! pipeline with the in-process reference solver.

use mapf_core::{Problem, Reachability, ReachabilityMode};
use mapf_sat::{
    encode, CardinalityKind, DriveOutcome, DriverContext, EncodeConfig, EncodeOutcome, EncodingMode, Formulation,
    MaxSatSolver, ReferenceSolver, SolveOutcome, Wcnf,
};

fn full_amo_config(formulation: Formulation) -> EncodeConfig {
    EncodeConfig {
        encoding_mode: EncodingMode::Full,
        formulation,
        cardinality_kind: CardinalityKind::Totalizer,
        amo_kind: CardinalityKind::Totalizer,
    }
}

#[test]
fn two_by_two_swap_formulation_zero_has_soc_four() {
    let input = "1\nGrid:\n2,2\n..\n..\nAgents:\n2\n0,0,0,1,1\n1,1,1,0,0\n";
    let problem = Problem::parse(input).unwrap();
    let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
    assert_eq!(reach.initial_bound(), 2);

    let config = full_amo_config(Formulation::SwapOnly);
    let mut solver = ReferenceSolver::new();
    let ctx = DriverContext::default();
    match mapf_sat::run(&problem, &reach, &config, &mut solver, &ctx).unwrap() {
        DriveOutcome::Plan { plan, soc_optimal } => {
            assert!(soc_optimal);
            assert_eq!(plan.soc, 4);
            assert_eq!(plan.agents[0].positions[0], (0, 0));
            assert_eq!(plan.agents[0].positions[plan.horizon as usize], (1, 1));
            assert_eq!(plan.agents[1].positions[0], (1, 1));
            assert_eq!(plan.agents[1].positions[plan.horizon as usize], (0, 0));
        }
        DriveOutcome::Unknown { .. } => panic!("expected a plan for the 2x2 swap scenario"),
    }
}

#[test]
fn single_agent_routes_around_obstacle() {
    let input = "1\nGrid:\n3,4\n....\n.##.\n....\nAgents:\n1\n0,0,0,2,3\n";
    let problem = Problem::parse(input).unwrap();
    let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
    assert_eq!(reach.spl(0), 5);
    assert_eq!(reach.initial_bound(), 5);

    let config = full_amo_config(Formulation::SwapAndFollow);
    let mut solver = ReferenceSolver::new();
    let ctx = DriverContext::default();
    match mapf_sat::run(&problem, &reach, &config, &mut solver, &ctx).unwrap() {
        DriveOutcome::Plan { plan, soc_optimal } => {
            assert!(soc_optimal);
            assert_eq!(plan.soc, 5);
            assert_eq!(*plan.agents[0].positions.last().unwrap(), (2, 3));
            // Never routes through the blocked middle row's interior walls.
            assert!(!plan.agents[0].positions.contains(&(1, 1)));
            assert!(!plan.agents[0].positions.contains(&(1, 2)));
        }
        DriveOutcome::Unknown { .. } => panic!("expected a plan for the obstacle-avoidance scenario"),
    }
}

#[test]
fn head_on_corridor_is_unsatisfiable_under_formulation_one() {
    let input = "1\nGrid:\n1,3\n...\nAgents:\n2\n0,0,0,0,2\n1,0,2,0,0\n";
    let problem = Problem::parse(input).unwrap();
    let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);

    let config = full_amo_config(Formulation::SwapAndFollow);
    // Try a handful of bounds; every one should come back UNSAT.
    for horizon in reach.initial_bound()..reach.initial_bound() + 4 {
        let instance = match encode(&problem, &reach, horizon, &config) {
            EncodeOutcome::InfeasibleAtBound => continue,
            EncodeOutcome::Instance(instance) => instance,
        };
        let wcnf = Wcnf::from_clauses(instance.clauses, instance.num_soft_clauses);
        let mut solver = ReferenceSolver::new();
        assert!(matches!(solver.solve(&wcnf, None).unwrap(), SolveOutcome::Unsatisfiable));
    }
}

#[test]
fn four_agent_rotation_agrees_across_formulations() {
    // Four agents occupy every cell of a 2x2 grid and each wants to rotate
    // one step clockwise around the cycle (0,0)->(0,1)->(1,1)->(1,0)->(0,0).
    // There's no single expected verdict here (it may be SAT or UNSAT
    // depending on the exact swap semantics); what's asserted is that the
    // two conflict formulations agree on SAT/UNSAT at any given bound,
    // since neither actually permits a 4-cycle through a fully-occupied
    // grid to complete faster than the other.
    let input = "1\nGrid:\n2,2\n..\n..\nAgents:\n4\n0,0,0,0,1\n1,0,1,1,1\n2,1,1,1,0\n3,1,0,0,0\n";
    let problem = Problem::parse(input).unwrap();
    let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);

    for horizon in reach.initial_bound()..reach.initial_bound() + 4 {
        let verdict_at = |formulation: Formulation| -> bool {
            let config = full_amo_config(formulation);
            match encode(&problem, &reach, horizon, &config) {
                EncodeOutcome::InfeasibleAtBound => false,
                EncodeOutcome::Instance(instance) => {
                    let wcnf = Wcnf::from_clauses(instance.clauses, instance.num_soft_clauses);
                    let mut solver = ReferenceSolver::new();
                    matches!(solver.solve(&wcnf, None).unwrap(), SolveOutcome::Optimum { .. })
                }
            }
        };
        assert_eq!(
            verdict_at(Formulation::SwapOnly),
            verdict_at(Formulation::SwapAndFollow),
            "formulations disagreed on SAT/UNSAT at horizon {horizon}"
        );
    }
}

#[test]
fn corridor_with_side_pocket_requires_deepening_past_initial_bound() {
    // A 3-cell corridor with a single side pocket off one end. Two agents
    // pass head-on; the pocket lets one step aside, but only after the
    // driver deepens past the Manhattan-distance initial bound.
    let input = "1\nGrid:\n2,3\n...\n.##\nAgents:\n2\n0,0,0,0,2\n1,0,2,0,0\n";
    let problem = Problem::parse(input).unwrap();
    let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
    assert_eq!(reach.initial_bound(), 2);

    let config = full_amo_config(Formulation::SwapAndFollow);
    let mut solver = ReferenceSolver::new();
    let ctx = DriverContext::default();
    match mapf_sat::run(&problem, &reach, &config, &mut solver, &ctx).unwrap() {
        DriveOutcome::Plan { plan, soc_optimal } => {
            assert!(soc_optimal);
            assert!(
                plan.horizon > reach.initial_bound(),
                "expected the driver to deepen past the initial bound, got horizon {}",
                plan.horizon
            );
            assert_eq!(plan.agents[0].positions[0], (0, 0));
            assert_eq!(*plan.agents[0].positions.last().unwrap(), (0, 2));
            assert_eq!(plan.agents[1].positions[0], (0, 2));
            assert_eq!(*plan.agents[1].positions.last().unwrap(), (0, 0));
        }
        DriveOutcome::Unknown { .. } => panic!("expected a plan for the corridor-with-pocket scenario"),
    }
}

#[test]
fn agent_already_at_goal_has_zero_soc_and_only_stay_shifts() {
    let input = "1\nGrid:\n2,2\n..\n..\nAgents:\n1\n0,1,1,1,1\n";
    let problem = Problem::parse(input).unwrap();
    let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
    assert_eq!(reach.spl(0), 0);
    assert_eq!(reach.initial_bound(), 1);

    let config = full_amo_config(Formulation::SwapAndFollow);
    let mut solver = ReferenceSolver::new();
    let ctx = DriverContext::default();
    match mapf_sat::run(&problem, &reach, &config, &mut solver, &ctx).unwrap() {
        DriveOutcome::Plan { plan, soc_optimal } => {
            assert!(soc_optimal);
            assert_eq!(plan.soc, 0);
            assert!(plan.agents[0].positions.iter().all(|&p| p == (1, 1)));
        }
        DriveOutcome::Unknown { .. } => panic!("expected a plan for the agent-already-at-goal scenario"),
    }
}
