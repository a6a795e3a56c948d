//! Command-line front end for the MAPF-to-MaxSAT pipeline.
//!
//! Orchestration only: parse args, load the problem, run the driver, write
//! the two output plan files, map the result to an exit code. All of the
//! actual modelling lives in `mapf_core`/`mapf_sat`.

mod cli;
mod error;

use std::fs;
use std::io::Write as _;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use mapf_core::{Op, Problem, Reachability, ReachabilityMode};
use mapf_sat::{
    CardinalityKind, DriveOutcome, DriverContext, EncodeConfig, ExternalProcessSolver, MaxSatSolver, Plan,
    ReferenceSolver, ResourceLimits,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use error::CliError;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| cli::verbosity_directive(cli.verbose).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!(%err, "mapf-sat failed");
            err.exit_code()
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let ctx = DriverContext::default();
    {
        let flag = Arc::clone(&ctx.interrupted);
        let _ = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        });
    }

    let text = fs::read_to_string(&cli.input_file).map_err(|source| CliError::ReadInput {
        path: cli.input_file.clone(),
        source,
    })?;
    let problem = Problem::parse(&text)?;
    info!(
        id = problem.id,
        x = problem.grid.x_dim(),
        y = problem.grid.y_dim(),
        agents = problem.num_agents(),
        "parsed problem"
    );

    if let Err(infeasible) = problem.check_obstacle_feasibility() {
        write_trivially_unsat(&cli)?;
        return Err(CliError::InfeasibleAtStart(format!("{infeasible:?}")));
    }

    let reach = Reachability::compute(&problem, ReachabilityMode::Dijkstra);
    info!(
        initial_bound = reach.initial_bound(),
        best_possible_cost = reach.best_possible_cost(),
        "computed reachability"
    );

    let config = EncodeConfig {
        encoding_mode: cli.encoding_mode(),
        formulation: cli.formulation(),
        cardinality_kind: CardinalityKind::from(cli.cardinality_kind),
        amo_kind: CardinalityKind::from(cli.amo_kind),
    };

    let limits = ResourceLimits {
        cpu_seconds: cli.cpu_seconds,
        memory_megabytes: cli.memory_mb,
    };

    let mut solver: Box<dyn MaxSatSolver> = match &cli.solver_path {
        Some(path) => Box::new(ExternalProcessSolver::new(path.to_string_lossy().into_owned(), cli.solver_arg.clone(), limits)),
        None => Box::new(ReferenceSolver::new()),
    };

    let outcome = mapf_sat::run(&problem, &reach, &config, solver.as_mut(), &ctx)?;

    match outcome {
        DriveOutcome::Plan { plan, soc_optimal } => {
            info!(makespan = plan.horizon, soc = plan.soc, soc_optimal, "found optimal plan");
            write_plan(&cli, "_makespan_optimal.sol", &plan)?;
            if soc_optimal {
                write_plan(&cli, "_soc_optimal.sol", &plan)?;
            }
            Ok(0)
        }
        DriveOutcome::Unknown { best_plan } => {
            if let Some(plan) = best_plan {
                write_plan(&cli, "_makespan_optimal.sol", &plan)?;
            }
            info!("search ended UNKNOWN before a provably optimal plan was found");
            Ok(2)
        }
    }
}

/// Render a decoded [`Plan`] as the output plan file format: one
/// `on(a,x,y,t)` line per agent-position and one `shift(x,y,t,a)` line per
/// cell-time issued operation.
fn write_plan(cli: &Cli, suffix: &str, plan: &Plan) -> Result<(), CliError> {
    let mut out = String::new();
    for agent_plan in &plan.agents {
        for (t, &(x, y)) in agent_plan.positions.iter().enumerate() {
            out.push_str(&format!("on({},{},{},{})\n", agent_plan.agent, x, y, t));
        }
    }
    for shift in &plan.shifts {
        out.push_str(&format!("shift({},{},{},{})\n", shift.x, shift.y, shift.t, op_code(shift.op)));
    }

    let path = output_path(cli, suffix);
    let mut file = fs::File::create(&path).map_err(|source| CliError::WriteOutput { path: path.clone(), source })?;
    file.write_all(out.as_bytes()).map_err(|source| CliError::WriteOutput { path, source })
}

/// Write the trivial-UNSAT WCNF marker to both output slots when the
/// instance is detected infeasible before any encoding is attempted.
fn write_trivially_unsat(cli: &Cli) -> Result<(), CliError> {
    let wcnf = mapf_sat::Wcnf::trivially_unsat().to_wcnf_string();
    for suffix in ["_makespan_optimal.sol", "_soc_optimal.sol"] {
        let path = output_path(cli, suffix);
        let mut file = fs::File::create(&path).map_err(|source| CliError::WriteOutput { path: path.clone(), source })?;
        file.write_all(wcnf.as_bytes()).map_err(|source| CliError::WriteOutput { path, source })?;
    }
    Ok(())
}

fn output_path(cli: &Cli, suffix: &str) -> std::path::PathBuf {
    let mut name = cli.output_prefix.as_os_str().to_owned();
    name.push(suffix);
    std::path::PathBuf::from(name)
}

/// Wire constants: `STAY=0, UP=1, DOWN=2, LEFT=3, RIGHT=4`.
fn op_code(op: Op) -> u8 {
    op as u8
}
