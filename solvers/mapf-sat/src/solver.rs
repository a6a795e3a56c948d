//! The MaxSAT solver contract: the solver algorithm itself is treated as
//! an opaque synchronous call, fixed only by this trait.

use std::io::Write as _;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::cnf::Lit;
use crate::wcnf::{Model, Wcnf};

/// Outcome of one `solve` call. `Unknown` covers both a CPU/memory-limit
/// interrupt and a solver crash or parse failure.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Optimum { model: Model },
    Unsatisfiable,
    Unknown { best_model: Option<Model> },
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to launch solver process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to write WCNF to solver stdin: {0}")]
    WriteInput(#[source] std::io::Error),
    #[error("failed to read solver output: {0}")]
    ReadOutput(#[source] std::io::Error),
}

/// The boundary every phase of the driver calls through. Implementations
/// never see the encoding; they only see WCNF text and report a model.
pub trait MaxSatSolver {
    /// Solve `wcnf`, optionally seeded with a partial assignment hint from
    /// a previous phase, expressed as signed literals over the same
    /// variable numbering.
    fn solve(&mut self, wcnf: &Wcnf, warm_start: Option<&[Lit]>) -> Result<SolveOutcome, SolverError>;
}

/// Resource limits threaded from the command surface down to the external
/// process, enforced by the OS rather than this crate.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    pub cpu_seconds: Option<u64>,
    pub memory_megabytes: Option<u64>,
}

/// Invokes an external MaxSAT solver binary as a subprocess, feeding it
/// WCNF on stdin and reading a model off stdout. Spawns, waits with a
/// deadline, and maps a non-zero exit or timeout to a typed outcome rather
/// than panicking.
pub struct ExternalProcessSolver {
    binary: String,
    args: Vec<String>,
    limits: ResourceLimits,
}

impl ExternalProcessSolver {
    pub fn new(binary: impl Into<String>, args: Vec<String>, limits: ResourceLimits) -> Self {
        Self {
            binary: binary.into(),
            args,
            limits,
        }
    }
}

impl MaxSatSolver for ExternalProcessSolver {
    fn solve(&mut self, wcnf: &Wcnf, warm_start: Option<&[Lit]>) -> Result<SolveOutcome, SolverError> {
        let deadline = self.limits.cpu_seconds.map(|s| Instant::now() + Duration::from_secs(s));

        let mut command = Command::new(&self.binary);
        command.args(&self.args).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(mem_mb) = self.limits.memory_megabytes {
            command.env("MAPF_SOLVER_MEMORY_LIMIT_MB", mem_mb.to_string());
        }

        let mut child = command.spawn().map_err(SolverError::Spawn)?;

        {
            let stdin = child.stdin.as_mut().expect("stdin was piped");
            stdin.write_all(wcnf.to_wcnf_string().as_bytes()).map_err(SolverError::WriteInput)?;
            if let Some(hint) = warm_start {
                let mut line = String::from("c warm_start ");
                for lit in hint {
                    line.push_str(&lit.to_string());
                    line.push(' ');
                }
                line.push_str("0\n");
                stdin.write_all(line.as_bytes()).map_err(SolverError::WriteInput)?;
            }
        }

        if let Some(deadline) = deadline {
            loop {
                match child.try_wait() {
                    Ok(Some(_)) => break,
                    Ok(None) => {
                        if Instant::now() >= deadline {
                            warn!(binary = %self.binary, "solver exceeded CPU budget, killing");
                            let _ = child.kill();
                            let _ = child.wait();
                            return Ok(SolveOutcome::Unknown { best_model: None });
                        }
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    Err(e) => return Err(SolverError::ReadOutput(e)),
                }
            }
        }

        let output = child.wait_with_output().map_err(SolverError::ReadOutput)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(bytes = stdout.len(), "solver output received");

        if stdout.lines().any(|l| l.trim() == "s UNSATISFIABLE") {
            return Ok(SolveOutcome::Unsatisfiable);
        }
        if stdout.lines().any(|l| l.trim() == "s UNKNOWN") {
            let best = Model::parse(&stdout, wcnf.num_vars);
            return Ok(SolveOutcome::Unknown { best_model: best });
        }

        match Model::parse(&stdout, wcnf.num_vars) {
            Some(model) => Ok(SolveOutcome::Optimum { model }),
            None => Ok(SolveOutcome::Unknown { best_model: None }),
        }
    }
}
