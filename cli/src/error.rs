//! Typed CLI errors and their exit-code mapping.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read input file {path}: {source}")]
    ReadInput { path: PathBuf, source: std::io::Error },

    #[error("failed to write output file {path}: {source}")]
    WriteOutput { path: PathBuf, source: std::io::Error },

    #[error("malformed problem input: {0}")]
    MalformedInput(#[from] mapf_core::ProblemError),

    #[error("instance is infeasible at start: {0}")]
    InfeasibleAtStart(String),

    #[error(transparent)]
    Drive(#[from] mapf_sat::DriveError),

    #[error(transparent)]
    Solver(#[from] mapf_sat::SolverError),
}

impl CliError {
    /// Exit code mirroring the solver's result class: 0 is reserved for
    /// success and is never produced here.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ReadInput { .. } | CliError::MalformedInput(_) | CliError::InfeasibleAtStart(_) => 1,
            CliError::Drive(_) | CliError::Solver(_) => 2,
            CliError::WriteOutput { .. } => 1,
        }
    }
}
