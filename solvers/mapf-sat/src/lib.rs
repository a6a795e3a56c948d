//! SAT/MaxSAT encoding, WCNF I/O, decoder and makespan-to-SOC driver for
//! the MAPF-to-MaxSAT pipeline.
//!
//! Data flow: `Problem -> Reachability -> VarTable -> ClauseSet -> Wcnf ->
//! (external) MaxSatSolver -> Model -> Plan`, with `driver::run` owning the
//! makespan-then-SOC search that repeats the first half of that pipeline
//! once per bound tried.

mod cardinality;
mod clauses;
mod cnf;
mod decode;
mod driver;
mod encode;
mod reference_solver;
mod solver;
mod vars;
mod wcnf;

pub use cardinality::CardinalityKind;
pub use clauses::{EncodeConfig, EncodingMode, Formulation, GenerateOutcome};
pub use cnf::{ClauseSet, Lit};
pub use decode::{decode, AgentPlan, CellShift, DecodeError, Plan};
pub use driver::{run, DriveError, DriveOutcome, DriverContext};
pub use encode::{encode, EncodeOutcome, EncodedInstance};
pub use reference_solver::ReferenceSolver;
pub use solver::{ExternalProcessSolver, MaxSatSolver, ResourceLimits, SolveOutcome, SolverError};
pub use vars::{VarFamily, VarTable};
pub use wcnf::{Model, Wcnf};
