//! Command surface: a `clap` derive CLI.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mapf_sat::{CardinalityKind, EncodingMode, Formulation};

/// Solve a Multi-Agent Path Finding instance optimally via reduction to
/// Partial Weighted MaxSAT.
#[derive(Debug, Parser)]
#[command(name = "mapf-sat", version, about)]
pub struct Cli {
    /// Problem instance file (see the input format in the README).
    pub input_file: PathBuf,

    /// Prefix for the two output plan files:
    /// `<prefix>_makespan_optimal.sol` and `<prefix>_soc_optimal.sol`.
    pub output_prefix: PathBuf,

    /// Phase-1 (makespan search) MaxSAT algorithm. Currently both phases
    /// are served by the same bundled driver; this flag exists for wire
    /// compatibility with the reference command surface.
    #[arg(long, value_enum, default_value = "linear-su")]
    pub phase1_algorithm: AlgorithmArg,

    /// Phase-2 (SOC search) MaxSAT algorithm, see `--phase1-algorithm`.
    #[arg(long, value_enum, default_value = "linear-su")]
    pub phase2_algorithm: AlgorithmArg,

    /// Cardinality-encoding scheme for general at-most-k constraints.
    #[arg(long, value_enum, default_value = "totalizer")]
    pub cardinality_kind: CardinalityKindArg,

    /// Cardinality-encoding scheme specifically for at-most-one constraints
    /// (C6/C8/C9).
    #[arg(long, value_enum, default_value = "totalizer")]
    pub amo_kind: CardinalityKindArg,

    /// Encoding mode: 0 = full (C1-C9), 1 = omit C9, 2 = omit C5.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2), default_value_t = 0)]
    pub encoding_mode: u8,

    /// Problem formulation: 0 = swap conflicts only, 1 = swap + follow.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1), default_value_t = 1)]
    pub formulation: u8,

    /// Path to an external WCNF-speaking MaxSAT solver binary. When unset,
    /// the in-process reference solver is used (correct, not competitive).
    #[arg(long)]
    pub solver_path: Option<PathBuf>,

    /// Extra arguments forwarded verbatim to `--solver-path`.
    #[arg(long, value_delimiter = ' ')]
    pub solver_arg: Vec<String>,

    /// CPU-time budget for the external solver process, in seconds.
    #[arg(long)]
    pub cpu_seconds: Option<u64>,

    /// Memory budget for the external solver process, in megabytes
    /// (advisory only — enforced by the hosting environment, not here).
    #[arg(long)]
    pub memory_mb: Option<u64>,

    /// Increase log verbosity; repeat for more (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn encoding_mode(&self) -> EncodingMode {
        EncodingMode::from_wire(self.encoding_mode).expect("clap range validator enforces 0..=2")
    }

    pub fn formulation(&self) -> Formulation {
        Formulation::from_wire(self.formulation).expect("clap range validator enforces 0..=1")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    LinearSu,
    Msu3,
    PartitionedMsu3,
    Oll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CardinalityKindArg {
    Pairwise,
    Sequential,
    SortingNetwork,
    CardinalityNetwork,
    Bitwise,
    Adder,
    Totalizer,
    ModuloTotalizer,
    KModuloTotalizer,
}

impl From<CardinalityKindArg> for CardinalityKind {
    fn from(value: CardinalityKindArg) -> Self {
        match value {
            CardinalityKindArg::Pairwise => CardinalityKind::Pairwise,
            CardinalityKindArg::Sequential => CardinalityKind::Sequential,
            CardinalityKindArg::SortingNetwork => CardinalityKind::SortingNetwork,
            CardinalityKindArg::CardinalityNetwork => CardinalityKind::CardinalityNetwork,
            CardinalityKindArg::Bitwise => CardinalityKind::Bitwise,
            CardinalityKindArg::Adder => CardinalityKind::Adder,
            CardinalityKindArg::Totalizer => CardinalityKind::Totalizer,
            CardinalityKindArg::ModuloTotalizer => CardinalityKind::ModuloTotalizer,
            CardinalityKindArg::KModuloTotalizer => CardinalityKind::KModuloTotalizer,
        }
    }
}

/// Map `-v` repeat count to a `tracing` filter directive, with a CLI-local
/// default target (`RUST_LOG` still overrides this if set).
pub fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "mapf_sat_cli=info,mapf_sat=info,mapf_core=info",
        1 => "mapf_sat_cli=debug,mapf_sat=debug,mapf_core=info",
        _ => "mapf_sat_cli=trace,mapf_sat=trace,mapf_core=debug",
    }
}
