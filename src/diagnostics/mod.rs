//! Report types returned by the fusion pipeline.
//!
//! `FusionReport` bundles the result of every stage plus a `TimingBreakdown`
//! and serialises to JSON for the command-line tools.

pub mod report;
pub mod timing;

pub use report::{AlignmentStage, FusionReport, InputDescriptor};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
