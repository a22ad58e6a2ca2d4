//! JSON configuration files of the command-line tools.

pub mod fusion;
pub mod realignment;
pub mod statistics;

pub use fusion::{load_config, FusionToolConfig, InputConfig, InputSource, OutputConfig};
