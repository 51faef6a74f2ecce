//! JSON configuration files for the reader and the batch CLI.

pub mod run;

pub use run::{load_params, load_run_config, OutputConfig, RunConfig};
