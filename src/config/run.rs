use crate::error::GradeError;
use crate::reader::GradeParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty JSON array of page results.
    pub json_out: Option<PathBuf>,
    /// CSV table of page results.
    pub csv_out: Option<PathBuf>,
    /// Per-page mask PNG and trace JSON.
    pub debug_dir: Option<PathBuf>,
}

/// Everything a batch run needs besides the command line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Image files or directories of images.
    pub inputs: Vec<PathBuf>,
    pub output: OutputConfig,
    /// JSON map from file name to expected grade.
    pub ground_truth: Option<PathBuf>,
    pub params: GradeParams,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, GradeError> {
    let contents = fs::read_to_string(path).map_err(|e| GradeError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| GradeError::json(path, e))
}

/// Load a run configuration; omitted fields take their defaults.
pub fn load_run_config(path: &Path) -> Result<RunConfig, GradeError> {
    let config: RunConfig = read_json(path)?;
    config.params.validate()?;
    Ok(config)
}

/// Load bare reader parameters.
pub fn load_params(path: &Path) -> Result<GradeParams, GradeError> {
    let params: GradeParams = read_json(path)?;
    params.validate()?;
    Ok(params)
}
