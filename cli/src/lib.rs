use rect4::{NdvDef, Pipeline, Rect4Error, Rect4Params};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Rect4(#[from] Rect4Error),
    #[error("Scene '{0}' is defined more than once")]
    DuplicateScene(String),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One raster to trim
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Scene {
    pub name: String,
    pub input: String,
    /// No-data terms, e.g. `"0"` or `"0 0 0"`
    #[serde(default)]
    pub ndv: Vec<String>,
    /// Valid-range terms, e.g. `"1..255"`; cannot be combined with `ndv`
    #[serde(default)]
    pub valid_range: Vec<String>,
    /// Overrides the job-wide refinement switch
    pub refine: Option<bool>,
}

impl Scene {
    pub fn ndv_def(&self) -> Result<NdvDef, CliError> {
        Ok(NdvDef::from_specs(&self.ndv, &self.valid_range)?)
    }
}

/// Batch of scenes sharing one parameter set
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FootprintJob {
    pub output_dir: String,
    #[serde(default = "default_refine")]
    pub refine: bool,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub params: Rect4Params,
    pub scenes: Vec<Scene>,
}

fn default_refine() -> bool {
    true
}

impl FootprintJob {
    /// Load FootprintJob configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        let job: FootprintJob = toml::from_str(content)?;
        job.validate()
    }

    /// Load FootprintJob configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CliError> {
        let job: FootprintJob = serde_json::from_str(content)?;
        job.validate()
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Scene names become output file names, so they must be unique
    fn validate(self) -> Result<Self, CliError> {
        self.params.validate()?;
        for (i, scene) in self.scenes.iter().enumerate() {
            if self.scenes[..i].iter().any(|s| s.name == scene.name) {
                return Err(CliError::DuplicateScene(scene.name.clone()));
            }
        }
        Ok(self)
    }

    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let content = self.to_json()?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn pipeline_for(&self, scene: &Scene) -> Pipeline {
        Pipeline::builder()
            .with_params(self.params.clone())
            .with_refinement(scene.refine.unwrap_or(self.refine))
            .with_seed(self.seed)
            .build()
    }

    pub fn geojson_path(&self, scene: &Scene) -> PathBuf {
        Path::new(&self.output_dir).join(format!("{}.geojson", scene.name))
    }
}
