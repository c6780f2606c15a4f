//! Run configuration
//!
//! A run can be configured from a JSON file; every field is optional and
//! falls back to the defaults below (2000 customers, 70/15/15 split, strict
//! age ordering, compact JSON artifacts in the current directory).

use crate::dataset::SplitRatios;
use crate::error::PrepError;
use crate::generator::GeneratorConfig;
use crate::parser::{AgeOrdering, ParserOptions};
use crate::writer::ArtifactFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one generate → convert → split → write run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub generator: GeneratorConfig,
    pub ratios: SplitRatios,
    pub output_dir: PathBuf,
    pub age_ordering: AgeOrdering,
    pub format: ArtifactFormat,
    /// Also write the vocabulary sidecar
    pub write_vocabulary: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            ratios: SplitRatios::default(),
            output_dir: PathBuf::from("."),
            age_ordering: AgeOrdering::default(),
            format: ArtifactFormat::default(),
            write_vocabulary: true,
        }
    }
}

impl RunConfig {
    /// Load config from JSON
    pub fn from_json(json: &str) -> Result<Self, PrepError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, PrepError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        self.generator.validate()?;
        self.ratios.validate()
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            age_ordering: self.age_ordering,
        }
    }
}
