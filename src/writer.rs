//! Dataset persistence
//!
//! One artifact is written per slice. Every artifact carries all three slice
//! keys (only its own populated) plus `num_types`, so readers can treat the
//! files uniformly:
//!
//! ```text
//! { "train": [[Event, ...], ...], "dev": [], "test": [], "num_types": 7 }
//! ```
//!
//! Files are written to a sibling temporary path and renamed into place, so a
//! failed write never leaves a truncated artifact at the target path.

use crate::dataset::DatasetSplitBundle;
use crate::error::PrepError;
use crate::types::{Event, Slice};
use crate::vocabulary::TypeVocabulary;
use crate::{PREP_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// File name of the vocabulary sidecar
pub const VOCABULARY_FILE_STEM: &str = "vocab";

/// Serialization used for artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// Compact JSON
    #[default]
    Json,
    /// Indented JSON
    JsonPretty,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json | ArtifactFormat::JsonPretty => "json",
        }
    }
}

/// Logical schema of one persisted slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetArtifact {
    pub train: Vec<Vec<Event>>,
    pub dev: Vec<Vec<Event>>,
    pub test: Vec<Vec<Event>>,
    pub num_types: usize,
}

impl DatasetArtifact {
    /// Artifact holding only `slice` from `bundle`
    pub fn for_slice(slice: Slice, bundle: &DatasetSplitBundle) -> Self {
        let streams: Vec<Vec<Event>> = bundle
            .slice(slice)
            .iter()
            .map(|stream| stream.events.clone())
            .collect();

        let mut artifact = DatasetArtifact {
            train: Vec::new(),
            dev: Vec::new(),
            test: Vec::new(),
            num_types: bundle.num_types(),
        };
        *artifact.slice_mut(slice) = streams;
        artifact
    }

    pub fn slice(&self, slice: Slice) -> &[Vec<Event>] {
        match slice {
            Slice::Train => &self.train,
            Slice::Dev => &self.dev,
            Slice::Test => &self.test,
        }
    }

    fn slice_mut(&mut self, slice: Slice) -> &mut Vec<Vec<Event>> {
        match slice {
            Slice::Train => &mut self.train,
            Slice::Dev => &mut self.dev,
            Slice::Test => &mut self.test,
        }
    }
}

/// Producer metadata for the vocabulary sidecar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerInfo {
    pub name: String,
    pub version: String,
    pub run_id: String,
}

/// Vocabulary sidecar written next to the slice artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyManifest {
    pub num_types: usize,
    /// Labels in code order (`labels[code]`)
    pub labels: Vec<String>,
    pub producer: ProducerInfo,
    pub generated_at: DateTime<Utc>,
}

impl VocabularyManifest {
    pub fn to_vocabulary(&self) -> TypeVocabulary {
        TypeVocabulary::from_labels(&self.labels)
    }
}

/// Writer for slice artifacts
pub struct DatasetWriter {
    format: ArtifactFormat,
    run_id: String,
}

impl Default for DatasetWriter {
    fn default() -> Self {
        Self::new(ArtifactFormat::default())
    }
}

impl DatasetWriter {
    /// Create a writer with a fresh run id
    pub fn new(format: ArtifactFormat) -> Self {
        Self {
            format,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Default path for a slice artifact inside `dir`
    pub fn artifact_path(&self, dir: &Path, slice: Slice) -> PathBuf {
        dir.join(format!("{}.{}", slice.as_str(), self.format.extension()))
    }

    /// Default path for the vocabulary sidecar inside `dir`
    pub fn vocabulary_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "{}.{}",
            VOCABULARY_FILE_STEM,
            self.format.extension()
        ))
    }

    /// Write one slice of `bundle` to `path`, replacing any existing file
    pub fn write(
        &self,
        slice: Slice,
        bundle: &DatasetSplitBundle,
        path: &Path,
    ) -> Result<(), PrepError> {
        let artifact = DatasetArtifact::for_slice(slice, bundle);
        let bytes = self.encode(&artifact)?;
        write_atomically(path, &bytes)?;

        debug!(
            slice = slice.as_str(),
            customers = artifact.slice(slice).len(),
            path = %path.display(),
            "wrote dataset artifact"
        );
        Ok(())
    }

    /// Write all three slices into `dir` using the default file names
    pub fn write_all(
        &self,
        bundle: &DatasetSplitBundle,
        dir: &Path,
    ) -> Result<Vec<(Slice, PathBuf)>, PrepError> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(Slice::ALL.len());
        for slice in Slice::ALL {
            let path = self.artifact_path(dir, slice);
            self.write(slice, bundle, &path)?;
            written.push((slice, path));
        }
        Ok(written)
    }

    /// Write the vocabulary sidecar to `path`
    pub fn write_vocabulary(
        &self,
        vocabulary: &TypeVocabulary,
        path: &Path,
    ) -> Result<VocabularyManifest, PrepError> {
        let manifest = VocabularyManifest {
            num_types: vocabulary.size(),
            labels: vocabulary.labels().to_vec(),
            producer: ProducerInfo {
                name: PRODUCER_NAME.to_string(),
                version: PREP_VERSION.to_string(),
                run_id: self.run_id.clone(),
            },
            generated_at: Utc::now(),
        };

        let bytes = self.encode(&manifest)?;
        write_atomically(path, &bytes)?;

        debug!(num_types = manifest.num_types, path = %path.display(), "wrote vocabulary");
        Ok(manifest)
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, PrepError> {
        let bytes = match self.format {
            ArtifactFormat::Json => serde_json::to_vec(value)?,
            ArtifactFormat::JsonPretty => serde_json::to_vec_pretty(value)?,
        };
        Ok(bytes)
    }
}

/// Read a slice artifact back
pub fn read_artifact(path: &Path) -> Result<DatasetArtifact, PrepError> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Read a vocabulary sidecar back
pub fn read_vocabulary(path: &Path) -> Result<VocabularyManifest, PrepError> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PrepError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(PrepError::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetAssembler, SplitRatios};
    use crate::types::CustomerStream;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn make_bundle() -> DatasetSplitBundle {
        let streams: Vec<CustomerStream> = (0..10)
            .map(|i| CustomerStream {
                customer_id: format!("C{:04}", i + 1),
                events: vec![
                    Event {
                        type_event: i % 3,
                        loan_amount: 123_456.0 + i as f64,
                        time_since_start: 0.0,
                        time_since_last_event: 0.0,
                    },
                    Event {
                        type_event: 2,
                        loan_amount: 0.1 + 0.2,
                        time_since_start: 1.0 / 3.0,
                        time_since_last_event: 1.0 / 3.0,
                    },
                ],
            })
            .collect();
        DatasetAssembler::assemble(streams, 3, SplitRatios::default()).unwrap()
    }

    #[test]
    fn test_artifact_populates_only_its_slice() {
        let bundle = make_bundle();
        let artifact = DatasetArtifact::for_slice(Slice::Dev, &bundle);

        assert!(artifact.train.is_empty());
        assert_eq!(artifact.dev.len(), 1);
        assert!(artifact.test.is_empty());
        assert_eq!(artifact.num_types, 3);
    }

    #[test]
    fn test_artifact_schema_keys() {
        let bundle = make_bundle();
        let artifact = DatasetArtifact::for_slice(Slice::Train, &bundle);
        let value = serde_json::to_value(&artifact).unwrap();

        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["dev", "num_types", "test", "train"]);
        assert_eq!(value["train"][0][0]["type_event"], 0);
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let dir = tempdir().unwrap();
        let bundle = make_bundle();
        let writer = DatasetWriter::default();

        let written = writer.write_all(&bundle, dir.path()).unwrap();
        assert_eq!(written.len(), 3);

        for (slice, path) in written {
            let artifact = read_artifact(&path).unwrap();
            assert_eq!(artifact, DatasetArtifact::for_slice(slice, &bundle));
            assert_eq!(artifact.num_types, 3);
        }
    }

    #[test]
    fn test_pretty_format_round_trip() {
        let dir = tempdir().unwrap();
        let bundle = make_bundle();
        let writer = DatasetWriter::new(ArtifactFormat::JsonPretty);
        let path = writer.artifact_path(dir.path(), Slice::Test);

        writer.write(Slice::Test, &bundle, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let artifact = read_artifact(&path).unwrap();
        assert_eq!(artifact.test.len(), 2);
    }

    #[test]
    fn test_default_file_names() {
        let writer = DatasetWriter::default();
        let dir = Path::new("out");

        assert_eq!(writer.artifact_path(dir, Slice::Train), dir.join("train.json"));
        assert_eq!(writer.artifact_path(dir, Slice::Dev), dir.join("dev.json"));
        assert_eq!(writer.vocabulary_path(dir), dir.join("vocab.json"));
    }

    #[test]
    fn test_overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let bundle = make_bundle();
        let writer = DatasetWriter::default();
        let path = writer.artifact_path(dir.path(), Slice::Train);

        fs::write(&path, "stale").unwrap();
        writer.write(Slice::Train, &bundle, &path).unwrap();
        writer.write(Slice::Train, &bundle, &path).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(read_artifact(&path).unwrap().train.len(), 7);
    }

    #[test]
    fn test_unwritable_target_is_io_error() {
        let dir = tempdir().unwrap();
        let bundle = make_bundle();
        let writer = DatasetWriter::default();
        let path = dir.path().join("missing").join("train.json");

        let err = writer.write(Slice::Train, &bundle, &path).unwrap_err();

        assert!(matches!(err, PrepError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_vocabulary_sidecar() {
        let dir = tempdir().unwrap();
        let writer = DatasetWriter::default();
        let vocabulary = TypeVocabulary::from_labels(["HL", "TWD", "PL"]);
        let path = writer.vocabulary_path(dir.path());

        writer.write_vocabulary(&vocabulary, &path).unwrap();

        let manifest = read_vocabulary(&path).unwrap();
        assert_eq!(manifest.num_types, 3);
        assert_eq!(manifest.labels, vec!["HL", "TWD", "PL"]);
        assert_eq!(manifest.producer.name, PRODUCER_NAME);
        assert_eq!(manifest.producer.run_id, writer.run_id());
        assert_eq!(manifest.to_vocabulary(), vocabulary);
    }
}
