use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::design::format::FormatTarget;
use crate::design::snapshot::DesignSnapshot;
use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::render::host::ExportSettings;

/// One export request as stored on disk: the design, the formats to produce and how to encode them.
///
/// ```json
/// {
///   "snapshot": { "content": { "headline": "Hello" } },
///   "targets": [{ "ratio_id": "1:1", "width": 1080, "height": 1080, "label": "Square" }],
///   "export": { "format": "png", "pixel_ratio": 1 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    pub snapshot: DesignSnapshot,
    /// Defaults to [`FormatTarget::standard_catalog`].
    #[serde(default = "FormatTarget::standard_catalog")]
    pub targets: Vec<FormatTarget>,
    #[serde(default)]
    pub export: ExportSettings,
}

impl ExportJob {
    pub fn new(snapshot: DesignSnapshot) -> Self {
        Self {
            snapshot,
            targets: FormatTarget::standard_catalog(),
            export: ExportSettings::default(),
        }
    }

    pub fn from_reader<R: std::io::Read>(r: R) -> FormatizerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FormatizerError::serde(format!("parse export job JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> FormatizerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FormatizerError::validation(format!("open export job '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the snapshot, the export settings and every target.
    ///
    /// Batches validate the same things per target; this reports the first problem up front.
    pub fn validate(&self) -> FormatizerResult<()> {
        self.snapshot.validate()?;
        self.export.validate()?;
        if self.targets.is_empty() {
            return Err(FormatizerError::validation("export job has no targets"));
        }
        for t in &self.targets {
            t.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/job.rs"]
mod tests;
