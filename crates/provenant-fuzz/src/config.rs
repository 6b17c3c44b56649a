//! Fuzz parameters: which project, engine, sanitizer, day and targets to
//! aggregate.
//!
//! Parameters are read from TOML:
//!
//! ```toml
//! project_name = "oak"
//! project_git_repo = "https://github.com/project-oak/oak"
//! fuzz_engine = "libFuzzer"
//! sanitizer = "asan"
//! date = "20230115"
//!
//! [[targets]]
//! name = "apply_policy"
//! path = "oak_functions_service/fuzz/fuzz_targets/apply_policy.rs"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FuzzError;
use crate::paths::FuzzDate;

/// Markers whose presence in a log means the fuzzer found a crash.
pub const DEFAULT_CRASH_MARKERS: &[&str] = &[
    "ERROR: AddressSanitizer",
    "ERROR: MemorySanitizer",
    "ERROR: UndefinedBehaviorSanitizer",
    "ERROR: libFuzzer",
    "deadly signal",
];

/// One fuzz target of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzTarget {
    /// Target name as known to ClusterFuzz.
    pub name: String,
    /// Path of the target's source in the project repository.
    pub path: String,
}

/// Parameters of one fuzz claim aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzParameters {
    /// OSS-Fuzz project name.
    pub project_name: String,
    /// Git repository URL of the project.
    pub project_git_repo: String,
    /// Fuzzing engine, e.g. `libFuzzer`.
    pub fuzz_engine: String,
    /// Sanitizer, e.g. `asan`.
    pub sanitizer: String,
    /// The fuzzing day.
    pub date: FuzzDate,
    /// Targets to aggregate, in claim order.
    pub targets: Vec<FuzzTarget>,
    /// Crash markers; defaults to [`DEFAULT_CRASH_MARKERS`].
    #[serde(default = "default_crash_markers")]
    pub crash_markers: Vec<String>,
}

fn default_crash_markers() -> Vec<String> {
    DEFAULT_CRASH_MARKERS.iter().map(|&m| m.to_owned()).collect()
}

impl FuzzParameters {
    /// Parse parameters from TOML text. `origin` names the source in errors.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, FuzzError> {
        let params: Self = toml::from_str(text).map_err(|e| FuzzError::Config {
            path: origin.to_owned(),
            reason: e.to_string(),
        })?;
        params.check(origin)?;
        Ok(params)
    }

    /// Load parameters from a TOML file.
    pub fn load(path: &Path) -> Result<Self, FuzzError> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| FuzzError::Config {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text, &origin)
    }

    fn check(&self, origin: &str) -> Result<(), FuzzError> {
        let invalid = |reason: &str| FuzzError::Config {
            path: origin.to_owned(),
            reason: reason.to_owned(),
        };
        if self.project_name.is_empty() {
            return Err(invalid("project_name is empty"));
        }
        if self.targets.is_empty() {
            return Err(invalid("no fuzz targets listed"));
        }
        if self.crash_markers.iter().any(String::is_empty) {
            return Err(invalid("crash markers must not be empty"));
        }
        Ok(())
    }
}
