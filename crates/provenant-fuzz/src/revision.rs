//! Source revision lookup from OSS-Fuzz revision maps.

use serde_json::Value;

use crate::blob::{Bucket, read_blob};
use crate::error::FuzzError;
use crate::paths::{FuzzDate, srcmap_key, srcmap_path};

/// The commit of `project` that was fuzzed on `date`.
///
/// Reads `{project}/srcmap/{YYYYMMDD}.json` and returns the `rev` of its
/// `/src/{project}` entry.
pub fn fetch_revision(
    coverage: &dyn Bucket,
    project: &str,
    date: FuzzDate,
) -> Result<String, FuzzError> {
    let path = srcmap_path(project, date);
    let bytes = read_blob(coverage, &path)?;
    let srcmap: Value = serde_json::from_slice(&bytes).map_err(|source| FuzzError::Decode {
        name: path.clone(),
        source,
    })?;
    let key = srcmap_key(project);
    srcmap
        .get(&key)
        .and_then(|entry| entry.get("rev"))
        .and_then(Value::as_str)
        .filter(|rev| !rev.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| FuzzError::NotFound {
            bucket: coverage.name().to_owned(),
            name: format!("{path} {key}.rev"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{BlobStore, LocalBlobStore};

    fn store_with_srcmap(content: &str) -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("oss-fuzz-coverage/oak/srcmap/20230115.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        let store = LocalBlobStore::new(dir.path());
        (dir, store)
    }

    fn date() -> FuzzDate {
        FuzzDate::parse_compact("20230115").unwrap()
    }

    #[test]
    fn finds_project_revision() {
        let (_dir, store) = store_with_srcmap(
            r#"{
                "/src/oak": {"type": "git", "url": "https://github.com/project-oak/oak", "rev": "abc123"},
                "/src/aflplusplus": {"type": "git", "url": "https://github.com/AFLplusplus/AFLplusplus", "rev": "def456"}
            }"#,
        );
        let bucket = store.bucket("oss-fuzz-coverage").unwrap();
        assert_eq!(fetch_revision(bucket.as_ref(), "oak", date()).unwrap(), "abc123");
    }

    #[test]
    fn missing_project_entry_is_not_found() {
        let (_dir, store) = store_with_srcmap(r#"{"/src/other": {"rev": "abc123"}}"#);
        let bucket = store.bucket("oss-fuzz-coverage").unwrap();
        assert!(matches!(
            fetch_revision(bucket.as_ref(), "oak", date()),
            Err(FuzzError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_srcmap_is_not_found() {
        let (_dir, store) = store_with_srcmap("{}");
        let bucket = store.bucket("oss-fuzz-coverage").unwrap();
        let other_day = FuzzDate::parse_compact("20230116").unwrap();
        assert!(matches!(
            fetch_revision(bucket.as_ref(), "oak", other_day),
            Err(FuzzError::NotFound { .. })
        ));
    }
}
