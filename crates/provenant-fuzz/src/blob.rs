//! Blob store capability consumed by the aggregator.
//!
//! The aggregator only needs to list objects under a prefix and read an
//! object's bytes. [`LocalBlobStore`] serves a directory tree laid out as
//! `{root}/{bucket}/{object}`, e.g. a `gsutil rsync` mirror.

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::FuzzError;

/// A store of named buckets.
pub trait BlobStore {
    /// Open a handle on the bucket `name`.
    fn bucket(&self, name: &str) -> Result<Box<dyn Bucket + '_>, FuzzError>;
}

/// A handle on one bucket.
pub trait Bucket {
    /// The bucket name.
    fn name(&self) -> &str;

    /// Object names starting with `prefix`. Order is unspecified; may be empty.
    fn list(&self, prefix: &str) -> Result<Vec<String>, FuzzError>;

    /// Open a reader on `object`. The reader is closed when dropped.
    fn reader(&self, object: &str) -> Result<Box<dyn Read + '_>, FuzzError>;
}

/// Read a whole object. The reader is released on every exit path.
pub fn read_blob(bucket: &dyn Bucket, object: &str) -> Result<Vec<u8>, FuzzError> {
    let mut reader = bucket.reader(object)?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| FuzzError::Blob {
            bucket: bucket.name().to_owned(),
            name: object.to_owned(),
            source,
        })?;
    Ok(bytes)
}

/// A blob store backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Serve buckets from subdirectories of `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for LocalBlobStore {
    fn bucket(&self, name: &str) -> Result<Box<dyn Bucket + '_>, FuzzError> {
        Ok(Box::new(LocalBucket {
            name: name.to_owned(),
            dir: self.root.join(name),
        }))
    }
}

struct LocalBucket {
    name: String,
    dir: PathBuf,
}

impl LocalBucket {
    fn io_error(&self, object: &str, source: std::io::Error) -> FuzzError {
        if source.kind() == std::io::ErrorKind::NotFound {
            FuzzError::NotFound {
                bucket: self.name.clone(),
                name: object.to_owned(),
            }
        } else {
            FuzzError::Blob {
                bucket: self.name.clone(),
                name: object.to_owned(),
                source,
            }
        }
    }

    /// Resolve `object` under the bucket directory. Only plain relative
    /// names are accepted, so no object resolves outside the bucket.
    fn object_path(&self, object: &str) -> Result<PathBuf, FuzzError> {
        let relative = Path::new(object);
        let plain = !object.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(FuzzError::InvalidObjectName {
                bucket: self.name.clone(),
                name: object.to_owned(),
            });
        }
        Ok(self.dir.join(relative))
    }
}

impl Bucket for LocalBucket {
    fn name(&self) -> &str {
        &self.name
    }

    /// Lists in lexical order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, FuzzError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.dir).follow_links(false) {
            let entry = entry.map_err(|e| self.io_error(prefix, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.dir) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if name.starts_with(prefix) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn reader(&self, object: &str) -> Result<Box<dyn Read + '_>, FuzzError> {
        let path = self.object_path(object)?;
        let file = std::fs::File::open(path).map_err(|e| self.io_error(object, e))?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }
}
