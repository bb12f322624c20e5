//! Artifact sinks
//!
//! A sink receives every converted artifact exactly once as
//! `(qualified name, header text, data bytes)`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use assembly_common::ARTIFACT_FORMAT;
use hashbrown::{HashMap, HashSet};

/// Destination for encoded artifacts
pub trait Sink {
    /// `name` is qualified by kind (`cube.mesh`)
    fn emit(&mut self, name: &str, header: &str, data: &[u8]) -> Result<()>;
}

/// Writes `N.kind.xml` and `N.kind.dat` into a directory
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<String>,
    names: HashSet<String>,
}

impl DirectorySink {
    /// Create the directory if needed
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        Ok(Self {
            dir,
            written: Vec::new(),
            names: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Qualified names written so far
    pub fn written(&self) -> &[String] {
        &self.written
    }
}

impl Sink for DirectorySink {
    /// Names must be plain file names; anything that would resolve outside
    /// the directory is rejected before a file is created.
    fn emit(&mut self, name: &str, header: &str, data: &[u8]) -> Result<()> {
        ARTIFACT_FORMAT
            .check_name(name)
            .with_context(|| format!("Refusing to write into {:?}", self.dir))?;
        anyhow::ensure!(
            !self.names.contains(name),
            "artifact {} emitted twice into {:?}",
            name,
            self.dir
        );
        let header_path = self.dir.join(ARTIFACT_FORMAT.header_file(name));
        let data_path = self.dir.join(ARTIFACT_FORMAT.data_file(name));
        fs::write(&header_path, header)
            .with_context(|| format!("Failed to write header: {:?}", header_path))?;
        fs::write(&data_path, data)
            .with_context(|| format!("Failed to write data: {:?}", data_path))?;
        tracing::info!("Wrote {} ({} bytes)", name, data.len());
        self.names.insert(name.to_string());
        self.written.push(name.to_string());
        Ok(())
    }
}

/// One artifact held by a [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub header: String,
    pub data: Vec<u8>,
}

/// Keeps artifacts in memory, keyed by qualified name
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: HashMap<String, Emitted>,
    order: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Emitted> {
        self.artifacts.get(name)
    }

    /// Qualified names in emission order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Sink for MemorySink {
    fn emit(&mut self, name: &str, header: &str, data: &[u8]) -> Result<()> {
        anyhow::ensure!(
            !self.artifacts.contains_key(name),
            "artifact {} emitted twice",
            name
        );
        self.artifacts.insert(
            name.to_string(),
            Emitted {
                header: header.to_string(),
                data: data.to_vec(),
            },
        );
        self.order.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_sink_file_names() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut sink = DirectorySink::create(dir.path().join("out")).unwrap();
        sink.emit("cube.mesh", "<Mesh />", &[1, 2, 3]).unwrap();

        let out = dir.path().join("out");
        assert_eq!(
            fs::read_to_string(out.join("cube.mesh.xml")).unwrap(),
            "<Mesh />"
        );
        assert_eq!(fs::read(out.join("cube.mesh.dat")).unwrap(), vec![1, 2, 3]);
        assert_eq!(sink.written(), &["cube.mesh".to_string()]);
    }

    #[test]
    fn test_directory_sink_rejects_duplicates() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut sink = DirectorySink::create(dir.path()).unwrap();
        sink.emit("a.mesh", "", &[]).unwrap();
        assert!(sink.emit("a.mesh", "", &[]).is_err());
        assert_eq!(sink.written(), &["a.mesh".to_string()]);
    }

    #[test]
    fn test_directory_sink_keeps_files_inside_dir() {
        let dir = tempdir().expect("Failed to create temp dir");
        let out = dir.path().join("out");
        let mut sink = DirectorySink::create(&out).unwrap();

        let absolute = dir.path().join("abs").display().to_string();
        for name in ["../escaped.mesh", "nested/inner.mesh", absolute.as_str(), ".."] {
            assert!(sink.emit(name, "<Mesh />", &[]).is_err(), "{:?} accepted", name);
        }
        assert!(!dir.path().join("escaped.mesh.xml").exists());
        assert!(!dir.path().join("abs.xml").exists());
        assert!(sink.written().is_empty());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_memory_sink_rejects_duplicates() {
        let mut sink = MemorySink::new();
        sink.emit("a.skin", "", &[]).unwrap();
        assert!(sink.emit("a.skin", "", &[]).is_err());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.names(), &["a.skin".to_string()]);
    }
}
