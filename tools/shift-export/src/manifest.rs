//! Manifest parsing and build orchestration
//!
//! Parses `shift.toml` and converts every listed source into one output
//! directory.
//!
//! ```toml
//! [output]
//! dir = "out/"
//!
//! [options]
//! multiple_objects = false
//! skins = true
//! morphs = true
//!
//! [sources]
//! crate = "models/crate.obj"
//! hero = { path = "models/hero.dae" }
//! props = { path = "models/props.obj", multiple_objects = true }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::collada::{self, DaeOptions};
use crate::formats::{Artifact, encode_mesh};
use crate::obj::{self, ObjOptions};
use crate::report::Reporter;
use crate::sink::{DirectorySink, Sink};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub options: BuildOptions,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out/")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct BuildOptions {
    /// OBJ `o` statements start new meshes
    #[serde(default)]
    pub multiple_objects: bool,
    /// Convert COLLADA morph controllers
    #[serde(default = "default_true")]
    pub morphs: bool,
    /// Convert COLLADA skin controllers
    #[serde(default = "default_true")]
    pub skins: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            multiple_objects: false,
            morphs: true,
            skins: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        multiple_objects: Option<bool>,
    },
}

impl SourceEntry {
    pub fn path(&self) -> &Path {
        match self {
            SourceEntry::Simple(p) => p,
            SourceEntry::Detailed { path, .. } => path,
        }
    }

    pub fn multiple_objects(&self) -> Option<bool> {
        match self {
            SourceEntry::Simple(_) => None,
            SourceEntry::Detailed {
                multiple_objects, ..
            } => *multiple_objects,
        }
    }
}

/// Input format of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Obj,
    Collada,
}

impl SourceFormat {
    /// Detect by extension (`.obj`, `.dae`), case-insensitive
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "obj" => Some(SourceFormat::Obj),
            "dae" => Some(SourceFormat::Collada),
            _ => None,
        }
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    for (name, entry) in &manifest.sources {
        if !entry.path().exists() {
            bail!("Source '{}' not found: {:?}", name, entry.path());
        }
        if SourceFormat::detect(entry.path()).is_none() {
            bail!(
                "Unsupported source format for '{}': {:?} (use .obj or .dae)",
                name,
                entry.path()
            );
        }
    }
    Ok(())
}

/// Build all sources from a manifest; returns the number of artifacts written
pub fn build_all(
    manifest: &Manifest,
    output_override: Option<&Path>,
    reporter: &dyn Reporter,
) -> Result<usize> {
    validate(manifest)?;

    let output_dir = output_override.unwrap_or(&manifest.output.dir);
    let mut sink = DirectorySink::create(output_dir)?;
    build_into(manifest, &mut sink, reporter)
}

/// Build all sources into any sink
pub fn build_into(manifest: &Manifest, sink: &mut dyn Sink, reporter: &dyn Reporter) -> Result<usize> {
    let mut written = 0;
    for (name, entry) in &manifest.sources {
        tracing::info!("Converting source: {} ({:?})", name, entry.path());
        let artifacts: Vec<Artifact> = match SourceFormat::detect(entry.path()) {
            Some(SourceFormat::Obj) => {
                let options = ObjOptions {
                    multiple_objects: entry
                        .multiple_objects()
                        .unwrap_or(manifest.options.multiple_objects),
                };
                let text = std::fs::read_to_string(entry.path())
                    .with_context(|| format!("Failed to open OBJ: {:?}", entry.path()))?;
                obj::parse_obj(&text, name, options, reporter)
                    .with_context(|| format!("Failed to convert '{}'", name))?
                    .iter()
                    .map(encode_mesh)
                    .collect()
            }
            Some(SourceFormat::Collada) => {
                let options = DaeOptions {
                    skins: manifest.options.skins,
                    morphs: manifest.options.morphs,
                };
                collada::convert_collada_to_memory(entry.path(), options, reporter)
                    .with_context(|| format!("Failed to convert '{}'", name))?
            }
            None => bail!("Unsupported source format for '{}': {:?}", name, entry.path()),
        };

        for artifact in &artifacts {
            artifact.emit(sink)?;
        }
        written += artifacts.len();
    }
    Ok(written)
}
