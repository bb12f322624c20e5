//! OBJ mesh conversion
//!
//! Statements handled: `v`, `vt`, `vn`, `f`, `s`, `usemtl` and, in
//! multiple-objects mode, `o`. Every face becomes a fan-triangulated polygon
//! keyed by `(position, normal, texcoord)`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::formats::{Artifact, encode_mesh};
use crate::mesh::{AssembledMesh, MeshAssembler, NORMAL, POSITION, TEXTURE};
use crate::report::Reporter;
use crate::sink::Sink;

const POSITION_SLOT: usize = 0;
const NORMAL_SLOT: usize = 1;
const TEXTURE_SLOT: usize = 2;
const INPUTS: usize = 3;

/// Material of faces before the first `usemtl`
const DEFAULT_MATERIAL: &str = "off";

/// OBJ conversion options
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjOptions {
    /// `o` statements start a new mesh
    pub multiple_objects: bool,
}

/// Faces of one material, as polylist input
#[derive(Debug, Default)]
struct FaceGroup {
    material: String,
    raw: Vec<i32>,
    vcounts: Vec<u32>,
}

/// One output mesh being collected
#[derive(Debug)]
struct ObjMesh {
    name: String,
    groups: Vec<FaceGroup>,
    unsupported: bool,
}

impl ObjMesh {
    fn new(name: &str, material: &str) -> Self {
        Self {
            name: name.to_string(),
            groups: vec![FaceGroup {
                material: material.to_string(),
                ..Default::default()
            }],
            unsupported: false,
        }
    }

    fn current(&mut self) -> &mut FaceGroup {
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    fn usemtl(&mut self, material: &str) {
        if self.current().vcounts.is_empty() {
            self.groups.pop();
        }
        self.groups.push(FaceGroup {
            material: material.to_string(),
            ..Default::default()
        });
    }

    fn material(&self) -> &str {
        self.groups
            .last()
            .map_or(DEFAULT_MATERIAL, |g| g.material.as_str())
    }

    fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.vcounts.is_empty())
    }
}

/// Parser state shared by all meshes of a file
#[derive(Debug, Default)]
struct ObjParser {
    positions: Vec<f32>,
    texcoords: Vec<f32>,
    normals: Vec<f32>,
    smoothing: i32,
    meshes: Vec<ObjMesh>,
}

fn parse_floats<'a>(
    parts: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec<f32>> {
    parts
        .map(|p| {
            p.parse::<f32>()
                .with_context(|| format!("line {}: invalid number {:?}", line, p))
        })
        .collect()
}

/// Resolve a 1-based (or negative, relative) OBJ index against `len` elements
fn resolve_index(token: &str, len: usize, line: usize) -> Result<i32> {
    let index: i64 = token
        .parse()
        .with_context(|| format!("line {}: invalid index {:?}", line, token))?;
    let resolved = match index {
        0 => bail!("line {}: index 0 is not valid in OBJ", line),
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };
    if resolved < 0 {
        bail!("line {}: relative index {} is before the first element", line, index);
    }
    i32::try_from(resolved).with_context(|| format!("line {}: index {} too large", line, index))
}

impl ObjParser {
    fn mesh(&mut self) -> &mut ObjMesh {
        let last = self.meshes.len() - 1;
        &mut self.meshes[last]
    }

    fn statement(&mut self, statement: &str, line: usize, options: ObjOptions) -> Result<()> {
        let mut parts = statement.split_whitespace();
        let Some(op) = parts.next() else {
            return Ok(());
        };

        match op {
            "v" => {
                let values = parse_floats(parts, line)?;
                if values.len() < 3 {
                    bail!("line {}: vertex needs 3 coordinates", line);
                }
                let w = values.get(3).copied().filter(|&w| w != 0.0).unwrap_or(1.0);
                self.positions.extend(values[..3].iter().map(|c| c / w));
            }
            "vt" => {
                let values = parse_floats(parts, line)?;
                let Some(&u) = values.first() else {
                    bail!("line {}: texture coordinate needs a value", line);
                };
                let v = values.get(1).copied().unwrap_or(0.0);
                self.texcoords.extend([u, v]);
            }
            "vn" => {
                let values = parse_floats(parts, line)?;
                if values.len() < 3 {
                    bail!("line {}: normal needs 3 components", line);
                }
                self.normals.extend_from_slice(&values[..3]);
            }
            "f" => self.face(parts, line)?,
            "s" => {
                let group = parts.next().unwrap_or("off");
                self.smoothing = if group.eq_ignore_ascii_case("off") {
                    0
                } else {
                    group
                        .parse()
                        .with_context(|| format!("line {}: invalid smoothing group", line))?
                };
            }
            "usemtl" => {
                let material = parts.next().unwrap_or(DEFAULT_MATERIAL);
                self.mesh().usemtl(material);
            }
            "o" if options.multiple_objects => {
                let name = parts.next().unwrap_or("object").to_string();
                let material = self.mesh().material().to_string();
                if self.mesh().is_empty() {
                    self.meshes.pop();
                }
                self.meshes.push(ObjMesh::new(&name, &material));
            }
            "p" | "l" => self.mesh().unsupported = true,
            other => tracing::trace!("line {}: ignoring {}", line, other),
        }
        Ok(())
    }

    fn face<'a>(&mut self, corners: impl Iterator<Item = &'a str>, line: usize) -> Result<()> {
        let positions = self.positions.len() / 3;
        let texcoords = self.texcoords.len() / 2;
        let normals = self.normals.len() / 3;
        let smoothing = self.smoothing;

        let mut raw = Vec::new();
        for corner in corners {
            let mut fields = corner.split('/');
            let position = match fields.next() {
                Some(p) if !p.is_empty() => resolve_index(p, positions, line)?,
                _ => bail!("line {}: face corner {:?} has no position", line, corner),
            };
            let texcoord = match fields.next() {
                Some(t) if !t.is_empty() => resolve_index(t, texcoords, line)?,
                _ => -1,
            };
            let normal = match fields.next() {
                Some(n) if !n.is_empty() => resolve_index(n, normals, line)?,
                _ if smoothing > 0 => -smoothing,
                _ => -1,
            };

            let mut key = [0i32; INPUTS];
            key[POSITION_SLOT] = position;
            key[NORMAL_SLOT] = normal;
            key[TEXTURE_SLOT] = texcoord;
            raw.extend_from_slice(&key);
        }

        let group = self.mesh().current();
        group.vcounts.push((raw.len() / INPUTS) as u32);
        group.raw.extend(raw);
        Ok(())
    }

    fn assemble(self, reporter: &dyn Reporter) -> Vec<AssembledMesh> {
        let mut meshes = Vec::new();
        for mesh in &self.meshes {
            if mesh.unsupported {
                reporter.warn(&mesh.name, "point and line primitives are not supported");
            }
            if mesh.is_empty() || self.positions.is_empty() {
                tracing::debug!(mesh = %mesh.name, "no faces, nothing to emit");
                continue;
            }
            match self.assemble_mesh(mesh) {
                Ok(assembled) if assembled.triangle_count() > 0 => meshes.push(assembled),
                Ok(_) => tracing::debug!(mesh = %mesh.name, "no triangles, nothing to emit"),
                Err(e) => reporter.warn(&mesh.name, &e.to_string()),
            }
        }
        meshes
    }

    fn assemble_mesh(&self, mesh: &ObjMesh) -> crate::error::AssemblyResult<AssembledMesh> {
        let mut asm = MeshAssembler::new(mesh.name.clone());
        asm.add_attribute(
            POSITION,
            self.positions.clone(),
            self.positions.len() / 3,
            3,
            POSITION_SLOT,
        )?;
        if !self.normals.is_empty() {
            asm.add_attribute(
                NORMAL,
                self.normals.clone(),
                self.normals.len() / 3,
                3,
                NORMAL_SLOT,
            )?;
        }
        if !self.texcoords.is_empty() {
            asm.add_attribute(
                TEXTURE,
                self.texcoords.clone(),
                self.texcoords.len() / 2,
                2,
                TEXTURE_SLOT,
            )?;
        }
        for group in &mesh.groups {
            asm.add_polylist(&group.material, &group.raw, &group.vcounts, INPUTS)?;
        }
        asm.finish()
    }
}

/// Parse OBJ text into assembled meshes
///
/// `name` names the first mesh; later meshes take their `o` names.
/// Homogeneous positions (`v x y z w`) are divided by `w`, except that
/// `w = 0` leaves the coordinates as written instead of producing infinities.
pub fn parse_obj(
    text: &str,
    name: &str,
    options: ObjOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<AssembledMesh>> {
    let mut parser = ObjParser {
        meshes: vec![ObjMesh::new(name, DEFAULT_MATERIAL)],
        ..Default::default()
    };

    let mut pending = String::new();
    let mut start = 0;
    for (number, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim_end();
        if pending.is_empty() {
            start = number + 1;
        }
        if let Some(continued) = line.strip_suffix('\\') {
            pending.push_str(continued);
            pending.push(' ');
            continue;
        }
        pending.push_str(line);
        parser.statement(&pending, start, options)?;
        pending.clear();
    }
    if !pending.is_empty() {
        parser.statement(&pending, start, options)?;
    }

    Ok(parser.assemble(reporter))
}

fn file_stem(input: &Path) -> &str {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
}

/// Convert an OBJ file to in-memory artifacts
pub fn convert_obj_to_memory(
    input: &Path,
    options: ObjOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<Artifact>> {
    let text =
        fs::read_to_string(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    let meshes = parse_obj(&text, file_stem(input), options, reporter)
        .with_context(|| format!("Failed to parse OBJ: {:?}", input))?;
    Ok(meshes.iter().map(encode_mesh).collect())
}

/// Convert an OBJ file and emit its meshes; returns the number emitted
pub fn convert_obj(
    input: &Path,
    sink: &mut dyn Sink,
    options: ObjOptions,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let artifacts = convert_obj_to_memory(input, options, reporter)?;
    for artifact in &artifacts {
        artifact.emit(sink)?;
    }
    tracing::info!("Converted OBJ {:?}: {} mesh(es)", input, artifacts.len());
    Ok(artifacts.len())
}

#[cfg(test)]
mod tests;
