//! OBJ mesh import

use super::types::ImportedMesh;
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read an OBJ file, expanding every face corner into its own vertex
pub fn import_obj(input: &Path) -> Result<ImportedMesh> {
    let file = File::open(input).with_context(|| format!("Failed to open OBJ: {:?}", input))?;
    parse_obj(BufReader::new(file)).with_context(|| format!("Failed to parse OBJ: {:?}", input))
}

/// Parse OBJ text from any reader
pub fn parse_obj(reader: impl BufRead) -> Result<ImportedMesh> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals_raw: Vec<[f32; 3]> = Vec::new();

    // Final vertex data (expanded from faces)
    let mut final_positions: Vec<[f32; 3]> = Vec::new();
    let mut final_uvs: Vec<[f32; 2]> = Vec::new();
    let mut final_normals: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" if parts.len() >= 4 => positions.push(parse_floats(&parts[1..4], line_no)?),
            "vt" if parts.len() >= 3 => tex_coords.push(parse_floats(&parts[1..3], line_no)?),
            "vn" if parts.len() >= 4 => normals_raw.push(parse_floats(&parts[1..4], line_no)?),
            "f" if parts.len() >= 4 => {
                let face_verts: Vec<(usize, Option<usize>, Option<usize>)> = parts[1..]
                    .iter()
                    .map(|v| {
                        parse_obj_vertex(v).with_context(|| {
                            format!("Invalid face vertex {:?} on line {}", v, line_no + 1)
                        })
                    })
                    .collect::<Result<_>>()?;

                // Fan triangulation for convex polygons
                for i in 1..face_verts.len() - 1 {
                    for &corner in &[0, i, i + 1] {
                        let (vi, vti, vni) = face_verts[corner];

                        indices.push(final_positions.len() as u32);
                        final_positions.push(*positions.get(vi).with_context(|| {
                            format!("Vertex index {} out of range on line {}", vi + 1, line_no + 1)
                        })?);

                        if let Some(ti) = vti {
                            final_uvs.push(*tex_coords.get(ti).with_context(|| {
                                format!(
                                    "Texture coordinate index {} out of range on line {}",
                                    ti + 1,
                                    line_no + 1
                                )
                            })?);
                        }
                        if let Some(ni) = vni {
                            final_normals.push(*normals_raw.get(ni).with_context(|| {
                                format!("Normal index {} out of range on line {}", ni + 1, line_no + 1)
                            })?);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if final_positions.is_empty() {
        bail!("No faces found in OBJ file");
    }

    // Attributes only count when every corner has one
    let has_uvs = final_uvs.len() == final_positions.len();
    let has_normals = final_normals.len() == final_positions.len();

    Ok(ImportedMesh {
        positions: final_positions,
        normals: has_normals.then_some(final_normals),
        uvs: has_uvs.then_some(final_uvs),
        indices,
    })
}

fn parse_floats<const N: usize>(parts: &[&str], line_no: usize) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .with_context(|| format!("Invalid number {:?} on line {}", part, line_no + 1))?;
    }
    Ok(out)
}

/// Parse OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
fn parse_obj_vertex(s: &str) -> Option<(usize, Option<usize>, Option<usize>)> {
    let parts: Vec<&str> = s.split('/').collect();

    let vi = parts.first()?.parse::<usize>().ok()?.checked_sub(1)?; // OBJ indices are 1-based

    let vti = parts
        .get(1)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1));

    let vni = parts
        .get(2)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|i| i.checked_sub(1));

    Some((vi, vti, vni))
}
