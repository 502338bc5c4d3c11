//! Object-space mesh input
//!
//! The baker only reads geometry. Hosts are responsible for handing over
//! vertices that are already in canonical object space (identity transform).

use glam::{Vec2, Vec3};

use crate::error::{BakeError, Result};

/// Immutable mesh data consumed by the rasterizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Object-space vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals, index-aligned with `positions`
    pub normals: Vec<Vec3>,
    /// UV coordinates, index-aligned with `positions`
    pub uvs: Vec<Vec2>,
    /// Triangle list as index triples
    pub triangles: Vec<[u32; 3]>,
}

/// Axis-aligned bounds of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// One UV-space triangle with its object-space attributes resolved
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChartTriangle {
    pub uv: [Vec2; 3],
    pub positions: [Vec3; 3],
    pub normals: [Vec3; 3],
}

impl Mesh {
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        triangles: Vec<[u32; 3]>,
    ) -> Self {
        Self {
            positions,
            normals,
            uvs,
            triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Reject meshes the rasterizer cannot sample
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.positions.len();
        if vertex_count == 0 {
            return Err(BakeError::EmptyMesh);
        }
        if self.triangles.is_empty() {
            return Err(BakeError::NoTriangles);
        }
        if self.uvs.is_empty() {
            return Err(BakeError::MissingUvs);
        }
        if self.normals.is_empty() {
            return Err(BakeError::MissingNormals);
        }
        if self.uvs.len() != vertex_count {
            return Err(BakeError::AttributeMismatch {
                attribute: "uvs",
                expected: vertex_count,
                found: self.uvs.len(),
            });
        }
        if self.normals.len() != vertex_count {
            return Err(BakeError::AttributeMismatch {
                attribute: "normals",
                expected: vertex_count,
                found: self.normals.len(),
            });
        }

        for (triangle, indices) in self.triangles.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(BakeError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Axis-aligned bounds of the vertex positions, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Bounds { min, max })
    }

    /// Largest side of the bounding box (0 for an empty mesh)
    pub fn max_extent(&self) -> f32 {
        self.bounds().map(|b| b.size().max_element()).unwrap_or(0.0)
    }

    /// Resolve every triangle's attributes in submission order.
    ///
    /// Callers must have run [`Mesh::validate`] first.
    pub(crate) fn chart(&self) -> Vec<ChartTriangle> {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let (a, b, c) = (a as usize, b as usize, c as usize);
                ChartTriangle {
                    uv: [self.uvs[a], self.uvs[b], self.uvs[c]],
                    positions: [self.positions[a], self.positions[b], self.positions[c]],
                    normals: [self.normals[a], self.normals[b], self.normals[c]],
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, 2.0, -1.0)],
            vec![Vec3::Z; 3],
            vec![Vec2::ZERO, Vec2::X, Vec2::Y],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_validate_accepts_triangle() {
        assert!(triangle().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_data() {
        let mut mesh = triangle();
        mesh.triangles.clear();
        assert!(matches!(mesh.validate(), Err(BakeError::NoTriangles)));

        let mut mesh = triangle();
        mesh.uvs.clear();
        assert!(matches!(mesh.validate(), Err(BakeError::MissingUvs)));

        let mut mesh = triangle();
        mesh.normals.clear();
        assert!(matches!(mesh.validate(), Err(BakeError::MissingNormals)));

        assert!(matches!(Mesh::default().validate(), Err(BakeError::EmptyMesh)));
    }

    #[test]
    fn test_validate_rejects_bad_indices() {
        let mut mesh = triangle();
        mesh.triangles.push([0, 2, 7]);
        let err = mesh.validate().unwrap_err();
        assert!(err.is_data_error());
        assert!(matches!(
            err,
            BakeError::IndexOutOfRange {
                triangle: 1,
                index: 7,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn test_validate_rejects_misaligned_uvs() {
        let mut mesh = triangle();
        mesh.uvs.pop();
        assert!(matches!(
            mesh.validate(),
            Err(BakeError::AttributeMismatch {
                attribute: "uvs",
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_max_extent() {
        let mesh = triangle();
        assert_eq!(mesh.max_extent(), 2.0);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(Mesh::default().max_extent(), 0.0);
    }
}
