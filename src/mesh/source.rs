use crate::error::{FurError, FurResult};
use crate::math::Vec3;

/// One vertex of a loaded mesh, read-only
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Decoded vertex attributes of one mesh handed over by the asset loader
#[derive(Debug, Clone, Default)]
pub struct SourceMesh {
    pub name: String,
    positions: Vec<f32>,
    normals: Option<Vec<f32>>,
    indices: Option<Vec<u32>>,
}

impl SourceMesh {
    /// Validate and wrap flat attribute arrays
    ///
    /// `positions` and `normals` are `xyz` triples; `normals` must match
    /// `positions` in length; every index must address an existing vertex.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<f32>,
        normals: Option<Vec<f32>>,
        indices: Option<Vec<u32>>,
    ) -> FurResult<Self> {
        let name = name.into();

        if positions.len() % 3 != 0 {
            return Err(FurError::InvalidMesh(format!(
                "'{}': position array length {} is not a multiple of 3",
                name,
                positions.len()
            )));
        }

        if let Some(ref normals) = normals {
            if normals.len() != positions.len() {
                return Err(FurError::InvalidMesh(format!(
                    "'{}': {} normal components for {} position components",
                    name,
                    normals.len(),
                    positions.len()
                )));
            }
        }

        let vertex_count = positions.len() / 3;
        if let Some(ref indices) = indices {
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(FurError::InvalidMesh(format!(
                    "'{}': index {} out of range for {} vertices",
                    name, bad, vertex_count
                )));
            }
        }

        Ok(Self {
            name,
            positions,
            normals,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// A mesh can grow fur only when it exposes both positions and normals
    pub fn is_eligible(&self) -> bool {
        self.normals.is_some()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions, index)
    }

    /// Vertex `index`, or `None` when out of range or the mesh has no normals
    pub fn vertex(&self, index: usize) -> Option<SourceVertex> {
        let normals = self.normals.as_ref()?;
        if index >= self.vertex_count() {
            return None;
        }
        Some(SourceVertex {
            position: Vec3::from_slice(&self.positions, index),
            normal: Vec3::from_slice(normals, index),
        })
    }

    /// Iterate all vertices; empty when the mesh has no normals
    pub fn vertices(&self) -> impl Iterator<Item = SourceVertex> + '_ {
        let count = if self.is_eligible() { self.vertex_count() } else { 0 };
        (0..count).filter_map(move |i| self.vertex(i))
    }

    /// Bounding sphere as (center, radius)
    pub fn bounds(&self) -> (Vec3, f32) {
        let count = self.vertex_count();
        if count == 0 {
            return (Vec3::ZERO, 0.0);
        }

        let mut center = Vec3::ZERO;
        for i in 0..count {
            center = center + self.position(i);
        }
        center = center.scale(1.0 / count as f32);

        let radius = (0..count)
            .map(|i| self.position(i).distance(&center))
            .fold(0.0f32, f32::max);

        (center, radius)
    }
}
