use log::{debug, warn};
use serde::{Deserialize, Serialize};
use crate::error::{FurError, FurResult, FurWarning};
use crate::math::Vec3;
use crate::mesh::{MeshSelection, SourceMesh};
use super::buffer::StrandBuffer;
use super::color::ColorMode;

/// What to do with a vertex whose normal has zero length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateNormalPolicy {
    /// Grow the strand straight up
    #[default]
    SubstituteUp,
    /// Emit no strand for the vertex
    Skip,
    /// Abort generation with `FurError::DegenerateNormal`
    Fail,
}

/// Upper bound on segments per strand
pub const MAX_SEGMENT_COUNT: usize = 256;

/// Parameters for strand generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrandParams {
    /// Segments per strand
    pub segment_count: usize,
    /// World-space length of each segment
    pub strand_length: f32,
    /// Downward pull reached by the last segment
    pub gravity_bias: f32,
    pub degenerate_normals: DegenerateNormalPolicy,
}

impl Default for StrandParams {
    fn default() -> Self {
        Self {
            segment_count: 5,
            strand_length: 0.01,
            gravity_bias: 0.8,
            degenerate_normals: DegenerateNormalPolicy::SubstituteUp,
        }
    }
}

impl StrandParams {
    pub fn validate(&self) -> FurResult<()> {
        if self.segment_count == 0 || self.segment_count > MAX_SEGMENT_COUNT {
            return Err(FurError::Config(format!(
                "segment_count must be within 1..={}, got {}",
                MAX_SEGMENT_COUNT, self.segment_count
            )));
        }
        if !self.strand_length.is_finite() || self.strand_length < 0.0 {
            return Err(FurError::Config(format!(
                "strand_length must be finite and non-negative, got {}",
                self.strand_length
            )));
        }
        if !self.gravity_bias.is_finite() {
            return Err(FurError::Config("gravity_bias must be finite".into()));
        }
        Ok(())
    }
}

/// Output of a generation run: the buffer plus anything worth reporting
#[derive(Debug, Clone, Default)]
pub struct StrandBuild {
    pub buffer: StrandBuffer,
    pub warnings: Vec<FurWarning>,
}

/// Grows fur strands from the vertices of a mesh
pub struct StrandGenerator {
    params: StrandParams,
    color: ColorMode,
}

impl StrandGenerator {
    pub fn new(params: StrandParams, color: ColorMode) -> Self {
        Self { params, color }
    }

    /// Pick a mesh with `selection` and grow fur on it
    ///
    /// Without an eligible mesh the result is an empty buffer carrying
    /// `FurWarning::NoEligibleMesh`.
    pub fn generate_for_selection(
        &self,
        meshes: &[SourceMesh],
        selection: &MeshSelection,
    ) -> FurResult<StrandBuild> {
        match selection.select(meshes) {
            Some(mesh) => {
                debug!("Growing fur on mesh '{}' ({} vertices)", mesh.name, mesh.vertex_count());
                self.generate(mesh)
            }
            None => {
                let warning = FurWarning::NoEligibleMesh;
                warn!("{} ({} meshes loaded)", warning, meshes.len());
                Ok(StrandBuild {
                    buffer: StrandBuffer::new(self.params.segment_count),
                    warnings: vec![warning],
                })
            }
        }
    }

    /// Grow one strand per vertex of `mesh`
    pub fn generate(&self, mesh: &SourceMesh) -> FurResult<StrandBuild> {
        self.params.validate()?;

        let Some(normals) = mesh.normals() else {
            let warning = FurWarning::NoEligibleMesh;
            warn!("Mesh '{}': {}", mesh.name, warning);
            return Ok(StrandBuild {
                buffer: StrandBuffer::new(self.params.segment_count),
                warnings: vec![warning],
            });
        };

        let positions = mesh.positions();
        let vertex_count = mesh.vertex_count();
        let mut buffer = StrandBuffer::with_capacity(self.params.segment_count, vertex_count)?;
        let mut degenerate = 0usize;

        for i in 0..vertex_count {
            let root = Vec3::from_slice(positions, i);
            let raw_normal = Vec3::from_slice(normals, i);

            let normal = if raw_normal.try_normalize().is_some() {
                raw_normal
            } else {
                degenerate += 1;
                match self.params.degenerate_normals {
                    DegenerateNormalPolicy::SubstituteUp => Vec3::UP,
                    DegenerateNormalPolicy::Skip => continue,
                    DegenerateNormalPolicy::Fail => {
                        return Err(FurError::DegenerateNormal { vertex: i });
                    }
                }
            };

            self.grow_strand(&mut buffer, root, normal);
        }

        let mut warnings = Vec::new();
        if degenerate > 0 {
            let warning = match self.params.degenerate_normals {
                DegenerateNormalPolicy::Skip => FurWarning::DegenerateNormalsSkipped { count: degenerate },
                _ => FurWarning::DegenerateNormalsSubstituted { count: degenerate },
            };
            warn!("Mesh '{}': {}", mesh.name, warning);
            warnings.push(warning);
        }

        debug!(
            "Generated {} strands, {} segments",
            buffer.strand_count(),
            buffer.total_segments()
        );

        Ok(StrandBuild { buffer, warnings })
    }

    /// Walk from `root` along `normal`, bending each later segment further down
    fn grow_strand(&self, buffer: &mut StrandBuffer, root: Vec3, normal: Vec3) {
        let params = &self.params;
        let segments = params.segment_count;
        let mut p = root;

        for j in 0..segments {
            let droop = params.gravity_bias * (j + 1) as f32 / segments as f32;
            // A zero-length bent direction leaves the walker in place
            let direction = (normal + Vec3::DOWN.scale(droop)).normalize();
            let next = p + direction.scale(params.strand_length);

            buffer.push_segment(p, next, self.color.segment_color(normal, j, segments));
            p = next;
        }
    }
}
