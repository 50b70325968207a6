use crate::error::{FurError, FurResult};
use crate::math::Vec3;

/// Flat line-segment buffer for fur strands
///
/// Points come in segment-endpoint pairs `(p_j, p_j+1)` so the buffer is drawn
/// as independent lines. Layout per point: position(3) in `positions`,
/// color(3) in `colors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrandBuffer {
    positions: Vec<f32>,
    colors: Vec<f32>,
    segment_count: usize,
    dirty: bool,
}

impl StrandBuffer {
    /// Empty buffer for strands of `segment_count` segments
    pub fn new(segment_count: usize) -> Self {
        Self {
            segment_count,
            ..Default::default()
        }
    }

    /// Empty buffer with room for `strands` strands
    ///
    /// Fails when the float count does not fit in `usize`.
    pub fn with_capacity(segment_count: usize, strands: usize) -> FurResult<Self> {
        let floats = strands
            .checked_mul(segment_count)
            .and_then(|segments| segments.checked_mul(6))
            .ok_or_else(|| {
                FurError::Config(format!(
                    "{} strands of {} segments do not fit in memory",
                    strands, segment_count
                ))
            })?;
        Ok(Self {
            positions: Vec::with_capacity(floats),
            colors: Vec::with_capacity(floats),
            segment_count,
            dirty: false,
        })
    }

    /// Append one segment; both endpoints share `color`
    pub fn push_segment(&mut self, start: Vec3, end: Vec3, color: Vec3) {
        self.positions.extend_from_slice(&start.to_array());
        self.positions.extend_from_slice(&end.to_array());
        self.colors.extend_from_slice(&color.to_array());
        self.colors.extend_from_slice(&color.to_array());
    }

    /// Segments per strand
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Drawable segments in the whole buffer
    pub fn total_segments(&self) -> usize {
        self.point_count() / 2
    }

    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn strand_count(&self) -> usize {
        if self.segment_count == 0 {
            0
        } else {
            self.total_segments() / self.segment_count
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Mutable positions; callers mark the buffer dirty after writing
    pub fn positions_mut(&mut self) -> &mut [f32] {
        &mut self.positions
    }

    pub fn point(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions, index)
    }

    /// The `segment_count * 2` points of strand `strand`, in buffer order
    pub fn strand_points(&self, strand: usize) -> Option<Vec<Vec3>> {
        if strand >= self.strand_count() {
            return None;
        }
        let first = strand * self.segment_count * 2;
        Some((first..first + self.segment_count * 2).map(|i| self.point(i)).collect())
    }

    /// Request a re-upload of the positions
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the dirty flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_segment_layout() {
        let mut buffer = StrandBuffer::new(1);
        buffer.push_segment(Vec3::ZERO, Vec3::UP, Vec3::new(0.2, 0.4, 0.6));

        assert_eq!(buffer.positions(), &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(buffer.colors(), &[0.2, 0.4, 0.6, 0.2, 0.4, 0.6]);
        assert_eq!(buffer.point_count(), 2);
        assert_eq!(buffer.total_segments(), 1);
        assert_eq!(buffer.strand_count(), 1);
    }

    #[test]
    fn test_strand_points() {
        let mut buffer = StrandBuffer::with_capacity(2, 2).unwrap();
        for x in [0.0, 5.0] {
            let root = Vec3::new(x, 0.0, 0.0);
            let mid = root + Vec3::UP;
            buffer.push_segment(root, mid, Vec3::UP);
            buffer.push_segment(mid, mid + Vec3::UP, Vec3::UP);
        }

        assert_eq!(buffer.strand_count(), 2);
        let second = buffer.strand_points(1).unwrap();
        assert_eq!(second.len(), 4);
        assert_eq!(second[0], Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(second[3], Vec3::new(5.0, 2.0, 0.0));
        assert!(buffer.strand_points(2).is_none());
    }

    #[test]
    fn test_dirty_flag() {
        let mut buffer = StrandBuffer::new(5);
        assert!(!buffer.is_dirty());
        buffer.mark_dirty();
        assert!(buffer.take_dirty());
        assert!(!buffer.take_dirty());
    }

    #[test]
    fn test_capacity_overflow_is_an_error() {
        let result = StrandBuffer::with_capacity(usize::MAX / 4, 8);
        assert!(matches!(result, Err(FurError::Config(_))));
    }

    #[test]
    fn test_zero_segment_buffer_has_no_strands() {
        assert_eq!(StrandBuffer::new(0).strand_count(), 0);
    }
}
