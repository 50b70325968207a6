use super::Vec3;

/// 4x4 matrix for transformations (column-major for WebGL)
#[derive(Debug, Clone, Copy)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Mat4 {
    /// Rotation about the vertical axis (model yaw)
    pub fn rotation_y(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            data: [
                c, 0.0, -s, 0.0,
                0.0, 1.0, 0.0, 0.0,
                s, 0.0, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Perspective projection matrix
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        Self {
            data: [
                f / aspect, 0.0, 0.0, 0.0,
                0.0, f, 0.0, 0.0,
                0.0, 0.0, (far + near) * nf, -1.0,
                0.0, 0.0, 2.0 * far * near * nf, 0.0,
            ],
        }
    }

    /// Look-at view matrix
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let r = f.cross(&up).normalize();
        let u = r.cross(&f);

        Self {
            data: [
                r.x, u.x, -f.x, 0.0,
                r.y, u.y, -f.y, 0.0,
                r.z, u.z, -f.z, 0.0,
                -r.dot(&eye), -u.dot(&eye), f.dot(&eye), 1.0,
            ],
        }
    }

    /// Get as slice for WebGL
    pub fn as_slice(&self) -> &[f32; 16] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
        let d = &m.data;
        Vec3::new(
            d[0] * p.x + d[4] * p.y + d[8] * p.z + d[12],
            d[1] * p.x + d[5] * p.y + d[9] * p.z + d[13],
            d[2] * p.x + d[6] * p.y + d[10] * p.z + d[14],
        )
    }

    #[test]
    fn test_rotation_y_half_turn() {
        let m = Mat4::rotation_y(std::f32::consts::PI);
        let p = transform_point(&m, Vec3::new(1.0, 2.0, 0.0));
        assert!((p.x + 1.0).abs() < 0.0001);
        assert!((p.y - 2.0).abs() < 0.0001);
        assert!(p.z.abs() < 0.0001);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(-1.0, 0.8, -4.0);
        let view = Mat4::look_at(eye, Vec3::ZERO, Vec3::UP);
        let p = transform_point(&view, eye);
        assert!(p.length() < 0.0001);
    }

    #[test]
    fn test_look_at_target_is_in_front() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP);
        let p = transform_point(&view, Vec3::ZERO);
        // Camera looks down -Z in view space
        assert!((p.z + 5.0).abs() < 0.0001);
    }
}
