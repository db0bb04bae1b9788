//! Transform composition for renderables and group (pivot) edits.
//!
//! Rotations are stored as pitch/yaw/roll and applied in that order: the
//! object is rotated about X first, then Y, then Z. In glam's column-vector
//! convention that is `Rz(roll) * Ry(yaw) * Rx(pitch)`.

use glam::{Mat3, Mat4, Vec3};

/// Tolerance used to detect the gimbal-lock poles while decomposing.
const POLE_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl EulerAngles {
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn is_zero(&self) -> bool {
        self.pitch == 0.0 && self.yaw == 0.0 && self.roll == 0.0
    }
}

pub fn rotation_matrix(angles: EulerAngles) -> Mat4 {
    Mat4::from_rotation_z(angles.roll)
        * Mat4::from_rotation_y(angles.yaw)
        * Mat4::from_rotation_x(angles.pitch)
}

/// Inputs of one model matrix: the object's own scale/rotation, the pivot's
/// scale/rotation, and the translations around the pivot.
#[derive(Debug, Clone, Copy)]
pub struct ModelParts {
    pub local_scale: Mat4,
    pub local_rotation: Mat4,
    pub translate_to_origin: Mat4,
    pub pivot_scale: Mat4,
    pub pivot_rotation: Mat4,
    pub translate_back: Mat4,
    pub world_translation: Mat4,
}

impl ModelParts {
    /// Parts for an object that is not part of a group edit.
    pub fn local(scale: f32, rotation: EulerAngles, world_position: Vec3) -> Self {
        Self {
            local_scale: Mat4::from_scale(Vec3::splat(scale)),
            local_rotation: rotation_matrix(rotation),
            translate_to_origin: Mat4::IDENTITY,
            pivot_scale: Mat4::IDENTITY,
            pivot_rotation: Mat4::IDENTITY,
            translate_back: Mat4::IDENTITY,
            world_translation: Mat4::from_translation(world_position),
        }
    }

    /// Parts for an object rotated/scaled about `pivot_position` as part of
    /// a group edit.
    pub fn with_pivot(
        scale: f32,
        rotation: EulerAngles,
        world_position: Vec3,
        pivot_position: Vec3,
        pivot_scale: f32,
        pivot_rotation: EulerAngles,
    ) -> Self {
        let offset = pivot_position - world_position;
        Self {
            translate_to_origin: Mat4::from_translation(-offset),
            pivot_scale: Mat4::from_scale(Vec3::splat(pivot_scale)),
            pivot_rotation: rotation_matrix(pivot_rotation),
            translate_back: Mat4::from_translation(offset),
            ..Self::local(scale, rotation, world_position)
        }
    }
}

/// Builds the model matrix. Application order: local scale, local rotation,
/// move to pivot space, pivot scale, pivot rotation, move back, world
/// translation.
pub fn compose_model_matrix(parts: &ModelParts) -> Mat4 {
    parts.world_translation
        * parts.translate_back
        * parts.pivot_rotation
        * parts.pivot_scale
        * parts.translate_to_origin
        * parts.local_rotation
        * parts.local_scale
}

/// Recovers pitch/yaw/roll from a rotation matrix built by
/// [`rotation_matrix`].
///
/// Entries are read row-major over the transposed (row-vector) layout, so
/// `m[0][2]` is `-sin(yaw)`. At the poles (`m[0][2] == ±1`) only the sum or
/// difference of pitch and roll is known; roll is pinned to zero and pitch
/// absorbs the rest.
pub fn decompose_rotation(rotation: Mat3) -> EulerAngles {
    // m[i][j] of the row-vector layout is column i, row j of glam's matrix.
    let m = |i: usize, j: usize| rotation.col(i)[j];

    let m02 = m(0, 2).clamp(-1.0, 1.0);
    let raw_yaw = m02.asin();

    let (raw_pitch, raw_roll) = if m02.abs() >= 1.0 - POLE_EPSILON {
        (m(2, 1).atan2(m(1, 1)), 0.0)
    } else {
        (
            (-m(1, 2)).atan2(m(2, 2)),
            (-m(0, 1)).atan2(m(0, 0)),
        )
    };

    EulerAngles::new(-raw_pitch, -raw_yaw, -raw_roll)
}
