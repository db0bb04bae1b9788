//! Group edits: rotate and scale every selected renderable about a shared
//! pivot.

use crate::math::{compose_model_matrix, decompose_rotation, EulerAngles, ModelParts};
use crate::scene::{RenderableId, Scene, Transform};
use glam::{Mat3, Vec3};

/// One-shot pivot delta. Reset to identity after every application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotState {
    pub position: Vec3,
    pub rotation: EulerAngles,
    pub scale: f32,
}

impl Default for PivotState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: EulerAngles::ZERO,
            scale: 1.0,
        }
    }
}

impl PivotState {
    /// True when applying the pivot would change nothing.
    pub fn is_identity(&self) -> bool {
        self.rotation.is_zero() && self.scale == 1.0
    }

    /// Clears the delta but keeps the pivot position.
    pub fn reset_delta(&mut self) {
        self.rotation = EulerAngles::ZERO;
        self.scale = 1.0;
    }

    /// New transform of one renderable after this pivot delta.
    pub fn apply_to(&self, transform: &Transform) -> Transform {
        let parts = ModelParts::with_pivot(
            transform.scale,
            transform.rotation,
            transform.world_position,
            self.position,
            self.scale,
            self.rotation,
        );
        let model = compose_model_matrix(&parts);

        let scale = (parts.pivot_scale * parts.local_scale).x_axis.x;
        let rotation = parts.translate_back
            * parts.pivot_rotation
            * parts.translate_to_origin
            * parts.local_rotation;

        Transform {
            world_position: model.w_axis.truncate(),
            rotation: decompose_rotation(Mat3::from_mat4(rotation)),
            scale,
            ..*transform
        }
    }
}

/// Applies `pivot` to every id in `ids`. All results are computed from the
/// pre-edit transforms before any renderable is written. Returns the ids
/// that were updated.
pub fn apply_group_transform(
    scene: &mut Scene,
    ids: &[RenderableId],
    pivot: &PivotState,
    cursor: Vec3,
) -> Vec<RenderableId> {
    let updates: Vec<(RenderableId, Transform)> = ids
        .iter()
        .filter_map(|id| {
            scene
                .get(*id)
                .map(|renderable| (*id, pivot.apply_to(&renderable.transform)))
        })
        .collect();

    for (id, transform) in &updates {
        if let Some(renderable) = scene.get_mut(*id) {
            let mut updated = *transform;
            updated.set_world_position(transform.world_position, cursor);
            renderable.transform = updated;
        }
    }

    log::trace!("Applied pivot {:?} to {} renderables", pivot, updates.len());
    updates.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{PointParams, RenderableKind, TorusParams};
    use std::f32::consts::FRAC_PI_2;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn two_toruses() -> (Scene, Vec<RenderableId>) {
        let mut scene = Scene::new();
        let mut first = Transform::at(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
        first.rotation = EulerAngles::new(0.2, -0.3, 0.5);
        first.scale = 1.5;
        let second = Transform::at(Vec3::new(-2.0, 1.0, 3.0), Vec3::ZERO);
        let ids = vec![
            scene.add_renderable("A", first, RenderableKind::Torus(TorusParams::default())),
            scene.add_renderable("B", second, RenderableKind::Torus(TorusParams::default())),
        ];
        (scene, ids)
    }

    #[test]
    fn identity_pivot_leaves_transforms_unchanged() {
        let (mut scene, ids) = two_toruses();
        let before: Vec<Transform> = ids
            .iter()
            .map(|id| scene.get(*id).unwrap().transform)
            .collect();

        for (id, original) in ids.iter().zip(before.iter()) {
            let pivot = PivotState {
                position: original.world_position,
                ..PivotState::default()
            };
            apply_group_transform(&mut scene, &[*id], &pivot, Vec3::ZERO);
            let after = scene.get(*id).unwrap().transform;
            assert!(approx_vec(after.world_position, original.world_position));
            assert!(approx(after.scale, original.scale));
            assert!(approx(after.rotation.pitch, original.rotation.pitch));
            assert!(approx(after.rotation.yaw, original.rotation.yaw));
            assert!(approx(after.rotation.roll, original.rotation.roll));
        }
    }

    #[test]
    fn pivot_scale_pushes_positions_apart() {
        let (mut scene, ids) = two_toruses();
        let pivot = PivotState {
            position: Vec3::new(0.5, 0.5, 0.5),
            scale: 2.0,
            ..PivotState::default()
        };
        let before: Vec<Transform> = ids
            .iter()
            .map(|id| scene.get(*id).unwrap().transform)
            .collect();

        let updated = apply_group_transform(&mut scene, &ids, &pivot, Vec3::ZERO);
        assert_eq!(updated, ids);

        for (id, original) in ids.iter().zip(before.iter()) {
            let after = scene.get(*id).unwrap().transform;
            let expected = pivot.position + (original.world_position - pivot.position) * 2.0;
            assert!(approx_vec(after.world_position, expected));
            assert!(approx(after.scale, original.scale * 2.0));
        }
    }

    #[test]
    fn pivot_rotation_composes_with_local_rotation() {
        let mut scene = Scene::new();
        let id = scene.add_renderable(
            "P",
            Transform::at(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO),
            RenderableKind::Point(PointParams::default()),
        );
        let pivot = PivotState {
            position: Vec3::ZERO,
            rotation: EulerAngles::new(FRAC_PI_2, 0.0, 0.0),
            scale: 1.0,
        };
        apply_group_transform(&mut scene, &[id], &pivot, Vec3::ZERO);
        let after = scene.get(id).unwrap().transform;
        assert!(approx_vec(after.world_position, Vec3::new(0.0, -2.0, 0.0)));
        assert!(approx(after.rotation.pitch, FRAC_PI_2));
        assert!(approx(after.rotation.yaw, 0.0));
        assert!(approx(after.rotation.roll, 0.0));
    }

    #[test]
    fn result_does_not_depend_on_iteration_order() {
        let (mut forward, ids) = two_toruses();
        let (mut backward, _) = two_toruses();
        let pivot = PivotState {
            position: Vec3::new(0.3, -0.2, 1.0),
            rotation: EulerAngles::new(0.1, 0.7, -0.4),
            scale: 0.5,
        };
        let reversed: Vec<RenderableId> = ids.iter().rev().copied().collect();
        apply_group_transform(&mut forward, &ids, &pivot, Vec3::ZERO);
        apply_group_transform(&mut backward, &reversed, &pivot, Vec3::ZERO);
        for id in &ids {
            let a = forward.get(*id).unwrap().transform;
            let b = backward.get(*id).unwrap().transform;
            assert!(approx_vec(a.world_position, b.world_position));
            assert!(approx(a.scale, b.scale));
        }
    }

    #[test]
    fn world_update_keeps_local_position_in_sync() {
        let (mut scene, ids) = two_toruses();
        let cursor = Vec3::new(1.0, 1.0, 1.0);
        let pivot = PivotState {
            scale: 3.0,
            ..PivotState::default()
        };
        apply_group_transform(&mut scene, &ids, &pivot, cursor);
        for id in &ids {
            let transform = scene.get(*id).unwrap().transform;
            assert!(approx_vec(
                transform.world_position,
                transform.local_position - cursor
            ));
        }
    }
}
