//! Editing session: owns the scene, the selection and the pivot, and turns
//! UI actions into scene mutations.
//!
//! Actions are validated here before anything is mutated. A failing action
//! leaves the session untouched and is reported as an [`EditorError`].

mod pivot;
mod selection;

pub use pivot::{apply_group_transform, PivotState};
pub use selection::{PickModifier, Selection};

use crate::math::EulerAngles;
use crate::render::RenderBackend;
use crate::scene::{
    BezierCurve, BezierKind, PointParams, RenderableId, RenderableKind, Scene, TorusParams,
    Transform,
};
use glam::Vec3;

/// Minimum number of selected points needed to create a curve.
pub const MIN_CURVE_POINTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("renderable {0} does not exist")]
    UnknownRenderable(RenderableId),
    #[error("no renderable at list index {0}")]
    IndexOutOfRange(usize),
    #[error("{kind} needs at least {required} selected points, found {found}")]
    NotEnoughPoints {
        kind: &'static str,
        required: usize,
        found: usize,
    },
    #[error("renderable {id} is not a {expected}")]
    KindMismatch {
        id: RenderableId,
        expected: &'static str,
    },
    #[error("{point} is not a control point of {curve}")]
    NotAControlPoint {
        curve: RenderableId,
        point: RenderableId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    AddTorus,
    /// Adds a point at the cursor. If exactly one curve is selected the new
    /// point is appended to its control points.
    AddPoint,
    ClearScene,
    Pick {
        index: usize,
        modifier: PickModifier,
    },
    /// Selects only `id` (the "Edit" button of a control point).
    Focus(RenderableId),
    Rename {
        id: RenderableId,
        tag: String,
    },
    SetLocalPosition {
        id: RenderableId,
        position: Vec3,
    },
    SetWorldPosition {
        id: RenderableId,
        position: Vec3,
    },
    SetRotation {
        id: RenderableId,
        rotation: EulerAngles,
    },
    SetScale {
        id: RenderableId,
        scale: f32,
    },
    SetTorusParams {
        id: RenderableId,
        params: TorusParams,
    },
    SetPointParams {
        id: RenderableId,
        params: PointParams,
    },
    SetPolygonVisible {
        id: RenderableId,
        visible: bool,
    },
    RemoveControlPoint {
        curve: RenderableId,
        point: RenderableId,
    },
    CreateBezier(BezierKind),
    /// Applies the pivot delta to the whole selection.
    SetPivot(PivotState),
    DeleteSelected,
    SetCursor(Vec3),
}

#[derive(Debug, Clone, Copy)]
pub struct EditorDefaults {
    pub torus: TorusParams,
    pub point: PointParams,
    pub curve_samples: u32,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            torus: TorusParams::default(),
            point: PointParams::default(),
            curve_samples: crate::scene::DEFAULT_CURVE_SAMPLES,
        }
    }
}

pub struct Editor {
    scene: Scene,
    selection: Selection,
    pivot: PivotState,
    cursor: Vec3,
    defaults: EditorDefaults,
    geometry_dirty: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorDefaults::default(), Vec3::ZERO)
    }
}

impl Editor {
    pub fn new(defaults: EditorDefaults, cursor: Vec3) -> Self {
        Self {
            scene: Scene::with_curve_samples(defaults.curve_samples),
            selection: Selection::new(),
            pivot: PivotState::default(),
            cursor,
            defaults,
            geometry_dirty: true,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pivot(&self) -> PivotState {
        self.pivot
    }

    pub fn cursor(&self) -> Vec3 {
        self.cursor
    }

    pub fn geometry_dirty(&self) -> bool {
        self.geometry_dirty
    }

    /// Selected point renderables, in selection order.
    pub fn selected_points(&self) -> Vec<RenderableId> {
        self.selection
            .ids()
            .iter()
            .copied()
            .filter(|id| self.scene.is_point(*id))
            .collect()
    }

    pub fn can_create_curve(&self) -> bool {
        self.selected_points().len() >= MIN_CURVE_POINTS
    }

    /// Applies every action in order. Rejected actions are logged and
    /// skipped. Returns how many were applied.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = EditorAction>) -> usize {
        let mut applied = 0;
        for action in actions {
            match self.apply(action) {
                Ok(()) => applied += 1,
                Err(err) => log::warn!("Rejected editor action: {}", err),
            }
        }
        applied
    }

    pub fn apply(&mut self, action: EditorAction) -> Result<(), EditorError> {
        match action {
            EditorAction::AddTorus => {
                self.add_torus();
            }
            EditorAction::AddPoint => {
                self.add_point();
            }
            EditorAction::ClearScene => self.clear(),
            EditorAction::Pick { index, modifier } => {
                if !self.selection.pick(&self.scene, index, modifier) {
                    return Err(EditorError::IndexOutOfRange(index));
                }
                self.recenter_pivot();
            }
            EditorAction::Focus(id) => {
                self.require(id)?;
                self.selection.select_only(id);
                self.recenter_pivot();
            }
            EditorAction::Rename { id, tag } => {
                self.scene
                    .get_mut(id)
                    .ok_or(EditorError::UnknownRenderable(id))?
                    .tag = tag;
            }
            EditorAction::SetLocalPosition { id, position } => {
                let cursor = self.cursor;
                self.transform_mut(id)?
                    .set_local_position(position, cursor);
                self.regenerate_dependents(id);
            }
            EditorAction::SetWorldPosition { id, position } => {
                let cursor = self.cursor;
                self.transform_mut(id)?
                    .set_world_position(position, cursor);
                self.regenerate_dependents(id);
            }
            EditorAction::SetRotation { id, rotation } => {
                self.transform_mut(id)?.rotation = rotation;
            }
            EditorAction::SetScale { id, scale } => {
                self.transform_mut(id)?.scale = scale;
            }
            EditorAction::SetTorusParams { id, params } => {
                match self.renderable_kind_mut(id)? {
                    RenderableKind::Torus(existing) => *existing = params.clamped(),
                    _ => {
                        return Err(EditorError::KindMismatch {
                            id,
                            expected: "Torus",
                        })
                    }
                }
                self.regenerate(id);
            }
            EditorAction::SetPointParams { id, params } => {
                match self.renderable_kind_mut(id)? {
                    RenderableKind::Point(existing) => *existing = params.clamped(),
                    _ => {
                        return Err(EditorError::KindMismatch {
                            id,
                            expected: "Point",
                        })
                    }
                }
                self.regenerate(id);
            }
            EditorAction::SetPolygonVisible { id, visible } => {
                match self.renderable_kind_mut(id)? {
                    RenderableKind::Bezier(curve) => curve.show_polygon = visible,
                    _ => {
                        return Err(EditorError::KindMismatch {
                            id,
                            expected: "Bezier curve",
                        })
                    }
                }
                self.regenerate(id);
            }
            EditorAction::RemoveControlPoint { curve, point } => {
                self.require(curve)?;
                if !self.scene.remove_control_point(curve, point) {
                    return Err(EditorError::NotAControlPoint { curve, point });
                }
                self.geometry_dirty = true;
            }
            EditorAction::CreateBezier(kind) => {
                self.create_curve(kind)?;
            }
            EditorAction::SetPivot(pivot) => self.set_pivot(pivot),
            EditorAction::DeleteSelected => self.delete_selected(),
            EditorAction::SetCursor(position) => self.cursor = position,
        }
        Ok(())
    }

    pub fn add_torus(&mut self) -> RenderableId {
        let id = self.scene.add_renderable(
            "Torus",
            Transform::at(self.cursor, self.cursor),
            RenderableKind::Torus(self.defaults.torus.clamped()),
        );
        self.retag(id);
        self.geometry_dirty = true;
        id
    }

    pub fn add_point(&mut self) -> RenderableId {
        let target_curve = self
            .selection
            .single()
            .filter(|id| self.scene.get(*id).is_some_and(|r| r.as_bezier().is_some()));

        let id = self.scene.add_renderable(
            "Point",
            Transform::at(self.cursor, self.cursor),
            RenderableKind::Point(self.defaults.point.clamped()),
        );
        self.retag(id);

        if let Some(curve) = target_curve {
            if self.scene.insert_control_point(curve, id) {
                log::debug!("Appended {} to control points of {}", id, curve);
            }
        }
        self.geometry_dirty = true;
        id
    }

    /// Creates a curve through the selected points and clears the
    /// selection.
    pub fn create_curve(&mut self, kind: BezierKind) -> Result<RenderableId, EditorError> {
        let points = self.selected_points();
        if points.len() < MIN_CURVE_POINTS {
            return Err(EditorError::NotEnoughPoints {
                kind: kind.label(),
                required: MIN_CURVE_POINTS,
                found: points.len(),
            });
        }

        let id = self.scene.add_renderable(
            kind.label(),
            Transform::default(),
            RenderableKind::Bezier(BezierCurve::new(kind, points)),
        );
        self.retag(id);
        self.selection.clear();
        self.geometry_dirty = true;
        log::info!("Created {} {}", kind.label(), id);
        Ok(id)
    }

    pub fn clear(&mut self) {
        self.scene.clear();
        self.selection.reset();
        self.pivot = PivotState::default();
        self.geometry_dirty = true;
    }

    /// Stores `pivot` and, if it carries a delta, applies it to the
    /// selection. The delta is consumed; the pivot position stays.
    pub fn set_pivot(&mut self, pivot: PivotState) {
        self.pivot = pivot;
        if self.pivot.is_identity() || self.selection.is_empty() {
            self.pivot.reset_delta();
            return;
        }

        let ids = self.selection.ids().to_vec();
        let moved = apply_group_transform(&mut self.scene, &ids, &self.pivot, self.cursor);
        for id in moved {
            self.regenerate_dependents(id);
        }
        self.pivot.reset_delta();
    }

    /// Removes every selected renderable and regenerates curves that lost
    /// control points.
    pub fn delete_selected(&mut self) {
        let ids = self.selection.ids().to_vec();
        let mut dependents = Vec::new();
        for id in &ids {
            if let Some(removal) = self.scene.remove_renderable(*id) {
                dependents.extend(removal.dependents);
            }
        }
        dependents.sort();
        dependents.dedup();
        for curve in dependents {
            self.scene.regenerate(curve);
        }
        self.selection.retain_existing(&self.scene);
        self.geometry_dirty = true;
        log::info!("Deleted {} renderables", ids.len());
    }

    /// Rebuilds the backend's geometry buffers if any mesh changed since the
    /// last flush. Returns true if a rebuild happened.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) -> bool {
        if !self.geometry_dirty {
            return false;
        }
        backend.build_geometry_buffers(&self.scene);
        self.geometry_dirty = false;
        true
    }

    fn require(&self, id: RenderableId) -> Result<(), EditorError> {
        if self.scene.contains(id) {
            Ok(())
        } else {
            Err(EditorError::UnknownRenderable(id))
        }
    }

    fn transform_mut(&mut self, id: RenderableId) -> Result<&mut Transform, EditorError> {
        self.scene
            .get_mut(id)
            .map(|renderable| &mut renderable.transform)
            .ok_or(EditorError::UnknownRenderable(id))
    }

    fn renderable_kind_mut(
        &mut self,
        id: RenderableId,
    ) -> Result<&mut RenderableKind, EditorError> {
        self.scene
            .get_mut(id)
            .map(|renderable| &mut renderable.kind)
            .ok_or(EditorError::UnknownRenderable(id))
    }

    fn regenerate(&mut self, id: RenderableId) {
        if self.scene.regenerate(id) {
            self.geometry_dirty = true;
        }
        self.regenerate_dependents(id);
    }

    fn regenerate_dependents(&mut self, id: RenderableId) {
        if !self.scene.regenerate_dependents(id).is_empty() {
            self.geometry_dirty = true;
        }
    }

    fn retag(&mut self, id: RenderableId) {
        if let Some(renderable) = self.scene.get_mut(id) {
            renderable.tag = format!("{} {}", renderable.kind.type_name(), id.0);
        }
    }

    /// Moves the pivot to the centroid of the selection.
    fn recenter_pivot(&mut self) {
        let positions: Vec<Vec3> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.scene.get(*id))
            .map(|renderable| renderable.transform.world_position)
            .collect();
        if positions.is_empty() {
            return;
        }
        let sum: Vec3 = positions.iter().copied().sum();
        self.pivot = PivotState {
            position: sum / positions.len() as f32,
            ..PivotState::default()
        };
    }
}
