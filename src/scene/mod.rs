pub mod geometry;
mod renderable;

pub use renderable::{
    BezierCurve, BezierKind, PointParams, Renderable, RenderableId, RenderableKind, TorusParams,
    Transform,
};

use glam::Vec3;

pub const DEFAULT_CURVE_SAMPLES: u32 = 64;

/// Result of removing a renderable from the scene.
#[derive(Debug)]
pub struct Removal {
    pub renderable: Renderable,
    /// Curves that referenced the removed renderable as a control point.
    /// Their references are already pruned; regenerating them is up to the
    /// caller.
    pub dependents: Vec<RenderableId>,
}

/// Insertion-ordered collection owning every renderable.
///
/// Ids are never reused, so ids handed out before [`Scene::clear`] stop
/// resolving afterwards.
pub struct Scene {
    renderables: Vec<Renderable>,
    next_id: u32,
    curve_samples: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            renderables: Vec::new(),
            next_id: 0,
            curve_samples: DEFAULT_CURVE_SAMPLES,
        }
    }

    pub fn with_curve_samples(curve_samples: u32) -> Self {
        Self {
            curve_samples: curve_samples.max(1),
            ..Self::new()
        }
    }

    pub fn curve_samples(&self) -> u32 {
        self.curve_samples
    }

    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    pub fn get(&self, id: RenderableId) -> Option<&Renderable> {
        self.renderables.iter().find(|renderable| renderable.id() == id)
    }

    pub fn get_mut(&mut self, id: RenderableId) -> Option<&mut Renderable> {
        self.renderables
            .iter_mut()
            .find(|renderable| renderable.id() == id)
    }

    pub fn contains(&self, id: RenderableId) -> bool {
        self.get(id).is_some()
    }

    pub fn index_of(&self, id: RenderableId) -> Option<usize> {
        self.renderables
            .iter()
            .position(|renderable| renderable.id() == id)
    }

    pub fn id_at(&self, index: usize) -> Option<RenderableId> {
        self.renderables.get(index).map(Renderable::id)
    }

    /// Inserts a new renderable, builds its geometry and returns its id.
    pub fn add_renderable(
        &mut self,
        tag: impl Into<String>,
        transform: Transform,
        mut kind: RenderableKind,
    ) -> RenderableId {
        let id = RenderableId(self.next_id);
        self.next_id += 1;

        if let RenderableKind::Bezier(curve) = &mut kind {
            let dangling: Vec<RenderableId> = curve
                .control_points()
                .iter()
                .copied()
                .filter(|point| !self.is_point(*point))
                .collect();
            for point in dangling {
                log::warn!("Dropping control point {} of new curve: not a point", point);
                curve.remove_control_point(point);
            }
        }

        let tag = tag.into();
        log::debug!("Adding {} '{}' as {}", kind.type_name(), tag, id);
        self.renderables
            .push(Renderable::new(id, tag, transform, kind));
        self.regenerate(id);
        id
    }

    /// Removes `id` and prunes it from every curve's control points.
    pub fn remove_renderable(&mut self, id: RenderableId) -> Option<Removal> {
        let index = self.index_of(id)?;
        let renderable = self.renderables.remove(index);

        let mut dependents = Vec::new();
        for other in &mut self.renderables {
            let other_id = other.id();
            if let Some(curve) = other.as_bezier_mut() {
                if curve.remove_control_point(id) {
                    dependents.push(other_id);
                }
            }
        }

        log::debug!(
            "Removed {} '{}' ({} dependent curves)",
            id,
            renderable.tag,
            dependents.len()
        );
        Some(Removal {
            renderable,
            dependents,
        })
    }

    pub fn clear(&mut self) {
        log::info!("Clearing scene ({} renderables)", self.renderables.len());
        self.renderables.clear();
    }

    pub fn is_point(&self, id: RenderableId) -> bool {
        self.get(id).is_some_and(Renderable::is_point)
    }

    /// Curves that use `id` as a control point.
    pub fn dependents_of(&self, id: RenderableId) -> Vec<RenderableId> {
        self.renderables
            .iter()
            .filter(|renderable| {
                renderable
                    .as_bezier()
                    .is_some_and(|curve| curve.references(id))
            })
            .map(Renderable::id)
            .collect()
    }

    /// Adds `point` to the control points of `curve`. Returns false when
    /// `curve` is not a curve, `point` is not a point, or it is already used.
    pub fn insert_control_point(&mut self, curve: RenderableId, point: RenderableId) -> bool {
        if !self.is_point(point) {
            log::warn!("Ignoring control point {}: not a point in the scene", point);
            return false;
        }
        let inserted = self
            .get_mut(curve)
            .and_then(Renderable::as_bezier_mut)
            .is_some_and(|bezier| bezier.insert_control_point(point));
        if inserted {
            self.regenerate(curve);
        }
        inserted
    }

    pub fn remove_control_point(&mut self, curve: RenderableId, point: RenderableId) -> bool {
        let removed = self
            .get_mut(curve)
            .and_then(Renderable::as_bezier_mut)
            .is_some_and(|bezier| bezier.remove_control_point(point));
        if removed {
            self.regenerate(curve);
        }
        removed
    }

    /// World positions of a curve's control points. Ids that no longer
    /// resolve to a point are skipped.
    pub fn control_positions(&self, curve: &BezierCurve) -> Vec<Vec3> {
        curve
            .control_points()
            .iter()
            .filter_map(|id| match self.get(*id) {
                Some(renderable) if renderable.is_point() => {
                    Some(renderable.transform.world_position)
                }
                _ => {
                    log::warn!("Control point {} is missing; skipping it", id);
                    None
                }
            })
            .collect()
    }

    /// Rebuilds the mesh of `id`. Returns false if the id does not resolve.
    pub fn regenerate(&mut self, id: RenderableId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let positions = match self.renderables[index].as_bezier() {
            Some(curve) => self.control_positions(curve),
            None => Vec::new(),
        };
        let samples = self.curve_samples;
        self.renderables[index].regenerate_data(&positions, samples);
        true
    }

    /// Rebuilds every curve that uses `id` as a control point.
    pub fn regenerate_dependents(&mut self, id: RenderableId) -> Vec<RenderableId> {
        let dependents = self.dependents_of(id);
        for curve in &dependents {
            self.regenerate(*curve);
        }
        dependents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_point(scene: &mut Scene, position: Vec3) -> RenderableId {
        scene.add_renderable(
            "Point",
            Transform::at(position, Vec3::ZERO),
            RenderableKind::Point(PointParams::default()),
        )
    }

    fn add_curve(scene: &mut Scene, kind: BezierKind, points: &[RenderableId]) -> RenderableId {
        scene.add_renderable(
            kind.label(),
            Transform::default(),
            RenderableKind::Bezier(BezierCurve::new(kind, points.iter().copied())),
        )
    }

    #[test]
    fn ids_are_unique_and_order_is_preserved() {
        let mut scene = Scene::new();
        let a = add_point(&mut scene, Vec3::ZERO);
        let b = scene.add_renderable(
            "Torus",
            Transform::default(),
            RenderableKind::Torus(TorusParams::default()),
        );
        let c = add_point(&mut scene, Vec3::X);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(scene.index_of(c), Some(2));
        assert_eq!(scene.id_at(1), Some(b));
        assert!(!scene.get(b).map(|r| r.mesh().is_empty()).unwrap_or(true));
    }

    #[test]
    fn clear_invalidates_old_ids() {
        let mut scene = Scene::new();
        let old = add_point(&mut scene, Vec3::ZERO);
        scene.clear();
        assert!(scene.is_empty());
        let new = add_point(&mut scene, Vec3::ZERO);
        assert_ne!(old, new);
        assert!(scene.get(old).is_none());
    }

    #[test]
    fn removing_a_control_point_prunes_and_reports_dependents() {
        let mut scene = Scene::new();
        let removed_at = Vec3::new(1.0, 2.0, 0.0);
        let points: Vec<RenderableId> = [Vec3::ZERO, removed_at, Vec3::X * 2.0, Vec3::X * 3.0]
            .into_iter()
            .map(|position| add_point(&mut scene, position))
            .collect();
        let curve = add_curve(&mut scene, BezierKind::C0, &points);
        scene
            .get_mut(curve)
            .and_then(Renderable::as_bezier_mut)
            .unwrap()
            .show_polygon = true;
        assert!(scene.regenerate(curve));
        let touches_removed = |scene: &Scene| {
            scene
                .get(curve)
                .unwrap()
                .mesh()
                .vertices
                .iter()
                .any(|vertex| (Vec3::from_array(vertex.position) - removed_at).length() < 1e-5)
        };
        assert!(touches_removed(&scene));
        let torus = scene.add_renderable(
            "Torus",
            Transform::default(),
            RenderableKind::Torus(TorusParams::default()),
        );

        let removal = scene.remove_renderable(points[1]).expect("point exists");
        assert_eq!(removal.dependents, vec![curve]);
        assert!(!removal.dependents.contains(&torus));

        let bezier = scene.get(curve).and_then(Renderable::as_bezier).unwrap();
        assert!(!bezier.references(points[1]));
        assert_eq!(bezier.control_points().len(), 3);

        assert!(scene.regenerate(curve));
        assert!(!scene.get(curve).unwrap().mesh().is_empty());
        assert!(!touches_removed(&scene));
    }

    #[test]
    fn dangling_references_are_skipped_when_regenerating() {
        let mut scene = Scene::new();
        let a = add_point(&mut scene, Vec3::ZERO);
        let b = add_point(&mut scene, Vec3::X);
        let curve = add_curve(&mut scene, BezierKind::C0, &[a, b]);
        // Remove without going through the pruning path.
        scene.renderables.retain(|renderable| renderable.id() != b);
        let bezier = scene.get(curve).and_then(Renderable::as_bezier).unwrap().clone();
        assert_eq!(scene.control_positions(&bezier), vec![Vec3::ZERO]);
        assert!(scene.regenerate(curve));
        assert!(scene.get(curve).unwrap().mesh().is_empty());
    }

    #[test]
    fn new_curves_drop_ids_that_are_not_points() {
        let mut scene = Scene::new();
        let point = add_point(&mut scene, Vec3::ZERO);
        let torus = scene.add_renderable(
            "Torus",
            Transform::default(),
            RenderableKind::Torus(TorusParams::default()),
        );
        let curve = add_curve(
            &mut scene,
            BezierKind::C2,
            &[point, torus, RenderableId(999)],
        );
        let bezier = scene.get(curve).and_then(Renderable::as_bezier).unwrap();
        assert_eq!(bezier.control_points(), &[point]);
    }

    #[test]
    fn insert_control_point_requires_a_point() {
        let mut scene = Scene::new();
        let a = add_point(&mut scene, Vec3::ZERO);
        let curve = add_curve(&mut scene, BezierKind::C0, &[a]);
        let torus = scene.add_renderable(
            "Torus",
            Transform::default(),
            RenderableKind::Torus(TorusParams::default()),
        );
        assert!(!scene.insert_control_point(curve, torus));
        assert!(!scene.insert_control_point(curve, RenderableId(77)));
        assert!(!scene.insert_control_point(torus, a));

        let b = add_point(&mut scene, Vec3::Y);
        assert!(scene.insert_control_point(curve, b));
        assert_eq!(scene.dependents_of(b), vec![curve]);
        assert!(!scene.get(curve).unwrap().mesh().is_empty());
    }

    #[test]
    fn moving_a_point_regenerates_dependent_curves() {
        let mut scene = Scene::new();
        let points: Vec<RenderableId> = (0..4)
            .map(|i| add_point(&mut scene, Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        let curve = add_curve(&mut scene, BezierKind::C0, &points);
        let before = scene.get(curve).unwrap().mesh().clone();

        scene
            .get_mut(points[3])
            .unwrap()
            .transform
            .set_world_position(Vec3::new(3.0, 5.0, 0.0), Vec3::ZERO);
        assert_eq!(scene.regenerate_dependents(points[3]), vec![curve]);

        let after = scene.get(curve).unwrap().mesh();
        assert_ne!(&before, after);
        let last = after.vertices.iter().map(|v| v.position[1]).fold(0.0, f32::max);
        assert!((last - 5.0).abs() < 1e-5);
    }
}
