use crate::math::{compose_model_matrix, EulerAngles, ModelParts};
use crate::scene::geometry::{self, Mesh};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a renderable inside a [`crate::scene::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableId(pub u32);

impl fmt::Display for RenderableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position, rotation and uniform scale of a renderable.
///
/// `world_position` and `local_position` are tied by
/// `world == local - cursor`; the setters keep the pair consistent
/// against the cursor position at the time of the edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub local_position: Vec3,
    pub world_position: Vec3,
    pub rotation: EulerAngles,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            local_position: Vec3::ZERO,
            world_position: Vec3::ZERO,
            rotation: EulerAngles::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn at(world_position: Vec3, cursor: Vec3) -> Self {
        let mut transform = Self::default();
        transform.set_world_position(world_position, cursor);
        transform
    }

    pub fn set_local_position(&mut self, local: Vec3, cursor: Vec3) {
        self.local_position = local;
        self.world_position = local - cursor;
    }

    pub fn set_world_position(&mut self, world: Vec3, cursor: Vec3) {
        self.world_position = world;
        self.local_position = world + cursor;
    }

    pub fn model_matrix(&self) -> Mat4 {
        compose_model_matrix(&ModelParts::local(
            self.scale,
            self.rotation,
            self.world_position,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorusParams {
    pub major_radius: f32,
    pub minor_radius: f32,
    pub major_segments: u32,
    pub minor_segments: u32,
}

impl TorusParams {
    pub const RADIUS_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;
    pub const SEGMENT_RANGE: std::ops::RangeInclusive<u32> = 3..=100;

    pub fn clamped(self) -> Self {
        Self {
            major_radius: clamp_range(self.major_radius, &Self::RADIUS_RANGE),
            minor_radius: clamp_range(self.minor_radius, &Self::RADIUS_RANGE),
            major_segments: clamp_range(self.major_segments, &Self::SEGMENT_RANGE),
            minor_segments: clamp_range(self.minor_segments, &Self::SEGMENT_RANGE),
        }
    }
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            major_radius: 0.5,
            minor_radius: 0.2,
            major_segments: 32,
            minor_segments: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointParams {
    pub radius: f32,
    pub segments: u32,
}

impl PointParams {
    pub const RADIUS_RANGE: std::ops::RangeInclusive<f32> = 0.1..=10.0;
    pub const SEGMENT_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

    pub fn clamped(self) -> Self {
        Self {
            radius: clamp_range(self.radius, &Self::RADIUS_RANGE),
            segments: clamp_range(self.segments, &Self::SEGMENT_RANGE),
        }
    }
}

impl Default for PointParams {
    fn default() -> Self {
        Self {
            radius: 2.0,
            segments: 6,
        }
    }
}

fn clamp_range<T: PartialOrd + Copy>(value: T, range: &std::ops::RangeInclusive<T>) -> T {
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BezierKind {
    /// Piecewise cubic Bezier, control points shared at segment joints.
    C0,
    /// Uniform cubic B-spline; control points are de Boor points.
    C2,
}

impl BezierKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::C0 => "Bezier C0",
            Self::C2 => "Bezier C2",
        }
    }
}

/// Bezier curve referencing point renderables by id.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve {
    pub kind: BezierKind,
    pub show_polygon: bool,
    control_points: Vec<RenderableId>,
}

impl BezierCurve {
    pub fn new(kind: BezierKind, control_points: impl IntoIterator<Item = RenderableId>) -> Self {
        let mut curve = Self {
            kind,
            show_polygon: false,
            control_points: Vec::new(),
        };
        for id in control_points {
            curve.insert_control_point(id);
        }
        curve
    }

    pub fn control_points(&self) -> &[RenderableId] {
        &self.control_points
    }

    /// Appends `id`; returns false if it was already present.
    pub fn insert_control_point(&mut self, id: RenderableId) -> bool {
        if self.control_points.contains(&id) {
            return false;
        }
        self.control_points.push(id);
        true
    }

    pub fn remove_control_point(&mut self, id: RenderableId) -> bool {
        let before = self.control_points.len();
        self.control_points.retain(|existing| *existing != id);
        self.control_points.len() != before
    }

    pub fn references(&self, id: RenderableId) -> bool {
        self.control_points.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderableKind {
    Torus(TorusParams),
    Point(PointParams),
    Bezier(BezierCurve),
}

impl RenderableKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Torus(_) => "Torus",
            Self::Point(_) => "Point",
            Self::Bezier(curve) => curve.kind.label(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderable {
    id: RenderableId,
    pub tag: String,
    pub transform: Transform,
    pub kind: RenderableKind,
    mesh: Mesh,
}

impl Renderable {
    pub(crate) fn new(
        id: RenderableId,
        tag: String,
        transform: Transform,
        kind: RenderableKind,
    ) -> Self {
        Self {
            id,
            tag,
            transform,
            kind,
            mesh: Mesh::default(),
        }
    }

    pub fn id(&self) -> RenderableId {
        self.id
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, RenderableKind::Point(_))
    }

    pub fn as_bezier(&self) -> Option<&BezierCurve> {
        match &self.kind {
            RenderableKind::Bezier(curve) => Some(curve),
            _ => None,
        }
    }

    pub fn as_bezier_mut(&mut self) -> Option<&mut BezierCurve> {
        match &mut self.kind {
            RenderableKind::Bezier(curve) => Some(curve),
            _ => None,
        }
    }

    /// Rebuilds the mesh from the parametric fields. `control_positions`
    /// are the resolved world positions of a curve's control points and
    /// are ignored for other kinds.
    pub fn regenerate_data(&mut self, control_positions: &[Vec3], samples_per_segment: u32) {
        self.mesh = match &self.kind {
            RenderableKind::Torus(params) => geometry::torus_mesh(
                params.major_radius,
                params.minor_radius,
                params.major_segments,
                params.minor_segments,
            ),
            RenderableKind::Point(params) => geometry::point_mesh(params.radius, params.segments),
            RenderableKind::Bezier(curve) => match curve.kind {
                BezierKind::C0 => geometry::bezier_c0_mesh(
                    control_positions,
                    samples_per_segment,
                    curve.show_polygon,
                ),
                BezierKind::C2 => geometry::bezier_c2_mesh(
                    control_positions,
                    samples_per_segment,
                    curve.show_polygon,
                ),
            },
        };
    }
}
