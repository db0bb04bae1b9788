//! CPU-side geometry for renderables.
//!
//! Every generator returns a [`Mesh`] in the renderable's own space. The
//! renderer packs meshes into shared buffers and applies model matrices at
//! draw time.

use glam::Vec3;
use std::f32::consts::TAU;

pub const CURVE_COLOR: [f32; 3] = [1.0, 0.85, 0.2];
pub const POLYGON_COLOR: [f32; 3] = [0.45, 0.45, 0.5];
pub const TORUS_COLOR: [f32; 3] = [0.8, 0.8, 0.85];
pub const POINT_COLOR: [f32; 3] = [1.0, 0.35, 0.35];

/// Point radius slider is in hundredths of a scene unit.
const POINT_RADIUS_SCALE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Line-list mesh: every pair of indices is one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn push_vertex(&mut self, position: Vec3, color: [f32; 3]) -> u32 {
        self.vertices.push(Vertex {
            position: position.to_array(),
            color,
        });
        (self.vertices.len() - 1) as u32
    }

    /// Appends a connected polyline as line-list segments.
    pub fn push_polyline(&mut self, points: &[Vec3], color: [f32; 3]) {
        if points.len() < 2 {
            return;
        }
        let base = self.vertices.len() as u32;
        for point in points {
            self.push_vertex(*point, color);
        }
        for offset in 0..(points.len() as u32 - 1) {
            self.indices.push(base + offset);
            self.indices.push(base + offset + 1);
        }
    }
}

pub fn torus_mesh(
    major_radius: f32,
    minor_radius: f32,
    major_segments: u32,
    minor_segments: u32,
) -> Mesh {
    let major_segments = major_segments.max(3);
    let minor_segments = minor_segments.max(3);
    let mut mesh = Mesh::default();

    for i in 0..major_segments {
        let u = TAU * i as f32 / major_segments as f32;
        let (sin_u, cos_u) = u.sin_cos();
        for j in 0..minor_segments {
            let v = TAU * j as f32 / minor_segments as f32;
            let (sin_v, cos_v) = v.sin_cos();
            let ring = major_radius + minor_radius * cos_v;
            mesh.push_vertex(
                Vec3::new(ring * cos_u, minor_radius * sin_v, ring * sin_u),
                TORUS_COLOR,
            );
        }
    }

    let index = |i: u32, j: u32| (i % major_segments) * minor_segments + (j % minor_segments);
    for i in 0..major_segments {
        for j in 0..minor_segments {
            // minor circle
            mesh.indices.push(index(i, j));
            mesh.indices.push(index(i, j + 1));
            // along the major circle
            mesh.indices.push(index(i, j));
            mesh.indices.push(index(i + 1, j));
        }
    }

    mesh
}

/// Wire sphere marker drawn for a point renderable.
pub fn point_mesh(radius: f32, segments: u32) -> Mesh {
    let radius = radius * POINT_RADIUS_SCALE;
    let rings = segments.max(1) + 1;
    let sectors = (segments * 2).max(3);
    let mut mesh = Mesh::default();

    for ring in 0..=rings {
        let theta = std::f32::consts::PI * ring as f32 / rings as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for sector in 0..sectors {
            let phi = TAU * sector as f32 / sectors as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            mesh.push_vertex(
                Vec3::new(radius * sin_t * cos_p, radius * cos_t, radius * sin_t * sin_p),
                POINT_COLOR,
            );
        }
    }

    let index = |ring: u32, sector: u32| ring * sectors + (sector % sectors);
    for ring in 0..=rings {
        for sector in 0..sectors {
            if ring > 0 && ring < rings {
                mesh.indices.push(index(ring, sector));
                mesh.indices.push(index(ring, sector + 1));
            }
            if ring < rings {
                mesh.indices.push(index(ring, sector));
                mesh.indices.push(index(ring + 1, sector));
            }
        }
    }

    mesh
}

/// Evaluates a Bezier segment of any degree with de Casteljau's algorithm.
pub fn de_casteljau(control: &[Vec3], t: f32) -> Vec3 {
    let mut work: Vec<Vec3> = control.to_vec();
    let Some(degree) = work.len().checked_sub(1) else {
        return Vec3::ZERO;
    };
    for level in 0..degree {
        for i in 0..(degree - level) {
            work[i] = work[i].lerp(work[i + 1], t);
        }
    }
    work[0]
}

/// Splits C0 control points into cubic segments sharing their end points.
/// The last segment drops to quadratic or linear when points run out.
pub fn c0_segments(control: &[Vec3]) -> Vec<&[Vec3]> {
    let mut segments = Vec::new();
    if control.len() < 2 {
        return segments;
    }
    let mut start = 0;
    while start + 1 < control.len() {
        let end = (start + 3).min(control.len() - 1);
        segments.push(&control[start..=end]);
        start = end;
    }
    segments
}

/// Bernstein points of a uniform cubic B-spline, four per span.
pub fn de_boor_to_bernstein(de_boor: &[Vec3]) -> Vec<[Vec3; 4]> {
    de_boor
        .windows(4)
        .map(|d| {
            [
                (d[0] + 4.0 * d[1] + d[2]) / 6.0,
                (2.0 * d[1] + d[2]) / 3.0,
                (d[1] + 2.0 * d[2]) / 3.0,
                (d[1] + 4.0 * d[2] + d[3]) / 6.0,
            ]
        })
        .collect()
}

fn sample_segment(segment: &[Vec3], samples: u32, out: &mut Vec<Vec3>) {
    let samples = samples.max(1);
    let skip_first = !out.is_empty();
    for step in 0..=samples {
        if skip_first && step == 0 {
            continue;
        }
        out.push(de_casteljau(segment, step as f32 / samples as f32));
    }
}

pub fn bezier_c0_mesh(control: &[Vec3], samples_per_segment: u32, polygon: bool) -> Mesh {
    let mut curve = Vec::new();
    for segment in c0_segments(control) {
        sample_segment(segment, samples_per_segment, &mut curve);
    }

    let mut mesh = Mesh::default();
    mesh.push_polyline(&curve, CURVE_COLOR);
    if polygon {
        mesh.push_polyline(control, POLYGON_COLOR);
    }
    mesh
}

pub fn bezier_c2_mesh(de_boor: &[Vec3], samples_per_segment: u32, polygon: bool) -> Mesh {
    let mut curve = Vec::new();
    for span in de_boor_to_bernstein(de_boor) {
        sample_segment(&span, samples_per_segment, &mut curve);
    }

    let mut mesh = Mesh::default();
    mesh.push_polyline(&curve, CURVE_COLOR);
    if polygon {
        mesh.push_polyline(de_boor, POLYGON_COLOR);
    }
    mesh
}
