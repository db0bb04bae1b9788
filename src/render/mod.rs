//! Renderer capability consumed by the editor.
//!
//! The editor never issues draw calls itself: it asks a [`RenderBackend`] to
//! rebuild geometry buffers after meshes change and hands it a draw list per
//! frame. [`HeadlessRenderer`] packs everything on the CPU and records frame
//! statistics; a GPU backend would upload the same buffers.

use crate::scene::geometry::Vertex;
use crate::scene::{RenderableId, Scene};
use glam::Mat4;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("draw submitted outside of a frame")]
    FrameNotStarted,
    #[error("renderable {0} has no geometry range; rebuild buffers first")]
    MissingRange(RenderableId),
}

/// Slice of the shared index buffer owned by one renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRange {
    pub id: RenderableId,
    pub first_index: u32,
    pub index_count: u32,
}

/// Every renderable mesh packed into one vertex and one index buffer.
/// Indices are absolute into `vertices`.
#[derive(Debug, Clone, Default)]
pub struct GeometryBuffers {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    ranges: Vec<MeshRange>,
}

impl GeometryBuffers {
    pub fn build(scene: &Scene) -> Self {
        let mut buffers = Self::default();
        for renderable in scene.renderables() {
            let mesh = renderable.mesh();
            let base_vertex = buffers.vertices.len() as u32;
            let first_index = buffers.indices.len() as u32;
            buffers.vertices.extend_from_slice(&mesh.vertices);
            buffers
                .indices
                .extend(mesh.indices.iter().map(|index| index + base_vertex));
            buffers.ranges.push(MeshRange {
                id: renderable.id(),
                first_index,
                index_count: mesh.indices.len() as u32,
            });
        }
        buffers
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn ranges(&self) -> &[MeshRange] {
        &self.ranges
    }

    pub fn range_of(&self, id: RenderableId) -> Option<MeshRange> {
        self.ranges.iter().find(|range| range.id == id).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub id: RenderableId,
    pub model: Mat4,
    pub selected: bool,
}

/// One draw per renderable with a non-empty mesh, in scene order. Model
/// matrices are taken from the current transforms, so pure transform edits
/// never need a buffer rebuild.
pub fn draw_list(scene: &Scene, selected: &[RenderableId]) -> Vec<DrawItem> {
    scene
        .renderables()
        .iter()
        .filter(|renderable| !renderable.mesh().is_empty())
        .map(|renderable| DrawItem {
            id: renderable.id(),
            model: renderable.transform.model_matrix(),
            selected: selected.contains(&renderable.id()),
        })
        .collect()
}

pub trait RenderBackend {
    /// Re-packs geometry after any renderable regenerated its mesh.
    fn build_geometry_buffers(&mut self, scene: &Scene);
    /// Returns false if the frame should be skipped.
    fn begin_frame(&mut self) -> bool;
    fn draw(&mut self, items: &[DrawItem]) -> Result<(), RenderError>;
    fn end_frame(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub buffer_rebuilds: u64,
    pub last_draw_count: usize,
    pub last_index_count: u64,
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    buffers: GeometryBuffers,
    in_frame: bool,
    stats: FrameStats,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

impl RenderBackend for HeadlessRenderer {
    fn build_geometry_buffers(&mut self, scene: &Scene) {
        self.buffers = GeometryBuffers::build(scene);
        self.stats.buffer_rebuilds += 1;
        log::debug!(
            "Geometry buffers rebuilt: {} vertices, {} indices, {} ranges",
            self.buffers.vertices.len(),
            self.buffers.indices.len(),
            self.buffers.ranges.len()
        );
    }

    fn begin_frame(&mut self) -> bool {
        self.in_frame = true;
        self.stats.last_draw_count = 0;
        self.stats.last_index_count = 0;
        true
    }

    fn draw(&mut self, items: &[DrawItem]) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::FrameNotStarted);
        }
        for item in items {
            let range = self
                .buffers
                .range_of(item.id)
                .ok_or(RenderError::MissingRange(item.id))?;
            self.stats.last_draw_count += 1;
            self.stats.last_index_count += u64::from(range.index_count);
        }
        Ok(())
    }

    fn end_frame(&mut self) {
        self.in_frame = false;
        self.stats.frames += 1;
        log::trace!(
            "Frame {}: {} draws, {} indices",
            self.stats.frames,
            self.stats.last_draw_count,
            self.stats.last_index_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{PointParams, RenderableKind, TorusParams, Transform};
    use glam::Vec3;

    fn sample_scene() -> (Scene, RenderableId, RenderableId) {
        let mut scene = Scene::new();
        let torus = scene.add_renderable(
            "Torus",
            Transform::default(),
            RenderableKind::Torus(TorusParams::default()),
        );
        let point = scene.add_renderable(
            "Point",
            Transform::at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO),
            RenderableKind::Point(PointParams::default()),
        );
        (scene, torus, point)
    }

    #[test]
    fn packing_offsets_indices_per_mesh() {
        let (scene, torus, point) = sample_scene();
        let buffers = GeometryBuffers::build(&scene);
        let range_ids: Vec<RenderableId> = buffers.ranges().iter().map(|range| range.id).collect();
        assert_eq!(range_ids, vec![torus, point]);
        let torus_range = buffers.range_of(torus).unwrap();
        let point_range = buffers.range_of(point).unwrap();
        assert_eq!(torus_range.first_index, 0);
        assert_eq!(point_range.first_index, torus_range.index_count);

        let torus_vertices = scene.get(torus).unwrap().mesh().vertices.len() as u32;
        let first_point_index = buffers.indices()[point_range.first_index as usize];
        assert!(first_point_index >= torus_vertices);
        assert!(buffers
            .indices()
            .iter()
            .all(|index| (*index as usize) < buffers.vertices().len()));
    }

    #[test]
    fn draw_list_uses_current_transforms() {
        let (scene, _, point) = sample_scene();
        let items = draw_list(&scene, &[point]);
        assert_eq!(items.len(), 2);
        let point_item = items.iter().find(|item| item.id == point).unwrap();
        assert!(point_item.selected);
        assert_eq!(point_item.model.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn headless_renderer_counts_frames() {
        let (scene, _, _) = sample_scene();
        let mut renderer = HeadlessRenderer::new();
        let items = draw_list(&scene, &[]);

        assert!(matches!(
            renderer.draw(&items),
            Err(RenderError::FrameNotStarted)
        ));

        renderer.build_geometry_buffers(&scene);
        assert!(renderer.begin_frame());
        renderer.draw(&items).unwrap();
        renderer.end_frame();

        let stats = renderer.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.buffer_rebuilds, 1);
        assert_eq!(stats.last_draw_count, 2);
        assert_eq!(stats.last_index_count, renderer.buffers().indices().len() as u64);
    }

    #[test]
    fn stale_buffers_are_reported() {
        let (mut scene, _, _) = sample_scene();
        let mut renderer = HeadlessRenderer::new();
        renderer.build_geometry_buffers(&scene);
        let extra = scene.add_renderable(
            "Torus",
            Transform::default(),
            RenderableKind::Torus(TorusParams::default()),
        );
        renderer.begin_frame();
        let result = renderer.draw(&draw_list(&scene, &[]));
        assert!(matches!(result, Err(RenderError::MissingRange(id)) if id == extra));
    }
}
