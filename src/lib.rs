//! bezcad - interactive editor for tori, points and Bezier curves.
//!
//! The [`editor::Editor`] owns the scene and applies [`editor::EditorAction`]s
//! produced by the egui panels in [`ui`]. Geometry is regenerated on the CPU
//! and handed to a [`render::RenderBackend`].

pub mod app;
pub mod editor;
pub mod math;
pub mod render;
pub mod scene;
pub mod ui;
