//! egui panels. The UI never mutates the scene: it reads the editor and
//! returns the actions the user triggered this frame.

use crate::editor::{Editor, EditorAction, PickModifier};
use crate::math::EulerAngles;
use crate::scene::geometry::de_boor_to_bernstein;
use crate::scene::{BezierCurve, BezierKind, Renderable, RenderableId, RenderableKind};
use glam::Vec3;

/// Values owned by the menu bar.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuBarState {
    pub vsync: bool,
    pub demo_label: String,
}

pub struct UiState {
    name_buffer: String,
    name_owner: Option<RenderableId>,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        Self {
            name_buffer: String::new(),
            name_owner: None,
        }
    }

    pub fn name_buffer(&self) -> &str {
        &self.name_buffer
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        editor: &Editor,
        menu_bar: &mut MenuBarState,
    ) -> Vec<EditorAction> {
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("main_menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Settings", |ui| {
                    if ui.checkbox(&mut menu_bar.vsync, "VSync").changed() {
                        log::info!("VSync {}", if menu_bar.vsync { "on" } else { "off" });
                    }
                });
                ui.separator();
                ui.label(format!("Demo: {}", menu_bar.demo_label));
            });
        });

        egui::SidePanel::right("editor_menu")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Menu");
                scene_buttons(ui, editor, &mut actions);
                ui.separator();
                renderable_list(ui, editor, &mut actions);

                if !editor.selection().is_empty() {
                    ui.separator();
                }
                match editor.selection().single() {
                    Some(id) => {
                        if let Some(renderable) = editor.scene().get(id) {
                            self.single_selection(ui, editor, renderable, &mut actions);
                        }
                    }
                    None if editor.selection().len() > 1 => {
                        multi_selection(ui, editor, &mut actions);
                    }
                    None => {}
                }
            });

        actions
    }

    fn single_selection(
        &mut self,
        ui: &mut egui::Ui,
        editor: &Editor,
        renderable: &Renderable,
        actions: &mut Vec<EditorAction>,
    ) {
        let id = renderable.id();
        if self.name_owner != Some(id) {
            self.name_owner = Some(id);
            self.name_buffer = renderable.tag.clone();
        }

        ui.label(format!("Selected item: {}", renderable.tag));
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.name_buffer);
            if ui.button("Rename").clicked() {
                actions.push(EditorAction::Rename {
                    id,
                    tag: self.name_buffer.clone(),
                });
            }
        });

        let transform = renderable.transform;
        let mut local = transform.local_position.to_array();
        if vec3_row(ui, "Local position", &mut local, 0.01) {
            actions.push(EditorAction::SetLocalPosition {
                id,
                position: Vec3::from_array(local),
            });
        }
        let mut world = transform.world_position.to_array();
        if vec3_row(ui, "World position", &mut world, 0.01) {
            actions.push(EditorAction::SetWorldPosition {
                id,
                position: Vec3::from_array(world),
            });
        }
        let mut rotation = transform.rotation;
        if angles_row(ui, "Rotation", &mut rotation) {
            actions.push(EditorAction::SetRotation { id, rotation });
        }
        let mut scale = transform.scale;
        ui.horizontal(|ui| {
            ui.label("Scale");
            if ui.add(egui::DragValue::new(&mut scale).speed(0.01)).changed() {
                actions.push(EditorAction::SetScale { id, scale });
            }
        });

        ui.add_space(4.0);
        match &renderable.kind {
            RenderableKind::Torus(params) => {
                let mut params = *params;
                let mut changed = false;
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.major_radius, 0.0..=1.0)
                            .text("Major radius"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.minor_radius, 0.0..=1.0)
                            .text("Minor radius"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.major_segments, 3..=100)
                            .text("Major segments"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.minor_segments, 3..=100)
                            .text("Minor segments"),
                    )
                    .changed();
                if changed {
                    actions.push(EditorAction::SetTorusParams { id, params });
                }
            }
            RenderableKind::Point(params) => {
                let mut params = *params;
                let mut changed = false;
                changed |= ui
                    .add(egui::Slider::new(&mut params.radius, 0.1..=10.0).text("Radius"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.segments, 1..=100).text("Segments"))
                    .changed();
                if changed {
                    actions.push(EditorAction::SetPointParams { id, params });
                }
            }
            RenderableKind::Bezier(curve) => bezier_editor(ui, editor, id, curve, actions),
        }
    }
}

fn scene_buttons(ui: &mut egui::Ui, editor: &Editor, actions: &mut Vec<EditorAction>) {
    ui.horizontal(|ui| {
        if ui.button("Add Torus").clicked() {
            actions.push(EditorAction::AddTorus);
        }
        if ui.button("Add Point").clicked() {
            actions.push(EditorAction::AddPoint);
        }
        if ui.button("Clear Demo").clicked() {
            actions.push(EditorAction::ClearScene);
        }
    });

    let mut cursor = editor.cursor().to_array();
    if vec3_row(ui, "Cursor", &mut cursor, 0.01) {
        actions.push(EditorAction::SetCursor(Vec3::from_array(cursor)));
    }

    let can_delete = !editor.selection().is_empty();
    if ui
        .add_enabled(can_delete, egui::Button::new("Delete selected"))
        .clicked()
    {
        actions.push(EditorAction::DeleteSelected);
    }
}

fn renderable_list(ui: &mut egui::Ui, editor: &Editor, actions: &mut Vec<EditorAction>) {
    let modifier = pick_modifier(ui.input(|input| input.modifiers));
    egui::ScrollArea::vertical()
        .id_salt("renderables")
        .max_height(240.0)
        .show(ui, |ui| {
            for (index, renderable) in editor.scene().renderables().iter().enumerate() {
                let selected = editor.selection().contains(renderable.id());
                if ui.selectable_label(selected, &renderable.tag).clicked() {
                    actions.push(EditorAction::Pick { index, modifier });
                }
            }
        });
}

fn bezier_editor(
    ui: &mut egui::Ui,
    editor: &Editor,
    id: RenderableId,
    curve: &BezierCurve,
    actions: &mut Vec<EditorAction>,
) {
    let mut show_polygon = curve.show_polygon;
    if ui.checkbox(&mut show_polygon, "Toggle Polygon").changed() {
        actions.push(EditorAction::SetPolygonVisible {
            id,
            visible: show_polygon,
        });
    }

    ui.label("Control points:");
    let title = match curve.kind {
        BezierKind::C0 => "Bernstein points",
        BezierKind::C2 => "de Boor points",
    };
    egui::CollapsingHeader::new(title)
        .default_open(true)
        .show(ui, |ui| {
            for (i, point) in curve.control_points().iter().enumerate() {
                ui.push_id(point.0, |ui| {
                    ui.horizontal(|ui| {
                        if ui.small_button("X").clicked() {
                            actions.push(EditorAction::RemoveControlPoint {
                                curve: id,
                                point: *point,
                            });
                        }
                        if ui.small_button("Edit").clicked() {
                            actions.push(EditorAction::Focus(*point));
                        }
                        ui.label(format!("- Point {}", i));
                    });
                });
            }
        });

    if curve.kind == BezierKind::C2 {
        egui::CollapsingHeader::new("Bernstein points").show(ui, |ui| {
            let de_boor = editor.scene().control_positions(curve);
            let spans = de_boor_to_bernstein(&de_boor);
            if spans.is_empty() {
                ui.label("Needs at least 4 de Boor points");
            }
            for (span, points) in spans.iter().enumerate() {
                for (i, point) in points.iter().enumerate() {
                    ui.label(format!(
                        "Span {} b{}: ({:.3}, {:.3}, {:.3})",
                        span, i, point.x, point.y, point.z
                    ));
                }
            }
        });
    }
}

fn multi_selection(ui: &mut egui::Ui, editor: &Editor, actions: &mut Vec<EditorAction>) {
    ui.label(format!("{} items selected", editor.selection().len()));

    if editor.can_create_curve() {
        ui.horizontal(|ui| {
            if ui.button("Add Bezier C0").clicked() {
                actions.push(EditorAction::CreateBezier(BezierKind::C0));
            }
            if ui.button("Add Bezier C2").clicked() {
                actions.push(EditorAction::CreateBezier(BezierKind::C2));
            }
        });
    }

    let mut pivot = editor.pivot();
    let mut changed = false;
    let mut position = pivot.position.to_array();
    if vec3_row(ui, "Pivot position", &mut position, 0.01) {
        pivot.position = Vec3::from_array(position);
        changed = true;
    }
    changed |= angles_row(ui, "Pivot rotation", &mut pivot.rotation);
    ui.horizontal(|ui| {
        ui.label("Pivot scale");
        changed |= ui
            .add(egui::DragValue::new(&mut pivot.scale).speed(0.01))
            .changed();
    });

    if changed {
        actions.push(EditorAction::SetPivot(pivot));
    }
}

/// Maps held keys to a list pick. Shift wins over ctrl.
pub fn pick_modifier(modifiers: egui::Modifiers) -> PickModifier {
    if modifiers.shift {
        PickModifier::Range
    } else if modifiers.command || modifiers.ctrl {
        PickModifier::Multi
    } else {
        PickModifier::None
    }
}

fn vec3_row(ui: &mut egui::Ui, label: &str, values: &mut [f32; 3], speed: f64) -> bool {
    ui.label(label);
    ui.horizontal(|ui| {
        let mut changed = false;
        for (value, prefix) in values.iter_mut().zip(["x: ", "y: ", "z: "]) {
            changed |= ui
                .add(egui::DragValue::new(value).speed(speed).prefix(prefix))
                .changed();
        }
        changed
    })
    .inner
}

fn angles_row(ui: &mut egui::Ui, label: &str, angles: &mut EulerAngles) -> bool {
    ui.label(label);
    ui.horizontal(|ui| {
        let mut changed = false;
        for (value, name) in [
            (&mut angles.pitch, "pitch"),
            (&mut angles.yaw, "yaw"),
            (&mut angles.roll, "roll"),
        ] {
            ui.label(name);
            changed |= ui.drag_angle(value).changed();
        }
        changed
    })
    .inner
}
