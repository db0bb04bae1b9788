mod options;
mod settings;
mod timing;

pub use options::{Options, OptionsError, DEFAULT_FRAMES, USAGE};
pub use settings::{
    load_or_default, load_settings_from_file, save_settings_to_file, Settings, SettingsError,
};

use crate::editor::{Editor, EditorAction, EditorError, PickModifier, PivotState};
use crate::math::EulerAngles;
use crate::render::{draw_list, HeadlessRenderer, RenderBackend, RenderError};
use crate::scene::{BezierKind, RenderableId};
use crate::ui::{MenuBarState, UiState};
use glam::Vec3;
use std::time::{Duration, Instant};
use timing::FrameTiming;

const SCREEN_SIZE: [f32; 2] = [1280.0, 720.0];
/// Yaw applied to the animated selection each frame, in radians.
const DEMO_YAW_STEP: f32 = 0.01;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("failed to load settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("demo setup failed: {0}")]
    Editor(#[from] EditorError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Renderables created by [`seed_cad_demo`].
#[derive(Debug, Clone)]
pub struct CadDemo {
    pub torus: RenderableId,
    pub c0_points: Vec<RenderableId>,
    pub c0_curve: RenderableId,
    pub c2_points: Vec<RenderableId>,
    pub c2_curve: RenderableId,
}

/// Builds the CAD demo through editor actions: a torus, a C0 curve over
/// four points and a C2 curve over five de Boor points.
pub fn seed_cad_demo(editor: &mut Editor) -> Result<CadDemo, EditorError> {
    editor.apply(EditorAction::ClearScene)?;
    let start_cursor = editor.cursor();

    editor.apply(EditorAction::SetCursor(Vec3::ZERO))?;
    let torus = editor.add_torus();

    let c0_points = add_points(
        editor,
        &[
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(-1.5, 1.0, 0.0),
            Vec3::new(-0.5, 1.0, 0.5),
            Vec3::new(0.0, 0.0, 0.5),
        ],
    )?;
    select(editor, &c0_points)?;
    let c0_curve = editor.create_curve(BezierKind::C0)?;

    let c2_points = add_points(
        editor,
        &[
            Vec3::new(0.5, -1.0, 0.0),
            Vec3::new(1.0, 0.5, 0.0),
            Vec3::new(1.5, -0.5, 0.5),
            Vec3::new(2.0, 1.0, 0.5),
            Vec3::new(2.5, 0.0, 1.0),
        ],
    )?;
    select(editor, &c2_points)?;
    let c2_curve = editor.create_curve(BezierKind::C2)?;

    editor.apply(EditorAction::SetCursor(start_cursor))?;
    log::info!("Seeded CAD demo: {} renderables", editor.scene().len());

    Ok(CadDemo {
        torus,
        c0_points,
        c0_curve,
        c2_points,
        c2_curve,
    })
}

fn add_points(editor: &mut Editor, positions: &[Vec3]) -> Result<Vec<RenderableId>, EditorError> {
    let mut ids = Vec::with_capacity(positions.len());
    for position in positions {
        editor.apply(EditorAction::SetCursor(*position))?;
        ids.push(editor.add_point());
    }
    Ok(ids)
}

/// Replaces the selection with `ids`, in order.
fn select(editor: &mut Editor, ids: &[RenderableId]) -> Result<(), EditorError> {
    let Some((first, rest)) = ids.split_first() else {
        return Ok(());
    };
    editor.apply(EditorAction::Focus(*first))?;
    for id in rest {
        let index = editor
            .scene()
            .index_of(*id)
            .ok_or(EditorError::UnknownRenderable(*id))?;
        editor.apply(EditorAction::Pick {
            index,
            modifier: PickModifier::Multi,
        })?;
    }
    Ok(())
}

pub struct App {
    editor: Editor,
    ui: UiState,
    menu_bar: MenuBarState,
    egui: egui::Context,
    renderer: HeadlessRenderer,
    timing: FrameTiming,
    target_frame_duration: Option<Duration>,
    next_frame_time: Instant,
    pending: Vec<EditorAction>,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        let now = Instant::now();
        Self {
            editor: Editor::new(settings.editor_defaults(), Vec3::from_array(settings.cursor)),
            ui: UiState::new(),
            menu_bar: MenuBarState {
                vsync: settings.vsync,
                demo_label: "CAD".to_string(),
            },
            egui: egui::Context::default(),
            renderer: HeadlessRenderer::new(),
            timing: FrameTiming::new("bezcad".to_string(), now),
            target_frame_duration: settings.target_frame_duration(),
            next_frame_time: now,
            pending: Vec::new(),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn renderer(&self) -> &HeadlessRenderer {
        &self.renderer
    }

    /// Queues an action for the next frame, after the UI's own actions.
    pub fn queue(&mut self, action: EditorAction) {
        self.pending.push(action);
    }

    /// One pass of UI, editing, geometry rebuild and presentation.
    pub fn frame(&mut self, raw_input: egui::RawInput) -> Result<(), RenderError> {
        let frame_start = Instant::now();
        if !self.renderer.begin_frame() {
            return Ok(());
        }

        let mut actions = Vec::new();
        let output = self.egui.run(raw_input, |ctx| {
            actions = self.ui.show(ctx, &self.editor, &mut self.menu_bar);
        });
        let primitives = self.egui.tessellate(output.shapes, output.pixels_per_point);

        actions.append(&mut self.pending);
        self.editor.apply_all(actions);
        self.editor.flush(&mut self.renderer);

        let items = draw_list(self.editor.scene(), self.editor.selection().ids());
        self.renderer.draw(&items)?;
        self.renderer.end_frame();

        log::trace!("UI produced {} clipped primitives", primitives.len());
        self.timing
            .set_update_ms(frame_start.elapsed().as_secs_f32() * 1000.0);
        self.timing.update(Instant::now());
        Ok(())
    }

    /// Runs `frames` frames, pacing to the target rate while VSync is on.
    pub fn run_frames(
        &mut self,
        frames: u64,
        animate: Option<&[RenderableId]>,
    ) -> Result<(), AppError> {
        if let Some(ids) = animate {
            select(&mut self.editor, ids)?;
        }

        for _ in 0..frames {
            if animate.is_some() {
                let pivot = self.editor.pivot();
                self.queue(EditorAction::SetPivot(PivotState {
                    rotation: EulerAngles::new(0.0, DEMO_YAW_STEP, 0.0),
                    ..pivot
                }));
            }

            self.frame(screen_input())?;
            self.wait_for_next_frame();
        }

        let stats = self.renderer.stats();
        log::info!(
            "Ran {} frames: {} buffer rebuilds, {} draws and {} indices in the last frame, {:.1} fps",
            stats.frames,
            stats.buffer_rebuilds,
            stats.last_draw_count,
            stats.last_index_count,
            self.timing.fps()
        );
        Ok(())
    }

    fn wait_for_next_frame(&mut self) {
        let Some(frame_duration) = self.target_frame_duration else {
            return;
        };
        if !self.menu_bar.vsync {
            return;
        }
        let now = Instant::now();
        if now < self.next_frame_time {
            std::thread::sleep(self.next_frame_time - now);
        }
        self.next_frame_time = self.next_frame_time.max(now) + frame_duration;
    }
}

fn screen_input() -> egui::RawInput {
    egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(SCREEN_SIZE[0], SCREEN_SIZE[1]),
        )),
        ..Default::default()
    }
}

/// Binary entry point. `args` excludes the program name.
pub fn run<I, S>(args: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let options = Options::parse(args)?;
    if options.show_help {
        println!("{}", USAGE);
        return Ok(());
    }

    let settings = load_or_default(options.settings_path.as_deref())?;
    log::info!("bezcad - Bezier curve editor");
    log::info!("   Running {} frames", options.frames);

    let mut app = App::new(&settings);
    let demo = seed_cad_demo(app.editor_mut())?;
    app.run_frames(options.frames, Some(demo.c2_points.as_slice()))?;

    log::info!("Goodbye!");
    Ok(())
}
