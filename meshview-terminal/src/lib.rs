/// Terminal front end: key presses drive the transform engine, engine
/// notifications drive an ASCII wireframe view
use crossterm::{
    cursor,
    event::{self, Event as TermEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use meshview_core::{Face, MeshData, Notification, TransformEngine};
use nalgebra::Point3;
use std::cell::RefCell;
use std::io::{self, stdout, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::info;

pub mod controls;
pub mod renderer;

pub use controls::{Action, Controls, FrameInput};
pub use renderer::{AsciiRenderer, Viewport};

/// What the view currently shows: copies of the engine's mesh data
#[derive(Debug, Default)]
pub struct Scene {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
    /// Last load failure, shown in the status line
    pub message: Option<String>,
    /// Set when a new model arrived and the viewport must be fitted again
    pub refit: bool,
}

impl Scene {
    /// Hook a scene up to an engine's notifications
    pub fn attach(engine: &mut TransformEngine) -> Rc<RefCell<Scene>> {
        let scene = Rc::new(RefCell::new(Scene::default()));
        let sink = Rc::clone(&scene);
        engine.subscribe(move |notification| sink.borrow_mut().apply(notification));
        scene
    }

    fn apply(&mut self, notification: Notification<'_>) {
        match notification {
            Notification::ModelLoaded { vertices, faces } => {
                self.vertices = vertices.to_vec();
                self.faces = faces.to_vec();
                self.message = None;
                self.refit = true;
            }
            Notification::ModelUpdated { vertices } => {
                self.vertices.clear();
                self.vertices.extend_from_slice(vertices);
            }
            Notification::LoadFailed { error, path } => {
                self.message = Some(format!("{}: {}", path.display(), error));
            }
        }
    }
}

/// Main application struct for the terminal model viewer
pub struct TerminalApp {
    engine: TransformEngine,
    scene: Rc<RefCell<Scene>>,
    controls: Controls,
    model_path: Option<PathBuf>,
    renderer: AsciiRenderer,
    viewport: Option<Viewport>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(controls: Controls, width: usize, height: usize) -> Self {
        let mut engine = TransformEngine::new();
        let scene = Scene::attach(&mut engine);

        Self {
            engine,
            scene,
            controls,
            model_path: None,
            renderer: AsciiRenderer::new(width, height),
            viewport: None,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Size the view to the current terminal
    pub fn for_terminal(controls: Controls) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        // Bottom row is reserved for the status line
        Ok(Self::new(
            controls,
            width as usize,
            (height as usize).saturating_sub(1).max(1),
        ))
    }

    /// Load the model that `r` reloads. Failures leave the previous model
    /// in place and are shown in the status line.
    pub fn open(&mut self, path: impl AsRef<Path>) -> meshview_core::ParseResult<()> {
        let path = path.as_ref();
        self.model_path = Some(path.to_path_buf());
        let result = self.engine.load_model(path);
        self.refit_if_needed();
        result
    }

    pub fn scene(&self) -> std::cell::Ref<'_, Scene> {
        self.scene.borrow()
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            let mut input = FrameInput::default();
            while event::poll(Duration::from_millis(0))? {
                if let TermEvent::Key(key) = event::read()? {
                    if let Some(action) = self.controls.action_for(key) {
                        input.push(action, self.model_path.as_deref());
                    }
                }
            }
            self.dispatch(input);

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Send one frame's worth of input to the engine as a single batch
    pub fn dispatch(&mut self, input: FrameInput) {
        let (events, quit) = input.finish();
        if !events.is_empty() {
            self.engine.handle_batch(events);
            self.refit_if_needed();
        }
        if quit {
            info!("quit requested");
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn refit_if_needed(&mut self) {
        let mut scene = self.scene.borrow_mut();
        if !scene.refit {
            return;
        }
        scene.refit = false;
        self.viewport = self.engine.mesh().map(|mesh| {
            Viewport::fit(&mesh.bounds(), self.renderer.width(), self.renderer.height())
        });
    }

    /// Draw the current scene into the off-screen buffer
    pub fn draw_scene(&mut self) {
        self.renderer.clear();
        if let Some(viewport) = &self.viewport {
            let scene = self.scene.borrow();
            self.renderer
                .render_wireframe(&scene.vertices, &scene.faces, viewport);
        }
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    fn status_line(&self) -> String {
        if let Some(message) = &self.scene.borrow().message {
            return format!("load failed: {message}");
        }
        match self.engine.mesh() {
            Some(mesh) => format!(
                "{} | {} vertices, {} edges, {} faces | FPS {:.1} | WASD/PgUp/PgDn move, IJKL/UO rotate, +/- scale, R reload, Q quit",
                self.model_name(),
                mesh.vertex_count(),
                mesh.edge_count(),
                mesh.face_count(),
                self.fps
            ),
            None => "no model loaded | R reload, Q quit".to_string(),
        }
    }

    fn model_name(&self) -> String {
        self.model_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string())
    }

    fn render(&mut self) -> io::Result<()> {
        self.draw_scene();

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        let status: String = self.status_line().chars().take(self.renderer.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, self.renderer.height() as u16),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// One-line summary of a mesh, used by the CLI before entering raw mode
pub fn describe(mesh: &MeshData) -> String {
    let bounds = mesh.bounds();
    let extent = bounds.extent();
    format!(
        "{} vertices, {} edges, {} faces, size {:.3} x {:.3} x {:.3}",
        mesh.vertex_count(),
        mesh.edge_count(),
        mesh.face_count(),
        extent.x,
        extent.y,
        extent.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_core::Axis;
    use std::fs;
    use tempfile::tempdir;

    const SQUARE: &str = "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nf 1 2 3 4\n";

    fn drawn_cells(app: &TerminalApp) -> usize {
        app.renderer()
            .rows()
            .flat_map(|r| r.chars().collect::<Vec<_>>())
            .filter(|&c| c != ' ')
            .count()
    }

    #[test]
    fn test_open_fits_and_draws() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("square.obj");
        fs::write(&path, SQUARE).unwrap();

        let mut app = TerminalApp::new(Controls::default(), 60, 30);
        app.open(&path).unwrap();
        assert_eq!(app.scene().vertices.len(), 4);
        assert!(app.viewport.is_some());

        app.draw_scene();
        assert!(drawn_cells(&app) > 0);
        assert!(app.status_line().contains("4 vertices, 4 edges, 1 faces"));
    }

    #[test]
    fn test_dispatch_moves_scene() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("square.obj");
        fs::write(&path, SQUARE).unwrap();

        let mut app = TerminalApp::new(Controls::default(), 60, 30);
        app.open(&path).unwrap();
        let viewport = app.viewport;

        let mut input = FrameInput::default();
        input.push(Action::Move(0.5, Axis::X), Some(&path));
        input.push(Action::Move(0.5, Axis::X), Some(&path));
        app.dispatch(input);

        assert!((app.scene().vertices[0].x - 0.0).abs() < 1e-6);
        // Transforms do not refit the view
        assert_eq!(app.viewport, viewport);
        assert!(app.is_running());
    }

    #[test]
    fn test_failed_open_reports_in_status() {
        let dir = tempdir().unwrap();
        let mut app = TerminalApp::new(Controls::default(), 60, 30);
        assert!(app.open(dir.path().join("missing.obj")).is_err());
        assert!(app.viewport.is_none());
        assert!(app.status_line().starts_with("load failed"));

        let mut input = FrameInput::default();
        input.push(Action::Quit, None);
        app.dispatch(input);
        assert!(!app.is_running());
    }

    #[test]
    fn test_describe() {
        let summary = describe(&MeshData::cube(2.0));
        assert_eq!(
            summary,
            "8 vertices, 12 edges, 6 faces, size 2.000 x 2.000 x 2.000"
        );
    }
}
