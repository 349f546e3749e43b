//! Terminal front end: crossterm events in, ASCII frames out.
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton as TermButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use pickview_core::{
    FaceHit, InputController, InputEvent, Key, Model, MouseButton, ViewMode, Viewer, ViewerConfig,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::info;

pub mod renderer;

pub use renderer::{cell_viewport, AsciiRenderer, CELL_ASPECT};

/// Main application struct for terminal 3D viewing
pub struct TerminalApp {
    viewer: Viewer,
    input: InputController,
    renderer: AsciiRenderer,
    running: bool,
    frame_time: Duration,
    drag_origin: Option<(u16, u16)>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(models: Vec<Model>, mut config: ViewerConfig, fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        config.viewport = cell_viewport(width, height);

        let mut viewer = Viewer::new(config);
        for model in models {
            viewer.add_model(model);
        }

        Ok(Self {
            viewer,
            input: InputController::new(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            frame_time: Duration::from_millis(1000 / fps.max(1) as u64),
            drag_origin: None,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Drain everything that arrived since the last frame
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.viewer.set_viewport(cell_viewport(width, height));
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
            info!("quit requested");
            self.running = false;
            return;
        }
        let key = match code {
            KeyCode::Up | KeyCode::Char('w') => Key::Up,
            KeyCode::Down | KeyCode::Char('s') => Key::Down,
            KeyCode::Left | KeyCode::Char('a') => Key::Left,
            KeyCode::Right | KeyCode::Char('d') => Key::Right,
            KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
            _ => return,
        };
        let event = match kind {
            KeyEventKind::Release => InputEvent::KeyUp(key),
            _ => InputEvent::KeyDown(key),
        };
        self.input.handle(event, &mut self.viewer);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        // Terminals do not report a bare Shift press; mirror it from the
        // modifiers of each mouse event instead.
        let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
        if shift != self.input.shift_held() {
            let event = if shift {
                InputEvent::KeyDown(Key::Shift)
            } else {
                InputEvent::KeyUp(Key::Shift)
            };
            self.input.handle(event, &mut self.viewer);
        }

        let (column, row) = (mouse.column, mouse.row);
        let event = match mouse.kind {
            MouseEventKind::Down(TermButton::Left) => {
                let (x, y) = cell_center(column, row);
                Some(InputEvent::MouseDown {
                    button: MouseButton::Left,
                    x,
                    y,
                })
            }
            MouseEventKind::Down(_) => {
                self.drag_origin = Some((column, row));
                None
            }
            // Right drag stands in for the middle button, which many
            // terminals and touchpads cannot produce.
            MouseEventKind::Drag(TermButton::Middle | TermButton::Right) => {
                let (x0, y0) = self.drag_origin.unwrap_or((column, row));
                self.drag_origin = Some((column, row));
                Some(InputEvent::MouseDrag {
                    button: MouseButton::Middle,
                    dx: column as f64 - x0 as f64,
                    dy: row as f64 - y0 as f64,
                })
            }
            MouseEventKind::Up(_) => {
                self.drag_origin = None;
                None
            }
            MouseEventKind::ScrollUp => Some(InputEvent::Scroll(1.0)),
            MouseEventKind::ScrollDown => Some(InputEvent::Scroll(-1.0)),
            _ => None,
        };
        if let Some(event) = event {
            self.input.handle(event, &mut self.viewer);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.viewer.begin_frame();

        self.renderer.clear();
        self.renderer.render(self.viewer.models(), &frame);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status_line(frame.mode, self.viewer.camera().zoom(), frame.highlighted, self.fps)),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Center of a terminal cell in viewport units, measured from the top.
fn cell_center(column: u16, row: u16) -> (f64, f64) {
    (column as f64 + 0.5, (row as f64 + 0.5) * CELL_ASPECT as f64)
}

fn status_line(mode: ViewMode, zoom: f64, picked: Option<FaceHit>, fps: f32) -> String {
    let mode = match mode {
        ViewMode::Perspective => "persp",
        ViewMode::Orthographic => "ortho",
    };
    let picked = match picked {
        Some(hit) => format!("model {} face {}", hit.model_index, hit.face_index),
        None => "none".to_string(),
    };
    format!(
        "PickView | {mode} zoom {zoom:.2} | pick: {picked} | FPS: {fps:.1} | \
         Click=Pick Drag=Orbit Shift+Drag=Pan Wheel=Zoom O=Proj V=Iso Q=Quit"
    )
}
