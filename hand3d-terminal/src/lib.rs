/// Terminal front end: ASCII-rendered hand with a keyboard slider panel
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use hand3d_core::{Camera, ChannelBank, ChannelId, Hand, Mesh};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 2.0;
/// Columns reserved for the slider panel
pub const PANEL_WIDTH: u16 = 42;
const GAUGE_WIDTH: usize = 12;
const GRID_HALF_EXTENT: i32 = 15;
const ORBIT_STEP: f32 = 0.1;
const ZOOM_STEP: f32 = 1.1;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    hand: Hand,
    bank: ChannelBank,
    primitive: Mesh,
    camera: Camera,
    renderer: AsciiRenderer,
    selected: usize,
    size: (u16, u16),
    needs_clear: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(hand: Hand, bank: ChannelBank) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(hand, bank, width, height))
    }

    /// App laid out for a surface of `width` x `height` cells
    pub fn with_size(hand: Hand, bank: ChannelBank, width: u16, height: u16) -> Self {
        let mut app = Self {
            hand,
            bank,
            primitive: Mesh::unit_cylinder(),
            camera: Camera::default(),
            renderer: AsciiRenderer::new(0, 0),
            selected: 0,
            size: (0, 0),
            needs_clear: true,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.resize(width, height);
        app
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn bank(&self) -> &ChannelBank {
        &self.bank
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn selected_channel(&self) -> ChannelId {
        self.bank.channels()[self.selected].id
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        info!("Terminal renderer started");

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

            // Each event is applied before the next frame is drawn
            while event::poll(Duration::from_millis(0))? {
                match event::read()? {
                    Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                        self.handle_key(code);
                    }
                    Event::Resize(width, height) => self.resize(width, height),
                    _ => {}
                }
            }

            // Catch size changes the event stream missed
            let (width, height) = terminal::size()?;
            self.resize(width, height);

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
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

    /// Recompute the viewport and camera aspect when the terminal size changes
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        self.needs_clear = true;

        let (view_width, view_height) = viewport_size(width, height);
        self.renderer.resize(view_width as usize, view_height as usize);
        self.camera.set_viewport(view_width as u32, view_height as u32, CELL_ASPECT);
        debug!(width, height, view_width, view_height, "Terminal resized");
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let channel = self.selected_channel();
        let count = self.bank.channels().len();

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Up => {
                self.selected = (self.selected + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Tab => {
                self.selected = (self.selected + 1) % count;
            }
            KeyCode::Left => {
                self.bank.nudge(&mut self.hand, channel, -1.0);
            }
            KeyCode::Right => {
                self.bank.nudge(&mut self.hand, channel, 1.0);
            }
            KeyCode::PageDown => {
                self.bank.set(&mut self.hand, channel, channel.range().min);
            }
            KeyCode::PageUp => {
                self.bank.set(&mut self.hand, channel, channel.range().max);
            }
            KeyCode::Char('w') => self.camera.orbit(0.0, ORBIT_STEP),
            KeyCode::Char('s') => self.camera.orbit(0.0, -ORBIT_STEP),
            KeyCode::Char('a') => self.camera.orbit(-ORBIT_STEP, 0.0),
            KeyCode::Char('d') => self.camera.orbit(ORBIT_STEP, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.camera.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('-') => self.camera.zoom(ZOOM_STEP),
            KeyCode::Char('c') => self.camera.reset(),
            KeyCode::Char('p') => self.camera.toggle_mode(),
            KeyCode::Char('r') => self.bank.reset(&mut self.hand),
            _ => {}
        }
    }

    /// One row per channel: marker, slider id, gauge, value
    pub fn panel_lines(&self) -> Vec<String> {
        self.bank
            .channels()
            .iter()
            .enumerate()
            .map(|(i, channel)| {
                let marker = if i == self.selected { '>' } else { ' ' };
                let filled = (channel.range.fraction(channel.value()) * GAUGE_WIDTH as f32).round() as usize;
                format!(
                    "{marker} {:<20} [{}{}] {:>4}",
                    channel.id.to_string(),
                    "#".repeat(filled),
                    "-".repeat(GAUGE_WIDTH - filled),
                    channel.value()
                )
            })
            .collect()
    }

    /// Status readout of the last changed channel
    pub fn status_line(&self) -> String {
        self.bank
            .last_status()
            .unwrap_or_else(|| "move a slider with the arrow keys".to_string())
    }

    fn draw_frame(&mut self) {
        self.renderer.clear();
        self.renderer.render_grid(&self.camera, GRID_HALF_EXTENT);
        let highlight = self.selected_channel().targets();
        self.renderer
            .render_hand(&self.hand, &self.primitive, &self.camera, &highlight);
    }

    fn render(&mut self) -> io::Result<()> {
        self.draw_frame();

        let mut stdout = stdout();
        if std::mem::take(&mut self.needs_clear) {
            queue!(stdout, terminal::Clear(ClearType::All))?;
        }
        self.renderer.draw(&mut stdout, 1)?;

        // Slider panel to the right of the viewport
        let panel_x = self.renderer.width() as u16 + 1;
        if self.size.0 >= panel_x + PANEL_WIDTH - 1 {
            for (row, line) in self.panel_lines().into_iter().enumerate() {
                let selected = row == self.selected;
                queue!(
                    stdout,
                    cursor::MoveTo(panel_x, row as u16 + 1),
                    SetForegroundColor(if selected { Color::Yellow } else { Color::Grey }),
                    Print(line),
                )?;
            }
        }

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Hand3D | FPS: {:.1} | Up/Down=Select Left/Right=Adjust PgUp/PgDn=Ends WASD=Orbit +/-=Zoom P=Projection C=Camera R=Reset Q=Quit",
                self.fps
            )),
            cursor::MoveTo(0, self.size.1.saturating_sub(1)),
            SetForegroundColor(Color::Green),
            Print(self.status_line()),
            terminal::Clear(ClearType::UntilNewLine),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Render one frame of `hand` without touching the terminal
pub fn snapshot(hand: &Hand, width: u16, height: u16) -> Vec<String> {
    let mut renderer = AsciiRenderer::new(width as usize, height as usize);
    let mut camera = Camera::default();
    camera.set_viewport(width as u32, height as u32, CELL_ASPECT);

    renderer.render_grid(&camera, GRID_HALF_EXTENT);
    renderer.render_hand(hand, &Mesh::unit_cylinder(), &camera, &[]);
    renderer.to_lines()
}

/// Cells left for the 3D view after the title, status line and panel
fn viewport_size(width: u16, height: u16) -> (u16, u16) {
    let view_height = height.saturating_sub(2);
    let view_width = if width >= PANEL_WIDTH * 2 {
        width - PANEL_WIDTH
    } else {
        width
    };
    (view_width, view_height)
}
