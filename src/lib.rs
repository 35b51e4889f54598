pub mod audio;
pub mod error;
pub mod events;
pub mod layout;
pub mod session;
pub mod timer;
pub mod transform;
pub mod tree;
pub mod widgets;

// These modules are public for hosts bringing their own rasterizer
pub mod renderer;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};

use audio::VoicePool;
use error::Result;
use events::{Event, EventKind};
use renderer::{Canvas, PaintContext};
use session::{BarrageConfig, DecoyBarrage};
use timer::TimerQueue;
use tree::{ContainerProps, NodeId, Tree};
use widgets::{Bounds, Theme};

pub mod prelude {
    pub use crate::audio::{AudioSink, LogSink, SoundId, VoicePool};
    pub use crate::error::{Error, Result};
    pub use crate::events::{Event, EventKind, Listener};
    pub use crate::layout::{BaseLayout, Layout, MarginConfig, MarginLayout};
    pub use crate::renderer::{Canvas, DrawCommand, PaintContext};
    pub use crate::session::{BarrageConfig, DecoyBarrage};
    pub use crate::timer::{TimerId, TimerQueue};
    pub use crate::tree::{ContainerProps, NodeId, Tree};
    pub use crate::widgets::{
        BorderStyle, Bounds, Button, Color, Dialog, DialogProps, Label, Taskbar, TextAlign, Theme,
        Window,
    };
    pub use crate::{App, AppConfig, PointerInput, PointerKind};
}

pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    /// Time between two frames of [`App::run`]
    pub frame_interval: Duration,
    pub theme: Theme,
    pub barrage: BarrageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            frame_interval: Duration::from_millis(16),
            theme: Theme::default(),
            barrage: BarrageConfig::default(),
        }
    }
}

/// Pointer event kinds a host can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Press,
    Release,
    Move,
    Drag,
}

impl From<PointerKind> for EventKind {
    fn from(kind: PointerKind) -> Self {
        match kind {
            PointerKind::Press => EventKind::MousePress,
            PointerKind::Release => EventKind::MouseRelease,
            PointerKind::Move => EventKind::MouseMove,
            PointerKind::Drag => EventKind::MouseDrag,
        }
    }
}

/// Pointer input in canvas coordinates, as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    pub movement_x: f32,
    pub movement_y: f32,
}

impl PointerInput {
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            movement_x: 0.0,
            movement_y: 0.0,
        }
    }

    pub fn with_movement(mut self, movement_x: f32, movement_y: f32) -> Self {
        self.movement_x = movement_x;
        self.movement_y = movement_y;
        self
    }
}

/// A callback that gets called on every update before timers run.
pub type UpdateCallback = Box<dyn FnMut(&mut Tree) -> Result<()>>;

/// The desktop: a tree with a root container covering the canvas, the
/// timers that drive it and the glue between host and tree.
pub struct App {
    config: AppConfig,
    tree: Tree,
    root: NodeId,
    timers: TimerQueue<Tree>,
    audio: Option<Rc<RefCell<VoicePool>>>,
    on_update: Option<UpdateCallback>,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let mut tree = Tree::with_theme(config.theme);
        let root = tree.create(
            ContainerProps::new(Bounds::new(
                0.0,
                0.0,
                config.width as f32,
                config.height as f32,
            ))
            .background(config.theme.desktop),
        );
        if let Err(err) = tree.set_root(root) {
            log::warn!("failed to install the desktop root: {}", err);
        }

        Self {
            config,
            tree,
            root,
            timers: TimerQueue::new(),
            audio: None,
            on_update: None,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.config.width = width;
        self.resize_root();
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.config.height = height;
        self.resize_root();
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.config.frame_interval = interval;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self.tree.set_theme(theme);
        if let Err(err) = self.tree.set_background(self.root, Some(theme.desktop)) {
            log::warn!("failed to restyle the desktop: {}", err);
        }
        self
    }

    pub fn barrage(mut self, config: BarrageConfig) -> Self {
        self.config.barrage = config;
        self
    }

    /// Voice pool used for alert sounds.
    pub fn audio(mut self, pool: VoicePool) -> Self {
        self.audio = Some(Rc::new(RefCell::new(pool)));
        self
    }

    /// Set a callback that gets called on every [`App::update`], before
    /// timers fire. Use it to pull in external state.
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut Tree) -> Result<()> + 'static,
    {
        self.on_update = Some(Box::new(callback));
        self
    }

    fn resize_root(&mut self) {
        let bounds = Bounds::new(
            0.0,
            0.0,
            self.config.width as f32,
            self.config.height as f32,
        );
        if let Err(err) = self.tree.set_bounds(self.root, bounds) {
            log::warn!("failed to resize the desktop: {}", err);
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn timers_mut(&mut self) -> &mut TimerQueue<Tree> {
        &mut self.timers
    }

    /// Start a decoy barrage on the root with the configured settings.
    pub fn start_barrage(&mut self) -> DecoyBarrage {
        DecoyBarrage::start(
            &mut self.timers,
            self.root,
            self.config.barrage.clone(),
            self.audio.clone(),
        )
    }

    /// Deliver host pointer input to the root container.
    pub fn handle_input(&mut self, input: PointerInput) -> Result<()> {
        let event = Event::new(input.kind.into(), input.x, input.y)
            .with_movement(input.movement_x, input.movement_y);
        self.tree.emit(self.root, &event)
    }

    /// Run the update callback, then every timer due within `elapsed`.
    /// Returns the number of timers fired.
    pub fn update(&mut self, elapsed: Duration) -> Result<usize> {
        if let Some(callback) = self.on_update.as_mut() {
            callback(&mut self.tree)?;
        }
        self.timers.advance(elapsed, &mut self.tree)
    }

    /// Draw the whole desktop onto `canvas`.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> Result<()> {
        self.tree.draw(self.root, canvas)
    }

    pub fn needs_redraw(&self) -> bool {
        self.tree.needs_redraw()
    }

    /// Drive the app from a `calloop` event loop, one frame per
    /// `frame_interval`.
    ///
    /// Every frame runs [`App::update`] and [`App::render`] into a fresh
    /// display list, then hands it to `on_frame` together with the app so
    /// the host can rasterize it and feed input back. Returning `false`
    /// from `on_frame` stops the loop.
    pub fn run<F>(self, on_frame: F) -> Result<()>
    where
        F: FnMut(&mut App, &PaintContext) -> bool + 'static,
    {
        let _ = env_logger::try_init();

        let mut event_loop: EventLoop<FrameLoop<F>> = EventLoop::try_new()?;
        let interval = self.config.frame_interval;

        event_loop
            .handle()
            .insert_source(Timer::from_duration(interval), move |_, _, state| {
                state.tick();
                TimeoutAction::ToDuration(interval)
            })
            .map_err(|e| e.error)?;

        log::info!(
            "Running desktop {}x{}, frame every {:?}",
            self.config.width,
            self.config.height,
            interval
        );

        let mut state = FrameLoop {
            app: self,
            on_frame,
            canvas: PaintContext::new(),
            signal: event_loop.get_signal(),
            last_tick: Instant::now(),
            frames: 0,
        };
        event_loop.run(interval, &mut state, |_| {})?;

        log::info!("Desktop stopped after {} frames", state.frames);
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Loop data for [`App::run`].
struct FrameLoop<F> {
    app: App,
    on_frame: F,
    canvas: PaintContext,
    signal: LoopSignal,
    last_tick: Instant,
    frames: u64,
}

impl<F> FrameLoop<F>
where
    F: FnMut(&mut App, &PaintContext) -> bool,
{
    fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now - self.last_tick;
        self.last_tick = now;

        if let Err(err) = self.app.update(elapsed) {
            log::warn!("update failed: {}", err);
        }

        self.canvas.clear();
        if let Err(err) = self.app.render(&mut self.canvas) {
            log::warn!("frame {} failed to render: {}", self.frames, err);
        }
        self.frames += 1;

        if !(self.on_frame)(&mut self.app, &self.canvas) {
            self.signal.stop();
        }
    }
}
