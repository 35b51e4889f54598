//! The decoy-dialog barrage.
//!
//! A [`DecoyBarrage`] spawns error dialogs at random spots on a root
//! container, each one sooner than the last: after every spawn the delay is
//! multiplied by `decay` and clamped to `min_delay`. It stops after
//! `max_count` dialogs, when cancelled, or as soon as its root is destroyed.
//! All of its state lives in the barrage itself, so starting a new one
//! always starts from a clean slate.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::audio::{SoundId, VoicePool};
use crate::error::{Error, Result};
use crate::timer::{TimerId, TimerQueue};
use crate::tree::{NodeId, Tree};
use crate::widgets::dialog::{DEFAULT_DIALOG_HEIGHT, DEFAULT_DIALOG_WIDTH};
use crate::widgets::{Bounds, Dialog, DialogProps};

#[derive(Debug, Clone, PartialEq)]
pub struct BarrageConfig {
    /// Wait before the first dialog
    pub initial_delay: Duration,
    /// Factor applied to the delay after each spawn
    pub decay: f64,
    pub min_delay: Duration,
    pub max_count: usize,
    pub title: String,
    pub text: String,
    pub dialog_width: f32,
    pub dialog_height: f32,
    /// Played on every spawn when the barrage has a voice pool
    pub sound: Option<SoundId>,
    pub seed: u64,
}

impl Default for BarrageConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(800),
            decay: 0.85,
            min_delay: Duration::from_millis(40),
            max_count: 100,
            title: "System Error".to_string(),
            text: "Uh oh.".to_string(),
            dialog_width: DEFAULT_DIALOG_WIDTH,
            dialog_height: DEFAULT_DIALOG_HEIGHT,
            sound: Some(SoundId("chord")),
            seed: 0x5eed_d1a1_0905,
        }
    }
}

impl BarrageConfig {
    /// Delay following `delay`.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        let scaled = (delay.as_nanos() as f64 * self.decay).round().max(0.0) as u64;
        Duration::from_nanos(scaled).max(self.min_delay)
    }
}

struct BarrageState {
    config: BarrageConfig,
    root: NodeId,
    audio: Option<Rc<RefCell<VoicePool>>>,
    rng: RefCell<Pcg64Mcg>,
    spawned: Cell<usize>,
    delay: Cell<Duration>,
    pending: Cell<Option<TimerId>>,
    cancelled: Cell<bool>,
}

/// Handle to a running barrage. Clones share the same barrage.
#[derive(Clone)]
pub struct DecoyBarrage {
    state: Rc<BarrageState>,
}

impl DecoyBarrage {
    /// Schedule the first spawn on `timers`.
    pub fn start(
        timers: &mut TimerQueue<Tree>,
        root: NodeId,
        config: BarrageConfig,
        audio: Option<Rc<RefCell<VoicePool>>>,
    ) -> Self {
        let delay = config.initial_delay;
        let barrage = Self {
            state: Rc::new(BarrageState {
                rng: RefCell::new(Pcg64Mcg::seed_from_u64(config.seed)),
                config,
                root,
                audio,
                spawned: Cell::new(0),
                delay: Cell::new(delay),
                pending: Cell::new(None),
                cancelled: Cell::new(false),
            }),
        };
        log::info!("decoy barrage on {:?} starts in {:?}", root, delay);
        barrage.schedule(timers, delay);
        barrage
    }

    /// Stop spawning. Returns false if the barrage had already finished.
    pub fn cancel(&self, timers: &mut TimerQueue<Tree>) -> bool {
        self.state.cancelled.set(true);
        match self.state.pending.take() {
            Some(id) => timers.cancel(id),
            None => false,
        }
    }

    /// Dialogs spawned so far.
    pub fn spawned(&self) -> usize {
        self.state.spawned.get()
    }

    /// Whether another spawn is scheduled.
    pub fn is_active(&self) -> bool {
        self.state.pending.get().is_some()
    }

    /// Delay the next spawn is (or the last one was) scheduled with.
    pub fn current_delay(&self) -> Duration {
        self.state.delay.get()
    }

    pub fn config(&self) -> &BarrageConfig {
        &self.state.config
    }

    fn schedule(&self, timers: &mut TimerQueue<Tree>, delay: Duration) {
        let this = self.clone();
        let id = timers.schedule_once(delay, move |tree, timers| this.fire(tree, timers));
        self.state.pending.set(Some(id));
    }

    fn fire(&self, tree: &mut Tree, timers: &mut TimerQueue<Tree>) -> Result<()> {
        let state = &self.state;
        state.pending.set(None);

        if state.cancelled.get() {
            return Ok(());
        }
        if !tree.is_alive(state.root) {
            log::debug!("decoy barrage root {:?} is gone, stopping", state.root);
            return Ok(());
        }

        self.spawn(tree)?;
        let spawned = state.spawned.get() + 1;
        state.spawned.set(spawned);

        if spawned >= state.config.max_count {
            log::info!("decoy barrage finished after {} dialogs", spawned);
            return Ok(());
        }

        let next = state.config.next_delay(state.delay.get());
        state.delay.set(next);
        self.schedule(timers, next);
        Ok(())
    }

    fn spawn(&self, tree: &mut Tree) -> Result<()> {
        let state = &self.state;
        let config = &state.config;
        let area = tree.bounds(state.root).ok_or(Error::StaleNode(state.root))?;

        let max_left = (area.width() - config.dialog_width).max(0.0);
        let max_top = (area.height() - config.dialog_height).max(0.0);
        let (left, top) = {
            let mut rng = state.rng.borrow_mut();
            (rng.gen_range(0.0..=max_left), rng.gen_range(0.0..=max_top))
        };

        let props = DialogProps::new(config.title.clone(), config.text.clone()).bounds(
            Bounds::from_origin_size(left, top, config.dialog_width, config.dialog_height),
        );
        let dialog = Dialog::new(tree, props)?;
        tree.add(state.root, dialog.id())?;

        if let (Some(pool), Some(sound)) = (&state.audio, config.sound) {
            pool.borrow_mut().trigger(sound);
        }
        log::debug!("decoy dialog {:?} at ({}, {})", dialog.id(), left, top);
        Ok(())
    }
}

impl fmt::Debug for DecoyBarrage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoyBarrage")
            .field("root", &self.state.root)
            .field("spawned", &self.state.spawned.get())
            .field("delay", &self.state.delay.get())
            .field("active", &self.is_active())
            .finish()
    }
}
