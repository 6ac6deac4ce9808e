//! Single-writer session driver
//!
//! Owns the [`GameState`], the task scheduler and the microphone. Host
//! notifications from any thread go through an mpsc queue and are applied on
//! the thread that calls [`Runtime::advance`] or [`Runtime::pump`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use super::capture::AudioCapture;
use super::scheduler::{Scheduler, TaskKind};
use crate::sim::tick::{self, Command};
use crate::sim::{GameEvent, GamePhase, GameState, RenderState};

/// Countdown cadence before play begins
const COUNTDOWN_STEP_MS: u64 = 1_000;

/// Notifications a host may send from any thread
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Tilt { x: f32, y: f32 },
    AudioBuffer(Vec<i16>),
    /// Player pressed "Start/Stop Listening"
    ToggleMic,
    Pause,
    Resume,
    /// "Play again"
    Reset,
}

/// Session driver
pub struct Runtime<C: AudioCapture> {
    state: GameState,
    scheduler: Scheduler,
    capture: C,
    capturing: bool,
    paused: bool,
    /// Seconds left before an armed countdown starts play
    countdown: u32,
    tx: Sender<HostEvent>,
    rx: Receiver<HostEvent>,
    outbox: Vec<GameEvent>,
}

impl<C: AudioCapture> Runtime<C> {
    pub fn new(state: GameState, capture: C) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler::new();
        scheduler.finish(state.clock_ms);
        Self {
            state,
            scheduler,
            capture,
            capturing: false,
            paused: false,
            countdown: 0,
            tx,
            rx,
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn render_state(&self) -> RenderState {
        self.state.render_state()
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handle for delivering host events from other threads
    pub fn sender(&self) -> Sender<HostEvent> {
        self.tx.clone()
    }

    /// Begin play immediately
    pub fn start(&mut self) {
        self.countdown = 0;
        self.scheduler.cancel(TaskKind::Countdown);
        self.apply(Command::Start);
    }

    /// Count down `secs` seconds, then begin play
    pub fn start_with_countdown(&mut self, secs: u32) {
        if secs == 0 || self.state.phase != GamePhase::Idle {
            self.start();
            return;
        }
        self.countdown = secs;
        self.state.emit(GameEvent::Countdown { remaining: secs });
        self.scheduler.every(TaskKind::Countdown, COUNTDOWN_STEP_MS);
        if self.paused {
            self.scheduler.suspend();
        }
        self.sync();
    }

    /// Apply queued host events, then run every task due within `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        self.pump();
        if self.paused {
            return;
        }

        let target = self.scheduler.now_ms() + dt_ms;
        while let Some(task) = self.scheduler.pop_due(target) {
            self.state.clock_ms = self.scheduler.now_ms();
            self.run_task(task);
        }
        self.scheduler.finish(target);
        self.state.clock_ms = target;
    }

    /// Apply every queued host event in arrival order
    pub fn pump(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.handle(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Apply one host event now
    pub fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Tilt { x, y } => {
                // Sensor is unregistered while paused
                if !self.paused {
                    self.apply(Command::Tilt { x, y });
                }
            }
            HostEvent::AudioBuffer(samples) => {
                if !self.paused && self.capturing {
                    self.apply(Command::AudioBuffer(samples));
                }
            }
            HostEvent::ToggleMic => self.toggle_mic(),
            HostEvent::Pause => self.pause(),
            HostEvent::Resume => self.resume(),
            HostEvent::Reset => self.request_reset(),
        }
    }

    /// Flip the microphone on demand (ignored while paused)
    pub fn toggle_mic(&mut self) {
        if !self.paused {
            self.apply(Command::ToggleMic);
        }
    }

    /// Park every task where it stands and release the microphone
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.scheduler.suspend();
        self.release_capture();
        log::info!("Paused at {} ms", self.scheduler.now_ms());
    }

    /// Pick every task up where it stopped and, if the mic was on, recording
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        let restored = self.scheduler.resume();
        log::info!(
            "Resumed at {} ms ({} tasks)",
            self.scheduler.now_ms(),
            restored
        );
        if self.state.is_playing() && self.state.mic_active {
            self.acquire_capture();
        }
    }

    /// "Play again"
    pub fn request_reset(&mut self) {
        self.countdown = 0;
        self.apply(Command::Reset);
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn run_task(&mut self, task: TaskKind) {
        match task {
            TaskKind::ImmunityExpiry => self.apply(Command::ImmunityExpired),
            TaskKind::Countdown => self.countdown_step(),
            TaskKind::ElapsedSecond => self.apply(Command::ElapsedSecond),
            TaskKind::DutyCycle => self.apply(Command::DutyCycle),
            TaskKind::SoundSample => {
                if let Some(samples) = self.capture.read() {
                    self.apply(Command::AudioBuffer(samples));
                }
            }
            TaskKind::Reposition => self.apply(Command::Reposition),
            TaskKind::PursuitStep => self.apply(Command::PursuitStep),
        }
    }

    fn countdown_step(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.scheduler.cancel(TaskKind::Countdown);
            self.apply(Command::Start);
        } else {
            self.state.emit(GameEvent::Countdown {
                remaining: self.countdown,
            });
            self.sync();
        }
    }

    fn apply(&mut self, command: Command) {
        tick::apply(&mut self.state, &command);
        self.sync();
    }

    /// React to state transitions, then forward the events to the host
    fn sync(&mut self) {
        let events = self.state.drain_events();
        for event in &events {
            match event {
                GameEvent::Started => self.start_tasks(),
                GameEvent::Reset => {
                    self.scheduler.cancel_all();
                    self.release_capture();
                    self.start_tasks();
                }
                GameEvent::GameOver(_) => {
                    self.scheduler.cancel_all();
                    self.release_capture();
                }
                GameEvent::MicToggled { active: true } => self.acquire_capture(),
                GameEvent::MicToggled { active: false } => self.release_capture(),
                _ => {}
            }
        }
        self.outbox.extend(events);
    }

    /// Fresh cadences for a new run; parked straight away while paused
    fn start_tasks(&mut self) {
        let t = &self.state.tuning;
        let cadences = [
            (TaskKind::ElapsedSecond, t.elapsed_tick_ms),
            (TaskKind::Reposition, t.reposition_ms),
            (TaskKind::DutyCycle, t.duty_cycle_ms),
            (TaskKind::PursuitStep, t.pursuit_tick_ms),
        ];
        for (kind, period) in cadences {
            self.scheduler.every(kind, period);
        }
        if self.state.immune {
            let remaining = self.state.immunity_remaining_ms();
            self.scheduler.once(TaskKind::ImmunityExpiry, remaining);
        }
        if self.paused {
            self.scheduler.suspend();
        } else if self.state.mic_active {
            self.acquire_capture();
        }
    }

    fn acquire_capture(&mut self) {
        if self.capturing {
            return;
        }
        match self.capture.open() {
            Ok(()) => {
                self.capturing = true;
                let period = self.state.tuning.sound_sample_ms;
                self.scheduler.every(TaskKind::SoundSample, period);
                log::debug!("Microphone acquired");
            }
            Err(e) => log::warn!("{}; corals stay hidden", e),
        }
    }

    fn release_capture(&mut self) {
        self.scheduler.cancel(TaskKind::SoundSample);
        if self.capturing {
            self.capture.close();
            self.capturing = false;
            log::debug!("Microphone released");
        }
    }
}

impl<C: AudioCapture> Drop for Runtime<C> {
    fn drop(&mut self) {
        self.release_capture();
    }
}
