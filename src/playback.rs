//! Step transport for a document's animation script.
//!
//! The controller is a plain state machine over a caller-supplied virtual
//! clock (milliseconds). Nothing here spawns threads or timers; a host UI or
//! the CLI loop calls [`PlaybackController::tick`] with the current time and
//! the controller reports whether autoplay advanced.

use crate::{
    error::{VizError, VizResult},
    model::VisualizationData,
};

pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 3.0;
pub const ZOOM_STEP: f64 = 0.2;

#[derive(Clone, Debug)]
pub struct PlaybackController {
    /// Effective per-step waits in milliseconds (duration floor applied).
    durations_ms: Vec<f64>,
    index: usize,
    playing: bool,
    speed: f64,
    zoom: f64,
    /// Bumped whenever the underlying script changes, so a deadline scheduled
    /// against an older document can never fire.
    epoch: u64,
    pending: Option<Deadline>,
}

#[derive(Clone, Copy, Debug)]
struct Deadline {
    due_ms: f64,
    epoch: u64,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            durations_ms: Vec::new(),
            index: 0,
            playing: false,
            speed: 1.0,
            zoom: 1.0,
            epoch: 0,
            pending: None,
        }
    }

    pub fn for_document(doc: &VisualizationData) -> Self {
        let mut c = Self::new();
        c.set_document(doc);
        c
    }

    /// Swap in a new document's script. Forces idle at step 0 and invalidates
    /// any scheduled advance; speed and zoom are UI state and survive.
    pub fn set_document(&mut self, doc: &VisualizationData) {
        self.durations_ms = doc
            .steps
            .iter()
            .map(|s| s.effective_duration_s() * 1000.0)
            .collect();
        self.index = 0;
        self.playing = false;
        self.epoch += 1;
        self.pending = None;
    }

    pub fn step_index(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Presentable step count; a scriptless document still has its static view.
    pub fn step_count(&self) -> usize {
        self.durations_ms.len().max(1)
    }

    /// Transport controls are pointless without a script.
    pub fn transport_enabled(&self) -> bool {
        !self.durations_ms.is_empty()
    }

    pub fn play(&mut self, now_ms: f64) {
        if !self.transport_enabled() {
            return;
        }
        if self.playing {
            return;
        }
        if self.index + 1 == self.durations_ms.len() {
            // Pressing play at the end restarts from the top.
            self.index = 0;
        }
        self.playing = true;
        self.schedule(now_ms);
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.pending = None;
    }

    pub fn step_forward(&mut self) {
        self.cancel_autoplay();
        self.index = (self.index + 1).min(self.step_count() - 1);
    }

    pub fn step_backward(&mut self) {
        self.cancel_autoplay();
        self.index = self.index.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.cancel_autoplay();
        self.index = 0;
    }

    /// Any positive multiplier is accepted. Takes effect on the next
    /// scheduled wait; an in-flight wait keeps its deadline.
    pub fn set_speed(&mut self, speed: f64) -> VizResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(VizError::playback("speed must be finite and > 0"));
        }
        self.speed = speed;
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Deadline of the scheduled advance, if autoplay is waiting.
    pub fn next_deadline_ms(&self) -> Option<f64> {
        self.pending
            .filter(|d| d.epoch == self.epoch)
            .map(|d| d.due_ms)
    }

    /// Drive autoplay. Returns true when the step index advanced. At the last
    /// step the controller halts idle; playback never loops.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(deadline) = self.pending else {
            return false;
        };
        if deadline.epoch != self.epoch {
            // Scheduled against a document that is gone.
            self.pending = None;
            return false;
        }
        if !self.playing || now_ms < deadline.due_ms {
            return false;
        }

        self.pending = None;
        if self.index + 1 < self.durations_ms.len() {
            self.index += 1;
            self.schedule(now_ms);
            true
        } else {
            self.playing = false;
            false
        }
    }

    fn schedule(&mut self, now_ms: f64) {
        let wait = self.durations_ms[self.index] / self.speed;
        self.pending = Some(Deadline {
            due_ms: now_ms + wait,
            epoch: self.epoch,
        });
    }

    fn cancel_autoplay(&mut self) {
        self.playing = false;
        self.pending = None;
    }
}
