//! Transport state machine for one playback channel.
//!
//! The controller never touches the media engine itself. It records what the
//! engine reports (metadata, time updates, end of stream) and turns user intent
//! into a [`TransportCommand`] for the caller to apply to the real element.

use std::fmt;

/// Generation number of a playable resource. Issued by the workspace, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Ready,
    Playing,
    Paused,
    Ended,
    /// The media engine reported an error for the bound resource.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportState {
    pub is_playing: bool,
    pub current_time_secs: f64,
    /// 0.0 while unknown.
    pub duration_secs: f64,
    pub volume: f64,
}

pub const DEFAULT_VOLUME: f64 = 0.75;

impl Default for TransportState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time_secs: 0.0,
            duration_secs: 0.0,
            volume: DEFAULT_VOLUME,
        }
    }
}

/// What the caller must do to the media element after a state change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransportCommand {
    None,
    Play { from_secs: f64 },
    Pause,
}

/// Asynchronous notifications from the media engine.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    MetadataLoaded { duration_secs: f64 },
    TimeUpdate { current_time_secs: f64 },
    Ended,
    /// `play()` was refused (autoplay policy, decode failure before start, ...).
    PlayRejected,
    Error { message: String },
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PlaybackController {
    bound: Option<ResourceId>,
    phase: PlaybackPhase,
    transport: TransportState,
    last_error: Option<String>,
}

impl PlaybackController {
    pub fn new(volume: f64) -> Self {
        let mut c = Self::default();
        c.set_volume(volume);
        c
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn bound(&self) -> Option<ResourceId> {
        self.bound
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Controls are only usable while a resource is bound and the engine hasn't failed on it.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.phase, PlaybackPhase::Idle | PlaybackPhase::Failed)
    }

    pub fn is_current(&self, id: ResourceId) -> bool {
        self.bound == Some(id)
    }

    /// Bind a new resource. Position and duration reset before any of its events are accepted.
    /// Volume is a user preference and survives rebinding.
    pub fn bind(&mut self, id: ResourceId) {
        self.bound = Some(id);
        self.phase = PlaybackPhase::Ready;
        self.reset_position();
    }

    pub fn unbind(&mut self) {
        self.bound = None;
        self.phase = PlaybackPhase::Idle;
        self.reset_position();
    }

    fn reset_position(&mut self) {
        self.transport.is_playing = false;
        self.transport.current_time_secs = 0.0;
        self.transport.duration_secs = 0.0;
        self.last_error = None;
    }

    pub fn toggle_play(&mut self) -> TransportCommand {
        match self.phase {
            PlaybackPhase::Idle | PlaybackPhase::Failed => TransportCommand::None,
            PlaybackPhase::Ready | PlaybackPhase::Paused => {
                self.set_phase(PlaybackPhase::Playing);
                TransportCommand::Play {
                    from_secs: self.transport.current_time_secs,
                }
            }
            PlaybackPhase::Ended => {
                self.transport.current_time_secs = 0.0;
                self.set_phase(PlaybackPhase::Playing);
                TransportCommand::Play { from_secs: 0.0 }
            }
            PlaybackPhase::Playing => {
                self.set_phase(PlaybackPhase::Paused);
                TransportCommand::Pause
            }
        }
    }

    /// Returns the clamped position to apply to the element, or `None` when nothing is bound.
    pub fn seek(&mut self, secs: f64) -> Option<f64> {
        if !self.is_enabled() {
            return None;
        }
        let t = clamp_position(secs, self.transport.duration_secs, true);
        self.transport.current_time_secs = t;
        if self.phase == PlaybackPhase::Ended && t < self.transport.duration_secs {
            self.set_phase(PlaybackPhase::Paused);
        }
        Some(t)
    }

    /// Clamp into [0, 1]. NaN leaves the volume unchanged.
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        if !volume.is_nan() {
            self.transport.volume = volume.clamp(0.0, 1.0);
        }
        self.transport.volume
    }

    /// Apply an engine event. Events for any resource other than the bound one are dropped.
    /// Returns whether the event was applied.
    pub fn handle_event(&mut self, id: ResourceId, event: MediaEvent) -> bool {
        if !self.is_current(id) {
            log::debug!("dropping stale media event {event:?} for {id}");
            return false;
        }
        match event {
            MediaEvent::MetadataLoaded { duration_secs } => {
                self.transport.duration_secs = sanitize_duration(duration_secs);
                let d = self.transport.duration_secs;
                if d > 0.0 && self.transport.current_time_secs > d {
                    self.transport.current_time_secs = d;
                }
            }
            MediaEvent::TimeUpdate { current_time_secs } => {
                if current_time_secs.is_nan() {
                    return false;
                }
                self.transport.current_time_secs =
                    clamp_position(current_time_secs, self.transport.duration_secs, false);
            }
            MediaEvent::Ended => {
                if self.transport.duration_secs > 0.0 {
                    self.transport.current_time_secs = self.transport.duration_secs;
                }
                self.set_phase(PlaybackPhase::Ended);
            }
            MediaEvent::PlayRejected => {
                if self.phase == PlaybackPhase::Playing {
                    self.set_phase(PlaybackPhase::Paused);
                }
            }
            MediaEvent::Error { message } => {
                self.set_phase(PlaybackPhase::Failed);
                self.last_error = Some(message);
            }
        }
        true
    }

    fn set_phase(&mut self, phase: PlaybackPhase) {
        self.phase = phase;
        self.transport.is_playing = phase == PlaybackPhase::Playing;
    }
}

fn sanitize_duration(d: f64) -> f64 {
    if d.is_finite() && d > 0.0 {
        d
    } else {
        0.0
    }
}

/// Clamp a position into [0, duration]. With an unknown duration the upper bound
/// only applies when `strict` is set.
fn clamp_position(secs: f64, duration: f64, strict: bool) -> f64 {
    let t = if secs.is_nan() { 0.0 } else { secs.max(0.0) };
    if duration > 0.0 || strict {
        t.min(duration)
    } else {
        t
    }
}

/// `M:SS`, minutes unbounded. NaN, infinities and negatives render as `0:00`.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Played fraction in percent, for the progress fill under the seek slider.
pub fn progress_percent(t: &TransportState) -> f64 {
    if t.duration_secs > 0.0 {
        (t.current_time_secs / t.duration_secs * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(id: u64, duration: f64) -> PlaybackController {
        let mut c = PlaybackController::new(DEFAULT_VOLUME);
        c.bind(ResourceId(id));
        c.handle_event(ResourceId(id), MediaEvent::MetadataLoaded { duration_secs: duration });
        c
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(59.99), "0:59");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn test_idle_ignores_everything() {
        let mut c = PlaybackController::new(0.5);
        assert_eq!(c.phase(), PlaybackPhase::Idle);
        assert!(!c.is_enabled());
        assert_eq!(c.toggle_play(), TransportCommand::None);
        assert_eq!(c.seek(3.0), None);
        assert!(!c.handle_event(ResourceId(1), MediaEvent::Ended));
        assert_eq!(c.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_toggle_cycle_keeps_position() {
        let mut c = ready(1, 10.0);
        assert_eq!(c.toggle_play(), TransportCommand::Play { from_secs: 0.0 });
        assert!(c.transport().is_playing);
        c.handle_event(ResourceId(1), MediaEvent::TimeUpdate { current_time_secs: 4.2 });
        assert_eq!(c.toggle_play(), TransportCommand::Pause);
        assert_eq!(c.phase(), PlaybackPhase::Paused);
        assert_eq!(c.transport().current_time_secs, 4.2);
        assert_eq!(c.toggle_play(), TransportCommand::Play { from_secs: 4.2 });
    }

    #[test]
    fn test_seek_clamps() {
        let mut c = ready(1, 10.0);
        for (input, expected) in [(-5.0, 0.0), (3.5, 3.5), (25.0, 10.0), (f64::NAN, 0.0), (f64::INFINITY, 10.0)] {
            assert_eq!(c.seek(input), Some(expected));
            assert_eq!(c.transport().current_time_secs, expected);
        }
        // Duration still unknown: only zero is in range.
        let mut c = PlaybackController::new(0.5);
        c.bind(ResourceId(2));
        assert_eq!(c.seek(7.0), Some(0.0));
    }

    #[test]
    fn test_seek_does_not_change_play_state() {
        let mut c = ready(1, 10.0);
        c.toggle_play();
        c.seek(2.0);
        assert_eq!(c.phase(), PlaybackPhase::Playing);
        c.toggle_play();
        c.seek(8.0);
        assert_eq!(c.phase(), PlaybackPhase::Paused);
    }

    #[test]
    fn test_bind_resets_transport_but_keeps_volume() {
        let mut c = ready(1, 10.0);
        c.set_volume(0.3);
        c.toggle_play();
        c.handle_event(ResourceId(1), MediaEvent::TimeUpdate { current_time_secs: 6.0 });
        c.bind(ResourceId(2));
        assert_eq!(c.phase(), PlaybackPhase::Ready);
        let t = c.transport();
        assert!(!t.is_playing);
        assert_eq!(t.current_time_secs, 0.0);
        assert_eq!(t.duration_secs, 0.0);
        assert_eq!(t.volume, 0.3);
    }

    #[test]
    fn test_stale_events_are_dropped() {
        let mut c = ready(1, 10.0);
        c.bind(ResourceId(2));
        assert!(!c.handle_event(ResourceId(1), MediaEvent::MetadataLoaded { duration_secs: 99.0 }));
        assert!(!c.handle_event(ResourceId(1), MediaEvent::TimeUpdate { current_time_secs: 5.0 }));
        assert!(!c.handle_event(ResourceId(1), MediaEvent::Ended));
        assert_eq!(c.phase(), PlaybackPhase::Ready);
        assert_eq!(c.transport().duration_secs, 0.0);
        assert_eq!(c.transport().current_time_secs, 0.0);
    }

    #[test]
    fn test_time_updates_clamp_and_tolerate_reordering() {
        let mut c = ready(1, 10.0);
        c.toggle_play();
        let id = ResourceId(1);
        c.handle_event(id, MediaEvent::TimeUpdate { current_time_secs: 3.0 });
        c.handle_event(id, MediaEvent::TimeUpdate { current_time_secs: 2.0 });
        assert_eq!(c.transport().current_time_secs, 2.0);
        c.handle_event(id, MediaEvent::TimeUpdate { current_time_secs: 12.0 });
        assert_eq!(c.transport().current_time_secs, 10.0);
        c.handle_event(id, MediaEvent::TimeUpdate { current_time_secs: -1.0 });
        assert_eq!(c.transport().current_time_secs, 0.0);
    }

    #[test]
    fn test_metadata_sanitizes_duration() {
        let mut c = PlaybackController::new(0.5);
        c.bind(ResourceId(1));
        c.handle_event(ResourceId(1), MediaEvent::MetadataLoaded { duration_secs: f64::NAN });
        assert_eq!(c.transport().duration_secs, 0.0);
        c.handle_event(ResourceId(1), MediaEvent::MetadataLoaded { duration_secs: f64::INFINITY });
        assert_eq!(c.transport().duration_secs, 0.0);
        c.handle_event(ResourceId(1), MediaEvent::MetadataLoaded { duration_secs: 42.5 });
        assert_eq!(c.transport().duration_secs, 42.5);
    }

    #[test]
    fn test_end_holds_position_and_replays_from_start() {
        let mut c = ready(1, 10.0);
        c.toggle_play();
        c.handle_event(ResourceId(1), MediaEvent::TimeUpdate { current_time_secs: 9.8 });
        c.handle_event(ResourceId(1), MediaEvent::Ended);
        assert_eq!(c.phase(), PlaybackPhase::Ended);
        assert!(!c.transport().is_playing);
        assert_eq!(c.transport().current_time_secs, 10.0);
        assert_eq!(c.toggle_play(), TransportCommand::Play { from_secs: 0.0 });
        assert_eq!(c.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_seek_after_end_pauses() {
        let mut c = ready(1, 10.0);
        c.toggle_play();
        c.handle_event(ResourceId(1), MediaEvent::Ended);
        c.seek(4.0);
        assert_eq!(c.phase(), PlaybackPhase::Paused);
        assert_eq!(c.toggle_play(), TransportCommand::Play { from_secs: 4.0 });
    }

    #[test]
    fn test_volume_clamps_in_any_phase() {
        let mut c = PlaybackController::new(2.0);
        assert_eq!(c.transport().volume, 1.0);
        assert_eq!(c.set_volume(-0.5), 0.0);
        assert_eq!(c.set_volume(f64::NAN), 0.0);
        c.bind(ResourceId(1));
        c.toggle_play();
        assert_eq!(c.set_volume(0.4), 0.4);
        assert_eq!(c.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_rejected_play_and_errors() {
        let mut c = ready(1, 10.0);
        c.toggle_play();
        c.handle_event(ResourceId(1), MediaEvent::PlayRejected);
        assert_eq!(c.phase(), PlaybackPhase::Paused);
        assert!(!c.transport().is_playing);

        c.handle_event(ResourceId(1), MediaEvent::Error { message: "decode".into() });
        assert_eq!(c.phase(), PlaybackPhase::Failed);
        assert!(!c.is_enabled());
        assert_eq!(c.last_error(), Some("decode"));
        assert_eq!(c.toggle_play(), TransportCommand::None);

        c.bind(ResourceId(2));
        assert!(c.is_enabled());
        assert_eq!(c.last_error(), None);
    }

    #[test]
    fn test_progress_percent() {
        let mut t = TransportState::default();
        assert_eq!(progress_percent(&t), 0.0);
        t.duration_secs = 8.0;
        t.current_time_secs = 2.0;
        assert_eq!(progress_percent(&t), 25.0);
    }
}
