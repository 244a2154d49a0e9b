//! Playback lifecycle events delivered by the host player.

use serde::{Deserialize, Serialize};

/// A single event from the playback event source.
///
/// Events carrying `time` report the current media time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Play { time: f64 },
    Pause,
    Ended { time: f64 },
    TimeUpdate { time: f64 },
    Seeking,
    Seeked { time: f64 },
    VolumeChange,
    Click,
    /// Playback stalled waiting for data
    Waiting { time: f64 },
    /// Playback resumed after a stall
    Playing { time: f64 },
    FullscreenChange,
    QualityChange,
    MuteToggle,
}

impl PlaybackEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::Pause => "pause",
            Self::Ended { .. } => "ended",
            Self::TimeUpdate { .. } => "timeupdate",
            Self::Seeking => "seeking",
            Self::Seeked { .. } => "seeked",
            Self::VolumeChange => "volumechange",
            Self::Click => "click",
            Self::Waiting { .. } => "waiting",
            Self::Playing { .. } => "playing",
            Self::FullscreenChange => "fullscreenchange",
            Self::QualityChange => "qualitychange",
            Self::MuteToggle => "mutetoggle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event: PlaybackEvent =
            serde_json::from_str(r#"{"type":"time_update","time":12.5}"#).unwrap();
        assert_eq!(event, PlaybackEvent::TimeUpdate { time: 12.5 });
        assert_eq!(event.as_str(), "timeupdate");

        let event: PlaybackEvent = serde_json::from_str(r#"{"type":"pause"}"#).unwrap();
        assert_eq!(event, PlaybackEvent::Pause);
    }
}
