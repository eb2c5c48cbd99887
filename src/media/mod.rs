mod playerctl;

pub use playerctl::Playerctl;

use crate::error::ToolError;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
    Unknown,
}

impl PlaybackStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Playing" => PlaybackStatus::Playing,
            "Paused" => PlaybackStatus::Paused,
            "Stopped" => PlaybackStatus::Stopped,
            _ => PlaybackStatus::Unknown,
        }
    }
}

/// Media-player control, one player per MPRIS bus name.
///
/// Player state is queried live on every call; nothing here is cached.
/// `stop` surfaces backend failure so the caller can fall back to `pause`.
#[cfg_attr(test, mockall::automock)]
pub trait MediaPlayers {
    fn list(&self) -> Vec<String>;
    fn status(&self, name: &str) -> PlaybackStatus;
    fn url(&self, name: &str) -> Option<String>;
    fn pid(&self, name: &str) -> Option<u32>;
    fn pause(&self, name: &str) -> Result<(), ToolError>;
    fn play(&self, name: &str) -> Result<(), ToolError>;
    fn stop(&self, name: &str) -> Result<(), ToolError>;
}

/// Browsers expose per-tab players as `<name>.instance<pid>`; when the
/// metadata carries no pid this suffix is the only identity we get.
static INSTANCE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.instance(\d+)$").unwrap());

pub(crate) fn pid_from_instance_suffix(name: &str) -> Option<u32> {
    INSTANCE_SUFFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}
