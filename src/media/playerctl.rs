use super::{pid_from_instance_suffix, MediaPlayers, PlaybackStatus};
use crate::error::ToolError;
use crate::tool;

const TOOL: &str = "playerctl";

/// MPRIS adapter shelling out to `playerctl`. A missing binary degrades
/// every query to "no players"; control calls report their failure to the
/// caller.
pub struct Playerctl;

impl Playerctl {
    pub fn new() -> Self {
        Self
    }

    fn metadata(&self, name: &str, format: &str) -> Option<String> {
        tool::run(TOOL, TOOL, ["-p", name, "metadata", "--format", format])
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|out| !out.is_empty())
    }

    fn control(&self, name: &str, verb: &str) -> Result<(), ToolError> {
        tool::run(TOOL, TOOL, ["-p", name, verb]).map(|_| ())
    }
}

impl Default for Playerctl {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlayers for Playerctl {
    fn list(&self) -> Vec<String> {
        match tool::run(TOOL, TOOL, ["-l"]) {
            Ok(out) => out
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Err(e) => {
                log::debug!("playerctl list failed: {}", e);
                Vec::new()
            }
        }
    }

    fn status(&self, name: &str) -> PlaybackStatus {
        match tool::run(TOOL, TOOL, ["-p", name, "status"]) {
            Ok(out) => PlaybackStatus::parse(&out),
            Err(_) => PlaybackStatus::Unknown,
        }
    }

    fn url(&self, name: &str) -> Option<String> {
        self.metadata(name, "{{xesam:url}}")
    }

    fn pid(&self, name: &str) -> Option<u32> {
        self.metadata(name, "{{mpris:pid}}")
            .and_then(|pid| pid.parse().ok())
            .or_else(|| pid_from_instance_suffix(name))
    }

    fn pause(&self, name: &str) -> Result<(), ToolError> {
        self.control(name, "pause")
    }

    fn play(&self, name: &str) -> Result<(), ToolError> {
        self.control(name, "play")
    }

    fn stop(&self, name: &str) -> Result<(), ToolError> {
        self.control(name, "stop")
    }
}
