use std::process::ExitStatus;
use thiserror::Error;

/// Errors from the external control tools (playerctl, wpctl, pactl, kdotool).
///
/// A missing tool is not fatal: the operation that needed it degrades to
/// "no candidates". A non-zero exit matters to callers that have a fallback
/// (stop falls back to pause).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} not found on this system")]
    Missing { tool: &'static str },
    #[error("{tool} exited with {status}")]
    Failed { tool: &'static str, status: ExitStatus },
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("no readable input event devices under /dev/input (add the user to the `input` group or install a udev rule)")]
    NoInputDevices,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
