mod kdotool;

pub use kdotool::Kdotool;

/// Snapshot of the focused window, captured once per action invocation.
/// The pid is what excludes the foreground app from suppression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveWindow {
    pub id: String,
    pub pid: Option<u32>,
    pub class: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: String,
    pub pid: Option<u32>,
}

/// Window/process introspection. An unavailable backend returns empty
/// results, which upstream reads as "no candidates".
#[cfg_attr(test, mockall::automock)]
pub trait WindowSystem {
    fn active_window(&self) -> Option<ActiveWindow>;
    /// Windows whose title or class matches the given pattern, as
    /// interpreted by the backend's own search.
    fn windows_matching(&self, pattern: &str) -> Vec<WindowInfo>;
    fn titles_for_pid(&self, pid: u32) -> Vec<String>;
}
