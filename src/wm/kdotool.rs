use super::{ActiveWindow, WindowInfo, WindowSystem};
use crate::tool;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const TOOL: &str = "kdotool";

/// Window introspection via `kdotool` (KWin's xdotool counterpart, works
/// on Wayland). The binary is located once at startup; when it is absent
/// every query degrades to an empty result.
pub struct Kdotool {
    path: Option<PathBuf>,
}

impl Kdotool {
    /// Locate the binary: explicit override, then PATH, then the usual
    /// install locations.
    pub fn discover(override_path: Option<&Path>) -> Self {
        if let Some(path) = override_path {
            if is_executable(path) {
                return Self {
                    path: Some(path.to_path_buf()),
                };
            }
            log::warn!("KDOT_PATH {} is not executable, ignoring", path.display());
        }

        if let Some(path) = search_path(TOOL) {
            return Self { path: Some(path) };
        }

        let mut candidates = vec![
            PathBuf::from("/usr/local/bin/kdotool"),
            PathBuf::from("/usr/bin/kdotool"),
        ];
        if let Some(home) = dirs::home_dir() {
            candidates.insert(0, home.join(".cargo/bin/kdotool"));
        }
        let path = candidates.into_iter().find(|c| is_executable(c));
        if path.is_none() {
            log::warn!("kdotool not found; window matching is disabled");
        }
        Self { path }
    }

    pub fn path_display(&self) -> String {
        self.path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "NOT FOUND".to_string())
    }

    fn call(&self, args: &[&str]) -> Option<String> {
        let path = self.path.as_deref()?;
        match tool::run(TOOL, path, args) {
            Ok(out) => Some(out),
            Err(e) => {
                log::debug!("kdotool {:?} failed: {}", args, e);
                None
            }
        }
    }

    fn line(&self, args: &[&str]) -> Option<String> {
        self.call(args)
            .map(|out| out.trim().to_string())
            .filter(|out| !out.is_empty())
    }

    fn window_pid(&self, window_id: &str) -> Option<u32> {
        self.line(&["getwindowpid", window_id])
            .and_then(|pid| pid.parse().ok())
    }
}

impl WindowSystem for Kdotool {
    fn active_window(&self) -> Option<ActiveWindow> {
        let id = self.line(&["getactivewindow"])?;
        let pid = self.window_pid(&id);
        let class = self.line(&["getwindowclassname", &id]).unwrap_or_default();
        let title = self.line(&["getwindowname", &id]).unwrap_or_default();
        Some(ActiveWindow {
            id,
            pid,
            class,
            title,
        })
    }

    fn windows_matching(&self, pattern: &str) -> Vec<WindowInfo> {
        let Some(out) = self.call(&["search", pattern]) else {
            return Vec::new();
        };
        out.lines()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| WindowInfo {
                id: id.to_string(),
                pid: self.window_pid(id),
            })
            .collect()
    }

    fn titles_for_pid(&self, pid: u32) -> Vec<String> {
        let Some(out) = self.call(&["search", ".*"]) else {
            return Vec::new();
        };
        out.lines()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter(|id| self.window_pid(id) == Some(pid))
            .filter_map(|id| self.line(&["getwindowname", id]))
            .collect()
    }
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn search_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}
