use std::fs;
use std::path::Path;

/// Binary name for a pid, from `/proc/<pid>/exe` (resolved executable)
/// with `/proc/<pid>/comm` as the fallback when the link is unreadable
/// (e.g. a process owned by another user).
pub fn binary_name(pid: u32) -> Option<String> {
    let proc_dir = Path::new("/proc").join(pid.to_string());

    if let Ok(exe) = fs::read_link(proc_dir.join("exe")) {
        if let Some(name) = exe.file_name().and_then(|n| n.to_str()) {
            return Some(name.to_string());
        }
    }

    fs::read_to_string(proc_dir.join("comm"))
        .ok()
        .map(|comm| comm.trim().to_string())
        .filter(|comm| !comm.is_empty())
}
