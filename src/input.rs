use crate::error::DaemonError;
use crate::hotkeys::{HotkeyAction, HotkeyMachine};
use evdev::{Device, InputEventKind, Key};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::io::ErrorKind;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Bounded poll timeout so the loop notices the shutdown flag promptly.
const POLL_TIMEOUT_MS: u16 = 1000;

/// Pause after a device read error before the next poll attempt.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(200);

pub struct InputSource {
    path: PathBuf,
    device: Device,
}

/// Open every event device that looks like a keyboard (advertises the
/// chord keys). Zero readable devices is the one fatal startup condition.
pub fn open_keyboards() -> Result<Vec<InputSource>, DaemonError> {
    let mut sources = Vec::new();
    for (path, device) in evdev::enumerate() {
        let is_keyboard = device
            .supported_keys()
            .map_or(false, |keys| {
                keys.contains(Key::KEY_LEFTCTRL) && keys.contains(Key::KEY_LEFTSHIFT)
            });
        if !is_keyboard {
            continue;
        }
        log::info!(
            "monitoring {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );
        sources.push(InputSource { path, device });
    }
    if sources.is_empty() {
        return Err(DaemonError::NoInputDevices);
    }
    Ok(sources)
}

/// Single-threaded event loop: multiplex all device fds with poll(2),
/// feed key events through the chord machine, run fired actions inline.
/// Running actions on this same thread is what serializes every
/// read-modify-write of the suppression state.
pub fn run_loop(
    mut sources: Vec<InputSource>,
    machine: &mut HotkeyMachine,
    mut on_action: impl FnMut(HotkeyAction),
    shutdown: &AtomicBool,
) -> Result<(), DaemonError> {
    while !shutdown.load(Ordering::Relaxed) {
        let ready = {
            let mut fds: Vec<PollFd> = sources
                .iter()
                .map(|s| {
                    // fd is owned by the Device, which outlives this poll set
                    let fd = unsafe { BorrowedFd::borrow_raw(s.device.as_raw_fd()) };
                    PollFd::new(fd, PollFlags::POLLIN)
                })
                .collect();
            match poll(&mut fds, PollTimeout::from(POLL_TIMEOUT_MS)) {
                Ok(0) => continue,
                Ok(_) => {}
                Err(nix::errno::Errno::EINTR) => continue,
                Err(e) => return Err(DaemonError::Io(std::io::Error::from(e))),
            }
            fds.iter()
                .enumerate()
                .filter(|(_, fd)| fd.revents().map_or(false, |r| !r.is_empty()))
                .map(|(i, _)| i)
                .collect::<Vec<_>>()
        };

        for index in ready {
            let source = &mut sources[index];
            match source.device.fetch_events() {
                Ok(events) => {
                    for event in events {
                        if let InputEventKind::Key(key) = event.kind() {
                            if let Some(action) =
                                machine.handle(key, event.value(), Instant::now())
                            {
                                log::debug!("chord fired: {:?}", action);
                                on_action(action);
                            }
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => {
                    // device may be gone (unplugged) or flaky; skip this
                    // cycle and let the next poll sort it out
                    log::warn!("read error on {}: {}", source.path.display(), e);
                    std::thread::sleep(READ_ERROR_BACKOFF);
                }
            }
        }
    }
    Ok(())
}
