use std::sync::atomic::AtomicBool;
use std::sync::Arc;

mod classifier;
mod config;
mod error;
mod hotkeys;
mod input;
mod media;
mod mixer;
mod notify;
mod proc;
mod state;
mod suppress;
mod tool;
mod wm;

#[cfg(test)]
mod tests;

use config::{Config, ControlMode};
use error::DaemonError;
use hotkeys::HotkeyMachine;
use media::Playerctl;
use mixer::SystemMixer;
use notify::{DesktopNotifier, Notifier};
use state::StateStore;
use suppress::Suppressor;
use wm::Kdotool;

pub fn run() -> Result<(), DaemonError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let sources = input::open_keyboards()?;

    let store = StateStore::new(config.state_file());
    let players = Playerctl::new();
    let mixer = SystemMixer::new();
    let windows = Kdotool::discover(config.kdotool_path.as_deref());
    let notifier = DesktopNotifier;

    log::info!(
        "started: mode={:?}, kdotool='{}', url_pattern='{}'",
        config.control_mode,
        windows.path_display(),
        config.bgm_url_pattern.as_str()
    );
    notifier.notify(
        "hushkey running",
        match config.control_mode {
            ControlMode::Pause => "Ctrl+Shift+A: pause / S: resume / D: stop / M: toggle",
            ControlMode::Mute => "Ctrl+Shift+A: mute / S: unmute / M: toggle",
        },
    );

    let suppressor = Suppressor::new(&config, store, &players, &mixer, &windows, &notifier);

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))?;

    let mut machine = HotkeyMachine::new();
    input::run_loop(sources, &mut machine, |action| suppressor.handle(action), &shutdown)?;

    log::info!("shutting down on signal");
    Ok(())
}
