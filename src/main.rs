/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};

use config::GameConfig;
use sim::frame::{self, Control};
use sim::world::GameState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::TerminalDevice;

fn main() -> anyhow::Result<()> {
    let (config, config_err) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };
    if let Some(e) = &config_err {
        eprintln!("Warning: {e}");
        eprintln!("Using default settings.");
    }

    logging::init(&config.log)?;
    if let Some(e) = config_err {
        warn!(error = %e, "config fallback to defaults");
    }

    let levels = sim::level::load_levels(config.levels_file.as_deref())
        .context("loading levels")?;
    info!(levels = levels.len(), viewport = ?config.viewport, "starting");

    let mut state = GameState::new(
        levels,
        config.viewport,
        config.physics,
        Duration::from_millis(config.timing.fps_refresh_ms),
    );

    let mut device = TerminalDevice::new();
    let honor_release = match device.init() {
        Ok(h) => h,
        Err(e) => {
            // Leave the terminal usable even if setup failed halfway.
            let _ = device.cleanup();
            return Err(anyhow::Error::new(e).context("terminal init failed"));
        }
    };

    let result = run(&mut state, &mut device, &config, honor_release);

    device.cleanup().context("restoring terminal")?;
    result
}

fn run(
    state: &mut GameState,
    device: &mut TerminalDevice,
    config: &GameConfig,
    honor_release: bool,
) -> anyhow::Result<()> {
    let mut keyboard = InputState::new(
        honor_release,
        Duration::from_millis(config.timing.hold_timeout_ms),
    );
    let mut gamepad = GamepadState::new();
    gamepad.load_button_config(&config.gamepad);
    info!(gamepad = gamepad.connected, enhanced_keys = honor_release, "input ready");
    let frame_sleep = Duration::from_millis(config.timing.frame_sleep_ms);

    let mut last_frame = Instant::now();
    let mut dt = Duration::ZERO;

    loop {
        let mut events = frame::advance(state, dt);
        frame::present_pending(state, device).context("presenting frame")?;

        let mut transitions = keyboard.drain_events();
        transitions.extend(gamepad.update());
        if keyboard.ctrl_c_pressed() {
            info!("quit (ctrl+c)");
            break;
        }

        let control = frame::consume_input(state, &transitions, &mut events);
        frame::log_events(&events);
        if control == Control::Quit {
            info!("quit");
            break;
        }

        std::thread::sleep(frame_sleep);
        let now = Instant::now();
        dt = now - last_frame;
        last_frame = now;
    }

    Ok(())
}
