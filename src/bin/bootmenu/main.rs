//! Bootmenu console entrypoint so the engine threads, the preview console and the
//! demo menu tree start as one runtime.
//!
//! # Architecture
//!
//! - Input thread: reads evdev nodes or the terminal and queues key/touch events
//! - Render thread: composes the display state onto the terminal canvas
//! - Progress thread: animates indeterminate and timed progress bars
//! - Main thread: walks the menu tree, blocking on each decision

mod menu;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use bootmenu::config::{AppConfig, InputBackend};
use bootmenu::device::{EvdevInput, InputDevice, LinuxSystem, SysfsStatus, SystemActions};
use bootmenu::preview::{TerminalCanvas, TerminalInput};
use bootmenu::telemetry::init_tracing;
use bootmenu::terminal_restore::TerminalRestoreGuard;
use bootmenu::ui::{
    DefaultHotkeys, DefaultKeyMap, Engine, EngineError, EngineOptions, EngineParts,
};
use bootmenu::{init_logging, log_debug, log_file_path};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    log_debug("=== Bootmenu Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let options = EngineOptions::from_config(&config)?;
    let input = open_input(&config)?;
    let system = Arc::new(LinuxSystem::from_config(&config));

    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    terminal_guard.enter_preview_screen(&mut stdout)?;
    if config.input == InputBackend::Terminal {
        terminal_guard.enable_mouse_capture(&mut stdout)?;
    }
    let canvas = TerminalCanvas::for_stdout(config.width, config.height)?;

    let engine = Engine::init(
        options,
        EngineParts {
            canvas: Box::new(canvas),
            input,
            status: Box::new(SysfsStatus::from_config(&config)),
            system: Arc::clone(&system) as Arc<dyn SystemActions>,
            keymap: Arc::new(DefaultKeyMap),
            hotkeys: Arc::new(DefaultHotkeys),
        },
    )
    .context("failed to start the menu engine")?;

    let outcome = menu::run(&engine, &config, system.as_ref());
    engine.shutdown();
    terminal_guard.restore();
    log_debug("=== Bootmenu Exited ===");
    outcome
}

fn open_input(config: &AppConfig) -> Result<Box<dyn InputDevice>> {
    match config.input {
        InputBackend::Terminal => {
            let input = TerminalInput::for_terminal(config.width, config.height)
                .map_err(EngineError::InputUnavailable)?;
            Ok(Box::new(input))
        }
        InputBackend::Evdev => {
            let opened = if config.input_devices.is_empty() {
                EvdevInput::open_dir(&config.input_dir)
            } else {
                EvdevInput::open(&config.input_devices)
            };
            let input = opened.map_err(EngineError::InputUnavailable)?;
            log_debug(&format!("evdev: {} node(s) open", input.device_count()));
            Ok(Box::new(input))
        }
    }
}
