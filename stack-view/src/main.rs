//! Application entry point for the can stack viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use std::{fs, path::Path};

use anyhow::{Context, anyhow};
use log::info;
use stack_core::config::StackSettings;
use viewer::Viewer;

/// Reads a JSON settings preset. Missing fields keep their defaults.
fn load_preset(path: &Path) -> anyhow::Result<StackSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading preset {}", path.display()))?;
    let settings = serde_json::from_str(&text)
        .with_context(|| format!("parsing preset {}", path.display()))?;
    Ok(settings)
}

/// Starts the native eframe application.
///
/// An optional first argument names a JSON preset for the initial
/// settings; without it the defaults are used.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the preset cannot be read, the scene cannot be built, or
///   eframe fails to create the native window or event loop.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match std::env::args_os().nth(1) {
        Some(arg) => {
            let path = Path::new(&arg);
            let settings = load_preset(path)?;
            info!("loaded preset {}", path.display());
            settings
        }
        None => StackSettings::default(),
    };

    let viewer = Viewer::new(settings).context("building the demo scene")?;

    eframe::run_native(
        "Can Stack",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
    .map_err(|e| anyhow!("eframe: {e}"))
}
