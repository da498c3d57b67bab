use super::defaults::{MAX_LAYOUT_FILE_BYTES, MAX_SCREEN_DIMENSION, MIN_SCREEN_DIMENSION};
use super::{AppConfig, InputBackend, MAX_EVENT_QUEUE_CAPACITY, MIN_EVENT_QUEUE_CAPACITY};
use crate::ui::{Layout, LayoutOverrides};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{fs, path::Path};

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before any device is opened.
    pub fn validate(&mut self) -> Result<()> {
        for (flag, value) in [("--width", self.width), ("--height", self.height)] {
            if !(MIN_SCREEN_DIMENSION..=MAX_SCREEN_DIMENSION).contains(&value) {
                bail!(
                    "{flag} must be between {MIN_SCREEN_DIMENSION} and {MAX_SCREEN_DIMENSION} px, got {value}"
                );
            }
        }
        if !(10..=240).contains(&self.fast_fps) {
            bail!("--fast-fps must be between 10 and 240, got {}", self.fast_fps);
        }
        if self.slow_fps == 0 || self.slow_fps > self.fast_fps {
            bail!(
                "--slow-fps must be between 1 and --fast-fps ({}), got {}",
                self.fast_fps,
                self.slow_fps
            );
        }
        if !(1..=60).contains(&self.progress_fps) {
            bail!(
                "--progress-fps must be between 1 and 60, got {}",
                self.progress_fps
            );
        }
        if !(MIN_EVENT_QUEUE_CAPACITY..=MAX_EVENT_QUEUE_CAPACITY)
            .contains(&self.event_queue_capacity)
        {
            bail!(
                "--event-queue-capacity must be between {MIN_EVENT_QUEUE_CAPACITY} and {MAX_EVENT_QUEUE_CAPACITY}, got {}",
                self.event_queue_capacity
            );
        }
        if self.input == InputBackend::Evdev
            && self.input_devices.is_empty()
            && !self.input_dir.is_dir()
        {
            bail!(
                "--input-dir {} is not a directory and no --input-device was given",
                self.input_dir.display()
            );
        }
        for path in &self.input_devices {
            if path.as_os_str().is_empty() {
                bail!("--input-device cannot be empty");
            }
        }
        if let Some(layout) = self.layout.as_deref() {
            // Parse now so a bad file fails before the screen is taken over.
            load_layout_overrides(layout)?;
        }
        Ok(())
    }

    /// Screen layout with any JSON overrides applied.
    pub fn resolve_layout(&self) -> Result<Layout> {
        let base = Layout::new(self.width as i32, self.height as i32);
        match self.layout.as_deref() {
            Some(path) => Ok(base.with_overrides(&load_layout_overrides(path)?)),
            None => Ok(base),
        }
    }
}

/// Read a layout override file; unknown keys and oversized files are rejected.
pub fn load_layout_overrides(path: &Path) -> Result<LayoutOverrides> {
    let meta = fs::metadata(path)
        .with_context(|| format!("--layout {} is not readable", path.display()))?;
    if !meta.is_file() {
        bail!("--layout {} is not a file", path.display());
    }
    if meta.len() > MAX_LAYOUT_FILE_BYTES {
        bail!(
            "--layout {} is larger than {MAX_LAYOUT_FILE_BYTES} bytes",
            path.display()
        );
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout file {}", path.display()))?;
    let overrides: LayoutOverrides = serde_json::from_str(&raw)
        .with_context(|| format!("invalid layout file {}", path.display()))?;
    overrides.check()?;
    Ok(overrides)
}
