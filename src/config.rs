/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// A missing file or missing keys fall back to defaults; a file that
/// cannot be read or parsed is reported as `ConfigError` so the caller
/// can warn and carry on with `GameConfig::default()`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::geometry::Viewport;
use crate::domain::physics::{
    PhysicsConstants, COYOTE_TIME, HORIZONTAL_SPEED, JUMP_DISTANCE, JUMP_HEIGHT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} parse error: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub viewport: Viewport,
    pub physics: PhysicsConstants,
    pub timing: TimingConfig,
    /// Level pack replacing the embedded levels.
    pub levels_file: Option<PathBuf>,
    pub log: LogConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub fps_refresh_ms: u64,
    pub frame_sleep_ms: u64,
    pub hold_timeout_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub quit: Vec<String>,
    pub palette: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    viewport: TomlViewport,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlViewport {
    #[serde(default = "default_width")]
    width: i32,
    #[serde(default = "default_height")]
    height: i32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_horizontal_speed")]
    horizontal_speed: f64,
    #[serde(default = "default_jump_height")]
    jump_height: f64,
    #[serde(default = "default_jump_distance")]
    jump_distance: f64,
    #[serde(default = "default_coyote_time")]
    coyote_time: f64,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_fps_refresh")]
    fps_refresh_ms: u64,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
    #[serde(default = "default_hold_timeout")]
    hold_timeout_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    levels_file: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default)]
    file: Option<String>,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
    #[serde(default = "default_pad_palette")]
    palette: Vec<String>,
}

// ── Defaults ──

fn default_width() -> i32 { 150 }
fn default_height() -> i32 { 40 }
fn default_horizontal_speed() -> f64 { HORIZONTAL_SPEED }
fn default_jump_height() -> f64 { JUMP_HEIGHT }
fn default_jump_distance() -> f64 { JUMP_DISTANCE }
fn default_coyote_time() -> f64 { COYOTE_TIME }
fn default_fps_refresh() -> u64 { 500 }
fn default_frame_sleep() -> u64 { 1 }
fn default_hold_timeout() -> u64 { 160 }   // > typical key-repeat delay
fn default_log_level() -> String { "info".into() }

fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_pad_palette() -> Vec<String> { vec!["Y".into()] }

impl Default for TomlViewport {
    fn default() -> Self {
        TomlViewport { width: default_width(), height: default_height() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            horizontal_speed: default_horizontal_speed(),
            jump_height: default_jump_height(),
            jump_distance: default_jump_distance(),
            coyote_time: default_coyote_time(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            fps_refresh_ms: default_fps_refresh(),
            frame_sleep_ms: default_frame_sleep(),
            hold_timeout_ms: default_hold_timeout(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: None, level: default_log_level() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            quit: default_pad_quit(),
            palette: default_pad_palette(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::build(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs)?;
        validate(&toml_cfg)?;
        Ok(Self::build(toml_cfg, &search_dirs))
    }

    /// Parse a config document. Relative paths stay relative to the CWD.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)
            .map_err(|source| ConfigError::Parse { path: PathBuf::from("config.toml"), source })?;
        validate(&toml_cfg)?;
        Ok(Self::build(toml_cfg, &[]))
    }

    fn build(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let p = &cfg.physics;
        GameConfig {
            viewport: Viewport::new(cfg.viewport.width, cfg.viewport.height),
            physics: PhysicsConstants::from_jump_arc(
                p.horizontal_speed,
                p.jump_height,
                p.jump_distance,
                p.coyote_time,
            ),
            timing: TimingConfig {
                fps_refresh_ms: cfg.timing.fps_refresh_ms,
                frame_sleep_ms: cfg.timing.frame_sleep_ms,
                hold_timeout_ms: cfg.timing.hold_timeout_ms,
            },
            levels_file: cfg.general.levels_file.map(|f| resolve_path(&f, search_dirs)),
            log: LogConfig {
                file: cfg.log.file.map(PathBuf::from),
                level: cfg.log.level,
            },
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                quit: cfg.gamepad.quit,
                palette: cfg.gamepad.palette,
            },
        }
    }
}

fn validate(cfg: &TomlConfig) -> Result<(), ConfigError> {
    if cfg.viewport.width <= 0 || cfg.viewport.height <= 0 {
        return Err(ConfigError::Invalid(format!(
            "viewport {}x{} must be positive",
            cfg.viewport.width, cfg.viewport.height
        )));
    }
    let p = &cfg.physics;
    if p.horizontal_speed <= 0.0 || p.jump_height <= 0.0 || p.jump_distance <= 0.0 {
        return Err(ConfigError::Invalid(
            "physics: horizontal_speed, jump_height and jump_distance must be positive".into(),
        ));
    }
    Ok(())
}

/// Absolute paths as-is; relative ones are looked up in the search dirs
/// and default to the CWD.
fn resolve_path(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// First `config.toml` found wins. None found means all defaults.
fn load_toml(search_dirs: &[PathBuf]) -> Result<TomlConfig, ConfigError> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        return toml::from_str::<TomlConfig>(&text)
            .map_err(|source| ConfigError::Parse { path, source });
    }
    Ok(TomlConfig::default())
}
