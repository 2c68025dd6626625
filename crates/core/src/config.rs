use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Engine timing and capacity constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Completed lines a page holds before it is wiped
    pub page_capacity: usize,

    /// Delay between two revealed characters
    pub char_interval_ms: u64,

    /// Time the pen spends travelling to a new line before typing starts
    pub travel_delay_ms: u64,

    /// Duration of the page wipe
    pub clear_delay_ms: u64,

    /// Distance kept free between the text and the container's right edge
    pub safety_margin: f32,

    /// How many recently seen message ids are remembered for deduplication
    pub dedup_window: usize,

    /// Marker appended to a line truncated on overflow
    pub ellipsis: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_capacity: 12,
            char_interval_ms: 30,
            travel_delay_ms: 600,
            clear_delay_ms: 800,
            safety_margin: 20.0,
            dedup_window: 1024,
            ellipsis: "…".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn char_interval(&self) -> Duration {
        Duration::from_millis(self.char_interval_ms)
    }

    pub fn travel_delay(&self) -> Duration {
        Duration::from_millis(self.travel_delay_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }
}

/// Ink colors stamped onto each line when it is opened
///
/// `wet` is used while the line is still being written, `dry` once it settles.
/// Values are `#rrggbb` strings and are passed through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InkColors {
    pub wet: String,
    pub dry: String,
}

impl Default for InkColors {
    fn default() -> Self {
        Self { wet: "#00ff41".to_string(), dry: "#4ade80".to_string() }
    }
}

impl InkColors {
    pub fn new(wet: impl Into<String>, dry: impl Into<String>) -> Self {
        Self { wet: wet.into(), dry: dry.into() }
    }

    /// Check both colors are `#rrggbb`
    pub fn validate(&self) -> Result<()> {
        for value in [&self.wet, &self.dry] {
            if parse_hex_color(value).is_none() {
                return Err(Error::Config(ConfigError::InvalidColor(value.clone()).to_string()));
            }
        }
        Ok(())
    }
}

/// Parse a `#rrggbb` color into its components
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Pen choreography tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointerConfig {
    /// Offset from the caret to where the pen image should be placed
    pub tip_offset_x: f32,
    pub tip_offset_y: f32,

    /// Distance past the container's right edge where the pen parks
    pub park_gap: f32,

    /// Peak of the cyclical writing wobble
    pub jitter_amplitude: f32,

    /// Bound of the random noise added on top of the wobble
    pub noise: f32,

    /// Noise generator seed; 0 seeds from the OS
    pub seed: u64,

    pub park_transition_ms: u64,
    pub travel_transition_ms: u64,
    pub park_blur: f32,
    pub travel_blur: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            tip_offset_x: 0.0,
            tip_offset_y: 0.0,
            park_gap: 40.0,
            jitter_amplitude: 3.0,
            noise: 1.0,
            seed: 0,
            park_transition_ms: 1200,
            travel_transition_ms: 500,
            park_blur: 8.0,
            travel_blur: 1.5,
        }
    }
}

/// Host-side display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Line typed before any feed message; empty disables it
    pub boot_message: String,

    /// Blank rows between written lines
    pub line_spacing: u16,

    /// Redraw cadence of the renderer
    pub frame_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            boot_message: "SYSTEM ONLINE... WAITING FOR INPUT...".to_string(),
            line_spacing: 1,
            frame_interval_ms: 16,
        }
    }
}

impl DisplayConfig {
    pub fn boot_message(&self) -> Option<&str> {
        let message = self.boot_message.trim();
        if message.is_empty() { None } else { Some(message) }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default stderr filter
    pub level: String,
    /// `pretty`, `json` or `compact`
    pub format: String,
    pub file: FileLoggingConfig,
    pub privacy: PrivacyConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            file: FileLoggingConfig::default(),
            privacy: PrivacyConfig::default(),
        }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: "debug".to_string() }
    }
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrivacyConfig {
    /// Message text longer than this is cut before it reaches a log line
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { truncate_length: 40 }
    }
}

/// Root configuration structure for quill.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub engine: EngineConfig,
    pub ink: InkColors,
    pub pointer: PointerConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;
        if engine.page_capacity == 0 {
            return Err(Error::Config(ConfigError::ZeroCapacity.to_string()));
        }

        for (name, value) in [
            ("engine.char_interval_ms", engine.char_interval_ms),
            ("engine.travel_delay_ms", engine.travel_delay_ms),
            ("engine.clear_delay_ms", engine.clear_delay_ms),
            ("display.frame_interval_ms", self.display.frame_interval_ms),
        ] {
            if value == 0 {
                return Err(Error::Config(ConfigError::InvalidDuration(name.to_string()).to_string()));
            }
        }

        for (name, value) in [
            ("engine.safety_margin", engine.safety_margin),
            ("pointer.park_gap", self.pointer.park_gap),
            ("pointer.jitter_amplitude", self.pointer.jitter_amplitude),
            ("pointer.noise", self.pointer.noise),
            ("pointer.park_blur", self.pointer.park_blur),
            ("pointer.travel_blur", self.pointer.travel_blur),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(ConfigError::InvalidNumber(name.to_string()).to_string()));
            }
        }

        if !self.pointer.tip_offset_x.is_finite() || !self.pointer.tip_offset_y.is_finite() {
            return Err(Error::Config(ConfigError::InvalidNumber("pointer.tip_offset".to_string()).to_string()));
        }

        self.ink.validate()
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r##"# Quill Configuration Example
# Every key is optional; the values below are the defaults.

[engine]
# Completed lines per page before the page is wiped
page_capacity = 12
# Milliseconds between two revealed characters
char_interval_ms = 30
# Milliseconds the pen travels before a new line starts
travel_delay_ms = 600
# Milliseconds the page wipe lasts
clear_delay_ms = 800
# Space kept free at the right edge of the writable area
safety_margin = 20.0
# Recently seen message ids remembered for deduplication
dedup_window = 1024
# Marker appended to lines cut short by the right edge
ellipsis = "…"

[ink]
# Fresh ink, used while a line is being written
wet = "#00ff41"
# Settled ink, used once the line is complete
dry = "#4ade80"

[pointer]
# Offset between the caret and the pen tip
tip_offset_x = 0.0
tip_offset_y = 0.0
# How far past the right edge the pen parks
park_gap = 40.0
# Writing wobble and random noise bounds
jitter_amplitude = 3.0
noise = 1.0
# 0 seeds the noise from the OS
seed = 0

[display]
# Typed before any feed message; set to "" to disable
boot_message = "SYSTEM ONLINE... WAITING FOR INPUT..."
line_spacing = 1
frame_interval_ms = 16

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = false
level = "debug"

[logging.privacy]
truncate_length = 40
"##
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Color is not `#rrggbb`
    #[error("invalid color (expected #rrggbb): {0}")]
    InvalidColor(String),

    /// Duration must be at least one millisecond
    #[error("duration must be at least 1ms: {0}")]
    InvalidDuration(String),

    /// Number must be finite and non-negative
    #[error("expected a finite, non-negative number: {0}")]
    InvalidNumber(String),

    /// Page must hold at least one line
    #[error("page_capacity must be at least 1")]
    ZeroCapacity,

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
