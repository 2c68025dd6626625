pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod layout;
pub mod logging;
pub mod message;
pub mod overflow;
pub mod page;
pub mod pointer;
pub mod queue;
pub mod runtime;
pub mod typewriter;

pub use config::{
    Config, DisplayConfig, EngineConfig, FileLoggingConfig, InkColors, PointerConfig, PrivacyConfig, parse_hex_color,
};
pub use engine::{Engine, EngineEvent, PageView, Phase};
pub use error::{Error, PageError, Result};
pub use feed::{FeedEvent, StatsUpdate, group_thousands};
pub use layout::{LayoutProbe, Measured, MonospaceProbe, Point, Rect};
pub use logging::{LogFormat, LoggingConfig, init_logging, redact_text};
pub use message::{IncomingMessage, Line, MessageId};
pub use overflow::OverflowGuard;
pub use page::Page;
pub use pointer::{Easing, OFFSCREEN, PointerPose, Stance, pose_for};
pub use queue::MessageQueue;
pub use runtime::{Command, EngineHandle, EngineTask};
pub use typewriter::{TypeStep, Typewriter};
