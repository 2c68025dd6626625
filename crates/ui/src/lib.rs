pub mod app;
pub mod components;
pub mod event_handler;
pub mod layout;
pub mod motion;
pub mod probe;
pub mod state;
pub mod theme;

pub use app::App;
pub use event_handler::{EventHandler, KeyAction};
pub use layout::TuiLayout;
pub use motion::PenMotion;
pub use probe::TerminalProbe;
pub use state::AppState;
pub use theme::Theme;
