pub mod footer;
pub mod header;
pub mod pen;
pub mod stats;
pub mod tablet;

pub use footer::Footer;
pub use header::Header;
pub use pen::{PEN_GLYPH, Pen};
pub use stats::StatsPanel;
pub use tablet::{Tablet, scroll_offset};
