//! UI primitives for the Passview CLI.
//!
//! - **Context**: Environment detection (TTY, color, unicode)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Badge tokens and colors
//! - **Render**: Badges, key-value lines, hints, errors
//! - **Tree**: Folder tree listing
//! - **Screen**: Alternate-screen display of a revealed entry

mod context;
mod mode;
pub mod render;
pub mod screen;
pub mod theme;
pub mod tree;

pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

pub use render::{badge, header, hint, kv, print, print_error};
