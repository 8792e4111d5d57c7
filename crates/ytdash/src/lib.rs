//! # ytdash
//!
//! Command line dashboard for a YouTube channel: a sortable video table,
//! an upload calendar, view statistics and channel details.

pub mod app;
pub mod cli;
pub mod render;

pub use app::{fetch_with_retry, select_rows, Dashboard, FETCH_FAILED};
pub use cli::{Args, Command, OutputFormat};
pub use render::RenderContext;
