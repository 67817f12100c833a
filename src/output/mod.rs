//! Console output
//!
//! - `config` - Output configuration
//! - `streaming` - Writes rendered lines as they are produced, with optional colors

mod config;
mod streaming;

pub use config::OutputConfig;
pub use streaming::StreamingFormatter;
