//! Session file generation
//!
//! Turns a lab topology into SecureCRT session files.
//!
//! Components:
//! - `sanitizer`: maps display names to filesystem-safe names.
//! - `template_renderer`: copy-then-edit placeholder substitution.
//! - `session_generator`: per-lab directory management and per-node rendering.

pub mod sanitizer;
pub mod session_generator;
pub mod template_renderer;

pub use sanitizer::{sanitize, SanitizedName, INVALID_CHARS};
pub use session_generator::{
    connect_command, GenerationReport, SessionGenerator, EXCLUDED_DEVICE_CLASSES,
};
