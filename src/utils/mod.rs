// Utility functions
pub mod sanitize;

pub use sanitize::escape_html;
