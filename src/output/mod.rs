//! Output processing for text produced outside the shell (child processes).

mod sanitizer;

pub use sanitizer::sanitize;
