//! Terminal dimensions shared between the line editor and the resize watcher.

use std::sync::atomic::{AtomicU32, Ordering};

/// A window size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

/// Current terminal dimensions.
///
/// Written by the resize watcher and read by the renderer without
/// coordination; a render using a stale width is harmless. A width of
/// zero disables echo wrapping.
#[derive(Debug)]
pub struct TerminalSize {
    width: AtomicU32,
    height: AtomicU32,
}

impl TerminalSize {
    pub fn new(size: WindowSize) -> Self {
        Self {
            width: AtomicU32::new(size.width),
            height: AtomicU32::new(size.height),
        }
    }

    pub fn get(&self) -> WindowSize {
        WindowSize {
            width: self.width.load(Ordering::Relaxed),
            height: self.height.load(Ordering::Relaxed),
        }
    }

    pub fn set(&self, size: WindowSize) {
        self.width.store(size.width, Ordering::Relaxed);
        self.height.store(size.height, Ordering::Relaxed);
    }

    pub fn width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self::new(WindowSize::default())
    }
}
