use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use std::io;

/// Position of the launch list inside its viewport, in terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub viewport_height: usize,
    pub scroll_top: usize,
    pub content_height: usize,
}

impl ScrollMetrics {
    /// Bottom of the content is visible, with one row of tolerance.
    pub fn at_bottom(&self) -> bool {
        self.viewport_height + self.scroll_top + 1 >= self.content_height
    }

    pub fn max_scroll_top(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn clamp(self) -> Self {
        Self {
            scroll_top: self.scroll_top.min(self.max_scroll_top()),
            ..self
        }
    }

    pub fn scrolled_by(self, delta: isize) -> Self {
        let top = if delta < 0 {
            self.scroll_top.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_top.saturating_add(delta as usize)
        };
        Self {
            scroll_top: top,
            ..self
        }
        .clamp()
    }
}

/// Mouse scroll events are only delivered while this is alive; dropping it releases the
/// terminal's mouse capture on every exit path.
pub struct ScrollSubscription {
    _private: (),
}

impl ScrollSubscription {
    pub fn acquire() -> Result<Self> {
        execute!(io::stdout(), EnableMouseCapture).context("enable mouse capture")?;
        Ok(Self { _private: () })
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture);
    }
}
