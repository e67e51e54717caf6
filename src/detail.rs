use std::time::{Duration, Instant};

use crate::domain::Seed;
use crate::error::SeedsError;

pub const COPY_RESET: Duration = Duration::from_millis(2000);

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), SeedsError>;
}

/// System clipboard. The handle is opened lazily and reopened after a
/// failure.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            inner: arboard::Clipboard::new().ok(),
        }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), SeedsError> {
        if self.inner.is_none() {
            self.inner = Some(
                arboard::Clipboard::new().map_err(|err| SeedsError::Clipboard(err.to_string()))?,
            );
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err(SeedsError::Clipboard("clipboard unavailable".to_string()));
        };
        let result = clipboard.set_text(text.to_string());
        if let Err(err) = result {
            self.inner = None;
            return Err(SeedsError::Clipboard(err.to_string()));
        }
        Ok(())
    }
}

/// The "copied" flag as a deadline. Dropping the indicator cancels it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyIndicator {
    deadline: Option<Instant>,
}

impl CopyIndicator {
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + COPY_RESET);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }
}

#[derive(Debug, Clone)]
pub struct DetailView {
    seed: Seed,
    copy: CopyIndicator,
}

impl DetailView {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            copy: CopyIndicator::default(),
        }
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub(crate) fn set_views(&mut self, views: u64) {
        self.seed.views = views;
    }

    /// Copies the seed code. A second copy inside the window restarts it.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> Result<(), SeedsError> {
        match clipboard.write_text(&self.seed.seed_code) {
            Ok(()) => {
                self.copy.start(now);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to copy seed code");
                self.copy.cancel();
                Err(err)
            }
        }
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copy.is_copied(now)
    }

    pub fn cancel_copy(&mut self) {
        self.copy.cancel();
    }

    /// `created_at` as e.g. "January 5, 2024"; the raw value if unparseable.
    pub fn format_created_at(&self) -> String {
        self.seed
            .created_at_parsed()
            .map(|date| date.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| self.seed.created_at.clone())
    }
}
