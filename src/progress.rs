//! Progress sinks for long-running operations.
//!
//! Reporters only observe: nothing they do can change the result of the
//! operation that feeds them.

use indicatif::{ProgressBar, ProgressStyle};

pub trait ProgressReporter: Send + Sync {
    /// Called with the completed fraction of the operation, in `[0, 1]`.
    fn report(&self, fraction: f64);
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _fraction: f64) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Maps the progress of one part of a multi-part operation onto that part's
/// slice of the overall range.
pub struct Scaled<'a> {
    inner: &'a dyn ProgressReporter,
    offset: f64,
    span: f64,
}

impl<'a> Scaled<'a> {
    /// The `index`-th (0-based) of `parts` equally sized parts.
    pub fn part(inner: &'a dyn ProgressReporter, index: usize, parts: usize) -> Self {
        let span = 1.0 / parts.max(1) as f64;
        Scaled {
            inner,
            offset: index as f64 * span,
            span,
        }
    }
}

impl ProgressReporter for Scaled<'_> {
    fn report(&self, fraction: f64) {
        let overall = self.offset + fraction.clamp(0.0, 1.0) * self.span;
        self.inner.report(overall.min(1.0));
    }
}

const BAR_TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {percent:>3}%";

/// Progress bar on stderr for interactive use.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new(message: &'static str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message(message);
        TerminalProgress { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for TerminalProgress {
    fn report(&self, fraction: f64) {
        self.bar
            .set_position((fraction.clamp(0.0, 1.0) * 100.0).round() as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_reporter() {
        let seen = Mutex::new(Vec::new());
        let reporter = |f: f64| seen.lock().unwrap().push(f);
        reporter.report(0.5);
        reporter.report(1.0);
        assert_eq!(*seen.lock().unwrap(), vec![0.5, 1.0]);
    }

    #[test]
    fn test_scaled_parts() {
        let seen = Mutex::new(Vec::new());
        let reporter = |f: f64| seen.lock().unwrap().push(f);

        Scaled::part(&reporter, 0, 4).report(1.0);
        Scaled::part(&reporter, 2, 4).report(0.5);
        Scaled::part(&reporter, 3, 4).report(1.0);

        assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.625, 1.0]);
    }

    #[test]
    fn test_terminal_progress_accepts_out_of_range() {
        let progress = TerminalProgress::new("test");
        progress.report(-1.0);
        progress.report(2.0);
        assert_eq!(progress.bar.position(), 100);
        progress.finish();
    }
}
