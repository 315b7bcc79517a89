use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

const BAR_TEMPLATE: &str = "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} pieces {msg}";

/// Counts checked and failed pieces and mirrors the count on a terminal bar.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_pieces: usize,
    checked_pieces: Arc<AtomicUsize>,
    failed_pieces: Arc<AtomicUsize>,
    start_time: Instant,
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total_pieces: usize) -> Self {
        let bar = ProgressBar::new(total_pieces as u64);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style);
        }
        Self::with_bar(total_pieces, bar)
    }

    /// A tracker that draws nothing.
    pub fn hidden(total_pieces: usize) -> Self {
        Self::with_bar(total_pieces, ProgressBar::hidden())
    }

    fn with_bar(total_pieces: usize, bar: ProgressBar) -> Self {
        Self {
            total_pieces,
            checked_pieces: Arc::new(AtomicUsize::new(0)),
            failed_pieces: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
            bar,
        }
    }

    pub fn record(&self, passed: bool) {
        self.checked_pieces.fetch_add(1, Ordering::SeqCst);
        if !passed {
            let failed = self.failed_pieces.fetch_add(1, Ordering::SeqCst) + 1;
            self.bar.set_message(format!("{failed} bad"));
        }
        self.bar.inc(1);
    }

    pub fn is_complete(&self) -> bool {
        self.checked_pieces.load(Ordering::SeqCst) >= self.total_pieces
    }

    /// (checked, total)
    pub fn get_progress(&self) -> (usize, usize) {
        (
            self.checked_pieces.load(Ordering::SeqCst),
            self.total_pieces,
        )
    }

    pub fn failed(&self) -> usize {
        self.failed_pieces.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        let (checked, total) = self.get_progress();
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { checked as f64 / elapsed } else { 0.0 };
        self.bar.finish_and_clear();
        info!(
            "checked {}/{} pieces, {} failed ({:.1} pieces/sec)",
            checked,
            total,
            self.failed(),
            rate
        );
    }
}
