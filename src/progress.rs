// Progress accounting and the in-place terminal progress line.
//
// The transport reports a running total of body bytes via
// `on_bytes_read`; the tracker derives the increment itself by
// subtracting what it already knew. Rendering rewrites one line with a
// carriage return and is throttled to one redraw per 100ms, except that
// the completing frame always gets drawn.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Width of the bar between the brackets.
pub const BAR_WIDTH: usize = 50;

/// Minimum time between two redraws.
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Human-readable byte count: divide by 1024 until the value drops
/// under 1024, one decimal place, lowercase unit. Takes a float so the
/// same formatting serves byte counts and rates.
pub fn format_size(bytes: f64) -> String {
    let mut value = bytes;
    for unit in ["b", "kb", "mb", "gb"] {
        if value < 1024.0 {
            return format!("{value:.1}{unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1}tb")
}

/// Fixed-width bar plus percentage, e.g. `[=====-----] 50.0%`.
/// Returns an empty string when `total` is zero; there is no meaningful
/// percentage to draw.
pub fn progress_bar(current: u64, total: u64, width: usize) -> String {
    if total == 0 {
        return String::new();
    }
    let fraction = current as f64 / total as f64;
    let filled = ((width as f64 * fraction) as usize).min(width);
    let mut bar = "=".repeat(filled);
    bar.push_str(&"-".repeat(width - filled));
    format!("[{bar}] {:.1}%", fraction * 100.0)
}

/// One upload's lifecycle as the tracker sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    InProgress,
    Completed,
    Failed,
}

/// Accumulates transferred bytes for one upload and drives the terminal
/// progress line. Generic over the output sink so tests can capture the
/// rendered frames in a `Vec<u8>`.
pub struct ProgressTracker<W: Write> {
    total: u64,
    transferred: u64,
    start: Instant,
    last_render: Option<Instant>,
    phase: Phase,
    out: W,
}

impl ProgressTracker<io::Stdout> {
    /// Tracker for an upload of `total` body bytes, rendering to stdout.
    pub fn new(total: u64) -> Self {
        Self::with_writer(total, io::stdout())
    }
}

impl<W: Write> ProgressTracker<W> {
    pub fn with_writer(total: u64, out: W) -> Self {
        ProgressTracker {
            total,
            transferred: 0,
            start: Instant::now(),
            last_render: None,
            phase: Phase::Idle,
            out,
        }
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Called by the transport's read loop with the CUMULATIVE number of
    /// body bytes read so far. Must stay cheap: arithmetic plus at most
    /// one terminal write.
    pub fn on_bytes_read(&mut self, cumulative: u64) {
        if matches!(self.phase, Phase::Completed | Phase::Failed) {
            return;
        }
        self.phase = Phase::InProgress;

        // The running total never goes backwards; a stale or repeated
        // callback contributes a zero delta.
        let delta = cumulative.saturating_sub(self.transferred);
        self.transferred += delta;

        if self.total == 0 {
            return;
        }

        let now = Instant::now();
        let due = match self.last_render {
            None => true,
            Some(at) => now.duration_since(at) >= RENDER_INTERVAL,
        };
        if due || self.transferred >= self.total {
            self.render(now);
            self.last_render = Some(now);
        }
    }

    /// The transport finished with a terminal status; stop accepting
    /// callbacks and move to a fresh line.
    pub fn finish(&mut self) {
        self.close(Phase::Completed);
    }

    /// The transport failed; same line handling as `finish`.
    pub fn fail(&mut self) {
        self.close(Phase::Failed);
    }

    fn close(&mut self, phase: Phase) {
        if matches!(self.phase, Phase::Completed | Phase::Failed) {
            return;
        }
        if self.last_render.is_some() {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
        }
        self.phase = phase;
    }

    fn render(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.start).as_secs_f64();
        let rate = if elapsed > 0.0 {
            format!("{}/s", format_size(self.transferred as f64 / elapsed))
        } else {
            "calculating...".to_string()
        };
        let _ = write!(
            self.out,
            "\r{} {}/{} @ {}",
            progress_bar(self.transferred, self.total, BAR_WIDTH),
            format_size(self.transferred as f64),
            format_size(self.total as f64),
            rate,
        );
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renders(out: &[u8]) -> usize {
        out.iter().filter(|&&b| b == b'\r').count()
    }

    #[test]
    fn format_size_picks_the_first_fitting_unit() {
        assert_eq!(format_size(0.0), "0.0b");
        assert_eq!(format_size(1023.0), "1023.0b");
        assert_eq!(format_size(1536.0), "1.5kb");
        assert_eq!(format_size((2u64 * 1024 * 1024 * 1024) as f64), "2.0gb");
        assert_eq!(format_size((3u64 * 1024 * 1024 * 1024 * 1024) as f64), "3.0tb");
    }

    #[test]
    fn bar_is_fixed_width_with_floored_fill() {
        let bar = progress_bar(500, 1000, 50);
        let inner = &bar[..bar.find(']').unwrap() + 1];
        assert_eq!(inner.len(), 52);
        assert_eq!(bar, format!("[{}{}] 50.0%", "=".repeat(25), "-".repeat(25)));

        // 333/1000 of 50 slots is 16.65, which floors to 16.
        let bar = progress_bar(333, 1000, 50);
        assert!(bar.starts_with(&format!("[{}{}]", "=".repeat(16), "-".repeat(34))));
    }

    #[test]
    fn bar_extremes() {
        assert!(progress_bar(0, 1000, 50).starts_with(&format!("[{}] 0.0%", "-".repeat(50))));
        assert_eq!(progress_bar(1000, 1000, 50), format!("[{}] 100.0%", "=".repeat(50)));
    }

    #[test]
    fn bar_is_empty_for_zero_total() {
        assert_eq!(progress_bar(0, 0, 50), "");
    }

    #[test]
    fn tracker_accumulates_deltas_from_running_totals() {
        let mut tracker = ProgressTracker::with_writer(1000, Vec::new());
        for (cumulative, expected) in [(0u64, 0u64), (100, 100), (250, 250), (1000, 1000)] {
            tracker.on_bytes_read(cumulative);
            assert_eq!(tracker.transferred(), expected);
        }
    }

    #[test]
    fn transferred_never_decreases() {
        let mut tracker = ProgressTracker::with_writer(1000, Vec::new());
        tracker.on_bytes_read(600);
        tracker.on_bytes_read(400);
        assert_eq!(tracker.transferred(), 600);
    }

    #[test]
    fn redraws_are_throttled() {
        let mut tracker = ProgressTracker::with_writer(1000, Vec::new());
        // Two immediate calls, neither completing: the second lands well
        // inside the 100ms window and must not redraw.
        tracker.on_bytes_read(100);
        tracker.on_bytes_read(200);
        assert_eq!(renders(&tracker.out), 1);
    }

    #[test]
    fn completing_frame_is_always_rendered() {
        let mut tracker = ProgressTracker::with_writer(1000, Vec::new());
        tracker.on_bytes_read(100);
        tracker.on_bytes_read(1000);
        assert_eq!(renders(&tracker.out), 2);
        let text = String::from_utf8(tracker.out.clone()).unwrap();
        assert!(text.contains("] 100.0%"));
    }

    #[test]
    fn zero_total_renders_nothing() {
        let mut tracker = ProgressTracker::with_writer(0, Vec::new());
        tracker.on_bytes_read(0);
        tracker.on_bytes_read(10);
        assert!(tracker.out.is_empty());
        tracker.finish();
        assert!(tracker.out.is_empty());
    }

    #[test]
    fn terminal_states_stop_accepting_callbacks() {
        let mut tracker = ProgressTracker::with_writer(1000, Vec::new());
        tracker.on_bytes_read(300);
        tracker.finish();
        let frames = renders(&tracker.out);
        tracker.on_bytes_read(900);
        assert_eq!(tracker.transferred(), 300);
        assert_eq!(renders(&tracker.out), frames);
    }

    #[test]
    fn finish_moves_to_a_fresh_line_once() {
        let mut tracker = ProgressTracker::with_writer(1000, Vec::new());
        tracker.on_bytes_read(1000);
        tracker.finish();
        tracker.finish();
        assert_eq!(tracker.out.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn rendered_line_has_the_expected_shape() {
        let mut tracker = ProgressTracker::with_writer(1000, Vec::new());
        tracker.on_bytes_read(1000);
        let text = String::from_utf8(tracker.out.clone()).unwrap();
        let line = text.rsplit('\r').next().unwrap();
        assert!(line.starts_with('['));
        assert!(line.contains("1000.0b/1000.0b @ "));
        assert!(line.ends_with("/s") || line.ends_with("calculating..."));
    }
}
