//! Log-line formatting for playback diagnostics.
//!
//! Formatting is best-effort: a report that does not fit the fixed buffer is
//! truncated, never an error, because diagnostics must not gate playback.

use core::fmt::Write;

use playback::PlaybackReport;

/// Render a one-line summary of a finished session.
#[must_use]
pub fn format_report(report: &PlaybackReport) -> heapless::String<128> {
    let mut line = heapless::String::new();
    let _ = write!(
        line,
        "{}x{}: {} frames in {} ms (read {} ms, draw {} ms, worst {}+{} ms)",
        report.width,
        report.height,
        report.frames_played,
        report.total_ms,
        report.total_read_ms,
        report.total_draw_ms,
        report.max_read_ms,
        report.max_draw_ms,
    );
    line
}
