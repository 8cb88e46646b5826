use crate::capture::traits::ScrollMetrics;

/// Scroll depth in whole percent, clamped to `0..=100`.
///
/// Each quantity takes the first non-zero reading among the host's APIs. A
/// page that cannot scroll reports 0.
pub fn scroll_percent(metrics: &ScrollMetrics) -> u8 {
    let scroll_top = first_reading(&[
        metrics.window_page_y_offset,
        metrics.document_scroll_top,
        metrics.body_scroll_top,
    ]);
    let scroll_height = first_reading(&[metrics.document_scroll_height, metrics.body_scroll_height]);
    let viewport = first_reading(&[
        metrics.window_inner_height,
        metrics.document_client_height,
        metrics.body_client_height,
    ]);

    let height = scroll_height - viewport;
    if !(height > 0.0) {
        return 0;
    }

    let percent = (scroll_top / height * 100.0).round();
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0) as u8
}

fn first_reading(readings: &[Option<f64>]) -> f64 {
    readings
        .iter()
        .flatten()
        .copied()
        .find(|v| *v != 0.0 && !v.is_nan())
        .unwrap_or(0.0)
}
