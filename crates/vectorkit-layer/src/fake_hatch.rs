//! Fake hatch detection
//!
//! Some slicers write a continuous polyline as a hatch set whose segments
//! are chained: the end of segment `i` is the start of segment `i + 1`. The
//! split below finds maximal chained runs and re-expresses each as a
//! polyline, leaving the unchained segments as hatches in their original
//! order.

use vectorkit_core::VectorData;

fn close(a: (f32, f32), b: (f32, f32), epsilon: f32) -> bool {
    (a.0 - b.0).abs() <= epsilon && (a.1 - b.1).abs() <= epsilon
}

/// Split `x1 y1 x2 y2` hatch coordinates into hatch and polyline payloads
///
/// Runs of two or more chained segments become [`VectorData::LineSequence`];
/// everything else stays [`VectorData::Hatches`]. A trailing partial segment
/// is ignored.
pub fn split_fake_hatches(coords: &[f32], epsilon: f32) -> Vec<VectorData> {
    let segments: Vec<&[f32]> = coords.chunks_exact(4).collect();
    let mut out = Vec::new();
    let mut hatches: Vec<f32> = Vec::new();

    let mut i = 0;
    while i < segments.len() {
        let mut run_end = i;
        while run_end + 1 < segments.len() {
            let end = (segments[run_end][2], segments[run_end][3]);
            let next_start = (segments[run_end + 1][0], segments[run_end + 1][1]);
            if !close(end, next_start, epsilon) {
                break;
            }
            run_end += 1;
        }

        if run_end == i {
            hatches.extend_from_slice(segments[i]);
        } else {
            if !hatches.is_empty() {
                out.push(VectorData::Hatches(std::mem::take(&mut hatches)));
            }
            let mut line = Vec::with_capacity((run_end - i + 2) * 2);
            line.extend_from_slice(&segments[i][..2]);
            for segment in &segments[i..=run_end] {
                line.extend_from_slice(&segment[2..]);
            }
            out.push(VectorData::LineSequence(line));
        }
        i = run_end + 1;
    }

    if !hatches.is_empty() {
        out.push(VectorData::Hatches(hatches));
    }
    out
}
