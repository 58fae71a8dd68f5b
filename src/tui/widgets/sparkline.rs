/// Unicode block characters for sparkline
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Generate sparkline string from latency samples (milliseconds)
///
/// Gaps (refreshes where the port was unreachable) are drawn as `×`.
pub fn sparkline_string(data: &[Option<u64>], width: usize) -> String {
    if data.is_empty() || width == 0 {
        return String::new();
    }

    let samples: Vec<_> = data.iter().rev().take(width).rev().collect();

    let values: Vec<u64> = samples.iter().filter_map(|d| **d).collect();
    if values.is_empty() {
        return "×".repeat(samples.len());
    }

    let min = values.iter().copied().min().unwrap_or_default() as f64;
    let max = values.iter().copied().max().unwrap_or_default() as f64;
    let range = if max - min < 1.0 { 1.0 } else { max - min };

    samples
        .iter()
        .map(|sample| match sample {
            Some(ms) => {
                let normalized = (*ms as f64 - min) / range;
                let idx = (normalized * 7.0).round() as usize;
                BLOCKS[idx.min(7)]
            }
            None => '×',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(sparkline_string(&[], 10), "");
        assert_eq!(sparkline_string(&[Some(1)], 0), "");
    }

    #[test]
    fn test_scales_between_min_and_max() {
        let line = sparkline_string(&[Some(10), Some(20), Some(80)], 10);
        assert_eq!(line, "▁▂█");
    }

    #[test]
    fn test_flat_series_uses_lowest_block() {
        assert_eq!(sparkline_string(&[Some(5), Some(5)], 10), "▁▁");
    }

    #[test]
    fn test_gaps_and_width_limit() {
        let data = [Some(1), None, Some(8), None];
        assert_eq!(sparkline_string(&data, 3), "×▁×");
        assert_eq!(sparkline_string(&[None, None], 5), "××");
    }
}
