/// Formats a frame count as `MM:SS.mmm`. Minutes keep counting past the hour
/// and partial milliseconds are dropped.
#[inline]
pub fn frames_to_timecode(frames: usize, fps: f64) -> String {
    let millis = (frames as f64 * 1000.0 / fps) as u64;
    let seconds = millis / 1000;
    format!("{:02}:{:02}.{:03}", seconds / 60, seconds % 60, millis % 1000)
}

/// `current/last` as timecodes, the header of the stats overlay.
#[inline]
pub fn position_timecode(position: usize, last_index: usize, fps: f64) -> String {
    format!(
        "{}/{}",
        frames_to_timecode(position, fps),
        frames_to_timecode(last_index, fps)
    )
}

#[inline]
pub fn percent(share: f64) -> String {
    format!("{:.2}%", share * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecodes() {
        assert_eq!(frames_to_timecode(0, 25.0), "00:00.000");
        assert_eq!(frames_to_timecode(9, 30.0), "00:00.300");
        assert_eq!(frames_to_timecode(1, 30.0), "00:00.033");
        assert_eq!(frames_to_timecode(1500, 25.0), "01:00.000");
        assert_eq!(frames_to_timecode(90_000, 25.0), "60:00.000");
        assert_eq!(frames_to_timecode(1438, 30000.0 / 1001.0), "00:47.981");
    }

    #[test]
    fn timecodes_truncate() {
        assert_eq!(frames_to_timecode(2, 30.0), "00:00.066");
        assert_eq!(frames_to_timecode(1799, 30.0), "00:59.966");
        assert_eq!(frames_to_timecode(599_996, 10_000.0), "00:59.999");
    }

    #[test]
    fn position_and_percent() {
        assert_eq!(position_timecode(50, 99, 10.0), "00:05.000/00:09.900");
        assert_eq!(percent(0.421), "42.10%");
        assert_eq!(percent(1.0), "100.00%");
    }
}
