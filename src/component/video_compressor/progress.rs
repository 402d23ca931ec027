use regex::Regex;
use std::io::{BufRead, BufReader, Read};
use std::sync::LazyLock;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("Invalid regex")
});

/// 從 ffmpeg 狀態行取出 `time=HH:MM:SS.ms`，回傳秒數
#[must_use]
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let caps = TIME_RE.captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// 已處理秒數對總長度的百分比，夾在 0..=100
#[must_use]
pub fn progress_percent(current_seconds: f64, duration_seconds: f64) -> f64 {
    if duration_seconds <= 0.0 {
        return 0.0;
    }
    (current_seconds / duration_seconds * 100.0).clamp(0.0, 100.0)
}

/// 逐行讀取 ffmpeg 的輸出
///
/// ffmpeg 的狀態更新以 `\r` 結尾而非換行，因此兩者都視為分行。
pub fn for_each_status_line<R: Read>(reader: R, mut on_line: impl FnMut(&str) -> bool) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let mut ended = false;
        loop {
            let available = match reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => {
                    ended = true;
                    break;
                }
            };
            if available.is_empty() {
                ended = true;
                break;
            }
            if let Some(pos) = available.iter().position(|b| *b == b'\r' || *b == b'\n') {
                buf.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                break;
            }
            let len = available.len();
            buf.extend_from_slice(available);
            reader.consume(len);
        }

        if !buf.is_empty() {
            let line = String::from_utf8_lossy(&buf);
            if !on_line(line.trim()) {
                return;
            }
        }
        if ended {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_time() {
        let line = "frame=  240 fps= 48 q=28.0 size=    1024kB time=00:01:30.00 bitrate= 93.2kbits/s speed=1.9x";
        assert!((parse_progress_time(line).unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_progress_time_hours_and_fraction() {
        let t = parse_progress_time("time=01:02:03.50").unwrap();
        assert!((t - 3723.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_progress_time_missing_or_na() {
        assert!(parse_progress_time("time=N/A bitrate=N/A").is_none());
        assert!(parse_progress_time("Stream mapping:").is_none());
    }

    #[test]
    fn test_progress_half_way() {
        let secs = parse_progress_time("time=00:01:30.00").unwrap();
        assert!((progress_percent(secs, 180.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_clamped() {
        assert!((progress_percent(200.0, 180.0) - 100.0).abs() < 1e-9);
        assert!(progress_percent(10.0, 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_lines_split_on_carriage_return() {
        let input = "Input #0\nframe=1 time=00:00:01.00\rframe=2 time=00:00:02.00\r\nlast";
        let mut lines = Vec::new();
        for_each_status_line(input.as_bytes(), |line| {
            lines.push(line.to_string());
            true
        });
        assert_eq!(
            lines,
            vec![
                "Input #0",
                "frame=1 time=00:00:01.00",
                "frame=2 time=00:00:02.00",
                "last"
            ]
        );
    }

    #[test]
    fn test_status_lines_stop_early() {
        let mut count = 0;
        for_each_status_line("a\nb\nc\n".as_bytes(), |_| {
            count += 1;
            count < 2
        });
        assert_eq!(count, 2);
    }
}
