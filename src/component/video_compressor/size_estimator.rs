//! 輸出大小估算
//!
//! 依 CRF 區間套用固定比例，只是近似值，與實際編碼結果無關。

use super::crf::Crf;

/// (CRF 上限, 比例)，依序比對
const RATIO_BANDS: [(u8, f64); 5] = [(20, 0.80), (23, 0.60), (26, 0.45), (30, 0.30), (33, 0.20)];

/// CRF 超過最後一個區間時使用的比例
const LOWEST_QUALITY_RATIO: f64 = 0.12;

#[must_use]
pub fn compression_ratio(crf: Crf) -> f64 {
    RATIO_BANDS
        .iter()
        .find(|(upper, _)| crf.value() <= *upper)
        .map_or(LOWEST_QUALITY_RATIO, |(_, ratio)| *ratio)
}

#[must_use]
pub fn estimate_output_size(size_bytes: u64, crf: Crf) -> u64 {
    (size_bytes as f64 * compression_ratio(crf)).round() as u64
}

#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_CRF, MIN_CRF};

    #[test]
    fn test_estimate_is_non_increasing_across_crf_range() {
        let size = 100 * 1024 * 1024;
        let mut previous = u64::MAX;
        for value in MIN_CRF..=MAX_CRF {
            let estimate = estimate_output_size(size, Crf::new(value).unwrap());
            assert!(estimate <= previous, "CRF {value} 的估算值變大了");
            previous = estimate;
        }
    }

    #[test]
    fn test_band_boundaries() {
        let ratio = |v| compression_ratio(Crf::new(v).unwrap());
        assert!((ratio(20) - 0.80).abs() < f64::EPSILON);
        assert!((ratio(21) - 0.60).abs() < f64::EPSILON);
        assert!((ratio(23) - 0.60).abs() < f64::EPSILON);
        assert!((ratio(24) - 0.45).abs() < f64::EPSILON);
        assert!((ratio(26) - 0.45).abs() < f64::EPSILON);
        assert!((ratio(27) - 0.30).abs() < f64::EPSILON);
        assert!((ratio(30) - 0.30).abs() < f64::EPSILON);
        assert!((ratio(31) - 0.20).abs() < f64::EPSILON);
        assert!((ratio(33) - 0.20).abs() < f64::EPSILON);
        assert!((ratio(34) - 0.12).abs() < f64::EPSILON);
        assert!(ratio(20) > ratio(21) && ratio(23) > ratio(24) && ratio(33) > ratio(34));
    }

    #[test]
    fn test_estimate_output_size() {
        assert_eq!(estimate_output_size(1_000, Crf::new(28).unwrap()), 300);
        assert_eq!(estimate_output_size(0, Crf::new(18).unwrap()), 0);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
