use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use std::path::Path;
use std::process::Command;

/// 使用 ffprobe 取得影片總長度（秒）
///
/// 只查詢容器的 `duration` 欄位，以純文字格式輸出。
/// 任何執行錯誤或無法解析的輸出都視為「無法取得」。
pub fn probe_duration(ffprobe: &str, path: &Path) -> Result<f64> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {}", stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration = parse_duration_output(&stdout)
        .ok_or_else(|| anyhow!("無法解析影片長度: {:?}", stdout.trim()))?;

    debug!("{} 長度 {duration:.3}s", path.display());
    Ok(duration)
}

/// 解析 ffprobe 的長度輸出（取第一個非空白行）
#[must_use]
pub fn parse_duration_output(output: &str) -> Option<f64> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}
