use anyhow::{Context, Result, bail};
use console::style;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use log::{debug, warn};
use std::path::Path;
use std::process::Command;

/// 縮圖尺寸設定（固定大小，不保留原始比例）
pub const THUMBNAIL_WIDTH: u32 = 320;
pub const THUMBNAIL_HEIGHT: u32 = 180;

/// 預覽縮圖，解碼失敗時改為文字佔位
#[derive(Debug, Clone)]
pub enum Thumbnail {
    Image(RgbImage),
    Placeholder(String),
}

/// 產生影片第一幀的縮圖
///
/// 任何錯誤都不會往外傳，只會得到 `Thumbnail::Placeholder`。
#[must_use]
pub fn generate_thumbnail(ffmpeg: &str, video_path: &Path) -> Thumbnail {
    match decode_first_frame(ffmpeg, video_path) {
        Ok(image) => Thumbnail::Image(image),
        Err(e) => {
            warn!("縮圖產生失敗 {}: {e:#}", video_path.display());
            Thumbnail::Placeholder(format!("{e:#}"))
        }
    }
}

fn decode_first_frame(ffmpeg: &str, video_path: &Path) -> Result<RgbImage> {
    let output = Command::new(ffmpeg)
        .args(["-hide_banner", "-nostdin", "-v", "error", "-i"])
        .arg(video_path)
        .args(["-frames:v", "1", "-an", "-sn", "-dn"])
        .args(["-f", "image2pipe", "-vcodec", "png", "-"])
        .output()
        .with_context(|| format!("無法執行 ffmpeg 擷取縮圖: {}", video_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg 擷取縮圖失敗: {}", stderr.trim());
    }
    if output.stdout.is_empty() {
        bail!("ffmpeg 沒有輸出任何影格: {}", video_path.display());
    }

    debug!(
        "擷取第一幀 {} ({} bytes)",
        video_path.display(),
        output.stdout.len()
    );
    frame_from_png(&output.stdout)
}

/// 從 PNG 資料載入影格並縮放成縮圖尺寸
pub fn frame_from_png(data: &[u8]) -> Result<RgbImage> {
    let frame = image::load_from_memory_with_format(data, ImageFormat::Png)
        .context("無法解碼影格")?;
    Ok(frame
        .resize_exact(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Triangle)
        .to_rgb8())
}

impl Thumbnail {
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// 轉成可在終端機顯示的文字行
    ///
    /// 每個字元使用上半方塊 `▀`，前景色為上方像素、背景色為下方像素，
    /// 所以一行文字代表兩列像素。
    #[must_use]
    pub fn render(&self, columns: u32, placeholder_text: &str) -> Vec<String> {
        match self {
            Self::Placeholder(reason) => {
                let mut lines = vec![style(placeholder_text).dim().to_string()];
                if !reason.is_empty() {
                    lines.push(style(reason).dim().italic().to_string());
                }
                lines
            }
            Self::Image(image) => {
                let columns = columns.max(1);
                let rows = (columns * image.height() / image.width().max(1)).max(2) / 2;
                let scaled = imageops::resize(image, columns, rows * 2, FilterType::Triangle);

                (0..rows)
                    .map(|row| {
                        (0..columns)
                            .map(|x| {
                                let top = scaled.get_pixel(x, row * 2);
                                let bottom = scaled.get_pixel(x, row * 2 + 1);
                                style("▀")
                                    .color256(ansi256(top))
                                    .on_color256(ansi256(bottom))
                                    .to_string()
                            })
                            .collect()
                    })
                    .collect()
            }
        }
    }
}

/// 將 RGB 對應到 xterm 256 色的 6x6x6 色塊
#[must_use]
pub fn ansi256(pixel: &Rgb<u8>) -> u8 {
    let level = |v: u8| ((u16::from(v) * 5 + 127) / 255) as u8;
    let [r, g, b] = pixel.0;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image: RgbImage = ImageBuffer::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_frame_is_resized_to_fixed_box() {
        let frame = frame_from_png(&png_bytes(640, 480)).unwrap();
        assert_eq!(frame.dimensions(), (THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT));
    }

    #[test]
    fn test_invalid_png_is_error() {
        assert!(frame_from_png(b"not a png").is_err());
    }

    #[test]
    fn test_missing_ffmpeg_gives_placeholder() {
        let thumb = generate_thumbnail("definitely-not-a-real-ffmpeg", Path::new("/tmp/x.mp4"));
        assert!(thumb.is_placeholder());

        let lines = thumb.render(40, "No preview");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], style("No preview").dim().to_string());
        assert!(lines[1].contains("/tmp/x.mp4"));
    }

    #[test]
    fn test_placeholder_without_reason_is_single_line() {
        let thumb = Thumbnail::Placeholder(String::new());
        assert_eq!(thumb.render(40, "No preview"), vec![style("No preview").dim().to_string()]);
    }

    #[test]
    fn test_render_line_count() {
        let thumb = Thumbnail::Image(frame_from_png(&png_bytes(64, 36)).unwrap());
        let lines = thumb.render(64, "");
        assert_eq!(lines.len(), 18);
    }

    #[test]
    fn test_ansi256_corners() {
        assert_eq!(ansi256(&Rgb([0, 0, 0])), 16);
        assert_eq!(ansi256(&Rgb([255, 255, 255])), 231);
        assert_eq!(ansi256(&Rgb([255, 0, 0])), 196);
        assert_eq!(ansi256(&Rgb([0, 0, 255])), 21);
    }
}
