use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// 最近使用路徑的保留數量
pub const MAX_RECENT_PATHS: usize = 10;

/// CRF 可選範圍（與品質滑桿一致）
pub const MIN_CRF: u8 = 18;
pub const MAX_CRF: u8 = 35;
pub const DEFAULT_CRF: u8 = 28;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let video_extensions = self.video_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 壓縮相關設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    pub default_crf: u8,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            default_crf: DEFAULT_CRF,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub compression: CompressionSettings,
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FileTypeTable {
        FileTypeTable {
            video_file: vec![".mp4".to_string(), ".MKV".to_string()],
        }
    }

    #[test]
    fn test_is_video_file_case_insensitive() {
        let table = table();
        assert!(table.is_video_file(Path::new("/a/movie.MP4")));
        assert!(table.is_video_file(Path::new("/a/movie.mkv")));
        assert!(!table.is_video_file(Path::new("/a/notes.txt")));
        assert!(!table.is_video_file(Path::new("/a/no_extension")));
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: UserSettings = serde_json::from_str(r#"{"language":"zh-TW"}"#).unwrap();
        assert_eq!(settings.language, Language::ZhTw);
        assert_eq!(settings.compression.default_crf, DEFAULT_CRF);
        assert_eq!(settings.compression.ffmpeg_path, "ffmpeg");
        assert!(settings.recent_paths.is_empty());
    }
}
