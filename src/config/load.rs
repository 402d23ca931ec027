use crate::config::types::{Config, FileTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        let file_type_table = Self::load_embedded_file_type_table()?;
        let settings = match Self::load_settings(Path::new(SETTINGS_FILE)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("設定檔讀取失敗，改用預設值: {e:#}");
                UserSettings::default()
            }
        };

        Ok(Self {
            file_type_table,
            settings,
        })
    }

    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Language;

    #[test]
    fn test_embedded_table_contains_common_containers() {
        let table = Config::load_embedded_file_type_table().unwrap();
        for ext in [".mp4", ".mov", ".avi", ".mkv"] {
            assert!(table.video_file.iter().any(|e| e == ext), "missing {ext}");
        }
    }

    #[test]
    fn test_load_settings_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Config::load_settings(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_load_settings_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_settings(&path).is_err());
    }

    #[test]
    fn test_load_settings_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"language":"zh-TW","compression":{"default_crf":23}}"#,
        )
        .unwrap();
        let settings = Config::load_settings(&path).unwrap();
        assert_eq!(settings.language, Language::ZhTw);
        assert_eq!(settings.compression.default_crf, 23);
        assert_eq!(settings.compression.ffprobe_path, "ffprobe");
    }
}
