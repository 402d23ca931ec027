use crate::config::FileTypeTable;
use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static COMPRESSED_STEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_compressed_crf\d+$").expect("Invalid regex"));

/// 檔名是否為先前壓縮產生的輸出（`<stem>_compressed_crf<value>`）
#[must_use]
pub fn is_compressed_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| COMPRESSED_STEM_RE.is_match(stem))
}

/// 遞迴掃描資料夾內的影片檔案，依路徑排序
///
/// 先前壓縮產生的輸出檔不會列入。
pub fn scan_video_files(directory: &Path, file_type_table: &FileTypeTable) -> Result<Vec<PathBuf>> {
    let mut video_files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| file_type_table.is_video_file(entry.path()))
        .filter(|entry| !is_compressed_output(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    video_files.sort();
    Ok(video_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_video_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.mp4"), b"x").unwrap();
        fs::write(dir.path().join("a.MKV"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(nested.join("c.mov"), b"x").unwrap();

        let table = FileTypeTable {
            video_file: vec![".mp4".into(), ".mkv".into(), ".mov".into()],
        };
        let files = scan_video_files(dir.path(), &table).unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("a.MKV"),
                dir.path().join("b.mp4"),
                nested.join("c.mov"),
            ]
        );
    }

    #[test]
    fn test_scan_skips_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("movie.mp4"), b"x").unwrap();
        fs::write(dir.path().join("movie_compressed_crf28.mp4"), b"x").unwrap();
        fs::write(dir.path().join("movie_compressed_crf18.mkv"), b"x").unwrap();

        let table = FileTypeTable {
            video_file: vec![".mp4".into(), ".mkv".into()],
        };
        let files = scan_video_files(dir.path(), &table).unwrap();

        assert_eq!(files, vec![dir.path().join("movie.mp4")]);
    }

    #[test]
    fn test_is_compressed_output() {
        assert!(is_compressed_output(Path::new("/v/a_compressed_crf28.mp4")));
        assert!(!is_compressed_output(Path::new("/v/a_compressed_crf.mp4")));
        assert!(!is_compressed_output(Path::new("/v/a_compressed_crf28_final.mp4")));
        assert!(!is_compressed_output(Path::new("/v/a.mp4")));
    }
}
