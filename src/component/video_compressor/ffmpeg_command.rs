use super::crf::Crf;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 固定使用的視訊編碼器
pub const VIDEO_CODEC: &str = "libx264";

/// 產生輸出路徑：與輸入同資料夾，檔名為 `<stem>_compressed_crf<value><.ext>`
#[must_use]
pub fn output_path_for(source_path: &Path, crf: Crf) -> PathBuf {
    let file_stem = source_path
        .file_stem()
        .map_or_else(|| OsString::from("output"), ToOwned::to_owned);

    let mut file_name = file_stem;
    file_name.push(format!("_compressed_crf{crf}"));
    if let Some(ext) = source_path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }

    source_path.with_file_name(file_name)
}

pub struct FfmpegCommand {
    source_path: PathBuf,
    destination_path: PathBuf,
    crf: Crf,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(source_path: &Path, crf: Crf) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            destination_path: output_path_for(source_path, crf),
            crf,
        }
    }

    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// 傳給 ffmpeg 的參數：輸入、編碼器、CRF、覆寫旗標、輸出
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(self.source_path.clone().into_os_string());
        args.extend(
            [
                "-vcodec".to_string(),
                VIDEO_CODEC.to_string(),
                "-crf".to_string(),
                self.crf.to_string(),
                "-y".to_string(),
            ]
            .map(OsString::from),
        );
        args.push(self.destination_path.clone().into_os_string());
        args
    }

    #[must_use]
    pub fn build_command(&self, ffmpeg: &str) -> Command {
        let mut cmd = Command::new(ffmpeg);
        cmd.args(self.args());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crf(value: u8) -> Crf {
        Crf::new(value).unwrap()
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("movie.mp4"), crf(28)),
            PathBuf::from("movie_compressed_crf28.mp4")
        );
        assert_eq!(
            output_path_for(Path::new("/videos/test.video.name.mov"), crf(23)),
            PathBuf::from("/videos/test.video.name_compressed_crf23.mov")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        assert_eq!(
            output_path_for(Path::new("/videos/clip"), crf(30)),
            PathBuf::from("/videos/clip_compressed_crf30")
        );
    }

    #[test]
    fn test_args_order() {
        let cmd = FfmpegCommand::new(Path::new("/videos/a.mkv"), crf(18));
        let args: Vec<String> = cmd
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-nostdin",
                "-i",
                "/videos/a.mkv",
                "-vcodec",
                "libx264",
                "-crf",
                "18",
                "-y",
                "/videos/a_compressed_crf18.mkv",
            ]
        );
    }
}
