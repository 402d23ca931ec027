//! 影片壓縮元件
//!
//! 選擇影片、設定 CRF，呼叫 ffmpeg 產生壓縮後的副本

mod compression_runner;
mod crf;
mod ffmpeg_command;
mod file_queue;
mod main;
mod progress;
mod size_estimator;
mod thumbnail;

pub use compression_runner::{
    BatchSummary, CompressionEvent, CompressionRunner, EncodeOutcome, FfmpegToolchain,
    MediaToolchain, RunnerHandle, run_batch,
};
pub use crf::Crf;
pub use ffmpeg_command::{FfmpegCommand, VIDEO_CODEC, output_path_for};
pub use file_queue::FileQueue;
pub use main::{VideoCompressor, prompt_crf};
pub use progress::{for_each_status_line, parse_progress_time, progress_percent};
pub use size_estimator::{compression_ratio, estimate_output_size, format_size};
pub use thumbnail::{
    THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH, Thumbnail, ansi256, frame_from_png, generate_thumbnail,
};
