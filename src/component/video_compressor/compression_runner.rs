//! 批次壓縮執行器
//!
//! 整批檔案在同一個背景執行緒中依序處理，進度透過 channel 傳回介面執行緒。
//! 介面端只讀取事件，不與工作執行緒共用任何可變狀態。

use super::crf::Crf;
use super::ffmpeg_command::FfmpegCommand;
use super::progress::{for_each_status_line, parse_progress_time, progress_percent};
use crate::config::CompressionSettings;
use crate::tools::probe_duration;
use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use rust_i18n::t;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// 失敗時保留的 stderr 行數
const STDERR_TAIL_LINES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeOutcome {
    Succeeded,
    Failed { code: Option<i32>, message: String },
    Cancelled,
}

/// 外部工具的介面：探測長度與執行編碼
pub trait MediaToolchain: Send + Sync {
    fn probe_duration(&self, path: &Path) -> Result<f64>;

    /// 執行編碼，每一行狀態輸出都會交給 `on_line`
    fn encode(
        &self,
        command: &FfmpegCommand,
        shutdown_signal: &AtomicBool,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<EncodeOutcome>;
}

/// 呼叫系統上的 ffmpeg / ffprobe
#[derive(Debug, Clone)]
pub struct FfmpegToolchain {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegToolchain {
    #[must_use]
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &CompressionSettings) -> Self {
        Self::new(&settings.ffmpeg_path, &settings.ffprobe_path)
    }

    #[must_use]
    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }
}

impl MediaToolchain for FfmpegToolchain {
    fn probe_duration(&self, path: &Path) -> Result<f64> {
        probe_duration(&self.ffprobe_path, path)
    }

    fn encode(
        &self,
        command: &FfmpegCommand,
        shutdown_signal: &AtomicBool,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<EncodeOutcome> {
        let mut child = command
            .build_command(&self.ffmpeg_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("無法啟動 ffmpeg: {}", self.ffmpeg_path))?;

        info!(
            "啟動壓縮 [{}]: {} -> {}",
            child.id(),
            command.source_path().display(),
            command.destination_path().display()
        );

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("無法取得 ffmpeg stderr"))?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        let mut interrupted = false;
        for_each_status_line(stderr, |line| {
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line.to_string());
            on_line(line);
            interrupted = shutdown_signal.load(Ordering::SeqCst);
            !interrupted
        });

        if interrupted {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => {
                    info!("中斷前 ffmpeg 已完成 [{}]，保留輸出", child.id());
                    return Ok(EncodeOutcome::Succeeded);
                }
                _ => {
                    warn!("收到中斷信號，終止程序 [{}]", child.id());
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(EncodeOutcome::Cancelled);
                }
            }
        }

        let status = child.wait().context("無法等待 ffmpeg 結束")?;
        Ok(exit_outcome(
            status.success(),
            status.code(),
            shutdown_signal.load(Ordering::SeqCst),
            tail,
        ))
    }
}

/// 依結束狀態判定結果；已成功結束的程序即使之後收到中斷也算完成
fn exit_outcome(
    success: bool,
    code: Option<i32>,
    interrupted: bool,
    tail: VecDeque<String>,
) -> EncodeOutcome {
    if success {
        EncodeOutcome::Succeeded
    } else if interrupted {
        EncodeOutcome::Cancelled
    } else {
        EncodeOutcome::Failed {
            code,
            message: tail.into_iter().collect::<Vec<_>>().join("\n"),
        }
    }
}

/// 工作執行緒送回介面的事件
#[derive(Debug, Clone, PartialEq)]
pub enum CompressionEvent {
    FileStarted {
        index: usize,
        total: usize,
        input: PathBuf,
        output: PathBuf,
    },
    Progress {
        index: usize,
        percent: f64,
    },
    FileSkipped {
        index: usize,
        input: PathBuf,
        reason: String,
    },
    FileCompleted {
        index: usize,
        input: PathBuf,
        output: PathBuf,
        output_size: u64,
    },
    FileFailed {
        index: usize,
        input: PathBuf,
        reason: String,
    },
    BatchFinished(BatchSummary),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: usize,
}

pub struct RunnerHandle {
    events: Receiver<CompressionEvent>,
    worker: JoinHandle<BatchSummary>,
}

impl RunnerHandle {
    #[must_use]
    pub const fn events(&self) -> &Receiver<CompressionEvent> {
        &self.events
    }

    pub fn join(self) -> Result<BatchSummary> {
        drop(self.events);
        self.worker
            .join()
            .map_err(|_| anyhow!("壓縮工作執行緒異常結束"))
    }
}

pub struct CompressionRunner;

impl CompressionRunner {
    /// 啟動背景執行緒處理整批檔案
    pub fn spawn<T>(
        toolchain: Arc<T>,
        files: Vec<PathBuf>,
        crf: Crf,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<RunnerHandle>
    where
        T: MediaToolchain + 'static,
    {
        let (sender, events) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("compression-worker".to_string())
            .spawn(move || run_batch(toolchain.as_ref(), &files, crf, &shutdown_signal, &sender))
            .context("無法建立壓縮工作執行緒")?;

        Ok(RunnerHandle { events, worker })
    }
}

fn send(sender: &Sender<CompressionEvent>, event: CompressionEvent) {
    if sender.send(event).is_err() {
        debug!("介面已關閉事件接收端");
    }
}

fn remove_partial_output(path: &Path) {
    if !path.is_file() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => info!("已刪除未完成的輸出檔案: {}", path.display()),
        Err(e) => error!("無法刪除未完成的輸出檔案 {}: {e}", path.display()),
    }
}

/// 依序處理每個檔案，回傳統計結果
pub fn run_batch(
    toolchain: &dyn MediaToolchain,
    files: &[PathBuf],
    crf: Crf,
    shutdown_signal: &AtomicBool,
    sender: &Sender<CompressionEvent>,
) -> BatchSummary {
    let total = files.len();
    let mut summary = BatchSummary {
        total,
        ..BatchSummary::default()
    };

    info!("開始壓縮任務，共 {total} 個檔案，CRF {crf}");

    for (index, input) in files.iter().enumerate() {
        if shutdown_signal.load(Ordering::SeqCst) {
            summary.cancelled += total - index;
            break;
        }

        let command = FfmpegCommand::new(input, crf);
        let output = command.destination_path().to_path_buf();
        send(
            sender,
            CompressionEvent::FileStarted {
                index,
                total,
                input: input.clone(),
                output: output.clone(),
            },
        );

        if files.contains(&output) {
            warn!("輸出會覆蓋佇列中的檔案，跳過 {}", input.display());
            summary.skipped += 1;
            send(
                sender,
                CompressionEvent::FileSkipped {
                    index,
                    input: input.clone(),
                    reason: t!("compressor.output_queued", path = output.display()).to_string(),
                },
            );
            continue;
        }

        let duration = match toolchain.probe_duration(input) {
            Ok(duration) => duration,
            Err(e) => {
                warn!("無法取得影片長度，跳過 {}: {e:#}", input.display());
                summary.skipped += 1;
                send(
                    sender,
                    CompressionEvent::FileSkipped {
                        index,
                        input: input.clone(),
                        reason: t!("compressor.duration_unavailable", reason = format!("{e:#}"))
                            .to_string(),
                    },
                );
                continue;
            }
        };

        let mut last_reported: i64 = -1;
        let mut on_line = |line: &str| {
            let Some(seconds) = parse_progress_time(line) else {
                return;
            };
            let percent = progress_percent(seconds, duration);
            let whole = percent.floor() as i64;
            if whole > last_reported {
                last_reported = whole;
                send(sender, CompressionEvent::Progress { index, percent });
            }
        };

        let outcome = toolchain
            .encode(&command, shutdown_signal, &mut on_line)
            .unwrap_or_else(|e| EncodeOutcome::Failed {
                code: None,
                message: format!("{e:#}"),
            });

        match outcome {
            EncodeOutcome::Succeeded => {
                let output_size = fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
                summary.completed += 1;
                info!("壓縮完成: {}", output.display());
                send(
                    sender,
                    CompressionEvent::FileCompleted {
                        index,
                        input: input.clone(),
                        output,
                        output_size,
                    },
                );
            }
            EncodeOutcome::Failed { code, message } => {
                remove_partial_output(&output);
                summary.failed += 1;
                let reason = match code {
                    Some(code) => format!("exit code {code}: {message}"),
                    None => message,
                };
                error!("壓縮失敗 {}: {reason}", input.display());
                send(
                    sender,
                    CompressionEvent::FileFailed {
                        index,
                        input: input.clone(),
                        reason,
                    },
                );
            }
            EncodeOutcome::Cancelled => {
                remove_partial_output(&output);
                summary.cancelled += total - index;
                break;
            }
        }
    }

    info!(
        "壓縮任務結束 - 成功: {}, 失敗: {}, 跳過: {}, 取消: {}",
        summary.completed, summary.failed, summary.skipped, summary.cancelled
    );
    send(sender, CompressionEvent::BatchFinished(summary));
    summary
}
