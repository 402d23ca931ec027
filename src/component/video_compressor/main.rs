//! 影片壓縮表單
//!
//! 以終端機互動介面呈現：檔案佇列、CRF 設定、縮圖預覽、估算大小與進度條。

use super::compression_runner::{BatchSummary, CompressionEvent, CompressionRunner, FfmpegToolchain};
use super::crf::Crf;
use super::file_queue::FileQueue;
use super::size_estimator::{estimate_output_size, format_size};
use super::thumbnail::generate_thumbnail;
use crate::config::save::{add_recent_path, save_settings};
use crate::config::{Config, MAX_CRF, MIN_CRF};
use crate::pause;
use crate::tools::{
    parse_dropped_paths, probe_duration, resolve_typed_path, scan_video_files, validate_path_exists,
};
use anyhow::{Result, bail};
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 縮圖在終端機中的寬度（字元）
const PREVIEW_COLUMNS: u32 = 64;

pub struct VideoCompressor<'a> {
    config: &'a mut Config,
    shutdown_signal: Arc<AtomicBool>,
    queue: FileQueue,
    crf: Crf,
}

impl<'a> VideoCompressor<'a> {
    pub fn new(config: &'a mut Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let crf = Crf::clamped(config.settings.compression.default_crf);
        Self {
            config,
            shutdown_signal,
            queue: FileQueue::new(),
            crf,
        }
    }

    pub fn run(&mut self, term: &Term) -> Result<()> {
        loop {
            term.clear_screen()?;
            self.print_form();

            let options = vec![
                t!("compressor.opt_add_path"),
                t!("compressor.opt_add_dropped"),
                t!("compressor.opt_remove_one"),
                t!("compressor.opt_remove_all"),
                t!("compressor.opt_set_crf"),
                t!("compressor.opt_preview"),
                t!("compressor.opt_compress"),
                t!("compressor.back"),
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("compressor.prompt"))
                .items(&options)
                .default(0)
                .interact_on_opt(term)?;

            let result = match selection {
                Some(0) => self.add_by_path(),
                Some(1) => self.add_dropped_paths(),
                Some(2) => self.remove_one(term),
                Some(3) => self.remove_all(),
                Some(4) => self.set_crf(),
                Some(5) => self.preview(term),
                Some(6) => self.compress(),
                Some(7) | None => return Ok(()),
                _ => unreachable!(),
            };

            if let Err(e) = result {
                warn!("操作失敗: {e:#}");
                eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
            }
            pause(term)?;
        }
    }

    fn print_form(&self) {
        println!("{}", style(t!("compressor.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());
        println!();

        if self.queue.is_empty() {
            println!("{}", style(t!("compressor.queue_empty")).yellow());
        } else {
            for (index, path) in self.queue.iter().enumerate() {
                let size = fs::metadata(path).map(|m| m.len()).ok();
                println!(
                    "  {}. {} ({})",
                    index + 1,
                    display_name(path),
                    size.map_or_else(|| "?".to_string(), format_size)
                );
            }
        }

        println!();
        println!(
            "{}",
            style(t!("compressor.queue_count", count = self.queue.len())).green()
        );
        println!(
            "{}",
            style(t!("compressor.current_crf", crf = self.crf.value())).green()
        );
        println!();
    }

    /// 取得路徑後加入佇列，資料夾會遞迴掃描影片檔
    fn add_by_path(&mut self) -> Result<()> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(t!("compressor.path_prompt"))
            .allow_empty(true);
        if let Some(recent) = self.config.settings.recent_paths.first() {
            input = input.with_initial_text(recent.clone());
        }
        let raw: String = input.interact_text()?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }

        let path = resolve_typed_path(raw);
        validate_path_exists(&path)?;

        let candidates = self.collect_videos(&path)?;
        if candidates.is_empty() {
            bail!(t!("compressor.not_video", path = path.display()).to_string());
        }

        let added = self.add_to_queue(candidates);
        self.remember_path(&path);
        println!("{}", style(t!("compressor.added", count = added)).green());
        Ok(())
    }

    /// 將拖放到終端機的路徑（貼上的文字）加入佇列
    fn add_dropped_paths(&mut self) -> Result<()> {
        println!("{}", style(t!("compressor.drop_hint")).dim());
        let raw: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("compressor.drop_prompt"))
            .allow_empty(true)
            .interact_text()?;

        let mut candidates = Vec::new();
        let mut ignored = 0;
        for path in parse_dropped_paths(&raw) {
            match self.collect_videos(&path) {
                Ok(found) if !found.is_empty() => candidates.extend(found),
                Ok(_) => ignored += 1,
                Err(e) => {
                    warn!("忽略拖放路徑 {}: {e:#}", path.display());
                    ignored += 1;
                }
            }
        }

        let added = self.add_to_queue(candidates);
        println!("{}", style(t!("compressor.added", count = added)).green());
        if ignored > 0 {
            println!("{}", style(t!("compressor.ignored", count = ignored)).yellow());
        }
        Ok(())
    }

    fn collect_videos(&self, path: &Path) -> Result<Vec<PathBuf>> {
        validate_path_exists(path)?;
        if path.is_dir() {
            return scan_video_files(path, &self.config.file_type_table);
        }
        if self.config.file_type_table.is_video_file(path) {
            Ok(vec![path.to_path_buf()])
        } else {
            Ok(Vec::new())
        }
    }

    /// 以正規化路徑加入佇列，避免同一檔案以不同寫法重複加入
    fn add_to_queue(&mut self, paths: Vec<PathBuf>) -> usize {
        let added = self
            .queue
            .add_many(paths.into_iter().map(|p| fs::canonicalize(&p).unwrap_or(p)));
        info!("加入 {added} 個檔案，佇列共 {} 個", self.queue.len());
        added
    }

    fn remember_path(&mut self, path: &Path) {
        let directory = if path.is_dir() {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        add_recent_path(&mut self.config.settings, &directory.to_string_lossy());
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存最近使用的路徑: {e:#}");
        }
    }

    fn select_queued_file(&self, term: &Term, prompt: &str) -> Result<Option<usize>> {
        if self.queue.is_empty() {
            println!("{}", style(t!("compressor.queue_empty")).yellow());
            return Ok(None);
        }
        let items: Vec<String> = self.queue.iter().map(display_name).collect();
        Ok(Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_on_opt(term)?)
    }

    fn remove_one(&mut self, term: &Term) -> Result<()> {
        let prompt = t!("compressor.remove_prompt");
        if let Some(index) = self.select_queued_file(term, &prompt)? {
            if let Some(removed) = self.queue.remove(index) {
                println!(
                    "{}",
                    style(t!("compressor.removed", name = display_name(&removed))).green()
                );
            }
        }
        Ok(())
    }

    fn remove_all(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            println!("{}", style(t!("compressor.queue_empty")).yellow());
            return Ok(());
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("compressor.clear_confirm", count = self.queue.len()))
            .default(false)
            .interact()?;
        if confirmed {
            self.queue.clear();
            println!("{}", style(t!("compressor.cleared")).green());
        }
        Ok(())
    }

    fn set_crf(&mut self) -> Result<()> {
        self.crf = prompt_crf(self.crf)?;
        println!(
            "{}",
            style(t!("compressor.current_crf", crf = self.crf.value())).green()
        );
        Ok(())
    }

    /// 顯示縮圖、原始大小與估算大小，並列出整批的估算總量
    fn preview(&self, term: &Term) -> Result<()> {
        let index = if self.queue.len() == 1 {
            Some(0)
        } else {
            let prompt = t!("compressor.preview_prompt");
            self.select_queued_file(term, &prompt)?
        };
        let Some(path) = index.and_then(|i| self.queue.get(i)) else {
            return Ok(());
        };

        let settings = &self.config.settings.compression;
        println!("{}", style(t!("compressor.generating_preview")).dim());
        let thumbnail = generate_thumbnail(&settings.ffmpeg_path, path);
        for line in thumbnail.render(PREVIEW_COLUMNS, &t!("compressor.no_preview")) {
            println!("{line}");
        }

        let size = fs::metadata(path)?.len();
        println!();
        println!("{}", style(display_name(path)).bold());
        println!(
            "  {}",
            t!(
                "compressor.size_line",
                size = format_size(size),
                estimate = format_size(estimate_output_size(size, self.crf)),
                crf = self.crf.value()
            )
        );

        if self.queue.len() > 1 {
            self.print_batch_estimate(&settings.ffprobe_path);
        }
        Ok(())
    }

    fn print_batch_estimate(&self, ffprobe: &str) {
        let crf = self.crf;
        let rows: Vec<(String, u64, Option<f64>)> = self
            .queue
            .paths()
            .par_iter()
            .map(|path| {
                let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                let duration = probe_duration(ffprobe, path).ok();
                (display_name(path), size, duration)
            })
            .collect();

        println!();
        println!("{}", style(t!("compressor.batch_title")).cyan());
        for (name, size, duration) in &rows {
            let duration = duration.map_or_else(|| "--:--:--".to_string(), format_duration);
            println!(
                "  {name} [{duration}] {} -> ~{}",
                format_size(*size),
                format_size(estimate_output_size(*size, crf))
            );
        }
        let total: u64 = rows.iter().map(|(_, size, _)| size).sum();
        println!(
            "{}",
            style(t!(
                "compressor.batch_total",
                size = format_size(total),
                estimate = format_size(estimate_output_size(total, crf))
            ))
            .green()
        );
    }

    /// 啟動背景壓縮，並在介面執行緒上更新進度條
    fn compress(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            println!("{}", style(t!("compressor.queue_empty")).yellow());
            return Ok(());
        }

        self.shutdown_signal.store(false, Ordering::SeqCst);
        let files = self.queue.paths();
        let total = files.len();
        let toolchain = Arc::new(FfmpegToolchain::from_settings(
            &self.config.settings.compression,
        ));

        println!(
            "{}",
            style(t!("compressor.starting", count = total, crf = self.crf.value())).cyan()
        );

        let handle = CompressionRunner::spawn(
            toolchain,
            files,
            self.crf,
            Arc::clone(&self.shutdown_signal),
        )?;

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total as u64));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise})")?
                .progress_chars("#>-"),
        );
        overall.set_prefix(t!("compressor.overall").to_string());

        let current = multi.add(ProgressBar::new(100));
        current.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.green/white}] {pos:>3}% {msg}")?
                .progress_chars("=> "),
        );

        for event in handle.events() {
            match event {
                CompressionEvent::FileStarted { input, .. } => {
                    current.reset();
                    current.set_message(display_name(&input));
                }
                CompressionEvent::Progress { percent, .. } => {
                    current.set_position(percent.round() as u64);
                }
                CompressionEvent::FileSkipped { input, reason, .. } => {
                    overall.inc(1);
                    multi.println(
                        style(t!(
                            "compressor.file_skipped",
                            name = display_name(&input),
                            reason = reason
                        ))
                        .yellow()
                        .to_string(),
                    )?;
                }
                CompressionEvent::FileCompleted {
                    output, output_size, ..
                } => {
                    current.set_position(100);
                    overall.inc(1);
                    multi.println(
                        style(t!(
                            "compressor.file_completed",
                            path = output.display(),
                            size = format_size(output_size)
                        ))
                        .green()
                        .to_string(),
                    )?;
                }
                CompressionEvent::FileFailed { input, reason, .. } => {
                    overall.inc(1);
                    multi.println(
                        style(t!(
                            "compressor.file_failed",
                            name = display_name(&input),
                            reason = reason
                        ))
                        .red()
                        .to_string(),
                    )?;
                }
                CompressionEvent::BatchFinished(_) => break,
            }
        }

        current.finish_and_clear();
        overall.finish();
        let summary = handle.join()?;
        print_summary(&summary);
        Ok(())
    }
}

/// 詢問 CRF，限制在合法範圍內
pub fn prompt_crf(current: Crf) -> Result<Crf> {
    let value: u8 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("compressor.crf_prompt", min = MIN_CRF, max = MAX_CRF))
        .default(current.value())
        .validate_with(|v: &u8| -> Result<(), String> {
            Crf::new(*v).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Crf::new(value)
}

fn print_summary(summary: &BatchSummary) {
    println!();
    println!("{}", style(t!("compressor.summary_title")).cyan().bold());
    println!("  {}", t!("compressor.summary_total", count = summary.total));
    println!(
        "  {}",
        style(t!("compressor.summary_completed", count = summary.completed)).green()
    );
    if summary.skipped > 0 {
        println!(
            "  {}",
            style(t!("compressor.summary_skipped", count = summary.skipped)).yellow()
        );
    }
    if summary.failed > 0 {
        println!(
            "  {}",
            style(t!("compressor.summary_failed", count = summary.failed)).red()
        );
    }
    if summary.cancelled > 0 {
        println!(
            "  {}",
            style(t!("compressor.summary_cancelled", count = summary.cancelled)).yellow()
        );
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn format_duration(seconds: f64) -> String {
    let secs = seconds.max(0.0).round() as u64;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(90.4), "00:01:30");
        assert_eq!(format_duration(3723.0), "01:02:03");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/videos/movie.mp4")), "movie.mp4");
    }
}
