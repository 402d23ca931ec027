use crate::component::VideoCompressor;
use crate::config::Config;
use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_video_compressor(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut compressor = VideoCompressor::new(config, Arc::clone(shutdown_signal));

    if let Err(e) = compressor.run(term) {
        eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
        crate::pause(term)?;
    }

    Ok(())
}
