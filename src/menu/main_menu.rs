use crate::component::video_compressor::{Crf, prompt_crf};
use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use crate::menu::handlers::run_video_compressor;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_compressor"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_video_compressor(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let compression = &config.settings.compression;
        println!(
            "\n{} {}",
            style(t!("settings.current_crf")).dim(),
            compression.default_crf
        );
        println!(
            "{} {}",
            style(t!("settings.current_ffmpeg")).dim(),
            compression.ffmpeg_path
        );
        println!(
            "{} {}",
            style(t!("settings.current_ffprobe")).dim(),
            compression.ffprobe_path
        );
        println!();

        let options = vec![
            t!("settings.opt_default_crf"),
            t!("settings.opt_ffmpeg_path"),
            t!("settings.opt_ffprobe_path"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_default_crf_menu(config)?,
            Some(1) => {
                let current = config.settings.compression.ffmpeg_path.clone();
                if let Some(path) = prompt_binary_path(&current)? {
                    config.settings.compression.ffmpeg_path = path;
                    save_and_report(config)?;
                }
            }
            Some(2) => {
                let current = config.settings.compression.ffprobe_path.clone();
                if let Some(path) = prompt_binary_path(&current)? {
                    config.settings.compression.ffprobe_path = path;
                    save_and_report(config)?;
                }
            }
            Some(3) => show_language_menu(term, config)?,
            Some(4) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn save_and_report(config: &Config) -> Result<()> {
    save_settings(&config.settings)?;
    println!("\n{}", style(t!("settings.saved")).green());
    std::thread::sleep(std::time::Duration::from_secs(1));
    Ok(())
}

/// 預設 CRF 設定
fn show_default_crf_menu(config: &mut Config) -> Result<()> {
    let current = Crf::clamped(config.settings.compression.default_crf);
    let selected = prompt_crf(current)?;

    if selected.value() != config.settings.compression.default_crf {
        config.settings.compression.default_crf = selected.value();
        save_and_report(config)?;
    }

    Ok(())
}

/// 外部程式路徑，留空表示不變更
fn prompt_binary_path(current: &str) -> Result<Option<String>> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.binary_prompt"))
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;

    let path = path.trim();
    if path.is_empty() || path == current {
        return Ok(None);
    }
    Ok(Some(path.to_string()))
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];

    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_and_report(config)?;
    }

    Ok(())
}
