//! 解析拖放到終端機的檔案路徑
//!
//! 將檔案拖放到終端機時，終端機會把路徑貼成文字。不同終端機的格式不同：
//! 以單引號或雙引號包住、以反斜線跳脫空白、Tk 風格的 `{...}`，或是 `file://` URI。

use std::path::{Path, PathBuf};
use url::Url;

/// 將貼上的文字拆成路徑列表，保留原本順序
#[must_use]
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    split_tokens(text)
        .into_iter()
        .map(|token| token_to_path(&token))
        .collect()
}

/// 解析使用者輸入的單一路徑
///
/// 輸入本身是存在的路徑時直接使用（可含空白），
/// 否則才視為加上引號、跳脫字元或 `file://` 的拖放格式。
#[must_use]
pub fn resolve_typed_path(text: &str) -> PathBuf {
    let text = text.trim();
    if Path::new(text).exists() {
        return PathBuf::from(text);
    }
    parse_dropped_paths(text)
        .into_iter()
        .next()
        .unwrap_or_else(|| PathBuf::from(text))
}

fn token_to_path(token: &str) -> PathBuf {
    if token.starts_with("file://") {
        if let Some(path) = Url::parse(token).ok().and_then(|url| url.to_file_path().ok()) {
            return path;
        }
    }
    PathBuf::from(token)
}

fn split_tokens(text: &str) -> Vec<String> {
    let backslash_escapes = !cfg!(windows);
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' if backslash_escapes => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        _ => current.push(q),
                    }
                }
            }
            '{' if !in_token => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '}' {
                        break;
                    }
                    current.push(q);
                }
            }
            '\\' if backslash_escapes => {
                in_token = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tokens.retain(|t| !t.is_empty());
    tokens
}
