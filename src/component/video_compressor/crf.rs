use crate::config::{DEFAULT_CRF, MAX_CRF, MIN_CRF};
use anyhow::{Result, bail};
use std::fmt;

/// 壓縮品質參數（Constant Rate Factor）
///
/// 數值越低品質越高、輸出越大。整批檔案共用同一個值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Crf(u8);

impl Crf {
    pub fn new(value: u8) -> Result<Self> {
        if !(MIN_CRF..=MAX_CRF).contains(&value) {
            bail!("CRF 必須介於 {MIN_CRF} 到 {MAX_CRF} 之間: {value}");
        }
        Ok(Self(value))
    }

    /// 將任意數值夾到合法範圍內（用於讀取設定檔）
    #[must_use]
    pub fn clamped(value: u8) -> Self {
        Self(value.clamp(MIN_CRF, MAX_CRF))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Crf {
    fn default() -> Self {
        Self(DEFAULT_CRF)
    }
}

impl TryFrom<u8> for Crf {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Crf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
