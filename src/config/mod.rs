pub mod load;
pub mod save;
pub mod types;

pub use types::{
    CompressionSettings, Config, DEFAULT_CRF, FileTypeTable, Language, MAX_CRF, MAX_RECENT_PATHS,
    MIN_CRF, UserSettings,
};
