mod dropped_paths;
mod ffprobe_info;
mod path_validator;
mod video_scanner;

pub use dropped_paths::{parse_dropped_paths, resolve_typed_path};
pub use ffprobe_info::{parse_duration_output, probe_duration};
pub use path_validator::validate_path_exists;
pub use video_scanner::{is_compressed_output, scan_video_files};
