use std::env;
use std::path::Path;

use crate::codec::{Boundary, LineEnding, MultipartCodec, QueryStringCodec};
use crate::utils::parse_flag;

// Environment variable names
pub const BOUNDARY_VAR: &str = "PARAMWIRE_BOUNDARY";
pub const PERCENT_ENCODE_VAR: &str = "PARAMWIRE_PERCENT_ENCODE";
pub const LINE_ENDING_VAR: &str = "PARAMWIRE_LINE_ENDING";

// Default configuration constants
pub const DEFAULT_PERCENT_ENCODE: bool = false;
pub const DEFAULT_LINE_ENDING: LineEnding = LineEnding::CrLf;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

/// Boundary token configured in the environment, if any
///
/// A blank or invalid value counts as unset.
pub fn get_boundary() -> Option<Boundary> {
    let raw = env::var(BOUNDARY_VAR).unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Boundary::new(raw) {
        Ok(b) => Some(b),
        Err(e) => {
            tracing::warn!(%e, "Ignoring {}", BOUNDARY_VAR);
            None
        }
    }
}

pub fn get_percent_encode() -> bool {
    let raw = env::var(PERCENT_ENCODE_VAR).ok();
    parse_flag(raw.as_deref(), DEFAULT_PERCENT_ENCODE)
}

pub fn get_line_ending() -> LineEnding {
    match env::var(LINE_ENDING_VAR) {
        Ok(raw) if !raw.trim().is_empty() => raw.parse().unwrap_or_else(|e| {
            tracing::warn!(%e, "Falling back to default line ending");
            DEFAULT_LINE_ENDING
        }),
        _ => DEFAULT_LINE_ENDING,
    }
}

/// Query string codec set up from the environment
pub fn query_string_codec() -> QueryStringCodec {
    QueryStringCodec::new().percent_encoded(get_percent_encode())
}

/// Multipart codec for `boundary`, with the configured line ending
pub fn multipart_codec(boundary: &Boundary) -> MultipartCodec {
    MultipartCodec::for_boundary(boundary).line_ending(get_line_ending())
}
