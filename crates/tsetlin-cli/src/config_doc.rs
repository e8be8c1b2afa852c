//! Loads the external JSON configuration document into a frozen `Config`.
//! A parse failure here maps directly onto the engine's `BadJson` variant
//! by construction — `tsetlin-cli` never translates a JSON error into
//! something else.

use std::path::Path;

use tsetlin_core::config::{Config, ConfigOptions};
use tsetlin_core::TsetlinError;

use crate::error::Result;

pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)?;
    let opts: ConfigOptions =
        serde_json::from_str(&text).map_err(|e| TsetlinError::BadJson(format!("{}: {e}", path.display())))?;
    Ok(Config::build(opts)?)
}
