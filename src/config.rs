// ABOUTME: Decoder configuration
// ABOUTME: Buffer sizing for registration, staging and the scratch pool, loadable from JSON

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Decoder tuning knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Minimum input bytes before decode is worth calling
    pub read_size: usize,
    /// Minimum free output bytes before decode is worth calling
    pub write_size: usize,
    /// Staging buffer capacity in frames
    pub staging_frames: usize,
    /// Scratch buffers kept per stream for converted frames
    pub pool_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            read_size: 4096 * 4,
            write_size: 256 * 1024,
            staging_frames: 32 * 1024,
            pool_size: 4,
        }
    }
}

impl DecoderConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}
