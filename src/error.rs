//! Error types
//!
//! Everything here is raised before a simulation starts. A running tick never
//! fails; it degrades to a no-op instead.

use std::path::PathBuf;

use thiserror::Error;

/// Level text rejected during parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level text is empty")]
    Empty,
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} is {found} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("level width {width} outside 1..={max}")]
    WidthOutOfRange { width: usize, max: usize },
    #[error("second '{marker}' marker at tile ({x}, {y})")]
    DuplicateMarker { marker: char, x: usize, y: usize },
    #[error("no '{marker}' marker in level")]
    MissingMarker { marker: char },
}

/// Simulation config rejected while loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("ms_per_tick must be non-zero")]
    ZeroTickLength,
}

/// Action tape rejected while decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TapeError {
    #[error("tape too short: got {actual} bytes, need at least {min}")]
    TooShort { actual: usize, min: usize },
    #[error("invalid tape magic: 0x{found:08x}")]
    InvalidMagic { found: u32 },
    #[error("unsupported tape version: {found}")]
    UnsupportedVersion { found: u8 },
    #[error("tape length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("reserved input bits set at tick {tick}: 0x{byte:02x}")]
    ReservedBits { tick: u32, byte: u8 },
    #[error("crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}")]
    CrcMismatch { stored: u32, computed: u32 },
    #[error("invalid tape glyph '{glyph}' at position {position}")]
    InvalidGlyph { glyph: char, position: usize },
}
