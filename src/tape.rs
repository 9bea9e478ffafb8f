//! Recorded input sequences
//!
//! Binary layout (little endian):
//!   HEADER (12 bytes): magic(u32) version(u8) reserved(3) tick_count(u32)
//!   BODY: one input byte per tick call, low five bits only
//!   FOOTER (4 bytes): crc32 over header and body
//!
//! The text form is one base-32 digit per tick (`0`-`9`, `A`-`V`), where the
//! digit's value is the input byte. A digit may be followed by `*N` to repeat it
//! N times. Whitespace is ignored, so tapes can be wrapped and indented freely.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::driver::{self, TapeAgent};
use crate::error::TapeError;
use crate::settings::SimConfig;
use crate::sim::{Level, RunResult, TickInput, World};

pub const TAPE_MAGIC: u32 = 0x5054_4450; // "PDTP"
pub const TAPE_VERSION: u8 = 1;
pub const TAPE_HEADER_SIZE: usize = 12;
pub const TAPE_FOOTER_SIZE: usize = 4;

const GLYPHS: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";

/// Inputs for consecutive tick calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTape {
    inputs: Vec<u8>,
}

impl ActionTape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_inputs(inputs: impl IntoIterator<Item = TickInput>) -> Self {
        Self {
            inputs: inputs.into_iter().map(TickInput::bits).collect(),
        }
    }

    pub fn push(&mut self, input: TickInput) {
        self.inputs.push(input.bits());
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TickInput> {
        self.inputs.get(index).map(|&b| TickInput::from_bits(b))
    }

    pub fn iter(&self) -> impl Iterator<Item = TickInput> + '_ {
        self.inputs.iter().map(|&b| TickInput::from_bits(b))
    }

    /// Raw input bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.inputs
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let body_end = TAPE_HEADER_SIZE + self.inputs.len();
        let mut data = vec![0u8; body_end + TAPE_FOOTER_SIZE];

        write_u32_le(&mut data, 0, TAPE_MAGIC);
        data[4] = TAPE_VERSION;
        write_u32_le(&mut data, 8, self.inputs.len() as u32);
        data[TAPE_HEADER_SIZE..body_end].copy_from_slice(&self.inputs);

        let checksum = crc32(&data[..body_end]);
        write_u32_le(&mut data, body_end, checksum);
        data
    }

    /// Parse and validate the binary form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TapeError> {
        let min = TAPE_HEADER_SIZE + TAPE_FOOTER_SIZE;
        if bytes.len() < min {
            return Err(TapeError::TooShort {
                actual: bytes.len(),
                min,
            });
        }

        let magic = read_u32_le(bytes, 0);
        if magic != TAPE_MAGIC {
            return Err(TapeError::InvalidMagic { found: magic });
        }
        let version = bytes[4];
        if version != TAPE_VERSION {
            return Err(TapeError::UnsupportedVersion { found: version });
        }

        let count = read_u32_le(bytes, 8) as usize;
        let expected = min + count;
        if bytes.len() != expected {
            return Err(TapeError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let body_end = TAPE_HEADER_SIZE + count;
        let inputs = &bytes[TAPE_HEADER_SIZE..body_end];
        if let Some(tick) = inputs.iter().position(|&b| b & !TickInput::MASK != 0) {
            return Err(TapeError::ReservedBits {
                tick: tick as u32,
                byte: inputs[tick],
            });
        }

        let stored = read_u32_le(bytes, body_end);
        let computed = crc32(&bytes[..body_end]);
        if stored != computed {
            return Err(TapeError::CrcMismatch { stored, computed });
        }

        Ok(Self {
            inputs: inputs.to_vec(),
        })
    }

    /// Text form with runs longer than three collapsed to `glyph*N`
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut rest = self.inputs.as_slice();
        while let Some(&first) = rest.first() {
            let run = rest.iter().take_while(|&&b| b == first).count();
            let glyph = GLYPHS[first as usize] as char;
            if run > 3 {
                out.push(glyph);
                out.push('*');
                out.push_str(&run.to_string());
            } else {
                out.extend(std::iter::repeat_n(glyph, run));
            }
            rest = &rest[run..];
        }
        out
    }

    pub fn from_text(text: &str) -> Result<Self, TapeError> {
        let mut inputs = Vec::new();
        let mut chars = text.char_indices().peekable();

        while let Some((position, glyph)) = chars.next() {
            if glyph.is_whitespace() {
                continue;
            }
            let byte = glyph_value(glyph).ok_or(TapeError::InvalidGlyph { glyph, position })?;

            let mut repeat = 1;
            if let Some(&(star, '*')) = chars.peek() {
                chars.next();
                let mut digits = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                repeat = digits
                    .parse::<usize>()
                    .map_err(|_| TapeError::InvalidGlyph {
                        glyph: '*',
                        position: star,
                    })?;
            }
            inputs.extend(std::iter::repeat_n(byte, repeat));
        }

        Ok(Self { inputs })
    }
}

impl FromStr for ActionTape {
    type Err = TapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Display for ActionTape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromIterator<TickInput> for ActionTape {
    fn from_iter<I: IntoIterator<Item = TickInput>>(iter: I) -> Self {
        Self::from_inputs(iter)
    }
}

fn glyph_value(glyph: char) -> Option<u8> {
    let upper = glyph.to_ascii_uppercase();
    GLYPHS
        .iter()
        .position(|&g| g as char == upper)
        .map(|i| i as u8)
}

/// Play a tape against a fresh world, one tick call per recorded input.
///
/// The run stops early if the world reaches a terminal status; a tape that
/// ends first leaves the result `RUNNING`.
pub fn replay(level: Arc<Level>, config: SimConfig, tape: &ActionTape) -> RunResult {
    let mut world = World::new(level, config);
    let mut agent = TapeAgent::new(tape.clone());
    driver::run_for(&mut world, &mut agent, tape.len())
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut j = 0;
        while j < 8 {
            c = if c & 1 != 0 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
            j += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// CRC-32 (IEEE)
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc = CRC_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}
