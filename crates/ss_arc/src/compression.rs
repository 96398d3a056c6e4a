//! Whole-file LZ11 compression and decompression handling.
//!
//! The stream starts with a one byte type marker (`0x11`) followed by the decompressed size as a
//! 24 bit little endian integer. When that size is zero, the real size follows as a 32 bit little
//! endian integer. The body is a sequence of blocks, each made of a flag byte and up to eight
//! tokens. Flag bits are read from the most significant bit down: a clear bit is a literal byte,
//! a set bit is a back reference into the already decompressed output.
//!
//! | First nibble | Token size | Length                         | Displacement               |
//! |--------------|------------|--------------------------------|----------------------------|
//! | `0`          | 3 bytes    | 8 bits + `0x11`                | 12 bits + 1                |
//! | `1`          | 4 bytes    | 16 bits + `0x111`              | 12 bits + 1                |
//! | `2..=F`      | 2 bytes    | nibble + 1                     | 12 bits + 1                |

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::{instrument, trace};

use crate::error::{Error, Result};

const LZ11_MARKER: u8 = 0x11;
const WINDOW_SIZE: usize = 0x1000;
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 0xFFFF + 0x111;
const HASH_BITS: u32 = 15;
const MAX_CHAIN: usize = 256;

/// Identifies how a file inside the game's file system is stored
///
/// Stage and object archives ship as `.arc.LZ`, anything else is stored as is.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Stores the data as it is
    #[default]
    None,

    /// Whole-file LZ11
    Lz11,
}

impl CompressionMethod {
    /// Picks the method from the file name. Only the exact `.LZ` suffix marks LZ11 data.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".LZ") {
            CompressionMethod::Lz11
        } else {
            CompressionMethod::None
        }
    }

    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionMethod::None => Ok(data.to_vec()),
            CompressionMethod::Lz11 => decompress_lz11(data),
        }
    }

    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionMethod::None => Ok(data.to_vec()),
            CompressionMethod::Lz11 => compress_lz11(data),
        }
    }
}

fn next_byte(reader: &mut Cursor<&[u8]>) -> Result<u8> {
    reader
        .read_u8()
        .map_err(|_| Error::InvalidCompression("unexpected end of data"))
}

/// Decompress a complete LZ11 stream.
#[instrument(skip_all, fields(compressed = data.len()), err)]
pub fn decompress_lz11(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Cursor::new(data);

    let header = reader
        .read_u32::<LittleEndian>()
        .map_err(|_| Error::InvalidCompression("truncated header"))?;
    if header as u8 != LZ11_MARKER {
        return Err(Error::InvalidCompression("missing lz11 marker"));
    }
    let mut size = (header >> 8) as usize;
    if size == 0 {
        size = reader
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::InvalidCompression("truncated header"))? as usize;
    }
    trace!(size, "decompressing");

    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let flags = next_byte(&mut reader)?;

        for bit in 0..8 {
            if out.len() >= size {
                break;
            }
            if flags & (0x80 >> bit) == 0 {
                out.push(next_byte(&mut reader)?);
                continue;
            }

            let b1 = next_byte(&mut reader)? as usize;
            let b2 = next_byte(&mut reader)? as usize;
            let (length, displacement) = match b1 >> 4 {
                0 => {
                    let b3 = next_byte(&mut reader)? as usize;
                    (
                        ((b1 & 0xF) << 4 | b2 >> 4) + 0x11,
                        ((b2 & 0xF) << 8 | b3) + 1,
                    )
                }
                1 => {
                    let b3 = next_byte(&mut reader)? as usize;
                    let b4 = next_byte(&mut reader)? as usize;
                    (
                        ((b1 & 0xF) << 12 | b2 << 4 | b3 >> 4) + 0x111,
                        ((b3 & 0xF) << 8 | b4) + 1,
                    )
                }
                n => (n + 1, ((b1 & 0xF) << 8 | b2) + 1),
            };

            if displacement > out.len() {
                return Err(Error::InvalidCompression(
                    "back reference before the start of the output",
                ));
            }
            for _ in 0..length.min(size - out.len()) {
                out.push(out[out.len() - displacement]);
            }
        }
    }

    Ok(out)
}

fn hash(data: &[u8], pos: usize) -> usize {
    let key = u32::from_be_bytes([0, data[pos], data[pos + 1], data[pos + 2]]);
    (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

struct MatchFinder<'a> {
    data: &'a [u8],
    head: Vec<usize>,
    prev: Vec<usize>,
}

impl<'a> MatchFinder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            head: vec![usize::MAX; 1 << HASH_BITS],
            prev: vec![usize::MAX; data.len()],
        }
    }

    fn insert(&mut self, pos: usize) {
        if pos + MIN_MATCH <= self.data.len() {
            let h = hash(self.data, pos);
            self.prev[pos] = self.head[h];
            self.head[h] = pos;
        }
    }

    /// Longest earlier match for `pos` as `(length, displacement)`
    fn longest(&self, pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_MATCH > self.data.len() {
            return None;
        }
        let limit = MAX_MATCH.min(self.data.len() - pos);
        let mut best: Option<(usize, usize)> = None;
        let mut candidate = self.head[hash(self.data, pos)];

        for _ in 0..MAX_CHAIN {
            if candidate == usize::MAX || pos - candidate > WINDOW_SIZE {
                break;
            }
            let length = self.data[candidate..]
                .iter()
                .zip(&self.data[pos..pos + limit])
                .take_while(|(a, b)| a == b)
                .count();
            if length >= MIN_MATCH && best.map_or(true, |(l, _)| length > l) {
                best = Some((length, pos - candidate));
                if length == limit {
                    break;
                }
            }
            candidate = self.prev[candidate];
        }

        best
    }
}

fn push_reference(out: &mut Vec<u8>, length: usize, displacement: usize) {
    let d = displacement - 1;
    if length <= 0x10 {
        out.push(((length - 1) << 4 | d >> 8) as u8);
        out.push(d as u8);
    } else if length <= 0x110 {
        let l = length - 0x11;
        out.push((l >> 4) as u8);
        out.push(((l & 0xF) << 4 | d >> 8) as u8);
        out.push(d as u8);
    } else {
        let l = length - 0x111;
        out.push((0x10 | l >> 12) as u8);
        out.push((l >> 4) as u8);
        out.push(((l & 0xF) << 4 | d >> 8) as u8);
        out.push(d as u8);
    }
}

/// Compress data into an LZ11 stream.
///
/// Matches are picked greedily from a hash chain over the last 4 KiB of input.
#[instrument(skip_all, fields(size = data.len()), err)]
pub fn compress_lz11(data: &[u8]) -> Result<Vec<u8>> {
    let size = u32::try_from(data.len()).map_err(|_| Error::TooLarge(data.len()))?;

    let mut out = Vec::with_capacity(data.len() / 2 + 8);
    if size < 0x0100_0000 {
        out.write_u32::<LittleEndian>(size << 8 | LZ11_MARKER as u32)?;
    } else {
        out.write_u32::<LittleEndian>(LZ11_MARKER as u32)?;
        out.write_u32::<LittleEndian>(size)?;
    }

    let mut finder = MatchFinder::new(data);
    let mut pos = 0;
    while pos < data.len() {
        let flag_index = out.len();
        out.push(0);

        for bit in 0..8 {
            if pos >= data.len() {
                break;
            }
            match finder.longest(pos) {
                Some((length, displacement)) => {
                    out[flag_index] |= 0x80 >> bit;
                    push_reference(&mut out, length, displacement);
                    for p in pos..pos + length {
                        finder.insert(p);
                    }
                    pos += length;
                }
                None => {
                    out.push(data[pos]);
                    finder.insert(pos);
                    pos += 1;
                }
            }
        }
    }

    Ok(out)
}
