//! Binary puzzle pack format.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "PIPE" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Entry count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Data section (entry_count variable-length entries):
//!   - Variant: u8 (0 = rotate, 1 = slide)
//!   - Seed: u64 LE
//!   - Code length: u16 LE
//!   - Board code bytes
//!
//! Entries are sorted by (variant, seed).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use pipes_core::{Grid, Variant};
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"PIPE";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
/// Fixed part of an entry: variant + seed + code length.
const ENTRY_PREFIX: usize = 11;

/// One generated board and the seed that produced it.
#[derive(Clone, PartialEq, Debug)]
pub struct PackEntry {
    pub variant: Variant,
    pub seed: u64,
    pub grid: Grid,
}

#[derive(Default)]
pub struct Pack {
    pub entries: Vec<PackEntry>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

impl Pack {
    /// Save entries to a binary pack file.
    pub fn save(path: &Path, entries: &[PackEntry]) -> io::Result<usize> {
        let mut sorted: Vec<&PackEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| (e.variant as u8, e.seed));

        let count = sorted.len();

        // Build data section
        let mut data = Vec::new();
        for entry in &sorted {
            let code = entry.grid.encode();
            let len = u16::try_from(code.len()).map_err(|_| invalid("board code too long"))?;
            data.push(entry.variant as u8);
            data.extend_from_slice(&entry.seed.to_le_bytes());
            data.extend_from_slice(&len.to_le_bytes());
            data.extend_from_slice(&code);
        }

        let checksum = xxh64(&data, 0);

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Header
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(count as u64).to_le_bytes())?;
        writer.write_all(&checksum.to_le_bytes())?;
        writer.write_all(&[0u8; 8])?; // Reserved

        writer.write_all(&data)?;
        writer.flush()?;

        Ok(count)
    }

    /// Load a pack from a binary file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(invalid("Invalid pack magic"));
        }

        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != VERSION {
            return Err(invalid(format!("Unsupported pack version: {}", version)));
        }

        let count = read_u64(&header[8..16]) as usize;
        let stored_checksum = read_u64(&header[16..24]);

        // The data section runs to the end of the file.
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        if xxh64(&data, 0) != stored_checksum {
            return Err(invalid("Pack checksum mismatch"));
        }

        let mut entries = Vec::with_capacity(count.min(data.len() / ENTRY_PREFIX));
        let mut offset = 0;
        for i in 0..count {
            let prefix = data
                .get(offset..offset + ENTRY_PREFIX)
                .ok_or_else(|| invalid(format!("Truncated entry {}", i)))?;
            let variant = Variant::from_bits(prefix[0])
                .ok_or_else(|| invalid(format!("Entry {}: unknown variant {}", i, prefix[0])))?;
            let seed = read_u64(&prefix[1..9]);
            let len = u16::from_le_bytes([prefix[9], prefix[10]]) as usize;
            offset += ENTRY_PREFIX;

            let code = data
                .get(offset..offset + len)
                .ok_or_else(|| invalid(format!("Truncated code in entry {}", i)))?;
            let grid = Grid::decode(code)
                .ok_or_else(|| invalid(format!("Entry {}: invalid board code", i)))?;
            offset += len;

            entries.push(PackEntry {
                variant,
                seed,
                grid,
            });
        }

        if offset != data.len() {
            return Err(invalid("Trailing bytes after last entry"));
        }

        Ok(Pack { entries })
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}
