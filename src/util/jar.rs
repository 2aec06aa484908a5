//! Reading single entries out of jar (zip) archives.
//!
//! Only what bundle discovery needs: locate an entry through the central
//! directory and return its bytes, stored or deflated.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{bail, Context, Result};
use flate2::read::DeflateDecoder;

const END_OF_CENTRAL_DIRECTORY: u32 = 0x0605_4b50;
const CENTRAL_DIRECTORY_HEADER: u32 = 0x0201_4b50;
const LOCAL_FILE_HEADER: u32 = 0x0403_4b50;
const EOCD_MIN_LEN: usize = 22;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

/// Read the entry `name` from the archive at `path`.
///
/// Returns `Ok(None)` when the archive has no such entry.
pub fn read_entry(path: &Path, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open archive: {}", path.display()))?;
    let len = file.metadata()?.len();

    let tail_len = len.min((EOCD_MIN_LEN + MAX_COMMENT_LEN) as u64);
    file.seek(SeekFrom::Start(len - tail_len))?;
    let mut tail = vec![0u8; tail_len as usize];
    file.read_exact(&mut tail)?;

    let Some(eocd) = (0..=tail.len().saturating_sub(EOCD_MIN_LEN))
        .rev()
        .find(|&i| u32_at(&tail, i) == END_OF_CENTRAL_DIRECTORY)
    else {
        bail!("not a zip archive: {}", path.display());
    };

    let entries = u16_at(&tail, eocd + 10) as usize;
    let dir_size = u32_at(&tail, eocd + 12) as usize;
    let dir_offset = u32_at(&tail, eocd + 16) as u64;
    if dir_offset + dir_size as u64 > len {
        bail!("central directory extends past the end of {}", path.display());
    }

    file.seek(SeekFrom::Start(dir_offset))?;
    let mut directory = vec![0u8; dir_size];
    file.read_exact(&mut directory)
        .with_context(|| format!("truncated central directory in {}", path.display()))?;

    let mut pos = 0;
    for _ in 0..entries {
        if pos + 46 > directory.len() || u32_at(&directory, pos) != CENTRAL_DIRECTORY_HEADER {
            bail!("corrupt central directory in {}", path.display());
        }

        let method = u16_at(&directory, pos + 10);
        let compressed_size = u32_at(&directory, pos + 20) as usize;
        let name_len = u16_at(&directory, pos + 28) as usize;
        let extra_len = u16_at(&directory, pos + 30) as usize;
        let comment_len = u16_at(&directory, pos + 32) as usize;
        let local_offset = u32_at(&directory, pos + 42) as u64;

        let entry_name = directory
            .get(pos + 46..pos + 46 + name_len)
            .map(String::from_utf8_lossy)
            .unwrap_or_default();

        if entry_name == name {
            return read_local_entry(&mut file, len, local_offset, method, compressed_size)
                .with_context(|| format!("failed to read `{}` from {}", name, path.display()))
                .map(Some);
        }

        pos += 46 + name_len + extra_len + comment_len;
    }

    Ok(None)
}

fn read_local_entry(
    file: &mut File,
    len: u64,
    offset: u64,
    method: u16,
    compressed_size: usize,
) -> Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut header = [0u8; 30];
    file.read_exact(&mut header)?;
    if u32_at(&header, 0) != LOCAL_FILE_HEADER {
        bail!("bad local file header");
    }

    let skip = u16_at(&header, 26) as u64 + u16_at(&header, 28) as u64;
    let data_start = offset + header.len() as u64 + skip;
    if data_start + compressed_size as u64 > len {
        bail!("entry data extends past the end of the archive");
    }
    file.seek(SeekFrom::Start(data_start))?;

    let mut compressed = vec![0u8; compressed_size];
    file.read_exact(&mut compressed)?;

    match method {
        METHOD_STORED => Ok(compressed),
        METHOD_DEFLATED => {
            let mut data = Vec::new();
            DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut data)?;
            Ok(data)
        }
        other => bail!("unsupported compression method {}", other),
    }
}

fn u16_at(buf: &[u8], at: usize) -> u16 {
    buf.get(at..at + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .unwrap_or(0)
}

fn u32_at(buf: &[u8], at: usize) -> u32 {
    buf.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .unwrap_or(0)
}
