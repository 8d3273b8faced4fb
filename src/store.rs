//! File-backed compress and decompress.
//!
//! Every artifact is built in memory first and then written through a
//! temporary sibling file that is renamed into place, so a failed run never
//! leaves a half-written payload, table or output behind, and never loses the
//! files a previous run left at the same paths.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};

use crate::code_table::CodeTable;
use crate::codec;
use crate::error::{HuffmanError, Result};
use crate::payload::{PackedPayload, Payload};
use crate::table_format;

const TEMP_EXT: &str = "tmp";
const BACKUP_EXT: &str = "bak";

/// On-disk representation of the compressed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// One ASCII `0`/`1` per bit.
    Text,
    /// Header plus bits packed eight per byte.
    #[default]
    Packed,
}

/// What a store operation processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Size of the uncompressed data.
    pub input_bytes: usize,
    pub payload_bits: usize,
    /// Distinct symbols in the code table.
    pub symbols: usize,
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| HuffmanError::io(path, e))
}

// `<path>.<ext>`, keeping the full file name.
fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

// A target touched by `save_all`: the file it previously held, if any, was
// moved to `backup`; `installed` is set once the new content is in place.
struct Replaced<'a> {
    target: &'a Path,
    backup: Option<PathBuf>,
    installed: bool,
}

fn install<'a>(files: &[(&'a Path, &[u8])], temps: &[PathBuf], replaced: &mut Vec<Replaced<'a>>) -> Result<()> {
    for (&(target, _), temp) in files.iter().zip(temps) {
        let backup = if target.is_file() {
            let backup = sibling(target, BACKUP_EXT);
            fs::rename(target, &backup).map_err(|e| HuffmanError::io(target, e))?;
            Some(backup)
        } else {
            None
        };

        let renamed = fs::rename(temp, target);
        replaced.push(Replaced {
            target,
            backup,
            installed: renamed.is_ok(),
        });
        renamed.map_err(|e| HuffmanError::io(target, e))?;
    }
    Ok(())
}

fn cleanup(path: &Path, result: std::io::Result<()>) {
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "could not clean up after write");
    }
}

/// Writes every `(path, bytes)` pair or none of them.
///
/// All temporaries are written before the first rename, and a file already
/// at a target is moved aside rather than overwritten. On failure the new
/// files are removed and the previous ones put back, so an earlier payload and
/// table pair survives intact.
fn save_all(files: &[(&Path, &[u8])]) -> Result<()> {
    let temps: Vec<PathBuf> = files.iter().map(|(path, _)| sibling(path, TEMP_EXT)).collect();
    let mut replaced = Vec::with_capacity(files.len());

    let result = files
        .iter()
        .zip(&temps)
        .try_for_each(|((_, data), temp)| fs::write(temp, data).map_err(|e| HuffmanError::io(temp, e)))
        .and_then(|()| install(files, &temps, &mut replaced));

    match result {
        Ok(()) => {
            for backup in replaced.iter().filter_map(|r| r.backup.as_deref()) {
                cleanup(backup, fs::remove_file(backup));
            }
        }
        Err(_) => {
            for r in replaced.iter().rev() {
                if r.installed {
                    cleanup(r.target, fs::remove_file(r.target));
                }
                if let Some(backup) = &r.backup {
                    cleanup(backup, fs::rename(backup, r.target));
                }
            }
            for temp in temps.iter().filter(|temp| temp.exists()) {
                cleanup(temp, fs::remove_file(temp));
            }
        }
    }
    result
}

fn load_table(path: &Path) -> Result<CodeTable> {
    table_format::deserialize_bytes(&read(path)?)
}

enum LoadedPayload {
    Text(Payload),
    // Packed payloads carry a digest of the data they decode to.
    Packed(PackedPayload),
}

impl LoadedPayload {
    fn payload(&self) -> &Payload {
        match self {
            LoadedPayload::Text(payload) => payload,
            LoadedPayload::Packed(packed) => &packed.payload,
        }
    }
}

fn load_payload(path: &Path) -> Result<LoadedPayload> {
    let data = read(path)?;
    let loaded = if PackedPayload::is_packed(&data) {
        LoadedPayload::Packed(PackedPayload::from_bytes(&data)?)
    } else {
        LoadedPayload::Text(Payload::from_text(&data)?)
    };
    debug!(
        path = %path.display(),
        packed = matches!(loaded, LoadedPayload::Packed(_)),
        bits = loaded.payload().len(),
        "loaded payload"
    );
    Ok(loaded)
}

fn decode_and_verify(payload_path: &Path, table_path: &Path) -> Result<(Vec<u8>, Summary)> {
    let table = load_table(table_path)?;
    let loaded = load_payload(payload_path)?;

    let decoded = codec::decompress(loaded.payload(), &table)?;
    if let LoadedPayload::Packed(packed) = &loaded {
        packed.verify(&decoded)?;
    }

    let summary = Summary {
        input_bytes: decoded.len(),
        payload_bits: loaded.payload().len(),
        symbols: table.len(),
    };
    Ok((decoded, summary))
}

/// Compresses the file at `input`, writing the payload and the code table.
pub fn compress_to_store(
    input: &Path,
    payload_path: &Path,
    table_path: &Path,
    format: PayloadFormat,
) -> Result<Summary> {
    let span = info_span!("compress", input = %input.display(), ?format);
    let _enter = span.enter();

    let data = read(input)?;
    let (payload, table) = codec::compress(&data)?;

    let payload_bytes = match format {
        PayloadFormat::Text => payload.to_text(),
        PayloadFormat::Packed => PackedPayload::new(payload.clone(), &data).to_bytes()?,
    };
    let table_text = table_format::serialize(&table);

    save_all(&[(payload_path, payload_bytes.as_slice()), (table_path, table_text.as_bytes())])?;

    let summary = Summary {
        input_bytes: data.len(),
        payload_bits: payload.len(),
        symbols: table.len(),
    };
    info!(
        input_bytes = summary.input_bytes,
        payload_bytes = payload_bytes.len(),
        payload_bits = summary.payload_bits,
        symbols = summary.symbols,
        "compressed"
    );
    Ok(summary)
}

/// Restores the original file from a payload and its code table.
pub fn decompress_from_store(payload_path: &Path, table_path: &Path, output: &Path) -> Result<Summary> {
    let span = info_span!("decompress", payload = %payload_path.display(), table = %table_path.display());
    let _enter = span.enter();

    let (decoded, summary) = decode_and_verify(payload_path, table_path)?;
    save_all(&[(output, decoded.as_slice())])?;

    info!(output = %output.display(), output_bytes = summary.input_bytes, "decompressed");
    Ok(summary)
}

/// Decodes a payload in memory and checks its integrity without writing.
pub fn check_store(payload_path: &Path, table_path: &Path) -> Result<Summary> {
    let span = info_span!("check", payload = %payload_path.display(), table = %table_path.display());
    let _enter = span.enter();

    let (_, summary) = decode_and_verify(payload_path, table_path)?;
    info!(bytes = summary.input_bytes, symbols = summary.symbols, "payload is intact");
    Ok(summary)
}
