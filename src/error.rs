use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while building, applying or persisting a code.
#[derive(Debug, Error)]
pub enum HuffmanError {
    #[error("symbol {symbol:#04x} has no code in the table")]
    MissingCode { symbol: u8 },

    #[error("symbols {first:#04x} and {second:#04x} share the code {code}")]
    TableCollision { code: String, first: u8, second: u8 },

    #[error("malformed table line {line_no} ({reason}): {line:?}")]
    MalformedTable {
        line_no: usize,
        line: String,
        reason: &'static str,
    },

    #[error("payload ended with {pending} unmatched bits")]
    TruncatedPayload { pending: usize },

    #[error("no code matches the {len} bits starting at bit {offset}")]
    UnmatchedCode { offset: usize, len: usize },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("payload header: {0}")]
    Header(#[from] bincode::Error),

    #[error("decoded data does not match the stored checksum")]
    ChecksumMismatch,

    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl HuffmanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
