//! Compressed payloads and their two on-disk forms.
//!
//! The text form stores one ASCII `0`/`1` per bit. It is lossless and easy to
//! inspect, but eight times larger than the bits it carries. The packed form
//! stores a fixed `bincode` header followed by the bits packed eight per byte,
//! most significant bit first:
//!
//! ```text
//! +--------+---------+---------------+-----------+------------------+
//! | "HUFP" | bit_len | trailing_bits | sha256    | packed bits ...  |
//! | 4 B    | u64 LE  | u8            | 32 B      | ceil(bit_len/8)  |
//! +--------+---------+---------------+-----------+------------------+
//! ```
//!
//! `trailing_bits` is the number of valid bits in the final byte (0 when the
//! payload is empty) and the digest covers the original, uncompressed data.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::code_table::Code;
use crate::error::{HuffmanError, Result};

pub const PACKED_MAGIC: [u8; 4] = *b"HUFP";

/// The encoded bit stream: every input symbol's code, concatenated in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    bits: Code,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: Code) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn push_code(&mut self, code: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(code);
    }

    pub fn to_text(&self) -> Vec<u8> {
        self.bits.iter().by_vals().map(|bit| if bit { b'1' } else { b'0' }).collect()
    }

    /// Parses the text form. Trailing whitespace (an editor's final newline)
    /// is ignored; any other byte besides `0` and `1` is rejected.
    pub fn from_text(text: &[u8]) -> Result<Self> {
        let text = text.trim_ascii_end();
        let mut bits = Code::with_capacity(text.len());
        for (pos, &byte) in text.iter().enumerate() {
            match byte {
                b'0' => bits.push(false),
                b'1' => bits.push(true),
                other => {
                    return Err(HuffmanError::MalformedPayload(format!(
                        "unexpected byte {other:#04x} at offset {pos} in text payload"
                    )));
                }
            }
        }
        Ok(Self { bits })
    }
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PackedHeader {
    magic: [u8; 4],
    bit_len: u64,
    trailing_bits: u8,
    digest: [u8; 32],
}

/// A payload in its packed form, together with the checksum of the data it
/// decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPayload {
    pub payload: Payload,
    pub digest: [u8; 32],
}

impl PackedPayload {
    /// `original` is the uncompressed input the payload was encoded from.
    pub fn new(payload: Payload, original: &[u8]) -> Self {
        Self {
            payload,
            digest: sha256(original),
        }
    }

    /// Whether `data` starts like a packed payload.
    pub fn is_packed(data: &[u8]) -> bool {
        data.starts_with(&PACKED_MAGIC)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let bits = self.payload.bits();
        let header = PackedHeader {
            magic: PACKED_MAGIC,
            bit_len: bits.len() as u64,
            trailing_bits: trailing_bits(bits.len() as u64),
            digest: self.digest,
        };

        let mut out = bincode::serialize(&header)?;
        {
            let mut writer = BitWriter::endian(&mut out, BigEndian);
            for bit in bits.iter().by_vals() {
                writer.write_bit(bit).map_err(packing_error)?;
            }
            writer.byte_align().map_err(packing_error)?;
        }
        Ok(out)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = data;
        let header: PackedHeader = bincode::deserialize_from(&mut reader)?;
        if header.magic != PACKED_MAGIC {
            return Err(HuffmanError::MalformedPayload("missing packed payload magic".into()));
        }

        let packed = reader;
        let expected_bytes = header.bit_len.div_ceil(8);
        if packed.len() as u64 != expected_bytes {
            return Err(HuffmanError::MalformedPayload(format!(
                "header announces {} bits but {} bytes follow",
                header.bit_len,
                packed.len()
            )));
        }
        let expected_trailing = trailing_bits(header.bit_len);
        if header.trailing_bits != expected_trailing {
            return Err(HuffmanError::MalformedPayload(format!(
                "final byte claims {} valid bits, expected {}",
                header.trailing_bits, expected_trailing
            )));
        }

        let bit_len = usize::try_from(header.bit_len)
            .map_err(|_| HuffmanError::MalformedPayload("payload too large".into()))?;
        let mut bits = Code::with_capacity(bit_len);
        let mut bit_reader = BitReader::endian(packed, BigEndian);
        for _ in 0..bit_len {
            bits.push(bit_reader.read_bit().map_err(packing_error)?);
        }
        let padding = (expected_bytes * 8 - header.bit_len) as usize;
        for _ in 0..padding {
            if bit_reader.read_bit().map_err(packing_error)? {
                return Err(HuffmanError::MalformedPayload("non-zero padding bits".into()));
            }
        }

        Ok(Self {
            payload: Payload::from_bits(bits),
            digest: header.digest,
        })
    }

    /// Checks the decoded output against the stored digest.
    pub fn verify(&self, decoded: &[u8]) -> Result<()> {
        if sha256(decoded) == self.digest {
            Ok(())
        } else {
            Err(HuffmanError::ChecksumMismatch)
        }
    }
}

// Valid bits in the final byte of a packed stream of `bit_len` bits.
fn trailing_bits(bit_len: u64) -> u8 {
    match bit_len % 8 {
        0 if bit_len == 0 => 0,
        0 => 8,
        rem => rem as u8,
    }
}

fn packing_error(err: std::io::Error) -> HuffmanError {
    HuffmanError::MalformedPayload(format!("bit stream: {err}"))
}
