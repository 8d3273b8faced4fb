use tracing::debug;

use crate::code_table::{Code, CodeTable, InverseCodeTable};
use crate::error::{HuffmanError, Result};
use crate::payload::Payload;

/// Concatenates the code of every symbol in `data`, in order.
pub fn encode(data: &[u8], table: &CodeTable) -> Result<Payload> {
    let mut payload = Payload::new();
    for &symbol in data {
        let code = table.get(symbol).ok_or(HuffmanError::MissingCode { symbol })?;
        payload.push_code(code);
    }
    Ok(payload)
}

/// Incremental prefix-code decoder.
///
/// Bits are accumulated until they spell a complete code, at which point the
/// symbol is emitted and the buffer starts over. Since no code prefixes
/// another, the first match is the only possible one.
pub struct Decoder<'t> {
    inverse: &'t InverseCodeTable,
    pending: Code,
    consumed: usize,
}

impl<'t> Decoder<'t> {
    pub fn new(inverse: &'t InverseCodeTable) -> Self {
        Self {
            inverse,
            pending: Code::with_capacity(inverse.max_code_len()),
            consumed: 0,
        }
    }

    /// Feeds one bit; returns the symbol it completes, if any.
    pub fn push_bit(&mut self, bit: bool) -> Result<Option<u8>> {
        self.pending.push(bit);
        self.consumed += 1;

        if let Some(symbol) = self.inverse.lookup(&self.pending) {
            self.pending.clear();
            return Ok(Some(symbol));
        }
        if self.pending.len() >= self.inverse.max_code_len() {
            return Err(HuffmanError::UnmatchedCode {
                offset: self.consumed - self.pending.len(),
                len: self.pending.len(),
            });
        }
        Ok(None)
    }

    /// Ends the stream. Leftover bits mean the payload was cut short.
    pub fn finish(self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(HuffmanError::TruncatedPayload {
                pending: self.pending.len(),
            })
        }
    }
}

/// Decodes `payload` with the forward `table` (inverted here).
pub fn decode(payload: &Payload, table: &CodeTable) -> Result<Vec<u8>> {
    let inverse = table.invert()?;
    let mut decoder = Decoder::new(&inverse);
    let mut out = Vec::new();

    for bit in payload.bits().iter().by_vals() {
        if let Some(symbol) = decoder.push_bit(bit)? {
            out.push(symbol);
        }
    }
    decoder.finish()?;

    debug!(bits = payload.len(), symbols = out.len(), "decoded payload");
    Ok(out)
}

/// Derives a code table from `data` and encodes `data` with it.
///
/// Empty input gives an empty payload and an empty table.
pub fn compress(data: &[u8]) -> Result<(Payload, CodeTable)> {
    let table = CodeTable::from_data(data);
    let payload = encode(data, &table)?;
    debug!(
        input_bytes = data.len(),
        symbols = table.len(),
        payload_bits = payload.len(),
        "compressed"
    );
    Ok((payload, table))
}

pub fn decompress(payload: &Payload, table: &CodeTable) -> Result<Vec<u8>> {
    decode(payload, table)
}
