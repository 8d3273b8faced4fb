//! Line-oriented text form of a [`CodeTable`].
//!
//! One entry per line, `<symbol>:<code>`, with the code written as `0`/`1`
//! characters. Printable ASCII symbols are written as themselves. Bytes that
//! would break the line grammar or are not printable use a name instead:
//! `SPACE`, `TAB`, `NEWLINE`, `RETURN`, `COLON`, or `0xHH` for everything
//! else. Symbols are single bytes, so any multi-character name is unambiguous.

use crate::code_table::{Code, CodeTable, code_to_string};
use crate::error::{HuffmanError, Result};

const NAMED: &[(u8, &str)] = &[
    (b' ', "SPACE"),
    (b'\t', "TAB"),
    (b'\n', "NEWLINE"),
    (b'\r', "RETURN"),
    (b':', "COLON"),
];

fn symbol_repr(symbol: u8) -> String {
    if let Some((_, name)) = NAMED.iter().find(|(byte, _)| *byte == symbol) {
        return (*name).to_string();
    }
    if symbol.is_ascii_graphic() {
        char::from(symbol).to_string()
    } else {
        format!("0x{symbol:02X}")
    }
}

fn parse_symbol(repr: &str) -> Option<u8> {
    if let Some((byte, _)) = NAMED.iter().find(|(_, name)| *name == repr) {
        return Some(*byte);
    }
    match repr.as_bytes() {
        [byte] if byte.is_ascii_graphic() && *byte != b':' => Some(*byte),
        [b'0', b'x', hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
            u8::from_str_radix(&repr[2..], 16).ok()
        }
        _ => None,
    }
}

/// Writes one `symbol:code` line per entry, in ascending symbol order.
pub fn serialize(table: &CodeTable) -> String {
    table
        .iter()
        .map(|(symbol, code)| format!("{}:{}\n", symbol_repr(symbol), code_to_string(code)))
        .collect()
}

/// Like [`deserialize`], for a table read straight from disk. Bytes that are
/// not UTF-8 are reported against the line they occur on.
pub fn deserialize_bytes(data: &[u8]) -> Result<CodeTable> {
    match std::str::from_utf8(data) {
        Ok(text) => deserialize(text),
        Err(err) => {
            let (before, after) = data.split_at(err.valid_up_to());
            let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |pos| pos + 1);
            let line_end = after.iter().position(|&b| b == b'\n').map_or(data.len(), |pos| before.len() + pos);
            Err(HuffmanError::MalformedTable {
                line_no: before.iter().filter(|&&b| b == b'\n').count() + 1,
                line: String::from_utf8_lossy(&data[line_start..line_end]).into_owned(),
                reason: "not valid UTF-8",
            })
        }
    }
}

pub fn deserialize(text: &str) -> Result<CodeTable> {
    let mut table = CodeTable::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() {
            continue;
        }
        let malformed = |reason| HuffmanError::MalformedTable {
            line_no: idx + 1,
            line: line.to_string(),
            reason,
        };

        let (repr, code_str) = line.split_once(':').ok_or_else(|| malformed("missing colon"))?;
        let symbol = parse_symbol(repr).ok_or_else(|| malformed("unknown symbol"))?;
        if code_str.is_empty() {
            return Err(malformed("empty code"));
        }

        let mut code = Code::with_capacity(code_str.len());
        for c in code_str.chars() {
            match c {
                '0' => code.push(false),
                '1' => code.push(true),
                _ => return Err(malformed("code is not binary")),
            }
        }

        if table.insert(symbol, code).is_some() {
            return Err(malformed("duplicate symbol"));
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    fn reason_of(text: &str) -> (usize, &'static str) {
        match deserialize(text) {
            Err(HuffmanError::MalformedTable { line_no, reason, .. }) => (line_no, reason),
            other => panic!("expected a malformed table, got {other:?}"),
        }
    }

    #[test]
    fn space_uses_sentinel() {
        let table = CodeTable::from_data(b"asmaa atef with file");
        let text = serialize(&table);

        assert!(text.lines().any(|line| line.starts_with("SPACE:")));
        assert!(!text.lines().any(|line| line.starts_with(' ')));
        assert_eq!(deserialize(&text).unwrap(), table);
    }

    #[test]
    fn every_byte_value_roundtrips() {
        let data: Vec<u8> = (0..=255u8).collect();
        let table = CodeTable::from_data(&data);
        let text = serialize(&table);

        assert_eq!(text.lines().count(), 256);
        assert!(text.is_ascii());
        assert_eq!(deserialize(&text).unwrap(), table);
    }

    #[test]
    fn named_symbols() {
        for (byte, name) in NAMED {
            assert_eq!(symbol_repr(*byte), *name);
            assert_eq!(parse_symbol(name), Some(*byte));
        }
        assert_eq!(symbol_repr(0x00), "0x00");
        assert_eq!(symbol_repr(0xE9), "0xE9");
        assert_eq!(parse_symbol("0xe9"), Some(0xE9));
        assert_eq!(parse_symbol("x"), Some(b'x'));
    }

    #[test]
    fn reads_handwritten_table() {
        let table = deserialize("a:0\r\nSPACE:10\n\nb:11\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(b'a'), Some(bits![u8, Msb0; 0]));
        assert_eq!(table.get(b' '), Some(bits![u8, Msb0; 1, 0]));
        assert_eq!(table.get(b'b'), Some(bits![u8, Msb0; 1, 1]));
    }

    #[test]
    fn splits_on_first_colon_only() {
        // The code after the first colon still has to be binary.
        assert_eq!(reason_of("a:0:1"), (1, "code is not binary"));
    }

    #[test]
    fn empty_text_is_empty_table() {
        assert!(deserialize("").unwrap().is_empty());
        assert_eq!(serialize(&CodeTable::new()), "");
    }

    #[test]
    fn invalid_utf8_names_its_line() {
        match deserialize_bytes(b"a:0\nb:10\n\xff:11\n") {
            Err(HuffmanError::MalformedTable { line_no, line, reason }) => {
                assert_eq!(line_no, 3);
                assert_eq!(line, "\u{FFFD}:11");
                assert_eq!(reason, "not valid UTF-8");
            }
            other => panic!("expected a malformed table, got {other:?}"),
        }
        assert_eq!(deserialize_bytes(b"SPACE:0\n").unwrap().len(), 1);
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(reason_of("a0"), (1, "missing colon"));
        assert_eq!(reason_of("a:0\nab:1"), (2, "unknown symbol"));
        assert_eq!(reason_of("a:"), (1, "empty code"));
        assert_eq!(reason_of("a:012"), (1, "code is not binary"));
        assert_eq!(reason_of("a:0\nb:10\na:11"), (3, "duplicate symbol"));
        assert_eq!(reason_of("::0"), (1, "unknown symbol"));
    }
}
