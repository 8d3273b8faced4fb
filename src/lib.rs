//! Static two-pass Huffman coding.
//!
//! The first pass counts byte frequencies and derives a prefix-free code from
//! them, the second pass replaces every byte with its code. The code table is
//! persisted next to the payload so that a separate run can decode it.
//!
//! ```
//! let (payload, table) = huffpack::compress(b"asmaa atef with file").unwrap();
//! let text = huffpack::table_format::serialize(&table);
//! let table = huffpack::table_format::deserialize(&text).unwrap();
//! assert_eq!(huffpack::decompress(&payload, &table).unwrap(), b"asmaa atef with file");
//! ```

pub mod code_table;
pub mod codec;
pub mod error;
pub mod frequency;
pub mod payload;
pub mod store;
pub mod table_format;
pub mod tree;

pub use code_table::{Code, CodeTable, InverseCodeTable};
pub use codec::{Decoder, compress, decode, decompress, encode};
pub use error::{HuffmanError, Result};
pub use payload::{PackedPayload, Payload};
pub use store::{PayloadFormat, Summary, check_store, compress_to_store, decompress_from_store};
