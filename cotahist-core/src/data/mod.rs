//! Resource resolution, fetching, and fixed-width decoding.

pub mod decoder;
pub mod fetch;
pub mod layout;
pub mod resolver;
pub mod tables;
pub mod transport;

pub use decoder::{decode_lines, read_archive, DecodeError, DecodedRow, FieldValue};
pub use fetch::{FetchOutcome, FetchProgress, FetchSummary, Fetcher, NullProgress, StdoutProgress};
pub use layout::{FieldKind, FieldSpec, LayoutError, RecordKind, RecordLayout};
pub use transport::{FetchError, HttpTransport, ReqwestTransport, ResourceMeta};
