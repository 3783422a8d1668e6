//! Self-describing binary object codec.
//!
//! Every value is written as a tag byte followed by a payload whose size the
//! tag determines, so a payload can be decoded without a schema. Records
//! (structs) are written either as an array of field values
//! ([`StructMode::AsArray`]) or as a map of field names to values
//! ([`StructMode::AsMap`]); both are projections of the same [`Schema`].
//!
//! ```
//! use tagpack::{impl_record, Codec, StructMode};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Child {
//!     int: i64,
//!     string: String,
//! }
//!
//! impl_record!(Child { int => "Int", string => "String" });
//!
//! let codec = Codec::new();
//! let bytes = codec
//!     .encode_record(&Child { int: -123, string: "hi".into() }, StructMode::AsMap)
//!     .unwrap();
//! let child: Child = codec.decode_record(&bytes, StructMode::AsMap).unwrap();
//! assert_eq!(child.int, -123);
//! ```

pub mod codec;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod record;
pub mod registry;
pub mod schema;
pub mod to_json;
pub mod value;

pub use codec::{decode, encode, Codec, CodecOptions};
pub use constants::Tag;
pub use decoder::{DecoderOptions, ValueDecoder};
pub use encoder::ValueEncoder;
pub use error::CodecError;
pub use record::{Bytes, FromValue, Projection, Record, StructMode, ToValue};
pub use registry::SchemaRegistry;
pub use schema::{FieldDescriptor, FieldKind, Schema};
pub use to_json::to_json_string;
pub use value::{Extension, Value};
