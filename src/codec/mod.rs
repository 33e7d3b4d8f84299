//! Parameter map codecs
//!
//! This module converts between an ordered multi-valued parameter map and the
//! two text formats used to carry parameters in HTTP requests:
//!
//! - URL query strings (`key1=1&key1=2&key2=abc`)
//! - `multipart/form-data` bodies with one textual part per value
//!
//! Every operation is a pure function of its input. Decoders are total: they
//! tolerate malformed input and always return a map.
//!
//! # Examples
//!
//! Query strings:
//!
//! ```
//! use paramwire::codec::{query_string, Value};
//!
//! let map = query_string::decode("key1=1&key1=2&key1=3&key2=abc");
//! assert_eq!(map.get("key1"), Some(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)][..]));
//! assert_eq!(query_string::encode(&map), "key1=1&key1=2&key1=3&key2=abc");
//! ```
//!
//! Multipart bodies:
//!
//! ```
//! use paramwire::codec::{Boundary, MultiValueMap, MultipartCodec};
//!
//! let mut map = MultiValueMap::new();
//! map.put("title", ["hello"]);
//!
//! let boundary = Boundary::generate();
//! let codec = MultipartCodec::for_boundary(&boundary);
//! let body = codec.encode(&map);
//! assert_eq!(codec.decode(&body), map);
//! ```

mod error;
mod value;
mod multi_value_map;
pub mod query_string;
pub mod multipart;

// Re-export public API
pub use error::CodecError;
pub use value::Value;
pub use multi_value_map::MultiValueMap;
pub use query_string::QueryStringCodec;
pub use multipart::{Boundary, LineEnding, MultipartCodec};
