pub mod codec;
pub mod config;
pub mod utils;

pub use codec::{CodecError, MultiValueMap, Value};
