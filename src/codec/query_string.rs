//! Query string encoding and decoding
//!
//! The wire format is a small subset of `application/x-www-form-urlencoded`:
//! segments are joined with `&`, and each segment is split on its first `=`.
//! Text is passed through verbatim unless percent-encoding is switched on.

use std::borrow::Cow;

use super::multi_value_map::MultiValueMap;
use super::value::Value;
use crate::utils::{query_of, with_query};

/// Query string codec
///
/// # Examples
///
/// ```
/// use paramwire::codec::{MultiValueMap, QueryStringCodec};
///
/// let mut map = MultiValueMap::new();
/// map.put("q", ["a b"]);
///
/// assert_eq!(QueryStringCodec::new().encode(&map), "q=a b");
/// assert_eq!(QueryStringCodec::new().percent_encoded(true).encode(&map), "q=a%20b");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStringCodec {
    percent_encoded: bool,
}

impl QueryStringCodec {
    /// Codec that passes keys and values through verbatim
    pub const fn new() -> Self {
        Self {
            percent_encoded: false,
        }
    }

    /// Percent-encode on the way out and percent-decode on the way in
    pub fn percent_encoded(mut self, enabled: bool) -> Self {
        self.percent_encoded = enabled;
        self
    }

    pub fn is_percent_encoded(&self) -> bool {
        self.percent_encoded
    }

    /// Encode a map as a query string
    ///
    /// A missing or empty map gives `""`. A key with no values gives a single
    /// `key=` segment; otherwise there is one `key=value` segment per value.
    pub fn encode<'a>(&self, map: impl Into<Option<&'a MultiValueMap>>) -> String {
        let Some(map) = map.into() else {
            return String::new();
        };

        let mut segments = Vec::with_capacity(map.value_count().max(map.len()));
        for (key, values) in map.iter() {
            let key = self.escape(key);
            if values.is_empty() {
                segments.push(format!("{}=", key));
                continue;
            }
            for value in values {
                let text = value.to_string();
                segments.push(format!("{}={}", key, self.escape(&text)));
            }
        }

        let out = segments.join("&");
        tracing::debug!(keys = map.len(), bytes = out.len(), "Encoded query string");
        out
    }

    /// Decode a query string into a map
    ///
    /// Never fails. A segment without `=` is a key with no value, and an empty
    /// value (`key=`) leaves the key with an empty sequence. An empty segment
    /// (`a=1&&b=2`, trailing `&`) is the empty key `""` with no value.
    pub fn decode<'a>(&self, query: impl Into<Option<&'a str>>) -> MultiValueMap {
        let mut map = MultiValueMap::new();
        let query = match query.into() {
            Some(q) if !q.is_empty() => q,
            _ => return map,
        };

        for segment in query.split('&') {
            let (key, remainder) = segment.split_once('=').unwrap_or((segment, ""));
            let values = map.put_empty(self.unescape(key).into_owned());
            if remainder.is_empty() {
                continue;
            }
            values.push(Value::coerce(&self.unescape(remainder)));
        }

        tracing::debug!(keys = map.len(), values = map.value_count(), "Decoded query string");
        map
    }

    /// Append the encoded map to `url`, keeping any `#fragment` last
    ///
    /// # Examples
    ///
    /// ```
    /// use paramwire::codec::{MultiValueMap, QueryStringCodec};
    ///
    /// let mut map = MultiValueMap::new();
    /// map.put("page", [2i64]);
    ///
    /// let codec = QueryStringCodec::new();
    /// assert_eq!(codec.append_to_url("https://example.com/list", &map), "https://example.com/list?page=2");
    /// assert_eq!(codec.append_to_url("https://example.com/list?sort=asc#top", &map), "https://example.com/list?sort=asc&page=2#top");
    /// ```
    pub fn append_to_url<'a>(&self, url: &str, map: impl Into<Option<&'a MultiValueMap>>) -> String {
        with_query(url, &self.encode(map))
    }

    /// Decode the query part of a full URL
    ///
    /// A URL without `?` gives an empty map. The fragment is ignored.
    pub fn decode_url(&self, url: &str) -> MultiValueMap {
        self.decode(query_of(url))
    }

    fn escape<'s>(&self, text: &'s str) -> Cow<'s, str> {
        if self.percent_encoded {
            urlencoding::encode(text)
        } else {
            Cow::Borrowed(text)
        }
    }

    fn unescape<'s>(&self, text: &'s str) -> Cow<'s, str> {
        if !self.percent_encoded {
            return Cow::Borrowed(text);
        }
        let spaced = text.replace('+', " ");
        match urlencoding::decode(&spaced) {
            Ok(decoded) => Cow::Owned(decoded.into_owned()),
            Err(e) => {
                tracing::warn!(%e, "Keeping undecodable query text as-is: {}", text);
                Cow::Borrowed(text)
            }
        }
    }
}

/// Encode a map with the verbatim codec
///
/// # Examples
///
/// ```
/// use paramwire::codec::{query_string, MultiValueMap};
///
/// let mut map = MultiValueMap::new();
/// map.put("key1", [1i64, 2, 3]);
/// map.put("key2", ["abc"]);
/// assert_eq!(query_string::encode(&map), "key1=1&key1=2&key1=3&key2=abc");
/// assert_eq!(query_string::encode(None), "");
/// ```
pub fn encode<'a>(map: impl Into<Option<&'a MultiValueMap>>) -> String {
    QueryStringCodec::new().encode(map)
}

/// Decode a query string with the verbatim codec
pub fn decode<'a>(query: impl Into<Option<&'a str>>) -> MultiValueMap {
    QueryStringCodec::new().decode(query)
}
