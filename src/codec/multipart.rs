//! `multipart/form-data` encoding and decoding
//!
//! Only textual fields are modelled: every part carries one
//! `Content-Disposition: form-data; name="..."` header and a scalar value.
//! The delimiter is matched literally as a line prefix, so both `--token` and
//! `--token--` lines separate parts. Header and body may be separated by a
//! blank line ending in CRLF, a bare CR, or a bare LF.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;

use super::error::CodecError;
use super::multi_value_map::MultiValueMap;
use super::value::Value;

/// RFC 2046 caps boundary tokens at 70 characters.
pub const MAX_BOUNDARY_LEN: usize = 70;

const CONTENT_DISPOSITION: &str = "content-disposition";
const FORM_DATA: &str = "multipart/form-data";

/// Line terminator written by the encoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

impl FromStr for LineEnding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crlf" => Ok(LineEnding::CrLf),
            "lf" => Ok(LineEnding::Lf),
            _ => Err(CodecError::UnknownLineEnding(s.to_string())),
        }
    }
}

/// Boundary token as it appears in a `Content-Type` header
///
/// The line literal that separates parts is the token prefixed with `--`,
/// see [`Boundary::delimiter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(String);

impl Boundary {
    /// Validate a boundary token
    ///
    /// # Examples
    ///
    /// ```
    /// use paramwire::codec::Boundary;
    ///
    /// let b = Boundary::new("abc123").unwrap();
    /// assert_eq!(b.delimiter(), "--abc123");
    /// assert_eq!(b.content_type(), "multipart/form-data; boundary=abc123");
    ///
    /// assert!(Boundary::new("").is_err());
    /// assert!(Boundary::new("a\nb").is_err());
    /// ```
    pub fn new(token: impl Into<String>) -> Result<Self, CodecError> {
        let token = token.into();
        if token.is_empty() {
            return Err(CodecError::InvalidBoundary("boundary is empty".to_string()));
        }
        if token.len() > MAX_BOUNDARY_LEN {
            return Err(CodecError::InvalidBoundary(format!(
                "boundary is {} characters long, at most {} allowed",
                token.len(),
                MAX_BOUNDARY_LEN
            )));
        }
        if token.contains(['\r', '\n']) {
            return Err(CodecError::InvalidBoundary(
                "boundary contains a line break".to_string(),
            ));
        }
        if token.ends_with(' ') {
            return Err(CodecError::InvalidBoundary(
                "boundary ends with a space".to_string(),
            ));
        }
        Ok(Boundary(token))
    }

    /// Random boundary token, unlikely to occur inside field values
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Boundary(format!("paramwire-{}", hex::encode(bytes)))
    }

    /// Extract the boundary from a `multipart/form-data` Content-Type value
    ///
    /// # Examples
    ///
    /// ```
    /// use paramwire::codec::Boundary;
    ///
    /// let b = Boundary::from_content_type("multipart/form-data; boundary=\"xyz\"").unwrap();
    /// assert_eq!(b.token(), "xyz");
    /// assert!(Boundary::from_content_type("text/plain; boundary=xyz").is_err());
    /// ```
    pub fn from_content_type(header: &str) -> Result<Self, CodecError> {
        let mut params = header.split(';');
        let media_type = params.next().unwrap_or("").trim();
        if !media_type.eq_ignore_ascii_case(FORM_DATA) {
            return Err(CodecError::NotMultipart(header.to_string()));
        }
        for param in params {
            if let Some((k, v)) = param.split_once('=') {
                if k.trim().eq_ignore_ascii_case("boundary") {
                    return Boundary::new(v.trim().trim_matches('"'));
                }
            }
        }
        Err(CodecError::MissingBoundary(header.to_string()))
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Line literal that introduces each part
    pub fn delimiter(&self) -> String {
        format!("--{}", self.0)
    }

    /// `Content-Type` header value announcing this boundary
    pub fn content_type(&self) -> String {
        format!("{}; boundary={}", FORM_DATA, self.0)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Multipart codec bound to one delimiter literal
///
/// # Examples
///
/// ```
/// use paramwire::codec::{MultiValueMap, MultipartCodec, LineEnding};
///
/// let mut map = MultiValueMap::new();
/// map.put("key1", [1i64]);
///
/// let codec = MultipartCodec::new("--b").line_ending(LineEnding::Lf);
/// let body = codec.encode(&map);
/// assert_eq!(
///     String::from_utf8(body.clone()).unwrap(),
///     "--b\nContent-Disposition: form-data; name=\"key1\"\n\n1\n--b--\n"
/// );
/// assert_eq!(codec.decode(&body), map);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartCodec {
    delimiter: String,
    line_ending: LineEnding,
}

impl MultipartCodec {
    /// Codec for a literal delimiter line such as `--boundary`
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            line_ending: LineEnding::default(),
        }
    }

    /// Codec for the delimiter derived from a header boundary token
    pub fn for_boundary(boundary: &Boundary) -> Self {
        Self::new(boundary.delimiter())
    }

    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Encode a map as a multipart body
    ///
    /// Each value becomes its own part, and a key without values still gets
    /// one part with an empty body. The body ends with the delimiter followed
    /// by `--`. A value with a line starting with the delimiter cannot be
    /// decoded back; such values are logged as a warning.
    pub fn encode<'a>(&self, map: impl Into<Option<&'a MultiValueMap>>) -> Vec<u8> {
        let mut out = String::new();
        let mut parts = 0usize;
        if let Some(map) = map.into() {
            for (key, values) in map.iter() {
                if values.is_empty() {
                    self.write_part(&mut out, key, "");
                    parts += 1;
                    continue;
                }
                for value in values {
                    self.write_part(&mut out, key, &value.to_string());
                    parts += 1;
                }
            }
        }
        out.push_str(&self.delimiter);
        out.push_str("--");
        out.push_str(self.line_ending.as_str());

        tracing::debug!(parts, bytes = out.len(), "Encoded multipart body");
        out.into_bytes()
    }

    fn write_part(&self, out: &mut String, key: &str, value: &str) {
        if collides_with_delimiter(value, &self.delimiter) {
            tracing::warn!(key, "Value contains a delimiter line, the body will not decode back");
        }
        let eol = self.line_ending.as_str();
        out.push_str(&self.delimiter);
        out.push_str(eol);
        out.push_str("Content-Disposition: form-data; name=\"");
        out.push_str(&escape_name(key));
        out.push('"');
        out.push_str(eol);
        out.push_str(eol);
        out.push_str(value);
        out.push_str(eol);
    }

    /// Decode a multipart body into a map
    ///
    /// Never fails. Bytes are read as UTF-8, with invalid sequences replaced.
    /// Text before the first delimiter line is ignored. A part without a
    /// `name` attribute or without a blank line after its headers is skipped.
    pub fn decode(&self, body: &[u8]) -> MultiValueMap {
        let mut map = MultiValueMap::new();
        if self.delimiter.is_empty() {
            tracing::warn!("Empty multipart delimiter, nothing decoded");
            return map;
        }

        let text = String::from_utf8_lossy(body);
        let lines: Vec<Line<'_>> = Lines::new(&text).collect();
        let delimiters: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.text.starts_with(self.delimiter.as_str()))
            .map(|(i, _)| i)
            .collect();

        for (n, &at) in delimiters.iter().enumerate() {
            let (until, value_end) = match delimiters.get(n + 1) {
                Some(&next) => (next, lines[next].start),
                None => (lines.len(), text.len()),
            };
            decode_part(&text, &lines[at + 1..until], value_end, n, &mut map);
        }

        tracing::debug!(keys = map.len(), values = map.value_count(), "Decoded multipart body");
        map
    }
}

/// Encode a map with a literal delimiter and CRLF line endings
pub fn encode<'a>(map: impl Into<Option<&'a MultiValueMap>>, delimiter: &str) -> Vec<u8> {
    MultipartCodec::new(delimiter).encode(map)
}

/// Decode a body whose parts are introduced by lines starting with `delimiter`
///
/// # Examples
///
/// ```
/// use paramwire::codec::{multipart, Value};
///
/// let body = b"--b\r\nContent-Disposition: form-data; name=\"n\"\r\n\r\n42\r\n--b--\r\n";
/// let map = multipart::decode(body, "--b");
/// assert_eq!(map.get("n"), Some(&[Value::Integer(42)][..]));
/// ```
pub fn decode(body: &[u8], delimiter: &str) -> MultiValueMap {
    MultipartCodec::new(delimiter).decode(body)
}

fn decode_part(text: &str, lines: &[Line<'_>], value_end: usize, index: usize, map: &mut MultiValueMap) {
    // Closing delimiter, or nothing but blank lines after it
    if lines.iter().all(|line| line.text.trim().is_empty()) {
        return;
    }

    let Some(blank) = lines.iter().position(|line| line.text.is_empty()) else {
        tracing::warn!(part = index, "Skipping multipart part without header/body separator");
        return;
    };
    let Some(name) = lines[..blank].iter().find_map(|line| disposition_name(line.text)) else {
        tracing::warn!(part = index, "Skipping multipart part without a name attribute");
        return;
    };

    let raw = strip_line_terminator(&text[lines[blank].next..value_end]);
    let values = map.put_empty(name);
    if !raw.is_empty() {
        values.push(Value::coerce(raw));
    }
}

/// `name` attribute of a `Content-Disposition` header line
fn disposition_name(line: &str) -> Option<String> {
    let (header, rest) = line.split_once(':')?;
    if !header.trim().eq_ignore_ascii_case(CONTENT_DISPOSITION) {
        return None;
    }
    header_params(rest).into_iter().find_map(|param| {
        let (k, v) = param.split_once('=')?;
        if !k.trim().eq_ignore_ascii_case("name") {
            return None;
        }
        let v = v.trim();
        match v.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            Some(quoted) => Some(unescape_name(quoted)),
            None => Some(v.to_string()),
        }
    })
}

/// Split header parameters on `;`, leaving quoted strings intact
fn header_params(s: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&s[start..]);
    params
}

// Browsers escape `"`, CR and LF in field names; `%` is escaped as well so
// that the decoder can reverse exactly these four sequences
fn escape_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '%' => out.push_str("%25"),
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_name(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut rest = quoted;
    while let Some(at) = rest.find('%') {
        out.push_str(&rest[..at]);
        let escaped = rest.get(at..at + 3);
        let decoded = match escaped {
            Some("%25") => Some('%'),
            Some("%22") => Some('"'),
            Some("%0D") | Some("%0d") => Some('\r'),
            Some("%0A") | Some("%0a") => Some('\n'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[at + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[at + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Whether some line of `value` would be read back as a delimiter line
fn collides_with_delimiter(value: &str, delimiter: &str) -> bool {
    Lines::new(value).any(|line| line.text.starts_with(delimiter))
}

fn strip_line_terminator(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .or_else(|| s.strip_suffix('\r'))
        .unwrap_or(s)
}

/// One line of the body, without its terminator
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    text: &'a str,
    /// Byte offset of the first character
    start: usize,
    /// Byte offset just past the terminator
    next: usize,
}

/// Splits on CRLF, bare CR and bare LF
struct Lines<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }
        let start = self.pos;
        let end = bytes[start..]
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .map_or(bytes.len(), |i| start + i);
        let next = match (bytes.get(end).copied(), bytes.get(end + 1).copied()) {
            (Some(b'\r'), Some(b'\n')) => end + 2,
            (Some(_), _) => end + 1,
            (None, _) => end,
        };
        self.pos = next;
        Some(Line {
            text: &self.text[start..end],
            start,
            next,
        })
    }
}
