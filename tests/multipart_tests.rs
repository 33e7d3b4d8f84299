/// Tests for multipart/form-data encoding and decoding
use paramwire::codec::{multipart, Boundary, CodecError, LineEnding, MultiValueMap, MultipartCodec, Value};

fn expected_key1_key2() -> MultiValueMap {
    let mut expected = MultiValueMap::new();
    expected.put("key1", [1i64, 2, 3]);
    expected.put("key2", ["abc"]);
    expected
}

#[test]
fn test_decode_mixed_separators() {
    let body = "--boundary--\n\
                Content-Disposition: form-data; name=\"key1\"\n\
                \r\n\
                1\n\
                --boundary--\n\
                Content-Disposition: form-data; name=\"key1\"\n\
                \r\
                2\n\
                --boundary--\n\
                Content-Disposition: form-data; name=\"key1\"\n\
                \n\
                3\n\
                --boundary--\n\
                Content-Disposition: form-data; name=\"key2\"\n\
                \n\
                abc\n\
                --boundary--\n";
    let map = multipart::decode(body.as_bytes(), "--boundary");
    assert_eq!(map, expected_key1_key2());
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["key1", "key2"]);
}

#[test]
fn test_decode_crlf_body() {
    let body = "--xyz\r\n\
                Content-Disposition: form-data; name=\"key1\"\r\n\r\n1\r\n\
                --xyz\r\n\
                Content-Disposition: form-data; name=\"key1\"\r\n\r\n2\r\n\
                --xyz\r\n\
                Content-Disposition: form-data; name=\"key1\"\r\n\r\n3\r\n\
                --xyz\r\n\
                Content-Disposition: form-data; name=\"key2\"\r\n\r\nabc\r\n\
                --xyz--\r\n";
    assert_eq!(multipart::decode(body.as_bytes(), "--xyz"), expected_key1_key2());
}

#[test]
fn test_decode_empty_input() {
    assert!(multipart::decode(b"", "--b").is_empty());
    assert!(multipart::decode(b"--b--\r\n", "--b").is_empty());
}

#[test]
fn test_decode_empty_delimiter() {
    let body = b"--b\nContent-Disposition: form-data; name=\"k\"\n\nv\n--b--\n";
    assert!(multipart::decode(body, "").is_empty());
}

#[test]
fn test_decode_empty_value_creates_key_without_values() {
    let body = "--b\r\nContent-Disposition: form-data; name=\"empty\"\r\n\r\n\r\n--b--\r\n";
    let map = multipart::decode(body.as_bytes(), "--b");
    assert_eq!(map.get("empty"), Some(&[][..]));
}

#[test]
fn test_decode_value_directly_before_delimiter() {
    // No terminator line between the blank line and the next delimiter
    let body = "--b\nContent-Disposition: form-data; name=\"k\"\n\n--b--\n";
    let map = multipart::decode(body.as_bytes(), "--b");
    assert_eq!(map.get("k"), Some(&[][..]));
}

#[test]
fn test_decode_multiline_value() {
    let body = "--b\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nline one\r\nline two\r\n--b--\r\n";
    let map = multipart::decode(body.as_bytes(), "--b");
    assert_eq!(map.get("text"), Some(&[Value::from("line one\r\nline two")][..]));
}

#[test]
fn test_decode_ignores_preamble() {
    let body = "This is a preamble.\r\n--b\r\nContent-Disposition: form-data; name=\"k\"\r\n\r\nv\r\n--b--\r\n";
    let map = multipart::decode(body.as_bytes(), "--b");
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["k"]);
}

#[test]
fn test_decode_skips_part_without_name() {
    let body = "--b\n\
                Content-Disposition: form-data\n\
                \n\
                lost\n\
                --b\n\
                Content-Disposition: form-data; name=\"kept\"\n\
                \n\
                7\n\
                --b--\n";
    let map = multipart::decode(body.as_bytes(), "--b");
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("kept"), Some(&[Value::Integer(7)][..]));
}

#[test]
fn test_decode_skips_part_without_separator() {
    let body = "--b\n\
                Content-Disposition: form-data; name=\"broken\"\n\
                --b\n\
                Content-Disposition: form-data; name=\"ok\"\n\
                \n\
                yes\n\
                --b--\n";
    let map = multipart::decode(body.as_bytes(), "--b");
    assert!(!map.contains_key("broken"));
    assert_eq!(map.get("ok"), Some(&[Value::from("yes")][..]));
}

#[test]
fn test_decode_extra_headers_are_ignored() {
    let body = "--b\r\n\
                Content-Type: text/plain\r\n\
                Content-Disposition: form-data; name=\"k\"\r\n\
                \r\n\
                v\r\n\
                --b--\r\n";
    let map = multipart::decode(body.as_bytes(), "--b");
    assert_eq!(map.get("k"), Some(&[Value::from("v")][..]));
}

#[test]
fn test_decode_invalid_utf8_is_replaced() {
    let mut body = b"--b\nContent-Disposition: form-data; name=\"k\"\n\n".to_vec();
    body.extend_from_slice(&[0xff, b'x']);
    body.extend_from_slice(b"\n--b--\n");
    let map = multipart::decode(&body, "--b");
    assert_eq!(map.get("k"), Some(&[Value::from("\u{fffd}x")][..]));
}

#[test]
fn test_encode_layout() {
    let mut map = MultiValueMap::new();
    map.put("key1", [1i64, 2]);
    map.put_empty("key2");
    let body = multipart::encode(&map, "--b");
    let expected = "--b\r\n\
                    Content-Disposition: form-data; name=\"key1\"\r\n\r\n1\r\n\
                    --b\r\n\
                    Content-Disposition: form-data; name=\"key1\"\r\n\r\n2\r\n\
                    --b\r\n\
                    Content-Disposition: form-data; name=\"key2\"\r\n\r\n\r\n\
                    --b--\r\n";
    assert_eq!(String::from_utf8(body).unwrap(), expected);
}

#[test]
fn test_encode_missing_map_is_only_the_closing_line() {
    assert_eq!(multipart::encode(None, "--b"), b"--b--\r\n".to_vec());
}

#[test]
fn test_round_trip_both_line_endings() {
    let mut map = expected_key1_key2();
    map.put_empty("none");
    map.put("text", ["two\nlines", "tab\tseparated"]);
    for line_ending in [LineEnding::CrLf, LineEnding::Lf] {
        let codec = MultipartCodec::new("--rt").line_ending(line_ending);
        let decoded = codec.decode(&codec.encode(&map));
        assert_eq!(decoded, map, "line ending {:?}", line_ending);
        assert_eq!(
            decoded.keys().collect::<Vec<_>>(),
            vec!["key1", "key2", "none", "text"]
        );
    }
}

#[test]
fn test_boundary_from_content_type() {
    let b = Boundary::from_content_type("Multipart/Form-Data; charset=utf-8; boundary=----WebKitFormBoundary7MA4YWxk").unwrap();
    assert_eq!(b.token(), "----WebKitFormBoundary7MA4YWxk");
    assert_eq!(b.delimiter(), "------WebKitFormBoundary7MA4YWxk");

    assert!(matches!(
        Boundary::from_content_type("multipart/form-data"),
        Err(CodecError::MissingBoundary(_))
    ));
    assert!(matches!(
        Boundary::from_content_type("application/json; boundary=x"),
        Err(CodecError::NotMultipart(_))
    ));
    assert!(matches!(
        Boundary::from_content_type("multipart/form-data; boundary=\"\""),
        Err(CodecError::InvalidBoundary(_))
    ));
}

#[test]
fn test_codec_for_boundary_round_trip() {
    let boundary = Boundary::new("abc").unwrap();
    let codec = MultipartCodec::for_boundary(&boundary);
    assert_eq!(codec.delimiter(), "--abc");

    let map = expected_key1_key2();
    let body = codec.encode(&map);
    assert!(body.starts_with(b"--abc\r\n"));
    assert!(body.ends_with(b"--abc--\r\n"));
    assert_eq!(multipart::decode(&body, &boundary.delimiter()), map);
}

#[test]
fn test_round_trip_keeps_leading_zeros() {
    let mut map = MultiValueMap::new();
    map.put("zip", ["01234"]);
    map.put("n", [0i64]);
    let codec = MultipartCodec::new("--z");
    let decoded = codec.decode(&codec.encode(&map));
    assert_eq!(decoded, map);
    assert_eq!(decoded.get("zip"), Some(&[Value::from("01234")][..]));
}

#[test]
fn test_round_trip_field_names_with_header_syntax() {
    let mut map = MultiValueMap::new();
    for key in ["a;b", "a\"b", "a=b", "line\nbreak", "cr\rhere", "100%22", "x; name=\"y\""] {
        map.put(key, ["v"]);
    }
    for line_ending in [LineEnding::CrLf, LineEnding::Lf] {
        let codec = MultipartCodec::new("--names").line_ending(line_ending);
        let body = codec.encode(&map);
        assert_eq!(codec.decode(&body), map, "line ending {:?}", line_ending);
    }
}

#[test]
fn test_encode_escapes_field_names() {
    let mut map = MultiValueMap::new();
    map.put("say \"hi\"", ["1"]);
    let body = MultipartCodec::new("--b").line_ending(LineEnding::Lf).encode(&map);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("Content-Disposition: form-data; name=\"say %22hi%22\"\n"));
}
