/// End-to-end tests across the map, both codecs and the I/O helpers
use paramwire::codec::{multipart, query_string, Boundary, MultiValueMap, MultipartCodec, Value};
use paramwire::utils::{read_input, write_output};
use std::io::Write;

fn sample_map() -> MultiValueMap {
    MultiValueMap::from_json(r#"{"key1": [1, 2, 3], "key2": ["abc"], "key3": null, "key4": "x"}"#)
        .unwrap()
}

#[test]
fn test_query_string_round_trip_preserves_order() {
    let map = sample_map();
    let query = query_string::encode(&map);
    assert_eq!(query, "key1=1&key1=2&key1=3&key2=abc&key3=&key4=x");

    let decoded = query_string::decode(query.as_str());
    assert_eq!(decoded, map);
    assert_eq!(
        decoded.keys().collect::<Vec<_>>(),
        map.keys().collect::<Vec<_>>()
    );
}

#[test]
fn test_multipart_round_trip_preserves_order() {
    let map = sample_map();
    let codec = MultipartCodec::for_boundary(&Boundary::generate());
    let decoded = codec.decode(&codec.encode(&map));
    assert_eq!(decoded, map);
    assert_eq!(
        decoded.keys().collect::<Vec<_>>(),
        vec!["key1", "key2", "key3", "key4"]
    );
}

#[test]
fn test_query_to_multipart_and_back() {
    let from_query = query_string::decode("a=1&b=&a=two");
    let body = multipart::encode(&from_query, "--bridge");
    let from_body = multipart::decode(&body, "--bridge");
    assert_eq!(from_body, from_query);
    assert_eq!(query_string::encode(&from_body), "a=1&a=two&b=");
}

#[test]
fn test_integer_like_strings_come_back_as_integers() {
    let mut map = MultiValueMap::new();
    map.put("id", ["123"]);
    let decoded = multipart::decode(&multipart::encode(&map, "--b"), "--b");
    assert_eq!(decoded.get("id"), Some(&[Value::Integer(123)][..]));
    assert_ne!(decoded, map);
}

#[test]
fn test_decoding_is_safe_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let query = format!("n={}&n={}", i, i + 1);
                query_string::decode(query.as_str())
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let map = handle.join().unwrap();
        let i = i as i64;
        assert_eq!(map.get("n"), Some(&[Value::Integer(i), Value::Integer(i + 1)][..]));
    }
}

#[test]
fn test_read_map_from_file_and_write_body() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(input, r#"{{"name": ["paramwire"], "count": 2}}"#).unwrap();

    let bytes = read_input(Some(input.path())).unwrap();
    let map: MultiValueMap = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(map.get("count"), Some(&[Value::Integer(2)][..]));

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("body.txt");
    let body = multipart::encode(&map, "--f");
    write_output(Some(out.as_path()), &body).unwrap();

    let read_back = read_input(Some(out.as_path())).unwrap();
    assert_eq!(multipart::decode(&read_back, "--f"), map);
}

#[test]
fn test_read_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_input(Some(dir.path().join("missing.json").as_path())).unwrap_err();
    assert!(matches!(err, paramwire::CodecError::Io(_)));
}
