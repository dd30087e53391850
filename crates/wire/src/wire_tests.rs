// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;
use proptest::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(1);

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::Ok).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert_eq!(json_str, r#"{"type":"Ok"}"#);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    assert!(matches!(read_message(&mut cursor).await, Err(ProtocolError::ConnectionClosed)));
}

#[tokio::test]
async fn truncated_payload_is_connection_closed() {
    let mut buffer = 10u32.to_be_bytes().to_vec();
    buffer.extend_from_slice(b"short");
    let mut cursor = std::io::Cursor::new(buffer);

    assert!(matches!(read_message(&mut cursor).await, Err(ProtocolError::ConnectionClosed)));
}

#[tokio::test]
async fn oversized_frame_is_refused_before_reading() {
    let buffer = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes().to_vec();
    let mut cursor = std::io::Cursor::new(buffer);

    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::MessageTooLarge { size, .. }) if size == MAX_MESSAGE_SIZE + 1
    ));
}

#[tokio::test]
async fn request_survives_the_socket() {
    let (mut client, mut server) = tokio::io::duplex(1024);
    let request = Request::Track { coordinates: prov_core::test_support::coords("g", "a") };

    write_request(&mut client, &request, TIMEOUT).await.unwrap();
    let received = read_request(&mut server, TIMEOUT).await.unwrap();

    assert_eq!(received, request);
}

#[tokio::test]
async fn garbage_payload_is_a_json_error() {
    let mut buffer = Vec::new();
    write_message(&mut buffer, b"{not json").await.unwrap();
    let mut cursor = std::io::Cursor::new(buffer);

    assert!(matches!(read_response(&mut cursor, TIMEOUT).await, Err(ProtocolError::Json(_))));
}

#[tokio::test(start_paused = true)]
async fn silent_peer_times_out() {
    let (_client, mut server) = tokio::io::duplex(64);
    assert!(matches!(read_request(&mut server, TIMEOUT).await, Err(ProtocolError::Timeout)));
}

proptest! {
    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode::<Request>(&bytes);
    }
}
