// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use prov_core::test_support::coords;

#[yare::parameterized(
    ping = { r#"{"type":"Ping"}"#, Request::Ping },
    shutdown = { r#"{"type":"Shutdown"}"#, Request::Shutdown },
    hello = { r#"{"type":"Hello","version":"0.1.0"}"#, Request::Hello { version: "0.1.0".into() } },
)]
fn parses_simple_requests(json: &str, expected: Request) {
    assert_eq!(serde_json::from_str::<Request>(json).unwrap(), expected);
}

#[test]
fn fact_payload_is_kept_raw() {
    let json = r#"{"type":"Fact","fact":{"type":"something-new","extra":[1,2]}}"#;
    let Request::Fact { fact } = serde_json::from_str::<Request>(json).unwrap() else {
        panic!("expected a fact");
    };
    assert_eq!(fact["type"], "something-new");
}

#[test]
fn track_carries_coordinates() {
    let json = r#"{"type":"Track","coordinates":{"group_id":"org.example","artifact_id":"core"}}"#;
    assert_eq!(
        serde_json::from_str::<Request>(json).unwrap(),
        Request::Track { coordinates: coords("org.example", "core") }
    );
}
