//! Verify executor decoding against the JSON vectors in `test-vectors/`.
//!
//! Each case gives a response content type and body plus the expected
//! outcome. Decoded data is compared as `serde_json::Value` so field order in
//! the vector file does not matter.

use mailapi_core::{
    ApiError, Credentials, Decoded, HttpRequest, HttpResponse, RequestExecutor, TransportError,
};
use serde_json::Value;

fn executor_replying(response: HttpResponse) -> RequestExecutor {
    RequestExecutor::with_transport(
        Credentials::new("pub", "priv"),
        move |_: &HttpRequest| -> Result<Option<HttpResponse>, TransportError> {
            Ok(Some(response.clone()))
        },
    )
}

#[test]
fn decode_test_vectors() {
    let raw = include_str!("../../test-vectors/decode.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected"];

        let mut response = HttpResponse::new(200, case["body"].as_str().unwrap());
        if let Some(content_type) = case["content_type"].as_str() {
            response = response.with_header("Content-Type", content_type);
        }

        let result = executor_replying(response)
            .execute_into::<Value>(HttpRequest::get("http://localhost:3000/v3/REST/contact"), &[]);

        let kind = expected["kind"].as_str().unwrap();
        if kind == "error" {
            let err = result.expect_err(name);
            match expected["error"].as_str().unwrap() {
                "json" => assert!(matches!(err, ApiError::Json(_)), "{name}: {err:?}"),
                "csv" => assert!(matches!(err, ApiError::Csv(_)), "{name}: {err:?}"),
                other => panic!("unknown error kind: {other}"),
            }
            continue;
        }

        let outcome = result.unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(outcome.count, expected["count"].as_i64().unwrap(), "{name}: count");
        assert_eq!(outcome.total, expected["total"].as_i64().unwrap(), "{name}: total");

        match (kind, outcome.data) {
            ("json", Decoded::Json(data)) => {
                let data = data.unwrap_or(Value::Null);
                assert_eq!(data, expected["data"], "{name}: data");
            }
            ("rows", Decoded::Rows(rows)) => {
                let rows = serde_json::to_value(rows).unwrap();
                assert_eq!(rows, expected["rows"], "{name}: rows");
            }
            ("undecoded", Decoded::Undecoded) => {}
            (kind, data) => panic!("{name}: expected {kind}, got {data:?}"),
        }
    }
}
