//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use percent_encoding::percent_decode_str;
use ransack_provider::{
    CreateParams, DeleteManyParams, GetManyParams, GetManyReferenceParams, HttpMethod, HttpResponse, Identifier,
    ListParams, ProviderConfig, ProviderError, RequestMapper, UpdateManyParams,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn mapper() -> RequestMapper {
    RequestMapper::new(ProviderConfig::new(BASE_URL))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Build an `HttpResponse` from a vector's `simulated_response`.
fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    let headers = sim
        .get("headers")
        .and_then(Value::as_array)
        .map(|headers| {
            headers
                .iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default();
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers,
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn vectors(raw: &str) -> Vec<Value> {
    let parsed: Value = serde_json::from_str(raw).unwrap();
    parsed["cases"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let m = mapper();
    for case in vectors(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        let resource = case["resource"].as_str().unwrap();
        let params: ListParams = serde_json::from_value(case["params"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = m.build_get_list(resource, &params);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert!(req.body.is_none(), "{name}: body should be None");

        // Verify parse
        let result = m.parse_get_list(simulated(&case));
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "MalformedResponse" => {
                    assert!(matches!(err, ProviderError::MalformedResponse(_)), "{name}: expected MalformedResponse")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let list = result.unwrap();
            assert_eq!(serde_json::to_value(&list).unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Get many
// ---------------------------------------------------------------------------

#[test]
fn get_many_test_vectors() {
    let m = mapper();
    for case in vectors(include_str!("../../test-vectors/get_many.json")) {
        let name = case["name"].as_str().unwrap();
        let resource = case["resource"].as_str().unwrap();
        let ids: Vec<Identifier> = serde_json::from_value(case["ids"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = m.build_get_many(resource, &GetManyParams { ids });
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        let decoded = percent_decode_str(&req.url).decode_utf8().unwrap();
        assert_eq!(
            decoded,
            format!("{BASE_URL}{}", expected_req["decoded_path"].as_str().unwrap()),
            "{name}: decoded url"
        );

        // Verify parse
        let records = m.parse_get_many(simulated(&case)).unwrap();
        assert_eq!(serde_json::to_value(&records).unwrap(), case["expected_result"], "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Get many reference
// ---------------------------------------------------------------------------

#[test]
fn get_many_reference_test_vectors() {
    let m = mapper();
    for case in vectors(include_str!("../../test-vectors/get_many_reference.json")) {
        let name = case["name"].as_str().unwrap();
        let resource = case["resource"].as_str().unwrap();
        let params: GetManyReferenceParams = serde_json::from_value(case["params"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        let req = m.build_get_many_reference(resource, &params);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        let list = m.parse_get_many_reference(simulated(&case)).unwrap();
        assert_eq!(serde_json::to_value(&list).unwrap(), case["expected_result"], "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let m = mapper();
    for case in vectors(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let resource = case["resource"].as_str().unwrap();
        let params = CreateParams {
            data: case["input"].as_object().cloned().unwrap(),
        };
        let expected_req = &case["expected_request"];

        // Verify build
        let req = m.build_create(resource, &params).unwrap();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = serde_json::from_value(expected_req["headers"].clone()).unwrap();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(req_body, expected_req["body"], "{name}: body");

        // Verify parse
        let created = m.parse_create(&params, simulated(&case)).unwrap();
        assert_eq!(Value::Object(created), case["expected_result"], "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Batch mutations
// ---------------------------------------------------------------------------

#[test]
fn batch_test_vectors() {
    let m = mapper();
    for case in vectors(include_str!("../../test-vectors/batch.json")) {
        let name = case["name"].as_str().unwrap();
        let resource = case["resource"].as_str().unwrap();
        let ids: Vec<Identifier> = serde_json::from_value(case["ids"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        let (req, result) = match case["operation"].as_str().unwrap() {
            "updateMany" => {
                let params = UpdateManyParams {
                    ids,
                    data: case["data"].as_object().cloned().unwrap(),
                };
                let req = m.build_update_many(resource, &params).unwrap();
                (req, m.parse_update_many(simulated(&case)).unwrap())
            }
            "deleteMany" => {
                let req = m.build_delete_many(resource, &DeleteManyParams { ids });
                (req, m.parse_delete_many(simulated(&case)).unwrap())
            }
            other => panic!("{name}: unknown operation: {other}"),
        };

        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        match expected_req.get("body") {
            Some(expected_body) => {
                let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&req_body, expected_body, "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }

        let expected: Vec<Identifier> = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result, expected, "{name}: parsed result");
    }
}
