//! Assertion predicates invoked by generated behavior tests
//!
//! Every predicate returns an [`Outcome`] instead of panicking so that one
//! failed check never hides the others in the same test. Predicates that read
//! the request body restore it before returning.

use crate::error::SendError;
use crate::request::{OutputSlot, Request};
use crate::xml;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use std::fmt::{self, Debug};
use url::form_urlencoded;
use url::Url;

/// Result of evaluating one predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// The observed value differs from the expectation
    Mismatch { expected: String, actual: String },
    /// The expectation itself could not be interpreted
    Malformed(String),
}

impl Outcome {
    /// Compare two values, rendering both on mismatch
    pub fn compare<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> Self {
        if expected == actual {
            Outcome::Pass
        } else {
            Outcome::mismatch(format!("{expected:?}"), format!("{actual:?}"))
        }
    }

    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Outcome::Mismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("pass"),
            Outcome::Mismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Outcome::Malformed(reason) => write!(f, "malformed expectation: {reason}"),
        }
    }
}

pub fn assert_request_method_equals(req: &mut Request, expected: &str) -> Outcome {
    Outcome::compare(expected, req.method.as_str())
}

pub fn assert_request_url_matches(req: &mut Request, expected: &str) -> Outcome {
    Outcome::compare(expected, req.url.as_str())
}

/// Compares the escaped path, plus the query when the expectation has one
pub fn assert_request_url_path_matches(req: &mut Request, expected: &str) -> Outcome {
    let actual = match req.url.query() {
        Some(query) if expected.contains('?') => format!("{}?{}", req.url.path(), query),
        _ => req.url.path().to_string(),
    };
    Outcome::compare(expected, actual.as_str())
}

/// Query parameters compared as a set, ignoring order and encoding form
pub fn assert_request_url_query_matches(req: &mut Request, expected: &str) -> Outcome {
    let expected_query = match Url::parse(expected) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) => match expected.split_once('?') {
            Some((_, query)) => query.to_string(),
            None => expected.to_string(),
        },
    };
    let expected_pairs = query_pairs(&expected_query);
    let actual_pairs = query_pairs(req.url.query().unwrap_or_default());
    Outcome::compare(&expected_pairs, &actual_pairs)
}

fn query_pairs(query: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    pairs
}

/// Every expected header must be present with the same value
pub fn assert_request_headers_match(req: &mut Request, expected: &[(&str, &str)]) -> Outcome {
    for (name, value) in expected {
        match req.headers.get(name) {
            Some(actual) if actual == *value => {}
            Some(actual) => {
                return Outcome::mismatch(format!("{name}: {value}"), format!("{name}: {actual}"))
            }
            None => {
                return Outcome::mismatch(format!("{name}: {value}"), format!("no {name} header"))
            }
        }
    }
    Outcome::Pass
}

fn body_bytes(req: &mut Request) -> Result<Vec<u8>, Outcome> {
    req.read_body()
        .map_err(|e| Outcome::mismatch("a readable body", format!("read error: {e}")))
}

/// Raw bytes against a base64 expectation
pub fn assert_request_body_equals_bytes(req: &mut Request, expected: &str) -> Outcome {
    let expected = match STANDARD.decode(expected.trim()) {
        Ok(bytes) => bytes,
        Err(e) => return Outcome::Malformed(format!("invalid base64: {e}")),
    };
    match body_bytes(req) {
        Ok(actual) => Outcome::compare(expected.as_slice(), actual.as_slice()),
        Err(outcome) => outcome,
    }
}

/// Structural JSON equality after trimming
pub fn assert_request_body_equals_json(req: &mut Request, expected: &str) -> Outcome {
    let actual = match body_bytes(req) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(outcome) => return outcome,
    };
    let expected = expected.trim();
    if expected.is_empty() || actual.is_empty() {
        return Outcome::compare(expected, actual.as_str());
    }

    let expected_value: Value = match serde_json::from_str(expected) {
        Ok(value) => value,
        Err(e) => return Outcome::Malformed(format!("invalid JSON: {e}")),
    };
    match serde_json::from_str::<Value>(&actual) {
        Ok(actual_value) if actual_value == expected_value => Outcome::Pass,
        Ok(actual_value) => Outcome::mismatch(expected_value.to_string(), actual_value.to_string()),
        Err(_) => Outcome::mismatch(expected_value.to_string(), actual),
    }
}

/// Equality of canonicalized XML documents
pub fn assert_request_body_matches_xml(req: &mut Request, expected: &str) -> Outcome {
    let expected = match xml::canonicalize(expected) {
        Ok(canonical) => canonical,
        Err(e) => return Outcome::Malformed(e.to_string()),
    };
    let body = match body_bytes(req) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(outcome) => return outcome,
    };
    match xml::canonicalize(&body) {
        Ok(actual) => Outcome::compare(expected.as_str(), actual.as_str()),
        Err(e) => Outcome::mismatch(expected, format!("{body:?} ({e})")),
    }
}

pub fn assert_request_body_equals_string(req: &mut Request, expected: &str) -> Outcome {
    match body_bytes(req) {
        Ok(actual) => Outcome::compare(expected, &*String::from_utf8_lossy(&actual)),
        Err(outcome) => outcome,
    }
}

pub fn assert_request_id_equals(req: &mut Request, expected: &str) -> Outcome {
    Outcome::compare(expected, req.request_id.as_str())
}

/// Deep equality between the decoded output and the expected literal
pub fn assert_response_data_equals<T>(output: &OutputSlot<T>, expected: &T) -> Outcome
where
    T: PartialEq + Debug + Clone,
{
    match output.get() {
        Some(actual) => Outcome::compare(expected, &actual),
        None => Outcome::mismatch(format!("{expected:?}"), "no decoded output"),
    }
}

fn require_error(err: Option<&SendError>) -> Result<&SendError, Outcome> {
    err.ok_or_else(|| Outcome::mismatch("an error", "no error returned"))
}

pub fn assert_response_error_is_kind_of(err: Option<&SendError>, expected: &str) -> Outcome {
    match require_error(err) {
        Ok(err) => Outcome::compare(expected, err.code()),
        Err(outcome) => outcome,
    }
}

pub fn assert_response_error_message_equals(err: Option<&SendError>, expected: &str) -> Outcome {
    match require_error(err) {
        Ok(err) => Outcome::compare(expected, err.message()),
        Err(outcome) => outcome,
    }
}

/// Structural equality of the decoded error payload against a JSON document
pub fn assert_response_error_data_equals(err: Option<&SendError>, expected: &str) -> Outcome {
    let expected: Value = match serde_json::from_str(expected) {
        Ok(value) => value,
        Err(e) => return Outcome::Malformed(format!("invalid JSON: {e}")),
    };
    match require_error(err).map(SendError::data) {
        Ok(Some(actual)) if *actual == expected => Outcome::Pass,
        Ok(Some(actual)) => Outcome::mismatch(expected.to_string(), actual.to_string()),
        Ok(None) => Outcome::mismatch(expected.to_string(), "no error payload"),
        Err(outcome) => outcome,
    }
}

pub fn assert_response_error_request_id_equals(err: Option<&SendError>, expected: &str) -> Outcome {
    match require_error(err) {
        Ok(err) => Outcome::compare(&Some(expected), &err.request_id()),
        Err(outcome) => outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{respond_with, Body, Headers};

    fn request(url: &str) -> Request {
        Request::new("Op", "POST", Url::parse(url).unwrap())
    }

    fn service_error() -> SendError {
        SendError::Service {
            code: "ValidationException".to_string(),
            message: "bad input".to_string(),
            status_code: 400,
            request_id: "rid-1".to_string(),
            data: Some(serde_json::json!({"field": "Name", "reason": "missing"})),
        }
    }

    #[test]
    fn test_query_match_ignores_order() {
        let mut req = request("http://x/?b=2&a=1");
        assert!(assert_request_url_query_matches(&mut req, "http://x/?a=1&b=2").is_pass());
        assert!(!assert_request_url_query_matches(&mut req, "http://x/?a=1").is_pass());
    }

    #[test]
    fn test_query_match_ignores_encoding_form() {
        let mut req = request("http://x/?q=a%20b");
        assert!(assert_request_url_query_matches(&mut req, "?q=a+b").is_pass());
    }

    #[test]
    fn test_url_and_path() {
        let url = "https://svc.region.example/things/a%2Fb?x=1";
        let mut req = request(url);
        assert!(assert_request_url_matches(&mut req, url).is_pass());
        assert!(assert_request_url_path_matches(&mut req, "/things/a%2Fb").is_pass());
        assert!(assert_request_url_path_matches(&mut req, "/things/a%2Fb?x=1").is_pass());
        assert!(!assert_request_url_path_matches(&mut req, "/things").is_pass());
    }

    #[test]
    fn test_missing_header_does_not_match() {
        let mut req = request("http://x/");
        req.headers.insert("X-Other", "1");
        let outcome = assert_request_headers_match(&mut req, &[("X-Foo", "bar")]);
        assert!(matches!(outcome, Outcome::Mismatch { .. }));

        req.headers.insert("x-foo", "bar");
        assert!(assert_request_headers_match(&mut req, &[("X-Foo", "bar")]).is_pass());
    }

    #[test]
    fn test_body_string_is_restored() {
        let mut req = request("http://x/");
        req.body = Body::from_bytes("payload");
        let first = assert_request_body_equals_string(&mut req, "payload");
        let second = assert_request_body_equals_string(&mut req, "payload");
        assert_eq!(first, Outcome::Pass);
        assert_eq!(first, second);
    }

    #[test]
    fn test_body_bytes() {
        let mut req = request("http://x/");
        req.body = Body::from_bytes(vec![0u8, 1, 2]);
        assert!(assert_request_body_equals_bytes(&mut req, "AAEC").is_pass());
        assert!(matches!(
            assert_request_body_equals_bytes(&mut req, "not base64!"),
            Outcome::Malformed(_)
        ));
        assert!(assert_request_body_equals_string(&mut req, "\u{0}\u{1}\u{2}").is_pass());
    }

    #[test]
    fn test_body_json_is_structural() {
        let mut req = request("http://x/");
        req.body = Body::from_bytes("  {\"b\": [1, 2], \"a\": \"x\"}\n");
        assert!(assert_request_body_equals_json(&mut req, r#"{"a":"x","b":[1,2]}"#).is_pass());
        assert!(!assert_request_body_equals_json(&mut req, r#"{"a":"y","b":[1,2]}"#).is_pass());
        assert!(matches!(
            assert_request_body_equals_json(&mut req, "{nope"),
            Outcome::Malformed(_)
        ));
    }

    #[test]
    fn test_body_xml_is_canonical() {
        let mut req = request("http://x/");
        req.body = Body::from_bytes("<Req><B>2</B><A>1</A></Req>");
        assert!(assert_request_body_matches_xml(&mut req, "<Req><A>1</A><B>2</B></Req>").is_pass());
        assert!(!assert_request_body_matches_xml(&mut req, "<Req><A>1</A></Req>").is_pass());
    }

    #[test]
    fn test_method_and_request_id() {
        let mut req = request("http://x/");
        req.swap_send_hook(respond_with(
            200,
            Headers::new().with("x-amzn-requestid", "r-9"),
            Vec::new(),
        ));
        req.send().unwrap();
        assert!(assert_request_method_equals(&mut req, "POST").is_pass());
        assert!(assert_request_id_equals(&mut req, "r-9").is_pass());
    }

    #[test]
    fn test_response_data() {
        let slot = OutputSlot::new();
        assert!(!assert_response_data_equals(&slot, &5).is_pass());
        slot.fill(5);
        assert!(assert_response_data_equals(&slot, &5).is_pass());
        assert!(!assert_response_data_equals(&slot, &6).is_pass());
    }

    #[test]
    fn test_error_predicates() {
        let err = service_error();
        assert!(assert_response_error_is_kind_of(Some(&err), "ValidationException").is_pass());
        assert!(assert_response_error_message_equals(Some(&err), "bad input").is_pass());
        assert!(assert_response_error_request_id_equals(Some(&err), "rid-1").is_pass());
        assert!(assert_response_error_data_equals(
            Some(&err),
            r#"{"reason": "missing", "field": "Name"}"#
        )
        .is_pass());
        assert!(matches!(
            assert_response_error_data_equals(Some(&err), "{"),
            Outcome::Malformed(_)
        ));
        assert!(!assert_response_error_is_kind_of(None, "ValidationException").is_pass());
    }
}
