//! Request handle, synthetic responses and the substitutable send hook

use crate::error::SendError;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use url::Url;

/// Response headers carrying the request id, in lookup order
pub const REQUEST_ID_HEADERS: [&str; 2] = ["x-amzn-requestid", "x-amz-request-id"];

/// Header naming the service error type
pub const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Ordered header collection with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Empty header collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Builder form of [`Headers::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// First value for a header name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single-read body stream
pub struct Body {
    reader: Box<dyn Read + Send>,
}

impl Body {
    /// A body with no content
    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// A body over owned bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_reader(Cursor::new(bytes.into()))
    }

    /// A body over an arbitrary reader
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Drain the stream, leaving the body empty
    pub fn take_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Drain the stream and put the same content back
    pub fn read_restoring(&mut self) -> std::io::Result<Vec<u8>> {
        let bytes = self.take_bytes()?;
        *self = Body::from_bytes(bytes.clone());
        Ok(bytes)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body { .. }")
    }
}

/// HTTP response produced by a send hook
#[derive(Debug, Default)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Headers,
    pub body: Body,
}

impl HttpResponse {
    /// A response with the given status and no headers or body
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: Headers::new(),
            body: Body::empty(),
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::from_bytes(body);
        self
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Produces the response for a request in place of real transport
pub type SendHook = Box<dyn FnMut(&Request) -> Result<HttpResponse, SendError> + Send>;

/// Decodes a successful response into the operation output
pub type UnmarshalHandler = Box<dyn FnMut(&mut HttpResponse) -> Result<(), SendError> + Send>;

/// Send hook that always answers with the given response parts
pub fn respond_with(status_code: u16, headers: Headers, body: Vec<u8>) -> SendHook {
    Box::new(move |_req: &Request| {
        Ok(HttpResponse::new(status_code)
            .with_headers(headers.clone())
            .with_body(body.clone()))
    })
}

/// Shared slot the client fills with the decoded output at send time
#[derive(Debug)]
pub struct OutputSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> OutputSlot<T> {
    /// An unfilled slot
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Store the decoded output
    pub fn fill(&self, value: T) {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(value);
    }

    /// Whether the slot has been filled
    pub fn is_filled(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }
}

impl<T: Clone> OutputSlot<T> {
    /// Copy of the decoded output, if any
    pub fn get(&self) -> Option<T> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl<T> Clone for OutputSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for OutputSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable handle over one operation invocation
pub struct Request {
    pub operation: String,
    pub method: String,
    pub url: Url,
    pub headers: Headers,
    pub body: Body,
    /// Assigned from the response at send time
    pub request_id: String,
    /// Error recorded while building or sending
    pub error: Option<SendError>,
    pub response: Option<HttpResponse>,
    send_hook: SendHook,
    unmarshal: Option<UnmarshalHandler>,
}

impl Request {
    /// A request with no transport; install a send hook before sending
    pub fn new(operation: impl Into<String>, method: impl Into<String>, url: Url) -> Self {
        Self {
            operation: operation.into(),
            method: method.into(),
            url,
            headers: Headers::new(),
            body: Body::empty(),
            request_id: String::new(),
            error: None,
            response: None,
            send_hook: Box::new(no_transport),
            unmarshal: None,
        }
    }

    /// Replace the send hook, returning the previous one
    pub fn swap_send_hook(&mut self, hook: SendHook) -> SendHook {
        std::mem::replace(&mut self.send_hook, hook)
    }

    /// Install the handler that decodes successful responses
    pub fn on_unmarshal(&mut self, handler: UnmarshalHandler) {
        self.unmarshal = Some(handler);
    }

    /// Bind a decoder and return the slot it fills
    pub fn bind_output<T, F>(&mut self, decode: F) -> OutputSlot<T>
    where
        T: Send + 'static,
        F: Fn(&[u8]) -> Result<T, SendError> + Send + 'static,
    {
        let slot = OutputSlot::new();
        let target = slot.clone();
        self.on_unmarshal(Box::new(move |response: &mut HttpResponse| {
            let bytes = response
                .body
                .read_restoring()
                .map_err(|e| SendError::Deserialize(e.to_string()))?;
            target.fill(decode(&bytes)?);
            Ok(())
        }));
        slot
    }

    /// Body bytes, with the stream restored afterwards
    pub fn read_body(&mut self) -> std::io::Result<Vec<u8>> {
        self.body.read_restoring()
    }

    /// Run the send hook and process its response
    pub fn send(&mut self) -> Result<(), SendError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let mut hook = std::mem::replace(&mut self.send_hook, Box::new(no_transport));
        let sent = hook(&*self);
        self.send_hook = hook;

        let result = sent.and_then(|response| self.receive(response));
        if let Err(err) = &result {
            tracing::debug!("{} send failed: {}", self.operation, err);
            self.error = Some(err.clone());
        }
        result
    }

    fn receive(&mut self, mut response: HttpResponse) -> Result<(), SendError> {
        self.request_id = REQUEST_ID_HEADERS
            .iter()
            .find_map(|name| response.headers.get(name))
            .unwrap_or_default()
            .to_string();

        let outcome = if response.is_success() {
            match self.unmarshal.as_mut() {
                Some(unmarshal) => unmarshal(&mut response),
                None => Ok(()),
            }
        } else {
            Err(service_error(&mut response, &self.request_id))
        };

        self.response = Some(response);
        outcome
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("operation", &self.operation)
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("request_id", &self.request_id)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

fn no_transport(req: &Request) -> Result<HttpResponse, SendError> {
    Err(SendError::Transport(format!(
        "no send hook installed for {}",
        req.operation
    )))
}

/// Decode a non-success response into a service error
fn service_error(response: &mut HttpResponse, request_id: &str) -> SendError {
    let bytes = response.body.read_restoring().unwrap_or_default();
    let data: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();
    let field = |names: &[&str]| -> Option<String> {
        let object = data.as_ref()?.as_object()?;
        names
            .iter()
            .find_map(|n| object.get(*n).and_then(|v| v.as_str()))
            .map(str::to_string)
    };

    let code = response
        .headers
        .get(ERROR_TYPE_HEADER)
        .map(str::to_string)
        .or_else(|| field(&["__type", "code", "Code"]))
        .map(|raw| normalize_error_code(&raw))
        .unwrap_or_else(|| "UnknownError".to_string());
    let message = field(&["message", "Message"])
        .unwrap_or_else(|| format!("status code {}", response.status_code));

    SendError::Service {
        code,
        message,
        status_code: response.status_code,
        request_id: request_id.to_string(),
        data,
    }
}

/// Strip the namespace prefix and the trailing `:uri` part of an error type
fn normalize_error_code(raw: &str) -> String {
    let code = raw.split(':').next().unwrap_or(raw);
    code.rsplit('#').next().unwrap_or(code).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new(
            "EmptyOperation",
            "GET",
            Url::parse("https://svc.region.example/").unwrap(),
        )
    }

    #[test]
    fn test_send_without_hook_fails() {
        let mut req = request();
        let err = req.send().unwrap_err();
        assert!(matches!(err, SendError::Transport(_)));
        assert_eq!(req.error, Some(err));
    }

    #[test]
    fn test_send_assigns_request_id() {
        let mut req = request();
        req.swap_send_hook(respond_with(
            200,
            Headers::new().with("X-Amzn-RequestId", "abc-123"),
            Vec::new(),
        ));
        req.send().unwrap();
        assert_eq!(req.request_id, "abc-123");
        assert_eq!(req.response.as_ref().unwrap().status_code, 200);
    }

    #[test]
    fn test_service_error_from_json_body() {
        let mut req = request();
        req.swap_send_hook(respond_with(
            400,
            Headers::new().with("x-amz-request-id", "rid"),
            br#"{"__type": "com.example#ValidationException", "message": "bad input"}"#.to_vec(),
        ));
        let err = req.send().unwrap_err();
        assert_eq!(err.code(), "ValidationException");
        assert_eq!(err.message(), "bad input");
        assert_eq!(err.request_id(), Some("rid"));
        assert!(err.data().is_some());
    }

    #[test]
    fn test_error_type_header_wins() {
        let mut req = request();
        req.swap_send_hook(respond_with(
            404,
            Headers::new().with(ERROR_TYPE_HEADER, "ResourceNotFoundException:http://internal"),
            Vec::new(),
        ));
        let err = req.send().unwrap_err();
        assert_eq!(err.code(), "ResourceNotFoundException");
        assert_eq!(err.message(), "status code 404");
    }

    #[test]
    fn test_bound_output_is_filled() {
        let mut req = request();
        let slot = req.bind_output(|bytes: &[u8]| Ok(String::from_utf8_lossy(bytes).into_owned()));
        req.swap_send_hook(respond_with(200, Headers::new(), b"payload".to_vec()));
        req.send().unwrap();
        assert_eq!(slot.get().as_deref(), Some("payload"));
    }

    #[test]
    fn test_body_read_restoring() {
        let mut body = Body::from_bytes("hello");
        assert_eq!(body.read_restoring().unwrap(), b"hello");
        assert_eq!(body.read_restoring().unwrap(), b"hello");
        assert_eq!(body.take_bytes().unwrap(), b"hello");
        assert!(body.take_bytes().unwrap().is_empty());
    }

    #[test]
    fn test_headers_case_insensitive() {
        let headers = Headers::new().with("Content-Type", "application/json");
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("accept"), None);
    }
}
