//! Logging of completed HTTP exchanges with credential redaction.
//!
//! [`log_response`] renders one multi-line record per exchange:
//!
//! ```text
//! [TRACE] .
//! [HTTP REQUEST]
//!     Request URL: https://sentry.io/api/0/organizations/acme/
//!     Request Headers:
//!       {
//!         "authorization": [
//!           "Redacted to prevent leaks"
//!         ]
//!       }
//! [HTTP RESPONSE]
//!     Response Status: 200 OK
//!     Response Headers:
//!       {}
//!     Response Data:
//!       {
//!         "slug": "acme"
//!       }
//! ```
//!
//! The layout is parsed by external tooling and must stay stable.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use http::header::AUTHORIZATION;
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::logging::{LogLevel, Logger};

/// Value logged in place of the `Authorization` header.
pub const REDACTED_PLACEHOLDER: &str = "Redacted to prevent leaks";

/// Continuation prefix aligning JSON lines under the record's data column.
const DATA_PREFIX: &str = "      ";
const JSON_INDENT: &[u8] = b"  ";

/// A completed request/response pair, as seen by the API client.
#[derive(Debug, Clone)]
pub struct HttpExchange {
    /// Request method.
    pub method: Method,
    /// Full request URL.
    pub url: String,
    /// Headers sent with the request, credentials included.
    pub request_headers: HeaderMap,
    /// Response status.
    pub status: StatusCode,
    /// Headers returned with the response.
    pub response_headers: HeaderMap,
}

impl HttpExchange {
    /// Create an exchange with empty header maps.
    pub fn new(method: Method, url: impl Into<String>, status: StatusCode) -> Self {
        Self {
            method,
            url: url.into(),
            request_headers: HeaderMap::new(),
            status,
            response_headers: HeaderMap::new(),
        }
    }

    /// Set the request headers.
    pub fn with_request_headers(mut self, headers: HeaderMap) -> Self {
        self.request_headers = headers;
        self
    }

    /// Set the response headers.
    pub fn with_response_headers(mut self, headers: HeaderMap) -> Self {
        self.response_headers = headers;
        self
    }

    /// Request headers as they may appear in logs.
    pub fn redacted_request_headers(&self) -> BTreeMap<String, Vec<String>> {
        redacted_header_view(&self.request_headers)
    }
}

/// Group header values by name, in name order, keeping per-name value order.
pub fn header_view(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut view: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        view.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    view
}

/// Like [`header_view`], with every `Authorization` value replaced by
/// [`REDACTED_PLACEHOLDER`]. The input map is left untouched.
pub fn redacted_header_view(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut view = header_view(headers);
    if let Some(values) = view.get_mut(AUTHORIZATION.as_str()) {
        *values = vec![REDACTED_PLACEHOLDER.to_string()];
    }
    view
}

/// Log `exchange` and its decoded response `data` at `level`.
///
/// Never fails: if `data` cannot be serialized, its `Debug` form is logged
/// instead. An absent body (`None`, `()`, `Value::Null`) renders as `null`.
pub fn log_response<T>(logger: &Logger, exchange: &HttpExchange, data: &T, level: LogLevel)
where
    T: Serialize + fmt::Debug + ?Sized,
{
    let record = render_record(exchange, data);
    logger.logf(level, format_args!("{}", record));
}

/// Render the record written by [`log_response`], without the level tag.
pub fn render_record<T>(exchange: &HttpExchange, data: &T) -> String
where
    T: Serialize + fmt::Debug + ?Sized,
{
    let request_headers = to_indented_json(&exchange.redacted_request_headers())
        .unwrap_or_else(|_| String::from("{}"));
    let response_headers = to_indented_json(&header_view(&exchange.response_headers))
        .unwrap_or_else(|_| String::from("{}"));
    let data = to_indented_json(data).unwrap_or_else(|_| format!("{:?}", data));

    let mut record = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        record,
        ".\n\
         [HTTP REQUEST]\n\
         {i}Request URL: {url}\n\
         {i}Request Headers:\n\
         {p}{request_headers}\n\
         [HTTP RESPONSE]\n\
         {i}Response Status: {status}\n\
         {i}Response Headers:\n\
         {p}{response_headers}\n\
         {i}Response Data:\n\
         {p}{data}",
        i = "    ",
        p = DATA_PREFIX,
        url = exchange.url,
        request_headers = request_headers,
        status = exchange.status,
        response_headers = response_headers,
        data = data,
    );
    record
}

/// Serialize `value` as pretty JSON whose continuation lines carry [`DATA_PREFIX`].
fn to_indented_json<T>(value: &T) -> serde_json::Result<String>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    value.serialize(&mut serializer)?;

    let json = String::from_utf8_lossy(&buf);
    Ok(json.replace('\n', &format!("\n{}", DATA_PREFIX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LogCapture;
    use http::HeaderValue;
    use serde::ser::Error as _;

    const DUMMY_AUTH_TOKEN: &str = "Bearer grizzliesandpolarbears";

    fn dummy_exchange() -> HttpExchange {
        let mut request_headers = HeaderMap::new();
        request_headers.insert("thing", HeaderValue::from_static("value"));
        request_headers.insert(AUTHORIZATION, HeaderValue::from_static(DUMMY_AUTH_TOKEN));

        let mut response_headers = HeaderMap::new();
        response_headers.insert("thing", HeaderValue::from_static("value"));

        HttpExchange::new(Method::GET, "https://thisissentry.com", StatusCode::OK)
            .with_request_headers(request_headers)
            .with_response_headers(response_headers)
    }

    #[derive(Debug, Serialize)]
    struct Stuff {
        stuff: String,
    }

    #[derive(Debug, Serialize)]
    struct Team {
        id: String,
        slug: String,
        name: String,
    }

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize"))
        }
    }

    fn sentry_team() -> Team {
        Team {
            id: "sentry".to_string(),
            slug: "sentry stuff".to_string(),
            name: "still sentry stuff".to_string(),
        }
    }

    #[test]
    fn test_logs_struct_body() {
        let capture = LogCapture::new();
        let data = Stuff {
            stuff: "hello".to_string(),
        };

        log_response(&capture.logger(), &dummy_exchange(), &data, LogLevel::Trace);

        assert!(capture.contents().contains(r#""stuff": "hello""#));
    }

    #[test]
    fn test_logs_nested_fields_aligned() {
        let capture = LogCapture::new();

        log_response(
            &capture.logger(),
            &dummy_exchange(),
            &sentry_team(),
            LogLevel::Trace,
        );

        let expected = "        \"id\": \"sentry\",\n        \"slug\": \"sentry stuff\",\n        \"name\": \"still sentry stuff\"";
        assert!(
            capture.contents().contains(expected),
            "log was:\n{}",
            capture.contents()
        );
    }

    #[test]
    fn test_logs_null_body() {
        let capture = LogCapture::new();
        let nothing: Option<Team> = None;

        log_response(&capture.logger(), &dummy_exchange(), &nothing, LogLevel::Trace);

        assert!(capture.contents().contains("    Response Data:\n      null"));
    }

    #[test]
    fn test_unit_body_is_null() {
        let record = render_record(&dummy_exchange(), &());
        assert!(record.ends_with("Response Data:\n      null"));
    }

    #[test]
    fn test_unserializable_body_falls_back_to_debug() {
        let capture = LogCapture::new();

        log_response(
            &capture.logger(),
            &dummy_exchange(),
            &Unserializable,
            LogLevel::Trace,
        );

        let contents = capture.contents();
        assert!(contents.contains("Response Data:\n      Unserializable"));
        assert!(contents.contains("Response Status: 200 OK"));
    }

    #[test]
    fn test_redacts_auth_non_destructively() {
        let capture = LogCapture::new();
        let exchange = dummy_exchange();
        let before = exchange.request_headers.get(AUTHORIZATION).cloned();
        let before_ptr = exchange
            .request_headers
            .get(AUTHORIZATION)
            .map(|v| v.as_bytes().as_ptr());

        log_response(&capture.logger(), &exchange, &sentry_team(), LogLevel::Trace);

        assert_eq!(exchange.request_headers.get(AUTHORIZATION).cloned(), before);
        assert_eq!(
            exchange
                .request_headers
                .get(AUTHORIZATION)
                .map(|v| v.as_bytes().as_ptr()),
            before_ptr
        );
        let contents = capture.contents();
        assert!(!contents.contains(DUMMY_AUTH_TOKEN));
        assert!(!contents.contains("grizzliesandpolarbears"));
        assert!(contents.contains(REDACTED_PLACEHOLDER));
    }

    #[test]
    fn test_redacts_every_authorization_value() {
        let mut headers = HeaderMap::new();
        headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer first-secret"));
        headers.append(AUTHORIZATION, HeaderValue::from_static("Basic second-secret"));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let view = redacted_header_view(&headers);
        assert_eq!(
            view.get("authorization"),
            Some(&vec![REDACTED_PLACEHOLDER.to_string()])
        );
        assert_eq!(
            view.get("accept"),
            Some(&vec!["application/json".to_string()])
        );
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 2);

        let exchange = HttpExchange::new(Method::DELETE, "https://sentry.io", StatusCode::NO_CONTENT)
            .with_request_headers(headers);
        let record = render_record(&exchange, &());
        assert!(!record.contains("first-secret"));
        assert!(!record.contains("second-secret"));
    }

    #[test]
    fn test_header_view_keeps_value_order() {
        let mut headers = HeaderMap::new();
        headers.append("link", HeaderValue::from_static("<a>; rel=\"previous\""));
        headers.append("link", HeaderValue::from_static("<b>; rel=\"next\""));

        let view = header_view(&headers);
        assert_eq!(
            view["link"],
            vec![
                "<a>; rel=\"previous\"".to_string(),
                "<b>; rel=\"next\"".to_string()
            ]
        );
    }

    #[test]
    fn test_record_layout() {
        let exchange = HttpExchange::new(
            Method::GET,
            "https://sentry.io/api/0/organizations/acme/",
            StatusCode::NOT_FOUND,
        );

        let record = render_record(&exchange, &serde_json::json!({"detail": "Not found"}));

        assert_eq!(
            record,
            ".\n\
             [HTTP REQUEST]\n    \
             Request URL: https://sentry.io/api/0/organizations/acme/\n    \
             Request Headers:\n      \
             {}\n\
             [HTTP RESPONSE]\n    \
             Response Status: 404 Not Found\n    \
             Response Headers:\n      \
             {}\n    \
             Response Data:\n      \
             {\n        \
             \"detail\": \"Not found\"\n      \
             }"
        );
    }

    #[test]
    fn test_record_is_tagged_with_level() {
        let capture = LogCapture::new();
        log_response(&capture.logger(), &dummy_exchange(), &(), LogLevel::Debug);
        assert!(capture.contents().starts_with("[DEBUG] .\n[HTTP REQUEST]\n"));
    }
}
