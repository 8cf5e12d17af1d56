//! Turns an `Endpoint` into an `HttpRequest`.
//!
//! # Design
//! `RequestBuilder` holds only the default headers and carries no state
//! between calls. Building is pure: the same endpoint always yields the same
//! request, and nothing here touches the network.
//!
//! The endpoint path is appended to the base URL segment by segment, so a
//! trailing slash on the base and a leading slash on the path collapse into a
//! single separator and neither side is truncated. Query items are appended
//! after any query the base URL already carries.

use serde_json::{Map, Value};
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::BuildError;
use crate::http::{Headers, HttpRequest};
use crate::params::{Parameters, RequestParameters};

/// Stateless builder for wire requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    default_headers: Headers,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(Headers::json())
    }
}

impl RequestBuilder {
    pub fn new(default_headers: Headers) -> Self {
        Self { default_headers }
    }

    pub fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    pub fn build<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<HttpRequest, BuildError> {
        let base = endpoint.base_url();
        let mut url = Url::parse(&base)?;
        append_path(&mut url, &endpoint.path())?;

        let mut body = None;
        match endpoint.parameters() {
            Some(RequestParameters::Query(params)) => append_query(&mut url, &params),
            Some(RequestParameters::Body(params)) => body = Some(encode_body(&params)?),
            Some(RequestParameters::Data(data)) => body = Some(data),
            Some(RequestParameters::None) | None => {}
        }

        Ok(HttpRequest {
            method: endpoint.method(),
            url,
            headers: self.default_headers.merging(&endpoint.headers()),
            body,
        })
    }
}

fn append_path(url: &mut Url, path: &str) -> Result<(), BuildError> {
    if path.is_empty() {
        return Ok(());
    }
    let base = url.to_string();
    let mut segments = url
        .path_segments_mut()
        .map_err(|()| BuildError::CannotBeABase(base))?;
    segments
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    if path.ends_with('/') {
        segments.push("");
    }
    Ok(())
}

fn append_query(url: &mut Url, params: &Parameters) {
    let mut present = params.present().peekable();
    if present.peek().is_none() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in present {
        pairs.append_pair(key, &value.to_string());
    }
}

/// Serialize every entry into one JSON object. Absent values become `null`.
fn encode_body(params: &Parameters) -> Result<Vec<u8>, BuildError> {
    let mut object = Map::with_capacity(params.len());
    for (key, value) in params.iter() {
        let json = match value {
            Some(value) => value.to_json().map_err(|reason| BuildError::InvalidBody {
                key: key.to_string(),
                reason,
            })?,
            None => Value::Null,
        };
        object.insert(key.to_string(), json);
    }
    serde_json::to_vec(&Value::Object(object)).map_err(|e| BuildError::InvalidBody {
        key: String::new(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::collections::HashSet;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::http::{header, HttpMethod};

    struct Call {
        base: &'static str,
        path: &'static str,
        method: HttpMethod,
        headers: Headers,
        parameters: Option<RequestParameters>,
    }

    impl Call {
        fn get(base: &'static str, path: &'static str) -> Self {
            Self {
                base,
                path,
                method: HttpMethod::Get,
                headers: Headers::new(),
                parameters: None,
            }
        }

        fn params(mut self, parameters: RequestParameters) -> Self {
            self.parameters = Some(parameters);
            self
        }
    }

    impl Endpoint for Call {
        fn base_url(&self) -> Cow<'_, str> {
            Cow::Borrowed(self.base)
        }

        fn path(&self) -> Cow<'_, str> {
            Cow::Borrowed(self.path)
        }

        fn method(&self) -> HttpMethod {
            self.method
        }

        fn headers(&self) -> Headers {
            self.headers.clone()
        }

        fn parameters(&self) -> Option<RequestParameters> {
            self.parameters.clone()
        }
    }

    fn query_set(request: &HttpRequest) -> HashSet<(String, String)> {
        request.url.query_pairs().into_owned().collect()
    }

    #[test]
    fn episode_request_without_parameters() {
        let request = Call::get("https://api.example.com/api", "/episode")
            .request()
            .unwrap();
        assert_eq!(request.url.as_str(), "https://api.example.com/api/episode");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.headers, Headers::json());
        assert!(request.body.is_none());
    }

    #[test]
    fn slashes_collapse_between_base_and_path() {
        let cases = [
            ("https://api.example.com/api/", "/episode", "https://api.example.com/api/episode"),
            ("https://api.example.com/api", "episode", "https://api.example.com/api/episode"),
            ("https://api.example.com", "/episode", "https://api.example.com/episode"),
            ("https://api.example.com/api", "episode/1/", "https://api.example.com/api/episode/1/"),
            ("https://api.example.com/api", "", "https://api.example.com/api"),
        ];
        for (base, path, expected) in cases {
            let request = Call::get(base, path).request().unwrap();
            assert_eq!(request.url.as_str(), expected, "{base} + {path}");
        }
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let request = Call::get("https://api.example.com", "/search/rick sanchez")
            .request()
            .unwrap();
        assert_eq!(request.url.path(), "/search/rick%20sanchez");
    }

    #[test]
    fn empty_query_adds_nothing() {
        let request = Call::get("https://api.example.com/api", "/episode")
            .params(RequestParameters::Query(Parameters::new()))
            .request()
            .unwrap();
        assert_eq!(request.url.query(), None);

        let request = Call::get("https://api.example.com/api?key=abc", "/episode")
            .params(RequestParameters::None)
            .request()
            .unwrap();
        assert_eq!(request.url.query(), Some("key=abc"));
    }

    #[test]
    fn absent_query_values_are_dropped() {
        let params = Parameters::new()
            .with_optional("name", None::<&str>)
            .with_optional("status", None::<&str>);
        let request = Call::get("https://api.example.com/api", "/character")
            .params(RequestParameters::Query(params))
            .request()
            .unwrap();
        assert_eq!(request.url.query(), None);
    }

    #[test]
    fn query_values_render_per_variant() {
        let params = Parameters::new()
            .with("page", 2)
            .with("count", 10u64)
            .with("alive", true)
            .with("name", "Rick Sanchez")
            .with("aired", NaiveDate::from_ymd_opt(2013, 12, 2).unwrap())
            .with("ids", vec![1, 2, 3])
            .with_optional("species", None::<String>);
        let request = Call::get("https://api.example.com/api", "/character")
            .params(RequestParameters::Query(params))
            .request()
            .unwrap();

        let expected: HashSet<(String, String)> = [
            ("page", "2"),
            ("count", "10"),
            ("alive", "true"),
            ("name", "Rick Sanchez"),
            ("aired", "2013-12-02"),
            ("ids", "1,2,3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(query_set(&request), expected);
        assert!(request.body.is_none());
    }

    #[test]
    fn query_is_appended_after_base_query() {
        let request = Call::get("https://api.example.com/api?key=abc", "/episode")
            .params(RequestParameters::Query(Parameters::new().with("page", 1)))
            .request()
            .unwrap();
        assert_eq!(request.url.query(), Some("key=abc&page=1"));
    }

    #[test]
    fn body_parameters_become_json_object() {
        let params = Parameters::new()
            .with("name", "Pilot")
            .with("season", 1)
            .with("tags", vec!["intro", "portal"])
            .with_optional("rating", None::<f64>);
        let mut call = Call::get("https://api.example.com/api", "/episode")
            .params(RequestParameters::Body(params));
        call.method = HttpMethod::Post;

        let request = call.request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url.query(), None);
        let body: serde_json::Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"name": "Pilot", "season": 1, "tags": ["intro", "portal"], "rating": null})
        );
    }

    #[test]
    fn unserializable_body_fails_whole_request() {
        let params = Parameters::new().with("name", "Pilot").with("ratio", f64::NAN);
        let error = Call::get("https://api.example.com/api", "/episode")
            .params(RequestParameters::Body(params))
            .request()
            .unwrap_err();
        match error {
            BuildError::InvalidBody { key, .. } => assert_eq!(key, "ratio"),
            other => panic!("expected InvalidBody, got {other:?}"),
        }
    }

    #[test]
    fn raw_data_is_sent_verbatim() {
        let bytes = vec![0u8, 159, 146, 150];
        let request = Call::get("https://api.example.com/api", "/upload")
            .params(RequestParameters::Data(bytes.clone()))
            .request()
            .unwrap();
        assert_eq!(request.body, Some(bytes));
        assert_eq!(request.url.query(), None);
    }

    #[test]
    fn endpoint_headers_override_defaults() {
        let mut call = Call::get("https://api.example.com/api", "/episode");
        call.headers = Headers::new()
            .with(header::ACCEPT, "text/csv")
            .with(header::AUTHORIZATION, "Bearer token");

        let request = call.request().unwrap();
        assert_eq!(request.headers.len(), 3);
        assert_eq!(request.headers.get(header::ACCEPT), Some("text/csv"));
        assert_eq!(request.headers.get(header::CONTENT_TYPE), Some("application/json"));
        assert_eq!(request.headers.get(header::AUTHORIZATION), Some("Bearer token"));
    }

    #[test]
    fn lowercase_endpoint_header_overrides_default() {
        let mut call = Call::get("https://api.example.com/api", "/episode");
        call.headers = Headers::new().with("content-type", "text/plain");

        let request = call.request().unwrap();
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers.get(header::CONTENT_TYPE), Some("text/plain"));
        assert_eq!(request.headers.get(header::ACCEPT), Some("application/json"));
    }

    #[test]
    fn configured_defaults_replace_json_defaults() {
        let builder = RequestBuilder::new(Headers::new().with(header::USER_AGENT, "netkit-test"));
        let request = builder
            .build(&Call::get("https://api.example.com/api", "/episode"))
            .unwrap();
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers.get(header::USER_AGENT), Some("netkit-test"));
    }

    #[test]
    fn unparsable_base_url_fails() {
        let error = Call::get("not a url", "/episode").request().unwrap_err();
        assert!(matches!(error, BuildError::InvalidBaseUrl(_)));

        let error = Call::get("/relative/only", "/episode").request().unwrap_err();
        assert!(matches!(error, BuildError::InvalidBaseUrl(_)));
    }

    #[test]
    fn base_without_hierarchy_fails() {
        let error = Call::get("mailto:rick@citadel.example", "/inbox")
            .request()
            .unwrap_err();
        assert!(matches!(error, BuildError::CannotBeABase(_)));
    }

    #[test]
    fn every_method_is_carried_through() {
        for method in [
            HttpMethod::Get,
            HttpMethod::Head,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Connect,
            HttpMethod::Options,
            HttpMethod::Trace,
            HttpMethod::Patch,
        ] {
            let mut call = Call::get("https://api.example.com", "/x");
            call.method = method;
            assert_eq!(call.request().unwrap().method, method);
        }
    }
}
