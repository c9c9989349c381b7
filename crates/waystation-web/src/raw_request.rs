//! Parsed view of an inbound request that extractors read from

use http::{header, HeaderMap, HeaderValue, Method, Uri};
use serde_json::{Map, Value};
use url::form_urlencoded;
use waystation_core::{Error, Input, RemoteAddr, Result};

/// Inbound request with its query string and body decoded into maps.
#[derive(Debug, Clone)]
pub struct RawRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Input,
    body: Input,
    remote_addr: Option<RemoteAddr>,
}

impl RawRequest {
    /// Decode request parts and the collected body bytes.
    ///
    /// Form-encoded bodies are parsed as such; anything else non-empty must be
    /// a JSON object. Bracketed form and query keys (`user[name]`, `tags[]`)
    /// nest the way a JSON body would.
    pub fn from_parts(parts: &http::request::Parts, body: &[u8]) -> Result<Self> {
        let query = parse_query(&parts.uri);
        let body = parse_body(&parts.headers, body)?;

        Ok(Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            query,
            body,
            remote_addr: parts.extensions.get::<RemoteAddr>().copied(),
        })
    }

    /// Request with the given method and URI, no headers and an empty body
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = parse_query(&uri);
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            query,
            body: Input::new(),
            remote_addr: None,
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace the decoded body
    #[must_use]
    pub fn with_body(mut self, body: Input) -> Self {
        self.body = body;
        self
    }

    /// Set the peer address
    #[must_use]
    pub fn with_remote_addr(mut self, remote_addr: RemoteAddr) -> Self {
        self.remote_addr = Some(remote_addr);
        self
    }

    /// Request method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// All headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded query string
    pub fn query(&self) -> &Input {
        &self.query
    }

    /// Decoded body
    pub fn body(&self) -> &Input {
        &self.body
    }

    /// Peer address, if the server recorded it
    pub fn remote_addr(&self) -> Option<&RemoteAddr> {
        self.remote_addr.as_ref()
    }

    /// Header value as text.
    ///
    /// Matching ignores case and treats `-` and `_` as the same character, so
    /// `content_type` finds `Content-Type`.
    pub fn header(&self, name: &str) -> Option<&str> {
        let wanted = normalize_header_name(name);
        self.headers
            .iter()
            .find(|(key, _)| normalize_header_name(key.as_str()) == wanted)
            .and_then(|(_, value)| value.to_str().ok())
    }
}

fn normalize_header_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
        .collect()
}

fn parse_query(uri: &Uri) -> Input {
    uri.query()
        .map(|query| parse_form(query.as_bytes()))
        .unwrap_or_default()
}

/// Decode `application/x-www-form-urlencoded` pairs.
///
/// Bracketed keys nest: `user[name]=Ann` becomes `{"user": {"name": "Ann"}}`
/// and `tags[]=a&tags[]=b` becomes `{"tags": ["a", "b"]}`. Keys that do not
/// follow that shape are kept verbatim. Repeated plain keys keep the last value.
fn parse_form(bytes: &[u8]) -> Input {
    let mut input = Map::new();
    for (key, value) in form_urlencoded::parse(bytes) {
        let value = Value::String(value.into_owned());
        match key_path(&key) {
            Some(path) => assign(&mut input, &path, value),
            None => {
                input.insert(key.into_owned(), value);
            }
        }
    }
    input
}

/// Split `a[b][]` into `["a", "b", ""]`; `None` for plain or malformed keys.
fn key_path(key: &str) -> Option<Vec<&str>> {
    let open = key.find('[')?;
    let (base, mut rest) = key.split_at(open);
    if base.is_empty() {
        return None;
    }

    let mut path = vec![base];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        path.push(&inner[..close]);
        rest = &inner[close + 1..];
    }

    // `[]` is only understood as the last segment
    let appends_inside = path[..path.len() - 1].iter().any(|segment| segment.is_empty());
    (!appends_inside).then_some(path)
}

fn assign(target: &mut Map<String, Value>, path: &[&str], value: Value) {
    let [head, rest @ ..] = path else {
        return;
    };

    match rest {
        [] => {
            target.insert((*head).to_owned(), value);
        }
        [""] => {
            let slot = target
                .entry((*head).to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![value]),
            }
        }
        _ => {
            let slot = target
                .entry((*head).to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(nested) = slot {
                assign(nested, rest, value);
            }
        }
    }
}

fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<Input> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Input::new());
    }

    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        return Ok(parse_form(body));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::InvalidRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(err) => Err(Error::InvalidRequest(format!(
            "Request body is not valid JSON: {err}"
        ))),
    }
}
