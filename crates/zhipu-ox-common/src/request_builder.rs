use std::{collections::HashMap, time::Duration};

use crate::{
    error::{self, CommonRequestError},
    streaming::SseParser,
};
use async_stream::try_stream;
use futures_util::stream::{self, BoxStream};
use reqwest::{Method, RequestBuilder as ReqwestRequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// HTTP method for API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

/// Represents an API endpoint with its per-call configuration
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    /// Upper bound on the whole call, enforced by the transport
    pub timeout: Option<Duration>,
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            timeout: None,
            extra_headers: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = self.extra_headers.unwrap_or_default();
        headers.insert(key.into(), value.into());
        self.extra_headers = Some(headers);
        self
    }
}

/// Configuration shared by every request a client makes
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub default_headers: HashMap<String, String>,
    pub user_agent: Option<String>,
}

impl RequestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            default_headers: HashMap::new(),
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Options that control how streaming requests are constructed and decoded.
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Whether to set `"stream": true` in the JSON body before sending the request.
    pub set_stream_field: bool,
    /// Abort after this many consecutive malformed frames. `None` skips them forever.
    pub malformed_limit: Option<usize>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            set_stream_field: true,
            malformed_limit: None,
        }
    }
}

/// Generic request builder that handles auth, headers, timeouts and error mapping
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    client: reqwest::Client,
    config: RequestConfig,
}

impl RequestBuilder {
    pub fn new(client: reqwest::Client, config: RequestConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Build a reqwest RequestBuilder for the given endpoint.
    ///
    /// Fails with [`CommonRequestError::AuthenticationMissing`] before anything
    /// is sent when no bearer token is configured.
    pub fn build_request(
        &self,
        endpoint: &Endpoint,
    ) -> Result<ReqwestRequestBuilder, CommonRequestError> {
        let token = match self.config.bearer_token.as_deref() {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(CommonRequestError::AuthenticationMissing),
        };

        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.path.trim_start_matches('/')
        );

        let mut req = self
            .client
            .request(endpoint.method.into(), &url)
            .bearer_auth(token);

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if let Some(ref headers) = endpoint.extra_headers {
            for (key, value) in headers {
                req = req.header(key, value);
            }
        }

        if let Some(ref user_agent) = self.config.user_agent {
            req = req.header("user-agent", user_agent);
        }

        if endpoint.method == HttpMethod::Post {
            req = req.header("content-type", "application/json");
        }

        if let Some(timeout) = endpoint.timeout {
            req = req.timeout(timeout);
        }

        Ok(req)
    }

    /// Execute a request with an optional JSON body and return the deserialized response
    pub async fn request_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<T, CommonRequestError> {
        let mut req = self.build_request(endpoint)?;

        if let Some(body) = body {
            let payload = serde_json::to_value(body)?;
            log::debug!("{:?} {} payload: {}", endpoint.method, endpoint.path, payload);
            req = req.json(&payload);
        }

        let res = req.send().await?;
        self.handle_response(res).await
    }

    /// Execute a request without body and return the deserialized response
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<T, CommonRequestError> {
        self.request_json(endpoint, None::<&()>).await
    }

    /// Execute a streaming request
    pub fn stream<T, B>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
        options: StreamOptions,
    ) -> BoxStream<'static, Result<T, CommonRequestError>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize,
    {
        let body_value = match body.map(serde_json::to_value).transpose() {
            Ok(value) => value,
            Err(e) => return Box::pin(stream::once(async move { Err(e.into()) })),
        };

        self.stream_with_options(endpoint, body_value, options)
    }

    /// Execute a streaming request with an already-serialized body.
    pub fn stream_with_options<T>(
        &self,
        endpoint: &Endpoint,
        body: Option<Value>,
        options: StreamOptions,
    ) -> BoxStream<'static, Result<T, CommonRequestError>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let built = self.build_request(endpoint);
        let path = endpoint.path.clone();

        Box::pin(try_stream! {
            let mut req = built?;

            if let Some(payload) = stream_body(body, options)? {
                log::debug!("STREAM {} payload: {}", path, payload);
                req = req.json(&payload);
            }

            let response = check_stream_response(req.send().await?).await?;

            let mut parser = SseParser::new(response);
            if let Some(limit) = options.malformed_limit {
                parser = parser.with_malformed_limit(limit);
            }

            while let Some(event) = parser.next_event::<T>().await? {
                yield event;
            }
        })
    }

    /// Handle response and parse errors
    async fn handle_response<T: DeserializeOwned>(
        &self,
        res: Response,
    ) -> Result<T, CommonRequestError> {
        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            return Err(error::parse_error_response(status, &bytes));
        }

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            CommonRequestError::UnexpectedResponse(format!(
                "HTTP {} but failed to decode JSON: {}; body: {}",
                status.as_u16(),
                e,
                String::from_utf8_lossy(&bytes)
            ))
        })
    }
}

fn stream_body(
    body: Option<Value>,
    options: StreamOptions,
) -> Result<Option<Value>, CommonRequestError> {
    match body {
        None => Ok(None),
        Some(Value::Object(mut obj)) => {
            if options.set_stream_field {
                obj.insert("stream".to_string(), Value::Bool(true));
            }
            Ok(Some(Value::Object(obj)))
        }
        Some(other) => Err(CommonRequestError::UnexpectedResponse(format!(
            "Streaming body must be a JSON object, got {other}"
        ))),
    }
}

/// Only a 2xx event-stream response enters the decoder.
async fn check_stream_response(response: Response) -> Result<Response, CommonRequestError> {
    let status = response.status();

    if !status.is_success() {
        let bytes = response.bytes().await?;
        return Err(error::parse_error_response(status, &bytes));
    }

    if is_json_content(&response) {
        // The provider reports some failures in-band with a 2xx status.
        let bytes = response.bytes().await?;
        return Err(CommonRequestError::UnexpectedResponse(format!(
            "expected an event stream, got JSON: {}",
            String::from_utf8_lossy(&bytes)
        )));
    }

    Ok(response)
}

fn is_json_content(response: &Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}
