//! In-process client over a [`Pipeline`].

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use gatehouse_middleware::Pipeline;
use http::Method;
use std::sync::Arc;

/// Drives requests through a full [`Pipeline`] without binding a port.
///
/// Every request goes through recording, error normalization, the shutdown
/// gate, authentication, routing and authorization exactly as it would
/// behind the server.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use gatehouse_core::Role;
/// use gatehouse_middleware::{Pipeline, RouteTable};
/// use gatehouse_test::{TestClient, TokenFactory};
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let tokens = TokenFactory::new(&[7u8; 32]).unwrap();
/// let pipeline = Pipeline::builder(tokens.verifier())
///     .routes(RouteTable::new())
///     .build();
///
/// let client = TestClient::new(pipeline)
///     .with_bearer_token(tokens.access(Role::Admin).unwrap());
///
/// client
///     .get("/nowhere")
///     .send()
///     .await
///     .assert_status(StatusCode::NOT_FOUND);
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    pipeline: Arc<Pipeline>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client owning `pipeline`.
    pub fn new(pipeline: Pipeline) -> Self {
        Self::from_shared(Arc::new(pipeline))
    }

    /// Creates a client over a pipeline shared with other owners, such as a
    /// server under test.
    pub fn from_shared(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sends `token` as the bearer credential on every request.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.with_default_header(http::header::AUTHORIZATION.as_str(), value)
    }

    /// Returns the pipeline requests are sent through.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.pipeline.process(request.into_request()).await;
        TestResponse::from_response(response).await
    }
}

/// A request builder bound to a [`TestClient`].
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Sets a header, overriding any default of the same name.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the bearer credential for this request only.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read. Use
    /// [`TestClientRequest::try_send`] to handle those cases.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request and returns a `Result`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the body cannot
    /// be read.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send_internal(request).await
    }
}
