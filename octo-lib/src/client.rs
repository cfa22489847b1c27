//! Batches of JSON `POST` requests.
//!
//! [`HttpClient`] is the [`Executor`] used when the engine is driven from job
//! descriptions rather than a custom function. Every [`Job`] is sent as a
//! `POST` with its payload as JSON body, and answered with the status and the
//! text body of the response.
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use typed_builder::TypedBuilder;

use crate::{Engine, EngineConfig, ErrorKind, Executor, Job, JobResponse, Outcome, Result};

/// Default user agent, `octo/<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("octo/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HttpClient`].
///
/// ```
/// use std::time::Duration;
/// use octo_lib::ClientBuilder;
///
/// let client = ClientBuilder::builder()
///     .timeout(Duration::from_secs(30))
///     .connections(10_usize)
///     .build()
///     .client()
///     .unwrap();
/// ```
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
pub struct ClientBuilder {
    /// Timeout of a single attempt. Unset means the engine's `max_time` is
    /// the only bound.
    timeout: Option<Duration>,

    /// User agent sent with every request
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,

    /// Idle connections kept open per host. Should match the engine's
    /// `connections` so that every request in flight can reuse one.
    #[builder(default = crate::DEFAULT_CONNECTIONS)]
    connections: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiates an [`HttpClient`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the user agent is not a valid header value, or if
    /// the underlying `reqwest` client cannot be created.
    pub fn client(self) -> Result<HttpClient> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|_| ErrorKind::InvalidHeader(header::USER_AGENT.to_string()))?,
        );

        let builder = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .pool_max_idle_per_host(self.connections);

        let reqwest_client = (match self.timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        })
        .build()
        .map_err(ErrorKind::BuildClient)?;

        Ok(HttpClient { reqwest_client })
    }
}

/// Sends [`Job`]s.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    reqwest_client: reqwest::Client,
}

impl HttpClient {
    /// Send a single job, without any retry.
    ///
    /// # Errors
    ///
    /// Fails if the job has an invalid header, if the request could not be
    /// sent or its body not read, or if the server answered with a status
    /// outside of the 2xx range.
    pub async fn send(&self, job: &Job) -> Result<JobResponse> {
        let body = serde_json::to_vec(&job.payload)?;
        let mut request = self
            .reqwest_client
            .post(job.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(headers) = &job.headers {
            request = request.headers(header_map(headers)?);
        }

        let response = request.send().await.map_err(ErrorKind::NetworkRequest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ErrorKind::RejectedStatusCode(status));
        }
        let body = response.text().await.map_err(ErrorKind::NetworkRequest)?;

        Ok(JobResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Executor<Job> for HttpClient {
    type Output = JobResponse;

    async fn execute(&self, job: &Job) -> Result<JobResponse> {
        self.send(job).await
    }
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || ErrorKind::InvalidHeader(name.clone());
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Send every job of `jobs` with the default [`HttpClient`].
///
/// The client keeps as many idle connections per host as `config` allows
/// requests in flight.
///
/// # Errors
///
/// Fails if `config` is invalid or the client cannot be built. Failures of
/// single jobs are reported in their slot of the output.
pub async fn post_all(jobs: Vec<Job>, config: EngineConfig) -> Result<Vec<Outcome<JobResponse>>> {
    let connections = config.connections;
    let engine = Engine::new(config)?;
    let client = ClientBuilder::builder()
        .connections(connections)
        .build()
        .client()?;
    engine.execute(jobs, client).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ClientBuilder, DEFAULT_USER_AGENT, post_all};
    use crate::{
        EngineConfig, ErrorKind, Executor, FailureReason, Job, JobResponse, Outcome,
    };
    use test_utils::mock_server;

    fn job(server: &MockServer, route: &str, payload: serde_json::Value) -> Job {
        Job::new(format!("{}{route}", server.uri()).parse().unwrap(), payload)
    }

    fn config(retries: u32) -> EngineConfig {
        EngineConfig::builder()
            .retries(retries)
            .retry_sleep(Duration::from_millis(10))
            .max_time(Duration::from_secs(30))
            .build()
    }

    #[tokio::test]
    async fn test_posts_payload_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("content-type", "application/json"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .and(body_json(json!({"title": "title number 1"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ClientBuilder::default().client().unwrap();
        let response = client
            .execute(&job(&server, "/echo", json!({"title": "title number 1"})))
            .await
            .unwrap();

        assert_eq!(
            response,
            JobResponse {
                status: 201,
                body: "created".into()
            }
        );
    }

    #[tokio::test]
    async fn test_sends_job_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut job = job(&server, "/", json!(null));
        job.headers = Some(HashMap::from([("X-Api-Key".into(), "secret".into())]));

        let client = ClientBuilder::default().client().unwrap();
        assert_eq!(client.send(&job).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_rejected_status_code() {
        let server = mock_server!(StatusCode::SERVICE_UNAVAILABLE);
        let client = ClientBuilder::default().client().unwrap();

        let err = client.send(&job(&server, "/", json!({}))).await.unwrap_err();

        assert_eq!(
            err,
            ErrorKind::RejectedStatusCode(StatusCode::SERVICE_UNAVAILABLE)
        );
    }

    #[tokio::test]
    async fn test_invalid_header_is_reported() {
        let server = mock_server!(StatusCode::OK);
        let mut job = job(&server, "/", json!({}));
        job.headers = Some(HashMap::from([("bad header".into(), "x".into())]));

        let client = ClientBuilder::default().client().unwrap();
        let err = client.send(&job).await.unwrap_err();

        assert_eq!(err, ErrorKind::InvalidHeader("bad header".into()));
    }

    #[tokio::test]
    async fn test_post_all_retries_throttled_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let outcomes = post_all(vec![job(&server, "/", json!({"n": 1}))], config(3))
            .await
            .unwrap();

        assert_eq!(
            outcomes,
            vec![Outcome::Completed(JobResponse {
                status: 200,
                body: "ok".into()
            })]
        );
    }

    #[tokio::test]
    async fn test_post_all_keeps_failed_slots() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let jobs = vec![
            job(&server, "/a", json!({})),
            job(&server, "/broken", json!({})),
            job(&server, "/b", json!({})),
        ];
        let outcomes = post_all(jobs, config(2)).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(outcomes[2].is_success());
        let failure = outcomes[1].failure().unwrap();
        assert_eq!(failure.reason, FailureReason::Exhausted);
        assert_eq!(failure.attempts, 2);
        assert_eq!(
            failure.error,
            ErrorKind::RejectedStatusCode(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[tokio::test]
    async fn test_post_all_rejects_invalid_config() {
        let config = EngineConfig::builder().rate(5.0).build();
        let result = post_all(Vec::new(), config).await;
        assert_eq!(result.unwrap_err(), ErrorKind::RateWithoutResolution);
    }
}
