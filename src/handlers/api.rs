//! HTTP client for provider APIs

use crate::config::FetchConfig;
use crate::error::HandlerError;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

/// Blocking JSON client shared by provider handlers
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new client with the given settings
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// GET `base` + `path` with query parameters, decoding a JSON body
    ///
    /// Query values are kept out of the trace span since they carry API keys.
    #[instrument(skip(self, query, bearer), level = "debug")]
    pub fn get_json<T: DeserializeOwned>(
        &self,
        base: &str,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<T, HandlerError> {
        let url = join_url(base, path);
        let mut request = self.client.get(url).query(query);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        debug!("Sending GET request to {}", path);
        self.execute_request(request)
    }

    /// Execute a request and decode the response
    fn execute_request<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, HandlerError> {
        let response = request.send()?;

        let status = response.status();
        let response_text = response.text()?;

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                HandlerError::Json(e)
            })
        } else {
            error!("API error: {} - {}", status, response_text);
            Err(HandlerError::Status {
                status: status.as_u16(),
                body: response_text,
            })
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestResponse {
        message: String,
    }

    fn client() -> ApiClient {
        ApiClient::new(&FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/", "/a/b"), "http://h/a/b");
        assert_eq!(join_url("http://h", "a"), "http://h/a");
    }

    #[test]
    fn test_get_request_success() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/v1/test")
            .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
            .match_header("authorization", "Bearer token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "success"}"#)
            .expect(1)
            .create();

        let response: TestResponse = client()
            .get_json(&server.url(), "v1/test", &[("key", "secret")], Some("token"))
            .unwrap();
        assert_eq!(response.message, "success");

        mock.assert();
    }

    #[test]
    fn test_error_status() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/v1/test")
            .with_status(403)
            .with_body("Forbidden")
            .create();

        let result: Result<TestResponse, HandlerError> =
            client().get_json(&server.url(), "v1/test", &[], None);
        assert!(matches!(
            result,
            Err(HandlerError::Status { status: 403, ref body }) if body == "Forbidden"
        ));

        mock.assert();
    }

    #[test]
    fn test_unparseable_body() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/v1/test")
            .with_status(200)
            .with_body("not json")
            .create();

        let result: Result<TestResponse, HandlerError> =
            client().get_json(&server.url(), "v1/test", &[], None);
        assert!(matches!(result, Err(HandlerError::Json(_))));

        mock.assert();
    }
}
