use super::InferenceClient;
use crate::config::ScoutConfig;
use crate::intent::{Intent, IntentTag};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Body POSTed to the Professor server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceRequest {
    pub task: IntentTag,
    pub image_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
}

impl InferenceRequest {
    pub fn for_intent(intent: &Intent, image_data: String) -> Self {
        Self {
            task: intent.tag(),
            image_data,
            query_text: intent.query_text().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InferenceResponse {
    pub result_text: String,
    #[serde(default)]
    pub structured_data: Option<Value>,
}

pub struct HttpInferenceClient {
    client: Client,
    endpoint: Url,
    token: Option<SecretBox<String>>,
}

impl HttpInferenceClient {
    pub fn new(
        server_url: &Url,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(timeout).build()?;

        // join() would drop the last path segment without a trailing slash
        let mut base = server_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join("process_data")?;

        Ok(Self {
            client,
            endpoint,
            token: token.map(|t| SecretBox::new(Box::new(t))),
        })
    }

    pub fn from_config(config: &ScoutConfig) -> Result<Self, InferenceError> {
        Self::new(
            &config.server_url,
            config.request_timeout,
            config.server_token().map(str::to_string),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the image and task to the server
    pub async fn process(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        log::debug!(
            "📡 POST {} task={} query={:?} image={} bytes",
            self.endpoint,
            request.task,
            request.query_text,
            request.image_data.len()
        );

        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json::<InferenceResponse>().await?)
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn send(&self, request: &InferenceRequest) -> crate::Result<InferenceResponse> {
        Ok(self.process(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let find = Intent::FindObject {
            query_text: "keys".to_string(),
        };
        let body = serde_json::to_value(InferenceRequest::for_intent(&find, "aGk=".into())).unwrap();
        assert_eq!(
            body,
            json!({"task": "find_object", "image_data": "aGk=", "query_text": "keys"})
        );

        let scene = serde_json::to_value(InferenceRequest::for_intent(
            &Intent::DescribeScene,
            "aGk=".into(),
        ))
        .unwrap();
        assert_eq!(scene, json!({"task": "describe_scene", "image_data": "aGk="}));
    }

    #[test]
    fn test_response_without_structured_data() {
        let response: InferenceResponse =
            serde_json::from_value(json!({"result_text": "A kitchen."})).unwrap();
        assert_eq!(response.result_text, "A kitchen.");
        assert!(response.structured_data.is_none());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://192.168.1.19:8000").unwrap();
        let client = HttpInferenceClient::new(&base, Duration::from_secs(5), None).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://192.168.1.19:8000/process_data");

        let base = Url::parse("https://example.com/professor").unwrap();
        let client = HttpInferenceClient::new(&base, Duration::from_secs(5), None).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://example.com/professor/process_data"
        );
    }
}
