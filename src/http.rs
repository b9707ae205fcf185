use serde_json::{Value, json};

use crate::config::Identity;

const ERROR_BODY_LIMIT: usize = 240;

#[derive(Debug, thiserror::Error)]
pub(crate) enum TransportError {
    #[error("HTTP status {status}{}", body_hint(.body))]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Network(String),
    #[error("response decode failed: {0}")]
    Decode(String),
}

fn body_hint(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

pub(crate) trait Transport {
    fn execute(
        &self,
        query: &str,
        variables: Value,
        operation_name: &str,
    ) -> Result<Value, TransportError>;
}

pub(crate) struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    identity: Identity,
}

impl HttpTransport {
    pub(crate) fn new(
        endpoint: &str,
        identity: Identity,
        connect_timeout: std::time::Duration,
        read_timeout: std::time::Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .timeout_write(read_timeout)
            .build();
        Self {
            agent,
            endpoint: endpoint.to_string(),
            identity,
        }
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        query: &str,
        variables: Value,
        operation_name: &str,
    ) -> Result<Value, TransportError> {
        let payload = json!({
            "query": query,
            "variables": variables,
            "operationName": operation_name,
        });

        let request = self
            .agent
            .post(&self.endpoint)
            .set("Accept", "*/*")
            .set("Content-Type", "application/json")
            .set("x-plex-client-identifier", &self.identity.client_identifier)
            .set("x-plex-platform", &self.identity.platform)
            .set("x-plex-product", &self.identity.product)
            .set("x-plex-token", &self.identity.token)
            .set("x-plex-version", &self.identity.version);

        tracing::debug!(operation = operation_name, "sending request");
        match request.send_string(&payload.to_string()) {
            Ok(response) => {
                let body = response
                    .into_string()
                    .map_err(|err| TransportError::Decode(err.to_string()))?;
                serde_json::from_str(&body)
                    .map_err(|err| TransportError::Decode(format!("invalid JSON: {err}")))
            }
            Err(ureq::Error::Status(status, response)) => {
                let response_body = response.into_string().ok().unwrap_or_default();
                let body = response_body
                    .trim()
                    .chars()
                    .take(ERROR_BODY_LIMIT)
                    .collect::<String>();
                tracing::error!(operation = operation_name, status, "API request failed");
                Err(TransportError::Status { status, body })
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::error!(operation = operation_name, error = %err, "API request failed");
                Err(TransportError::Network(err.to_string()))
            }
        }
    }
}
