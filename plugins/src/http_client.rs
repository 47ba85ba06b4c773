use std::fmt;

use maactl_core::api::{CommandRequest, CommandResponse, JobLookupOutcome};
use serde::Deserialize;
use serde_json::{json, Value};

const BODY_PREVIEW_LIMIT: usize = 512;

/// Control server endpoint a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Command,
    Lookup,
    ConfigLoad,
    ConfigSave,
    Version,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Lookup => "lookup",
            Self::ConfigLoad => "config load",
            Self::ConfigSave => "config save",
            Self::Version => "version",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiHttpError {
    #[error("{endpoint} request to {url} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status} from {url}: {preview}")]
    Status {
        endpoint: Endpoint,
        url: String,
        status: u16,
        preview: String,
    },
    #[error("{endpoint} reply from {url} is not an envelope: {source} | body={preview}")]
    Decode {
        endpoint: Endpoint,
        url: String,
        preview: String,
        #[source]
        source: serde_json::Error,
    },
    /// The server answered 2xx with `success: false`.
    #[error("{endpoint} rejected by {url}: {message}")]
    Rejected {
        endpoint: Endpoint,
        url: String,
        message: String,
    },
}

impl ApiHttpError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Rejected { endpoint, .. } => *endpoint,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::Rejected { url, .. } => url,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            Self::Decode { .. } | Self::Rejected { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }

    fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// `{success, status?, data?, error?}` envelope shared by the control server endpoints.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl Envelope {
    /// An empty 2xx body counts as an accepted envelope without data.
    fn empty() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    fn accepted(self, endpoint: Endpoint, url: &str) -> Result<Self, ApiHttpError> {
        if self.success {
            return Ok(self);
        }
        Err(ApiHttpError::Rejected {
            endpoint,
            url: url.to_string(),
            message: self
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "request rejected".to_string()),
        })
    }
}

async fn read_envelope(
    endpoint: Endpoint,
    url: &str,
    resp: reqwest::Response,
) -> Result<Envelope, ApiHttpError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|source| ApiHttpError::Transport {
        endpoint,
        url: url.to_string(),
        source,
    })?;
    tracing::debug!(
        target: "maactl.http",
        stage = "http.reply",
        endpoint = %endpoint,
        status = %status,
        body_len = body.len()
    );

    if !status.is_success() {
        return Err(ApiHttpError::Status {
            endpoint,
            url: url.to_string(),
            status: status.as_u16(),
            preview: preview_body(&body),
        });
    }
    if body.trim().is_empty() {
        return Ok(Envelope::empty());
    }
    serde_json::from_str::<Envelope>(&body).map_err(|source| ApiHttpError::Decode {
        endpoint,
        url: url.to_string(),
        preview: preview_body(&body),
        source,
    })
}

#[derive(Clone)]
pub struct HttpClient {
    api_key: String,
    http: reqwest::Client,
    url_command: String,
    url_lookup: String,
    url_config: String,
    url_version: String,
}

impl HttpClient {
    pub fn new(base_url: String, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        Self::with_lookup_base(base_url.clone(), base_url, api_key, timeout_ms)
    }

    /// Job lookups may live behind a different host than the control server.
    pub fn with_lookup_base(
        base_url: String,
        lookup_base_url: String,
        api_key: String,
        timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/');
        let lookup = lookup_base_url.trim_end_matches('/');
        Ok(Self {
            api_key,
            http,
            url_command: format!("{}/api/maa/command", normalized),
            url_lookup: format!("{}/api/copilot/lookup", lookup),
            url_config: format!("{}/api/config", normalized),
            url_version: format!("{}/api/version", normalized),
        })
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        url: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<Envelope, ApiHttpError> {
        let req = if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        };
        let resp = req.send().await.map_err(|source| ApiHttpError::Transport {
            endpoint,
            url: url.to_string(),
            source,
        })?;
        read_envelope(endpoint, url, resp).await
    }

    /// Send one command. `success: false` is returned as a response, not an error.
    pub async fn execute_command(
        &self,
        request: &CommandRequest,
    ) -> anyhow::Result<CommandResponse> {
        let url = &self.url_command;
        tracing::debug!(
            target: "maactl.http",
            stage = "http.command.in",
            url = %url,
            command = %request.command,
            arguments_len = request.arguments.len()
        );
        let envelope = self
            .send(Endpoint::Command, url, self.http.post(url).json(request))
            .await?;
        tracing::debug!(
            target: "maactl.http",
            stage = "http.command.out",
            success = envelope.success
        );
        Ok(CommandResponse {
            success: envelope.success,
            data: envelope.data,
            error: envelope.error,
        })
    }

    /// HTTP 404 and `status: "not_found"` both mean the job does not exist.
    pub async fn lookup_job(&self, job_id: u64) -> anyhow::Result<JobLookupOutcome> {
        let url = &self.url_lookup;
        tracing::debug!(
            target: "maactl.http",
            stage = "http.lookup.in",
            url = %url,
            job_id
        );
        let req = self
            .http
            .post(url)
            .json(&json!({ "jobId": job_id.to_string() }));
        let envelope = match self.send(Endpoint::Lookup, url, req).await {
            Err(err) if err.is_not_found() => return Ok(JobLookupOutcome::NotFound),
            other => other?.accepted(Endpoint::Lookup, url)?,
        };
        let outcome = match (envelope.status.as_deref(), envelope.data) {
            (Some("not_found"), _) | (_, None) => JobLookupOutcome::NotFound,
            (_, Some(doc)) => JobLookupOutcome::Found(doc),
        };
        tracing::debug!(
            target: "maactl.http",
            stage = "http.lookup.out",
            found = matches!(outcome, JobLookupOutcome::Found(_))
        );
        Ok(outcome)
    }

    /// `Ok(None)` when the server holds nothing for `config_type`.
    pub async fn load_config(&self, config_type: &str) -> anyhow::Result<Option<Value>> {
        let url = format!("{}/{}", self.url_config, config_type);
        tracing::debug!(target: "maactl.http", stage = "http.config.load.in", url = %url);
        let envelope = match self.send(Endpoint::ConfigLoad, &url, self.http.get(&url)).await {
            Err(err) if err.is_not_found() => return Ok(None),
            other => other?.accepted(Endpoint::ConfigLoad, &url)?,
        };
        Ok(envelope.data.filter(|d| !d.is_null()))
    }

    pub async fn save_config(&self, config_type: &str, data: &Value) -> anyhow::Result<()> {
        let url = &self.url_config;
        tracing::debug!(
            target: "maactl.http",
            stage = "http.config.save.in",
            url = %url,
            config_type = %config_type
        );
        let req = self
            .http
            .post(url)
            .json(&json!({ "type": config_type, "data": data }));
        self.send(Endpoint::ConfigSave, url, req)
            .await?
            .accepted(Endpoint::ConfigSave, url)?;
        Ok(())
    }

    pub async fn fetch_version(&self) -> anyhow::Result<Option<String>> {
        let url = &self.url_version;
        let envelope = self
            .send(Endpoint::Version, url, self.http.get(url))
            .await?
            .accepted(Endpoint::Version, url)?;
        Ok(envelope
            .data
            .as_ref()
            .and_then(|d| d.get("version"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use mockito::Server;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_body_empty() {
        assert_eq!(preview_body("  \n "), "<empty body>");
    }

    #[test]
    fn test_preview_body_truncates() {
        let body = "x".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn test_api_http_error_display_status() {
        let err = ApiHttpError::Status {
            endpoint: Endpoint::Command,
            url: "http://localhost/api/maa/command".to_string(),
            status: 502,
            preview: "bad gateway".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command returned HTTP 502 from http://localhost/api/maa/command: bad gateway"
        );
        assert_eq!(err.status(), Some(502));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_envelope_accepted_defaults_message() {
        let err = Envelope::default()
            .accepted(Endpoint::ConfigSave, "http://localhost/api/config")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "config save rejected by http://localhost/api/config: request rejected"
        );
        assert!(Envelope::empty()
            .accepted(Endpoint::ConfigSave, "http://localhost/api/config")
            .is_ok());
    }

    #[tokio::test]
    async fn test_execute_command_success() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/maa/command")
            .match_body(Matcher::Json(json!({
                "command": "fight",
                "arguments": "1-7 --times 3"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"data":{"queued":1}}"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let resp = client
            .execute_command(&CommandRequest {
                command: "fight".to_string(),
                arguments: "1-7 --times 3".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resp, CommandResponse::ok(Some(json!({ "queued": 1 }))));
    }

    #[tokio::test]
    async fn test_execute_command_reported_failure_is_not_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/maa/command")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"device offline"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let resp = client
            .execute_command(&CommandRequest {
                command: "startup".to_string(),
                arguments: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(resp, CommandResponse::failed("device offline"));
    }

    #[tokio::test]
    async fn test_execute_command_status_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/maa/command")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let err = client
            .execute_command(&CommandRequest {
                command: "fight".to_string(),
                arguments: String::new(),
            })
            .await
            .unwrap_err();
        let api_err = err
            .downcast_ref::<ApiHttpError>()
            .expect("expected ApiHttpError");
        assert!(matches!(
            api_err,
            ApiHttpError::Status { endpoint: Endpoint::Command, status: 502, .. }
        ));
        assert!(api_err.url().contains("/api/maa/command"));
    }

    #[tokio::test]
    async fn test_lookup_found_and_not_found() {
        let mut server = Server::new_async().await;
        let _found = server
            .mock("POST", "/api/copilot/lookup")
            .match_body(Matcher::Json(json!({ "jobId": "26766" })))
            .with_status(200)
            .with_body(r#"{"success":true,"status":"found","data":{"title":"LS-6"}}"#)
            .create_async()
            .await;
        let _missing = server
            .mock("POST", "/api/copilot/lookup")
            .match_body(Matcher::Json(json!({ "jobId": "404" })))
            .with_status(200)
            .with_body(r#"{"success":true,"status":"not_found"}"#)
            .create_async()
            .await;
        let _gone = server
            .mock("POST", "/api/copilot/lookup")
            .match_body(Matcher::Json(json!({ "jobId": "410" })))
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        assert_eq!(
            client.lookup_job(26766).await.unwrap(),
            JobLookupOutcome::Found(json!({ "title": "LS-6" }))
        );
        assert_eq!(client.lookup_job(404).await.unwrap(), JobLookupOutcome::NotFound);
        assert_eq!(client.lookup_job(410).await.unwrap(), JobLookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_rejected_is_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/copilot/lookup")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"upstream down"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let err = client.lookup_job(1).await.unwrap_err();
        let api_err = err.downcast_ref::<ApiHttpError>().unwrap();
        assert!(matches!(
            api_err,
            ApiHttpError::Rejected { endpoint: Endpoint::Lookup, message, .. } if message == "upstream down"
        ));
    }

    #[tokio::test]
    async fn test_config_load_and_save() {
        let mut server = Server::new_async().await;
        let _load = server
            .mock("GET", "/api/config/tasks")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(r#"{"success":true,"data":{"taskList":["fight"]}}"#)
            .create_async()
            .await;
        let _save = server
            .mock("POST", "/api/config")
            .match_body(Matcher::Json(json!({ "type": "tasks", "data": { "version": 1 } })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "secret".to_string(), 1_000).unwrap();
        assert_eq!(
            client.load_config("tasks").await.unwrap(),
            Some(json!({ "taskList": ["fight"] }))
        );
        client
            .save_config("tasks", &json!({ "version": 1 }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_version_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/version")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let err = client.fetch_version().await.unwrap_err();
        let api_err = err.downcast_ref::<ApiHttpError>().unwrap();
        assert!(matches!(
            api_err,
            ApiHttpError::Decode { endpoint: Endpoint::Version, preview, .. } if preview == "not json"
        ));
        assert_eq!(api_err.status(), None);
    }

    #[tokio::test]
    async fn test_config_missing_empty_and_rejected() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", "/api/config/tasks")
            .with_status(404)
            .create_async()
            .await;
        let _empty = server
            .mock("POST", "/api/config")
            .match_body(Matcher::PartialJson(json!({ "type": "tasks" })))
            .with_status(204)
            .create_async()
            .await;
        let _rejected = server
            .mock("POST", "/api/config")
            .match_body(Matcher::PartialJson(json!({ "type": "ui" })))
            .with_status(200)
            .with_body(r#"{"success":false,"error":"read-only"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        assert_eq!(client.load_config("tasks").await.unwrap(), None);
        client.save_config("tasks", &json!({})).await.unwrap();

        let err = client.save_config("ui", &json!({})).await.unwrap_err();
        let api_err = err.downcast_ref::<ApiHttpError>().unwrap();
        assert_eq!(api_err.endpoint(), Endpoint::ConfigSave);
        assert!(err.to_string().contains("read-only"));
    }

    #[tokio::test]
    async fn test_command_not_found_is_status_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/maa/command")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), "".to_string(), 1_000).unwrap();
        let err = client
            .execute_command(&CommandRequest {
                command: "fight".to_string(),
                arguments: String::new(),
            })
            .await
            .unwrap_err();
        let api_err = err.downcast_ref::<ApiHttpError>().unwrap();
        assert_eq!(api_err.status(), Some(404));
        assert_eq!(api_err.endpoint(), Endpoint::Command);
    }
}
