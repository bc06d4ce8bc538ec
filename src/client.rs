//! # Job-status API client
//!
//! Thin blocking wrapper around the dubbing job-status REST API: the status
//! callback a worker posts, plus the read-back endpoints used by `--verify`.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde_json::Value;

use crate::models::StatusUpdate;

/// Errors from the HTTP client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Cannot reach the API, or the request timed out.
    #[error("Cannot connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16, body: String },
    /// Body was not the JSON we expected.
    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ClientError {
    /// Response body of a failed request, when the server sent one
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

/// Body of a successful callback response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Successful callback response
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackResponse {
    pub status: u16,
    pub body: ResponseBody,
}

/// HTTP client for one job-status API instance
pub struct JobApiClient {
    http: Client,
    base_url: String,
}

impl JobApiClient {
    /// Create a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the status callback for `job_id`
    pub fn status_url(&self, job_id: &str) -> String {
        format!("{}/api/jobs/{}/status", self.base_url, job_id)
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{} {}", method, url);
        let req = self.http.request(method, &url);
        (url, req)
    }

    fn send(&self, url: &str, req: RequestBuilder) -> Result<Response, ClientError> {
        let resp = req.send().map_err(|source| ClientError::Connection {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        log::debug!("{} -> {}", url, status);
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let (url, req) = self.request(Method::GET, path);
        let resp = self.send(&url, req)?;
        resp.json::<Value>().map_err(|e| ClientError::Decode {
            url,
            message: e.to_string(),
        })
    }

    fn get_list(&self, path: &str) -> Result<Vec<Value>, ClientError> {
        match self.get_json(path)? {
            Value::Array(items) => Ok(items),
            other => Err(ClientError::Decode {
                url: format!("{}{}", self.base_url, path),
                message: format!("expected a JSON array, got {}", json_kind(&other)),
            }),
        }
    }

    /// POST /api/jobs/{job_id}/status
    pub fn post_status(&self, job_id: &str, update: &StatusUpdate) -> Result<CallbackResponse, ClientError> {
        let (url, req) = self.request(Method::POST, &format!("/api/jobs/{}/status", job_id));
        let resp = self.send(&url, req.json(update))?;
        let status = resp.status().as_u16();
        let text = resp.text().map_err(|e| ClientError::Decode {
            url,
            message: e.to_string(),
        })?;
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        };
        Ok(CallbackResponse { status, body })
    }

    /// GET /api/jobs/{job_id}
    pub fn get_job(&self, job_id: &str) -> Result<Value, ClientError> {
        self.get_json(&format!("/api/jobs/{}", job_id))
    }

    /// GET /api/projects/{project_id}/targets
    pub fn project_targets(&self, project_id: &str) -> Result<Vec<Value>, ClientError> {
        self.get_list(&format!("/api/projects/{}/targets", project_id))
    }

    /// GET /api/segments/project/{project_id}
    pub fn project_segments(&self, project_id: &str) -> Result<Vec<Value>, ClientError> {
        self.get_list(&format!("/api/segments/project/{}", project_id))
    }

    /// GET /api/assets/project/{project_id}
    pub fn project_assets(&self, project_id: &str) -> Result<Vec<Value>, ClientError> {
        self.get_list(&format!("/api/assets/project/{}", project_id))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = JobApiClient::new("http://localhost:8000//", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.status_url("abc"), "http://localhost:8000/api/jobs/abc/status");
    }

    #[test]
    fn test_error_body_only_for_non_empty_status_errors() {
        let err = ClientError::Status {
            url: "u".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.body(), Some("boom"));
        assert_eq!(err.to_string(), "HTTP 500 from u");

        let err = ClientError::Status {
            url: "u".to_string(),
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.body(), None);

        let err = ClientError::Decode {
            url: "u".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(err.body(), None);
    }

    #[test]
    fn test_connection_refused_is_connection_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}", port);
        let client = JobApiClient::new(&url, Duration::from_secs(2)).unwrap();
        let err = client.get_job("job").unwrap_err();
        assert!(matches!(err, ClientError::Connection { .. }));
    }
}
