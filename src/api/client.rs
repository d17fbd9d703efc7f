use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use super::{FormSubmission, SelectionApi};
use crate::selection::types::{Action, SyncError};

#[derive(Debug, Serialize)]
struct UpdateSelectionRequest<'a> {
    action: Action,
    filepath: &'a str,
}

#[derive(Debug, Serialize)]
struct RenameRequest<'a> {
    filepath: &'a str,
    new_name: &'a str,
}

/// reqwest-backed client for the file manager server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }
}

fn network_error(e: reqwest::Error) -> SyncError {
    SyncError::Network(e.to_string())
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SyncError::ServerRejected { status: status.as_u16() })
    }
}

impl SelectionApi for HttpApi {
    async fn update_selection(&self, action: Action, path: &str) -> Result<(), SyncError> {
        tracing::debug!(action = action.as_str(), path, "POST /update_selection");

        let response = self
            .client
            .post(self.url("update_selection"))
            .header("Accept", "application/json")
            .json(&UpdateSelectionRequest { action, filepath: path })
            .send()
            .await
            .map_err(network_error)?;

        check_status(response).map(|_| ())
    }

    async fn rename(&self, path: &str, new_name: &str) -> Result<(), SyncError> {
        tracing::debug!(path, new_name, "POST /rename");

        let response = self
            .client
            .post(self.url("rename"))
            .header("Accept", "application/json")
            .json(&RenameRequest { filepath: path, new_name })
            .send()
            .await
            .map_err(network_error)?;

        check_status(response).map(|_| ())
    }

    async fn fetch_logs(&self) -> Result<String, SyncError> {
        let response = self
            .client
            .get(self.url("logs_raw"))
            .send()
            .await
            .map_err(network_error)?;

        check_status(response)?.text().await.map_err(network_error)
    }

    async fn submit_form(&self, page_path: &str, form: &FormSubmission) -> Result<(), SyncError> {
        tracing::info!(kind = form.kind(), page_path, "submitting page form");

        let response = self
            .client
            .post(self.url(page_path))
            .form(&form.fields())
            .send()
            .await
            .map_err(network_error)?;

        check_status(response).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    /// Accept a single request, answer it, and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);

                if let Some(end) = header_end(&buf) {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let content_length = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn api(base_url: &str) -> HttpApi {
        HttpApi::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_update_selection_posts_json() {
        let (base, server) = serve_once("200 OK", "{\"success\": true}").await;

        api(&base).update_selection(Action::Add, "/srv/a.txt").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /update_selection HTTP/1.1"));
        assert!(request.contains(r#"{"action":"add","filepath":"/srv/a.txt"}"#));
    }

    #[tokio::test]
    async fn test_update_selection_non_success_is_rejected() {
        let (base, server) = serve_once("400 Bad Request", "{\"error\": \"Invalid action\"}").await;

        let err = api(&base)
            .update_selection(Action::Remove, "/srv/a.txt")
            .await
            .unwrap_err();

        assert_eq!(err, SyncError::ServerRejected { status: 400 });
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api(&format!("http://{addr}"))
            .update_selection(Action::Add, "/srv/a.txt")
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Network(_)));
    }

    #[tokio::test]
    async fn test_rename_posts_new_name() {
        let (base, server) = serve_once("200 OK", "").await;

        api(&base).rename("/srv/a.txt", "b.txt").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /rename HTTP/1.1"));
        assert!(request.contains(r#"{"filepath":"/srv/a.txt","new_name":"b.txt"}"#));
    }

    #[tokio::test]
    async fn test_fetch_logs_returns_body() {
        let (base, server) = serve_once("200 OK", "line 1\nline 2\n").await;

        let text = api(&base).fetch_logs().await.unwrap();

        assert_eq!(text, "line 1\nline 2\n");
        assert!(server.await.unwrap().starts_with("GET /logs_raw HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_submit_form_posts_to_page_path() {
        let (base, server) = serve_once("200 OK", "").await;
        let form = FormSubmission::Delete {
            paths: vec!["a b.txt".to_string(), "c.txt".to_string()],
        };

        api(&format!("{base}/")).submit_form("media", &form).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /media HTTP/1.1"));
        assert!(request.contains("delete=delete&selected_files=a+b.txt&selected_files=c.txt"));
    }
}
