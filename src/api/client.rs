use std::sync::RwLock;

use reqwest::header::{REFERER, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response};

use super::{Backend, FileUpload};
use super::types::{
    CreatedTask, ModelAction, ModelStatus, QueueStatus, ServerMessage, Settings, Task, TaskId,
};
use crate::config::ClientConfig;
use crate::error::ClientError;

const CSRF_HEADER: &str = "X-CSRFToken";
const CSRF_COOKIE: &str = "csrftoken";

/// reqwest-backed implementation of the backend contract.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    csrf_token: RwLock<Option<String>>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            csrf_token: RwLock::new(config.csrf_token.clone().filter(|t| !t.is_empty())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Option<String> {
        self.csrf_token.read().ok().and_then(|t| t.clone())
    }

    /// Fetch the page root once so the backend issues its `csrftoken`
    /// cookie. A token from the config file takes precedence.
    pub async fn prime_csrf(&self) -> Result<(), ClientError> {
        if self.token().is_some() {
            return Ok(());
        }
        let resp = self.client.get(self.url("/")).send().await?;
        let token = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(csrf_from_set_cookie);

        match token {
            Some(token) => {
                log::debug!("Obtained CSRF token from cookie");
                if let Ok(mut slot) = self.csrf_token.write() {
                    *slot = Some(token);
                }
            }
            None => log::info!("Backend issued no CSRF cookie; sending requests without token"),
        }
        Ok(())
    }

    /// Attach the anti-forgery headers every mutating request carries.
    fn guarded(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(REFERER, format!("{}/", self.base_url));
        match self.token() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }
}

fn csrf_from_set_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    (name.trim() == CSRF_COOKIE && !value.trim().is_empty()).then(|| value.trim().to_string())
}

/// Turn a non-2xx response into `ClientError::Http`, keeping the server's
/// `error` text when the body has one.
async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServerMessage>(&body)
        .ok()
        .and_then(|m| m.error);
    Err(ClientError::Http {
        status: status.as_u16(),
        message,
    })
}

impl Backend for HttpBackend {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self.client.get(self.url("/api/tasks/")).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn queue_status(&self) -> Result<QueueStatus, ClientError> {
        let resp = self.client.get(self.url("/api/queue/status/")).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn create_url_task(&self, url: &str) -> Result<CreatedTask, ClientError> {
        let resp = self
            .guarded(self.client.post(self.url("/api/tasks/create-url/")))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        let created: CreatedTask = check(resp).await?.json().await?;
        log::info!("Created URL task {} ({url})", created.id);
        Ok(created)
    }

    async fn create_file_task(&self, upload: &FileUpload) -> Result<CreatedTask, ClientError> {
        let bytes = tokio::fs::read(&upload.path).await?;
        let file_name = upload.file_name();
        log::info!("Uploading {file_name} ({} bytes)", bytes.len());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .guarded(self.client.post(self.url("/api/tasks/create-file/")))
            .multipart(form)
            .send()
            .await?;
        let created: CreatedTask = check(resp).await?.json().await?;
        log::info!("Created file task {}", created.id);
        Ok(created)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        let resp = self
            .guarded(self.client.delete(self.url(&format!("/api/tasks/{id}/delete/"))))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn fetch_settings(&self) -> Result<Settings, ClientError> {
        let resp = self.client.get(self.url("/api/settings/")).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn update_settings(&self, settings: &Settings) -> Result<(), ClientError> {
        let resp = self
            .guarded(self.client.post(self.url("/api/settings/update/")))
            .json(settings)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn manage_model(&self, action: ModelAction) -> Result<(), ClientError> {
        let resp = self
            .guarded(self.client.post(self.url("/api/model/manage/")))
            .json(&serde_json::json!({ "action": action }))
            .send()
            .await?;
        let reply: ServerMessage = check(resp).await?.json().await.unwrap_or_default();
        if let Some(message) = reply.message {
            log::info!("Model {action:?}: {message}");
        }
        Ok(())
    }

    async fn model_status(&self) -> Result<ModelStatus, ClientError> {
        let resp = self.client.get(self.url("/api/model/status/")).send().await?;
        Ok(check(resp).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CurrentTask, TaskKind};
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// One request as the stub server saw it. Header names are lowercase.
    struct Recorded {
        head: String,
        body: String,
    }

    impl Recorded {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
            })
        }

        fn json(&self) -> Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    async fn read_request(stream: &mut TcpStream) -> Recorded {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let end = loop {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break end;
            }
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_string();
        let mut recorded = Recorded {
            head,
            body: String::new(),
        };
        let len: usize = recorded
            .header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        while buf.len() < end + 4 + len {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        recorded.body = String::from_utf8_lossy(&buf[end + 4..]).to_string();
        recorded
    }

    /// Serve exactly one request with `status` and a JSON `body`, and hand
    /// back a backend pointed at it.
    async fn stub(
        status: u16,
        body: &'static str,
        token: Option<&str>,
    ) -> (HttpBackend, JoinHandle<Recorded>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let recorded = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            recorded
        });
        let backend = HttpBackend {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url: format!("http://{addr}"),
            csrf_token: RwLock::new(token.map(str::to_string)),
        };
        (backend, server)
    }

    #[tokio::test]
    async fn create_url_posts_json_with_csrf_headers() {
        let (backend, server) = stub(
            201,
            r#"{"id":12,"title":"https://example.com/v=1","queue_position":1,"is_processing":false}"#,
            Some("tok123"),
        )
        .await;

        let created = backend
            .create_url_task("https://example.com/v=1")
            .await
            .unwrap();
        assert_eq!(created.id, 12);
        assert_eq!(created.queue_position, Some(1));

        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "POST /api/tasks/create-url/ HTTP/1.1");
        assert_eq!(request.header("x-csrftoken"), Some("tok123"));
        assert_eq!(
            request.header("referer"),
            Some(format!("{}/", backend.base_url()).as_str())
        );
        assert!(request
            .header("content-type")
            .is_some_and(|v| v.starts_with("application/json")));
        assert_eq!(request.json(), json!({"url": "https://example.com/v=1"}));
    }

    #[tokio::test]
    async fn error_body_becomes_http_message() {
        let (backend, server) = stub(400, r#"{"error":"无效的URL"}"#, None).await;

        let err = backend.create_url_task("https://bad").await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Http {
                status: 400,
                message: Some("无效的URL".into()),
            }
        );
        let request = server.await.unwrap();
        assert_eq!(request.header("x-csrftoken"), None);
    }

    #[tokio::test]
    async fn error_without_json_body_has_no_message() {
        let (backend, server) = stub(500, "Internal Server Error", None).await;

        let err = backend.delete_task(3).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Http {
                status: 500,
                message: None,
            }
        );
        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "DELETE /api/tasks/3/delete/ HTTP/1.1");
    }

    #[tokio::test]
    async fn manage_model_sends_action() {
        let (backend, server) = stub(200, r#"{"message":"模型加载成功"}"#, Some("t")).await;

        backend.manage_model(ModelAction::Load).await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "POST /api/model/manage/ HTTP/1.1");
        assert_eq!(request.header("x-csrftoken"), Some("t"));
        assert_eq!(request.json(), json!({"action": "load"}));
    }

    #[tokio::test]
    async fn update_settings_posts_full_object() {
        let (backend, server) = stub(200, r#"{"message":"ok"}"#, Some("t")).await;

        let settings = Settings {
            whisper_model: "small".into(),
            ..Settings::default()
        };
        backend.update_settings(&settings).await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "POST /api/settings/update/ HTTP/1.1");
        let body = request.json();
        assert_eq!(body.as_object().map(|o| o.len()), Some(8));
        assert_eq!(body["whisper_model"], json!("small"));
    }

    #[tokio::test]
    async fn queue_status_decodes_running_entry() {
        let (backend, server) = stub(
            200,
            r#"{"queue_size":2,"is_processing":true,"current_task":{"task_id":5,"type":"url","added_at":1401.2}}"#,
            None,
        )
        .await;

        let status = backend.queue_status().await.unwrap();
        assert_eq!(
            status.current_task,
            Some(CurrentTask {
                task_id: 5,
                kind: Some(TaskKind::Url),
            })
        );
        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "GET /api/queue/status/ HTTP/1.1");
    }

    #[test]
    fn csrf_cookie_parsing() {
        assert_eq!(
            csrf_from_set_cookie("csrftoken=abc123; expires=Thu, 01 Jan 2026 00:00:00 GMT; Path=/"),
            Some("abc123".to_string())
        );
        assert_eq!(csrf_from_set_cookie("sessionid=xyz; Path=/"), None);
        assert_eq!(csrf_from_set_cookie("csrftoken=; Path=/"), None);
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let config = ClientConfig {
            server_url: "http://localhost:8000/".into(),
            ..ClientConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.url("/api/tasks/"), "http://localhost:8000/api/tasks/");
    }

    #[test]
    fn configured_token_is_used() {
        let config = ClientConfig {
            csrf_token: Some("fixed".into()),
            ..ClientConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.token().as_deref(), Some("fixed"));
    }
}
