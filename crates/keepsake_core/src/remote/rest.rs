//! Hosted backend adapter over HTTP.
//!
//! Talks to a PostgREST-style table API (`/rest/v1/<table>`) and an object
//! storage API (`/storage/v1/object/<bucket>/<key>`) with the project API key.
//! Calls are blocking; callers run them off the UI thread. No explicit timeout
//! or retry is configured beyond the client defaults.

use super::{
    BlobBucket, MemoryRow, MemoryTable, NewMemoryRow, RemoteError, RemoteResult, MEMORY_COLUMNS,
};
use log::{debug, error};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::time::Instant;

const REST_PREFIX: &str = "rest/v1";
const STORAGE_PREFIX: &str = "storage/v1/object";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Connection settings for the hosted backend.
#[derive(Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// Project base URL, e.g. `https://xyz.example.co`.
    pub url: String,
    /// Project API key sent as `apikey` and bearer token.
    pub api_key: String,
    pub table: String,
    pub bucket: String,
}

impl Debug for RestConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Table and bucket adapter for the hosted backend.
///
/// Cloning shares the underlying HTTP connection pool.
#[derive(Clone)]
pub struct RestRemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
    bucket: String,
}

impl RestRemoteStore {
    pub fn new(config: &RestConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            table: config.table.clone(),
            bucket: config.bucket.clone(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/{REST_PREFIX}/{}", self.base_url, self.table)
    }

    fn select_url(&self) -> String {
        format!("{}?select={MEMORY_COLUMNS}&order=date.asc", self.table_url())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{STORAGE_PREFIX}/{}/{key}", self.base_url, self.bucket)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn send(&self, operation: &'static str, builder: RequestBuilder) -> RemoteResult<Response> {
        let started_at = Instant::now();
        let response = self.authorized(builder).send().map_err(|err| {
            error!(
                "event=remote_request module=remote status=error op={} duration_ms={} error_code=transport",
                operation,
                started_at.elapsed().as_millis()
            );
            RemoteError::Transport(err.to_string())
        })?;

        let status = response.status();
        debug!(
            "event=remote_request module=remote status=ok op={} http_status={} duration_ms={}",
            operation,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(RemoteError::Http {
            status: status.as_u16(),
            message: error_message(&body, status),
        })
    }
}

impl MemoryTable for RestRemoteStore {
    fn select_ordered_by_date(&self) -> RemoteResult<Vec<MemoryRow>> {
        let response = self.send("select", self.client.get(self.select_url()))?;
        let body = response
            .text()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        serde_json::from_str::<Vec<MemoryRow>>(&body)
            .map_err(|err| RemoteError::InvalidData(format!("memories response: {err}")))
    }

    fn insert(&self, row: &NewMemoryRow) -> RemoteResult<()> {
        let builder = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=minimal")
            .json(row);
        self.send("insert", builder)?;
        Ok(())
    }
}

impl BlobBucket for RestRemoteStore {
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> RemoteResult<()> {
        let builder = self
            .client
            .post(self.object_url(key))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes.to_vec());
        match self.send("upload", builder) {
            Ok(_) => Ok(()),
            Err(RemoteError::Http { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                Err(RemoteError::Conflict(key.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{STORAGE_PREFIX}/public/{}/{key}",
            self.base_url, self.bucket
        )
    }
}

/// Picks the most useful message out of an error body.
///
/// Both the table API and the storage API answer with a JSON object carrying
/// `message` (storage sometimes `error` only); anything else is truncated raw.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error"] {
            if let Some(text) = value.get(field).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{error_message, RestConfig, RestRemoteStore};
    use crate::remote::{BlobBucket, MemoryRow, MemoryTable, NewMemoryRow, RemoteError};
    use crate::repo::memory_repo::{MemoryRepository, RemoteMemoryRepository, RepoError};
    use reqwest::blocking::Client;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn store() -> RestRemoteStore {
        store_at("https://project.example.co/")
    }

    fn store_at(url: &str) -> RestRemoteStore {
        RestRemoteStore {
            // Loopback servers must not be routed through an ambient proxy.
            client: Client::builder().no_proxy().build().unwrap(),
            ..RestRemoteStore::new(&RestConfig {
                url: url.to_string(),
                api_key: "anon-key".to_string(),
                table: "memories".to_string(),
                bucket: "memories".to_string(),
            })
        }
    }

    /// One request as seen by the local server.
    struct Received {
        request_line: String,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    }

    impl Received {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).map(String::as_str)
        }
    }

    /// Answers exactly one request on a loopback port with `status` and `body`.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Received>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = HashMap::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
            }
            let length = headers
                .get("content-length")
                .map_or(0, |value| value.parse::<usize>().unwrap());
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();

            Received {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: request_body,
            }
        });
        (base_url, handle)
    }

    #[test]
    fn urls_follow_table_and_storage_layout() {
        let store = store();
        assert_eq!(
            store.select_url(),
            "https://project.example.co/rest/v1/memories?select=id,title,date,description,image_url&order=date.asc"
        );
        assert_eq!(
            store.object_url("1683000000000.jpg"),
            "https://project.example.co/storage/v1/object/memories/1683000000000.jpg"
        );
        assert_eq!(
            store.public_url("1683000000000.jpg"),
            "https://project.example.co/storage/v1/object/public/memories/1683000000000.jpg"
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = RestConfig {
            url: "https://project.example.co".to_string(),
            api_key: "secret-key".to_string(),
            table: "memories".to_string(),
            bucket: "memories".to_string(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn error_message_prefers_json_message_field() {
        let body = r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#;
        assert_eq!(
            error_message(body, StatusCode::CONFLICT),
            "The resource already exists"
        );
        assert_eq!(
            error_message(r#"{"error":"Bucket not found"}"#, StatusCode::NOT_FOUND),
            "Bucket not found"
        );
        assert_eq!(error_message("", StatusCode::BAD_GATEWAY), "Bad Gateway");
    }

    #[test]
    fn rows_decode_from_table_response() {
        let body = r#"[{"id":12,"title":"Crawling","date":"2023-05-02","description":"...","image_url":"https://x/y.jpg"}]"#;
        let rows: Vec<MemoryRow> = serde_json::from_str(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 12);
        assert_eq!(rows[0].date, "2023-05-02");
    }

    #[test]
    fn select_requests_ordered_columns_and_decodes_rows() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"[{"id":4,"title":"First Steps","date":"2023-03-20","description":"d","image_url":"https://x/4.jpg"}]"#,
        );

        let rows = store_at(&base_url).select_ordered_by_date().unwrap();
        let received = server.join().unwrap();

        assert_eq!(
            received.request_line,
            "GET /rest/v1/memories?select=id,title,date,description,image_url&order=date.asc HTTP/1.1"
        );
        assert_eq!(received.header("apikey"), Some("anon-key"));
        assert_eq!(received.header("authorization"), Some("Bearer anon-key"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "First Steps");
    }

    #[test]
    fn insert_posts_row_without_id_and_asks_for_minimal_return() {
        let (base_url, server) = serve_once("201 Created", "");
        let row = NewMemoryRow {
            title: "Crawling".to_string(),
            date: "2023-05-02".to_string(),
            description: "Across the room.".to_string(),
            image_url: "https://x/1683000000000.jpg".to_string(),
        };

        store_at(&base_url).insert(&row).unwrap();
        let received = server.join().unwrap();

        assert_eq!(received.request_line, "POST /rest/v1/memories HTTP/1.1");
        assert_eq!(received.header("prefer"), Some("return=minimal"));
        assert_eq!(received.header("content-type"), Some("application/json"));
        assert_eq!(received.header("authorization"), Some("Bearer anon-key"));
        let sent: serde_json::Value = serde_json::from_slice(&received.body).unwrap();
        assert!(sent.get("id").is_none());
        assert_eq!(sent["title"], "Crawling");
        assert_eq!(sent["date"], "2023-05-02");
        assert_eq!(sent["image_url"], "https://x/1683000000000.jpg");
    }

    #[test]
    fn upload_sends_bytes_without_upsert() {
        let (base_url, server) = serve_once("200 OK", r#"{"Key":"memories/1683000000000.jpg"}"#);

        store_at(&base_url)
            .upload("1683000000000.jpg", &[0xff, 0xd8, 0xff], "image/jpeg")
            .unwrap();
        let received = server.join().unwrap();

        assert_eq!(
            received.request_line,
            "POST /storage/v1/object/memories/1683000000000.jpg HTTP/1.1"
        );
        assert_eq!(received.header("x-upsert"), Some("false"));
        assert_eq!(received.header("content-type"), Some("image/jpeg"));
        assert_eq!(received.header("apikey"), Some("anon-key"));
        assert_eq!(received.body, vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn upload_of_existing_key_is_a_conflict() {
        let (base_url, server) = serve_once(
            "409 Conflict",
            r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#,
        );

        let err = store_at(&base_url)
            .upload("1683000000000.jpg", &[1], "image/jpeg")
            .unwrap_err();
        server.join().unwrap();

        match err {
            RemoteError::Conflict(key) => assert_eq!(key, "1683000000000.jpg"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_select_surfaces_as_read_error() {
        let (base_url, server) = serve_once("503 Service Unavailable", r#"{"message":"down"}"#);
        let err = store_at(&base_url).select_ordered_by_date().unwrap_err();
        server.join().unwrap();
        match err {
            RemoteError::Http { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "down");
            }
            other => panic!("unexpected error: {other}"),
        }

        let (base_url, server) = serve_once("503 Service Unavailable", r#"{"message":"down"}"#);
        let store = store_at(&base_url);
        let repository = RemoteMemoryRepository::new(store.clone(), store);
        let err = repository.list_all().unwrap_err();
        server.join().unwrap();
        assert!(matches!(
            err,
            RepoError::RemoteRead(RemoteError::Http { status: 503, .. })
        ));
    }

    #[test]
    fn malformed_select_body_is_invalid_data() {
        let (base_url, server) = serve_once("200 OK", r#"{"not":"a list"}"#);

        let err = store_at(&base_url).select_ordered_by_date().unwrap_err();
        server.join().unwrap();

        match err {
            RemoteError::InvalidData(message) => assert!(message.starts_with("memories response:")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
