use crate::utils::error::{ProbeError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// 帶有 bearer token 的 HTTP 客戶端，綁定一個 base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

/// 一次請求的完整回應（不論狀態碼）
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Parsed JSON body, or an `UnexpectedStatus` error when the status is not 2xx.
    pub fn into_json(self) -> Result<Value> {
        if !self.is_success() {
            return Err(self.into_status_error());
        }
        self.json()
    }

    pub fn into_status_error(self) -> ProbeError {
        let mut body = self.body;
        if body.len() > 200 {
            let cut = (0..=200).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
            body.truncate(cut);
            body.push('…');
        }
        ProbeError::UnexpectedStatus {
            url: self.url,
            status: self.status,
            body,
        }
    }
}

/// 平行抓取中單一端點的結果
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub path: String,
    pub payload: std::result::Result<Value, String>,
    pub elapsed: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header(ACCEPT, "application/json")
            .timeout(self.timeout);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request
    }

    async fn send(&self, request: RequestBuilder, url: String) -> Result<ApiResponse> {
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let elapsed = started.elapsed();

        tracing::debug!("🌐 {} -> {} ({:?}, {} bytes)", url, status, elapsed, body.len());

        Ok(ApiResponse {
            url,
            status,
            body,
            elapsed,
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(self.request(Method::GET, path), self.url(path)).await
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.get(path).await?.into_json()
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<ApiResponse> {
        let request = self
            .request(Method::POST, path)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.send(request, self.url(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(self.request(Method::DELETE, path), self.url(path)).await
    }

    async fn fetch_one(&self, path: &str) -> FetchResult {
        let started = Instant::now();
        let payload = match self.get_json(path).await {
            Ok(value) => Ok(value),
            Err(e) => Err(e.to_string()),
        };
        FetchResult {
            path: path.to_string(),
            payload,
            elapsed: started.elapsed(),
        }
    }

    /// 依序抓取每個端點
    pub async fn fetch_sequential(&self, paths: &[String]) -> Vec<FetchResult> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            results.push(self.fetch_one(path).await);
        }
        results
    }

    /// 以固定大小的 worker pool 平行抓取，結果依輸入順序回傳
    pub async fn fetch_parallel(&self, paths: &[String], workers: usize) -> Vec<FetchResult> {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks = JoinSet::new();

        for (index, path) in paths.iter().enumerate() {
            let client = self.clone();
            let path = path.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, client.fetch_one(&path).await)
            });
        }

        let mut slots: Vec<Option<FetchResult>> = vec![None; paths.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!("❌ Fetch task aborted: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(paths)
            .map(|(slot, path)| {
                slot.unwrap_or_else(|| FetchResult {
                    path: path.clone(),
                    payload: Err("fetch task did not complete".to_string()),
                    elapsed: Duration::ZERO,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        ApiClient::new(&server.base_url(), token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:4000/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/v1/profile"), "http://localhost:4000/v1/profile");
        assert_eq!(client.url("v1/profile"), "http://localhost:4000/v1/profile");
        assert_eq!(
            client.url("/v1/attendance/summary?month=invalid-date"),
            "http://localhost:4000/v1/attendance/summary?month=invalid-date"
        );
    }

    #[tokio::test]
    async fn test_get_json_sends_bearer_token() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/analytics/overview")
                .header("Authorization", "Bearer secret-token")
                .header("Accept", "application/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"totalEmployees": 12}));
        });

        let client = client_for(&server, Some("secret-token"));
        let value = client.get_json("/v1/analytics/overview").await.unwrap();

        api_mock.assert();
        assert_eq!(value["totalEmployees"], 12);
    }

    #[tokio::test]
    async fn test_get_json_rejects_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/profile");
            then.status(503).body("maintenance");
        });

        let client = client_for(&server, None);
        let err = client.get_json("/v1/profile").await.unwrap_err();

        match err {
            ProbeError::UnexpectedStatus { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_and_delete() {
        let server = MockServer::start();
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/users")
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"name": "Employee A"}));
            then.status(201).json_body(serde_json::json!({"id": "u-1"}));
        });
        let remove = server.mock(|when, then| {
            when.method(DELETE).path("/v1/users/u-1");
            then.status(204);
        });

        let client = client_for(&server, Some("t"));
        let created = client
            .post_json("/v1/users", &serde_json::json!({"name": "Employee A"}))
            .await
            .unwrap();
        assert_eq!(created.status, 201);
        assert_eq!(created.json().unwrap()["id"], "u-1");

        let deleted = client.delete("/v1/users/u-1").await.unwrap();
        assert_eq!(deleted.status, 204);

        create.assert();
        remove.assert();
    }

    #[tokio::test]
    async fn test_fetch_parallel_preserves_order() {
        let server = MockServer::start();
        for (path, n) in [("/a", 1), ("/b", 2), ("/c", 3)] {
            server.mock(move |when, then| {
                when.method(GET).path(path);
                then.status(200).json_body(serde_json::json!({"n": n}));
            });
        }
        server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500).json_body(serde_json::json!({"error": "boom"}));
        });

        let client = client_for(&server, None);
        let paths: Vec<String> = ["/a", "/broken", "/b", "/c"].iter().map(|p| p.to_string()).collect();
        let results = client.fetch_parallel(&paths, 2).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].payload.as_ref().unwrap()["n"], 1);
        assert!(results[1].payload.is_err());
        assert_eq!(results[2].payload.as_ref().unwrap()["n"], 2);
        assert_eq!(results[3].path, "/c");
    }
}
