use super::dto::{ModelRecord, StreamInfo};
use super::error::ApiError;
use super::urls::*;
use super::DashboardApi;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// 后端 REST API 客户端
///
/// 每个请求都带 JSON Content-Type 和超时，不做重试。
pub struct ApiClient {
    client: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl ApiClient {
    /// 创建客户端
    ///
    /// # 参数
    ///
    /// * `base_url` - 后端地址（如 http://127.0.0.1:8008）
    /// * `timeout` - 普通请求超时
    /// * `probe_timeout` - 连接测试超时
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent("streamdash/0.1")
            .build()
            .map_err(|e| ApiError::from_reqwest(e, &base_url))?;
        Ok(Self {
            client,
            base_url,
            probe_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// 发送请求；非 2xx 统一转成 ApiError::Status
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, &self.base_url))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.url(path);
        let resp = self.send(self.client.get(&url).query(query)).await?;
        let value = resp
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        info!("{} GET [{}]", self, url);
        Ok(value)
    }
}

/// 非数组响应按空列表处理
fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// 逐条解析，解析失败的记录跳过
fn parse_list<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    as_list(value)
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("skip malformed {} record: {}", what, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl DashboardApi for ApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_collection(&self, endpoint: Endpoint) -> Result<Vec<Value>, ApiError> {
        Ok(as_list(self.get_json(endpoint.path(), &[]).await?))
    }

    async fn streams(&self) -> Result<Vec<StreamInfo>, ApiError> {
        let value = self.get_json(PATH_STREAMS, &[]).await?;
        Ok(parse_list(value, "stream"))
    }

    async fn models(&self) -> Result<Vec<ModelRecord>, ApiError> {
        let value = self.get_json(PATH_MODELS, &[]).await?;
        Ok(parse_list(value, "model"))
    }

    async fn create_model(&self, record: &ModelRecord) -> Result<(), ApiError> {
        let url = self.url(PATH_MODELS);
        self.send(self.client.post(&url).json(record)).await?;
        info!("{} POST [{}] id={}", self, url, record.id);
        Ok(())
    }

    async fn update_model(&self, record: &ModelRecord) -> Result<(), ApiError> {
        let url = self.url(PATH_MODELS);
        self.send(self.client.put(&url).json(record)).await?;
        info!("{} PUT [{}] id={}", self, url, record.id);
        Ok(())
    }

    async fn delete_model(&self, asset_id: &str) -> Result<(), ApiError> {
        let url = self.url(PATH_MODELS);
        self.send(self.client.delete(&url).query(&[("asset_id", asset_id)]))
            .await?;
        info!("{} DELETE [{}] asset_id={}", self, url, asset_id);
        Ok(())
    }

    async fn stream_sample_values(
        &self,
        stream_id: &str,
        start: &str,
        end: &str,
        intervals: u32,
    ) -> Result<Value, ApiError> {
        self.get_json(
            PATH_STREAM_SAMPLE_VALUES,
            &[
                ("stream_id", stream_id.to_string()),
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("intervals", intervals.to_string()),
            ],
        )
        .await
    }

    async fn asset_values(
        &self,
        asset_id: &str,
        start: &str,
        end: &str,
        count: u32,
    ) -> Result<Value, ApiError> {
        self.get_json(
            PATH_ASSET_VALUES,
            &[
                ("asset_id", asset_id.to_string()),
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    async fn test_connection(&self) -> Result<(), ApiError> {
        let url = self.url(PATH_STREAMS);
        self.send(self.client.get(&url).timeout(self.probe_timeout))
            .await?;
        info!("{} connection ok [{}]", self, url);
        Ok(())
    }
}

impl std::fmt::Display for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<ApiClient [{}]>", self.base_url)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<ApiClient [{}]>", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::mpsc as std_mpsc;
    use std::thread;
    use tiny_http::{Header, Response, Server};

    struct Seen {
        method: String,
        url: String,
        content_type: Option<String>,
        body: String,
    }

    /// 起一个只应答一次的本地服务
    fn serve_once(status: u16, body: &'static str) -> (String, std_mpsc::Receiver<Seen>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let (tx, rx) = std_mpsc::channel();
        thread::spawn(move || {
            if let Ok(mut request) = server.recv() {
                let mut payload = String::new();
                let _ = request.as_reader().read_to_string(&mut payload);
                let content_type = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_string());
                let _ = tx.send(Seen {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    content_type,
                    body: payload,
                });
                let resp = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json").unwrap(),
                    );
                let _ = request.respond(resp);
            }
        });
        (format!("http://{}", addr), rx)
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn streams_are_parsed_with_json_header() {
        let (base, seen) = serve_once(
            200,
            r#"[{"id":"s1","name":"Flow","description":"inlet"},{"id":"s2","name":"","description":""}]"#,
        );
        let streams = client(&base).streams().await.unwrap();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].name, "Flow");
        assert_eq!(streams[1].display_name(), "s2");

        let seen = seen.recv().unwrap();
        assert_eq!(seen.method, "GET");
        assert_eq!(seen.url, "/connect/streams");
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn non_array_collection_becomes_empty() {
        let (base, _seen) = serve_once(200, r#"{"detail":"odd"}"#);
        let rows = client(&base)
            .list_collection(Endpoint::AssetTypes)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let (base, _seen) = serve_once(500, r#"{"detail":"Failed to fetch models"}"#);
        let err = client(&base).models().await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("Failed to fetch models"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_sends_asset_id_query() {
        let (base, seen) = serve_once(200, r#"{"status":"ok"}"#);
        client(&base).delete_model("pump-1").await.unwrap();
        let seen = seen.recv().unwrap();
        assert_eq!(seen.method, "DELETE");
        assert_eq!(seen.url, "/connect/models?asset_id=pump-1");
    }

    #[tokio::test]
    async fn create_posts_json_body() {
        let (base, seen) = serve_once(200, r#"{"status":"ok"}"#);
        let record = ModelRecord {
            id: "m1".to_string(),
            name: "Pump".to_string(),
            target: vec!["t1".to_string()],
            ..Default::default()
        };
        client(&base).create_model(&record).await.unwrap();
        let seen = seen.recv().unwrap();
        assert_eq!(seen.method, "POST");
        assert_eq!(seen.url, "/connect/models");
        let body: Value = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(body["id"], "m1");
        assert_eq!(body["target"], serde_json::json!(["t1"]));
    }

    #[tokio::test]
    async fn sample_values_carry_window_params() {
        let (base, seen) = serve_once(200, "[]");
        let v = client(&base)
            .stream_sample_values("s1", "2024-01-01T00:00:00.000Z", "2024-01-01T01:00:00.000Z", 100)
            .await
            .unwrap();
        assert_eq!(v, serde_json::json!([]));
        let seen = seen.recv().unwrap();
        assert!(seen.url.starts_with("/connect/stream_sample_values?stream_id=s1&start="));
        assert!(seen.url.ends_with("&intervals=100"));
    }

    #[tokio::test]
    async fn refused_connection_is_classified() {
        // 先占用再释放端口，得到一个大概率无人监听的地址
        let addr = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap()
        };
        let base = format!("http://{}", addr);
        let err = client(&base).test_connection().await.unwrap_err();
        assert!(err.is_connect(), "unexpected error: {:?}", err);
    }
}
