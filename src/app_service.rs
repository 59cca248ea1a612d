use crate::api::DashboardApi;
use crate::app_state::AppEvent;
use crate::commands::{AppCommand, Consumer};
use crate::models::DialogMode;
use crate::series::{reshape, ModelRequest, StreamRequest};
use futures::future::join_all;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const HELP_TEXT: &str = "可用命令: endpoint <types|streams|asset_types|assets> | refresh | test | range <5min|10min|30min|1h|8h|24h|1week> | count <n> | theme <light|dark|toggle> | axis <single|multi> | chart <line|spark> | model new | model delete | help | quit";

/// 处理一条后台请求，结果通过事件通道返回
pub async fn handle(
    api: Arc<dyn DashboardApi>,
    cmd: AppCommand,
    tx: mpsc::UnboundedSender<AppEvent>,
) {
    match cmd {
        AppCommand::FetchCollection { endpoint } => {
            let result = api.list_collection(endpoint).await;
            if let Err(e) = &result {
                warn!("fetch {} failed: {}", endpoint.path(), e);
            }
            let _ = tx.send(AppEvent::Collection { endpoint, result });
        }
        AppCommand::FetchModels { consumer } => {
            let result = api.models().await;
            if let Err(e) = &result {
                warn!("fetch models for {:?} failed: {}", consumer, e);
            }
            let _ = tx.send(AppEvent::Models { consumer, result });
        }
        AppCommand::FetchStreams { consumer } => {
            let result = api.streams().await;
            if let Err(e) = &result {
                warn!("fetch streams for {:?} failed: {}", consumer, e);
            }
            let _ = tx.send(AppEvent::Streams { consumer, result });
        }
        AppCommand::SaveModel { mode, record } => {
            let result = match mode {
                DialogMode::Create => api.create_model(&record).await,
                DialogMode::Edit => api.update_model(&record).await,
            };
            match &result {
                Ok(()) => {
                    info!("model {} saved ({:?})", record.id, mode);
                    let _ = tx.send(AppEvent::Log(format!("✓ 模型已保存: {}", record.id)));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("✗ 保存模型失败: {}", e)));
                }
            }
            let _ = tx.send(AppEvent::ModelSaved(result));
        }
        AppCommand::DeleteModel { asset_id } => {
            let result = api.delete_model(&asset_id).await;
            match &result {
                Ok(()) => {
                    info!("model {} deleted", asset_id);
                    let _ = tx.send(AppEvent::Log(format!("✓ 模型已删除: {}", asset_id)));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("✗ 删除模型失败: {}", e)));
                }
            }
            let _ = tx.send(AppEvent::ModelDeleted(result));
        }
        AppCommand::FetchStreamSeries(req) => {
            let generation = req.generation;
            let data = fetch_stream_series(api.as_ref(), &req).await;
            let _ = tx.send(AppEvent::StreamSeries { generation, data });
        }
        AppCommand::FetchModelSeries(req) => {
            let generation = req.generation;
            let data = fetch_model_series(api.as_ref(), &req).await;
            let _ = tx.send(AppEvent::ModelSeries { generation, data });
        }
        AppCommand::TestConnection => {
            let result = api.test_connection().await;
            match &result {
                Ok(()) => {
                    let _ = tx.send(AppEvent::Log(format!("✓ 连接成功: {}", api.base_url())));
                }
                Err(e) => {
                    warn!("connection test failed: {}", e);
                    let _ = tx.send(AppEvent::Error(format!("✗ 连接失败: {}", e)));
                }
            }
            let _ = tx.send(AppEvent::ConnectionTested(result));
        }
        AppCommand::Help => {
            let _ = tx.send(AppEvent::Message(HELP_TEXT.to_string()));
        }
        AppCommand::Unknown(msg) => {
            let _ = tx.send(AppEvent::Error(format!("⚠ {}", msg)));
        }
    }
}

/// 各流并发取样；单个流失败时该流为空序列
async fn fetch_stream_series(api: &dyn DashboardApi, req: &StreamRequest) -> reshape::SeriesData {
    let (start, end) = req.window.params();
    let futures = req.stream_ids.iter().map(|id| {
        let (start, end) = (start.clone(), end.clone());
        async move {
            let body = match api
                .stream_sample_values(id, &start, &end, req.intervals)
                .await
            {
                Ok(v) => v,
                Err(e) => {
                    warn!("sample values for stream {} failed: {}", id, e);
                    Value::Array(Vec::new())
                }
            };
            (id.clone(), body)
        }
    });
    let results = join_all(futures).await;
    reshape::from_stream_samples(&results, &req.window)
}

async fn fetch_model_series(api: &dyn DashboardApi, req: &ModelRequest) -> reshape::SeriesData {
    let (start, end) = req.window.params();
    let body = match api.asset_values(&req.asset_id, &start, &end, req.count).await {
        Ok(v) => v,
        Err(e) => {
            warn!("asset values for {} failed: {}", req.asset_id, e);
            Value::Object(Default::default())
        }
    };
    reshape::from_asset_values(&body, &req.window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Endpoint, ModelRecord, StreamInfo};
    use crate::series::TimeRange;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Mutex;

    /// 记录调用并返回预设结果的假后端
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        fail_streams: Vec<String>,
        fail_saves: bool,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn record(&self, call: String) {
            if let Ok(mut c) = self.calls.lock() {
                c.push(call);
            }
        }
    }

    #[async_trait]
    impl DashboardApi for FakeApi {
        fn base_url(&self) -> &str {
            "http://fake"
        }

        async fn list_collection(&self, endpoint: Endpoint) -> Result<Vec<Value>, ApiError> {
            self.record(format!("list {}", endpoint.path()));
            Ok(vec![json!({"id": 1})])
        }

        async fn streams(&self) -> Result<Vec<StreamInfo>, ApiError> {
            Err(ApiError::Connect("http://fake".to_string()))
        }

        async fn models(&self) -> Result<Vec<ModelRecord>, ApiError> {
            Ok(vec![ModelRecord {
                id: "m1".to_string(),
                ..Default::default()
            }])
        }

        async fn create_model(&self, record: &ModelRecord) -> Result<(), ApiError> {
            self.record(format!("create {}", record.id));
            if self.fail_saves {
                return Err(ApiError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }

        async fn update_model(&self, record: &ModelRecord) -> Result<(), ApiError> {
            self.record(format!("update {}", record.id));
            Ok(())
        }

        async fn delete_model(&self, asset_id: &str) -> Result<(), ApiError> {
            self.record(format!("delete {}", asset_id));
            Ok(())
        }

        async fn stream_sample_values(
            &self,
            stream_id: &str,
            _start: &str,
            _end: &str,
            intervals: u32,
        ) -> Result<Value, ApiError> {
            self.record(format!("sample {} {}", stream_id, intervals));
            if self.fail_streams.iter().any(|s| s == stream_id) {
                return Err(ApiError::Timeout);
            }
            Ok(json!([
                ["2024-05-01T07:00:00Z", 1.5],
                ["2024-05-01T07:30:00Z", "bad"]
            ]))
        }

        async fn asset_values(
            &self,
            asset_id: &str,
            _start: &str,
            _end: &str,
            count: u32,
        ) -> Result<Value, ApiError> {
            self.record(format!("asset {} {}", asset_id, count));
            Ok(json!({
                "s1": [{"timestamp": "2024-05-01T07:00:00Z", "value": 2}],
            }))
        }

        async fn test_connection(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    async fn run(api: Arc<FakeApi>, cmd: AppCommand) -> Vec<AppEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle(api, cmd, tx).await;
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        events
    }

    fn window() -> crate::series::Window {
        TimeRange::OneHour.window(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn failed_stream_yields_empty_series() {
        let api = Arc::new(FakeApi {
            fail_streams: vec!["s2".to_string()],
            ..Default::default()
        });
        let req = StreamRequest {
            generation: 7,
            stream_ids: vec!["s1".to_string(), "s2".to_string()],
            window: window(),
            intervals: 500,
        };
        let events = run(api.clone(), AppCommand::FetchStreamSeries(req)).await;

        let calls = api.calls();
        assert!(calls.contains(&"sample s1 500".to_string()));
        assert!(calls.contains(&"sample s2 500".to_string()));
        match &events[..] {
            [AppEvent::StreamSeries { generation, data }] => {
                assert_eq!(*generation, 7);
                assert_eq!(data.values("s1"), &[1.5, 0.0]);
                assert!(data.values("s2").is_empty());
                assert_eq!(data.categories.len(), 2);
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn model_series_passes_count() {
        let api = Arc::new(FakeApi::default());
        let req = ModelRequest {
            generation: 3,
            asset_id: "m1".to_string(),
            window: window(),
            count: 600,
        };
        let events = run(api.clone(), AppCommand::FetchModelSeries(req)).await;
        assert_eq!(api.calls(), vec!["asset m1 600".to_string()]);
        match &events[..] {
            [AppEvent::ModelSeries { generation: 3, data }] => {
                assert_eq!(data.values("s1"), &[2.0]);
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn save_uses_post_or_put_by_mode() {
        let api = Arc::new(FakeApi::default());
        let record = ModelRecord {
            id: "m9".to_string(),
            ..Default::default()
        };
        run(
            api.clone(),
            AppCommand::SaveModel {
                mode: DialogMode::Create,
                record: record.clone(),
            },
        )
        .await;
        run(
            api.clone(),
            AppCommand::SaveModel {
                mode: DialogMode::Edit,
                record,
            },
        )
        .await;
        assert_eq!(
            api.calls(),
            vec!["create m9".to_string(), "update m9".to_string()]
        );
    }

    #[tokio::test]
    async fn failed_save_reports_error_and_result() {
        let api = Arc::new(FakeApi {
            fail_saves: true,
            ..Default::default()
        });
        let events = run(
            api,
            AppCommand::SaveModel {
                mode: DialogMode::Create,
                record: ModelRecord::default(),
            },
        )
        .await;
        assert!(matches!(events[0], AppEvent::Error(_)));
        assert!(matches!(events[1], AppEvent::ModelSaved(Err(_))));
    }

    #[tokio::test]
    async fn list_results_are_tagged_with_consumer() {
        let api = Arc::new(FakeApi::default());
        let events = run(
            api.clone(),
            AppCommand::FetchStreams {
                consumer: Consumer::StreamSeries,
            },
        )
        .await;
        assert!(matches!(
            events[..],
            [AppEvent::Streams {
                consumer: Consumer::StreamSeries,
                result: Err(_)
            }]
        ));

        let events = run(
            api,
            AppCommand::FetchCollection {
                endpoint: Endpoint::Assets,
            },
        )
        .await;
        match &events[..] {
            [AppEvent::Collection { endpoint, result }] => {
                assert_eq!(*endpoint, Endpoint::Assets);
                assert_eq!(result.as_ref().map(|r| r.len()).unwrap_or(0), 1);
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }
}
