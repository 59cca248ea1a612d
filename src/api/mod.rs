pub mod client;
pub mod dto;
pub mod error;
pub mod urls;

pub use client::ApiClient;
pub use dto::{ModelRecord, StreamInfo};
pub use error::ApiError;
pub use urls::Endpoint;

use async_trait::async_trait;
use serde_json::Value;

/// 仪表盘用到的后端操作
#[async_trait]
pub trait DashboardApi: Send + Sync {
    fn base_url(&self) -> &str;

    async fn list_collection(&self, endpoint: Endpoint) -> Result<Vec<Value>, ApiError>;

    async fn streams(&self) -> Result<Vec<StreamInfo>, ApiError>;

    async fn models(&self) -> Result<Vec<ModelRecord>, ApiError>;

    async fn create_model(&self, record: &ModelRecord) -> Result<(), ApiError>;

    async fn update_model(&self, record: &ModelRecord) -> Result<(), ApiError>;

    async fn delete_model(&self, asset_id: &str) -> Result<(), ApiError>;

    async fn stream_sample_values(
        &self,
        stream_id: &str,
        start: &str,
        end: &str,
        intervals: u32,
    ) -> Result<Value, ApiError>;

    async fn asset_values(
        &self,
        asset_id: &str,
        start: &str,
        end: &str,
        count: u32,
    ) -> Result<Value, ApiError>;

    async fn test_connection(&self) -> Result<(), ApiError>;
}
