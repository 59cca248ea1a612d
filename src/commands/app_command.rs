use crate::api::{Endpoint, ModelRecord};
use crate::models::DialogMode;
use crate::series::{ModelRequest, StreamRequest};

/// 列表数据的接收方，各视图各自持有一份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumer {
    ModelsPage,
    StreamSeries,
    ModelSeries,
}

/// 发给后台 Actor 的请求
#[derive(Debug, Clone)]
pub enum AppCommand {
    FetchCollection {
        endpoint: Endpoint,
    },
    FetchModels {
        consumer: Consumer,
    },
    FetchStreams {
        consumer: Consumer,
    },
    SaveModel {
        mode: DialogMode,
        record: ModelRecord,
    },
    DeleteModel {
        asset_id: String,
    },
    FetchStreamSeries(StreamRequest),
    FetchModelSeries(ModelRequest),
    TestConnection,
    Help,
    Unknown(String),
}
