pub mod chart;
pub mod palette;
pub mod range;
pub mod reshape;

pub use chart::{AxisMode, ChartKind, ChartSpec};
pub use range::{TimeRange, Window, DEFAULT_POINT_COUNT};
pub use reshape::SeriesData;

use crate::api::{ModelRecord, StreamInfo};
use crate::picker::{self, PickerState};
use chrono::{DateTime, Utc};

/// 流采样请求
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub generation: u64,
    pub stream_ids: Vec<String>,
    pub window: Window,
    pub intervals: u32,
}

/// 模型资产值请求
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub generation: u64,
    pub asset_id: String,
    pub window: Window,
    pub count: u32,
}

/// Timeseries 视图状态
///
/// 每次发请求前 generation 加一，只接受当前 generation 的结果。
#[derive(Debug, Default)]
pub struct StreamPanel {
    pub streams: Vec<StreamInfo>,
    pub selected: Vec<String>,
    pub range: TimeRange,
    pub count: u32,
    pub axis: AxisMode,
    pub kind: ChartKind,
    pub data: SeriesData,
    pub loading: bool,
    pub picker: PickerState,
    pub picker_open: bool,
    generation: u64,
}

impl StreamPanel {
    pub fn new() -> Self {
        Self {
            count: DEFAULT_POINT_COUNT,
            ..Default::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 清空当前曲线并生成新请求；未选择流时不请求
    fn restart(&mut self, now: DateTime<Utc>) -> Option<StreamRequest> {
        self.data = SeriesData::default();
        self.generation += 1;
        if self.selected.is_empty() {
            self.loading = false;
            return None;
        }
        self.loading = true;
        Some(StreamRequest {
            generation: self.generation,
            stream_ids: self.selected.clone(),
            window: self.range.window(now),
            intervals: self.count,
        })
    }

    pub fn toggle_stream(&mut self, id: &str, now: DateTime<Utc>) -> Option<StreamRequest> {
        picker::toggle(&mut self.selected, id);
        self.restart(now)
    }

    pub fn set_range(&mut self, range: TimeRange, now: DateTime<Utc>) -> Option<StreamRequest> {
        self.range = range;
        self.restart(now)
    }

    pub fn set_count(&mut self, count: u32, now: DateTime<Utc>) -> Option<StreamRequest> {
        self.count = count;
        self.restart(now)
    }

    pub fn refresh(&mut self, now: DateTime<Utc>) -> Option<StreamRequest> {
        self.restart(now)
    }

    /// 流列表刷新后，打开中的选择框光标不能越界
    pub fn set_streams(&mut self, streams: Vec<StreamInfo>) {
        self.streams = streams;
        let len = picker::filter_items(&self.streams, &self.picker.search, &self.selected).len();
        self.picker.clamp(len);
    }

    pub fn chart(&self) -> ChartSpec {
        chart::stream_chart(&self.selected, &self.streams, &self.data, self.axis)
    }

    pub fn selection_text(&self) -> String {
        picker::display_text(&self.streams, &self.selected, "Select streams...")
    }

    /// 过期结果返回 false 并丢弃
    pub fn apply(&mut self, generation: u64, data: SeriesData) -> bool {
        if generation != self.generation {
            return false;
        }
        self.data = data;
        self.loading = false;
        true
    }
}

/// Model TimeSeries 视图状态
#[derive(Debug, Default)]
pub struct ModelPanel {
    pub models: Vec<ModelRecord>,
    pub streams: Vec<StreamInfo>,
    pub selected: Option<String>,
    pub range: TimeRange,
    /// 输入框里的取点数
    pub count: u32,
    /// 最近一次请求实际使用的取点数
    pub requested_count: u32,
    pub axis: AxisMode,
    pub kind: ChartKind,
    pub data: SeriesData,
    pub loading: bool,
    pub cursor: usize,
    pub list_open: bool,
    generation: u64,
}

impl ModelPanel {
    pub fn new() -> Self {
        Self {
            count: DEFAULT_POINT_COUNT,
            ..Default::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn restart(&mut self, count: u32, now: DateTime<Utc>) -> Option<ModelRequest> {
        self.data = SeriesData::default();
        self.generation += 1;
        let Some(asset_id) = self.selected.clone() else {
            self.loading = false;
            return None;
        };
        self.loading = true;
        self.requested_count = count;
        Some(ModelRequest {
            generation: self.generation,
            asset_id,
            window: self.range.window(now),
            count,
        })
    }

    /// 选择模型时按时间窗口的推荐点数取数
    pub fn select_model(&mut self, id: &str, now: DateTime<Utc>) -> Option<ModelRequest> {
        self.selected = Some(id.to_string());
        self.restart(self.range.recommended_count(), now)
    }

    pub fn set_range(&mut self, range: TimeRange, now: DateTime<Utc>) -> Option<ModelRequest> {
        self.range = range;
        self.restart(range.recommended_count(), now)
    }

    /// 手动改点数时使用输入值
    pub fn set_count(&mut self, count: u32, now: DateTime<Utc>) -> Option<ModelRequest> {
        self.count = count;
        self.restart(count, now)
    }

    pub fn refresh(&mut self, now: DateTime<Utc>) -> Option<ModelRequest> {
        let count = if self.requested_count > 0 {
            self.requested_count
        } else {
            self.range.recommended_count()
        };
        self.restart(count, now)
    }

    pub fn apply(&mut self, generation: u64, data: SeriesData) -> bool {
        if generation != self.generation {
            return false;
        }
        self.data = data;
        self.loading = false;
        true
    }

    pub fn selected_model(&self) -> Option<&ModelRecord> {
        let id = self.selected.as_ref()?;
        self.models.iter().find(|m| &m.id == id)
    }

    /// 下拉框显示文本
    pub fn selection_text(&self) -> String {
        match (&self.selected, self.selected_model()) {
            (None, _) => "Select a model...".to_string(),
            (Some(id), None) => id.clone(),
            (Some(id), Some(m)) => {
                if m.name.is_empty() {
                    id.clone()
                } else {
                    m.name.clone()
                }
            }
        }
    }

    pub fn chart(&self) -> ChartSpec {
        chart::model_chart(self.selected_model(), &self.streams, &self.data, self.axis)
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.models.len() {
            self.cursor += 1;
        }
    }

    pub fn model_at_cursor(&self) -> Option<String> {
        self.models.get(self.cursor).map(|m| m.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn loaded() -> SeriesData {
        SeriesData {
            categories: vec!["08:00".to_string()],
            series: vec![("s1".to_string(), vec![1.0])],
        }
    }

    #[test]
    fn range_change_clears_series_before_fetch_resolves() {
        let mut p = StreamPanel::new();
        let req = p.toggle_stream("s1", now()).unwrap();
        assert!(p.apply(req.generation, loaded()));
        assert!(!p.data.series.is_empty());

        let req = p.set_range(TimeRange::OneDay, now()).unwrap();
        assert!(p.data.series.is_empty());
        assert!(p.loading);
        assert_eq!(req.window.params().0, "2024-04-30T08:00:00.000Z");
        assert_eq!(req.intervals, 1000);
    }

    #[test]
    fn count_change_clears_series_and_uses_new_count() {
        let mut p = StreamPanel::new();
        let req = p.toggle_stream("s1", now()).unwrap();
        p.apply(req.generation, loaded());
        let req = p.set_count(200, now()).unwrap();
        assert!(p.data.series.is_empty());
        assert_eq!(req.intervals, 200);
    }

    #[test]
    fn stale_stream_response_is_dropped() {
        let mut p = StreamPanel::new();
        let first = p.toggle_stream("s1", now()).unwrap();
        let second = p.toggle_stream("s2", now()).unwrap();
        assert_eq!(second.stream_ids, vec!["s1", "s2"]);
        assert!(!p.apply(first.generation, loaded()));
        assert!(p.data.series.is_empty());
        assert!(p.loading);
        assert!(p.apply(second.generation, loaded()));
        assert!(!p.loading);
    }

    #[test]
    fn deselecting_everything_issues_no_request() {
        let mut p = StreamPanel::new();
        p.toggle_stream("s1", now());
        assert!(p.toggle_stream("s1", now()).is_none());
        assert!(!p.loading);
        assert!(p.set_range(TimeRange::FiveMinutes, now()).is_none());
    }

    #[test]
    fn model_count_follows_range_unless_set_explicitly() {
        let mut p = ModelPanel::new();
        assert!(p.set_range(TimeRange::EightHours, now()).is_none());

        let req = p.select_model("m1", now()).unwrap();
        assert_eq!(req.count, 1000);
        assert_eq!(req.asset_id, "m1");

        let req = p.set_range(TimeRange::FiveMinutes, now()).unwrap();
        assert_eq!(req.count, 100);

        let req = p.set_count(5000, now()).unwrap();
        assert_eq!(req.count, 5000);
        let req = p.refresh(now()).unwrap();
        assert_eq!(req.count, 5000);

        let req = p.set_range(TimeRange::OneWeek, now()).unwrap();
        assert_eq!(req.count, 5000);
        let req = p.set_range(TimeRange::TenMinutes, now()).unwrap();
        assert_eq!(req.count, 200);
    }

    #[test]
    fn model_switch_clears_and_drops_stale() {
        let mut p = ModelPanel::new();
        let a = p.select_model("m1", now()).unwrap();
        let b = p.select_model("m2", now()).unwrap();
        assert!(!p.apply(a.generation, loaded()));
        assert!(p.data.series.is_empty());
        assert!(p.apply(b.generation, loaded()));
        assert_eq!(p.data, loaded());
    }

    #[test]
    fn model_selection_text_prefers_name() {
        let mut p = ModelPanel::new();
        assert_eq!(p.selection_text(), "Select a model...");
        p.models = vec![ModelRecord {
            id: "m1".to_string(),
            name: "Pump".to_string(),
            ..Default::default()
        }];
        p.select_model("m1", now());
        assert_eq!(p.selection_text(), "Pump");
        p.select_model("gone", now());
        assert_eq!(p.selection_text(), "gone");
    }
}
