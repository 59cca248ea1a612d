use super::range::Window;
use crate::api::dto::number_of;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// 无数据时生成的横轴刻度数
pub const FALLBACK_LABELS: usize = 20;

/// 整理后的多序列数据，序列按请求/响应顺序排列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesData {
    pub categories: Vec<String>,
    pub series: Vec<(String, Vec<f64>)>,
}

impl SeriesData {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|(_, v)| v.is_empty())
    }

    pub fn values(&self, key: &str) -> &[f64] {
        self.series
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }
}

fn value_of(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// 单个采样点：[ts, v] 或 {timestamp, value}
fn sample_point(item: &Value) -> (Option<Value>, f64) {
    match item {
        Value::Array(pair) => (
            pair.first().cloned(),
            pair.get(1).map(value_of).unwrap_or(0.0),
        ),
        Value::Object(map) => {
            let ts = map.get("timestamp").or_else(|| map.get("Timestamp")).cloned();
            let v = map
                .get("value")
                .or_else(|| map.get("Value"))
                .map(value_of)
                .unwrap_or(0.0);
            (ts, v)
        }
        _ => (None, 0.0),
    }
}

pub fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .map(|n| n.and_utc())
            }),
        // 数字按毫秒时间戳处理
        other => number_of(other).and_then(DateTime::from_timestamp_millis),
    }
}

pub fn time_label_in<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%H:%M").to_string()
}

/// 用收到的时间戳生成横轴标签；无法解析的点沿用窗口结束时间
fn labels_from<Tz: TimeZone>(stamps: &[Option<Value>], window: &Window, tz: &Tz) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    stamps
        .iter()
        .map(|ts| {
            let t = ts.as_ref().and_then(parse_timestamp).unwrap_or(window.end);
            time_label_in(&t, tz)
        })
        .collect()
}

/// 窗口内均匀分布的刻度
pub fn fallback_labels_in<Tz: TimeZone>(window: &Window, tz: &Tz) -> Vec<String>
where
    Tz::Offset: std::fmt::Display,
{
    let span = (window.end - window.start).num_milliseconds();
    let last = FALLBACK_LABELS as i64 - 1;
    (0..=last)
        .map(|i| {
            let t = window.start + chrono::Duration::milliseconds(span * i / last);
            time_label_in(&t, tz)
        })
        .collect()
}

/// 流采样结果整理：每个流一个响应，顺序与选择顺序一致
pub fn from_stream_samples_in<Tz: TimeZone>(
    results: &[(String, Value)],
    window: &Window,
    tz: &Tz,
) -> SeriesData
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = SeriesData::default();
    for (stream_id, body) in results {
        let points: Vec<(Option<Value>, f64)> = match body {
            Value::Array(items) => items.iter().map(sample_point).collect(),
            _ => Vec::new(),
        };
        if out.categories.is_empty() && !points.is_empty() {
            let stamps: Vec<Option<Value>> = points.iter().map(|(t, _)| t.clone()).collect();
            out.categories = labels_from(&stamps, window, tz);
        }
        out.series
            .push((stream_id.clone(), points.into_iter().map(|(_, v)| v).collect()));
    }
    if out.categories.is_empty() {
        out.categories = fallback_labels_in(window, tz);
    }
    out
}

pub fn from_stream_samples(results: &[(String, Value)], window: &Window) -> SeriesData {
    from_stream_samples_in(results, window, &Local)
}

/// 资产值整理：响应是 { 流名: [{timestamp, value}] }
pub fn from_asset_values_in<Tz: TimeZone>(body: &Value, window: &Window, tz: &Tz) -> SeriesData
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = SeriesData::default();
    if let Value::Object(map) = body {
        for (key, items) in map {
            let points: Vec<(Option<Value>, f64)> = match items {
                Value::Array(items) => items.iter().map(sample_point).collect(),
                _ => Vec::new(),
            };
            if out.categories.is_empty() && !points.is_empty() {
                let stamps: Vec<Option<Value>> = points.iter().map(|(t, _)| t.clone()).collect();
                out.categories = labels_from(&stamps, window, tz);
            }
            out.series
                .push((key.clone(), points.into_iter().map(|(_, v)| v).collect()));
        }
    }
    if out.categories.is_empty() {
        out.categories = fallback_labels_in(window, tz);
    }
    out
}

pub fn from_asset_values(body: &Value, window: &Window) -> SeriesData {
    from_asset_values_in(body, window, &Local)
}
