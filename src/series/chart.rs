use super::palette::series_color;
use super::reshape::SeriesData;
use crate::api::{ModelRecord, StreamInfo};

pub const STREAM_CHART_TITLE: &str = "Stream Data Visualization";
pub const MODEL_CHART_TITLE: &str = "Model Asset Data Visualization";

/// 纵轴布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMode {
    #[default]
    Single,
    Multiple,
}

impl AxisMode {
    pub fn toggle(&self) -> AxisMode {
        match self {
            AxisMode::Single => AxisMode::Multiple,
            AxisMode::Multiple => AxisMode::Single,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AxisMode::Single => "Single Axis",
            AxisMode::Multiple => "Multiple Axes",
        }
    }
}

/// 渲染方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Spark,
}

impl ChartKind {
    pub fn toggle(&self) -> ChartKind {
        match self {
            ChartKind::Line => ChartKind::Spark,
            ChartKind::Spark => ChartKind::Line,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Spark => "spark",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub title: String,
    pub opposite: bool,
    pub offset: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub key: String,
    pub name: String,
    pub color: &'static str,
    pub values: Vec<f64>,
    /// 对应 axes 的下标
    pub axis: usize,
}

/// 与绘图库无关的图表描述，两种渲染器共用
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSpec {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<SeriesSpec>,
    pub axes: Vec<AxisSpec>,
}

impl ChartSpec {
    fn title_only(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// 至少一条曲线有数据点；刚清空的选择只有空曲线
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.values.is_empty())
    }

    /// 全部数值的 [min, max]；无数据时为 [0, 1]
    pub fn value_bounds(&self) -> [f64; 2] {
        bounds_of(self.series.iter().flat_map(|s| s.values.iter().copied()))
    }

    /// 折线渲染用的点集：单轴直接用原值，多轴时每条序列归一化到自己的 [i, i+1) 区间
    pub fn plot_points(&self) -> Vec<Vec<(f64, f64)>> {
        let multi = self.axes.len() > 1;
        self.series
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let [lo, hi] = bounds_of(s.values.iter().copied());
                let span = hi - lo;
                s.values
                    .iter()
                    .enumerate()
                    .map(|(x, v)| {
                        let y = if multi {
                            let norm = if span > 0.0 { (v - lo) / span } else { 0.5 };
                            i as f64 + 0.1 + norm * 0.8
                        } else {
                            *v
                        };
                        (x as f64, y)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        if self.axes.len() > 1 {
            [0.0, self.series.len().max(1) as f64]
        } else {
            let [lo, hi] = self.value_bounds();
            if hi > lo {
                [lo, hi]
            } else {
                [lo - 1.0, hi + 1.0]
            }
        }
    }
}

fn bounds_of(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() {
        [lo, hi]
    } else {
        [0.0, 1.0]
    }
}

fn axes_for(names: &[String], mode: AxisMode) -> Vec<AxisSpec> {
    match mode {
        AxisMode::Single => vec![AxisSpec {
            title: "Values".to_string(),
            opposite: false,
            offset: 0,
        }],
        AxisMode::Multiple => names
            .iter()
            .enumerate()
            .map(|(i, name)| AxisSpec {
                title: name.clone(),
                opposite: i % 2 == 1,
                offset: (i / 2) as u16 * 60,
            })
            .collect(),
    }
}

fn assemble(
    title: String,
    keys: Vec<(String, String)>,
    data: &SeriesData,
    mode: AxisMode,
) -> ChartSpec {
    let names: Vec<String> = keys.iter().map(|(_, n)| n.clone()).collect();
    let series = keys
        .into_iter()
        .enumerate()
        .map(|(i, (key, name))| SeriesSpec {
            values: data.values(&key).to_vec(),
            key,
            name,
            color: series_color(i),
            axis: match mode {
                AxisMode::Single => 0,
                AxisMode::Multiple => i,
            },
        })
        .collect();
    ChartSpec {
        title,
        categories: data.categories.clone(),
        series,
        axes: axes_for(&names, mode),
    }
}

/// 流面板：按选择顺序，一条流一条曲线；名称按 id 查找
pub fn stream_chart(
    selected: &[String],
    streams: &[StreamInfo],
    data: &SeriesData,
    mode: AxisMode,
) -> ChartSpec {
    if selected.is_empty() {
        return ChartSpec::title_only(STREAM_CHART_TITLE);
    }
    let keys = selected
        .iter()
        .map(|id| {
            let name = streams
                .iter()
                .find(|s| &s.id == id)
                .map(|s| s.display_name().to_string())
                .unwrap_or_else(|| id.clone());
            (id.clone(), name)
        })
        .collect();
    assemble(STREAM_CHART_TITLE.to_string(), keys, data, mode)
}

/// 模型面板：响应里的每个键一条曲线；名称先按 id 再按 name 查找
pub fn model_chart(
    model: Option<&ModelRecord>,
    streams: &[StreamInfo],
    data: &SeriesData,
    mode: AxisMode,
) -> ChartSpec {
    let Some(model) = model else {
        return ChartSpec::title_only(MODEL_CHART_TITLE);
    };
    if data.series.is_empty() {
        return ChartSpec::title_only(MODEL_CHART_TITLE);
    }
    let model_name = if model.name.is_empty() {
        &model.id
    } else {
        &model.name
    };
    let keys = data
        .series
        .iter()
        .map(|(key, _)| {
            let name = streams
                .iter()
                .find(|s| &s.id == key || &s.name == key)
                .map(|s| s.display_name().to_string())
                .unwrap_or_else(|| key.clone());
            (key.clone(), name)
        })
        .collect();
    assemble(
        format!("Model Asset Data - {}", model_name),
        keys,
        data,
        mode,
    )
}
