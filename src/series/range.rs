use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// 时间窗口预设
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeRange {
    FiveMinutes,
    TenMinutes,
    ThirtyMinutes,
    #[default]
    OneHour,
    EightHours,
    OneDay,
    OneWeek,
}

impl TimeRange {
    pub const ALL: [TimeRange; 7] = [
        TimeRange::FiveMinutes,
        TimeRange::TenMinutes,
        TimeRange::ThirtyMinutes,
        TimeRange::OneHour,
        TimeRange::EightHours,
        TimeRange::OneDay,
        TimeRange::OneWeek,
    ];

    /// 命令行里使用的键
    pub fn key(&self) -> &'static str {
        match self {
            TimeRange::FiveMinutes => "5min",
            TimeRange::TenMinutes => "10min",
            TimeRange::ThirtyMinutes => "30min",
            TimeRange::OneHour => "1h",
            TimeRange::EightHours => "8h",
            TimeRange::OneDay => "24h",
            TimeRange::OneWeek => "1week",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::FiveMinutes => "Last 5 minutes",
            TimeRange::TenMinutes => "Last 10 minutes",
            TimeRange::ThirtyMinutes => "Last 30 minutes",
            TimeRange::OneHour => "Last hour",
            TimeRange::EightHours => "Last 8 hours",
            TimeRange::OneDay => "Last 24 hours",
            TimeRange::OneWeek => "Last week",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            TimeRange::FiveMinutes => 5,
            TimeRange::TenMinutes => 10,
            TimeRange::ThirtyMinutes => 30,
            TimeRange::OneHour => 60,
            TimeRange::EightHours => 8 * 60,
            TimeRange::OneDay => 24 * 60,
            TimeRange::OneWeek => 7 * 24 * 60,
        }
    }

    /// 模型曲线默认取点数
    pub fn recommended_count(&self) -> u32 {
        match self {
            TimeRange::FiveMinutes => 100,
            TimeRange::TenMinutes => 200,
            TimeRange::ThirtyMinutes => 300,
            TimeRange::OneHour => 600,
            TimeRange::EightHours => 1000,
            TimeRange::OneDay => 2000,
            TimeRange::OneWeek => 5000,
        }
    }

    pub fn parse(s: &str) -> Option<TimeRange> {
        let t = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|r| r.key() == t)
    }

    pub fn next(&self) -> TimeRange {
        let idx = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> TimeRange {
        let idx = Self::ALL.iter().position(|r| r == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn window(&self, now: DateTime<Utc>) -> Window {
        Window {
            start: now - Duration::minutes(self.minutes()),
            end: now,
        }
    }
}

/// 可选取点数
pub const POINT_COUNTS: [u32; 6] = [100, 200, 500, 1000, 5000, 10000];
pub const DEFAULT_POINT_COUNT: u32 = 1000;

/// 解析取点数输入，非法输入回落到默认值
pub fn parse_count(s: &str) -> u32 {
    match s.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => DEFAULT_POINT_COUNT,
    }
}

pub fn next_count(current: u32) -> u32 {
    POINT_COUNTS
        .into_iter()
        .find(|c| *c > current)
        .unwrap_or(POINT_COUNTS[0])
}

pub fn prev_count(current: u32) -> u32 {
    POINT_COUNTS
        .into_iter()
        .rev()
        .find(|c| *c < current)
        .unwrap_or(POINT_COUNTS[POINT_COUNTS.len() - 1])
}

/// 请求时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// (start, end)，毫秒精度 UTC ISO-8601
    pub fn params(&self) -> (String, String) {
        (
            self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }
}
