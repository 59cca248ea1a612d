use crate::api::Endpoint;
use crate::series::range::TimeRange;
use crate::series::{AxisMode, ChartKind};
use crate::theme::Theme;
use std::str::FromStr;

/// 命令行可补全的命令
pub const COMMANDS: [&str; 12] = [
    "endpoint", "refresh", "test", "range", "count", "theme", "axis", "chart", "model", "help",
    "quit", "exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeArg {
    Set(Theme),
    Toggle,
}

/// 命令行输入解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    Endpoint(Endpoint),
    Refresh,
    Test,
    Range(TimeRange),
    Count(u32),
    Theme(ThemeArg),
    Axis(AxisMode),
    Chart(ChartKind),
    ModelNew,
    ModelDelete,
    Help,
    Quit,
    Unknown(String),
}

impl FromStr for UiCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(UiCommand::Unknown("".to_string()));
        }
        let arg = parts.get(1).copied();

        match parts[0] {
            "endpoint" | "ep" => {
                let name = parts[1..].join(" ");
                match Endpoint::parse(&name) {
                    Some(ep) => Ok(UiCommand::Endpoint(ep)),
                    None => Ok(UiCommand::Unknown(
                        "用法: endpoint <types|streams|asset_types|assets>".to_string(),
                    )),
                }
            }
            "refresh" | "r" => Ok(UiCommand::Refresh),
            "test" => Ok(UiCommand::Test),
            "range" => match arg.and_then(TimeRange::parse) {
                Some(r) => Ok(UiCommand::Range(r)),
                None => Ok(UiCommand::Unknown(
                    "用法: range <5min|10min|30min|1h|8h|24h|1week>".to_string(),
                )),
            },
            "count" => match arg.and_then(|a| a.parse::<u32>().ok()).filter(|n| *n > 0) {
                Some(n) => Ok(UiCommand::Count(n)),
                None => Ok(UiCommand::Unknown("用法: count <正整数>".to_string())),
            },
            "theme" => match arg {
                None | Some("toggle") => Ok(UiCommand::Theme(ThemeArg::Toggle)),
                Some(t) => match Theme::parse(t) {
                    Some(theme) => Ok(UiCommand::Theme(ThemeArg::Set(theme))),
                    None => Ok(UiCommand::Unknown("用法: theme <light|dark|toggle>".to_string())),
                },
            },
            "axis" => match arg {
                Some("single") => Ok(UiCommand::Axis(AxisMode::Single)),
                Some("multi") | Some("multiple") => Ok(UiCommand::Axis(AxisMode::Multiple)),
                _ => Ok(UiCommand::Unknown("用法: axis <single|multi>".to_string())),
            },
            "chart" => match arg {
                Some("line") => Ok(UiCommand::Chart(ChartKind::Line)),
                Some("spark") | Some("sparkline") => Ok(UiCommand::Chart(ChartKind::Spark)),
                _ => Ok(UiCommand::Unknown("用法: chart <line|spark>".to_string())),
            },
            "model" => match arg {
                Some("new") => Ok(UiCommand::ModelNew),
                Some("delete") | Some("del") => Ok(UiCommand::ModelDelete),
                _ => Ok(UiCommand::Unknown("用法: model new | model delete".to_string())),
            },
            "help" | "h" => Ok(UiCommand::Help),
            "quit" | "q" | "exit" => Ok(UiCommand::Quit),
            _ => Ok(UiCommand::Unknown(format!("未知命令: {}", parts[0]))),
        }
    }
}

/// 子命令候选
pub fn sub_commands(cmd: &str) -> &'static [&'static str] {
    match cmd {
        "endpoint" => &["types", "streams", "asset_types", "assets"],
        "range" => &["5min", "10min", "30min", "1h", "8h", "24h", "1week"],
        "count" => &["100", "200", "500", "1000", "5000", "10000"],
        "theme" => &["light", "dark", "toggle"],
        "axis" => &["single", "multi"],
        "chart" => &["line", "spark"],
        "model" => &["new", "delete"],
        _ => &[],
    }
}

/// Tab 补全提示：返回需要追加的剩余部分
pub fn completion_hint(input: &str) -> Option<String> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    let parts: Vec<&str> = input.split_whitespace().collect();
    let trailing_space = input.ends_with(' ');
    let (candidates, cur): (&[&str], &str) = match (parts.len(), trailing_space) {
        (1, false) => (&COMMANDS, parts[0]),
        (1, true) => (sub_commands(parts[0]), ""),
        (2, false) => (sub_commands(parts[0]), parts[1]),
        _ => return None,
    };
    candidates
        .iter()
        .find(|c| c.starts_with(cur) && **c != cur)
        .map(|c| c[cur.len()..].to_string())
}
