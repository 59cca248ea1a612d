use ratatui::style::Color;
use std::str::FromStr;

/// 序列配色，按序号循环使用
pub const SERIES_COLORS: [&str; 23] = [
    "#03a9f4", "#ad1457", "#f57f17", "#8bc34a", "#0277bd", "#ffc107", "#e91e63", "#607d8b",
    "#283593", "#ff5722", "#00bcd4", "#673ab7", "#f44336", "#795548", "#2196f3", "#cddc39",
    "#9c27b0", "#009688", "#3f51b5", "#37474f", "#558b2f", "#d84315", "#00838f",
];

pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// "#rrggbb" 转终端颜色，解析失败用 Reset
pub fn hex_color(hex: &str) -> Color {
    Color::from_str(hex).unwrap_or(Color::Reset)
}
