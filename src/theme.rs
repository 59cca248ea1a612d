use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// 界面配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    /// 图表标题、坐标轴、图例文字
    pub chart_text: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Theme {
    pub fn toggle(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// 切换按钮上显示的是目标主题
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Light => "Dark",
            Theme::Dark => "Light",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Theme> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                fg: Color::Rgb(0x11, 0x18, 0x27),
                bg: Color::Rgb(0xff, 0xff, 0xff),
                muted: Color::Rgb(0x6b, 0x72, 0x80),
                accent: Color::Rgb(0x66, 0x7e, 0xea),
                border: Color::Rgb(0xcc, 0xcc, 0xcc),
                highlight_fg: Color::Rgb(0xff, 0xff, 0xff),
                highlight_bg: Color::Rgb(0x66, 0x7e, 0xea),
                chart_text: Color::Rgb(0x4b, 0x55, 0x63),
                success: Color::Rgb(0x16, 0xa3, 0x4a),
                warning: Color::Rgb(0xca, 0x8a, 0x04),
                error: Color::Rgb(0xdc, 0x26, 0x26),
            },
            Theme::Dark => Palette {
                fg: Color::Rgb(0xf3, 0xf4, 0xf6),
                bg: Color::Rgb(0x11, 0x18, 0x27),
                muted: Color::Rgb(0x9c, 0xa3, 0xaf),
                accent: Color::Rgb(0x81, 0x8c, 0xf8),
                border: Color::Rgb(0x66, 0x66, 0x66),
                highlight_fg: Color::Rgb(0x11, 0x18, 0x27),
                highlight_bg: Color::Rgb(0x81, 0x8c, 0xf8),
                chart_text: Color::Rgb(0xd1, 0xd5, 0xdb),
                success: Color::Rgb(0x4a, 0xde, 0x80),
                warning: Color::Rgb(0xfa, 0xcc, 0x15),
                error: Color::Rgb(0xf8, 0x71, 0x71),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedState {
    theme: Theme,
}

/// 主题偏好的本地状态文件
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在时返回 None
    pub fn load(&self) -> Result<Option<Theme>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("读取状态文件失败: {}", self.path.display()))?;
        let state: SavedState = serde_json::from_str(&text)
            .with_context(|| format!("状态文件格式错误: {}", self.path.display()))?;
        Ok(Some(state.theme))
    }

    pub fn save(&self, theme: Theme) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("创建目录失败: {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(&SavedState { theme })?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("写入状态文件失败: {}", self.path.display()))?;
        Ok(())
    }

    /// 启动时的主题：优先用已保存的选择，否则用配置默认值
    pub fn resolve_initial(&self, fallback: Theme, info: &mut Vec<String>) -> Theme {
        match self.load() {
            Ok(Some(theme)) => {
                info.push(format!("✓ 已恢复主题: {}", theme.name()));
                theme
            }
            Ok(None) => fallback,
            Err(e) => {
                info.push(format!("⚠ {:#}，使用默认主题", e));
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn toggle_persists_and_reload_reflects_it() {
        let dir = tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("state.json"));
        let mut info = Vec::new();
        let theme = store.resolve_initial(Theme::Light, &mut info);
        assert_eq!(theme, Theme::Light);

        let toggled = theme.toggle();
        store.save(toggled).unwrap();

        let reloaded = ThemeStore::new(dir.path().join("state.json"));
        assert_eq!(reloaded.resolve_initial(Theme::Light, &mut info), Theme::Dark);
        assert_eq!(info, vec!["✓ 已恢复主题: dark".to_string()]);
    }

    #[test]
    fn corrupt_state_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = ThemeStore::new(&path);
        assert!(store.load().is_err());
        let mut info = Vec::new();
        assert_eq!(store.resolve_initial(Theme::Dark, &mut info), Theme::Dark);
        assert!(info[0].starts_with("⚠"));
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("nested/state.json"));
        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"dark\""));
    }

    #[test]
    fn labels_and_chart_text() {
        assert_eq!(Theme::Light.toggle_label(), "Dark");
        assert_eq!(Theme::Dark.toggle_label(), "Light");
        assert_eq!(Theme::Dark.palette().chart_text, Color::Rgb(0xd1, 0xd5, 0xdb));
        assert_eq!(Theme::Light.palette().chart_text, Color::Rgb(0x4b, 0x55, 0x63));
        assert_eq!(Theme::parse(" DARK "), Some(Theme::Dark));
        assert_eq!(Theme::parse("blue"), None);
    }
}
