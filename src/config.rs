use crate::api::urls::DEFAULT_API_URL;
use crate::theme::Theme;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_STATE_FILE: &str = ".streamdash-state.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub state_file: PathBuf,
    pub default_theme: Theme,
}

impl Config {
    /// 读取 .env 和环境变量，返回配置和启动信息
    pub fn load() -> (Config, Vec<String>) {
        let mut info = Vec::new();
        match std::env::current_dir() {
            Ok(dir) => info.push(format!("当前工作目录: {}", dir.display())),
            Err(e) => info.push(format!("⚠ 无法获取当前工作目录: {}", e)),
        }
        match dotenv::dotenv() {
            Ok(path) => info.push(format!("✓ 已加载 .env 文件: {}", path.display())),
            Err(_) => info.push("⚠ 未找到 .env 文件，使用系统环境变量".to_string()),
        }
        let config = Config::from_lookup(|k| std::env::var(k).ok(), &mut info);
        (config, info)
    }

    pub fn from_lookup<F>(lookup: F, info: &mut Vec<String>) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        info.push(format!("API 地址: {}", api_base_url));

        let secs = |key: &str, default: u64, info: &mut Vec<String>| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    info.push(format!("⚠ {} 无效: {}，使用默认值 {}", key, raw, default));
                    default
                }
            },
        };
        let request_timeout = secs("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS, info);
        let probe_timeout = secs(
            "CONNECTION_TEST_TIMEOUT_SECS",
            DEFAULT_PROBE_TIMEOUT_SECS,
            info,
        );

        let state_file = lookup("DASHBOARD_STATE_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

        let default_theme = match lookup("DASHBOARD_THEME") {
            None => Theme::Light,
            Some(raw) => Theme::parse(&raw).unwrap_or_else(|| {
                info.push(format!("⚠ DASHBOARD_THEME 无效: {}，使用 light", raw));
                Theme::Light
            }),
        };

        Config {
            api_base_url,
            request_timeout: Duration::from_secs(request_timeout),
            probe_timeout: Duration::from_secs(probe_timeout),
            state_file,
            default_theme,
        }
    }
}
