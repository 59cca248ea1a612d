/// 后端默认地址
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8008";

/// 流相关路径
pub const PATH_STREAMS: &str = "connect/streams";
pub const PATH_STREAM_SAMPLE_VALUES: &str = "connect/stream_sample_values";

/// 模型相关路径
pub const PATH_MODELS: &str = "connect/models";

/// 资产相关路径
pub const PATH_TYPES: &str = "connect/types";
pub const PATH_ASSET_TYPES: &str = "connect/asset_types";
pub const PATH_ASSETS: &str = "connect/assets";
pub const PATH_ASSET_VALUES: &str = "connect/asset_values";

pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Configuration 视图可选的集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endpoint {
    Types,
    #[default]
    Streams,
    AssetTypes,
    Assets,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Types,
        Endpoint::Streams,
        Endpoint::AssetTypes,
        Endpoint::Assets,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Types => "Types",
            Endpoint::Streams => "Streams",
            Endpoint::AssetTypes => "Asset Types",
            Endpoint::Assets => "Assets",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Types => PATH_TYPES,
            Endpoint::Streams => PATH_STREAMS,
            Endpoint::AssetTypes => PATH_ASSET_TYPES,
            Endpoint::Assets => PATH_ASSETS,
        }
    }

    pub fn next(&self) -> Endpoint {
        let idx = Self::ALL.iter().position(|e| e == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Endpoint {
        let idx = Self::ALL.iter().position(|e| e == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// 解析命令参数，接受 value 形式（asset_types）或标签形式（"asset types"）
    pub fn parse(s: &str) -> Option<Endpoint> {
        let t = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match t.as_str() {
            "types" => Some(Endpoint::Types),
            "streams" => Some(Endpoint::Streams),
            "asset_types" | "assettypes" => Some(Endpoint::AssetTypes),
            "assets" => Some(Endpoint::Assets),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(
            join_url("http://127.0.0.1:8008/", "/connect/models"),
            "http://127.0.0.1:8008/connect/models"
        );
        assert_eq!(
            join_url("http://host", PATH_STREAMS),
            "http://host/connect/streams"
        );
    }

    #[test]
    fn endpoint_cycles_in_menu_order() {
        assert_eq!(Endpoint::default(), Endpoint::Streams);
        assert_eq!(Endpoint::Streams.next(), Endpoint::AssetTypes);
        assert_eq!(Endpoint::Assets.next(), Endpoint::Types);
        assert_eq!(Endpoint::Types.prev(), Endpoint::Assets);
    }

    #[test]
    fn endpoint_parse_accepts_labels() {
        assert_eq!(Endpoint::parse("Asset Types"), Some(Endpoint::AssetTypes));
        assert_eq!(Endpoint::parse("asset_types"), Some(Endpoint::AssetTypes));
        assert_eq!(Endpoint::parse("ASSETS"), Some(Endpoint::Assets));
        assert_eq!(Endpoint::parse("alphas"), None);
    }
}
