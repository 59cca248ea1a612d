//! Tiles 视图的静态示例数据

pub struct BarTile {
    pub title: &'static str,
    pub categories: [&'static str; 6],
    pub groups: [(&'static str, [u64; 6]); 2],
}

pub struct LineTile {
    pub title: &'static str,
    pub categories: &'static [&'static str],
    pub series: &'static [(&'static str, &'static [f64])],
}

pub struct ShareTile {
    pub title: &'static str,
    pub slices: [(&'static str, u64); 3],
}

pub struct ScatterTile {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: [(f64, f64); 10],
}

pub struct GaugeTile {
    pub title: &'static str,
    pub label: &'static str,
    pub percent: u16,
}

pub const SALES: BarTile = BarTile {
    title: "Sales Performance",
    categories: ["Jan", "Feb", "Mar", "Apr", "May", "Jun"],
    groups: [
        ("Q1", [120, 200, 150, 80, 70, 110]),
        ("Q2", [150, 170, 180, 90, 85, 130]),
    ],
};

pub const USER_GROWTH: LineTile = LineTile {
    title: "User Growth",
    categories: &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
    series: &[
        ("New Users", &[820.0, 932.0, 901.0, 934.0, 1290.0, 1330.0, 1320.0]),
        ("Active Users", &[720.0, 832.0, 801.0, 834.0, 1190.0, 1230.0, 1220.0]),
    ],
};

pub const MARKET_SHARE: ShareTile = ShareTile {
    title: "Market Share",
    slices: [("Mobile", 335), ("Desktop", 310), ("Tablet", 234)],
};

pub const REVENUE_VS_USERS: ScatterTile = ScatterTile {
    title: "Revenue vs Users",
    x_label: "Users",
    y_label: "Revenue",
    points: [
        (100.0, 2400.0),
        (150.0, 3200.0),
        (200.0, 4100.0),
        (250.0, 5200.0),
        (300.0, 6800.0),
        (180.0, 3800.0),
        (220.0, 4500.0),
        (280.0, 6200.0),
        (320.0, 7100.0),
        (350.0, 8000.0),
    ],
};

pub const TRAFFIC_TRENDS: LineTile = LineTile {
    title: "Traffic Trends",
    categories: &["Jan", "Feb", "Mar", "Apr", "May", "Jun"],
    series: &[
        ("Organic", &[320.0, 332.0, 301.0, 334.0, 390.0, 330.0]),
        ("Paid", &[220.0, 182.0, 191.0, 234.0, 290.0, 330.0]),
        ("Social", &[150.0, 232.0, 201.0, 154.0, 190.0, 330.0]),
    ],
};

pub const PERFORMANCE: GaugeTile = GaugeTile {
    title: "Performance Score",
    label: "Performance",
    percent: 85,
};

impl ShareTile {
    /// 各部分占比（百分比，四舍五入）
    pub fn shares(&self) -> Vec<(&'static str, u64)> {
        let total: u64 = self.slices.iter().map(|(_, v)| v).sum();
        self.slices
            .iter()
            .map(|(name, v)| {
                let pct = if total == 0 {
                    0
                } else {
                    (v * 100 + total / 2) / total
                };
                (*name, pct)
            })
            .collect()
    }
}

impl LineTile {
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_share_percentages() {
        assert_eq!(
            MARKET_SHARE.shares(),
            vec![("Mobile", 38), ("Desktop", 35), ("Tablet", 27)]
        );
    }

    #[test]
    fn line_tiles_have_one_value_per_category() {
        for tile in [&USER_GROWTH, &TRAFFIC_TRENDS] {
            for (_, values) in tile.series {
                assert_eq!(values.len(), tile.categories.len());
            }
        }
        assert_eq!(USER_GROWTH.max_value(), 1330.0);
    }
}
