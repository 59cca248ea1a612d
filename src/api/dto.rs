use crate::models::cadence::Cadence;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// /connect/streams 返回的流描述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(default, alias = "Id", alias = "ID", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, alias = "Name", alias = "NAME", deserialize_with = "de_text")]
    pub name: String,
    #[serde(
        default,
        alias = "Description",
        alias = "DESC",
        deserialize_with = "de_text"
    )]
    pub description: String,
}

impl StreamInfo {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// /connect/models 的单条记录（预测模型配置）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(default, alias = "Id", deserialize_with = "de_text")]
    pub id: String,
    #[serde(default, alias = "Name", deserialize_with = "de_text")]
    pub name: String,
    #[serde(default, alias = "Description", deserialize_with = "de_text")]
    pub description: String,
    #[serde(default, deserialize_with = "de_text")]
    pub model_type: String,
    #[serde(default, deserialize_with = "de_string_list")]
    pub past_covariates: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub target: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub future_covariates: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub status: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub training_horizon: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub forecast_horizon: Option<i64>,
    #[serde(default)]
    pub update_frequency: Option<Cadence>,
    #[serde(default)]
    pub retrain_frequency: Option<Cadence>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub sampling_rate: Option<i64>,
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// 后端有时把列表存成逗号分隔字符串
fn de_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

fn de_opt_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_of(&Value::deserialize(deserializer)?))
}

pub(crate) fn number_of(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn stream_accepts_either_key_casing() {
        let lower: StreamInfo =
            serde_json::from_value(json!({"id": "s1", "name": "Flow", "description": "d"}))
                .unwrap();
        let upper: StreamInfo =
            serde_json::from_value(json!({"Id": "s1", "Name": "Flow", "Description": "d"}))
                .unwrap();
        assert_eq!(lower, upper);

        let bare: StreamInfo = serde_json::from_value(json!({"id": "s2"})).unwrap();
        assert_eq!(bare.display_name(), "s2");
    }

    #[test]
    fn model_record_tolerates_backend_shapes() {
        let rec: ModelRecord = serde_json::from_value(json!({
            "id": "m1",
            "name": "Pump forecast",
            "description": "",
            "model_type": "NBEATS",
            "past_covariates": "a,b",
            "target": ["t1"],
            "training_horizon": "14400",
            "forecast_horizon": 120,
            "update_frequency": 30,
            "retrain_frequency": "0 0 * * * *",
            "sampling_rate": null
        }))
        .unwrap();

        assert_eq!(rec.past_covariates, vec!["a", "b"]);
        assert_eq!(rec.target, vec!["t1"]);
        assert!(rec.future_covariates.is_empty());
        assert_eq!(rec.training_horizon, Some(14400));
        assert_eq!(rec.forecast_horizon, Some(120));
        assert_eq!(rec.update_frequency, Some(Cadence::Period(30)));
        assert_eq!(
            rec.retrain_frequency,
            Some(Cadence::Cron("0 0 * * * *".to_string()))
        );
        assert_eq!(rec.sampling_rate, None);
    }

    #[test]
    fn model_record_serializes_lists_as_arrays() {
        let rec = ModelRecord {
            id: "m1".to_string(),
            past_covariates: vec!["a".to_string()],
            update_frequency: Some(Cadence::Period(30)),
            ..Default::default()
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["past_covariates"], json!(["a"]));
        assert_eq!(v["update_frequency"], json!(30));
    }
}
