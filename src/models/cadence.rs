use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

/// 更新/重训节奏：正整数周期，或 6 段 cron 表达式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cadence {
    Period(i64),
    Cron(String),
}

/// cron 各段名称，按表达式顺序
pub const CRON_FIELDS: [&str; 6] = [
    "second",
    "minute",
    "hour",
    "day of month",
    "month",
    "day of week",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    NotPositive,
    TokenCount(usize),
    BadToken { field: &'static str, token: String },
}

impl fmt::Display for CadenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CadenceError::NotPositive => write!(f, "must be positive"),
            CadenceError::TokenCount(n) => {
                write!(f, "cron expression needs 6 fields, got {}", n)
            }
            CadenceError::BadToken { field, token } => {
                write!(f, "invalid {} field '{}'", field, token)
            }
        }
    }
}

fn field_pattern(number: &str, allow_question: bool) -> String {
    let atom = format!(r"(\*|(?:{n})(?:-(?:{n}))?)(?:/\d+)?", n = number);
    if allow_question {
        format!(r"^(?:\?|{a}(?:,{a})*)$", a = atom)
    } else {
        format!(r"^{a}(?:,{a})*$", a = atom)
    }
}

fn cron_patterns() -> &'static [Regex; 6] {
    static PATTERNS: OnceLock<[Regex; 6]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let build = |p: String| Regex::new(&p).expect("cron field pattern");
        [
            build(field_pattern(r"[0-5]?\d", false)),
            build(field_pattern(r"[0-5]?\d", false)),
            build(field_pattern(r"[01]?\d|2[0-3]", false)),
            build(field_pattern(r"0?[1-9]|[12]\d|3[01]", true)),
            build(field_pattern(r"0?[1-9]|1[0-2]", false)),
            build(field_pattern(r"[0-6]", true)),
        ]
    })
}

/// 逐段校验 cron 表达式
pub fn validate_cron(expr: &str) -> Result<(), CadenceError> {
    let tokens: Vec<&str> = expr.split_whitespace().collect();
    if tokens.len() != CRON_FIELDS.len() {
        return Err(CadenceError::TokenCount(tokens.len()));
    }
    for ((token, re), field) in tokens.iter().zip(cron_patterns()).zip(CRON_FIELDS) {
        if !re.is_match(token) {
            return Err(CadenceError::BadToken {
                field,
                token: token.to_string(),
            });
        }
    }
    Ok(())
}

impl Cadence {
    /// 解析表单输入：纯数字按周期处理，否则按 cron 处理
    pub fn parse(input: &str) -> Result<Cadence, CadenceError> {
        let t = input.trim();
        if t.is_empty() {
            return Err(CadenceError::NotPositive);
        }
        if t.chars().all(|c| c.is_ascii_digit() || c == '-') {
            let n = t.parse::<i64>().unwrap_or(0);
            if n <= 0 {
                return Err(CadenceError::NotPositive);
            }
            return Ok(Cadence::Period(n));
        }
        let normalized = t.split_whitespace().collect::<Vec<_>>().join(" ");
        validate_cron(&normalized)?;
        Ok(Cadence::Cron(normalized))
    }

    pub fn as_input(&self) -> String {
        match self {
            Cadence::Period(n) => n.to_string(),
            Cadence::Cron(s) => s.clone(),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_input())
    }
}

impl Serialize for Cadence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cadence::Period(n) => serializer.serialize_i64(*n),
            Cadence::Cron(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Cadence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(Cadence::Period(
                n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
            )),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(n) => Ok(Cadence::Period(n)),
                Err(_) => Ok(Cadence::Cron(s.trim().to_string())),
            },
            other => Err(serde::de::Error::custom(format!(
                "unsupported cadence value: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0 0 * * * *")]
    #[case("*/15 * * * * *")]
    #[case("0 30 6 1,15 * ?")]
    #[case("0 0 8-18/2 * 1-12 1-5")]
    #[case("59 59 23 31 12 6")]
    fn accepts_valid_cron(#[case] expr: &str) {
        assert_eq!(validate_cron(expr), Ok(()));
    }

    #[rstest]
    #[case("0 0 * * *", CadenceError::TokenCount(5))]
    #[case("0 0 * * * * *", CadenceError::TokenCount(7))]
    #[case("60 0 * * * *", CadenceError::BadToken { field: "second", token: "60".to_string() })]
    #[case("0 0 24 * * *", CadenceError::BadToken { field: "hour", token: "24".to_string() })]
    #[case("0 0 0 32 * *", CadenceError::BadToken { field: "day of month", token: "32".to_string() })]
    #[case("0 0 0 * 13 *", CadenceError::BadToken { field: "month", token: "13".to_string() })]
    #[case("0 0 0 * * 7", CadenceError::BadToken { field: "day of week", token: "7".to_string() })]
    #[case("0 ? * * * *", CadenceError::BadToken { field: "minute", token: "?".to_string() })]
    fn rejects_invalid_cron(#[case] expr: &str, #[case] expected: CadenceError) {
        assert_eq!(validate_cron(expr), Err(expected));
    }

    #[test]
    fn parse_prefers_numeric_period() {
        assert_eq!(Cadence::parse(" 30 "), Ok(Cadence::Period(30)));
        assert_eq!(Cadence::parse("0"), Err(CadenceError::NotPositive));
        assert_eq!(Cadence::parse("-5"), Err(CadenceError::NotPositive));
        assert_eq!(Cadence::parse(""), Err(CadenceError::NotPositive));
        assert_eq!(
            Cadence::parse("0  0 *  * * *"),
            Ok(Cadence::Cron("0 0 * * * *".to_string()))
        );
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = Cadence::parse("0 0 99 * * *").unwrap_err();
        assert_eq!(err.to_string(), "invalid hour field '99'");
    }
}
