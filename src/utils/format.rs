use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static SKILL_LEVEL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"Lv\.(\d+)\s+(.+)").unwrap());
static ABILITY_OK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)가능|able|true|1").unwrap());
static ABILITY_NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)불가|not|false|0").unwrap());

/// 정수부 천 단위 쉼표
pub fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 그룹 쉼표 + 소수점 최대 3자리 (뒤쪽 0 제거)
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let negative = n < 0.0;
    let fixed = format!("{:.3}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if negative && (int_part != "0" || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// 만 단위 표기: 12345 → "1 만 2345", 9999 → "9,999", 없음 → "-".
///
/// 숫자 이외 문자는 모두 버리고 남은 자릿수로 계산한다.
pub fn to_man_notation(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "-".to_string();
    };
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return "0".to_string();
    }
    let Ok(num) = digits.parse::<u128>() else {
        return raw.to_string();
    };

    let man = num / 10_000;
    let rest = num % 10_000;
    if man == 0 {
        return group_digits(&num.to_string());
    }
    format!("{man} 만 {rest:04}")
}

/// JSON 스칼라를 표시 문자열로. null/배열/객체는 None.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 전승/전수 가능 여부 플래그를 라벨로. 판정이 애매하면 원문.
pub fn normalize_ability_flag(raw: Option<&str>, ok_label: &str, bad_label: &str) -> Option<String> {
    let raw = raw.filter(|s| !s.is_empty())?;
    let ok = ABILITY_OK.is_match(raw);
    let no = ABILITY_NO.is_match(raw);
    Some(match (ok, no) {
        (true, false) => ok_label.to_string(),
        (false, true) => bad_label.to_string(),
        _ => raw.to_string(),
    })
}

/// "Lv.30 스킬명" → ("스킬명", Some(30))
pub fn parse_skill_name_and_level(raw: Option<&str>) -> (String, Option<i64>) {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return ("-".to_string(), None);
    };
    if let Some(caps) = SKILL_LEVEL_PREFIX.captures(raw) {
        if let Ok(level) = caps[1].parse::<i64>() {
            return (caps[2].to_string(), Some(level));
        }
    }
    (raw.to_string(), None)
}

/// ISO 시각 → "YYYY-MM-DD". 해석 실패 시 원문.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().to_string();
    }
    if let Some(day) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return date.to_string();
        }
    }
    raw.to_string()
}
