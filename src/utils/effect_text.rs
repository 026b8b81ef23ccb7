use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::utils::format::format_number;

static LEVEL_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Lv\.?\s*([0-9]+)").unwrap());
static LEADING_DELIMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[·•/|;\s]+").unwrap());
static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static LINE_DELIMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\n|<br\s*/?>|[·•/|;]").unwrap());
static EFFECT_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^:]+?)\s*:\s*([+-]?(?:\d[\d,]*(?:\.\d+)?|\.\d+)\S*)").unwrap()
});
static NUMERIC_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-]?)(\d[\d,]*(?:\.\d+)?|\.\d+)(.*)$").unwrap());

/// 쉼표 분리. 바로 뒤가 숫자인 쉼표(천 단위 구분자)는 자르지 않는다.
fn split_on_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch != ',' {
            continue;
        }
        let next_is_digit = chars.peek().is_some_and(|(_, c)| c.is_ascii_digit());
        if !next_is_digit {
            parts.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

fn normalize_lines(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    INLINE_SPACE.replace_all(&unified, " ").trim().to_string()
}

/// 효과 텍스트 → 표시용 칩 목록. "Lv. N" 이 있으면 맨 앞.
pub fn effect_text_to_chips(text: &str) -> Vec<String> {
    let mut rest = normalize_lines(text).replace(['[', ']'], "");
    if rest.is_empty() {
        return Vec::new();
    }

    let mut chips = Vec::new();
    let marker = LEVEL_MARKER
        .captures(&rest)
        .and_then(|caps| Some((caps.get(1)?.as_str().to_string(), caps.get(0)?.range())));
    if let Some((level, whole)) = marker {
        chips.push(format!("Lv. {level}"));
        let stripped = format!("{}{}", &rest[..whole.start], &rest[whole.end..]);
        rest = LEADING_DELIMS.replace(stripped.trim(), "").to_string();
    }

    for segment in LINE_DELIMS.split(&rest) {
        for part in split_on_commas(segment) {
            let part = part.trim();
            if !part.is_empty() {
                chips.push(part.to_string());
            }
        }
    }
    chips
}

/// 세트 효과 전용: 바깥 대괄호 한 쌍만 벗기고 쉼표로만 나눈다.
pub fn set_effect_to_chips(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(']').unwrap_or(trimmed);
    let joined = trimmed.replace(['\r', '\n'], " ");
    split_on_commas(&joined)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EffectValue {
    Number(f64),
    Text(String),
}

impl EffectValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EffectValue::Number(n) => Some(*n),
            EffectValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectEntry {
    pub label: String,
    pub value: EffectValue,
    pub unit: String,
    /// 원문이 "+10%" 처럼 부호를 명시했는지. 다시 쓸 때 그대로 살린다.
    #[serde(skip)]
    pub explicit_plus: bool,
}

impl EffectEntry {
    /// "10%" / "+1,200" / "3.5초" / "없음" 같은 값 토큰 해석
    pub fn parse(label: &str, raw_value: &str) -> Self {
        let raw_value = raw_value.trim();
        if let Some(caps) = NUMERIC_HEAD.captures(raw_value) {
            let sign = &caps[1];
            let digits = caps[2].replace(',', "");
            if let Ok(n) = digits.parse::<f64>() {
                return Self {
                    label: label.to_string(),
                    value: EffectValue::Number(if sign == "-" { -n } else { n }),
                    unit: caps[3].trim().to_string(),
                    explicit_plus: sign == "+",
                };
            }
        }
        Self {
            label: label.to_string(),
            value: EffectValue::Text(raw_value.to_string()),
            unit: String::new(),
            explicit_plus: false,
        }
    }

    pub fn display_value(&self) -> String {
        match &self.value {
            EffectValue::Number(n) => {
                let sign = if self.explicit_plus && *n >= 0.0 { "+" } else { "" };
                format!("{sign}{}{}", format_number(*n), self.unit)
            }
            EffectValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for EffectEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.label, self.display_value())
    }
}

/// 라벨 → 값 (삽입 순서 유지)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectMap {
    entries: Vec<EffectEntry>,
}

impl EffectMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&EffectEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut EffectEntry> {
        self.entries.iter_mut().find(|e| e.label == label)
    }

    /// 같은 라벨이 있으면 둘 다 수치일 때만 더하고, 아니면 먼저 나온 값을 둔다.
    pub fn accumulate(&mut self, entry: EffectEntry) {
        match self.get_mut(&entry.label) {
            Some(existing) => {
                if let (Some(a), Some(b)) = (existing.value.as_number(), entry.value.as_number()) {
                    existing.value = EffectValue::Number(a + b);
                }
            }
            None => self.entries.push(entry),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectEntry> {
        self.entries.iter()
    }
}

/// 한 조각 안의 "라벨 : 수치단위" 를 전부 뽑는다. 남은 꼬리에 ':' 가 있으면 글자 값.
fn scan_pairs(part: &str, map: &mut EffectMap) {
    let mut tail = 0;
    for caps in EFFECT_PAIR.captures_iter(part) {
        let (Some(whole), Some(label), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let label = label.as_str().trim();
        if !label.is_empty() {
            map.accumulate(EffectEntry::parse(label, value.as_str()));
        }
        tail = whole.end();
    }

    if let Some((label, value)) = part[tail..].split_once(':') {
        let label = label.trim();
        if !label.is_empty() {
            map.accumulate(EffectEntry::parse(label, value));
        }
    }
}

/// "라벨 : 값" 쌍들을 순서대로 추출한다. 같은 라벨이 다시 나오면 수치를 더한다.
///
/// 줄바꿈과 숫자가 뒤따르지 않는 쉼표에서만 나누므로 라벨 안의 `/` 는 그대로 남는다.
pub fn parse_effect_string(text: &str) -> EffectMap {
    let mut map = EffectMap::new();
    let normalized = normalize_lines(text);
    for line in normalized.split('\n') {
        for part in split_on_commas(line) {
            scan_pairs(part, &mut map);
        }
    }
    map
}

/// 한 줄에 하나씩 "라벨 : 값단위"
pub fn format_effect_string(map: &EffectMap) -> String {
    map.iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_marker_comes_first() {
        assert_eq!(
            effect_text_to_chips("Lv.5 공격력 10 · 방어력 20"),
            vec!["Lv. 5", "공격력 10", "방어력 20"]
        );
    }

    #[test]
    fn chips_split_on_all_delimiters_but_keep_thousands() {
        let chips = effect_text_to_chips("[HP 1,200]<br>MP 300 / 공격력 5%; 보스 공격력 3%\n이동속도 2, 점프력 1");
        assert_eq!(
            chips,
            vec!["HP 1,200", "MP 300", "공격력 5%", "보스 공격력 3%", "이동속도 2", "점프력 1"]
        );
    }

    #[test]
    fn empty_text_yields_no_chips() {
        assert!(effect_text_to_chips("").is_empty());
        assert!(effect_text_to_chips("  [ ]  ").is_empty());
    }

    #[test]
    fn set_effect_chips_only_split_commas() {
        assert_eq!(
            set_effect_to_chips("[STR +10, DEX +10, 최대 HP +1,000]"),
            vec!["STR +10", "DEX +10", "최대 HP +1,000"]
        );
    }

    #[test]
    fn parse_then_format_round_trip() {
        let map = parse_effect_string("공격력 : 10%, 마력 : 20");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("공격력").unwrap().value, EffectValue::Number(10.0));
        assert_eq!(map.get("공격력").unwrap().unit, "%");
        assert_eq!(map.get("마력").unwrap().value, EffectValue::Number(20.0));

        let text = format_effect_string(&map);
        assert_eq!(text, "공격력 : 10%\n마력 : 20");
        assert_eq!(parse_effect_string(&text), map);
    }

    #[test]
    fn numeric_tokens_keep_sign_decimals_and_separators() {
        let map = parse_effect_string("최대 HP : +1,500, 재사용 대기시간 : -0.5초, 효과 : 없음");
        let hp = map.get("최대 HP").unwrap();
        assert_eq!(hp.value, EffectValue::Number(1500.0));
        assert_eq!(hp.display_value(), "+1,500");

        let cd = map.get("재사용 대기시간").unwrap();
        assert_eq!(cd.value, EffectValue::Number(-0.5));
        assert_eq!(cd.unit, "초");

        let text = map.get("효과").unwrap();
        assert_eq!(text.value, EffectValue::Text("없음".to_string()));
        assert_eq!(text.unit, "");
    }

    #[test]
    fn segments_without_colon_are_ignored() {
        let map = parse_effect_string("그냥 설명, 공격력 : 3");
        assert_eq!(map.len(), 1);
        assert!(map.get("공격력").is_some());
    }

    #[test]
    fn labels_keep_slashes_and_middle_dots() {
        let map = parse_effect_string("최대 HP/MP : 5%, 공격력·마력 : 3");
        let labels: Vec<&str> = map.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["최대 HP/MP", "공격력·마력"]);
        assert_eq!(map.get("최대 HP/MP").unwrap().unit, "%");
    }

    #[test]
    fn pairs_separated_by_spaces_are_all_found() {
        let map = parse_effect_string("공격력 : 10% 마력 : 20 보스 공격력 : +1,000");
        assert_eq!(map.len(), 3);
        let atk = map.get("공격력").unwrap();
        assert_eq!(atk.value, EffectValue::Number(10.0));
        assert_eq!(atk.unit, "%");
        assert_eq!(map.get("마력").unwrap().value, EffectValue::Number(20.0));
        assert_eq!(map.get("보스 공격력").unwrap().display_value(), "+1,000");
    }

    #[test]
    fn repeated_label_within_one_text_is_summed() {
        let map = parse_effect_string("공격력 : 5\n방어력 : 2, 공격력 : 7");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("공격력").unwrap().value, EffectValue::Number(12.0));
        assert_eq!(format_effect_string(&map), "공격력 : 12\n방어력 : 2");
    }
}
