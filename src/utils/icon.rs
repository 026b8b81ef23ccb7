use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::config::DEFAULT_ICON_PREFIX;

static CONTENT_HASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{64,}$").unwrap());

/// 접미사 규칙 외에 아이콘으로 취급하는 고정 키
const LITERAL_ICON_KEYS: [&str; 2] = ["character_image", "android_icon"];

pub fn looks_like_hash(s: &str) -> bool {
    CONTENT_HASH.is_match(s)
}

pub fn is_absolute_url(s: &str) -> bool {
    let head = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

pub fn is_icon_key(key: &str) -> bool {
    key.ends_with("_icon") || LITERAL_ICON_KEYS.contains(&key)
}

/// payload 트리의 모든 아이콘 참조를 절대 URL 로 보정한다.
#[derive(Debug, Clone)]
pub struct IconResolver {
    prefix: String,
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_PREFIX)
    }
}

impl IconResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// 단일 값 보정. 이미 http(s) 면 그대로, 해시만 온 경우 접두사를 붙인다.
    pub fn normalize_url(&self, value: &str) -> String {
        if is_absolute_url(value) {
            return value.to_string();
        }
        if looks_like_hash(value) {
            return format!("{}{}", self.prefix, value);
        }
        value.to_string()
    }

    /// 트리를 제자리에서 보정하고, 결과 절대 URL 전체를 (정렬·중복 제거) 돌려준다.
    pub fn resolve_icons(&self, payload: &mut Value) -> BTreeSet<String> {
        let mut acc = BTreeSet::new();
        self.walk(payload, &mut acc);
        log::debug!("아이콘 {} 개 보정/수집", acc.len());
        acc
    }

    fn walk(&self, node: &mut Value, acc: &mut BTreeSet<String>) {
        match node {
            Value::Object(map) => {
                for (key, value) in map.iter_mut() {
                    if is_icon_key(key) {
                        if let Value::String(s) = value {
                            let fixed = self.normalize_url(s);
                            if is_absolute_url(&fixed) {
                                acc.insert(fixed.clone());
                            }
                            *s = fixed;
                            continue;
                        }
                    }
                    self.walk(value, acc);
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.walk(item, acc);
                }
            }
            _ => {}
        }
    }
}
