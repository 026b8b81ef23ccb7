use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::models::payload::{Payload, SectionKey};
use crate::models::snapshot::{Snapshot, SnapshotAssets, SnapshotMeta, SNAPSHOT_TYPE, SNAPSHOT_VERSION};
use crate::utils::error::{AppError, AppResult};
use crate::utils::icon::IconResolver;

/// 스냅샷 파일 읽기/쓰기
#[derive(Debug, Clone, Default)]
pub struct SnapshotCodec {
    resolver: IconResolver,
}

/// `_type` 이 맞고 payload 가 객체인 봉투인지
pub fn is_snapshot(value: &Value) -> bool {
    value.get("_type").and_then(Value::as_str) == Some(SNAPSHOT_TYPE)
        && value.get("payload").is_some_and(Value::is_object)
}

/// 봉투 없이 payload 만 저장된 파일인지 (알려진 섹션 키가 하나라도 있으면)
pub fn looks_like_payload(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => SectionKey::ALL.iter().any(|key| map.contains_key(key.as_str())),
        None => false,
    }
}

pub fn validate_payload(value: &Value) -> AppResult<()> {
    let Some(map) = value.as_object() else {
        return Err(AppError::FormatError("payload가 비어있습니다.".to_string()));
    };
    match map.get(SectionKey::Basic.as_str()) {
        Some(basic) if !basic.is_null() => Ok(()),
        _ => Err(AppError::FormatError("payload.basic 누락".to_string())),
    }
}

/// JS `toISOString()` 과 같은 밀리초 UTC 표기
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `maplem_<월드>_<캐릭터>_<시각>.json`, 시각의 `:` `.` 은 `-`
pub fn export_filename(meta: &SnapshotMeta, now: DateTime<Utc>) -> String {
    let world = meta.world_name.as_deref().filter(|s| !s.is_empty()).unwrap_or("world");
    let character = meta
        .character_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("character");
    let stamp = iso_timestamp(now).replace([':', '.'], "-");
    format!("maplem_{world}_{character}_{stamp}.json")
}

fn infer_meta(payload: &Payload) -> SnapshotMeta {
    SnapshotMeta {
        character_name: payload.character_name(),
        world_name: payload.world_name(),
    }
}

impl SnapshotCodec {
    pub fn new(resolver: IconResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &IconResolver {
        &self.resolver
    }

    /// 파일 바이트 → 스냅샷. 실패하면 FormatError.
    pub fn decode(&self, bytes: &[u8], now: DateTime<Utc>) -> AppResult<Snapshot> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| AppError::FormatError(format!("JSON 파싱 실패: {e}")))?;
        self.decode_value(value, now)
    }

    /// 봉투면 그대로(v1 은 v2 로 올림), payload 면 v2 봉투를 만들어 감싼다.
    pub fn decode_value(&self, value: Value, now: DateTime<Utc>) -> AppResult<Snapshot> {
        if is_snapshot(&value) {
            let payload_raw = value.get("payload").cloned().unwrap_or(Value::Null);
            validate_payload(&payload_raw)?;
            let mut snapshot: Snapshot = serde_json::from_value(value)
                .map_err(|e| AppError::FormatError(format!("스냅샷 형식 오류: {e}")))?;
            let urls = snapshot.payload.resolve_icons(&self.resolver);
            if snapshot.version < SNAPSHOT_VERSION || snapshot.assets.is_none() {
                log::debug!("v{} 스냅샷을 v{SNAPSHOT_VERSION} 으로 변환", snapshot.version);
                snapshot.version = SNAPSHOT_VERSION;
                snapshot.assets = Some(SnapshotAssets {
                    icon_urls: urls.into_iter().collect(),
                });
            }
            return Ok(snapshot);
        }

        if looks_like_payload(&value) {
            validate_payload(&value)?;
            let mut payload = Payload::from_value(value)?;
            let urls = payload.resolve_icons(&self.resolver);
            log::debug!("봉투 없는 payload 를 스냅샷으로 감쌈 (아이콘 {} 개)", urls.len());
            return Ok(Snapshot {
                kind: SNAPSHOT_TYPE.to_string(),
                version: SNAPSHOT_VERSION,
                saved_at: iso_timestamp(now),
                meta: infer_meta(&payload),
                assets: Some(SnapshotAssets {
                    icon_urls: urls.into_iter().collect(),
                }),
                payload,
            });
        }

        Err(AppError::FormatError("알 수 없는 JSON 형식입니다.".to_string()))
    }

    /// 현재 payload → v2 스냅샷. payload 의 `_assets.icon_urls` 도 갱신한다.
    pub fn encode(&self, payload: &mut Payload, world_label: Option<&str>, now: DateTime<Utc>) -> Snapshot {
        let urls = payload.resolve_icons(&self.resolver);
        payload.set_icon_assets(&urls);
        let meta = SnapshotMeta {
            character_name: payload.character_name(),
            world_name: world_label
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| payload.world_name()),
        };
        Snapshot {
            kind: SNAPSHOT_TYPE.to_string(),
            version: SNAPSHOT_VERSION,
            saved_at: iso_timestamp(now),
            meta,
            assets: Some(SnapshotAssets {
                icon_urls: urls.into_iter().collect(),
            }),
            payload: payload.clone(),
        }
    }

    pub fn to_bytes(&self, snapshot: &Snapshot) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 45).unwrap()
    }

    #[test]
    fn raw_payload_gets_a_v2_envelope() {
        let codec = SnapshotCodec::default();
        let raw = json!({
            "basic": {
                "character_name": "메이플",
                "world_name": "스카니아",
                "character_image": HASH
            }
        });
        let snap = codec.decode(raw.to_string().as_bytes(), fixed_now()).unwrap();
        assert_eq!(snap.kind, SNAPSHOT_TYPE);
        assert_eq!(snap.version, 2);
        assert_eq!(snap.meta.character_name.as_deref(), Some("메이플"));
        assert_eq!(snap.meta.world_name.as_deref(), Some("스카니아"));
        let urls = snap.assets.unwrap().icon_urls;
        assert_eq!(urls.len(), 1);
        assert!(urls[0].ends_with(HASH));
        assert_eq!(snap.saved_at, "2025-03-01T12:30:45.000Z");
    }

    #[test]
    fn payload_without_basic_is_rejected() {
        let codec = SnapshotCodec::default();
        let err = codec
            .decode(json!({ "stat": { "stat": [] } }).to_string().as_bytes(), fixed_now())
            .unwrap_err();
        assert!(matches!(err, AppError::FormatError(_)));

        let wrapped = json!({ "_type": SNAPSHOT_TYPE, "version": 2, "payload": { "stat": {} } });
        assert!(matches!(
            codec.decode_value(wrapped, fixed_now()),
            Err(AppError::FormatError(_))
        ));
    }

    #[test]
    fn unknown_json_and_garbage_are_format_errors() {
        let codec = SnapshotCodec::default();
        assert!(matches!(
            codec.decode(br#"{"hello": 1}"#, fixed_now()),
            Err(AppError::FormatError(_))
        ));
        assert!(matches!(codec.decode(b"not json", fixed_now()), Err(AppError::FormatError(_))));
        assert!(!looks_like_payload(&json!([1, 2])));
    }

    #[test]
    fn v1_envelope_is_upgraded() {
        let codec = SnapshotCodec::default();
        let v1 = json!({
            "_type": SNAPSHOT_TYPE,
            "version": 1,
            "saved_at": "2024-01-01T00:00:00.000Z",
            "meta": { "character_name": "a", "world_name": "루나" },
            "payload": { "basic": { "character_name": "a" }, "item_equipment": { "item_equipment": [ { "item_icon": HASH } ] } }
        });
        let snap = codec.decode_value(v1, fixed_now()).unwrap();
        assert_eq!(snap.version, 2);
        assert_eq!(snap.saved_at, "2024-01-01T00:00:00.000Z");
        assert_eq!(snap.assets.as_ref().unwrap().icon_urls.len(), 1);
        assert_eq!(snap.world_label(), "루나");
    }

    #[test]
    fn encode_prefers_tracked_world_and_keeps_unknown_keys() {
        let codec = SnapshotCodec::default();
        let mut payload = Payload::from_value(json!({
            "basic": { "character_name": "메이플", "world_name": "루나" },
            "custom_field": { "x": 1 }
        }))
        .unwrap();
        let snap = codec.encode(&mut payload, Some("스카니아"), fixed_now());
        assert_eq!(snap.meta.world_name.as_deref(), Some("스카니아"));
        assert_eq!(snap.payload.as_map()["custom_field"], json!({ "x": 1 }));
        assert_eq!(snap.payload.as_map()["_assets"]["icon_urls"], json!([]));

        let bytes = codec.to_bytes(&snap).unwrap();
        let back = codec.decode(&bytes, fixed_now()).unwrap();
        assert_eq!(back.meta, snap.meta);
        assert_eq!(back.payload, snap.payload);
    }

    #[test]
    fn filename_uses_fallbacks_and_dashes() {
        let meta = SnapshotMeta {
            character_name: None,
            world_name: Some("스카니아".to_string()),
        };
        assert_eq!(
            export_filename(&meta, fixed_now()),
            "maplem_스카니아_character_2025-03-01T12-30-45-000Z.json"
        );
        assert_eq!(
            export_filename(&SnapshotMeta::default(), fixed_now()),
            "maplem_world_character_2025-03-01T12-30-45-000Z.json"
        );
    }
}
