use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::payload::Payload;

/// 스냅샷 파일 식별자
pub const SNAPSHOT_TYPE: &str = "maplem.viewer.snapshot";
/// 현재 내보내기 버전 (v2 부터 assets 포함)
pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SnapshotMeta {
    pub character_name: Option<String>,
    pub world_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SnapshotAssets {
    #[serde(default)]
    pub icon_urls: Vec<String>,
}

fn legacy_version() -> u32 {
    1
}

/// 오프라인 보기용 스냅샷 봉투
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// ISO-8601
    #[serde(default)]
    pub saved_at: String,
    #[serde(default)]
    pub meta: SnapshotMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<SnapshotAssets>,
    pub payload: Payload,
}

impl Snapshot {
    /// 화면에 쓸 월드 라벨
    pub fn world_label(&self) -> String {
        self.meta
            .world_name
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.payload.world_name())
            .unwrap_or_else(|| "(unknown)".to_string())
    }
}
