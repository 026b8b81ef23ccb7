use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::payload::Payload;
use crate::models::snapshot::SnapshotMeta;
use crate::models::view::RenderOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub status: String,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            status: "OK".to_string(),
            message: None,
            data: Some(data),
        }
    }
}

/// 캐릭터 검색 쿼리
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct CharacterQuery {
    /// 캐릭터명 또는 64자리 OCID
    #[serde(default)]
    pub q: String,
    /// 월드명 (아케인, 크로아, 엘리시움, 루나, 스카니아, 유니온, 제니스)
    #[serde(default)]
    pub world_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CharacterView {
    pub world_label: String,
    pub render: RenderOutcome,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportResponse {
    pub meta: SnapshotMeta,
    pub version: u32,
    pub render: RenderOutcome,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub payload: Payload,
    /// 검색 때 고른 월드 라벨. basic.world_name 보다 우선한다.
    pub world_label: Option<String>,
}

/// 뷰어 세션 상태
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ViewerStatus {
    pub offline: bool,
    pub has_current: bool,
}
