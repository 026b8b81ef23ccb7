use actix_web::http::header::{Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue};
use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use log::debug;

use crate::models::{ApiResponse, ExportRequest, ImportResponse};
use crate::services::projector;
use crate::services::snapshot::{export_filename, SnapshotCodec};
use crate::utils::error::AppResult;

/// 첨부 파일 응답. 한글 파일명은 filename* 로 싣는다.
pub(crate) fn attachment(filename: &str, bytes: Vec<u8>) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![
            DispositionParam::Filename("maplem_snapshot.json".to_string()),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: filename.as_bytes().to_vec(),
            }),
        ],
    };
    HttpResponse::Ok()
        .content_type("application/json; charset=utf-8")
        .insert_header(disposition)
        .body(bytes)
}

/// 스냅샷 가져오기
///
/// 스냅샷 봉투(v1/v2) 또는 봉투 없는 payload JSON 을 받아 렌더 결과를 돌려준다.
/// 봉투가 없으면 v2 봉투를 새로 만든 것으로 취급한다.
#[utoipa::path(
    post,
    path = "/api/snapshot/import",
    request_body(content = serde_json::Value, content_type = "application/json"),
    responses(
        (status = 200, description = "가져오기 성공", body = ApiResponse<ImportResponse>),
        (status = 400, description = "스냅샷/payload 형식 아님 또는 basic 누락")
    )
)]
#[post("/api/snapshot/import")]
pub async fn import_snapshot(body: web::Bytes, codec: web::Data<SnapshotCodec>) -> AppResult<HttpResponse> {
    debug!("스냅샷 가져오기 요청: {} bytes", body.len());
    let snapshot = codec.decode(&body, Utc::now())?;
    let render = projector::project(&snapshot.payload, Some(&snapshot.world_label()));

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ImportResponse {
        meta: snapshot.meta,
        version: snapshot.version,
        render,
    })))
}

/// 스냅샷 내보내기
///
/// payload 를 v2 스냅샷 파일로 감싸 첨부로 내려준다.
#[utoipa::path(
    post,
    path = "/api/snapshot/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "스냅샷 파일", body = crate::models::Snapshot, content_type = "application/json")
    )
)]
#[post("/api/snapshot/export")]
pub async fn export_snapshot(
    req: web::Json<ExportRequest>,
    codec: web::Data<SnapshotCodec>,
) -> AppResult<HttpResponse> {
    let ExportRequest {
        mut payload,
        world_label,
    } = req.into_inner();
    let now = Utc::now();
    let snapshot = codec.encode(&mut payload, world_label.as_deref(), now);
    let filename = export_filename(&snapshot.meta, now);
    debug!("스냅샷 내보내기: {filename}");

    Ok(attachment(&filename, codec.to_bytes(&snapshot)?))
}
