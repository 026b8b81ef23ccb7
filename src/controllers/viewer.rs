use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;
use log::debug;

use crate::controllers::snapshot::attachment;
use crate::models::{ApiResponse, CharacterQuery, CharacterView, ImportResponse, ViewerStatus};
use crate::services::controller::{CurrentView, SearchOutcome, ViewerController};
use crate::utils::error::AppResult;

fn character_view(view: CurrentView) -> CharacterView {
    CharacterView {
        world_label: view.world_label,
        render: view.render,
    }
}

/// 뷰어 검색
///
/// 오프라인 모드면 불러온 스냅샷을, 아니면 네트워크 조회 결과를 현재 캐릭터로
/// 올린다. 더 새 검색에 밀린 요청은 204 로 끝난다.
#[utoipa::path(
    post,
    path = "/api/viewer/search",
    request_body = CharacterQuery,
    responses(
        (status = 200, description = "현재 캐릭터", body = ApiResponse<CharacterView>),
        (status = 204, description = "새 검색에 밀려 취소됨")
    )
)]
#[post("/api/viewer/search")]
pub async fn viewer_search(
    req: web::Json<CharacterQuery>,
    viewer: web::Data<ViewerController>,
) -> AppResult<HttpResponse> {
    match viewer.search(&req.world_name, &req.q).await? {
        SearchOutcome::Loaded(view) => Ok(HttpResponse::Ok().json(ApiResponse::ok(character_view(view)))),
        SearchOutcome::Superseded => {
            debug!("밀려난 검색: q={}", req.q);
            Ok(HttpResponse::NoContent().finish())
        }
    }
}

/// 스냅샷을 뷰어에 올리고 오프라인 모드로 전환
#[utoipa::path(
    post,
    path = "/api/viewer/import",
    request_body(content = serde_json::Value, content_type = "application/json"),
    responses(
        (status = 200, description = "가져오기 성공", body = ApiResponse<ImportResponse>),
        (status = 400, description = "형식 오류, 상태는 그대로")
    )
)]
#[post("/api/viewer/import")]
pub async fn viewer_import(body: web::Bytes, viewer: web::Data<ViewerController>) -> AppResult<HttpResponse> {
    let imported = viewer.import_snapshot(&body, Utc::now())?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ImportResponse {
        meta: imported.meta,
        version: imported.version,
        render: imported.view.render,
    })))
}

#[utoipa::path(
    get,
    path = "/api/viewer/export",
    responses(
        (status = 200, description = "스냅샷 파일", body = crate::models::Snapshot, content_type = "application/json"),
        (status = 400, description = "내보낼 캐릭터 없음")
    )
)]
#[get("/api/viewer/export")]
pub async fn viewer_export(viewer: web::Data<ViewerController>) -> AppResult<HttpResponse> {
    let exported = viewer.export_snapshot(Utc::now())?;
    let bytes = serde_json::to_vec_pretty(&exported.snapshot)?;
    Ok(attachment(&exported.filename, bytes))
}

#[utoipa::path(
    get,
    path = "/api/viewer/current",
    responses(
        (status = 200, description = "현재 캐릭터 (없으면 data 가 null)", body = ApiResponse<CharacterView>)
    )
)]
#[get("/api/viewer/current")]
pub async fn viewer_current(viewer: web::Data<ViewerController>) -> AppResult<HttpResponse> {
    let response = match viewer.current() {
        Some(view) => ApiResponse::ok(character_view(view)),
        None => ApiResponse {
            code: 200,
            status: "OK".to_string(),
            message: Some("표시 중인 캐릭터가 없습니다.".to_string()),
            data: None,
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/api/viewer/offline",
    responses(
        (status = 200, description = "오프라인 모드 해제", body = ApiResponse<ViewerStatus>)
    )
)]
#[delete("/api/viewer/offline")]
pub async fn viewer_clear_offline(viewer: web::Data<ViewerController>) -> AppResult<HttpResponse> {
    viewer.clear_offline_mode();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ViewerStatus {
        offline: viewer.is_offline(),
        has_current: viewer.current().is_some(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payload::Payload;
    use crate::services::controller::CharacterFetcher;
    use crate::services::snapshot::SnapshotCodec;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use futures::future::BoxFuture;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct EchoFetcher;

    impl CharacterFetcher for EchoFetcher {
        fn fetch<'a>(&'a self, world: &'a str, name: &'a str) -> BoxFuture<'a, AppResult<Payload>> {
            Box::pin(async move {
                Payload::from_value(json!({ "basic": { "character_name": name, "world_name": world } }))
            })
        }
    }

    fn viewer() -> web::Data<ViewerController> {
        web::Data::new(ViewerController::new(Arc::new(EchoFetcher), SnapshotCodec::default()))
    }

    #[actix_web::test]
    async fn export_before_any_search_is_rejected() {
        let app = test::init_service(App::new().app_data(viewer()).service(viewer_export)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/viewer/export").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn import_then_search_stays_offline_until_cleared() {
        let app = test::init_service(
            App::new()
                .app_data(viewer())
                .service(viewer_import)
                .service(viewer_search)
                .service(viewer_clear_offline)
                .service(viewer_current),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/viewer/import")
            .set_payload(json!({ "basic": { "character_name": "저장본", "world_name": "제니스" } }).to_string())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["version"], 2);

        let req = test::TestRequest::post()
            .uri("/api/viewer/search")
            .set_json(json!({ "q": "다른캐릭", "world_name": "루나" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["world_label"], "제니스");

        let req = test::TestRequest::delete().uri("/api/viewer/offline").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["offline"], false);
        assert_eq!(body["data"]["has_current"], true);

        let req = test::TestRequest::post()
            .uri("/api/viewer/search")
            .set_json(json!({ "q": "다른캐릭", "world_name": "루나" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["world_label"], "루나");
    }
}
