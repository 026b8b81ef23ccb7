use actix_web::{get, web, HttpResponse};
use log::debug;

use crate::models::{ApiResponse, CharacterQuery, CharacterView};
use crate::services::controller::{validate_search, CharacterFetcher};
use crate::services::projector;
use crate::utils::error::AppResult;

/// 캐릭터 조회 (원본 payload)
///
/// 캐릭터명(또는 64자리 OCID)과 월드로 모든 섹션을 받아 아이콘을 보정한
/// 그대로 돌려준다. `_assets.icon_urls` 에 아이콘 목록이 붙는다.
#[utoipa::path(
    get,
    path = "/api/character",
    params(CharacterQuery),
    responses(
        (status = 200, description = "payload", body = serde_json::Value),
        (status = 400, description = "월드/캐릭터명 누락"),
        (status = 404, description = "캐릭터 없음"),
        (status = 429, description = "업스트림 요청 한도 초과")
    )
)]
#[get("/api/character")]
pub async fn get_character(
    query: web::Query<CharacterQuery>,
    fetcher: web::Data<dyn CharacterFetcher>,
) -> AppResult<HttpResponse> {
    let (world, name) = validate_search(&query.world_name, &query.q)?;
    debug!("캐릭터 조회 요청: q={name}, world={world}");

    let payload = fetcher.fetch(world, name).await?;
    Ok(HttpResponse::Ok().json(payload))
}

/// 캐릭터 조회 후 렌더 모델로 변환
#[utoipa::path(
    get,
    path = "/api/character/view",
    params(CharacterQuery),
    responses(
        (status = 200, description = "렌더 결과 (실패 시 오류 카드)", body = ApiResponse<CharacterView>)
    )
)]
#[get("/api/character/view")]
pub async fn get_character_view(
    query: web::Query<CharacterQuery>,
    fetcher: web::Data<dyn CharacterFetcher>,
) -> AppResult<HttpResponse> {
    let (world, name) = validate_search(&query.world_name, &query.q)?;
    debug!("캐릭터 화면 요청: q={name}, world={world}");

    let payload = fetcher.fetch(world, name).await?;
    let render = projector::project(&payload, Some(world));
    Ok(HttpResponse::Ok().json(ApiResponse::ok(CharacterView {
        world_label: world.to_string(),
        render,
    })))
}
