use actix_web::web;
use crate::controllers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // 캐릭터 조회
        .service(controllers::get_character)      // GET /api/character
        .service(controllers::get_character_view) // GET /api/character/view
        // 스냅샷
        .service(controllers::import_snapshot)    // POST /api/snapshot/import
        .service(controllers::export_snapshot)    // POST /api/snapshot/export
        // 뷰어 세션
        .service(controllers::viewer_search)      // POST /api/viewer/search
        .service(controllers::viewer_import)      // POST /api/viewer/import
        .service(controllers::viewer_export)      // GET /api/viewer/export
        .service(controllers::viewer_current)     // GET /api/viewer/current
        .service(controllers::viewer_clear_offline) // DELETE /api/viewer/offline
        .service(controllers::health_check);      // GET /health
}
