pub mod config;
pub mod controllers;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "MapleStory M 캐릭터 뷰어 API"),
    paths(
        controllers::character::get_character,
        controllers::character::get_character_view,
        controllers::snapshot::import_snapshot,
        controllers::snapshot::export_snapshot,
        controllers::viewer::viewer_search,
        controllers::viewer::viewer_import,
        controllers::viewer::viewer_export,
        controllers::viewer::viewer_current,
        controllers::viewer::viewer_clear_offline,
        controllers::health::health_check,
    ),
    components(schemas(
        models::CharacterQuery,
        models::CharacterView,
        models::ImportResponse,
        models::ExportRequest,
        models::ViewerStatus,
        models::Snapshot,
        models::SnapshotMeta,
        models::RenderOutcome,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/character",
            "/api/character/view",
            "/api/snapshot/import",
            "/api/snapshot/export",
            "/api/viewer/search",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
