use actix_web::{get, HttpResponse, Responder};

/// 헬스 체크
///
/// 프로세스가 살아 있는지만 본다. 업스트림 API 상태는 확인하지 않는다.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "정상", body = String, example = json!("OK"))
    )
)]
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn health_returns_ok_text() {
        let app = test::init_service(App::new().service(health_check)).await;
        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(body, "OK");
    }
}
