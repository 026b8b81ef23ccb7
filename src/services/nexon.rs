use futures::future::BoxFuture;
use moka::future::Cache;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::AppConfig;
use crate::models::payload::{Payload, SectionKey};
use crate::services::controller::CharacterFetcher;
use crate::utils::error::{AppError, AppResult};
use crate::utils::icon::IconResolver;

const API_KEY_HEADER: &str = "x-nxopen-api-key";
const ID_PATH: &str = "/maplestorym/v1/id";

static OCID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{64}$").unwrap());

/// 항상 받아오는 섹션 (요청 순서)
pub const REQUIRED_SECTIONS: [(SectionKey, &str); 11] = [
    (SectionKey::Basic, "/maplestorym/v1/character/basic"),
    (SectionKey::Stat, "/maplestorym/v1/character/stat"),
    (SectionKey::ItemEquipment, "/maplestorym/v1/character/item-equipment"),
    (SectionKey::SetEffect, "/maplestorym/v1/character/set-effect"),
    (SectionKey::Symbol, "/maplestorym/v1/character/symbol"),
    (SectionKey::Jewel, "/maplestorym/v1/character/jewel"),
    (SectionKey::AndroidEquipment, "/maplestorym/v1/character/android-equipment"),
    (SectionKey::PetEquipment, "/maplestorym/v1/character/pet-equipment"),
    (SectionKey::SkillEquipment, "/maplestorym/v1/character/skill-equipment"),
    (SectionKey::LinkSkill, "/maplestorym/v1/character/link-skill"),
    (SectionKey::Vmatrix, "/maplestorym/v1/character/vmatrix"),
];

/// 실패하면 빼고 넘어가는 섹션
pub const OPTIONAL_SECTIONS: [(SectionKey, &str); 6] = [
    (SectionKey::Union, "/maplestorym/v1/user/union"),
    (SectionKey::UnionRaider, "/maplestorym/v1/user/union-raider"),
    (SectionKey::Guild, "/maplestorym/v1/character/guild"),
    (SectionKey::HexamatrixStat, "/maplestorym/v1/character/hexamatrix-stat"),
    (SectionKey::HexamatrixSkill, "/maplestorym/v1/character/hexamatrix-skill"),
    (SectionKey::HyperStat, "/maplestorym/v1/character/hyper-stat"),
];

pub fn is_ocid(input: &str) -> bool {
    OCID_PATTERN.is_match(input)
}

/// 재시도 대기 시간. 재시도 대상이 아니면 None.
pub fn retry_delay(status: StatusCode, retry_after: Option<&str>, attempt: u32) -> Option<Duration> {
    let exponential = Duration::from_secs(2u64.saturating_pow(attempt));
    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(exponential);
        return Some(wait);
    }
    status.is_server_error().then_some(exponential)
}

/// 캐시에서 공유된 오류를 호출자 몫으로 되돌린다.
fn unshare(err: Arc<AppError>) -> AppError {
    match Arc::try_unwrap(err) {
        Ok(err) => err,
        Err(shared) => match &*shared {
            AppError::TransportError { status, body } => AppError::transport(*status, body.clone()),
            AppError::InputError(msg) => AppError::InputError(msg.clone()),
            AppError::FormatError(msg) => AppError::FormatError(msg.clone()),
            AppError::ReqwestError(e) => AppError::transport(StatusCode::BAD_GATEWAY.as_u16(), e.to_string()),
            other => AppError::InternalError(other.to_string()),
        },
    }
}

/// 넥슨 오픈 API 클라이언트 (메이플스토리M)
#[derive(Clone)]
pub struct NexonService {
    client: Client,
    api_base: String,
    api_key: String,
    resolver: IconResolver,
    // 업스트림 동시 요청 제한
    request_semaphore: Arc<Semaphore>,
    // OCID → 전체 섹션, 같은 OCID 동시 요청은 한 번만 나간다
    section_cache: Cache<String, Arc<Payload>>,
    max_retries: u32,
    pacing: Duration,
}

impl NexonService {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("HTTP 클라이언트 생성 실패, 기본 설정 사용: {e}");
                Client::new()
            });

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            resolver: IconResolver::new(config.icon_prefix.clone()),
            request_semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            section_cache: Cache::builder()
                .max_capacity(config.cache_capacity)
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .build(),
            max_retries: config.max_retries.max(1),
            pacing: Duration::from_millis(config.request_pacing_ms),
        })
    }

    /// GET + 재시도. 429 는 Retry-After, 5xx 는 지수 대기.
    async fn nx_get(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Value> {
        let url = format!("{}{}", self.api_base, path);
        let query: Vec<(&str, &str)> = params.iter().copied().filter(|(_, v)| !v.is_empty()).collect();

        for attempt in 0..self.max_retries {
            let response = {
                let _permit = self
                    .request_semaphore
                    .acquire()
                    .await
                    .map_err(|e| AppError::InternalError(format!("요청 제한 세마포어 오류: {e}")))?;
                self.client
                    .get(&url)
                    .header(API_KEY_HEADER, &self.api_key)
                    .query(&query)
                    .send()
                    .await?
            };

            let status = response.status();
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            if let Some(wait) = retry_delay(status, retry_after.as_deref(), attempt) {
                log::warn!(
                    "{path} 응답 {status}, {}ms 후 재시도 ({}/{})",
                    wait.as_millis(),
                    attempt + 1,
                    self.max_retries
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                log::error!("{path} 업스트림 오류 {status}: {body}");
                return Err(AppError::transport(
                    status.as_u16(),
                    format!("Upstream error {}: {body}", status.as_u16()),
                ));
            }

            log::debug!("{path} 응답 {status}");
            return Ok(response.json::<Value>().await?);
        }

        Err(AppError::transport(
            StatusCode::TOO_MANY_REQUESTS.as_u16(),
            "Rate-limited by upstream after retries",
        ))
    }

    /// 캐릭터명 → OCID. 64자리 16진수는 그대로 OCID 로 쓴다.
    pub async fn resolve_ocid(&self, name_or_ocid: &str, world_name: &str) -> AppResult<String> {
        let input = name_or_ocid.trim();
        if is_ocid(input) {
            return Ok(input.to_string());
        }
        let data = self
            .nx_get(ID_PATH, &[("character_name", input), ("world_name", world_name)])
            .await?;
        data.get("ocid")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::transport(
                    StatusCode::NOT_FOUND.as_u16(),
                    format!("ID lookup failed for '{input}' in world '{world_name}'"),
                )
            })
    }

    async fn collect_sections(&self, ocid: String) -> AppResult<Arc<Payload>> {
        let mut payload = Payload::from_value(Value::Object(Map::new()))?;

        for (key, path) in REQUIRED_SECTIONS {
            let data = self.nx_get(path, &[("ocid", ocid.as_str())]).await?;
            payload.insert_section(key, data);
            tokio::time::sleep(self.pacing).await;
        }

        for (key, path) in OPTIONAL_SECTIONS {
            match self.nx_get(path, &[("ocid", ocid.as_str())]).await {
                Ok(data) => payload.insert_section(key, data),
                Err(e) => log::warn!("선택 섹션 {key} 생략: {e}"),
            }
            tokio::time::sleep(self.pacing).await;
        }

        let urls = payload.resolve_icons(&self.resolver);
        payload.set_icon_assets(&urls);
        log::info!("OCID {ocid} 섹션 수집 완료 (아이콘 {} 개)", urls.len());
        Ok(Arc::new(payload))
    }

    /// OCID 의 전체 섹션. 캐시에 있으면 캐시, 진행 중이면 그 결과를 기다린다.
    pub async fn fetch_all_sections(&self, ocid: &str) -> AppResult<Arc<Payload>> {
        self.section_cache
            .try_get_with(ocid.to_string(), self.collect_sections(ocid.to_string()))
            .await
            .map_err(unshare)
    }

    /// 캐릭터명(또는 OCID) + 월드 → 아이콘이 보정된 payload
    pub async fn get_character(&self, query: &str, world_name: &str) -> AppResult<Payload> {
        log::debug!("캐릭터 조회: q={query}, world={world_name}");
        let ocid = self.resolve_ocid(query, world_name).await?;
        let payload = self.fetch_all_sections(&ocid).await?;
        Ok(payload.as_ref().clone())
    }
}

impl CharacterFetcher for NexonService {
    fn fetch<'a>(&'a self, world: &'a str, name: &'a str) -> BoxFuture<'a, AppResult<Payload>> {
        Box::pin(self.get_character(name, world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_four_hex_is_used_as_ocid() {
        assert!(is_ocid(&"a".repeat(64)));
        assert!(is_ocid(&"0F".repeat(32)));
        assert!(!is_ocid(&"a".repeat(63)));
        assert!(!is_ocid("메이플"));
        assert!(!is_ocid(&format!("{}g", "a".repeat(63))));
    }

    #[test]
    fn rate_limit_honours_retry_after_with_floor() {
        let s = StatusCode::TOO_MANY_REQUESTS;
        assert_eq!(retry_delay(s, Some("3"), 0), Some(Duration::from_secs(3)));
        assert_eq!(retry_delay(s, Some("0"), 2), Some(Duration::from_secs(1)));
        assert_eq!(retry_delay(s, Some("soon"), 2), Some(Duration::from_secs(4)));
        assert_eq!(retry_delay(s, None, 0), Some(Duration::from_secs(1)));
    }

    #[test]
    fn server_errors_back_off_exponentially_and_client_errors_do_not_retry() {
        assert_eq!(
            retry_delay(StatusCode::BAD_GATEWAY, None, 3),
            Some(Duration::from_secs(8))
        );
        assert_eq!(retry_delay(StatusCode::NOT_FOUND, None, 0), None);
        assert_eq!(retry_delay(StatusCode::OK, None, 0), None);
    }

    #[test]
    fn section_tables_cover_every_payload_key_once() {
        let mut keys: Vec<SectionKey> = REQUIRED_SECTIONS
            .iter()
            .chain(OPTIONAL_SECTIONS.iter())
            .map(|(k, _)| *k)
            .collect();
        assert_eq!(REQUIRED_SECTIONS[0].0, SectionKey::Basic);
        keys.sort_by_key(|k| k.as_str());
        keys.dedup();
        assert_eq!(keys.len(), SectionKey::ALL.len());
    }

    #[test]
    fn shared_cache_error_keeps_transport_status() {
        let shared = Arc::new(AppError::transport(404, "nope"));
        let _other = shared.clone();
        match unshare(shared) {
            AppError::TransportError { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "nope");
            }
            other => panic!("transport expected, got {other:?}"),
        }
    }

    #[test]
    fn missing_api_key_fails_construction() {
        let cfg = AppConfig {
            api_key: None,
            ..AppConfig::default()
        };
        assert!(matches!(NexonService::new(&cfg), Err(AppError::ConfigError(_))));
    }
}
