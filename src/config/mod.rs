use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::utils::error::{AppError, AppResult};

pub const DEFAULT_API_BASE: &str = "https://open.api.nexon.com";
pub const DEFAULT_ICON_PREFIX: &str = "https://open.api.nexon.com/static/maplestorym/asset/icon/";

/// 조회 가능한 월드 (고정 선택지)
pub const WORLD_NAMES: [&str; 7] = ["아케인", "크로아", "엘리시움", "루나", "스카니아", "유니온", "제니스"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub api_key: Option<String>,
    pub api_base: String,
    pub icon_prefix: String,
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
    pub max_concurrent_requests: usize,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub request_pacing_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("PORT", 8000),
            cors_allowed_origins: vec!["*".to_string()],
            // NXOPEN_API_KEY 우선, 없으면 MAPLE_M_API_KEY
            api_key: env::var("NXOPEN_API_KEY")
                .or_else(|_| env::var("MAPLE_M_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            api_base: env::var("NEXON_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            icon_prefix: env::var("ICON_PREFIX").unwrap_or_else(|_| DEFAULT_ICON_PREFIX.to_string()),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", 300),
            cache_capacity: env_or("CACHE_CAPACITY", 512),
            max_concurrent_requests: env_or("MAX_CONCURRENT_REQUESTS", 3),
            max_retries: env_or("MAX_RETRIES", 4),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 20),
            request_pacing_ms: env_or("REQUEST_PACING_MS", 100),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::default()
    }

    /// JSON 설정 파일. 빠진 필드는 환경변수 기본값으로 채운다.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path)
            .map_err(|e| AppError::ConfigError(format!("설정 파일을 열 수 없습니다: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AppError::ConfigError(format!("설정 파일 읽기 실패: {e}")))?;

        serde_json::from_str(&contents)
            .map_err(|e| AppError::ConfigError(format!("설정 파일 파싱 실패: {e}")))
    }

    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::ConfigError(
                "NEXON API key missing. Set NXOPEN_API_KEY or MAPLE_M_API_KEY in .env".to_string(),
            )
        })
    }
}

lazy_static! {
    pub static ref CONFIG: Arc<AppConfig> = Arc::new(match env::var("MAPLEM_CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_else(|e| {
            log::warn!("설정 파일 {path} 로드 실패, 환경변수 설정 사용: {e}");
            AppConfig::from_env()
        }),
        Err(_) => AppConfig::from_env(),
    });
}

pub fn is_known_world(world: &str) -> bool {
    WORLD_NAMES.contains(&world)
}
