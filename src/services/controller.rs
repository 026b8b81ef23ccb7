//! 검색/가져오기/내보내기를 묶는 뷰어 상태.
//!
//! 현재 payload, 오프라인 스냅샷, 진행 중인 조회 하나를 들고 있다. 새 검색은
//! 이전 조회를 취소하고, 취소된 조회의 결과는 조용히 버린다. 실패한 검색이나
//! 가져오기는 상태를 건드리지 않는다.

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable, BoxFuture};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::is_known_world;
use crate::models::payload::Payload;
use crate::models::snapshot::{Snapshot, SnapshotMeta};
use crate::models::view::RenderOutcome;
use crate::services::projector;
use crate::services::snapshot::{export_filename, SnapshotCodec};
use crate::utils::error::{AppError, AppResult};

/// 캐릭터 조회 경계. 실제 구현은 넥슨 API, 테스트에서는 가짜.
pub trait CharacterFetcher: Send + Sync {
    fn fetch<'a>(&'a self, world: &'a str, name: &'a str) -> BoxFuture<'a, AppResult<Payload>>;
}

/// 검색 입력 확인. 공백만 있는 값은 없는 것으로 본다. 월드는 고정 목록 중 하나.
pub fn validate_search<'a>(world: &'a str, name: &'a str) -> AppResult<(&'a str, &'a str)> {
    let world = world.trim();
    let name = name.trim();
    if world.is_empty() || !is_known_world(world) {
        return Err(AppError::InputError("월드를 선택하세요.".to_string()));
    }
    if name.is_empty() {
        return Err(AppError::InputError("캐릭터명을 입력하세요.".to_string()));
    }
    Ok((world, name))
}

/// 화면에 올라가 있는 캐릭터
#[derive(Debug, Clone)]
pub struct CurrentView {
    pub payload: Payload,
    pub world_label: String,
    pub render: RenderOutcome,
}

impl CurrentView {
    fn new(payload: Payload, world_label: String) -> Self {
        let render = projector::project(&payload, Some(&world_label));
        Self {
            payload,
            world_label,
            render,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Loaded(CurrentView),
    /// 더 새 검색에 밀려 버려진 조회
    Superseded,
}

#[derive(Debug, Clone)]
pub struct ImportedSnapshot {
    pub meta: SnapshotMeta,
    pub version: u32,
    pub view: CurrentView,
}

#[derive(Debug, Clone)]
pub struct ExportedSnapshot {
    pub filename: String,
    pub snapshot: Snapshot,
}

#[derive(Default)]
struct ViewerState {
    current: Option<CurrentView>,
    offline: Option<Snapshot>,
    in_flight: Option<(u64, AbortHandle)>,
    next_ticket: u64,
}

pub struct ViewerController {
    fetcher: Arc<dyn CharacterFetcher>,
    codec: SnapshotCodec,
    state: Mutex<ViewerState>,
}

impl ViewerController {
    pub fn new(fetcher: Arc<dyn CharacterFetcher>, codec: SnapshotCodec) -> Self {
        Self {
            fetcher,
            codec,
            state: Mutex::new(ViewerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_offline(&self) -> bool {
        self.state().offline.is_some()
    }

    pub fn current(&self) -> Option<CurrentView> {
        self.state().current.clone()
    }

    /// 오프라인 모드 해제. 화면의 현재 캐릭터는 그대로 둔다.
    pub fn clear_offline_mode(&self) {
        if self.state().offline.take().is_some() {
            log::info!("오프라인 모드 해제");
        }
    }

    /// 오프라인이면 스냅샷을 다시 그리고, 아니면 네트워크 조회.
    pub async fn search(&self, world: &str, name: &str) -> AppResult<SearchOutcome> {
        let (world, name) = validate_search(world, name)?;

        let (handle, registration) = AbortHandle::new_pair();
        let ticket = {
            let mut state = self.state();
            if let Some(snapshot) = &state.offline {
                let label = snapshot
                    .meta
                    .world_name
                    .clone()
                    .filter(|s| !s.is_empty())
                    .or_else(|| snapshot.payload.world_name())
                    .unwrap_or_else(|| world.to_string());
                let mut payload = snapshot.payload.clone();
                payload.resolve_icons(self.codec.resolver());
                let view = CurrentView::new(payload, label);
                log::debug!("오프라인 모드: 스냅샷으로 표시 ({})", view.world_label);
                state.current = Some(view.clone());
                return Ok(SearchOutcome::Loaded(view));
            }

            if let Some((previous, handle)) = state.in_flight.take() {
                log::debug!("이전 조회 #{previous} 취소");
                handle.abort();
            }
            state.next_ticket += 1;
            let ticket = state.next_ticket;
            state.in_flight = Some((ticket, handle));
            ticket
        };
        log::debug!("조회 #{ticket} 시작: {world} / {name}");

        let result = Abortable::new(self.fetcher.fetch(world, name), registration).await;

        let mut state = self.state();
        let still_current = matches!(&state.in_flight, Some((t, _)) if *t == ticket);
        if !still_current {
            log::debug!("조회 #{ticket} 결과 버림");
            return Ok(SearchOutcome::Superseded);
        }
        state.in_flight = None;

        match result {
            Err(_aborted) => Ok(SearchOutcome::Superseded),
            Ok(Err(e)) => {
                log::error!("조회 실패: {e}");
                Err(e)
            }
            Ok(Ok(mut payload)) => {
                payload.resolve_icons(self.codec.resolver());
                let view = CurrentView::new(payload, world.to_string());
                state.current = Some(view.clone());
                Ok(SearchOutcome::Loaded(view))
            }
        }
    }

    /// 스냅샷 파일을 올리고 오프라인 모드로 전환. 실패하면 이전 상태 유지.
    pub fn import_snapshot(&self, bytes: &[u8], now: DateTime<Utc>) -> AppResult<ImportedSnapshot> {
        let snapshot = self.codec.decode(bytes, now)?;
        let view = CurrentView::new(snapshot.payload.clone(), snapshot.world_label());
        let imported = ImportedSnapshot {
            meta: snapshot.meta.clone(),
            version: snapshot.version,
            view: view.clone(),
        };

        let mut state = self.state();
        state.offline = Some(snapshot);
        state.current = Some(view);
        log::info!("스냅샷 로드: {:?} / {:?}", imported.meta.world_name, imported.meta.character_name);
        Ok(imported)
    }

    /// 현재 캐릭터를 v2 스냅샷으로. payload 의 `_assets` 도 갱신된다.
    pub fn export_snapshot(&self, now: DateTime<Utc>) -> AppResult<ExportedSnapshot> {
        let mut state = self.state();
        let Some(current) = state.current.as_mut() else {
            return Err(AppError::InputError(
                "내보낼 데이터가 없습니다. 먼저 검색하거나 스냅샷을 불러오세요.".to_string(),
            ));
        };
        let snapshot = self
            .codec
            .encode(&mut current.payload, Some(&current.world_label), now);
        let filename = export_filename(&snapshot.meta, now);
        log::debug!("스냅샷 내보내기: {filename}");
        Ok(ExportedSnapshot { filename, snapshot })
    }
}
