//! 정규화된 payload → 렌더 모델.
//!
//! 섹션마다 보임 여부와 내용(또는 빈 자리 문구)을 만든다. 예상 밖 모양의
//! 데이터는 섹션 단위가 아니라 전체를 오류 카드 하나로 바꾼다.

mod equipment;
mod sections;
mod skills;
mod union;

use crate::models::payload::{BasicInfo, Payload, SectionKey, StatSection};
use crate::models::view::{
    ErrorCard, HeaderView, RenderModel, RenderOutcome, Section, SectionContent, StatLine, StatsView, ViewKey,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::to_man_notation;

/// 만 단위로 보여주는 대표 스탯 (표시 순서)
pub const HEADLINE_STATS: [&str; 7] = [
    "전투력",
    "HP",
    "MP",
    "물리 공격력",
    "마법 공격력",
    "물리 방어력",
    "마법 방어력",
];

/// 렌더 실패 카드 제목
pub const RENDER_ERROR_TITLE: &str = "렌더링 오류";

/// payload 를 렌더 모델로. 어떤 입력이든 결과를 돌려준다.
pub fn project(payload: &Payload, world_label: Option<&str>) -> RenderOutcome {
    match build(payload, world_label) {
        Ok(model) => {
            log::debug!("렌더 모델 생성: 섹션 {} 개", model.sections.len());
            RenderOutcome::Rendered(model)
        }
        Err(e) => {
            log::error!("렌더링 실패: {e}");
            RenderOutcome::Failed(ErrorCard {
                title: RENDER_ERROR_TITLE.to_string(),
                detail: e.to_string(),
            })
        }
    }
}

fn build(payload: &Payload, world_label: Option<&str>) -> AppResult<RenderModel> {
    let basic: BasicInfo = payload
        .section(SectionKey::Basic)?
        .ok_or_else(|| AppError::RenderError("basic 섹션이 없습니다.".to_string()))?;

    let world_label = world_label
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| basic.world_name.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "-".to_string());

    let skill_section = payload.section(SectionKey::SkillEquipment)?;

    let mut sections = vec![
        header(&basic, &world_label),
        stats(payload.section(SectionKey::Stat)?),
        sections::symbols(payload.section(SectionKey::Symbol)?),
        equipment::equipment(payload.section(SectionKey::ItemEquipment)?),
        sections::set_effects(payload.section(SectionKey::SetEffect)?),
        sections::jewels(payload.section(SectionKey::Jewel)?),
        sections::android(payload.section(SectionKey::AndroidEquipment)?),
        sections::pets(payload.section(SectionKey::PetEquipment)?),
        skills::equipped_skills(skill_section.as_ref()),
        skills::skill_presets(skill_section.as_ref()),
        skills::link_skills(payload.section(SectionKey::LinkSkill)?),
        skills::vmatrix(payload.section(SectionKey::Vmatrix)?),
        union::union(
            payload.section(SectionKey::Union)?,
            payload.section(SectionKey::UnionRaider)?,
        ),
    ];
    sections.extend(union::records(payload)?);

    Ok(RenderModel {
        world_label,
        sections,
    })
}

fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or("-")
        .to_string()
}

fn header(basic: &BasicInfo, world_label: &str) -> Section {
    let mut times = Vec::new();
    if let Some(t) = basic.character_date_create.as_deref().filter(|s| !s.is_empty()) {
        times.push(format!("생성: {t}"));
    }
    if let Some(t) = basic.character_date_last_login.as_deref().filter(|s| !s.is_empty()) {
        times.push(format!("최근 접속: {t}"));
    }
    if let Some(t) = basic.character_date_last_logout.as_deref().filter(|s| !s.is_empty()) {
        times.push(format!("최근 로그아웃: {t}"));
    }

    let job = basic
        .character_job_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(basic.character_class.as_deref());

    Section::filled(
        ViewKey::Header,
        "기본 정보",
        SectionContent::Header(HeaderView {
            image: basic.character_image.clone().filter(|s| !s.is_empty()),
            name: or_dash(basic.character_name.as_deref()),
            job: or_dash(job),
            world: world_label.to_string(),
            level: or_dash(basic.character_level.as_deref()),
            times: times.join(" · "),
        }),
    )
}

fn stats(section: Option<StatSection>) -> Section {
    let section = section.unwrap_or_default();
    let entries = section.entries();
    let lookup = |name: &str| {
        entries
            .iter()
            .find(|e| e.stat_name.as_deref() == Some(name))
            .and_then(|e| e.stat_value.as_deref())
    };

    let headline = HEADLINE_STATS
        .iter()
        .map(|name| StatLine {
            name: name.to_string(),
            value: to_man_notation(lookup(name)),
            emphasized: *name == "전투력",
        })
        .collect();

    let others = entries
        .iter()
        .filter_map(|e| {
            let name = e.stat_name.as_deref().filter(|s| !s.is_empty())?;
            if HEADLINE_STATS.contains(&name) {
                return None;
            }
            Some(StatLine {
                name: name.to_string(),
                value: or_dash(e.stat_value.as_deref()),
                emphasized: false,
            })
        })
        .collect();

    Section::filled(
        ViewKey::Stats,
        "스탯",
        SectionContent::Stats(StatsView { headline, others }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        Payload::from_value(value).unwrap()
    }

    #[test]
    fn header_prefers_tracked_world_and_joins_times() {
        let p = payload(json!({
            "basic": {
                "character_name": "메이플",
                "world_name": "루나",
                "character_class": "아크메이지",
                "character_level": 250,
                "character_date_create": "2020-01-01",
                "character_date_last_logout": "2025-03-01"
            }
        }));
        let outcome = project(&p, Some("스카니아"));
        let model = outcome.model().unwrap();
        assert_eq!(model.world_label, "스카니아");
        let SectionContent::Header(h) = &model.section(ViewKey::Header).unwrap().content else {
            panic!("header expected");
        };
        assert_eq!(h.job, "아크메이지");
        assert_eq!(h.level, "250");
        assert_eq!(h.world, "스카니아");
        assert_eq!(h.times, "생성: 2020-01-01 · 최근 로그아웃: 2025-03-01");
    }

    #[test]
    fn headline_stats_use_man_notation() {
        let p = payload(json!({
            "basic": {},
            "stat": { "final_stat": [
                { "stat_name": "전투력", "stat_value": "12345" },
                { "stat_name": "HP", "stat_value": "99999999" },
                { "stat_name": "크리티컬 확률", "stat_value": "35.5" }
            ] }
        }));
        let outcome = project(&p, None);
        let model = outcome.model().unwrap();
        let SectionContent::Stats(s) = &model.section(ViewKey::Stats).unwrap().content else {
            panic!("stats expected");
        };
        assert_eq!(s.headline.len(), 7);
        assert_eq!(s.headline[0].value, "1 만 2345");
        assert!(s.headline[0].emphasized);
        assert_eq!(s.headline[1].value, "9999 만 9999");
        assert_eq!(s.headline[2].value, "-");
        assert_eq!(s.others.len(), 1);
        assert_eq!(s.others[0].value, "35.5");
    }

    #[test]
    fn unexpected_shape_becomes_single_error_card() {
        let p = payload(json!({
            "basic": { "character_name": "a" },
            "item_equipment": { "item_equipment": "not a list" }
        }));
        match project(&p, None) {
            RenderOutcome::Failed(card) => {
                assert_eq!(card.title, RENDER_ERROR_TITLE);
                assert!(card.detail.contains("item_equipment"));
            }
            RenderOutcome::Rendered(_) => panic!("error card expected"),
        }
    }

    #[test]
    fn missing_basic_is_an_error_card() {
        let p = payload(json!({ "stat": {} }));
        assert!(matches!(project(&p, None), RenderOutcome::Failed(_)));
    }

    #[test]
    fn minimal_payload_renders_every_section() {
        let p = payload(json!({ "basic": { "character_name": "a" } }));
        let outcome = project(&p, None);
        let model = outcome.model().unwrap();
        assert_eq!(model.world_label, "-");
        for key in [
            ViewKey::Header,
            ViewKey::Stats,
            ViewKey::Symbols,
            ViewKey::Equipment,
            ViewKey::SetEffects,
            ViewKey::Jewels,
            ViewKey::Android,
            ViewKey::Pets,
            ViewKey::Skills,
            ViewKey::SkillPresets,
            ViewKey::LinkSkills,
            ViewKey::Vmatrix,
            ViewKey::Union,
        ] {
            assert!(model.section(key).is_some(), "{key:?} missing");
        }
        assert!(!model.section(ViewKey::Symbols).unwrap().visible);
        assert!(!model.section(ViewKey::Union).unwrap().visible);
        assert!(model.section(ViewKey::Jewels).unwrap().visible);
    }
}
