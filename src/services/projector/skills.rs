use std::collections::BTreeMap;

use crate::models::payload::{LinkSkillSection, SkillEquipmentSection, VCore, VMatrixSection};
use crate::models::view::{
    LinkPresetView, LinkSkillCard, LinkSkillsView, Section, SectionContent, SkillCard, SkillPresetView, SkillSetView,
    SkillsView, VCoreCard, VCoreGroupView, VCoreKind, ViewKey,
};
use crate::utils::aggregate::{merge_by_name, NamedEffect};
use crate::utils::effect_text::effect_text_to_chips;
use crate::utils::format::parse_skill_name_and_level;

const UNKNOWN_SKILL: &str = "(Unknown)";

fn skill_card(raw: &str) -> SkillCard {
    let (name, level) = parse_skill_name_and_level(Some(raw));
    SkillCard {
        name,
        level: level.map(|lv| format!("Lv. {lv}")),
    }
}

/// 장착 스킬을 세트 번호별로
pub(super) fn equipped_skills(section: Option<&SkillEquipmentSection>) -> Section {
    let equipped = section
        .and_then(|s| s.skill.as_ref())
        .map(|s| s.equipment_skill.as_slice())
        .unwrap_or_default();
    if equipped.is_empty() {
        return Section::empty(ViewKey::Skills, "스킬 장착", "스킬 장착 없음");
    }

    let mut by_set: BTreeMap<i64, Vec<SkillCard>> = BTreeMap::new();
    for skill in equipped {
        let raw = skill.skill_name.as_deref().unwrap_or("");
        let card = if raw.is_empty() {
            SkillCard {
                name: "-".to_string(),
                level: None,
            }
        } else {
            skill_card(raw)
        };
        by_set.entry(skill.equipment_skill_set.unwrap_or(0)).or_default().push(card);
    }

    let summary = format!(
        "사용 세트: {}",
        by_set.keys().map(i64::to_string).collect::<Vec<_>>().join(", ")
    );
    let sets = by_set
        .into_iter()
        .map(|(set_no, skills)| SkillSetView {
            set_no,
            title: format!("세트 {set_no}"),
            skills,
        })
        .collect();
    Section::filled(
        ViewKey::Skills,
        "스킬 장착",
        SectionContent::Skills(SkillsView { summary, sets }),
    )
}

pub(super) fn skill_presets(section: Option<&SkillEquipmentSection>) -> Section {
    let mut presets: Vec<_> = section
        .and_then(|s| s.skill.as_ref())
        .map(|s| s.preset.clone())
        .unwrap_or_default();
    if presets.is_empty() {
        return Section::hidden(ViewKey::SkillPresets, "스킬 프리셋");
    }
    presets.sort_by_key(|p| p.preset_slot_no.unwrap_or(0));

    let views = presets
        .iter()
        .map(|p| SkillPresetView {
            title: format!(
                "{}번 스킬 프리셋",
                p.preset_slot_no.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
            ),
            slots: [&p.skill_name_1, &p.skill_name_2, &p.skill_name_3, &p.skill_name_4]
                .into_iter()
                .map(|name| name.as_deref().filter(|s| !s.is_empty()).map(skill_card))
                .collect(),
        })
        .collect();
    Section::filled(ViewKey::SkillPresets, "스킬 프리셋", SectionContent::SkillPresets(views))
}

/// 링크 스킬. 프리셋 안에서 같은 이름은 하나로 합친다.
pub(super) fn link_skills(section: Option<LinkSkillSection>) -> Section {
    let section = section.unwrap_or_default();
    if section.link_skill.is_empty() {
        return Section::empty(ViewKey::LinkSkills, "링크 스킬", "링크 스킬 없음");
    }

    let active = section.use_preset_no;
    let mut presets = section.link_skill;
    presets.sort_by_key(|p| p.preset_no.unwrap_or(0));

    let views = presets
        .into_iter()
        .map(|preset| {
            let merged = merge_by_name(preset.link_skill_info.into_iter().map(|info| NamedEffect {
                name: info.skill_name.unwrap_or_else(|| "-".to_string()),
                level: info.skill_level.unwrap_or(0),
                effect: info.skill_effect.filter(|e| !e.trim().is_empty()),
                icon: info.skill_icon.filter(|s| !s.is_empty()),
            }));
            let skills: Vec<LinkSkillCard> = merged
                .into_iter()
                .map(|m| LinkSkillCard {
                    chips: m.effect.as_deref().map(effect_text_to_chips).unwrap_or_default(),
                    level: format!("Lv. {}", m.level),
                    name: m.name,
                    icon: m.icon,
                    effect: m.effect,
                    merged_count: m.count,
                })
                .collect();
            let is_active = preset.preset_no.is_some() && preset.preset_no == active;
            LinkPresetView {
                preset_no: preset.preset_no,
                title: format!(
                    "프리셋 {}",
                    preset.preset_no.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
                ),
                active: is_active,
                empty_message: skills.is_empty().then(|| "링크 없음".to_string()),
                skills,
            }
        })
        .collect();

    Section::filled(
        ViewKey::LinkSkills,
        "링크 스킬",
        SectionContent::LinkSkills(LinkSkillsView {
            active_label: active.map(|n| format!("활성 프리셋: {n}")),
            presets: views,
        }),
    )
}

fn core_card(kind: VCoreKind, core: &VCore) -> VCoreCard {
    let targets = if kind == VCoreKind::Enhancement {
        [&core.v_core_skill_name_1, &core.v_core_skill_name_2, &core.v_core_skill_name_3]
            .into_iter()
            .filter_map(|name| name.as_deref())
            .filter(|name| !name.is_empty() && *name != UNKNOWN_SKILL)
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };
    VCoreCard {
        kind,
        name: core.v_core_name.clone().unwrap_or_else(|| "-".to_string()),
        level: core.v_core_level.map(|lv| format!("Lv. {lv}")),
        slot_id: core.slot_id.clone(),
        targets,
        chips: core
            .v_core_skill_effect
            .as_deref()
            .map(effect_text_to_chips)
            .unwrap_or_default(),
    }
}

/// V 코어를 스킬 / 강화 / 특수 순으로 묶는다. 알 수 없는 타입은 버린다.
pub(super) fn vmatrix(section: Option<VMatrixSection>) -> Section {
    let cores = section.map(|s| s.character_v_core_equipment).unwrap_or_default();
    if cores.is_empty() {
        return Section::empty(ViewKey::Vmatrix, "V 매트릭스", "V 매트릭스 없음");
    }

    let mut dropped = 0usize;
    let mut buckets: Vec<(VCoreKind, Vec<VCoreCard>)> =
        VCoreKind::ORDER.iter().map(|&k| (k, Vec::new())).collect();
    for core in &cores {
        match core.v_core_type.as_deref().and_then(VCoreKind::parse) {
            Some(kind) => {
                if let Some((_, bucket)) = buckets.iter_mut().find(|(k, _)| *k == kind) {
                    bucket.push(core_card(kind, core));
                }
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("알 수 없는 V 코어 타입 {dropped} 개 제외");
    }

    let groups: Vec<VCoreGroupView> = buckets
        .into_iter()
        .filter(|(_, cards)| !cards.is_empty())
        .map(|(kind, cores)| VCoreGroupView {
            kind,
            title: kind.title().to_string(),
            cores,
        })
        .collect();
    if groups.is_empty() {
        return Section::empty(ViewKey::Vmatrix, "V 매트릭스", "V 매트릭스 없음");
    }
    Section::filled(ViewKey::Vmatrix, "V 매트릭스", SectionContent::Vmatrix(groups))
}
