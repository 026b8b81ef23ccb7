use std::collections::HashMap;

use crate::models::payload::{EquipmentItem, ItemEquipmentSection, ItemGrade, OptionLine};
use crate::models::view::{EquipCard, EquipGroupView, ItemView, Section, SectionContent, SoulView, ViewKey};
use crate::utils::effect_text::effect_text_to_chips;
use crate::utils::format::normalize_ability_flag;
use crate::utils::slot::{normalize_slot, CanonicalSlot, EQUIP_GROUPS, ONE_PIECE_LABEL};

const EMPTY_SLOT: &str = "장비 없음";
const ONE_PIECE_NOTE: &str = "(한벌옷)";
const OPTION_LINES: usize = 3;

/// 잠재/에디셔널 세 줄. 모자라면 "-".
pub(super) fn padded_option_lines(options: &[OptionLine]) -> Vec<String> {
    let mut lines = vec!["-".to_string(); OPTION_LINES];
    for (slot, option) in lines.iter_mut().zip(options.iter()) {
        if let Some(text) = option.display() {
            *slot = text;
        }
    }
    lines
}

pub(super) fn starforce_chip(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty() && *s != "0")?;
    Some(format!("{raw}★"))
}

/// 장비 카드 본문. 장신구는 잠재/에디셔널을 싣지 않는다.
pub(super) fn item_view(item: &EquipmentItem, accessory: bool) -> ItemView {
    let mut flags = Vec::new();
    if let Some(t) = normalize_ability_flag(item.transmission_able.as_deref(), "전승 가능", "전승 불가") {
        flags.push(t);
    }
    if let Some(t) = normalize_ability_flag(item.todd_able.as_deref(), "전수 가능", "전수 불가") {
        flags.push(t);
    }

    let soul = match (&item.soul_info, item.soul_equipment_flag.as_deref()) {
        (Some(info), Some("1")) => Some(SoulView {
            name: info
                .soul_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "소울".to_string()),
            option: info
                .soul_option
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }),
        _ => None,
    };

    // 외형 변경이 있으면 아이콘은 외형 쪽
    let icon = item
        .item_shape_icon
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| item.item_icon.clone().filter(|s| !s.is_empty()));
    let shape_name = item
        .item_shape_name
        .clone()
        .filter(|s| !s.is_empty() && Some(s) != item.item_name.as_ref());

    let grade = item.item_grade.clone().filter(|s| !s.is_empty());
    ItemView {
        name: item.item_name.clone().unwrap_or_else(|| "-".to_string()),
        icon,
        grade_style: ItemGrade::style_for(grade.as_deref()),
        grade,
        starforce: starforce_chip(item.starforce_upgrade.as_deref()),
        level: item.equipment_level.map(|lv| format!("Lv. {lv}")),
        flags,
        main_options: item.item_option.as_deref().map(effect_text_to_chips).unwrap_or_default(),
        potential: (!accessory).then(|| padded_option_lines(&item.item_potential_option)),
        additional: (!accessory).then(|| padded_option_lines(&item.item_additional_potential_option)),
        soul,
        shape_name,
    }
}

fn card(slot: CanonicalSlot, item: Option<&EquipmentItem>) -> EquipCard {
    match item {
        Some(item) => EquipCard {
            slot,
            slot_label: slot.label().to_string(),
            item: Some(item_view(item, slot.is_accessory())),
            note: None,
        },
        None => EquipCard {
            slot,
            slot_label: slot.label().to_string(),
            item: None,
            note: Some(EMPTY_SLOT.to_string()),
        },
    }
}

pub(super) fn equipment(section: Option<ItemEquipmentSection>) -> Section {
    let items = section.map(|s| s.item_equipment).unwrap_or_default();

    let mut by_slot: HashMap<String, EquipmentItem> = HashMap::new();
    for item in items {
        let key = normalize_slot(item.raw_slot());
        if key.is_empty() {
            continue;
        }
        by_slot.entry(key).or_insert(item);
    }

    let one_piece = by_slot.remove(ONE_PIECE_LABEL);
    let has_one_piece = one_piece.is_some();
    if let Some(item) = one_piece {
        by_slot.insert(CanonicalSlot::Top.label().to_string(), item);
    }
    log::debug!("장비 슬롯 {} 개 채움 (한벌옷: {has_one_piece})", by_slot.len());

    let groups = EQUIP_GROUPS
        .iter()
        .map(|group| EquipGroupView {
            title: group.title.to_string(),
            cards: group
                .slots
                .iter()
                .map(|&slot| {
                    if slot == CanonicalSlot::Bottom && has_one_piece {
                        EquipCard {
                            slot,
                            slot_label: format!("{} {ONE_PIECE_NOTE}", slot.label()),
                            item: None,
                            note: Some(ONE_PIECE_NOTE.to_string()),
                        }
                    } else {
                        card(slot, by_slot.get(slot.label()))
                    }
                })
                .collect(),
        })
        .collect();

    Section::filled(ViewKey::Equipment, "장비", SectionContent::Equipment(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(items: serde_json::Value) -> ItemEquipmentSection {
        serde_json::from_value(json!({ "item_equipment": items })).unwrap()
    }

    fn groups(section: Section) -> Vec<EquipGroupView> {
        match section.content {
            SectionContent::Equipment(groups) => groups,
            other => panic!("equipment expected, got {other:?}"),
        }
    }

    fn find<'a>(groups: &'a [EquipGroupView], slot: CanonicalSlot) -> &'a EquipCard {
        groups
            .iter()
            .flat_map(|g| g.cards.iter())
            .find(|c| c.slot == slot)
            .unwrap()
    }

    #[test]
    fn every_canonical_slot_gets_a_placeholder_card() {
        let groups = groups(equipment(None));
        let titles: Vec<&str> = groups.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["무기", "주 방어구", "보조 방어구", "주 장신구", "보조 장신구"]);

        let cards: Vec<&EquipCard> = groups.iter().flat_map(|g| g.cards.iter()).collect();
        assert_eq!(cards.len(), CanonicalSlot::ALL.len());
        for card in cards {
            assert!(card.item.is_none());
            assert_eq!(card.note.as_deref(), Some(EMPTY_SLOT));
        }
    }

    #[test]
    fn one_piece_moves_to_top_and_marks_bottom() {
        let groups = groups(equipment(Some(section(json!([
            { "item_name": "드레스", "item_equipment_slot_name": "한벌옷" }
        ])))));
        let top = find(&groups, CanonicalSlot::Top);
        assert_eq!(top.item.as_ref().unwrap().name, "드레스");
        let bottom = find(&groups, CanonicalSlot::Bottom);
        assert!(bottom.item.is_none());
        assert_eq!(bottom.slot_label, "하의 (한벌옷)");
        assert_eq!(bottom.note.as_deref(), Some("(한벌옷)"));
    }

    #[test]
    fn first_item_per_slot_wins_and_page_name_is_fallback() {
        let groups = groups(equipment(Some(section(json!([
            { "item_name": "첫 반지", "item_equipment_slot_name": "반지 (2번째)" },
            { "item_name": "둘째 반지", "item_equipment_slot_name": "반지2번째" },
            { "item_name": "석궁", "item_equipment_page_name": "석궁" },
            { "item_name": "이름 없는 슬롯" }
        ])))));
        assert_eq!(find(&groups, CanonicalSlot::Ring2).item.as_ref().unwrap().name, "첫 반지");
        assert_eq!(find(&groups, CanonicalSlot::Weapon).item.as_ref().unwrap().name, "석궁");
    }

    #[test]
    fn accessories_hide_potentials_and_others_pad_to_three() {
        let groups = groups(equipment(Some(section(json!([
            {
                "item_name": "모자",
                "item_equipment_slot_name": "모자",
                "item_grade": "레전더리",
                "starforce_upgrade": "17",
                "equipment_level": 160,
                "transmission_able": "전승 가능",
                "item_option": "STR 40, DEX 40",
                "item_potential_option": [ { "option_name": "STR", "option_value": "+12%" } ]
            },
            {
                "item_name": "반지",
                "item_equipment_slot_name": "반지1",
                "item_potential_option": [ { "option_name": "STR", "option_value": "+12%" } ]
            }
        ])))));
        let hat = find(&groups, CanonicalSlot::Hat).item.as_ref().unwrap();
        assert_eq!(hat.potential.as_ref().unwrap(), &vec!["STR +12%", "-", "-"]);
        assert_eq!(hat.additional.as_ref().unwrap(), &vec!["-", "-", "-"]);
        assert_eq!(hat.grade_style, ItemGrade::Legendary);
        assert_eq!(hat.starforce.as_deref(), Some("17★"));
        assert_eq!(hat.level.as_deref(), Some("Lv. 160"));
        assert_eq!(hat.flags, vec!["전승 가능"]);
        assert_eq!(hat.main_options, vec!["STR 40", "DEX 40"]);

        let ring = find(&groups, CanonicalSlot::Ring1).item.as_ref().unwrap();
        assert!(ring.potential.is_none());
        assert!(ring.additional.is_none());
    }

    #[test]
    fn soul_and_shape_override() {
        let item: EquipmentItem = serde_json::from_value(json!({
            "item_name": "무기",
            "item_icon": "https://x/w.png",
            "item_shape_name": "외형 무기",
            "item_shape_icon": "https://x/s.png",
            "soul_equipment_flag": "1",
            "soul_info": { "soul_name": null, "soul_option": " 공격력 +20 " }
        }))
        .unwrap();
        let view = item_view(&item, false);
        assert_eq!(view.icon.as_deref(), Some("https://x/s.png"));
        assert_eq!(view.shape_name.as_deref(), Some("외형 무기"));
        let soul = view.soul.unwrap();
        assert_eq!(soul.name, "소울");
        assert_eq!(soul.option.as_deref(), Some("공격력 +20"));
        assert_eq!(view.grade_style, ItemGrade::Normal);
    }
}
