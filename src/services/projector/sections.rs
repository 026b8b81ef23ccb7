use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::payload::{
    AndroidSection, HeartInfo, ItemGrade, JewelSection, OptionLine, PetSection, SetEffectSection, Symbol,
    SymbolSection,
};
use crate::models::view::{
    AndroidCard, AndroidView, CashItemCard, ItemView, JewelCard, JewelPageView, PetCard, Section, SectionContent,
    SetEffectView, SymbolCard, SymbolGroupView, ViewKey,
};
use crate::utils::effect_text::{effect_text_to_chips, set_effect_to_chips};
use crate::utils::format::format_date;

use super::equipment::starforce_chip;

static SYMBOL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(아케인\s*심볼|아케인심볼|어센틱\s*심볼|어센틱심볼)\s*:\s*").unwrap());

/// 펫 분류 키워드. 앞에서부터 처음 포함되는 것.
pub const PET_TYPE_KEYWORDS: [&str; 8] = ["루나 쁘띠", "루나", "쁘띠", "핑크빈", "예티", "리린", "드래곤", "키티"];
pub const PET_TYPE_FALLBACK: &str = "기타";

pub fn classify_pet_type(text: &str) -> &'static str {
    PET_TYPE_KEYWORDS
        .iter()
        .find(|k| text.contains(*k))
        .copied()
        .unwrap_or(PET_TYPE_FALLBACK)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

fn symbol_group(title: &str, kind: &str, symbols: &[Symbol]) -> SymbolGroupView {
    let cards: Vec<SymbolCard> = symbols
        .iter()
        .map(|sym| {
            let raw_name = sym.symbol_name.as_deref().unwrap_or("-");
            let region = SYMBOL_PREFIX.replace(raw_name, "").trim().to_string();
            SymbolCard {
                kind: kind.to_string(),
                icon: non_empty(&sym.symbol_icon),
                name: format!("{kind} : {region}"),
                level: sym.symbol_level.as_ref().map(|lv| format!("Lv. {lv}")),
                chips: sym.symbol_option.as_deref().map(effect_text_to_chips).unwrap_or_default(),
            }
        })
        .collect();
    SymbolGroupView {
        title: title.to_string(),
        empty_message: cards.is_empty().then(|| "없음".to_string()),
        symbols: cards,
    }
}

pub(super) fn symbols(section: Option<SymbolSection>) -> Section {
    let section = section.unwrap_or_default();
    if section.arcane_symbol.is_empty() && section.authentic_symbol.is_empty() {
        return Section::hidden(ViewKey::Symbols, "심볼");
    }
    Section::filled(
        ViewKey::Symbols,
        "심볼",
        SectionContent::Symbols(vec![
            symbol_group("아케인 심볼", "아케인심볼", &section.arcane_symbol),
            symbol_group("어센틱 심볼", "어센틱심볼", &section.authentic_symbol),
        ]),
    )
}

pub(super) fn set_effects(section: Option<SetEffectSection>) -> Section {
    let sets = section.map(|s| s.set_info).unwrap_or_default();
    if sets.is_empty() {
        return Section::hidden(ViewKey::SetEffects, "세트 효과");
    }
    let views = sets
        .iter()
        .map(|set| SetEffectView {
            title: format!(
                "{} ({}셋)",
                set.set_name.as_deref().unwrap_or("-"),
                set.set_count.as_deref().unwrap_or("-")
            ),
            chips: set.set_option.as_deref().map(set_effect_to_chips).unwrap_or_default(),
        })
        .collect();
    Section::filled(ViewKey::SetEffects, "세트 효과", SectionContent::SetEffects(views))
}

pub(super) fn jewels(section: Option<JewelSection>) -> Section {
    let section = section.unwrap_or_default();
    if section.jewel_equipment.is_empty() {
        return Section::empty(ViewKey::Jewels, "쥬얼", "쥬얼 정보 없음");
    }

    let active = section.use_jewel_page_no;
    let mut pages = section.jewel_equipment;
    pages.sort_by_key(|p| p.jewel_page_no.unwrap_or(0));

    let views = pages
        .into_iter()
        .map(|page| {
            let is_active = page.jewel_page_no.is_some() && page.jewel_page_no == active;
            let page_option = page
                .jewel_page_option
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(page.jewel_page_effect.as_deref())
                .unwrap_or("");
            let jewels: Vec<JewelCard> = page
                .jewel_info
                .iter()
                .map(|j| JewelCard {
                    name: j.jewel_name.clone().unwrap_or_else(|| "-".to_string()),
                    icon: non_empty(&j.jewel_icon),
                    grade: non_empty(&j.jewel_grade).map(|g| g.to_uppercase()),
                    chips: j.jewel_option.as_deref().map(effect_text_to_chips).unwrap_or_default(),
                })
                .collect();
            JewelPageView {
                page_no: page.jewel_page_no,
                title: format!(
                    "쥬얼 페이지 {}",
                    page.jewel_page_no.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
                ),
                active: is_active,
                status: if is_active { "사용 중" } else { "비활성" }.to_string(),
                chips: effect_text_to_chips(page_option),
                empty_message: jewels.is_empty().then(|| "젬 없음".to_string()),
                jewels,
            }
        })
        .collect();
    Section::filled(ViewKey::Jewels, "쥬얼", SectionContent::Jewels(views))
}

fn heart_view(heart: &HeartInfo) -> ItemView {
    let grade = non_empty(&heart.item_grade);
    let main = heart
        .item_option
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(heart.heart_option.as_deref())
        .map(effect_text_to_chips)
        .unwrap_or_default();
    // 하트는 장비와 달리 빈 줄을 채우지 않는다
    let lines = |options: &[OptionLine]| {
        let lines: Vec<String> = options.iter().filter_map(|o| o.display()).collect();
        (!lines.is_empty()).then_some(lines)
    };
    ItemView {
        name: heart.heart_name.clone().unwrap_or_else(|| "-".to_string()),
        icon: non_empty(&heart.heart_icon),
        grade_style: ItemGrade::style_for(grade.as_deref()),
        grade,
        starforce: starforce_chip(heart.starforce_upgrade.as_deref()),
        level: heart.equipment_level.map(|lv| format!("Lv. {lv}")),
        main_options: main,
        potential: lines(&heart.item_potential_option),
        additional: lines(&heart.item_additional_potential_option),
        ..ItemView::default()
    }
}

pub(super) fn android(section: Option<AndroidSection>) -> Section {
    let section = section.unwrap_or_default();
    let android = section.android_equipment.filter(|a| !a.is_empty());
    let heart = section.heart_equipment.filter(|h| !h.is_empty());

    let android_card = android.as_ref().map(|ad| {
        let mut tags = Vec::new();
        if ad.android_non_humanoid_flag.as_deref() == Some("1") {
            tags.push("비인간형".to_string());
        }
        let warehouse = if ad.android_warehouse_usable_flag.as_deref() == Some("1") {
            "창고 사용가능"
        } else {
            "창고 사용불가"
        };
        tags.push(warehouse.to_string());
        AndroidCard {
            title: format!(
                "{} ({})",
                ad.android_name.as_deref().unwrap_or("-"),
                ad.android_grade.as_deref().unwrap_or("-")
            ),
            icon: non_empty(&ad.android_icon),
            tags,
        }
    });

    let cash_items: Vec<CashItemCard> = android
        .as_ref()
        .map(|ad| {
            ad.android_cash_item_equipment
                .iter()
                .map(|ci| {
                    let sub: Vec<&str> = [
                        ci.cash_item_equipment_page_name.as_deref(),
                        ci.cash_item_equipment_slot_name.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.is_empty())
                    .collect();
                    CashItemCard {
                        name: ci.cash_item_name.clone().unwrap_or_else(|| "-".to_string()),
                        icon: non_empty(&ci.cash_item_icon),
                        sub: (!sub.is_empty()).then(|| sub.join(" · ")),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let view = AndroidView {
        android_empty: android_card.is_none().then(|| "안드로이드 없음".to_string()),
        android: android_card,
        cash_empty: cash_items.is_empty().then(|| "캐시 장비 없음".to_string()),
        cash_items,
        heart_empty: heart.is_none().then(|| "하트 없음".to_string()),
        heart: heart.as_ref().map(heart_view),
    };
    Section::filled(ViewKey::Android, "안드로이드", SectionContent::Android(view))
}

pub(super) fn pets(section: Option<PetSection>) -> Section {
    let mut pets = section.map(PetSection::into_pets).unwrap_or_default();
    // 최소 세 칸
    while pets.len() < 3 {
        pets.push(Default::default());
    }

    let cards = pets
        .into_iter()
        .enumerate()
        .map(|(i, pet)| {
            let label = format!("펫 {}", i + 1);
            match pet.name.filter(|s| !s.is_empty()) {
                Some(name) => {
                    let source = pet
                        .pet_type
                        .as_deref()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or(name.as_str());
                    PetCard {
                        label,
                        pet_type: Some(classify_pet_type(source).to_string()),
                        expires: pet
                            .date_expire
                            .as_deref()
                            .filter(|s| !s.is_empty())
                            .map(|d| format!("만료: {}", format_date(d))),
                        icon: pet.icon.filter(|s| !s.is_empty()),
                        name,
                    }
                }
                None => PetCard {
                    label,
                    name: "없음".to_string(),
                    icon: None,
                    pet_type: None,
                    expires: None,
                },
            }
        })
        .collect();
    Section::filled(ViewKey::Pets, "펫", SectionContent::Pets(cards))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pet_keyword_table_order() {
        assert_eq!(classify_pet_type("루나 쁘띠 블루"), "루나 쁘띠");
        assert_eq!(classify_pet_type("루나 드림"), "루나");
        assert_eq!(classify_pet_type("원더 쁘띠"), "쁘띠");
        assert_eq!(classify_pet_type("핑크빈"), "핑크빈");
        assert_eq!(classify_pet_type("블랙 키티"), "키티");
        assert_eq!(classify_pet_type("슬라임"), PET_TYPE_FALLBACK);
    }

    #[test]
    fn pet_type_field_wins_over_name() {
        let section: PetSection = serde_json::from_value(json!({
            "pet_1_name": "핑크빈",
            "pet_1_pet_type": "루나 쁘띠",
            "pet_1_date_expire": "2025-12-31T00:00:00+09:00",
            "pet_2_name": "예티",
            "pet_2_pet_type": ""
        }))
        .unwrap();
        let SectionContent::Pets(cards) = pets(Some(section)).content else {
            panic!("pets expected");
        };
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].pet_type.as_deref(), Some("루나 쁘띠"));
        assert_eq!(cards[0].expires.as_deref(), Some("만료: 2025-12-31"));
        assert_eq!(cards[1].pet_type.as_deref(), Some("예티"));
        assert_eq!(cards[2].label, "펫 3");
        assert_eq!(cards[2].name, "없음");
        assert!(cards[2].pet_type.is_none());
    }

    #[test]
    fn symbols_strip_region_prefix_and_hide_when_empty() {
        assert!(!symbols(None).visible);

        let section: SymbolSection = serde_json::from_value(json!({
            "arcane_symbol": [
                { "symbol_name": "아케인심볼 : 소멸의 여로", "symbol_level": 20, "symbol_option": "STR 2200, 아케인포스 220" }
            ]
        }))
        .unwrap();
        let SectionContent::Symbols(groups) = symbols(Some(section)).content else {
            panic!("symbols expected");
        };
        assert_eq!(groups[0].symbols[0].name, "아케인심볼 : 소멸의 여로");
        assert_eq!(groups[0].symbols[0].level.as_deref(), Some("Lv. 20"));
        assert_eq!(groups[0].symbols[0].chips, vec!["STR 2200", "아케인포스 220"]);
        assert_eq!(groups[1].title, "어센틱 심볼");
        assert_eq!(groups[1].empty_message.as_deref(), Some("없음"));
    }

    #[test]
    fn set_effects_title_and_visibility() {
        assert!(!set_effects(None).visible);
        let section: SetEffectSection = serde_json::from_value(json!({
            "set_info": [ { "set_name": "루타비스", "set_count": 4, "set_option": "[STR +20, 최대 HP +1,000]" } ]
        }))
        .unwrap();
        let SectionContent::SetEffects(sets) = set_effects(Some(section)).content else {
            panic!("sets expected");
        };
        assert_eq!(sets[0].title, "루타비스 (4셋)");
        assert_eq!(sets[0].chips, vec!["STR +20", "최대 HP +1,000"]);
    }

    #[test]
    fn jewel_pages_sorted_with_active_flag() {
        assert!(matches!(
            jewels(None).content,
            SectionContent::Empty { ref message } if message == "쥬얼 정보 없음"
        ));

        let section: JewelSection = serde_json::from_value(json!({
            "use_jewel_page_no": "2",
            "jewel_equipment": [
                { "jewel_page_no": 2, "jewel_info": [ { "jewel_name": "루비", "jewel_grade": "s", "jewel_option": "공격력 10" } ] },
                { "jewel_page_no": 1, "jewel_page_effect": "보스 공격력 5%" }
            ]
        }))
        .unwrap();
        let SectionContent::Jewels(pages) = jewels(Some(section)).content else {
            panic!("jewels expected");
        };
        assert_eq!(pages[0].page_no, Some(1));
        assert!(!pages[0].active);
        assert_eq!(pages[0].status, "비활성");
        assert_eq!(pages[0].chips, vec!["보스 공격력 5%"]);
        assert_eq!(pages[0].empty_message.as_deref(), Some("젬 없음"));
        assert!(pages[1].active);
        assert_eq!(pages[1].jewels[0].grade.as_deref(), Some("S"));
    }

    #[test]
    fn android_placeholders_and_heart() {
        let SectionContent::Android(view) = android(None).content else {
            panic!("android expected");
        };
        assert_eq!(view.android_empty.as_deref(), Some("안드로이드 없음"));
        assert_eq!(view.cash_empty.as_deref(), Some("캐시 장비 없음"));
        assert_eq!(view.heart_empty.as_deref(), Some("하트 없음"));

        let section: AndroidSection = serde_json::from_value(json!({
            "android_equipment": {
                "android_name": "안드로이드",
                "android_grade": "레전더리",
                "android_non_humanoid_flag": "1",
                "android_warehouse_usable_flag": "0",
                "android_cash_item_equipment": [ { "cash_item_name": "모자", "cash_item_equipment_slot_name": "모자" } ]
            },
            "heart_equipment": {
                "heart_name": "티타늄 하트",
                "item_grade": "유니크",
                "starforce_upgrade": "5",
                "heart_option": "STR 10",
                "item_potential_option": [ { "option_name": "DEX", "option_value": "+6%" } ]
            }
        }))
        .unwrap();
        let SectionContent::Android(view) = android(Some(section)).content else {
            panic!("android expected");
        };
        let card = view.android.unwrap();
        assert_eq!(card.title, "안드로이드 (레전더리)");
        assert_eq!(card.tags, vec!["비인간형", "창고 사용불가"]);
        assert_eq!(view.cash_items[0].sub.as_deref(), Some("모자"));
        let heart = view.heart.unwrap();
        assert_eq!(heart.starforce.as_deref(), Some("5★"));
        assert_eq!(heart.main_options, vec!["STR 10"]);
        assert_eq!(heart.potential.unwrap(), vec!["DEX +6%"]);
        assert!(heart.additional.is_none());
        assert!(view.heart_empty.is_none());
    }
}
