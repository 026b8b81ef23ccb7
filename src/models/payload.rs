use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use utoipa::ToSchema;

use crate::utils::error::{AppError, AppResult};
use crate::utils::icon::IconResolver;

/// payload 최상위 섹션 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Basic,
    Stat,
    ItemEquipment,
    SetEffect,
    Symbol,
    Jewel,
    AndroidEquipment,
    PetEquipment,
    SkillEquipment,
    LinkSkill,
    Vmatrix,
    Union,
    UnionRaider,
    Guild,
    HexamatrixStat,
    HexamatrixSkill,
    HyperStat,
}

impl SectionKey {
    pub const ALL: [SectionKey; 17] = [
        SectionKey::Basic,
        SectionKey::Stat,
        SectionKey::ItemEquipment,
        SectionKey::SetEffect,
        SectionKey::Symbol,
        SectionKey::Jewel,
        SectionKey::AndroidEquipment,
        SectionKey::PetEquipment,
        SectionKey::SkillEquipment,
        SectionKey::LinkSkill,
        SectionKey::Vmatrix,
        SectionKey::Union,
        SectionKey::UnionRaider,
        SectionKey::Guild,
        SectionKey::HexamatrixStat,
        SectionKey::HexamatrixSkill,
        SectionKey::HyperStat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Basic => "basic",
            SectionKey::Stat => "stat",
            SectionKey::ItemEquipment => "item_equipment",
            SectionKey::SetEffect => "set_effect",
            SectionKey::Symbol => "symbol",
            SectionKey::Jewel => "jewel",
            SectionKey::AndroidEquipment => "android_equipment",
            SectionKey::PetEquipment => "pet_equipment",
            SectionKey::SkillEquipment => "skill_equipment",
            SectionKey::LinkSkill => "link_skill",
            SectionKey::Vmatrix => "vmatrix",
            SectionKey::Union => "union",
            SectionKey::UnionRaider => "union_raider",
            SectionKey::Guild => "guild",
            SectionKey::HexamatrixStat => "hexamatrix_stat",
            SectionKey::HexamatrixSkill => "hexamatrix_skill",
            SectionKey::HyperStat => "hyper_stat",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 캐릭터 전체 문서. 원본 JSON 을 그대로 들고 있고, 섹션은 필요할 때 타입으로 읽는다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn from_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AppError::FormatError("payload가 비어있습니다.".to_string())),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn raw_section(&self, key: SectionKey) -> Option<&Value> {
        self.0.get(key.as_str()).filter(|v| !v.is_null())
    }

    pub fn has_section(&self, key: SectionKey) -> bool {
        self.raw_section(key).is_some()
    }

    /// 섹션을 타입으로 읽는다. 없거나 null 이면 None, 모양이 다르면 RenderError.
    pub fn section<T: DeserializeOwned>(&self, key: SectionKey) -> AppResult<Option<T>> {
        match self.raw_section(key) {
            None => Ok(None),
            Some(raw) => T::deserialize(raw)
                .map(Some)
                .map_err(|e| AppError::RenderError(format!("{key} 섹션 형식이 예상과 다릅니다: {e}"))),
        }
    }

    fn basic_text(&self, field: &str) -> Option<String> {
        self.raw_section(SectionKey::Basic)?
            .get(field)?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn character_name(&self) -> Option<String> {
        self.basic_text("character_name")
    }

    pub fn world_name(&self) -> Option<String> {
        self.basic_text("world_name")
    }

    /// 아이콘 보정 (제자리) 후 절대 URL 목록
    pub fn resolve_icons(&mut self, resolver: &IconResolver) -> BTreeSet<String> {
        let mut root = Value::Object(std::mem::take(&mut self.0));
        let urls = resolver.resolve_icons(&mut root);
        if let Value::Object(map) = root {
            self.0 = map;
        }
        urls
    }

    /// `_assets.icon_urls` 기록 (기존 _assets 의 다른 키는 유지)
    pub fn set_icon_assets(&mut self, icon_urls: &BTreeSet<String>) {
        let urls: Vec<Value> = icon_urls.iter().cloned().map(Value::String).collect();
        let assets = self
            .0
            .entry("_assets")
            .or_insert_with(|| Value::Object(Map::new()));
        if !assets.is_object() {
            *assets = Value::Object(Map::new());
        }
        if let Value::Object(map) = assets {
            map.insert("icon_urls".to_string(), Value::Array(urls));
        }
    }

    pub fn insert_section(&mut self, key: SectionKey, value: Value) {
        self.0.insert(key.as_str().to_string(), value);
    }
}

/// API 가 세대마다 숫자/문자열을 섞어 보내는 필드용 관대한 역직렬화
pub(crate) mod loose {
    use super::*;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(serde::de::Error::custom(format!("문자열/숫자가 와야 하는 자리에 {other}"))),
        }
    }

    pub fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))),
            Some(Value::String(s)) => Ok(s.trim().replace(',', "").parse::<i64>().ok()),
            Some(other) => Err(serde::de::Error::custom(format!("숫자가 와야 하는 자리에 {other}"))),
        }
    }

    /// null 을 빈 목록으로
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasicInfo {
    pub character_name: Option<String>,
    pub world_name: Option<String>,
    pub character_job_name: Option<String>,
    pub character_class: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub character_level: Option<String>,
    pub character_image: Option<String>,
    pub character_date_create: Option<String>,
    pub character_date_last_login: Option<String>,
    pub character_date_last_logout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatSection {
    #[serde(default, deserialize_with = "loose::list")]
    pub stat: Vec<StatEntry>,
    #[serde(default, deserialize_with = "loose::list")]
    pub final_stat: Vec<StatEntry>,
}

impl StatSection {
    /// 세대에 따라 stat 또는 final_stat
    pub fn entries(&self) -> &[StatEntry] {
        if self.stat.is_empty() {
            &self.final_stat
        } else {
            &self.stat
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatEntry {
    #[serde(default, deserialize_with = "loose::string")]
    pub stat_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub stat_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemEquipmentSection {
    #[serde(default, deserialize_with = "loose::list")]
    pub item_equipment: Vec<EquipmentItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionLine {
    #[serde(default, deserialize_with = "loose::string")]
    pub option_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub option_value: Option<String>,
}

impl OptionLine {
    /// "옵션명 값" 한 줄. 이름이 없으면 None.
    pub fn display(&self) -> Option<String> {
        let name = self.option_name.as_deref().filter(|s| !s.is_empty())?;
        let line = format!("{} {}", name, self.option_value.as_deref().unwrap_or(""));
        Some(line.trim().to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoulInfo {
    pub soul_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub soul_option: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentItem {
    pub item_name: Option<String>,
    pub item_icon: Option<String>,
    pub item_grade: Option<String>,
    pub item_equipment_slot_name: Option<String>,
    pub item_equipment_page_name: Option<String>,
    #[serde(default, deserialize_with = "loose::int")]
    pub equipment_level: Option<i64>,
    #[serde(default, deserialize_with = "loose::string")]
    pub starforce_upgrade: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub transmission_able: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub todd_able: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub item_option: Option<String>,
    #[serde(default, deserialize_with = "loose::list")]
    pub item_potential_option: Vec<OptionLine>,
    #[serde(default, deserialize_with = "loose::list")]
    pub item_additional_potential_option: Vec<OptionLine>,
    #[serde(default, deserialize_with = "loose::string")]
    pub soul_equipment_flag: Option<String>,
    pub soul_info: Option<SoulInfo>,
    pub item_shape_name: Option<String>,
    pub item_shape_icon: Option<String>,
}

impl EquipmentItem {
    /// 슬롯 이름이 없으면 페이지 이름
    pub fn raw_slot(&self) -> &str {
        self.item_equipment_slot_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.item_equipment_page_name.as_deref())
            .unwrap_or("")
    }
}

/// 장비 등급 (고정 집합)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemGrade {
    #[default]
    Normal,
    Rare,
    Epic,
    Unique,
    Legendary,
}

impl ItemGrade {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "일반" | "노말" => Some(ItemGrade::Normal),
            "레어" => Some(ItemGrade::Rare),
            "에픽" => Some(ItemGrade::Epic),
            "유니크" => Some(ItemGrade::Unique),
            "레전더리" => Some(ItemGrade::Legendary),
            _ => None,
        }
    }

    /// 표시용 등급. 없거나 모르는 라벨이면 Normal.
    pub fn style_for(label: Option<&str>) -> Self {
        label.and_then(Self::from_label).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetEffectSection {
    #[serde(default, deserialize_with = "loose::list")]
    pub set_info: Vec<SetInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetInfo {
    pub set_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub set_count: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub set_option: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolSection {
    #[serde(default, deserialize_with = "loose::list")]
    pub arcane_symbol: Vec<Symbol>,
    #[serde(default, deserialize_with = "loose::list")]
    pub authentic_symbol: Vec<Symbol>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Symbol {
    pub symbol_name: Option<String>,
    pub symbol_icon: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub symbol_level: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub symbol_option: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JewelSection {
    #[serde(default, deserialize_with = "loose::int")]
    pub use_jewel_page_no: Option<i64>,
    #[serde(default, deserialize_with = "loose::string")]
    pub use_jewel_set_option: Option<String>,
    #[serde(default, deserialize_with = "loose::list")]
    pub jewel_equipment: Vec<JewelPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JewelPage {
    #[serde(default, deserialize_with = "loose::int")]
    pub jewel_page_no: Option<i64>,
    #[serde(default, deserialize_with = "loose::string")]
    pub jewel_page_option: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub jewel_page_effect: Option<String>,
    #[serde(default, deserialize_with = "loose::list")]
    pub jewel_info: Vec<Jewel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Jewel {
    #[serde(default, deserialize_with = "loose::string")]
    pub slot_no: Option<String>,
    pub jewel_name: Option<String>,
    pub jewel_icon: Option<String>,
    pub jewel_grade: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub jewel_option: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AndroidSection {
    pub android_equipment: Option<AndroidInfo>,
    pub heart_equipment: Option<HeartInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AndroidInfo {
    pub android_name: Option<String>,
    pub android_grade: Option<String>,
    pub android_icon: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub android_non_humanoid_flag: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub android_warehouse_usable_flag: Option<String>,
    #[serde(default, deserialize_with = "loose::list")]
    pub android_cash_item_equipment: Vec<CashItem>,
}

impl AndroidInfo {
    pub fn is_empty(&self) -> bool {
        self.android_name.is_none()
            && self.android_grade.is_none()
            && self.android_icon.is_none()
            && self.android_cash_item_equipment.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CashItem {
    pub cash_item_name: Option<String>,
    pub cash_item_icon: Option<String>,
    pub cash_item_equipment_page_name: Option<String>,
    pub cash_item_equipment_slot_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartInfo {
    pub heart_name: Option<String>,
    pub heart_icon: Option<String>,
    pub item_grade: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub starforce_upgrade: Option<String>,
    #[serde(default, deserialize_with = "loose::int")]
    pub equipment_level: Option<i64>,
    #[serde(default, deserialize_with = "loose::string")]
    pub item_option: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub heart_option: Option<String>,
    #[serde(default, deserialize_with = "loose::list")]
    pub item_potential_option: Vec<OptionLine>,
    #[serde(default, deserialize_with = "loose::list")]
    pub item_additional_potential_option: Vec<OptionLine>,
}

impl HeartInfo {
    pub fn is_empty(&self) -> bool {
        self.heart_name.is_none() && self.heart_icon.is_none() && self.item_grade.is_none()
    }
}

/// 펫 섹션. 구세대는 `pet_1_name` 식 인덱스 필드, 신세대는 배열.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PetSection {
    Listed {
        #[serde(alias = "pet")]
        pet_equipment: Vec<PetInfo>,
    },
    Indexed(IndexedPets),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetInfo {
    #[serde(rename = "pet_name", alias = "name")]
    pub name: Option<String>,
    #[serde(default, rename = "pet_type", alias = "pet_pet_type", deserialize_with = "loose::string")]
    pub pet_type: Option<String>,
    #[serde(rename = "pet_date_expire", alias = "date_expire")]
    pub date_expire: Option<String>,
    #[serde(rename = "pet_icon", alias = "icon")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexedPets {
    pub pet_1_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub pet_1_pet_type: Option<String>,
    pub pet_1_date_expire: Option<String>,
    pub pet_1_icon: Option<String>,
    pub pet_2_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub pet_2_pet_type: Option<String>,
    pub pet_2_date_expire: Option<String>,
    pub pet_2_icon: Option<String>,
    pub pet_3_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub pet_3_pet_type: Option<String>,
    pub pet_3_date_expire: Option<String>,
    pub pet_3_icon: Option<String>,
}

impl PetSection {
    /// 표시용 펫 목록. 인덱스 형식은 항상 세 칸.
    pub fn into_pets(self) -> Vec<PetInfo> {
        match self {
            PetSection::Listed { pet_equipment } => pet_equipment,
            PetSection::Indexed(p) => vec![
                PetInfo {
                    name: p.pet_1_name,
                    pet_type: p.pet_1_pet_type,
                    date_expire: p.pet_1_date_expire,
                    icon: p.pet_1_icon,
                },
                PetInfo {
                    name: p.pet_2_name,
                    pet_type: p.pet_2_pet_type,
                    date_expire: p.pet_2_date_expire,
                    icon: p.pet_2_icon,
                },
                PetInfo {
                    name: p.pet_3_name,
                    pet_type: p.pet_3_pet_type,
                    date_expire: p.pet_3_date_expire,
                    icon: p.pet_3_icon,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillEquipmentSection {
    pub skill: Option<SkillBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillBlock {
    #[serde(default, deserialize_with = "loose::list")]
    pub equipment_skill: Vec<EquippedSkill>,
    #[serde(default, deserialize_with = "loose::list")]
    pub preset: Vec<SkillPreset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquippedSkill {
    #[serde(default, deserialize_with = "loose::int")]
    pub equipment_skill_set: Option<i64>,
    #[serde(default, deserialize_with = "loose::string")]
    pub slot_id: Option<String>,
    pub skill_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillPreset {
    #[serde(default, deserialize_with = "loose::int")]
    pub preset_slot_no: Option<i64>,
    pub skill_name_1: Option<String>,
    pub skill_name_2: Option<String>,
    pub skill_name_3: Option<String>,
    pub skill_name_4: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSkillSection {
    // API 원문 철자가 use_prest_no
    #[serde(default, rename = "use_prest_no", alias = "use_preset_no", deserialize_with = "loose::int")]
    pub use_preset_no: Option<i64>,
    #[serde(default, deserialize_with = "loose::list")]
    pub link_skill: Vec<LinkPreset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkPreset {
    #[serde(default, deserialize_with = "loose::int")]
    pub preset_no: Option<i64>,
    #[serde(default, deserialize_with = "loose::list")]
    pub link_skill_info: Vec<LinkSkillInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSkillInfo {
    pub skill_name: Option<String>,
    #[serde(default, deserialize_with = "loose::int")]
    pub skill_level: Option<i64>,
    #[serde(default, deserialize_with = "loose::string")]
    pub skill_effect: Option<String>,
    pub skill_icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VMatrixSection {
    #[serde(default, deserialize_with = "loose::list")]
    pub character_v_core_equipment: Vec<VCore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VCore {
    #[serde(default, deserialize_with = "loose::string")]
    pub slot_id: Option<String>,
    pub v_core_name: Option<String>,
    pub v_core_type: Option<String>,
    #[serde(default, deserialize_with = "loose::int")]
    pub v_core_level: Option<i64>,
    pub v_core_skill_name_1: Option<String>,
    pub v_core_skill_name_2: Option<String>,
    pub v_core_skill_name_3: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub v_core_skill_effect: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnionSection {
    #[serde(default, deserialize_with = "loose::string")]
    pub union_level: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub union_grade: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedOption {
    #[serde(default, deserialize_with = "loose::string")]
    pub option_name: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub option_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnionRaiderSection {
    #[serde(default, deserialize_with = "loose::list")]
    pub use_union_raider_option: Vec<NamedOption>,
    #[serde(default, deserialize_with = "loose::list")]
    pub use_union_occupied_option: Vec<NamedOption>,
    #[serde(default, deserialize_with = "loose::int")]
    pub use_preset_no: Option<i64>,
    #[serde(default, deserialize_with = "loose::list")]
    pub battle_map: Vec<BattleMapPreset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BattleMapPreset {
    #[serde(default, deserialize_with = "loose::int")]
    pub preset_no: Option<i64>,
    pub option_setting: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "loose::list")]
    pub union_raider: Vec<RaiderBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaiderBlock {
    #[serde(default, deserialize_with = "loose::string")]
    pub block_type: Option<String>,
    #[serde(default, deserialize_with = "loose::string")]
    pub block_rank: Option<String>,
    #[serde(default, deserialize_with = "loose::list")]
    pub block_position: Vec<CellPosition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellPosition {
    #[serde(default, deserialize_with = "loose::int")]
    pub cell_x: Option<i64>,
    #[serde(default, deserialize_with = "loose::int")]
    pub cell_y: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_payload_is_format_error() {
        assert!(matches!(Payload::from_value(json!([1, 2])), Err(AppError::FormatError(_))));
    }

    #[test]
    fn loose_fields_accept_numbers_and_strings() {
        let item: EquipmentItem = serde_json::from_value(json!({
            "item_name": "앱솔랩스 스태프",
            "equipment_level": "160",
            "starforce_upgrade": 17,
            "item_potential_option": null
        }))
        .unwrap();
        assert_eq!(item.equipment_level, Some(160));
        assert_eq!(item.starforce_upgrade.as_deref(), Some("17"));
        assert!(item.item_potential_option.is_empty());
    }

    #[test]
    fn wrong_shape_is_render_error() {
        let payload = Payload::from_value(json!({
            "basic": {},
            "stat": { "stat": "전투력 100" }
        }))
        .unwrap();
        let result = payload.section::<StatSection>(SectionKey::Stat);
        assert!(matches!(result, Err(AppError::RenderError(_))));
    }

    #[test]
    fn pet_section_accepts_both_generations() {
        let indexed: PetSection = serde_json::from_value(json!({
            "pet_1_name": "루나 쁘띠 블루",
            "pet_1_pet_type": "루나 쁘띠",
            "pet_2_name": null
        }))
        .unwrap();
        let pets = indexed.into_pets();
        assert_eq!(pets.len(), 3);
        assert_eq!(pets[0].name.as_deref(), Some("루나 쁘띠 블루"));
        assert!(pets[1].name.is_none());

        let listed: PetSection = serde_json::from_value(json!({
            "pet_equipment": [ { "pet_name": "핑크빈", "pet_type": "3" } ]
        }))
        .unwrap();
        let pets = listed.into_pets();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].pet_type.as_deref(), Some("3"));
    }

    #[test]
    fn link_skill_preset_key_typo_is_accepted() {
        let a: LinkSkillSection = serde_json::from_value(json!({ "use_prest_no": 2 })).unwrap();
        let b: LinkSkillSection = serde_json::from_value(json!({ "use_preset_no": "3" })).unwrap();
        assert_eq!(a.use_preset_no, Some(2));
        assert_eq!(b.use_preset_no, Some(3));
    }

    #[test]
    fn icon_assets_are_recorded() {
        let mut payload = Payload::from_value(json!({ "basic": { "character_name": "a" } })).unwrap();
        let urls: BTreeSet<String> = ["https://x/1.png".to_string()].into_iter().collect();
        payload.set_icon_assets(&urls);
        assert_eq!(payload.as_map()["_assets"]["icon_urls"], json!(["https://x/1.png"]));
        assert_eq!(payload.character_name().as_deref(), Some("a"));
        assert_eq!(payload.world_name(), None);
    }

    #[test]
    fn payload_schema_is_plain_object() {
        let schema = serde_json::to_value(<Payload as utoipa::PartialSchema>::schema()).unwrap();
        assert_eq!(schema["type"], json!("object"));
    }

    #[test]
    fn unknown_or_missing_grade_falls_back_to_normal() {
        assert_eq!(ItemGrade::style_for(Some("레전더리")), ItemGrade::Legendary);
        assert_eq!(ItemGrade::style_for(Some("미확인")), ItemGrade::Normal);
        assert_eq!(ItemGrade::style_for(None), ItemGrade::Normal);
    }
}
