use serde::Serialize;
use utoipa::ToSchema;

use crate::models::payload::ItemGrade;
use crate::utils::slot::CanonicalSlot;

/// 화면 섹션 식별자 (표시 순서)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewKey {
    Header,
    Stats,
    Symbols,
    Equipment,
    SetEffects,
    Jewels,
    Android,
    Pets,
    Skills,
    SkillPresets,
    LinkSkills,
    Vmatrix,
    Union,
    Guild,
    HexaStat,
    HexaSkill,
    HyperStat,
}

/// 렌더 트리 최상위
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenderModel {
    pub world_label: String,
    pub sections: Vec<Section>,
}

impl RenderModel {
    pub fn section(&self, key: ViewKey) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Section {
    pub key: ViewKey,
    pub title: String,
    /// false 면 화면에서 숨김
    pub visible: bool,
    pub content: SectionContent,
}

impl Section {
    pub fn filled(key: ViewKey, title: &str, content: SectionContent) -> Self {
        Self {
            key,
            title: title.to_string(),
            visible: true,
            content,
        }
    }

    pub fn empty(key: ViewKey, title: &str, message: &str) -> Self {
        Self {
            key,
            title: title.to_string(),
            visible: true,
            content: SectionContent::Empty {
                message: message.to_string(),
            },
        }
    }

    pub fn hidden(key: ViewKey, title: &str) -> Self {
        Self {
            key,
            title: title.to_string(),
            visible: false,
            content: SectionContent::Hidden,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SectionContent {
    Empty { message: String },
    Hidden,
    Header(HeaderView),
    Stats(StatsView),
    Symbols(Vec<SymbolGroupView>),
    Equipment(Vec<EquipGroupView>),
    SetEffects(Vec<SetEffectView>),
    Jewels(Vec<JewelPageView>),
    Android(AndroidView),
    Pets(Vec<PetCard>),
    Skills(SkillsView),
    SkillPresets(Vec<SkillPresetView>),
    LinkSkills(LinkSkillsView),
    Vmatrix(Vec<VCoreGroupView>),
    Union(UnionView),
    Record(RecordView),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HeaderView {
    pub image: Option<String>,
    pub name: String,
    pub job: String,
    pub world: String,
    pub level: String,
    /// "생성: … · 최근 접속: … · 최근 로그아웃: …"
    pub times: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatLine {
    pub name: String,
    pub value: String,
    pub emphasized: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsView {
    pub headline: Vec<StatLine>,
    pub others: Vec<StatLine>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SymbolCard {
    pub kind: String,
    pub icon: Option<String>,
    pub name: String,
    pub level: Option<String>,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SymbolGroupView {
    pub title: String,
    pub symbols: Vec<SymbolCard>,
    pub empty_message: Option<String>,
}

/// 장비/하트 공용 아이템 본문
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ItemView {
    pub name: String,
    pub icon: Option<String>,
    pub grade: Option<String>,
    pub grade_style: ItemGrade,
    pub starforce: Option<String>,
    pub level: Option<String>,
    pub flags: Vec<String>,
    pub main_options: Vec<String>,
    /// 장신구 슬롯은 None
    pub potential: Option<Vec<String>>,
    pub additional: Option<Vec<String>>,
    pub soul: Option<SoulView>,
    pub shape_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SoulView {
    pub name: String,
    pub option: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipCard {
    pub slot: CanonicalSlot,
    pub slot_label: String,
    pub item: Option<ItemView>,
    /// 빈 칸에 표시할 문구 ("장비 없음" / "(한벌옷)")
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipGroupView {
    pub title: String,
    pub cards: Vec<EquipCard>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SetEffectView {
    pub title: String,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JewelCard {
    pub name: String,
    pub icon: Option<String>,
    pub grade: Option<String>,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JewelPageView {
    pub page_no: Option<i64>,
    pub title: String,
    pub active: bool,
    pub status: String,
    pub chips: Vec<String>,
    pub jewels: Vec<JewelCard>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AndroidCard {
    pub title: String,
    pub icon: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CashItemCard {
    pub name: String,
    pub icon: Option<String>,
    pub sub: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AndroidView {
    pub android: Option<AndroidCard>,
    pub android_empty: Option<String>,
    pub cash_items: Vec<CashItemCard>,
    pub cash_empty: Option<String>,
    pub heart: Option<ItemView>,
    pub heart_empty: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PetCard {
    pub label: String,
    pub name: String,
    pub icon: Option<String>,
    pub pet_type: Option<String>,
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkillCard {
    pub name: String,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkillSetView {
    pub set_no: i64,
    pub title: String,
    pub skills: Vec<SkillCard>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkillsView {
    /// "사용 세트: 1, 2"
    pub summary: String,
    pub sets: Vec<SkillSetView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkillPresetView {
    pub title: String,
    /// 네 칸, 빈 칸은 None
    pub slots: Vec<Option<SkillCard>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkSkillCard {
    pub name: String,
    pub level: String,
    pub icon: Option<String>,
    pub effect: Option<String>,
    pub chips: Vec<String>,
    pub merged_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkPresetView {
    pub preset_no: Option<i64>,
    pub title: String,
    pub active: bool,
    pub skills: Vec<LinkSkillCard>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkSkillsView {
    pub active_label: Option<String>,
    pub presets: Vec<LinkPresetView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VCoreKind {
    Skill,
    Enhancement,
    Special,
}

impl VCoreKind {
    pub const ORDER: [VCoreKind; 3] = [VCoreKind::Skill, VCoreKind::Enhancement, VCoreKind::Special];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "skill" => Some(VCoreKind::Skill),
            "enhancement" => Some(VCoreKind::Enhancement),
            "special" => Some(VCoreKind::Special),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            VCoreKind::Skill => "스킬 코어",
            VCoreKind::Enhancement => "강화 코어",
            VCoreKind::Special => "특수 코어",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VCoreCard {
    pub kind: VCoreKind,
    pub name: String,
    pub level: Option<String>,
    pub slot_id: Option<String>,
    /// 강화 코어만
    pub targets: Vec<String>,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VCoreGroupView {
    pub kind: VCoreKind,
    pub title: String,
    pub cores: Vec<VCoreCard>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnionCell {
    pub col: i64,
    pub row: i64,
    pub block_type: String,
    pub block_rank: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnionGrid {
    pub cols: i64,
    pub rows: i64,
    pub cells: Vec<UnionCell>,
}

impl UnionGrid {
    pub fn is_occupied(&self, col: i64, row: i64) -> bool {
        self.cells.iter().any(|c| c.col == col && c.row == row)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnionView {
    pub level: String,
    pub grade: String,
    pub raider_effects: Vec<String>,
    pub occupied_effects: Vec<String>,
    pub map_title: Option<String>,
    pub area_effects: Vec<String>,
    pub grid: Option<UnionGrid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordEntry {
    pub name: String,
    pub level: Option<String>,
    pub chips: Vec<String>,
}

/// 길드·HEXA·하이퍼 스탯 같은 일반 레코드 섹션
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordView {
    pub summary: Vec<String>,
    pub entries: Vec<RecordEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorCard {
    pub title: String,
    pub detail: String,
}

/// 투영 결과. 실패해도 HTTP 오류가 아니라 오류 카드 하나로 끝난다.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    Rendered(RenderModel),
    Failed(ErrorCard),
}

impl RenderOutcome {
    pub fn model(&self) -> Option<&RenderModel> {
        match self {
            RenderOutcome::Rendered(model) => Some(model),
            RenderOutcome::Failed(_) => None,
        }
    }
}
