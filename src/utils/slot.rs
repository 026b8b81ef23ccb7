use serde::Serialize;
use utoipa::ToSchema;

/// 원본 장비 목록에서 한벌옷(드레스/점프수트)이 쓰는 라벨
pub const ONE_PIECE_LABEL: &str = "한벌옷";

/// API 슬롯 문자열 → 고정 슬롯 라벨.
///
/// 판정 순서: 반지 → 목걸이 → 귀고리 → 석궁 → 그대로 통과. 빈 입력은 "" (드롭).
pub fn normalize_slot(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    // 이미 고정 라벨이면 그대로 ("반지 2" 가 서수 규칙에서 1번으로 떨어지지 않게)
    if let Some(slot) = CanonicalSlot::from_label(raw) {
        return slot.label().to_string();
    }

    if raw.starts_with("반지") {
        let slot = if raw.contains("2번째") {
            CanonicalSlot::Ring2
        } else if raw.contains("3번째") {
            CanonicalSlot::Ring3
        } else if raw.contains("4번째") {
            CanonicalSlot::Ring4
        } else {
            CanonicalSlot::Ring1
        };
        return slot.label().to_string();
    }
    if raw.starts_with("목걸이") {
        let slot = if raw.contains("2번째") {
            CanonicalSlot::Necklace2
        } else {
            CanonicalSlot::Necklace1
        };
        return slot.label().to_string();
    }
    if raw.contains("귀고리") || raw.contains("귀걸이") {
        return CanonicalSlot::Earring1.label().to_string();
    }
    if raw.contains("석궁") {
        return CanonicalSlot::Weapon.label().to_string();
    }
    raw.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum CanonicalSlot {
    Weapon,
    SubWeapon,
    Emblem,
    Hat,
    Top,
    Bottom,
    Gloves,
    Shoes,
    Shoulder,
    Belt,
    Cape,
    Ring1,
    Ring2,
    Ring3,
    Ring4,
    Necklace1,
    Necklace2,
    Earring1,
    FaceAccessory,
    EyeAccessory,
    Medal,
    Title,
    Badge,
    Pocket,
}

impl CanonicalSlot {
    pub const ALL: [CanonicalSlot; 24] = [
        CanonicalSlot::Weapon,
        CanonicalSlot::SubWeapon,
        CanonicalSlot::Emblem,
        CanonicalSlot::Hat,
        CanonicalSlot::Top,
        CanonicalSlot::Bottom,
        CanonicalSlot::Gloves,
        CanonicalSlot::Shoes,
        CanonicalSlot::Shoulder,
        CanonicalSlot::Belt,
        CanonicalSlot::Cape,
        CanonicalSlot::Ring1,
        CanonicalSlot::Ring2,
        CanonicalSlot::Ring3,
        CanonicalSlot::Ring4,
        CanonicalSlot::Necklace1,
        CanonicalSlot::Necklace2,
        CanonicalSlot::Earring1,
        CanonicalSlot::FaceAccessory,
        CanonicalSlot::EyeAccessory,
        CanonicalSlot::Medal,
        CanonicalSlot::Title,
        CanonicalSlot::Badge,
        CanonicalSlot::Pocket,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CanonicalSlot::Weapon => "무기",
            CanonicalSlot::SubWeapon => "보조무기",
            CanonicalSlot::Emblem => "엠블렘",
            CanonicalSlot::Hat => "모자",
            CanonicalSlot::Top => "상의",
            CanonicalSlot::Bottom => "하의",
            CanonicalSlot::Gloves => "장갑",
            CanonicalSlot::Shoes => "신발",
            CanonicalSlot::Shoulder => "어깨",
            CanonicalSlot::Belt => "벨트",
            CanonicalSlot::Cape => "망토",
            CanonicalSlot::Ring1 => "반지 1",
            CanonicalSlot::Ring2 => "반지 2",
            CanonicalSlot::Ring3 => "반지 3",
            CanonicalSlot::Ring4 => "반지 4",
            CanonicalSlot::Necklace1 => "목걸이 1",
            CanonicalSlot::Necklace2 => "목걸이 2",
            CanonicalSlot::Earring1 => "귀걸이 1",
            CanonicalSlot::FaceAccessory => "얼굴장식",
            CanonicalSlot::EyeAccessory => "눈장식",
            CanonicalSlot::Medal => "훈장",
            CanonicalSlot::Title => "칭호",
            CanonicalSlot::Badge => "뱃지",
            CanonicalSlot::Pocket => "포켓",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.label() == label)
    }

    /// 장신구 슬롯은 잠재/에디셔널 영역을 표시하지 않는다.
    pub fn is_accessory(self) -> bool {
        matches!(
            self,
            CanonicalSlot::Ring1
                | CanonicalSlot::Ring2
                | CanonicalSlot::Ring3
                | CanonicalSlot::Ring4
                | CanonicalSlot::Necklace1
                | CanonicalSlot::Necklace2
                | CanonicalSlot::Earring1
                | CanonicalSlot::FaceAccessory
                | CanonicalSlot::EyeAccessory
                | CanonicalSlot::Medal
                | CanonicalSlot::Title
                | CanonicalSlot::Badge
                | CanonicalSlot::Pocket
        )
    }
}

/// 화면 그룹 (순서 고정)
#[derive(Debug, Clone, Copy)]
pub struct SlotGroup {
    pub title: &'static str,
    pub slots: &'static [CanonicalSlot],
}

pub const EQUIP_GROUPS: [SlotGroup; 5] = [
    SlotGroup {
        title: "무기",
        slots: &[CanonicalSlot::Weapon, CanonicalSlot::SubWeapon, CanonicalSlot::Emblem],
    },
    SlotGroup {
        title: "주 방어구",
        slots: &[CanonicalSlot::Hat, CanonicalSlot::Top, CanonicalSlot::Bottom],
    },
    SlotGroup {
        title: "보조 방어구",
        slots: &[
            CanonicalSlot::Gloves,
            CanonicalSlot::Shoes,
            CanonicalSlot::Shoulder,
            CanonicalSlot::Belt,
            CanonicalSlot::Cape,
        ],
    },
    SlotGroup {
        title: "주 장신구",
        slots: &[
            CanonicalSlot::Ring1,
            CanonicalSlot::Ring2,
            CanonicalSlot::Ring3,
            CanonicalSlot::Ring4,
            CanonicalSlot::Necklace1,
            CanonicalSlot::Necklace2,
            CanonicalSlot::Earring1,
            CanonicalSlot::FaceAccessory,
            CanonicalSlot::EyeAccessory,
        ],
    },
    SlotGroup {
        title: "보조 장신구",
        slots: &[
            CanonicalSlot::Medal,
            CanonicalSlot::Title,
            CanonicalSlot::Badge,
            CanonicalSlot::Pocket,
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ring_and_necklace_ordinals() {
        assert_eq!(normalize_slot("반지1"), "반지 1");
        assert_eq!(normalize_slot("반지 (2번째)"), "반지 2");
        assert_eq!(normalize_slot("반지3번째"), "반지 3");
        assert_eq!(normalize_slot("반지 4번째"), "반지 4");
        assert_eq!(normalize_slot("목걸이"), "목걸이 1");
        assert_eq!(normalize_slot("목걸이 2번째"), "목걸이 2");
    }

    #[test]
    fn earring_and_crossbow_variants() {
        assert_eq!(normalize_slot("귀고리"), "귀걸이 1");
        assert_eq!(normalize_slot("석궁"), "무기");
        assert_eq!(normalize_slot("모자"), "모자");
        assert_eq!(normalize_slot(ONE_PIECE_LABEL), ONE_PIECE_LABEL);
        assert_eq!(normalize_slot(""), "");
    }

    #[test]
    fn normalization_is_idempotent_for_every_canonical_slot() {
        for slot in CanonicalSlot::ALL {
            let once = normalize_slot(slot.label());
            assert_eq!(once, slot.label());
            assert_eq!(normalize_slot(&once), once);
        }
        for raw in ["반지 (3번째)", "목걸이2번째", "귀고리", "석궁"] {
            let once = normalize_slot(raw);
            assert_eq!(normalize_slot(&once), once);
        }
    }

    #[test]
    fn groups_cover_every_slot_once() {
        let seen: Vec<CanonicalSlot> = EQUIP_GROUPS.iter().flat_map(|g| g.slots.iter().copied()).collect();
        assert_eq!(seen.len(), CanonicalSlot::ALL.len());
        let unique: HashSet<CanonicalSlot> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len());
        assert!(CanonicalSlot::ALL.iter().all(|s| unique.contains(s)));
        assert!(CanonicalSlot::Pocket.is_accessory());
        assert!(!CanonicalSlot::Top.is_accessory());
    }
}
