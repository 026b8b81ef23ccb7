use crate::utils::effect_text::{format_effect_string, parse_effect_string, EffectMap};

/// 이름으로 병합 가능한 항목 (링크 스킬 등)
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEffect {
    pub name: String,
    pub level: i64,
    pub effect: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedEffect {
    pub name: String,
    pub level: i64,
    pub effect: Option<String>,
    pub icon: Option<String>,
    /// 합쳐진 원본 항목 수
    pub count: usize,
}

struct Accumulator {
    merged: MergedEffect,
    effects: EffectMap,
    // 라벨 파싱이 전혀 안 되는 효과문은 첫 원문을 그대로 둔다
    raw_fallback: Option<String>,
}

fn merge_effects(into: &mut EffectMap, incoming: EffectMap) {
    for entry in incoming.iter() {
        into.accumulate(entry.clone());
    }
}

/// 같은 이름의 항목을 하나로: 레벨 합산, 효과는 라벨별 수치 합산.
///
/// 결과 순서는 이름이 처음 나온 순서를 따른다.
pub fn merge_by_name<I>(entries: I) -> Vec<MergedEffect>
where
    I: IntoIterator<Item = NamedEffect>,
{
    let mut order: Vec<Accumulator> = Vec::new();

    for entry in entries {
        let parsed = entry.effect.as_deref().map(parse_effect_string).unwrap_or_default();
        let acc = match order.iter_mut().position(|a| a.merged.name == entry.name) {
            Some(idx) => &mut order[idx],
            None => {
                order.push(Accumulator {
                    merged: MergedEffect {
                        name: entry.name.clone(),
                        level: 0,
                        effect: None,
                        icon: entry.icon.clone(),
                        count: 0,
                    },
                    effects: EffectMap::new(),
                    raw_fallback: None,
                });
                let last = order.len() - 1;
                &mut order[last]
            }
        };

        acc.merged.level += entry.level;
        acc.merged.count += 1;
        if acc.merged.icon.is_none() {
            acc.merged.icon = entry.icon;
        }
        if parsed.is_empty() {
            if acc.raw_fallback.is_none() {
                acc.raw_fallback = entry.effect.filter(|e| !e.trim().is_empty());
            }
        } else {
            merge_effects(&mut acc.effects, parsed);
        }
    }

    let merged: Vec<MergedEffect> = order
        .into_iter()
        .map(|acc| {
            let mut merged = acc.merged;
            merged.effect = if acc.effects.is_empty() {
                acc.raw_fallback
            } else {
                Some(format_effect_string(&acc.effects))
            };
            merged
        })
        .collect();
    log::debug!("링크 스킬 병합 결과: {} 개", merged.len());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, level: i64, effect: Option<&str>) -> NamedEffect {
        NamedEffect {
            name: name.to_string(),
            level,
            effect: effect.map(str::to_string),
            icon: None,
        }
    }

    #[test]
    fn duplicate_names_sum_levels_and_effects() {
        let merged = merge_by_name(vec![
            link("정령의 축복", 1, Some("공격력 : 5")),
            link("정령의 축복", 2, Some("공격력 : 5")),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].effect.as_deref(), Some("공격력 : 10"));
        assert_eq!(merged[0].level, 3);
        assert_eq!(merged[0].count, 2);
    }

    #[test]
    fn first_appearance_order_is_kept() {
        let merged = merge_by_name(vec![
            link("B", 1, Some("보스 공격력 : 3%")),
            link("A", 1, None),
            link("B", 1, Some("보스 공격력 : 4%, 방어율 무시 : 2%")),
        ]);
        let names: Vec<&str> = merged.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(merged[0].effect.as_deref(), Some("보스 공격력 : 7%\n방어율 무시 : 2%"));
        assert_eq!(merged[1].effect, None);
    }

    #[test]
    fn text_values_are_not_merged() {
        let merged = merge_by_name(vec![
            link("C", 1, Some("효과 : 없음")),
            link("C", 1, Some("효과 : 10")),
        ]);
        assert_eq!(merged[0].effect.as_deref(), Some("효과 : 없음"));
    }

    #[test]
    fn unparsable_effect_text_survives() {
        let merged = merge_by_name(vec![link("D", 1, Some("경험치 획득량 증가"))]);
        assert_eq!(merged[0].effect.as_deref(), Some("경험치 획득량 증가"));
    }

    #[test]
    fn slash_in_label_survives_merge() {
        let merged = merge_by_name(vec![
            link("E", 1, Some("최대 HP/MP : 5%")),
            link("E", 1, Some("최대 HP/MP : 5%")),
        ]);
        assert_eq!(merged[0].effect.as_deref(), Some("최대 HP/MP : 10%"));
    }
}
