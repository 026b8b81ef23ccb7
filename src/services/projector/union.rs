use serde_json::{Map, Value};

use crate::models::payload::{Payload, SectionKey, UnionRaiderSection, UnionSection};
use crate::models::view::{
    RecordEntry, RecordView, Section, SectionContent, UnionCell, UnionGrid, UnionView, ViewKey,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::scalar_text;
use crate::utils::icon::is_icon_key;

/// 유니온 전투 지도 크기
pub const UNION_GRID_COLS: i64 = 22;
pub const UNION_GRID_ROWS: i64 = 20;
const AREA_COUNT: usize = 8;

fn option_line(name: Option<&str>, value: Option<&str>) -> String {
    format!("{}: {}", name.unwrap_or(""), value.unwrap_or(""))
}

pub(super) fn union(union: Option<UnionSection>, raider: Option<UnionRaiderSection>) -> Section {
    let Some(union) = union else {
        return Section::hidden(ViewKey::Union, "유니온");
    };

    let mut view = UnionView {
        level: union.union_level.unwrap_or_else(|| "-".to_string()),
        grade: union.union_grade.unwrap_or_else(|| "-".to_string()),
        raider_effects: Vec::new(),
        occupied_effects: Vec::new(),
        map_title: None,
        area_effects: Vec::new(),
        grid: None,
    };

    if let Some(raider) = raider {
        view.raider_effects = raider
            .use_union_raider_option
            .iter()
            .map(|o| option_line(o.option_name.as_deref(), o.option_value.as_deref()))
            .collect();
        view.occupied_effects = raider
            .use_union_occupied_option
            .iter()
            .map(|o| option_line(o.option_name.as_deref(), o.option_value.as_deref()))
            .collect();

        let active_no = raider.use_preset_no.filter(|n| *n != 0).unwrap_or(1);
        if let Some(preset) = raider.battle_map.iter().find(|p| p.preset_no == Some(active_no)) {
            view.map_title = Some(format!("전투 지도 (프리셋 {active_no} 사용 중)"));
            if let Some(setting) = &preset.option_setting {
                view.area_effects = (1..=AREA_COUNT)
                    .filter_map(|i| {
                        let opt = setting.get(&format!("option_name_{i}")).and_then(scalar_text)?;
                        (!opt.is_empty()).then(|| format!("구역 {i}: {opt}"))
                    })
                    .collect();
            }

            let mut cells = Vec::new();
            let mut outside = 0usize;
            for block in &preset.union_raider {
                for pos in &block.block_position {
                    let (Some(col), Some(row)) = (pos.cell_x, pos.cell_y) else {
                        continue;
                    };
                    if !(0..UNION_GRID_COLS).contains(&col) || !(0..UNION_GRID_ROWS).contains(&row) {
                        outside += 1;
                        continue;
                    }
                    cells.push(UnionCell {
                        col,
                        row,
                        block_type: block.block_type.clone().unwrap_or_else(|| "0".to_string()),
                        block_rank: block.block_rank.clone().unwrap_or_else(|| "0".to_string()),
                    });
                }
            }
            if outside > 0 {
                log::debug!("전투 지도 밖 좌표 {outside} 개 무시");
            }
            view.grid = Some(UnionGrid {
                cols: UNION_GRID_COLS,
                rows: UNION_GRID_ROWS,
                cells,
            });
        }
    }

    Section::filled(ViewKey::Union, "유니온", SectionContent::Union(view))
}

fn record_entry(map: &Map<String, Value>) -> RecordEntry {
    let pick = |suffix: &str| {
        map.iter()
            .find(|(k, v)| k.ends_with(suffix) && !is_icon_key(k) && scalar_text(v).is_some())
            .map(|(k, v)| (k.clone(), scalar_text(v).unwrap_or_default()))
    };
    let name = pick("_name").or_else(|| pick("_type"));
    let level = map
        .iter()
        .find(|(k, v)| k.contains("level") && scalar_text(v).is_some())
        .map(|(k, v)| (k.clone(), scalar_text(v).unwrap_or_default()));

    let chips = map
        .iter()
        .filter(|(k, _)| {
            !is_icon_key(k)
                && Some(k.as_str()) != name.as_ref().map(|(n, _)| n.as_str())
                && Some(k.as_str()) != level.as_ref().map(|(n, _)| n.as_str())
        })
        .filter_map(|(k, v)| {
            let text = scalar_text(v).filter(|s| !s.is_empty())?;
            Some(format!("{k}: {text}"))
        })
        .collect();

    RecordEntry {
        name: name.map(|(_, v)| v).unwrap_or_else(|| "-".to_string()),
        level: level.map(|(_, v)| format!("Lv. {v}")),
        chips,
    }
}

fn push_list(items: &[Value], entries: &mut Vec<RecordEntry>) {
    entries.extend(items.iter().filter_map(Value::as_object).map(record_entry));
}

fn record_view(key: SectionKey, raw: &Value) -> AppResult<RecordView> {
    let mut view = RecordView {
        summary: Vec::new(),
        entries: Vec::new(),
    };
    match raw {
        Value::Object(map) => {
            for (k, v) in map {
                match v {
                    Value::Array(items) => push_list(items, &mut view.entries),
                    Value::Object(_) | Value::Null => {}
                    scalar => {
                        if is_icon_key(k) {
                            continue;
                        }
                        if let Some(text) = scalar_text(scalar).filter(|s| !s.is_empty()) {
                            view.summary.push(format!("{k}: {text}"));
                        }
                    }
                }
            }
        }
        Value::Array(items) => push_list(items, &mut view.entries),
        other => {
            return Err(AppError::RenderError(format!(
                "{key} 섹션은 객체나 배열이어야 합니다: {other}"
            )))
        }
    }
    Ok(view)
}

/// 길드·HEXA·하이퍼 스탯. 없으면 숨김.
pub(super) fn records(payload: &Payload) -> AppResult<Vec<Section>> {
    let specs = [
        (SectionKey::Guild, ViewKey::Guild, "길드"),
        (SectionKey::HexamatrixStat, ViewKey::HexaStat, "HEXA 스탯"),
        (SectionKey::HexamatrixSkill, ViewKey::HexaSkill, "HEXA 스킬"),
        (SectionKey::HyperStat, ViewKey::HyperStat, "하이퍼 스탯"),
    ];
    specs
        .into_iter()
        .map(|(key, view_key, title)| match payload.raw_section(key) {
            None => Ok(Section::hidden(view_key, title)),
            Some(raw) => {
                let view = record_view(key, raw)?;
                if view.summary.is_empty() && view.entries.is_empty() {
                    Ok(Section::empty(view_key, title, &format!("{title} 정보 없음")))
                } else {
                    Ok(Section::filled(view_key, title, SectionContent::Record(view)))
                }
            }
        })
        .collect()
}
