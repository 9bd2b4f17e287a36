// ==========================================
// GoatOS 牧场记录系统 - 日历事件源
// ==========================================
// 职责: 把派生日期与自定义事件汇总为日历条目
// 红线: 系统派生条目只读 (editable=false)，只有自定义事件可编辑
// ==========================================

use crate::domain::{
    BreedingEvent, FarmEvent, Goat, HeatObservation, KiddingRecord, MedicalEvent,
    RecurringSchedule, ScheduleTarget,
};
use crate::domain::derivation::{add_days, window_start};
use crate::engine::alerts::{AlertKind, SkippedRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// 颜色常量
// ==========================================
pub const COLOR_BREEDING_DUE: &str = "#9C27B0";
pub const COLOR_MEDICAL_DUE: &str = "#e91e63";
pub const COLOR_SCHEDULE_DUE: &str = "#FF5722";
pub const COLOR_HEAT_OBSERVED: &str = "#E91E63";
pub const COLOR_HEAT_PREDICTED: &str = "#FF80AB";
pub const COLOR_KIDDING: &str = "#4CAF50";
pub const COLOR_CUSTOM_DEFAULT: &str = "#2196F3";

/// 预测发情在过去多少天内仍显示
pub const PREDICTED_HEAT_LOOKBACK_DAYS: u64 = 7;

/// 日历条目来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarEntryKind {
    BreedingDue,
    MedicalDue,
    ScheduleDue,
    HeatObserved,
    HeatPredicted,
    Kidding,
    Custom,
}

/// 日历条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub title: String,
    pub start: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>, // 不含当天
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub editable: bool,
    pub kind: CalendarEntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>, // 仅自定义事件
}

/// 日历输入
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarInputs<'a> {
    pub goats: &'a [Goat],
    pub breeding_events: &'a [BreedingEvent],
    pub medical_events: &'a [MedicalEvent],
    pub schedules: &'a [RecurringSchedule],
    pub heats: &'a [HeatObservation],
    pub kiddings: &'a [KiddingRecord],
    pub farm_events: &'a [FarmEvent],
}

/// 日历构建结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarFeed {
    pub entries: Vec<CalendarEntry>,
    pub skipped: Vec<SkippedRecord>,
}

/// 自定义事件分类 → 颜色
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Vet" => "#f44336",
        "Show" => "#FF9800",
        "Breeding" => "#9C27B0",
        "Maintenance" => "#607D8B",
        "Purchase" => "#4CAF50",
        _ => COLOR_CUSTOM_DEFAULT,
    }
}

fn goat_url(goat_id: &str) -> Option<String> {
    Some(format!("/goat/{}/", goat_id))
}

fn system_entry(
    kind: CalendarEntryKind,
    title: String,
    start: NaiveDate,
    color: &str,
    url: Option<String>,
) -> CalendarEntry {
    CalendarEntry {
        title,
        start,
        end: None,
        color: color.to_string(),
        url,
        editable: false,
        kind,
        event_id: None,
    }
}

// ==========================================
// build_calendar_feed
// ==========================================
/// 构建日历条目
///
/// 条目顺序: 配种预产 → 医疗到期 → 周期计划 → 发情 (观察/预测) → 产羔 → 自定义
#[instrument(skip(inputs), fields(today = %today))]
pub fn build_calendar_feed(today: NaiveDate, inputs: &CalendarInputs<'_>) -> CalendarFeed {
    let names: HashMap<&str, &str> = inputs
        .goats
        .iter()
        .map(|g| (g.goat_id.as_str(), g.name.as_str()))
        .collect();
    let name_of = |goat_id: &str| -> String {
        names.get(goat_id).copied().unwrap_or(goat_id).to_string()
    };

    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for event in inputs.breeding_events {
        entries.push(system_entry(
            CalendarEntryKind::BreedingDue,
            format!("Due: {}", name_of(&event.goat_id)),
            event.due_date,
            COLOR_BREEDING_DUE,
            goat_url(&event.goat_id),
        ));
    }

    for record in inputs.medical_events {
        if let Some(due) = record.next_due_date {
            entries.push(system_entry(
                CalendarEntryKind::MedicalDue,
                format!("{}: {}", record.kind.label(), name_of(&record.goat_id)),
                due,
                COLOR_MEDICAL_DUE,
                goat_url(&record.goat_id),
            ));
        }
    }

    for schedule in inputs.schedules {
        let next_due = match schedule.next_due() {
            Ok(d) => d,
            Err(reason) => {
                skipped.push(SkippedRecord {
                    kind: AlertKind::Schedule,
                    record_id: schedule.schedule_id.clone(),
                    reason,
                });
                continue;
            }
        };
        let (target, url) = match &schedule.target {
            ScheduleTarget::HerdWide => ("Herd".to_string(), None),
            ScheduleTarget::ForSubject { goat_id } => (name_of(goat_id), goat_url(goat_id)),
        };
        entries.push(system_entry(
            CalendarEntryKind::ScheduleDue,
            format!("{}: {}", schedule.kind.label(), target),
            next_due,
            COLOR_SCHEDULE_DUE,
            url,
        ));
    }

    let predicted_cutoff = window_start(today, PREDICTED_HEAT_LOOKBACK_DAYS);
    for obs in inputs.heats {
        let name = name_of(&obs.goat_id);
        entries.push(system_entry(
            CalendarEntryKind::HeatObserved,
            format!("Heat: {}", name),
            obs.observed_date,
            COLOR_HEAT_OBSERVED,
            goat_url(&obs.goat_id),
        ));
        match obs.next_cycle_date() {
            Ok(next) if next >= predicted_cutoff => entries.push(system_entry(
                CalendarEntryKind::HeatPredicted,
                format!("Predicted Heat: {}", name),
                next,
                COLOR_HEAT_PREDICTED,
                goat_url(&obs.goat_id),
            )),
            Ok(_) => {}
            Err(reason) => skipped.push(SkippedRecord {
                kind: AlertKind::Heat,
                record_id: obs.observation_id.clone(),
                reason,
            }),
        }
    }

    for kidding in inputs.kiddings {
        entries.push(system_entry(
            CalendarEntryKind::Kidding,
            format!("Kidding: {} ({})", name_of(&kidding.dam_id), kidding.birth_type.label()),
            kidding.kidding_date,
            COLOR_KIDDING,
            goat_url(&kidding.dam_id),
        ));
    }

    for event in inputs.farm_events {
        // 存储的结束日含当天，日历组件要求不含当天
        let end = match event.end_date.map(|d| add_days(d, 1)).transpose() {
            Ok(end) => end,
            Err(reason) => {
                tracing::warn!(event_id = %event.event_id, reason = %reason, "自定义事件结束日溢出，按单日处理");
                None
            }
        };
        entries.push(CalendarEntry {
            title: event.title.clone(),
            start: event.date,
            end,
            color: category_color(&event.category).to_string(),
            url: None,
            editable: true,
            kind: CalendarEntryKind::Custom,
            event_id: Some(event.event_id.clone()),
        });
    }

    for s in &skipped {
        tracing::warn!(
            kind = ?s.kind,
            record_id = %s.record_id,
            reason = %s.reason,
            "日历条目派生失败，已跳过"
        );
    }

    CalendarFeed { entries, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BirthType, Gender, MedicalKind, Presentation};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn goat(id: &str, name: &str) -> Goat {
        let mut g = Goat::new(name.to_string(), "Nubian".to_string(), Gender::Doe);
        g.goat_id = id.to_string();
        g
    }

    #[test]
    fn test_herd_wide_schedule_has_no_url() {
        let schedules = vec![
            RecurringSchedule::new(
                ScheduleTarget::HerdWide,
                MedicalKind::Deworm,
                56,
                d(2024, 4, 10),
                String::new(),
            ),
            RecurringSchedule::new(
                ScheduleTarget::ForSubject { goat_id: "g1".into() },
                MedicalKind::Hoof,
                30,
                d(2024, 5, 1),
                String::new(),
            ),
        ];
        let goats = vec![goat("g1", "Daisy")];
        let feed = build_calendar_feed(
            d(2024, 6, 1),
            &CalendarInputs { goats: &goats, schedules: &schedules, ..CalendarInputs::default() },
        );
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "Deworming: Herd");
        assert_eq!(feed.entries[0].url, None);
        assert_eq!(feed.entries[0].start, d(2024, 6, 5));
        assert_eq!(feed.entries[1].title, "Hoof Trim: Daisy");
        assert_eq!(feed.entries[1].url.as_deref(), Some("/goat/g1/"));
        assert!(feed.entries.iter().all(|e| !e.editable));
    }

    #[test]
    fn test_predicted_heat_lookback() {
        let today = d(2024, 6, 1);
        let heat = |on| HeatObservation::new("g1".into(), on, String::new(), String::new());
        let recent = heat(d(2024, 5, 4)); // → 05-25
        let old = heat(d(2024, 5, 3)); // → 05-24
        let feed = build_calendar_feed(
            today,
            &CalendarInputs { heats: &[recent, old], ..CalendarInputs::default() },
        );
        let predicted: Vec<_> = feed
            .entries
            .iter()
            .filter(|e| e.kind == CalendarEntryKind::HeatPredicted)
            .collect();
        assert_eq!(predicted.len(), 1);
        assert_eq!(predicted[0].start, d(2024, 5, 25));
        assert_eq!(predicted[0].color, COLOR_HEAT_PREDICTED);
        assert_eq!(
            feed.entries.iter().filter(|e| e.kind == CalendarEntryKind::HeatObserved).count(),
            2
        );
    }

    #[test]
    fn test_custom_event_exclusive_end_and_color() {
        let events = vec![
            FarmEvent::new(
                "County Fair".into(),
                d(2024, 7, 1),
                Some(d(2024, 7, 3)),
                "Show".into(),
                String::new(),
            ),
            FarmEvent::new("Misc".into(), d(2024, 7, 5), None, "Other".into(), String::new()),
        ];
        let feed = build_calendar_feed(
            d(2024, 6, 1),
            &CalendarInputs { farm_events: &events, ..CalendarInputs::default() },
        );
        assert_eq!(feed.entries[0].end, Some(d(2024, 7, 4)));
        assert_eq!(feed.entries[0].color, "#FF9800");
        assert!(feed.entries[0].editable);
        assert_eq!(feed.entries[1].end, None);
        assert_eq!(feed.entries[1].color, COLOR_CUSTOM_DEFAULT);
    }

    #[test]
    fn test_kidding_and_medical_entries() {
        let goats = vec![goat("g1", "Daisy")];
        let kiddings = vec![KiddingRecord {
            kidding_id: "k1".into(),
            breeding_id: None,
            dam_id: "g1".into(),
            kidding_date: d(2024, 3, 1),
            num_kids_born: 2,
            num_alive: 2,
            num_stillborn: 0,
            birth_type: BirthType::Twins,
            presentation: Presentation::Normal,
            assisted: false,
            complications: String::new(),
            notes: String::new(),
        }];
        let medical = vec![
            MedicalEvent::new(
                "g1".into(),
                d(2024, 3, 1),
                MedicalKind::Vaccine,
                String::new(),
                Some(d(2025, 3, 1)),
            ),
            MedicalEvent::new(
                "g1".into(),
                d(2024, 3, 1),
                MedicalKind::Checkup,
                String::new(),
                None,
            ),
        ];
        let feed = build_calendar_feed(
            d(2024, 6, 1),
            &CalendarInputs {
                goats: &goats,
                kiddings: &kiddings,
                medical_events: &medical,
                ..CalendarInputs::default()
            },
        );
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "Vaccination: Daisy");
        assert_eq!(feed.entries[1].title, format!("Kidding: Daisy ({})", BirthType::Twins.label()));
        assert_eq!(feed.entries[1].color, COLOR_KIDDING);
    }

    #[test]
    fn test_unknown_goat_falls_back_to_id() {
        let events = vec![BreedingEvent::new(
            "ghost".into(),
            "Buck".into(),
            d(2024, 1, 3),
            None,
            String::new(),
        )
        .unwrap()];
        let feed = build_calendar_feed(
            d(2024, 6, 1),
            &CalendarInputs { breeding_events: &events, ..CalendarInputs::default() },
        );
        assert_eq!(feed.entries[0].title, "Due: ghost");
        assert_eq!(feed.entries[0].start, d(2024, 6, 1));
    }
}
