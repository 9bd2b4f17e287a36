// ==========================================
// GoatOS 牧场记录系统 - 到期提醒引擎
// ==========================================
// 职责: 根据 today + 已加载记录，计算七类提醒
// 输入: 配种、医疗记录、周期计划、发情观察(每只母羊最新一条)、体况评分(每只最新一条)、
//       库存、圈舍占用
// 输出: AlertSet (七个独立列表 + 被跳过的记录)
// 红线: 纯函数，无 I/O，无副作用；同样输入必得同样输出
// 红线: 单条记录派生失败只跳过该记录，不中断整批
// ==========================================

use crate::domain::derivation::{window_end, SkipReason};
use crate::domain::{
    BreedingEvent, FeedItem, HealthScore, HeatObservation, MedicalEvent, MedicalKind, Medicine,
    PenOccupancy, RecurringSchedule, ScheduleTarget,
};
use crate::engine::error::{parse_today, AlertError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// AlertWindows - 提醒窗口配置
// ==========================================
/// 各类提醒的前瞻窗口（天）
///
/// 由配置层读取后显式传入，引擎不读取全局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertWindows {
    pub kidding_days: u64,  // 产羔: [today, today+21]
    pub medical_days: u64,  // 医疗记录: <= today+14
    pub schedule_days: u64, // 周期计划: <= today+14
    pub heat_days: u64,     // 发情预测: [today, today+3]
}

impl Default for AlertWindows {
    fn default() -> Self {
        Self {
            kidding_days: 21,
            medical_days: 14,
            schedule_days: 14,
            heat_days: 3,
        }
    }
}

// ==========================================
// 输入
// ==========================================
/// 引擎输入（调用方已从仓储加载）
///
/// `latest_heats` 必须已过滤为母羊且每只最新一条观察，见 [`latest_per_subject`]；
/// `latest_health_scores` 同样为每只山羊最新一条评分
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertInputs<'a> {
    pub breeding_events: &'a [BreedingEvent],
    pub medical_events: &'a [MedicalEvent],
    pub schedules: &'a [RecurringSchedule],
    pub latest_heats: &'a [HeatObservation],
    pub latest_health_scores: &'a [HealthScore],
    pub feed_items: &'a [FeedItem],
    pub medicines: &'a [Medicine],
    pub pens: &'a [PenOccupancy],
}

// ==========================================
// 提醒条目
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KiddingAlert {
    pub breeding_id: String,
    pub goat_id: String,
    pub mate_name: String,
    pub due_date: NaiveDate,
    pub days_until: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalAlert {
    pub record_id: String,
    pub goat_id: String,
    pub kind: MedicalKind,
    pub next_due_date: NaiveDate,
    pub is_overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAlert {
    pub schedule_id: String,
    pub target: ScheduleTarget,
    pub kind: MedicalKind,
    pub next_due: NaiveDate,
    pub is_overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatAlert {
    pub observation_id: String,
    pub goat_id: String,
    pub observed_date: NaiveDate,
    pub predicted_date: NaiveDate,
    pub breeding_window_end: NaiveDateTime,
}

/// 最新 FAMACHA 评分 >= 4（贫血，需要驱虫）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamachaAlert {
    pub score_id: String,
    pub goat_id: String,
    pub famacha_score: i32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockAlert {
    LowFeed {
        item_id: String,
        name: String,
        quantity: f64,
        unit: String,
        threshold: f64,
    },
    ExpiredMedicine {
        medicine_id: String,
        name: String,
        batch: String,
        expiration_date: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyAlert {
    pub pen_id: String,
    pub name: String,
    pub capacity: i64,
    pub active_count: i64,
}

/// 提醒类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Kidding,
    Medical,
    Schedule,
    Heat,
    Famacha,
    Stock,
    Occupancy,
}

/// 派生失败被跳过的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub kind: AlertKind,
    pub record_id: String,
    pub reason: SkipReason,
}

/// 单类提醒的计算结果
#[derive(Debug, Clone, PartialEq)]
pub struct AlertList<T> {
    pub alerts: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

// ==========================================
// AlertSet - 聚合结果
// ==========================================
/// 七类提醒分别返回，不合并（各自对应不同的展示区块）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSet {
    pub kidding: Vec<KiddingAlert>,
    pub medical: Vec<MedicalAlert>,
    pub schedule: Vec<ScheduleAlert>,
    pub heat: Vec<HeatAlert>,
    pub famacha: Vec<FamachaAlert>,
    pub stock: Vec<StockAlert>,
    pub occupancy: Vec<OccupancyAlert>,
    pub skipped: Vec<SkippedRecord>,
}

impl AlertSet {
    /// 七个列表任一非空即为 true（跳过的记录不计入）
    pub fn has_alerts(&self) -> bool {
        !self.kidding.is_empty()
            || !self.medical.is_empty()
            || !self.schedule.is_empty()
            || !self.heat.is_empty()
            || !self.famacha.is_empty()
            || !self.stock.is_empty()
            || !self.occupancy.is_empty()
    }

    /// 提醒总数
    pub fn total(&self) -> usize {
        self.kidding.len()
            + self.medical.len()
            + self.schedule.len()
            + self.heat.len()
            + self.famacha.len()
            + self.stock.len()
            + self.occupancy.len()
    }
}

// ==========================================
// AlertEngine - 到期提醒引擎
// ==========================================
/// 到期提醒引擎
///
/// 无状态，仅持有窗口配置；可在多个请求间并发共享
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertEngine {
    windows: AlertWindows,
}

impl AlertEngine {
    pub fn new(windows: AlertWindows) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &AlertWindows {
        &self.windows
    }

    /// 计算全部提醒
    #[instrument(skip(self, inputs), fields(
        today = %today,
        breeding = inputs.breeding_events.len(),
        medical = inputs.medical_events.len(),
        schedules = inputs.schedules.len(),
        heats = inputs.latest_heats.len(),
        health_scores = inputs.latest_health_scores.len(),
    ))]
    pub fn compute_alerts(&self, today: NaiveDate, inputs: &AlertInputs<'_>) -> AlertSet {
        let kidding = kidding_alerts(today, inputs.breeding_events, self.windows.kidding_days);
        let medical = medical_alerts(today, inputs.medical_events, self.windows.medical_days);
        let schedule = schedule_alerts(today, inputs.schedules, self.windows.schedule_days);
        let heat = heat_alerts(today, inputs.latest_heats, self.windows.heat_days);
        let famacha = famacha_alerts(inputs.latest_health_scores);
        let stock = stock_alerts(today, inputs.feed_items, inputs.medicines);
        let occupancy = occupancy_alerts(inputs.pens);

        let mut skipped = Vec::new();
        skipped.extend(kidding.skipped);
        skipped.extend(medical.skipped);
        skipped.extend(schedule.skipped);
        skipped.extend(heat.skipped);
        skipped.extend(famacha.skipped);
        skipped.extend(stock.skipped);
        skipped.extend(occupancy.skipped);

        for s in &skipped {
            tracing::warn!(
                kind = ?s.kind,
                record_id = %s.record_id,
                reason = %s.reason,
                "记录派生失败，已跳过"
            );
        }

        let set = AlertSet {
            kidding: kidding.alerts,
            medical: medical.alerts,
            schedule: schedule.alerts,
            heat: heat.alerts,
            famacha: famacha.alerts,
            stock: stock.alerts,
            occupancy: occupancy.alerts,
            skipped,
        };

        tracing::debug!(total = set.total(), skipped = set.skipped.len(), "提醒计算完成");
        set
    }

    /// 以字符串形式的 today 计算提醒
    ///
    /// today 不是合法日期时整体失败（调用约定错误，不做恢复）
    pub fn compute_alerts_for_date_str(
        &self,
        today: &str,
        inputs: &AlertInputs<'_>,
    ) -> Result<AlertSet, AlertError> {
        let today = parse_today(today)?;
        Ok(self.compute_alerts(today, inputs))
    }
}

/// 计算全部提醒（函数式入口）
pub fn compute_alerts(
    today: NaiveDate,
    inputs: &AlertInputs<'_>,
    windows: &AlertWindows,
) -> AlertSet {
    AlertEngine::new(*windows).compute_alerts(today, inputs)
}

// ==========================================
// 逐条派生 → 过滤
// ==========================================
// derive 返回:
// - Ok(Some(alert)): 命中
// - Ok(None): 不在窗口内
// - Err(reason): 派生失败，记入 skipped
fn collect_derived<R, T>(
    kind: AlertKind,
    records: &[R],
    record_id: impl Fn(&R) -> &str,
    derive: impl Fn(&R) -> Result<Option<T>, SkipReason>,
) -> AlertList<T> {
    let mut alerts = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        match derive(record) {
            Ok(Some(alert)) => alerts.push(alert),
            Ok(None) => {}
            Err(reason) => skipped.push(SkippedRecord {
                kind,
                record_id: record_id(record).to_string(),
                reason,
            }),
        }
    }

    AlertList { alerts, skipped }
}

// ==========================================
// 1. 产羔提醒
// ==========================================
/// 预产期在 [today, today+window] 内的配种记录
///
/// 已过预产期的不提醒（在配种列表中仍可见）
pub fn kidding_alerts(
    today: NaiveDate,
    events: &[BreedingEvent],
    window_days: u64,
) -> AlertList<KiddingAlert> {
    let upper = window_end(today, window_days);
    let mut list = collect_derived(
        AlertKind::Kidding,
        events,
        |e| e.breeding_id.as_str(),
        |e| {
            if e.due_date < today || e.due_date > upper {
                return Ok(None);
            }
            Ok(Some(KiddingAlert {
                breeding_id: e.breeding_id.clone(),
                goat_id: e.goat_id.clone(),
                mate_name: e.mate_name.clone(),
                due_date: e.due_date,
                days_until: e.days_until_due(today),
            }))
        },
    );
    list.alerts.sort_by_key(|a| a.due_date);
    list
}

// ==========================================
// 2. 医疗记录提醒
// ==========================================
/// next_due_date <= today+window 的医疗记录（无下界，逾期持续提醒）
pub fn medical_alerts(
    today: NaiveDate,
    events: &[MedicalEvent],
    window_days: u64,
) -> AlertList<MedicalAlert> {
    let upper = window_end(today, window_days);
    let mut list = collect_derived(
        AlertKind::Medical,
        events,
        |e| e.record_id.as_str(),
        |e| {
            Ok(e.next_due_date.filter(|due| *due <= upper).map(|due| MedicalAlert {
                record_id: e.record_id.clone(),
                goat_id: e.goat_id.clone(),
                kind: e.kind,
                next_due_date: due,
                is_overdue: due < today,
            }))
        },
    );
    list.alerts.sort_by_key(|a| a.next_due_date);
    list
}

// ==========================================
// 3. 周期计划提醒
// ==========================================
/// 即将到期的周期计划；全群计划不按个体展开
pub fn schedule_alerts(
    today: NaiveDate,
    schedules: &[RecurringSchedule],
    window_days: u64,
) -> AlertList<ScheduleAlert> {
    let mut list = collect_derived(
        AlertKind::Schedule,
        schedules,
        |s| s.schedule_id.as_str(),
        |s| {
            if !s.is_due_within(today, window_days)? {
                return Ok(None);
            }
            let next_due = s.next_due()?;
            Ok(Some(ScheduleAlert {
                schedule_id: s.schedule_id.clone(),
                target: s.target.clone(),
                kind: s.kind,
                next_due,
                is_overdue: next_due < today,
            }))
        },
    );
    list.alerts.sort_by_key(|a| a.next_due);
    list
}

// ==========================================
// 4. 发情预测提醒
// ==========================================
/// 预测下次发情日落在 [today, today+window] 内
///
/// 输入须为每只母羊最新一条观察；已过去的预测日不提醒
pub fn heat_alerts(
    today: NaiveDate,
    latest_observations: &[HeatObservation],
    window_days: u64,
) -> AlertList<HeatAlert> {
    let upper = window_end(today, window_days);
    let mut list = collect_derived(
        AlertKind::Heat,
        latest_observations,
        |o| o.observation_id.as_str(),
        |o| {
            let predicted = o.next_cycle_date()?;
            if predicted < today || predicted > upper {
                return Ok(None);
            }
            Ok(Some(HeatAlert {
                observation_id: o.observation_id.clone(),
                goat_id: o.goat_id.clone(),
                observed_date: o.observed_date,
                predicted_date: predicted,
                breeding_window_end: o.breeding_window_end()?,
            }))
        },
    );
    list.alerts.sort_by_key(|a| a.predicted_date);
    list
}

/// 每只山羊只保留最新一条发情观察
///
/// 同一天多条时保留先出现的一条；输出按山羊首次出现的顺序
pub fn latest_per_subject(observations: &[HeatObservation]) -> Vec<HeatObservation> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&HeatObservation> = Vec::new();

    for obs in observations {
        match index.get(obs.goat_id.as_str()) {
            Some(&i) => {
                if obs.observed_date > latest[i].observed_date {
                    latest[i] = obs;
                }
            }
            None => {
                index.insert(obs.goat_id.as_str(), latest.len());
                latest.push(obs);
            }
        }
    }

    latest.into_iter().cloned().collect()
}

// ==========================================
// 5. FAMACHA 提醒
// ==========================================
/// 最新评分的 FAMACHA >= 4；无日期窗口，评分越高越靠前（同分保持输入顺序）
///
/// 输入须为每只山羊最新一条评分；最新一条未做 FAMACHA 时不提醒
pub fn famacha_alerts(latest_scores: &[HealthScore]) -> AlertList<FamachaAlert> {
    let mut list = collect_derived(
        AlertKind::Famacha,
        latest_scores,
        |s| s.score_id.as_str(),
        |s| {
            if !s.needs_deworming()? {
                return Ok(None);
            }
            Ok(s.famacha_score.map(|famacha_score| FamachaAlert {
                score_id: s.score_id.clone(),
                goat_id: s.goat_id.clone(),
                famacha_score,
                date: s.date,
            }))
        },
    );
    list.alerts.sort_by(|a, b| b.famacha_score.cmp(&a.famacha_score));
    list
}

// ==========================================
// 6. 库存提醒
// ==========================================
/// 低库存饲料 + 已过期药品，无日期窗口，按存储顺序（先饲料后药品）
pub fn stock_alerts(
    today: NaiveDate,
    feed_items: &[FeedItem],
    medicines: &[Medicine],
) -> AlertList<StockAlert> {
    let feed = collect_derived(
        AlertKind::Stock,
        feed_items,
        |f| f.item_id.as_str(),
        |f| {
            Ok(f.is_low()?.then(|| StockAlert::LowFeed {
                item_id: f.item_id.clone(),
                name: f.name.clone(),
                quantity: f.quantity,
                unit: f.unit.clone(),
                threshold: f.low_stock_threshold,
            }))
        },
    );

    let expired = collect_derived(
        AlertKind::Stock,
        medicines,
        |m| m.medicine_id.as_str(),
        |m| {
            Ok(m
                .expiration_date
                .filter(|_| m.is_expired(today))
                .map(|expiration_date| StockAlert::ExpiredMedicine {
                    medicine_id: m.medicine_id.clone(),
                    name: m.name.clone(),
                    batch: m.batch.clone(),
                    expiration_date,
                }))
        },
    );

    let mut alerts = feed.alerts;
    alerts.extend(expired.alerts);
    let mut skipped = feed.skipped;
    skipped.extend(expired.skipped);
    AlertList { alerts, skipped }
}

// ==========================================
// 7. 圈舍超容提醒
// ==========================================
/// 超容圈舍，按存储顺序
pub fn occupancy_alerts(pens: &[PenOccupancy]) -> AlertList<OccupancyAlert> {
    collect_derived(
        AlertKind::Occupancy,
        pens,
        |p| p.pen.pen_id.as_str(),
        |p| {
            Ok(p.is_over_capacity()?.then(|| OccupancyAlert {
                pen_id: p.pen.pen_id.clone(),
                name: p.pen.name.clone(),
                capacity: p.pen.capacity,
                active_count: p.active_count,
            }))
        },
    )
}
