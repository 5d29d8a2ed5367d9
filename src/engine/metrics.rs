// ==========================================
// 挤出线车间管理系统 - 指标聚合引擎
// ==========================================
// 职责: 可用率 / 性能 / 简化 OEE / 停机分类汇总 / 偏差率
// 红线: Engine 不拼 SQL，输入为已加载的记录
// ==========================================
// 公式:
//   availability = (1440 - 停机分钟) / 1440  （不截断，可为负）
//   performance  = Σ实际 / Σ计划，计划为 0 时取 0
//   oee          = availability × performance × quality(=1)
// ==========================================

use crate::domain::production::{MachineStop, ProductionOrder};
use crate::domain::types::StopCategory;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 每日计划时间（分钟）
pub const SCHEDULED_MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// 质量系数（固定）
pub const QUALITY_FACTOR: f64 = 1.0;

// ==========================================
// TimeWindow - 统计时间窗 [from, until)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: NaiveDateTime,
    pub until: Option<NaiveDateTime>,
}

impl TimeWindow {
    /// 当日零点起（不设上界）
    pub fn since_midnight(now: NaiveDateTime) -> Self {
        Self {
            from: now.date().and_time(chrono::NaiveTime::MIN),
            until: None,
        }
    }

    /// 某一自然日 [00:00, 次日00:00)
    pub fn day(date: NaiveDate) -> Self {
        let from = date.and_time(chrono::NaiveTime::MIN);
        Self {
            from,
            until: Some(from + Duration::days(1)),
        }
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.from && self.until.map_or(true, |u| t < u)
    }
}

// ==========================================
// 输出结构
// ==========================================

/// 分类停机时长
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDowntime {
    pub category: StopCategory,
    pub minutes: f64,
}

/// 订单计划/实际对比（柱状图）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOutput {
    pub order_id: Option<i64>,
    pub op: String,
    pub planned_kg: f64,
    pub actual_kg: f64,
}

/// 指标汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub total_planned_kg: f64,
    pub total_actual_kg: f64,
    pub total_downtime_minutes: f64,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,
    pub downtime_by_category: Vec<CategoryDowntime>,
    pub order_outputs: Vec<OrderOutput>,
}

impl DailyMetrics {
    /// 看板展示用的停机分钟（四舍五入）
    pub fn downtime_minutes_rounded(&self) -> i64 {
        self.total_downtime_minutes.round() as i64
    }

    /// OEE 百分比（两位小数）
    pub fn oee_percent(&self) -> f64 {
        round2(self.oee * 100.0)
    }
}

// ==========================================
// 聚合函数
// ==========================================

/// 计算指标汇总
///
/// 调用方负责按时间窗筛选 orders / stops
pub fn compute_metrics(orders: &[ProductionOrder], stops: &[MachineStop]) -> DailyMetrics {
    let total_planned_kg: f64 = orders.iter().map(|o| o.planned_kg).sum();
    let total_actual_kg: f64 = orders.iter().map(|o| o.actual_kg).sum();
    let total_downtime_minutes = total_downtime(stops);

    let availability = availability(total_downtime_minutes);
    let performance = performance(total_actual_kg, total_planned_kg);
    let oee = availability * performance * QUALITY_FACTOR;

    DailyMetrics {
        total_planned_kg,
        total_actual_kg,
        total_downtime_minutes,
        availability,
        performance,
        quality: QUALITY_FACTOR,
        oee,
        downtime_by_category: downtime_by_category(stops),
        order_outputs: orders
            .iter()
            .map(|o| OrderOutput {
                order_id: o.id,
                op: o.op.clone(),
                planned_kg: o.planned_kg,
                actual_kg: o.actual_kg,
            })
            .collect(),
    }
}

/// 总停机分钟（含小数）
pub fn total_downtime(stops: &[MachineStop]) -> f64 {
    stops.iter().map(MachineStop::duration_minutes).sum()
}

/// 可用率（不截断）
pub fn availability(downtime_minutes: f64) -> f64 {
    (SCHEDULED_MINUTES_PER_DAY - downtime_minutes) / SCHEDULED_MINUTES_PER_DAY
}

/// 性能率，计划为 0 时为 0
pub fn performance(actual_kg: f64, planned_kg: f64) -> f64 {
    if planned_kg > 0.0 {
        actual_kg / planned_kg
    } else {
        0.0
    }
}

/// 按分类汇总停机（按首次出现顺序）
pub fn downtime_by_category(stops: &[MachineStop]) -> Vec<CategoryDowntime> {
    let mut acc: Vec<CategoryDowntime> = Vec::new();
    for stop in stops {
        let minutes = stop.duration_minutes();
        match acc.iter_mut().find(|c| c.category == stop.category) {
            Some(entry) => entry.minutes += minutes,
            None => acc.push(CategoryDowntime {
                category: stop.category,
                minutes,
            }),
        }
    }
    acc
}

/// 偏差率 (%) = (实际 - 计划) / 计划 × 100，计划为 0 时为 0
pub fn deviation_percent(planned_kg: f64, actual_kg: f64) -> f64 {
    if planned_kg > 0.0 {
        (actual_kg - planned_kg) / planned_kg * 100.0
    } else {
        0.0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
