// ==========================================
// 挤出线车间管理系统 - 维护领域模型
// ==========================================
// 实体: 维护工单 / 备件目录 / 预防性维护计划
// ==========================================

use crate::domain::types::{InterventionStatus, MaintenanceType};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceIntervention - 维护工单
// ==========================================
// end_time: 关闭时写入，进行中为 None
// parts_used: 持久化为逗号拼接的备件名称
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceIntervention {
    pub id: Option<i64>,
    pub machine_stop_id: Option<i64>,
    pub maintenance_type: MaintenanceType,
    pub responsible: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub parts_used: Vec<String>,
    pub description: String,
    pub status: InterventionStatus,
}

impl MaintenanceIntervention {
    /// 按保存时的状态设置结束时间
    ///
    /// - Closed: end_time = now
    /// - Open: end_time = None
    pub fn apply_status(&mut self, status: InterventionStatus, now: NaiveDateTime) {
        self.status = status;
        self.end_time = match status {
            InterventionStatus::Closed => Some(now),
            InterventionStatus::Open => None,
        };
    }

    /// 备件名称列表 → 存储串
    pub fn parts_to_db(&self) -> String {
        self.parts_used.join(",")
    }

    /// 存储串 → 备件名称列表（忽略空项）
    pub fn parts_from_db(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 维护工单表单输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionInput {
    pub machine_stop_id: Option<i64>,
    pub maintenance_type: MaintenanceType,
    pub responsible: String,
    pub start_time: NaiveDateTime,
    pub parts_used: Vec<String>,
    pub description: String,
    pub status: InterventionStatus,
}

// ==========================================
// MaintenancePart - 备件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePart {
    pub id: Option<i64>,
    pub name: String,
    pub code: String,
}

// ==========================================
// PreventivePlanItem - 预防性维护计划项
// ==========================================
// next_due_date = 基准时刻 + frequency_days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventivePlanItem {
    pub id: Option<i64>,
    pub task: String,
    pub maintenance_type: MaintenanceType,
    pub frequency_days: i64,
    pub last_done: Option<NaiveDateTime>,
    pub next_due_date: NaiveDateTime,
}

impl PreventivePlanItem {
    /// 创建计划项（首次到期 = now + 周期）
    pub fn new(
        task: String,
        maintenance_type: MaintenanceType,
        frequency_days: i64,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            task,
            maintenance_type,
            frequency_days,
            last_done: None,
            next_due_date: next_due_from(now, frequency_days),
        }
    }

    /// 标记完成: last_done = now, 下次到期从 now 重新计算
    pub fn mark_done(&mut self, now: NaiveDateTime) {
        self.last_done = Some(now);
        self.next_due_date = next_due_from(now, self.frequency_days);
    }

    /// 是否已到期
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_due_date <= now
    }
}

/// 到期时间 = 基准时刻 + N 天
pub fn next_due_from(base: NaiveDateTime, frequency_days: i64) -> NaiveDateTime {
    base + Duration::days(frequency_days)
}
