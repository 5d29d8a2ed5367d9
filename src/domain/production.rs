// ==========================================
// 挤出线车间管理系统 - 生产领域模型
// ==========================================
// 实体: 生产订单(OP) / 停机记录 / 物料消耗 / 废料记录
// 说明: 子记录通过 production_order_id 软引用订单（无级联）
// ==========================================

use crate::domain::types::{OrderStatus, StopCategory};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionOrder - 生产订单
// ==========================================
// 红线: actual_kg 只通过增量累加，不回退
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: Option<i64>,                     // 自增ID (插入前为 None)
    pub op: String,                          // 订单号 (OP)
    pub product: String,                     // 产品
    pub lot: String,                         // 批号
    pub planned_kg: f64,                     // 计划产量 (kg)
    pub actual_kg: f64,                      // 实际产量 (kg)
    pub operator: String,                    // 操作工
    pub notes: String,                       // 备注
    pub status: OrderStatus,                 // 状态
    pub start_time: Option<NaiveDateTime>,   // 开始时间 (激活时写入)
    pub end_time: Option<NaiveDateTime>,     // 结束时间 (完成时写入)
}

impl ProductionOrder {
    /// 由表单输入创建待生产订单
    pub fn from_input(input: &OrderInput) -> Self {
        Self {
            id: None,
            op: input.op.trim().to_string(),
            product: input.product.trim().to_string(),
            lot: input.lot.trim().to_string(),
            planned_kg: input.planned_kg,
            actual_kg: 0.0,
            operator: input.operator.trim().to_string(),
            notes: input.notes.clone(),
            status: OrderStatus::Pending,
            start_time: None,
            end_time: None,
        }
    }

    /// 用表单输入覆盖描述性字段（状态、实际产量、时间戳保持不变）
    pub fn apply_input(&mut self, input: &OrderInput) {
        self.op = input.op.trim().to_string();
        self.product = input.product.trim().to_string();
        self.lot = input.lot.trim().to_string();
        self.planned_kg = input.planned_kg;
        self.operator = input.operator.trim().to_string();
        self.notes = input.notes.clone();
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }
}

/// 订单表单输入（新建/编辑共用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderInput {
    pub op: String,
    pub product: String,
    pub lot: String,
    pub planned_kg: f64,
    pub operator: String,
    pub notes: String,
}

// ==========================================
// MachineStop - 停机记录
// ==========================================
// 创建后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineStop {
    pub id: Option<i64>,
    pub production_order_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub category: StopCategory,
    pub sub_cause: String,   // 子原因
    pub responsible: String, // 责任人
    pub description: String,
}

impl MachineStop {
    /// 停机时长（分钟，含小数）
    pub fn duration_minutes(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 60_000.0
    }
}

/// 停机登记输入
///
/// 起止时间缺省时取登记时刻（操作工在停机结束后登记）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopInput {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub category: StopCategory,
    pub sub_cause: String,
    pub responsible: String,
    pub description: String,
}

// ==========================================
// MaterialConsumption - 物料消耗
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConsumption {
    pub id: Option<i64>,
    pub production_order_id: i64,
    pub material: String,
    pub lot: String,
    pub planned_qty: Option<f64>, // 现场表单不采集计划量
    pub actual_qty: f64,          // kg
}

/// 物料消耗登记输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionInput {
    pub material: String,
    pub lot: String,
    pub planned_qty: Option<f64>,
    pub actual_qty: f64,
}

// ==========================================
// WasteLog - 废料记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteLog {
    pub id: Option<i64>,
    pub production_order_id: i64,
    pub waste_kg: f64,
    pub reason: String,
    pub log_time: NaiveDateTime,
}
