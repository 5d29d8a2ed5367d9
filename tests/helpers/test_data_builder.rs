// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDateTime;
use extrusion_erp::domain::{ConsumptionInput, OrderInput, StopInput};
use extrusion_erp::StopCategory;

// ==========================================
// OrderInput 构建器
// ==========================================

pub struct OrderBuilder {
    op: String,
    product: String,
    lot: String,
    planned_kg: f64,
    operator: String,
}

impl OrderBuilder {
    pub fn new(op: &str) -> Self {
        Self {
            op: op.to_string(),
            product: "Filme PP".to_string(),
            lot: format!("L-{}", op),
            planned_kg: 1000.0,
            operator: "Ana".to_string(),
        }
    }

    pub fn product(mut self, product: &str) -> Self {
        self.product = product.to_string();
        self
    }

    pub fn planned(mut self, kg: f64) -> Self {
        self.planned_kg = kg;
        self
    }

    pub fn operator(mut self, name: &str) -> Self {
        self.operator = name.to_string();
        self
    }

    pub fn build(self) -> OrderInput {
        OrderInput {
            op: self.op,
            product: self.product,
            lot: self.lot,
            planned_kg: self.planned_kg,
            operator: self.operator,
            notes: String::new(),
        }
    }
}

// ==========================================
// StopInput 构建器
// ==========================================

pub struct StopBuilder {
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    category: StopCategory,
}

impl StopBuilder {
    pub fn new(category: StopCategory) -> Self {
        Self {
            start_time: None,
            end_time: None,
            category,
        }
    }

    pub fn between(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn build(self) -> StopInput {
        StopInput {
            start_time: self.start_time,
            end_time: self.end_time,
            category: self.category,
            sub_cause: "sub".to_string(),
            responsible: "Caio".to_string(),
            description: "parada".to_string(),
        }
    }
}

pub fn consumption(material: &str, kg: f64) -> ConsumptionInput {
    ConsumptionInput {
        material: material.to_string(),
        lot: format!("{}-LOT", material),
        planned_qty: None,
        actual_qty: kg,
    }
}
