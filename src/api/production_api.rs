// ==========================================
// 挤出线车间管理系统 - 生产 API
// ==========================================
// 职责: 订单创建/编辑/激活，当前订单的产量/停机/消耗/废料登记
// 红线: 同一时刻最多一个激活订单（激活在单事务内完成）
// 红线: 实际产量只增不减
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::guard::{require, require_non_negative, require_text, require_view};
use crate::config::ConfigManager;
use crate::domain::access::{Action, Screen, SessionContext};
use crate::domain::production::{
    ConsumptionInput, MachineStop, MaterialConsumption, OrderInput, ProductionOrder, StopInput,
    WasteLog,
};
use crate::engine::events::{publish_quietly, Collection, StoreEvent, StoreEventPublisher};
use crate::i18n::t;
use crate::repository::RecordStore;

// ==========================================
// OrderRecords - 订单及其子记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecords {
    pub order: ProductionOrder,
    pub stops: Vec<MachineStop>,
    pub consumptions: Vec<MaterialConsumption>,
    pub waste: Vec<WasteLog>,
}

impl OrderRecords {
    pub fn total_waste_kg(&self) -> f64 {
        self.waste.iter().map(|w| w.waste_kg).sum()
    }

    pub fn total_consumed_kg(&self) -> f64 {
        self.consumptions.iter().map(|c| c.actual_qty).sum()
    }
}

// ==========================================
// ProductionApi - 生产 API
// ==========================================
pub struct ProductionApi {
    store: Arc<RecordStore>,
    config: Arc<ConfigManager>,
    events: Arc<dyn StoreEventPublisher>,
}

impl ProductionApi {
    pub fn new(
        store: Arc<RecordStore>,
        config: Arc<ConfigManager>,
        events: Arc<dyn StoreEventPublisher>,
    ) -> Self {
        Self {
            store,
            config,
            events,
        }
    }

    // ==========================================
    // 订单管理
    // ==========================================

    /// 新建订单（状态 Pending，实际产量 0）
    pub fn create_order(
        &self,
        ctx: &SessionContext,
        input: &OrderInput,
    ) -> ApiResult<ProductionOrder> {
        require(ctx, Action::CreateOrder)?;
        validate_order_input(input)?;

        let mut order = ProductionOrder::from_input(input);
        let id = self.store.orders.insert(&order)?;
        order.id = Some(id);

        info!(order_id = id, op = %order.op, planned_kg = order.planned_kg, "订单已创建");
        publish_quietly(&self.events, StoreEvent::created(Collection::ProductionOrders, id));
        Ok(order)
    }

    /// 编辑订单描述性字段（不改变状态与实际产量）
    pub fn update_order(
        &self,
        ctx: &SessionContext,
        id: i64,
        input: &OrderInput,
    ) -> ApiResult<ProductionOrder> {
        require(ctx, Action::EditOrder)?;
        validate_order_input(input)?;

        let mut order = self.load_order(id)?;
        order.apply_input(input);
        self.store.orders.update(&order)?;

        info!(order_id = id, op = %order.op, "订单已更新");
        publish_quietly(&self.events, StoreEvent::updated(Collection::ProductionOrders, id));
        Ok(order)
    }

    /// 订单列表（最新在前）
    pub fn list_orders(&self, ctx: &SessionContext) -> ApiResult<Vec<ProductionOrder>> {
        require_view(ctx, &[Screen::Production, Screen::Pcp])?;
        Ok(self.store.orders.list_newest_first()?)
    }

    /// 当前激活订单
    pub fn active_order(&self, ctx: &SessionContext) -> ApiResult<Option<ProductionOrder>> {
        require_view(ctx, &[Screen::Production])?;
        Ok(self.store.orders.find_active()?)
    }

    /// 订单详情（含停机/消耗/废料）
    pub fn order_records(&self, ctx: &SessionContext, id: i64) -> ApiResult<OrderRecords> {
        require_view(ctx, &[Screen::Production, Screen::Pcp])?;
        let order = self.load_order(id)?;
        Ok(OrderRecords {
            order,
            stops: self.store.stops.find_by_order(id)?,
            consumptions: self.store.consumptions.find_by_order(id)?,
            waste: self.store.waste.find_by_order(id)?,
        })
    }

    /// 激活订单
    ///
    /// # 状态转换
    /// - 其他 Active 订单 → Completed（end_time = now）
    /// - 目标 Pending → Active（start_time = now）
    /// - 目标已是 Active: 无写入、无事件
    /// - 目标 Completed: InvalidStateTransition
    ///
    /// 事件: 先发布目标订单，再逐个发布被自动完成的订单
    pub fn activate_order(
        &self,
        ctx: &SessionContext,
        id: i64,
        now: NaiveDateTime,
    ) -> ApiResult<ProductionOrder> {
        require(ctx, Action::ActivateOrder)?;

        let outcome = self.store.orders.activate(id, now)?;
        let order = self.load_order(id)?;

        if outcome.already_active {
            debug!(order_id = id, "订单已处于激活状态，跳过");
            return Ok(order);
        }

        info!(
            order_id = id,
            op = %order.op,
            completed = ?outcome.completed_ids,
            role = ctx.role.as_str(),
            "订单已激活"
        );
        publish_quietly(&self.events, StoreEvent::updated(Collection::ProductionOrders, id));
        for completed_id in &outcome.completed_ids {
            publish_quietly(
                &self.events,
                StoreEvent::updated(Collection::ProductionOrders, *completed_id),
            );
        }
        Ok(order)
    }

    // ==========================================
    // 当前订单登记
    // ==========================================

    /// 登记产量（累加到激活订单）
    pub fn log_production(
        &self,
        ctx: &SessionContext,
        amount_kg: f64,
        now: NaiveDateTime,
    ) -> ApiResult<ProductionOrder> {
        require(ctx, Action::LogProduction)?;
        let amount_kg = require_non_negative("产量(kg)", amount_kg)?;

        let mut order = self.require_active_order()?;
        let id = order_id(&order)?;
        order.actual_kg = self.store.orders.add_actual_kg(id, amount_kg)?;

        info!(order_id = id, amount_kg, actual_kg = order.actual_kg, at = %now, "产量已登记");
        publish_quietly(&self.events, StoreEvent::updated(Collection::ProductionOrders, id));
        Ok(order)
    }

    /// 登记停机（起止时间缺省取 now）
    pub fn log_stop(
        &self,
        ctx: &SessionContext,
        input: &StopInput,
        now: NaiveDateTime,
    ) -> ApiResult<MachineStop> {
        require(ctx, Action::LogStop)?;

        let start_time = input.start_time.unwrap_or(now);
        let end_time = input.end_time.unwrap_or(now);
        if end_time < start_time {
            return Err(ApiError::InvalidInput(format!(
                "停机结束时间({})早于开始时间({})",
                end_time, start_time
            )));
        }
        let sub_cause = require_text("子原因", &input.sub_cause)?;
        let responsible = require_text("责任人", &input.responsible)?;
        let description = require_text("描述", &input.description)?;

        let order = self.require_active_order()?;
        let mut stop = MachineStop {
            id: None,
            production_order_id: order_id(&order)?,
            start_time,
            end_time,
            category: input.category,
            sub_cause,
            responsible,
            description,
        };
        let id = self.store.stops.insert(&stop)?;
        stop.id = Some(id);

        info!(
            stop_id = id,
            order_id = stop.production_order_id,
            category = stop.category.to_db_str(),
            minutes = stop.duration_minutes(),
            "停机已登记"
        );
        publish_quietly(&self.events, StoreEvent::created(Collection::MachineStops, id));
        Ok(stop)
    }

    /// 登记物料消耗
    pub fn log_consumption(
        &self,
        ctx: &SessionContext,
        input: &ConsumptionInput,
    ) -> ApiResult<MaterialConsumption> {
        require(ctx, Action::LogConsumption)?;

        let material = require_text("物料", &input.material)?;
        let lot = require_text("物料批号", &input.lot)?;
        let actual_qty = require_non_negative("消耗量(kg)", input.actual_qty)?;
        let planned_qty = input
            .planned_qty
            .map(|q| require_non_negative("计划消耗量(kg)", q))
            .transpose()?;

        let order = self.require_active_order()?;
        let mut item = MaterialConsumption {
            id: None,
            production_order_id: order_id(&order)?,
            material,
            lot,
            planned_qty,
            actual_qty,
        };
        let id = self.store.consumptions.insert(&item)?;
        item.id = Some(id);

        info!(
            consumption_id = id,
            order_id = item.production_order_id,
            material = %item.material,
            actual_qty,
            "物料消耗已登记"
        );
        publish_quietly(
            &self.events,
            StoreEvent::created(Collection::MaterialConsumptions, id),
        );
        Ok(item)
    }

    /// 登记废料（记录时间 = now）
    pub fn log_waste(
        &self,
        ctx: &SessionContext,
        waste_kg: f64,
        reason: &str,
        now: NaiveDateTime,
    ) -> ApiResult<WasteLog> {
        require(ctx, Action::LogWaste)?;
        let waste_kg = require_non_negative("废料(kg)", waste_kg)?;
        let reason = require_text("原因", reason)?;

        let order = self.require_active_order()?;
        let mut log = WasteLog {
            id: None,
            production_order_id: order_id(&order)?,
            waste_kg,
            reason,
            log_time: now,
        };
        let id = self.store.waste.insert(&log)?;
        log.id = Some(id);

        info!(waste_id = id, order_id = log.production_order_id, waste_kg, "废料已登记");
        publish_quietly(&self.events, StoreEvent::created(Collection::WasteLogs, id));
        Ok(log)
    }

    /// 物料消耗表单的物料选项
    pub fn consumption_material_options(&self, ctx: &SessionContext) -> ApiResult<Vec<String>> {
        require(ctx, Action::LogConsumption)?;
        Ok(self.config.consumption_materials()?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn load_order(&self, id: i64) -> ApiResult<ProductionOrder> {
        self.store
            .orders
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("ProductionOrder(id={})不存在", id)))
    }

    fn require_active_order(&self) -> ApiResult<ProductionOrder> {
        self.store
            .orders
            .find_active()?
            .ok_or_else(|| ApiError::NoActiveOrder(t("workflow.no_active_order")))
    }
}

fn order_id(order: &ProductionOrder) -> ApiResult<i64> {
    order
        .id
        .ok_or_else(|| ApiError::InternalError("已持久化订单缺少ID".to_string()))
}

fn validate_order_input(input: &OrderInput) -> ApiResult<()> {
    require_text("OP", &input.op)?;
    require_text("产品", &input.product)?;
    require_text("批号", &input.lot)?;
    require_text("操作工", &input.operator)?;
    require_non_negative("计划产量(kg)", input.planned_kg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::types::{OrderStatus, StopCategory, UserRole};
    use crate::engine::events::BroadcastEventPublisher;
    use chrono::{Duration, NaiveDate};
    use std::sync::Mutex;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn setup() -> (ProductionApi, Arc<BroadcastEventPublisher>) {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let store = Arc::new(RecordStore::new(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn).unwrap());
        let bus = Arc::new(BroadcastEventPublisher::default());
        let api = ProductionApi::new(store, config, bus.clone());
        (api, bus)
    }

    fn input(op: &str) -> OrderInput {
        OrderInput {
            op: op.to_string(),
            product: "Filme PP".to_string(),
            lot: "L-55".to_string(),
            planned_kg: 100.0,
            operator: "Bruno".to_string(),
            notes: String::new(),
        }
    }

    fn control() -> SessionContext {
        SessionContext::new(UserRole::Control)
    }

    fn operator() -> SessionContext {
        SessionContext::new(UserRole::Operational)
    }

    #[test]
    fn test_operator_cannot_create_order() {
        let (api, _) = setup();
        let err = api.create_order(&operator(), &input("OP-1")).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn test_create_order_validation() {
        let (api, _) = setup();
        let mut bad = input("  ");
        assert!(matches!(
            api.create_order(&control(), &bad).unwrap_err(),
            ApiError::InvalidInput(_)
        ));
        bad = input("OP-1");
        bad.planned_kg = -1.0;
        assert!(api.create_order(&control(), &bad).is_err());
    }

    #[test]
    fn test_update_keeps_status_and_actual() {
        let (api, _) = setup();
        let order = api.create_order(&control(), &input("OP-1")).unwrap();
        let id = order.id.unwrap();
        api.activate_order(&control(), id, at(6)).unwrap();
        api.log_production(&operator(), 12.5, at(7)).unwrap();

        let mut edit = input("OP-1B");
        edit.planned_kg = 150.0;
        let updated = api.update_order(&control(), id, &edit).unwrap();
        assert_eq!(updated.op, "OP-1B");
        assert_eq!(updated.status, OrderStatus::Active);
        assert_eq!(updated.actual_kg, 12.5);
        assert_eq!(updated.start_time, Some(at(6)));
    }

    #[test]
    fn test_log_without_active_order() {
        let (api, _) = setup();
        let err = api.log_production(&operator(), 5.0, at(8)).unwrap_err();
        assert_eq!(err.code(), "NO_ACTIVE_ORDER");

        let err = api.log_waste(&operator(), 1.0, "borra", at(8)).unwrap_err();
        assert!(matches!(err, ApiError::NoActiveOrder(_)));
    }

    #[test]
    fn test_log_production_rejects_negative() {
        let (api, _) = setup();
        let id = api.create_order(&control(), &input("OP-1")).unwrap().id.unwrap();
        api.activate_order(&operator(), id, at(6)).unwrap();
        assert!(api.log_production(&operator(), -3.0, at(7)).is_err());
        assert!(api.log_production(&operator(), f64::NAN, at(7)).is_err());
        assert_eq!(api.log_production(&operator(), 0.0, at(7)).unwrap().actual_kg, 0.0);
    }

    #[test]
    fn test_log_stop_defaults_and_validation() {
        let (api, _) = setup();
        let id = api.create_order(&control(), &input("OP-1")).unwrap().id.unwrap();
        api.activate_order(&control(), id, at(6)).unwrap();

        let mut stop_input = StopInput {
            start_time: None,
            end_time: None,
            category: StopCategory::Electrical,
            sub_cause: "disjuntor".to_string(),
            responsible: "Caio".to_string(),
            description: "queda de energia".to_string(),
        };
        let stop = api.log_stop(&operator(), &stop_input, at(9)).unwrap();
        assert_eq!(stop.start_time, at(9));
        assert_eq!(stop.end_time, at(9));
        assert_eq!(stop.production_order_id, id);

        stop_input.start_time = Some(at(10));
        stop_input.end_time = Some(at(10) - Duration::minutes(1));
        assert!(matches!(
            api.log_stop(&operator(), &stop_input, at(11)).unwrap_err(),
            ApiError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_each_write_publishes_one_event() {
        let (api, bus) = setup();
        let mut rx = bus.subscribe();

        let id = api.create_order(&control(), &input("OP-1")).unwrap().id.unwrap();
        api.activate_order(&control(), id, at(6)).unwrap();
        api.activate_order(&control(), id, at(7)).unwrap(); // no-op
        api.log_consumption(
            &operator(),
            &ConsumptionInput {
                material: "PP".to_string(),
                lot: "PP-1".to_string(),
                planned_qty: None,
                actual_qty: 40.0,
            },
        )
        .unwrap();

        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StoreEvent::created(Collection::ProductionOrders, id));
        assert_eq!(events[1], StoreEvent::updated(Collection::ProductionOrders, id));
        assert_eq!(events[2].collection, Collection::MaterialConsumptions);
    }

    #[test]
    fn test_order_records() {
        let (api, _) = setup();
        let id = api.create_order(&control(), &input("OP-1")).unwrap().id.unwrap();
        api.activate_order(&control(), id, at(6)).unwrap();
        api.log_waste(&operator(), 2.5, "aparas", at(7)).unwrap();
        api.log_waste(&operator(), 1.5, "purga", at(8)).unwrap();

        let records = api.order_records(&control(), id).unwrap();
        assert_eq!(records.waste.len(), 2);
        assert_eq!(records.total_waste_kg(), 4.0);
        assert_eq!(records.total_consumed_kg(), 0.0);

        let mnt = SessionContext::new(UserRole::Maintenance);
        assert!(api.order_records(&mnt, id).is_err());
    }

    #[test]
    fn test_material_options_from_config() {
        let (api, _) = setup();
        let options = api.consumption_material_options(&operator()).unwrap();
        assert_eq!(options[0], "PP");
        assert!(api.consumption_material_options(&control()).is_err());
    }
}
