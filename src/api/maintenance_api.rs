// ==========================================
// 挤出线车间管理系统 - 维护 API
// ==========================================
// 职责: 维护工单 / 备件目录 / 预防性维护计划
// 权限: 写操作统一 ManageMaintenance，读操作需可见维护页
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::guard::{require, require_text, require_view};
use crate::domain::access::{Action, Screen, SessionContext};
use crate::domain::maintenance::{
    InterventionInput, MaintenanceIntervention, MaintenancePart, PreventivePlanItem,
};
use crate::domain::types::{InterventionStatus, MaintenanceType};
use crate::engine::events::{publish_quietly, Collection, StoreEvent, StoreEventPublisher};
use crate::repository::RecordStore;

pub struct MaintenanceApi {
    store: Arc<RecordStore>,
    events: Arc<dyn StoreEventPublisher>,
}

impl MaintenanceApi {
    pub fn new(store: Arc<RecordStore>, events: Arc<dyn StoreEventPublisher>) -> Self {
        Self { store, events }
    }

    // ==========================================
    // 维护工单
    // ==========================================

    /// 工单列表（按开始时间倒序）
    pub fn list_interventions(
        &self,
        ctx: &SessionContext,
    ) -> ApiResult<Vec<MaintenanceIntervention>> {
        require_view(ctx, &[Screen::Maintenance])?;
        Ok(self.store.interventions.list_newest_by_start()?)
    }

    /// 某次停机关联的工单
    pub fn interventions_for_stop(
        &self,
        ctx: &SessionContext,
        machine_stop_id: i64,
    ) -> ApiResult<Vec<MaintenanceIntervention>> {
        require_view(ctx, &[Screen::Maintenance])?;
        Ok(self.store.interventions.find_by_stop(machine_stop_id)?)
    }

    /// 新建工单（状态为 Closed 时 end_time = now）
    pub fn create_intervention(
        &self,
        ctx: &SessionContext,
        input: &InterventionInput,
        now: NaiveDateTime,
    ) -> ApiResult<MaintenanceIntervention> {
        require(ctx, Action::ManageMaintenance)?;
        let responsible = require_text("责任人", &input.responsible)?;

        let mut item = MaintenanceIntervention {
            id: None,
            machine_stop_id: input.machine_stop_id,
            maintenance_type: input.maintenance_type,
            responsible,
            start_time: input.start_time,
            end_time: None,
            parts_used: normalize_parts(&input.parts_used),
            description: input.description.trim().to_string(),
            status: input.status,
        };
        item.apply_status(input.status, now);

        let id = self.store.interventions.insert(&item)?;
        item.id = Some(id);

        info!(
            intervention_id = id,
            maintenance_type = item.maintenance_type.to_db_str(),
            status = item.status.to_db_str(),
            "维护工单已创建"
        );
        publish_quietly(
            &self.events,
            StoreEvent::created(Collection::MaintenanceInterventions, id),
        );
        Ok(item)
    }

    /// 编辑工单（end_time 随保存时的状态重算）
    pub fn update_intervention(
        &self,
        ctx: &SessionContext,
        id: i64,
        input: &InterventionInput,
        now: NaiveDateTime,
    ) -> ApiResult<MaintenanceIntervention> {
        require(ctx, Action::ManageMaintenance)?;
        let responsible = require_text("责任人", &input.responsible)?;

        let mut item = self.load_intervention(id)?;
        item.machine_stop_id = input.machine_stop_id;
        item.maintenance_type = input.maintenance_type;
        item.responsible = responsible;
        item.start_time = input.start_time;
        item.parts_used = normalize_parts(&input.parts_used);
        item.description = input.description.trim().to_string();
        item.apply_status(input.status, now);

        self.store.interventions.update(&item)?;

        info!(intervention_id = id, status = item.status.to_db_str(), "维护工单已更新");
        publish_quietly(
            &self.events,
            StoreEvent::updated(Collection::MaintenanceInterventions, id),
        );
        Ok(item)
    }

    /// 关闭工单（end_time = now）
    pub fn close_intervention(
        &self,
        ctx: &SessionContext,
        id: i64,
        now: NaiveDateTime,
    ) -> ApiResult<MaintenanceIntervention> {
        self.change_status(ctx, id, InterventionStatus::Closed, Some(now))
    }

    /// 重新打开工单（清除 end_time）
    pub fn reopen_intervention(
        &self,
        ctx: &SessionContext,
        id: i64,
    ) -> ApiResult<MaintenanceIntervention> {
        self.change_status(ctx, id, InterventionStatus::Open, None)
    }

    fn change_status(
        &self,
        ctx: &SessionContext,
        id: i64,
        status: InterventionStatus,
        end_time: Option<NaiveDateTime>,
    ) -> ApiResult<MaintenanceIntervention> {
        require(ctx, Action::ManageMaintenance)?;

        let mut item = self.load_intervention(id)?;
        if item.status == status {
            return Ok(item);
        }
        item.status = status;
        item.end_time = end_time;
        self.store.interventions.set_status(id, status, end_time)?;

        info!(intervention_id = id, status = status.to_db_str(), "维护工单状态已变更");
        publish_quietly(
            &self.events,
            StoreEvent::updated(Collection::MaintenanceInterventions, id),
        );
        Ok(item)
    }

    fn load_intervention(&self, id: i64) -> ApiResult<MaintenanceIntervention> {
        self.store.interventions.find_by_id(id)?.ok_or_else(|| {
            ApiError::NotFound(format!("MaintenanceIntervention(id={})不存在", id))
        })
    }

    // ==========================================
    // 备件目录
    // ==========================================

    pub fn list_parts(&self, ctx: &SessionContext) -> ApiResult<Vec<MaintenancePart>> {
        require_view(ctx, &[Screen::Maintenance])?;
        Ok(self.store.parts.list()?)
    }

    /// 新增备件（编码唯一）
    pub fn add_part(
        &self,
        ctx: &SessionContext,
        name: &str,
        code: &str,
    ) -> ApiResult<MaintenancePart> {
        require(ctx, Action::ManageMaintenance)?;
        let name = require_text("备件名称", name)?;
        let code = require_text("备件编码", code)?;

        if self.store.parts.find_by_code(&code)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "备件编码已存在: {}",
                code
            )));
        }

        let mut part = MaintenancePart {
            id: None,
            name,
            code,
        };
        let id = self.store.parts.insert(&part)?;
        part.id = Some(id);

        info!(part_id = id, code = %part.code, "备件已添加");
        publish_quietly(&self.events, StoreEvent::created(Collection::MaintenanceParts, id));
        Ok(part)
    }

    pub fn delete_part(&self, ctx: &SessionContext, id: i64) -> ApiResult<()> {
        require(ctx, Action::ManageMaintenance)?;
        self.store.parts.delete(id)?;

        info!(part_id = id, "备件已删除");
        publish_quietly(&self.events, StoreEvent::deleted(Collection::MaintenanceParts, id));
        Ok(())
    }

    // ==========================================
    // 预防性维护计划
    // ==========================================

    /// 计划列表（按下次到期升序）
    pub fn list_plan_items(&self, ctx: &SessionContext) -> ApiResult<Vec<PreventivePlanItem>> {
        require_view(ctx, &[Screen::Maintenance])?;
        Ok(self.store.plans.list_by_next_due()?)
    }

    /// 已到期的计划项
    pub fn list_due_plan_items(
        &self,
        ctx: &SessionContext,
        now: NaiveDateTime,
    ) -> ApiResult<Vec<PreventivePlanItem>> {
        require_view(ctx, &[Screen::Maintenance])?;
        Ok(self.store.plans.list_due(now)?)
    }

    /// 新建计划项（首次到期 = now + 周期）
    pub fn create_plan_item(
        &self,
        ctx: &SessionContext,
        task: &str,
        maintenance_type: MaintenanceType,
        frequency_days: i64,
        now: NaiveDateTime,
    ) -> ApiResult<PreventivePlanItem> {
        require(ctx, Action::ManageMaintenance)?;
        let task = require_text("任务", task)?;
        if !maintenance_type.is_schedulable() {
            return Err(ApiError::InvalidInput(format!(
                "计划项类型不可排程: {}",
                maintenance_type.to_db_str()
            )));
        }
        if frequency_days <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "周期(天)必须大于0: {}",
                frequency_days
            )));
        }

        let mut item = PreventivePlanItem::new(task, maintenance_type, frequency_days, now);
        let id = self.store.plans.insert(&item)?;
        item.id = Some(id);

        info!(plan_id = id, frequency_days, next_due = %item.next_due_date, "维护计划项已创建");
        publish_quietly(&self.events, StoreEvent::created(Collection::PreventivePlans, id));
        Ok(item)
    }

    /// 标记完成: last_done = now，下次到期 = now + 周期
    pub fn mark_plan_item_done(
        &self,
        ctx: &SessionContext,
        id: i64,
        now: NaiveDateTime,
    ) -> ApiResult<PreventivePlanItem> {
        require(ctx, Action::ManageMaintenance)?;

        let mut item = self
            .store
            .plans
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("PreventivePlanItem(id={})不存在", id)))?;
        item.mark_done(now);
        self.store.plans.update(&item)?;

        info!(plan_id = id, next_due = %item.next_due_date, "维护计划项已完成");
        publish_quietly(&self.events, StoreEvent::updated(Collection::PreventivePlans, id));
        Ok(item)
    }
}

/// 备件名称去空白、去重（保留首次出现顺序）
fn normalize_parts(parts: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.to_string()))
        .map(str::to_string)
        .collect()
}
