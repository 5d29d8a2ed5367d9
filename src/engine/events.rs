// ==========================================
// 挤出线车间管理系统 - 存储变更事件发布
// ==========================================
// 职责: 每次成功写入后通知订阅方（看板实时刷新）
// 说明: API 层只依赖 trait；默认实现为 tokio broadcast
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::broadcast;

// ==========================================
// 事件类型
// ==========================================

/// 被写入的记录集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    ProductionOrders,
    MachineStops,
    MaintenanceInterventions,
    MaterialConsumptions,
    WasteLogs,
    MaintenanceParts,
    PreventivePlans,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::ProductionOrders => "production_orders",
            Collection::MachineStops => "machine_stops",
            Collection::MaintenanceInterventions => "maintenance_interventions",
            Collection::MaterialConsumptions => "material_consumptions",
            Collection::WasteLogs => "waste_logs",
            Collection::MaintenanceParts => "maintenance_parts",
            Collection::PreventivePlans => "preventive_plans",
        }
    }
}

/// 写入类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// 存储变更事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEvent {
    pub collection: Collection,
    pub record_id: i64,
    pub kind: ChangeKind,
}

impl StoreEvent {
    pub fn created(collection: Collection, record_id: i64) -> Self {
        Self {
            collection,
            record_id,
            kind: ChangeKind::Created,
        }
    }

    pub fn updated(collection: Collection, record_id: i64) -> Self {
        Self {
            collection,
            record_id,
            kind: ChangeKind::Updated,
        }
    }

    pub fn deleted(collection: Collection, record_id: i64) -> Self {
        Self {
            collection,
            record_id,
            kind: ChangeKind::Deleted,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 存储事件发布者
///
/// # 实现说明
/// - 发布失败只记录日志，不影响已提交的写入
pub trait StoreEventPublisher: Send + Sync {
    fn publish(&self, event: StoreEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl StoreEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: StoreEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - collection={}, record_id={}",
            event.collection.as_str(),
            event.record_id
        );
        Ok(())
    }
}

/// 广播事件发布者
///
/// 无订阅者时 send 返回错误，视为正常（事件丢弃）
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<StoreEvent>,
}

impl BroadcastEventPublisher {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl StoreEventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: StoreEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(
                collection = event.collection.as_str(),
                record_id = event.record_id,
                "无订阅者，事件丢弃"
            );
        }
        Ok(())
    }
}

/// 发布并吞掉错误（写入已提交，通知失败不回滚）
pub fn publish_quietly(publisher: &Arc<dyn StoreEventPublisher>, event: StoreEvent) {
    if let Err(e) = publisher.publish(event.clone()) {
        tracing::warn!(
            collection = event.collection.as_str(),
            record_id = event.record_id,
            error = %e,
            "存储事件发布失败"
        );
    }
}
