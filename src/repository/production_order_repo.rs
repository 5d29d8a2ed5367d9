// ==========================================
// 挤出线车间管理系统 - 生产订单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 例外: 订单激活必须在单个事务内完成（保证最多一个 Active）
// ==========================================

use crate::domain::production::ProductionOrder;
use crate::domain::types::OrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const ORDER_COLUMNS: &str =
    "id, op, product, lot, planned_kg, actual_kg, operator, notes, status, start_time, end_time";

/// 订单激活结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationOutcome {
    /// 被强制完成的原激活订单
    pub completed_ids: Vec<i64>,
    /// 目标订单本来就是 Active（未做任何写入）
    pub already_active: bool,
}

// ==========================================
// ProductionOrderRepository - 生产订单仓储
// ==========================================
pub struct ProductionOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionOrderRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入订单，返回自增ID
    pub fn insert(&self, order: &ProductionOrder) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_orders (
                op, product, lot, planned_kg, actual_kg, operator, notes,
                status, start_time, end_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                order.op,
                order.product,
                order.lot,
                order.planned_kg,
                order.actual_kg,
                order.operator,
                order.notes,
                order.status.to_db_str(),
                order.start_time,
                order.end_time,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按ID整行更新
    pub fn update(&self, order: &ProductionOrder) -> RepositoryResult<()> {
        let id = order.id.ok_or_else(|| RepositoryError::FieldValueError {
            field: "id".to_string(),
            message: "更新订单时ID不能为空".to_string(),
        })?;

        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE production_orders SET
                op = ?1, product = ?2, lot = ?3, planned_kg = ?4, actual_kg = ?5,
                operator = ?6, notes = ?7, status = ?8, start_time = ?9, end_time = ?10
            WHERE id = ?11
            "#,
            params![
                order.op,
                order.product,
                order.lot,
                order.planned_kg,
                order.actual_kg,
                order.operator,
                order.notes,
                order.status.to_db_str(),
                order.start_time,
                order.end_time,
                id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::not_found("ProductionOrder", id));
        }
        Ok(())
    }

    /// 累加实际产量（单条 UPDATE，返回累加后的值）
    pub fn add_actual_kg(&self, id: i64, amount_kg: f64) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE production_orders SET actual_kg = actual_kg + ?1 WHERE id = ?2",
            params![amount_kg, id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("ProductionOrder", id));
        }

        let actual: f64 = conn.query_row(
            "SELECT actual_kg FROM production_orders WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(actual)
    }

    /// 激活订单 (同时完成其他激活订单)
    ///
    /// # 红线
    /// - 必须在事务中完成，确保原子性（不存在"零个激活订单"的中间态）
    /// - 同一时刻只能有一个激活订单
    ///
    /// # 状态转换
    /// - Pending → Active: start_time = now
    /// - Active → Active: 无写入
    /// - Completed → Active: 拒绝
    ///
    /// 注: 旧版车间界面允许重新激活已完成订单（任何非激活订单都可点"激活"），
    /// 这里按 Pending → Active → Completed 单向流转处理，已完成订单不可回退
    pub fn activate(&self, id: i64, now: NaiveDateTime) -> RepositoryResult<ActivationOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 1. 校验目标订单状态
        let status_raw: Option<String> = tx
            .query_row(
                "SELECT status FROM production_orders WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let status_raw = status_raw.ok_or_else(|| RepositoryError::not_found("ProductionOrder", id))?;
        let status = OrderStatus::from_db_str(&status_raw).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: format!("未知订单状态: {}", status_raw),
            }
        })?;

        match status {
            OrderStatus::Active => {
                return Ok(ActivationOutcome {
                    completed_ids: Vec::new(),
                    already_active: true,
                });
            }
            OrderStatus::Completed => {
                return Err(RepositoryError::InvalidStateTransition {
                    from: OrderStatus::Completed.to_string(),
                    to: OrderStatus::Active.to_string(),
                });
            }
            OrderStatus::Pending => {}
        }

        // 2. 完成其他激活订单
        let completed_ids = {
            let mut stmt = tx.prepare(
                "SELECT id FROM production_orders WHERE status = 'ACTIVE' AND id != ?1 ORDER BY id",
            )?;
            let ids = stmt
                .query_map(params![id], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            ids
        };

        tx.execute(
            "UPDATE production_orders SET status = 'COMPLETED', end_time = ?1 WHERE status = 'ACTIVE' AND id != ?2",
            params![now, id],
        )?;

        // 3. 激活目标订单
        tx.execute(
            "UPDATE production_orders SET status = 'ACTIVE', start_time = ?1 WHERE id = ?2",
            params![now, id],
        )?;

        tx.commit()?;
        Ok(ActivationOutcome {
            completed_ids,
            already_active: false,
        })
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProductionOrder>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM production_orders WHERE id = ?1", ORDER_COLUMNS);
        let order = conn
            .query_row(&sql, params![id], map_order_row)
            .optional()?;
        Ok(order)
    }

    /// 查询当前激活订单
    pub fn find_active(&self) -> RepositoryResult<Option<ProductionOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM production_orders WHERE status = 'ACTIVE' ORDER BY id DESC LIMIT 1",
            ORDER_COLUMNS
        );
        let order = conn.query_row(&sql, [], map_order_row).optional()?;
        Ok(order)
    }

    /// 激活订单数量（不变量检查用）
    pub fn count_active(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            "SELECT COUNT(*) FROM production_orders WHERE status = 'ACTIVE'",
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// 全部订单（ID 升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<ProductionOrder>> {
        self.query_list(
            &format!("SELECT {} FROM production_orders ORDER BY id ASC", ORDER_COLUMNS),
            &[],
        )
    }

    /// 全部订单（最新在前）
    pub fn list_newest_first(&self) -> RepositoryResult<Vec<ProductionOrder>> {
        self.query_list(
            &format!("SELECT {} FROM production_orders ORDER BY id DESC", ORDER_COLUMNS),
            &[],
        )
    }

    /// 按开始时间范围查询: start_time ∈ [from, until)
    ///
    /// until 为 None 时不设上界；未开始的订单（start_time 为空）不返回
    pub fn find_started_between(
        &self,
        from: NaiveDateTime,
        until: Option<NaiveDateTime>,
    ) -> RepositoryResult<Vec<ProductionOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM production_orders
            WHERE start_time IS NOT NULL
              AND start_time >= ?1
              AND (?2 IS NULL OR start_time < ?2)
            ORDER BY start_time ASC, id ASC
            "#,
            ORDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params![from, until], map_order_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    /// 按ID集合查询（ID 升序，不存在的ID忽略）
    pub fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<ProductionOrder>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT {} FROM production_orders WHERE id IN ({}) ORDER BY id ASC",
            ORDER_COLUMNS, placeholders
        );
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params_from_iter(ids.iter()), map_order_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    fn query_list(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<ProductionOrder>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let orders = stmt
            .query_map(args, map_order_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }
}

/// 映射数据库行到 ProductionOrder
fn map_order_row(row: &Row) -> rusqlite::Result<ProductionOrder> {
    let status_raw: String = row.get(8)?;
    Ok(ProductionOrder {
        id: Some(row.get(0)?),
        op: row.get(1)?,
        product: row.get(2)?,
        lot: row.get(3)?,
        planned_kg: row.get(4)?,
        actual_kg: row.get(5)?,
        operator: row.get(6)?,
        notes: row.get(7)?,
        status: decode_enum(8, &status_raw, OrderStatus::from_db_str)?,
        start_time: row.get(9)?,
        end_time: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::production::OrderInput;
    use chrono::NaiveDate;

    fn repo() -> ProductionOrderRepository {
        ProductionOrderRepository::new(Arc::new(Mutex::new(open_in_memory().unwrap())))
    }

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn order(op: &str) -> ProductionOrder {
        ProductionOrder::from_input(&OrderInput {
            op: op.to_string(),
            product: "Filme".to_string(),
            lot: "L-01".to_string(),
            planned_kg: 100.0,
            operator: "Ana".to_string(),
            notes: String::new(),
        })
    }

    #[test]
    fn test_insert_assigns_monotonic_ids() {
        let repo = repo();
        let a = repo.insert(&order("OP-1")).unwrap();
        let b = repo.insert(&order("OP-2")).unwrap();
        assert!(b > a);

        let loaded = repo.find_by_id(a).unwrap().unwrap();
        assert_eq!(loaded.op, "OP-1");
        assert_eq!(loaded.status, OrderStatus::Pending);
        assert_eq!(loaded.start_time, None);
    }

    #[test]
    fn test_activate_completes_previous() {
        let repo = repo();
        let a = repo.insert(&order("OP-A")).unwrap();
        let b = repo.insert(&order("OP-B")).unwrap();

        let first = repo.activate(a, at(6)).unwrap();
        assert!(first.completed_ids.is_empty());

        let second = repo.activate(b, at(10)).unwrap();
        assert_eq!(second.completed_ids, vec![a]);

        let a_loaded = repo.find_by_id(a).unwrap().unwrap();
        assert_eq!(a_loaded.status, OrderStatus::Completed);
        assert_eq!(a_loaded.end_time, Some(at(10)));

        let b_loaded = repo.find_by_id(b).unwrap().unwrap();
        assert_eq!(b_loaded.status, OrderStatus::Active);
        assert_eq!(b_loaded.start_time, Some(at(10)));
        assert_eq!(repo.count_active().unwrap(), 1);
    }

    #[test]
    fn test_activate_completed_order_rejected() {
        let repo = repo();
        let a = repo.insert(&order("OP-A")).unwrap();
        let b = repo.insert(&order("OP-B")).unwrap();
        repo.activate(a, at(6)).unwrap();
        repo.activate(b, at(7)).unwrap();

        let err = repo.activate(a, at(8)).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidStateTransition { .. }));
        // 事务回滚: b 仍为激活
        assert_eq!(repo.find_active().unwrap().unwrap().id, Some(b));
    }

    #[test]
    fn test_activate_missing_order() {
        let repo = repo();
        let err = repo.activate(42, at(6)).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_find_started_between() {
        let repo = repo();
        let a = repo.insert(&order("OP-A")).unwrap();
        let b = repo.insert(&order("OP-B")).unwrap();
        repo.insert(&order("OP-C")).unwrap(); // 未开始
        repo.activate(a, at(5)).unwrap();
        repo.activate(b, at(12)).unwrap();

        let all = repo.find_started_between(at(0), None).unwrap();
        assert_eq!(all.len(), 2);

        let morning = repo.find_started_between(at(0), Some(at(12))).unwrap();
        assert_eq!(morning.len(), 1);
        assert_eq!(morning[0].id, Some(a));
    }

    #[test]
    fn test_add_actual_kg_and_find_by_ids() {
        let repo = repo();
        let a = repo.insert(&order("OP-A")).unwrap();
        let b = repo.insert(&order("OP-B")).unwrap();
        assert_eq!(repo.add_actual_kg(a, 12.5).unwrap(), 12.5);
        assert_eq!(repo.add_actual_kg(a, 7.5).unwrap(), 20.0);

        let picked = repo.find_by_ids(&[b, a, 999]).unwrap();
        assert_eq!(picked.iter().map(|o| o.id.unwrap()).collect::<Vec<_>>(), vec![a, b]);
        assert!(repo.find_by_ids(&[]).unwrap().is_empty());
    }
}
