// ==========================================
// 挤出线车间管理系统 - 领域类型定义
// ==========================================
// 状态/类别枚举: 数据库存储串 + 报表显示标签
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 生产订单状态 (Order Status)
// ==========================================
// 状态机: Pending → Active → Completed
// 红线: 同一时刻最多一个 Active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,   // 待生产
    Active,    // 生产中
    Completed, // 已完成
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl OrderStatus {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Active => "ACTIVE",
            OrderStatus::Completed => "COMPLETED",
        }
    }

    /// 从数据库字符串解析（未知值返回 None）
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "ACTIVE" => Some(OrderStatus::Active),
            "COMPLETED" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// 报表显示标签（车间使用葡语）
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Active => "Ativa",
            OrderStatus::Completed => "Concluída",
        }
    }
}

// ==========================================
// 停机类别 (Stop Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopCategory {
    Mechanical, // 机械
    Electrical, // 电气
    Process,    // 工艺
    Quality,    // 质量
    Input,      // 原料/辅料
    Other,      // 其他
}

impl StopCategory {
    /// 全部类别（表单下拉顺序）
    pub const ALL: [StopCategory; 6] = [
        StopCategory::Mechanical,
        StopCategory::Electrical,
        StopCategory::Process,
        StopCategory::Quality,
        StopCategory::Input,
        StopCategory::Other,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            StopCategory::Mechanical => "MECHANICAL",
            StopCategory::Electrical => "ELECTRICAL",
            StopCategory::Process => "PROCESS",
            StopCategory::Quality => "QUALITY",
            StopCategory::Input => "INPUT",
            StopCategory::Other => "OTHER",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.to_db_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            StopCategory::Mechanical => "Mecânica",
            StopCategory::Electrical => "Elétrica",
            StopCategory::Process => "Processo",
            StopCategory::Quality => "Qualidade",
            StopCategory::Input => "Insumo",
            StopCategory::Other => "Outros",
        }
    }
}

impl fmt::Display for StopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 维护类型 (Maintenance Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceType {
    Corrective, // 纠正性（故障后维修）
    Preventive, // 预防性（按周期）
    Predictive, // 预测性（按状态监测）
}

impl MaintenanceType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MaintenanceType::Corrective => "CORRECTIVE",
            MaintenanceType::Preventive => "PREVENTIVE",
            MaintenanceType::Predictive => "PREDICTIVE",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CORRECTIVE" => Some(MaintenanceType::Corrective),
            "PREVENTIVE" => Some(MaintenanceType::Preventive),
            "PREDICTIVE" => Some(MaintenanceType::Predictive),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaintenanceType::Corrective => "Corretiva",
            MaintenanceType::Preventive => "Preventiva",
            MaintenanceType::Predictive => "Preditiva",
        }
    }

    /// 是否可用于周期性计划（纠正性维护不能排计划）
    pub fn is_schedulable(&self) -> bool {
        !matches!(self, MaintenanceType::Corrective)
    }
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 维护工单状态 (Intervention Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionStatus {
    Open,   // 进行中
    Closed, // 已关闭
}

impl InterventionStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            InterventionStatus::Open => "OPEN",
            InterventionStatus::Closed => "CLOSED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPEN" => Some(InterventionStatus::Open),
            "CLOSED" => Some(InterventionStatus::Closed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InterventionStatus::Open => "Aberta",
            InterventionStatus::Closed => "Fechada",
        }
    }
}

impl fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
// 序列化值与会话存储格式一致: {"role":"operacional"}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "operacional")]
    Operational, // 操作工
    #[serde(rename = "controle")]
    Control, // 生产控制
    #[serde(rename = "manutencao")]
    Maintenance, // 维修
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Operational, UserRole::Control, UserRole::Maintenance];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Operational => "operacional",
            UserRole::Control => "controle",
            UserRole::Maintenance => "manutencao",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == s.trim())
    }

    /// i18n 键
    pub fn label_key(&self) -> &'static str {
        match self {
            UserRole::Operational => "role.operacional",
            UserRole::Control => "role.controle",
            UserRole::Maintenance => "role.manutencao",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
