// ==========================================
// 材料价格台账 - 材料目录与价格来源
// ==========================================
// 用途: 外部只读输入（本模块不负责目录维护）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Material - 材料目录条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,           // 材料标识
    pub abbreviation: String, // 简称（例如 PET）
    pub description: String,  // 描述
    pub unit: String,         // 计价单位（例如 t）
}

// ==========================================
// PriceSource - 价格来源
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSource {
    pub id: String,
    pub name: String,
    pub source_type: String, // 来源类型（例如 INDEX / SUPPLIER / INTERNAL）
}
