// ==========================================
// 材料价格台账 - 价格导入 Trait
// ==========================================
// 职责: 定义价格导入接口（不包含实现）
// ==========================================

use crate::domain::import::ImportReport;
use crate::domain::types::ImportRunState;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawTable;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ==========================================
// ImportRequest - 导入参数
// ==========================================
// 未指定的字段取配置默认值（来源取第一个已登记来源，起始日期取今天）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub price_source_id: Option<String>,
    pub currency: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub comment: Option<String>,
    pub operator: Option<String>,
    pub origin_file: Option<String>,
}

// ==========================================
// PriceImporter Trait
// ==========================================
// 用途: 价格导入主接口
// 实现者: PriceImporterImpl
#[async_trait]
pub trait PriceImporter: Send + Sync {
    /// 导入已解析的表格
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入报告（行级错误在报告内累积）
    /// - Err: 前置条件失败（未处理任何行）或已有导入在运行
    ///
    /// # 导入流程
    /// 1. 校验: 价格来源 / 数据行 / 必需列
    /// 2. 逐行: 解析 → 匹配材料 → 创建价格记录（严格顺序）
    async fn import_table(&self, table: RawTable, request: &ImportRequest)
        -> ImportResult<ImportReport>;

    /// 从 Excel / CSV 文件导入
    ///
    /// # 参数
    /// - file_path: 文件路径（.xlsx / .xls / .csv）
    /// - request: 导入参数（origin_file 缺省时取文件名）
    async fn import_file(&self, file_path: &Path, request: &ImportRequest)
        -> ImportResult<ImportReport>;

    /// 从粘贴的制表符文本导入（每行: 名称<TAB>价格<TAB>最低价?<TAB>最高价?）
    async fn import_pasted_text(&self, text: &str, request: &ImportRequest)
        -> ImportResult<ImportReport>;

    /// 当前运行状态
    fn current_state(&self) -> ImportRunState;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格（第一行为表头）
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 数据行（空白行保留）
    /// - Err: 文件不存在、格式不支持、内容损坏
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}
