// ==========================================
// 材料价格台账 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::column_detector::SynonymTable;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取逐行错误明细的展示上限
    ///
    /// # 返回
    /// - usize: 错误数不超过该值时才展示明细
    ///
    /// # 默认值
    /// - 10
    async fn get_error_detail_limit(&self) -> ImportResult<usize>;

    /// 获取导入价格的默认币种
    ///
    /// # 默认值
    /// - EUR
    async fn get_default_currency(&self) -> ImportResult<String>;

    /// 获取导入记录的默认操作人（created_by）
    ///
    /// # 默认值
    /// - system
    async fn get_default_operator(&self) -> ImportResult<String>;

    /// 获取列识别同义词表
    ///
    /// # 返回
    /// - SynonymTable: 未配置时为内置同义词表；配置为 JSON 时按字段覆盖
    async fn get_synonym_table(&self) -> ImportResult<SynonymTable>;
}
