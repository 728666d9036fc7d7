// ==========================================
// 材料价格台账 - 价格导入API
// ==========================================
// 职责: 封装价格导入（文件/粘贴文本），生成面向操作员的汇总结果
// 规则: 错误数不超过明细上限时才返回逐行错误，否则只返回计数
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::import::{ImportReport, ImportStatus, RowError};
use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use crate::importer::{ImportRequest, PriceImporter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 导入结论
    pub status: ImportStatus,
    /// 成功创建的价格记录数
    pub success_count: usize,
    /// 记录的行级错误数
    pub error_count: usize,
    /// 行级错误明细（超过上限时为空）
    pub errors: Vec<RowError>,
    /// 明细是否因超过上限被隐藏
    pub errors_truncated: bool,
    /// 依赖方是否需要刷新
    pub should_refresh: bool,
    /// 单行汇总消息（已本地化）
    pub message: String,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

impl ImportApiResponse {
    /// 由导入报告生成响应
    ///
    /// # 参数
    /// - report: 导入报告
    /// - detail_limit: 错误明细展示上限
    /// - elapsed_ms: 耗时
    pub fn from_report(report: &ImportReport, detail_limit: usize, elapsed_ms: i64) -> Self {
        let visible = report.visible_errors(detail_limit);
        let status = report.status();

        Self {
            status,
            success_count: report.success_count,
            error_count: report.error_count,
            errors: visible.map(|errors| errors.to_vec()).unwrap_or_default(),
            errors_truncated: visible.is_none(),
            should_refresh: report.should_refresh(),
            message: summary_message(report, visible.is_none()),
            elapsed_ms,
        }
    }
}

/// 单行汇总消息
pub fn summary_message(report: &ImportReport, truncated: bool) -> String {
    let success = report.success_count.to_string();
    let errors = report.error_count.to_string();
    let args = [("success", success.as_str()), ("errors", errors.as_str())];

    let summary = match report.status() {
        ImportStatus::Succeeded => t_with_args("import.summary_succeeded", &args),
        ImportStatus::PartiallySucceeded => t_with_args("import.summary_partial", &args),
        ImportStatus::Failed => t_with_args("import.summary_failed", &args),
        ImportStatus::Empty => t("import.summary_empty"),
    };

    if truncated {
        format!("{} {}", summary, t("import.details_hidden"))
    } else {
        summary
    }
}

/// 导入错误 → 本地化的 API 错误
pub fn localize_import_error(err: ImportError) -> ApiError {
    match err {
        ImportError::ImportInProgress => ApiError::ImportInProgress,
        ImportError::MissingRequiredColumn(column) => ApiError::ImportRejected(t_with_args(
            "import.missing_column",
            &[("column", column.as_str())],
        )),
        ImportError::NoPriceSource(detail) => ApiError::ImportRejected(t_with_args(
            "import.no_price_source",
            &[("detail", detail.as_str())],
        )),
        ImportError::NoDataRows => ApiError::ImportRejected(t("import.no_data_rows")),
        ImportError::InvalidRequest(detail) => ApiError::ImportRejected(t_with_args(
            "import.invalid_request",
            &[("detail", detail.as_str())],
        )),
        ImportError::FileNotFound(path) => {
            ApiError::ImportFailed(t_with_args("import.file_not_found", &[("path", path.as_str())]))
        }
        ImportError::UnsupportedFormat(format) => ApiError::ImportFailed(t_with_args(
            "import.unsupported_format",
            &[("format", format.as_str())],
        )),
        ImportError::UnsupportedEncoding(path) => ApiError::ImportFailed(t_with_args(
            "import.unsupported_encoding",
            &[("path", path.as_str())],
        )),
        other if other.is_fatal_input() => {
            let reason = other.to_string();
            ApiError::ImportFailed(t_with_args("import.read_failed", &[("reason", reason.as_str())]))
        }
        other => other.into(),
    }
}

/// 导入API
pub struct ImportApi {
    importer: Arc<dyn PriceImporter>,
    config: Arc<dyn ImportConfigReader>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - importer: 共享的导入器（单任务互斥依赖同一实例）
    /// - config: 配置读取器（错误明细上限）
    pub fn new(importer: Arc<dyn PriceImporter>, config: Arc<dyn ImportConfigReader>) -> Self {
        Self { importer, config }
    }

    /// 导入价格文件（.xlsx / .xls / .csv）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入已执行（可能部分失败）
    /// - Err(ApiError): 导入被拒绝或输入不可读
    pub async fn import_file(
        &self,
        file_path: &str,
        request: ImportRequest,
    ) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let start = Instant::now();
        let result = self.importer.import_file(Path::new(file_path), &request).await;
        self.respond(result, start).await
    }

    /// 导入粘贴的制表符文本
    pub async fn import_pasted_text(
        &self,
        text: &str,
        request: ImportRequest,
    ) -> ApiResult<ImportApiResponse> {
        let start = Instant::now();
        let result = self.importer.import_pasted_text(text, &request).await;
        self.respond(result, start).await
    }

    async fn respond(
        &self,
        result: Result<ImportReport, ImportError>,
        start: Instant,
    ) -> ApiResult<ImportApiResponse> {
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "价格导入未执行");
                return Err(localize_import_error(e));
            }
        };

        let detail_limit = self
            .config
            .get_error_detail_limit()
            .await
            .map_err(localize_import_error)?;
        let response =
            ImportApiResponse::from_report(&report, detail_limit, start.elapsed().as_millis() as i64);

        info!(
            status = ?response.status,
            success = response.success_count,
            errors = response.error_count,
            "导入结果已生成"
        );
        Ok(response)
    }
}
