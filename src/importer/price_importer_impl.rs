// ==========================================
// 材料价格台账 - 价格导入器实现
// ==========================================
// 职责: 整合导入流程，从表格/文件/粘贴文本到价格记录
// 流程: 校验（来源 → 数据行 → 必需列）→ 逐行 解析 → 匹配 → 落库
// 红线: 同一时间只允许一个导入任务；逐行严格顺序落库
// 红线: 校验失败时不调用任何写入接口
// 红线: 导入只创建记录，不修改、不删除
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{ImportReport, RowError, RowErrorKind, RowResult};
use crate::domain::material::Material;
use crate::domain::price::normalize_currency_code;
use crate::domain::types::ImportRunState;
use crate::engine::PriceLedger;
use crate::importer::column_detector::ColumnMap;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{parse_pasted_text, RawTable, UniversalFileParser};
use crate::importer::price_importer_trait::{FileParser, ImportRequest, PriceImporter};
use crate::importer::reconcile::{detect_table_columns, plan_rows, ImportPolicy, RowOutcome};
use crate::repository::{CatalogReader, PriceStore};
use async_trait::async_trait;
use chrono::Local;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tracing::{debug, info, instrument, warn};

/// 校验阶段的产物
struct PreparedRun {
    policy: ImportPolicy,
    columns: ColumnMap,
    catalog: Vec<Material>,
}

// ==========================================
// PriceImporterImpl - 价格导入器实现
// ==========================================
pub struct PriceImporterImpl<S, C>
where
    S: PriceStore + CatalogReader,
    C: ImportConfigReader,
{
    // 数据访问层
    store: Arc<S>,
    ledger: PriceLedger<S>,

    // 配置读取器
    config: C,

    // 文件解析器
    file_parser: Box<dyn FileParser>,

    // 单任务互斥 + 运行状态
    run_guard: AsyncMutex<()>,
    state: Mutex<ImportRunState>,
}

impl<S, C> PriceImporterImpl<S, C>
where
    S: PriceStore + CatalogReader,
    C: ImportConfigReader,
{
    /// 创建导入器（默认按扩展名选择 Excel/CSV 解析器）
    ///
    /// # 参数
    /// - store: 价格存储（同时提供材料目录）
    /// - config: 配置读取器
    pub fn new(store: Arc<S>, config: C) -> Self {
        Self {
            ledger: PriceLedger::new(Arc::clone(&store)),
            store,
            config,
            file_parser: Box::new(UniversalFileParser),
            run_guard: AsyncMutex::new(()),
            state: Mutex::new(ImportRunState::Idle),
        }
    }

    /// 替换文件解析器
    pub fn with_file_parser(mut self, file_parser: Box<dyn FileParser>) -> Self {
        self.file_parser = file_parser;
        self
    }

    fn set_state(&self, next: ImportRunState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = *state;
        *state = next;
        debug!(from = %previous, to = %next, "导入状态变更");
    }

    fn acquire_run(&self) -> ImportResult<AsyncMutexGuard<'_, ()>> {
        self.run_guard.try_lock().map_err(|_| {
            warn!("已有导入任务正在执行，拒绝新的导入请求");
            ImportError::ImportInProgress
        })
    }

    /// 解析价格来源: 指定 id 必须存在；未指定时取第一个已登记来源
    async fn resolve_price_source(&self, requested: Option<&str>) -> ImportResult<String> {
        let sources = self.store.list_price_sources().await?;
        let requested = requested.map(str::trim).filter(|id| !id.is_empty());

        match requested {
            Some(id) => sources
                .iter()
                .find(|source| source.id == id)
                .map(|source| source.id.clone())
                .ok_or_else(|| ImportError::NoPriceSource(format!("价格来源不存在: {}", id))),
            None => sources
                .first()
                .map(|source| source.id.clone())
                .ok_or_else(|| ImportError::NoPriceSource("未登记任何价格来源".to_string())),
        }
    }

    async fn build_policy(&self, request: &ImportRequest) -> ImportResult<ImportPolicy> {
        let price_source_id = self
            .resolve_price_source(request.price_source_id.as_deref())
            .await?;

        let valid_from = request
            .valid_from
            .unwrap_or_else(|| Local::now().date_naive());
        if let Some(valid_to) = request.valid_to {
            if valid_to < valid_from {
                return Err(ImportError::InvalidRequest(format!(
                    "截止日期 {} 早于起始日期 {}",
                    valid_to, valid_from
                )));
            }
        }

        let raw_currency = match request.currency.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => self.config.get_default_currency().await?,
        };
        let currency = normalize_currency_code(&raw_currency).ok_or_else(|| {
            ImportError::InvalidRequest(format!("币种代码必须为三位字母: {}", raw_currency))
        })?;
        let created_by = match request.operator.as_deref().map(str::trim) {
            Some(op) if !op.is_empty() => op.to_string(),
            _ => self.config.get_default_operator().await?,
        };

        Ok(ImportPolicy {
            price_source_id,
            currency,
            valid_from,
            valid_to: request.valid_to,
            comment: request.comment.clone().filter(|c| !c.trim().is_empty()),
            origin_file: request.origin_file.clone(),
            created_by,
            synonyms: self.config.get_synonym_table().await?,
        })
    }

    /// 校验阶段（任一失败则整批拒绝）
    async fn prepare(&self, table: &RawTable, request: &ImportRequest) -> ImportResult<PreparedRun> {
        let policy = self.build_policy(request).await?;

        if !table.has_data_rows() {
            return Err(ImportError::NoDataRows);
        }

        let columns = detect_table_columns(table, &policy.synonyms)?;
        debug!(columns = ?columns, "列识别完成");

        let catalog = self.store.list_materials().await?;
        debug!(materials = catalog.len(), "材料目录已加载");

        Ok(PreparedRun {
            policy,
            columns,
            catalog,
        })
    }

    /// 单行落库（仅 Ready 行调用存储）
    async fn settle(&self, outcome: RowOutcome) -> RowResult {
        match outcome {
            RowOutcome::Dropped(reason) => {
                debug!(reason = ?reason, "行被静默丢弃");
                RowResult::Dropped
            }
            RowOutcome::Unresolved(error) => {
                warn!(row_number = error.row_number, row_ref = %error.row_ref, reason = %error.reason, "行未匹配");
                RowResult::Failed(error)
            }
            RowOutcome::Ready(pending) => match self.ledger.create(pending.draft).await {
                Ok(record) => {
                    debug!(row_number = pending.row_number, price_id = %record.id, "行已落库");
                    RowResult::Persisted
                }
                Err(e) => {
                    warn!(row_number = pending.row_number, row_ref = %pending.row_ref, error = %e, "行落库失败");
                    RowResult::Failed(RowError {
                        row_number: pending.row_number,
                        row_ref: pending.row_ref,
                        kind: RowErrorKind::Persist,
                        reason: e.to_string(),
                    })
                }
            },
        }
    }

    /// 在已持有运行锁的前提下执行导入
    async fn run_locked(&self, table: RawTable, request: &ImportRequest) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        self.set_state(ImportRunState::Validating);

        let prepared = match self.prepare(&table, request).await {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(error = %e, "导入前置校验失败，未处理任何行");
                self.set_state(ImportRunState::Rejected);
                return Err(e);
            }
        };

        self.set_state(ImportRunState::Importing);
        let outcomes = plan_rows(&table, &prepared.columns, &prepared.catalog, &prepared.policy);

        // 严格顺序: 每行落库完成后才处理下一行
        let report = stream::iter(outcomes)
            .fold(ImportReport::default(), |report, outcome| async move {
                report.absorb(self.settle(outcome).await)
            })
            .await;

        self.set_state(ImportRunState::Completed);
        info!(
            success = report.success_count,
            errors = report.error_count,
            status = ?report.status(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "价格导入完成"
        );
        Ok(report)
    }
}

#[async_trait]
impl<S, C> PriceImporter for PriceImporterImpl<S, C>
where
    S: PriceStore + CatalogReader,
    C: ImportConfigReader,
{
    #[instrument(skip(self, table, request), fields(rows = table.rows.len()))]
    async fn import_table(
        &self,
        table: RawTable,
        request: &ImportRequest,
    ) -> ImportResult<ImportReport> {
        let _run = self.acquire_run()?;
        info!("开始导入价格表格");
        self.run_locked(table, request).await
    }

    #[instrument(skip(self, request), fields(file_path = %file_path.display()))]
    async fn import_file(
        &self,
        file_path: &Path,
        request: &ImportRequest,
    ) -> ImportResult<ImportReport> {
        let _run = self.acquire_run()?;
        info!("开始导入价格文件");
        self.set_state(ImportRunState::Validating);

        let table = match self.file_parser.parse_to_table(file_path) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "文件解析失败");
                self.set_state(ImportRunState::Rejected);
                return Err(e);
            }
        };
        debug!(rows = table.rows.len(), "文件解析完成");

        let mut request = request.clone();
        if request.origin_file.is_none() {
            request.origin_file = file_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
        self.run_locked(table, &request).await
    }

    #[instrument(skip(self, text, request), fields(chars = text.len()))]
    async fn import_pasted_text(
        &self,
        text: &str,
        request: &ImportRequest,
    ) -> ImportResult<ImportReport> {
        let _run = self.acquire_run()?;
        info!("开始导入粘贴文本");
        self.run_locked(parse_pasted_text(text), request).await
    }

    fn current_state(&self) -> ImportRunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
