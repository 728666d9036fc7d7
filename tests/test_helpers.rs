// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、目录种子数据、内存存储与 Mock 配置
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use material_price_ledger::config::ImportConfigReader;
use material_price_ledger::db::{init_schema, open_sqlite_connection};
use material_price_ledger::domain::{
    Material, PriceRecord, PriceRecordDraft, PriceRecordPatch, PriceSource,
    DEFAULT_ERROR_DETAIL_LIMIT,
};
use material_price_ledger::importer::{ImportResult, SynonymTable};
use material_price_ledger::repository::{
    CatalogReader, PriceStore, RepositoryError, RepositoryResult,
};
use std::collections::HashSet;
use std::error::Error;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tokio::sync::Notify;

/// 创建临时测试数据库并初始化 schema + 种子目录
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("非 UTF-8 路径")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    seed_catalog(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入种子材料目录与价格来源
pub fn seed_catalog(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    for m in catalog() {
        conn.execute(
            "INSERT INTO material (id, abbreviation, description, unit) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![m.id, m.abbreviation, m.description, m.unit],
        )?;
    }
    for s in price_sources() {
        conn.execute(
            "INSERT INTO price_source (id, name, source_type) VALUES (?1, ?2, ?3)",
            rusqlite::params![s.id, s.name, s.source_type],
        )?;
    }
    Ok(())
}

/// 测试材料目录（目录顺序即匹配顺序）
pub fn catalog() -> Vec<Material> {
    vec![
        material("M-PET", "PET", "Polyéthylène téréphtalate"),
        material("M-CARTON", "CARTON", "Carton ondulé double cannelure"),
        material("M-ALU", "ALU", "Aluminium laminé"),
    ]
}

pub fn material(id: &str, abbreviation: &str, description: &str) -> Material {
    Material {
        id: id.to_string(),
        abbreviation: abbreviation.to_string(),
        description: description.to_string(),
        unit: "t".to_string(),
    }
}

/// 测试价格来源（按名称排序后 SRC-MKT 在前）
pub fn price_sources() -> Vec<PriceSource> {
    vec![
        PriceSource {
            id: "SRC-MKT".to_string(),
            name: "Cotation marché".to_string(),
            source_type: "MARKET".to_string(),
        },
        PriceSource {
            id: "SRC-SUP".to_string(),
            name: "Fournisseur".to_string(),
            source_type: "SUPPLIER".to_string(),
        },
    ]
}

/// 写入临时 CSV 文件
pub fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    for line in lines {
        writeln!(temp_file, "{}", line).unwrap();
    }
    temp_file.flush().unwrap();
    temp_file
}

// ==========================================
// RecordingStore - 内存存储（记录调用次数，可注入失败）
// ==========================================
pub struct RecordingStore {
    materials: Vec<Material>,
    sources: Vec<PriceSource>,
    records: Mutex<Vec<PriceRecord>>,
    create_calls: AtomicUsize,
    failing_materials: Mutex<HashSet<String>>,
    // 并发测试: 首次 create 时通知 entered，并等待 gate
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl RecordingStore {
    pub fn new(materials: Vec<Material>, sources: Vec<PriceSource>) -> Self {
        Self {
            materials,
            sources,
            records: Mutex::new(Vec::new()),
            create_calls: AtomicUsize::new(0),
            failing_materials: Mutex::new(HashSet::new()),
            gate: None,
        }
    }

    /// 默认目录 + 默认来源
    pub fn seeded() -> Self {
        Self::new(catalog(), price_sources())
    }

    /// create 调用在 gate 放行前挂起
    pub fn with_gate(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    /// 指定材料的 create 调用返回存储错误
    pub fn fail_for(&self, material_id: &str) {
        self.failing_materials
            .lock()
            .unwrap()
            .insert(material_id.to_string());
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<PriceRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceStore for RecordingStore {
    async fn list_price_sources(&self) -> RepositoryResult<Vec<PriceSource>> {
        Ok(self.sources.clone())
    }

    async fn list_prices(&self, material_id: &str) -> RepositoryResult<Vec<PriceRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.material_id == material_id)
            .cloned()
            .collect())
    }

    async fn find_price(&self, id: &str) -> RepositoryResult<Option<PriceRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn create_price(&self, draft: PriceRecordDraft) -> RepositoryResult<PriceRecord> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((entered, release)) = &self.gate {
            if n == 1 {
                entered.notify_one();
                release.notified().await;
            }
        }

        if self
            .failing_materials
            .lock()
            .unwrap()
            .contains(&draft.material_id)
        {
            return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
        }

        let record = draft.into_record(format!("P{}", n), Utc::now());
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_price(
        &self,
        id: &str,
        patch: PriceRecordPatch,
    ) -> RepositoryResult<PriceRecord> {
        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "PriceRecord".to_string(),
                id: id.to_string(),
            })?;
        *slot = patch.apply_to(slot);
        Ok(slot.clone())
    }

    async fn delete_price(&self, id: &str) -> RepositoryResult<()> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(RepositoryError::NotFound {
                entity: "PriceRecord".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for RecordingStore {
    async fn list_materials(&self) -> RepositoryResult<Vec<Material>> {
        Ok(self.materials.clone())
    }
}

// ==========================================
// MockConfig - 固定配置
// ==========================================
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub error_detail_limit: usize,
    pub currency: String,
    pub operator: String,
    pub synonyms: SynonymTable,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            error_detail_limit: DEFAULT_ERROR_DETAIL_LIMIT,
            currency: "EUR".to_string(),
            operator: "tester".to_string(),
            synonyms: SynonymTable::default(),
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_error_detail_limit(&self) -> ImportResult<usize> {
        Ok(self.error_detail_limit)
    }

    async fn get_default_currency(&self) -> ImportResult<String> {
        Ok(self.currency.clone())
    }

    async fn get_default_operator(&self) -> ImportResult<String> {
        Ok(self.operator.clone())
    }

    async fn get_synonym_table(&self) -> ImportResult<SynonymTable> {
        Ok(self.synonyms.clone())
    }
}
