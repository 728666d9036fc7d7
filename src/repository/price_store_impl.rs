// ==========================================
// 材料价格台账 - 价格存储 Repository 实现
// ==========================================
// 职责: 实现价格记录 CRUD 与目录只读访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 存储: material / price_source / material_price 表
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::material::{Material, PriceSource};
use crate::domain::price::{PriceRecord, PriceRecordDraft, PriceRecordPatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::price_store::{CatalogReader, PriceStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const PRICE_COLUMNS: &str = r#"
    id, material_id, price_source_id, price, price_min, price_max, currency,
    valid_from, valid_to, comment, origin_file, created_by, created_at
"#;

// ==========================================
// SqlitePriceStore
// ==========================================
pub struct SqlitePriceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePriceStore {
    /// 从共享连接创建（调用方负责建表）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 打开数据库文件并确保表结构存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn find_price_with(conn: &Connection, id: &str) -> RepositoryResult<Option<PriceRecord>> {
        let sql = format!("SELECT {} FROM material_price WHERE id = ?1", PRICE_COLUMNS);
        let record = conn
            .query_row(&sql, params![id], map_price_row)
            .optional()?;
        Ok(record)
    }
}

#[async_trait]
impl PriceStore for SqlitePriceStore {
    async fn list_price_sources(&self) -> RepositoryResult<Vec<PriceSource>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, source_type FROM price_source ORDER BY name, id",
        )?;
        let sources = stmt
            .query_map([], |row| {
                Ok(PriceSource {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    source_type: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sources)
    }

    async fn list_prices(&self, material_id: &str) -> RepositoryResult<Vec<PriceRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM material_price WHERE material_id = ?1 ORDER BY created_at, rowid",
            PRICE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![material_id], map_price_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    async fn find_price(&self, id: &str) -> RepositoryResult<Option<PriceRecord>> {
        let conn = self.get_conn()?;
        Self::find_price_with(&conn, id)
    }

    async fn create_price(&self, draft: PriceRecordDraft) -> RepositoryResult<PriceRecord> {
        let record = draft.into_record(Uuid::new_v4().to_string(), Utc::now());
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO material_price (
                id, material_id, price_source_id, price, price_min, price_max, currency,
                valid_from, valid_to, comment, origin_file, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                record.id,
                record.material_id,
                record.price_source_id,
                record.price,
                record.price_min,
                record.price_max,
                record.currency,
                record.valid_from.format(DATE_FORMAT).to_string(),
                record.valid_to.map(|d| d.format(DATE_FORMAT).to_string()),
                record.comment,
                record.origin_file,
                record.created_by,
                format_timestamp(&record.created_at),
            ],
        )?;

        debug!(price_id = %record.id, material_id = %record.material_id, "价格记录已创建");
        Ok(record)
    }

    async fn update_price(
        &self,
        id: &str,
        patch: PriceRecordPatch,
    ) -> RepositoryResult<PriceRecord> {
        let conn = self.get_conn()?;
        let existing = Self::find_price_with(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "PriceRecord".to_string(),
            id: id.to_string(),
        })?;
        let updated = patch.apply_to(&existing);

        conn.execute(
            r#"
            UPDATE material_price
            SET price = ?1,
                price_min = ?2,
                price_max = ?3,
                currency = ?4,
                valid_from = ?5,
                valid_to = ?6,
                comment = ?7
            WHERE id = ?8
            "#,
            params![
                updated.price,
                updated.price_min,
                updated.price_max,
                updated.currency,
                updated.valid_from.format(DATE_FORMAT).to_string(),
                updated.valid_to.map(|d| d.format(DATE_FORMAT).to_string()),
                updated.comment,
                id,
            ],
        )?;

        Ok(updated)
    }

    async fn delete_price(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM material_price WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PriceRecord".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for SqlitePriceStore {
    async fn list_materials(&self) -> RepositoryResult<Vec<Material>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, abbreviation, description, unit FROM material ORDER BY rowid",
        )?;
        let materials = stmt
            .query_map([], |row| {
                Ok(Material {
                    id: row.get(0)?,
                    abbreviation: row.get(1)?,
                    description: row.get(2)?,
                    unit: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(materials)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn map_price_row(row: &Row) -> SqliteResult<PriceRecord> {
    let valid_from_str: String = row.get(7)?;
    let valid_to_str: Option<String> = row.get(8)?;
    let created_at_str: String = row.get(12)?;

    let valid_from = NaiveDate::parse_from_str(&valid_from_str, DATE_FORMAT)
        .map_err(|e| conversion_error(7, e))?;
    let valid_to = valid_to_str
        .map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT))
        .transpose()
        .map_err(|e| conversion_error(8, e))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(12, e))?;

    Ok(PriceRecord {
        id: row.get(0)?,
        material_id: row.get(1)?,
        price_source_id: row.get(2)?,
        price: row.get(3)?,
        price_min: row.get(4)?,
        price_max: row.get(5)?,
        currency: row.get(6)?,
        valid_from,
        valid_to,
        comment: row.get(9)?,
        origin_file: row.get(10)?,
        created_by: row.get(11)?,
        created_at,
    })
}
