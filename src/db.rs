// ==========================================
// 材料价格台账 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 统一建表（材料目录 / 价格来源 / 价格记录 / 配置）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并写入 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS material (
            id TEXT PRIMARY KEY,
            abbreviation TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            unit TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS price_source (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            source_type TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS material_price (
            id TEXT PRIMARY KEY,
            material_id TEXT NOT NULL REFERENCES material(id),
            price_source_id TEXT NOT NULL REFERENCES price_source(id),
            price REAL NOT NULL CHECK (price >= 0),
            price_min REAL,
            price_max REAL,
            currency TEXT NOT NULL,
            valid_from TEXT NOT NULL,
            valid_to TEXT,
            comment TEXT,
            origin_file TEXT,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            CHECK (valid_to IS NULL OR valid_from <= valid_to)
        );

        CREATE INDEX IF NOT EXISTS idx_material_price_material
            ON material_price(material_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_material_price_source
            ON material_price(price_source_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_price_check_constraints() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO material (id, abbreviation) VALUES ('M1', 'PET');
             INSERT INTO price_source (id, name) VALUES ('S1', 'Indice');",
        )
        .unwrap();

        let inverted = conn.execute(
            "INSERT INTO material_price (id, material_id, price_source_id, price, currency,
                valid_from, valid_to, created_by, created_at)
             VALUES ('P1', 'M1', 'S1', 10.0, 'EUR', '2024-06-30', '2024-01-01', 't', '2024')",
            [],
        );
        assert!(inverted.is_err());

        let unknown_material = conn.execute(
            "INSERT INTO material_price (id, material_id, price_source_id, price, currency,
                valid_from, created_by, created_at)
             VALUES ('P2', 'M9', 'S1', 10.0, 'EUR', '2024-01-01', 't', '2024')",
            [],
        );
        assert!(unknown_material.is_err());
    }
}
