// ==========================================
// 客户需求表同步服务 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等的 schema 引导（customer + 四级层级表 + config_kv）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启（层级表依赖级联删除）
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

/// 初始化数据库 schema（幂等，可重复执行）
///
/// 表结构：
/// - customer: 客户主档（外部标识 did_number 为主键）
/// - demand_title / demand / patient_type / action: 严格四级层级，
///   position 保存各级“首次出现”的插入顺序
/// - config_kv: 全局配置键值表
///
/// 层级三级标签带 CHECK 非空约束：分类器保证接受行的前三级非空，
/// 存储层同样拒绝空标签。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS customer (
            did_number     TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            address        TEXT,
            note1          TEXT,
            note2          TEXT,
            note3          TEXT,
            sheet_url      TEXT,
            worksheet_name TEXT,
            filetitle      TEXT,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS demand_title (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id TEXT NOT NULL REFERENCES customer(did_number) ON DELETE CASCADE,
            title       TEXT NOT NULL CHECK (title <> ''),
            position    INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS demand (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            demand_title_id INTEGER NOT NULL REFERENCES demand_title(id) ON DELETE CASCADE,
            name            TEXT NOT NULL CHECK (name <> ''),
            position        INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS patient_type (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            demand_id INTEGER NOT NULL REFERENCES demand(id) ON DELETE CASCADE,
            name      TEXT NOT NULL CHECK (name <> ''),
            position  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS action (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_type_id INTEGER NOT NULL REFERENCES patient_type(id) ON DELETE CASCADE,
            description     TEXT NOT NULL DEFAULT '',
            dire_text       TEXT NOT NULL DEFAULT '',
            position        INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_demand_title_customer
            ON demand_title(customer_id, position);
        CREATE INDEX IF NOT EXISTS idx_demand_parent
            ON demand(demand_title_id, position);
        CREATE INDEX IF NOT EXISTS idx_patient_type_parent
            ON patient_type(demand_id, position);
        CREATE INDEX IF NOT EXISTS idx_action_parent
            ON action(patient_type_id, position);
        "#,
    )?;
    Ok(())
}
