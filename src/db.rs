// ==========================================
// GoatOS 牧场记录系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为 (外键、busy_timeout)
// - init_schema 幂等建表，并记录 schema_version
// 存储约定: 日期统一存 YYYY-MM-DD 文本，列表查询按 rowid 保持存储顺序
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：foreign_keys 与 busy_timeout 都需要"每个连接"单独配置
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

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS goat (
    goat_id           TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    breed             TEXT NOT NULL DEFAULT '',
    gender            TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'HEALTHY',
    birthdate         TEXT,
    approx_age_years  INTEGER NOT NULL DEFAULT 0,
    is_fainting       INTEGER NOT NULL DEFAULT 0,
    dam_id            TEXT REFERENCES goat(goat_id) ON DELETE SET NULL,
    sire_id           TEXT REFERENCES goat(goat_id) ON DELETE SET NULL,
    bio               TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS meat_harvest (
    goat_id         TEXT PRIMARY KEY REFERENCES goat(goat_id) ON DELETE CASCADE,
    live_weight     REAL NOT NULL,
    hanging_weight  REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS breeding_event (
    breeding_id    TEXT PRIMARY KEY,
    goat_id        TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    mate_name      TEXT NOT NULL DEFAULT '',
    breeding_date  TEXT NOT NULL,
    due_date       TEXT NOT NULL,
    notes          TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS kidding_record (
    kidding_id     TEXT PRIMARY KEY,
    breeding_id    TEXT REFERENCES breeding_event(breeding_id) ON DELETE SET NULL,
    dam_id         TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    kidding_date   TEXT NOT NULL,
    num_kids_born  INTEGER NOT NULL DEFAULT 0,
    num_alive      INTEGER NOT NULL DEFAULT 0,
    num_stillborn  INTEGER NOT NULL DEFAULT 0,
    birth_type     TEXT NOT NULL,
    presentation   TEXT NOT NULL,
    assisted       INTEGER NOT NULL DEFAULT 0,
    complications  TEXT NOT NULL DEFAULT '',
    notes          TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS medical_record (
    record_id       TEXT PRIMARY KEY,
    goat_id         TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    performed_date  TEXT NOT NULL,
    kind            TEXT NOT NULL,
    notes           TEXT NOT NULL DEFAULT '',
    next_due_date   TEXT
);

CREATE TABLE IF NOT EXISTS medical_schedule (
    schedule_id     TEXT PRIMARY KEY,
    goat_id         TEXT REFERENCES goat(goat_id) ON DELETE CASCADE,
    kind            TEXT NOT NULL,
    interval_days   INTEGER NOT NULL,
    last_performed  TEXT NOT NULL,
    notes           TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS heat_observation (
    observation_id  TEXT PRIMARY KEY,
    goat_id         TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    observed_date   TEXT NOT NULL,
    signs           TEXT NOT NULL DEFAULT '',
    notes           TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS feed_item (
    item_id              TEXT PRIMARY KEY,
    name                 TEXT NOT NULL,
    quantity             REAL NOT NULL DEFAULT 0,
    unit                 TEXT NOT NULL DEFAULT '',
    low_stock_threshold  REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS medicine (
    medicine_id             TEXT PRIMARY KEY,
    name                    TEXT NOT NULL,
    batch                   TEXT NOT NULL DEFAULT '',
    expiration_date         TEXT,
    quantity                REAL NOT NULL DEFAULT 0,
    unit                    TEXT NOT NULL DEFAULT '',
    dosage_amount           REAL NOT NULL DEFAULT 1,
    dosage_weight_interval  REAL NOT NULL DEFAULT 0,
    notes                   TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS pen (
    pen_id    TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    pen_type  TEXT NOT NULL,
    capacity  INTEGER NOT NULL DEFAULT 0,
    notes     TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS pen_assignment (
    assignment_id  TEXT PRIMARY KEY,
    pen_id         TEXT NOT NULL REFERENCES pen(pen_id) ON DELETE CASCADE,
    goat_id        TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    date_in        TEXT NOT NULL,
    date_out       TEXT,
    notes          TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_pen_assignment_active ON pen_assignment(pen_id, date_out);

CREATE TABLE IF NOT EXISTS grazing_area (
    area_id      TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    color        TEXT NOT NULL DEFAULT '#FF0000',
    coordinates  TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS pasture_assignment (
    assignment_id  TEXT PRIMARY KEY,
    area_id        TEXT NOT NULL REFERENCES grazing_area(area_id) ON DELETE CASCADE,
    start_date     TEXT NOT NULL,
    end_date       TEXT,
    notes          TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS pasture_assignment_goat (
    assignment_id  TEXT NOT NULL REFERENCES pasture_assignment(assignment_id) ON DELETE CASCADE,
    goat_id        TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    PRIMARY KEY (assignment_id, goat_id)
);

CREATE TABLE IF NOT EXISTS health_score (
    score_id              TEXT PRIMARY KEY,
    goat_id               TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    date                  TEXT NOT NULL,
    famacha_score         INTEGER,
    body_condition_score  REAL,
    notes                 TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS feeding_log (
    log_id     TEXT PRIMARY KEY,
    goat_id    TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    date       TEXT NOT NULL,
    feed_type  TEXT NOT NULL,
    amount     TEXT NOT NULL DEFAULT '',
    notes      TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS milk_log (
    log_id      TEXT PRIMARY KEY,
    goat_id     TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    date        TEXT NOT NULL,
    time        TEXT NOT NULL DEFAULT 'AM',
    amount_lbs  REAL NOT NULL,
    notes       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS weight_log (
    log_id      TEXT PRIMARY KEY,
    goat_id     TEXT NOT NULL REFERENCES goat(goat_id) ON DELETE CASCADE,
    date        TEXT NOT NULL,
    weight_lbs  REAL NOT NULL,
    notes       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS finance_transaction (
    transaction_id  TEXT PRIMARY KEY,
    date            TEXT NOT NULL,
    kind            TEXT NOT NULL,
    category        TEXT NOT NULL DEFAULT 'OTHER',
    amount_cents    INTEGER NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    goat_id         TEXT REFERENCES goat(goat_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS farm_event (
    event_id     TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    date         TEXT NOT NULL,
    end_date     TEXT,
    category     TEXT NOT NULL DEFAULT '',
    description  TEXT NOT NULL DEFAULT ''
);
"#;

/// 幂等建表，并写入当前 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    if let Some(v) = read_schema_version(conn)? {
        if v != CURRENT_SCHEMA_VERSION {
            tracing::warn!(
                found = v,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema_version 与当前代码不一致"
            );
        }
    }
    Ok(())
}
