// ==========================================
// 校务排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value)
// 非法值回退默认值（上限类配置回退为不限制）并记录告警
// ==========================================

use crate::config::scheduling_config_trait::SchedulingConfigReader;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const CLASS_NUMBER_PREFIX: &str = "class_number_prefix";
    pub const MAX_CLASS_DURATION_MINUTES: &str = "max_class_duration_minutes";
    pub const MAX_TIME_OFF_DAYS: &str = "max_time_off_days";
}

/// 默认值（上限类配置无默认值，缺失即不限制）
pub mod config_defaults {
    pub const CLASS_NUMBER_PREFIX: &str = "C";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 全部配置快照（按键排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let snapshot = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(snapshot)
    }

    /// 读取可选上限配置
    ///
    /// # 返回
    /// - Some(v): 已配置且合法
    /// - None: 未配置，或配置不合法（记录告警后视为不限制）
    fn get_optional_limit<T>(&self, key: &str, valid: impl Fn(&T) -> bool) -> RepositoryResult<Option<T>>
    where
        T: FromStr,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) if !v.trim().is_empty() => v,
            _ => return Ok(None),
        };

        match raw.trim().parse::<T>() {
            Ok(v) if valid(&v) => Ok(Some(v)),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "上限配置不合法，按不限制处理");
                Ok(None)
            }
        }
    }
}

// ==========================================
// SchedulingConfigReader Trait 实现
// ==========================================
impl SchedulingConfigReader for ConfigManager {
    fn get_class_number_prefix(&self) -> RepositoryResult<String> {
        let value = self.get_config_value(config_keys::CLASS_NUMBER_PREFIX)?;
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            Some(v) => {
                tracing::warn!(
                    config_key = config_keys::CLASS_NUMBER_PREFIX,
                    raw_value = %v,
                    "班级编号前缀为空，使用默认值"
                );
                Ok(config_defaults::CLASS_NUMBER_PREFIX.to_string())
            }
            None => Ok(config_defaults::CLASS_NUMBER_PREFIX.to_string()),
        }
    }

    fn get_max_class_duration_minutes(&self) -> RepositoryResult<Option<i64>> {
        self.get_optional_limit(config_keys::MAX_CLASS_DURATION_MINUTES, |v: &i64| *v > 0)
    }

    fn get_max_time_off_days(&self) -> RepositoryResult<Option<i64>> {
        self.get_optional_limit(config_keys::MAX_TIME_OFF_DAYS, |v: &i64| *v > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::setup_test_conn;

    #[test]
    fn test_defaults_when_missing() {
        let config = ConfigManager::from_connection(setup_test_conn()).unwrap();
        assert_eq!(config.get_class_number_prefix().unwrap(), "C");
        assert_eq!(config.get_max_class_duration_minutes().unwrap(), None);
        assert_eq!(config.get_max_time_off_days().unwrap(), None);
    }

    #[test]
    fn test_override_and_invalid_fallback() {
        let config = ConfigManager::from_connection(setup_test_conn()).unwrap();
        config.set_config_value(config_keys::CLASS_NUMBER_PREFIX, "K").unwrap();
        config.set_config_value(config_keys::MAX_CLASS_DURATION_MINUTES, "90").unwrap();
        config.set_config_value(config_keys::MAX_TIME_OFF_DAYS, "abc").unwrap();

        assert_eq!(config.get_class_number_prefix().unwrap(), "K");
        assert_eq!(config.get_max_class_duration_minutes().unwrap(), Some(90));
        assert_eq!(config.get_max_time_off_days().unwrap(), None);

        config.set_config_value(config_keys::MAX_CLASS_DURATION_MINUTES, "-5").unwrap();
        assert_eq!(config.get_max_class_duration_minutes().unwrap(), None);

        let snapshot = config.get_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 3);
    }
}
