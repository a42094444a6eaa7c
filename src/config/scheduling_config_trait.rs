// ==========================================
// 校务排课系统 - 排课配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;

// ==========================================
// SchedulingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait SchedulingConfigReader: Send + Sync {
    /// 班级编号前缀
    ///
    /// # 默认值
    /// - "C"
    fn get_class_number_prefix(&self) -> RepositoryResult<String>;

    /// 单个班级最长时长（分钟）
    ///
    /// # 返回
    /// - Some(n): 已配置上限
    /// - None: 未配置，不限制（时段仍不得跨越午夜）
    fn get_max_class_duration_minutes(&self) -> RepositoryResult<Option<i64>>;

    /// 单张请假单最长天数（含首尾）
    ///
    /// # 返回
    /// - Some(n): 已配置上限
    /// - None: 未配置，不限制
    fn get_max_time_off_days(&self) -> RepositoryResult<Option<i64>>;
}
