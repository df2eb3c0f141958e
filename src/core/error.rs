// 错误处理系统
// 开发心理：统一的错误类型，生成器本身不会失败，只有配置、内容、存档、进度操作会返回错误
// 严重程度区分配置类致命错误与玩家操作类可恢复错误

use std::io;
use thiserror::Error;

// 寻宝主要错误类型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HuntError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("内容表错误: {0}")]
    Content(String),

    #[error("区域未找到: {0}")]
    RegionNotFound(String),

    #[error("打卡点未找到: {0}")]
    SpotNotFound(String),

    #[error("距离打卡点 {spot_id} 太远: {distance_m:.1}m (允许 {allowed_m:.1}m)")]
    TooFarFromSpot {
        spot_id: String,
        distance_m: f64,
        allowed_m: f64,
    },

    #[error("尚未打卡: {0}")]
    NotVisited(String),

    #[error("输入无效: {0}")]
    InvalidInput(String),

    #[error("存档错误: {0}")]
    Storage(String),

    #[error("解析错误: {0}")]
    Parse(String),

    #[error("文件错误: {0}")]
    Io(String),
}

// Result类型别名
pub type Result<T> = std::result::Result<T, HuntError>;
pub type HuntResult<T> = std::result::Result<T, HuntError>;

// 错误转换实现
impl From<io::Error> for HuntError {
    fn from(error: io::Error) -> Self {
        HuntError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for HuntError {
    fn from(error: serde_json::Error) -> Self {
        HuntError::Parse(error.to_string())
    }
}

impl From<toml::de::Error> for HuntError {
    fn from(error: toml::de::Error) -> Self {
        HuntError::Config(error.to_string())
    }
}

impl From<toml::ser::Error> for HuntError {
    fn from(error: toml::ser::Error) -> Self {
        HuntError::Config(error.to_string())
    }
}

// 错误创建辅助宏
#[macro_export]
macro_rules! hunt_error {
    ($variant:ident, $msg:expr) => {
        $crate::HuntError::$variant($msg.to_string())
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        $crate::HuntError::$variant(format!($fmt, $($arg)*))
    };
}

// 提前返回错误
#[macro_export]
macro_rules! hunt_bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::hunt_error!($variant, $msg))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::hunt_error!($variant, $fmt, $($arg)*))
    };
}

impl HuntError {
    // 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HuntError::Config(_) | HuntError::Content(_) => ErrorSeverity::Critical,
            HuntError::Storage(_) | HuntError::Io(_) | HuntError::Parse(_) => ErrorSeverity::High,
            HuntError::RegionNotFound(_) | HuntError::SpotNotFound(_) => ErrorSeverity::Medium,
            HuntError::TooFarFromSpot { .. }
            | HuntError::NotVisited(_)
            | HuntError::InvalidInput(_) => ErrorSeverity::Low,
        }
    }

    // 配置类错误在启动时出现，无法在运行中恢复
    pub fn is_recoverable(&self) -> bool {
        self.severity() != ErrorSeverity::Critical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}
