// 核心模块 - 寻宝基础系统
// 开发心理：错误处理、配置管理、地理数学是上层生成与进度系统的共同依赖

pub mod config;
pub mod error;
pub mod math;

// 重新导出核心类型
pub use config::{ConfigManager, GameplayConfig, GenerationConfig, HuntConfig, LoggingConfig, StorageConfig};
pub use error::{ErrorSeverity, HuntError, HuntResult, Result};
pub use math::{haversine_distance, offset_by_polar, GeoPoint, EARTH_RADIUS_M, METERS_PER_DEGREE_LAT};
