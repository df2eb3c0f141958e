// Alphi寻宝库入口
// 开发心理：核心是 (种子, 区域) 到8个打卡点的纯函数，其余模块围绕它做配置、进度与存档
// 架构：core 基础设施 / utils 随机数与日志 / world 区域、内容与生成 / player 进度 / save 存档

pub mod core;
pub mod player;
pub mod save;
pub mod session;
pub mod utils;
pub mod world;

// 重新导出核心类型
pub use crate::core::{ConfigManager, GeoPoint, HuntConfig, HuntError, HuntResult, Result};
pub use player::{CheckInOutcome, UserProgress};
pub use save::{FileProgressStore, MemoryProgressStore, ProgressStore};
pub use session::HuntSession;
pub use utils::SeededRandom;
pub use world::{
    generate_random_point_in_circle, generate_spots, validate_spot_spacing, ContentTables,
    Generation, Region, RegionCatalog, Spot, SpotGenerator,
};

// 版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "alphi-hunt";

// 寻宝常量
pub mod constants {
    /// 每次生成的打卡点数量
    pub const SPOT_COUNT: usize = 8;
    /// 打卡点之间的最小间距（米）
    pub const MIN_SPOT_SPACING_M: f64 = 250.0;
    /// 带间距检查的最大采样次数
    pub const MAX_PLACEMENT_ATTEMPTS: usize = 1000;
    /// 默认打卡半径（米）
    pub const CHECK_IN_RADIUS_M: f64 = 50.0;
}

/// 按配置初始化日志
pub fn init(config: &HuntConfig) -> Result<()> {
    ConfigManager::validate_config(config)?;
    utils::init_logging(&config.logging.level);
    log::info!("Alphi寻宝初始化完成 v{}", VERSION);
    Ok(())
}
