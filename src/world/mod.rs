// 世界系统
// 开发心理：区域目录、内容表、打卡点生成三部分，生成结果只依赖 (种子, 区域)

pub mod content;
pub mod region;
pub mod spawn;

pub use content::{ContentTables, HistoryNote, Verse};
pub use region::{Region, RegionCatalog};
pub use spawn::{
    generate_random_point_in_circle, generate_spots, validate_spot_spacing, Generation, Spot,
    SpotGenerator,
};
