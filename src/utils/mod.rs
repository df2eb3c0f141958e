// 工具模块 - 通用工具和辅助函数
// 开发心理：随机数与日志与具体玩法无关，集中放在这里

pub mod logger;
pub mod random;

pub use logger::{init_logging, parse_level};
pub use random::{hash_seed, random_seed, SeededRandom};
