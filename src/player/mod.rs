// 玩家系统
// 开发心理：玩家数据只有寻宝进度，按设备保存

pub mod progress;

pub use progress::{CheckInOutcome, Collectible, EventSignup, Reflection, UserProgress, Visit};
