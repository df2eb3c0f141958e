// 日志系统
// 开发心理：所有模块通过log门面记录，二进制入口用env_logger输出
// RUST_LOG存在时优先使用，否则使用配置中的级别；重复初始化不报错

use log::LevelFilter;
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// 解析日志级别字符串，无法识别时回退到Info
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// 初始化env_logger，只生效一次
pub fn init_logging(level: &str) {
    let filter = parse_level(level);

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_module("alphi_hunt", filter);

        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }

        // 测试或嵌入方已安装logger时忽略
        if builder.try_init().is_ok() {
            log::debug!("日志系统初始化完成, 级别: {}", filter);
        }
    });
}
