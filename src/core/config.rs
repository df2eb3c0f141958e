/*
* 开发心理过程：
* 1. 配置分为生成参数、玩法参数、存储路径、日志四部分
* 2. 以TOML文件持久化，缺失时写出默认配置
* 3. 加载后统一校验，非法值在启动阶段直接报错
*/

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::error::{HuntError, HuntResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    pub generation: GenerationConfig,
    pub gameplay: GameplayConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// 每次生成的打卡点数量
    pub spot_count: usize,
    /// 打卡点之间的最小间距（米）
    pub min_spacing_m: f64,
    /// 带间距检查的最大采样次数
    pub max_attempts: usize,
    /// 抽取第二个不同反思题目的最大重试次数
    pub prompt_retry_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// 打卡时允许距离打卡点的最大距离（米）
    pub check_in_radius_m: f64,
    /// 报名活动前是否要求每个打卡点都提交反思
    pub require_reflection: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub regions_file: Option<PathBuf>,
    pub content_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            gameplay: GameplayConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            spot_count: crate::constants::SPOT_COUNT,
            min_spacing_m: crate::constants::MIN_SPOT_SPACING_M,
            max_attempts: crate::constants::MAX_PLACEMENT_ATTEMPTS,
            prompt_retry_limit: 16,
        }
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            check_in_radius_m: crate::constants::CHECK_IN_RADIUS_M,
            require_reflection: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|dir| dir.join("alphi-hunt"))
            .unwrap_or_else(|| PathBuf::from("data"));

        Self {
            data_dir,
            regions_file: None,
            content_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: if cfg!(debug_assertions) { "debug".to_string() } else { "info".to_string() },
        }
    }
}

pub struct ConfigManager;

impl ConfigManager {
    /// 从文件加载配置，文件不存在时写出默认配置
    pub fn load_from_file(path: &Path) -> HuntResult<HuntConfig> {
        if !path.exists() {
            info!("配置文件不存在，创建默认配置: {:?}", path);
            let default_config = HuntConfig::default();
            Self::save_config_to_file(&default_config, path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)?;
        let config: HuntConfig = toml::from_str(&content)
            .map_err(|e| HuntError::Config(format!("解析配置文件失败: {}", e)))?;

        Self::validate_config(&config)?;
        info!("成功加载配置文件: {:?}", path);
        Ok(config)
    }

    pub fn save_config_to_file(config: &HuntConfig, path: &Path) -> HuntResult<()> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| HuntError::Config(format!("序列化配置失败: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, content)?;
        debug!("配置已保存到: {:?}", path);
        Ok(())
    }

    pub fn validate_config(config: &HuntConfig) -> HuntResult<()> {
        Self::validate_generation(&config.generation)?;

        let radius = config.gameplay.check_in_radius_m;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(HuntError::Config("打卡半径必须为正数".to_string()));
        }

        Ok(())
    }

    /// 生成参数校验，配置加载和生成器构造共用
    pub fn validate_generation(generation: &GenerationConfig) -> HuntResult<()> {
        if generation.spot_count == 0 {
            return Err(HuntError::Config("打卡点数量必须大于0".to_string()));
        }

        if !generation.min_spacing_m.is_finite() || generation.min_spacing_m <= 0.0 {
            return Err(HuntError::Config("最小间距必须为正数".to_string()));
        }

        if generation.max_attempts == 0 {
            return Err(HuntError::Config("最大采样次数必须大于0".to_string()));
        }

        if generation.prompt_retry_limit == 0 {
            return Err(HuntError::Config("题目重试次数必须大于0".to_string()));
        }

        Ok(())
    }
}
