// 存档系统 - 寻宝进度保存和加载
// 开发心理：进度按设备保存为独立JSON文件，带版本号；打卡点从不写入存档
// 内存实现用于测试和嵌入场景

use crate::core::{HuntError, Result};
use crate::player::UserProgress;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

// 存档版本
pub const SAVE_VERSION: u32 = 1;

/// 进度存储接口
pub trait ProgressStore {
    fn load(&self, device_id: &str) -> Result<Option<UserProgress>>;
    fn save(&self, progress: &UserProgress) -> Result<()>;
    /// 删除存档，返回是否存在过
    fn delete(&self, device_id: &str) -> Result<bool>;
}

// 存档文件格式
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    saved_at: DateTime<Utc>,
    progress: UserProgress,
}

/// 文件存档：每个设备一个JSON文件
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    save_directory: PathBuf,
}

impl FileProgressStore {
    pub fn new(save_directory: impl Into<PathBuf>) -> Result<Self> {
        let save_directory = save_directory.into();
        fs::create_dir_all(&save_directory)?;
        debug!("存档目录: {:?}", save_directory);
        Ok(Self { save_directory })
    }

    pub fn save_directory(&self) -> &Path {
        &self.save_directory
    }

    /// 设备id中 [A-Za-z0-9_-] 原样保留，其余UTF-8字节编码为 %XX
    ///
    /// 编码可逆，不同设备id不会落到同一个文件。
    pub fn save_path(&self, device_id: &str) -> Result<PathBuf> {
        if device_id.trim().is_empty() {
            return Err(HuntError::InvalidInput("设备id不能为空".to_string()));
        }

        Ok(self.save_directory.join(format!("{}.json", encode_file_stem(device_id))))
    }
}

fn encode_file_stem(device_id: &str) -> String {
    let mut stem = String::with_capacity(device_id.len());
    for byte in device_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

impl ProgressStore for FileProgressStore {
    fn load(&self, device_id: &str) -> Result<Option<UserProgress>> {
        let path = self.save_path(device_id)?;
        if !path.exists() {
            debug!("设备 {} 没有存档", device_id);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let save: SaveFile = serde_json::from_str(&content)
            .map_err(|e| HuntError::Storage(format!("存档损坏 {:?}: {}", path, e)))?;

        if save.version > SAVE_VERSION {
            return Err(HuntError::Storage(format!(
                "存档版本 {} 高于当前支持的版本 {}",
                save.version, SAVE_VERSION
            )));
        }

        if save.progress.device_id != device_id {
            return Err(HuntError::Storage(format!(
                "存档 {:?} 属于设备 {}, 请求的是 {}",
                path, save.progress.device_id, device_id
            )));
        }

        debug!("加载存档: {:?}", path);
        Ok(Some(save.progress))
    }

    fn save(&self, progress: &UserProgress) -> Result<()> {
        let path = self.save_path(&progress.device_id)?;
        let save = SaveFile {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            progress: progress.clone(),
        };

        // 先写临时文件再重命名，避免写到一半的存档
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(&save)?)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!("存档已保存: {:?}", path);
        Ok(())
    }

    fn delete(&self, device_id: &str) -> Result<bool> {
        let path = self.save_path(device_id)?;
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        info!("删除存档: {:?}", path);
        Ok(true)
    }
}

/// 内存存档
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    saves: RwLock<HashMap<String, UserProgress>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.saves.read().map(|saves| saves.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, device_id: &str) -> Result<Option<UserProgress>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| HuntError::Storage("存档锁已损坏".to_string()))?;
        Ok(saves.get(device_id).cloned())
    }

    fn save(&self, progress: &UserProgress) -> Result<()> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| HuntError::Storage("存档锁已损坏".to_string()))?;
        saves.insert(progress.device_id.clone(), progress.clone());
        Ok(())
    }

    fn delete(&self, device_id: &str) -> Result<bool> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| HuntError::Storage("存档锁已损坏".to_string()))?;
        Ok(saves.remove(device_id).is_some())
    }
}
