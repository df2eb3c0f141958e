/*
* 开发心理过程：
* 1. 区域是静态目录：中心点 + 半径，运行期间不会修改
* 2. 目录作为显式参数传入生成器，测试可以换成自定义目录
* 3. 支持从JSON文件加载，加载后统一校验
*/

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::{
    error::{HuntError, HuntResult},
    math::{GeoPoint, METERS_PER_DEGREE_LAT},
};

/// 区域目录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub key: String,
    pub name: String,
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl Region {
    pub fn new(key: &str, name: &str, center: GeoPoint, radius_m: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            center,
            radius_m,
        }
    }

    /// 点是否落在区域圆盘内
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_to(point) <= self.radius_m
    }
}

/// 不可变的区域目录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<Region>) -> HuntResult<Self> {
        let catalog = Self { regions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// 内置的悉尼区域目录
    pub fn builtin() -> Self {
        Self {
            regions: vec![
                Region::new("cbd", "Sydney CBD", GeoPoint::new(-33.8688, 151.2093), 2000.0),
                Region::new("parramatta", "Parramatta", GeoPoint::new(-33.8150, 151.0011), 2500.0),
                Region::new("bondi", "Bondi", GeoPoint::new(-33.8915, 151.2767), 2000.0),
                Region::new("newtown", "Newtown", GeoPoint::new(-33.8981, 151.1749), 2000.0),
                Region::new("chatswood", "Chatswood", GeoPoint::new(-33.7969, 151.1803), 3000.0),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> HuntResult<Self> {
        let regions: Vec<Region> = serde_json::from_str(json)?;
        Self::new(regions)
    }

    pub fn load_from_file(path: &Path) -> HuntResult<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        info!("加载区域目录 {:?}: {} 个区域", path, catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> HuntResult<&Region> {
        self.regions
            .iter()
            .find(|region| region.key == key)
            .ok_or_else(|| HuntError::RegionNotFound(key.to_string()))
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn validate(&self) -> HuntResult<()> {
        if self.regions.is_empty() {
            return Err(HuntError::Config("区域目录为空".to_string()));
        }

        let mut keys = HashSet::new();
        for region in &self.regions {
            if region.key.trim().is_empty() {
                return Err(HuntError::Config(format!("区域 {:?} 缺少key", region.name)));
            }
            if !keys.insert(region.key.as_str()) {
                return Err(HuntError::Config(format!("重复的区域key: {}", region.key)));
            }
            if !region.radius_m.is_finite() || region.radius_m <= 0.0 {
                return Err(HuntError::Config(format!("区域 {} 半径无效", region.key)));
            }
            if !region.center.is_valid() {
                return Err(HuntError::Config(format!("区域 {} 中心坐标无效", region.key)));
            }
            // 经度偏移按cos(纬度)缩放，圆盘不能碰到极点
            if region.center.lat.abs() + region.radius_m / METERS_PER_DEGREE_LAT >= 90.0 {
                return Err(HuntError::Config(format!("区域 {} 覆盖极点", region.key)));
            }
        }

        Ok(())
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
