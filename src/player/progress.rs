// 寻宝进度系统
// 开发心理：进度只记录种子和区域key，打卡点本身每次重新生成
// 打卡要求玩家在打卡点附近，首次打卡获得收藏品；全部完成后才能报名线下活动

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::{
    error::{HuntError, HuntResult},
    math::{haversine_distance, GeoPoint},
};
use crate::utils::random::random_seed;
use crate::world::spawn::Spot;

// 玩家进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub device_id: String,
    pub seed: String,
    pub region_key: String,
    pub started_at: DateTime<Utc>,

    // 打卡记录，按打卡点id索引
    #[serde(default)]
    pub visits: BTreeMap<String, Visit>,

    // 收藏品，按获得顺序
    #[serde(default)]
    pub collectibles: Vec<Collectible>,

    #[serde(default)]
    pub event_signup: Option<EventSignup>,
}

// 打卡记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub spot_id: String,
    pub visited_at: DateTime<Utc>,
    pub distance_m: f64,
    pub reflection: Option<Reflection>,
}

// 反思
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

// 收藏品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: String,
    pub spot_id: String,
    pub name: String,
    pub earned_at: DateTime<Utc>,
}

// 线下活动报名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSignup {
    pub name: String,
    pub email: String,
    pub signed_up_at: DateTime<Utc>,
}

// 打卡结果
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    FirstVisit(Collectible),
    AlreadyVisited,
}

impl UserProgress {
    /// 开始新的寻宝，未提供种子时随机生成
    pub fn start(device_id: &str, region_key: &str, seed: Option<String>) -> HuntResult<Self> {
        if device_id.trim().is_empty() {
            return Err(HuntError::InvalidInput("设备id不能为空".to_string()));
        }

        let seed = match seed {
            Some(seed) if seed.is_empty() => {
                return Err(HuntError::InvalidInput("种子不能为空".to_string()))
            }
            Some(seed) => seed,
            None => random_seed(),
        };

        info!("设备 {} 开始寻宝: region={} seed={}", device_id, region_key, seed);

        Ok(Self {
            device_id: device_id.to_string(),
            seed,
            region_key: region_key.to_string(),
            started_at: Utc::now(),
            visits: BTreeMap::new(),
            collectibles: Vec::new(),
            event_signup: None,
        })
    }

    /// 在打卡点附近打卡
    pub fn check_in(&mut self, spot: &Spot, position: &GeoPoint, radius_m: f64) -> HuntResult<CheckInOutcome> {
        if !position.is_valid() {
            return Err(HuntError::InvalidInput(format!(
                "无效坐标: {}, {}",
                position.lat, position.lon
            )));
        }

        let distance_m = haversine_distance(&spot.position(), position);
        if distance_m > radius_m {
            return Err(HuntError::TooFarFromSpot {
                spot_id: spot.id.clone(),
                distance_m,
                allowed_m: radius_m,
            });
        }

        if self.visits.contains_key(&spot.id) {
            debug!("打卡点 {} 已打卡过", spot.id);
            return Ok(CheckInOutcome::AlreadyVisited);
        }

        let now = Utc::now();
        self.visits.insert(
            spot.id.clone(),
            Visit {
                spot_id: spot.id.clone(),
                visited_at: now,
                distance_m,
                reflection: None,
            },
        );

        let collectible = Collectible {
            id: format!("alphi-{}", spot.id),
            spot_id: spot.id.clone(),
            name: spot.title.clone(),
            earned_at: now,
        };
        self.collectibles.push(collectible.clone());

        info!("打卡成功: {} ({:.1}m), 获得收藏品 {}", spot.id, distance_m, collectible.id);
        Ok(CheckInOutcome::FirstVisit(collectible))
    }

    /// 为已打卡的打卡点提交反思，重复提交覆盖旧内容
    pub fn submit_reflection(&mut self, spot_id: &str, text: &str) -> HuntResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HuntError::InvalidInput("反思内容不能为空".to_string()));
        }

        let visit = self
            .visits
            .get_mut(spot_id)
            .ok_or_else(|| HuntError::NotVisited(spot_id.to_string()))?;

        visit.reflection = Some(Reflection {
            text: text.to_string(),
            submitted_at: Utc::now(),
        });
        debug!("打卡点 {} 提交反思", spot_id);
        Ok(())
    }

    pub fn completed_count(&self) -> usize {
        self.visits.len()
    }

    pub fn reflection_count(&self) -> usize {
        self.visits.values().filter(|v| v.reflection.is_some()).count()
    }

    pub fn has_visited(&self, spot_id: &str) -> bool {
        self.visits.contains_key(spot_id)
    }

    pub fn is_complete(&self, total_spots: usize) -> bool {
        self.completed_count() >= total_spots
    }

    pub fn can_sign_up(&self, total_spots: usize, require_reflection: bool) -> bool {
        self.is_complete(total_spots) && (!require_reflection || self.reflection_count() >= total_spots)
    }

    /// 完成寻宝后报名线下活动
    pub fn sign_up_for_event(
        &mut self,
        total_spots: usize,
        require_reflection: bool,
        name: &str,
        email: &str,
    ) -> HuntResult<&EventSignup> {
        if !self.can_sign_up(total_spots, require_reflection) {
            return Err(HuntError::InvalidInput(format!(
                "寻宝尚未完成: {}/{} 个打卡点, {} 条反思",
                self.completed_count(),
                total_spots,
                self.reflection_count()
            )));
        }

        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(HuntError::InvalidInput("姓名不能为空".to_string()));
        }
        if !is_plausible_email(email) {
            return Err(HuntError::InvalidInput(format!("邮箱格式无效: {}", email)));
        }

        info!("设备 {} 报名线下活动", self.device_id);
        let signup = self.event_signup.insert(EventSignup {
            name: name.to_string(),
            email: email.to_string(),
            signed_up_at: Utc::now(),
        });
        Ok(&*signup)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
