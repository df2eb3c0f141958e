// 寻宝会话
// 开发心理：每次加载从存档取回种子和区域，重新生成打卡点；每次操作后立即保存

use log::info;

use crate::core::{
    config::GameplayConfig,
    error::{HuntError, HuntResult},
    math::GeoPoint,
};
use crate::player::{CheckInOutcome, EventSignup, UserProgress};
use crate::save::ProgressStore;
use crate::world::{Region, RegionCatalog, Spot, SpotGenerator};

pub struct HuntSession<'a, S: ProgressStore + ?Sized> {
    store: &'a S,
    gameplay: GameplayConfig,
    region: Region,
    spots: Vec<Spot>,
    progress: UserProgress,
}

impl<'a, S: ProgressStore + ?Sized> HuntSession<'a, S> {
    /// 取回已有进度，没有则开始新的寻宝并保存
    ///
    /// 已有进度时忽略传入的区域和种子，沿用存档中的值。
    pub fn resume_or_start(
        store: &'a S,
        catalog: &RegionCatalog,
        generator: &SpotGenerator,
        gameplay: GameplayConfig,
        device_id: &str,
        region_key: &str,
        seed: Option<String>,
    ) -> HuntResult<Self> {
        let progress = match store.load(device_id)? {
            Some(progress) => {
                info!("继续寻宝: device={} region={}", device_id, progress.region_key);
                progress
            }
            None => {
                catalog.get(region_key)?;
                let progress = UserProgress::start(device_id, region_key, seed)?;
                store.save(&progress)?;
                progress
            }
        };

        Self::from_progress(store, catalog, generator, gameplay, progress)
    }

    /// 只取回已有进度
    pub fn resume(
        store: &'a S,
        catalog: &RegionCatalog,
        generator: &SpotGenerator,
        gameplay: GameplayConfig,
        device_id: &str,
    ) -> HuntResult<Self> {
        let progress = store
            .load(device_id)?
            .ok_or_else(|| HuntError::Storage(format!("设备 {} 没有进行中的寻宝", device_id)))?;
        Self::from_progress(store, catalog, generator, gameplay, progress)
    }

    fn from_progress(
        store: &'a S,
        catalog: &RegionCatalog,
        generator: &SpotGenerator,
        gameplay: GameplayConfig,
        progress: UserProgress,
    ) -> HuntResult<Self> {
        let region = catalog.get(&progress.region_key)?.clone();
        let spots = generator.generate_spots(&region, &progress.seed);

        Ok(Self {
            store,
            gameplay,
            region,
            spots,
            progress,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn spot(&self, spot_id: &str) -> HuntResult<&Spot> {
        self.spots
            .iter()
            .find(|spot| spot.id == spot_id)
            .ok_or_else(|| HuntError::SpotNotFound(spot_id.to_string()))
    }

    pub fn check_in(&mut self, spot_id: &str, position: GeoPoint) -> HuntResult<CheckInOutcome> {
        let spot = self
            .spots
            .iter()
            .find(|spot| spot.id == spot_id)
            .ok_or_else(|| HuntError::SpotNotFound(spot_id.to_string()))?;

        let outcome = self
            .progress
            .check_in(spot, &position, self.gameplay.check_in_radius_m)?;
        if matches!(outcome, CheckInOutcome::FirstVisit(_)) {
            self.store.save(&self.progress)?;
        }
        Ok(outcome)
    }

    pub fn reflect(&mut self, spot_id: &str, text: &str) -> HuntResult<()> {
        self.spot(spot_id)?;
        self.progress.submit_reflection(spot_id, text)?;
        self.store.save(&self.progress)
    }

    pub fn is_complete(&self) -> bool {
        self.progress.is_complete(self.spots.len())
    }

    pub fn sign_up(&mut self, name: &str, email: &str) -> HuntResult<EventSignup> {
        let total = self.spots.len();
        let signup = self
            .progress
            .sign_up_for_event(total, self.gameplay.require_reflection, name, email)?
            .clone();
        self.store.save(&self.progress)?;
        Ok(signup)
    }
}
