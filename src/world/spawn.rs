/*
* 开发心理过程：
* 1. 打卡点由 (种子, 区域) 完全决定，从不持久化，每次加载页面重新生成
* 2. 在区域圆盘内均匀采样（距离取sqrt变换），拒绝与已有点距离不足的候选
* 3. 采样次数耗尽后放宽间距检查，保证数量；放宽的点计数并记录警告
* 4. 坐标确定后再按固定顺序抽取经文与题目，主题和历史按位置对应
*/

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::{
    config::{ConfigManager, GenerationConfig},
    error::HuntResult,
    math::{haversine_distance, offset_by_polar, GeoPoint},
};
use crate::utils::random::SeededRandom;
use crate::world::{
    content::{ContentTables, HistoryNote},
    region::Region,
};

/// 生成的打卡点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub title: String,
    pub verse_ref: String,
    pub verse: String,
    pub reflection_prompts: [String; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryNote>,
}

impl Spot {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// 一次生成的结果与诊断信息
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub spots: Vec<Spot>,
    /// 带间距检查的采样次数
    pub attempts: usize,
    /// 跳过间距检查放入的点数
    pub relaxed: usize,
}

impl Generation {
    pub fn is_fully_spaced(&self) -> bool {
        self.relaxed == 0
    }
}

/// 确定性打卡点生成器
#[derive(Debug, Clone)]
pub struct SpotGenerator {
    content: ContentTables,
    settings: GenerationConfig,
}

impl SpotGenerator {
    pub fn new(content: ContentTables, settings: GenerationConfig) -> HuntResult<Self> {
        content.validate()?;
        ConfigManager::validate_generation(&settings)?;

        Ok(Self { content, settings })
    }

    /// 内置内容表 + 默认参数
    pub fn builtin() -> Self {
        Self {
            content: ContentTables::builtin(),
            settings: GenerationConfig::default(),
        }
    }

    pub fn content(&self) -> &ContentTables {
        &self.content
    }

    pub fn settings(&self) -> &GenerationConfig {
        &self.settings
    }

    pub fn generate_spots(&self, region: &Region, seed: &str) -> Vec<Spot> {
        self.generate_with_report(region, seed).spots
    }

    pub fn generate_with_report(&self, region: &Region, seed: &str) -> Generation {
        // 种子拼接区域key，同一种子在不同区域得到不同布局
        let mut rng = SeededRandom::from_seed_str(&format!("{}{}", seed, region.key));
        let count = self.settings.spot_count;
        let min_spacing = self.settings.min_spacing_m;

        let mut points: Vec<GeoPoint> = Vec::with_capacity(count);
        let mut attempts = 0;

        while points.len() < count && attempts < self.settings.max_attempts {
            attempts += 1;
            let candidate = generate_random_point_in_circle(&region.center, region.radius_m, &mut rng);
            if points
                .iter()
                .all(|accepted| haversine_distance(accepted, &candidate) >= min_spacing)
            {
                points.push(candidate);
            }
        }

        let mut relaxed = 0;
        while points.len() < count {
            points.push(generate_random_point_in_circle(&region.center, region.radius_m, &mut rng));
            relaxed += 1;
        }

        if relaxed > 0 {
            warn!(
                "区域 {} 在 {} 次采样后仍不足 {} 个点, {} 个点未满足 {}m 间距",
                region.key, attempts, count, relaxed, min_spacing
            );
        }

        let spots = points
            .iter()
            .enumerate()
            .map(|(index, point)| self.decorate(index, point, &mut rng))
            .collect();

        debug!(
            "生成打卡点: seed={} region={} attempts={} draws={}",
            seed,
            region.key,
            attempts,
            rng.draws()
        );

        Generation {
            spots,
            attempts,
            relaxed,
        }
    }

    fn decorate(&self, index: usize, point: &GeoPoint, rng: &mut SeededRandom) -> Spot {
        let verse = &self.content.verses[rng.index(self.content.verses.len())];
        let (first, second) = self.draw_prompt_pair(rng);

        Spot {
            id: format!("spot-{}", index + 1),
            lat: point.lat,
            lon: point.lon,
            title: self.content.theme_for(index),
            verse_ref: verse.reference.clone(),
            verse: verse.text.clone(),
            reflection_prompts: [
                self.content.prompts[first].clone(),
                self.content.prompts[second].clone(),
            ],
            history: self.content.history_for(index),
        }
    }

    /// 抽取两道不同的题目，重试次数有上限，超过后取相邻题目
    fn draw_prompt_pair(&self, rng: &mut SeededRandom) -> (usize, usize) {
        let len = self.content.prompts.len();
        let first = rng.index(len);

        for _ in 0..self.settings.prompt_retry_limit {
            let second = rng.index(len);
            if second != first {
                return (first, second);
            }
        }

        (first, (first + 1) % len)
    }
}

impl Default for SpotGenerator {
    fn default() -> Self {
        Self::builtin()
    }
}

/// 在圆盘内的极坐标采样：距离按sqrt变换保证面积均匀
pub fn sample_polar(radius_m: f64, rng: &mut SeededRandom) -> (f64, f64) {
    let distance = rng.next_f64().sqrt() * radius_m;
    let angle = rng.next_f64() * 2.0 * PI;
    (distance, angle)
}

/// 在中心点周围半径内均匀随机取一点
pub fn generate_random_point_in_circle(center: &GeoPoint, radius_m: f64, rng: &mut SeededRandom) -> GeoPoint {
    let (distance, angle) = sample_polar(radius_m, rng);
    offset_by_polar(center, distance, angle)
}

/// 使用内置内容表和默认参数生成
pub fn generate_spots(region: &Region, seed: &str) -> Vec<Spot> {
    SpotGenerator::builtin().generate_spots(region, seed)
}

/// 所有打卡点两两之间距离是否都不小于最小间距
pub fn validate_spot_spacing(spots: &[Spot], min_distance_m: f64) -> bool {
    spots.iter().enumerate().all(|(i, a)| {
        spots[i + 1..]
            .iter()
            .all(|b| haversine_distance(&a.position(), &b.position()) >= min_distance_m)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MIN_SPOT_SPACING_M;
    use crate::core::error::HuntError;
    use crate::world::region::RegionCatalog;

    fn cbd() -> Region {
        Region::new("cbd", "Sydney CBD", GeoPoint::new(-33.8688, 151.2093), 2000.0)
    }

    #[test]
    fn test_generation_is_deterministic() {
        let region = cbd();
        let first = generate_spots(&region, "alphi-demo-2024");
        let second = generate_spots(&region, "alphi-demo-2024");

        assert_eq!(first, second);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.lat.to_bits(), b.lat.to_bits());
            assert_eq!(a.lon.to_bits(), b.lon.to_bits());
        }
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_concrete_cbd_scenario() {
        let spots = generate_spots(&cbd(), "alphi-demo-2024");
        assert_eq!(spots.len(), 8);
        assert_eq!(spots[0].id, "spot-1");

        for (index, spot) in spots.iter().enumerate() {
            assert_eq!(spot.id, format!("spot-{}", index + 1));
            assert!(
                (-33.8868..=-33.8508).contains(&spot.lat),
                "lat {} out of range",
                spot.lat
            );
            assert!(
                (151.1876..=151.2310).contains(&spot.lon),
                "lon {} out of range",
                spot.lon
            );
        }
    }

    #[test]
    fn test_count_invariant() {
        let catalog = RegionCatalog::builtin();
        for region in catalog.regions() {
            for seed in ["a", "seed1", "user-1700000000000-abc123xyz", ""] {
                assert_eq!(generate_spots(region, seed).len(), 8);
            }
        }
    }

    #[test]
    fn test_containment() {
        let catalog = RegionCatalog::builtin();
        for region in catalog.regions() {
            for seed in ["alpha", "beta", "gamma"] {
                for spot in generate_spots(region, seed) {
                    let d = haversine_distance(&region.center, &spot.position());
                    assert!(d <= region.radius_m * 1.001, "{} is {}m from center", spot.id, d);
                }
            }
        }
    }

    #[test]
    fn test_separation_for_shipped_catalog() {
        let generator = SpotGenerator::builtin();
        let catalog = RegionCatalog::builtin();
        for region in catalog.regions() {
            for n in 0..25 {
                let seed = format!("seed-{}", n);
                let generation = generator.generate_with_report(region, &seed);
                assert!(generation.is_fully_spaced());
                assert!(validate_spot_spacing(&generation.spots, MIN_SPOT_SPACING_M));
            }
        }
    }

    #[test]
    fn test_seed_sensitivity() {
        let region = cbd();
        let a = generate_spots(&region, "seed1");
        let b = generate_spots(&region, "seed2");
        assert!(a.iter().zip(b.iter()).any(|(x, y)| x.lat != y.lat || x.lon != y.lon));
    }

    #[test]
    fn test_region_sensitivity() {
        // 同一中心点、不同key也会得到不同布局
        let a = cbd();
        let mut b = cbd();
        b.key = "cbd-north".to_string();

        let spots_a = generate_spots(&a, "shared-seed");
        let spots_b = generate_spots(&b, "shared-seed");
        assert!(spots_a
            .iter()
            .zip(spots_b.iter())
            .any(|(x, y)| x.lat != y.lat || x.lon != y.lon));
    }

    #[test]
    fn test_prompts_are_distinct() {
        let catalog = RegionCatalog::builtin();
        for region in catalog.regions() {
            for n in 0..20 {
                for spot in generate_spots(region, &format!("p{}", n)) {
                    assert_ne!(spot.reflection_prompts[0], spot.reflection_prompts[1]);
                }
            }
        }
    }

    #[test]
    fn test_prompts_distinct_with_two_entries_and_no_retries() {
        let mut content = ContentTables::builtin();
        content.prompts = vec!["left".to_string(), "right".to_string()];
        let settings = GenerationConfig {
            prompt_retry_limit: 1,
            ..GenerationConfig::default()
        };
        let generator = SpotGenerator::new(content, settings).unwrap();

        for n in 0..50 {
            for spot in generator.generate_spots(&cbd(), &format!("two-{}", n)) {
                assert_ne!(spot.reflection_prompts[0], spot.reflection_prompts[1]);
            }
        }
    }

    #[test]
    fn test_single_prompt_table_is_rejected() {
        let mut content = ContentTables::builtin();
        content.prompts.truncate(1);
        assert!(matches!(
            SpotGenerator::new(content, GenerationConfig::default()),
            Err(HuntError::Content(_))
        ));
    }

    #[test]
    fn test_theme_and_history_by_position() {
        let generator = SpotGenerator::builtin();
        let spots = generator.generate_spots(&cbd(), "themes");
        for (index, spot) in spots.iter().enumerate() {
            assert_eq!(spot.title, generator.content().themes[index]);
            assert_eq!(spot.history.as_ref(), generator.content().histories.get(index));
        }
    }

    #[test]
    fn test_theme_fallback_beyond_table() {
        let mut content = ContentTables::builtin();
        content.themes.truncate(3);
        content.histories.truncate(3);
        let generator = SpotGenerator::new(content, GenerationConfig::default()).unwrap();

        let spots = generator.generate_spots(&cbd(), "short-tables");
        assert_eq!(spots[2].title, generator.content().themes[2]);
        assert_eq!(spots[3].title, "Discovery Point 4");
        assert_eq!(spots[7].title, "Discovery Point 8");
        assert!(spots[3].history.is_none());
    }

    #[test]
    fn test_small_region_falls_back_to_relaxed_spacing() {
        // 半径100m的圆盘内任意两点距离不超过200m，间距要求无法满足
        let tiny = Region::new("tiny", "Tiny", GeoPoint::new(-33.8688, 151.2093), 100.0);
        let generator = SpotGenerator::builtin();

        let generation = generator.generate_with_report(&tiny, "crowded");
        assert_eq!(generation.spots.len(), 8);
        assert_eq!(generation.attempts, 1000);
        assert_eq!(generation.relaxed, 7);
        assert!(!generation.is_fully_spaced());
        assert!(!validate_spot_spacing(&generation.spots, MIN_SPOT_SPACING_M));

        assert_eq!(generation, generator.generate_with_report(&tiny, "crowded"));
    }

    #[test]
    fn test_validate_spot_spacing() {
        let generator = SpotGenerator::builtin();
        let mut spots = generator.generate_spots(&cbd(), "spacing");
        assert!(validate_spot_spacing(&spots, 250.0));
        assert!(validate_spot_spacing(&[], 250.0));
        assert!(validate_spot_spacing(&spots[..1], 250.0));

        spots[1].lat = spots[0].lat;
        spots[1].lon = spots[0].lon + 0.0001;
        assert!(!validate_spot_spacing(&spots, 250.0));
    }

    #[test]
    fn test_uniform_area_sampling() {
        let mut rng = SeededRandom::from_seed_str("histogram");
        let radius = 2000.0;
        let samples = 20_000;
        let mut bins = [0usize; 10];
        let mut mean_ratio = 0.0;

        for _ in 0..samples {
            let (distance, angle) = sample_polar(radius, &mut rng);
            assert!(distance <= radius);
            assert!((0.0..2.0 * PI).contains(&angle));

            let ratio = distance / radius;
            mean_ratio += ratio;
            // 面积均匀时 (d/R)^2 服从 [0,1) 均匀分布
            let bin = ((ratio * ratio) * 10.0).floor() as usize;
            bins[bin.min(9)] += 1;
        }

        let expected = samples / 10;
        for (i, count) in bins.iter().enumerate() {
            let deviation = (*count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.1, "bin {} has {} samples", i, count);
        }

        // 面积均匀的平均半径比为2/3，半径均匀则为1/2
        mean_ratio /= samples as f64;
        assert!((mean_ratio - 2.0 / 3.0).abs() < 0.02, "mean ratio {}", mean_ratio);
    }

    #[test]
    fn test_point_in_circle_stays_inside() {
        let center = GeoPoint::new(-33.8688, 151.2093);
        let mut rng = SeededRandom::from_seed_str("inside");
        for _ in 0..2000 {
            let point = generate_random_point_in_circle(&center, 500.0, &mut rng);
            assert!(haversine_distance(&center, &point) <= 500.5);
        }
    }

    #[test]
    fn test_spot_json_shape() {
        let spots = generate_spots(&cbd(), "json");
        let value = serde_json::to_value(&spots[0]).unwrap();
        assert_eq!(value["id"], "spot-1");
        assert!(value["verseRef"].is_string());
        assert_eq!(value["reflectionPrompts"].as_array().unwrap().len(), 2);
        assert!(value["history"]["title"].is_string());

        let back: Spot = serde_json::from_value(value).unwrap();
        assert_eq!(back, spots[0]);
    }

    #[test]
    fn test_custom_spot_count() {
        let settings = GenerationConfig {
            spot_count: 5,
            ..GenerationConfig::default()
        };
        let generator = SpotGenerator::new(ContentTables::builtin(), settings).unwrap();
        let spots = generator.generate_spots(&cbd(), "five");
        assert_eq!(spots.len(), 5);
        assert_eq!(spots[4].id, "spot-5");
    }

    #[test]
    fn test_generator_rejects_degenerate_settings() {
        let degenerate = [
            GenerationConfig { spot_count: 0, ..GenerationConfig::default() },
            GenerationConfig { min_spacing_m: 0.0, ..GenerationConfig::default() },
            GenerationConfig { min_spacing_m: f64::NAN, ..GenerationConfig::default() },
            GenerationConfig { max_attempts: 0, ..GenerationConfig::default() },
            GenerationConfig { prompt_retry_limit: 0, ..GenerationConfig::default() },
        ];
        for settings in degenerate {
            assert!(
                matches!(
                    SpotGenerator::new(ContentTables::builtin(), settings.clone()),
                    Err(HuntError::Config(_))
                ),
                "{:?} should be rejected",
                settings
            );
        }
    }
}
