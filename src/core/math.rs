// 地理数学工具
// 开发心理：打卡点生成只需要两种几何运算：极坐标偏移与球面距离
// 偏移使用局部平面近似（区域半径只有几公里），距离使用Haversine公式

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 地球平均半径（米）
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// 每纬度对应的米数（近似值，经度需乘以cos(纬度)）
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// 经纬度坐标（角度制）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// 坐标是否在合法范围内
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self, other)
    }
}

/// 两点间的大圆距离（米）
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// 从中心点按距离和方位角偏移，返回新坐标
///
/// 方位角从正北方向顺时针计量：`cos(angle)`分量向北落在纬度上，`sin(angle)`分量向东落在经度上。
pub fn offset_by_polar(center: &GeoPoint, distance_m: f64, angle_rad: f64) -> GeoPoint {
    let lat_offset = (distance_m * angle_rad.cos()) / METERS_PER_DEGREE_LAT;
    let lon_offset =
        (distance_m * angle_rad.sin()) / (METERS_PER_DEGREE_LAT * (center.lat * PI / 180.0).cos());

    GeoPoint {
        lat: center.lat + lat_offset,
        lon: center.lon + lon_offset,
    }
}
