//! generate.rs：
//! - 地圖產生器：依固定順序套用多個地形 pass（極區 → 基礎噪聲 → 凍原斑點 → 平原 → 森林）。
//! - pass 順序是輸出外觀的核心不變量，調整參數時不可改變順序。
//! - 噪聲與隨機來源皆由呼叫端注入，測試可完全重現。
use crate::*;
use noise::{NoiseFn, Simplex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 地圖產生參數，可由 TOML 載入，預設值即標準版面
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenParams {
    /// 南北極強制凍原列數
    pub polar_rows: usize,
    /// 低頻噪聲縮放（大陸輪廓）
    pub base_scale: f64,
    /// 高頻噪聲縮放（細節）
    pub detail_scale: f64,
    /// 細節層權重
    pub detail_weight: f64,
    /// 海洋上限（正規化高度，不含）
    pub ocean_level: f64,
    /// 草原上限
    pub grassland_level: f64,
    /// 山地上限，以上為山峰
    pub mountain_level: f64,
    /// 凍原斑點帶最末列
    pub fringe_rows: usize,
    /// 凍原斑點機率每列衰減量
    pub fringe_decay: f64,
    /// 平原帶起點（佔高度比例）
    pub plains_band_start: f64,
    /// 平原帶終點（佔高度比例）
    pub plains_band_end: f64,
    /// 平原初始機率
    pub plains_start_probability: f64,
    /// 平原機率每列增減量
    pub plains_step: f64,
    /// 森林帶與地圖上下緣的間距（列數）
    pub forest_margin: usize,
    /// 北森林帶終點（佔高度比例）
    pub forest_band_north_end: f64,
    /// 南森林帶起點（佔高度比例）
    pub forest_band_south_start: f64,
    /// 森林機率下限（帶緣）
    pub min_forest_probability: f64,
    /// 森林機率上限（帶中央）
    pub max_forest_probability: f64,
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            polar_rows: 3,
            base_scale: 80.0,
            detail_scale: 40.0,
            detail_weight: 0.3,
            ocean_level: 0.50,
            grassland_level: 0.82,
            mountain_level: 0.92,
            fringe_rows: 15,
            fringe_decay: 0.08,
            plains_band_start: 0.25,
            plains_band_end: 0.75,
            plains_start_probability: 0.1,
            plains_step: 0.01,
            forest_margin: 7,
            forest_band_north_end: 0.45,
            forest_band_south_start: 0.55,
            min_forest_probability: 0.1,
            max_forest_probability: 0.5,
        }
    }
}

impl GenParams {
    /// 分類門檻必須嚴格遞增
    fn validate(&self, func: &'static str) -> Result<(), Error> {
        if self.ocean_level < self.grassland_level && self.grassland_level < self.mountain_level {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                func,
                detail: format!(
                    "分類門檻必須遞增: {} < {} < {}",
                    self.ocean_level, self.grassland_level, self.mountain_level
                ),
            })
        }
    }
}

/// 雙層噪聲高度產生器：低頻層畫出大陸輪廓，高頻層加入細節
pub struct TerrainNoise {
    noise_base: Simplex,
    noise_detail: Simplex,
    base_scale: f64,
    detail_scale: f64,
    detail_weight: f64,
}

impl TerrainNoise {
    /// 兩層使用不同種子
    pub fn new(seed: u32, params: &GenParams) -> Self {
        Self {
            noise_base: Simplex::new(seed),
            noise_detail: Simplex::new(seed.wrapping_add(1)),
            base_scale: params.base_scale,
            detail_scale: params.detail_scale,
            detail_weight: params.detail_weight,
        }
    }

    /// 取得 (x, y) 的正規化高度（0.0~1.0）
    pub fn elevation(&self, x: f64, y: f64) -> f64 {
        let base = self
            .noise_base
            .get([x / self.base_scale, y / self.base_scale]);
        let detail = self
            .noise_detail
            .get([x / self.detail_scale, y / self.detail_scale]);
        (((base + detail * self.detail_weight) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// 產生結果：格網與起始位置
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub grid: MapGrid,
    pub start: Pos,
}

/// 產生地圖與起始位置（環境隨機來源、隨機種子）
pub fn generate_map(width: usize, height: usize) -> Result<GeneratedMap, Error> {
    let params = GenParams::default();
    let mut rng = rand::rng();
    let noise = TerrainNoise::new(rng.random(), &params);
    generate_map_with(&params, &noise, &mut rng, width, height)
}

/// 產生地圖與起始位置（注入噪聲與隨機來源）
pub fn generate_map_with<R: Rng>(
    params: &GenParams,
    noise: &TerrainNoise,
    rng: &mut R,
    width: usize,
    height: usize,
) -> Result<GeneratedMap, Error> {
    let func = "generate_map_with";

    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { func, width, height });
    }
    params.validate(func)?;

    // 預填凍原即為極區 pass；後續 pass 依序覆寫
    let mut grid = MapGrid::filled(width, height, TerrainKind::Tundra);
    classify_base(&mut grid, params, noise);
    sprinkle_tundra_fringe(&mut grid, params, rng);
    overlay_plains(&mut grid, params, rng);
    overlay_forest(&mut grid, params, rng);

    let start = pick_start(&grid, rng);
    Ok(GeneratedMap { grid, start })
}

/// 基礎分類：非極區格依正規化高度分為海洋／草原／山地／山峰
fn classify_base(grid: &mut MapGrid, params: &GenParams, noise: &TerrainNoise) {
    let (w, h) = (grid.width(), grid.height());
    for y in 0..h {
        // 極區列維持凍原
        if y < params.polar_rows || y >= h.saturating_sub(params.polar_rows) {
            continue;
        }
        for x in 0..w {
            let elevation = noise.elevation(x as f64, y as f64);
            let kind = if elevation < params.ocean_level {
                TerrainKind::Ocean
            } else if elevation < params.grassland_level {
                TerrainKind::Grassland
            } else if elevation < params.mountain_level {
                TerrainKind::Mountain
            } else {
                TerrainKind::Peak
            };
            grid.tiles[y][x] = kind;
        }
    }
}

/// 凍原斑點：極區鄰接帶逐格擲骰轉為凍原，機率自極區向赤道每列遞減
fn sprinkle_tundra_fringe<R: Rng>(grid: &mut MapGrid, params: &GenParams, rng: &mut R) {
    let h = grid.height();
    for (i, y) in (params.polar_rows..=params.fringe_rows).enumerate() {
        // 機率可為負，視為 0
        let probability = 1.0 - params.fringe_decay * i as f64;
        sprinkle_row(grid, rng, y, probability);
        // 南半球鏡像列
        if let Some(mirror) = h.checked_sub(1 + y) {
            if mirror > y {
                sprinkle_row(grid, rng, mirror, probability);
            }
        }
    }
}

fn sprinkle_row<R: Rng>(grid: &mut MapGrid, rng: &mut R, y: usize, probability: f64) {
    if y >= grid.height() {
        return;
    }
    for x in 0..grid.width() {
        if rng.random::<f64>() < probability {
            grid.tiles[y][x] = TerrainKind::Tundra;
        }
    }
}

/// 平原：中央緯度帶的草原逐格擲骰轉為平原，
/// 機率於每列開頭調整，帶中點前遞增、之後遞減
fn overlay_plains<R: Rng>(grid: &mut MapGrid, params: &GenParams, rng: &mut R) {
    let h = grid.height();
    let band_start = (h as f64 * params.plains_band_start).floor() as usize;
    let band_end = (h as f64 * params.plains_band_end).floor() as usize;
    let midpoint = (band_start + band_end) as f64 / 2.0;

    let mut probability = params.plains_start_probability;
    for y in band_start..=band_end.min(h.saturating_sub(1)) {
        if (y as f64) < midpoint {
            probability += params.plains_step;
        } else {
            probability -= params.plains_step;
        }
        for x in 0..grid.width() {
            if grid.tiles[y][x] == TerrainKind::Grassland && rng.random::<f64>() < probability {
                grid.tiles[y][x] = TerrainKind::Plains;
            }
        }
    }
}

/// 森林：南北兩條緯度帶，機率呈倒三角（帶緣最低、帶中央最高）
fn overlay_forest<R: Rng>(grid: &mut MapGrid, params: &GenParams, rng: &mut R) {
    let h = grid.height();

    let north_end = (h as f64 * params.forest_band_north_end).floor() as usize;
    overlay_forest_band(grid, params, rng, params.forest_margin, north_end);

    let south_start = (h as f64 * params.forest_band_south_start).floor() as usize;
    if let Some(south_end) = h.checked_sub(params.forest_margin) {
        overlay_forest_band(grid, params, rng, south_start, south_end);
    }
}

fn overlay_forest_band<R: Rng>(
    grid: &mut MapGrid,
    params: &GenParams,
    rng: &mut R,
    start_y: usize,
    end_y: usize,
) {
    let h = grid.height();
    let end_y = end_y.min(h.saturating_sub(1));
    if end_y <= start_y {
        return; // 地圖高度不足以容納此帶
    }
    let half_span = (end_y - start_y) as f64 / 2.0;
    for y in start_y..=end_y {
        let distance_from_edge = ((y - start_y) as f64 - half_span).abs();
        let probability = params.min_forest_probability
            + ((half_span - distance_from_edge) / half_span)
                * (params.max_forest_probability - params.min_forest_probability);
        for x in 0..grid.width() {
            // 海洋、山地、山峰、凍原不轉為森林
            if matches!(
                grid.tiles[y][x],
                TerrainKind::Ocean | TerrainKind::Mountain | TerrainKind::Peak | TerrainKind::Tundra
            ) {
                continue;
            }
            if rng.random::<f64>() < probability {
                grid.tiles[y][x] = TerrainKind::Forest;
            }
        }
    }
}

/// 以拒絕抽樣挑選可通行起點
///
/// 極區列必為凍原，標準參數下必有可通行格；
/// 後備路徑逐格掃描，全不可通行時退回 (0, 0)
fn pick_start<R: Rng>(grid: &MapGrid, rng: &mut R) -> Pos {
    let (w, h) = (grid.width(), grid.height());
    for _ in 0..w.saturating_mul(h).saturating_mul(20) {
        let pos = Pos {
            x: rng.random_range(0..w),
            y: rng.random_range(0..h),
        };
        if grid.get_tile(pos).is_some_and(is_passable) {
            return pos;
        }
    }
    for y in 0..h {
        for x in 0..w {
            let pos = Pos { x, y };
            if grid.get_tile(pos).is_some_and(is_passable) {
                return pos;
            }
        }
    }
    Pos::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generate_seeded(seed: u64, width: usize, height: usize) -> GeneratedMap {
        let params = GenParams::default();
        let noise = TerrainNoise::new(seed as u32, &params);
        let mut rng = StdRng::seed_from_u64(seed);
        generate_map_with(&params, &noise, &mut rng, width, height).unwrap()
    }

    #[test]
    fn test_invalid_dimensions() {
        let params = GenParams::default();
        let noise = TerrainNoise::new(0, &params);
        let mut rng = StdRng::seed_from_u64(0);
        for (w, h) in [(0, 10), (10, 0), (0, 0)] {
            let result = generate_map_with(&params, &noise, &mut rng, w, h);
            assert!(
                matches!(result, Err(Error::InvalidDimensions { .. })),
                "{}x{} 應回尺寸錯誤",
                w,
                h
            );
        }
    }

    #[test]
    fn test_threshold_ordering_rejected() {
        let params = GenParams {
            ocean_level: 0.9,
            grassland_level: 0.5,
            ..Default::default()
        };
        let noise = TerrainNoise::new(0, &params);
        let mut rng = StdRng::seed_from_u64(0);
        let result = generate_map_with(&params, &noise, &mut rng, 8, 8);
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_polar_rows_are_tundra() {
        for seed in [1, 7, 42] {
            let generated = generate_seeded(seed, 64, 48);
            let grid = &generated.grid;
            for y in (0..3).chain(45..48) {
                for x in 0..64 {
                    assert_eq!(
                        grid.get_tile(Pos { x, y }),
                        Some(TerrainKind::Tundra),
                        "seed {} 的極區列 ({}, {}) 應為凍原",
                        seed,
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_start_position_passable() {
        for seed in [1, 7, 42, 99] {
            let generated = generate_seeded(seed, 80, 60);
            let kind = generated.grid.get_tile(generated.start).unwrap();
            assert!(is_passable(kind), "seed {} 的起點落在 {}", seed, kind);
        }
    }

    #[test]
    fn test_dimensions_match() {
        let generated = generate_seeded(5, 33, 21);
        assert_eq!(generated.grid.width(), 33);
        assert_eq!(generated.grid.height(), 21);
    }

    #[test]
    fn test_degenerate_sizes() {
        // 高度不足兩倍極區列數時整張地圖皆為凍原
        for (w, h) in [(1, 1), (1, 6), (5, 2)] {
            let generated = generate_seeded(3, w, h);
            for row in generated.grid.rows() {
                assert!(row.iter().all(|&k| k == TerrainKind::Tundra));
            }
            assert!(is_passable(generated.grid.get_tile(generated.start).unwrap()));
        }
    }

    #[test]
    fn test_deterministic_under_seed() {
        let params = GenParams::default();
        let noise = TerrainNoise::new(11, &params);
        let mut rng_a = StdRng::seed_from_u64(11);
        let mut rng_b = StdRng::seed_from_u64(11);
        let a = generate_map_with(&params, &noise, &mut rng_a, 40, 30).unwrap();
        let b = generate_map_with(&params, &noise, &mut rng_b, 40, 30).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.start, b.start);
    }

    #[test]
    fn test_ocean_world_start_falls_back_to_polar_tundra() {
        // 門檻拉高讓所有非極區格都是海洋，起點必須落在極區凍原
        let params = GenParams {
            ocean_level: 1.5,
            grassland_level: 1.6,
            mountain_level: 1.7,
            ..Default::default()
        };
        let noise = TerrainNoise::new(2, &params);
        let mut rng = StdRng::seed_from_u64(2);
        let generated = generate_map_with(&params, &noise, &mut rng, 32, 32).unwrap();
        assert_eq!(
            generated.grid.get_tile(generated.start),
            Some(TerrainKind::Tundra)
        );
    }

    #[test]
    fn test_elevation_range() {
        let params = GenParams::default();
        let noise = TerrainNoise::new(9, &params);
        for y in 0..50 {
            for x in 0..50 {
                let e = noise.elevation(x as f64, y as f64);
                assert!((0.0..=1.0).contains(&e));
            }
        }
    }
}
