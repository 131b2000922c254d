//! map.rs：
//! - 地形分類與其固定的顏色、移動成本對應，以及地圖格網容器。
//! - 僅處理地形資料本身，不負責地圖產生或移動判定。
use crate::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, Display, EnumIter, PartialEq, Eq)]
pub enum TerrainKind {
    Ocean,
    #[default]
    Grassland,
    Mountain,
    Peak,
    Tundra,
    Plains,
    Forest,
}

/// 進入該格所需點數；不可通行地形回傳 MAX_MOVEMENT_COST
pub fn movement_cost(t: TerrainKind) -> MovementCost {
    match t {
        TerrainKind::Tundra => 0,
        TerrainKind::Grassland => 1,
        TerrainKind::Plains => 2,
        TerrainKind::Forest => 3,
        TerrainKind::Ocean | TerrainKind::Mountain | TerrainKind::Peak => MAX_MOVEMENT_COST,
    }
}

/// 地形是否可進入（海洋、山地、山峰不可）
pub fn is_passable(t: TerrainKind) -> bool {
    !matches!(
        t,
        TerrainKind::Ocean | TerrainKind::Mountain | TerrainKind::Peak
    )
}

/// 地形顯示顏色
pub fn terrain_color(t: TerrainKind) -> RGB {
    match t {
        TerrainKind::Ocean => (0x00, 0x00, 0xFF),     // #00F
        TerrainKind::Grassland => (0x00, 0x80, 0x00), // #080
        TerrainKind::Mountain => (0x33, 0x2E, 0x22),  // 深灰
        TerrainKind::Peak => (0xFF, 0xFF, 0xFF),      // #FFF
        TerrainKind::Tundra => (0xFF, 0xFF, 0xFF),    // #FFF
        TerrainKind::Plains => (0xA8, 0xA5, 0x00),    // 黃
        TerrainKind::Forest => (0x00, 0x2F, 0x00),    // 深綠
    }
}

/// 標記（紅點）顏色
pub const MARKER_COLOR: RGB = (0xFF, 0x00, 0x00);

/// 地圖格網：外層為列（y）、內層為行（x）
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct MapGrid {
    pub tiles: Vec<Vec<TerrainKind>>,
}

impl MapGrid {
    /// 以單一地形填滿的格網
    pub fn filled(width: usize, height: usize, kind: TerrainKind) -> Self {
        Self {
            tiles: vec![vec![kind; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.first().map_or(0, |row| row.len())
    }

    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    pub fn get_tile(&self, pos: Pos) -> Option<TerrainKind> {
        self.tiles.get(pos.y)?.get(pos.x).copied()
    }

    pub fn set_tile(&mut self, pos: Pos, kind: TerrainKind) {
        if let Some(tile) = self
            .tiles
            .get_mut(pos.y)
            .and_then(|row| row.get_mut(pos.x))
        {
            *tile = kind;
        }
    }

    /// 逐列走訪
    pub fn rows(&self) -> impl Iterator<Item = &[TerrainKind]> {
        self.tiles.iter().map(|row| row.as_slice())
    }
}
