//! session.rs：
//! - 探索狀態機：標記位置、回合預算與選單／遊戲階段切換。
//! - 僅處理移動與回合規則，不負責地圖產生細節或畫面繪製。
use crate::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 遊戲階段
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, Display, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Menu,
    Playing,
}

/// 移動方向（八方向）
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Display, EnumIter, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// (dx, dy)，y 向下為正
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }
}

/// 計算往指定方向一格後的位置，超出格網邊界回傳 `None`
pub fn step_in_direction(grid: &MapGrid, pos: Pos, direction: Direction) -> Option<Pos> {
    let (dx, dy) = direction.offset();
    let x = pos.x.checked_add_signed(dx)?;
    let y = pos.y.checked_add_signed(dy)?;
    if x < grid.width() && y < grid.height() {
        Some(Pos { x, y })
    } else {
        None
    }
}

/// 回合預算
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TurnBudget {
    pub points_remaining: MovementCost,
    pub moves_this_turn: usize,
}

impl Default for TurnBudget {
    fn default() -> Self {
        Self {
            points_remaining: MAX_TURN_POINTS,
            moves_this_turn: 0,
        }
    }
}

/// 移動意圖的結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub accepted: bool,
    pub turn_ended: bool,
}

/// 單一探索場次：格網、標記、回合預算與階段
#[derive(Debug, Clone)]
pub struct ExplorationSession {
    phase: Phase,
    grid: Option<MapGrid>,
    marker: Pos,
    budget: TurnBudget,
    params: GenParams,
    /// 尚未產生地圖時，下次產生採用的尺寸
    pending_width: usize,
    pending_height: usize,
}

impl ExplorationSession {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_params(GenParams::default(), width, height)
    }

    pub fn with_params(params: GenParams, width: usize, height: usize) -> Self {
        Self {
            phase: Phase::Menu,
            grid: None,
            marker: Pos::default(),
            budget: TurnBudget::default(),
            params,
            pending_width: width,
            pending_height: height,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn grid(&self) -> Option<&MapGrid> {
        self.grid.as_ref()
    }

    pub fn marker(&self) -> Pos {
        self.marker
    }

    pub fn budget(&self) -> TurnBudget {
        self.budget
    }

    /// 進入遊戲階段；首次進入時以目前尺寸產生地圖並挑選起點
    pub fn enter_playing<R: Rng>(&mut self, rng: &mut R) -> Result<(), Error> {
        if self.grid.is_none() {
            let noise = TerrainNoise::new(rng.random(), &self.params);
            let generated = generate_map_with(
                &self.params,
                &noise,
                rng,
                self.pending_width,
                self.pending_height,
            )?;
            self.marker = generated.start;
            self.grid = Some(generated.grid);
        }
        self.phase = Phase::Playing;
        Ok(())
    }

    /// 回到選單階段；格網、標記與回合預算全部保留
    pub fn leave_playing(&mut self) {
        self.phase = Phase::Menu;
    }

    /// 更新之後產生地圖採用的尺寸；已產生的地圖維持原尺寸，不重生
    pub fn on_resize(&mut self, new_width: usize, new_height: usize) {
        self.pending_width = new_width;
        self.pending_height = new_height;
    }

    /// 處理移動意圖
    ///
    /// - 目標超出邊界或不可通行：不改變任何狀態
    /// - 成本超過剩餘點數：拒絕移動並強制結束回合（預算重置）
    /// - 其餘：移動並扣點；達移動次數上限或點數歸零時結束回合
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        const UNCHANGED: MoveOutcome = MoveOutcome {
            accepted: false,
            turn_ended: false,
        };

        if self.phase != Phase::Playing {
            return UNCHANGED;
        }
        let Some(grid) = &self.grid else {
            return UNCHANGED;
        };
        // 點數歸零時所有移動意圖皆為 no-op
        if self.budget.points_remaining == 0 {
            return UNCHANGED;
        }
        let Some(target) = step_in_direction(grid, self.marker, direction) else {
            return UNCHANGED;
        };
        let Some(kind) = grid.get_tile(target) else {
            return UNCHANGED;
        };
        if !is_passable(kind) {
            return UNCHANGED;
        }

        let cost = movement_cost(kind);
        if cost > self.budget.points_remaining {
            // 點數不足：本回合剩餘點數作廢
            self.budget = TurnBudget::default();
            return MoveOutcome {
                accepted: false,
                turn_ended: true,
            };
        }

        self.marker = target;
        self.budget.points_remaining -= cost;
        self.budget.moves_this_turn += 1;

        let turn_ended = self.budget.moves_this_turn == MAX_MOVES_PER_TURN
            || self.budget.points_remaining == 0;
        if turn_ended {
            self.budget = TurnBudget::default();
        }
        MoveOutcome {
            accepted: true,
            turn_ended,
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl ExplorationSession {
    /// 測試輔助：以既有格網與標記建立進行中的場次
    pub fn from_parts(grid: MapGrid, marker: Pos) -> Self {
        Self {
            phase: Phase::Playing,
            pending_width: grid.width(),
            pending_height: grid.height(),
            grid: Some(grid),
            marker,
            budget: TurnBudget::default(),
            params: GenParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_from_ascii;
    use strum::IntoEnumIterator;

    #[test]
    fn test_direction_offsets_are_unit_steps() {
        let mut seen = std::collections::BTreeSet::new();
        for direction in Direction::iter() {
            let (dx, dy) = direction.offset();
            assert!(dx.abs() <= 1 && dy.abs() <= 1);
            assert_ne!((dx, dy), (0, 0));
            assert!(seen.insert((dx, dy)), "{} 的位移重複", direction);
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_step_in_direction() {
        let grid = MapGrid::filled(3, 3, TerrainKind::Grassland);
        let center = Pos { x: 1, y: 1 };
        let test_data = [
            (Direction::North, Some(Pos { x: 1, y: 0 })),
            (Direction::South, Some(Pos { x: 1, y: 2 })),
            (Direction::East, Some(Pos { x: 2, y: 1 })),
            (Direction::West, Some(Pos { x: 0, y: 1 })),
            (Direction::NorthEast, Some(Pos { x: 2, y: 0 })),
            (Direction::NorthWest, Some(Pos { x: 0, y: 0 })),
            (Direction::SouthEast, Some(Pos { x: 2, y: 2 })),
            (Direction::SouthWest, Some(Pos { x: 0, y: 2 })),
        ];
        for (direction, expected) in test_data {
            assert_eq!(step_in_direction(&grid, center, direction), expected);
        }
    }

    #[test]
    fn test_step_in_direction_out_of_bounds() {
        let grid = MapGrid::filled(2, 2, TerrainKind::Grassland);
        let corner_tests = [
            (Pos { x: 0, y: 0 }, Direction::North),
            (Pos { x: 0, y: 0 }, Direction::West),
            (Pos { x: 0, y: 0 }, Direction::NorthWest),
            (Pos { x: 1, y: 1 }, Direction::South),
            (Pos { x: 1, y: 1 }, Direction::East),
            (Pos { x: 1, y: 1 }, Direction::SouthEast),
        ];
        for (pos, direction) in corner_tests {
            assert_eq!(step_in_direction(&grid, pos, direction), None);
        }
    }

    #[test]
    fn test_move_deducts_terrain_cost() {
        let (grid, start) = load_from_ascii(
            r#"
S g p
g g g
"#,
        )
        .unwrap();
        let mut session = ExplorationSession::from_parts(grid, start.unwrap());

        let outcome = session.apply_move(Direction::East);
        assert_eq!(
            outcome,
            MoveOutcome {
                accepted: true,
                turn_ended: false
            }
        );
        assert_eq!(session.marker(), Pos { x: 1, y: 0 });
        assert_eq!(session.budget().points_remaining, 2);
        assert_eq!(session.budget().moves_this_turn, 1);
    }

    #[test]
    fn test_menu_phase_is_noop() {
        let (grid, start) = load_from_ascii("S g g").unwrap();
        let mut session = ExplorationSession::from_parts(grid, start.unwrap());
        session.leave_playing();

        let outcome = session.apply_move(Direction::East);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(session.marker(), Pos { x: 0, y: 0 });
        assert_eq!(session.budget(), TurnBudget::default());
    }
}
