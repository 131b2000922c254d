//! 測試輔助：以 ASCII 描述地形格網
//!
//! 格式：每行用空白分隔的符號
//! - `~` 海洋、`g` 草原、`m` 山地、`^` 山峰、`t` 凍原、`p` 平原、`f` 森林
//! - `S` = 起點標記（該格視為草原）
//!
//! 例如：
//! ```text
//! S g p
//! ~ m f
//! ```
use crate::*;

/// 從 ASCII 格式載入格網，回傳（格網, 起點標記）
pub fn load_from_ascii(ascii: &str) -> Result<(MapGrid, Option<Pos>), Error> {
    let func = "load_from_ascii";

    let lines: Vec<&str> = ascii
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(Error::Parse {
            func,
            detail: "格網為空".to_string(),
        });
    }

    let mut tiles: Vec<Vec<TerrainKind>> = Vec::with_capacity(lines.len());
    let mut start = None;
    for (y, line) in lines.iter().enumerate() {
        let mut row = Vec::new();
        for (x, cell) in line.split_whitespace().enumerate() {
            let kind = match cell {
                "~" => TerrainKind::Ocean,
                "g" => TerrainKind::Grassland,
                "m" => TerrainKind::Mountain,
                "^" => TerrainKind::Peak,
                "t" => TerrainKind::Tundra,
                "p" => TerrainKind::Plains,
                "f" => TerrainKind::Forest,
                "S" => {
                    start = Some(Pos { x, y });
                    TerrainKind::Grassland
                }
                other => {
                    return Err(Error::Parse {
                        func,
                        detail: format!("未知符號: {}", other),
                    });
                }
            };
            row.push(kind);
        }
        // 每列寬度必須一致
        if let Some(first) = tiles.first() {
            if row.len() != first.len() {
                return Err(Error::Parse {
                    func,
                    detail: format!("第 {} 列寬度 {} 與首列 {} 不一致", y, row.len(), first.len()),
                });
            }
        }
        tiles.push(row);
    }

    Ok((MapGrid { tiles }, start))
}
