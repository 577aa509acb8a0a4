//! Tile map, placeable area and pathfinding

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enemy::Enemy;
use super::plant::{Plant, PlantBlueprint};
use super::projectile::Projectile;
use crate::consts::BASE_PLANT_CAP;

/// Columns the active area starts with (before board expansion tech)
pub const BASE_ACTIVE_MIN_COL: usize = 5;
pub const BASE_ACTIVE_MAX_COL: usize = 15;
/// Columns added on each side per expansion
pub const EXPANSION_STEP: usize = 3;

/// BFS neighbor order: up, down, left, right
const NEIGHBORS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Integer tile coordinate. Signed so that off-board neighbors are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub col: i32,
    pub row: i32,
}

impl TileCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn manhattan(&self, other: TileCoord) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Empty,
    Path,
    Rock,
    Locked,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: TileCoord,
    pub kind: TileKind,
    pub plant: Option<Plant>,
}

/// Placeable column range (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveArea {
    pub min_col: usize,
    pub max_col: usize,
}

impl ActiveArea {
    pub fn contains_col(&self, col: usize) -> bool {
        col >= self.min_col && col <= self.max_col
    }
}

/// Why the grid refused a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementRefusal {
    #[error("tile ({col}, {row}) is off the board")]
    OffBoard { col: i32, row: i32 },
    #[error("tile is locked")]
    Locked,
    #[error("tile is on the enemy path")]
    OnPath,
    #[error("tile already holds a plant")]
    Occupied,
    #[error("plant cap of {cap} reached")]
    PlantCap { cap: usize },
}

/// The game board
#[derive(Debug, Clone)]
pub struct Grid {
    cols: usize,
    rows: usize,
    tile_size: f32,
    active: ActiveArea,
    path_row: usize,
    plant_cap: usize,
    /// Row-major
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build a board covering a `width × height` pixel canvas.
    ///
    /// `expansion_level` is the board expansion tech level; each level widens
    /// the starting active area by one column on each side.
    pub fn new(width: f32, height: f32, tile_size: f32, expansion_level: u32) -> Self {
        let cols = (width / tile_size).floor() as usize;
        let rows = (height / tile_size).floor() as usize;
        let expansion = expansion_level as usize;

        let active = ActiveArea {
            min_col: BASE_ACTIVE_MIN_COL.saturating_sub(expansion),
            max_col: (BASE_ACTIVE_MAX_COL + expansion).min(cols.saturating_sub(1)),
        };
        let path_row = rows / 2;

        let mut tiles = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let kind = if row == path_row {
                    TileKind::Path
                } else if active.contains_col(col) {
                    TileKind::Empty
                } else {
                    TileKind::Locked
                };
                tiles.push(Tile {
                    coord: TileCoord::new(col as i32, row as i32),
                    kind,
                    plant: None,
                });
            }
        }

        Self {
            cols,
            rows,
            tile_size,
            active,
            path_row,
            plant_cap: BASE_PLANT_CAP,
            tiles,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn active_area(&self) -> ActiveArea {
        self.active
    }

    pub fn path_row(&self) -> usize {
        self.path_row
    }

    pub fn plant_cap(&self) -> usize {
        self.plant_cap
    }

    pub fn set_plant_cap(&mut self, cap: usize) {
        self.plant_cap = cap;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.col >= 0
            && coord.row >= 0
            && (coord.col as usize) < self.cols
            && (coord.row as usize) < self.rows
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.row as usize * self.cols + coord.col as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        let index = self.index(coord)?;
        Some(&mut self.tiles[index])
    }

    pub fn plant_mut(&mut self, coord: TileCoord) -> Option<&mut Plant> {
        self.tile_mut(coord).and_then(|t| t.plant.as_mut())
    }

    /// Tile coordinate under a pixel position (may be off the board)
    pub fn coord_at_pixel(&self, x: f32, y: f32) -> TileCoord {
        TileCoord::new(
            (x / self.tile_size).floor() as i32,
            (y / self.tile_size).floor() as i32,
        )
    }

    pub fn tile_at(&self, x: f32, y: f32) -> Option<&Tile> {
        self.tile(self.coord_at_pixel(x, y))
    }

    /// Pixel center of a tile
    pub fn tile_center(&self, coord: TileCoord) -> glam::Vec2 {
        glam::Vec2::new(
            coord.col as f32 * self.tile_size + self.tile_size / 2.0,
            coord.row as f32 * self.tile_size + self.tile_size / 2.0,
        )
    }

    /// Whether a plant could go on this tile right now (cap aside)
    pub fn is_placeable(&self, coord: TileCoord) -> bool {
        self.tile(coord).is_some_and(|t| {
            matches!(t.kind, TileKind::Empty | TileKind::Rock) && t.plant.is_none()
        })
    }

    pub fn plant_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.plant.is_some()).count()
    }

    pub fn plants(&self) -> impl Iterator<Item = &Plant> {
        self.tiles.iter().filter_map(|t| t.plant.as_ref())
    }

    /// Breadth-first search over the whole lattice.
    ///
    /// Tile contents are ignored; only bounds and the visited set constrain the
    /// search. Returns start..=end, or an empty path if either end is off the
    /// board.
    pub fn find_path(&self, start: TileCoord, end: TileCoord) -> Vec<TileCoord> {
        let (Some(start_idx), Some(end_idx)) = (self.index(start), self.index(end)) else {
            return Vec::new();
        };

        let mut parent: Vec<Option<usize>> = vec![None; self.tiles.len()];
        let mut visited = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();

        visited[start_idx] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let Some(current_idx) = self.index(current) else {
                continue;
            };

            if current_idx == end_idx {
                let mut path = vec![self.tiles[end_idx].coord];
                let mut cursor = end_idx;
                while let Some(prev) = parent[cursor] {
                    path.push(self.tiles[prev].coord);
                    cursor = prev;
                }
                path.reverse();
                return path;
            }

            for (dx, dy) in NEIGHBORS {
                let next = TileCoord::new(current.col + dx, current.row + dy);
                let Some(next_idx) = self.index(next) else {
                    continue;
                };
                if visited[next_idx] {
                    continue;
                }
                visited[next_idx] = true;
                parent[next_idx] = Some(current_idx);
                queue.push_back(next);
            }
        }

        Vec::new()
    }

    /// Place a plant on the tile under a pixel position
    pub fn place_plant(
        &mut self,
        x: f32,
        y: f32,
        blueprint: &PlantBlueprint,
    ) -> Result<TileCoord, PlacementRefusal> {
        let coord = self.coord_at_pixel(x, y);
        let plant_count = self.plant_count();
        let cap = self.plant_cap;

        let tile = self.tile_mut(coord).ok_or(PlacementRefusal::OffBoard {
            col: coord.col,
            row: coord.row,
        })?;

        match tile.kind {
            TileKind::Locked => return Err(PlacementRefusal::Locked),
            TileKind::Path => return Err(PlacementRefusal::OnPath),
            TileKind::Empty | TileKind::Rock => {}
        }
        if tile.plant.is_some() {
            return Err(PlacementRefusal::Occupied);
        }
        if plant_count >= cap {
            log::info!("Max plants reached ({})", cap);
            return Err(PlacementRefusal::PlantCap { cap });
        }

        tile.plant = Some(Plant::new(coord, blueprint));
        Ok(coord)
    }

    /// Clear the plant under a pixel position. Returns whether one was removed.
    pub fn remove_plant_at(&mut self, x: f32, y: f32) -> bool {
        let coord = self.coord_at_pixel(x, y);
        self.tile_mut(coord)
            .and_then(|tile| tile.plant.take())
            .is_some()
    }

    /// Widen the active area and re-derive locked state.
    ///
    /// Plants stay where they are even if their tile ends up locked.
    pub fn expand_active_area(&mut self) {
        self.active.min_col = self.active.min_col.saturating_sub(EXPANSION_STEP);
        self.active.max_col = (self.active.max_col + EXPANSION_STEP).min(self.cols.saturating_sub(1));
        self.update_locked_state();
    }

    fn update_locked_state(&mut self) {
        let active = self.active;
        for tile in &mut self.tiles {
            if tile.kind == TileKind::Path {
                continue;
            }
            if !active.contains_col(tile.coord.col as usize) {
                tile.kind = TileKind::Locked;
            } else if tile.kind == TileKind::Locked {
                tile.kind = TileKind::Empty;
            }
        }
    }

    /// Tick every plant; projectiles they fire are appended to `fired`
    pub fn update(&mut self, dt_ms: f32, enemies: &[Enemy], clock_ms: f64, fired: &mut Vec<Projectile>) {
        let tile_size = self.tile_size;
        for tile in &mut self.tiles {
            if let Some(plant) = tile.plant.as_mut() {
                if let Some(projectile) = plant.tick(dt_ms, enemies, clock_ms, tile_size) {
                    fired.push(projectile);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, TILE_SIZE};
    use crate::tuning::{Catalog, PlantKind};
    use proptest::prelude::*;

    fn board() -> Grid {
        Grid::new(CANVAS_WIDTH, CANVAS_HEIGHT, TILE_SIZE, 0)
    }

    fn seedling() -> PlantBlueprint {
        PlantBlueprint::new(&Catalog::builtin().plant_or_fallback(PlantKind::Seed), 1, 0)
    }

    fn px(coord: TileCoord) -> (f32, f32) {
        (
            coord.col as f32 * TILE_SIZE + 1.0,
            coord.row as f32 * TILE_SIZE + 1.0,
        )
    }

    #[test]
    fn test_board_layout() {
        let grid = board();
        assert_eq!(grid.cols(), 20);
        assert_eq!(grid.rows(), 15);
        assert_eq!(grid.path_row(), 7);
        assert_eq!(grid.active_area(), ActiveArea { min_col: 5, max_col: 15 });

        // Path row is never locked, even outside the active area
        for col in 0..20 {
            let tile = grid.tile(TileCoord::new(col, 7)).unwrap();
            assert_eq!(tile.kind, TileKind::Path);
        }
        assert_eq!(grid.tile(TileCoord::new(0, 0)).unwrap().kind, TileKind::Locked);
        assert_eq!(grid.tile(TileCoord::new(5, 0)).unwrap().kind, TileKind::Empty);
        assert_eq!(grid.tile(TileCoord::new(16, 0)).unwrap().kind, TileKind::Locked);
    }

    #[test]
    fn test_expansion_tech_widens_initial_area() {
        let grid = Grid::new(CANVAS_WIDTH, CANVAS_HEIGHT, TILE_SIZE, 2);
        assert_eq!(grid.active_area(), ActiveArea { min_col: 3, max_col: 17 });

        let grid = Grid::new(CANVAS_WIDTH, CANVAS_HEIGHT, TILE_SIZE, 9);
        assert_eq!(grid.active_area(), ActiveArea { min_col: 0, max_col: 19 });
    }

    #[test]
    fn test_straight_path_along_row() {
        let grid = board();
        let path = grid.find_path(TileCoord::new(0, 7), TileCoord::new(19, 7));
        assert_eq!(path.len(), 20);
        assert!(path.iter().all(|c| c.row == 7));
        assert_eq!(path.first(), Some(&TileCoord::new(0, 7)));
        assert_eq!(path.last(), Some(&TileCoord::new(19, 7)));
    }

    #[test]
    fn test_path_off_board_is_empty() {
        let grid = board();
        assert!(grid.find_path(TileCoord::new(-1, 0), TileCoord::new(3, 3)).is_empty());
        assert!(grid.find_path(TileCoord::new(0, 0), TileCoord::new(20, 3)).is_empty());
    }

    #[test]
    fn test_path_to_self() {
        let grid = board();
        assert_eq!(
            grid.find_path(TileCoord::new(4, 4), TileCoord::new(4, 4)),
            vec![TileCoord::new(4, 4)]
        );
    }

    #[test]
    fn test_bfs_ignores_plants() {
        let mut grid = board();
        let (x, y) = px(TileCoord::new(6, 6));
        grid.place_plant(x, y, &seedling()).unwrap();
        let path = grid.find_path(TileCoord::new(6, 5), TileCoord::new(6, 8));
        assert_eq!(path.len(), 4);
        assert!(path.contains(&TileCoord::new(6, 6)));
    }

    #[test]
    fn test_place_refusals() {
        let mut grid = board();
        let bp = seedling();

        let (x, y) = px(TileCoord::new(0, 0));
        assert_eq!(grid.place_plant(x, y, &bp), Err(PlacementRefusal::Locked));

        let (x, y) = px(TileCoord::new(8, 7));
        assert_eq!(grid.place_plant(x, y, &bp), Err(PlacementRefusal::OnPath));

        let (x, y) = px(TileCoord::new(8, 6));
        assert_eq!(grid.place_plant(x, y, &bp), Ok(TileCoord::new(8, 6)));
        assert_eq!(grid.place_plant(x, y, &bp), Err(PlacementRefusal::Occupied));

        assert!(matches!(
            grid.place_plant(-5.0, 10.0, &bp),
            Err(PlacementRefusal::OffBoard { .. })
        ));
        assert_eq!(grid.plant_count(), 1);
        assert!(!grid.is_placeable(TileCoord::new(8, 6)));
        assert!(grid.is_placeable(TileCoord::new(9, 6)));
        assert!(!grid.is_placeable(TileCoord::new(9, 7)));
    }

    #[test]
    fn test_eleventh_plant_refused_at_default_cap() {
        let mut grid = board();
        let bp = seedling();
        for col in 5..15 {
            let (x, y) = px(TileCoord::new(col, 2));
            grid.place_plant(x, y, &bp).unwrap();
        }
        assert_eq!(grid.plant_count(), 10);

        let (x, y) = px(TileCoord::new(5, 3));
        assert_eq!(
            grid.place_plant(x, y, &bp),
            Err(PlacementRefusal::PlantCap { cap: 10 })
        );
        assert_eq!(grid.plant_count(), 10);
    }

    #[test]
    fn test_raised_cap_allows_more() {
        let mut grid = board();
        grid.set_plant_cap(14);
        let bp = seedling();
        for col in 5..15 {
            let (x, y) = px(TileCoord::new(col, 2));
            grid.place_plant(x, y, &bp).unwrap();
        }
        for col in 5..9 {
            let (x, y) = px(TileCoord::new(col, 3));
            grid.place_plant(x, y, &bp).unwrap();
        }
        assert_eq!(grid.plant_count(), 14);
        let (x, y) = px(TileCoord::new(9, 3));
        assert!(grid.place_plant(x, y, &bp).is_err());
    }

    #[test]
    fn test_remove_plant() {
        let mut grid = board();
        let (x, y) = px(TileCoord::new(7, 3));
        grid.place_plant(x, y, &seedling()).unwrap();
        assert!(grid.remove_plant_at(x, y));
        assert!(!grid.remove_plant_at(x, y));
        assert_eq!(grid.plant_count(), 0);
    }

    #[test]
    fn test_expand_unlocks_columns() {
        let mut grid = board();
        grid.expand_active_area();
        assert_eq!(grid.active_area(), ActiveArea { min_col: 2, max_col: 18 });
        assert_eq!(grid.tile(TileCoord::new(2, 0)).unwrap().kind, TileKind::Empty);
        assert_eq!(grid.tile(TileCoord::new(1, 0)).unwrap().kind, TileKind::Locked);
        assert_eq!(grid.tile(TileCoord::new(1, 7)).unwrap().kind, TileKind::Path);

        grid.expand_active_area();
        grid.expand_active_area();
        assert_eq!(grid.active_area(), ActiveArea { min_col: 0, max_col: 19 });
    }

    proptest! {
        #[test]
        fn prop_bfs_path_is_shortest_and_adjacent(
            c0 in 0i32..20, r0 in 0i32..15, c1 in 0i32..20, r1 in 0i32..15,
        ) {
            let grid = board();
            let start = TileCoord::new(c0, r0);
            let end = TileCoord::new(c1, r1);
            let path = grid.find_path(start, end);

            prop_assert_eq!(path.len() as u32, start.manhattan(end) + 1);
            prop_assert_eq!(path[0], start);
            prop_assert_eq!(*path.last().unwrap(), end);
            for pair in path.windows(2) {
                prop_assert_eq!(pair[0].manhattan(pair[1]), 1);
            }
        }

        #[test]
        fn prop_bfs_off_board_is_empty(c in 20i32..40, r in -10i32..0) {
            let grid = board();
            prop_assert!(grid.find_path(TileCoord::new(0, 0), TileCoord::new(c, 0)).is_empty());
            prop_assert!(grid.find_path(TileCoord::new(0, r), TileCoord::new(0, 0)).is_empty());
        }
    }
}
