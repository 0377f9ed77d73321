//! Game board representation: categories, cells and the hexagonal grid.
//!
//! This module contains:
//! - The six fixed trivia categories
//! - Cells (category, re-roll, center) and their occupants
//! - The hexagon-shaped board built over a square backing grid
//! - Occupancy tracking and per-player display symbols

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Trivia categories. Each one is a wedge of a player's pie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Geography,
    History,
    Sports,
    Science,
    ArtsAndLiterature,
    Entertainment,
}

impl Category {
    /// All categories, in board assignment order
    pub const ALL: [Category; 6] = [
        Category::Geography,
        Category::History,
        Category::Sports,
        Category::Science,
        Category::ArtsAndLiterature,
        Category::Entertainment,
    ];

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Geography => "Geography",
            Category::History => "History",
            Category::Sports => "Sports",
            Category::Science => "Science & Nature",
            Category::ArtsAndLiterature => "Arts & Literature",
            Category::Entertainment => "Entertainment",
        }
    }

    /// Wedge color
    pub fn color(&self) -> &'static str {
        match self {
            Category::Geography => "Blue",
            Category::History => "Yellow",
            Category::Sports => "Orange",
            Category::Science => "Green",
            Category::ArtsAndLiterature => "Red",
            Category::Entertainment => "Pink",
        }
    }

    /// One-letter symbol used when drawing the board
    pub fn symbol(&self) -> char {
        match self {
            Category::Geography => 'G',
            Category::History => 'H',
            Category::Sports => 'S',
            Category::Science => 'N',
            Category::ArtsAndLiterature => 'A',
            Category::Entertainment => 'E',
        }
    }

    /// Position of this category in [`Category::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Category::Geography => 0,
            Category::History => 1,
            Category::Sports => 2,
            Category::Science => 3,
            Category::ArtsAndLiterature => 4,
            Category::Entertainment => 5,
        }
    }

    /// Parse from a display name or identifier, ignoring case
    pub fn parse(name: &str) -> Option<Category> {
        let wanted = name.trim();
        Category::ALL.into_iter().find(|cat| {
            cat.display_name().eq_ignore_ascii_case(wanted)
                || format!("{cat:?}").eq_ignore_ascii_case(wanted)
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Errors raised while building a board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Board radius must be between 1 and {}, got {0}", Board::MAX_RADIUS)]
    InvalidRadius(u32),
}

/// A single playable cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Question category (None only for the center)
    pub category: Option<Category>,
    /// Landing here grants another action instead of a question
    pub is_reroll: bool,
    /// The winning cell
    pub is_center: bool,
    /// Display symbol of the player standing here
    pub occupant: Option<String>,
}

impl Cell {
    fn category_cell(category: Category, is_reroll: bool) -> Self {
        Self {
            category: Some(category),
            is_reroll,
            is_center: false,
            occupant: None,
        }
    }

    fn center() -> Self {
        Self {
            category: None,
            is_reroll: false,
            is_center: true,
            occupant: None,
        }
    }

    /// Symbol drawn for an empty cell
    pub fn symbol(&self) -> char {
        if self.is_center {
            'C'
        } else if self.is_reroll {
            '*'
        } else {
            self.category.map(|c| c.symbol()).unwrap_or('?')
        }
    }
}

/// The hexagonal board.
///
/// Topology is fixed at construction; only occupancy changes afterwards.
#[derive(Debug, Clone)]
pub struct Board {
    radius: u32,
    /// Side length of the square backing grid (2 * radius + 1)
    dimension: i32,
    /// Row-major backing grid, None outside the hexagon
    cells: Vec<Option<Cell>>,
    center: HexCoord,
    /// Player identifier to display symbol
    symbols: HashMap<String, String>,
    next_symbol: u32,
}

impl Board {
    /// Default board radius
    pub const DEFAULT_RADIUS: u32 = 3;

    /// Largest radius a board can be built with
    pub const MAX_RADIUS: u32 = 50;

    /// Reject radii outside `1..=MAX_RADIUS`
    pub fn check_radius(radius: u32) -> Result<(), BoardError> {
        if (1..=Self::MAX_RADIUS).contains(&radius) {
            Ok(())
        } else {
            Err(BoardError::InvalidRadius(radius))
        }
    }

    /// Build a board of the given radius.
    ///
    /// Categories are dealt round-robin in row-major order, skipping the
    /// center. Cells one ring inside the border (hex distance `radius - 1`)
    /// are re-roll cells, so a radius 1 board has none.
    pub fn new(radius: u32) -> Result<Self, BoardError> {
        Self::check_radius(radius)?;
        let r = i32::try_from(radius).map_err(|_| BoardError::InvalidRadius(radius))?;
        let dimension = 2 * r + 1;
        let center = HexCoord::new(r, r);
        let center_cube = center.to_cube();

        let mut cells = Vec::with_capacity((dimension * dimension) as usize);
        let mut dealt = 0usize;

        for row in 0..dimension {
            for col in 0..dimension {
                let coord = HexCoord::new(row, col);
                let cube = coord.to_cube();
                // Doubled distance: |dx| + |dy| + |dz| == 2 * hex distance
                let doubled = (cube.x - center_cube.x).abs()
                    + (cube.y - center_cube.y).abs()
                    + (cube.z - center_cube.z).abs();

                if doubled > 2 * r {
                    cells.push(None);
                } else if coord == center {
                    cells.push(Some(Cell::center()));
                } else {
                    let category = Category::ALL[dealt % Category::ALL.len()];
                    dealt += 1;
                    let is_reroll = doubled == 2 * r - 2;
                    cells.push(Some(Cell::category_cell(category, is_reroll)));
                }
            }
        }

        Ok(Self {
            radius,
            dimension,
            cells,
            center,
            symbols: HashMap::new(),
            next_symbol: 1,
        })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Coordinate of the center cell
    pub fn center(&self) -> HexCoord {
        self.center
    }

    fn index_of(&self, coord: &HexCoord) -> Option<usize> {
        let in_range = |v: i32| (0..self.dimension).contains(&v);
        if in_range(coord.row) && in_range(coord.col) {
            Some((coord.row * self.dimension + coord.col) as usize)
        } else {
            None
        }
    }

    /// Bounds-checked lookup; None for out-of-grid or excluded coordinates
    pub fn cell_at(&self, coord: &HexCoord) -> Option<&Cell> {
        self.index_of(coord).and_then(|i| self.cells[i].as_ref())
    }

    fn cell_at_mut(&mut self, coord: &HexCoord) -> Option<&mut Cell> {
        match self.index_of(coord) {
            Some(i) => self.cells[i].as_mut(),
            None => None,
        }
    }

    /// Whether the coordinate is a playable cell
    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.cell_at(coord).is_some()
    }

    /// Iterate over all playable cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (HexCoord, &Cell)> + '_ {
        let dimension = self.dimension;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let i = i as i32;
            cell.as_ref()
                .map(|c| (HexCoord::new(i / dimension, i % dimension), c))
        })
    }

    /// Number of playable cells (3r² + 3r + 1)
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Neighbors of `coord` that are on the board, clockwise from North.
    /// Empty if `coord` itself is not on the board.
    pub fn neighbors_on_board(&self, coord: &HexCoord) -> Vec<HexCoord> {
        if !self.contains(coord) {
            return Vec::new();
        }
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.contains(n))
            .collect()
    }

    /// Hex distance from `coord` to the center
    pub fn distance_to_center(&self, coord: &HexCoord) -> u32 {
        coord.distance_to(&self.center)
    }

    /// Whether `coord` is one of the six corners of the hexagon
    pub fn is_corner(&self, coord: &HexCoord) -> bool {
        if !self.contains(coord) || self.distance_to_center(coord) != self.radius {
            return false;
        }
        let cube = coord.to_cube();
        let center = self.center.to_cube();
        cube.x == center.x || cube.y == center.y || cube.z == center.z
    }

    /// The six corner cells, in row-major order
    pub fn corners(&self) -> Vec<HexCoord> {
        self.cells()
            .map(|(coord, _)| coord)
            .filter(|coord| self.is_corner(coord))
            .collect()
    }

    /// Display symbol for a player, if they have been placed before
    pub fn symbol_for(&self, player_id: &str) -> Option<&str> {
        self.symbols.get(player_id).map(String::as_str)
    }

    /// Put a player's symbol on a cell. The symbol is assigned on first
    /// placement and stays stable for the rest of the game.
    /// Returns false if the coordinate is not on the board.
    pub fn place_player(&mut self, player_id: &str, coord: &HexCoord) -> bool {
        if !self.contains(coord) {
            return false;
        }
        let symbol = match self.symbols.get(player_id) {
            Some(symbol) => symbol.clone(),
            None => {
                let symbol = format!("P{}", self.next_symbol);
                self.next_symbol += 1;
                self.symbols.insert(player_id.to_string(), symbol.clone());
                symbol
            }
        };
        if let Some(cell) = self.cell_at_mut(coord) {
            cell.occupant = Some(symbol);
        }
        true
    }

    /// Clear the occupant of a cell
    pub fn remove_player(&mut self, coord: &HexCoord) {
        if let Some(cell) = self.cell_at_mut(coord) {
            cell.occupant = None;
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.dimension {
            for col in 0..self.dimension {
                match self.cell_at(&HexCoord::new(row, col)) {
                    None => write!(f, "    ")?,
                    Some(cell) => match &cell.occupant {
                        Some(symbol) => write!(f, "[{symbol:<2}]")?,
                        None => write!(f, "[{:<2}]", cell.symbol())?,
                    },
                }
            }
            writeln!(f)?;
        }
        write!(f, "Legend: C=Center, *=Roll again")?;
        for category in Category::ALL {
            write!(f, ", {}={}", category.symbol(), category.display_name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cell_count_matches_hexagon() {
        for radius in 1..=8u32 {
            let board = Board::new(radius).unwrap();
            let r = radius as usize;
            assert_eq!(board.cell_count(), 3 * r * r + 3 * r + 1, "radius {radius}");
        }
    }

    #[test]
    fn test_zero_radius_rejected() {
        assert_eq!(Board::new(0).unwrap_err(), BoardError::InvalidRadius(0));
    }

    #[test]
    fn test_oversized_radius_rejected() {
        for radius in [Board::MAX_RADIUS + 1, 100_000, 3_000_000_000, u32::MAX] {
            assert_eq!(
                Board::new(radius).unwrap_err(),
                BoardError::InvalidRadius(radius)
            );
        }
        let largest = Board::new(Board::MAX_RADIUS).unwrap();
        assert_eq!(largest.radius(), Board::MAX_RADIUS);
    }

    #[test]
    fn test_cells_within_radius_of_center() {
        let board = Board::new(4).unwrap();
        for (coord, _) in board.cells() {
            assert!(board.distance_to_center(&coord) <= 4);
        }
    }

    #[test]
    fn test_exactly_one_center_without_category() {
        for radius in 1..=5 {
            let board = Board::new(radius).unwrap();
            let centers: Vec<_> = board.cells().filter(|(_, c)| c.is_center).collect();
            assert_eq!(centers.len(), 1);
            let (coord, cell) = centers[0];
            assert_eq!(coord, board.center());
            assert_eq!(cell.category, None);
            assert!(!cell.is_reroll);

            for (_, cell) in board.cells().filter(|(_, c)| !c.is_center) {
                assert!(cell.category.is_some());
            }
        }
    }

    #[test]
    fn test_categories_round_robin_in_row_major_order() {
        let board = Board::new(3).unwrap();
        let dealt: Vec<Category> = board
            .cells()
            .filter(|(_, c)| !c.is_center)
            .map(|(_, c)| c.category.unwrap())
            .collect();
        for (i, category) in dealt.iter().enumerate() {
            assert_eq!(*category, Category::ALL[i % 6]);
        }
    }

    #[test]
    fn test_reroll_ring_is_one_inside_border() {
        let board = Board::new(3).unwrap();
        let rerolls: Vec<_> = board.cells().filter(|(_, c)| c.is_reroll).collect();
        // Ring at distance 2 has 12 cells
        assert_eq!(rerolls.len(), 12);
        for (coord, _) in rerolls {
            assert_eq!(board.distance_to_center(&coord), 2);
        }
    }

    #[test]
    fn test_radius_one_has_no_reroll_cells() {
        let board = Board::new(1).unwrap();
        assert_eq!(board.cells().filter(|(_, c)| c.is_reroll).count(), 0);
    }

    #[test]
    fn test_radius_two_reroll_ring_surrounds_center() {
        let board = Board::new(2).unwrap();
        let rerolls: HashSet<_> = board
            .cells()
            .filter(|(_, c)| c.is_reroll)
            .map(|(coord, _)| coord)
            .collect();
        let around_center: HashSet<_> = board.center().neighbors().into_iter().collect();
        assert_eq!(rerolls, around_center);
    }

    #[test]
    fn test_cell_at_bounds() {
        let board = Board::new(2).unwrap();
        assert!(board.cell_at(&HexCoord::new(-1, 0)).is_none());
        assert!(board.cell_at(&HexCoord::new(0, 5)).is_none());
        assert!(board.cell_at(&HexCoord::new(2, 2)).is_some());
    }

    #[test]
    fn test_neighbors_on_board_are_adjacent() {
        let board = Board::new(3).unwrap();
        for (coord, _) in board.cells() {
            let neighbors = board.neighbors_on_board(&coord);
            assert!(!neighbors.is_empty());
            for n in neighbors {
                assert!(board.contains(&n));
                assert_eq!(coord.distance_to(&n), 1);
            }
        }
        assert_eq!(board.neighbors_on_board(&board.center()).len(), 6);
        assert!(board.neighbors_on_board(&HexCoord::new(-4, -4)).is_empty());
    }

    #[test]
    fn test_distances_bounded_by_diameter() {
        let board = Board::new(3).unwrap();
        let coords: Vec<_> = board.cells().map(|(c, _)| c).collect();
        for a in &coords {
            assert_eq!(a.distance_to(a), 0);
            for b in &coords {
                assert!(a.distance_to(b) <= 6);
                assert_eq!(a.distance_to(b), b.distance_to(a));
            }
        }
    }

    #[test]
    fn test_six_corners() {
        for radius in 1..=4 {
            let board = Board::new(radius).unwrap();
            let corners = board.corners();
            assert_eq!(corners.len(), 6);
            for corner in &corners {
                assert_eq!(board.distance_to_center(corner), radius);
                assert_eq!(board.neighbors_on_board(corner).len(), 3);
            }
        }
    }

    #[test]
    fn test_player_symbols_are_stable() {
        let mut board = Board::new(2).unwrap();
        let center = board.center();
        assert!(board.place_player("ana@example.com", &center));
        assert!(board.place_player("ben@example.com", &center));
        assert_eq!(board.symbol_for("ana@example.com"), Some("P1"));
        assert_eq!(board.symbol_for("ben@example.com"), Some("P2"));

        let elsewhere = center.neighbors()[0];
        board.remove_player(&center);
        assert!(board.place_player("ana@example.com", &elsewhere));
        assert_eq!(board.symbol_for("ana@example.com"), Some("P1"));
        assert_eq!(board.cell_at(&elsewhere).unwrap().occupant.as_deref(), Some("P1"));
        assert_eq!(board.cell_at(&center).unwrap().occupant, None);
    }

    #[test]
    fn test_place_off_board_is_rejected() {
        let mut board = Board::new(1).unwrap();
        assert!(!board.place_player("x", &HexCoord::new(9, 9)));
        assert_eq!(board.symbol_for("x"), None);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("history"), Some(Category::History));
        assert_eq!(Category::parse(" Science & Nature "), Some(Category::Science));
        assert_eq!(Category::parse("artsandliterature"), Some(Category::ArtsAndLiterature));
        assert_eq!(Category::parse("cooking"), None);
        for (i, cat) in Category::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
        }
    }

    #[test]
    fn test_render_marks_center_and_players() {
        let mut board = Board::new(1).unwrap();
        let rendered = board.to_string();
        assert!(rendered.contains("[C ]"));

        let center = board.center();
        board.place_player("p", &center);
        let rendered = board.to_string();
        assert!(rendered.contains("[P1]"));
        assert!(!rendered.contains("[C ]"));
    }
}
