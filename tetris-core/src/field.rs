//! Tetris playfields.

use crate::geom::Point2;
use crate::shape::PieceType;
use std::convert::TryInto;

/// Types of tiles in a playfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// An empty tile.
    Empty,
    /// A tile left behind by a locked piece.
    Piece(PieceType),
}

impl Tile {
    /// Returns true if this tile is filled.
    pub fn is_filled(&self) -> bool {
        match self {
            Tile::Piece(_) => true,
            Tile::Empty => false,
        }
    }

    pub fn stringify(&self, s: &mut String) {
        match self {
            Tile::Empty => s.push(' '),
            Tile::Piece(ty) => ty.stringify(s),
        }
    }

    pub fn parse_from_str(s: &str) -> Result<(Self, usize), ()> {
        let first = s.chars().next().ok_or(())?;
        if first == ' ' {
            Ok((Tile::Empty, 1))
        } else if let Some(ty) = PieceType::from_char(first) {
            Ok((Tile::Piece(ty), 1))
        } else {
            Err(())
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

/// A Tetris playfield.
///
/// Tiles are stored row by row, starting at the floor (`y = 0`).
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field width in tiles.
    width: usize,
    /// Field height in tiles.
    height: usize,
    /// Field tiles.
    tiles: Vec<Tile>,
}

impl Field {
    pub const WIDTH: usize = 10;
    pub const HEIGHT: usize = 20;

    pub fn new(width: usize, height: usize) -> Field {
        Field {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
        }
    }

    /// Returns the width of the playfield.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the playfield.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns all tiles.
    pub fn tiles(&self) -> &Vec<Tile> {
        &self.tiles
    }

    /// Returns the tile at the specified coordinates.
    pub fn get_tile(&self, x: usize, y: usize) -> Option<Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y * self.width + x).copied()
    }

    /// Returns true if the tile at the given position is filled.
    ///
    /// Anything outside the stored tiles counts as empty.
    pub fn is_filled(&self, x: isize, y: isize) -> bool {
        match (x.try_into(), y.try_into()) {
            (Ok(x), Ok(y)) => self.get_tile(x, y).map_or(false, |tile| tile.is_filled()),
            _ => false,
        }
    }

    /// Returns true if a piece tile at this position would collide: it lies outside the side
    /// walls, below the floor, or on a filled tile. There is no ceiling.
    pub fn blocks(&self, p: Point2<isize>) -> bool {
        p.x < 0 || p.y < 0 || p.x >= self.width as isize || self.is_filled(p.x, p.y)
    }

    /// Marks a tile as filled with the given piece type.
    ///
    /// Returns false if the tile lies above the top row, in which case nothing is written.
    pub fn set_cell(&mut self, x: isize, y: isize, piece_type: PieceType) -> bool {
        debug_assert!(
            x >= 0 && y >= 0 && (x as usize) < self.width,
            "cell ({}, {}) is outside the field",
            x,
            y
        );
        debug_assert!(!self.is_filled(x, y), "cell ({}, {}) is already filled", x, y);

        match (TryInto::<usize>::try_into(x), TryInto::<usize>::try_into(y)) {
            (Ok(x), Ok(y)) if x < self.width && y < self.height => {
                self.tiles[y * self.width + x] = Tile::Piece(piece_type);
                true
            }
            _ => false,
        }
    }

    /// Returns true if every tile in row `y` is filled.
    pub fn is_line_full(&self, y: usize) -> bool {
        y < self.height
            && (0..self.width).all(|x| self.get_tile(x, y).map_or(false, |tile| tile.is_filled()))
    }

    /// Removes row `y`, moving every row above it down by one and adding an empty row on top.
    pub fn clear_line(&mut self, y: usize) {
        if y >= self.height {
            return;
        }
        let start = y * self.width;
        self.tiles.drain(start..start + self.width);
        self.tiles
            .extend(std::iter::repeat(Tile::Empty).take(self.width));
    }

    /// Returns the number of filled tiles.
    pub fn filled_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_filled()).count()
    }
}

impl Default for Field {
    fn default() -> Field {
        Field::new(Field::WIDTH, Field::HEIGHT)
    }
}

#[cfg(test)]
fn fill_row_except(field: &mut Field, y: isize, gap: Option<isize>) {
    for x in 0..field.width() as isize {
        if Some(x) != gap {
            field.set_cell(x, y, PieceType::Gray);
        }
    }
}

#[test]
fn new_field_is_empty() {
    let field = Field::default();
    assert_eq!(field.width(), 10);
    assert_eq!(field.height(), 20);
    assert_eq!(field.tiles().len(), 200);
    assert_eq!(field.filled_count(), 0);
    assert_eq!(field.get_tile(9, 19), Some(Tile::Empty));
    assert_eq!(field.get_tile(10, 0), None);
    assert_eq!(field.get_tile(0, 20), None);
}

#[test]
fn far_rows_are_out_of_range() {
    let field = Field::default();
    assert_eq!(field.get_tile(0, usize::MAX), None);
    // would wrap back into the tiles if the row were not checked
    assert_eq!(field.get_tile(0, usize::MAX / 10 + 1), None);
    assert_eq!(field.get_tile(usize::MAX, usize::MAX), None);
}

#[test]
fn blocks_walls_and_floor_but_not_ceiling() {
    let mut field = Field::new(10, 20);
    assert!(field.blocks((-1, 5).into()));
    assert!(field.blocks((10, 5).into()));
    assert!(field.blocks((3, -1).into()));
    assert!(!field.blocks((3, 0).into()));
    assert!(!field.blocks((3, 20).into()));
    assert!(!field.blocks((3, 400).into()));

    assert!(field.set_cell(3, 0, PieceType::Pink));
    assert!(field.blocks((3, 0).into()));
    assert_eq!(field.get_tile(3, 0), Some(Tile::Piece(PieceType::Pink)));
}

#[test]
fn set_cell_above_top_is_rejected() {
    let mut field = Field::new(10, 20);
    assert!(!field.set_cell(4, 20, PieceType::White));
    assert_eq!(field.filled_count(), 0);
}

#[test]
fn line_full_detection() {
    let mut field = Field::new(10, 20);
    fill_row_except(&mut field, 5, Some(3));
    assert!(!field.is_line_full(5));
    field.set_cell(3, 5, PieceType::Red);
    assert!(field.is_line_full(5));
    assert!(!field.is_line_full(4));
    assert!(!field.is_line_full(20));
}

#[test]
fn clear_line_shifts_rows_above_down() {
    let mut field = Field::new(10, 20);
    fill_row_except(&mut field, 5, None);
    field.set_cell(2, 4, PieceType::Blue);
    field.set_cell(7, 6, PieceType::Green);
    field.set_cell(0, 19, PieceType::Orange);

    field.clear_line(5);

    assert_eq!(field.tiles().len(), 200);
    assert_eq!(field.filled_count(), 3);
    assert_eq!(field.get_tile(2, 4), Some(Tile::Piece(PieceType::Blue)));
    assert_eq!(field.get_tile(7, 5), Some(Tile::Piece(PieceType::Green)));
    assert_eq!(field.get_tile(0, 18), Some(Tile::Piece(PieceType::Orange)));
    for x in 0..10 {
        assert_eq!(field.get_tile(x, 19), Some(Tile::Empty));
    }
}

#[test]
fn clearing_then_refilling_keeps_heights() {
    let mut field = Field::new(10, 20);
    fill_row_except(&mut field, 0, None);
    let before = (field.width(), field.height(), field.tiles().len());

    field.clear_line(0);
    fill_row_except(&mut field, 0, None);

    assert_eq!((field.width(), field.height(), field.tiles().len()), before);
    assert!(field.is_line_full(0));
}

#[test]
fn clearing_rows_highest_first() {
    let mut field = Field::new(4, 6);
    fill_row_except(&mut field, 1, None);
    fill_row_except(&mut field, 3, None);
    field.set_cell(0, 2, PieceType::Purple);
    field.set_cell(1, 4, PieceType::Red2);

    for y in [3, 1].iter() {
        if field.is_line_full(*y) {
            field.clear_line(*y);
        }
    }

    assert_eq!(field.filled_count(), 2);
    assert_eq!(field.get_tile(0, 1), Some(Tile::Piece(PieceType::Purple)));
    assert_eq!(field.get_tile(1, 2), Some(Tile::Piece(PieceType::Red2)));
}

#[test]
fn tile_codes() {
    let mut s = String::new();
    Tile::Empty.stringify(&mut s);
    Tile::Piece(PieceType::Red).stringify(&mut s);
    assert_eq!(s, " i");
    assert_eq!(Tile::parse_from_str(&s), Ok((Tile::Empty, 1)));
    assert_eq!(
        Tile::parse_from_str(&s[1..]),
        Ok((Tile::Piece(PieceType::Red), 1))
    );
    assert_eq!(Tile::parse_from_str("#"), Err(()));
    assert_eq!(Tile::parse_from_str(""), Err(()));
}
