//! Falling pieces.

use crate::field::Field;
use crate::geom::Point2;
use crate::shape::{PieceType, Shape, ShapeKind};
use serde::{Deserialize, Serialize};

/// A tetromino: a shape placed at an anchor, in some color.
///
/// All transformations return a new piece, so a candidate placement can be tested against the
/// field before it replaces the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tetromino {
    pos: Point2<isize>,
    shape: Shape,
    piece_type: PieceType,
}

impl Tetromino {
    pub fn new(pos: Point2<isize>, shape: Shape, piece_type: PieceType) -> Tetromino {
        Tetromino {
            pos,
            shape,
            piece_type,
        }
    }

    /// Returns the anchor position.
    pub fn pos(&self) -> Point2<isize> {
        self.pos
    }

    /// Returns the shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the piece type.
    pub fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    /// Iterates over the field positions this piece occupies.
    pub fn positions(&self) -> impl Iterator<Item = Point2<isize>> {
        let pos = self.pos;
        let shape = self.shape;
        (0..4).map(move |i| pos + shape.offsets()[i])
    }

    /// Returns true if any tile is outside the side walls, below the floor, or on a filled tile.
    ///
    /// Tiles above the top row never collide.
    pub fn colliding(&self, field: &Field) -> bool {
        self.positions().any(|p| field.blocks(p))
    }

    /// Returns this piece moved by the given offset.
    pub fn translated(&self, dir: Point2<isize>) -> Tetromino {
        Tetromino {
            pos: self.pos + dir,
            ..*self
        }
    }

    /// Returns this piece placed at another anchor.
    pub fn moved_to(&self, pos: Point2<isize>) -> Tetromino {
        Tetromino { pos, ..*self }
    }

    /// Returns this piece turned a quarter clockwise about its anchor.
    pub fn rotated(&self) -> Tetromino {
        Tetromino {
            shape: self.shape.rotated(),
            ..*self
        }
    }

    /// Returns the distinct rows this piece occupies, highest first.
    pub fn rows_descending(&self) -> Vec<isize> {
        let mut rows: Vec<isize> = self.positions().map(|p| p.y).collect();
        rows.sort_unstable_by(|a, b| b.cmp(a));
        rows.dedup();
        rows
    }

    /// Returns the shape kind, if the piece has not been rotated away from its catalog shape.
    pub fn kind(&self) -> Option<ShapeKind> {
        self.shape.kind()
    }
}

#[cfg(test)]
fn piece(kind: ShapeKind, x: isize, y: isize) -> Tetromino {
    Tetromino::new((x, y).into(), kind.shape(), PieceType::Blue)
}

#[test]
fn positions_are_anchor_plus_offsets() {
    let t = piece(ShapeKind::T, 4, 19);
    let positions: Vec<(isize, isize)> = t.positions().map(Into::into).collect();
    assert_eq!(positions, vec![(3, 19), (4, 19), (5, 19), (4, 20)]);
}

#[test]
fn colliding_matches_bounds_and_tiles() {
    let mut field = Field::new(10, 20);

    assert!(!piece(ShapeKind::I, 1, 0).colliding(&field));
    // left wall
    assert!(piece(ShapeKind::I, 0, 5).colliding(&field));
    // right wall
    assert!(piece(ShapeKind::I, 8, 5).colliding(&field));
    assert!(!piece(ShapeKind::I, 7, 5).colliding(&field));
    // floor
    assert!(piece(ShapeKind::O, 4, 0).colliding(&field));
    assert!(!piece(ShapeKind::O, 4, 1).colliding(&field));
    // the ceiling is open
    assert!(!piece(ShapeKind::O, 4, 25).colliding(&field));

    field.set_cell(5, 3, PieceType::Red);
    assert!(piece(ShapeKind::O, 4, 4).colliding(&field));
    assert!(!piece(ShapeKind::O, 4, 5).colliding(&field));
    assert!(!piece(ShapeKind::O, 6, 4).colliding(&field));
}

#[test]
fn transforms_do_not_touch_the_original() {
    let j = piece(ShapeKind::J, 4, 10);
    let moved = j.translated((-1, 0).into());
    let rotated = j.rotated();

    assert_eq!(j.pos(), Point2::new(4, 10));
    assert_eq!(j.kind(), Some(ShapeKind::J));
    assert_eq!(moved.pos(), Point2::new(3, 10));
    assert_eq!(moved.shape(), j.shape());
    assert_eq!(moved.piece_type(), j.piece_type());
    assert_eq!(rotated.pos(), j.pos(), "rotation moved the anchor");
    assert_ne!(rotated.shape(), j.shape());
    assert_eq!(j.moved_to((0, 0).into()).shape(), j.shape());
}

#[test]
fn rotation_four_times_restores_piece() {
    for kind in ShapeKind::all() {
        let p = piece(kind, 5, 10);
        let turned = p.rotated().rotated().rotated().rotated();
        assert_eq!(turned, p);
    }
    let o = piece(ShapeKind::O, 5, 10);
    assert_eq!(o.rotated(), o);
}

#[test]
fn rows_are_distinct_and_descending() {
    assert_eq!(piece(ShapeKind::I, 4, 3).rows_descending(), vec![3]);
    assert_eq!(piece(ShapeKind::T, 4, 3).rows_descending(), vec![4, 3]);
    assert_eq!(
        piece(ShapeKind::I, 4, 3).rotated().rows_descending(),
        vec![4, 3, 2, 1]
    );
}
