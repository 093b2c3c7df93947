//! Piece shapes and piece types.

use crate::geom::{Matrix2, Point2};
use core::str::FromStr;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Four tile offsets relative to a piece's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape([Point2<isize>; 4]);

impl Shape {
    pub const fn new(offsets: [Point2<isize>; 4]) -> Shape {
        Shape(offsets)
    }

    /// Returns the tile offsets.
    pub fn offsets(&self) -> &[Point2<isize>; 4] {
        &self.0
    }

    /// Iterates over all tile offsets.
    pub fn iter_tiles(&self) -> impl Iterator<Item = Point2<isize>> + '_ {
        self.0.iter().copied()
    }

    /// Returns the catalog entry this shape was taken from, if it has not been rotated since.
    pub fn kind(&self) -> Option<ShapeKind> {
        ShapeKind::all().into_iter().find(|kind| kind.shape() == *self)
    }

    /// Returns this shape turned a quarter clockwise about the anchor.
    ///
    /// The O shape is a fixed point, since its tiles are not centered on the anchor and turning
    /// them would shift the square around.
    pub fn rotated(&self) -> Shape {
        if *self == ShapeKind::O.shape() {
            return *self;
        }

        let cw = Matrix2::cw();
        let mut offsets = self.0;
        for offset in offsets.iter_mut() {
            *offset = cw * *offset;
        }
        Shape(offsets)
    }
}

/// The tetromino catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl ShapeKind {
    /// Returns a vector containing all shape kinds.
    pub fn all() -> Vec<ShapeKind> {
        vec![
            ShapeKind::I,
            ShapeKind::J,
            ShapeKind::L,
            ShapeKind::O,
            ShapeKind::S,
            ShapeKind::T,
            ShapeKind::Z,
        ]
    }

    /// Returns the unrotated shape.
    pub fn shape(&self) -> Shape {
        use ShapeKind::*;

        let offsets = match self {
            I => [(-1, 0), (0, 0), (1, 0), (2, 0)],
            J => [(-1, 1), (-1, 0), (0, 0), (1, 0)],
            L => [(-1, 0), (0, 0), (1, 0), (1, 1)],
            O => [(0, 0), (1, 0), (0, -1), (1, -1)],
            S => [(-1, -1), (0, -1), (0, 0), (1, 0)],
            T => [(-1, 0), (0, 0), (1, 0), (0, 1)],
            Z => [(-1, 0), (0, 0), (0, -1), (1, -1)],
        };
        Shape([
            offsets[0].into(),
            offsets[1].into(),
            offsets[2].into(),
            offsets[3].into(),
        ])
    }
}

impl FromStr for ShapeKind {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "I" => Ok(Self::I),
            "J" => Ok(Self::J),
            "L" => Ok(Self::L),
            "O" => Ok(Self::O),
            "S" => Ok(Self::S),
            "T" => Ok(Self::T),
            "Z" => Ok(Self::Z),
            _ => Err(()),
        }
    }
}

/// Which shapes new pieces are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    /// All seven tetrominoes, with a next-piece preview.
    Full,
    /// Only the I piece, no preview.
    Reduced,
}

impl Catalog {
    /// Returns the shape kinds in this catalog.
    pub fn kinds(&self) -> Vec<ShapeKind> {
        match self {
            Catalog::Full => ShapeKind::all(),
            Catalog::Reduced => vec![ShapeKind::I],
        }
    }

    /// Returns true if the next piece is rolled ahead of time and shown as a preview.
    pub fn has_preview(&self) -> bool {
        *self == Catalog::Full
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::Full
    }
}

/// Piece types, which are just the tile colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Blue,
    DarkGray,
    Gray,
    Green,
    LightBlue,
    Orange,
    Pink,
    Purple,
    Red,
    Red2,
    White,
}

impl PieceType {
    pub const ALL: [PieceType; 11] = [
        PieceType::Blue,
        PieceType::DarkGray,
        PieceType::Gray,
        PieceType::Green,
        PieceType::LightBlue,
        PieceType::Orange,
        PieceType::Pink,
        PieceType::Purple,
        PieceType::Red,
        PieceType::Red2,
        PieceType::White,
    ];

    /// Returns the color name (which is also the block sprite name).
    pub fn name(&self) -> &'static str {
        match self {
            PieceType::Blue => "blue",
            PieceType::DarkGray => "darkgray",
            PieceType::Gray => "gray",
            PieceType::Green => "green",
            PieceType::LightBlue => "lightblue",
            PieceType::Orange => "orange",
            PieceType::Pink => "pink",
            PieceType::Purple => "purple",
            PieceType::Red => "red",
            PieceType::Red2 => "red2",
            PieceType::White => "white",
        }
    }

    /// Pushes the single-character code of this type (`a` through `k`).
    pub fn stringify(&self, s: &mut String) {
        s.push((b'a' + *self as u8) as char);
    }

    /// Parses a single-character code written by `stringify`.
    pub fn from_char(c: char) -> Option<PieceType> {
        if c.is_ascii_lowercase() {
            Self::ALL.get((c as u8 - b'a') as usize).copied()
        } else {
            None
        }
    }
}

impl FromStr for PieceType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        Self::ALL
            .iter()
            .find(|t| t.name() == s)
            .copied()
            .ok_or(())
    }
}

/// Picks a shape uniformly from the catalog.
pub fn random_shape<R: Rng + ?Sized>(rng: &mut R, catalog: Catalog) -> Shape {
    let kinds = catalog.kinds();
    kinds[rng.gen_range(0, kinds.len())].shape()
}

/// Picks a piece type uniformly.
pub fn random_type<R: Rng + ?Sized>(rng: &mut R) -> PieceType {
    PieceType::ALL[rng.gen_range(0, PieceType::ALL.len())]
}

#[test]
fn rotating_four_times_is_identity() {
    for kind in ShapeKind::all() {
        let shape = kind.shape();
        let mut rotated = shape;
        for _ in 0..4 {
            rotated = rotated.rotated();
        }
        assert_eq!(rotated, shape, "{:?} did not come back after a full turn", kind);
    }
}

#[test]
fn o_shape_does_not_rotate() {
    let o = ShapeKind::O.shape();
    assert_eq!(o.rotated(), o);
    assert_eq!(o.rotated().kind(), Some(ShapeKind::O));
}

#[test]
fn i_shape_rotates_about_anchor() {
    let rotated = ShapeKind::I.shape().rotated();
    let expected: Vec<Point2<isize>> = vec![
        (0, 1).into(),
        (0, 0).into(),
        (0, -1).into(),
        (0, -2).into(),
    ];
    assert_eq!(rotated.iter_tiles().collect::<Vec<_>>(), expected);
    assert_eq!(rotated.kind(), None);
}

#[test]
fn catalog_shapes_are_distinct_tetrominoes() {
    let kinds = ShapeKind::all();
    for (i, a) in kinds.iter().enumerate() {
        let shape = a.shape();
        assert!(shape.iter_tiles().any(|p| p == Point2::new(0, 0)));
        for (j, b) in kinds.iter().enumerate() {
            if i != j {
                assert_ne!(shape, b.shape(), "{:?} and {:?} share a table", a, b);
            }
        }
        assert_eq!(shape.kind(), Some(*a));
        assert_eq!(format!("{:?}", a).parse::<ShapeKind>(), Ok(*a));
    }
}

#[test]
fn piece_type_codes() {
    let mut s = String::new();
    for t in PieceType::ALL.iter() {
        t.stringify(&mut s);
        assert_eq!(t.name().parse::<PieceType>(), Ok(*t));
    }
    assert_eq!(s, "abcdefghijk");
    for (c, t) in s.chars().zip(PieceType::ALL.iter()) {
        assert_eq!(PieceType::from_char(c), Some(*t));
    }
    assert_eq!(PieceType::from_char('l'), None);
    assert_eq!(PieceType::from_char('A'), None);
    assert_eq!("magenta".parse::<PieceType>(), Err(()));
}

#[test]
fn random_selection_is_seedable() {
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let mut zero = StepRng::new(0, 0);
    assert_eq!(random_shape(&mut zero, Catalog::Full), ShapeKind::I.shape());
    assert_eq!(random_type(&mut zero), PieceType::Blue);

    let mut a = StdRng::seed_from_u64(7);
    let mut b = StdRng::seed_from_u64(7);
    for _ in 0..32 {
        assert_eq!(
            random_shape(&mut a, Catalog::Full),
            random_shape(&mut b, Catalog::Full)
        );
        assert_eq!(random_type(&mut a), random_type(&mut b));
    }

    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..32 {
        assert_eq!(random_shape(&mut rng, Catalog::Reduced), ShapeKind::I.shape());
    }
}
