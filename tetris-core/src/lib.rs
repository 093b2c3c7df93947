//! Falling-block puzzle rules.
//!
//! A [`Game`](game::Game) owns the [`Field`](field::Field), the falling piece and the preview
//! piece. Hosts call [`Game::tick`](game::Game::tick) once per frame with that frame's
//! [`Input`](game::Input) and read the state back through the accessors to draw it.

#[macro_use]
extern crate log;

pub mod field;
pub mod game;
pub mod geom;
pub mod piece;
pub mod shape;

pub use field::{Field, Tile};
pub use game::{Game, GameConfig, Horizontal, Input, Tick};
pub use geom::Point2;
pub use piece::Tetromino;
pub use shape::{random_shape, random_type, Catalog, PieceType, Shape, ShapeKind};
