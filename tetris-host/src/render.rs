//! Text rendering of a game.

use tetris_core::{Game, PieceType, Tile};

/// Returns the glyph drawn for a tile of the given type.
fn glyph(piece_type: PieceType) -> char {
    match piece_type {
        PieceType::Blue => 'B',
        PieceType::DarkGray => 'D',
        PieceType::Gray => 'G',
        PieceType::Green => 'N',
        PieceType::LightBlue => 'L',
        PieceType::Orange => 'O',
        PieceType::Pink => 'P',
        PieceType::Purple => 'U',
        PieceType::Red => 'R',
        PieceType::Red2 => 'E',
        PieceType::White => 'W',
    }
}

/// Draws the field with the falling piece on top, top row first, framed by walls.
///
/// Parts of the falling piece above the top row are not drawn.
pub fn render_text<R>(game: &Game<R>) -> String {
    let field = game.field();
    let width = field.width();
    let height = field.height();

    let mut rows = vec![vec!['.'; width]; height];
    for y in 0..height {
        for x in 0..width {
            if let Some(Tile::Piece(ty)) = field.get_tile(x, y) {
                rows[y][x] = glyph(ty);
            }
        }
    }
    if let Some(piece) = game.current_piece() {
        for p in piece.positions() {
            if p.x >= 0 && p.y >= 0 && (p.x as usize) < width && (p.y as usize) < height {
                rows[p.y as usize][p.x as usize] = glyph(piece.piece_type()).to_ascii_lowercase();
            }
        }
    }

    let mut out = String::with_capacity((width + 3) * (height + 1));
    for row in rows.iter().rev() {
        out.push('|');
        out.extend(row.iter());
        out.push_str("|\n");
    }
    out.push('+');
    out.extend(std::iter::repeat('-').take(width));
    out.push_str("+\n");
    out
}

#[test]
fn renders_field_and_piece() {
    use rand::rngs::mock::StepRng;
    use tetris_core::{GameConfig, Input};

    let config = GameConfig {
        width: 4,
        height: 3,
        spawn_anchor: (1, 1).into(),
        ticks_per_second: 1,
        ..GameConfig::default()
    };
    let mut game = Game::new(config, StepRng::new(0, 0));
    assert_eq!(render_text(&game), "|....|\n|....|\n|....|\n+----+\n");

    // the first piece (a blue I) spawns on tick 1, in row 1
    game.tick(&Input::default());
    game.tick(&Input::default());
    assert_eq!(render_text(&game), "|....|\n|bbbb|\n|....|\n+----+\n");
}
