use rand::rngs::StdRng;
use rand::SeedableRng;
use tetris_core::{Catalog, Game, GameConfig, Horizontal, Input, Tetromino, Tile};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(js_name = Game)]
pub struct JsGame(Game<StdRng>);

#[wasm_bindgen(js_name = Tetromino)]
pub struct JsTetromino(Tetromino);

#[wasm_bindgen(js_class = Tetromino)]
impl JsTetromino {
    #[wasm_bindgen(js_name = "type")]
    pub fn piece_type(&self) -> String {
        self.0.piece_type().name().into()
    }

    #[wasm_bindgen(js_name = "posX")]
    pub fn pos_x(&self) -> isize {
        self.0.pos().x
    }

    #[wasm_bindgen(js_name = "posY")]
    pub fn pos_y(&self) -> isize {
        self.0.pos().y
    }

    /// Returns the occupied field positions as a flat `[x0, y0, x1, y1, ...]` list.
    #[wasm_bindgen(js_name = "getTiles")]
    pub fn tiles(&self) -> Box<[isize]> {
        self.0.positions().flat_map(|p| vec![p.x, p.y]).collect()
    }
}

#[wasm_bindgen(js_name = "createGame")]
pub fn create_game(seed: u32, reduced: bool) -> JsGame {
    let config = GameConfig {
        catalog: if reduced {
            Catalog::Reduced
        } else {
            Catalog::Full
        },
        ..GameConfig::default()
    };
    JsGame(Game::new(config, StdRng::seed_from_u64(seed.into())))
}

#[wasm_bindgen(js_class = Game)]
impl JsGame {
    /// Runs one tick. `horizontal` is -1, 0 or 1.
    pub fn tick(&mut self, horizontal: i8, soft_drop: bool, rotate: bool) {
        let input = Input::new(Horizontal::from(horizontal), soft_drop, rotate);
        self.0.tick(&input);
    }

    pub fn reset(&mut self) {
        self.0.reset();
    }

    #[wasm_bindgen(js_name = "getTickCount")]
    pub fn tick_count(&self) -> f64 {
        self.0.tick_count() as f64
    }

    #[wasm_bindgen(js_name = "isToppedOut")]
    pub fn is_topped_out(&self) -> bool {
        self.0.is_topped_out()
    }

    #[wasm_bindgen(js_name = "getLinesCleared")]
    pub fn lines_cleared(&self) -> usize {
        self.0.lines_cleared()
    }

    #[wasm_bindgen(js_name = "getCurrentPiece")]
    pub fn current_piece(&self) -> Option<JsTetromino> {
        self.0.current_piece().map(|x| JsTetromino(*x))
    }

    #[wasm_bindgen(js_name = "getNextPiece")]
    pub fn next_piece(&self) -> Option<JsTetromino> {
        self.0.next_piece().map(|x| JsTetromino(*x))
    }

    #[wasm_bindgen(js_name = "getFieldWidth")]
    pub fn field_width(&self) -> usize {
        self.0.field().width()
    }

    #[wasm_bindgen(js_name = "getFieldHeight")]
    pub fn field_height(&self) -> usize {
        self.0.field().height()
    }

    #[wasm_bindgen(js_name = "getFieldTile")]
    pub fn field_get_tile(&self, x: usize, y: usize) -> JsValue {
        match self.0.field().get_tile(x, y) {
            Some(Tile::Empty) => JsValue::from_str(""),
            Some(Tile::Piece(t)) => JsValue::from_str(t.name()),
            None => JsValue::null(),
        }
    }
}

#[test]
fn game_runs_through_the_bridge() {
    let mut game = create_game(5, false);
    assert!(game.current_piece().is_none());
    let next = game.next_piece().map(|p| p.piece_type());
    assert!(next.is_some());

    for _ in 0..61 {
        game.tick(0, false, false);
    }
    let piece = game.current_piece().unwrap();
    assert_eq!(Some(piece.piece_type()), next);
    assert_eq!((piece.pos_x(), piece.pos_y()), (4, 19));
    assert_eq!(piece.tiles().len(), 8);

    game.reset();
    assert_eq!(game.tick_count(), 0.);
    assert!(create_game(5, true).next_piece().is_none());
}
