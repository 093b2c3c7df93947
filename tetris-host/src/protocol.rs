use core::fmt;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tetris_core::{Game, Input, Tetromino, Tick, Tile};

/// Field tiles, serialized as one compact string (one character per tile, bottom row first).
#[derive(Debug, Clone, PartialEq)]
pub struct TileSerde(Vec<Tile>);

impl TileSerde {
    #[cfg(test)]
    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }
}

impl From<Vec<Tile>> for TileSerde {
    fn from(this: Vec<Tile>) -> Self {
        Self(this)
    }
}

impl Serialize for TileSerde {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut serialized = String::with_capacity(self.0.len());
        for tile in &self.0 {
            tile.stringify(&mut serialized);
        }
        serializer.serialize_str(&serialized)
    }
}

impl<'a> Deserialize<'a> for TileSerde {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        deserializer.deserialize_str(TileVisitor)
    }
}

struct TileVisitor;

impl<'de> Visitor<'de> for TileVisitor {
    type Value = TileSerde;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a tile list (which is just a string)")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let mut cursor = 0;
        let mut tiles = Vec::with_capacity(s.len());
        while cursor < s.len() {
            let (tile, l) =
                Tile::parse_from_str(&s[cursor..]).map_err(|_| E::custom("invalid tile list"))?;
            tiles.push(tile);
            cursor += l;
        }
        Ok(TileSerde(tiles))
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    pub width: usize,
    pub height: usize,
    pub tiles: TileSerde,
    pub current: Option<Tetromino>,
    pub next: Option<Tetromino>,
    pub tick: Tick,
    pub lines_cleared: usize,
    pub topped_out: bool,
}

impl FieldState {
    pub fn of<R>(game: &Game<R>) -> FieldState {
        FieldState {
            width: game.field().width(),
            height: game.field().height(),
            tiles: game.field().tiles().clone().into(),
            current: game.current_piece().copied(),
            next: game.next_piece().copied(),
            tick: game.tick_count(),
            lines_cleared: game.lines_cleared(),
            topped_out: game.is_topped_out(),
        }
    }
}

/// One line of an input script: the input held on a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScriptEntry {
    pub tick: Tick,
    #[serde(default)]
    pub input: Input,
}

/// Reasons an input script can be rejected.
#[derive(Debug)]
pub enum ScriptError {
    Parse(serde_json::Error),
    Unsorted { index: usize, tick: Tick },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScriptError::Parse(err) => write!(f, "invalid script: {}", err),
            ScriptError::Unsorted { index, tick } => write!(
                f,
                "script entry {} (tick {}) comes before an earlier tick",
                index, tick
            ),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<serde_json::Error> for ScriptError {
    fn from(this: serde_json::Error) -> Self {
        ScriptError::Parse(this)
    }
}

/// Parses an input script. Entries must be sorted by tick.
pub fn parse_script(text: &str) -> Result<Vec<ScriptEntry>, ScriptError> {
    let entries: Vec<ScriptEntry> = serde_json::from_str(text)?;
    for (index, pair) in entries.windows(2).enumerate() {
        if pair[1].tick < pair[0].tick {
            return Err(ScriptError::Unsorted {
                index: index + 1,
                tick: pair[1].tick,
            });
        }
    }
    Ok(entries)
}
