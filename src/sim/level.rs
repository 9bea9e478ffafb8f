//! Level text parsing and tile queries
//!
//! A level is a fixed number of equal-width text rows. Each character is a
//! tile, a sprite spawn marker, the player start (`M`) or the exit (`F`).
//! Unknown characters decode as air.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sprite::SpriteType;
use super::tile::{Tile, TileFeatures};
use crate::consts::TILE_SIZE;
use crate::error::LevelError;
use crate::settings::SimConfig;

/// Tile coordinate pair
pub type TilePos = (i32, i32);

/// Row-major grid of tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Air; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Tile at (x, y); anything outside the grid reads as air
    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.index(x, y).map_or(Tile::Air, |i| self.tiles[i])
    }

    /// Replace a tile; writes outside the grid are ignored
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    pub fn features(&self, x: i32, y: i32) -> TileFeatures {
        self.get(x, y).features()
    }

    /// Whether moving by (xa, ya) into tile (x, y) is obstructed
    pub fn is_blocking(&self, x: i32, y: i32, _xa: f32, ya: f32) -> bool {
        self.get(x, y).blocks(ya)
    }

    /// Tile codes, row-major, for renderers
    pub fn codes(&self) -> Vec<u8> {
        self.tiles.iter().map(|t| t.code()).collect()
    }
}

/// Parsed level; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    tiles: TileGrid,
    templates: Vec<Option<SpriteType>>,
    spawn_tile: TilePos,
    exit_tile: TilePos,
    total_coins: u32,
}

impl Level {
    /// Parse level text with the default row count
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        Self::parse_with(text, &SimConfig::default())
    }

    pub fn parse_with(text: &str, config: &SimConfig) -> Result<Self, LevelError> {
        let rows: Vec<Vec<char>> = text.lines().map(|line| line.chars().collect()).collect();
        if rows.iter().all(|row| row.is_empty()) {
            return Err(LevelError::Empty);
        }
        if rows.len() != config.rows {
            return Err(LevelError::RowCount {
                expected: config.rows,
                found: rows.len(),
            });
        }

        let width = rows[0].len();
        if width == 0 || width > config.max_width {
            return Err(LevelError::WidthOutOfRange {
                width,
                max: config.max_width,
            });
        }
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != width)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(LevelError::RaggedRow {
                row,
                expected: width,
                found,
            });
        }

        let height = rows.len();
        let mut tiles = TileGrid::new(width, height);
        let mut templates = vec![None; width * height];
        let mut spawn_tile = None;
        let mut exit_tile = None;
        let mut total_coins = 0;

        for (y, row) in rows.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                let (tx, ty) = (x as i32, y as i32);
                let tile = match c {
                    'M' => {
                        place_marker(&mut spawn_tile, 'M', x, y)?;
                        Tile::Air
                    }
                    'F' => {
                        place_marker(&mut exit_tile, 'F', x, y)?;
                        Tile::Air
                    }
                    'X' => Tile::Ground,
                    '#' => Tile::Pyramid,
                    '%' => Tile::Platform,
                    '|' => Tile::PlatformSupport,
                    '*' => launcher_tile(&rows, x, y),
                    'B' => Tile::BulletHead,
                    'b' => {
                        if y > 0 && rows[y - 1][x] == 'B' {
                            Tile::BulletNeck
                        } else {
                            Tile::BulletBody
                        }
                    }
                    '?' | '@' => Tile::QuestionMushroom,
                    'Q' | '!' => Tile::QuestionCoin,
                    '1' => Tile::HiddenLife,
                    '2' => Tile::HiddenCoin,
                    'D' => Tile::Used,
                    'S' => Tile::Brick,
                    'C' => Tile::CoinBrick,
                    'U' => Tile::MushroomBrick,
                    'L' => Tile::LifeBrick,
                    'o' => {
                        total_coins += 1;
                        Tile::Coin
                    }
                    't' | 'T' => {
                        let tile = pipe_tile(&rows, x, y);
                        if c == 'T' && tile == Tile::PipeTopLeft {
                            templates[y * width + x] = Some(SpriteType::EnemyFlower);
                        }
                        tile
                    }
                    '<' => Tile::PipeTopLeft,
                    '>' => Tile::PipeTopRight,
                    '[' => Tile::PipeBodyLeft,
                    ']' => Tile::PipeBodyRight,
                    other => {
                        if let Some(kind) = enemy_marker(other) {
                            templates[y * width + x] = Some(kind);
                        }
                        Tile::Air
                    }
                };
                tiles.set(tx, ty, tile);
            }
        }

        let spawn_tile = spawn_tile.ok_or(LevelError::MissingMarker { marker: 'M' })?;
        let exit_tile = exit_tile.ok_or(LevelError::MissingMarker { marker: 'F' })?;

        Ok(Self {
            tiles,
            templates,
            spawn_tile,
            exit_tile,
            total_coins,
        })
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    /// Width in pixels
    pub fn pixel_width(&self) -> f32 {
        (self.width() as i32 * TILE_SIZE) as f32
    }

    /// Height in pixels
    pub fn pixel_height(&self) -> f32 {
        (self.height() as i32 * TILE_SIZE) as f32
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn spawn_tile(&self) -> TilePos {
        self.spawn_tile
    }

    pub fn exit_tile(&self) -> TilePos {
        self.exit_tile
    }

    /// Pixel x the player must pass to finish
    pub fn exit_x(&self) -> f32 {
        (self.exit_tile.0 * TILE_SIZE) as f32
    }

    /// Coins placed as tiles in the level text
    pub fn total_coins(&self) -> u32 {
        self.total_coins
    }

    pub fn is_blocking(&self, x: i32, y: i32, xa: f32, ya: f32) -> bool {
        self.tiles.is_blocking(x, y, xa, ya)
    }

    pub fn feature(&self, x: i32, y: i32) -> TileFeatures {
        self.tiles.features(x, y)
    }

    /// Sprite spawned by the marker at (x, y), if any
    pub fn template_at(&self, x: i32, y: i32) -> Option<SpriteType> {
        self.tiles.index(x, y).and_then(|i| self.templates[i])
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn place_marker(
    slot: &mut Option<TilePos>,
    marker: char,
    x: usize,
    y: usize,
) -> Result<(), LevelError> {
    if slot.is_some() {
        return Err(LevelError::DuplicateMarker { marker, x, y });
    }
    *slot = Some((x as i32, y as i32));
    Ok(())
}

fn enemy_marker(c: char) -> Option<SpriteType> {
    match c {
        'g' | 'E' => Some(SpriteType::Goomba),
        'G' => Some(SpriteType::GoombaWinged),
        'r' => Some(SpriteType::RedKoopa),
        'R' => Some(SpriteType::RedKoopaWinged),
        'k' => Some(SpriteType::GreenKoopa),
        'K' => Some(SpriteType::GreenKoopaWinged),
        'y' => Some(SpriteType::Spiky),
        'Y' => Some(SpriteType::SpikyWinged),
        _ => None,
    }
}

/// Stacked `*` cells form a launcher: head, then neck, then body
fn launcher_tile(rows: &[Vec<char>], x: usize, y: usize) -> Tile {
    let above = |dy: usize| y >= dy && rows[y - dy][x] == '*';
    if !above(1) {
        Tile::BulletHead
    } else if !above(2) {
        Tile::BulletNeck
    } else {
        Tile::BulletBody
    }
}

/// Pipe cells pair up left/right along a row; the top row of a pipe gets the rim
fn pipe_tile(rows: &[Vec<char>], x: usize, y: usize) -> Tile {
    let is_pipe = |c: char| c == 't' || c == 'T';
    let run = rows[y][..x]
        .iter()
        .rev()
        .take_while(|&&c| is_pipe(c))
        .count();
    let left = run % 2 == 0;
    let top = y == 0 || !is_pipe(rows[y - 1][x]);
    match (top, left) {
        (true, true) => Tile::PipeTopLeft,
        (true, false) => Tile::PipeTopRight,
        (false, true) => Tile::PipeBodyLeft,
        (false, false) => Tile::PipeBodyRight,
    }
}
