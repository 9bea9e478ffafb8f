//! Tile codes and their feature flags

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Per-tile-code behaviour flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileFeatures(u16);

impl TileFeatures {
    pub const NONE: Self = Self(0);
    /// Solid from every direction
    pub const BLOCK_ALL: Self = Self(1 << 0);
    /// Solid only to movement going up
    pub const BLOCK_UPPER: Self = Self(1 << 1);
    /// Solid only to movement going down (one-way platform)
    pub const BLOCK_LOWER: Self = Self(1 << 2);
    /// Yields a power-up when bumped
    pub const SPECIAL: Self = Self(1 << 3);
    /// Yields a 1-up when bumped
    pub const LIFE: Self = Self(1 << 4);
    pub const BUMPABLE: Self = Self(1 << 5);
    pub const BREAKABLE: Self = Self(1 << 6);
    /// Collected on touch
    pub const PICKABLE: Self = Self(1 << 7);
    pub const ANIMATED: Self = Self(1 << 8);
    /// Launches bullets
    pub const SPAWNER: Self = Self(1 << 9);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TileFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// A tile in the level grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Air,
    Ground,
    Pyramid,
    BulletHead,
    BulletNeck,
    BulletBody,
    Brick,
    CoinBrick,
    QuestionMushroom,
    QuestionCoin,
    /// Spent question block
    Used,
    Coin,
    PipeTopLeft,
    PipeTopRight,
    PipeBodyLeft,
    PipeBodyRight,
    /// One-way platform, standable from above
    Platform,
    PlatformSupport,
    HiddenLife,
    HiddenCoin,
    MushroomBrick,
    LifeBrick,
}

impl Tile {
    /// Stable numeric code, shared by every port and used as event parameter
    pub const fn code(self) -> u8 {
        match self {
            Tile::Air => 0,
            Tile::Ground => 1,
            Tile::Pyramid => 2,
            Tile::BulletHead => 3,
            Tile::BulletNeck => 4,
            Tile::BulletBody => 5,
            Tile::Brick => 6,
            Tile::CoinBrick => 7,
            Tile::QuestionMushroom => 8,
            Tile::QuestionCoin => 11,
            Tile::Used => 14,
            Tile::Coin => 15,
            Tile::PipeTopLeft => 18,
            Tile::PipeTopRight => 19,
            Tile::PipeBodyLeft => 20,
            Tile::PipeBodyRight => 21,
            Tile::Platform => 43,
            Tile::PlatformSupport => 47,
            Tile::HiddenLife => 48,
            Tile::HiddenCoin => 49,
            Tile::MushroomBrick => 50,
            Tile::LifeBrick => 51,
        }
    }

    pub const fn features(self) -> TileFeatures {
        use TileFeatures as F;
        match self {
            Tile::Air | Tile::PlatformSupport => F::NONE,
            Tile::Ground
            | Tile::Pyramid
            | Tile::Used
            | Tile::PipeTopLeft
            | Tile::PipeTopRight
            | Tile::PipeBodyLeft
            | Tile::PipeBodyRight
            | Tile::BulletNeck
            | Tile::BulletBody => F::BLOCK_ALL,
            Tile::BulletHead => F::BLOCK_ALL.union(F::SPAWNER),
            Tile::Brick => F::BLOCK_ALL.union(F::BREAKABLE),
            Tile::CoinBrick => F::BLOCK_ALL.union(F::BUMPABLE),
            Tile::QuestionMushroom => F::BLOCK_ALL
                .union(F::SPECIAL)
                .union(F::BUMPABLE)
                .union(F::ANIMATED),
            Tile::QuestionCoin => F::BLOCK_ALL.union(F::BUMPABLE).union(F::ANIMATED),
            Tile::Coin => F::PICKABLE.union(F::ANIMATED),
            Tile::Platform => F::BLOCK_LOWER,
            Tile::HiddenLife => F::BLOCK_UPPER.union(F::LIFE).union(F::BUMPABLE),
            Tile::HiddenCoin => F::BLOCK_UPPER.union(F::BUMPABLE),
            Tile::MushroomBrick => F::BLOCK_ALL.union(F::SPECIAL).union(F::BUMPABLE),
            Tile::LifeBrick => F::BLOCK_ALL.union(F::LIFE).union(F::BUMPABLE),
        }
    }

    /// Whether moving into this tile with vertical velocity `ya` is obstructed.
    /// Horizontal motion is only stopped by fully solid tiles.
    pub fn blocks(self, ya: f32) -> bool {
        let features = self.features();
        features.contains(TileFeatures::BLOCK_ALL)
            || (ya < 0.0 && features.contains(TileFeatures::BLOCK_UPPER))
            || (ya > 0.0 && features.contains(TileFeatures::BLOCK_LOWER))
    }

    pub fn is_pipe(self) -> bool {
        matches!(
            self,
            Tile::PipeTopLeft | Tile::PipeTopRight | Tile::PipeBodyLeft | Tile::PipeBodyRight
        )
    }

    pub fn is_pipe_left(self) -> bool {
        matches!(self, Tile::PipeTopLeft | Tile::PipeBodyLeft)
    }
}
