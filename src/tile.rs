//! Tile definitions: candy colours and special effects

use serde::{Deserialize, Serialize};

/// Default number of candy colours
pub const DEFAULT_PALETTE: u8 = 5;

/// The colour of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    /// Colour index, 1..=palette
    Colored(u8),
}

impl TileKind {
    pub fn is_empty(&self) -> bool {
        matches!(self, TileKind::Empty)
    }

    /// All colours of a palette of the given size
    pub fn palette(size: u8) -> impl Iterator<Item = TileKind> {
        (1..=size).map(TileKind::Colored)
    }
}

/// Extra effect carried by a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpecialKind {
    #[default]
    None,
    /// Clears its whole row when activated
    StripedHorizontal,
    /// Clears its whole column when activated
    StripedVertical,
    ColorBomb,
}

impl SpecialKind {
    pub fn is_none(&self) -> bool {
        matches!(self, SpecialKind::None)
    }

    /// Single-letter marker used by the plain board dump
    pub fn marker(&self) -> Option<char> {
        match self {
            SpecialKind::None => None,
            SpecialKind::StripedHorizontal => Some('h'),
            SpecialKind::StripedVertical => Some('v'),
            SpecialKind::ColorBomb => Some('*'),
        }
    }
}

/// A single cell of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub special: SpecialKind,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        kind: TileKind::Empty,
        special: SpecialKind::None,
    };

    /// A plain candy of the given colour
    pub fn colored(color: u8) -> Self {
        Self {
            kind: TileKind::Colored(color),
            special: SpecialKind::None,
        }
    }

    /// A candy of the given colour carrying a special
    pub fn special(color: u8, special: SpecialKind) -> Self {
        Self {
            kind: TileKind::Colored(color),
            special,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    pub fn is_special(&self) -> bool {
        !self.special.is_none()
    }

    pub fn is_color_bomb(&self) -> bool {
        self.special == SpecialKind::ColorBomb
    }

    /// Empty tiles never carry a special
    pub fn is_well_formed(&self) -> bool {
        !(self.is_empty() && self.is_special())
    }
}
