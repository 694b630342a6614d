//! Tile generation for seeding and refill
//!
//! The engine never touches a global RNG. Every fresh tile comes from a
//! `TileSource`, so a game is fully reproducible from its seed and tests can
//! script the exact refill sequence.

use crate::tile::TileKind;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Supplier of fresh candy colours
pub trait TileSource {
    /// Next colour, uniformly distributed over `1..=palette`
    fn next_kind(&mut self, palette: u8) -> TileKind;
}

impl<S: TileSource + ?Sized> TileSource for &mut S {
    fn next_kind(&mut self, palette: u8) -> TileKind {
        (**self).next_kind(palette)
    }
}

/// Seeded ChaCha source, same seed gives the same game
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed drawn from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl TileSource for SeededSource {
    fn next_kind(&mut self, palette: u8) -> TileKind {
        TileKind::Colored(self.rng.gen_range(1..=palette.max(1)))
    }
}

/// Replays a fixed colour sequence, wrapping around at the end.
/// Colours outside the palette are folded back into it.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    colors: Vec<u8>,
    next: usize,
}

impl SequenceSource {
    pub fn new(colors: Vec<u8>) -> Self {
        Self { colors, next: 0 }
    }

    /// Number of colours handed out so far
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl TileSource for SequenceSource {
    fn next_kind(&mut self, palette: u8) -> TileKind {
        if self.colors.is_empty() {
            return TileKind::Colored(1);
        }
        let color = self.colors[self.next % self.colors.len()];
        self.next += 1;
        TileKind::Colored((color.max(1) - 1) % palette.max(1) + 1)
    }
}
