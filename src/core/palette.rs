//! Display colors for rendered regions
//!
//! The vector encoder asks a [`Palette`] for one fill color per region. Any
//! scheme works as long as neighboring regions are unlikely to share a color.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};

use crate::core::region::Region;

/// Channel range kept away from black and white so fills stay readable
const CHANNEL_MIN: u8 = 64;
const CHANNEL_MAX: u8 = 192;

/// An sRGB fill color, rendered as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DisplayColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for DisplayColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Strategy assigning a fill color to each rendered region
pub trait Palette {
    fn color_for(&mut self, region: &Region) -> DisplayColor;
}

/// Random mid-tone colors from a seeded generator.
///
/// The same seed yields the same color sequence, so documents stay stable
/// between runs as long as the region order does.
pub struct RandomPalette {
    rng: StdRng,
}

impl RandomPalette {
    pub const DEFAULT_SEED: u64 = 0x6275_7474_6572_666c;

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPalette {
    fn default() -> Self {
        Self::with_seed(Self::DEFAULT_SEED)
    }
}

impl Palette for RandomPalette {
    fn color_for(&mut self, _region: &Region) -> DisplayColor {
        DisplayColor::new(
            self.rng.random_range(CHANNEL_MIN..=CHANNEL_MAX),
            self.rng.random_range(CHANNEL_MIN..=CHANNEL_MAX),
            self.rng.random_range(CHANNEL_MIN..=CHANNEL_MAX),
        )
    }
}

/// Colors derived from the region id alone.
///
/// A region keeps its color across documents and levels regardless of the
/// draw order.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashPalette;

impl Palette for HashPalette {
    fn color_for(&mut self, region: &Region) -> DisplayColor {
        // splitmix64 finalizer
        let mut z = region.color.wrapping_add(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;

        let span = u64::from(CHANNEL_MAX - CHANNEL_MIN) + 1;
        let channel = |shift: u32| CHANNEL_MIN + ((z >> shift) % span) as u8;
        DisplayColor::new(channel(0), channel(16), channel(32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range(color: DisplayColor) -> bool {
        [color.r, color.g, color.b]
            .iter()
            .all(|c| (CHANNEL_MIN..=CHANNEL_MAX).contains(c))
    }

    #[test]
    fn test_display_color_hex() {
        assert_eq!(DisplayColor::new(64, 128, 192).to_string(), "#4080c0");
        assert_eq!(DisplayColor::new(0, 10, 255).to_string(), "#000aff");
        assert_eq!(
            serde_json::to_string(&DisplayColor::new(255, 0, 1)).unwrap(),
            "\"#ff0001\""
        );
    }

    #[test]
    fn test_random_palette_is_seeded() {
        let region = Region::new(1, [0]);
        let mut a = RandomPalette::with_seed(42);
        let mut b = RandomPalette::with_seed(42);
        for _ in 0..16 {
            let color = a.color_for(&region);
            assert_eq!(color, b.color_for(&region));
            assert!(in_range(color));
        }
    }

    #[test]
    fn test_random_palette_varies() {
        let region = Region::new(1, [0]);
        let mut palette = RandomPalette::default();
        let colors: std::collections::HashSet<_> =
            (0..32).map(|_| palette.color_for(&region)).collect();
        assert!(colors.len() > 16);
    }

    #[test]
    fn test_hash_palette_depends_on_color_only() {
        let mut palette = HashPalette;
        let a = palette.color_for(&Region::new(5, [1, 2, 3]));
        let b = palette.color_for(&Region::new(5, [9]));
        let c = palette.color_for(&Region::new(6, [1, 2, 3]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(in_range(a) && in_range(c));
    }
}
