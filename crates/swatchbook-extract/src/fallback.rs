//! Curated palettes served when live extraction is unavailable.

use rand::seq::SliceRandom;

/// Palettes used when image extraction fails.
const EXTRACTION_PALETTES: &[[&str; 5]] = &[
    ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57"],
    ["#FF9FF3", "#54A0FF", "#5F27CD", "#00D2D3", "#FF9F43"],
    ["#FF6348", "#FF4757", "#747D8C", "#A4B0BE", "#57606F"],
    ["#2ED573", "#FFA502", "#FF6348", "#FF4757", "#5352ED"],
    ["#70A1FF", "#5352ED", "#FF4757", "#FF6348", "#2ED573"],
];

/// Palettes used when the random palette API fails.
const RANDOM_PALETTES: &[[&str; 5]] = &[
    ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57"],
    ["#FF9FF3", "#54A0FF", "#5F27CD", "#00D2D3", "#FF9F43"],
    ["#FF6348", "#FF4757", "#747D8C", "#A4B0BE", "#57606F"],
    ["#2ED573", "#FFA502", "#FF6348", "#FF4757", "#5352ED"],
    ["#70A1FF", "#5352ED", "#FF4757", "#FF6348", "#2ED573"],
    ["#6C5CE7", "#74B9FF", "#0DBEDC", "#00B894", "#FDCB6E"],
    ["#E17055", "#D63031", "#74B9FF", "#0984E3", "#6C5CE7"],
    ["#FD79A8", "#FDCB6E", "#E17055", "#00B894", "#74B9FF"],
    ["#00CEC9", "#55EFC4", "#FD79A8", "#E84393", "#A29BFE"],
    ["#FF7675", "#FD79A8", "#FDCB6E", "#55EFC4", "#74B9FF"],
    ["#636E72", "#2D3436", "#00B894", "#00CEC9", "#55EFC4"],
    ["#A29BFE", "#6C5CE7", "#FD79A8", "#E84393", "#FF7675"],
    ["#FAB1A0", "#E17055", "#00CEC9", "#55EFC4", "#FDCB6E"],
    ["#FF7675", "#74B9FF", "#55EFC4", "#FDCB6E", "#FD79A8"],
    ["#DDA0DD", "#98FB98", "#87CEEB", "#F0E68C", "#FFA07A"],
];

/// A fixed table of 5-color palettes with uniform random selection.
///
/// Selection is random, not derived from the image: two calls for the same
/// image may return different palettes.
#[derive(Debug, Clone, Copy)]
pub struct FallbackPalettes {
    table: &'static [[&'static str; 5]],
}

impl FallbackPalettes {
    /// Table for failed image extraction.
    pub const fn extraction() -> Self {
        Self {
            table: EXTRACTION_PALETTES,
        }
    }

    /// Larger table for failed random palette generation.
    pub const fn random() -> Self {
        Self {
            table: RANDOM_PALETTES,
        }
    }

    /// Pick one palette uniformly at random.
    pub fn pick(&self) -> Vec<String> {
        self.table
            .choose(&mut rand::thread_rng())
            .unwrap_or(&EXTRACTION_PALETTES[0])
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    /// Number of palettes in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether `colors` is one of this table's palettes.
    pub fn contains(&self, colors: &[String]) -> bool {
        self.table
            .iter()
            .any(|p| p.len() == colors.len() && p.iter().zip(colors).all(|(a, b)| *a == b.as_str()))
    }
}

impl Default for FallbackPalettes {
    fn default() -> Self {
        Self::extraction()
    }
}
