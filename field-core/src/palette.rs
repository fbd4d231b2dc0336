use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A color-family token carried by each particle. The renderer combines it
/// with the particle's opacity to build the final fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// One color family: the tints consumed by the surrounding page chrome plus
/// the candidate particle colors the builder picks from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorFamily {
    pub icon: Rgb,
    pub button: Rgb,
    pub particles: Vec<Rgb>,
}

/// Style configuration: color families keyed by name, plus the mapping from
/// progress-item identifier to family key.
///
/// An item whose identifier resolves to no family has no defined style; the
/// population builder skips such clusters entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub families: HashMap<String, ColorFamily>,
    pub item_keys: HashMap<String, String>,
}

impl Palette {
    /// Resolves an item identifier to its color family, if any.
    pub fn family_for_item(&self, item: &str) -> Option<&ColorFamily> {
        self.families.get(self.item_keys.get(item)?)
    }

    /// Picks one of the family's candidate particle colors uniformly.
    pub fn pick_particle_color(family: &ColorFamily, rng: &mut impl Rng) -> Rgb {
        if family.particles.is_empty() {
            return FILLER_COLOR;
        }
        family.particles[rng.random_range(0..family.particles.len())]
    }
}

/// Neutral gray used for filler particles.
pub const FILLER_COLOR: Rgb = Rgb(230, 230, 230);

impl Default for Palette {
    /// The built-in six-family palette and item mapping.
    fn default() -> Self {
        let mut families = HashMap::new();
        families.insert(
            "blue".to_string(),
            ColorFamily {
                icon: Rgb(0xdb, 0xea, 0xfe),
                button: Rgb(0x3b, 0x82, 0xf6),
                particles: vec![Rgb(59, 130, 246), Rgb(96, 165, 250)],
            },
        );
        families.insert(
            "green".to_string(),
            ColorFamily {
                icon: Rgb(0xd1, 0xfa, 0xe5),
                button: Rgb(0x10, 0xb9, 0x81),
                particles: vec![Rgb(16, 185, 129), Rgb(52, 211, 153)],
            },
        );
        families.insert(
            "orange".to_string(),
            ColorFamily {
                icon: Rgb(0xfe, 0xf3, 0xc7),
                button: Rgb(0xf5, 0x9e, 0x0b),
                particles: vec![Rgb(245, 158, 11), Rgb(251, 191, 36)],
            },
        );
        families.insert(
            "purple".to_string(),
            ColorFamily {
                icon: Rgb(0xed, 0xe9, 0xfe),
                button: Rgb(0x8b, 0x5c, 0xf6),
                particles: vec![Rgb(139, 92, 246), Rgb(167, 139, 250)],
            },
        );
        families.insert(
            "pink".to_string(),
            ColorFamily {
                icon: Rgb(0xfc, 0xe7, 0xf3),
                button: Rgb(0xec, 0x48, 0x99),
                particles: vec![Rgb(236, 72, 153), Rgb(244, 114, 182)],
            },
        );
        families.insert(
            "cyan".to_string(),
            ColorFamily {
                icon: Rgb(0xcf, 0xfa, 0xfe),
                button: Rgb(0x06, 0xb6, 0xd4),
                particles: vec![Rgb(6, 182, 212), Rgb(34, 211, 238)],
            },
        );

        let item_keys = [
            ("python1", "blue"),
            ("python2", "green"),
            ("math101", "orange"),
            ("datascience", "purple"),
            ("webdev", "pink"),
            ("algorithms", "cyan"),
        ]
        .into_iter()
        .map(|(item, key)| (item.to_string(), key.to_string()))
        .collect();

        Self {
            families,
            item_keys,
        }
    }
}
