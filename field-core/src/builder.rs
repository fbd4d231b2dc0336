//! Maps progress values into a fresh particle population.
//!
//! One cluster per progress item with a nonzero value: a large "center"
//! particle near the surface center, orbited by one child particle per
//! progress point. When the active population falls short of the target
//! floor, neutral filler particles keep the field visually busy.

use crate::config::SimConfig;
use crate::palette::{FILLER_COLOR, Palette};
use crate::particle::{Particle, ParticleSet};
use glam::Vec2;
use rand::Rng;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

/// Progress values by item identifier. A `BTreeMap` so that cluster
/// ordinals are assigned in a deterministic (sorted-key) order and the
/// serialized snapshot used for change detection is stable.
pub type ProgressMap = BTreeMap<String, u32>;

/// A freshly built particle set together with its density scale.
#[derive(Debug)]
pub struct Population {
    pub particles: ParticleSet,
    /// Global size/padding multiplier in `(0, 1]`; shrinks as the total
    /// node count grows so dense populations still find room to settle.
    pub scale: f32,
}

fn polar_offset(radius: f32, rng: &mut impl Rng) -> Vec2 {
    let angle = rng.random_range(0.0..TAU);
    let dist = rng.random_range(0.0..radius);
    Vec2::new(angle.cos(), angle.sin()) * dist
}

/// Builds the full particle set for a progress mapping.
///
/// Clusters are created in sorted key order. An item with progress zero, or
/// whose identifier resolves to no color family, contributes nothing — the
/// latter is logged and skipped so the field never renders an undefined
/// style. Progress values are clamped to 100.
///
/// The scale coefficient is `min(1, K / sqrt(total))` over the total node
/// count (active progress plus fillers); it multiplies every base size, and
/// the force phase applies it to the separation padding. Degenerate input
/// (nothing active, filler floor zero) yields an empty set.
///
/// ### Parameters
/// - `progress` - Item identifier → progress value.
/// - `palette` - Style configuration resolving items to color families.
/// - `dims` - Current surface dimensions.
/// - `cfg` - Tuning constants (spawn radii, sizes, population floor).
/// - `rng` - Random source; pass a seeded rng for reproducible output.
pub fn build_population(
    progress: &ProgressMap,
    palette: &Palette,
    dims: Vec2,
    cfg: &SimConfig,
    rng: &mut impl Rng,
) -> Population {
    let center = dims * 0.5;

    let mut active = Vec::with_capacity(progress.len());
    for (item, &value) in progress {
        let value = value.min(100);
        if value == 0 {
            continue;
        }
        match palette.family_for_item(item) {
            Some(family) => active.push((value, family)),
            None => {
                tracing::warn!(item, "no color family for item; skipping cluster");
            }
        }
    }

    let node_count: u32 = active.iter().map(|(value, _)| value).sum();
    let filler_count = (cfg.target_population as u32).saturating_sub(node_count);
    let total = node_count + filler_count;

    let scale = if total == 0 {
        1.0
    } else {
        (cfg.crowding_k / (total as f32).sqrt()).min(1.0)
    };

    let mut particles = ParticleSet::with_capacity(active.len() + total as usize);

    for (ordinal, &(value, family)) in active.iter().enumerate() {
        let group = ordinal as i32;

        let center_pos = center + polar_offset(cfg.center_spawn_radius, rng);
        let center_index = particles.push(Particle::new(
            center_pos,
            cfg.center_size_factor * cfg.node_size * scale,
            Palette::pick_particle_color(family, rng),
            1.0,
            None,
            group,
            rng.random_range(0.0..TAU),
        ));

        for _ in 0..value {
            let pos = center_pos + polar_offset(cfg.child_spawn_radius, rng);
            particles.push(Particle::new(
                pos,
                cfg.node_size * scale,
                Palette::pick_particle_color(family, rng),
                1.0,
                Some(center_index),
                group,
                rng.random_range(0.0..TAU),
            ));
        }
    }

    // Fillers gather around a secondary focal point at quarter dimensions,
    // each with a group of its own so nothing pairs up with them.
    let focal = center * 0.5;
    for i in 0..filler_count {
        let pos = focal + polar_offset(cfg.child_spawn_radius, rng);
        particles.push(Particle::new(
            pos,
            cfg.node_size * scale,
            FILLER_COLOR,
            1.0,
            None,
            -1 - i as i32,
            rng.random_range(0.0..TAU),
        ));
    }

    tracing::debug!(
        clusters = active.len(),
        nodes = node_count,
        fillers = filler_count,
        scale,
        "built particle population"
    );

    Population { particles, scale }
}
