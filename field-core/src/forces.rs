//! Per-frame force and integration phases.
//!
//! The frame pipeline is:
//! 1. [`force_phase`] — accumulate the net force on every particle into a
//!    [`ForceBuffer`], reading positions from a stable snapshot; the same
//!    neighbor scan collects the same-cluster edge list for the renderer.
//! 2. [`integrate_phase`] — apply damped velocities, move particles, and
//!    rederive the pulsing draw size.
//!
//! Forces are never applied while they are being computed, so the order in
//! which particles are visited cannot influence the result.

use crate::config::SimConfig;
use crate::grid::SpatialGrid;
use crate::particle::ParticleSet;
use crate::types::ParticleIndex;
use glam::Vec2;

/// A temporary buffer that accumulates one net force per particle.
///
/// The buffer is sized to the particle set at the start of every frame via
/// [`ForceBuffer::ensure_len`] and cleared in the same call, so it can be
/// reused across frames (and across set rebuilds) without reallocation.
#[derive(Debug, Default)]
pub struct ForceBuffer {
    force: Vec<Vec2>,
}

impl ForceBuffer {
    /// Creates a buffer with the given length, all forces zero.
    pub fn with_len(len: usize) -> Self {
        Self {
            force: vec![Vec2::ZERO; len],
        }
    }

    /// Ensures the buffer has exactly `len` entries and clears all of them.
    ///
    /// ### Parameters
    /// - `len` - Number of particles this buffer must cover.
    pub fn ensure_len(&mut self, len: usize) {
        if self.force.len() != len {
            self.force.resize(len, Vec2::ZERO);
        }
        self.clear();
    }

    /// Resets every accumulated force to zero, keeping the length.
    pub fn clear(&mut self) {
        for f in &mut self.force {
            *f = Vec2::ZERO;
        }
    }

    /// Adds a force contribution for one particle.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: ParticleIndex, f: Vec2) {
        self.force[id] += f;
    }

    /// Returns the accumulated force for one particle.
    #[inline]
    pub fn get(&self, id: ParticleIndex) -> Vec2 {
        self.force[id]
    }

    pub fn len(&self) -> usize {
        self.force.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }
}

/// Input shared by every particle for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// The attraction target, normally the surface center.
    pub center: Vec2,
    /// Pointer position on the surface; `None` produces zero repulsion.
    pub pointer: Option<Vec2>,
    /// Whether a click happened since the previous frame. Widens and
    /// strengthens the repulsion for this frame only.
    pub clicked: bool,
}

/// Grid cell size for the separation interaction range.
///
/// Derived from the widest wanted distance — a cross-cluster pair of two
/// center-sized particles, `3 * padding + 2 * (center_size_factor *
/// node_size)`, all scaled by the density coefficient — so interacting
/// pairs fall in the same or an adjacent cell.
pub fn interaction_cell_size(cfg: &SimConfig, scale: f32) -> f32 {
    cfg.node_size * 2.0 * cfg.center_size_factor * scale
        + cfg.node_distance * scale * cfg.cross_group_padding
}

/// Accumulates the net force on every particle for this frame.
///
/// Three contributions are summed per particle:
///
/// 1. Center attraction, proportional to the offset from `input.center`.
/// 2. Pointer repulsion, linear in `(radius - dist) / radius` inside the
///    repulsion radius, directed away from the pointer. A click uses the
///    widened radius and force for this single frame.
/// 3. Pairwise separation against grid neighbors closer than the wanted
///    distance (`padding + size + other.size`, padding tripled for
///    cross-cluster pairs), apportioned by relative size so the larger
///    particle of a pair is displaced less.
///
/// Exactly coincident pairs have no defined separation direction and
/// contribute nothing.
///
/// While scanning neighbors this also rebuilds `edges`: for each particle,
/// up to `cfg.max_edges_per_particle` same-cluster neighbors within one
/// unit beyond the wanted distance.
///
/// ### Parameters
/// - `set` - The particle set; read-only in this phase.
/// - `grid` - Spatial grid already rebuilt from `set`'s current positions.
/// - `input` - Pointer and center state for this frame.
/// - `cfg` - Tuning constants.
/// - `scale` - The population's density scale coefficient.
/// - `acc` - Force accumulator; resized and cleared here.
/// - `edges` - Edge list output; cleared and refilled here.
pub fn force_phase(
    set: &ParticleSet,
    grid: &SpatialGrid,
    input: &FrameInput,
    cfg: &SimConfig,
    scale: f32,
    acc: &mut ForceBuffer,
    edges: &mut Vec<(ParticleIndex, ParticleIndex)>,
) {
    acc.ensure_len(set.len());
    edges.clear();

    let (repulsion_radius, repulsion_force) = if input.clicked {
        (cfg.click_repulsion_radius, cfg.click_repulsion_force)
    } else {
        (cfg.repulsion_radius, cfg.repulsion_force)
    };
    let base_padding = cfg.node_distance * scale;

    for (i, particle) in set.particles.iter().enumerate() {
        let mut f = cfg.center_attraction * (input.center - particle.pos);

        if let Some(pointer) = input.pointer {
            let away = particle.pos - pointer;
            let dist = away.length();
            if dist < repulsion_radius && dist > 0.0 {
                let strength = repulsion_force * (repulsion_radius - dist) / repulsion_radius;
                f += away / dist * strength;
            }
        }

        let mut edge_count = 0;
        grid.for_each_neighbor(i, particle.pos, |j| {
            let other = &set.particles[j];
            let delta = particle.pos - other.pos;
            let dist2 = delta.length_squared();

            let same_group = particle.same_group(other);
            let padding = base_padding * if same_group { 1.0 } else { cfg.cross_group_padding };
            let wanted = padding + particle.size + other.size;

            if dist2 < wanted * wanted && dist2 > 0.0 {
                let dist = dist2.sqrt();
                let overlap = (wanted - dist) / wanted;
                let strength = cfg.separation_force * overlap;
                // The larger particle of the pair yields less ground.
                let apportioned = strength * other.size / (particle.size + other.size);
                f += delta / dist * apportioned;
            }

            if same_group
                && edge_count < cfg.max_edges_per_particle
                && dist2 < (wanted + 1.0) * (wanted + 1.0)
            {
                edges.push((i, j));
                edge_count += 1;
            }
        });

        acc.add(i, f);
    }
}

/// Applies accumulated forces and advances every particle.
///
/// Runs strictly after [`force_phase`], in a separate pass:
///
/// - `vel = vel * damping + force`
/// - `pos += vel`
/// - `size = base_size * (1 + pulse_amplitude * sin(time * pulse_frequency
///   + time_offset))`, clamped non-negative.
///
/// The pulse is purely cosmetic; it never feeds back into positions.
///
/// ### Parameters
/// - `set` - The particle set to mutate.
/// - `acc` - Forces accumulated by [`force_phase`] for this frame.
/// - `time` - Monotonic frame counter driving the pulse.
/// - `cfg` - Tuning constants.
pub fn integrate_phase(set: &mut ParticleSet, acc: &ForceBuffer, time: f32, cfg: &SimConfig) {
    for (i, particle) in set.particles.iter_mut().enumerate() {
        particle.vel = particle.vel * cfg.damping + acc.get(i);
        particle.pos += particle.vel;

        let pulse = (time * cfg.pulse_frequency + particle.time_offset).sin();
        particle.size = (particle.base_size * (1.0 + cfg.pulse_amplitude * pulse)).max(0.0);
    }
}
