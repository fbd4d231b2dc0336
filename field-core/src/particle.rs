use crate::palette::Rgb;
use crate::types::{GroupId, ParticleIndex};
use glam::Vec2;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Size at creation; never mutated afterwards.
    pub base_size: f32,
    /// Current drawn size, rederived from `base_size` every frame.
    pub size: f32,
    pub opacity: f32,
    pub color: Rgb,
    /// Random phase so particles do not pulse in lockstep.
    pub time_offset: f32,
    pub parent: Option<ParticleIndex>,
    pub group: GroupId,
}

impl Particle {
    pub fn new(
        pos: Vec2,
        size: f32,
        color: Rgb,
        opacity: f32,
        parent: Option<ParticleIndex>,
        group: GroupId,
        time_offset: f32,
    ) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            base_size: size,
            size,
            opacity: opacity.clamp(0.0, 1.0),
            color,
            time_offset,
            parent,
            group,
        }
    }

    pub fn same_group(&self, other: &Particle) -> bool {
        self.group == other.group
    }
}

/// The particle arena: one flat vector, replaced wholesale on regeneration.
///
/// `Particle::parent` values are indices into `particles` and stay valid for
/// as long as this set exists; the set is never partially rebuilt.
#[derive(Debug, Default)]
pub struct ParticleSet {
    pub particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap),
        }
    }

    /// Appends a particle and returns its index within the set.
    pub fn push(&mut self, particle: Particle) -> ParticleIndex {
        let id = self.particles.len();
        self.particles.push(particle);
        id
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Remaps every position from the old surface dimensions to the new ones.
    ///
    /// Each particle keeps its offset from the surface center, scaled by the
    /// per-axis dimension ratio. Relative layout is preserved exactly, so a
    /// resize never perturbs the force balance the way a rebuild would.
    ///
    /// ### Parameters
    /// - `old_dims` - Previous surface dimensions; both axes must be nonzero.
    /// - `new_dims` - New surface dimensions.
    pub fn rescale(&mut self, old_dims: Vec2, new_dims: Vec2) {
        let scale = new_dims / old_dims;
        let old_center = old_dims * 0.5;
        let new_center = new_dims * 0.5;
        for p in &mut self.particles {
            p.pos = new_center + (p.pos - old_center) * scale;
        }
    }
}
