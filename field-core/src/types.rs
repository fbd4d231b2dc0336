/// Index of a particle within a [`crate::particle::ParticleSet`].
///
/// This is an index into `ParticleSet::particles`, and is only meaningful
/// within the lifetime of a given set. Sets are replaced wholesale on
/// regeneration, so an index must never be carried across a rebuild.
pub type ParticleIndex = usize;

/// Cluster identifier shared by all particles of one progress item.
///
/// Non-negative values are cluster ordinals assigned by the population
/// builder. Filler particles carry unique negative values, so a filler is
/// never "same cluster" with any other particle.
pub type GroupId = i32;
