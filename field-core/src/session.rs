//! The simulation session: owns the particle set and its per-frame
//! lifecycle (build, rescale, step).

use crate::builder::{ProgressMap, build_population};
use crate::config::SimConfig;
use crate::forces::{ForceBuffer, FrameInput, force_phase, integrate_phase, interaction_cell_size};
use crate::grid::SpatialGrid;
use crate::palette::Palette;
use crate::particle::ParticleSet;
use crate::types::ParticleIndex;
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A resize event waiting out its debounce window.
#[derive(Debug, Clone, Copy)]
struct PendingResize {
    dims: Vec2,
    deadline: f64,
}

/// Owns everything the particle field needs between frames.
///
/// The session starts uninitialized (zero dimensions, empty set) and enters
/// its running state on the first frame with usable dimensions, at which
/// point the population is built from the current progress mapping. From
/// then on each [`Session::frame`] call:
///
/// 1. Coalesces resize events over a debounce window; a settled resize
///    rescales existing positions affinely instead of rebuilding.
/// 2. Polls the progress mapping; a changed serialized snapshot replaces
///    the whole particle set at current dimensions, an unchanged one is a
///    no-op.
/// 3. Skips simulation entirely while dimensions are degenerate.
/// 4. Otherwise rebuilds the spatial grid, runs the force phase, then the
///    integrate phase.
///
/// The particle set is exclusively owned here: it is element-mutated only
/// inside [`Session::frame`] and wholesale-replaced by builds. Dropping the
/// session cancels the pending debounce with it; there are no detached
/// timers or callbacks.
///
/// ### Fields
/// - `particles` - The current arena; parent indices are valid within it.
/// - `grid` - Spatial hash scratch, rebuilt every simulated frame.
/// - `forces` - Force accumulator scratch, reused across frames.
/// - `edges` - Same-cluster edge list from the last simulated frame.
/// - `scale` - Density scale of the current population.
/// - `dims` - Dimensions the particle positions currently live in.
/// - `last_seen_dims` - Most recent dimensions reported by the host.
/// - `pending_resize` - Debounced resize not yet applied.
/// - `last_snapshot` - Serialized progress mapping of the last build.
/// - `time` - Frame counter driving the size pulse.
/// - `rng` - Random source for builds; seedable for reproducible tests.
#[derive(Debug)]
pub struct Session {
    cfg: SimConfig,
    palette: Palette,
    particles: ParticleSet,
    grid: SpatialGrid,
    forces: ForceBuffer,
    edges: Vec<(ParticleIndex, ParticleIndex)>,
    scale: f32,
    dims: Vec2,
    last_seen_dims: Vec2,
    pending_resize: Option<PendingResize>,
    last_snapshot: Option<String>,
    time: f32,
    rng: StdRng,
}

impl Session {
    pub fn new(palette: Palette, cfg: SimConfig) -> Self {
        Self::with_rng(palette, cfg, StdRng::from_rng(&mut rand::rng()))
    }

    /// A session with a deterministic random source.
    pub fn with_seed(palette: Palette, cfg: SimConfig, seed: u64) -> Self {
        Self::with_rng(palette, cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(palette: Palette, cfg: SimConfig, rng: StdRng) -> Self {
        Self {
            cfg,
            palette,
            particles: ParticleSet::new(),
            grid: SpatialGrid::new(),
            forces: ForceBuffer::with_len(0),
            edges: Vec::new(),
            scale: 1.0,
            dims: Vec2::ZERO,
            last_seen_dims: Vec2::ZERO,
            pending_resize: None,
            last_snapshot: None,
            time: 0.0,
            rng,
        }
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Edges collected by the last simulated frame, for the renderer.
    pub fn edges(&self) -> &[(ParticleIndex, ParticleIndex)] {
        &self.edges
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Dimensions the current particle positions are laid out in.
    pub fn dims(&self) -> Vec2 {
        self.dims
    }

    fn dims_usable(dims: Vec2) -> bool {
        dims.x > 0.0 && dims.y > 0.0
    }

    /// Records a surface-size report from the host.
    ///
    /// The very first usable size is adopted immediately so the initial
    /// build happens without waiting. Any later change (re)starts the
    /// debounce window; a new event before the window elapses replaces the
    /// pending one, so exactly one rescale happens per settled burst.
    pub fn notify_resize(&mut self, dims: Vec2, now: f64) {
        if self.dims == Vec2::ZERO && Self::dims_usable(dims) {
            self.dims = dims;
            self.last_seen_dims = dims;
            self.pending_resize = None;
            return;
        }
        if dims != self.last_seen_dims {
            self.last_seen_dims = dims;
            self.pending_resize = Some(PendingResize {
                dims,
                deadline: now + self.cfg.resize_debounce,
            });
        }
    }

    fn apply_pending_resize(&mut self, now: f64) {
        let Some(pending) = self.pending_resize else {
            return;
        };
        if now < pending.deadline {
            return;
        }
        self.pending_resize = None;

        if !self.particles.is_empty()
            && Self::dims_usable(self.dims)
            && Self::dims_usable(pending.dims)
        {
            tracing::debug!(
                from = ?self.dims,
                to = ?pending.dims,
                "resize settled; rescaling particle positions"
            );
            self.particles.rescale(self.dims, pending.dims);
        }
        self.dims = pending.dims;
    }

    /// Compares the mapping against the last-built snapshot and rebuilds
    /// the population on change. Returns whether a rebuild happened.
    ///
    /// While dimensions are unusable nothing is built and the snapshot is
    /// left untouched, so the change is picked up once a usable size
    /// arrives.
    pub fn set_progress(&mut self, progress: &ProgressMap) -> bool {
        if !Self::dims_usable(self.dims) {
            return false;
        }
        let snapshot = serde_json::to_string(progress).unwrap_or_default();
        if self.last_snapshot.as_deref() == Some(snapshot.as_str()) {
            return false;
        }

        let population =
            build_population(progress, &self.palette, self.dims, &self.cfg, &mut self.rng);
        self.particles = population.particles;
        self.scale = population.scale;
        self.edges.clear();
        self.last_snapshot = Some(snapshot);
        true
    }

    /// Runs one cooperative frame: resize bookkeeping, progress polling,
    /// and — dimensions permitting — one grid/force/integrate step.
    ///
    /// Returns `false` when the simulation step was skipped because the
    /// surface is degenerate; the host should keep scheduling frames.
    ///
    /// ### Parameters
    /// - `dims` - Current surface dimensions as reported by the host.
    /// - `progress` - Current progress mapping (polled every frame).
    /// - `pointer` - Pointer position in surface coordinates, if any.
    /// - `clicked` - Whether a click happened since the last frame.
    /// - `now` - Host clock in seconds, used for the resize debounce.
    pub fn frame(
        &mut self,
        dims: Vec2,
        progress: &ProgressMap,
        pointer: Option<Vec2>,
        clicked: bool,
        now: f64,
    ) -> bool {
        self.notify_resize(dims, now);
        self.apply_pending_resize(now);
        self.set_progress(progress);

        if !Self::dims_usable(self.dims) {
            return false;
        }

        debug_assert!(
            self.particles
                .particles
                .iter()
                .all(|p| p.parent.is_none_or(|i| i < self.particles.len())),
            "parent index escaped its arena generation"
        );

        let input = FrameInput {
            center: self.dims * 0.5,
            pointer,
            clicked,
        };

        self.grid
            .rebuild(&self.particles, interaction_cell_size(&self.cfg, self.scale));
        force_phase(
            &self.particles,
            &self.grid,
            &input,
            &self.cfg,
            self.scale,
            &mut self.forces,
            &mut self.edges,
        );
        integrate_phase(&mut self.particles, &self.forces, self.time, &self.cfg);
        self.time += 1.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn demo_progress(value: u32) -> ProgressMap {
        let mut map = BTreeMap::new();
        map.insert("python1".to_string(), value);
        map
    }

    fn session() -> Session {
        Session::with_seed(Palette::default(), SimConfig::default(), 42)
    }

    const DIMS: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn first_usable_frame_builds_and_simulates() {
        let mut s = session();
        let stepped = s.frame(DIMS, &demo_progress(10), None, false, 0.0);

        assert!(stepped);
        // 1 center + 10 children + 90 fillers.
        assert_eq!(s.particles().len(), 101);
        assert_eq!(s.dims(), DIMS);
    }

    #[test]
    fn unchanged_progress_is_a_no_op() {
        let mut s = session();
        let progress = demo_progress(10);
        s.frame(DIMS, &progress, None, false, 0.0);

        let before: Vec<Vec2> = s.particles().particles.iter().map(|p| p.pos).collect();
        assert!(!s.set_progress(&progress), "identical snapshot must not rebuild");
        let after: Vec<Vec2> = s.particles().particles.iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn changed_progress_replaces_the_whole_set() {
        let mut s = session();
        s.frame(DIMS, &demo_progress(10), None, false, 0.0);
        assert_eq!(s.particles().len(), 101);

        assert!(s.set_progress(&demo_progress(20)));
        // 1 center + 20 children + 80 fillers.
        assert_eq!(s.particles().len(), 101);
        let children = s
            .particles()
            .particles
            .iter()
            .filter(|p| p.parent.is_some())
            .count();
        assert_eq!(children, 20);
    }

    #[test]
    fn degenerate_dims_skip_the_simulation_step() {
        let mut s = session();
        assert!(!s.frame(Vec2::new(0.0, 600.0), &demo_progress(10), None, false, 0.0));
        assert!(s.particles().is_empty());

        // Progress changes while hidden are deferred, not lost.
        assert!(s.frame(DIMS, &demo_progress(10), None, false, 0.1));
        assert_eq!(s.particles().len(), 101);
    }

    #[test]
    fn resize_waits_out_the_debounce_window() {
        let mut s = session();
        s.frame(DIMS, &demo_progress(10), None, false, 0.0);

        let half = Vec2::new(400.0, 300.0);
        s.frame(half, &demo_progress(10), None, false, 1.0);
        assert_eq!(s.dims(), DIMS, "still inside the debounce window");

        s.frame(half, &demo_progress(10), None, false, 1.1);
        assert_eq!(s.dims(), DIMS);

        s.frame(half, &demo_progress(10), None, false, 1.2);
        assert_eq!(s.dims(), half, "window elapsed; resize applied");
    }

    #[test]
    fn new_resize_event_restarts_the_window() {
        let mut s = session();
        s.frame(DIMS, &demo_progress(10), None, false, 0.0);

        s.frame(Vec2::new(400.0, 300.0), &demo_progress(10), None, false, 1.0);
        // A different size arrives before the first window elapses.
        s.frame(Vec2::new(200.0, 150.0), &demo_progress(10), None, false, 1.1);
        s.frame(Vec2::new(200.0, 150.0), &demo_progress(10), None, false, 1.2);
        assert_eq!(s.dims(), DIMS, "second event restarted the window");

        s.frame(Vec2::new(200.0, 150.0), &demo_progress(10), None, false, 1.3);
        assert_eq!(s.dims(), Vec2::new(200.0, 150.0), "only the last size wins");
    }

    #[test]
    fn edges_stay_within_the_current_set() {
        let mut s = session();
        s.frame(DIMS, &demo_progress(40), None, false, 0.0);
        let len = s.particles().len();
        for &(a, b) in s.edges() {
            assert!(a < len && b < len);
        }
    }

    #[test]
    fn invariants_hold_across_many_frames() {
        let mut s = session();
        let progress = demo_progress(25);
        for i in 0..120 {
            let pointer = Some(Vec2::new(400.0 + i as f32, 300.0));
            s.frame(DIMS, &progress, pointer, i % 40 == 0, i as f64 / 60.0);
            for p in &s.particles().particles {
                assert!(p.size >= 0.0);
                assert!((0.0..=1.0).contains(&p.opacity));
                assert!(p.pos.is_finite());
                if let Some(parent) = p.parent {
                    assert!(parent < s.particles().len());
                }
            }
        }
    }

    #[test]
    fn identical_seeds_build_identical_populations() {
        let mut a = session();
        let mut b = session();
        a.frame(DIMS, &demo_progress(15), None, false, 0.0);
        b.frame(DIMS, &demo_progress(15), None, false, 0.0);

        let pa: Vec<Vec2> = a.particles().particles.iter().map(|p| p.pos).collect();
        let pb: Vec<Vec2> = b.particles().particles.iter().map(|p| p.pos).collect();
        // Both stepped once from the same seed and inputs.
        assert_eq!(pa, pb);
    }
}
