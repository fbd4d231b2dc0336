#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    /// Base particle radius before density scaling.
    pub node_size: f32,
    /// Base separation padding between particles of the same cluster.
    pub node_distance: f32,
    /// Padding multiplier applied to cross-cluster pairs.
    pub cross_group_padding: f32,
    /// Per-frame velocity retention factor, < 1.
    pub damping: f32,
    pub center_attraction: f32,
    pub repulsion_radius: f32,
    pub repulsion_force: f32,
    /// Widened repulsion for the single frame following a click.
    pub click_repulsion_radius: f32,
    pub click_repulsion_force: f32,
    pub separation_force: f32,
    pub pulse_amplitude: f32,
    pub pulse_frequency: f32,
    /// Population floor; fillers are created up to this total.
    pub target_population: usize,
    /// Crowding constant: scale = min(1, crowding_k / sqrt(total)).
    pub crowding_k: f32,
    pub max_edges_per_particle: usize,
    /// Cluster centers spawn within this radius of the surface center.
    pub center_spawn_radius: f32,
    /// Children and fillers scatter within this radius of their focal point.
    pub child_spawn_radius: f32,
    /// Center particles are this many times larger than children.
    pub center_size_factor: f32,
    /// Seconds a resize burst must settle before the set is rescaled.
    pub resize_debounce: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            node_size: 4.0,
            node_distance: 35.0,
            cross_group_padding: 3.0,
            damping: 0.8,
            center_attraction: 0.0005,
            repulsion_radius: 80.0,
            repulsion_force: 3.0,
            click_repulsion_radius: 160.0,
            click_repulsion_force: 40.0,
            separation_force: 6.0,
            pulse_amplitude: 0.1,
            pulse_frequency: 0.01,
            target_population: 100,
            crowding_k: 12.0,
            max_edges_per_particle: 5,
            center_spawn_radius: 30.0,
            child_spawn_radius: 100.0,
            center_size_factor: 3.0,
            resize_debounce: 0.15,
        }
    }
}
