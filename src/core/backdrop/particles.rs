//! Particle field for the accelerated tier
//!
//! Particles live in a fixed box centred on the origin, drift by a constant
//! velocity and wrap toroidally at the box faces. Connections are linked once
//! at generation with a bounded forward scan and never re-linked.

use glam::Vec3;
use rand::Rng;

use super::settings::{OPTIMIZED_NEIGHBOR_WINDOW, TierSettings};

/// Half extent of the particle volume on each axis
pub const FIELD_HALF_EXTENT: Vec3 = Vec3::new(25.0, 25.0, 10.0);

/// Maximum per-axis speed of a particle, per frame
pub const MAX_SPEED: Vec3 = Vec3::new(0.01, 0.01, 0.005);

/// World units a fully deflected pointer nudges every particle per frame
pub const POINTER_INFLUENCE: f32 = 0.0001;

/// Radians the whole field turns around x and y per frame
pub const ROTATION_SPEED: f32 = 0.0002;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Index pair of two linked particles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
}

/// Pointer position normalised to [-1, 1] with y pointing up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn from_client(client_x: f64, client_y: f64, width: f64, height: f64) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::default();
        }
        Self {
            x: ((client_x / width) * 2.0 - 1.0).clamp(-1.0, 1.0) as f32,
            y: (-(client_y / height) * 2.0 + 1.0).clamp(-1.0, 1.0) as f32,
        }
    }
}

/// Link each particle to the following `window` particles closer than
/// `max_distance`, stopping once `max_connections` links exist.
///
/// This is a bounded O(n * window) approximation: pairs further apart in the
/// list than `window` are never considered.
pub fn link_neighbors(
    particles: &[Particle],
    max_distance: f32,
    max_connections: usize,
    window: usize,
) -> Vec<Connection> {
    let n = particles.len();
    let mut connections = Vec::with_capacity(max_connections.min(n.saturating_mul(window)));

    'scan: for i in 0..n {
        let check = window.min(n - i - 1);
        for j in 1..=check {
            if connections.len() >= max_connections {
                break 'scan;
            }
            let b = i + j;
            if particles[i].position.distance(particles[b].position) < max_distance {
                connections.push(Connection { a: i, b });
            }
        }
    }

    connections
}

fn wrap_axis(value: f32, half_extent: f32) -> f32 {
    if value.abs() > half_extent {
        -value.signum() * half_extent
    } else {
        value
    }
}

fn wrap(position: Vec3) -> Vec3 {
    Vec3::new(
        wrap_axis(position.x, FIELD_HALF_EXTENT.x),
        wrap_axis(position.y, FIELD_HALF_EXTENT.y),
        wrap_axis(position.z, FIELD_HALF_EXTENT.z),
    )
}

/// Particles, their precomputed links, and the field's slow rotation
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    connections: Vec<Connection>,
    connection_distance: f32,
    rotation: [f32; 2],
}

impl ParticleField {
    /// Scatter particles uniformly through the volume and link neighbours
    pub fn generate<R: Rng>(settings: &TierSettings, rng: &mut R) -> Self {
        let settings = settings.clamped();

        let particles: Vec<Particle> = (0..settings.particle_count)
            .map(|_| Particle {
                position: Vec3::new(
                    rng.gen_range(-FIELD_HALF_EXTENT.x..=FIELD_HALF_EXTENT.x),
                    rng.gen_range(-FIELD_HALF_EXTENT.y..=FIELD_HALF_EXTENT.y),
                    rng.gen_range(-FIELD_HALF_EXTENT.z..=FIELD_HALF_EXTENT.z),
                ),
                velocity: Vec3::new(
                    rng.gen_range(-MAX_SPEED.x..=MAX_SPEED.x),
                    rng.gen_range(-MAX_SPEED.y..=MAX_SPEED.y),
                    rng.gen_range(-MAX_SPEED.z..=MAX_SPEED.z),
                ),
            })
            .collect();

        Self::from_particles(particles, &settings)
    }

    /// Build a field from explicit particles (truncated to the cap)
    pub fn from_particles(mut particles: Vec<Particle>, settings: &TierSettings) -> Self {
        let settings = settings.clamped();
        particles.truncate(settings.particle_count);

        let connections = link_neighbors(
            &particles,
            settings.connection_distance,
            settings.max_connections,
            OPTIMIZED_NEIGHBOR_WINDOW,
        );

        Self {
            particles,
            connections,
            connection_distance: settings.connection_distance,
            rotation: [0.0, 0.0],
        }
    }

    /// Advance one rendered frame
    pub fn step(&mut self, pointer: PointerPosition) {
        let nudge = Vec3::new(pointer.x * POINTER_INFLUENCE, pointer.y * POINTER_INFLUENCE, 0.0);

        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.position += nudge;
            particle.position = wrap(particle.position);
        }

        self.rotation[0] += ROTATION_SPEED;
        self.rotation[1] += ROTATION_SPEED;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Rotation around the x and y axes in radians
    pub fn rotation(&self) -> [f32; 2] {
        self.rotation
    }

    /// Floats needed for the point vertex buffer
    pub fn position_buffer_len(&self) -> usize {
        self.particles.len() * 3
    }

    /// Floats needed for the line vertex buffer
    pub fn segment_buffer_len(&self) -> usize {
        self.connections.len() * 6
    }

    /// Write xyz triples for every particle into `out`
    pub fn write_positions(&self, out: &mut [f32]) {
        for (particle, slot) in self.particles.iter().zip(out.chunks_exact_mut(3)) {
            slot.copy_from_slice(&particle.position.to_array());
        }
    }

    /// Write both endpoints of every connection into `out`.
    ///
    /// A pair pulled apart by a wrap is collapsed onto its first endpoint so
    /// it draws nothing instead of a streak across the volume.
    pub fn write_segments(&self, out: &mut [f32]) {
        let stretch_limit = self.connection_distance * 2.0;

        for (connection, slot) in self.connections.iter().zip(out.chunks_exact_mut(6)) {
            let a = self.particles[connection.a].position;
            let mut b = self.particles[connection.b].position;
            if a.distance(b) > stretch_limit {
                b = a;
            }
            slot[..3].copy_from_slice(&a.to_array());
            slot[3..].copy_from_slice(&b.to_array());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backdrop::settings::{MAX_CONNECTIONS, MAX_PARTICLES, QualityPreset};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn still(x: f32, y: f32, z: f32) -> Particle {
        Particle {
            position: Vec3::new(x, y, z),
            velocity: Vec3::ZERO,
        }
    }

    #[test]
    fn test_generate_respects_preset_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        for preset in [QualityPreset::High, QualityPreset::Medium, QualityPreset::Low] {
            let settings = preset.settings();
            let field = ParticleField::generate(&settings, &mut rng);
            assert_eq!(field.particles().len(), settings.particle_count);
            assert!(field.connections().len() <= settings.max_connections);
        }
    }

    #[test]
    fn test_generate_clamps_oversized_settings() {
        let mut rng = StdRng::seed_from_u64(11);
        let settings = TierSettings {
            particle_count: 5_000,
            connection_distance: 1_000.0,
            max_connections: 5_000,
            frame_rate: 60,
        };
        let field = ParticleField::generate(&settings, &mut rng);
        assert_eq!(field.particles().len(), MAX_PARTICLES);
        // Every pair is in range, so the cap is what stops linking
        assert_eq!(field.connections().len(), MAX_CONNECTIONS);
    }

    #[test]
    fn test_generated_particles_inside_volume() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = ParticleField::generate(&QualityPreset::High.settings(), &mut rng);
        for particle in field.particles() {
            assert!(particle.position.x.abs() <= FIELD_HALF_EXTENT.x);
            assert!(particle.position.y.abs() <= FIELD_HALF_EXTENT.y);
            assert!(particle.position.z.abs() <= FIELD_HALF_EXTENT.z);
            assert!(particle.velocity.x.abs() <= MAX_SPEED.x);
            assert!(particle.velocity.z.abs() <= MAX_SPEED.z);
        }
    }

    #[test]
    fn test_links_are_near_and_within_window() {
        let mut rng = StdRng::seed_from_u64(42);
        let settings = QualityPreset::High.settings();
        let field = ParticleField::generate(&settings, &mut rng);

        for connection in field.connections() {
            assert!(connection.b > connection.a);
            assert!(connection.b - connection.a <= OPTIMIZED_NEIGHBOR_WINDOW);
            let a = field.particles()[connection.a].position;
            let b = field.particles()[connection.b].position;
            assert!(a.distance(b) < settings.connection_distance);
        }
    }

    #[test]
    fn test_link_scan_misses_distant_indices() {
        // Particles 0 and 11 coincide, but 11 is outside particle 0's window
        let mut particles: Vec<Particle> = (0..12).map(|i| still(i as f32 * 10.0, 0.0, 0.0)).collect();
        particles[11] = still(0.0, 0.0, 0.0);

        let links = link_neighbors(&particles, 1.0, 100, OPTIMIZED_NEIGHBOR_WINDOW);
        assert!(links.is_empty());

        let links = link_neighbors(&particles, 1.0, 100, 11);
        assert_eq!(links, vec![Connection { a: 0, b: 11 }]);
    }

    #[test]
    fn test_link_scan_stops_at_cap() {
        let particles: Vec<Particle> = (0..20).map(|_| still(0.0, 0.0, 0.0)).collect();
        assert_eq!(link_neighbors(&particles, 1.0, 7, 10).len(), 7);
        assert!(link_neighbors(&particles, 1.0, 0, 10).is_empty());
        assert!(link_neighbors(&[], 1.0, 10, 10).is_empty());
    }

    #[test]
    fn test_step_moves_and_wraps() {
        let settings = QualityPreset::Low.settings();
        let particles = vec![
            Particle {
                position: Vec3::new(24.995, 0.0, 0.0),
                velocity: Vec3::new(0.01, 0.0, 0.0),
            },
            Particle {
                position: Vec3::new(0.0, -24.999, 9.999),
                velocity: Vec3::new(0.0, -0.01, 0.005),
            },
        ];
        let mut field = ParticleField::from_particles(particles, &settings);

        field.step(PointerPosition::default());

        let first = field.particles()[0].position;
        assert_eq!(first.x, -25.0);

        let second = field.particles()[1].position;
        assert_eq!(second.y, 25.0);
        assert_eq!(second.z, -10.0);
    }

    #[test]
    fn test_pointer_parallax_and_rotation() {
        let settings = QualityPreset::Low.settings();
        let mut field = ParticleField::from_particles(vec![still(0.0, 0.0, 0.0)], &settings);

        field.step(PointerPosition { x: 1.0, y: -1.0 });

        let position = field.particles()[0].position;
        assert!((position.x - POINTER_INFLUENCE).abs() < f32::EPSILON);
        assert!((position.y + POINTER_INFLUENCE).abs() < f32::EPSILON);
        assert_eq!(field.rotation(), [ROTATION_SPEED, ROTATION_SPEED]);
    }

    #[test]
    fn test_write_buffers() {
        let settings = QualityPreset::Low.settings();
        let field = ParticleField::from_particles(
            vec![still(1.0, 2.0, 3.0), still(1.5, 2.0, 3.0)],
            &settings,
        );
        assert_eq!(field.connections().len(), 1);

        let mut positions = vec![0.0; field.position_buffer_len()];
        field.write_positions(&mut positions);
        assert_eq!(positions, vec![1.0, 2.0, 3.0, 1.5, 2.0, 3.0]);

        let mut segments = vec![0.0; field.segment_buffer_len()];
        field.write_segments(&mut segments);
        assert_eq!(segments, vec![1.0, 2.0, 3.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn test_wrapped_segment_collapses() {
        let settings = QualityPreset::Low.settings();
        let mut field = ParticleField::from_particles(
            vec![
                Particle {
                    position: Vec3::new(24.999, 0.0, 0.0),
                    velocity: Vec3::new(0.01, 0.0, 0.0),
                },
                still(23.0, 0.0, 0.0),
            ],
            &settings,
        );
        assert_eq!(field.connections().len(), 1);

        field.step(PointerPosition::default());

        let mut segments = vec![0.0; field.segment_buffer_len()];
        field.write_segments(&mut segments);
        assert_eq!(&segments[0..3], &segments[3..6]);
    }

    #[test]
    fn test_pointer_normalisation() {
        let centre = PointerPosition::from_client(500.0, 300.0, 1000.0, 600.0);
        assert_eq!(centre, PointerPosition { x: 0.0, y: 0.0 });

        let corner = PointerPosition::from_client(0.0, 0.0, 1000.0, 600.0);
        assert_eq!(corner, PointerPosition { x: -1.0, y: 1.0 });

        assert_eq!(
            PointerPosition::from_client(10.0, 10.0, 0.0, 0.0),
            PointerPosition::default()
        );
    }
}
