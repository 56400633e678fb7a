//! Network data for the SVG fallback tier
//!
//! Positions are percentages of the viewport, so the layout survives resizes
//! without any handler. Linking only looks at the next `neighbor_window`
//! particles by index.

use rand::Rng;

use super::settings::SimpleSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleParticle {
    pub id: usize,
    /// Horizontal position, percent of viewport width
    pub x: f32,
    /// Vertical position, percent of viewport height
    pub y: f32,
    /// Circle radius in px
    pub size: f32,
    /// Pulse animation delay in seconds
    pub delay_s: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleConnection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleField {
    pub particles: Vec<SimpleParticle>,
    pub connections: Vec<SimpleConnection>,
    /// Whether the presentation layer runs the pulse animation
    pub animate: bool,
}

impl SimpleField {
    pub fn generate<R: Rng>(settings: &SimpleSettings, animate: bool, rng: &mut R) -> Self {
        let settings = settings.clamped();

        let particles = (0..settings.particle_count)
            .map(|id| SimpleParticle {
                id,
                x: rng.gen_range(0.0..100.0),
                y: rng.gen_range(0.0..100.0),
                size: rng.gen_range(1.0..3.0),
                delay_s: rng.gen_range(0.0..3.0),
            })
            .collect();

        Self::from_particles(particles, &settings, animate)
    }

    pub fn from_particles(
        mut particles: Vec<SimpleParticle>,
        settings: &SimpleSettings,
        animate: bool,
    ) -> Self {
        let settings = settings.clamped();
        particles.truncate(settings.particle_count);

        let mut connections = Vec::new();
        for (i, p1) in particles.iter().enumerate() {
            let end = (i + 1 + settings.neighbor_window).min(particles.len());
            for p2 in &particles[i + 1..end] {
                let distance = ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt();
                if distance < settings.connection_distance {
                    connections.push(SimpleConnection {
                        x1: p1.x,
                        y1: p1.y,
                        x2: p2.x,
                        y2: p2.y,
                    });
                }
            }
        }

        Self {
            particles,
            connections,
            animate,
        }
    }
}
