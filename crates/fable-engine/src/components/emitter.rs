use glam::Vec2;

use crate::components::sprite::AtlasId;
use crate::components::ReadyState;

/// Seedable pseudo-random number generator (xorshift64).
/// Deterministic, fast, no-std compatible.
#[derive(Debug, Clone)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Random f32 in [0, 1).
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Random f32 in [lo, hi).
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

/// A live particle, stored relative to the owning entity's position.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub offset: Vec2,
    pub velocity: Vec2,
    pub age: f32,
    pub lifetime: f32,
    pub size: f32,
}

impl Particle {
    /// Remaining opacity: fades linearly with age.
    pub fn alpha(&self) -> f32 {
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Particle emitter component: spawns short-lived particles from the owning
/// entity's position at a fixed rate.
///
/// Procedural — no asset dependency, so it starts `Ready`. Emission is
/// deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct EmitterComponent {
    /// Whether the emitter is actively spawning.
    pub active: bool,
    /// Particles per second.
    pub rate: f32,
    /// Min/max initial speed magnitude (world units per second).
    pub speed_range: (f32, f32),
    /// Particle lifetime in seconds.
    pub lifetime: f32,
    /// Particle visual size in world units.
    pub size: f32,
    /// Hard cap on live particles.
    pub max_particles: usize,
    /// Atlas cell every particle is drawn with.
    pub atlas: AtlasId,
    pub col: f32,
    pub row: f32,
    pub state: ReadyState,
    particles: Vec<Particle>,
    /// Fractional-spawn accumulator for the continuous rate.
    accumulator: f32,
    rng: Rng,
}

impl EmitterComponent {
    pub fn new(seed: u64) -> Self {
        Self {
            active: true,
            rate: 10.0,
            speed_range: (8.0, 32.0),
            lifetime: 1.0,
            size: 4.0,
            max_particles: 256,
            atlas: AtlasId(0),
            col: 0.0,
            row: 0.0,
            state: ReadyState::Ready,
            particles: Vec::new(),
            accumulator: 0.0,
            rng: Rng::new(seed),
        }
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_speed_range(mut self, lo: f32, hi: f32) -> Self {
        self.speed_range = (lo, hi);
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.max_particles = max;
        self
    }

    pub fn with_cell(mut self, atlas: AtlasId, col: f32, row: f32) -> Self {
        self.atlas = atlas;
        self.col = col;
        self.row = row;
        self
    }

    /// Advance all particles and spawn new ones for `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.age += dt;
            p.offset += p.velocity * dt;
        }
        self.particles.retain(|p| p.age < p.lifetime);

        if !self.active {
            return;
        }

        self.accumulator += self.rate * dt;
        while self.accumulator >= 1.0 && self.particles.len() < self.max_particles {
            self.accumulator -= 1.0;
            let angle = self.rng.range(0.0, std::f32::consts::TAU);
            let speed = self.rng.range(self.speed_range.0, self.speed_range.1);
            self.particles.push(Particle {
                offset: Vec2::ZERO,
                velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                age: 0.0,
                lifetime: self.lifetime,
                size: self.size,
            });
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Drop all live particles.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawns_at_rate() {
        let mut emitter = EmitterComponent::new(42).with_rate(10.0);
        emitter.tick(1.0);
        assert_eq!(emitter.particle_count(), 10);
    }

    #[test]
    fn particles_expire() {
        let mut emitter = EmitterComponent::new(42).with_rate(10.0).with_lifetime(0.5);
        emitter.tick(1.0);
        assert_eq!(emitter.particle_count(), 10);
        // One more second: everything spawned in the first tick expires,
        // replaced by the new second's worth.
        emitter.tick(1.0);
        assert_eq!(emitter.particle_count(), 10);
        emitter.active = false;
        emitter.tick(1.0);
        assert_eq!(emitter.particle_count(), 0);
    }

    #[test]
    fn deterministic_for_seed() {
        let mut a = EmitterComponent::new(7).with_rate(5.0);
        let mut b = EmitterComponent::new(7).with_rate(5.0);
        a.tick(1.0);
        b.tick(1.0);
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.velocity, pb.velocity);
        }
    }

    #[test]
    fn max_particles_cap() {
        let mut emitter = EmitterComponent::new(1).with_rate(1000.0).with_max_particles(16);
        emitter.tick(1.0);
        assert_eq!(emitter.particle_count(), 16);
    }

    #[test]
    fn alpha_fades_with_age() {
        let mut emitter = EmitterComponent::new(3).with_rate(1.0).with_lifetime(2.0);
        emitter.tick(1.0);
        emitter.tick(1.0);
        // particles[0] is the first spawn, now one second old of a two-second life.
        let p = emitter.particles()[0];
        assert!((p.alpha() - 0.5).abs() < 0.01);
    }
}
