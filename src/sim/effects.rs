//! Short-lived visual feedback owned by the simulation
//!
//! Particles, floating texts, damage/experience numbers and AOE rings. The renderer
//! only reads these; the tick integrates and retires them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SimRng;

/// Palette the front-end maps to concrete colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tint {
    Gold,
    Red,
    Blue,
    White,
    Cyan,
    Green,
    Orange,
    Brick,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub lifetime: f32,
    pub tint: Tint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub tint: Tint,
    pub lifetime: f32,
    pub alpha: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub damage: f32,
    pub critical: bool,
    pub lifetime: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpNumber {
    pub pos: Vec2,
    pub exp: u32,
    pub lifetime: f32,
    pub alpha: f32,
}

/// Expanding shockwave ring left by the AOE skill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AoeRing {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub speed: f32,
    pub lifetime: f32,
    /// Frames before the ring starts growing
    pub delay: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub floating_texts: Vec<FloatingText>,
    pub damage_numbers: Vec<DamageNumber>,
    pub exp_numbers: Vec<ExpNumber>,
    pub aoe_rings: Vec<AoeRing>,
    /// Particle cap from the performance mode
    pub max_particles: usize,
}

impl Default for Effects {
    fn default() -> Self {
        Self::new(500)
    }
}

impl Effects {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            floating_texts: Vec::new(),
            damage_numbers: Vec::new(),
            exp_numbers: Vec::new(),
            aoe_rings: Vec::new(),
            max_particles,
        }
    }

    /// Spray `count` particles from `pos`
    pub fn burst(
        &mut self,
        rng: &mut SimRng,
        pos: Vec2,
        count: usize,
        speed: f32,
        lifetime: f32,
        tint: Tint,
    ) {
        let room = self.max_particles.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(rng.range(-speed, speed), rng.range(-speed, speed)),
                radius: rng.range(2.0, 4.0),
                lifetime,
                tint,
            });
        }
    }

    pub fn damage_number(&mut self, rng: &mut SimRng, pos: Vec2, damage: f32, critical: bool) {
        self.damage_numbers.push(DamageNumber {
            pos: pos + Vec2::new(rng.range(-20.0, 20.0), -10.0),
            damage,
            critical,
            lifetime: 60.0,
            alpha: 1.0,
        });
    }

    pub fn exp_number(&mut self, rng: &mut SimRng, pos: Vec2, exp: u32) {
        self.exp_numbers.push(ExpNumber {
            pos: pos + Vec2::new(rng.range(-15.0, 15.0), -5.0),
            exp,
            lifetime: 45.0,
            alpha: 1.0,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, tint: Tint, lifetime: f32, scale: f32) {
        self.floating_texts.push(FloatingText {
            pos,
            text: text.into(),
            tint,
            lifetime,
            alpha: 1.0,
            scale,
        });
    }

    /// Five staggered rings for one AOE cast
    pub fn shockwave(&mut self, center: Vec2) {
        for i in 0..5 {
            let i = i as f32;
            self.aoe_rings.push(AoeRing {
                center,
                radius: 0.0,
                max_radius: 150.0 + i * 60.0,
                speed: 4.0 + i * 0.8,
                lifetime: 80.0,
                delay: i * 8.0,
            });
        }
    }

    /// Advance one frame and drop finished effects
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel *= 0.98;
            p.lifetime -= 1.0;
        }
        self.particles.retain(|p| p.lifetime > 0.0);

        for t in &mut self.floating_texts {
            t.pos.y -= 1.0;
            t.lifetime -= 1.0;
            t.alpha = (t.lifetime / 60.0).min(1.0);
        }
        self.floating_texts.retain(|t| t.lifetime > 0.0);

        for d in &mut self.damage_numbers {
            d.pos.y -= 2.0;
            d.lifetime -= 1.0;
            d.alpha = d.lifetime / 60.0;
        }
        self.damage_numbers.retain(|d| d.lifetime > 0.0);

        for e in &mut self.exp_numbers {
            e.pos.y -= 1.5;
            e.lifetime -= 1.0;
            e.alpha = e.lifetime / 45.0;
        }
        self.exp_numbers.retain(|e| e.lifetime > 0.0);

        for ring in &mut self.aoe_rings {
            if ring.delay > 0.0 {
                ring.delay -= 1.0;
                continue;
            }
            ring.radius = (ring.radius + ring.speed).min(ring.max_radius);
            ring.lifetime -= 1.0;
        }
        self.aoe_rings.retain(|r| r.lifetime > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_respects_cap() {
        let mut fx = Effects::new(10);
        let mut rng = SimRng::new(1);
        fx.burst(&mut rng, Vec2::ZERO, 8, 3.0, 20.0, Tint::Gold);
        fx.burst(&mut rng, Vec2::ZERO, 8, 3.0, 20.0, Tint::Gold);
        assert_eq!(fx.particles.len(), 10);
    }

    #[test]
    fn test_effects_expire() {
        let mut fx = Effects::default();
        let mut rng = SimRng::new(1);
        fx.burst(&mut rng, Vec2::ZERO, 4, 3.0, 20.0, Tint::Red);
        fx.damage_number(&mut rng, Vec2::ZERO, 12.0, true);
        fx.text(Vec2::ZERO, "Frenzy!", Tint::Orange, 90.0, 1.5);
        fx.shockwave(Vec2::ZERO);
        for _ in 0..200 {
            fx.update();
        }
        assert!(fx.particles.is_empty());
        assert!(fx.damage_numbers.is_empty());
        assert!(fx.floating_texts.is_empty());
        assert!(fx.aoe_rings.is_empty());
    }

    #[test]
    fn test_ring_grows_to_max() {
        let mut fx = Effects::default();
        fx.shockwave(Vec2::ZERO);
        for _ in 0..60 {
            fx.update();
        }
        assert_eq!(fx.aoe_rings[0].radius, 150.0);
        // The last ring started 32 frames late
        assert!(fx.aoe_rings[4].radius < fx.aoe_rings[4].max_radius);
    }
}
