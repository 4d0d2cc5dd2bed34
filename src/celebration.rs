//! Confetti burst schedule
//!
//! Two bursts (left and right) every `CONFETTI_INTERVAL`, shrinking as the show
//! runs out. The show stops itself once its duration has elapsed.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::{CONFETTI_DURATION, CONFETTI_INTERVAL};

/// Particles per burst at the start of the show
pub const BASE_PARTICLES: f32 = 50.0;

/// Normalized viewport origin (0..1, y may start above the top edge)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Origin {
    pub x: f32,
    pub y: f32,
}

/// One call to the confetti provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Burst {
    pub particle_count: u32,
    pub spread: f32,
    pub start_velocity: f32,
    pub ticks: u32,
    pub z_index: i32,
    pub origin: Origin,
}

/// A running confetti show
#[derive(Debug, Clone)]
pub struct Confetti {
    rng: Pcg32,
    duration: Duration,
}

impl Confetti {
    pub fn new(seed: u64) -> Self {
        Self::with_duration(seed, CONFETTI_DURATION)
    }

    pub fn with_duration(seed: u64, duration: Duration) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            duration,
        }
    }

    pub fn interval(&self) -> Duration {
        CONFETTI_INTERVAL
    }

    /// Bursts for the frame at `elapsed`, `None` once the show is over
    pub fn frame(&mut self, elapsed: Duration) -> Option<[Burst; 2]> {
        if elapsed >= self.duration {
            return None;
        }
        let time_left = (self.duration - elapsed).as_secs_f32();
        let particle_count = (BASE_PARTICLES * time_left / self.duration.as_secs_f32()) as u32;

        let left = Origin {
            x: self.rng.random_range(0.1..0.3),
            y: self.rng.random::<f32>() - 0.2,
        };
        let right = Origin {
            x: self.rng.random_range(0.7..0.9),
            y: self.rng.random::<f32>() - 0.2,
        };
        Some([burst(particle_count, left), burst(particle_count, right)])
    }
}

fn burst(particle_count: u32, origin: Origin) -> Burst {
    Burst {
        particle_count,
        spread: 360.0,
        start_velocity: 30.0,
        ticks: 60,
        z_index: 0,
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_ends_after_duration() {
        let mut confetti = Confetti::new(7);
        assert!(confetti.frame(Duration::ZERO).is_some());
        assert!(confetti.frame(CONFETTI_DURATION - CONFETTI_INTERVAL).is_some());
        assert!(confetti.frame(CONFETTI_DURATION).is_none());
    }

    #[test]
    fn test_particles_shrink() {
        let mut confetti = Confetti::new(7);
        let first = confetti.frame(Duration::ZERO).unwrap();
        let late = confetti.frame(Duration::from_millis(2500)).unwrap();
        assert_eq!(first[0].particle_count, 50);
        assert!(late[0].particle_count < first[0].particle_count);
    }

    #[test]
    fn test_origins_in_range() {
        let mut confetti = Confetti::new(42);
        let mut elapsed = Duration::ZERO;
        while let Some([left, right]) = confetti.frame(elapsed) {
            assert!((0.1..0.3).contains(&left.origin.x));
            assert!((0.7..0.9).contains(&right.origin.x));
            assert!((-0.2..0.8).contains(&left.origin.y));
            elapsed += confetti.interval();
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = Confetti::new(99).frame(Duration::ZERO);
        let b = Confetti::new(99).frame(Duration::ZERO);
        assert_eq!(a, b);
    }

    #[test]
    fn test_burst_options_serialize_for_js() {
        let [left, _] = Confetti::new(1).frame(Duration::ZERO).unwrap();
        let json = serde_json::to_value(left).unwrap();
        assert_eq!(json["particleCount"], 50);
        assert_eq!(json["startVelocity"], 30.0);
        assert!(json["origin"]["x"].is_number());
    }
}
