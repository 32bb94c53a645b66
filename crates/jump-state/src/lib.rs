use rand::Rng;
use std::ops::{Range, RangeInclusive};
use std::time::Duration;
use tracing::debug;

/// How a session spaces out its jumps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Pause between two jumps, in milliseconds
    pub short_pause_ms: Range<u64>,
    /// Length of a rest break, in seconds
    pub rest_secs: RangeInclusive<u64>,
    /// Number of jumps between two rest breaks
    pub rest_after: Range<u32>,
    /// Swipe end point offsets, exclusive on the positive side
    pub jitter_x: i32,
    pub jitter_y: i32,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            short_pause_ms: 1000..3000,
            rest_secs: 5..=9,
            rest_after: 10..30,
            jitter_x: 50,
            jitter_y: 10,
        }
    }
}

/// Jumps played since the last rest and when the next rest is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCounters {
    pub plays: u32,
    pub rest_threshold: u32,
}

/// What to do after a jump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Short(Duration),
    /// Rest break after `plays` jumps, counted down second by second
    Rest { seconds: u64, plays: u32 },
}

/// Decides the pause after each jump.
///
/// All randomness comes from the caller's RNG, so a seeded RNG replays the
/// same schedule.
#[derive(Debug, Clone)]
pub struct Pacer {
    policy: PacingPolicy,
    counters: SessionCounters,
}

impl Pacer {
    pub fn new<R: Rng + ?Sized>(policy: PacingPolicy, rng: &mut R) -> Self {
        let rest_threshold = rng.random_range(policy.rest_after.clone());
        Self {
            policy,
            counters: SessionCounters {
                plays: 0,
                rest_threshold,
            },
        }
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    pub fn policy(&self) -> &PacingPolicy {
        &self.policy
    }

    /// Count a finished jump and pick the pause before the next one.
    ///
    /// Jumps up to and including the threshold get a short pause; the one
    /// after it gets a rest, which resets the counter and draws a new threshold.
    pub fn next_pause<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Pause {
        self.counters.plays += 1;

        if self.counters.plays <= self.counters.rest_threshold {
            let ms = rng.random_range(self.policy.short_pause_ms.clone());
            return Pause::Short(Duration::from_millis(ms));
        }

        let seconds = rng.random_range(self.policy.rest_secs.clone());
        let plays = self.counters.plays;
        self.counters = SessionCounters {
            plays: 0,
            rest_threshold: rng.random_range(self.policy.rest_after.clone()),
        };
        debug!(
            "Rest for {}s after {} jumps, next rest after {}",
            seconds, plays, self.counters.rest_threshold
        );
        Pause::Rest { seconds, plays }
    }

    /// Random offset for the swipe end point, so no two gestures are identical
    pub fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> (i32, i32) {
        jitter(rng, self.policy.jitter_x, self.policy.jitter_y)
    }
}

/// Offset in `[-max_x, max_x) x [-max_y, max_y)`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, max_x: i32, max_y: i32) -> (i32, i32) {
    let dx = if max_x > 0 {
        rng.random_range(-max_x..max_x)
    } else {
        0
    };
    let dy = if max_y > 0 {
        rng.random_range(-max_y..max_y)
    } else {
        0
    };
    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_threshold_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let pacer = Pacer::new(PacingPolicy::default(), &mut rng);
            let threshold = pacer.counters().rest_threshold;
            assert!((10..30).contains(&threshold), "threshold {}", threshold);
        }
    }

    #[test]
    fn test_short_pauses_then_rest() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pacer = Pacer::new(PacingPolicy::default(), &mut rng);
        let threshold = pacer.counters().rest_threshold;

        for play in 1..=threshold {
            match pacer.next_pause(&mut rng) {
                Pause::Short(d) => {
                    assert!(d >= Duration::from_millis(1000) && d < Duration::from_millis(3000))
                }
                other => panic!("play {} expected short pause, got {:?}", play, other),
            }
            assert_eq!(pacer.counters().plays, play);
        }

        match pacer.next_pause(&mut rng) {
            Pause::Rest { seconds, plays } => {
                assert!((5..=9).contains(&seconds));
                assert_eq!(plays, threshold + 1);
            }
            other => panic!("expected rest, got {:?}", other),
        }

        let counters = pacer.counters();
        assert_eq!(counters.plays, 0);
        assert!((10..30).contains(&counters.rest_threshold));
    }

    #[test]
    fn test_seeded_schedule_repeats() {
        let schedule = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pacer = Pacer::new(PacingPolicy::default(), &mut rng);
            (0..40).map(|_| pacer.next_pause(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(schedule(9), schedule(9));
    }

    #[test]
    fn test_fixed_threshold_policy() {
        let policy = PacingPolicy {
            rest_after: 2..3,
            ..PacingPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let mut pacer = Pacer::new(policy, &mut rng);

        let kinds: Vec<bool> = (0..6)
            .map(|_| matches!(pacer.next_pause(&mut rng), Pause::Rest { .. }))
            .collect();
        assert_eq!(kinds, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let (dx, dy) = jitter(&mut rng, 50, 10);
            assert!((-50..50).contains(&dx));
            assert!((-10..10).contains(&dy));
        }
        assert_eq!(jitter(&mut rng, 0, 0), (0, 0));
    }
}
