use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

/// Processing delay between two loop iterations
///
/// The base interval can carry Gaussian jitter (mean 0, given standard
/// deviation in milliseconds). Negative samples are clamped to zero.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    jitter: Option<(StdRng, Normal<f64>)>,
}

impl Pacer {
    /// Fixed interval without jitter
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            jitter: None,
        }
    }

    /// Interval with seeded jitter
    ///
    /// An unusable standard deviation (negative or not finite) disables the jitter.
    pub fn jittered(interval: Duration, std_dev_ms: f64, seed: u64) -> Self {
        let jitter = Some(std_dev_ms)
            .filter(|std_dev| std_dev.is_finite() && *std_dev >= 0.0)
            .and_then(|std_dev| Normal::new(0.0, std_dev).ok())
            .map(|normal| (StdRng::seed_from_u64(seed), normal));
        Self { interval, jitter }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay to wait before the next iteration
    pub fn next_delay(&mut self) -> Duration {
        match &mut self.jitter {
            Some((rng, normal)) => {
                let millis = self.interval.as_secs_f64() * 1000.0 + normal.sample(rng);
                Duration::from_secs_f64(millis.max(0.0) / 1000.0)
            }
            None => self.interval,
        }
    }

    /// Sleep for the next delay
    pub fn pause(&mut self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay() {
        let mut pacer = Pacer::fixed(Duration::from_millis(100));
        assert_eq!(pacer.next_delay(), Duration::from_millis(100));
        assert_eq!(pacer.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_jitter_is_reproducible_for_a_seed() {
        let mut first = Pacer::jittered(Duration::from_millis(100), 10.0, 42);
        let mut second = Pacer::jittered(Duration::from_millis(100), 10.0, 42);

        for _ in 0..5 {
            assert_eq!(first.next_delay(), second.next_delay());
        }
    }

    #[test]
    fn test_jitter_clamps_at_zero() {
        let mut pacer = Pacer::jittered(Duration::from_millis(1), 500.0, 7);
        let delays: Vec<Duration> = (0..50).map(|_| pacer.next_delay()).collect();
        assert!(delays.iter().any(|delay| delay.is_zero()));
    }

    #[test]
    fn test_invalid_std_dev_disables_jitter() {
        for std_dev in [-1.0, f64::NAN, f64::INFINITY] {
            let mut pacer = Pacer::jittered(Duration::from_millis(20), std_dev, 1);
            for _ in 0..5 {
                assert_eq!(pacer.next_delay(), Duration::from_millis(20));
            }
        }
    }
}
