/// Deterministic uniform stream seeded from `(lat, lng, radius_km, salt)`.
///
/// Emits doubles in `[0, 1)` via a 32-bit linear congruential step. Two
/// instances built from equal seeds emit identical sequences, which is the
/// property the bias-correction reference ring and candidate sampler rely
/// on for reproducibility across runs and across worker threads.
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Builds an RNG from the request's geography and an optional salt.
    ///
    /// # Arguments
    ///
    /// * 'lat' - center latitude, degrees
    /// * 'lng' - center longitude, degrees
    /// * 'radius_km' - search radius, km
    /// * 'salt' - caller-supplied disambiguator (0 if absent)
    pub fn from_seed(lat: f64, lng: f64, radius_km: f64, salt: i64) -> Self {
        let seed = mix_seed(lat, lng, radius_km, salt);
        SeededRng { state: seed }
    }

    /// Builds a per-worker RNG deterministically derived from a global seed
    /// and a point index, so parallel per-point work stays reproducible.
    ///
    /// # Arguments
    ///
    /// * 'global_seed' - the request-level seed
    /// * 'point_index' - index of the candidate being processed
    pub fn from_global_and_index(global_seed: u32, point_index: usize) -> Self {
        let mixed = mix32(global_seed ^ (point_index as u32).wrapping_mul(0x9E3779B1));
        SeededRng { state: mixed }
    }

    pub fn seed_value(&self) -> u32 {
        self.state
    }

    /// Advances the LCG and returns a uniform double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        (self.state as f64) / (u32::MAX as f64 + 1.0)
    }
}

/// Combines the four seed components into a stable 32-bit state using the
/// documented mixer: truncate each component to an integer at a fixed
/// decimal precision, then fold through `mix32`.
fn mix_seed(lat: f64, lng: f64, radius_km: f64, salt: i64) -> u32 {
    let lat_i = (lat * 1e6).floor() as i64;
    let lng_i = (lng * 1e6).floor() as i64;
    let radius_i = (radius_km * 1e3).floor() as i64;

    let mut h: u32 = 0x811C_9DC5;
    for part in [lat_i, lng_i, radius_i, salt] {
        h = mix32(h ^ (part as u32));
        h = mix32(h ^ ((part >> 32) as u32));
    }
    h
}

/// A 32-bit integer mixer (Murmur3 finalizer), used to stably combine seed
/// components across platforms without relying on hash-map hashers, which
/// are not guaranteed stable across Rust versions.
fn mix32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_seeds_emit_identical_sequences() {
        let mut a = SeededRng::from_seed(30.2672, -97.7431, 2.0, 0);
        let mut b = SeededRng::from_seed(30.2672, -97.7431, 2.0, 0);

        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn different_salts_diverge() {
        let mut a = SeededRng::from_seed(30.2672, -97.7431, 2.0, 0);
        let mut b = SeededRng::from_seed(30.2672, -97.7431, 2.0, 1);

        let seq_a: Vec<f64> = (0..10).map(|_| a.next_f64()).collect();
        let seq_b: Vec<f64> = (0..10).map(|_| b.next_f64()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn emits_values_in_unit_interval() {
        let mut rng = SeededRng::from_seed(1.0, 2.0, 3.0, 4);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!(v >= 0.0 && v < 1.0);
        }
    }

    #[test]
    fn per_point_workers_are_independent_but_deterministic() {
        let mut a = SeededRng::from_global_and_index(42, 7);
        let mut b = SeededRng::from_global_and_index(42, 7);
        let mut c = SeededRng::from_global_and_index(42, 8);

        assert_eq!(a.next_f64(), b.next_f64());
        assert_ne!(a.next_f64(), c.next_f64());
    }
}
