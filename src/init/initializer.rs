use rand::Rng;
use serde::{Deserialize, Serialize};

/// Produces starting values for weights and biases.
///
/// Constant variants ignore the random source; `Uniform` draws from it, so a
/// network built from a seeded `StdRng` is reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Initializer {
    Zero,
    /// Fills with 0.5.
    Half,
    Constant { value: f64 },
    /// Uniform over `[min, max]`.
    Uniform { min: f64, max: f64 },
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::Uniform { min: -0.5, max: 0.5 }
    }
}

impl Initializer {
    /// Value for a single scalar at position `index` of the matrix being filled.
    pub fn value<R: Rng>(&self, _index: usize, rng: &mut R) -> f64 {
        match *self {
            Initializer::Zero => 0.0,
            Initializer::Half => 0.5,
            Initializer::Constant { value } => value,
            Initializer::Uniform { min, max } => {
                assert!(min <= max, "uniform initializer needs min <= max, got [{}, {}]", min, max);
                if min == max { min } else { rng.gen_range(min..=max) }
            }
        }
    }

    /// Overwrites every element of `values`.
    pub fn fill<R: Rng>(&self, values: &mut [f64], rng: &mut R) {
        for (i, v) in values.iter_mut().enumerate() {
            *v = self.value(i, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test_log::test]
    fn constant_variants_fill_every_slot() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut buf = [9.0; 5];

        Initializer::Zero.fill(&mut buf, &mut rng);
        assert_eq!(buf, [0.0; 5]);

        Initializer::Half.fill(&mut buf, &mut rng);
        assert_eq!(buf, [0.5; 5]);

        Initializer::Constant { value: -1.25 }.fill(&mut buf, &mut rng);
        assert_eq!(buf, [-1.25; 5]);
    }

    #[test_log::test]
    fn uniform_stays_in_range_and_is_seed_deterministic() {
        let init = Initializer::Uniform { min: -0.5, max: 0.5 };
        let mut a = vec![0.0; 64];
        let mut b = vec![0.0; 64];
        init.fill(&mut a, &mut StdRng::seed_from_u64(691));
        init.fill(&mut b, &mut StdRng::seed_from_u64(691));

        assert_eq!(a, b);
        assert!(a.iter().all(|x| (-0.5..=0.5).contains(x)));
        assert!(a.iter().any(|&x| x != a[0]));
    }

    #[test_log::test]
    fn serializes_with_a_type_tag() {
        let json = serde_json::to_string(&Initializer::Uniform { min: -1.0, max: 1.0 }).unwrap();
        assert!(json.contains("\"type\":\"uniform\""));
        let back: Initializer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Initializer::Uniform { min: -1.0, max: 1.0 });
    }

    #[test_log::test]
    #[should_panic(expected = "uniform initializer needs min <= max")]
    fn inverted_uniform_bounds_panic() {
        let init: Initializer = serde_json::from_str(r#"{"type":"uniform","min":1.0,"max":-1.0}"#).unwrap();
        init.value(0, &mut StdRng::seed_from_u64(0));
    }
}
