use rand::Rng;

/// `0x` followed by 64 hex digits.
pub fn random_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 32] = rng.gen();
    format!("0x{}", hex::encode(bytes))
}

/// `prefix-` followed by 10 hex digits.
pub fn random_id<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let bytes: [u8; 5] = rng.gen();
    format!("{prefix}-{}", hex::encode(bytes))
}

/// Symmetric jitter in `[-span/2, span/2)`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, span: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * span
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hash_and_id_shapes() {
        let mut rng = StdRng::seed_from_u64(3);
        let hash = random_hash(&mut rng);
        assert_eq!(hash.len(), 66);
        assert!(hash.starts_with("0x"));
        assert!(hash[2..].chars().all(|c| c.is_ascii_hexdigit()));

        let id = random_id("sensor", &mut rng);
        assert!(id.starts_with("sensor-"));
        assert_eq!(id.len(), "sensor-".len() + 10);
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            let j = jitter(&mut rng, 10.0);
            assert!((-5.0..5.0).contains(&j));
        }
    }
}
