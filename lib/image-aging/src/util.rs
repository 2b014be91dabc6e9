use rand::Rng;

/// Inclusive integer draw that collapses to `lo` when the range is empty.
pub(crate) fn randint<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

pub(crate) fn randu32<R: Rng + ?Sized>(rng: &mut R, lo: u32, hi: u32) -> u32 {
    if hi <= lo {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        rng.random_range(lo..hi)
    }
}

pub(crate) fn coin<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    if probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.random_bool(probability)
    }
}

pub(crate) fn pick<'a, R: Rng + ?Sized, T>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_empty_ranges_collapse() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(randint(&mut rng, 5, 2), 5);
        assert_eq!(randu32(&mut rng, 7, 7), 7);
        assert_eq!(uniform(&mut rng, 0.5, 0.5), 0.5);
        assert!(!coin(&mut rng, 0.0));
        assert!(coin(&mut rng, 1.0));
    }

    #[test]
    fn test_randint_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let v = randint(&mut rng, -3, 3);
            assert!((-3..=3).contains(&v));
        }
    }
}
