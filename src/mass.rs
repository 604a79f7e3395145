use crate::four_vector::FourVector;

/// Invariant mass of the system formed by `p1` and `p2`
///
/// No check is performed whether the inputs are physical. If the
/// squared mass of the combined system is negative the result is not a
/// number.
pub fn invariant_mass(p1: &FourVector, p2: &FourVector) -> f64 {
    let e = p1.e() + p2.e();
    let px = p1.px() + p2.px();
    let py = p1.py() + p2.py();
    let pz = p1.pz() + p2.pz();
    (e * e - px * px - py * py - pz * pz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256Plus;

    fn random_timelike(rng: &mut impl Rng) -> FourVector {
        let px: f64 = rng.gen_range(-100.0..100.0);
        let py: f64 = rng.gen_range(-100.0..100.0);
        let pz: f64 = rng.gen_range(-100.0..100.0);
        let m: f64 = rng.gen_range(0.0..10.0);
        let e = (px * px + py * py + pz * pz + m * m).sqrt();
        [e, px, py, pz].into()
    }

    #[test]
    fn at_rest() {
        let p: FourVector = [50., 0., 0., 0.].into();
        assert_eq!(invariant_mass(&p, &p), 100.);
    }

    #[test]
    fn twice_rest_mass() {
        let p: FourVector = [13., 3., 4., 12.].into();
        assert!((p.m() - 0.).abs() < 1e-12);
        let p: FourVector = [15., 3., 4., 12.].into();
        assert!((invariant_mass(&p, &p) - 2. * p.m()).abs() < 1e-12);
    }

    #[test]
    fn symmetric_and_non_negative() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        for _ in 0..1000 {
            let p1 = random_timelike(&mut rng);
            let p2 = random_timelike(&mut rng);
            let m = invariant_mass(&p1, &p2);
            assert!(m >= 0.);
            assert_eq!(m, invariant_mass(&p2, &p1));
        }
    }

    #[test]
    fn spacelike() {
        let p1: FourVector = [1., 5., 0., 0.].into();
        let p2: FourVector = [1., 5., 0., 0.].into();
        assert!(invariant_mass(&p1, &p2).is_nan());
    }
}
