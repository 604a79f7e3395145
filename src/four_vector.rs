use serde::{Deserialize, Serialize};

/// Rapidity assigned to objects moving exactly along the beam axis
pub const MAX_RAP: f64 = 1e5;

/// A basic four-vector
///
/// The zero component is the energy/time component. The remainder are
/// the spatial components.
///
/// Components are plain `f64`: the invariant mass of an unphysical
/// combination is not a number and has to be representable.
#[derive(
    Deserialize,
    Serialize,
    PartialEq,
    PartialOrd,
    Debug,
    Clone,
    Copy,
    Default,
)]
pub struct FourVector {
    p: [f64; 4],
}

impl FourVector {
    /// Construct a new four-vector with all components zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Energy
    pub fn e(&self) -> f64 {
        self.p[0]
    }

    /// Momentum along x
    pub fn px(&self) -> f64 {
        self.p[1]
    }

    /// Momentum along y
    pub fn py(&self) -> f64 {
        self.p[2]
    }

    /// Momentum along the beam axis
    pub fn pz(&self) -> f64 {
        self.p[3]
    }

    /// The spatial norm \sqrt{\sum v_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> f64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> f64 {
        self.p.iter().skip(1).map(|e| e * e).sum()
    }

    /// The square of the scalar transverse momentum
    pub fn pt2(&self) -> f64 {
        self.p[1] * self.p[1] + self.p[2] * self.p[2]
    }

    /// The scalar transverse momentum
    pub fn pt(&self) -> f64 {
        self.pt2().sqrt()
    }

    /// Azimuthal angle in [0, 2π)
    pub fn phi(&self) -> f64 {
        use std::f64::consts::TAU;
        if self.pt2() == 0. {
            return 0.;
        }
        let phi = self.p[2].atan2(self.p[1]);
        if phi < 0. {
            phi + TAU
        } else {
            phi
        }
    }

    /// Pseudorapidity
    ///
    /// Objects along the beam axis get ±[MAX_RAP].
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0. {
            return MAX_RAP.copysign(self.pz());
        }
        (self.pz() / pt).asinh().clamp(-MAX_RAP, MAX_RAP)
    }

    /// Rapidity
    ///
    /// Objects with E = |pz| get ±[MAX_RAP].
    pub fn rap(&self) -> f64 {
        let (e, pz) = (self.e(), self.pz());
        if e <= pz.abs() {
            return MAX_RAP.copysign(pz);
        }
        (0.5 * ((e + pz) / (e - pz)).ln()).clamp(-MAX_RAP, MAX_RAP)
    }

    /// The invariant mass \sqrt{v_0^2 - \sum v_i^2} with i = 1,2,3
    ///
    /// Not a number for spacelike vectors.
    pub fn m(&self) -> f64 {
        self.m_sq().sqrt()
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    pub fn m_sq(&self) -> f64 {
        self.p[0] * self.p[0] - self.spatial_norm_sq()
    }

    /// Velocity of a system with this four-momentum
    pub fn beta(&self) -> [f64; 3] {
        let e = self.e();
        [self.px() / e, self.py() / e, self.pz() / e]
    }

    /// Lorentz boost into a frame moving with velocity `-beta`
    ///
    /// Boosting a four-momentum at rest by `p.beta()` yields a
    /// four-momentum moving like `p`.
    pub fn boost(&self, beta: [f64; 3]) -> FourVector {
        let b2: f64 = beta.iter().map(|b| b * b).sum();
        if b2 == 0. {
            return *self;
        }
        let gamma = 1. / (1. - b2).sqrt();
        let bp: f64 = (0..3).map(|i| beta[i] * self.p[i + 1]).sum();
        let gamma2 = (gamma - 1.) / b2;
        let e = gamma * (self.e() + bp);
        let coeff = gamma2 * bp + gamma * self.e();
        [
            e,
            self.px() + coeff * beta[0],
            self.py() + coeff * beta[1],
            self.pz() + coeff * beta[2],
        ]
        .into()
    }

    const fn len() -> usize {
        4
    }
}

impl std::convert::From<[f64; 4]> for FourVector {
    fn from(p: [f64; 4]) -> FourVector {
        FourVector { p }
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = f64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::AddAssign for FourVector {
    fn add_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] += rhs[i]
        }
    }
}

impl std::ops::SubAssign for FourVector {
    fn sub_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] -= rhs[i]
        }
    }
}

impl std::ops::Add for FourVector {
    type Output = Self;

    fn add(mut self, rhs: FourVector) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::ops::Sub for FourVector {
    type Output = Self;

    fn sub(mut self, rhs: FourVector) -> Self::Output {
        self -= rhs;
        self
    }
}

impl std::iter::Sum for FourVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FourVector::new(), |acc, p| acc + p)
    }
}

impl<'a> std::iter::Sum<&'a FourVector> for FourVector {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinematics() {
        let p = FourVector::from([5., 3., 4., 0.]);
        assert_eq!(p.pt(), 5.);
        assert_eq!(p.m_sq(), 0.);
        assert_eq!(p.eta(), 0.);
        assert_eq!(p.rap(), 0.);

        let p = FourVector::from([10., 0., -1., 0.]);
        assert!((p.phi() - 1.5 * std::f64::consts::PI).abs() < 1e-12);
        assert!((p.m() - 99f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn beam_axis() {
        let p = FourVector::from([10., 0., 0., -10.]);
        assert_eq!(p.eta(), -MAX_RAP);
        assert_eq!(p.rap(), -MAX_RAP);
        assert_eq!(p.phi(), 0.);
    }

    #[test]
    fn massless_rap_is_eta() {
        let p = FourVector::from([0., 1.3, -0.4, 7.2]);
        let p = FourVector::from([p.spatial_norm(), p[1], p[2], p[3]]);
        assert!((p.rap() - p.eta()).abs() < 1e-9);
    }

    #[test]
    fn spacelike_mass() {
        let p = FourVector::from([1., 2., 0., 0.]);
        assert!(p.m().is_nan());
    }

    #[test]
    fn boost() {
        let m = 91.;
        let at_rest = FourVector::from([m, 0., 0., 0.]);
        let moving = FourVector::from([130., 20., -30., 80.]);
        let boosted = at_rest.boost(moving.beta());
        for i in 0..4 {
            assert!((boosted[i] * moving.m() / m - moving[i]).abs() < 1e-8);
        }

        let p = FourVector::from([7., 1., 2., 3.]);
        let boosted = p.boost([0.1, -0.5, 0.3]);
        assert!((boosted.m_sq() - p.m_sq()).abs() < 1e-9);
    }

    #[test]
    fn sum() {
        let p = [
            FourVector::from([1., 2., 3., 4.]),
            FourVector::from([5., 6., 7., 8.]),
        ];
        let total: FourVector = p.iter().sum();
        assert_eq!(total, FourVector::from([6., 8., 10., 12.]));
        assert_eq!(total - p[1], p[0]);
    }
}
