use std::{
    f64::consts::{PI, TAU},
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::four_vector::FourVector;

/// Jet clustering algorithms
#[derive(Deserialize, Serialize, Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum JetAlgorithm {
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    #[default]
    AntiKt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    CambridgeAachen,
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    Kt,
}

impl JetAlgorithm {
    /// Momentum factor entering the distances, i.e. pt^(2p)
    fn momentum_factor(self, p: &FourVector) -> f64 {
        match self {
            // capped so that coincident zero-pt particles don't produce NaN
            Self::AntiKt => (1. / p.pt2()).min(f64::MAX),
            Self::CambridgeAachen => 1.,
            Self::Kt => p.pt2(),
        }
    }
}

/// Placeholder for an unknown jet algorithm
#[derive(Debug, Clone, Error)]
pub struct UnknownJetAlgorithm(String);

impl Display for UnknownJetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown jet algorithm: {}", self.0)
    }
}

impl FromStr for JetAlgorithm {
    type Err = UnknownJetAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anti_kt" | "antikt" | "anti-kt" => Ok(Self::AntiKt),
            "kt" => Ok(Self::Kt),
            "Cambridge/Aachen" | "Cambridge-Aachen" | "Cambridge_Aachen"
            | "cambridge/aachen" | "cambridge-aachen" | "cambridge_aachen" => {
                Ok(Self::CambridgeAachen)
            }
            _ => Err(UnknownJetAlgorithm(s.to_string())),
        }
    }
}

/// Longitudinal coordinate used for angular distances
#[derive(Deserialize, Serialize, Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Rapidity {
    /// Pseudorapidity η
    #[default]
    Pseudo,
    /// Rapidity y, as in FastJet
    True,
}

/// Definition of a jet
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct JetDefinition {
    /// Jet algorithm
    #[serde(default)]
    pub algorithm: JetAlgorithm,
    /// Jet radius parameter
    pub radius: f64,
    /// Minimum jet transverse momentum
    #[serde(default)]
    pub min_pt: f64,
    /// Longitudinal coordinate for the angular separation
    #[serde(default)]
    pub rapidity: Rapidity,
}

/// Default jet radius
pub const DEFAULT_RADIUS: f64 = 0.4;

impl Default for JetDefinition {
    fn default() -> Self {
        Self {
            algorithm: JetAlgorithm::AntiKt,
            radius: DEFAULT_RADIUS,
            min_pt: 0.,
            rapidity: Rapidity::Pseudo,
        }
    }
}

/// Invalid jet definition
#[derive(Debug, Copy, Clone, Error, PartialEq)]
pub enum ClusterError {
    /// Jet radius is not positive
    #[error("Jet radius has to be positive, but is {0}")]
    InvalidRadius(f64),
    /// Minimum transverse momentum is negative or not a number
    #[error("Minimum jet transverse momentum has to be non-negative, but is {0}")]
    InvalidMinPt(f64),
}

impl JetDefinition {
    /// Anti-kt jets with the given radius and no transverse momentum cut
    pub fn anti_kt(radius: f64) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ClusterError> {
        if !(self.radius > 0.) || !self.radius.is_finite() {
            return Err(ClusterError::InvalidRadius(self.radius));
        }
        if !(self.min_pt >= 0.) {
            return Err(ClusterError::InvalidMinPt(self.min_pt));
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
struct Candidate {
    p: FourVector,
    rap: f64,
    phi: f64,
    momentum_factor: f64,
    nn: Option<usize>,
    nn_dist: f64,
}

impl Candidate {
    fn new(p: FourVector, jet_def: &JetDefinition) -> Self {
        let rap = match jet_def.rapidity {
            Rapidity::Pseudo => p.eta(),
            Rapidity::True => p.rap(),
        };
        Self {
            p,
            rap,
            phi: p.phi(),
            momentum_factor: jet_def.algorithm.momentum_factor(&p),
            nn: None,
            nn_dist: f64::MAX,
        }
    }

    fn delta_r2(&self, other: &Candidate) -> f64 {
        let drap = self.rap - other.rap;
        let mut dphi = (self.phi - other.phi).abs();
        if dphi > PI {
            dphi = TAU - dphi;
        }
        drap * drap + dphi * dphi
    }
}

/// Cluster `particles` into jets
///
/// Sequential recombination in the E scheme. Jets are returned sorted
/// by descending transverse momentum. Without a transverse momentum
/// cut every input particle ends up in exactly one jet.
///
/// Candidates are kept in slots indexed by the lowest original index of
/// their constituents. On equal distances the lowest slot wins, so the
/// result only depends on the input order and the jet definition.
pub fn cluster(
    particles: &[FourVector],
    jet_def: &JetDefinition,
) -> Vec<FourVector> {
    let r2 = jet_def.radius * jet_def.radius;
    let mut slots: Vec<_> = particles
        .iter()
        .map(|p| Some(Candidate::new(*p, jet_def)))
        .collect();
    for i in 0..slots.len() {
        update_nn(&mut slots, i, r2);
    }

    let mut jets = Vec::new();
    while let Some((i, nn)) = closest(&slots, r2) {
        let Some(ci) = slots[i].take() else {
            break;
        };
        match nn.and_then(|j| slots[j].take().map(|cj| (j, cj))) {
            Some((j, cj)) => {
                let k = std::cmp::min(i, j);
                slots[k] = Some(Candidate::new(ci.p + cj.p, jet_def));
                refresh(&mut slots, &[i, j], Some(k), r2);
            }
            None => {
                jets.push(ci.p);
                refresh(&mut slots, &[i], None, r2);
            }
        }
    }

    let min_pt2 = jet_def.min_pt * jet_def.min_pt;
    jets.retain(|jet| jet.pt2() >= min_pt2);
    jets.sort_by(|a, b| b.pt2().total_cmp(&a.pt2()));
    jets
}

// find the candidate with the smallest distance to either another
// candidate or the beam
// returns the slot and, for a recombination, the slot of the partner
fn closest(
    slots: &[Option<Candidate>],
    r2: f64,
) -> Option<(usize, Option<usize>)> {
    let mut best: Option<(usize, Option<usize>, f64)> = None;
    for (i, c) in slots.iter().enumerate() {
        let Some(c) = c else { continue };
        let partner = c.nn.and_then(|j| slots[j].as_ref().map(|cj| (j, cj)));
        let (nn, dist) = match partner {
            Some((j, cj)) => (
                Some(j),
                c.momentum_factor.min(cj.momentum_factor) * c.nn_dist / r2,
            ),
            None => (None, c.momentum_factor),
        };
        if best.map_or(true, |(_, _, best_dist)| dist < best_dist) {
            best = Some((i, nn, dist));
        }
    }
    best.map(|(i, nn, _)| (i, nn))
}

// geometric nearest neighbour within the jet radius
fn update_nn(slots: &mut [Option<Candidate>], i: usize, r2: f64) {
    let Some(ci) = &slots[i] else { return };
    let mut nn = None;
    let mut nn_dist = r2;
    for (j, cj) in slots.iter().enumerate() {
        let Some(cj) = cj else { continue };
        if j == i {
            continue;
        }
        let dist = ci.delta_r2(cj);
        if dist < nn_dist {
            nn = Some(j);
            nn_dist = dist;
        }
    }
    if let Some(ci) = &mut slots[i] {
        ci.nn = nn;
        ci.nn_dist = nn_dist;
    }
}

// update nearest neighbours after candidates in `removed` have been
// taken out and possibly a new candidate was put into slot `added`
fn refresh(
    slots: &mut [Option<Candidate>],
    removed: &[usize],
    added: Option<usize>,
    r2: f64,
) {
    if let Some(k) = added {
        update_nn(slots, k, r2);
    }
    for m in 0..slots.len() {
        if Some(m) == added {
            continue;
        }
        let Some(cm) = &slots[m] else { continue };
        if cm.nn.map_or(false, |nn| removed.contains(&nn)) {
            update_nn(slots, m, r2);
            continue;
        }
        let Some(k) = added else { continue };
        let Some(ck) = &slots[k] else { continue };
        let dist = cm.delta_r2(ck);
        if dist < cm.nn_dist {
            if let Some(cm) = &mut slots[m] {
                cm.nn = Some(k);
                cm.nn_dist = dist;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jetty::{anti_kt_f, Cluster, PseudoJet};
    use log::debug;
    use noisy_float::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256Plus;

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn massless(pt: f64, y: f64, phi: f64) -> FourVector {
        [pt * y.cosh(), pt * phi.cos(), pt * phi.sin(), pt * y.sinh()].into()
    }

    fn random_particles(rng: &mut impl Rng, n: usize) -> Vec<FourVector> {
        (0..n)
            .map(|_| {
                let pt = rng.gen_range(0.5..50.);
                let y = rng.gen_range(-2.5..2.5);
                let phi = rng.gen_range(0.0..TAU);
                massless(pt, y, phi)
            })
            .collect()
    }

    fn assert_close(a: &FourVector, b: &FourVector) {
        for i in 0..4 {
            assert!(
                (a[i] - b[i]).abs() <= 1e-9 * (1. + b[i].abs()),
                "{a:?} != {b:?}"
            );
        }
    }

    #[test]
    fn invalid_definition() {
        assert_eq!(
            JetDefinition::anti_kt(0.).validate(),
            Err(ClusterError::InvalidRadius(0.))
        );
        assert!(JetDefinition::anti_kt(-0.4).validate().is_err());
        assert!(JetDefinition::anti_kt(f64::NAN).validate().is_err());
        let def = JetDefinition {
            min_pt: -1.,
            ..Default::default()
        };
        assert_eq!(def.validate(), Err(ClusterError::InvalidMinPt(-1.)));
        assert!(JetDefinition::default().validate().is_ok());
    }

    #[test]
    fn parse_algorithm() {
        assert_eq!("anti-kt".parse::<JetAlgorithm>().unwrap(), JetAlgorithm::AntiKt);
        assert_eq!("kt".parse::<JetAlgorithm>().unwrap(), JetAlgorithm::Kt);
        assert_eq!(
            "cambridge_aachen".parse::<JetAlgorithm>().unwrap(),
            JetAlgorithm::CambridgeAachen
        );
        assert!("siscone".parse::<JetAlgorithm>().is_err());
    }

    #[test]
    fn empty() {
        assert!(cluster(&[], &JetDefinition::default()).is_empty());
    }

    #[test]
    fn single() {
        let p = massless(10., 0.3, 1.);
        assert_eq!(cluster(&[p], &JetDefinition::default()), [p]);
    }

    #[test]
    fn collinear_pair_merges() {
        let p1 = massless(10., 0.1, 1.);
        let p2 = massless(5., 0.15, 1.05);
        let far = massless(20., -1., 4.);
        let jets = cluster(&[p1, p2, far], &JetDefinition::default());
        assert_eq!(jets.len(), 2);
        assert_eq!(jets[0], far);
        assert_close(&jets[1], &(p1 + p2));
    }

    #[test]
    fn conservation() {
        log_init();
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        for algorithm in [
            JetAlgorithm::AntiKt,
            JetAlgorithm::Kt,
            JetAlgorithm::CambridgeAachen,
        ] {
            let def = JetDefinition {
                algorithm,
                ..Default::default()
            };
            for n in 1..40 {
                let particles = random_particles(&mut rng, n);
                let jets = cluster(&particles, &def);
                debug!("{algorithm:?}: {n} particles -> {} jets", jets.len());
                assert!(!jets.is_empty() && jets.len() <= n);
                let total: FourVector = particles.iter().sum();
                assert_close(&jets.iter().sum(), &total);
            }
        }
    }

    #[test]
    fn sorted_by_pt() {
        let mut rng = Xoshiro256Plus::seed_from_u64(4);
        let particles = random_particles(&mut rng, 50);
        let jets = cluster(&particles, &JetDefinition::default());
        assert!(jets.windows(2).all(|j| j[0].pt() >= j[1].pt()));
    }

    #[test]
    fn deterministic() {
        let mut rng = Xoshiro256Plus::seed_from_u64(5);
        let particles = random_particles(&mut rng, 50);
        let def = JetDefinition::default();
        assert_eq!(cluster(&particles, &def), cluster(&particles, &def));
    }

    #[test]
    fn tie_break() {
        // the middle particle is exactly equally close to both
        // neighbours, which are too far apart to be merged directly
        let e = 104f64.sqrt();
        let left: FourVector = [e, 10., 0., -2.].into();
        let middle: FourVector = [10., 10., 0., 0.].into();
        let right: FourVector = [e, 10., 0., 2.].into();
        let def = JetDefinition::anti_kt(0.25);
        let jets = cluster(&[left, middle, right], &def);
        assert_eq!(jets.len(), 2);
        assert!(jets.contains(&right));
        assert!(jets.contains(&(left + middle)));
    }

    #[test]
    fn large_radius() {
        let mut rng = Xoshiro256Plus::seed_from_u64(6);
        let particles = random_particles(&mut rng, 30);
        let jets = cluster(&particles, &JetDefinition::anti_kt(100.));
        assert_eq!(jets.len(), 1);
        assert_close(&jets[0], &particles.iter().sum());
    }

    #[test]
    fn small_radius() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let particles = random_particles(&mut rng, 30);
        let jets = cluster(&particles, &JetDefinition::anti_kt(1e-6));
        assert_eq!(jets.len(), particles.len());
        for p in &particles {
            assert!(jets.contains(p));
        }
    }

    #[test]
    fn min_pt() {
        let soft = massless(1., 0., 0.);
        let hard = massless(30., 0., 3.);
        let def = JetDefinition {
            min_pt: 5.,
            ..Default::default()
        };
        assert_eq!(cluster(&[soft, hard], &def), [hard]);
    }

    #[test]
    fn zero_pt() {
        let beam: FourVector = [5., 0., 0., 5.].into();
        let p = massless(10., 0., 1.);
        let jets = cluster(&[beam, beam, p], &JetDefinition::default());
        assert_close(&jets.iter().sum(), &(beam + beam + p));
    }

    #[test]
    fn same_as_jetty() {
        log_init();
        let mut rng = Xoshiro256Plus::seed_from_u64(8);
        let def = JetDefinition {
            rapidity: Rapidity::True,
            ..Default::default()
        };
        for n in [2, 5, 10, 50, 100] {
            let particles = random_particles(&mut rng, n);
            let jets = cluster(&particles, &def);

            let partons: Vec<PseudoJet> = particles
                .iter()
                .map(|p| [n64(p[0]), n64(p[1]), n64(p[2]), n64(p[3])].into())
                .collect();
            let cut = |jet: PseudoJet| jet.pt2() >= 0.;
            let mut reference: Vec<FourVector> = partons
                .cluster_if(anti_kt_f(def.radius), cut)
                .into_iter()
                .map(|j| {
                    [j.e().raw(), j.px().raw(), j.py().raw(), j.pz().raw()]
                        .into()
                })
                .collect();
            reference.sort_by(|a, b| b.pt2().total_cmp(&a.pt2()));
            debug!("{n} particles: {} jets", jets.len());

            assert_eq!(jets.len(), reference.len());
            for (jet, reference) in jets.iter().zip(&reference) {
                assert_close(jet, reference);
            }
        }
    }
}
