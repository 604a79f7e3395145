//! A toy event generator for Z/γ* production in proton-proton collisions
//!
//! The boson mass follows a Breit-Wigner distribution around the Z
//! pole, the boson decays isotropically into a fermion-antifermion pair
//! of one of the selected species. Quarks are fragmented into a handful
//! of collinear pions and photons. Optionally, soft particles from the
//! underlying event are added.
//!
//! Any iterator over `Result<Event, E>` can serve as an event source for
//! [Analysis](crate::analysis::Analysis). An `Err` item is a failed
//! generation attempt.
use std::f64::consts::TAU;

use derive_builder::Builder;
use log::{debug, trace};
use particle_id::ParticleID;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    event::{Event, EventBuilder},
    four_vector::FourVector,
};

/// Z boson pole mass in GeV
pub const Z_MASS: f64 = 91.1876;
/// Z boson width in GeV
pub const Z_WIDTH: f64 = 2.4952;
/// Default centre-of-mass energy in GeV
pub const DEFAULT_E_CM: f64 = 13000.;

const MIN_BOSON_MASS: f64 = 10.;
const MAX_BOSON_MASS: f64 = 200.;
const MAX_BOSON_RAP: f64 = 2.5;
const MEAN_BOSON_PT: f64 = 10.;

const MAX_FRAGMENTS: usize = 8;
const MAX_KICK: f64 = 0.5;
const MAX_UE_PARTICLES: usize = 10;
const MEAN_UE_PT: f64 = 0.5;
const MAX_UE_RAP: f64 = 4.;

const PION_MASS: f64 = 0.13957;

const PROTON: ParticleID = ParticleID::new(2212);
const Z: ParticleID = ParticleID::new(23);
const PHOTON: ParticleID = ParticleID::new(22);
const PI_PLUS: ParticleID = ParticleID::new(211);
const PI_MINUS: ParticleID = ParticleID::new(-211);

/// Light quarks and the bottom quark
pub const QUARKS: [ParticleID; 5] = [
    ParticleID::new(1),
    ParticleID::new(2),
    ParticleID::new(3),
    ParticleID::new(4),
    ParticleID::new(5),
];

fn fermion_mass(id: ParticleID) -> Option<f64> {
    let mass = match id.abs().id() {
        1 => 0.0047,
        2 => 0.0022,
        3 => 0.096,
        4 => 1.27,
        5 => 4.18,
        11 => 0.000511,
        12 | 14 | 16 => 0.,
        13 => 0.10566,
        15 => 1.777,
        _ => return None,
    };
    Some(mass)
}

fn is_quark(id: ParticleID) -> bool {
    (1..=5).contains(&id.abs().id())
}

/// Settings for the toy generator
#[derive(Builder, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Process {
    /// Centre-of-mass energy in GeV
    #[builder(default = "DEFAULT_E_CM")]
    pub e_cm: f64,
    /// Allowed decay products of the boson
    ///
    /// Only the absolute value of the particle id matters.
    #[builder(default = "QUARKS.to_vec()")]
    pub decays: Vec<ParticleID>,
    /// Probability for a generation attempt to fail
    #[builder(default = "0.")]
    pub failure_rate: f64,
    /// Whether to add soft underlying-event particles
    #[builder(default = "true")]
    pub underlying_event: bool,
    /// Random number generator seed
    #[builder(default)]
    pub seed: u64,
}

impl Default for Process {
    fn default() -> Self {
        Self {
            e_cm: DEFAULT_E_CM,
            decays: QUARKS.to_vec(),
            failure_rate: 0.,
            underlying_event: true,
            seed: 0,
        }
    }
}

impl Process {
    /// Z/γ* decaying to light and bottom quarks
    pub fn dijet() -> Self {
        Self::default()
    }

    /// Z/γ* decaying to muons
    pub fn dimuon() -> Self {
        Self {
            decays: vec![ParticleID::new(13)],
            ..Default::default()
        }
    }
}

/// Invalid generator settings
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeneratorError {
    #[error("Centre-of-mass energy {0} GeV is too low")]
    InvalidEnergy(f64),
    #[error("No boson decay channels selected")]
    NoDecays,
    #[error("Unsupported boson decay into {0:?}")]
    UnsupportedDecay(ParticleID),
    #[error("Failure rate {0} is not a probability")]
    InvalidFailureRate(f64),
}

/// A single event generation attempt failed
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
#[error("Event generation failed")]
pub struct GenerationFailure;

/// Toy generator for Z/γ* events
///
/// Yields an unending sequence of events.
#[derive(Clone, Debug)]
pub struct ToyGenerator {
    process: Process,
    rng: Xoshiro256Plus,
}

impl ToyGenerator {
    pub fn new(process: Process) -> Result<Self, GeneratorError> {
        use GeneratorError::*;

        if !(process.e_cm > MIN_BOSON_MASS) {
            return Err(InvalidEnergy(process.e_cm));
        }
        if process.decays.is_empty() {
            return Err(NoDecays);
        }
        if let Some(id) =
            process.decays.iter().find(|id| fermion_mass(**id).is_none())
        {
            return Err(UnsupportedDecay(*id));
        }
        if !(0. ..=1.).contains(&process.failure_rate) {
            return Err(InvalidFailureRate(process.failure_rate));
        }
        debug!("Toy generator settings: {process:?}");
        let rng = Xoshiro256Plus::seed_from_u64(process.seed);
        Ok(Self { process, rng })
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    fn generate(&mut self) -> Event {
        let m = self.boson_mass();
        let boson = self.boson_momentum(m);
        let channel = self.rng.gen_range(0..self.process.decays.len());
        let fermion = self.process.decays[channel].abs();
        let anti_fermion = ParticleID::new(-fermion.id());
        // settings are validated on construction
        let mf = fermion_mass(fermion).unwrap_or_default();
        let (f, fbar) = self.decay(&boson, mf);
        trace!("Generated boson with mass {m} decaying to {fermion:?}");

        let mut event = EventBuilder::with_capacity(64);
        let beam_e = self.process.e_cm / 2.;
        event
            .add_intermediate(PROTON, [beam_e, 0., 0., beam_e].into())
            .add_intermediate(PROTON, [beam_e, 0., 0., -beam_e].into())
            .add_intermediate(Z, boson);
        if is_quark(fermion) {
            event
                .add_intermediate(fermion, f)
                .add_intermediate(anti_fermion, fbar);
            self.fragment(&f, &mut event);
            self.fragment(&fbar, &mut event);
        } else {
            event.add_final(fermion, f).add_final(anti_fermion, fbar);
        }
        if self.process.underlying_event {
            self.add_underlying_event(&mut event);
        }
        event.build()
    }

    // Breit-Wigner distribution truncated to [MIN_BOSON_MASS, MAX_BOSON_MASS]
    fn boson_mass(&mut self) -> f64 {
        let max = MAX_BOSON_MASS.min(self.process.e_cm);
        let to_angle = |m: f64| (2. * (m - Z_MASS) / Z_WIDTH).atan();
        let (lo, hi) = (to_angle(MIN_BOSON_MASS), to_angle(max));
        let angle = lo + (hi - lo) * self.rng.gen::<f64>();
        Z_MASS + 0.5 * Z_WIDTH * angle.tan()
    }

    fn boson_momentum(&mut self, m: f64) -> FourVector {
        let pt = -MEAN_BOSON_PT * (1. - self.rng.gen::<f64>()).ln();
        let mt = (m * m + pt * pt).sqrt();
        let max_rap = (self.process.e_cm / mt).ln().clamp(0., MAX_BOSON_RAP);
        let y = max_rap * (2. * self.rng.gen::<f64>() - 1.);
        let phi = TAU * self.rng.gen::<f64>();
        [mt * y.cosh(), pt * phi.cos(), pt * phi.sin(), mt * y.sinh()].into()
    }

    // isotropic two-body decay into particles with mass `mf`
    fn decay(
        &mut self,
        boson: &FourVector,
        mf: f64,
    ) -> (FourVector, FourVector) {
        let m = boson.m();
        let e = m / 2.;
        let p = (e * e - mf * mf).max(0.).sqrt();
        let cos_theta: f64 = 2. * self.rng.gen::<f64>() - 1.;
        let sin_theta = (1. - cos_theta * cos_theta).max(0.).sqrt();
        let phi = TAU * self.rng.gen::<f64>();
        let dir = [sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta];
        let f = FourVector::from([e, p * dir[0], p * dir[1], p * dir[2]]);
        let fbar = FourVector::from([e, -p * dir[0], -p * dir[1], -p * dir[2]]);
        let beta = boson.beta();
        (f.boost(beta), fbar.boost(beta))
    }

    // split a quark into collinear massless photons and pions
    fn fragment(&mut self, quark: &FourVector, event: &mut EventBuilder) {
        let nfragments = self.rng.gen_range(2..=MAX_FRAGMENTS);
        let weights: Vec<f64> = (0..nfragments)
            .map(|_| 0.05 + self.rng.gen::<f64>())
            .collect();
        let norm: f64 = weights.iter().sum();
        let mut kicks: Vec<[f64; 3]> = (0..nfragments)
            .map(|_| {
                [(); 3].map(|_| MAX_KICK * (2. * self.rng.gen::<f64>() - 1.))
            })
            .collect();
        // kicks must not change the total momentum
        for i in 0..3 {
            let mean = kicks.iter().map(|k| k[i]).sum::<f64>() / nfragments as f64;
            kicks.iter_mut().for_each(|k| k[i] -= mean);
        }
        for (w, kick) in weights.iter().zip(kicks) {
            let z = w / norm;
            let p = [
                z * quark.px() + kick[0],
                z * quark.py() + kick[1],
                z * quark.pz() + kick[2],
            ];
            let (id, m) = match self.rng.gen_range(0..3) {
                0 => (PHOTON, 0.),
                1 => (PI_PLUS, PION_MASS),
                _ => (PI_MINUS, PION_MASS),
            };
            let e = (p.iter().map(|p| p * p).sum::<f64>() + m * m).sqrt();
            event.add_final(id, [e, p[0], p[1], p[2]].into());
        }
    }

    fn add_underlying_event(&mut self, event: &mut EventBuilder) {
        let nparticles = self.rng.gen_range(0..=MAX_UE_PARTICLES);
        for _ in 0..nparticles {
            let pt = -MEAN_UE_PT * (1. - self.rng.gen::<f64>()).ln();
            let eta = MAX_UE_RAP * (2. * self.rng.gen::<f64>() - 1.);
            let phi = TAU * self.rng.gen::<f64>();
            let (px, py, pz) = (pt * phi.cos(), pt * phi.sin(), pt * eta.sinh());
            let e = (pt * pt + pz * pz + PION_MASS * PION_MASS).sqrt();
            let id = if self.rng.gen() { PI_PLUS } else { PI_MINUS };
            event.add_final(id, [e, px, py, pz].into());
        }
    }
}

impl Iterator for ToyGenerator {
    type Item = Result<Event, GenerationFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rng.gen::<f64>() < self.process.failure_rate {
            return Some(Err(GenerationFailure));
        }
        Some(Ok(self.generate()))
    }
}
