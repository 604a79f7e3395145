use log::trace;
use particle_id::{sm_elementary_particles::muon, ParticleID};
use serde::{Deserialize, Serialize};

use crate::{
    cluster::{cluster, ClusterError, JetDefinition},
    event::Particle,
    four_vector::FourVector,
    traits::Reconstruct,
};

/// Reconstruct jets from all final-state particles
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct JetReconstructor {
    jet_def: JetDefinition,
}

impl JetReconstructor {
    pub fn new(jet_def: JetDefinition) -> Result<Self, ClusterError> {
        jet_def.validate()?;
        Ok(Self { jet_def })
    }

    pub fn jet_def(&self) -> &JetDefinition {
        &self.jet_def
    }
}

impl Reconstruct for JetReconstructor {
    fn reconstruct(&self, final_state: &[Particle]) -> Vec<FourVector> {
        let particles: Vec<_> = final_state.iter().map(|p| p.p).collect();
        let jets = cluster(&particles, &self.jet_def);
        trace!("Clustered {} particles into {} jets", particles.len(), jets.len());
        jets
    }
}

/// Select a lepton pair of a given species
///
/// The first two matching particles in record order are used, no
/// matter their energy. Particles and antiparticles both match.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct LeptonPairReconstructor {
    lepton: ParticleID,
}

impl LeptonPairReconstructor {
    pub fn new(lepton: ParticleID) -> Self {
        Self { lepton }
    }

    pub fn lepton(&self) -> ParticleID {
        self.lepton
    }
}

impl Default for LeptonPairReconstructor {
    fn default() -> Self {
        Self::new(muon)
    }
}

impl Reconstruct for LeptonPairReconstructor {
    fn reconstruct(&self, final_state: &[Particle]) -> Vec<FourVector> {
        final_state
            .iter()
            .filter(|p| p.id.abs() == self.lepton.abs())
            .take(2)
            .map(|p| p.p)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use particle_id::sm_elementary_particles::{electron, photon};

    const ANTI_MUON: ParticleID = ParticleID::new(-13);
    const PI_PLUS: ParticleID = ParticleID::new(211);

    fn p(e: f64) -> FourVector {
        [e, 0., 0., e].into()
    }

    #[test]
    fn first_two_leptons() {
        let particles = [
            Particle::new_final(photon, p(100.)),
            Particle::new_final(muon, p(1.)),
            Particle::new_final(electron, p(2.)),
            Particle::new_final(ANTI_MUON, p(3.)),
            Particle::new_final(muon, p(400.)),
        ];
        let leptons = LeptonPairReconstructor::default().reconstruct(&particles);
        assert_eq!(leptons, [p(1.), p(3.)]);
    }

    #[test]
    fn single_lepton() {
        let particles = [
            Particle::new_final(photon, p(100.)),
            Particle::new_final(ANTI_MUON, p(3.)),
        ];
        let leptons = LeptonPairReconstructor::default().reconstruct(&particles);
        assert_eq!(leptons.len(), 1);
    }

    #[test]
    fn other_species() {
        let particles = [
            Particle::new_final(muon, p(1.)),
            Particle::new_final(electron, p(2.)),
            Particle::new_final(ParticleID::new(-11), p(3.)),
        ];
        let leptons =
            LeptonPairReconstructor::new(electron).reconstruct(&particles);
        assert_eq!(leptons, [p(2.), p(3.)]);
    }

    #[test]
    fn invalid_radius() {
        assert!(JetReconstructor::new(JetDefinition::anti_kt(0.)).is_err());
    }

    #[test]
    fn dijet() {
        let reco = JetReconstructor::new(JetDefinition::default()).unwrap();
        let particles = [
            Particle::new_final(PI_PLUS, [10., 10., 0., 0.].into()),
            Particle::new_final(photon, [5., 5., 0.1, 0.].into()),
            Particle::new_final(PI_PLUS, [20., -20., 0., 0.].into()),
        ];
        let jets = reco.reconstruct(&particles);
        assert_eq!(jets.len(), 2);
        assert_eq!(jets[0], [20., -20., 0., 0.].into());
        assert_eq!(jets[1], [15., 15., 0.1, 0.].into());
    }

    #[test]
    fn too_few_particles() {
        let reco = JetReconstructor::new(JetDefinition::default()).unwrap();
        let particles = [Particle::new_final(PI_PLUS, p(10.))];
        assert!(reco.reconstruct(&particles).len() < 2);
    }
}
