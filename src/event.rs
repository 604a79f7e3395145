use crate::four_vector::FourVector;

use particle_id::ParticleID;
use serde::{Deserialize, Serialize};

/// A particle entry in a generated event record
#[derive(Deserialize, Serialize, PartialEq, Debug, Copy, Clone)]
pub struct Particle {
    /// PDG species identifier
    pub id: ParticleID,
    /// Four-momentum
    pub p: FourVector,
    /// Whether the particle is final, i.e. not decayed further
    pub is_final: bool,
}

impl Particle {
    /// A final-state particle
    pub fn new_final(id: ParticleID, p: FourVector) -> Self {
        Self { id, p, is_final: true }
    }

    /// An intermediate (decayed or incoming) particle
    pub fn new_intermediate(id: ParticleID, p: FourVector) -> Self {
        Self { id, p, is_final: false }
    }
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct EventBuilder {
    particles: Vec<Particle>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap),
        }
    }

    pub fn add_final(&mut self, id: ParticleID, p: FourVector) -> &mut Self {
        self.particles.push(Particle::new_final(id, p));
        self
    }

    pub fn add_intermediate(
        &mut self,
        id: ParticleID,
        p: FourVector,
    ) -> &mut Self {
        self.particles.push(Particle::new_intermediate(id, p));
        self
    }

    pub fn add(&mut self, particle: Particle) -> &mut Self {
        self.particles.push(particle);
        self
    }

    /// Multiply all energies and momenta by `factor`
    pub fn rescale_energies(&mut self, factor: f64) -> &mut Self {
        for particle in &mut self.particles {
            let p = particle.p;
            particle.p = [
                factor * p.e(),
                factor * p.px(),
                factor * p.py(),
                factor * p.pz(),
            ]
            .into();
        }
        self
    }

    pub fn build(self) -> Event {
        Event {
            particles: self.particles,
        }
    }
}

impl From<EventBuilder> for Event {
    fn from(b: EventBuilder) -> Self {
        b.build()
    }
}

/// A generated collision event
///
/// The particle record keeps the order in which the generator produced it.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Event {
    particles: Vec<Particle>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// All particles in record order
    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    /// Final-state particles in record order
    pub fn final_state(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter().filter(|p| p.is_final)
    }

    /// Final-state particles with the given species, in record order
    ///
    /// Particles and antiparticles both match.
    pub fn final_state_with_species(
        &self,
        id: ParticleID,
    ) -> impl Iterator<Item = &Particle> + '_ {
        self.final_state().filter(move |p| p.id.abs() == id.abs())
    }

    pub fn into_particles(self) -> Vec<Particle> {
        self.particles
    }
}

impl FromIterator<Particle> for Event {
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        Self {
            particles: Vec::from_iter(iter),
        }
    }
}
