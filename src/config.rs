use std::{fs::File, io::BufReader, path::Path};

use log::debug;
use particle_id::ParticleID;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{
    cluster::{ClusterError, JetDefinition},
    export::PlotStyle,
    generator::Process,
    histogram::{Histogram, HistogramError},
    reconstruct::{JetReconstructor, LeptonPairReconstructor},
    traits::Reconstruct,
};

/// Default number of generated events
pub const DEFAULT_NEVENTS: u64 = 100000;

/// Predefined analyses
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    EnumString,
    Eq,
    PartialEq,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// Invariant mass of the two leading jets in Z/γ* → q q̄
    #[default]
    Dijet,
    /// Invariant mass of the first muon pair in Z/γ* → μ⁺μ⁻
    Dimuon,
}

/// Binning of the invariant mass histogram
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct Binning {
    pub bins: usize,
    pub min: f64,
    pub max: f64,
}

impl Default for Binning {
    fn default() -> Self {
        Self {
            bins: 100,
            min: 0.,
            max: 100.,
        }
    }
}

/// How to reconstruct the two objects entering the invariant mass
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Reconstruction {
    /// Cluster all final-state particles into jets
    Jets(JetDefinition),
    /// Take the first two final-state leptons of the given species
    LeptonPair { lepton: ParticleID },
}

impl Default for Reconstruction {
    fn default() -> Self {
        Self::Jets(JetDefinition::default())
    }
}

/// Invalid or unreadable run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid histogram binning: {0}")]
    Binning(#[from] HistogramError),
    #[error("Invalid jet definition: {0}")]
    JetDefinition(#[from] ClusterError),
    #[error("{0:?} is not a charged lepton")]
    NotALepton(ParticleID),
    #[error("Failed to read configuration file: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Failed to parse configuration file: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Settings for a complete run
///
/// Missing entries in a configuration file take their default values,
/// which correspond to the dijet analysis.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Number of generator calls
    pub nevents: u64,
    pub histogram: Binning,
    pub reconstruction: Reconstruction,
    /// Settings for the built-in toy generator
    pub generator: Process,
    pub plot: PlotStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self::dijet()
    }
}

impl Config {
    /// Anti-kt jets with R = 0.4 in Z/γ* → q q̄
    pub fn dijet() -> Self {
        Self {
            nevents: DEFAULT_NEVENTS,
            histogram: Binning::default(),
            reconstruction: Reconstruction::default(),
            generator: Process::dijet(),
            plot: PlotStyle::dijet(),
        }
    }

    /// Muon pairs in Z/γ* → μ⁺μ⁻
    pub fn dimuon() -> Self {
        Self {
            reconstruction: Reconstruction::LeptonPair {
                lepton: ParticleID::new(13),
            },
            generator: Process::dimuon(),
            plot: PlotStyle::dimuon(),
            ..Self::dijet()
        }
    }

    pub fn preset(mode: Mode) -> Self {
        match mode {
            Mode::Dijet => Self::dijet(),
            Mode::Dimuon => Self::dimuon(),
        }
    }

    /// Read a YAML configuration file
    ///
    /// Missing settings are taken from the dijet preset.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file_with_defaults(path, Self::default())
    }

    /// Read a YAML configuration file on top of `defaults`
    ///
    /// Settings given in the file replace the corresponding ones in
    /// `defaults`, nested settings are replaced entry by entry. The
    /// reconstruction strategy is always replaced as a whole.
    pub fn from_file_with_defaults(
        path: &Path,
        defaults: Config,
    ) -> Result<Self, ConfigError> {
        debug!("Reading configuration from {path:?}");
        let file = BufReader::new(File::open(path)?);
        let settings: Value = serde_yaml::from_reader(file)?;
        let mut config = serde_yaml::to_value(defaults)?;
        merge(&mut config, settings);
        Ok(serde_yaml::from_value(config)?)
    }

    /// Check all settings that are needed before the first event
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.histogram()?;
        self.reconstructor()?;
        Ok(())
    }

    /// An empty histogram with the configured binning
    pub fn histogram(&self) -> Result<Histogram, ConfigError> {
        let Binning { bins, min, max } = self.histogram;
        Ok(Histogram::new(min, max, bins)?)
    }

    /// The configured reconstruction strategy
    pub fn reconstructor(&self) -> Result<Box<dyn Reconstruct>, ConfigError> {
        match &self.reconstruction {
            Reconstruction::Jets(jet_def) => {
                Ok(Box::new(JetReconstructor::new(*jet_def)?))
            }
            Reconstruction::LeptonPair { lepton } => {
                if !lepton.abs().is_charged_lepton() {
                    return Err(ConfigError::NotALepton(*lepton));
                }
                Ok(Box::new(LeptonPairReconstructor::new(*lepton)))
            }
        }
    }
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(entry) => merge(entry, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
