use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use invmass::{
    cluster::JetAlgorithm,
    config::{Config, Mode, Reconstruction},
};
use particle_id::ParticleID;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, ValueEnum)]
pub(crate) enum OutputFormat {
    /// A matplotlib script
    #[default]
    #[value(name = "pyplot")]
    PyPlot,
    /// YAML
    Yaml,
}

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Predefined analysis: 'dijet' or 'dimuon'.
    #[clap(short, long, default_value = "dijet")]
    pub(crate) mode: Mode,

    /// YAML configuration file.
    ///
    /// Settings that are not given in the file are taken from the
    /// predefined analysis. Command-line options take precedence over
    /// the configuration file.
    #[clap(short, long, value_parser)]
    pub(crate) config: Option<PathBuf>,

    /// Number of events to generate.
    #[clap(short, long)]
    pub(crate) nevents: Option<u64>,

    /// Jet radius parameter.
    #[clap(short = 'R', long)]
    pub(crate) radius: Option<f64>,

    #[clap(
        short = 'a',
        long,
        help = "Jet algorithm.\nPossible settings are 'anti-kt', 'kt', 'Cambridge-Aachen'."
    )]
    pub(crate) algorithm: Option<JetAlgorithm>,

    /// PDG id of the lepton species for lepton pair reconstruction.
    #[clap(long, allow_negative_numbers = true)]
    pub(crate) lepton: Option<i32>,

    /// Random number generator seed for the toy generator.
    #[clap(short, long)]
    pub(crate) seed: Option<u64>,

    /// Centre-of-mass energy in GeV for the toy generator.
    #[clap(long)]
    pub(crate) ecm: Option<f64>,

    /// Output directory.
    #[clap(long, short, value_parser, default_value = ".")]
    pub(crate) outdir: PathBuf,

    /// Output format for the histogram.
    #[clap(value_enum, short, long, default_value_t)]
    pub(crate) format: OutputFormat,

    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.
Possible values with increasing amount of output are
'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,

    /// HepMC2 event files. If none are given, events are generated
    /// with the built-in toy generator.
    #[clap(name = "INFILES", value_parser)]
    pub(crate) infiles: Vec<PathBuf>,
}

impl Opt {
    /// Combine the predefined analysis, the configuration file, and
    /// command-line options into the run configuration
    pub(crate) fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                Config::from_file_with_defaults(path, Config::preset(self.mode))?
            }
            None => Config::preset(self.mode),
        };
        if let Some(nevents) = self.nevents {
            config.nevents = nevents;
        }
        if let Some(seed) = self.seed {
            config.generator.seed = seed;
        }
        if let Some(ecm) = self.ecm {
            config.generator.e_cm = ecm;
        }
        match &mut config.reconstruction {
            Reconstruction::Jets(jet_def) => {
                if let Some(radius) = self.radius {
                    jet_def.radius = radius;
                }
                if let Some(algorithm) = self.algorithm {
                    jet_def.algorithm = algorithm;
                }
                if self.lepton.is_some() {
                    bail!("--lepton requires lepton pair reconstruction");
                }
            }
            Reconstruction::LeptonPair { lepton } => {
                if let Some(id) = self.lepton {
                    *lepton = ParticleID::new(id);
                }
                if self.radius.is_some() || self.algorithm.is_some() {
                    bail!("--radius and --algorithm require jet reconstruction");
                }
            }
        }
        Ok(config)
    }
}
