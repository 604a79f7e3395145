//! `invmass` reconstructs the invariant mass of a decaying boson from
//! simulated collider events.
//!
//! Two reconstruction strategies are available: clustering all
//! final-state particles into jets with a sequential recombination
//! algorithm (anti-kt by default) and taking the first pair of
//! final-state leptons of a given species. In both cases the invariant
//! mass of the two leading objects is filled into a histogram.
//!
//! # How to use
//!
//! ```no_run
//! use invmass::prelude::*;
//!
//! let generator = ToyGenerator::new(Process::dimuon()).unwrap();
//! let mut analysis = AnalysisBuilder {
//!     generator,
//!     reconstructor: LeptonPairReconstructor::default(),
//!     exporter: PyPlotExport::builder().build(),
//!     style: PlotStyle::dimuon(),
//! }
//! .build();
//! let hist = Histogram::new(0., 200., 100).unwrap();
//! let (hist, summary) = analysis.run(10000, hist).unwrap();
//! ```
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [analysis] contains the event loop
//! - [reconstruct] for the reconstruction strategies
//! - [cluster] for jet clustering
//! - [histogram] for the histogram
//! - [generator] for the built-in toy event generator
//! - [export] for writing the final histogram

/// Event analysis driver
pub mod analysis;
/// Jet clustering
pub mod cluster;
/// Run configuration
pub mod config;
/// Generated event record
pub mod event;
/// Histogram export
pub mod export;
/// Four-vector class
pub mod four_vector;
pub mod generator;
/// HepMC2 interface
#[cfg(feature = "hepmc2")]
pub mod hepmc2;
/// Fixed-range histogram
pub mod histogram;
/// Invariant mass
pub mod mass;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Reconstruction of physics objects
pub mod reconstruct;
/// Common traits
pub mod traits;

use lazy_static::lazy_static;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
lazy_static! {
    pub static ref VERSION_MAJOR: u32 =
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or_default();
    pub static ref VERSION_MINOR: u32 =
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or_default();
    pub static ref VERSION_PATCH: u32 =
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or_default();
}
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");

pub const FEATURES: [&str; NFEATURES] = [
    #[cfg(feature = "hepmc2")]
    "hepmc2",
];

const NFEATURES: usize = {
    #[allow(unused_mut)]
    let mut nfeatures = 0;
    #[cfg(feature = "hepmc2")]
    {
        nfeatures += 1;
    }
    nfeatures
};
