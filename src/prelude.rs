pub use crate::{
    analysis::{Analysis, AnalysisBuilder, RunSummary},
    cluster::{JetAlgorithm, JetDefinition},
    config::{Config, Mode},
    event::{Event, EventBuilder, Particle},
    export::{PlotStyle, PyPlotExport, YamlExport, NO_EXPORT},
    four_vector::FourVector,
    generator::{Process, ToyGenerator},
    histogram::Histogram,
    mass::invariant_mass,
    reconstruct::{JetReconstructor, LeptonPairReconstructor},
    traits::*,
};
