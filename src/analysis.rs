use std::fmt::Display;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Event, Particle};
use crate::export::PlotStyle;
use crate::histogram::{Fill, Histogram};
use crate::mass::invariant_mass;
use crate::progress_bar::ProgressBar;
use crate::traits::*;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AnalysisBuilder<G, R, X> {
    pub generator: G,
    pub reconstructor: R,
    pub exporter: X,
    pub style: PlotStyle,
}

impl<G, R, X> AnalysisBuilder<G, R, X> {
    pub fn build(self) -> Analysis<G, R, X> {
        Analysis {
            generator: self.generator,
            reconstructor: self.reconstructor,
            exporter: self.exporter,
            style: self.style,
        }
    }
}

impl<G, R, X> From<Analysis<G, R, X>> for AnalysisBuilder<G, R, X> {
    fn from(a: Analysis<G, R, X>) -> Self {
        AnalysisBuilder {
            generator: a.generator,
            reconstructor: a.reconstructor,
            exporter: a.exporter,
            style: a.style,
        }
    }
}

/// Invariant mass analysis
///
/// Pulls events from the generator, reconstructs the physics objects
/// from the final-state particles of each event, and fills the
/// invariant mass of the two leading objects into a histogram. The
/// finished histogram is exported once at the end of the run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Analysis<G, R, X> {
    generator: G,
    reconstructor: R,
    exporter: X,
    style: PlotStyle,
}

impl<G, R, X> From<AnalysisBuilder<G, R, X>> for Analysis<G, R, X> {
    fn from(b: AnalysisBuilder<G, R, X>) -> Self {
        b.build()
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError<E> {
    #[error("Failed to export histogram: {0}")]
    ExportErr(E),
}

/// Outcome of analysing a single event
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Outcome {
    /// Invariant mass of the two leading objects
    Mass(f64),
    /// Fewer than two objects could be reconstructed
    TooFewObjects(usize),
}

/// Bookkeeping for a completed run
#[derive(
    Deserialize, Serialize, Copy, Clone, Default, PartialEq, Eq, Hash, Debug,
)]
pub struct RunSummary {
    /// Completed loop iterations
    pub iterations: u64,
    /// Iterations without an event
    pub generation_failures: u64,
    /// Events with fewer than two reconstructed objects
    pub insufficient_objects: u64,
    /// Events where the invariant mass is not a number
    pub not_a_number: u64,
    /// Histogram fills, including underflow and overflow
    pub filled: u64,
    /// Whether the generator ran out of events before the end of the run
    pub exhausted: bool,
}

/// Reconstruct the two leading objects and compute their invariant mass
///
/// Only final-state particles are passed on to the reconstructor.
pub fn analyse_event<R: Reconstruct + ?Sized>(
    reconstructor: &R,
    event: &Event,
) -> Outcome {
    let final_state: Vec<Particle> = event.final_state().copied().collect();
    trace!("{} final-state particles", final_state.len());
    let objects = reconstructor.reconstruct(&final_state);
    match objects.as_slice() {
        [first, second, ..] => Outcome::Mass(invariant_mass(first, second)),
        _ => Outcome::TooFewObjects(objects.len()),
    }
}

impl<G, R, X> Analysis<G, R, X> {
    pub fn style(&self) -> &PlotStyle {
        &self.style
    }

    pub fn reconstructor(&self) -> &R {
        &self.reconstructor
    }
}

impl<G, R, X, E> Analysis<G, R, X>
where
    G: Iterator<Item = Result<Event, E>>,
    E: Display,
    R: Reconstruct,
    X: Export,
{
    /// Run over `nevents` generator calls and fill `histogram`
    ///
    /// Iterations where event generation fails or too few objects are
    /// reconstructed leave the histogram unchanged. They are not
    /// retried. The run ends early if the generator is exhausted.
    pub fn run(
        &mut self,
        nevents: u64,
        mut histogram: Histogram,
    ) -> Result<(Histogram, RunSummary), AnalysisError<X::Error>> {
        use AnalysisError::*;

        info!("Analysing {nevents} events");
        let mut summary = RunSummary::default();
        let progress = ProgressBar::new(nevents, "events analysed:");
        for _ in 0..nevents {
            let event = match self.generator.next() {
                Some(Ok(event)) => event,
                Some(Err(err)) => {
                    if summary.generation_failures == 0 {
                        warn!("Skipping event: {err}");
                    } else {
                        debug!("Skipping event: {err}");
                    }
                    summary.generation_failures += 1;
                    summary.iterations += 1;
                    progress.inc(1);
                    continue;
                }
                None => {
                    summary.exhausted = true;
                    break;
                }
            };
            match analyse_event(&self.reconstructor, &event) {
                Outcome::Mass(m) => {
                    trace!("Invariant mass: {m}");
                    match histogram.fill(m) {
                        Fill::NotANumber => summary.not_a_number += 1,
                        _ => summary.filled += 1,
                    }
                }
                Outcome::TooFewObjects(n) => {
                    trace!("Only {n} objects reconstructed, skipping event");
                    summary.insufficient_objects += 1;
                }
            }
            summary.iterations += 1;
            progress.inc(1);
        }
        progress.finish();
        if summary.exhausted {
            warn!(
                "Event source exhausted after {} iterations",
                summary.iterations
            );
        }
        info!(
            "Filled {} of {} events ({} failed, {} with too few objects, {} not a number)",
            summary.filled,
            summary.iterations,
            summary.generation_failures,
            summary.insufficient_objects,
            summary.not_a_number
        );
        debug!(
            "Histogram: {} in range, {} underflow, {} overflow",
            histogram.in_range(),
            histogram.underflow(),
            histogram.overflow()
        );

        self.exporter
            .export(&histogram, &self.style)
            .map_err(ExportErr)?;
        Ok((histogram, summary))
    }
}
