use crate::event::Particle;
use crate::export::PlotStyle;
use crate::four_vector::FourVector;
use crate::histogram::Histogram;

/// Reconstruct physics objects from final-state particles
pub trait Reconstruct {
    /// Reconstructed objects, leading object first
    ///
    /// `final_state` contains the final-state particles of a single
    /// event in record order.
    fn reconstruct(&self, final_state: &[Particle]) -> Vec<FourVector>;
}

impl<R: Reconstruct + ?Sized> Reconstruct for &R {
    fn reconstruct(&self, final_state: &[Particle]) -> Vec<FourVector> {
        (**self).reconstruct(final_state)
    }
}

impl<R: Reconstruct + ?Sized> Reconstruct for Box<R> {
    fn reconstruct(&self, final_state: &[Particle]) -> Vec<FourVector> {
        (**self).reconstruct(final_state)
    }
}

/// Export a finished histogram
pub trait Export {
    type Error;

    fn export(
        &mut self,
        hist: &Histogram,
        style: &PlotStyle,
    ) -> Result<(), Self::Error>;
}

/// Progress indicator
pub trait Progress {
    /// Advance the progress indicator by the given amount
    fn inc(&self, i: u64);

    /// Finish the progress indicator
    fn finish(&self);
}
