use log::warn;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error constructing a histogram
#[derive(Debug, Copy, Clone, Error, PartialEq)]
pub enum HistogramError {
    /// A range boundary is not a number
    #[error("Histogram range boundary is not a number")]
    NotANumber,
    /// Upper boundary is not above the lower one
    #[error("Empty histogram range [{0}, {1})")]
    EmptyRange(f64, f64),
    /// Zero bins requested
    #[error("Histogram needs at least one bin")]
    NoBins,
}

/// Where a value ended up after [Histogram::fill]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Fill {
    /// Bin with the given index
    Bin(usize),
    /// Below the histogram range
    Underflow,
    /// At or above the upper end of the histogram range
    Overflow,
    /// Not a number, counted separately
    NotANumber,
}

/// Histogram with equal-width bins over [min, max)
///
/// Counts are exact. Values outside the range go to the underflow and
/// overflow counters and values that are not a number are only
/// counted, so that the sum of all counters always equals the number of
/// [fill](Self::fill) calls.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RawHistogram")]
pub struct Histogram {
    min: N64,
    max: N64,
    bins: Vec<u64>,
    underflow: u64,
    overflow: u64,
    nan: u64,
}

#[derive(Deserialize)]
struct RawHistogram {
    min: f64,
    max: f64,
    bins: Vec<u64>,
    underflow: u64,
    overflow: u64,
    nan: u64,
}

impl TryFrom<RawHistogram> for Histogram {
    type Error = HistogramError;

    fn try_from(raw: RawHistogram) -> Result<Self, Self::Error> {
        let mut hist = Histogram::new(raw.min, raw.max, raw.bins.len())?;
        hist.bins = raw.bins;
        hist.underflow = raw.underflow;
        hist.overflow = raw.overflow;
        hist.nan = raw.nan;
        Ok(hist)
    }
}

impl Histogram {
    /// Create a histogram with `nbins` bins covering [min, max)
    pub fn new(min: f64, max: f64, nbins: usize) -> Result<Self, HistogramError> {
        let (Some(min), Some(max)) = (N64::try_new(min), N64::try_new(max))
        else {
            return Err(HistogramError::NotANumber);
        };
        if min >= max || !max.raw().is_finite() || !min.raw().is_finite() {
            return Err(HistogramError::EmptyRange(min.raw(), max.raw()));
        }
        if nbins == 0 {
            return Err(HistogramError::NoBins);
        }
        Ok(Self {
            min,
            max,
            bins: vec![0; nbins],
            underflow: 0,
            overflow: 0,
            nan: 0,
        })
    }

    /// Count `value`
    pub fn fill(&mut self, value: f64) -> Fill {
        let Some(value) = N64::try_new(value) else {
            warn!("Ignoring histogram entry that is not a number");
            self.nan += 1;
            return Fill::NotANumber;
        };
        if value < self.min {
            self.underflow += 1;
            return Fill::Underflow;
        }
        if value >= self.max {
            self.overflow += 1;
            return Fill::Overflow;
        }
        let value = value.raw();
        let nbins = self.nbins();
        let mut idx = ((value - self.min()) * nbins as f64
            / (self.max() - self.min())) as usize;
        idx = idx.min(nbins - 1);
        // the index has to agree with the bin edges, even after rounding
        if idx > 0 && value < self.edge(idx) {
            idx -= 1;
        } else if idx + 1 < nbins && value >= self.edge(idx + 1) {
            idx += 1;
        }
        self.bins[idx] += 1;
        Fill::Bin(idx)
    }

    /// Lower end of the histogram range
    pub fn min(&self) -> f64 {
        self.min.raw()
    }

    /// Upper end of the histogram range
    pub fn max(&self) -> f64 {
        self.max.raw()
    }

    pub fn nbins(&self) -> usize {
        self.bins.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.max() - self.min()) / self.nbins() as f64
    }

    /// The `nbins + 1` bin boundaries
    pub fn bin_edges(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.nbins()).map(move |i| self.edge(i))
    }

    fn edge(&self, idx: usize) -> f64 {
        if idx == self.nbins() {
            return self.max();
        }
        self.min() + idx as f64 * self.bin_width()
    }

    /// Bin counts, excluding under- and overflow
    pub fn bins(&self) -> &[u64] {
        self.bins.as_slice()
    }

    /// Count in the bin with index `idx`
    pub fn bin(&self, idx: usize) -> Option<u64> {
        self.bins.get(idx).copied()
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Number of entries that were not a number
    pub fn nan(&self) -> u64 {
        self.nan
    }

    /// Number of entries inside the histogram range
    pub fn in_range(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Total number of fill calls
    pub fn entries(&self) -> u64 {
        self.in_range() + self.underflow + self.overflow + self.nan
    }
}
