use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use log::info;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{histogram::Histogram, traits::Export};

/// How to draw histogram contents
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
pub enum DrawStyle {
    /// Histogram steps
    #[default]
    #[strum(serialize = "h")]
    #[serde(rename = "h")]
    Histogram,
    /// Line through the bin centres
    #[strum(serialize = "-")]
    #[serde(rename = "-")]
    Line,
    /// Markers at the bin centres
    #[strum(serialize = "o")]
    #[serde(rename = "o")]
    Points,
}

/// Display metadata for an exported histogram
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PlotStyle {
    /// Short name, also used as output file name
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(default)]
    pub style: DrawStyle,
    pub colour: String,
    #[serde(default)]
    pub log_x: bool,
    #[serde(default)]
    pub log_y: bool,
}

impl PlotStyle {
    /// Style for the dijet invariant mass distribution
    pub fn dijet() -> Self {
        Self {
            name: "DijetMassDist".to_owned(),
            title: "Boson Invariant Mass Distributions".to_owned(),
            x_label: "m (GeV)".to_owned(),
            ..Self::dimuon()
        }
    }

    /// Style for the dimuon invariant mass distribution
    pub fn dimuon() -> Self {
        Self {
            name: "DimuonMassDist".to_owned(),
            title: "Boson dimuon invariant mass distributions".to_owned(),
            x_label: "mass (GeV)".to_owned(),
            y_label: "events/bin".to_owned(),
            style: DrawStyle::Histogram,
            colour: "indigo".to_owned(),
            log_x: false,
            log_y: true,
        }
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self::dijet()
    }
}

/// Error exporting a histogram
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    /// Serialisation error
    #[error("Failed to serialise histogram: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Write a self-contained matplotlib script drawing the histogram
///
/// Running the script `NAME.py` produces `NAME.pdf`.
#[derive(Clone, Debug, TypedBuilder)]
pub struct PyPlotExport {
    #[builder(default = PathBuf::from("."))]
    outdir: PathBuf,
}

impl Export for PyPlotExport {
    type Error = ExportError;

    fn export(
        &mut self,
        hist: &Histogram,
        style: &PlotStyle,
    ) -> Result<(), Self::Error> {
        let path = self.outdir.join(format!("{}.py", style.name));
        info!("Writing plotting script to {path:?}");
        let mut out = BufWriter::new(File::create(path)?);
        write_pyplot(&mut out, hist, style)?;
        out.flush()?;
        Ok(())
    }
}

fn write_pyplot(
    mut out: impl Write,
    hist: &Histogram,
    style: &PlotStyle,
) -> Result<(), std::io::Error> {
    let edges: Vec<_> = hist.bin_edges().collect();
    let centres: Vec<_> = edges.windows(2).map(|e| (e[0] + e[1]) / 2.).collect();
    writeln!(out, "from matplotlib import pyplot as plt")?;
    writeln!(out)?;
    writeln!(out, "# underflow: {}", hist.underflow())?;
    writeln!(out, "# overflow: {}", hist.overflow())?;
    writeln!(out, "# not a number: {}", hist.nan())?;
    writeln!(out, "edges = {}", py_list(edges.as_slice()))?;
    writeln!(out, "centres = {}", py_list(centres.as_slice()))?;
    writeln!(out, "counts = {}", py_list(hist.bins()))?;
    writeln!(out)?;
    writeln!(out, "fig, ax = plt.subplots()")?;
    let colour = &style.colour;
    match style.style {
        DrawStyle::Histogram => {
            writeln!(out, "ax.stairs(counts, edges, color={colour:?})")?
        }
        DrawStyle::Line => {
            writeln!(out, "ax.plot(centres, counts, '-', color={colour:?})")?
        }
        DrawStyle::Points => {
            writeln!(out, "ax.plot(centres, counts, 'o', color={colour:?})")?
        }
    }
    writeln!(out, "ax.set_title({:?})", style.title)?;
    writeln!(out, "ax.set_xlabel({:?})", style.x_label)?;
    writeln!(out, "ax.set_ylabel({:?})", style.y_label)?;
    if style.log_x {
        writeln!(out, "ax.set_xscale('log')")?;
    }
    if style.log_y {
        writeln!(out, "ax.set_yscale('log')")?;
    }
    writeln!(out, "fig.savefig({:?})", format!("{}.pdf", style.name))?;
    Ok(())
}

fn py_list<T: std::fmt::Display>(entries: &[T]) -> String {
    let entries: Vec<_> = entries.iter().map(|e| e.to_string()).collect();
    format!("[{}]", entries.join(", "))
}

/// Serialise histogram and display metadata to `NAME.yaml`
#[derive(Clone, Debug, TypedBuilder)]
pub struct YamlExport {
    #[builder(default = PathBuf::from("."))]
    outdir: PathBuf,
}

#[derive(Serialize)]
struct StyledHistogram<'a> {
    style: &'a PlotStyle,
    histogram: &'a Histogram,
}

impl Export for YamlExport {
    type Error = ExportError;

    fn export(
        &mut self,
        hist: &Histogram,
        style: &PlotStyle,
    ) -> Result<(), Self::Error> {
        let path = self.outdir.join(format!("{}.yaml", style.name));
        info!("Writing histogram to {path:?}");
        let mut out = BufWriter::new(File::create(path)?);
        let styled = StyledHistogram {
            style,
            histogram: hist,
        };
        serde_yaml::to_writer(&mut out, &styled)?;
        out.flush()?;
        Ok(())
    }
}

/// Discard the histogram
#[derive(Copy, Clone, Debug, Default)]
pub struct NoExport {}

impl Export for NoExport {
    type Error = std::convert::Infallible;

    fn export(
        &mut self,
        _hist: &Histogram,
        _style: &PlotStyle,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Don't export histograms
pub const NO_EXPORT: NoExport = NoExport {};

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    fn hist() -> Histogram {
        let mut hist = Histogram::new(0., 100., 4).unwrap();
        for x in [10., 60., 70., 120., f64::NAN] {
            hist.fill(x);
        }
        hist
    }

    #[test]
    fn draw_style() {
        assert_eq!(DrawStyle::from_str("h").unwrap(), DrawStyle::Histogram);
        assert_eq!(DrawStyle::Points.to_string(), "o");
        assert!(DrawStyle::from_str("x").is_err());
    }

    #[test]
    fn pyplot() {
        let mut script = Vec::new();
        write_pyplot(&mut script, &hist(), &PlotStyle::dimuon()).unwrap();
        let script = String::from_utf8(script).unwrap();
        assert!(script.contains("edges = [0, 25, 50, 75, 100]"));
        assert!(script.contains("counts = [1, 0, 2, 0]"));
        assert!(script.contains("# overflow: 1"));
        assert!(script.contains("# not a number: 1"));
        assert!(script.contains("ax.stairs(counts, edges, color=\"indigo\")"));
        assert!(script.contains("ax.set_yscale('log')"));
        assert!(!script.contains("set_xscale"));
        assert!(script.contains("fig.savefig(\"DimuonMassDist.pdf\")"));
    }

    #[test]
    fn pyplot_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut export = PyPlotExport::builder()
            .outdir(dir.path().to_owned())
            .build();
        export.export(&hist(), &PlotStyle::dijet()).unwrap();
        assert!(dir.path().join("DijetMassDist.py").exists());
    }

    #[test]
    fn yaml() {
        let dir = tempfile::tempdir().unwrap();
        let mut export = YamlExport::builder()
            .outdir(dir.path().to_owned())
            .build();
        let hist = hist();
        let style = PlotStyle::dijet();
        export.export(&hist, &style).unwrap();

        let yaml =
            std::fs::read_to_string(dir.path().join("DijetMassDist.yaml"))
                .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let read: Histogram =
            serde_yaml::from_value(value["histogram"].clone()).unwrap();
        assert_eq!(read, hist);
        let read: PlotStyle =
            serde_yaml::from_value(value["style"].clone()).unwrap();
        assert_eq!(read, style);
    }
}
