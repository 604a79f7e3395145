mod opt;

use std::fmt::Display;

use crate::opt::{Opt, OutputFormat};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use invmass::{
    analysis::AnalysisBuilder,
    config::Config,
    event::Event,
    export::{PyPlotExport, YamlExport},
    generator::ToyGenerator,
    traits::{Export, Reconstruct},
    FEATURES, GIT_BRANCH, GIT_REV, VERSION,
};
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args);

    let env = Env::default().filter_or("INVMASS_LOG", &opt.loglevel);
    env_logger::init_from_env(env);

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("invmass {VERSION} rev {rev} ({branch}) {FEATURES:?}");
    } else {
        info!("invmass {VERSION} {FEATURES:?}");
    }

    let config = opt.config()?;
    debug!("settings: {:#?}", config);
    config.validate().with_context(|| "Invalid settings")?;

    if opt.infiles.is_empty() {
        let generator = ToyGenerator::new(config.generator.clone())
            .with_context(|| "Invalid toy generator settings")?;
        run_main(generator, &config, &opt)?;
    } else {
        read_and_run(&config, &opt)?;
    }
    info!("done");
    Ok(())
}

#[cfg(feature = "hepmc2")]
fn read_and_run(config: &Config, opt: &Opt) -> Result<()> {
    let reader = invmass::hepmc2::Reader::from_files(opt.infiles.clone());
    run_main(reader, config, opt)
}

#[cfg(not(feature = "hepmc2"))]
fn read_and_run(_config: &Config, _opt: &Opt) -> Result<()> {
    anyhow::bail!("Reading event files requires the 'hepmc2' feature")
}

fn run_main<G, E>(generator: G, config: &Config, opt: &Opt) -> Result<()>
where
    G: Iterator<Item = Result<Event, E>>,
    E: Display,
{
    std::fs::create_dir_all(&opt.outdir).with_context(|| {
        format!("Failed to create output directory {:?}", opt.outdir)
    })?;
    let reconstructor = config.reconstructor()?;
    match opt.format {
        OutputFormat::PyPlot => {
            let exporter =
                PyPlotExport::builder().outdir(opt.outdir.clone()).build();
            analyse(generator, reconstructor, exporter, config)
        }
        OutputFormat::Yaml => {
            let exporter =
                YamlExport::builder().outdir(opt.outdir.clone()).build();
            analyse(generator, reconstructor, exporter, config)
        }
    }
}

fn analyse<G, E, X>(
    generator: G,
    reconstructor: Box<dyn Reconstruct>,
    exporter: X,
    config: &Config,
) -> Result<()>
where
    G: Iterator<Item = Result<Event, E>>,
    E: Display,
    X: Export,
    X::Error: std::error::Error + Send + Sync + 'static,
{
    let mut analysis = AnalysisBuilder {
        generator,
        reconstructor,
        exporter,
        style: config.plot.clone(),
    }
    .build();
    let (hist, summary) = analysis.run(config.nevents, config.histogram()?)?;
    info!(
        "{} entries in [{}, {}), {} underflow, {} overflow",
        hist.in_range(),
        hist.min(),
        hist.max(),
        hist.underflow(),
        hist.overflow()
    );
    debug!("run summary: {summary:#?}");
    Ok(())
}
