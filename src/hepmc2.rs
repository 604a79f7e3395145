use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::{debug, trace};
use nom::{
    bytes::complete::take_while1,
    character::complete::{i32, space1},
    number::complete::double,
    sequence::preceded,
    IResult,
};
use particle_id::ParticleID;
use thiserror::Error;

use crate::event::{Event, EventBuilder, Particle};

/// Error reading a HepMC event record
#[derive(Debug, Error)]
pub enum HepMCError {
    /// Parse error
    #[error("Error parsing line in event record: {0}")]
    ParseError(String),
    /// Unrecognized entry
    #[error("Line does not correspond to a known entry type: {0}")]
    BadEntry(String),
    /// I/O error
    #[error("I/O error")]
    IOError(#[from] std::io::Error),
    /// Invalid energy unit
    #[error("Invalid energy unit: {0}")]
    InvalidEnergyUnit(String),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
enum EnergyUnit {
    MeV,
    #[default]
    GeV,
}

/// Reader for (potentially compressed) HepMC2 event files
///
/// Files are read one after the other. Every event record is turned
/// into an [Event] containing all particles in record order; particles
/// with status 1 are final.
pub struct Reader {
    files: std::vec::IntoIter<PathBuf>,
    source: Option<Box<dyn BufRead>>,
    // first line of the next record
    pending: String,
}

impl Reader {
    /// Construct a reader for the given (potentially compressed) HepMC2 event files
    pub fn from_files(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            source: None,
            pending: String::new(),
        }
    }

    fn read_record(&mut self) -> Option<Result<String, HepMCError>> {
        loop {
            let mut source = match self.source.take() {
                Some(source) => source,
                None => {
                    let path = self.files.next()?;
                    match init_source(&path) {
                        Ok(source) => source,
                        Err(err) => return Some(Err(err.into())),
                    }
                }
            };
            let mut record = std::mem::take(&mut self.pending);
            loop {
                let mut line = String::new();
                match source.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(err) => return Some(Err(err.into())),
                }
                if line.starts_with('E') {
                    if record.starts_with('E') {
                        self.pending = line;
                        self.source = Some(source);
                        trace!("Read HepMC record:\n{record}");
                        return Some(Ok(record));
                    }
                    // anything before the first event is header
                    record = line;
                } else if record.starts_with('E') {
                    record.push_str(&line);
                }
            }
            if record.starts_with('E') {
                trace!("Read HepMC record:\n{record}");
                return Some(Ok(record));
            }
        }
    }
}

fn init_source(path: &Path) -> Result<Box<dyn BufRead>, std::io::Error> {
    debug!("Reading events from {path:?}");
    let source = File::open(path)?;
    Ok(auto_decompress(BufReader::new(source)))
}

impl Iterator for Reader {
    type Item = Result<Event, HepMCError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record()
            .map(|record| record.and_then(|r| parse_record(&r)))
    }
}

/// Parse a single HepMC2 event record
pub fn parse_record(record: &str) -> Result<Event, HepMCError> {
    let mut event = EventBuilder::new();
    let mut energy_unit = EnergyUnit::GeV;
    for line in record.lines() {
        match line.as_bytes().first() {
            Some(b'E') | Some(b'V') | Some(b'F') | Some(b'H')
            | Some(b'C') | Some(b'N') => {}
            Some(b'P') => {
                event.add(parse_particle_line(line)?);
            }
            Some(b'U') => energy_unit = parse_units_line(line)?,
            _ => {
                if !line.trim().is_empty() {
                    return Err(HepMCError::BadEntry(line.to_owned()));
                }
            }
        }
    }
    if energy_unit == EnergyUnit::MeV {
        event.rescale_energies(1e-3);
    }
    Ok(event.build())
}

fn parse_units_line(line: &str) -> Result<EnergyUnit, HepMCError> {
    debug_assert!(line.starts_with('U'));
    let (_, energy) = any_entry(&line[1..])?;
    match energy {
        "GEV" => Ok(EnergyUnit::GeV),
        "MEV" => Ok(EnergyUnit::MeV),
        _ => Err(HepMCError::InvalidEnergyUnit(energy.to_owned())),
    }
}

fn parse_particle_line(line: &str) -> Result<Particle, HepMCError> {
    const HEPMC_OUTGOING: i32 = 1;

    debug_assert!(line.starts_with('P'));
    let (rest, _barcode) = any_entry(&line[1..])?;
    let (rest, id) = i32_entry(rest)?;
    let (rest, px) = double_entry(rest)?;
    let (rest, py) = double_entry(rest)?;
    let (rest, pz) = double_entry(rest)?;
    let (rest, e) = double_entry(rest)?;
    let (rest, _m) = any_entry(rest)?;
    let (_, status) = i32_entry(rest)?;
    Ok(Particle {
        id: ParticleID::new(id),
        p: [e, px, py, pz].into(),
        is_final: status == HEPMC_OUTGOING,
    })
}

impl From<nom::Err<nom::error::Error<&str>>> for HepMCError {
    fn from(source: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::ParseError(source.to_string())
    }
}

fn double_entry(line: &str) -> IResult<&str, f64> {
    preceded(space1, double)(line)
}

fn any_entry(line: &str) -> IResult<&str, &str> {
    preceded(space1, non_space)(line)
}

fn i32_entry(line: &str) -> IResult<&str, i32> {
    preceded(space1, i32)(line)
}

fn non_space(line: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(line)
}
