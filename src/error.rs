use thiserror::Error;

/// Errors raised while constructing a run from scenario data.
///
/// All of these are detected eagerly, before the first simulated month.
/// Resource shortfall during a run is never an error; it degrades into
/// reduced feeding and starvation instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scenario defines no species")]
    EmptySpeciesList,

    #[error("species '{0}' is defined more than once")]
    DuplicateSpecies(String),

    #[error("malformed country code '{0}': expected three ASCII letters")]
    MalformedCountryCode(String),

    #[error("unknown LSU region '{0}'")]
    UnknownLsuRegion(String),

    #[error("no LSU factor for species group '{group}' in region '{region}'")]
    UnknownSpeciesGroup { region: String, group: String },

    #[error("{field} for species '{species}' is out of range: {value}")]
    OutOfRange {
        species: String,
        field: &'static str,
        value: f64,
    },

    #[error("{field} is out of range: {value}")]
    PolicyOutOfRange { field: &'static str, value: f64 },

    #[error("milk species '{0}' is missing its milk parameter block")]
    MissingMilkBlock(String),

    #[error("meat species '{0}' carries a milk parameter block")]
    UnexpectedMilkBlock(String),

    #[error("species '{species}' transfers to unknown species '{target}'")]
    UnknownTransferTarget { species: String, target: String },

    #[error("species '{species}' transfers to '{target}', which is not a meat species")]
    TransferTargetNotMeat { species: String, target: String },

    #[error("run needs {need} months but the {stream} stream covers {have}")]
    SupplyTooShort {
        stream: &'static str,
        have: usize,
        need: usize,
    },

    #[error("run length must be at least one month")]
    ZeroMonths,
}
