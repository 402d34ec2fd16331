use strum_macros::{Display, EnumIter, EnumString};

/// Spectral band names a formula may reference. Matching is case-insensitive.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum BandSymbol {
    #[strum(serialize = "RED")]
    Red,
    #[strum(serialize = "GREEN")]
    Green,
    #[strum(serialize = "BLUE")]
    Blue,
    #[strum(serialize = "NIR")]
    Nir,
    #[strum(serialize = "REDEDGE")]
    RedEdge,
}
