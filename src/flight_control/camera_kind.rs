use crate::formula::BandSymbol;
use std::collections::HashMap;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter};

/// Sensor type a flight was captured with. Determines the band layout of the
/// reconstructed orthophoto and therefore which formulas can be computed.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, EnumIter, Display, serde::Serialize, serde::Deserialize,
)]
pub enum CameraKind {
    /// Plain visible-light camera: red, green, blue.
    #[serde(rename = "RGB")]
    #[strum(serialize = "RGB")]
    Rgb,
    /// Five-band camera (blue, green, red, near-infrared, red edge) plus an
    /// alpha band carrying the reconstruction's validity mask.
    #[serde(rename = "MULTIBAND", alias = "REDEDGE")]
    #[strum(serialize = "MULTIBAND")]
    Multiband,
}

impl CameraKind {
    /// Returns the 1-based band index of `symbol` in the primary orthophoto,
    /// or `None` if this camera does not capture that band.
    pub fn band_index(self, symbol: BandSymbol) -> Option<u8> {
        BAND_INDEX_LOOKUP.get(&(self, symbol)).copied()
    }

    /// Band carrying the validity mask, if the orthophoto has one.
    pub fn mask_band(self) -> Option<u8> {
        match self {
            CameraKind::Rgb => None,
            CameraKind::Multiband => Some(6),
        }
    }

    /// Red, green and blue band indices, in display order.
    pub fn rgb_bands(self) -> [u8; 3] {
        match self {
            CameraKind::Rgb => [1, 2, 3],
            CameraKind::Multiband => [3, 2, 1],
        }
    }

    pub fn is_multiband(self) -> bool { self == CameraKind::Multiband }

    /// All band symbols resolvable for this camera.
    pub fn symbols(self) -> Vec<BandSymbol> {
        let mut symbols: Vec<_> = BAND_INDEX_LOOKUP
            .iter()
            .filter(|((camera, _), _)| *camera == self)
            .map(|((_, symbol), band)| (*band, *symbol))
            .collect();
        symbols.sort_unstable();
        symbols.into_iter().map(|(_, symbol)| symbol).collect()
    }
}

static BAND_INDEX_LOOKUP: LazyLock<HashMap<(CameraKind, BandSymbol), u8>> = LazyLock::new(|| {
    let mut lookup = HashMap::new();
    let band_layout = vec![
        (CameraKind::Rgb, BandSymbol::Red, 1),
        (CameraKind::Rgb, BandSymbol::Green, 2),
        (CameraKind::Rgb, BandSymbol::Blue, 3),
        (CameraKind::Multiband, BandSymbol::Blue, 1),
        (CameraKind::Multiband, BandSymbol::Green, 2),
        (CameraKind::Multiband, BandSymbol::Red, 3),
        (CameraKind::Multiband, BandSymbol::Nir, 4),
        (CameraKind::Multiband, BandSymbol::RedEdge, 5),
    ];

    for (camera, symbol, band) in band_layout {
        lookup.insert((camera, symbol), band);
    }
    lookup
});
