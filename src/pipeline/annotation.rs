/// A user marker on the orthomosaic, positioned in image-relative
/// coordinates (`0.0..=1.0`, origin top left).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: Option<String>,
    /// `#rrggbb`; red if absent or malformed.
    #[serde(default)]
    pub color: Option<String>,
}

impl Annotation {
    /// Parses a flight's annotation text. Blank text means no markers.
    ///
    /// # Errors
    /// Fails if non-blank text is not a JSON array of markers.
    pub fn parse_all(text: &str) -> Result<Vec<Annotation>, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(text)
    }

    /// Marker position in pixels, clamped into the image.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn pixel(&self, width: u32, height: u32) -> (u32, u32) {
        let px = (self.x.clamp(0.0, 1.0) * f64::from(width.saturating_sub(1))).round() as u32;
        let py = (self.y.clamp(0.0, 1.0) * f64::from(height.saturating_sub(1))).round() as u32;
        (px, py)
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.color
            .as_deref()
            .and_then(|c| c.strip_prefix('#'))
            .filter(|hex| hex.len() == 6)
            .and_then(|hex| {
                let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
                Some([channel(0)?, channel(2)?, channel(4)?])
            })
            .unwrap_or([220, 20, 60])
    }
}
