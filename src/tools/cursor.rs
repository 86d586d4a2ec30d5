use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Smallest diameter a cursor is drawn at, so thin brushes stay visible
const MIN_DIAMETER: f32 = 4.0;

/// Circle outline cursor sized to a brush's stroke width
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    diameter: f32,
}

impl Cursor {
    pub fn circle(stroke_width: f32) -> Self {
        Self {
            diameter: stroke_width.max(MIN_DIAMETER),
        }
    }

    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    pub fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    /// SVG image of the cursor: a dark circle with a light halo
    pub fn svg(&self) -> String {
        let size = self.diameter.ceil() as u32 + 2;
        let center = size as f32 / 2.0;
        let r = self.radius();
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\">\
             <circle cx=\"{center}\" cy=\"{center}\" r=\"{r}\" fill=\"none\" stroke=\"#ffffff\" stroke-width=\"2\"/>\
             <circle cx=\"{center}\" cy=\"{center}\" r=\"{r}\" fill=\"none\" stroke=\"#000000\" stroke-width=\"1\"/>\
             </svg>"
        )
    }

    /// CSS `cursor` value with the hotspot at the circle's centre
    pub fn css(&self) -> String {
        let hotspot = (self.diameter.ceil() as u32 + 2) / 2;
        format!(
            "url(data:image/svg+xml;base64,{}) {hotspot} {hotspot}, crosshair",
            STANDARD.encode(self.svg())
        )
    }
}
