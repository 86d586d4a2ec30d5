use egui::Color32;

use crate::error::{ArtboardError, ArtboardResult};

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a colour.
pub fn parse_hex(hex: &str) -> ArtboardResult<Color32> {
    let invalid = || ArtboardError::InvalidColor(hex.to_owned());
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in digits.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Ok(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Ok(Color32::from_rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        8 => Ok(Color32::from_rgba_unmultiplied(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
            channel(&digits[6..8])?,
        )),
        _ => Err(invalid()),
    }
}

/// Format a colour as `#rrggbb`, dropping alpha
pub fn to_hex(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Shift a colour's HSL lightness by `amount` percentage points.
///
/// Negative amounts darken. Lightness is clamped to `[0, 100]`; hue,
/// saturation and alpha are preserved.
pub fn lighten(color: Color32, amount: f32) -> Color32 {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let (h, s, l) = rgb_to_hsl(r, g, b);
    let l = (l + amount / 100.0).clamp(0.0, 1.0);
    let (r, g, b) = hsl_to_rgb(h, s, l);
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    if s == 0.0 {
        let v = to_u8(l);
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        to_u8(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_channel(p, q, h)),
        to_u8(hue_to_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("#000000").unwrap(), Color32::BLACK);
        assert_eq!(parse_hex("#fff").unwrap(), Color32::WHITE);
        assert_eq!(parse_hex("#DC143C").unwrap(), Color32::from_rgb(0xdc, 0x14, 0x3c));
        let translucent = parse_hex("#ff000080").unwrap();
        assert_eq!(translucent.to_srgba_unmultiplied()[3], 0x80);
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("000000").is_err());
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(Color32::from_rgb(0x8b, 0x45, 0x13)), "#8b4513");
    }

    #[test]
    fn test_lighten_and_darken() {
        let base = Color32::from_rgb(0x80, 0x40, 0x20);
        let lighter = lighten(base, 10.0);
        let darker = lighten(base, -10.0);
        let sum = |c: Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
        assert!(sum(lighter) > sum(base));
        assert!(sum(darker) < sum(base));
        assert_eq!(lighten(Color32::WHITE, 20.0), Color32::WHITE);
        assert_eq!(lighten(Color32::BLACK, -20.0), Color32::BLACK);
    }

    #[test]
    fn test_lighten_zero_is_identity() {
        let base = Color32::from_rgb(0xff, 0x6b, 0x35);
        assert_eq!(lighten(base, 0.0), base);
    }
}
