//! Text-on-canvas rendering support shared by the local image and video
//! backends: color parsing and a font rasterizer.

pub mod font;

pub use font::Rasterizer;

use image::Rgb;

/// Parse a color name or `#RRGGBB` hex value.
pub fn parse_color(value: &str) -> Option<Rgb<u8>> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Rgb([r, g, b]));
    }

    let rgb = match value.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" => [0, 255, 255],
        "magenta" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        _ => return None,
    };
    Some(Rgb(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_colors() {
        assert_eq!(parse_color("white"), Some(Rgb([255, 255, 255])));
        assert_eq!(parse_color("Black"), Some(Rgb([0, 0, 0])));
        assert_eq!(parse_color(" blue "), Some(Rgb([0, 0, 255])));
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#ff8000"), Some(Rgb([255, 128, 0])));
        assert_eq!(parse_color("#FFFFFF"), Some(Rgb([255, 255, 255])));
    }

    #[test]
    fn rejects_unknown_colors() {
        assert_eq!(parse_color("chartreuse-ish"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gggggg"), None);
    }
}
