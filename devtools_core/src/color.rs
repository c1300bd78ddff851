//! CSS color parsing and conversion between notations.
use serde::Serialize;

use crate::error::{Result, ToolError};

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("maroon", [128, 0, 0]),
    ("red", [255, 0, 0]),
    ("purple", [128, 0, 128]),
    ("fuchsia", [255, 0, 255]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("olive", [128, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("navy", [0, 0, 128]),
    ("blue", [0, 0, 255]),
    ("teal", [0, 128, 128]),
    ("aqua", [0, 255, 255]),
    ("orange", [255, 165, 0]),
    ("brown", [165, 42, 42]),
    ("pink", [255, 192, 203]),
    ("gold", [255, 215, 0]),
    ("indigo", [75, 0, 130]),
    ("violet", [238, 130, 238]),
    ("coral", [255, 127, 80]),
    ("salmon", [250, 128, 114]),
    ("tomato", [255, 99, 71]),
    ("chocolate", [210, 105, 30]),
    ("tan", [210, 180, 140]),
    ("khaki", [240, 230, 140]),
    ("turquoise", [64, 224, 208]),
    ("skyblue", [135, 206, 235]),
    ("steelblue", [70, 130, 180]),
    ("crimson", [220, 20, 60]),
    ("orchid", [218, 112, 214]),
    ("plum", [221, 160, 221]),
    ("beige", [245, 245, 220]),
    ("ivory", [255, 255, 240]),
    ("lavender", [230, 230, 250]),
    ("darkgreen", [0, 100, 0]),
    ("darkblue", [0, 0, 139]),
    ("darkred", [139, 0, 0]),
    ("darkgray", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
    ("rebeccapurple", [102, 51, 153]),
];

/// Channels in 0..=255, alpha in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorFormats {
    pub hex: String,
    pub rgb: String,
    pub hsl: String,
    pub hwb: String,
    pub cmyk: String,
    pub name: String,
    pub alpha: f64,
}

pub fn convert_color(input: &str) -> Result<ColorFormats> {
    let color = parse_color(input)?;
    Ok(render(color))
}

pub fn parse_color(input: &str) -> Result<Rgba> {
    let text = input.trim().to_ascii_lowercase();
    if text.is_empty() {
        return Err(ToolError::EmptyInput("color"));
    }
    let invalid = || ToolError::invalid("color", input.trim());
    if let Some((function, args)) = text.strip_suffix(')').and_then(|t| t.split_once('(')) {
        let args = split_args(args);
        return match function.trim() {
            "rgb" | "rgba" => parse_rgb(&args),
            "hsl" | "hsla" => parse_hsl(&args),
            "hwb" => parse_hwb(&args),
            _ => None,
        }
        .ok_or_else(invalid);
    }
    if let Some((_, [r, g, b])) = NAMED_COLORS.iter().find(|(name, _)| *name == text) {
        return Ok(Rgba {
            r: f64::from(*r),
            g: f64::from(*g),
            b: f64::from(*b),
            a: 1.0,
        });
    }
    parse_hex(text.strip_prefix('#').unwrap_or(&text)).ok_or_else(invalid)
}

fn parse_hex(digits: &str) -> Option<Rgba> {
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match digits.len() {
        3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return None,
    };
    let bytes = hex::decode(&expanded).ok()?;
    Some(Rgba {
        r: f64::from(bytes[0]),
        g: f64::from(bytes[1]),
        b: f64::from(bytes[2]),
        a: bytes.get(3).map_or(1.0, |a| f64::from(*a) / 255.0),
    })
}

/// Accepts both `a, b, c, d` and `a b c / d`.
fn split_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect()
}

fn number(arg: &str) -> Option<f64> {
    arg.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// `50%` -> 0.5, `0.5` -> 0.5
fn fraction(arg: &str) -> Option<f64> {
    match arg.strip_suffix('%') {
        Some(percent) => number(percent).map(|value| value / 100.0),
        None => number(arg),
    }
    .map(|value| value.clamp(0.0, 1.0))
}

fn percent(arg: &str) -> Option<f64> {
    number(arg.strip_suffix('%').unwrap_or(arg)).map(|value| (value / 100.0).clamp(0.0, 1.0))
}

fn hue(arg: &str) -> Option<f64> {
    let degrees = match arg.strip_suffix("deg") {
        Some(deg) => number(deg)?,
        None => match arg.strip_suffix("turn") {
            Some(turn) => number(turn)? * 360.0,
            None => number(arg)?,
        },
    };
    Some(degrees.rem_euclid(360.0))
}

fn alpha(args: &[&str], idx: usize) -> Option<f64> {
    args.get(idx).map_or(Some(1.0), |arg| fraction(arg))
}

fn parse_rgb(args: &[&str]) -> Option<Rgba> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let channel = |arg: &str| match arg.strip_suffix('%') {
        Some(percent) => number(percent).map(|value| value * 2.55),
        None => number(arg),
    }
    .map(|value| value.clamp(0.0, 255.0));
    Some(Rgba {
        r: channel(args[0])?,
        g: channel(args[1])?,
        b: channel(args[2])?,
        a: alpha(args, 3)?,
    })
}

fn parse_hsl(args: &[&str]) -> Option<Rgba> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let [r, g, b] = hsl_to_rgb(hue(args[0])?, percent(args[1])?, percent(args[2])?);
    Some(Rgba {
        r,
        g,
        b,
        a: alpha(args, 3)?,
    })
}

fn parse_hwb(args: &[&str]) -> Option<Rgba> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let h = hue(args[0])?;
    let white = percent(args[1])?;
    let black = percent(args[2])?;
    let [r, g, b] = if white + black >= 1.0 {
        let gray = white / (white + black) * 255.0;
        [gray, gray, gray]
    } else {
        hsl_to_rgb(h, 1.0, 0.5).map(|channel| channel * (1.0 - white - black) + white * 255.0)
    };
    Some(Rgba {
        r,
        g,
        b,
        a: alpha(args, 3)?,
    })
}

/// `h` in degrees, `s` and `l` in 0..=1; returns 0..=255 channels.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    [(r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0]
}

/// Returns hue in degrees, saturation and lightness in 0..=1.
pub fn rgb_to_hsl(color: Rgba) -> (f64, f64, f64) {
    let (r, g, b) = (color.r / 255.0, color.g / 255.0, color.b / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;
    if delta == 0.0 {
        return (0.0, 0.0, l);
    }
    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    (h, s, l)
}

pub fn nearest_name(color: Rgba) -> &'static str {
    NAMED_COLORS
        .iter()
        .min_by(|(_, a), (_, b)| {
            distance(color, *a).total_cmp(&distance(color, *b))
        })
        .map_or("black", |(name, _)| *name)
}

fn distance(color: Rgba, [r, g, b]: [u8; 3]) -> f64 {
    (color.r - f64::from(r)).powi(2)
        + (color.g - f64::from(g)).powi(2)
        + (color.b - f64::from(b)).powi(2)
}

fn render(color: Rgba) -> ColorFormats {
    let [r, g, b] = [color.r, color.g, color.b].map(|channel| channel.round() as u8);
    let opaque = color.a >= 1.0;
    let alpha_text = trim_float(color.a);
    let (h, s, l) = rgb_to_hsl(color);
    let (h, s, l) = (h.round(), (s * 100.0).round(), (l * 100.0).round());
    let white = (f64::from(r.min(g).min(b)) / 255.0 * 100.0).round();
    let black = ((1.0 - f64::from(r.max(g).max(b)) / 255.0) * 100.0).round();
    let key = 1.0 - f64::from(r.max(g).max(b)) / 255.0;
    let ink = |channel: u8| {
        if key >= 1.0 {
            0.0
        } else {
            ((1.0 - f64::from(channel) / 255.0 - key) / (1.0 - key) * 100.0).round()
        }
    };

    ColorFormats {
        hex: if opaque {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{:02x}", (color.a * 255.0).round() as u8)
        },
        rgb: if opaque {
            format!("rgb({r}, {g}, {b})")
        } else {
            format!("rgba({r}, {g}, {b}, {alpha_text})")
        },
        hsl: if opaque {
            format!("hsl({h}, {s}%, {l}%)")
        } else {
            format!("hsla({h}, {s}%, {l}%, {alpha_text})")
        },
        hwb: if opaque {
            format!("hwb({h} {white}% {black}%)")
        } else {
            format!("hwb({h} {white}% {black}% / {alpha_text})")
        },
        cmyk: format!(
            "cmyk({}%, {}%, {}%, {}%)",
            ink(r),
            ink(g),
            ink(b),
            (key * 100.0).round()
        ),
        name: nearest_name(color).to_string(),
        alpha: color.a,
    }
}

fn trim_float(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_notation_reads_the_same_red() {
        for input in [
            "#f00",
            "#FF0000",
            "ff0000",
            "red",
            "rgb(255, 0, 0)",
            "rgb(100% 0% 0%)",
            "hsl(0, 100%, 50%)",
            "hsl(360deg 100% 50%)",
            "hwb(0 0% 0%)",
        ] {
            let formats = convert_color(input).unwrap();
            assert_eq!(formats.hex, "#ff0000", "{input}");
            assert_eq!(formats.name, "red", "{input}");
        }
    }

    #[test]
    fn renders_all_formats() {
        let formats = convert_color("#1e90ff").unwrap();
        assert_eq!(formats.rgb, "rgb(30, 144, 255)");
        assert_eq!(formats.hsl, "hsl(210, 100%, 56%)");
        assert_eq!(formats.hwb, "hwb(210 12% 0%)");
        assert_eq!(formats.cmyk, "cmyk(88%, 44%, 0%, 0%)");
        assert_eq!(formats.alpha, 1.0);
    }

    #[test]
    fn alpha_is_carried_through() {
        let formats = convert_color("rgba(0, 0, 255, 0.5)").unwrap();
        assert_eq!(formats.hex, "#0000ff80");
        assert_eq!(formats.rgb, "rgba(0, 0, 255, 0.5)");
        assert_eq!(formats.hsl, "hsla(240, 100%, 50%, 0.5)");
        assert_eq!(convert_color("#0000ff80").unwrap().rgb, "rgba(0, 0, 255, 0.5)");
    }

    #[test]
    fn grays_and_black() {
        let black = convert_color("black").unwrap();
        assert_eq!(black.cmyk, "cmyk(0%, 0%, 0%, 100%)");
        assert_eq!(black.hwb, "hwb(0 0% 100%)");
        let gray = convert_color("hwb(90 50% 50%)").unwrap();
        assert_eq!(gray.hex, "#808080");
        assert_eq!(gray.name, "gray");
    }

    #[test]
    fn nearest_name_for_off_palette_colors() {
        assert_eq!(convert_color("#fe0102").unwrap().name, "red");
        assert_eq!(convert_color("#010101").unwrap().name, "black");
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#ff", "#ggg", "rgb(1, 2)", "hsl(a, b, c)", "cmyk(0,0,0,0)", "blurple"] {
            assert!(convert_color(bad).is_err(), "{bad:?}");
        }
    }
}
