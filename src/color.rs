use serde::Serialize;
use std::fmt;

/// Above this (in hundreds of Kelvin) red and green use the power-law fit
/// and blue saturates.
const THRESHOLD: f64 = 66.0;
/// At or below this blue is fully off.
const BLUE_CUTOFF: f64 = 19.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, as used for table cell backgrounds.
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// Approximate display color of a blackbody radiator at `kelvin`.
///
/// Total over every input: negative and NaN temperatures behave like 0 K,
/// and each channel is clamped to `0..=255` then rounded to nearest.
///
/// Uses true exponentiation in the high-temperature branches and clamps the
/// red channel that is returned. Output therefore differs from snapshots
/// taken with the old web table, which XOR-ed where it meant to raise to a
/// power and discarded its red clamp.
pub fn convert(kelvin: f64) -> Rgb {
    let [r, g, b] = convert_exact(kelvin);
    Rgb {
        r: r.round() as u8,
        g: g.round() as u8,
        b: b.round() as u8,
    }
}

/// Same as [`convert`] but leaves rounding to the caller.
pub fn convert_exact(kelvin: f64) -> [f64; 3] {
    // f64::max drops NaN in favour of the other operand
    let t = kelvin.max(0.0) / 100.0;
    [red(t), green(t), blue(t)]
}

fn red(t: f64) -> f64 {
    if t <= THRESHOLD {
        return 255.0;
    }
    clamp_channel(329.698727446 * (t - 60.0).powf(-0.1332047592))
}

fn green(t: f64) -> f64 {
    if t <= THRESHOLD {
        clamp_channel(99.4708025861 * guarded_ln(t) - 161.1195681661)
    } else {
        clamp_channel(288.1221695283 * (t - 60.0).powf(-0.0755148492))
    }
}

fn blue(t: f64) -> f64 {
    if t >= THRESHOLD {
        255.0
    } else if t <= BLUE_CUTOFF {
        0.0
    } else {
        clamp_channel(138.5177312231 * guarded_ln(t - 10.0) - 305.0447927307)
    }
}

/// ln(x) for x > 0, otherwise negative infinity so the channel clamps to 0.
fn guarded_ln(x: f64) -> f64 {
    if x > 0.0 { x.ln() } else { f64::NEG_INFINITY }
}

fn clamp_channel(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 255.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_boundary_is_white() {
        assert_eq!(convert(6600.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn candle_light() {
        // t = 10: green = 99.47 * ln(10) - 161.12 ~= 67.9
        assert_eq!(convert(1000.0), Rgb::new(255, 68, 0));
    }

    #[test]
    fn very_cold_sky() {
        let c = convert(40000.0);
        assert_eq!(c.b, 255);
        // high branch: ~151.7 and ~185.5
        assert!((150..=153).contains(&c.r), "red was {}", c.r);
        assert!((184..=187).contains(&c.g), "green was {}", c.g);
    }

    #[test]
    fn zero_uses_log_guards() {
        assert_eq!(convert(0.0), Rgb::new(255, 0, 0));
        let [_, g, b] = convert_exact(0.0);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn negative_and_nan_behave_like_zero() {
        assert_eq!(convert(-500.0), convert(0.0));
        assert_eq!(convert(f64::NAN), convert(0.0));
    }

    #[test]
    fn infinity_clamps() {
        assert_eq!(convert(f64::INFINITY), Rgb::new(0, 0, 255));
    }

    #[test]
    fn exact_channels_stay_in_range() {
        let mut k = 0.0;
        while k <= 60000.0 {
            for v in convert_exact(k) {
                assert!(!v.is_nan(), "NaN at {k}");
                assert!((0.0..=255.0).contains(&v), "{v} out of range at {k}");
            }
            k += 7.5;
        }
    }

    #[test]
    fn red_and_blue_continuous_at_threshold() {
        let below = convert(6599.0);
        let above = convert(6601.0);
        assert_eq!(below.r, 255);
        assert_eq!(above.r, 255);
        assert!(below.b >= 250, "blue below was {}", below.b);
        assert_eq!(above.b, 255);
    }

    #[test]
    fn blue_never_decreases() {
        let mut prev = 0;
        for k in (0..=40000).step_by(25) {
            let b = convert(k as f64).b;
            assert!(b >= prev, "blue fell from {prev} to {b} at {k}K");
            prev = b;
        }
    }

    #[test]
    fn red_never_increases_above_threshold() {
        let mut prev = 255;
        for k in (6600..=40000).step_by(25) {
            let r = convert(k as f64).r;
            assert!(r <= prev, "red rose from {prev} to {r} at {k}K");
            prev = r;
        }
    }

    #[test]
    fn green_dips_just_past_threshold() {
        // Artifact of the piecewise fit: the low branch clamps at 255 while
        // the high branch starts around 252.
        assert_eq!(convert(6600.0).g, 255);
        let g = convert(6601.0).g;
        assert!((250..=253).contains(&g), "green was {g}");
    }

    #[test]
    fn deterministic() {
        for k in [1500.0, 2700.0, 4000.0, 6500.0, 12000.0] {
            assert_eq!(convert(k), convert(k));
        }
    }

    #[test]
    fn css_and_hex() {
        let c = Rgb::new(255, 68, 0);
        assert_eq!(c.css(), "rgb(255,68,0)");
        assert_eq!(c.hex(), "#ff4400");
        assert_eq!(c.to_string(), "rgb(255,68,0)");
    }

    #[test]
    fn serializes_as_channels() {
        let json = serde_json::to_value(convert(1000.0)).unwrap();
        assert_eq!(json, serde_json::json!({"r": 255, "g": 68, "b": 0}));
    }
}
