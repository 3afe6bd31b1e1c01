//! White balance and display color math shared by the decoder and the renderer.
//!
//! Temperatures are mapped onto the CIE 1931 Planckian locus with the cubic
//! approximation of Kim et al. (2002), converted to linear sRGB through the
//! D65 XYZ→sRGB matrix and normalized so green is 1. White balance gains are
//! ratios of those illuminant colors. Tint scales the green channel by one
//! stop per `TINT_STOP` units.

/// Lowest temperature the locus approximation is evaluated at.
pub const MIN_KELVIN: f32 = 2000.0;

/// Highest temperature the locus approximation is evaluated at.
pub const MAX_KELVIN: f32 = 50000.0;

/// Tint units per stop of green gain.
pub const TINT_STOP: f32 = 150.0;

/// Estimated tints are clamped to this magnitude.
pub const TINT_LIMIT: f32 = 150.0;

/// Neutral temperature used when a file carries no white balance metadata.
pub const DEFAULT_NEUTRAL_TEMPERATURE: f32 = 6500.0;

/// Neutral tint used when a file carries no white balance metadata.
pub const DEFAULT_NEUTRAL_TINT: f32 = 0.0;

// Standard XYZ to sRGB D65 illuminant matrix
const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [ 3.2404542, -1.5371385, -0.4985314],
    [-0.9692660,  1.8760108,  0.0415560],
    [ 0.0556434, -0.2040259,  1.0572252],
];

/// Whether `kelvin` lies inside the range the locus approximation covers.
pub fn is_plausible_temperature(kelvin: f32) -> bool {
    (MIN_KELVIN..=MAX_KELVIN).contains(&kelvin)
}

fn clamp_kelvin(kelvin: f32) -> f64 {
    if kelvin.is_nan() {
        return DEFAULT_NEUTRAL_TEMPERATURE as f64;
    }
    kelvin.clamp(MIN_KELVIN, MAX_KELVIN) as f64
}

/// CIE xy chromaticity of a blackbody radiator at `kelvin`.
pub fn planckian_xy(kelvin: f32) -> (f64, f64) {
    let t = clamp_kelvin(kelvin);
    let t2 = t * t;
    let t3 = t2 * t;

    let x = if t <= 4000.0 {
        -0.2661239e9 / t3 - 0.2343589e6 / t2 + 0.8776956e3 / t + 0.179910
    } else {
        -3.0258469e9 / t3 + 2.1070379e6 / t2 + 0.2226347e3 / t + 0.240390
    };

    let x2 = x * x;
    let x3 = x2 * x;
    let y = if t <= 2222.0 {
        -1.1063814 * x3 - 1.34811020 * x2 + 2.18555832 * x - 0.20219683
    } else if t <= 4000.0 {
        -0.9549476 * x3 - 1.37418593 * x2 + 2.09137015 * x - 0.16748867
    } else {
        3.0817580 * x3 - 5.87338670 * x2 + 3.75112997 * x - 0.37001483
    };

    (x, y)
}

/// Linear sRGB color of the illuminant at `kelvin`, normalized so green is 1.
pub fn illuminant_rgb(kelvin: f32) -> [f64; 3] {
    let (x, y) = planckian_xy(kelvin);
    let xyz = [x / y, 1.0, (1.0 - x - y) / y];

    let mut rgb = [0.0f64; 3];
    for (r, row) in XYZ_TO_SRGB.iter().enumerate() {
        rgb[r] = row[0] * xyz[0] + row[1] * xyz[1] + row[2] * xyz[2];
    }

    let g = rgb[1];
    [rgb[0] / g, 1.0, rgb[2] / g]
}

fn tint_gain(tint_delta: f32) -> f32 {
    (-tint_delta / TINT_STOP).exp2()
}

/// Per-channel gains that neutralize an illuminant of `kelvin` and `tint`,
/// normalized so green is 1.
pub fn correction_gains(kelvin: f32, tint: f32) -> [f32; 3] {
    let il = illuminant_rgb(kelvin);
    let g = tint_gain(tint);
    [(1.0 / il[0]) as f32 / g, 1.0, (1.0 / il[2]) as f32 / g]
}

/// Gains that move an image balanced for (`neutral_kelvin`, `neutral_tint`)
/// to the requested (`kelvin`, `tint`). Identical inputs give exactly `[1, 1, 1]`.
pub fn relative_gains(kelvin: f32, tint: f32, neutral_kelvin: f32, neutral_tint: f32) -> [f32; 3] {
    let target = illuminant_rgb(kelvin);
    let neutral = illuminant_rgb(neutral_kelvin);
    [
        (neutral[0] / target[0]) as f32,
        tint_gain(tint - neutral_tint),
        (neutral[2] / target[2]) as f32,
    ]
}

fn red_blue_ratio(kelvin: f64) -> f64 {
    let il = illuminant_rgb(kelvin as f32);
    il[0] / il[2]
}

/// Estimates the neutral temperature and tint that as-shot `multipliers`
/// (R, G, B, green normalized to 1) correct for. Returns `None` when the
/// multipliers are not finite and positive.
pub fn estimate_neutral(multipliers: [f32; 3]) -> Option<(f32, f32)> {
    if multipliers.iter().any(|m| !m.is_finite() || *m <= 0.0) {
        return None;
    }

    let m_r = (multipliers[0] / multipliers[1]) as f64;
    let m_b = (multipliers[2] / multipliers[1]) as f64;

    // Illuminant red/blue falls monotonically as temperature rises.
    let target = m_b / m_r;
    let mut lo = (MIN_KELVIN as f64).ln();
    let mut hi = (MAX_KELVIN as f64).ln();
    let kelvin = if target >= red_blue_ratio(lo.exp()) {
        MIN_KELVIN as f64
    } else if target <= red_blue_ratio(hi.exp()) {
        MAX_KELVIN as f64
    } else {
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            if red_blue_ratio(mid.exp()) > target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (0.5 * (lo + hi)).exp()
    };

    let il = illuminant_rgb(kelvin as f32);
    let green_gain = ((1.0 / m_r) * (1.0 / m_b) / (il[0] * il[2])).sqrt();
    let tint = (-(TINT_STOP as f64) * green_gain.log2()) as f32;

    Some((kelvin as f32, tint.clamp(-TINT_LIMIT, TINT_LIMIT)))
}

/// sRGB transfer curve applied to a linear value, quantized to 8 bits.
pub fn encode_srgb(linear: f32) -> u8 {
    let v = if linear.is_nan() { 0.0 } else { linear.clamp(0.0, 1.0) };
    let encoded = if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Rec. 709 relative luminance of a linear RGB triple.
pub fn luminance(rgb: [f32; 3]) -> f32 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}
