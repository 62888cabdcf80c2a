// blackbody.rs — Temperature to linear RGB
//
// Piecewise fit of the blackbody emission colour (Blender's table). Outside
// [965 K, 12000 K) the result is one of two fixed asymptotes; inside, one of
// six buckets supplies `a/t + b·t + c` for red and green and a cubic in `t`
// for blue.

/// Colour at and above 12000 K.
pub const HIGH_TEMPERATURE_RGB: [f64; 3] = [0.826270103, 0.994478524, 1.56626022];
/// Colour below 965 K.
pub const LOW_TEMPERATURE_RGB: [f64; 3] = [4.70366907, 0.0, 0.0];

pub const MIN_TEMPERATURE: f64 = 965.0;
pub const MAX_TEMPERATURE: f64 = 12000.0;

/// Lower bounds of buckets 1..=5; bucket 0 starts at `MIN_TEMPERATURE`.
pub const BUCKET_BREAKPOINTS: [f64; 5] = [1167.0, 1449.0, 1902.0, 3315.0, 6365.0];

const TABLE_R: [[f64; 3]; 6] = [
    [2.52432244e+03, -1.06185848e-03, 3.11067539e+00],
    [3.37763626e+03, -4.34581697e-04, 1.64843306e+00],
    [4.10671449e+03, -8.61949938e-05, 6.41423749e-01],
    [4.66849800e+03, 2.85655028e-05, 1.29075375e-01],
    [4.60124770e+03, 2.89727618e-05, 1.48001316e-01],
    [3.78765709e+03, 9.36026367e-06, 3.98995841e-01],
];

const TABLE_G: [[f64; 3]; 6] = [
    [-7.50343014e+02, 3.15679613e-04, 4.73464526e-01],
    [-1.00402363e+03, 1.29189794e-04, 9.08181524e-01],
    [-1.22075471e+03, 2.56245413e-05, 1.20753416e+00],
    [-1.42546105e+03, -4.01730887e-05, 1.44002695e+00],
    [-1.18134453e+03, -2.18913373e-05, 1.30656109e+00],
    [-5.00279505e+02, -4.59745390e-06, 1.09090465e+00],
];

const TABLE_B: [[f64; 4]; 6] = [
    [0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0],
    [-2.02524603e-11, 1.79435860e-07, -2.60561875e-04, -1.41761141e-02],
    [-2.22463426e-13, -1.55078698e-08, 3.81675160e-04, -7.30646033e-01],
    [6.72595954e-13, -2.73059993e-08, 4.24068546e-04, -7.52204323e-01],
];

/// Approximate linear RGB of a blackbody at `t` Kelvin.
pub fn blackbody(t: f64) -> [f64; 3] {
    if t >= MAX_TEMPERATURE {
        return HIGH_TEMPERATURE_RGB;
    }
    if t < MIN_TEMPERATURE {
        return LOW_TEMPERATURE_RGB;
    }

    let i = BUCKET_BREAKPOINTS.iter().filter(|&&bp| t >= bp).count();
    let r = TABLE_R[i];
    let g = TABLE_G[i];
    let b = TABLE_B[i];

    let t_inv = 1.0 / t;
    [
        r[0] * t_inv + r[1] * t + r[2],
        g[0] * t_inv + g[1] * t + g[2],
        ((b[0] * t + b[1]) * t + b[2]) * t + b[3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_delta(a: [f64; 3], b: [f64; 3]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn plateau_above_max() {
        assert_eq!(blackbody(20000.0), blackbody(12000.0));
        assert_eq!(blackbody(12000.0), HIGH_TEMPERATURE_RGB);
    }

    #[test]
    fn low_asymptote() {
        assert_eq!(blackbody(500.0), [4.70366907, 0.0, 0.0]);
        assert_eq!(blackbody(0.0), LOW_TEMPERATURE_RGB);
    }

    #[test]
    fn continuous_across_buckets() {
        for bp in BUCKET_BREAKPOINTS {
            let below = blackbody(bp - 1e-6);
            let at = blackbody(bp);
            assert!(max_delta(below, at) < 5e-3, "jump at {bp}: {below:?} vs {at:?}");
        }
    }

    #[test]
    fn daylight_is_roughly_white() {
        let [r, g, b] = blackbody(6500.0);
        assert!((r - 1.0).abs() < 0.1, "r = {r}");
        assert!((g - 1.0).abs() < 0.1, "g = {g}");
        assert!((b - 1.0).abs() < 0.15, "b = {b}");
    }

    #[test]
    fn candle_light_has_no_blue() {
        let [r, g, b] = blackbody(1000.0);
        assert!(r > g);
        assert_eq!(b, 0.0);
    }
}
