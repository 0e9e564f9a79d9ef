//! Transmittance to absorbance transform.
//!
//! Every pixel `x` becomes `-ln(x)` (Beer-Lambert). Non-positive inputs are
//! not special-cased: `0` maps to `+inf` and negatives to `NaN`, so a single
//! bad pixel never aborts a multi-frame conversion.

use ndarray::{Array2, ArrayView2};

/// Frames with at least this many pixels are mapped in parallel.
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

#[inline]
pub fn minus_ln_value(x: f32) -> f32 {
    -x.ln()
}

/// `-ln` of every element of one frame.
pub fn minus_ln(frame: ArrayView2<'_, f32>) -> Array2<f32> {
    let mut out = frame.to_owned();
    minus_ln_inplace(&mut out);
    out
}

/// In-place variant of [`minus_ln`]; element positions are unchanged.
pub fn minus_ln_inplace(frame: &mut Array2<f32>) {
    if frame.len() >= PARALLEL_THRESHOLD {
        frame.par_mapv_inplace(minus_ln_value);
    } else {
        frame.mapv_inplace(minus_ln_value);
    }
}
