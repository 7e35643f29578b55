// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use marlu::c64;

/// Round to the nearest integer, halves away from zero.
///
/// # Examples
///
/// `assert_eq!(nint(-2.5), -3);`
#[inline]
pub(crate) fn nint(x: f64) -> i32 {
    x.round() as i32
}

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// Split a scaled uv coordinate (pixel units) into a whole pixel and an
/// oversampling sub-cell fraction in `[0, oversample)`.
///
/// Rounding the pixel and the fraction independently can leave the fraction
/// outside its range; when it does, the pixel is shifted by one and the
/// fraction rederived. Rounding exactly on a half-sub-cell boundary can still
/// land the rederived fraction on the edge, in which case it folds onto the
/// neighbouring whole pixel. Skipping either correction aliases the
/// convolution-function lookup by one sub-cell.
///
/// For all finite `scaled`, the result satisfies `0 <= frac < oversample` and
/// `pixel + frac/oversample` is within half a sub-cell of `scaled`.
pub(crate) fn oversampled_offset(scaled: f64, oversample: usize) -> (i32, usize) {
    let os = oversample as i32;
    let mut pixel = nint(scaled);
    let mut frac = nint(os as f64 * (scaled - f64::from(pixel)));
    if frac < 0 {
        pixel -= 1;
        frac = nint(os as f64 * (scaled - f64::from(pixel)));
    } else if frac >= os {
        pixel += 1;
        frac = nint(os as f64 * (scaled - f64::from(pixel)));
    }
    // Half-sub-cell boundary.
    if frac == os {
        pixel += 1;
        frac = 0;
    } else if frac < 0 {
        pixel -= 1;
        frac += os;
    }
    (pixel, frac as usize)
}
