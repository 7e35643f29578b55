// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! 2D FFT helpers over `ndarray` planes.
//!
//! Grid planes keep the zero spatial frequency at the centre pixel, so the
//! centred transforms below shift to the FFT's corner-origin convention,
//! transform, and shift back. The forward transform is unnormalised; the
//! inverse carries the 1/N factor.


use marlu::c64;
use ndarray::Array2;
use num_traits::Zero;
use rustfft::{FftDirection, FftPlanner};

/// In-place 2D transform: rows first, then columns through a scratch column
/// buffer (column lanes are strided and can't be handed to rustfft directly).
fn transform(a: &mut Array2<c64>, direction: FftDirection) {
    let (ny, nx) = a.dim();
    let mut planner = FftPlanner::new();

    let row_fft = planner.plan_fft(nx, direction);
    let mut scratch = vec![c64::zero(); row_fft.get_inplace_scratch_len()];
    for mut row in a.rows_mut() {
        let row = row.as_slice_mut().expect("plane rows are contiguous");
        row_fft.process_with_scratch(row, &mut scratch);
    }

    let col_fft = planner.plan_fft(ny, direction);
    if col_fft.get_inplace_scratch_len() > scratch.len() {
        scratch.resize(col_fft.get_inplace_scratch_len(), c64::zero());
    }
    let mut column = vec![c64::zero(); ny];
    for x in 0..nx {
        for (c, y) in column.iter_mut().zip(0..ny) {
            *c = a[[y, x]];
        }
        col_fft.process_with_scratch(&mut column, &mut scratch);
        for (c, y) in column.iter().zip(0..ny) {
            a[[y, x]] = *c;
        }
    }
}

/// Unnormalised forward 2D FFT, in place.
pub(crate) fn fft2(a: &mut Array2<c64>) {
    transform(a, FftDirection::Forward);
}

/// Inverse 2D FFT, in place, normalised by 1/(nx·ny).
pub(crate) fn ifft2(a: &mut Array2<c64>) {
    transform(a, FftDirection::Inverse);
    let n = a.len() as f64;
    a.mapv_inplace(|v| v / n);
}

fn shift2(a: &Array2<c64>, sy: usize, sx: usize) -> Array2<c64> {
    let (ny, nx) = a.dim();
    let mut out = Array2::zeros((ny, nx));
    for ((y, x), &v) in a.indexed_iter() {
        out[[(y + sy) % ny, (x + sx) % nx]] = v;
    }
    out
}

/// Move the zero frequency from the first element to the centre pixel.
pub(crate) fn fft_shift(a: &Array2<c64>) -> Array2<c64> {
    let (ny, nx) = a.dim();
    shift2(a, ny / 2, nx / 2)
}

/// Move the centre pixel to the first element (inverse of [`fft_shift`],
/// which differs for odd sizes).
pub(crate) fn ifft_shift(a: &Array2<c64>) -> Array2<c64> {
    let (ny, nx) = a.dim();
    shift2(a, ny - ny / 2, nx - nx / 2)
}

/// Transform a centre-origin uv plane to a centre-origin image plane
/// (normalised inverse).
pub(crate) fn uv_to_image(plane: &Array2<c64>) -> Array2<c64> {
    let mut t = ifft_shift(plane);
    ifft2(&mut t);
    fft_shift(&t)
}

/// Transform a centre-origin image plane to a centre-origin uv plane
/// (unnormalised forward).
pub(crate) fn image_to_uv(plane: &Array2<c64>) -> Array2<c64> {
    let mut t = ifft_shift(plane);
    fft2(&mut t);
    fft_shift(&t)
}
