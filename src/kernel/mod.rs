// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The innermost gridding/degridding primitive: stamp a convolution-weighted
//! visibility onto a grid patch, or sum a patch back into a visibility.
//!
//! These two functions dominate the total runtime of an imaging run (they are
//! called once per sample per channel per polarisation), so they are kept as
//! tight loops over contiguous rows with no per-element work beyond the
//! multiply-accumulate.


use marlu::c64;
use ndarray::{s, ArrayView2, ArrayViewMut2};

/// Add `conv * cvis` onto the grid patch centred at `(iu, iv)`.
///
/// `conv` must have shape `(2*support + 1, 2*support + 1)`. The caller must
/// have already checked that the patch `[iv - support, iv + support] x
/// [iu - support, iu + support]` lies entirely inside `plane`; this function
/// performs no bounds checks of its own.
#[inline]
pub fn grid(
    mut plane: ArrayViewMut2<c64>,
    conv: ArrayView2<c64>,
    cvis: c64,
    iu: usize,
    iv: usize,
    support: usize,
) {
    let size = 2 * support + 1;
    debug_assert_eq!(conv.dim(), (size, size));
    let mut patch = plane.slice_mut(s![
        iv - support..iv - support + size,
        iu - support..iu - support + size
    ]);
    for (mut patch_row, conv_row) in patch.outer_iter_mut().zip(conv.outer_iter()) {
        for (g, &c) in patch_row.iter_mut().zip(conv_row.iter()) {
            *g += c * cvis;
        }
    }
}

/// The conjugate operation: accumulate `sum(conv * plane)` over the patch
/// centred at `(iu, iv)` into `sample`.
///
/// The same caller contract as [`grid`] applies: the patch must lie entirely
/// inside `plane`.
#[inline]
pub fn degrid(
    sample: &mut c64,
    conv: ArrayView2<c64>,
    plane: ArrayView2<c64>,
    iu: usize,
    iv: usize,
    support: usize,
) {
    let size = 2 * support + 1;
    debug_assert_eq!(conv.dim(), (size, size));
    let patch = plane.slice(s![
        iv - support..iv - support + size,
        iu - support..iu - support + size
    ]);
    let mut sum = c64::default();
    for (patch_row, conv_row) in patch.outer_iter().zip(conv.outer_iter()) {
        for (&g, &c) in patch_row.iter().zip(conv_row.iter()) {
            sum += c * g;
        }
    }
    *sample += sum;
}
