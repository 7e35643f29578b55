// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The prolate-spheroidal anti-aliasing kernel.
//!
//! The classic gridding function: separable, real, concentrates aliased
//! energy outside the image. The 1D profile is `(1 - ν²)·ψ(ν)` with `ψ` the
//! zeroth-order prolate spheroidal wave function (m = 6, α = 1), and the
//! image-domain correction divides by `ψ` evaluated across the image.

use marlu::c64;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use super::ConvolutionFunction;

/// Rational approximation to the zeroth-order prolate spheroidal wave
/// function for m = 6, α = 1 (Schwab 1984), on `|ν| <= 1`; zero outside.
/// The gridding profile is `(1 - ν²)` times this.
pub(crate) fn grdsf(nu: f64) -> f64 {
    const P: [[f64; 5]; 2] = [
        [
            8.203343e-2,
            -3.644705e-1,
            6.278660e-1,
            -5.335581e-1,
            2.312756e-1,
        ],
        [
            4.028559e-3,
            -3.697768e-2,
            1.021332e-1,
            -1.201436e-1,
            6.412774e-2,
        ],
    ];
    const Q: [[f64; 3]; 2] = [[1.0, 8.212018e-1, 2.078043e-1], [1.0, 9.599102e-1, 2.918724e-1]];

    let nu = nu.abs();
    let (part, nuend) = if nu < 0.75 {
        (0, 0.75)
    } else if nu <= 1.0 {
        (1, 1.0)
    } else {
        return 0.0;
    };

    let delnusq = nu * nu - nuend * nuend;
    let mut power = delnusq;
    let mut top = P[part][0];
    for p in &P[part][1..] {
        top += p * power;
        power *= delnusq;
    }
    let mut power = delnusq;
    let mut bottom = Q[part][0];
    for q in &Q[part][1..] {
        bottom += q * power;
        power *= delnusq;
    }
    top / bottom
}

/// Divide an image-domain plane by the spheroidal correction, with ν spanning
/// [-1, 1) across each axis.
pub(crate) fn correct_with_grdsf(mut plane: ArrayViewMut2<f64>) {
    let (ny, nx) = plane.dim();
    let correction_y: Vec<f64> = (0..ny)
        .map(|y| grdsf(2.0 * (y as f64 - (ny / 2) as f64) / ny as f64))
        .collect();
    let correction_x: Vec<f64> = (0..nx)
        .map(|x| grdsf(2.0 * (x as f64 - (nx / 2) as f64) / nx as f64))
        .collect();
    for (mut row, cy) in plane.outer_iter_mut().zip(correction_y.iter()) {
        for (v, cx) in row.iter_mut().zip(correction_x.iter()) {
            *v /= cy * cx;
        }
    }
}

/// The anti-aliasing spheroidal kernel family: one shape, tabulated per
/// oversampling sub-cell, each sub-kernel normalised to unit sum.
pub struct SpheroidalFunction {
    support: usize,
    oversample: usize,
    kernels: Vec<Array2<c64>>,
}

impl SpheroidalFunction {
    pub fn new(support: usize, oversample: usize) -> SpheroidalFunction {
        assert!(support > 0, "support must be positive");
        assert!(oversample > 0, "oversample must be positive");

        let size = 2 * support + 1;
        let profile = |x: f64| {
            let nu = x / support as f64;
            if nu.abs() > 1.0 {
                0.0
            } else {
                (1.0 - nu * nu) * grdsf(nu)
            }
        };

        let mut kernels = Vec::with_capacity(oversample * oversample);
        for fracv in 0..oversample {
            for fracu in 0..oversample {
                let mut kernel = Array2::from_elem((size, size), c64::default());
                let mut sum = 0.0;
                for dv in 0..size {
                    let y = dv as f64 - support as f64 - fracv as f64 / oversample as f64;
                    for du in 0..size {
                        let x = du as f64 - support as f64 - fracu as f64 / oversample as f64;
                        let value = profile(x) * profile(y);
                        kernel[[dv, du]] = c64::new(value, 0.0);
                        sum += value;
                    }
                }
                assert!(sum > 0.0, "spheroidal kernel has zero integral");
                kernel.mapv_inplace(|v| v / sum);
                kernels.push(kernel);
            }
        }

        SpheroidalFunction {
            support,
            oversample,
            kernels,
        }
    }
}

impl ConvolutionFunction for SpheroidalFunction {
    fn name(&self) -> &'static str {
        "SphFunc"
    }

    fn c_index(&self, _row: usize, _pol: usize, _chan: usize) -> usize {
        0
    }

    fn num_shapes(&self) -> usize {
        1
    }

    fn kernel(&self, index: usize) -> ArrayView2<c64> {
        assert!(
            index < self.table_len(),
            "convolution-function index {index} is out of range (table has {} entries)",
            self.table_len()
        );
        self.kernels[index].view()
    }

    fn support(&self) -> usize {
        self.support
    }

    fn oversample(&self) -> usize {
        self.oversample
    }

    fn correct_image(&self, plane: ArrayViewMut2<f64>) {
        correct_with_grdsf(plane);
    }
}
