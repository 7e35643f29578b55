// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Nearest-neighbour gridding: a single-pixel unit kernel.

use marlu::c64;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use super::ConvolutionFunction;

/// The simplest possible kernel family: support 0, every oversampling
/// sub-cell gets the same unit single-pixel stamp. Useful for tests and for
/// quick-look imaging where aliasing doesn't matter.
pub struct BoxFunction {
    oversample: usize,
    kernels: Vec<Array2<c64>>,
}

impl BoxFunction {
    pub fn new(oversample: usize) -> BoxFunction {
        assert!(oversample > 0, "oversample must be positive");
        let unit = Array2::from_elem((1, 1), c64::new(1.0, 0.0));
        BoxFunction {
            oversample,
            kernels: vec![unit; oversample * oversample],
        }
    }
}

impl ConvolutionFunction for BoxFunction {
    fn name(&self) -> &'static str {
        "Box"
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
        0
    }

    fn oversample(&self) -> usize {
        self.oversample
    }

    fn correct_image(&self, _plane: ArrayViewMut2<f64>) {
        // A single-pixel kernel has a flat Fourier-domain footprint.
    }
}
