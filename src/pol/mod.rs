// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Polarisation frames and conversion between them.
//!
//! Accessor chunks carry visibilities in the instrument's frame (usually the
//! linear products XX, XY, YX, YY) while image planes are labelled with
//! Stokes parameters; gridding converts one way and degridding the other. A
//! [`PolConverter`] is a small complex matrix built once per direction, with
//! the Stokes decomposition as the common language between bases:
//!
//! ```text
//! I = (XX + YY)/2    Q = (XX - YY)/2
//! U = (XY + YX)/2    V = -i(XY - YX)/2
//! ```

mod error;

pub use error::PolError;

use marlu::c64;
use ndarray::Array2;

/// A single polarisation product, either instrumental (linear feeds) or
/// Stokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[allow(clippy::upper_case_acronyms)]
pub enum Polarisation {
    XX,
    XY,
    YX,
    YY,
    I,
    Q,
    U,
    V,
}

impl Polarisation {
    pub fn is_stokes(self) -> bool {
        matches!(
            self,
            Polarisation::I | Polarisation::Q | Polarisation::U | Polarisation::V
        )
    }

    /// How this product is assembled from products of the *other* family:
    /// Stokes parameters in terms of linear products, and linear products in
    /// terms of Stokes parameters.
    fn expansion(self) -> Vec<(Polarisation, c64)> {
        use Polarisation::*;
        let re = |x: f64| c64::new(x, 0.0);
        let im = |x: f64| c64::new(0.0, x);
        match self {
            I => vec![(XX, re(0.5)), (YY, re(0.5))],
            Q => vec![(XX, re(0.5)), (YY, re(-0.5))],
            U => vec![(XY, re(0.5)), (YX, re(0.5))],
            V => vec![(XY, im(-0.5)), (YX, im(0.5))],
            XX => vec![(I, re(1.0)), (Q, re(1.0))],
            YY => vec![(I, re(1.0)), (Q, re(-1.0))],
            XY => vec![(U, re(1.0)), (V, im(1.0))],
            YX => vec![(U, re(1.0)), (V, im(-1.0))],
        }
    }
}

/// Converts visibility vectors from one polarisation basis to another by a
/// single matrix multiply. Construction fails if a target product needs an
/// input product that isn't available.
#[derive(Debug, Clone)]
pub struct PolConverter {
    /// Shape `(to.len(), from.len())`; `out = matrix . in`.
    matrix: Array2<c64>,
}

impl PolConverter {
    pub fn new(from: &[Polarisation], to: &[Polarisation]) -> Result<PolConverter, PolError> {
        let mut matrix = Array2::from_elem((to.len(), from.len()), c64::default());
        for (i, &target) in to.iter().enumerate() {
            // A product already present in the input basis passes straight
            // through.
            if let Some(j) = from.iter().position(|&f| f == target) {
                matrix[[i, j]] = c64::new(1.0, 0.0);
                continue;
            }
            for (needed, coefficient) in target.expansion() {
                match from.iter().position(|&f| f == needed) {
                    Some(j) => matrix[[i, j]] = coefficient,
                    None => {
                        return Err(PolError::MissingInput {
                            target,
                            needed,
                        })
                    }
                }
            }
        }
        Ok(PolConverter { matrix })
    }

    pub fn num_inputs(&self) -> usize {
        self.matrix.dim().1
    }

    pub fn num_outputs(&self) -> usize {
        self.matrix.dim().0
    }

    /// Apply the conversion. `input` and `output` must have the lengths the
    /// converter was built for.
    pub fn convert(&self, input: &[c64], output: &mut [c64]) {
        let (n_out, n_in) = self.matrix.dim();
        assert_eq!(input.len(), n_in, "input.len() != converter input basis");
        assert_eq!(output.len(), n_out, "output.len() != converter output basis");
        for (out, row) in output.iter_mut().zip(self.matrix.outer_iter()) {
            let mut sum = c64::default();
            for (&m, &v) in row.iter().zip(input.iter()) {
                sum += m * v;
            }
            *out = sum;
        }
    }
}
