// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-visibility weighting schemes.

/// How each visibility is weighted as it is gridded or degridded.
#[derive(Debug, Clone, Copy)]
pub enum VisWeights {
    /// Unit weights.
    Natural,

    /// Multi-frequency-synthesis weighting for Taylor-term imaging: each
    /// visibility is scaled by `((freq - reffreq) / reffreq)^order`. Order 0
    /// reduces to unit weights.
    Mfs { reffreq: f64, order: i32 },
}

impl VisWeights {
    pub fn weight(self, freq_hz: f64) -> f64 {
        match self {
            VisWeights::Natural => 1.0,
            VisWeights::Mfs { reffreq, order } => ((freq_hz - reffreq) / reffreq).powi(order),
        }
    }
}
