// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The accessor contract: one chunk of visibility data as the gridder
//! consumes it.

use hifitime::Epoch;
use marlu::{c64, RADec, UVW};
use ndarray::Array3;
use vec1::Vec1;

use crate::pol::Polarisation;

/// One chunk of data from an accessor iterator.
///
/// UVWs arrive already rotated to the common tangent point, with the matching
/// phase-rotation delays; that rotation is the data layer's job, not the
/// gridder's. Visibilities and flags are `[row][channel][polarisation]`
/// cubes. Degridded visibilities are *not* written back into a chunk; the
/// caller passes an explicit mutable buffer to
/// [`Gridder::degrid`](crate::gridder::Gridder::degrid).
#[derive(Debug, Clone)]
pub struct VisChunk {
    /// The centroid timestamp of this chunk.
    pub timestamp: Epoch,

    /// Per-row UVW coordinates, rotated to the tangent point \[metres\].
    pub rotated_uvws: Vec<UVW>,

    /// Per-row phase-rotation path delay to the tangent point \[metres\].
    pub delays: Vec<f64>,

    /// Per-channel centre frequencies \[Hz\].
    pub freqs: Vec1<f64>,

    /// The visibility cube, `[row][channel][polarisation]`.
    pub vis: Array3<c64>,

    /// The flag cube, same shape as `vis`. `true` means bad data.
    pub flags: Array3<bool>,

    /// The feed (beam) id of each row.
    pub feeds: Vec<u32>,

    /// The dish pointing direction of each row.
    pub pointings: Vec<RADec>,

    /// The polarisation basis of the `vis` cube's last axis.
    pub pols: Vec1<Polarisation>,
}

impl VisChunk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: Epoch,
        rotated_uvws: Vec<UVW>,
        delays: Vec<f64>,
        freqs: Vec1<f64>,
        vis: Array3<c64>,
        flags: Array3<bool>,
        feeds: Vec<u32>,
        pointings: Vec<RADec>,
        pols: Vec1<Polarisation>,
    ) -> VisChunk {
        let num_rows = rotated_uvws.len();
        assert_eq!(delays.len(), num_rows, "delays.len() != rotated_uvws.len()");
        assert_eq!(feeds.len(), num_rows, "feeds.len() != rotated_uvws.len()");
        assert_eq!(
            pointings.len(),
            num_rows,
            "pointings.len() != rotated_uvws.len()"
        );
        assert_eq!(
            vis.dim(),
            (num_rows, freqs.len(), pols.len()),
            "vis shape != (rows, channels, polarisations)"
        );
        assert_eq!(flags.dim(), vis.dim(), "flags shape != vis shape");

        VisChunk {
            timestamp,
            rotated_uvws,
            delays,
            freqs,
            vis,
            flags,
            feeds,
            pointings,
            pols,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rotated_uvws.len()
    }

    pub fn num_chans(&self) -> usize {
        self.freqs.len()
    }

    pub fn num_pols(&self) -> usize {
        self.pols.len()
    }
}
