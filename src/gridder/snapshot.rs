// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Snapshot imaging: fit and subtract a best-fit w plane.
//!
//! Over a short enough snapshot, the w coordinate of a coplanar array is
//! well approximated by a plane `w ≈ a·u + b·v`; subtracting it leaves
//! residual w terms small enough for a narrow w-projection setup (at the
//! cost of a per-snapshot coordinate distortion, which the calling pipeline
//! accounts for when regridding images onto a common frame). The adapter
//! fits the plane per chunk, refuses data whose residual exceeds the
//! configured tolerance, and hands the flattened chunk to the wrapped
//! gridder.

use log::debug;
use marlu::{c64, UVW};
use ndarray::{s, Array4, ArrayView4, ArrayViewMut3};

use super::{Gridder, GridderStats, VisGridder};
use crate::axes::ImageAxes;
use crate::chunk::VisChunk;
use crate::constants::VEL_C;

/// Least-squares fit of `w = a·u + b·v` over a chunk's rows. Falls back to a
/// flat plane when the baselines don't constrain a fit (e.g. a single row).
pub(crate) fn fit_w_plane(uvws: &[UVW]) -> (f64, f64) {
    let mut suu = 0.0;
    let mut svv = 0.0;
    let mut suv = 0.0;
    let mut suw = 0.0;
    let mut svw = 0.0;
    for uvw in uvws {
        suu += uvw.u * uvw.u;
        svv += uvw.v * uvw.v;
        suv += uvw.u * uvw.v;
        suw += uvw.u * uvw.w;
        svw += uvw.v * uvw.w;
    }
    let det = suu * svv - suv * suv;
    if det.abs() < f64::EPSILON * (suu * svv).max(1.0) {
        return (0.0, 0.0);
    }
    (
        (suw * svv - svw * suv) / det,
        (svw * suu - suw * suv) / det,
    )
}

/// A decorator around [`VisGridder`] that performs the per-chunk w-plane
/// fit, with optional clipping of the image edges at finalisation.
pub struct SnapshotGridderAdapter {
    inner: VisGridder,
    /// The largest acceptable residual w \[wavelengths\].
    wtolerance: f64,
    /// The fraction of the image to zero at the edges of the finalised
    /// image.
    clipping: f64,
}

impl SnapshotGridderAdapter {
    pub fn new(inner: VisGridder, wtolerance: f64, clipping: f64) -> SnapshotGridderAdapter {
        assert!(wtolerance > 0.0, "wtolerance must be positive");
        assert!(
            (0.0..1.0).contains(&clipping),
            "clipping must be in [0, 1)"
        );
        SnapshotGridderAdapter {
            inner,
            wtolerance,
            clipping,
        }
    }

    /// Fit the chunk's w plane, check the residuals against the tolerance
    /// and return the chunk with the fitted plane subtracted.
    fn flattened(&self, chunk: &VisChunk) -> VisChunk {
        let (a, b) = fit_w_plane(&chunk.rotated_uvws);
        let mut flat = chunk.clone();
        let mut max_residual = 0.0_f64;
        for uvw in flat.rotated_uvws.iter_mut() {
            uvw.w -= a * uvw.u + b * uvw.v;
            max_residual = max_residual.max(uvw.w.abs());
        }
        // Judge the residual at the chunk's top frequency, where it is worst
        // in wavelengths.
        let top_freq = chunk.freqs.iter().fold(0.0_f64, |acc, &f| acc.max(f));
        let max_residual_lambda = max_residual * top_freq / VEL_C;
        assert!(
            max_residual_lambda <= self.wtolerance,
            "snapshot w tolerance exceeded: residual w of {max_residual_lambda:.1} wavelengths > {:.1}; \
             the array is too non-coplanar for snapshot imaging with this setup",
            self.wtolerance
        );
        debug!(
            "Fitted w plane ({a:.2e}, {b:.2e}), residual w {max_residual_lambda:.2} wavelengths"
        );
        flat
    }
}

impl Gridder for SnapshotGridderAdapter {
    fn initialise_grid(&mut self, axes: &ImageAxes, shape: (usize, usize), do_psf: bool) {
        self.inner.initialise_grid(axes, shape, do_psf);
    }

    fn grid(&mut self, chunk: &VisChunk) {
        let flat = self.flattened(chunk);
        self.inner.grid(&flat);
    }

    fn initialise_degrid(&mut self, axes: &ImageAxes, model: ArrayView4<f64>) {
        self.inner.initialise_degrid(axes, model);
    }

    fn degrid(&mut self, chunk: &VisChunk, vis: ArrayViewMut3<c64>) {
        let flat = self.flattened(chunk);
        self.inner.degrid(&flat, vis);
    }

    fn finalise_grid(&mut self) -> Array4<f64> {
        let mut image = self.inner.finalise_grid();
        if self.clipping > 0.0 {
            let (num_planes, num_pols, ny, nx) = image.dim();
            let margin_y = ((ny as f64 * self.clipping) / 2.0).round() as usize;
            let margin_x = ((nx as f64 * self.clipping) / 2.0).round() as usize;
            for plane in 0..num_planes {
                for pol in 0..num_pols {
                    let mut p = image.slice_mut(s![plane, pol, .., ..]);
                    p.slice_mut(s![..margin_y, ..]).fill(0.0);
                    p.slice_mut(s![ny - margin_y.., ..]).fill(0.0);
                    p.slice_mut(s![.., ..margin_x]).fill(0.0);
                    p.slice_mut(s![.., nx - margin_x..]).fill(0.0);
                }
            }
        }
        image
    }

    fn finalise_weights(&mut self) -> Array4<f64> {
        self.inner.finalise_weights()
    }

    fn finalise_degrid(&mut self) {
        self.inner.finalise_degrid();
    }

    fn stats(&self) -> &GridderStats {
        self.inner.stats()
    }
}
