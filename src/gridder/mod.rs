// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The core visibility gridding/degridding orchestrator.
//!
//! A [`VisGridder`] runs one session at a time: `initialise_grid` (or
//! `initialise_degrid`), any number of `grid` (or `degrid`) chunk calls, then
//! the matching finalisation. Gridding accumulates convolution-weighted
//! visibilities onto a padded complex uv grid and books a sum-of-weights
//! entry per accumulation event; finalisation inverse-FFTs each plane,
//! deconvolves the kernel footprint and extracts the unpadded image.
//! Degridding runs the pipeline the other way, predicting visibilities off a
//! forward-transformed model image.
//!
//! Fatal misuse (gridding before initialisation, a convolution index off the
//! end of the table, asking a PSF gridder to predict) panics: this is a batch
//! numerical kernel, and such states mean a configuration or caller bug that
//! retrying cannot fix. Expected data conditions (flagged samples, channels
//! outside the image band, footprints off the grid edge, rows beyond the
//! pointing limit) are silently skipped and counted.

mod snapshot;
#[cfg(test)]
mod tests;

pub use snapshot::SnapshotGridderAdapter;

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use marlu::{c64, RADec};
use ndarray::{s, Array2, Array3, Array4, ArrayView4, ArrayViewMut3};

use crate::axes::ImageAxes;
use crate::cf::{ConvolutionFunction, GridGeometry};
use crate::chunk::VisChunk;
use crate::constants::{MAX_SANE_FREQ, MIN_SANE_FREQ, POINTING_TOLERANCE, TAU, VEL_C};
use crate::fft;
use crate::freq::FrequencyMapper;
use crate::kernel;
use crate::math::{cexp, nint, oversampled_offset};
use crate::pol::PolConverter;
use crate::weights::VisWeights;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Gridding,
    Degridding,
    Finalised,
}

/// Diagnostic counters for one gridding or degridding session. Logged at
/// finalisation; none of these affect the numerical results.
#[derive(Debug, Clone, Default)]
pub struct GridderStats {
    /// Sample/channel events accumulated onto the grid.
    pub samples_gridded: u64,

    /// Sample/channel events predicted off the grid.
    pub samples_degridded: u64,

    /// Kernel pixels stamped while gridding.
    pub points_stamped: u64,

    /// Sample/channel events skipped because a polarisation was flagged.
    pub vectors_flagged: u64,

    /// Sample/channel events whose frequency fell outside the image band.
    pub channels_unmapped: u64,

    /// Rows rejected by the maximum-pointing-separation policy.
    pub rows_rejected: u64,

    /// Time spent in grid().
    pub time_gridding: Duration,

    /// Time spent in degrid().
    pub time_degridding: Duration,
}

/// One gridding/degridding session after the other; see the module docs for
/// the protocol.
pub trait Gridder {
    /// Start a gridding session for an image of `shape` `(nx, ny)` pixels
    /// (unpadded). With `do_psf`, unit-amplitude samples are gridded instead
    /// of the data, restricted to a representative feed/field unless the
    /// gridder was configured to use all data.
    fn initialise_grid(&mut self, axes: &ImageAxes, shape: (usize, usize), do_psf: bool);

    /// Accumulate one chunk onto the grid.
    fn grid(&mut self, chunk: &VisChunk);

    /// Start a degridding session from a model image
    /// `[chan][pol][y][x]` (unpadded). An all-zero model flags the session
    /// empty and later `degrid` calls do nothing.
    fn initialise_degrid(&mut self, axes: &ImageAxes, model: ArrayView4<f64>);

    /// Predict visibilities for one chunk, accumulating into `vis` (same
    /// shape as the chunk's visibility cube, in the chunk's polarisation
    /// basis).
    fn degrid(&mut self, chunk: &VisChunk, vis: ArrayViewMut3<c64>);

    /// FFT, convolution-correct and unpad the accumulated grid into the
    /// output image `[chan][pol][y][x]`.
    fn finalise_grid(&mut self) -> Array4<f64>;

    /// The weight of each output plane, broadcast as a constant over the
    /// plane.
    fn finalise_weights(&mut self) -> Array4<f64>;

    /// End a degridding session.
    fn finalise_degrid(&mut self);

    /// This session's diagnostic counters.
    fn stats(&self) -> &GridderStats;
}

pub struct VisGridder {
    cf: Box<dyn ConvolutionFunction>,
    padding: f64,
    /// Rows pointing further than this from the image centre are skipped
    /// \[radians\].
    max_pointing_separation: Option<f64>,
    /// Build the PSF from every unflagged sample instead of the
    /// representative feed/field only.
    all_data_psf: bool,
    /// Track the sum of weights per oversampling sub-cell rather than per
    /// kernel shape.
    track_oversample_weights: bool,
    vis_weights: VisWeights,

    mode: Mode,
    do_psf: bool,
    axes: Option<ImageAxes>,
    shape: (usize, usize),
    padded_shape: (usize, usize),
    /// uv cell sizes of the padded grid \[wavelengths\].
    uv_cell: (f64, f64),
    /// `[chan][pol][y][x]`, padded.
    grid: Array4<c64>,
    /// `[cf_row][pol][chan]`; empty until a gridding session starts.
    sum_of_weights: Array3<f64>,
    freq_mapper: FrequencyMapper,
    model_is_empty: bool,
    /// The `(feed, pointing)` the PSF is being built from, latched on the
    /// first accepted sample of a PSF pass.
    representative: Option<(u32, RADec)>,
    freq_checked: bool,
    stats: GridderStats,
}

impl VisGridder {
    pub fn new(
        cf: Box<dyn ConvolutionFunction>,
        padding: f64,
        max_pointing_separation: Option<f64>,
        all_data_psf: bool,
        track_oversample_weights: bool,
        vis_weights: VisWeights,
    ) -> VisGridder {
        assert!(padding >= 1.0, "padding must be at least 1.0");
        assert!(cf.oversample() > 0, "oversample must be positive");

        VisGridder {
            cf,
            padding,
            max_pointing_separation,
            all_data_psf,
            track_oversample_weights,
            vis_weights,
            mode: Mode::Idle,
            do_psf: false,
            axes: None,
            shape: (0, 0),
            padded_shape: (0, 0),
            uv_cell: (0.0, 0.0),
            grid: Array4::zeros((0, 0, 0, 0)),
            sum_of_weights: Array3::zeros((0, 0, 0)),
            freq_mapper: FrequencyMapper::default(),
            model_is_empty: false,
            representative: None,
            freq_checked: false,
            stats: GridderStats::default(),
        }
    }

    /// Forget the representative feed/field of a previous PSF pass.
    fn init_representative_field_and_feed(&mut self) {
        self.representative = None;
    }

    /// The representative `(feed, pointing)` of the current PSF pass, if one
    /// has been latched.
    pub fn representative(&self) -> Option<(u32, RADec)> {
        self.representative
    }

    /// Work out the padded shape, uv cell sizes and channel mapping shared
    /// by grid and degrid initialisation.
    fn set_image_geometry(&mut self, axes: &ImageAxes, shape: (usize, usize)) {
        let (nx, ny) = shape;
        assert!(nx > 0 && ny > 0, "image shape must be non-empty");
        let nxp = nint(self.padding * nx as f64) as usize;
        let nyp = nint(self.padding * ny as f64) as usize;
        let uv_cell_u = 1.0 / (axes.direction.cell_l.abs() * nxp as f64);
        let uv_cell_v = 1.0 / (axes.direction.cell_m.abs() * nyp as f64);

        self.cf.set_geometry(GridGeometry {
            uv_cell_u,
            uv_cell_v,
        });
        match axes.spectral {
            Some(spectral) => self.freq_mapper.setup_image(spectral),
            None => self.freq_mapper.setup_single_plane(),
        }

        self.axes = Some(axes.clone());
        self.shape = shape;
        self.padded_shape = (nxp, nyp);
        self.uv_cell = (uv_cell_u, uv_cell_v);
        self.freq_checked = false;
        self.stats = GridderStats::default();
    }

    /// The shared per-chunk routine; `degrid_out` present means the forward
    /// (prediction) direction.
    fn generic(&mut self, chunk: &VisChunk, mut degrid_out: Option<ArrayViewMut3<c64>>) {
        let forward = degrid_out.is_some();
        if forward {
            assert!(
                !self.do_psf,
                "a PSF gridder must never be asked to predict visibilities"
            );
            assert_eq!(
                self.mode,
                Mode::Degridding,
                "degrid() called outside a degridding session"
            );
            if self.model_is_empty {
                return;
            }
        } else {
            assert_eq!(
                self.mode,
                Mode::Gridding,
                "grid() called outside a gridding session"
            );
            assert!(
                !self.sum_of_weights.is_empty(),
                "sum of weights is not initialised"
            );
        }
        let started = Instant::now();

        debug!(
            "{} chunk at GPS {:.1}: {} rows, {} channels, {} polarisations",
            if forward { "Degridding" } else { "Gridding" },
            chunk.timestamp.to_gpst_seconds(),
            chunk.num_rows(),
            chunk.num_chans(),
            chunk.num_pols()
        );

        self.cf.init_chunk(chunk);
        self.freq_mapper.setup_mapping(chunk.freqs.as_vec());

        // Everything needed inside the loops, copied out so the loop only
        // touches disjoint fields.
        let axes = self.axes.as_ref().expect("session is initialised");
        let centre = axes.direction.centre;
        let num_image_pols = axes.num_pols();
        let to_image = if !forward && !self.do_psf {
            Some(
                PolConverter::new(chunk.pols.as_vec(), axes.stokes.as_vec()).unwrap_or_else(|e| {
                    panic!("can't convert this chunk into the image's polarisation frame: {e}")
                }),
            )
        } else {
            None
        };
        let from_image = if forward {
            Some(
                PolConverter::new(axes.stokes.as_vec(), chunk.pols.as_vec()).unwrap_or_else(|e| {
                    panic!("can't convert the image's polarisation frame back to this chunk's: {e}")
                }),
            )
        } else {
            None
        };
        let support = self.cf.support();
        let os = self.cf.oversample();
        let (nxp, nyp) = self.padded_shape;
        let (uv_cell_u, uv_cell_v) = self.uv_cell;

        if let Some(out) = degrid_out.as_ref() {
            assert_eq!(
                out.dim(),
                chunk.vis.dim(),
                "degrid output buffer shape != chunk visibility shape"
            );
        }

        // Scratch, reused across samples.
        let mut accessor_vis = vec![c64::default(); chunk.num_pols()];
        let mut image_vis = vec![c64::default(); num_image_pols];

        for row in 0..chunk.num_rows() {
            if let Some(limit) = self.max_pointing_separation {
                if chunk.pointings[row].separation(centre) > limit {
                    self.stats.rows_rejected += 1;
                    continue;
                }
            }
            let uvw = chunk.rotated_uvws[row];
            let delay = chunk.delays[row];

            for chan in 0..chunk.num_chans() {
                let freq = chunk.freqs[chan];
                if !self.freq_checked {
                    self.freq_checked = true;
                    if !(MIN_SANE_FREQ..MAX_SANE_FREQ).contains(&freq) {
                        warn!(
                            "Channel frequency {freq:e} Hz doesn't look like a radio observation; check the units of the input data"
                        );
                    }
                }

                let u_scaled = freq * uvw.u / (VEL_C * uv_cell_u);
                let (iu, fracu) = oversampled_offset(u_scaled, os);
                let v_scaled = freq * uvw.v / (VEL_C * uv_cell_v);
                let (iv, fracv) = oversampled_offset(v_scaled, os);
                let iu = iu + (nxp / 2) as i32;
                let iv = iv + (nyp / 2) as i32;
                let phasor = cexp(TAU * freq * delay / VEL_C);

                if chunk.flags.slice(s![row, chan, ..]).iter().any(|&f| f) {
                    if !forward {
                        self.stats.vectors_flagged += 1;
                    }
                    continue;
                }
                if !self.freq_mapper.is_mapped(chan) {
                    self.stats.channels_unmapped += 1;
                    continue;
                }
                let image_plane = self.freq_mapper.plane(chan);

                // The whole kernel footprint must fit on the grid; falling
                // off the edge is normal for long baselines and simply
                // skipped.
                let support_i = support as i32;
                if iu - support_i < 0
                    || iv - support_i < 0
                    || iu + support_i >= nxp as i32
                    || iv + support_i >= nyp as i32
                {
                    continue;
                }
                let (iu, iv) = (iu as usize, iv as usize);

                if !forward && self.do_psf && !self.all_data_psf {
                    match self.representative {
                        None => {
                            let feed = chunk.feeds[row];
                            let pointing = chunk.pointings[row];
                            self.representative = Some((feed, pointing));
                            info!(
                                "PSF will be calculated from feed {feed}, field at RA {:.4} deg, Dec {:.4} deg",
                                pointing.ra.to_degrees(),
                                pointing.dec.to_degrees()
                            );
                        }
                        Some((feed, pointing)) => {
                            if feed != chunk.feeds[row]
                                || pointing.separation(chunk.pointings[row]) > POINTING_TOLERANCE
                            {
                                continue;
                            }
                        }
                    }
                }

                let weight = self.vis_weights.weight(freq);

                if forward {
                    let out = degrid_out.as_mut().expect("forward implies a buffer");
                    for (image_pol, v) in image_vis.iter_mut().enumerate() {
                        let c_index = self.cf.c_index(row, image_pol, chan);
                        let kernel_index = fracu + os * (fracv + os * c_index);
                        let conv = self.cf.kernel(kernel_index);
                        *v = c64::default();
                        kernel::degrid(
                            v,
                            conv,
                            self.grid.slice(s![image_plane, image_pol, .., ..]),
                            iu,
                            iv,
                            support,
                        );
                        *v *= weight;
                        *v *= phasor;
                    }
                    from_image
                        .as_ref()
                        .expect("forward converter exists")
                        .convert(&image_vis, &mut accessor_vis);
                    for (pol, &v) in accessor_vis.iter().enumerate() {
                        out[[row, chan, pol]] += v;
                    }
                    self.stats.samples_degridded += 1;
                } else {
                    let conj_phasor = phasor.conj();
                    match &to_image {
                        // A PSF pass grids a unit sample in every image
                        // polarisation, not the data.
                        None => image_vis.iter_mut().for_each(|v| *v = c64::new(1.0, 0.0)),
                        Some(converter) => {
                            for (scratch, &v) in accessor_vis
                                .iter_mut()
                                .zip(chunk.vis.slice(s![row, chan, ..]).iter())
                            {
                                *scratch = v;
                            }
                            converter.convert(&accessor_vis, &mut image_vis);
                        }
                    }
                    for (image_pol, &v) in image_vis.iter().enumerate() {
                        let c_index = self.cf.c_index(row, image_pol, chan);
                        let kernel_index = fracu + os * (fracv + os * c_index);
                        let conv = self.cf.kernel(kernel_index);
                        kernel::grid(
                            self.grid.slice_mut(s![image_plane, image_pol, .., ..]),
                            conv,
                            v * conj_phasor * weight,
                            iu,
                            iv,
                            support,
                        );
                        let weight_row = if self.track_oversample_weights {
                            kernel_index
                        } else {
                            c_index
                        };
                        self.sum_of_weights[[weight_row, image_pol, image_plane]] += weight;
                        self.stats.points_stamped += ((2 * support + 1) * (2 * support + 1)) as u64;
                    }
                    self.stats.samples_gridded += 1;
                }
            }
        }

        if forward {
            self.stats.time_degridding += started.elapsed();
        } else {
            self.stats.time_gridding += started.elapsed();
        }
    }

    fn log_stats(&self) {
        let stats = &self.stats;
        if stats.samples_gridded > 0 || stats.time_gridding > Duration::ZERO {
            info!(
                "Gridded {} samples ({} kernel points) in {:.3} s",
                stats.samples_gridded,
                stats.points_stamped,
                stats.time_gridding.as_secs_f64()
            );
        }
        if stats.samples_degridded > 0 || stats.time_degridding > Duration::ZERO {
            info!(
                "Degridded {} samples in {:.3} s",
                stats.samples_degridded,
                stats.time_degridding.as_secs_f64()
            );
        }
        info!(
            "Skipped: {} flagged vectors, {} channels outside the image band, {} rows beyond the pointing limit",
            stats.vectors_flagged, stats.channels_unmapped, stats.rows_rejected
        );
    }
}

impl Gridder for VisGridder {
    fn initialise_grid(&mut self, axes: &ImageAxes, shape: (usize, usize), do_psf: bool) {
        self.set_image_geometry(axes, shape);
        let (nxp, nyp) = self.padded_shape;
        let num_planes = axes.num_image_planes();
        let num_pols = axes.num_pols();

        self.grid = Array4::zeros((num_planes, num_pols, nyp, nxp));
        let weight_rows = if self.track_oversample_weights {
            self.cf.table_len()
        } else {
            self.cf.num_shapes()
        };
        self.sum_of_weights = Array3::zeros((weight_rows, num_pols, num_planes));
        self.do_psf = do_psf;
        self.model_is_empty = false;
        self.init_representative_field_and_feed();
        self.mode = Mode::Gridding;

        debug!(
            "Initialised a {}x{} grid (padded to {}x{}) with {} planes and {} polarisations{}",
            shape.0,
            shape.1,
            nxp,
            nyp,
            num_planes,
            num_pols,
            if do_psf { " for a PSF" } else { "" }
        );
    }

    fn grid(&mut self, chunk: &VisChunk) {
        self.generic(chunk, None);
    }

    fn initialise_degrid(&mut self, axes: &ImageAxes, model: ArrayView4<f64>) {
        let (num_planes, num_pols, ny, nx) = model.dim();
        assert_eq!(
            num_planes,
            axes.num_image_planes(),
            "model planes != image spectral planes"
        );
        assert_eq!(num_pols, axes.num_pols(), "model pols != image pols");

        self.set_image_geometry(axes, (nx, ny));
        let (nxp, nyp) = self.padded_shape;
        self.do_psf = false;
        self.mode = Mode::Degridding;

        let peak = model.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if peak == 0.0 {
            self.model_is_empty = true;
            self.grid = Array4::zeros((0, 0, 0, 0));
            debug!("The model image is empty; nothing will be predicted");
            return;
        }
        self.model_is_empty = false;

        self.grid = Array4::zeros((num_planes, num_pols, nyp, nxp));
        let x0 = (nxp - nx) / 2;
        let y0 = (nyp - ny) / 2;
        for plane in 0..num_planes {
            for pol in 0..num_pols {
                // Pad, pre-correct for the kernel's footprint, and transform
                // to the uv domain.
                let mut padded = Array2::zeros((nyp, nxp));
                padded
                    .slice_mut(s![y0..y0 + ny, x0..x0 + nx])
                    .assign(&model.slice(s![plane, pol, .., ..]));
                self.cf.correct_image(padded.view_mut());
                let complex = padded.mapv(|v| c64::new(v, 0.0));
                self.grid
                    .slice_mut(s![plane, pol, .., ..])
                    .assign(&fft::image_to_uv(&complex));
            }
        }
    }

    fn degrid(&mut self, chunk: &VisChunk, vis: ArrayViewMut3<c64>) {
        self.generic(chunk, Some(vis));
    }

    fn finalise_grid(&mut self) -> Array4<f64> {
        assert_eq!(
            self.mode,
            Mode::Gridding,
            "finalise_grid() called outside a gridding session"
        );
        let (nx, ny) = self.shape;
        let (nxp, nyp) = self.padded_shape;
        let (num_planes, num_pols, _, _) = self.grid.dim();
        let x0 = (nxp - nx) / 2;
        let y0 = (nyp - ny) / 2;

        let mut out = Array4::zeros((num_planes, num_pols, ny, nx));
        for plane in 0..num_planes {
            for pol in 0..num_pols {
                let uv = self.grid.slice(s![plane, pol, .., ..]).to_owned();
                let image = fft::uv_to_image(&uv);
                let mut image = image.mapv(|v| v.re);
                self.cf.correct_image(image.view_mut());
                // The inverse FFT carried a 1/N; the image is defined
                // without it.
                image *= (nxp * nyp) as f64;
                out.slice_mut(s![plane, pol, .., ..])
                    .assign(&image.slice(s![y0..y0 + ny, x0..x0 + nx]));
            }
        }

        self.log_stats();
        self.mode = Mode::Finalised;
        out
    }

    fn finalise_weights(&mut self) -> Array4<f64> {
        assert!(
            matches!(self.mode, Mode::Gridding | Mode::Finalised),
            "finalise_weights() called outside a gridding session"
        );
        assert!(
            !self.sum_of_weights.is_empty(),
            "sum of weights is not initialised"
        );
        let (nx, ny) = self.shape;
        let (_, num_pols, num_planes) = self.sum_of_weights.dim();

        let mut out = Array4::zeros((num_planes, num_pols, ny, nx));
        for plane in 0..num_planes {
            for pol in 0..num_pols {
                let total: f64 = self.sum_of_weights.slice(s![.., pol, plane]).sum();
                out.slice_mut(s![plane, pol, .., ..]).fill(total);
            }
        }

        self.mode = Mode::Finalised;
        out
    }

    fn finalise_degrid(&mut self) {
        assert_eq!(
            self.mode,
            Mode::Degridding,
            "finalise_degrid() called outside a degridding session"
        );
        self.log_stats();
        self.mode = Mode::Finalised;
    }

    fn stats(&self) -> &GridderStats {
        &self.stats
    }
}
