// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests on gridding and degridding.

use approx::assert_abs_diff_eq;
use hifitime::Epoch;
use marlu::{RADec, UVW};
use ndarray::{s, Array3, Array4};
use vec1::{vec1, Vec1};

use super::snapshot::fit_w_plane;
use super::*;
use crate::axes::{DirectionAxis, SpectralAxis};
use crate::cf::{BoxFunction, SpheroidalFunction, WProjectionFunction};
use crate::pol::Polarisation;
use crate::pol::Polarisation::*;

/// 10 arcsec pixels.
const CELL: f64 = 10.0 * std::f64::consts::PI / 180.0 / 3600.0;
const FREQ: f64 = 1.4e9;

fn image_axes(stokes: Vec1<Polarisation>, spectral: Option<SpectralAxis>) -> ImageAxes {
    ImageAxes {
        direction: DirectionAxis {
            centre: RADec::from_degrees(0.0, -27.0),
            cell_l: CELL,
            cell_m: CELL,
        },
        spectral,
        stokes,
    }
}

fn box_gridder() -> VisGridder {
    VisGridder::new(
        Box::new(BoxFunction::new(1)),
        1.0,
        None,
        false,
        false,
        VisWeights::Natural,
    )
}

/// A chunk with the same visibility in every cell, pointed at the image
/// centre, feed 0, no delay.
fn uniform_chunk(
    uvws: Vec<UVW>,
    freqs: Vec1<f64>,
    pols: Vec1<Polarisation>,
    vis: c64,
) -> VisChunk {
    let num_rows = uvws.len();
    let num_chans = freqs.len();
    let num_pols = pols.len();
    VisChunk::new(
        Epoch::from_gpst_seconds(1090008640.0),
        uvws,
        vec![0.0; num_rows],
        freqs,
        Array3::from_elem((num_rows, num_chans, num_pols), vis),
        Array3::from_elem((num_rows, num_chans, num_pols), false),
        vec![0; num_rows],
        vec![RADec::from_degrees(0.0, -27.0); num_rows],
        pols,
    )
}

fn centre_chunk(pols: Vec1<Polarisation>, vis: c64) -> VisChunk {
    uniform_chunk(vec![UVW::default()], vec1![FREQ], pols, vis)
}

// The 1-row/1-channel/1.4 GHz scenario: a unit visibility at the exact
// centre pixel through a support-0 box kernel lands exactly on the centre
// cell of the grid with a weight of 1.
#[test]
fn test_end_to_end_unit_sample_on_the_centre_pixel() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX, YY], None);
    gridder.initialise_grid(&axes, (8, 8), false);
    gridder.grid(&centre_chunk(vec1![XX, YY], c64::new(1.0, 0.0)));

    for pol in 0..2 {
        assert_abs_diff_eq!(gridder.grid[[0, pol, 4, 4]], c64::new(1.0, 0.0));
        assert_abs_diff_eq!(gridder.sum_of_weights[[0, pol, 0]], 1.0);
    }
    // Nothing anywhere else.
    assert_abs_diff_eq!(gridder.grid.iter().map(|v| v.norm()).sum::<f64>(), 2.0);
    assert_eq!(gridder.stats.samples_gridded, 1);

    // A single uv sample at the origin transforms to a flat image of ones.
    let image = gridder.finalise_grid();
    assert_abs_diff_eq!(image[[0, 0, 4, 4]], 1.0, epsilon = 1e-12);
    for v in image.iter() {
        assert_abs_diff_eq!(*v, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_finalise_weights_broadcasts_plane_constants() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![I], None);
    gridder.initialise_grid(&axes, (8, 8), false);
    let chunk = uniform_chunk(
        vec![UVW::default(), UVW::default(), UVW::default()],
        vec1![FREQ],
        vec1![XX, YY],
        c64::new(1.0, 0.0),
    );
    gridder.grid(&chunk);

    let weights = gridder.finalise_weights();
    assert_eq!(weights.dim(), (1, 1, 8, 8));
    for v in weights.iter() {
        assert_abs_diff_eq!(*v, 3.0);
    }
}

#[test]
fn test_bounds_rejection_off_the_grid_edge() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), false);
    // ~9 pixels from the centre of an 8-pixel grid.
    let uv_cell = 1.0 / (CELL * 8.0);
    let u = 9.0 * uv_cell * VEL_C / FREQ;
    gridder.grid(&uniform_chunk(
        vec![UVW { u, v: 0.0, w: 0.0 }],
        vec1![FREQ],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    assert_eq!(gridder.stats.samples_gridded, 0);
    assert_abs_diff_eq!(gridder.grid.iter().map(|v| v.norm()).sum::<f64>(), 0.0);
    assert_abs_diff_eq!(gridder.sum_of_weights.sum(), 0.0);
}

#[test]
fn test_bounds_rejection_support_wider_than_the_grid() {
    // A support-3 kernel can never fit on a 4-pixel grid; every sample must
    // be skipped, whatever its uv coordinate.
    let mut gridder = VisGridder::new(
        Box::new(SpheroidalFunction::new(3, 8)),
        1.0,
        None,
        false,
        false,
        VisWeights::Natural,
    );
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (4, 4), false);
    gridder.grid(&centre_chunk(vec1![XX], c64::new(1.0, 0.0)));

    assert_eq!(gridder.stats.samples_gridded, 0);
    assert_abs_diff_eq!(gridder.sum_of_weights.sum(), 0.0);
}

#[test]
fn test_one_flagged_polarisation_excludes_the_whole_vector() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![I], None);
    gridder.initialise_grid(&axes, (8, 8), false);

    let mut chunk = uniform_chunk(
        vec![UVW::default(), UVW::default()],
        vec1![FREQ],
        vec1![XX, YY],
        c64::new(1.0, 0.0),
    );
    // Flag YY of row 0 only; XX of row 0 must be excluded with it.
    chunk.flags[[0, 0, 1]] = true;
    gridder.grid(&chunk);

    assert_eq!(gridder.stats.vectors_flagged, 1);
    assert_eq!(gridder.stats.samples_gridded, 1);
    // Row 1 contributed I = (XX + YY)/2 = 1.
    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]], c64::new(1.0, 0.0));
    assert_abs_diff_eq!(gridder.sum_of_weights[[0, 0, 0]], 1.0);
}

#[test]
fn test_sum_of_weights_matches_gridded_sample_count() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![I], None);
    gridder.initialise_grid(&axes, (8, 8), false);

    let mut chunk = uniform_chunk(
        vec![UVW::default(), UVW::default(), UVW::default()],
        vec1![FREQ, FREQ + 1e6],
        vec1![XX, YY],
        c64::new(1.0, 0.0),
    );
    chunk.flags[[1, 0, 0]] = true;
    gridder.grid(&chunk);

    assert_eq!(gridder.stats.samples_gridded, 5);
    assert_abs_diff_eq!(gridder.sum_of_weights.slice(s![.., 0, 0]).sum(), 5.0);
}

#[test]
fn test_fractional_offset_gridding_spreads_a_normalised_kernel() {
    let mut gridder = VisGridder::new(
        Box::new(SpheroidalFunction::new(3, 8)),
        1.0,
        None,
        false,
        false,
        VisWeights::Natural,
    );
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (16, 16), false);

    // A quarter of a pixel off centre: sub-cell 2 of 8.
    let uv_cell = 1.0 / (CELL * 16.0);
    let u = 0.25 * uv_cell * VEL_C / FREQ;
    gridder.grid(&uniform_chunk(
        vec![UVW { u, v: 0.0, w: 0.0 }],
        vec1![FREQ],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    assert_eq!(gridder.stats.samples_gridded, 1);
    // The kernel is normalised to unit sum, so the grid total is the
    // visibility.
    let total: c64 = gridder.grid.iter().sum();
    assert_abs_diff_eq!(total.re, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(total.im, 0.0, epsilon = 1e-12);
    // And it is spread around the centre, not on a single pixel.
    assert!(gridder.grid[[0, 0, 8, 8]].re < 1.0);
    assert!(gridder.grid[[0, 0, 8, 9]].re > 0.0);
}

#[test]
fn test_grid_then_degrid_recovers_the_kernel_self_convolution_peak() {
    let reference = SpheroidalFunction::new(3, 8);
    let mut gridder = VisGridder::new(
        Box::new(SpheroidalFunction::new(3, 8)),
        1.0,
        None,
        false,
        false,
        VisWeights::Natural,
    );
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (16, 16), false);
    gridder.grid(&centre_chunk(vec1![XX], c64::new(1.0, 0.0)));

    use crate::cf::ConvolutionFunction;
    let kernel = reference.kernel(0);
    let mut sample = c64::default();
    crate::kernel::degrid(
        &mut sample,
        kernel,
        gridder.grid.slice(s![0, 0, .., ..]),
        8,
        8,
        3,
    );
    let self_convolution_peak: f64 = kernel.iter().map(|v| v.re * v.re).sum();
    assert_abs_diff_eq!(sample.re, self_convolution_peak, epsilon = 1e-14);
}

#[test]
fn test_phase_delay_rotates_the_gridded_visibility() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), false);

    let mut chunk = centre_chunk(vec1![XX], c64::new(1.0, 0.0));
    // A half-wavelength path delay: the conjugate phasor flips the sign.
    chunk.delays[0] = VEL_C / (2.0 * FREQ);
    gridder.grid(&chunk);

    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]].re, -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]].im, 0.0, epsilon = 1e-12);
}

#[test]
fn test_psf_representative_latches_on_the_first_accepted_sample() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![I], None);
    gridder.initialise_grid(&axes, (8, 8), true);

    let mut chunk = uniform_chunk(
        vec![UVW::default(), UVW::default()],
        vec1![FREQ],
        vec1![XX, YY],
        // The PSF grids unit samples, not this value.
        c64::new(5.0, 3.0),
    );
    chunk.feeds = vec![7, 3];
    gridder.grid(&chunk);

    let (feed, _) = gridder.representative().expect("latched");
    assert_eq!(feed, 7);
    // Only the representative feed contributed, with unit amplitude.
    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]], c64::new(1.0, 0.0));
    assert_abs_diff_eq!(gridder.sum_of_weights.sum(), 1.0);

    // A later chunk leading with the other feed doesn't re-latch.
    let mut chunk2 = uniform_chunk(
        vec![UVW::default(), UVW::default()],
        vec1![FREQ],
        vec1![XX, YY],
        c64::new(5.0, 3.0),
    );
    chunk2.feeds = vec![3, 7];
    gridder.grid(&chunk2);

    let (feed, _) = gridder.representative().expect("still latched");
    assert_eq!(feed, 7);
    assert_abs_diff_eq!(gridder.sum_of_weights.sum(), 2.0);
    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]], c64::new(2.0, 0.0));
}

#[test]
fn test_psf_with_all_data_uses_every_feed() {
    let mut gridder = VisGridder::new(
        Box::new(BoxFunction::new(1)),
        1.0,
        None,
        true,
        false,
        VisWeights::Natural,
    );
    let axes = image_axes(vec1![I], None);
    gridder.initialise_grid(&axes, (8, 8), true);

    let mut chunk = uniform_chunk(
        vec![UVW::default(), UVW::default()],
        vec1![FREQ],
        vec1![XX, YY],
        c64::new(1.0, 0.0),
    );
    chunk.feeds = vec![7, 3];
    gridder.grid(&chunk);

    assert!(gridder.representative().is_none());
    assert_abs_diff_eq!(gridder.sum_of_weights.sum(), 2.0);
}

#[test]
fn test_max_pointing_separation_rejects_offset_rows() {
    let mut gridder = VisGridder::new(
        Box::new(BoxFunction::new(1)),
        1.0,
        // 1 degree.
        Some(std::f64::consts::PI / 180.0),
        false,
        false,
        VisWeights::Natural,
    );
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), false);

    let mut chunk = uniform_chunk(
        vec![UVW::default(), UVW::default()],
        vec1![FREQ],
        vec1![XX],
        c64::new(1.0, 0.0),
    );
    chunk.pointings[1] = RADec::from_degrees(5.0, -27.0);
    gridder.grid(&chunk);

    assert_eq!(gridder.stats.rows_rejected, 1);
    assert_eq!(gridder.stats.samples_gridded, 1);
    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]], c64::new(1.0, 0.0));
}

#[test]
fn test_unmapped_channels_are_counted_and_skipped() {
    let mut gridder = box_gridder();
    let axes = image_axes(
        vec1![XX],
        Some(SpectralAxis {
            start: FREQ,
            step: 1e6,
            num_planes: 1,
        }),
    );
    gridder.initialise_grid(&axes, (8, 8), false);
    gridder.grid(&uniform_chunk(
        vec![UVW::default()],
        vec1![FREQ, 2.0e9],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    assert_eq!(gridder.stats.channels_unmapped, 1);
    assert_eq!(gridder.stats.samples_gridded, 1);
}

#[test]
fn test_channels_land_on_their_spectral_planes() {
    let mut gridder = box_gridder();
    let axes = image_axes(
        vec1![XX],
        Some(SpectralAxis {
            start: FREQ,
            step: 1e6,
            num_planes: 2,
        }),
    );
    gridder.initialise_grid(&axes, (8, 8), false);
    gridder.grid(&uniform_chunk(
        vec![UVW::default()],
        vec1![FREQ, FREQ + 1e6],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]], c64::new(1.0, 0.0));
    assert_abs_diff_eq!(gridder.grid[[1, 0, 4, 4]], c64::new(1.0, 0.0));
    assert_abs_diff_eq!(gridder.sum_of_weights[[0, 0, 0]], 1.0);
    assert_abs_diff_eq!(gridder.sum_of_weights[[0, 0, 1]], 1.0);
}

#[test]
fn test_mfs_weights_flow_into_the_grid_and_weights() {
    let mut gridder = VisGridder::new(
        Box::new(BoxFunction::new(1)),
        1.0,
        None,
        false,
        false,
        VisWeights::Mfs {
            reffreq: 1.4e9,
            order: 1,
        },
    );
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), false);
    gridder.grid(&uniform_chunk(
        vec![UVW::default()],
        vec1![1.54e9],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    assert_abs_diff_eq!(gridder.sum_of_weights[[0, 0, 0]], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(gridder.grid[[0, 0, 4, 4]].re, 0.1, epsilon = 1e-12);
}

#[test]
fn test_oversample_weight_tracking_uses_the_sub_cell_row() {
    let mut gridder = VisGridder::new(
        Box::new(SpheroidalFunction::new(3, 8)),
        1.0,
        None,
        false,
        true,
        VisWeights::Natural,
    );
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (16, 16), false);
    assert_eq!(gridder.sum_of_weights.dim(), (64, 1, 1));

    let uv_cell = 1.0 / (CELL * 16.0);
    let u = 0.25 * uv_cell * VEL_C / FREQ;
    gridder.grid(&uniform_chunk(
        vec![UVW { u, v: 0.0, w: 0.0 }],
        vec1![FREQ],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    // fracu = 2, fracv = 0: the weight lands in row 2, not row 0.
    assert_abs_diff_eq!(gridder.sum_of_weights[[2, 0, 0]], 1.0);
    assert_abs_diff_eq!(gridder.sum_of_weights[[0, 0, 0]], 0.0);
}

#[test]
fn test_degrid_predicts_a_point_source_model() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX, YY], None);
    let mut model = Array4::zeros((1, 2, 8, 8));
    model[[0, 0, 4, 4]] = 1.0;
    model[[0, 1, 4, 4]] = 1.0;
    gridder.initialise_degrid(&axes, model.view());

    let chunk = centre_chunk(vec1![XX, YY], c64::default());
    let mut predicted = Array3::from_elem((1, 1, 2), c64::default());
    gridder.degrid(&chunk, predicted.view_mut());
    gridder.finalise_degrid();

    assert_eq!(gridder.stats.samples_degridded, 1);
    for pol in 0..2 {
        assert_abs_diff_eq!(predicted[[0, 0, pol]].re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(predicted[[0, 0, pol]].im, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_degrid_accumulates_into_the_buffer() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX], None);
    let mut model = Array4::zeros((1, 1, 8, 8));
    model[[0, 0, 4, 4]] = 1.0;
    gridder.initialise_degrid(&axes, model.view());

    let chunk = centre_chunk(vec1![XX], c64::default());
    let mut predicted = Array3::from_elem((1, 1, 1), c64::new(0.5, 0.0));
    gridder.degrid(&chunk, predicted.view_mut());

    assert_abs_diff_eq!(predicted[[0, 0, 0]].re, 1.5, epsilon = 1e-12);
}

#[test]
fn test_degrid_of_an_empty_model_is_a_no_op() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX], None);
    let model = Array4::zeros((1, 1, 8, 8));
    gridder.initialise_degrid(&axes, model.view());

    let chunk = centre_chunk(vec1![XX], c64::default());
    let sentinel = c64::new(7.0, -7.0);
    let mut predicted = Array3::from_elem((1, 1, 1), sentinel);
    gridder.degrid(&chunk, predicted.view_mut());

    assert_abs_diff_eq!(predicted[[0, 0, 0]], sentinel);
    assert_eq!(gridder.stats.samples_degridded, 0);
    assert_eq!(gridder.stats.time_degridding, std::time::Duration::ZERO);
}

#[test]
#[should_panic(expected = "PSF gridder")]
fn test_degridding_with_a_psf_gridder_is_fatal() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), true);

    let chunk = centre_chunk(vec1![XX], c64::default());
    let mut predicted = Array3::from_elem((1, 1, 1), c64::default());
    gridder.degrid(&chunk, predicted.view_mut());
}

#[test]
#[should_panic(expected = "outside a gridding session")]
fn test_gridding_before_initialisation_is_fatal() {
    let mut gridder = box_gridder();
    gridder.grid(&centre_chunk(vec1![XX], c64::default()));
}

#[test]
#[should_panic(expected = "outside a gridding session")]
fn test_gridding_after_finalisation_is_fatal() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), false);
    gridder.finalise_grid();
    gridder.grid(&centre_chunk(vec1![XX], c64::default()));
}

#[test]
fn test_reinitialising_after_finalisation_starts_a_fresh_session() {
    let mut gridder = box_gridder();
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), false);
    gridder.grid(&centre_chunk(vec1![XX], c64::new(1.0, 0.0)));
    gridder.finalise_grid();

    gridder.initialise_grid(&axes, (8, 8), false);
    assert_eq!(gridder.stats.samples_gridded, 0);
    assert_abs_diff_eq!(gridder.sum_of_weights.sum(), 0.0);
    gridder.grid(&centre_chunk(vec1![XX], c64::new(1.0, 0.0)));
    assert_abs_diff_eq!(gridder.sum_of_weights.sum(), 1.0);
}

#[test]
fn test_padding_scales_the_grid_and_uv_cells() {
    let mut gridder = VisGridder::new(
        Box::new(BoxFunction::new(1)),
        1.5,
        None,
        false,
        false,
        VisWeights::Natural,
    );
    let axes = image_axes(vec1![XX], None);
    gridder.initialise_grid(&axes, (8, 8), false);

    assert_eq!(gridder.grid.dim(), (1, 1, 12, 12));
    assert_abs_diff_eq!(gridder.uv_cell.0, 1.0 / (CELL * 12.0), epsilon = 1e-6);

    gridder.grid(&centre_chunk(vec1![XX], c64::new(1.0, 0.0)));
    assert_abs_diff_eq!(gridder.grid[[0, 0, 6, 6]], c64::new(1.0, 0.0));

    // The finalised image is back at the unpadded shape.
    let image = gridder.finalise_grid();
    assert_eq!(image.dim(), (1, 1, 8, 8));
}

#[test]
fn test_fit_w_plane_recovers_exact_plane_coefficients() {
    let uvws: Vec<UVW> = [(100.0, 0.0), (0.0, 100.0), (50.0, 50.0), (-30.0, 20.0)]
        .iter()
        .map(|&(u, v)| UVW {
            u,
            v,
            w: 2.0 * u + 3.0 * v,
        })
        .collect();
    let (a, b) = fit_w_plane(&uvws);
    assert_abs_diff_eq!(a, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(b, 3.0, epsilon = 1e-12);
}

#[test]
fn test_fit_w_plane_degenerate_baselines_fall_back_flat() {
    let uvws = vec![UVW {
        u: 100.0,
        v: 0.0,
        w: 50.0,
    }];
    assert_eq!(fit_w_plane(&uvws), (0.0, 0.0));
}

fn snapshot_adapter(clipping: f64) -> SnapshotGridderAdapter {
    let inner = VisGridder::new(
        Box::new(WProjectionFunction::new(1, 2, 100.0, 3)),
        1.0,
        None,
        false,
        false,
        VisWeights::Natural,
    );
    SnapshotGridderAdapter::new(inner, 10.0, clipping)
}

#[test]
fn test_snapshot_adapter_flattens_a_planar_w_term() {
    let mut adapter = snapshot_adapter(0.0);
    let axes = image_axes(vec1![XX], None);
    adapter.initialise_grid(&axes, (16, 16), false);

    // w here is hundreds of wavelengths, far beyond the inner gridder's
    // wmax; only the plane subtraction makes it griddable.
    let uvws: Vec<UVW> = [(100.0, 0.0), (0.0, 100.0), (50.0, 50.0)]
        .iter()
        .map(|&(u, v)| UVW {
            u,
            v,
            w: 2.0 * u + 3.0 * v,
        })
        .collect();
    adapter.grid(&uniform_chunk(
        uvws,
        vec1![FREQ],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    assert_eq!(adapter.stats().samples_gridded, 3);
}

#[test]
#[should_panic(expected = "snapshot w tolerance exceeded")]
fn test_snapshot_adapter_rejects_non_coplanar_data() {
    let mut adapter = snapshot_adapter(0.0);
    let axes = image_axes(vec1![XX], None);
    adapter.initialise_grid(&axes, (16, 16), false);

    // A single baseline can't constrain the fit, so the whole w survives as
    // residual: ~470 wavelengths against a tolerance of 10.
    adapter.grid(&uniform_chunk(
        vec![UVW {
            u: 100.0,
            v: 0.0,
            w: 100.0,
        }],
        vec1![FREQ],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));
}

#[test]
fn test_snapshot_clipping_zeroes_the_image_border() {
    let mut adapter = snapshot_adapter(0.5);
    let axes = image_axes(vec1![XX], None);
    adapter.initialise_grid(&axes, (16, 16), false);
    adapter.grid(&uniform_chunk(
        vec![UVW::default(), UVW::default()],
        vec1![FREQ],
        vec1![XX],
        c64::new(1.0, 0.0),
    ));

    let image = adapter.finalise_grid();
    assert_abs_diff_eq!(image[[0, 0, 0, 0]], 0.0);
    assert_abs_diff_eq!(image[[0, 0, 3, 8]], 0.0);
    assert_abs_diff_eq!(image[[0, 0, 8, 15]], 0.0);
    assert!(image[[0, 0, 8, 8]].abs() > 0.0);
}
