//! Stitching mask arrays back into overlay images.

mod common;

use common::{alpha_mask, fixtures, read_rgba_png, TestWorkspace};
use mosaic_grid::GridShape;
use mosaic_tiler::error::TilerError;
use mosaic_tiler::models::{GridMetadata, RasterExtent};
use mosaic_tiler::services::GridMetadataStore;
use ndarray::array;
use pretty_assertions::assert_eq;

fn record(ws: &TestWorkspace, source_id: &str, shape: GridShape, tile_size: usize) {
    let extent = RasterExtent {
        height: shape.rows() * tile_size - 1,
        width: shape.cols() * tile_size - 1,
    };
    GridMetadataStore::new(ws.metadata_dir())
        .put(
            source_id,
            &GridMetadata::new(shape, source_id, tile_size, Some(extent)),
        )
        .unwrap();
}

#[test]
fn test_row_major_reassembly() {
    let ws = TestWorkspace::new();
    record(&ws, "slide", GridShape::new(2, 2), 2);

    // each tile marks one distinct corner
    let mask = ws.input("whole_cell-slide.npy");
    fixtures::write_u8_masks(
        &mask,
        &[4, 2, 2],
        &[
            1, 0, 0, 0, // fov0: top-left
            0, 1, 0, 0, // fov1: top-right
            0, 0, 1, 0, // fov2: bottom-left
            0, 0, 0, 1, // fov3: bottom-right
        ],
    );

    let (_, stitched) = ws.stitcher().stitch(&mask).unwrap();
    assert_eq!(
        stitched.pixels(),
        array![
            [1u8, 0, 0, 1],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [1, 0, 0, 1],
        ]
    );
}

#[test]
fn test_label_masks_are_binarized() {
    let ws = TestWorkspace::new();
    record(&ws, "labels", GridShape::new(1, 1), 2);

    let mask = ws.input("seg-labels.npy");
    fixtures::write_i32_masks(&mask, &[1, 2, 2], &[0, 17, -3, 40000]);

    let (_, stitched) = ws.stitcher().stitch(&mask).unwrap();
    assert_eq!(stitched.pixels(), array![[0u8, 1], [0, 1]]);
}

#[test]
fn test_png_alpha_matches_mask() {
    let ws = TestWorkspace::new();
    record(&ws, "slide", GridShape::new(1, 2), 2);

    let mask = ws.input("out-slide.npy");
    fixtures::write_u8_masks(&mask, &[8], &[1, 0, 0, 1, 0, 0, 1, 1]);
    let output = ws.root().join("slide.png");

    let report = ws.stitcher().stitch_to_png(&mask, &output).unwrap();
    assert_eq!((report.height, report.width), (2, 4));

    let (width, height, rgba) = read_rgba_png(&output);
    assert_eq!((width, height), (4, 2));
    assert_eq!(alpha_mask(width, height, &rgba), array![[1u8, 0, 0, 0], [0, 1, 1, 1]]);
    // foreground opaque white, background transparent black
    assert_eq!(&rgba[..4], &[255, 255, 255, 255]);
    assert_eq!(&rgba[4..8], &[0, 0, 0, 0]);
}

#[test]
fn test_crop_removes_padding() {
    let ws = TestWorkspace::new();
    record(&ws, "slide", GridShape::new(2, 3), 4);

    let mask = ws.input("seg-slide.npy");
    fixtures::write_u8_masks(&mask, &[6, 4, 4], &[1; 96]);

    let (_, stitched) = ws.stitcher().crop(true).stitch(&mask).unwrap();
    assert_eq!((stitched.height(), stitched.width()), (7, 11));
    assert_eq!(stitched.foreground_count(), 77);
}

#[test]
fn test_missing_metadata_names_expected_path() {
    let ws = TestWorkspace::new();
    let mask = ws.input("seg-never_tiled.npy");
    fixtures::write_u8_masks(&mask, &[1], &[1]);

    let err = ws.stitcher().stitch(&mask).unwrap_err();
    assert!(matches!(err, TilerError::MetadataNotFound { .. }));
    assert!(err.to_string().contains(".never_tiled_metadata.json"));
}

#[test]
fn test_mask_count_mismatch_is_fatal() {
    let ws = TestWorkspace::new();
    record(&ws, "slide", GridShape::new(2, 2), 2);

    let mask = ws.input("seg-slide.npy");
    fixtures::write_u8_masks(&mask, &[3, 2, 2], &[1; 12]);

    let err = ws.stitcher().stitch(&mask).unwrap_err();
    assert!(matches!(err, TilerError::Grid(_)));
    assert!(!err.is_precondition());
}

#[test]
fn test_wrong_length_mask_writes_no_png() {
    let ws = TestWorkspace::new();
    record(&ws, "slide", GridShape::new(2, 2), 2);

    let mask = ws.input("seg-slide.npy");
    fixtures::write_u8_masks(&mask, &[15], &[1; 15]);

    let output = ws.root().join("overlay/slide.png");
    let err = ws.stitcher().stitch_to_png(&mask, &output).unwrap_err();
    assert!(matches!(err, TilerError::Grid(_)));
    assert!(!output.exists());
    assert!(!ws.root().join("overlay").exists());
}
