//! Cross-module properties of the partition/stitch round trip.

use ndarray::{s, Array2, Array3, Axis};

use crate::{
    binarize, GridPosition, GridShape, MaskStitcher, TileBounds, TilePartitioner,
    DEFAULT_TILE_SIZE,
};

/// Deterministic sparse test raster: roughly a third of the pixels are zero.
fn speckle(height: usize, width: usize, seed: u32) -> Array2<u16> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    Array2::from_shape_fn((height, width), |_| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        if state % 3 == 0 {
            0
        } else {
            (state % 4096) as u16
        }
    })
}

fn round_trip(raster: &Array2<u16>, tile_size: usize) -> (GridShape, Array2<u8>) {
    let partition = TilePartitioner::new(tile_size)
        .unwrap()
        .partition(raster.view())
        .unwrap();
    let shape = partition.shape();

    let mut masks = Array3::<u8>::zeros((shape.len(), tile_size, tile_size));
    for tile in partition {
        masks
            .index_axis_mut(Axis(0), tile.fov)
            .assign(&tile.data.mapv(binarize));
    }

    let stitched = MaskStitcher::new(shape, tile_size)
        .unwrap()
        .stitch(masks.view())
        .unwrap();
    (shape, stitched.pixels().to_owned())
}

#[test]
fn test_reference_mosaic_grid() {
    // Decoded shape (1, 7290, 4131): 7290 along axis 0, 4131 along axis 1
    let raster = Array2::<u16>::ones((7290, 4131));
    let partitioner = TilePartitioner::new(DEFAULT_TILE_SIZE).unwrap();
    let partition = partitioner.partition(raster.view()).unwrap();

    assert_eq!(partition.shape(), GridShape::new(4, 3));
    assert_eq!(partition.len(), 12);

    let tiles: Vec<_> = partition.collect();
    let last = &tiles[11];
    assert_eq!(last.fov, 11);
    assert_eq!(last.position, GridPosition::new(3, 2));
    assert_eq!(
        last.bounds,
        TileBounds {
            row_start: 6144,
            row_end: 7290,
            col_start: 4096,
            col_end: 4131,
        }
    );
    assert_eq!(last.bounds.to_string(), "6144,7290,4096,4131");

    // covered region is source data, the rest is zero fill
    assert!(last.data.slice(s![..1146, ..35]).iter().all(|&v| v == 1));
    assert!(last.data.slice(s![1146.., ..]).iter().all(|&v| v == 0));
    assert!(last.data.slice(s![.., 35..]).iter().all(|&v| v == 0));

    for tile in &tiles {
        assert_eq!(tile.data.dim(), (DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE));
    }
}

#[test]
fn test_every_tile_has_full_shape() {
    for (height, width) in [(1, 1), (7, 3), (8, 8), (9, 17), (16, 15)] {
        let raster = speckle(height, width, 7);
        for tile in TilePartitioner::new(8)
            .unwrap()
            .partition(raster.view())
            .unwrap()
        {
            assert_eq!(tile.data.dim(), (8, 8), "{}x{}", height, width);
        }
    }
}

#[test]
fn test_tiles_match_source_windows() {
    let raster = speckle(21, 13, 3);
    for tile in TilePartitioner::new(5)
        .unwrap()
        .partition(raster.view())
        .unwrap()
    {
        let b = tile.bounds;
        let window = raster.slice(s![b.row_start..b.row_end, b.col_start..b.col_end]);
        assert_eq!(tile.data.slice(s![..b.height(), ..b.width()]), window);
        assert!(tile.data.slice(s![b.height().., ..]).iter().all(|&v| v == 0));
        assert!(tile.data.slice(s![.., b.width()..]).iter().all(|&v| v == 0));
    }
}

#[test]
fn test_fov_is_bijection_onto_grid() {
    let raster = speckle(30, 50, 11);
    let partition = TilePartitioner::new(8)
        .unwrap()
        .partition(raster.view())
        .unwrap();
    let shape = partition.shape();
    let indexer = shape.indexer();

    let mut seen = vec![false; shape.len()];
    for tile in partition {
        assert_eq!(tile.fov, tile.position.row * shape.cols() + tile.position.col);
        assert_eq!(indexer.position(tile.fov), tile.position);
        assert!(!seen[tile.fov], "fov {} emitted twice", tile.fov);
        seen[tile.fov] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn test_round_trip_reproduces_binarized_raster() {
    for (i, (height, width, tile)) in [(7, 5, 4), (16, 16, 4), (33, 10, 8), (3, 40, 16)]
        .into_iter()
        .enumerate()
    {
        let raster = speckle(height, width, i as u32 + 1);
        let (shape, stitched) = round_trip(&raster, tile);

        assert_eq!(stitched.dim(), (shape.rows() * tile, shape.cols() * tile));
        assert_eq!(
            stitched.slice(s![..height, ..width]),
            raster.mapv(binarize),
            "{}x{} tile {}",
            height,
            width,
            tile
        );
        assert!(stitched.slice(s![height.., ..]).iter().all(|&v| v == 0));
        assert!(stitched.slice(s![.., width..]).iter().all(|&v| v == 0));
    }
}

#[test]
fn test_stitch_rejects_incomplete_mask_array() {
    let raster = speckle(9, 9, 5);
    let partition = TilePartitioner::new(4)
        .unwrap()
        .partition(raster.view())
        .unwrap();
    let shape = partition.shape();

    // one tile short
    let values = vec![1u8; (shape.len() - 1) * 16];
    assert!(MaskStitcher::new(shape, 4)
        .unwrap()
        .stitch_flat(&values)
        .is_err());
}
