use std::path::{Path, PathBuf};

use mosaic_grid::{into_plane, GridShape, MosaicSource, TilePartitioner};

use crate::error::TilerError;
use crate::models::{source_id_for_image, GridMetadata, RasterExtent};
use crate::services::metadata_store::{GridMetadataStore, PutOutcome};
use crate::services::tiff_mosaic::TiffMosaic;
use crate::services::tile_store::TileStore;

/// Summary of one tiled source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileReport {
    pub source_id: String,
    pub source_dir: PathBuf,
    pub shape: GridShape,
    pub extent: RasterExtent,
    pub channels: usize,
    pub tiles_written: usize,
    pub metadata: PutOutcome,
}

/// Cuts every channel of a mosaic into tiles and records the grid.
pub struct Tiler {
    partitioner: TilePartitioner,
    output_dir: PathBuf,
    channels: Vec<String>,
}

impl Tiler {
    pub fn new(
        tile_size: usize,
        output_dir: impl Into<PathBuf>,
        channels: Vec<String>,
    ) -> Result<Self, TilerError> {
        Ok(Self {
            partitioner: TilePartitioner::new(tile_size)?,
            output_dir: output_dir.into(),
            channels,
        })
    }

    pub fn tile_size(&self) -> usize {
        self.partitioner.tile_size()
    }

    /// Tile a multi-page TIFF mosaic; the source id is the file stem.
    pub fn tile_file(
        &self,
        path: &Path,
        metadata: &mut GridMetadataStore,
    ) -> Result<TileReport, TilerError> {
        let source_id = source_id_for_image(path)?;
        let mut mosaic = TiffMosaic::open(path)?;
        self.tile_source(&source_id, &mut mosaic, metadata)
    }

    /// Tile any decoded mosaic.
    ///
    /// Nothing is written unless the channel count matches the configured
    /// channel names, every channel has the same extent and any previous
    /// output for the source has the same grid. The grid record is stored
    /// once the first channel is tiled.
    pub fn tile_source<S>(
        &self,
        source_id: &str,
        source: &mut S,
        metadata: &mut GridMetadataStore,
    ) -> Result<TileReport, TilerError>
    where
        S: MosaicSource,
        TilerError: From<S::Error>,
    {
        let count = source.channel_count()?;
        if count != self.channels.len() {
            return Err(TilerError::ChannelCountMismatch {
                source_id: source_id.to_string(),
                expected: self.channels.len(),
                actual: count,
            });
        }
        self.check_extents(source_id, source)?;

        let store = TileStore::new(&self.output_dir, source_id);
        let tile_size = self.tile_size();
        let mut grid: Option<(GridShape, RasterExtent, PutOutcome)> = None;
        let mut tiles_written = 0;

        for (index, channel) in self.channels.iter().enumerate() {
            tracing::info!(source_id, channel = %channel, index, "Reading channel");
            let raster = into_plane(source.read_channel(index)?)?;
            let (height, width) = raster.dim();
            let extent = RasterExtent { height, width };

            let partition = self.partitioner.partition(raster.view())?;
            let shape = partition.shape();
            let record = GridMetadata::new(shape, source_id, tile_size, Some(extent));

            let mut bounds = match &grid {
                None => {
                    metadata.check(source_id, &record)?;
                    store.ensure_compatible(shape, tile_size)?;
                    store.prepare()?;
                    Some(store.bounds_writer()?)
                }
                Some((_, first, _)) if *first != extent => {
                    return Err(TilerError::ChannelShapeMismatch {
                        source_id: source_id.to_string(),
                        channel: channel.clone(),
                        expected: (first.height, first.width),
                        actual: (height, width),
                    });
                }
                Some(_) => None,
            };

            for tile in partition {
                tracing::debug!(
                    fov = tile.fov,
                    row = tile.position.row,
                    col = tile.position.col,
                    bounds = %tile.bounds,
                    "Writing tile"
                );
                store.write_tile(tile.fov, channel, &tile.data)?;
                if let Some(writer) = bounds.as_mut() {
                    writer.record(tile.fov, &tile.bounds)?;
                }
                tiles_written += 1;
            }

            if let Some(writer) = bounds {
                writer.finish()?;
                let outcome = metadata.put(source_id, &record)?;
                grid = Some((shape, extent, outcome));
            }
        }

        let (shape, extent, outcome) = grid.ok_or_else(|| {
            TilerError::InvalidConfig(format!("no channels configured for {source_id}"))
        })?;

        tracing::info!(
            source_id,
            dir = %store.source_dir().display(),
            grid = %shape,
            tiles = tiles_written,
            "Created tiles"
        );

        Ok(TileReport {
            source_id: source_id.to_string(),
            source_dir: store.source_dir().to_path_buf(),
            shape,
            extent,
            channels: self.channels.len(),
            tiles_written,
            metadata: outcome,
        })
    }

    fn check_extents<S>(&self, source_id: &str, source: &mut S) -> Result<(), TilerError>
    where
        S: MosaicSource,
        TilerError: From<S::Error>,
    {
        if self.channels.is_empty() {
            return Ok(());
        }
        let first = source.channel_extent(0)?;
        for (index, channel) in self.channels.iter().enumerate().skip(1) {
            let extent = source.channel_extent(index)?;
            if extent != first {
                return Err(TilerError::ChannelShapeMismatch {
                    source_id: source_id.to_string(),
                    channel: channel.clone(),
                    expected: first,
                    actual: extent,
                });
            }
        }
        Ok(())
    }
}
