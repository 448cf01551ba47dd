pub mod mask_array;
pub mod metadata_store;
pub mod segmentation_layout;
pub mod stitch_service;
pub mod tiff_mosaic;
pub mod tile_store;
pub mod tiler;

pub use mask_array::{read_mask_array, MaskArray, MaskData};
pub use metadata_store::{GridMetadataStore, PutOutcome};
pub use segmentation_layout::{format_directory, LayoutReport};
pub use stitch_service::{StitchReport, StitchService};
pub use tiff_mosaic::TiffMosaic;
pub use tile_store::{BoundsWriter, TileStore};
pub use tiler::{TileReport, Tiler};
