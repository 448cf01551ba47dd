pub mod config;
pub mod metadata;
pub mod source_id;

pub use config::AppConfig;
pub use metadata::{GridDims, GridMetadata, RasterExtent};
pub use source_id::{source_id_for_image, source_id_for_mask};
