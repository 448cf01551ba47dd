pub mod mask_png;

pub use mask_png::MaskPngEncoder;
