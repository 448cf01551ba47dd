//! Reader for the packed mask arrays produced by the segmentation step.
//!
//! Masks arrive as NumPy `.npy` files holding `rows * cols` masks of
//! `tile_size x tile_size`. Only the element count matters: the stitcher
//! reshapes the flat buffer itself.

use std::path::Path;
use std::sync::OnceLock;

use mosaic_grid::{GridError, MaskStitcher, StitchedMask};
use regex::Regex;

use crate::error::TilerError;

const MAGIC: &[u8] = b"\x93NUMPY";

/// Flat mask samples in the element type of the file.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskData {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl MaskData {
    pub fn len(&self) -> usize {
        match self {
            MaskData::U8(v) => v.len(),
            MaskData::I8(v) => v.len(),
            MaskData::U16(v) => v.len(),
            MaskData::I16(v) => v.len(),
            MaskData::U32(v) => v.len(),
            MaskData::I32(v) => v.len(),
            MaskData::U64(v) => v.len(),
            MaskData::I64(v) => v.len(),
            MaskData::F32(v) => v.len(),
            MaskData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stitch the samples with their native element type.
    pub fn stitch(&self, stitcher: &MaskStitcher) -> Result<StitchedMask, GridError> {
        match self {
            MaskData::U8(v) => stitcher.stitch_flat(v),
            MaskData::I8(v) => stitcher.stitch_flat(v),
            MaskData::U16(v) => stitcher.stitch_flat(v),
            MaskData::I16(v) => stitcher.stitch_flat(v),
            MaskData::U32(v) => stitcher.stitch_flat(v),
            MaskData::I32(v) => stitcher.stitch_flat(v),
            MaskData::U64(v) => stitcher.stitch_flat(v),
            MaskData::I64(v) => stitcher.stitch_flat(v),
            MaskData::F32(v) => stitcher.stitch_flat(v),
            MaskData::F64(v) => stitcher.stitch_flat(v),
        }
    }
}

/// A decoded `.npy` file
#[derive(Debug, Clone, PartialEq)]
pub struct MaskArray {
    pub shape: Vec<usize>,
    pub data: MaskData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dtype {
    endian: Endian,
    kind: char,
    size: usize,
}

struct Header {
    dtype: Dtype,
    shape: Vec<usize>,
}

fn descr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"['"]descr['"]\s*:\s*['"]([<>|=])([biuf])(\d+)['"]"#).expect("static pattern")
    })
}

fn fortran_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"['"]fortran_order['"]\s*:\s*(True|False)"#).expect("static pattern")
    })
}

fn shape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"['"]shape['"]\s*:\s*\(([^)]*)\)"#).expect("static pattern")
    })
}

/// Read a `.npy` mask file.
pub fn read_mask_array(path: &Path) -> Result<MaskArray, TilerError> {
    let bytes = std::fs::read(path).map_err(TilerError::io(path))?;
    let array = parse_mask_array(&bytes).map_err(|reason| TilerError::InvalidMaskFile {
        path: path.to_path_buf(),
        reason,
    })?;
    tracing::debug!(
        path = %path.display(),
        shape = ?array.shape,
        elements = array.data.len(),
        "Loaded mask array"
    );
    Ok(array)
}

/// Parse the bytes of a `.npy` file.
pub fn parse_mask_array(bytes: &[u8]) -> Result<MaskArray, String> {
    let (header, offset) = split_header(bytes)?;
    let header = parse_header(header)?;

    let body = &bytes[offset..];
    let expected = header
        .shape
        .iter()
        .try_fold(header.dtype.size, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| "shape overflows".to_string())?;
    if body.len() != expected {
        return Err(format!(
            "expected {expected} data bytes for shape {:?}, found {}",
            header.shape,
            body.len()
        ));
    }

    let data = decode(body, header.dtype)?;
    Ok(MaskArray {
        shape: header.shape,
        data,
    })
}

fn split_header(bytes: &[u8]) -> Result<(&str, usize), String> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err("not a NumPy array file".to_string());
    }
    let major = bytes[6];
    let (len, start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated header".to_string());
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
            (len, 12)
        }
        v => return Err(format!("unsupported format version {v}")),
    };

    let end = start + len;
    let header = bytes
        .get(start..end)
        .ok_or_else(|| "truncated header".to_string())?;
    let header = std::str::from_utf8(header).map_err(|_| "header is not text".to_string())?;
    Ok((header, end))
}

fn parse_header(header: &str) -> Result<Header, String> {
    let descr = descr_pattern()
        .captures(header)
        .ok_or_else(|| format!("missing or unsupported descr in {}", header.trim()))?;
    let endian = match &descr[1] {
        ">" => Endian::Big,
        _ => Endian::Little,
    };
    let kind = descr[2].chars().next().unwrap_or('?');
    let size: usize = descr[3]
        .parse()
        .map_err(|_| format!("bad item size {}", &descr[3]))?;

    match fortran_pattern().captures(header) {
        Some(c) if &c[1] == "False" => {}
        Some(_) => return Err("Fortran-ordered arrays are not supported".to_string()),
        None => return Err("missing fortran_order".to_string()),
    }

    let shape = shape_pattern()
        .captures(header)
        .ok_or_else(|| "missing shape".to_string())?;
    let shape = shape[1]
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| d.parse::<usize>().map_err(|_| format!("bad dimension '{d}'")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Header {
        dtype: Dtype { endian, kind, size },
        shape,
    })
}

macro_rules! decode_as {
    ($body:expr, $endian:expr, $ty:ty, $variant:ident) => {{
        const N: usize = std::mem::size_of::<$ty>();
        let values = $body
            .chunks_exact(N)
            .map(|chunk| {
                let mut raw = [0u8; N];
                raw.copy_from_slice(chunk);
                match $endian {
                    Endian::Little => <$ty>::from_le_bytes(raw),
                    Endian::Big => <$ty>::from_be_bytes(raw),
                }
            })
            .collect();
        MaskData::$variant(values)
    }};
}

fn decode(body: &[u8], dtype: Dtype) -> Result<MaskData, String> {
    let data = match (dtype.kind, dtype.size) {
        ('b', 1) | ('u', 1) => MaskData::U8(body.to_vec()),
        ('i', 1) => decode_as!(body, dtype.endian, i8, I8),
        ('u', 2) => decode_as!(body, dtype.endian, u16, U16),
        ('i', 2) => decode_as!(body, dtype.endian, i16, I16),
        ('u', 4) => decode_as!(body, dtype.endian, u32, U32),
        ('i', 4) => decode_as!(body, dtype.endian, i32, I32),
        ('u', 8) => decode_as!(body, dtype.endian, u64, U64),
        ('i', 8) => decode_as!(body, dtype.endian, i64, I64),
        ('f', 4) => decode_as!(body, dtype.endian, f32, F32),
        ('f', 8) => decode_as!(body, dtype.endian, f64, F64),
        (kind, size) => return Err(format!("unsupported dtype {kind}{size}")),
    };
    Ok(data)
}

/// Version 1 `.npy` preamble for a C-ordered array, padded to 64 bytes.
///
/// Append the raw little- or big-endian samples to get a complete file.
pub fn npy_header(descr: &str, shape: &[usize]) -> Vec<u8> {
    let dims = match shape {
        [single] => format!("{single},"),
        _ => shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    };
    let mut text = format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': ({dims}), }}");
    let unpadded = MAGIC.len() + 4 + text.len() + 1;
    text.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    text.push('\n');

    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(text.len() as u16).to_le_bytes());
    bytes.extend_from_slice(text.as_bytes());
    bytes
}
