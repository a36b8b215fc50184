//! Tagged position/index readers (spec §9 redesign note: "kernel generic-over-encoding
//! via function pointers" becomes a host-side tag match instead of in-kernel
//! indirection — one compiled path per encoding, selected once per call, not once per
//! element).

use crate::error::CoreError;
use glam::Vec3;

/// How a flat `f32` buffer encodes a stream of 3D positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionEncoding {
    /// Three consecutive `f32`s per element, no padding: `[x0,y0,z0,x1,y1,z1,...]`.
    F32x3Packed,
    /// Same layout as packed for this crate's purposes — kept as a distinct tag
    /// because the source API distinguishes "aligned" reads (e.g. from a `vec3`-typed
    /// GPU buffer with implicit 16-byte alignment) from "packed" `f32` triples even
    /// though both are read identically on a CPU backend with no alignment padding.
    F32x3Aligned,
    /// Four `f32`s per element; only the first three lanes are consumed.
    F32x4Padded,
}

impl PositionEncoding {
    /// Stride in `f32` elements between consecutive positions.
    pub fn stride(self) -> usize {
        match self {
            PositionEncoding::F32x3Packed | PositionEncoding::F32x3Aligned => 3,
            PositionEncoding::F32x4Padded => 4,
        }
    }
}

/// A position buffer tagged with its encoding; reads are monomorphized per-call by
/// matching on `encoding` once rather than branching per element.
pub struct PositionReader<'a> {
    data: &'a [f32],
    encoding: PositionEncoding,
}

impl<'a> PositionReader<'a> {
    pub fn new(data: &'a [f32], encoding: PositionEncoding) -> Result<Self, CoreError> {
        let stride = encoding.stride();
        if data.len() % stride != 0 {
            return Err(CoreError::BufferShapeMismatch {
                len: data.len(),
                divisor: stride,
            });
        }
        Ok(Self { data, encoding })
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.encoding.stride()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Vec3 {
        let stride = self.encoding.stride();
        let base = i * stride;
        Vec3::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }
}

/// Triangle index encoding: only one layout is supported today (packed `u32×3`), but
/// the tag is kept symmetric with `PositionEncoding` so a future "aligned" `u32x4`
/// layout can be added without changing call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexEncoding {
    U32x3Packed,
}

impl IndexEncoding {
    pub fn stride(self) -> usize {
        match self {
            IndexEncoding::U32x3Packed => 3,
        }
    }
}

pub struct TriangleIndexReader<'a> {
    data: &'a [u32],
}

impl<'a> TriangleIndexReader<'a> {
    pub fn new(data: &'a [u32], encoding: IndexEncoding) -> Result<Self, CoreError> {
        let stride = encoding.stride();
        if data.len() % stride != 0 {
            return Err(CoreError::BufferShapeMismatch {
                len: data.len(),
                divisor: stride,
            });
        }
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len() / 3
    }

    #[inline]
    pub fn get(&self, t: usize) -> (u32, u32, u32) {
        let base = t * 3;
        (self.data[base], self.data[base + 1], self.data[base + 2])
    }
}
