//! Asset decoding contract.

use std::collections::HashMap;

use crate::descriptor::ShapeDescriptor;
use crate::surface::Surface;

/// Result of decoding one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedShape {
    pub surface: Surface,
    /// Out-of-band pixel storage the decoder handed over with the surface.
    ///
    /// Its presence means the surface is a view onto a temporary buffer and
    /// must be converted before it is kept.
    pub raw_pixels: Option<Vec<u8>>,
}

impl DecodedShape {
    #[inline]
    pub fn new(surface: Surface) -> Self {
        Self { surface, raw_pixels: None }
    }
}

/// Turns a shape descriptor into pixels.
///
/// `None` means the shape is unavailable right now. Callers treat that as a
/// soft failure and may ask again later.
pub trait ShapeDecoder {
    fn decode(&mut self, descriptor: ShapeDescriptor) -> Option<DecodedShape>;
}

struct LibraryEntry {
    surface: Surface,
    hand_over_raw: bool,
}

/// In-memory decoder over a fixed set of surfaces.
///
/// Counts decode calls, which makes caching behavior observable.
#[derive(Default)]
pub struct ShapeLibrary {
    shapes: HashMap<ShapeDescriptor, LibraryEntry>,
    decode_calls: usize,
}

impl ShapeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `surface` under `descriptor`, replacing any previous entry.
    pub fn insert(&mut self, descriptor: ShapeDescriptor, surface: Surface) {
        self.shapes.insert(descriptor, LibraryEntry { surface, hand_over_raw: false });
    }

    /// Like [`ShapeLibrary::insert`], but decodes also hand over a raw pixel buffer.
    pub fn insert_with_raw_buffer(&mut self, descriptor: ShapeDescriptor, surface: Surface) {
        self.shapes.insert(descriptor, LibraryEntry { surface, hand_over_raw: true });
    }

    pub fn remove(&mut self, descriptor: ShapeDescriptor) -> Option<Surface> {
        self.shapes.remove(&descriptor).map(|e| e.surface)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of `decode` calls so far, successful or not.
    #[inline]
    pub fn decode_calls(&self) -> usize {
        self.decode_calls
    }
}

impl ShapeDecoder for ShapeLibrary {
    fn decode(&mut self, descriptor: ShapeDescriptor) -> Option<DecodedShape> {
        self.decode_calls += 1;
        let entry = self.shapes.get(&descriptor)?;
        let raw_pixels = entry.hand_over_raw.then(|| {
            let (w, h) = entry.surface.dimensions();
            vec![0; w as usize * h as usize]
        });
        Some(DecodedShape { surface: entry.surface.clone(), raw_pixels })
    }
}
