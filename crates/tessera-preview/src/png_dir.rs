use std::path::{Path, PathBuf};

use tessera_shapes::{DecodedShape, ShapeDecoder, ShapeDescriptor, Surface};

/// Decoder over a directory of PNG files laid out as
/// `<root>/<collection>/<clut>/<shape>.png`.
pub struct PngDirectory {
    root: PathBuf,
}

impl PngDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, descriptor: ShapeDescriptor) -> PathBuf {
        self.root
            .join(descriptor.collection().to_string())
            .join(descriptor.clut().to_string())
            .join(format!("{}.png", descriptor.shape()))
    }
}

fn load(path: &Path) -> Result<Surface, image::ImageError> {
    Ok(Surface::Rgba(image::open(path)?.to_rgba8()))
}

impl ShapeDecoder for PngDirectory {
    fn decode(&mut self, descriptor: ShapeDescriptor) -> Option<DecodedShape> {
        let path = self.path_for(descriptor);
        match load(&path) {
            Ok(surface) => Some(DecodedShape::new(surface)),
            Err(e) => {
                log::debug!("PngDirectory: {}: {e}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_layout() {
        let dir = PngDirectory::new("/shapes");
        let path = dir.path_for(ShapeDescriptor::new(5, 2, 40));
        assert_eq!(path, PathBuf::from("/shapes/5/2/40.png"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let mut dir = PngDirectory::new("/nonexistent/tessera/shapes");
        assert!(dir.decode(ShapeDescriptor::new(0, 0, 0)).is_none());
    }
}
