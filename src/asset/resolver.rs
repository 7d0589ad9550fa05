use std::sync::Arc;
use glam::UVec2;
use image::RgbaImage;
use rayon::prelude::*;
use tracing::instrument;
use crate::{read_asset, AssetPath, DecodedImage, HashMap, HashSet, ImageHandle, ImageId, LoadErrorKind, Protocol};

/// Maps tileset-relative image references to decoded, deduplicated images.
/// Decoded images are kept for the lifetime of the resolver.
pub struct ImageResolver {
    protocol: Arc<dyn Protocol>,
    images: HashMap<AssetPath, ImageHandle>,
    next_id: u32,
}

impl ImageResolver {

    pub fn new(protocol: impl Protocol) -> Self {
        Self::from_shared(Arc::new(protocol))
    }

    pub fn from_shared(protocol: Arc<dyn Protocol>) -> Self {
        Self {
            protocol,
            images: HashMap::default(),
            next_id: 0,
        }
    }

    pub fn protocol(&self) -> &Arc<dyn Protocol> {
        &self.protocol
    }

    /// Image previously decoded from this path, if any.
    pub fn get(&self, path: &AssetPath) -> Option<&ImageHandle> {
        self.images.get(path)
    }

    /// Number of distinct images decoded so far.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Returns the image stored at path, decoding it on first use.
    /// Fails if the decoded image is not exactly the declared size.
    pub fn resolve(&mut self, path: &AssetPath, declared: UVec2) -> Result<ImageHandle, LoadErrorKind> {
        let handle = match self.images.get(path) {
            Some(handle) => handle.clone(),
            None => {
                let pixels = read_image(self.protocol.as_ref(), path)?;
                self.insert(path.clone(), pixels)
            },
        };
        let actual = handle.size();
        if actual != declared {
            return Err(LoadErrorKind::DimensionMismatch {
                path: path.to_string(),
                declared,
                actual,
            });
        }
        Ok(handle)
    }

    /// Reads and decodes every path not yet cached on the rayon pool.
    /// Images are numbered in the order paths are given.
    /// Failures are skipped here, and surface when the path is resolved.
    #[instrument(skip_all)]
    pub fn preload<'a>(&mut self, paths: impl IntoIterator<Item = &'a AssetPath>) {
        let mut seen = HashSet::default();
        let pending: Vec<&AssetPath> = paths
            .into_iter()
            .filter(|path| !self.images.contains_key(*path) && seen.insert(*path))
            .collect();
        if pending.is_empty() { return }

        let protocol = self.protocol.as_ref();
        let decoded: Vec<(&AssetPath, Result<RgbaImage, LoadErrorKind>)> = pending
            .into_par_iter()
            .map(|path| (path, read_image(protocol, path)))
            .collect();
        for (path, result) in decoded {
            match result {
                Ok(pixels) => { self.insert(path.clone(), pixels); },
                Err(err) => log::debug!("Deferring failed preload of {path}: {err}"),
            }
        }
    }

    fn insert(&mut self, path: AssetPath, pixels: RgbaImage) -> ImageHandle {
        let id = ImageId(self.next_id);
        self.next_id += 1;
        log::debug!("Decoded {path} as {id} ({}x{})", pixels.width(), pixels.height());
        let handle = ImageHandle {
            id,
            image: Arc::new(DecodedImage { path: path.clone(), pixels }),
        };
        self.images.insert(path, handle.clone());
        handle
    }
}

fn read_image(protocol: &dyn Protocol, path: &AssetPath) -> Result<RgbaImage, LoadErrorKind> {
    let bytes = read_asset(protocol, path)?;
    let image = image::load_from_memory(&bytes).map_err(|source| LoadErrorKind::AssetDecodeError {
        path: path.to_string(),
        source,
    })?;
    Ok(image.into_rgba8())
}

#[cfg(test)]
pub(super) mod test {
    use std::io::Cursor;
    use glam::UVec2;
    use image::{ImageOutputFormat, Rgba, RgbaImage};
    use crate::{AssetPath, ImageResolver, LoadErrorKind, MemoryProtocol};

    /// Encodes a solid-colored PNG.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([120, 80, 40, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn path(str: &str) -> AssetPath {
        AssetPath::parse(str).unwrap()
    }

    fn resolver() -> ImageResolver {
        let protocol = MemoryProtocol::new()
            .with("images/dirt.png", png(32, 32))
            .with("images/fern.png", png(64, 64))
            .with("images/broken.png", b"not a png".to_vec());
        ImageResolver::new(protocol)
    }

    #[test]
    fn same_path_resolves_to_same_handle() {
        let mut resolver = resolver();
        let first = resolver.resolve(&path("images/dirt.png"), UVec2::splat(32)).unwrap();
        let second = resolver.resolve(&AssetPath::join("maps", "../images/dirt.png").unwrap(), UVec2::splat(32)).unwrap();
        assert_eq!(first, second);
        assert!(first.ptr_eq(&second));
        assert_eq!(1, resolver.len());
        assert_eq!(UVec2::splat(32), first.size());
        assert_eq!(&Rgba([120, 80, 40, 255]), first.pixels().get_pixel(31, 31));
        assert_eq!("images/dirt.png", first.path().as_str());
    }

    #[test]
    fn distinct_paths_resolve_to_distinct_handles() {
        let mut resolver = resolver();
        let dirt = resolver.resolve(&path("images/dirt.png"), UVec2::splat(32)).unwrap();
        let fern = resolver.resolve(&path("images/fern.png"), UVec2::splat(64)).unwrap();
        assert_ne!(dirt, fern);
        assert_eq!(2, resolver.len());
    }

    #[test]
    fn declared_size_must_match() {
        let mut resolver = resolver();
        let result = resolver.resolve(&path("images/dirt.png"), UVec2::splat(16));
        match result {
            Err(LoadErrorKind::DimensionMismatch { declared, actual, .. }) => {
                assert_eq!(UVec2::splat(16), declared);
                assert_eq!(UVec2::splat(32), actual);
            },
            other => panic!("Unexpected result {other:?}"),
        }

        // Decoded pixels are still cached for a correct declaration.
        assert!(resolver.resolve(&path("images/dirt.png"), UVec2::splat(32)).is_ok());
    }

    #[test]
    fn missing_and_undecodable_images() {
        let mut resolver = resolver();
        let result = resolver.resolve(&path("images/missing.png"), UVec2::splat(16));
        assert!(matches!(result, Err(LoadErrorKind::AssetNotFound { .. })));
        let result = resolver.resolve(&path("images/broken.png"), UVec2::splat(16));
        assert!(matches!(result, Err(LoadErrorKind::AssetDecodeError { .. })));
        assert!(resolver.is_empty());
    }

    #[test]
    fn preload_decodes_in_declaration_order() {
        let mut resolver = resolver();
        let paths = [path("images/fern.png"), path("images/dirt.png"), path("images/fern.png"), path("images/missing.png")];
        resolver.preload(&paths);
        assert_eq!(2, resolver.len());
        let fern = resolver.get(&paths[0]).unwrap().clone();
        let dirt = resolver.get(&paths[1]).unwrap().clone();
        assert!(fern.id() < dirt.id());

        let resolved = resolver.resolve(&paths[2], UVec2::splat(64)).unwrap();
        assert!(resolved.ptr_eq(&fern));
        assert!(resolver.resolve(&paths[3], UVec2::splat(16)).is_err());
    }
}
