use std::io;
use std::path::PathBuf;
use crate::{AssetPath, HashMap, LoadErrorKind};

/**
 * A method of receiving bytes from files.
 * IE: a directory on disk, an in-memory table, an archive etc.
 */
pub trait Protocol: Send + Sync + 'static {
    /**
     * Name of the protocol. IE: file, memory etc.
     * Should not change across invocations.
     */
    fn name(&self) -> &str;
    /**
     * Retrieves raw bytes from the path specified.
     * A missing file should be reported as an [`io::Error`] of kind [`io::ErrorKind::NotFound`].
     */
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>>;
}

/**
 * An implementation of [`Protocol`] that fetches bytes from a directory on the file system.
 */
#[derive(Clone, Debug)]
pub struct FileProtocol {
    pub root: PathBuf,
}

impl FileProtocol {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Protocol for FileProtocol {
    fn name(&self) -> &str { "file" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let bytes = std::fs::read(self.root.join(path.as_str()))?;
        Ok(bytes)
    }
}

/**
 * An implementation of [`Protocol`] that serves bytes from an in-memory table.
 * Useful for testing purposes and embedded assets.
 */
#[derive(Clone, Default, Debug)]
pub struct MemoryProtocol {
    files: HashMap<AssetPath, Vec<u8>>,
}

impl MemoryProtocol {

    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a file. Panics if the path is not a valid asset path.
    pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Stores a file. Panics if the path is not a valid asset path.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        let path = AssetPath::parse(path).unwrap_or_else(|err| panic!("{err}"));
        self.files.insert(path, bytes.into());
    }
}

impl Protocol for MemoryProtocol {
    fn name(&self) -> &str { "memory" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        match self.files.get(path) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(io::Error::new(io::ErrorKind::NotFound, format!("{path} not found")).into()),
        }
    }
}

/// Reads a file, telling missing files apart from other failures.
pub fn read_asset(protocol: &dyn Protocol, path: &AssetPath) -> Result<Vec<u8>, LoadErrorKind> {
    protocol.read(path).map_err(|err| {
        if is_not_found(&err) {
            LoadErrorKind::AssetNotFound { path: path.to_string() }
        }
        else {
            LoadErrorKind::AssetUnreadable { path: path.to_string(), reason: format!("{} protocol: {err:#}", protocol.name()) }
        }
    })
}

/// True if an error returned by [`Protocol::read`] means the file does not exist.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<io::Error>() {
        Some(io_err) => io_err.kind() == io::ErrorKind::NotFound,
        None => false,
    }
}

#[cfg(test)]
mod test {
    use crate::{AssetPath, FileProtocol, LoadErrorKind, MemoryProtocol, Protocol};
    use super::{is_not_found, read_asset};

    struct BrokenProtocol;

    impl Protocol for BrokenProtocol {
        fn name(&self) -> &str { "broken" }
        fn read(&self, _path: &AssetPath) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("device unplugged")
        }
    }

    #[test]
    fn memory_protocol_reads_normalized_paths() {
        let protocol = MemoryProtocol::new().with("maps/../images/dirt.png", b"dirt".to_vec());
        let path = AssetPath::parse("images/dirt.png").unwrap();
        assert_eq!(b"dirt".to_vec(), protocol.read(&path).unwrap());
    }

    #[test]
    fn missing_files_are_not_found() {
        let path = AssetPath::parse("images/missing.png").unwrap();
        let err = MemoryProtocol::new().read(&path).unwrap_err();
        assert!(is_not_found(&err));

        let file_protocol = FileProtocol::new(std::env::temp_dir().join("tileset_registry_no_such_dir"));
        let err = file_protocol.read(&path).unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn other_failures_name_the_protocol() {
        let path = AssetPath::parse("images/dirt.png").unwrap();
        match read_asset(&BrokenProtocol, &path) {
            Err(LoadErrorKind::AssetUnreadable { path, reason }) => {
                assert_eq!("images/dirt.png", path);
                assert_eq!("broken protocol: device unplugged", reason);
            },
            other => panic!("Unexpected result {other:?}"),
        }
        let err = read_asset(&MemoryProtocol::new(), &path).unwrap_err();
        assert!(matches!(err, LoadErrorKind::AssetNotFound { .. }));
    }
}
