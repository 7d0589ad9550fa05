use std::fmt;
use derive_more::*;

/**
 * Normalized path to a file, relative to an asset root.
 * Separators are always '/', and "." / ".." segments are collapsed.
 */
#[derive(Clone, Eq, PartialEq, Default, Debug, Hash, PartialOrd, Ord)]
pub struct AssetPath {
    body: String,
}

impl AssetPath {

    pub fn parse(path: &str) -> Result<Self, PathError> {
        let mut parts: Vec<&str> = Vec::new();
        for part in path.split(['/', '\\']) {
            match part {
                "" | "." => {},
                ".." => {
                    if parts.pop().is_none() {
                        return Err(PathError::EscapesRoot { path: String::from(path) });
                    }
                },
                _ => parts.push(part),
            }
        }
        if parts.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { body: parts.join("/") })
    }

    /// Resolves a reference relative to the directory this file lives in.
    pub fn sibling(&self, reference: &str) -> Result<Self, PathError> {
        match self.parent() {
            Some(parent) => Self::parse(&format!("{parent}/{reference}")),
            None => Self::parse(reference),
        }
    }

    /// Resolves a reference relative to a directory.
    /// An empty directory is the asset root.
    pub fn join(dir: &str, reference: &str) -> Result<Self, PathError> {
        if dir.is_empty() {
            Self::parse(reference)
        }
        else {
            Self::parse(&format!("{dir}/{reference}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Parent directory of this file.
    /// None if it's at the root.
    pub fn parent(&self) -> Option<&str> {
        self.body.rsplit_once('/').map(|(parent, _)| parent)
    }

    pub fn file_name(&self) -> &str {
        match self.body.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.body,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        self.file_name().rsplit_once('.').map(|(_, ext)| ext)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum PathError {
    #[display(fmt="Path is empty")]
    Empty,
    #[display(fmt="Path '{path}' escapes the asset root")]
    EscapesRoot { path: String },
}

#[cfg(test)]
mod test {
    use super::AssetPath;
    use super::PathError;

    #[test]
    fn normalizes_segments() {
        let path = AssetPath::parse("maps/./../images\\tiles//dirt.png").unwrap();
        assert_eq!("images/tiles/dirt.png", path.as_str());
        assert_eq!(Some("images/tiles"), path.parent());
        assert_eq!("dirt.png", path.file_name());
        assert_eq!(Some("png"), path.extension());
    }

    #[test]
    fn sibling_of_tileset() {
        let tileset = AssetPath::parse("maps/map_textures.tsx").unwrap();
        let image = tileset.sibling("../images/tiles/grass.png").unwrap();
        assert_eq!("images/tiles/grass.png", image.as_str());

        let root_file = AssetPath::parse("level.tsx").unwrap();
        assert_eq!(None, root_file.parent());
        assert_eq!("dirt.png", root_file.sibling("dirt.png").unwrap().as_str());
    }

    #[test]
    fn escaping_root_fails() {
        let result = AssetPath::join("maps", "../../secret.png");
        assert_eq!(Err(PathError::EscapesRoot { path: String::from("maps/../../secret.png") }), result);
        assert_eq!(Err(PathError::Empty), AssetPath::parse("./"));
    }

    #[test]
    fn equivalent_spellings_are_equal() {
        let a = AssetPath::join("maps", "../images/dirt.png").unwrap();
        let b = AssetPath::parse("images/dirt.png").unwrap();
        assert_eq!(a, b);
    }
}
