//! The image payload passed from one pipeline step to the next.

use std::collections::BTreeMap;

/// Integer options handed to the encoder when an artifact is written out.
pub type SaveOptions = BTreeMap<String, i64>;

/// An encoded image together with the filename it travels under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub data: Vec<u8>,
    /// Filename without its extension.
    pub name: String,
    /// Extension without the leading dot, e.g. `ppm`.
    pub ext: String,
}

impl Artifact {
    /// Create an artifact from its bytes and a filename such as `blur.ppm`.
    ///
    /// The extension is everything after the last `.`; a filename without
    /// one has an empty extension.
    pub fn new(data: Vec<u8>, filename: &str) -> Self {
        let (name, ext) = match filename.rsplit_once('.') {
            Some((name, ext)) => (name, ext),
            None => (filename, ""),
        };
        Self {
            data,
            name: name.to_string(),
            ext: ext.to_ascii_lowercase(),
        }
    }

    /// The full filename, `name.ext`.
    pub fn filename(&self) -> String {
        if self.ext.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.ext)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_filename() {
        let artifact = Artifact::new(vec![1, 2, 3], "blur.ppm");
        assert_eq!(artifact.name, "blur");
        assert_eq!(artifact.ext, "ppm");
        assert_eq!(artifact.filename(), "blur.ppm");
    }

    #[test]
    fn extension_is_lowercased() {
        let artifact = Artifact::new(vec![], "Photo.PPM");
        assert_eq!(artifact.name, "Photo");
        assert_eq!(artifact.ext, "ppm");
    }

    #[test]
    fn uses_last_dot() {
        let artifact = Artifact::new(vec![], "my.cat.ppm");
        assert_eq!(artifact.name, "my.cat");
        assert_eq!(artifact.ext, "ppm");
    }

    #[test]
    fn filename_without_extension() {
        let artifact = Artifact::new(vec![], "avatar");
        assert_eq!(artifact.ext, "");
        assert_eq!(artifact.filename(), "avatar");
    }
}
