use std::path::Path;

use serde::Deserialize;

/// Configuration for the conversion.
///
/// Loaded from an optional TOML file; every field has a default so an empty
/// file (apart from the version tag) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// The connectivity value seeded into every variation unit.
    ///
    /// Connectivity bounds how many potential ancestors open-cbgm considers
    /// for a witness at a unit. Editors tune it per unit afterwards.
    connectivity: u32,

    /// Suffix inserted before `.xml` when deriving the output path from the
    /// input path.
    output_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connectivity: default_connectivity(),
            output_suffix: default_output_suffix(),
        }
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    /// The file is not valid TOML or has the wrong shape.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(Error::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the default connectivity value for new variation units.
    #[must_use]
    pub const fn connectivity(&self) -> u32 {
        self.connectivity
    }

    /// Overrides the default connectivity value.
    pub const fn set_connectivity(&mut self, connectivity: u32) {
        self.connectivity = connectivity;
    }

    /// Returns the suffix used when deriving the output path.
    #[must_use]
    pub fn output_suffix(&self) -> &str {
        &self.output_suffix
    }
}

const fn default_connectivity() -> u32 {
    10
}

fn default_output_suffix() -> String {
    "_opencbgm".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_connectivity")]
        connectivity: u32,

        #[serde(default = "default_output_suffix")]
        output_suffix: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                connectivity,
                output_suffix,
            } => Self {
                connectivity,
                output_suffix,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nconnectivity = 5\noutput_suffix = \"_cbgm\"\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.connectivity(), 5);
        assert_eq!(config.output_suffix(), "_cbgm");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, Error::Read(_)));
        assert!(error.to_string().starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nconnectivity = \"ten\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, Error::Parse(_)));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.connectivity(), 10);
        assert_eq!(actual.output_suffix(), "_opencbgm");
    }
}
