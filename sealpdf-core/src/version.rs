use crate::error::{PdfError, Result};
use std::fmt;
use std::str::FromStr;

/// PDF format version, optionally with an Adobe extension level
/// (`1.7ext3` is PDF 1.7, extension level 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PdfVersion {
    major: u8,
    minor: u8,
    extension_level: Option<u8>,
}

impl PdfVersion {
    pub const V1_3: PdfVersion = PdfVersion::new(1, 3);
    pub const V1_4: PdfVersion = PdfVersion::new(1, 4);
    pub const V1_5: PdfVersion = PdfVersion::new(1, 5);
    pub const V1_6: PdfVersion = PdfVersion::new(1, 6);
    pub const V1_7: PdfVersion = PdfVersion::new(1, 7);
    pub const V1_7_EXT3: PdfVersion = PdfVersion::new(1, 7).with_extension_level(3);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self {
            major,
            minor,
            extension_level: None,
        }
    }

    pub const fn with_extension_level(mut self, level: u8) -> Self {
        self.extension_level = Some(level);
        self
    }

    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }

    pub fn extension_level(&self) -> Option<u8> {
        self.extension_level
    }

    /// `M.m` as written after `%PDF-`; extension levels never appear there.
    pub fn header_version(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl Default for PdfVersion {
    fn default() -> Self {
        Self::V1_7
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(level) = self.extension_level {
            write!(f, "ext{level}")?;
        }
        Ok(())
    }
}

impl FromStr for PdfVersion {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PdfError::InvalidVersion(s.to_string());
        let trimmed = s.trim();

        let (base, extension) = match trimmed.split_once("ext") {
            Some((base, level)) => (base, Some(level.parse::<u8>().map_err(|_| invalid())?)),
            None => (trimmed, None),
        };

        let (major, minor) = base.split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u8>().map_err(|_| invalid())?;
        let minor = minor.parse::<u8>().map_err(|_| invalid())?;

        let version = PdfVersion::new(major, minor);
        Ok(match extension {
            Some(level) => version.with_extension_level(level),
            None => version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_versions() {
        assert_eq!("1.4".parse::<PdfVersion>().unwrap(), PdfVersion::V1_4);
        assert_eq!("1.7".parse::<PdfVersion>().unwrap(), PdfVersion::V1_7);
        assert_eq!("2.0".parse::<PdfVersion>().unwrap(), PdfVersion::new(2, 0));
    }

    #[test]
    fn test_parse_extension_level() {
        let version: PdfVersion = "1.7ext3".parse().unwrap();
        assert_eq!(version, PdfVersion::V1_7_EXT3);
        assert_eq!(version.extension_level(), Some(3));
        assert_eq!(version.header_version(), "1.7");
        assert_eq!(version.to_string(), "1.7ext3");
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "1", "1.x", "one.seven", "1.7ext", "1.7extX"] {
            assert!(
                matches!(input.parse::<PdfVersion>(), Err(PdfError::InvalidVersion(_))),
                "{input} should not parse"
            );
        }
    }

    #[test]
    fn test_default_is_1_7() {
        assert_eq!(PdfVersion::default().to_string(), "1.7");
    }
}
