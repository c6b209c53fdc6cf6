use thiserror::Error;

pub const MAGIC: [u8; 8] = *b"\x89ODH\r\n\x1a\n";
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
pub const HEADER_SIZE: usize = 20;

/// Reasons a byte sequence is not a container header
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderDefect {
    #[error("file shorter than the 20-byte header")]
    TooShort,

    #[error("invalid magic number in header")]
    InvalidMagic,

    #[error("unsupported format version: {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
}

/// Container file header
///
/// Fixed 20-byte prefix of every container file: magic number, format
/// version and the length of the serialized body that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Magic number: "\x89ODH\r\n\x1a\n"
    pub magic: [u8; 8],

    /// Format version (major)
    pub version_major: u16,

    /// Format version (minor)
    pub version_minor: u16,

    /// Length of the body in bytes
    pub body_len: u64,
}

impl Header {
    pub fn new(body_len: u64) -> Self {
        Header {
            magic: MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            body_len,
        }
    }

    pub fn validate(&self) -> Result<(), HeaderDefect> {
        if self.magic != MAGIC {
            return Err(HeaderDefect::InvalidMagic);
        }
        // minor versions stay readable
        if self.version_major != VERSION_MAJOR {
            return Err(HeaderDefect::UnsupportedVersion {
                major: self.version_major,
                minor: self.version_minor,
            });
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..8].copy_from_slice(&self.magic);
        bytes[8..10].copy_from_slice(&self.version_major.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.version_minor.to_le_bytes());
        bytes[12..20].copy_from_slice(&self.body_len.to_le_bytes());
        bytes
    }

    /// Parse and validate a header from the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderDefect> {
        if bytes.len() < HEADER_SIZE {
            return Err(HeaderDefect::TooShort);
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);
        let mut body_len = [0u8; 8];
        body_len.copy_from_slice(&bytes[12..20]);

        let header = Header {
            magic,
            version_major: u16::from_le_bytes([bytes[8], bytes[9]]),
            version_minor: u16::from_le_bytes([bytes[10], bytes[11]]),
            body_len: u64::from_le_bytes(body_len),
        };
        header.validate()?;
        Ok(header)
    }
}
