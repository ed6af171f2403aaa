//! Print configuration
//!
//! Defaults reproduce the fixed constants of the utility: the file
//! `To Print.txt` under `../Resources/`, printed in 96-unit Courier New.
//! [`PrintConfig::from_env`] layers optional `WINPRINT_*` overrides on top.

use crate::error::ConfigError;
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_NAME: &str = "To Print.txt";
pub const DEFAULT_BASE_DIR: &str = "../Resources/";
pub const DEFAULT_FONT_FACE: &str = "Courier New";
pub const DEFAULT_FONT_SIZE: i32 = 96;

/// Fixed-pitch font used for every line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub face: String,
    /// Cell height in device units; also the line advance
    pub size: i32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            face: DEFAULT_FONT_FACE.to_string(),
            size: DEFAULT_FONT_SIZE,
        }
    }
}

/// What happens to lines that do not fit on the physical page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Everything goes on one page; excess lines run past the bottom edge
    #[default]
    SinglePage,
    /// Start a new page when the next line would cross the printable height
    NewPage,
}

impl Overflow {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" | "single-page" | "overflow" => Ok(Overflow::SinglePage),
            "new-page" | "paginate" => Ok(Overflow::NewPage),
            _ => Err(ConfigError::InvalidValue {
                key: "WINPRINT_OVERFLOW",
                value: value.to_string(),
            }),
        }
    }
}

/// Configuration for a [`PrintService`](crate::PrintService)
#[derive(Debug, Clone)]
pub struct PrintConfig {
    pub base_dir: PathBuf,
    pub file_name: String,
    pub font: FontSpec,
    /// Horizontal origin of every line
    pub margin_left: i32,
    /// Vertical origin of the first line on a page
    pub margin_top: i32,
    /// Source text encoding; `None` means the host's narrow encoding
    pub encoding: Option<&'static Encoding>,
    pub overflow: Overflow,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            font: FontSpec::default(),
            margin_left: 0,
            margin_top: 0,
            encoding: None,
            overflow: Overflow::SinglePage,
        }
    }
}

impl PrintConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults. Call `dotenvy::dotenv()` first
    /// to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("WINPRINT_BASE_DIR") {
            config.base_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("WINPRINT_FILE") {
            config.file_name = name;
        }
        if let Some(face) = lookup("WINPRINT_FONT_FACE") {
            config.font.face = face;
        }
        if let Some(size) = lookup("WINPRINT_FONT_SIZE") {
            let parsed = size.trim().parse::<i32>().ok().filter(|s| *s > 0);
            config.font.size = parsed.ok_or(ConfigError::InvalidValue {
                key: "WINPRINT_FONT_SIZE",
                value: size,
            })?;
        }
        if let Some(label) = lookup("WINPRINT_ENCODING") {
            let encoding = Encoding::for_label(label.trim().as_bytes())
                .ok_or(ConfigError::UnknownEncoding(label))?;
            config = config.with_encoding(encoding)?;
        }
        if let Some(overflow) = lookup("WINPRINT_OVERFLOW") {
            config.overflow = Overflow::parse(&overflow)?;
        }

        Ok(config)
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    pub fn with_margins(mut self, left: i32, top: i32) -> Self {
        self.margin_left = left;
        self.margin_top = top;
        self
    }

    /// Set the source encoding
    ///
    /// # Errors
    ///
    /// Encodings that are not ASCII-compatible (UTF-16, ISO-2022-JP) are
    /// rejected: lines are split on the raw `\n` byte before decoding.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Result<Self, ConfigError> {
        if !encoding.is_ascii_compatible() {
            return Err(ConfigError::IncompatibleEncoding(encoding.name().to_string()));
        }
        self.encoding = Some(encoding);
        Ok(self)
    }

    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Full path of a file under the base directory
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.base_dir.join(file_name)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
