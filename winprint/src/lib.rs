//! # winprint
//!
//! Prints a plain text file on the operating system's default printer.
//!
//! One job per call: resolve the default printer, measure the file, open a
//! device context, then begin document → begin page → one `TextOut` per
//! line → end page → end document. Device context, font and file handle
//! are released on every exit path, and a failed document is aborted.
//!
//! ## Example
//!
//! ```ignore
//! use winprint::{PrintConfig, PrintService, SystemBackend};
//!
//! let service = PrintService::new(SystemBackend::default(), PrintConfig::default());
//! if let Err(e) = service.print_file("To Print.txt") {
//!     eprintln!("{}", e); // "Error: There is no default printer."
//! }
//! ```

mod config;
mod device;
mod encoding;
mod error;
#[cfg(windows)]
mod gdi;
mod job;
pub mod logger;
mod service;

// Re-exports
pub use config::{
    DEFAULT_BASE_DIR, DEFAULT_FILE_NAME, DEFAULT_FONT_FACE, DEFAULT_FONT_SIZE, FontSpec, Overflow,
    PrintConfig,
};
pub use device::{
    DeviceContext, DocumentInfo, NameQuery, NoContext, PrintBackend, UnsupportedBackend,
    negotiate_device_name,
};
pub use encoding::{Transcoder, encoding_for_code_page, host_encoding, strip_line_terminator};
pub use error::{ConfigError, DeviceError, JobStage, PrintError, PrintErrorKind, PrintResult};
pub use job::{JobState, PrintJob};
pub use service::PrintService;

#[cfg(windows)]
pub use gdi::{GdiBackend, GdiContext, GdiFont};

/// Print backend of the current platform
#[cfg(windows)]
pub type SystemBackend = GdiBackend;

/// Print backend of the current platform
#[cfg(not(windows))]
pub type SystemBackend = UnsupportedBackend;

/// Print `file_name` from the default base directory on the default printer
///
/// # Errors
///
/// See [`PrintError`]; its `Display` text is meant for the operator.
pub fn print_file(file_name: &str) -> PrintResult<()> {
    PrintService::new(SystemBackend::default(), PrintConfig::default()).print_file(file_name)
}
