//! Print backend abstraction
//!
//! A backend resolves the default printer and opens device contexts on it.
//! Contexts and fonts are released when dropped, so every exit path of a
//! print job gives back what it acquired.

use crate::config::FontSpec;
use crate::error::DeviceError;

/// Document metadata passed to begin-document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub name: String,
    /// Source file size in bytes; advisory only
    pub size_hint: u64,
}

/// Trait for print subsystems
pub trait PrintBackend {
    type Context: DeviceContext;

    /// Name of the default printer, or `None` if none is configured
    fn default_device(&self) -> Result<Option<String>, DeviceError>;

    /// Open a drawing context bound to the named printer
    fn create_context(&self, device: &str) -> Result<Self::Context, DeviceError>;
}

/// An open drawing surface on a printer
///
/// Dropping the context releases the underlying handle.
pub trait DeviceContext {
    /// Selected font; dropping it deselects and deletes the font
    type Font;

    fn start_document(&mut self, doc: &DocumentInfo) -> Result<(), DeviceError>;

    fn start_page(&mut self) -> Result<(), DeviceError>;

    fn select_font(&mut self, spec: &FontSpec) -> Result<Self::Font, DeviceError>;

    /// Draw one line of UTF-16 text with its top-left corner at (x, y)
    fn draw_text(&mut self, x: i32, y: i32, text: &[u16]) -> Result<(), DeviceError>;

    fn end_page(&mut self) -> Result<(), DeviceError>;

    fn end_document(&mut self) -> Result<(), DeviceError>;

    /// Discard a started document
    fn abort_document(&mut self);

    /// Printable page height in device units, if the device reports one
    fn printable_height(&self) -> Option<i32>;
}

/// Outcome of one call of an OS name query
#[derive(Debug)]
pub enum NameQuery {
    /// The buffer was filled; the length is the value's size
    Filled,
    /// No buffer or a short one; the length is the required size
    BufferTooSmall,
    /// The OS has no value to report
    NotFound,
    /// The query itself failed
    Failed(DeviceError),
}

/// Run the two-call buffer negotiation used by OS name queries
///
/// `query` is first called without a buffer to learn the required length
/// (in UTF-16 units, including the NUL), then with a buffer of that size.
/// Only `NotFound`, or a zero length from a call that did not fail, mean
/// there is no value; any other failure is an error.
pub fn negotiate_device_name<Q>(mut query: Q) -> Result<Option<String>, DeviceError>
where
    Q: FnMut(Option<&mut [u16]>, &mut u32) -> NameQuery,
{
    let mut needed: u32 = 0;
    match query(None, &mut needed) {
        NameQuery::Filled | NameQuery::BufferTooSmall => {}
        NameQuery::NotFound => return Ok(None),
        NameQuery::Failed(e) => return Err(e),
    }

    if needed == 0 {
        return Ok(None);
    }

    let mut buf: Vec<u16> = vec![0; needed as usize];
    match query(Some(buf.as_mut_slice()), &mut needed) {
        NameQuery::Filled => {}
        NameQuery::NotFound => return Ok(None),
        NameQuery::BufferTooSmall => {
            return Err(DeviceError::new(
                "GetDefaultPrinter",
                format!("name grew past {} units between calls", buf.len()),
            ));
        }
        NameQuery::Failed(e) => return Err(e),
    }
    if needed == 0 {
        return Ok(None);
    }

    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    let name = String::from_utf16(&buf[..end]).map_err(|e| {
        DeviceError::new("GetDefaultPrinter", format!("UTF-16 decode failed: {}", e))
    })?;

    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some(name))
}

/// Backend for targets without a supported print subsystem
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBackend;

/// Context type of [`UnsupportedBackend`]; never constructed
#[derive(Debug)]
pub enum NoContext {}

impl PrintBackend for UnsupportedBackend {
    type Context = NoContext;

    fn default_device(&self) -> Result<Option<String>, DeviceError> {
        Err(DeviceError::new(
            "GetDefaultPrinter",
            "printing subsystem is unavailable on this platform",
        ))
    }

    fn create_context(&self, device: &str) -> Result<Self::Context, DeviceError> {
        Err(DeviceError::new(
            "CreateDC",
            format!("cannot open {} on this platform", device),
        ))
    }
}

impl DeviceContext for NoContext {
    type Font = ();

    fn start_document(&mut self, _doc: &DocumentInfo) -> Result<(), DeviceError> {
        match *self {}
    }

    fn start_page(&mut self) -> Result<(), DeviceError> {
        match *self {}
    }

    fn select_font(&mut self, _spec: &FontSpec) -> Result<Self::Font, DeviceError> {
        match *self {}
    }

    fn draw_text(&mut self, _x: i32, _y: i32, _text: &[u16]) -> Result<(), DeviceError> {
        match *self {}
    }

    fn end_page(&mut self) -> Result<(), DeviceError> {
        match *self {}
    }

    fn end_document(&mut self) -> Result<(), DeviceError> {
        match *self {}
    }

    fn abort_document(&mut self) {
        match *self {}
    }

    fn printable_height(&self) -> Option<i32> {
        match *self {}
    }
}
