//! Windows GDI backend
//!
//! Resolves the default printer through winspool and draws text on a
//! printer device context.

use crate::config::FontSpec;
use crate::device::{DeviceContext, DocumentInfo, NameQuery, PrintBackend, negotiate_device_name};
use crate::error::DeviceError;
use std::mem::size_of;
use tracing::debug;
use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_INSUFFICIENT_BUFFER, GetLastError};
use windows::Win32::Graphics::Gdi::{
    CLEARTYPE_QUALITY, CLIP_DEFAULT_PRECIS, CreateDCW, CreateFontW, DEFAULT_CHARSET, DeleteDC,
    DeleteObject, FF_MODERN, FIXED_PITCH, FW_DONTCARE, GetDeviceCaps, HDC, HFONT, HGDIOBJ,
    OUT_OUTLINE_PRECIS, SelectObject, TextOutW, VERTRES,
};
use windows::Win32::Graphics::Printing::GetDefaultPrinterW;
use windows::Win32::Storage::Xps::DOCINFOW;
use windows::core::{PCWSTR, PWSTR, w};

#[link(name = "gdi32")]
unsafe extern "system" {
    fn AbortDoc(hdc: HDC) -> i32;
    fn EndDoc(hdc: HDC) -> i32;
    fn EndPage(hdc: HDC) -> i32;
    fn StartDocW(hdc: HDC, lpdi: *const DOCINFOW) -> i32;
    fn StartPage(hdc: HDC) -> i32;
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain([0]).collect()
}

fn last_error(operation: &'static str) -> DeviceError {
    let code = unsafe { GetLastError().0 };
    if code == 0 {
        return DeviceError::new(operation, "unknown win32 error");
    }
    DeviceError::new(operation, format!("win32 error {}", code))
}

/// GDI print backend
#[derive(Debug, Clone, Copy, Default)]
pub struct GdiBackend;

impl PrintBackend for GdiBackend {
    type Context = GdiContext;

    fn default_device(&self) -> Result<Option<String>, DeviceError> {
        negotiate_device_name(|buf, needed| unsafe {
            if GetDefaultPrinterW(buf.map(|b| PWSTR(b.as_mut_ptr())), needed).as_bool() {
                return NameQuery::Filled;
            }
            let code = GetLastError();
            if code == ERROR_INSUFFICIENT_BUFFER {
                NameQuery::BufferTooSmall
            } else if code == ERROR_FILE_NOT_FOUND {
                // No default printer configured
                NameQuery::NotFound
            } else {
                NameQuery::Failed(last_error("GetDefaultPrinter"))
            }
        })
    }

    fn create_context(&self, device: &str) -> Result<Self::Context, DeviceError> {
        let device_w = to_wide(device);
        let hdc = unsafe {
            CreateDCW(
                w!("WINSPOOL"),
                PCWSTR::from_raw(device_w.as_ptr()),
                PCWSTR::null(),
                None,
            )
        };
        if hdc.is_invalid() {
            return Err(last_error("CreateDC"));
        }
        debug!(device, "Device context created");
        Ok(GdiContext { hdc })
    }
}

/// Printer device context; deleted on drop
#[derive(Debug)]
pub struct GdiContext {
    hdc: HDC,
}

impl Drop for GdiContext {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteDC(self.hdc);
        }
    }
}

/// Font selected into a device context
///
/// Dropping it restores the previous font and deletes this one.
#[derive(Debug)]
pub struct GdiFont {
    hdc: HDC,
    font: HFONT,
    previous: HGDIOBJ,
}

impl Drop for GdiFont {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.hdc, self.previous);
            let _ = DeleteObject(self.font.into());
        }
    }
}

impl DeviceContext for GdiContext {
    type Font = GdiFont;

    fn start_document(&mut self, doc: &DocumentInfo) -> Result<(), DeviceError> {
        let name_w = to_wide(&doc.name);
        let di = DOCINFOW {
            cbSize: size_of::<DOCINFOW>() as i32,
            lpszDocName: PCWSTR::from_raw(name_w.as_ptr()),
            ..Default::default()
        };
        // DOCINFOW has no size field; the hint only travels in the log
        debug!(size_hint = doc.size_hint, "StartDoc");
        if unsafe { StartDocW(self.hdc, &di) } <= 0 {
            return Err(last_error("StartDoc"));
        }
        Ok(())
    }

    fn start_page(&mut self) -> Result<(), DeviceError> {
        if unsafe { StartPage(self.hdc) } <= 0 {
            return Err(last_error("StartPage"));
        }
        Ok(())
    }

    fn select_font(&mut self, spec: &FontSpec) -> Result<Self::Font, DeviceError> {
        let face_w = to_wide(&spec.face);
        unsafe {
            let font = CreateFontW(
                spec.size,
                0,
                0,
                0,
                FW_DONTCARE.0 as i32,
                0,
                0,
                0,
                DEFAULT_CHARSET,
                OUT_OUTLINE_PRECIS,
                CLIP_DEFAULT_PRECIS,
                CLEARTYPE_QUALITY,
                (FIXED_PITCH.0 | FF_MODERN.0) as u32,
                PCWSTR::from_raw(face_w.as_ptr()),
            );
            if font.is_invalid() {
                return Err(last_error("CreateFont"));
            }
            let previous = SelectObject(self.hdc, font.into());
            if previous.is_invalid() {
                let _ = DeleteObject(font.into());
                return Err(last_error("SelectObject"));
            }
            Ok(GdiFont {
                hdc: self.hdc,
                font,
                previous,
            })
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &[u16]) -> Result<(), DeviceError> {
        if !unsafe { TextOutW(self.hdc, x, y, text) }.as_bool() {
            return Err(last_error("TextOut"));
        }
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), DeviceError> {
        if unsafe { EndPage(self.hdc) } <= 0 {
            return Err(last_error("EndPage"));
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), DeviceError> {
        if unsafe { EndDoc(self.hdc) } <= 0 {
            return Err(last_error("EndDoc"));
        }
        Ok(())
    }

    fn abort_document(&mut self) {
        unsafe {
            let _ = AbortDoc(self.hdc);
        }
    }

    fn printable_height(&self) -> Option<i32> {
        let height = unsafe { GetDeviceCaps(Some(self.hdc), VERTRES) };
        (height > 0).then_some(height)
    }
}
