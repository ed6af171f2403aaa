//! Text transcoding for the output device
//!
//! Source files are read as raw bytes in the host's narrow encoding and
//! handed to the device as UTF-16. Conversion is best-effort: malformed
//! sequences become U+FFFD and the line is still printed.

use encoding_rs::Encoding;
use std::borrow::Cow;
use tracing::warn;

/// Map a Windows code page identifier to an `encoding_rs` encoding
pub fn encoding_for_code_page(code_page: u32) -> Option<&'static Encoding> {
    let encoding = match code_page {
        65001 => encoding_rs::UTF_8,
        866 => encoding_rs::IBM866,
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1252 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        10000 => encoding_rs::MACINTOSH,
        10007 => encoding_rs::X_MAC_CYRILLIC,
        20866 => encoding_rs::KOI8_R,
        20932 => encoding_rs::EUC_JP,
        21866 => encoding_rs::KOI8_U,
        28592 => encoding_rs::ISO_8859_2,
        28595 => encoding_rs::ISO_8859_5,
        28597 => encoding_rs::ISO_8859_7,
        28605 => encoding_rs::ISO_8859_15,
        54936 => encoding_rs::GB18030,
        _ => return None,
    };
    Some(encoding)
}

/// The host's narrow text encoding
///
/// On Windows this is the active ANSI code page; unknown code pages fall
/// back to windows-1252. Other platforms use UTF-8.
#[cfg(windows)]
pub fn host_encoding() -> &'static Encoding {
    let code_page = unsafe { windows::Win32::Globalization::GetACP() };
    encoding_for_code_page(code_page).unwrap_or(encoding_rs::WINDOWS_1252)
}

#[cfg(not(windows))]
pub fn host_encoding() -> &'static Encoding {
    encoding_rs::UTF_8
}

/// Strip one trailing line terminator (`\n`, `\r\n` or a lone `\r`)
pub fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Lossy converter from the source encoding to device text
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    encoding: &'static Encoding,
}

impl Transcoder {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// Transcoder for the host's narrow encoding
    pub fn host() -> Self {
        Self::new(host_encoding())
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Drop a leading byte order mark of this encoding
    ///
    /// Only meaningful for the first line of a file.
    pub fn strip_bom<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        match Encoding::for_bom(bytes) {
            Some((encoding, len)) if encoding == self.encoding => &bytes[len..],
            _ => bytes,
        }
    }

    /// Decode a line, substituting U+FFFD for malformed sequences
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, had_errors) = self.encoding.decode_without_bom_handling(bytes);
        if had_errors {
            warn!(
                encoding = self.encoding.name(),
                len = bytes.len(),
                "Malformed byte sequence replaced"
            );
        }
        text
    }

    /// Decode a line into UTF-16 code units (no terminating NUL)
    pub fn to_utf16(&self, bytes: &[u8]) -> Vec<u16> {
        self.decode(bytes).encode_utf16().collect()
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::host()
    }
}
