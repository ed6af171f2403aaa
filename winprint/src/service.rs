//! Print service - runs one text file through the device job lifecycle

use crate::config::{Overflow, PrintConfig};
use crate::device::{DeviceContext, DocumentInfo, PrintBackend};
use crate::encoding::{Transcoder, strip_line_terminator};
use crate::error::{PrintError, PrintResult};
use crate::job::{Document, PrintJob};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use tracing::{Span, error, info, instrument};

/// Prints text files on the default printer of a backend
///
/// Calls are blocking and must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct PrintService<B> {
    backend: B,
    config: PrintConfig,
}

impl<B: PrintBackend> PrintService<B> {
    pub fn new(backend: B, config: PrintConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Print the configured file
    pub fn print_default(&self) -> PrintResult<()> {
        self.print_file(&self.config.file_name)
    }

    /// Print `file_name` from the configured base directory
    ///
    /// # Errors
    ///
    /// Returns the first failing step; resources acquired before it are
    /// released before returning.
    #[instrument(skip(self), fields(device = tracing::field::Empty))]
    pub fn print_file(&self, file_name: &str) -> PrintResult<()> {
        match self.run(file_name) {
            Ok(job) => {
                info!(
                    lines = job.lines_read,
                    drawn = job.lines_drawn,
                    pages = job.pages,
                    size_hint = job.size_hint,
                    "Print job sent successfully"
                );
                Ok(())
            }
            Err(e) => {
                let cause = std::error::Error::source(&e).map(|s| s.to_string());
                error!(kind = %e.kind(), error = %e, ?cause, "Print job failed");
                Err(e)
            }
        }
    }

    fn run(&self, file_name: &str) -> PrintResult<PrintJob> {
        let path = self.config.resolve(file_name);

        let device = match self.backend.default_device() {
            Ok(Some(name)) => name,
            Ok(None) => return Err(PrintError::NoDefaultDevice),
            Err(e) => return Err(PrintError::DeviceLookupFailed(e)),
        };
        Span::current().record("device", device.as_str());

        // Read the input before touching the device
        let (source, size_hint) = open_source(&path)?;
        let mut job = PrintJob::new(path, device, size_hint, self.config.margin_top);

        let mut context = self.backend.create_context(&job.device).map_err(|source| {
            PrintError::DeviceUnavailable {
                device: job.device.clone(),
                source,
            }
        })?;

        let info = DocumentInfo {
            name: file_name.to_string(),
            size_hint,
        };
        self.run_document(&mut context, &info, source, &mut job)?;

        Ok(job)
    }

    fn run_document(
        &self,
        context: &mut B::Context,
        info: &DocumentInfo,
        source: File,
        job: &mut PrintJob,
    ) -> PrintResult<()> {
        let transcoder = self
            .config
            .encoding
            .map(Transcoder::new)
            .unwrap_or_default();
        let font_spec = &self.config.font;
        let page_height = match self.config.overflow {
            Overflow::SinglePage => None,
            Overflow::NewPage => context.printable_height(),
        };

        let mut doc = Document::start(context, info)?;
        doc.start_page()?;
        let mut font = Some(doc.select_font(font_spec)?);

        let mut reader = BufReader::new(source);
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| PrintError::FileInaccessible {
                    path: job.source.clone(),
                    source,
                })?;
            if read == 0 {
                break;
            }

            if let Some(height) = page_height
                && job.needs_page_break(font_spec.size, height)
            {
                drop(font.take());
                doc.end_page()?;
                doc.start_page()?;
                font = Some(doc.select_font(font_spec)?);
                job.new_page(self.config.margin_top);
            }

            let mut text = strip_line_terminator(&line);
            if job.lines_read == 0 {
                text = transcoder.strip_bom(text);
            }
            if !text.is_empty() {
                let wide = transcoder.to_utf16(text);
                doc.draw_text(self.config.margin_left, job.cursor_y, &wide)?;
                job.lines_drawn += 1;
            }
            job.advance(font_spec.size);
        }

        drop(font);
        doc.end_page()?;
        doc.finish()
    }
}

/// Open the source file and measure it
///
/// The returned handle is rewound to the start for streaming.
fn open_source(path: &Path) -> PrintResult<(File, u64)> {
    let inaccessible = |source| PrintError::FileInaccessible {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(inaccessible)?;
    let size = file.seek(SeekFrom::End(0)).map_err(inaccessible)?;
    file.rewind().map_err(inaccessible)?;

    Ok((file, size))
}
