// winprint/tests/print_service.rs
// Print service against a recording backend

use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;
use winprint::{
    DeviceContext, DeviceError, DocumentInfo, FontSpec, JobStage, Overflow, PrintBackend,
    PrintConfig, PrintError, PrintErrorKind, PrintService,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateContext(String),
    StartDoc(DocumentInfo),
    StartPage,
    SelectFont(FontSpec),
    Draw { x: i32, y: i32, text: String },
    EndPage,
    EndDoc,
    AbortDoc,
    ReleaseFont,
    ReleaseContext,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fail {
    Lookup,
    NoDefault,
    CreateContext,
    StartDoc,
    StartPage,
    SelectFont,
    Draw(usize),
    EndPage,
    EndDoc,
}

type Log = Rc<RefCell<Vec<Call>>>;

#[derive(Default)]
struct RecordingBackend {
    log: Log,
    fail: Option<Fail>,
    page_height: Option<i32>,
}

impl RecordingBackend {
    fn failing(fail: Fail) -> Self {
        Self {
            fail: Some(fail),
            ..Default::default()
        }
    }
}

struct RecordingContext {
    log: Log,
    fail: Option<Fail>,
    draws: usize,
    page_height: Option<i32>,
}

struct RecordingFont {
    log: Log,
}

impl Drop for RecordingFont {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::ReleaseFont);
    }
}

impl Drop for RecordingContext {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Call::ReleaseContext);
    }
}

impl PrintBackend for RecordingBackend {
    type Context = RecordingContext;

    fn default_device(&self) -> Result<Option<String>, DeviceError> {
        match self.fail {
            Some(Fail::Lookup) => Err(DeviceError::new("GetDefaultPrinter", "spooler stopped")),
            Some(Fail::NoDefault) => Ok(None),
            _ => Ok(Some("Mock Printer".to_string())),
        }
    }

    fn create_context(&self, device: &str) -> Result<Self::Context, DeviceError> {
        if self.fail == Some(Fail::CreateContext) {
            return Err(DeviceError::new("CreateDC", "driver fault"));
        }
        self.log
            .borrow_mut()
            .push(Call::CreateContext(device.to_string()));
        Ok(RecordingContext {
            log: self.log.clone(),
            fail: self.fail,
            draws: 0,
            page_height: self.page_height,
        })
    }
}

impl RecordingContext {
    fn check(&self, step: Fail, operation: &'static str) -> Result<(), DeviceError> {
        if self.fail == Some(step) {
            return Err(DeviceError::new(operation, "injected"));
        }
        Ok(())
    }

    fn push(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl DeviceContext for RecordingContext {
    type Font = RecordingFont;

    fn start_document(&mut self, doc: &DocumentInfo) -> Result<(), DeviceError> {
        self.check(Fail::StartDoc, "StartDoc")?;
        self.push(Call::StartDoc(doc.clone()));
        Ok(())
    }

    fn start_page(&mut self) -> Result<(), DeviceError> {
        self.check(Fail::StartPage, "StartPage")?;
        self.push(Call::StartPage);
        Ok(())
    }

    fn select_font(&mut self, spec: &FontSpec) -> Result<Self::Font, DeviceError> {
        self.check(Fail::SelectFont, "CreateFont")?;
        self.push(Call::SelectFont(spec.clone()));
        Ok(RecordingFont {
            log: self.log.clone(),
        })
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &[u16]) -> Result<(), DeviceError> {
        self.check(Fail::Draw(self.draws), "TextOut")?;
        self.draws += 1;
        self.push(Call::Draw {
            x,
            y,
            text: String::from_utf16_lossy(text),
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), DeviceError> {
        self.check(Fail::EndPage, "EndPage")?;
        self.push(Call::EndPage);
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), DeviceError> {
        self.check(Fail::EndDoc, "EndDoc")?;
        self.push(Call::EndDoc);
        Ok(())
    }

    fn abort_document(&mut self) {
        self.push(Call::AbortDoc);
    }

    fn printable_height(&self) -> Option<i32> {
        self.page_height
    }
}

fn setup(content: &[u8]) -> (TempDir, PrintConfig) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("To Print.txt"), content).unwrap();
    let config = PrintConfig::default()
        .with_base_dir(dir.path())
        .with_encoding(encoding_rs::UTF_8)
        .unwrap();
    (dir, config)
}

fn calls(log: &Log) -> Vec<Call> {
    log.borrow().clone()
}

fn count(log: &Log, pred: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|c| pred(*c)).count()
}

fn draws(log: &Log) -> Vec<(i32, i32, String)> {
    log.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Draw { x, y, text } => Some((*x, *y, text.clone())),
            _ => None,
        })
        .collect()
}

fn assert_balanced(log: &Log) {
    let fonts = count(log, |c| matches!(c, Call::SelectFont(_)));
    let fonts_released = count(log, |c| *c == Call::ReleaseFont);
    let contexts = count(log, |c| matches!(c, Call::CreateContext(_)));
    let contexts_released = count(log, |c| *c == Call::ReleaseContext);
    assert_eq!(fonts, fonts_released, "font handles leaked: {:?}", calls(log));
    assert_eq!(
        contexts,
        contexts_released,
        "device contexts leaked: {:?}",
        calls(log)
    );
}

#[test]
fn test_full_job_lifecycle() {
    let (_dir, config) = setup(b"alpha\r\nbeta\ngamma");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();
    let service = PrintService::new(backend, config);

    service.print_file("To Print.txt").unwrap();

    let font = FontSpec::default();
    assert_eq!(
        calls(&log),
        vec![
            Call::CreateContext("Mock Printer".to_string()),
            Call::StartDoc(DocumentInfo {
                name: "To Print.txt".to_string(),
                size_hint: 17,
            }),
            Call::StartPage,
            Call::SelectFont(font),
            Call::Draw {
                x: 0,
                y: 0,
                text: "alpha".to_string()
            },
            Call::Draw {
                x: 0,
                y: 96,
                text: "beta".to_string()
            },
            Call::Draw {
                x: 0,
                y: 192,
                text: "gamma".to_string()
            },
            Call::ReleaseFont,
            Call::EndPage,
            Call::EndDoc,
            Call::ReleaseContext,
        ]
    );
}

#[test]
fn test_empty_file_prints_blank_page() {
    let (_dir, config) = setup(b"");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    assert!(draws(&log).is_empty());
    assert_eq!(count(&log, |c| *c == Call::EndDoc), 1);
    assert_balanced(&log);
}

#[test]
fn test_blank_lines_are_skipped_but_advance() {
    let (_dir, config) = setup(b"one\n\r\n\nfour\n");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    assert_eq!(
        draws(&log),
        vec![(0, 0, "one".to_string()), (0, 288, "four".to_string())]
    );
}

#[test]
fn test_ascii_lines_round_trip() {
    let lines = ["first line", "  indented", "tab\there", "last"];
    let content = lines.join("\r\n") + "\r\n";
    let (_dir, config) = setup(content.as_bytes());
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    let drawn: Vec<String> = draws(&log).into_iter().map(|(_, _, t)| t).collect();
    assert_eq!(drawn, lines);
    let offsets: Vec<i32> = draws(&log).into_iter().map(|(_, y, _)| y).collect();
    assert_eq!(offsets, vec![0, 96, 192, 288]);
}

#[test]
fn test_missing_file_acquires_no_device() {
    let (_dir, config) = setup(b"x");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    let err = PrintService::new(backend, config)
        .print_file("missing.txt")
        .unwrap_err();

    assert_eq!(err.kind(), PrintErrorKind::FileInaccessible);
    assert_eq!(err.to_string(), "Error: Unable to access print file.");
    assert!(calls(&log).is_empty());
}

#[test]
fn test_no_default_device() {
    let (_dir, config) = setup(b"x");
    let backend = RecordingBackend::failing(Fail::NoDefault);
    let log = backend.log.clone();

    let err = PrintService::new(backend, config).print_default().unwrap_err();

    assert!(matches!(err, PrintError::NoDefaultDevice));
    assert_eq!(err.to_string(), "Error: There is no default printer.");
    assert!(calls(&log).is_empty());
}

#[test]
fn test_device_lookup_failure_is_distinct() {
    let (_dir, config) = setup(b"x");
    let backend = RecordingBackend::failing(Fail::Lookup);
    let log = backend.log.clone();

    let err = PrintService::new(backend, config).print_default().unwrap_err();

    assert_eq!(err.kind(), PrintErrorKind::DeviceLookupFailed);
    assert_eq!(err.to_string(), "Error: Unable to find default printer name.");
    assert!(calls(&log).is_empty());
}

#[test]
fn test_device_unavailable() {
    let (_dir, config) = setup(b"x");
    let backend = RecordingBackend::failing(Fail::CreateContext);
    let log = backend.log.clone();

    let err = PrintService::new(backend, config).print_default().unwrap_err();

    match err {
        PrintError::DeviceUnavailable { ref device, .. } => assert_eq!(device, "Mock Printer"),
        ref other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.to_string(), "Error: Unable to find printer.");
    assert!(calls(&log).is_empty());
}

#[test]
fn test_start_doc_failure_releases_context() {
    let (_dir, config) = setup(b"x\n");
    let backend = RecordingBackend::failing(Fail::StartDoc);
    let log = backend.log.clone();

    let err = PrintService::new(backend, config).print_default().unwrap_err();

    assert_eq!(err.kind(), PrintErrorKind::JobCreationFailed);
    assert_eq!(err.to_string(), "Error: Could not create print job.");
    assert_eq!(
        calls(&log),
        vec![
            Call::CreateContext("Mock Printer".to_string()),
            Call::ReleaseContext,
        ]
    );
}

#[test]
fn test_failures_after_start_release_everything() {
    let cases = [
        (Fail::StartPage, JobStage::StartPage, 1),
        (Fail::SelectFont, JobStage::Draw, 1),
        (Fail::Draw(1), JobStage::Draw, 1),
        (Fail::EndPage, JobStage::EndPage, 1),
        (Fail::EndDoc, JobStage::EndDocument, 0),
    ];

    for (fail, expected_stage, aborts) in cases {
        let (_dir, config) = setup(b"one\ntwo\nthree\n");
        let backend = RecordingBackend::failing(fail);
        let log = backend.log.clone();

        let err = PrintService::new(backend, config).print_default().unwrap_err();

        match &err {
            PrintError::JobIncomplete { stage, .. } => assert_eq!(*stage, expected_stage),
            other => panic!("{:?}: unexpected error {:?}", fail, other),
        }
        assert_eq!(err.to_string(), "Error: Could not complete print job.");
        assert_balanced(&log);
        assert_eq!(
            count(&log, |c| *c == Call::AbortDoc),
            aborts,
            "{:?}: {:?}",
            fail,
            calls(&log)
        );
        assert_eq!(calls(&log).last(), Some(&Call::ReleaseContext));
    }
}

#[test]
fn test_draw_failure_release_order() {
    let (_dir, config) = setup(b"one\ntwo\n");
    let backend = RecordingBackend::failing(Fail::Draw(1));
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap_err();

    let tail: Vec<Call> = calls(&log).into_iter().rev().take(3).rev().collect();
    assert_eq!(
        tail,
        vec![Call::ReleaseFont, Call::AbortDoc, Call::ReleaseContext]
    );
    assert_eq!(draws(&log).len(), 1);
}

#[test]
fn test_malformed_bytes_are_substituted() {
    let (_dir, config) = setup(b"caf\xff\nok\n");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    assert_eq!(
        draws(&log),
        vec![
            (0, 0, "caf\u{FFFD}".to_string()),
            (0, 96, "ok".to_string())
        ]
    );
}

#[test]
fn test_legacy_code_page_input() {
    let (_dir, config) = setup(b"caf\xe9\n");
    let config = config.with_encoding(encoding_rs::WINDOWS_1252).unwrap();
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    assert_eq!(draws(&log), vec![(0, 0, "café".to_string())]);
}

#[test]
fn test_utf8_byte_order_mark_is_not_drawn() {
    let (_dir, config) = setup(b"\xEF\xBB\xBFhello\n\xEF\xBB\xBFsecond\n");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    // Only a leading mark is dropped; a later one is ordinary text
    assert_eq!(
        draws(&log),
        vec![
            (0, 0, "hello".to_string()),
            (0, 96, "\u{FEFF}second".to_string())
        ]
    );
}

#[test]
fn test_bom_only_line_is_blank() {
    let (_dir, config) = setup(b"\xEF\xBB\xBF\r\nnext\r\n");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    assert_eq!(draws(&log), vec![(0, 96, "next".to_string())]);
}

#[test]
fn test_single_page_overflows_by_default() {
    let (_dir, config) = setup(b"1\n2\n3\n4\n5\n");
    let backend = RecordingBackend {
        page_height: Some(200),
        ..Default::default()
    };
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    let offsets: Vec<i32> = draws(&log).into_iter().map(|(_, y, _)| y).collect();
    assert_eq!(offsets, vec![0, 96, 192, 288, 384]);
    assert_eq!(count(&log, |c| *c == Call::StartPage), 1);
}

#[test]
fn test_new_page_overflow_breaks_pages() {
    let (_dir, config) = setup(b"1\n2\n3\n4\n5\n");
    let config = config.with_overflow(Overflow::NewPage);
    let backend = RecordingBackend {
        page_height: Some(200),
        ..Default::default()
    };
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    let offsets: Vec<i32> = draws(&log).into_iter().map(|(_, y, _)| y).collect();
    assert_eq!(offsets, vec![0, 96, 0, 96, 0]);
    assert_eq!(count(&log, |c| *c == Call::StartPage), 3);
    assert_eq!(count(&log, |c| *c == Call::EndPage), 3);
    assert_eq!(count(&log, |c| *c == Call::EndDoc), 1);
    assert_balanced(&log);
}

#[test]
fn test_margins_offset_lines() {
    let (_dir, config) = setup(b"a\nb\n");
    let config = config.with_margins(50, 20);
    let backend = RecordingBackend::default();
    let log = backend.log.clone();

    PrintService::new(backend, config).print_default().unwrap();

    assert_eq!(
        draws(&log),
        vec![(50, 20, "a".to_string()), (50, 116, "b".to_string())]
    );
}

#[test]
fn test_sequential_jobs_are_independent() {
    let (_dir, config) = setup(b"a\n");
    let backend = RecordingBackend::default();
    let log = backend.log.clone();
    let service = PrintService::new(backend, config);

    service.print_default().unwrap();
    service.print_default().unwrap();

    assert_eq!(count(&log, |c| *c == Call::ReleaseContext), 2);
    let offsets: Vec<i32> = draws(&log).into_iter().map(|(_, y, _)| y).collect();
    assert_eq!(offsets, vec![0, 0]);
    assert_balanced(&log);
}
