// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document Structuring Conventions (DSC) scanner.
//
// Splits a PostScript program into prolog, page sections and trailer, and
// collects the header comments the viewer needs (page count, bounding boxes,
// title, creator, author, creation date). The PostScript itself is never
// interpreted. Comments inside %%BeginDocument/%%EndDocument blocks belong
// to embedded files and are skipped.

use std::ops::Range;

use psview_core::{BackendCause, DocumentMetadata, PageSize, RenderError};
use thiserror::Error;

/// Magic number at the start of a DOS EPS binary file.
const DOS_EPS_MAGIC: [u8; 4] = [0xC5, 0xD0, 0xD3, 0xC6];

/// Length of the DOS EPS binary header.
const DOS_EPS_HEADER_LEN: usize = 30;

/// Failures while locating the PostScript program in a file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DscError {
    #[error("not a PostScript document")]
    NotPostScript,

    #[error("truncated DOS EPS header")]
    TruncatedHeader,

    #[error("DOS EPS PostScript section {offset}+{length} exceeds file size {file_len}")]
    SectionOutOfBounds {
        offset: usize,
        length: usize,
        file_len: usize,
    },
}

impl From<DscError> for RenderError {
    fn from(err: DscError) -> Self {
        let cause = match err {
            DscError::NotPostScript => BackendCause::NotPostScript,
            DscError::TruncatedHeader | DscError::SectionOutOfBounds { .. } => BackendCause::Other,
        };
        RenderError::backend_with(cause, err.to_string())
    }
}

/// Return the PostScript program contained in `data`.
///
/// Plain PostScript must start with `%!` (after any leading Ctrl-D). DOS EPS
/// binaries are unwrapped using the offsets in their header.
pub fn extract_postscript(data: &[u8]) -> Result<&[u8], DscError> {
    if data.starts_with(&DOS_EPS_MAGIC) {
        if data.len() < DOS_EPS_HEADER_LEN {
            return Err(DscError::TruncatedHeader);
        }
        let offset = read_u32_le(&data[4..8]) as usize;
        let length = read_u32_le(&data[8..12]) as usize;
        let end = offset.checked_add(length).filter(|end| *end <= data.len());
        return match end {
            Some(end) => Ok(&data[offset..end]),
            None => Err(DscError::SectionOutOfBounds {
                offset,
                length,
                file_len: data.len(),
            }),
        };
    }

    let start = data.iter().take_while(|b| **b == 0x04).count();
    if data[start..].starts_with(b"%!") {
        Ok(&data[start..])
    } else {
        Err(DscError::NotPostScript)
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// A DSC bounding box in default user space (points).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub llx: i32,
    pub lly: i32,
    pub urx: i32,
    pub ury: i32,
}

impl BoundingBox {
    /// Page size covered by the box. Degenerate boxes yield `None`.
    pub fn page_size(&self) -> Option<PageSize> {
        let width = self.urx.checked_sub(self.llx)?;
        let height = self.ury.checked_sub(self.lly)?;
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(PageSize::new(width as u32, height as u32))
    }

    fn parse(value: &str) -> Option<Self> {
        let numbers: Vec<f64> = value
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        let [llx, lly, urx, ury] = numbers[..] else {
            return None;
        };
        Some(Self {
            llx: llx.floor() as i32,
            lly: lly.floor() as i32,
            urx: urx.ceil() as i32,
            ury: ury.ceil() as i32,
        })
    }
}

/// One `%%Page:` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DscPage {
    /// Page label as written (e.g. "iv" or "3").
    pub label: String,
    /// Byte range of the section, from its `%%Page:` line to the next section.
    pub range: Range<usize>,
    pub bounding_box: Option<BoundingBox>,
}

/// Structure of a scanned PostScript program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DscDocument {
    /// Everything before the first page: header, prolog and setup.
    pub prolog: Range<usize>,
    pub pages: Vec<DscPage>,
    /// From `%%Trailer` to the end of the program (empty when absent).
    pub trailer: Range<usize>,
    /// Declared `%%Pages:` count, if any.
    pub declared_pages: Option<u32>,
    pub bounding_box: Option<BoundingBox>,
    pub metadata: DocumentMetadata,
    /// End of the last top-level `%%EOF` line, or the end of the input.
    pub program_end: usize,
}

impl DscDocument {
    /// Number of pages the viewer shows. A program without page structure
    /// counts as one page.
    pub fn page_count(&self) -> usize {
        self.pages.len().max(1)
    }

    /// Standalone program that draws page `index`: prolog, the page section
    /// and the trailer. A document without page sections is returned whole.
    pub fn page_program(&self, program: &[u8], index: usize) -> Option<Vec<u8>> {
        if self.pages.is_empty() {
            return (index == 0).then(|| program[..self.program_end].to_vec());
        }
        let page = self.pages.get(index)?;
        let mut job =
            Vec::with_capacity(self.prolog.len() + page.range.len() + self.trailer.len());
        job.extend_from_slice(&program[self.prolog.clone()]);
        job.extend_from_slice(&program[page.range.clone()]);
        job.extend_from_slice(&program[self.trailer.clone()]);
        Some(job)
    }

    /// Bounding box used to place page `index`: the page's own box, else the
    /// document box.
    pub fn page_box(&self, index: usize) -> Option<BoundingBox> {
        self.pages
            .get(index)
            .and_then(|page| page.bounding_box)
            .or(self.bounding_box)
    }

    /// Natural size of page `index`, falling back to US Letter.
    pub fn page_size(&self, index: usize) -> PageSize {
        self.page_box(index)
            .and_then(|bbox| bbox.page_size())
            .unwrap_or(PageSize::LETTER)
    }
}

/// Header values that may be deferred to the trailer with `(atend)`.
#[derive(Default)]
struct Deferred {
    pages: bool,
    bounding_box: bool,
    title: bool,
    creator: bool,
    author: bool,
    creation_date: bool,
}

/// Scan a PostScript program.
pub fn parse(program: &[u8]) -> DscDocument {
    let mut doc = DscDocument::default();
    let mut deferred = Deferred::default();
    let mut nesting = 0usize;
    let mut in_trailer = false;
    let mut trailer_start: Option<usize> = None;
    let mut header_closed = false;
    let mut program_end = program.len();

    for (offset, line, next) in lines(program) {
        if !line.starts_with(b"%%") {
            continue;
        }
        let text = String::from_utf8_lossy(line);
        let (keyword, value) = split_comment(&text);

        match keyword {
            "%%BeginDocument" => {
                nesting += 1;
                continue;
            }
            "%%EndDocument" => {
                nesting = nesting.saturating_sub(1);
                continue;
            }
            _ if nesting > 0 => continue,
            _ => {}
        }

        let in_header = !in_trailer && !header_closed && doc.pages.is_empty();
        match keyword {
            "%%EndComments" => header_closed = true,
            "%%EOF" => program_end = next,
            "%%Page" => {
                close_last_page(&mut doc, offset);
                in_trailer = false;
                doc.pages.push(DscPage {
                    label: page_label(value),
                    range: offset..program.len(),
                    bounding_box: None,
                });
            }
            "%%PageBoundingBox" => {
                if let Some(page) = doc.pages.last_mut() {
                    page.bounding_box = BoundingBox::parse(value);
                }
            }
            "%%Trailer" => {
                close_last_page(&mut doc, offset);
                in_trailer = true;
                trailer_start = Some(offset);
            }
            "%%Pages" if header_slot(in_header, in_trailer, deferred.pages) => {
                if is_atend(value) {
                    deferred.pages = true;
                } else {
                    doc.declared_pages = value.split_whitespace().next().and_then(|v| v.parse().ok());
                    deferred.pages = false;
                }
            }
            "%%BoundingBox" if header_slot(in_header, in_trailer, deferred.bounding_box) => {
                if is_atend(value) {
                    deferred.bounding_box = true;
                } else {
                    doc.bounding_box = BoundingBox::parse(value);
                    deferred.bounding_box = false;
                }
            }
            "%%Title" if header_slot(in_header, in_trailer, deferred.title) => {
                assign_text(&mut doc.metadata.title, &mut deferred.title, value);
            }
            "%%Creator" if header_slot(in_header, in_trailer, deferred.creator) => {
                assign_text(&mut doc.metadata.creator, &mut deferred.creator, value);
            }
            "%%For" if header_slot(in_header, in_trailer, deferred.author) => {
                assign_text(&mut doc.metadata.author, &mut deferred.author, value);
            }
            "%%CreationDate" if header_slot(in_header, in_trailer, deferred.creation_date) => {
                assign_text(
                    &mut doc.metadata.creation_date,
                    &mut deferred.creation_date,
                    value,
                );
            }
            _ => {}
        }
    }

    // Bytes after the last %%EOF are not part of the program.
    close_last_page(&mut doc, program_end);
    let first_page = doc.pages.first().map(|page| page.range.start);
    let prolog_end = first_page.or(trailer_start).unwrap_or(program_end);
    doc.prolog = 0..prolog_end;
    doc.trailer = trailer_start.map_or(program_end..program_end, |start| start..program_end);
    doc.program_end = program_end;
    doc
}

/// Header comments count up to %%EndComments (or the first page), and in the
/// trailer when the header deferred them with `(atend)`.
fn header_slot(in_header: bool, in_trailer: bool, deferred: bool) -> bool {
    if in_trailer { deferred } else { in_header }
}

fn close_last_page(doc: &mut DscDocument, end: usize) {
    if let Some(page) = doc.pages.last_mut()
        && page.range.end > end
    {
        page.range.end = end;
    }
}

fn assign_text(slot: &mut Option<String>, deferred: &mut bool, value: &str) {
    if is_atend(value) {
        *deferred = true;
        return;
    }
    if slot.is_none() || *deferred {
        *slot = Some(unwrap_text(value));
    }
    *deferred = false;
}

fn is_atend(value: &str) -> bool {
    value.trim() == "(atend)"
}

/// Strip one pair of enclosing parentheses from a DSC text value.
fn unwrap_text(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(trimmed)
        .to_string()
}

/// `%%Page: label ordinal` → label, with parentheses removed.
fn page_label(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(rest) = trimmed.strip_prefix('(')
        && let Some(close) = rest.find(')')
    {
        return rest[..close].to_string();
    }
    trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Split `%%Keyword: value` into its keyword and value.
fn split_comment(text: &str) -> (&str, &str) {
    match text.find(':') {
        Some(colon) => (text[..colon].trim_end(), text[colon + 1..].trim()),
        None => (text.trim_end(), ""),
    }
}

/// Iterate lines as (start offset, content, offset of the next line).
/// Accepts LF, CR and CRLF line endings.
fn lines(data: &[u8]) -> impl Iterator<Item = (usize, &[u8], usize)> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        if offset >= data.len() {
            return None;
        }
        let start = offset;
        let rest = &data[start..];
        let end = rest
            .iter()
            .position(|b| *b == b'\n' || *b == b'\r')
            .unwrap_or(rest.len());
        let mut next = start + end;
        if next < data.len() {
            if data[next] == b'\r' && data.get(next + 1) == Some(&b'\n') {
                next += 2;
            } else {
                next += 1;
            }
        }
        offset = next;
        Some((start, &rest[..end], next))
    })
}
