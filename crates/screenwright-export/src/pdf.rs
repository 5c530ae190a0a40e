//! PDF rendering of paginated draw instructions.
//!
//! One content stream per page, Courier and Courier-Bold as built-in
//! Type1 fonts with WinAnsi encoding. Characters outside WinAnsi are
//! replaced with `?`; this renderer targets plain screenplay text, not
//! arbitrary Unicode.

use std::path::Path;

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use tracing::info;

use crate::layout::{Page, PAGE_HEIGHT, PAGE_WIDTH};
use crate::{ExportError, ExportResult};

const FONT_REGULAR: Name = Name(b"F0");
const FONT_BOLD: Name = Name(b"F1");

/// Renders pages to an in-memory PDF document.
pub fn render(pages: &[Page]) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();

    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();
    let content_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);

    pdf.type1_font(regular_id)
        .base_font(Name(b"Courier"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Courier-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    for ((page, &page_id), &content_id) in pages.iter().zip(&page_ids).zip(&content_ids) {
        let mut writer = pdf.page(page_id);
        writer
            .parent(page_tree_id)
            .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .contents(content_id);
        writer
            .resources()
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id);
        writer.finish();

        let mut content = Content::new();
        for ins in &page.instructions {
            let font = if ins.bold { FONT_BOLD } else { FONT_REGULAR };
            content.begin_text();
            content.set_font(font, ins.size);
            content.next_line(ins.x, ins.y);
            content.show(Str(&encode_win_ansi(&ins.text)));
            content.end_text();
        }
        pdf.stream(content_id, &content.finish());
    }

    pdf.finish()
}

/// Renders and writes atomically: the bytes land in a sibling temp file
/// which is renamed over the target, so a crash never leaves a truncated
/// PDF behind.
pub fn write_pdf(path: impl AsRef<Path>, pages: &[Page]) -> ExportResult<()> {
    let path = path.as_ref();
    let bytes = render(pages);

    let tmp = path.with_extension("pdf.tmp");
    std::fs::write(&tmp, &bytes).map_err(|source| ExportError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), pages = pages.len(), "exported PDF");
    Ok(())
}

/// Maps text to WinAnsi bytes, substituting `?` for anything the
/// encoding cannot express.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E => c as u8,
            0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}
