//! Pagination and layout: projects a finalized block sequence into
//! per-page draw instructions for a fixed-size page.
//!
//! Geometry is US Letter at 72 units per inch with uniform one-inch
//! margins. All text is Courier, so width measurement reduces to column
//! counting. The pass is strictly forward and O(lines); previously
//! emitted pages are never revisited.

use screenwright_buffer::{Block, BlockType, TitlePage};
use unicode_width::UnicodeWidthStr;

// ==================== Geometry ====================

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;
pub const LINE_HEIGHT: f32 = 14.0;
pub const BODY_SIZE: f32 = 12.0;
pub const TITLE_SIZE: f32 = 24.0;

/// Courier advance width as a fraction of the font size.
const COURIER_ADVANCE: f32 = 0.6;

/// Baseline of the title on the title page.
const TITLE_Y: f32 = PAGE_HEIGHT - 252.0;

/// One line of a block after newline splitting, before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLine {
    pub text: String,
    pub kind: BlockType,
    pub bold: bool,
    pub size: f32,
}

/// One positioned text run on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
}

/// One page of draw instructions, in draw order.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub instructions: Vec<DrawInstruction>,
}

// ==================== Measurement ====================

/// Rendered width of `text` in Courier at `size`. Courier is monospace,
/// so width is the display column count times the fixed advance.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.width() as f32 * COURIER_ADVANCE * size
}

/// Horizontal placement for a body line, keyed by block kind.
pub fn line_x(line: &PageLine) -> f32 {
    match line.kind {
        BlockType::SceneHeading => (PAGE_WIDTH - text_width(&line.text, line.size)) / 2.0,
        BlockType::Character | BlockType::Parenthetical => MARGIN + 144.0,
        BlockType::Transition => PAGE_WIDTH - MARGIN - text_width(&line.text, line.size),
        BlockType::Dialogue | BlockType::Action | BlockType::Paragraph => MARGIN + 108.0,
    }
}

// ==================== Flattening ====================

/// True iff lines of this kind print bold.
pub fn is_bold(kind: BlockType) -> bool {
    matches!(
        kind,
        BlockType::Character | BlockType::SceneHeading | BlockType::Transition
    )
}

/// Projects blocks to lines: split on newlines, drop lines that are
/// blank after trimming. Every line inherits its block's kind and a
/// uniform size of 12; scene headings are not enlarged.
pub fn flatten(blocks: &[Block]) -> Vec<PageLine> {
    let mut lines = Vec::new();
    for block in blocks {
        for raw in block.text.split('\n') {
            if raw.trim().is_empty() {
                continue;
            }
            lines.push(PageLine {
                text: raw.to_string(),
                kind: block.kind,
                bold: is_bold(block.kind),
                size: BODY_SIZE,
            });
        }
    }
    lines
}

// ==================== Pagination ====================

/// Lays out the whole document. The title page is emitted first iff
/// `title_page` is given and it has a title or an author.
pub fn paginate(blocks: &[Block], title_page: Option<&TitlePage>) -> Vec<Page> {
    let mut pages = Vec::new();

    if let Some(tp) = title_page {
        if !tp.is_blank() {
            pages.push(layout_title_page(tp));
        }
    }

    let lines = flatten(blocks);
    if lines.is_empty() {
        return pages;
    }

    let mut page = Page::default();
    let mut cursor = PAGE_HEIGHT - MARGIN;
    for line in lines {
        if cursor - LINE_HEIGHT < MARGIN {
            pages.push(std::mem::take(&mut page));
            cursor = PAGE_HEIGHT - MARGIN;
        }
        let x = line_x(&line);
        page.instructions.push(DrawInstruction {
            text: line.text,
            x,
            y: cursor,
            size: line.size,
            bold: line.bold,
        });
        cursor -= LINE_HEIGHT;
    }
    pages.push(page);
    pages
}

fn centered(text: String, y: f32, size: f32, bold: bool) -> DrawInstruction {
    let x = (PAGE_WIDTH - text_width(&text, size)) / 2.0;
    DrawInstruction {
        text,
        x,
        y,
        size,
        bold,
    }
}

fn layout_title_page(tp: &TitlePage) -> Page {
    let mut page = Page::default();
    let mut y = TITLE_Y;

    if !tp.title.trim().is_empty() {
        page.instructions
            .push(centered(tp.title.to_uppercase(), y, TITLE_SIZE, true));
    }
    y -= 3.0 * LINE_HEIGHT;

    if !tp.author.trim().is_empty() {
        page.instructions
            .push(centered(format!("Written by {}", tp.author), y, BODY_SIZE, false));
        y -= 2.0 * LINE_HEIGHT;
    }

    if !tp.based_on.trim().is_empty() {
        page.instructions
            .push(centered(format!("Based on \"{}\"", tp.based_on), y, BODY_SIZE, false));
    }

    if !tp.contact.trim().is_empty() {
        page.instructions.push(DrawInstruction {
            text: tp.contact.clone(),
            x: MARGIN,
            y: MARGIN,
            size: BODY_SIZE,
            bold: false,
        });
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_lines(n: usize) -> Vec<Block> {
        (0..n)
            .map(|i| Block::new(BlockType::Action, format!("line {i}")))
            .collect()
    }

    #[test]
    fn test_flatten_splits_and_drops_blanks() {
        let blocks = vec![Block::new(BlockType::Action, "one\n\n  \ntwo")];
        let lines = flatten(&blocks);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "one");
        assert_eq!(lines[1].text, "two");
        assert!(!lines[0].bold);
        assert_eq!(lines[0].size, BODY_SIZE);
    }

    #[test]
    fn test_bold_kinds() {
        assert!(is_bold(BlockType::Character));
        assert!(is_bold(BlockType::SceneHeading));
        assert!(is_bold(BlockType::Transition));
        assert!(!is_bold(BlockType::Dialogue));
        assert!(!is_bold(BlockType::Action));
        assert!(!is_bold(BlockType::Paragraph));
    }

    #[test]
    fn test_courier_width() {
        // 10 columns at size 12: 10 * 0.6 * 12 = 72.
        assert_eq!(text_width("0123456789", 12.0), 72.0);
    }

    #[test]
    fn test_placement_table() {
        let mk = |kind, text: &str| PageLine {
            text: text.to_string(),
            kind,
            bold: is_bold(kind),
            size: BODY_SIZE,
        };
        assert_eq!(line_x(&mk(BlockType::Character, "WRITER")), MARGIN + 144.0);
        assert_eq!(line_x(&mk(BlockType::Parenthetical, "(soft)")), MARGIN + 144.0);
        assert_eq!(line_x(&mk(BlockType::Dialogue, "Hello.")), MARGIN + 108.0);
        assert_eq!(line_x(&mk(BlockType::Action, "x")), MARGIN + 108.0);
        assert_eq!(line_x(&mk(BlockType::Paragraph, "x")), MARGIN + 108.0);

        let heading = mk(BlockType::SceneHeading, "INT. ROOM - DAY");
        let w = text_width(&heading.text, BODY_SIZE);
        assert_eq!(line_x(&heading), (PAGE_WIDTH - w) / 2.0);

        let cut = mk(BlockType::Transition, "CUT TO:");
        let w = text_width(&cut.text, BODY_SIZE);
        assert_eq!(line_x(&cut), PAGE_WIDTH - MARGIN - w);
    }

    #[test]
    fn test_lines_per_page_is_floor_of_span() {
        // Usable span 648, line height 14: 46 lines fit.
        let per_page = ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT) as usize;
        assert_eq!(per_page, 46);

        let pages = paginate(&action_lines(46), None);
        assert_eq!(pages.len(), 1);
        let pages = paginate(&action_lines(47), None);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].instructions.len(), 1);
    }

    #[test]
    fn test_page_count_formula() {
        // pages == ceil(N / floor(S / lineHeight)) for assorted N.
        let per_page = 46usize;
        for n in [1, 45, 46, 47, 92, 93, 200] {
            let pages = paginate(&action_lines(n), None);
            assert_eq!(pages.len(), n.div_ceil(per_page), "N = {n}");
        }
    }

    #[test]
    fn test_vertical_cursor_positions() {
        let pages = paginate(&action_lines(3), None);
        let ys: Vec<f32> = pages[0].instructions.iter().map(|i| i.y).collect();
        assert_eq!(ys, vec![720.0, 706.0, 692.0]);
    }

    #[test]
    fn test_new_page_resets_cursor() {
        let pages = paginate(&action_lines(47), None);
        assert_eq!(pages[1].instructions[0].y, PAGE_HEIGHT - MARGIN);
    }

    #[test]
    fn test_one_page_scenario() {
        let blocks = vec![
            Block::new(BlockType::SceneHeading, "INT. ROOM - DAY"),
            Block::new(BlockType::Action, "A writer types."),
            Block::new(BlockType::Character, "WRITER"),
            Block::new(BlockType::Dialogue, "Hello."),
        ];
        let pages = paginate(&blocks, None);
        assert_eq!(pages.len(), 1);
        let ins = &pages[0].instructions;
        assert_eq!(ins.len(), 4);

        let heading = &ins[0];
        assert!(heading.bold);
        let w = text_width("INT. ROOM - DAY", BODY_SIZE);
        assert_eq!(heading.x, (PAGE_WIDTH - w) / 2.0);

        let cue = &ins[2];
        assert_eq!(cue.text, "WRITER");
        assert!(cue.bold);
        assert_eq!(cue.x, MARGIN + 144.0);

        let dialogue = &ins[3];
        assert_eq!(dialogue.text, "Hello.");
        assert!(!dialogue.bold);
        assert_eq!(dialogue.x, MARGIN + 108.0);
    }

    #[test]
    fn test_title_page_emitted_when_requested() {
        let tp = TitlePage {
            title: "the long goodbye".to_string(),
            author: "A. Writer".to_string(),
            contact: "agent@example.com".to_string(),
            based_on: String::new(),
        };
        let blocks = vec![Block::new(BlockType::Action, "x")];
        let pages = paginate(&blocks, Some(&tp));
        assert_eq!(pages.len(), 2);

        let title = &pages[0].instructions[0];
        assert_eq!(title.text, "THE LONG GOODBYE");
        assert!(title.bold);
        assert_eq!(title.size, TITLE_SIZE);
        let w = text_width("THE LONG GOODBYE", TITLE_SIZE);
        assert_eq!(title.x, (PAGE_WIDTH - w) / 2.0);

        let byline = &pages[0].instructions[1];
        assert_eq!(byline.text, "Written by A. Writer");
        assert_eq!(byline.size, BODY_SIZE);

        let contact = &pages[0].instructions[2];
        assert_eq!(contact.x, MARGIN);
        assert_eq!(contact.y, MARGIN);
    }

    #[test]
    fn test_blank_title_page_is_skipped() {
        let tp = TitlePage::default();
        let pages = paginate(&[Block::new(BlockType::Action, "x")], Some(&tp));
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_based_on_line_only_when_present() {
        let tp = TitlePage {
            title: "Title".to_string(),
            author: "Author".to_string(),
            contact: String::new(),
            based_on: "a novel".to_string(),
        };
        let pages = paginate(&[], Some(&tp));
        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0]
            .instructions
            .iter()
            .map(|i| i.text.as_str())
            .collect();
        assert!(texts.contains(&"Based on \"a novel\""));
    }

    #[test]
    fn test_empty_document_no_title_page() {
        assert!(paginate(&[], None).is_empty());
    }
}
