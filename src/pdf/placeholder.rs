use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};

/// Label stamped on every placeholder page.
pub const LABEL: &str = "Redacted";

/// Label font size in points.
const FONT_SIZE_PT: f32 = 40.0;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Render a one-page PDF of the given size (in points) with the label
/// centered on it, horizontally by measured string width and with the
/// baseline at mid-height. Returns the serialized document for re-loading
/// with lopdf.
///
/// printpdf pages are sized in millimetres, so the emitted MediaBox can be
/// off by a rounding hair; the graft step overwrites it with the exact
/// source-page box.
pub fn render(width_pt: f32, height_pt: f32) -> Vec<u8> {
    let label_width = text_width(LABEL, FONT_SIZE_PT);
    let cursor = Point {
        x: Pt((width_pt - label_width) / 2.0),
        y: Pt(height_pt / 2.0),
    };

    let ops = vec![
        Op::StartTextSection,
        Op::SetTextCursor { pos: cursor },
        Op::SetFontSizeBuiltinFont {
            size: Pt(FONT_SIZE_PT),
            font: BuiltinFont::Helvetica,
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(LABEL.to_string())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
    ];

    let mut doc = PdfDocument::new(LABEL);
    let page = PdfPage::new(Mm(width_pt * MM_PER_PT), Mm(height_pt * MM_PER_PT), ops);
    doc.with_pages(vec![page]);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    doc.save(&PdfSaveOptions::default(), &mut warnings)
}

/// Width of `text` set in Helvetica at `size` points.
fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(advance_units).sum();
    units as f32 / 1000.0 * size
}

/// Standard Helvetica AFM advance width, in thousandths of the font size.
fn advance_units(ch: char) -> u32 {
    match ch {
        'i' | 'j' | 'l' => 222,
        ' ' | 'f' | 't' | 'I' => 278,
        'r' => 333,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'L' => 556,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        'W' => 944,
        // digits, the round lowercase letters, and anything unlisted
        _ => 556,
    }
}
