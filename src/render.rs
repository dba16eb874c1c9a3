//! PDF renderer – takes a [`Document`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).
//!
//! Any failure here invalidates the whole document and is returned as
//! [`RenderError::Serialization`].

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    TextItem, XObjectId, XObjectTransform,
};

use crate::document::{Document, DrawOp};
use crate::error::{RenderError, Result};
use crate::fonts::{char_to_winansi, FontFace};

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352778;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageXObject {
    id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a [`Document`] into PDF bytes.
pub fn render_pdf(document: &Document) -> Result<Vec<u8>> {
    let page_w = Mm(document.page_width_pt * PT_TO_MM);
    let page_h = Mm(document.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&document.title);

    // ── Register image resources ──────────────────────────────────────────
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let mut xobjects = Vec::with_capacity(document.images.len());
    for image in &document.images {
        let raw = RawImage::decode_from_bytes(&image.bytes, &mut warnings).map_err(|e| {
            RenderError::Serialization(format!("cannot encode image {}: {e}", image.src))
        })?;
        xobjects.push(ImageXObject {
            id: doc.add_image(&raw),
            px_width: image.width_px,
            px_height: image.height_px,
        });
    }
    if !warnings.is_empty() {
        log::debug!("printpdf reported {} image warnings", warnings.len());
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::with_capacity(document.pages.len());
    for (index, page) in document.pages.iter().enumerate() {
        let mut ops = Vec::new();
        for op in &page.ops {
            render_op(&mut ops, op, &xobjects).map_err(|e| match e {
                RenderError::Serialization(msg) => {
                    RenderError::Serialization(format!("page {}: {msg}", index + 1))
                }
                other => other,
            })?;
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    if !bytes.starts_with(b"%PDF-") {
        return Err(RenderError::Serialization(
            "encoder produced no PDF header".to_string(),
        ));
    }
    Ok(bytes)
}

fn builtin_font(face: FontFace) -> BuiltinFont {
    match face {
        FontFace::Regular => BuiltinFont::Helvetica,
        FontFace::Bold => BuiltinFont::HelveticaBold,
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winansi(s: &str) -> String {
    let bytes: Vec<u8> = s.chars().map(char_to_winansi).collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0xFF; printpdf passes these
    // bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn render_op(ops: &mut Vec<Op>, op: &DrawOp, xobjects: &[ImageXObject]) -> Result<()> {
    match op {
        DrawOp::PlaceText {
            x,
            y,
            font,
            size,
            text,
        } => {
            // `y` is the top of the line box; the baseline sits one ascent below.
            let baseline = y - font.ascent(*size);
            let font = builtin_font(*font);
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(*x),
                    y: Pt(baseline),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(*size),
                font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winansi(text))],
                font,
            });
            ops.push(Op::EndTextSection);
        }
        DrawOp::PlaceImage {
            x,
            y,
            width,
            height,
            image,
        } => {
            let res = xobjects.get(image.0).ok_or_else(|| {
                RenderError::Serialization(format!("unknown image resource #{}", image.0))
            })?;

            // At dpi=72 printpdf renders 1 px = 1 pt, so
            // scale = desired_pt / px_dim.
            let scale_x = width / res.px_width.max(1) as f32;
            let scale_y = height / res.px_height.max(1) as f32;

            ops.push(Op::UseXobject {
                id: res.id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(*x)),
                    translate_y: Some(Pt(y - height)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }
    Ok(())
}
