//! Integration tests for the article-pdf pipeline.
//!
//! These tests validate:
//! - Draw ops land at the expected positions
//! - Page counts follow the pagination rule and are deterministic
//! - Image failures degrade a single node, not the document
//! - PDF output exists and has valid format

use std::io::Cursor;

use sha2::{Digest, Sha256};

use article_pdf::content::ContentNode;
use article_pdf::document::{Document, DrawOp};
use article_pdf::fonts::{wrap_text, FontFace};
use article_pdf::pagination::{Margins, PageGeometry};
use article_pdf::pipeline::{compute_document, generate_pdf_from_html, render_nodes, RenderConfig};
use article_pdf::render::render_pdf;
use article_pdf::style::PARAGRAPH;
use article_pdf::templates;

// =====================================================================
// Helpers
// =====================================================================

fn offline(src: &str) -> Result<Vec<u8>, String> {
    Err(format!("no network in tests: {src}"))
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

/// Thirty-five words that wrap to exactly three lines at 12pt on A4 with 50pt
/// margins.
fn three_line_paragraph() -> ContentNode {
    ContentNode::paragraph("lorem ".repeat(35))
}

fn text_ops(doc: &Document) -> Vec<(usize, &DrawOp)> {
    doc.pages
        .iter()
        .enumerate()
        .flat_map(|(i, p)| p.ops.iter().map(move |op| (i, op)))
        .filter(|(_, op)| matches!(op, DrawOp::PlaceText { .. }))
        .collect()
}

fn layout_digest(doc: &Document) -> String {
    let json = doc.to_json().unwrap();
    let digest = Sha256::digest(json.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// =====================================================================
// End-to-end scenarios
// =====================================================================

#[test]
fn single_paragraph_lands_at_top_margin() {
    let config = RenderConfig {
        page_width: 600.0,
        ..RenderConfig::default()
    };
    let nodes = vec![ContentNode::paragraph("Hello world")];
    let (bytes, doc) = render_nodes(&nodes, &config, &offline).unwrap();

    assert_valid_pdf(&bytes);
    assert_eq!(config.geometry().content_width(), 500.0);
    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.op_count(), 1);
    match &doc.pages[0].ops[0] {
        DrawOp::PlaceText {
            x,
            y,
            font,
            size,
            text,
        } => {
            assert_eq!(*x, 50.0);
            assert_eq!(*y, config.page_height - 50.0);
            assert_eq!(*font, FontFace::Regular);
            assert_eq!(*size, 12.0);
            assert_eq!(text, "Hello world");
        }
        other => panic!("unexpected op {other:?}"),
    }
}

#[test]
fn fifty_three_line_paragraphs_paginate_deterministically() {
    let config = RenderConfig::default();
    let geometry = config.geometry();
    let nodes: Vec<ContentNode> = (0..50).map(|_| three_line_paragraph()).collect();

    let per_paragraph = 3.0 * PARAGRAPH.line_height() + PARAGRAPH.spacing_after;
    let per_page = (geometry.printable_height() / per_paragraph).floor() as usize;
    assert_eq!(per_page, 15);
    let expected_pages = nodes.len().div_ceil(per_page);

    let first = compute_document(&nodes, &config, &offline);
    assert_eq!(first.pages.len(), expected_pages);
    assert_eq!(first.pages.len(), 4);
    assert_eq!(first.op_count(), 150);
    assert_eq!(first.pages[0].ops.len(), 45);
    assert_eq!(first.pages[3].ops.len(), 15);

    let second = compute_document(&nodes, &config, &offline);
    assert_eq!(second.pages.len(), first.pages.len());
    assert_eq!(layout_digest(&first), layout_digest(&second));
}

#[test]
fn failed_image_fetch_is_skipped() {
    let nodes = vec![
        ContentNode::heading(1, "Title").unwrap(),
        ContentNode::image("https://example.com/broken.png"),
        ContentNode::paragraph("Still rendered"),
    ];
    let (bytes, doc) = render_nodes(&nodes, &RenderConfig::default(), &offline).unwrap();
    assert_valid_pdf(&bytes);

    assert!(doc.images.is_empty());
    let texts: Vec<&str> = text_ops(&doc)
        .into_iter()
        .map(|(_, op)| match op {
            DrawOp::PlaceText { text, .. } => text.as_str(),
            DrawOp::PlaceImage { .. } => unreachable!(),
        })
        .collect();
    assert_eq!(texts, vec!["Title", "Still rendered"]);
}

#[test]
fn wide_image_is_scaled_and_reserves_space() {
    let png = png_bytes(2000, 1000);
    let fetcher = move |src: &str| -> Result<Vec<u8>, String> {
        assert_eq!(src, "https://example.com/wide.png");
        Ok(png.clone())
    };
    let config = RenderConfig {
        page_width: 600.0,
        ..RenderConfig::default()
    };
    let nodes = vec![
        ContentNode::image("https://example.com/wide.png"),
        ContentNode::paragraph("Caption below"),
    ];
    let (bytes, doc) = render_nodes(&nodes, &config, &fetcher).unwrap();
    assert_valid_pdf(&bytes);

    let top = config.page_height - 50.0;
    let ops = &doc.pages[0].ops;
    match &ops[0] {
        DrawOp::PlaceImage {
            x,
            y,
            width,
            height,
            image,
        } => {
            assert_eq!((*x, *y), (50.0, top));
            assert_eq!(*width, 500.0);
            assert_eq!(*height, 250.0);
            assert_eq!(doc.images[image.0].width_px, 2000);
        }
        other => panic!("unexpected op {other:?}"),
    }
    match &ops[1] {
        DrawOp::PlaceText { y, .. } => assert!(*y <= top - 250.0 - config.image_spacing + 1e-3),
        other => panic!("unexpected op {other:?}"),
    }
}

#[test]
fn empty_document_is_one_blank_page() {
    let (bytes, doc) = render_nodes(&[], &RenderConfig::default(), &offline).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.op_count(), 0);
    assert_eq!(doc.title, "article");
}

// =====================================================================
// Properties
// =====================================================================

#[test]
fn wrapped_lines_fit_unless_single_word() {
    let text = "Supercalifragilisticexpialidocious words sometimes overflow, \
                but ordinary sentences like this one should always wrap inside the column.";
    for width in [40.0, 80.0, 150.0, 300.0] {
        for line in wrap_text(text, FontFace::Regular, 12.0, width) {
            let fits = FontFace::Regular.measure(&line, 12.0) <= width;
            assert!(fits || !line.contains(' '), "{line:?} overflows {width}");
        }
    }
}

#[test]
fn rewrapping_wrapped_lines_is_stable() {
    let text = "The pagination manager checks every line before it is drawn, so no \
                line ever crosses the bottom margin of a page.";
    let lines: Vec<String> = wrap_text(text, FontFace::Bold, 14.0, 200.0).collect();
    for line in &lines {
        let again: Vec<String> = wrap_text(line, FontFace::Bold, 14.0, 200.0).collect();
        assert_eq!(again, vec![line.clone()]);
    }
    assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
}

#[test]
fn page_count_is_monotone_in_content() {
    let config = RenderConfig::default();
    let nodes: Vec<ContentNode> = (0..40)
        .map(|i| {
            if i % 7 == 0 {
                ContentNode::heading(2, format!("Section {i}")).unwrap()
            } else {
                three_line_paragraph()
            }
        })
        .collect();
    let mut previous = 0;
    for n in 0..=nodes.len() {
        let pages = compute_document(&nodes[..n], &config, &offline).pages.len();
        assert!(pages >= previous, "prefix {n}: {pages} < {previous}");
        previous = pages;
    }
}

#[test]
fn all_ops_stay_inside_the_margin_box() {
    let png = png_bytes(300, 900);
    let fetcher = move |_: &str| -> Result<Vec<u8>, String> { Ok(png.clone()) };
    let config = RenderConfig {
        margins: Margins {
            top: 40.0,
            right: 60.0,
            bottom: 70.0,
            left: 30.0,
        },
        ..RenderConfig::default()
    };
    let geometry: PageGeometry = config.geometry();
    let mut nodes = vec![ContentNode::heading(1, "Bounds").unwrap()];
    for i in 0..30 {
        nodes.push(three_line_paragraph());
        if i % 10 == 0 {
            nodes.push(ContentNode::image(format!("fig{i}.png")));
        }
        nodes.push(ContentNode::code("fn main() {\n    println!(\"hi\");\n}"));
    }
    let doc = compute_document(&nodes, &config, &fetcher);
    assert!(doc.pages.len() > 1);
    assert_eq!(doc.images.len(), 3);

    for page in &doc.pages {
        for op in &page.ops {
            let (x, y, w, h) = match op {
                DrawOp::PlaceText {
                    x,
                    y,
                    font,
                    size,
                    text,
                } => (*x, *y, font.measure(text, *size), size * 1.2),
                DrawOp::PlaceImage {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => (*x, *y, *width, *height),
            };
            assert!(x >= geometry.left());
            assert!(x + w <= geometry.left() + geometry.content_width() + 1e-3, "{op:?}");
            assert!(y <= geometry.top() + 1e-3, "{op:?}");
            assert!(y - h >= geometry.bottom() - 1e-3, "{op:?}");
        }
    }
}

#[test]
fn pathological_page_terminates() {
    let config = RenderConfig {
        page_width: 200.0,
        page_height: 110.0,
        ..RenderConfig::default()
    };
    let nodes = vec![
        ContentNode::heading(1, "Enormous heading on a tiny page").unwrap(),
        ContentNode::paragraph("short"),
    ];
    let doc = compute_document(&nodes, &config, &offline);
    assert!(doc.pages.len() >= 2);
    assert!(doc.pages.iter().all(|p| !p.ops.is_empty()));
}

#[test]
fn prefetch_and_sequential_layouts_match() {
    let png = png_bytes(64, 32);
    let fetcher = move |src: &str| -> Result<Vec<u8>, String> {
        if src.contains("missing") {
            Err("404".into())
        } else {
            Ok(png.clone())
        }
    };
    let nodes: Vec<ContentNode> = (0..12)
        .flat_map(|i| {
            let src = if i % 3 == 0 {
                format!("https://example.com/missing{i}.png")
            } else {
                format!("https://example.com/img{i}.png")
            };
            [ContentNode::paragraph(format!("Figure {i}")), ContentNode::image(src)]
        })
        .collect();

    let parallel = compute_document(&nodes, &RenderConfig::default(), &fetcher);
    let sequential = compute_document(
        &nodes,
        &RenderConfig {
            prefetch_images: false,
            ..RenderConfig::default()
        },
        &fetcher,
    );
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.images.len(), 8);
    let srcs: Vec<&str> = parallel.images.iter().map(|i| i.src.as_str()).collect();
    assert_eq!(srcs[0], "https://example.com/img1.png");
    assert_eq!(srcs[7], "https://example.com/img11.png");
}

// =====================================================================
// Layout JSON
// =====================================================================

#[test]
fn layout_json_round_trips_and_re_renders() {
    let png = png_bytes(40, 20);
    let fetcher = move |_: &str| -> Result<Vec<u8>, String> { Ok(png.clone()) };
    let nodes = vec![
        ContentNode::heading(1, "Frozen").unwrap(),
        ContentNode::image("diagram.png"),
        ContentNode::preformatted("a\n\nb"),
    ];
    let doc = compute_document(&nodes, &RenderConfig::default(), &fetcher);
    let json = doc.to_json().unwrap();
    assert!(json.contains("\"op\": \"place_image\"") || json.contains("\"op\":\"place_image\""));

    let restored = Document::from_json(&json).unwrap();
    assert_eq!(restored, doc);
    assert_valid_pdf(&render_pdf(&restored).unwrap());
}

#[test]
fn content_nodes_from_json() {
    let json = r#"[
        {"type": "heading", "level": 2, "text": "From JSON"},
        {"type": "paragraph", "text": "Body"},
        {"type": "image", "src": "https://example.com/x.webp"}
    ]"#;
    let nodes = ContentNode::list_from_json(json).unwrap();
    assert_eq!(nodes.len(), 3);
    let doc = compute_document(&nodes, &RenderConfig::default(), &offline);
    assert_eq!(doc.op_count(), 2);

    let bad = r#"[{"type": "heading", "level": 7, "text": "Too deep"}]"#;
    assert!(ContentNode::list_from_json(bad).is_err());
}

// =====================================================================
// HTML pages
// =====================================================================

#[test]
fn blog_post_renders_with_inline_image() {
    let config = RenderConfig::default();
    let (bytes, doc) = generate_pdf_from_html(
        &templates::blog_post_page(),
        Some("https://blog.example.com/posts/ownership"),
        &config,
    )
    .unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(doc.title, "Understanding Ownership");
    // The data-URI PNG embeds; the GIF is unsupported and skipped.
    assert_eq!(doc.images.len(), 1);
    assert_eq!(doc.images[0].width_px, 4);
}

#[test]
fn long_article_spans_pages() {
    let (bytes, doc) = generate_pdf_from_html(
        &templates::long_article_page(60),
        None,
        &RenderConfig::default(),
    )
    .unwrap();
    assert_valid_pdf(&bytes);
    assert!(doc.pages.len() >= 3, "only {} pages", doc.pages.len());

    let ops = text_ops(&doc);
    assert!(ops.windows(2).all(|w| w[0].0 <= w[1].0), "pages out of order");
}

#[test]
fn landscape_page_is_wider() {
    let (_, doc) = generate_pdf_from_html(
        templates::minimal_page(),
        None,
        &RenderConfig::a4_landscape(),
    )
    .unwrap();
    assert!(doc.page_width_pt > doc.page_height_pt);
    assert_eq!(doc.op_count(), 1);
}

#[test]
fn unclosed_paragraph_markup_renders_every_block() {
    let mut html = String::from("<article><h1>Notes</h1>");
    html.push_str(&"<p>an unclosed paragraph ".repeat(2000));
    html.push_str(&"<div>".repeat(4000));
    html.push_str("<h2>Deep</h2>");
    let (bytes, doc) = generate_pdf_from_html(&html, None, &RenderConfig::default()).unwrap();
    assert_valid_pdf(&bytes);

    let texts: Vec<&str> = text_ops(&doc)
        .into_iter()
        .map(|(_, op)| match op {
            DrawOp::PlaceText { text, .. } => text.as_str(),
            DrawOp::PlaceImage { .. } => unreachable!(),
        })
        .collect();
    assert_eq!(texts.len(), 2002);
    assert_eq!(texts[0], "Notes");
    assert!(texts[1..2001].iter().all(|t| *t == "an unclosed paragraph"));
    assert_eq!(texts[2001], "Deep");
}

#[test]
fn punctuation_heavy_text_stays_inside_the_column() {
    let config = RenderConfig::default();
    let width = config.geometry().content_width();
    let nodes = vec![
        ContentNode::heading(2, "\u{c6}sthetics \u{2014} \u{153}uvre\u{2026} ".repeat(12)).unwrap(),
        ContentNode::paragraph("word\u{2014}word\u{2014}word ".repeat(40)),
        ContentNode::paragraph("\u{4e2d}\u{6587} mixed \u{2026} ".repeat(30)),
    ];
    let doc = compute_document(&nodes, &config, &offline);
    for (_, op) in text_ops(&doc) {
        if let DrawOp::PlaceText {
            font, size, text, ..
        } = op
        {
            let fits = font.measure(text, *size) <= width;
            assert!(fits || !text.contains(' '), "{text:?} overflows");
        }
    }
    // An em dash is a full em wide.
    assert_eq!(FontFace::Regular.measure("\u{2014}", 12.0), 12.0);
}
