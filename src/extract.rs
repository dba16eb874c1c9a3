//! Article extraction – reduces a fetched web page to the ordered block
//! nodes the layout engine understands.
//!
//! Page chrome (`header`, `footer`, `nav`, pop-ups, fixed/sticky overlays,
//! scripts) is dropped. The first `main`, `[role=main]`, `article` or
//! `.article`/`.content`/`.post` element in document order is the content
//! root; without one the whole body is.
//! Headings, paragraphs, `pre`/`code` blocks and images are then collected
//! in document order.

use crate::content::{ContentNode, HeadingLevel};
use crate::dom::{parse_html, DomNode, ElementNode, Tag};

/// Class tokens that mark the article body on sites without semantic tags.
const CONTENT_CLASSES: &[&str] = &["article", "content", "post"];

/// Class-name fragments that mark overlays and pop-ups.
const CHROME_CLASS_FRAGMENTS: &[&str] = &["popup", "modal", "fixed", "sticky"];

/// An extracted article.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// First `<h1>`, else `<title>`, else `"article"`.
    pub title: String,
    pub nodes: Vec<ContentNode>,
}

/// Parse `html` and extract its article content.
///
/// Relative image sources are resolved against `base_url` when given.
pub fn extract_article(html: &str, base_url: Option<&str>) -> Article {
    let dom = parse_html(html);

    let nodes = match find_content_root(&dom) {
        Some(root) => {
            log::debug!("content root: <{:?}>", root.tag);
            collect_blocks(&root.children, base_url)
        }
        None => collect_blocks(&dom, base_url),
    };

    let title = nodes
        .iter()
        .find_map(|n| match n {
            ContentNode::Heading {
                level: HeadingLevel::H1,
                text,
            } if !text.is_empty() => Some(text.clone()),
            _ => None,
        })
        .or_else(|| find_title(&dom))
        .unwrap_or_else(|| "article".to_string());

    log::debug!("extracted {} nodes, title {:?}", nodes.len(), title);
    Article { title, nodes }
}

/// Shorthand for [`extract_article`] when only the nodes are needed.
pub fn extract_content(html: &str, base_url: Option<&str>) -> Vec<ContentNode> {
    extract_article(html, base_url).nodes
}

fn is_chrome(elem: &ElementNode) -> bool {
    if matches!(
        elem.tag,
        Tag::Header
            | Tag::Footer
            | Tag::Nav
            | Tag::Script
            | Tag::Style
            | Tag::Iframe
            | Tag::Noscript
            | Tag::Head
    ) {
        return true;
    }
    if elem.attr("role") == Some("navigation") {
        return true;
    }
    if let Some(class) = elem.attr("class") {
        let class = class.to_ascii_lowercase();
        if CHROME_CLASS_FRAGMENTS.iter().any(|f| class.contains(f)) {
            return true;
        }
    }
    if let Some(style) = elem.attr("style") {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if style.contains("position:fixed") || style.contains("position:sticky") {
            return true;
        }
    }
    false
}

fn is_content_root(elem: &ElementNode) -> bool {
    matches!(elem.tag, Tag::Main | Tag::Article)
        || elem.attr("role") == Some("main")
        || elem.attr("class").is_some_and(|class| {
            class
                .split_ascii_whitespace()
                .any(|token| CONTENT_CLASSES.contains(&token))
        })
}

/// First content root in document order, ignoring chrome subtrees.
fn find_content_root(nodes: &[DomNode]) -> Option<&ElementNode> {
    nodes.iter().find_map(|node| match node {
        DomNode::Element(e) if is_chrome(e) => None,
        DomNode::Element(e) if is_content_root(e) => Some(e),
        DomNode::Element(e) => find_content_root(&e.children),
        DomNode::Text(_) => None,
    })
}

fn find_title(nodes: &[DomNode]) -> Option<String> {
    nodes.iter().find_map(|node| match node {
        DomNode::Element(e) if e.tag == Tag::Title => {
            let text = normalize_whitespace(&e.text_content());
            (!text.is_empty()).then_some(text)
        }
        DomNode::Element(e) => find_title(&e.children),
        DomNode::Text(_) => None,
    })
}

fn collect_blocks(nodes: &[DomNode], base_url: Option<&str>) -> Vec<ContentNode> {
    let mut out = Vec::new();
    visit(nodes, base_url, &mut out);
    out
}

fn visit(nodes: &[DomNode], base_url: Option<&str>, out: &mut Vec<ContentNode>) {
    for node in nodes {
        let DomNode::Element(elem) = node else {
            continue;
        };
        if is_chrome(elem) {
            continue;
        }

        if let Some(level) = elem.tag.heading_level() {
            let text = normalize_whitespace(&elem.text_content());
            if let Ok(heading) = ContentNode::heading(level, text) {
                out.push(heading);
            }
            push_nested_images(&elem.children, base_url, out);
            continue;
        }

        match elem.tag {
            Tag::P => {
                out.push(ContentNode::paragraph(normalize_whitespace(
                    &elem.text_content(),
                )));
                push_nested_images(&elem.children, base_url, out);
            }
            Tag::Pre => out.push(ContentNode::preformatted(elem.text_content().trim())),
            Tag::Code => out.push(ContentNode::code(elem.text_content().trim())),
            Tag::Img => {
                if let Some(src) = elem.src().map(str::trim).filter(|s| !s.is_empty()) {
                    out.push(ContentNode::image(resolve_url(src, base_url)));
                }
            }
            _ => visit(&elem.children, base_url, out),
        }
    }
}

/// Images inside a text block follow the block's text.
fn push_nested_images(nodes: &[DomNode], base_url: Option<&str>, out: &mut Vec<ContentNode>) {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if is_chrome(e) {
                continue;
            }
            if e.tag == Tag::Img {
                if let Some(src) = e.src().map(str::trim).filter(|s| !s.is_empty()) {
                    out.push(ContentNode::image(resolve_url(src, base_url)));
                }
            } else {
                push_nested_images(&e.children, base_url, out);
            }
        }
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve an image `src` against the page URL.
///
/// - absolute `http(s)://` and `data:` sources are returned unchanged
/// - `//host/path` takes the base scheme
/// - `/path` is joined to the base origin
/// - anything else is joined to the base URL's directory, with `.` and
///   `..` segments collapsed
pub fn resolve_url(src: &str, base_url: Option<&str>) -> String {
    let Some(base) = base_url else {
        return src.to_string();
    };
    if has_scheme(src) {
        return src.to_string();
    }
    let Some((scheme, rest)) = base.split_once("://") else {
        return src.to_string();
    };

    if let Some(net_path) = src.strip_prefix("//") {
        return format!("{scheme}://{net_path}");
    }

    let rest = rest.split(['?', '#']).next().unwrap_or(rest);
    let (authority, base_path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };

    let joined = if src.starts_with('/') {
        src.to_string()
    } else {
        let dir = &base_path[..=base_path.rfind('/').unwrap_or(0)];
        format!("{dir}{src}")
    };
    format!("{scheme}://{authority}{}", remove_dot_segments(&joined))
}

fn has_scheme(src: &str) -> bool {
    match src.find(':') {
        Some(i) => {
            let scheme = &src[..i];
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !src[i + 1..].starts_with(|c: char| c.is_ascii_digit())
        }
        None => false,
    }
}

fn remove_dot_segments(path: &str) -> String {
    // Keep the query/fragment untouched.
    let split = path.find(['?', '#']).unwrap_or(path.len());
    let (path_part, suffix) = path.split_at(split);

    let mut segments: Vec<&str> = Vec::new();
    for segment in path_part.split('/').skip(1) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    let ends_with_dir = path_part.ends_with("/.") || path_part.ends_with("/..");
    let mut out = format!("/{}", segments.join("/"));
    if ends_with_dir && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(suffix);
    out
}
