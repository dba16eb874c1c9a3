//! HTML parser – converts an HTML string into a simple DOM tree.
//!
//! Tolerant single-pass parser for real-world article markup:
//! - Elements the extractor cares about get their own [`Tag`]; everything
//!   else is kept as [`Tag::Other`] so its children are still reachable.
//! - Void elements (`img`, `br`, `meta`, ...) never take children.
//! - `script`/`style` bodies are read as raw text.
//! - A closing tag that matches an open ancestor closes the elements in
//!   between; a stray closing tag is skipped.
//! - Block start tags close an open `<p>`, `<li>` closes the previous
//!   item, and nesting is capped at [`MAX_DEPTH`].

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
    Pre,
    Code,
    Img,
    Br,
    Main,
    Article,
    Header,
    Footer,
    Nav,
    Script,
    Style,
    Iframe,
    Noscript,
    Title,
    Body,
    Html,
    Head,
    /// Any other tag, lower-cased.
    Other(String),
}

/// Elements that never have content or a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Tag {
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "h5" => Tag::H5,
            "h6" => Tag::H6,
            "p" => Tag::P,
            "pre" => Tag::Pre,
            "code" => Tag::Code,
            "img" => Tag::Img,
            "br" => Tag::Br,
            "main" => Tag::Main,
            "article" => Tag::Article,
            "header" => Tag::Header,
            "footer" => Tag::Footer,
            "nav" => Tag::Nav,
            "script" => Tag::Script,
            "style" => Tag::Style,
            "iframe" => Tag::Iframe,
            "noscript" => Tag::Noscript,
            "title" => Tag::Title,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            other => Tag::Other(other.to_string()),
        }
    }

    /// Lower-case tag name.
    pub fn name(&self) -> &str {
        match self {
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
            Tag::H6 => "h6",
            Tag::P => "p",
            Tag::Pre => "pre",
            Tag::Code => "code",
            Tag::Img => "img",
            Tag::Br => "br",
            Tag::Main => "main",
            Tag::Article => "article",
            Tag::Header => "header",
            Tag::Footer => "footer",
            Tag::Nav => "nav",
            Tag::Script => "script",
            Tag::Style => "style",
            Tag::Iframe => "iframe",
            Tag::Noscript => "noscript",
            Tag::Title => "title",
            Tag::Body => "body",
            Tag::Html => "html",
            Tag::Head => "head",
            Tag::Other(name) => name,
        }
    }

    pub fn is_void(&self) -> bool {
        match self {
            Tag::Img | Tag::Br => true,
            Tag::Other(name) => VOID_TAGS.contains(&name.as_str()),
            _ => false,
        }
    }

    /// Elements whose content is raw text, not markup.
    pub fn is_raw_text(&self) -> bool {
        matches!(self, Tag::Script | Tag::Style)
    }

    /// Heading depth for `h1`–`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Tag::H1 => Some(1),
            Tag::H2 => Some(2),
            Tag::H3 => Some(3),
            Tag::H4 => Some(4),
            Tag::H5 => Some(5),
            Tag::H6 => Some(6),
            _ => None,
        }
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn src(&self) -> Option<&str> {
        self.attr("src")
    }

    /// Concatenated text of all descendants; `<br>` becomes a newline.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            DomNode::Text(t) => out.push_str(t),
            DomNode::Element(e) if e.tag == Tag::Br => out.push('\n'),
            DomNode::Element(e) if e.tag.is_raw_text() => {}
            DomNode::Element(e) => collect_text(&e.children, out),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser – single pass tokenizer feeding an explicit open-element stack
// ---------------------------------------------------------------------------

/// Maximum number of simultaneously open elements. At the limit a new
/// element closes the deepest one and becomes its sibling, which bounds the
/// depth of every tree walk.
pub const MAX_DEPTH: usize = 256;

/// Start tags that implicitly close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "summary", "table", "ul",
];

/// Elements that stop the search for an implicitly closed element.
const SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

/// Parse an HTML string into a list of DOM nodes.
///
/// Whitespace between elements is kept as text; it separates inline words.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut parser = Parser::new(html);
    let mut tree = TreeBuilder::default();
    parser.run(&mut tree);
    tree.finish()
}

/// Assembles nodes into a tree without recursion.
#[derive(Default)]
struct TreeBuilder {
    /// Elements still waiting for their end tag, outermost first.
    open: Vec<ElementNode>,
    roots: Vec<DomNode>,
}

impl TreeBuilder {
    fn append(&mut self, node: DomNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn close_top(&mut self) {
        if let Some(elem) = self.open.pop() {
            self.append(DomNode::Element(elem));
        }
    }

    /// Close the element at `index` and everything opened after it.
    fn close_from(&mut self, index: usize) {
        while self.open.len() > index {
            self.close_top();
        }
    }

    /// Index of the innermost open element matching `pred`, unless a scope
    /// boundary (or one of `extra_boundaries`) comes first.
    fn in_scope(&self, pred: impl Fn(&Tag) -> bool, extra_boundaries: &[&str]) -> Option<usize> {
        for (i, elem) in self.open.iter().enumerate().rev() {
            if pred(&elem.tag) {
                return Some(i);
            }
            let name = elem.tag.name();
            if SCOPE_BOUNDARIES.contains(&name) || extra_boundaries.contains(&name) {
                return None;
            }
        }
        None
    }

    fn start_tag(&mut self, elem: ElementNode) {
        let name = elem.tag.name();
        if CLOSES_P.contains(&name) {
            if let Some(i) = self.in_scope(|t| *t == Tag::P, &[]) {
                self.close_from(i);
            }
        }
        match name {
            "li" => {
                if let Some(i) = self.in_scope(|t| t.name() == "li", &["ol", "ul"]) {
                    self.close_from(i);
                }
            }
            "dt" | "dd" => {
                if let Some(i) = self.in_scope(|t| matches!(t.name(), "dt" | "dd"), &["dl"]) {
                    self.close_from(i);
                }
            }
            _ => {}
        }
        if elem.tag.heading_level().is_some()
            && self
                .open
                .last()
                .is_some_and(|top| top.tag.heading_level().is_some())
        {
            self.close_top();
        }

        if self.open.len() >= MAX_DEPTH {
            log::debug!("nesting deeper than {MAX_DEPTH}, <{name}> becomes a sibling");
            self.close_top();
        }
        self.open.push(elem);
    }

    /// Close the innermost open element with this tag; stray end tags are
    /// ignored.
    fn end_tag(&mut self, tag: &Tag) {
        if let Some(i) = self.open.iter().rposition(|e| e.tag == *tag) {
            self.close_from(i);
        }
    }

    fn finish(mut self) -> Vec<DomNode> {
        self.close_from(0);
        self.roots
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn run(&mut self, tree: &mut TreeBuilder) {
        while !self.eof() {
            if self.starts_with("<!--") {
                self.skip_comment();
            } else if self.starts_with("<!") || self.starts_with("<?") {
                // Skip doctype / processing instructions
                self.skip_past(">");
            } else if self.starts_with("</") {
                let name = self.peek_closing_name();
                self.skip_closing_tag();
                if !name.is_empty() {
                    tree.end_tag(&Tag::from_name(&name));
                }
            } else if self.starts_with("<") && self.next_is_tag_start() {
                self.parse_element(tree);
            } else {
                let text = self.parse_text();
                tree.append(text);
            }
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        // A '<' that does not open a tag is literal text.
        if self.starts_with("<") {
            self.advance_char();
        }
        while !self.eof() && !self.starts_with("<") {
            self.advance_char();
        }
        DomNode::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self, tree: &mut TreeBuilder) {
        // Consume '<'
        self.advance_char();
        let tag = Tag::from_name(&self.parse_name());
        let mut elem = ElementNode::new(tag.clone());

        // Parse attributes
        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            if key.is_empty() {
                // Junk such as a lone quote; step over it.
                self.advance_char();
                continue;
            }
            elem.attributes.entry(key).or_insert(value);
        }

        let self_closing = self.starts_with("/>");
        if self_closing {
            self.pos += 2;
        } else if self.starts_with(">") {
            self.pos += 1;
        }

        if tag.is_void() || self_closing {
            tree.append(DomNode::Element(elem));
            return;
        }

        if tag.is_raw_text() {
            let close = if tag == Tag::Script { "</script" } else { "</style" };
            let start = self.pos;
            let end = find_ascii_ci(&self.input[start..], close)
                .map(|i| start + i)
                .unwrap_or(self.input.len());
            elem.children
                .push(DomNode::Text(self.input[start..end].to_string()));
            self.pos = end;
            if !self.eof() {
                self.skip_closing_tag();
            }
            tree.append(DomNode::Element(elem));
            return;
        }

        tree.start_tag(elem);
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.advance_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_name().to_ascii_lowercase();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.pos += 1; // skip '='
        self.skip_whitespace();
        let value = self.parse_attr_value();
        (key, value)
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ["\"", "'"] {
            if self.starts_with(quote) {
                self.pos += 1;
                let start = self.pos;
                let end = self.input[start..]
                    .find(quote)
                    .map(|i| start + i)
                    .unwrap_or(self.input.len());
                self.pos = (end + 1).min(self.input.len());
                return decode_entities(&self.input[start..end]);
            }
        }
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_whitespace() || c == '>' {
                break;
            }
            if c == '/' && self.input[self.pos..].starts_with("/>") {
                break;
            }
            self.advance_char();
        }
        decode_entities(&self.input[start..self.pos])
    }

    fn peek_closing_name(&self) -> String {
        let rest = &self.input[self.pos + 2..];
        rest.chars()
            .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == ':')
            .collect()
    }

    fn skip_closing_tag(&mut self) {
        self.skip_past(">");
    }

    fn skip_past(&mut self, needle: &str) {
        match self.input[self.pos..].find(needle) {
            Some(i) => self.pos += i + needle.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if !c.is_whitespace() {
                break;
            }
            self.advance_char();
        }
    }

    fn skip_comment(&mut self) {
        self.pos += 4; // skip <!--
        self.skip_past("-->");
    }

    fn next_is_tag_start(&self) -> bool {
        self.input[self.pos + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
        }
    }
}

/// Byte offset of `needle` (ASCII) in `haystack`, ignoring ASCII case.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Decode the named entities common in articles plus numeric references.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "euro" => '\u{20AC}',
        "bull" => '\u{2022}',
        _ => return None,
    };
    Some(c)
}
