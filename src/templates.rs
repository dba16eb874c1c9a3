//! Sample article pages for testing and demonstration.
//!
//! Each page mimics a real site layout (chrome around an article body) and
//! exercises a different part of the extractor and layout engine.

/// A 4×2 px red PNG as a data URI.
pub const TINY_PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAQAAAACCAIAAADwyuo0AAAAEElEQVR4nGM4YWMDRwzIHACGegoBr2KLOQAAAABJRU5ErkJggg==";

/// Blog post with site header, navigation, sidebar pop-up and footer around
/// an `<article>` holding headings, paragraphs, code and an inline image.
pub fn blog_post_page() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Understanding Ownership | The Rusty Blog</title>
    <style>body {{ font-family: sans-serif; }}</style>
    <script>window.analytics = {{ track: function() {{}} }};</script>
</head>
<body>
    <header class="site-header">
        <h1>The Rusty Blog</h1>
        <nav><a href="/">Home</a> <a href="/about">About</a></nav>
    </header>
    <div class="newsletter-modal"><p>Subscribe to our newsletter!</p></div>
    <main>
        <article>
            <h1>Understanding Ownership</h1>
            <p>Ownership is the set of rules that govern how a program
               manages memory. Every value has a single <em>owner</em>.</p>
            <h2>Moves</h2>
            <p>Assigning a heap value to another variable <strong>moves</strong> it.</p>
            <pre><code>let s1 = String::from("hello");
let s2 = s1;

println!("{{}}", s2);</code></pre>
            <h3>Diagram</h3>
            <p>The stack and heap after the move: <img src="{TINY_PNG_DATA_URI}" alt="diagram"></p>
            <p>Inline <code>clone()</code> calls copy the heap data.</p>
            <img src="/static/figures/borrow.gif" alt="unsupported format">
        </article>
    </main>
    <div role="navigation"><p>Next post</p></div>
    <footer><p>&copy; 2024 The Rusty Blog</p></footer>
</body>
</html>"##
    )
}

/// Page without any `main`/`article` element; content sits in plain divs.
pub fn news_page() -> &'static str {
    r##"<html>
<head><title>Local Council Approves Budget</title></head>
<body>
    <div class="top-bar" style="position: sticky; top: 0"><p>Breaking news ticker</p></div>
    <div class="content">
        <h2>Local Council Approves Budget</h2>
        <p>The council voted 7&ndash;2 on Tuesday to approve next year&#39;s budget.</p>
        <p>Spending on parks rises by 4%, while road maintenance stays flat.</p>
        <img src="images/chart.png" alt="chart">
        <img alt="no source">
    </div>
    <iframe src="https://ads.example.com/banner"></iframe>
    <noscript><p>Enable JavaScript for comments.</p></noscript>
</body>
</html>"##
}

/// Long-form article with many paragraphs, used to test pagination.
pub fn long_article_page(paragraphs: usize) -> String {
    let mut html = String::from("<html><body><article><h1>A Long Read</h1>\n");
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<p>Paragraph {i}. The quick brown fox jumps over the lazy dog, \
             then circles back to see whether the dog has noticed anything at all. \
             It has not, and the fox continues on its way through the meadow.</p>\n"
        ));
    }
    html.push_str("</article></body></html>");
    html
}

/// Minimal document – a single paragraph.
pub fn minimal_page() -> &'static str {
    "<p>Hello world</p>"
}
