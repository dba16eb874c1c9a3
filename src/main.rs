//! article-pdf – command-line article → PDF converter.
//!
//! Usage:
//!   article-pdf <input.html|input.json> [output.pdf] [--landscape] [--title "T"]
//!               [--base-url URL] [--margin PT] [--config cfg.json]
//!               [--sequential] [--offline] [--timeout SECS] [--layout out.json]
//!
//! HTML input goes through article extraction; JSON input is an array of
//! content nodes. If `output.pdf` is omitted the PDF is named after the
//! document title and written next to the input file.

use std::{env, fs, path::PathBuf, process};

use article_pdf::content::{safe_file_name, ContentNode};
use article_pdf::extract::extract_article;
use article_pdf::images::DefaultFetcher;
use article_pdf::pagination::Margins;
use article_pdf::pipeline::{render_nodes, PageOrientation, RenderConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut landscape = false;
    let mut sequential = false;
    let mut offline = false;
    let mut title: Option<String> = None;
    let mut base_url: Option<String> = None;
    let mut margin: Option<f32> = None;
    let mut timeout_secs: Option<u64> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => landscape = true,
            "--sequential" => sequential = true,
            "--offline" => offline = true,
            "--title" | "-t" => title = Some(flag_value(&mut iter, arg, &args[0])),
            "--base-url" | "-b" => base_url = Some(flag_value(&mut iter, arg, &args[0])),
            "--layout" => layout_path = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0]))),
            "--config" | "-c" => {
                config_path = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0])))
            }
            "--margin" | "-m" => {
                let value = flag_value(&mut iter, arg, &args[0]);
                match value.parse::<f32>() {
                    Ok(pt) if pt >= 0.0 => margin = Some(pt),
                    _ => {
                        eprintln!("Invalid margin: {value}");
                        process::exit(1);
                    }
                }
            }
            "--timeout" => {
                let value = flag_value(&mut iter, arg, &args[0]);
                match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => timeout_secs = Some(secs),
                    _ => {
                        eprintln!("Invalid timeout: {value}");
                        process::exit(1);
                    }
                }
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let mut config = match &config_path {
        Some(path) => match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| RenderConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {e}", path.display());
                process::exit(1);
            }
        },
        None => RenderConfig::default(),
    };
    if landscape {
        config.orientation = PageOrientation::Landscape;
    }
    if sequential {
        config.prefetch_images = false;
    }
    if let Some(pt) = margin {
        config.margins = Margins::uniform(pt);
    }

    let is_json = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let nodes = if is_json {
        match ContentNode::list_from_json(&source) {
            Ok(nodes) => nodes,
            Err(e) => {
                eprintln!("Error parsing '{}': {e}", input.display());
                process::exit(1);
            }
        }
    } else {
        let article = extract_article(&source, base_url.as_deref());
        if title.is_none() {
            title = Some(article.title);
        }
        article.nodes
    };
    if title.is_some() {
        config.title = title;
    }

    let mut fetcher = DefaultFetcher::new();
    if let Some(secs) = timeout_secs {
        fetcher = with_timeout(fetcher, secs);
    }
    if offline {
        fetcher.set_allow_remote(false);
    }

    match render_nodes(&nodes, &config, &fetcher) {
        Ok((bytes, document)) => {
            // Default output: next to the input, named after the title.
            let output = output_path.unwrap_or_else(|| input.with_file_name(safe_file_name(&document.title)));

            // Create output directory if necessary.
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }

            if let Some(layout) = &layout_path {
                let written = document
                    .to_json()
                    .map_err(|e| e.to_string())
                    .and_then(|json| fs::write(layout, json).map_err(|e| e.to_string()));
                if let Err(e) = written {
                    eprintln!("Error writing layout '{}': {e}", layout.display());
                    process::exit(1);
                }
            }

            let pages = document.pages.len();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{}, {} image{})",
                output.display(),
                bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" },
                document.images.len(),
                if document.images.len() == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

#[cfg(feature = "fetch")]
fn with_timeout(fetcher: DefaultFetcher, secs: u64) -> DefaultFetcher {
    fetcher.with_timeout(std::time::Duration::from_secs(secs))
}

#[cfg(not(feature = "fetch"))]
fn with_timeout(fetcher: DefaultFetcher, _secs: u64) -> DefaultFetcher {
    fetcher
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("article-pdf – web article to paginated PDF");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.html|input.json> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input>          HTML page to extract, or a JSON array of content nodes");
    eprintln!("  [output.pdf]     Output path (default: title-derived name next to the input)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t      Document title in PDF metadata (default: first <h1>)");
    eprintln!("  --base-url, -b   Page URL used to resolve relative image sources");
    eprintln!("  --margin, -m     Uniform page margin in points (default: 50)");
    eprintln!("  --config, -c     JSON render config; flags override its values");
    eprintln!("  --landscape      Use landscape page orientation (A4 841×595 pt)");
    eprintln!("  --sequential     Fetch images one at a time instead of in parallel");
    eprintln!("  --offline        Skip http(s) images");
    eprintln!("  --timeout        Remote image timeout in seconds (default: 30)");
    eprintln!("  --layout         Also write the positioned layout as JSON");
    eprintln!("  --help           Print this message");
}
