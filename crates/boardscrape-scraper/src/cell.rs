//! Table cell classification and value rules.

use scraper::{ElementRef, Selector};
use std::sync::OnceLock;
use url::Url;

/// Elements whose boundaries separate words when text is flattened.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "br", "dd", "div", "dl", "dt", "figcaption", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "section", "table", "tbody", "td", "th",
    "thead", "tr", "ul",
];

/// Elements whose text never shows up on the page.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Path of the framework image proxy that wraps the real asset in `?url=`.
const IMAGE_PROXY_PATH: &str = "/_next/image";

fn img_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img").expect("valid selector"))
}

fn link_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a").expect("valid selector"))
}

/// What a cell holds, decided from its child structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// No image, no link.
    PlainText(String),
    /// An image and no visible text. Holds the image label.
    ImageWithAltOrFilename(String),
    /// An image alongside text, or a link.
    Composite {
        /// Label of the first image
        image: String,
        /// Flattened visible text
        text: String,
    },
}

impl Cell {
    /// Classify a `<td>`/`<th>` element.
    pub fn inspect(element: ElementRef<'_>) -> Self {
        let text = flatten_text(element);
        let has_link = element.select(link_selector()).next().is_some();
        let image = element
            .select(img_selector())
            .map(image_label)
            .find(|label| !label.is_empty());
        let has_image = element.select(img_selector()).next().is_some();

        match (has_image, has_link) {
            (false, false) => Self::PlainText(text),
            (true, false) if text.is_empty() => {
                Self::ImageWithAltOrFilename(image.unwrap_or_default())
            }
            _ => Self::Composite {
                image: image.unwrap_or_default(),
                text,
            },
        }
    }

    /// The normalized value written for this cell.
    ///
    /// In a provider column a composite cell prefers its image label, which is
    /// usually the provider's logo; elsewhere the text wins.
    #[must_use]
    pub fn value(&self, provider_column: bool) -> String {
        match self {
            Self::PlainText(text) | Self::ImageWithAltOrFilename(text) => text.clone(),
            Self::Composite { image, text } => {
                let (preferred, fallback) = if provider_column {
                    (image, text)
                } else {
                    (text, image)
                };
                if preferred.is_empty() {
                    fallback.clone()
                } else {
                    preferred.clone()
                }
            }
        }
    }
}

/// Visible text of an element with whitespace collapsed to single spaces.
pub fn flatten_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            collect_text(child_el, out);
            if block {
                out.push(' ');
            }
        }
    }
}

/// Alt text if present, else the filename stem of the image source.
fn image_label(img: ElementRef<'_>) -> String {
    let attrs = img.value();
    if let Some(alt) = attrs.attr("alt").map(str::trim).filter(|a| !a.is_empty()) {
        return alt.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    ["src", "data-src"]
        .iter()
        .filter_map(|name| attrs.attr(name))
        .find_map(filename_stem)
        .unwrap_or_default()
}

/// Last path segment of `src` without its extension.
///
/// Relative sources resolve against a placeholder origin. Proxy URLs are
/// unwrapped to the asset they point at.
pub fn filename_stem(src: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let mut url = base.join(src.trim()).ok()?;
    if url.scheme() == "data" {
        return None;
    }

    if url.path() == IMAGE_PROXY_PATH {
        let inner = url
            .query_pairs()
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value.into_owned())?;
        url = base.join(&inner).ok()?;
    }

    let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    let stem = match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => segment,
    };
    Some(stem.to_string())
}

/// Whether a header names the provider column.
pub fn is_provider_column(header: &str, keywords: &[String]) -> bool {
    let header = header.to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && header.contains(&k.to_lowercase()))
}
