//! Sitemap XML parsing.
//!
//! A fetched body is classified by the local name of its root element into one
//! of three [`SitemapDocument`] kinds:
//!
//! - **`<sitemapindex>`**: `<sitemap><loc>` children point at nested sitemaps
//! - **`<urlset>`**: `<url><loc>` children are page URLs
//! - **anything else**: an inert document with nothing to collect
//!
//! ```
//! use sitemapper_core::sitemap::{parse_document, SitemapDocument};
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url><loc>https://example.com/page1</loc></url>
//! </urlset>"#;
//!
//! let doc = parse_document(xml)?;
//! assert_eq!(doc, SitemapDocument::UrlSet(vec!["https://example.com/page1".to_string()]));
//! # Ok::<(), sitemapper_core::Error>(())
//! ```

use crate::{Error, Result};
use flate2::read::GzDecoder;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::Read;
use tracing::instrument;

/// Root element name of a sitemap index.
const INDEX_ROOT: &str = "sitemapindex";
/// Root element name of a leaf sitemap.
const URLSET_ROOT: &str = "urlset";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: child sitemap URLs in document order.
    Index(Vec<String>),
    /// `<urlset>`: page URLs in document order.
    UrlSet(Vec<String>),
    /// Any other root element. Contributes nothing to a walk.
    Unknown {
        /// Local name of the unrecognised root element.
        root: String,
    },
}

impl SitemapDocument {
    /// Number of `<loc>` entries the document carries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Index(locs) | Self::UrlSet(locs) => locs.len(),
            Self::Unknown { .. } => 0,
        }
    }

    /// Whether the document carries no `<loc>` entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which `(item, loc)` element pair to collect for a given root.
fn item_element(root: &str) -> Option<&'static str> {
    match root {
        INDEX_ROOT => Some("sitemap"),
        URLSET_ROOT => Some("url"),
        _ => None,
    }
}

/// Parse sitemap XML into a [`SitemapDocument`].
///
/// Only `<loc>` elements that are direct children of a direct child of the root
/// are collected (`urlset > url > loc`, `sitemapindex > sitemap > loc`). When an
/// item has several `<loc>` children the first non-empty one wins. Items with
/// no `<loc>`, or an empty one, are skipped.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the XML is malformed, truncated, or has no root element.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_document(xml: &str) -> Result<SitemapDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut root: Option<String> = None;
    let mut item: Option<&'static str> = None;
    let mut locs = Vec::new();
    let mut current_loc: Option<String> = None;
    let mut loc_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if stack.is_empty() {
                    if root.is_some() {
                        return Err(Error::Parse("multiple root elements".to_string()));
                    }
                    item = item_element(&name);
                    root = Some(name.clone());
                }
                if stack.len() == 1 && item == Some(name.as_str()) {
                    current_loc = None;
                }
                if stack.len() == 2 && name == "loc" {
                    loc_text.clear();
                }
                stack.push(name);
            },
            Ok(Event::Empty(e)) => {
                if stack.is_empty() {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if root.is_some() {
                        return Err(Error::Parse("multiple root elements".to_string()));
                    }
                    item = item_element(&name);
                    root = Some(name);
                }
            },
            Ok(Event::Text(e)) => {
                if in_loc(&stack, item) {
                    let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    loc_text.push_str(&text);
                }
            },
            Ok(Event::CData(e)) => {
                if in_loc(&stack, item) {
                    loc_text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            },
            Ok(Event::End(_)) => {
                let Some(name) = stack.pop() else {
                    return Err(Error::Parse("unexpected closing tag".to_string()));
                };
                match stack.len() {
                    2 if name == "loc" && item.is_some() => {
                        let loc = loc_text.trim();
                        if current_loc.is_none() && !loc.is_empty() {
                            current_loc = Some(loc.to_string());
                        }
                    },
                    1 if item == Some(name.as_str()) => {
                        if let Some(loc) = current_loc.take() {
                            locs.push(loc);
                        }
                    },
                    _ => {},
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Parse(format!(
            "unexpected end of document inside <{}>",
            stack.join("><")
        )));
    }

    match root.as_deref() {
        Some(INDEX_ROOT) => Ok(SitemapDocument::Index(locs)),
        Some(URLSET_ROOT) => Ok(SitemapDocument::UrlSet(locs)),
        Some(other) => Ok(SitemapDocument::Unknown {
            root: other.to_string(),
        }),
        None => Err(Error::Parse("document has no root element".to_string())),
    }
}

fn in_loc(stack: &[String], item: Option<&str>) -> bool {
    item.is_some()
        && stack.len() == 3
        && stack[2] == "loc"
        && Some(stack[1].as_str()) == item
}

/// Decode a fetched sitemap body into text.
///
/// Bodies that start with the gzip magic bytes (`sitemap.xml.gz` served without
/// a `Content-Encoding` header) are decompressed first.
///
/// # Errors
///
/// Returns [`Error::Parse`] if decompression fails or the text is not UTF-8,
/// and [`Error::LimitExceeded`] if the decompressed text is longer than `max_len`.
pub fn decode_body(bytes: &[u8], max_len: usize) -> Result<String> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let cap = u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(1);
        let mut inflated = Vec::new();
        GzDecoder::new(bytes)
            .take(cap)
            .read_to_end(&mut inflated)
            .map_err(|e| Error::Parse(format!("gzip decode failed: {e}")))?;
        if inflated.len() > max_len {
            return Err(Error::LimitExceeded {
                url: String::new(),
                reason: format!("decompressed body exceeds {max_len} bytes"),
            });
        }
        return String::from_utf8(inflated)
            .map_err(|e| Error::Parse(format!("sitemap body is not valid UTF-8: {e}")));
    }

    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Parse(format!("sitemap body is not valid UTF-8: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::disallowed_macros)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn urls(doc: &SitemapDocument) -> Vec<&str> {
        match doc {
            SitemapDocument::Index(locs) | SitemapDocument::UrlSet(locs) => {
                locs.iter().map(String::as_str).collect()
            },
            SitemapDocument::Unknown { .. } => Vec::new(),
        }
    }

    #[test]
    fn test_parses_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/page1</loc>
            <lastmod>2024-01-15T10:30:00+00:00</lastmod>
            <changefreq>weekly</changefreq>
            <priority>0.8</priority>
          </url>
          <url><loc>https://example.com/page2</loc></url>
          <url><loc>https://example.com/page3</loc></url>
        </urlset>"#;

        let doc = parse_document(xml).unwrap();
        assert!(matches!(doc, SitemapDocument::UrlSet(_)));
        assert_eq!(
            urls(&doc),
            vec![
                "https://example.com/page1",
                "https://example.com/page2",
                "https://example.com/page3"
            ]
        );
    }

    #[test]
    fn test_parses_sitemap_index() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <sitemap>
            <loc>https://example.com/sitemap-1.xml</loc>
            <lastmod>2024-01-15</lastmod>
          </sitemap>
          <sitemap><loc>https://example.com/sitemap-2.xml</loc></sitemap>
        </sitemapindex>"#;

        let doc = parse_document(xml).unwrap();
        assert_eq!(
            doc,
            SitemapDocument::Index(vec![
                "https://example.com/sitemap-1.xml".to_string(),
                "https://example.com/sitemap-2.xml".to_string(),
            ])
        );
    }

    #[test]
    fn test_unknown_root_is_inert() {
        let xml = r#"<?xml version="1.0"?>
        <rss version="2.0"><channel><item><link>https://example.com/a</link></item></channel></rss>"#;

        let doc = parse_document(xml).unwrap();
        assert_eq!(
            doc,
            SitemapDocument::Unknown {
                root: "rss".to_string()
            }
        );
        assert!(doc.is_empty());
    }

    #[test]
    fn test_classification_ignores_namespace_prefix() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
          <sm:url><sm:loc>https://example.com/prefixed</sm:loc></sm:url>
        </sm:urlset>"#;

        let doc = parse_document(xml).unwrap();
        assert_eq!(urls(&doc), vec!["https://example.com/prefixed"]);
    }

    #[test]
    fn test_index_mentioning_urlset_in_text_is_still_index() {
        // Classification is by root element, not by substring search.
        let xml = r"<sitemapindex>
          <sitemap><loc>https://example.com/urlset.xml</loc></sitemap>
        </sitemapindex>";

        let doc = parse_document(xml).unwrap();
        assert!(matches!(doc, SitemapDocument::Index(_)));
    }

    #[test]
    fn test_only_direct_children_are_collected() {
        let xml = r"<urlset>
          <loc>https://example.com/stray</loc>
          <url>
            <loc>https://example.com/page1</loc>
            <image><loc>https://example.com/image.png</loc></image>
          </url>
          <group><url><loc>https://example.com/nested</loc></url></group>
        </urlset>";

        let doc = parse_document(xml).unwrap();
        assert_eq!(urls(&doc), vec!["https://example.com/page1"]);
    }

    #[test]
    fn test_skips_items_without_loc() {
        let xml = r"<urlset>
          <url><lastmod>2024-01-15</lastmod></url>
          <url><loc>   </loc></url>
          <url/>
          <url><loc>https://example.com/page1</loc></url>
        </urlset>";

        let doc = parse_document(xml).unwrap();
        assert_eq!(urls(&doc), vec!["https://example.com/page1"]);
    }

    #[test]
    fn test_first_loc_wins() {
        let xml = r"<urlset><url>
          <loc>https://example.com/first</loc>
          <loc>https://example.com/second</loc>
        </url></urlset>";

        let doc = parse_document(xml).unwrap();
        assert_eq!(urls(&doc), vec!["https://example.com/first"]);
    }

    #[test]
    fn test_handles_whitespace_entities_and_cdata() {
        let xml = r"<urlset>
          <url><loc>  https://example.com/page1  </loc></url>
          <url><loc>https://example.com/page?foo=1&amp;bar=2</loc></url>
          <url><loc><![CDATA[https://example.com/cdata?a=1&b=2]]></loc></url>
          <url><loc>https://example.com/path/page%20with%20spaces</loc></url>
        </urlset>";

        let doc = parse_document(xml).unwrap();
        assert_eq!(
            urls(&doc),
            vec![
                "https://example.com/page1",
                "https://example.com/page?foo=1&bar=2",
                "https://example.com/cdata?a=1&b=2",
                "https://example.com/path/page%20with%20spaces",
            ]
        );
    }

    #[test]
    fn test_handles_empty_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
        </urlset>"#;

        assert_eq!(parse_document(xml).unwrap(), SitemapDocument::UrlSet(Vec::new()));
        assert_eq!(parse_document("<urlset/>").unwrap(), SitemapDocument::UrlSet(Vec::new()));
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/page1
          </url>
        </urlset>"#;

        assert!(matches!(parse_document(xml), Err(Error::Parse(_))));
    }

    #[test]
    fn test_rejects_truncated_document() {
        let xml = "<urlset><url><loc>https://example.com/page1</loc></url>";
        assert!(matches!(parse_document(xml), Err(Error::Parse(_))));
    }

    #[test]
    fn test_rejects_non_xml() {
        assert!(parse_document("").is_err());
        assert!(parse_document("just some text").is_err());
        assert!(parse_document("<html></html><body></body>").is_err());
    }

    #[test]
    fn test_decode_plain_body() {
        let text = decode_body(b"<urlset/>", 1024).unwrap();
        assert_eq!(text, "<urlset/>");
    }

    #[test]
    fn test_decode_gzip_body() {
        let xml = "<urlset><url><loc>https://example.com/gz</loc></url></urlset>";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(xml.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let text = decode_body(&compressed, 1024).unwrap();
        assert_eq!(text, xml);
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_body(&[0xff, 0xfe, 0x00], 1024).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_decode_stops_at_decompressed_limit() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all("<".repeat(10_000).as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let err = decode_body(&compressed, 1_000).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { .. }), "got {err:?}");

        let text = decode_body(&compressed, 10_000).unwrap();
        assert_eq!(text.len(), 10_000);
    }
}
