//! Post-parse tree transforms, applied in a fixed order.
//!
//! Each transform is a plain function over the tree plus a shared
//! context. Order matters: asset paths are rewritten before anything
//! inspects them, headings get anchors before links are classified, and
//! highlighting runs last because it replaces code children with raw
//! HTML that later transforms must not see.

use super::dom::{Document, Node};
use super::highlight;
use crate::content::TocEntry;
use crate::content::slug::slugify;
use url::Url;

/// Shared state threaded through the transform pass.
pub struct TransformCtx<'a> {
    /// Slug of the document being compiled.
    pub slug: &'a str,
    /// URL section under which co-located assets are served.
    pub section: &'a str,
    /// Host of the configured site URL, for external link detection.
    pub site_host: Option<&'a str>,
    /// Accumulated table of contents.
    pub toc: Vec<TocEntry>,
}

pub type Transform = fn(&mut Document, &mut TransformCtx);

/// The transform pipeline. Adding a step means appending here.
pub const TRANSFORMS: &[Transform] = &[
    rewrite_asset_paths,
    extract_toc,
    mark_external_links,
    highlight_code_blocks,
];

/// Rewrite relative image sources to their served location, so documents
/// can reference co-located assets as `./figure.png`.
fn rewrite_asset_paths(doc: &mut Document, ctx: &mut TransformCtx) {
    let section = ctx.section;
    let slug = ctx.slug;
    doc.visit_elements(&mut |el| {
        if el.tag == "img"
            && let Some(src) = el.attr("src")
            && let Some(rest) = src.strip_prefix("./")
        {
            let rewritten = format!("/{section}/{slug}/{rest}");
            el.set_attr("src", &rewritten);
        }
    });
}

/// Collect `h2`/`h3` headings into the table of contents and inject a
/// slugified anchor id into each.
fn extract_toc(doc: &mut Document, ctx: &mut TransformCtx) {
    let toc = &mut ctx.toc;
    doc.visit_elements(&mut |el| {
        let depth = match el.tag.as_str() {
            "h2" => 2,
            "h3" => 3,
            _ => return,
        };
        let text = el.text_content();
        let id = slugify(&text);
        el.set_attr("id", &id);
        toc.push(TocEntry { id, text, depth });
    });
}

/// Tag off-site links so they open in a new tab without leaking the
/// opener. Links to the configured site host and to localhost stay as
/// written.
fn mark_external_links(doc: &mut Document, ctx: &mut TransformCtx) {
    let site_host = ctx.site_host;
    doc.visit_elements(&mut |el| {
        if el.tag != "a" {
            return;
        }
        let Some(href) = el.attr("href") else {
            return;
        };
        if !href.starts_with("http://") && !href.starts_with("https://") {
            return;
        }
        let Ok(url) = Url::parse(href) else {
            return;
        };
        let Some(host) = url.host_str() else {
            return;
        };
        if host == "localhost" || Some(host) == site_host {
            return;
        }
        el.set_attr("target", "_blank");
        el.set_attr("rel", "noopener noreferrer");
        el.append_class("external-link");
    });
}

/// Replace the text of `language-*` code blocks with highlighted HTML.
/// Blocks in unknown languages keep their plain text.
fn highlight_code_blocks(doc: &mut Document, _ctx: &mut TransformCtx) {
    doc.visit_elements(&mut |el| {
        if el.tag != "code" {
            return;
        }
        let Some(lang) = el
            .attr("class")
            .and_then(|c| c.strip_prefix("language-"))
            .map(str::to_string)
        else {
            return;
        };
        let source = el.text_content();
        if let Some(html) = highlight::highlight(&source, &lang) {
            el.children = vec![Node::Raw(html)];
        }
    });
}
