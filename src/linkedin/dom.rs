// src/linkedin/dom.rs
//! Small element-tree helpers shared by the extractors.

use scraper::{ElementRef, Html, Selector};

/// Parse a selector literal. Every literal in this crate is covered by tests.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Direct element children, skipping text and comment nodes.
pub fn child_elements(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

pub fn first_child(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.children().find_map(ElementRef::wrap)
}

/// First descendant matching `css`.
pub fn find<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    element.select(&selector(css)).next()
}

pub fn find_in<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    document.select(&selector(css)).next()
}

/// First descendant element of any tag.
pub fn first_descendant(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.descendants().skip(1).find_map(ElementRef::wrap)
}

/// Rendered text: every text node under `element` concatenated, with runs of
/// whitespace collapsed to a single space across the whole string.
pub fn text(element: ElementRef<'_>) -> String {
    collapse_whitespace(element.text())
}

/// Text of the first `<span>` inside `element`, if there is one.
pub fn span_text(element: ElementRef<'_>) -> Option<String> {
    find(element, "span").map(text)
}

/// Text of `element` with everything under `excluded` left out.
pub fn text_excluding(element: ElementRef<'_>, excluded: ElementRef<'_>) -> String {
    let pieces = element.descendants().filter_map(|node| {
        let fragment = node.value().as_text()?;
        let inside = node.ancestors().any(|ancestor| ancestor.id() == excluded.id());
        (!inside).then_some(&**fragment)
    });
    collapse_whitespace(pieces)
}

pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}

fn collapse_whitespace<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    let joined: String = pieces.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
