// src/linkedin/extract/education.rs
use super::{top_level_items, ItemError, ItemResult};
use crate::linkedin::dom;
use crate::linkedin::types::{EducationEntry, Section};
use scraper::{ElementRef, Html};
use tracing::debug;

/// Parse the education details page. Unlike experience, an entry without an
/// institution link is kept with `linkedin_url = None`.
pub fn parse_educations(document: &Html) -> Section<Vec<EducationEntry>> {
    let Some(items) = top_level_items(document) else {
        return Section::NotFound;
    };

    let educations = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match parse_item(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping education item {}: {}", index, e);
                None
            }
        })
        .collect();
    Section::Found(educations)
}

fn parse_item(item: ElementRef<'_>) -> ItemResult<EducationEntry> {
    let entity = dom::find(item, "div[data-view-name='profile-component-entity']")
        .ok_or(ItemError::Missing("profile entity"))?;

    let elements = dom::child_elements(entity);
    if elements.len() < 2 {
        return Err(ItemError::Missing("logo and details columns"));
    }
    let (institution_logo, position_details) = (elements[0], elements[1]);

    let institution_url = dom::first_child(institution_logo).and_then(|link| dom::attr(link, "href"));

    let details = dom::child_elements(position_details);
    let summary = details.first().copied().ok_or(ItemError::Missing("summary block"))?;
    let summary_text = details.get(1).copied();

    let outer_positions = dom::first_child(summary)
        .map(dom::child_elements)
        .ok_or(ItemError::Missing("summary slots"))?;

    let institution_name = match outer_positions.first() {
        Some(element) => dom::span_text(*element).ok_or(ItemError::Missing("institution name"))?,
        None => String::new(),
    };
    let degree = match outer_positions.get(1) {
        Some(element) => Some(dom::span_text(*element).ok_or(ItemError::Missing("degree"))?),
        None => None,
    };
    let (from_date, to_date) = outer_positions
        .get(2)
        .and_then(|element| dom::span_text(*element))
        .map(|times| split_year_range(&times))
        .unwrap_or((None, None));

    Ok(EducationEntry {
        institution_name,
        linkedin_url: institution_url,
        from_date,
        to_date,
        description: summary_text.map(dom::text).unwrap_or_default(),
        degree,
    })
}

/// Find a lone `-` token: the token before it is the start, the last token
/// of the string is the end. Anything else (no spaced hyphen, several of
/// them, or a hyphen at either edge) yields no dates.
pub fn split_year_range(times: &str) -> (Option<String>, Option<String>) {
    let tokens: Vec<&str> = times.split(' ').collect();
    let dashes: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| **token == "-")
        .map(|(index, _)| index)
        .collect();

    match dashes.as_slice() {
        [dash] if *dash > 0 && *dash + 1 < tokens.len() => (
            Some(tokens[dash - 1].to_string()),
            tokens.last().map(|last| last.to_string()),
        ),
        _ => (None, None),
    }
}
