// src/linkedin/extract/experience.rs
use super::{top_level_items, ItemError, ItemResult};
use crate::linkedin::dom;
use crate::linkedin::types::{ExperienceEntry, Section};
use scraper::{ElementRef, Html};
use tracing::debug;

/// Title, company, time range and location as read from a summary block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarySlots {
    pub position_title: String,
    pub company: String,
    pub work_times: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRange {
    pub from_date: String,
    pub to_date: String,
    pub duration: Option<String>,
}

/// Parse the experience details page.
pub fn parse_experiences(document: &Html) -> Section<Vec<ExperienceEntry>> {
    let Some(items) = top_level_items(document) else {
        return Section::NotFound;
    };

    let mut experiences = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match parse_item(item) {
            Ok(mut entries) => experiences.append(&mut entries),
            Err(e) => debug!("Skipping experience item {}: {}", index, e),
        }
    }
    Section::Found(experiences)
}

fn parse_item(item: ElementRef<'_>) -> ItemResult<Vec<ExperienceEntry>> {
    let entity = dom::find(item, "div[data-view-name='profile-component-entity']")
        .ok_or(ItemError::Missing("profile entity"))?;

    let elements = dom::child_elements(entity);
    if elements.len() < 2 {
        return Err(ItemError::Missing("logo and details columns"));
    }
    let (company_logo, position_details) = (elements[0], elements[1]);

    let company_url = dom::first_child(company_logo)
        .and_then(|link| dom::attr(link, "href"))
        .ok_or(ItemError::Missing("company link"))?;

    let details = dom::child_elements(position_details);
    let summary = details.first().copied().ok_or(ItemError::Missing("summary block"))?;
    let summary_text = details.get(1).copied();

    let outer_positions = dom::first_child(summary)
        .map(dom::child_elements)
        .ok_or(ItemError::Missing("summary slots"))?;
    let slots = read_summary_slots(&outer_positions)?;
    let times = split_time_range(&slots.work_times);

    let inner_positions = summary_text.map(nested_positions).unwrap_or_default();

    if inner_positions.len() > 1 {
        let mut entries = Vec::new();
        for (index, sub_position) in inner_positions.into_iter().enumerate() {
            match parse_sub_position(sub_position, &slots.company, &company_url) {
                Ok(entry) => entries.push(entry),
                Err(e) => debug!("Skipping sub-position {}: {}", index, e),
            }
        }
        return Ok(entries);
    }

    Ok(vec![ExperienceEntry {
        institution_name: slots.company,
        linkedin_url: Some(company_url),
        from_date: times.from_date,
        to_date: times.to_date,
        description: summary_text.map(dom::text).unwrap_or_default(),
        position_title: slots.position_title,
        duration: times.duration,
        location: Some(slots.location),
    }])
}

/// Map summary slots to fields by how many of them there are.
///
/// Four slots are title, company, time range, location. With three, a `·` in
/// the third slot marks it as a time range with duration (no location);
/// otherwise the title is absent. Fewer slots fill company and time range
/// where present.
pub fn read_summary_slots(outer_positions: &[ElementRef<'_>]) -> ItemResult<SummarySlots> {
    let slot = |index: usize| -> ItemResult<String> {
        outer_positions
            .get(index)
            .and_then(|element| dom::span_text(*element))
            .ok_or(ItemError::Missing("slot span"))
    };
    let optional_slot = |index: usize| -> ItemResult<String> {
        if index < outer_positions.len() {
            slot(index)
        } else {
            Ok(String::new())
        }
    };

    let slots = match outer_positions.len() {
        4 => SummarySlots {
            position_title: slot(0)?,
            company: slot(1)?,
            work_times: slot(2)?,
            location: slot(3)?,
        },
        3 if dom::text(outer_positions[2]).contains('·') => SummarySlots {
            position_title: slot(0)?,
            company: slot(1)?,
            work_times: slot(2)?,
            location: String::new(),
        },
        3 => SummarySlots {
            position_title: String::new(),
            company: slot(0)?,
            work_times: slot(1)?,
            location: slot(2)?,
        },
        _ => SummarySlots {
            position_title: String::new(),
            company: optional_slot(0)?,
            work_times: optional_slot(1)?,
            location: String::new(),
        },
    };
    Ok(slots)
}

/// Split `"Jan 2019 - Mar 2021 · 2 yrs 3 mos"` into dates and duration.
///
/// The dates part is split on single spaces: tokens 0..2 are the start date
/// and tokens 3.. the end date. Any other shape comes out wrong, which
/// matches what the rest of the pipeline expects.
pub fn split_time_range(work_times: &str) -> TimeRange {
    if work_times.is_empty() {
        return TimeRange::default();
    }

    let mut parts = work_times.split('·');
    let times = parts.next().unwrap_or_default().trim();
    let duration = parts.next().map(|d| d.trim().to_string());

    let tokens: Vec<&str> = times.split(' ').collect();
    let from_date = if times.is_empty() {
        String::new()
    } else {
        tokens.iter().take(2).copied().collect::<Vec<_>>().join(" ")
    };
    let to_date = if tokens.len() > 3 {
        tokens[3..].join(" ")
    } else {
        String::new()
    };

    TimeRange {
        from_date,
        to_date,
        duration,
    }
}

/// Sub-position items of a grouped multi-role block, or nothing.
fn nested_positions(summary_text: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let has_container = dom::child_elements(summary_text)
        .iter()
        .any(|child| child.value().attr("class") == Some("pvs-list__container"));
    if !has_container {
        return Vec::new();
    }

    dom::find(summary_text, ".pvs-list__container")
        .and_then(dom::first_child)
        .and_then(dom::first_child)
        .and_then(dom::first_child)
        .map(|list| {
            list.select(&dom::selector(".pvs-list__paged-list-item"))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_sub_position(
    sub_position: ElementRef<'_>,
    company: &str,
    company_url: &str,
) -> ItemResult<ExperienceEntry> {
    let anchor = dom::find(sub_position, "a").ok_or(ItemError::Missing("sub-position link"))?;
    let res = dom::child_elements(anchor);

    let position_title = match res.first() {
        Some(title_elem) => dom::first_child(*title_elem)
            .and_then(dom::first_descendant)
            .map(dom::text)
            .ok_or(ItemError::Missing("sub-position title"))?,
        None => String::new(),
    };
    let work_times = match res.get(1) {
        Some(times_elem) => dom::first_child(*times_elem)
            .map(dom::text)
            .ok_or(ItemError::Missing("sub-position time range"))?,
        None => String::new(),
    };
    let location = match res.get(2) {
        Some(location_elem) => Some(
            dom::first_child(*location_elem)
                .map(dom::text)
                .ok_or(ItemError::Missing("sub-position location"))?,
        ),
        None => None,
    };

    let times = split_time_range(&work_times);
    Ok(ExperienceEntry {
        institution_name: company.to_string(),
        linkedin_url: Some(company_url.to_string()),
        from_date: times.from_date,
        to_date: times.to_date,
        description: dom::text_excluding(sub_position, anchor),
        position_title,
        duration: times.duration,
        location,
    })
}
