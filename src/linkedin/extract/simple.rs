// src/linkedin/extract/simple.rs
//! Single-lookup extractors for the main profile page and the connections page.

use crate::linkedin::dom;
use crate::linkedin::types::{AccomplishmentEntry, ContactEntry, InterestEntry, Section};
use scraper::{ElementRef, Html};

pub const TOP_PANEL: &str = "[class='mt2 relative']";
const LOCATION: &str = "[class='text-body-small inline t-black--light break-words']";
const PROFILE_PICTURE: &str = ".pv-top-card-profile-picture img";
const OPEN_TO_WORK_MARKER: &str = "#OPEN_TO_WORK";

pub const INTERESTS_CONTAINER: &str =
    "[class='pv-profile-section pv-interests-section artdeco-container-card artdeco-card ember-view']";
const INTEREST_ENTITY: &str = "[class='pv-interest-entity pv-profile-section__card-item ember-view']";

pub const ACCOMPLISHMENTS_CONTAINER: &str =
    "[class='pv-profile-section pv-accomplishments-section artdeco-container-card artdeco-card ember-view']";
const ACCOMPLISHMENT_BLOCK: &str = "div[class='pv-accomplishments-block__content break-words']";

pub const CONNECTIONS_CONTAINER: &str = ".mn-connections";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameAndLocation {
    pub name: String,
    pub location: String,
}

pub fn parse_name_and_location(document: &Html) -> Section<NameAndLocation> {
    let Some(top_panel) = dom::find_in(document, TOP_PANEL) else {
        return Section::NotFound;
    };
    let Some(name) = dom::find(top_panel, "h1").map(dom::text) else {
        return Section::Failed("top card has no heading".to_string());
    };
    // The location line is looked up page-wide, not only under the top card.
    let Some(location) = dom::find_in(document, LOCATION).map(dom::text) else {
        return Section::Failed("no location line".to_string());
    };
    Section::Found(NameAndLocation { name, location })
}

pub fn parse_open_to_work(document: &Html) -> bool {
    dom::find_in(document, PROFILE_PICTURE)
        .and_then(|img| img.value().attr("title"))
        .is_some_and(|title| title.contains(OPEN_TO_WORK_MARKER))
}

pub fn parse_about(document: &Html) -> Section<String> {
    dom::find_in(document, "#about")
        .and_then(|anchor| anchor.parent().and_then(ElementRef::wrap))
        .and_then(|section| dom::find(section, ".display-flex"))
        .map(|about| Section::Found(dom::text(about)))
        .unwrap_or(Section::NotFound)
}

pub fn parse_interests(document: &Html) -> Section<Vec<InterestEntry>> {
    if dom::find_in(document, INTERESTS_CONTAINER).is_none() {
        return Section::NotFound;
    }

    let mut interests = Vec::new();
    for entity in document.select(&dom::selector(INTEREST_ENTITY)) {
        match dom::find(entity, "h3") {
            Some(heading) => interests.push(InterestEntry {
                name: dom::text(heading).trim().to_string(),
            }),
            None => return Section::Failed("interest without heading".to_string()),
        }
    }
    Section::Found(interests)
}

/// Every `<li>` of every category block, tagged with the block's heading.
pub fn parse_accomplishments(document: &Html) -> Section<Vec<AccomplishmentEntry>> {
    if dom::find_in(document, ACCOMPLISHMENTS_CONTAINER).is_none() {
        return Section::NotFound;
    }

    let mut accomplishments = Vec::new();
    for block in document.select(&dom::selector(ACCOMPLISHMENT_BLOCK)) {
        let (Some(category), Some(list)) = (dom::find(block, "h3"), dom::find(block, "ul")) else {
            return Section::Failed("accomplishment block without heading or list".to_string());
        };
        let category = dom::text(category);
        accomplishments.extend(list.select(&dom::selector("li")).map(|title| AccomplishmentEntry {
            category: category.clone(),
            title: dom::text(title),
        }));
    }
    Section::Found(accomplishments)
}

pub fn parse_connections(document: &Html) -> Section<Vec<ContactEntry>> {
    let Some(connections) = dom::find_in(document, CONNECTIONS_CONTAINER) else {
        return Section::NotFound;
    };

    let mut contacts = Vec::new();
    for card in connections.select(&dom::selector(".mn-connection-card")) {
        let anchor = dom::find(card, ".mn-connection-card__link");
        let name = dom::find(card, ".mn-connection-card__details .mn-connection-card__name");
        let occupation = dom::find(card, ".mn-connection-card__details .mn-connection-card__occupation");

        let (Some(anchor), Some(name), Some(occupation)) = (anchor, name, occupation) else {
            return Section::Failed("incomplete connection card".to_string());
        };
        contacts.push(ContactEntry {
            name: dom::text(name).trim().to_string(),
            occupation: dom::text(occupation).trim().to_string(),
            url: dom::attr(anchor, "href"),
        });
    }
    Section::Found(contacts)
}
