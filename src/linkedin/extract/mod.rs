// src/linkedin/extract/mod.rs
//! Pure parsers from a page snapshot to profile fields.
//!
//! Every function here takes an already-loaded `Html` document and never
//! touches the browser. Navigation and waiting live in the assembler.

pub mod education;
pub mod experience;
pub mod simple;

pub use education::parse_educations;
pub use experience::parse_experiences;
pub use simple::{
    parse_about, parse_accomplishments, parse_connections, parse_interests,
    parse_name_and_location, parse_open_to_work, NameAndLocation,
};

use super::dom;
use scraper::{ElementRef, Html};
use thiserror::Error;

/// Container holding the entries of a details sub-page.
pub const DETAILS_LIST: &str = "main .pvs-list__container";
const LIST_ITEM_CLASS: &str = "pvs-list__paged-list-item";

/// Why a single list item was dropped.
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    #[error("missing {0}")]
    Missing(&'static str),
}

pub type ItemResult<T> = std::result::Result<T, ItemError>;

/// Top-level entries of the details list. Entries nested inside another
/// entry (grouped sub-positions) are left to their parent.
pub(crate) fn top_level_items(document: &Html) -> Option<Vec<ElementRef<'_>>> {
    let container = dom::find_in(document, DETAILS_LIST)?;
    let items = container
        .select(&dom::selector(&format!(".{LIST_ITEM_CLASS}")))
        .filter(|item| {
            !item
                .ancestors()
                .take_while(|node| node.id() != container.id())
                .filter_map(ElementRef::wrap)
                .any(|ancestor| ancestor.value().classes().any(|class| class == LIST_ITEM_CLASS))
        })
        .collect();
    Some(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_items_skip_nested() {
        let document = Html::parse_document(
            r#"<main><div class="pvs-list__container"><ul>
                 <li class="pvs-list__paged-list-item" id="a">
                   <ul><li class="pvs-list__paged-list-item" id="nested"></li></ul>
                 </li>
                 <li class="pvs-list__paged-list-item" id="b"></li>
               </ul></div></main>"#,
        );
        let ids: Vec<_> = top_level_items(&document)
            .unwrap()
            .into_iter()
            .filter_map(|item| item.value().id())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_top_level_items_without_container() {
        let document = Html::parse_document("<main><p>empty</p></main>");
        assert!(top_level_items(&document).is_none());
    }
}
