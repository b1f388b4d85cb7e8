use std::collections::HashSet;

use scraper::{ElementRef, Html};

use super::selectors::{self, select_first};
use crate::normalize::optional_text;

/// Read-only snapshot of the rendered feed page.
///
/// Built from serialized page HTML so parsing never touches the live page.
pub struct FeedSnapshot {
    document: Html,
}

impl FeedSnapshot {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// All rendered feed items in document order.
    ///
    /// An element carrying either marker is an item. Elements nested inside
    /// an item that was already taken are skipped so one post is never
    /// counted twice.
    #[must_use]
    pub fn items(&self) -> Vec<ElementRef<'_>> {
        let mut taken = HashSet::new();
        let mut items = Vec::new();
        for element in self.document.select(&selectors::ITEM) {
            if element.ancestors().any(|node| taken.contains(&node.id())) {
                continue;
            }
            taken.insert(element.id());
            items.push(element);
        }
        items
    }
}

/// Displayed time label of a feed item, or empty.
///
/// The first non-empty of the `time` element and the time class wins.
#[must_use]
pub fn time_label(item: &ElementRef<'_>) -> String {
    let primary = optional_text(item.select(&selectors::TIME).next());
    if !primary.is_empty() {
        return primary;
    }
    optional_text(item.select(&selectors::TIME_FALLBACK).next())
}

/// Text of the item's own content element, primary then fallback.
#[must_use]
pub fn content_text(item: &ElementRef<'_>) -> String {
    optional_text(select_first(
        item,
        &selectors::CONTENT_TEXT,
        &selectors::CARD_TEXT,
    ))
}
