//! CSS selectors for the dynamics page DOM.
//!
//! Pairs are tried primary first, then fallback.

use scraper::{ElementRef, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub static $name: std::sync::LazyLock<Selector> =
            std::sync::LazyLock::new(|| selector($css));
    };
}

// Either marker counts as a feed item.
selector!(ITEM, r#"[data-testid="dyn-item"], .bili-dyn-item"#);

selector!(TIME, "time");
selector!(TIME_FALLBACK, ".bili-dyn-time");

selector!(AUTHOR, ".bili-dyn-title__text");
selector!(AUTHOR_FALLBACK, ".bili-dyn-author__name");

selector!(CONTENT_TEXT, ".bili-dyn-content__text");
selector!(CARD_TEXT, ".bili-dyn-card-text");
selector!(CONTENT, ".bili-dyn-content");

selector!(VIDEO_CARD, ".bili-dyn-card-video");
selector!(VIDEO_TITLE, ".bili-dyn-card-video__title");
selector!(VIDEO_DURATION, ".bili-dyn-card-video__duration");
selector!(VIDEO_STAT, ".bili-dyn-card-video__stat-item");
selector!(ANY_LINK, "a");
selector!(VIDEO_PATH_LINK, r#"a[href*="/video/"]"#);

selector!(ORIGINAL, ".bili-dyn-item__orig");
selector!(ORIGINAL_AUTHOR, ".bili-dyn-orig-author__name");
selector!(ORIGINAL_TEXT, ".bili-dyn-content__orig__text");

/// First descendant matching `primary`, else the first matching `fallback`.
#[must_use]
pub fn select_first<'a>(
    root: &ElementRef<'a>,
    primary: &Selector,
    fallback: &Selector,
) -> Option<ElementRef<'a>> {
    root.select(primary)
        .next()
        .or_else(|| root.select(fallback).next())
}
