//! Record parsers for a single feed item.
//!
//! Every parser is total: a missing sub-structure yields `None` or a
//! sentinel, never an error.

use regex::Regex;
use scraper::ElementRef;

use super::model::{AuthorRef, DebugRaw, ForwardInfo, VideoInfo};
use super::selectors::{self, select_first};
use crate::normalize::{absolutize_url, element_text, optional_text, strip_query};

/// `H:MM`, `HH:MM` or `HH:MM:SS` not glued to other digits, so
/// dates like "2025-01-08" never match.
static DURATION: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?)(?:[^0-9]|$)").unwrap()
});

/// Two trailing counts (play, danmaku), each optionally decimal and/or `万`.
static TRAILING_STATS: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?万?)\s+([0-9]+(?:\.[0-9]+)?万?)$").unwrap()
});

/// Parse the posting account.
///
/// Falls back to [`AuthorRef::unknown`] when no author element exists.
#[must_use]
pub fn parse_author(item: &ElementRef<'_>) -> AuthorRef {
    let Some(author) = select_first(item, &selectors::AUTHOR, &selectors::AUTHOR_FALLBACK)
    else {
        return AuthorRef::unknown();
    };

    AuthorRef {
        display_name: element_text(&author),
        profile_url: author
            .value()
            .attr("href")
            .map(absolutize_url)
            .unwrap_or_default(),
    }
}

/// Parse the embedded video card, or `None` when the item has none.
#[must_use]
pub fn parse_video(item: &ElementRef<'_>) -> Option<VideoInfo> {
    let card = item.select(&selectors::VIDEO_CARD).next()?;

    let mut title = optional_text(card.select(&selectors::VIDEO_TITLE).next());
    let mut duration = optional_text(card.select(&selectors::VIDEO_DURATION).next());

    // Stat order is positional: play count, then danmaku count.
    let mut stats = card.select(&selectors::VIDEO_STAT);
    let mut play_count = optional_text(stats.next());
    let mut danmaku_count = optional_text(stats.next());

    if duration.is_empty() || play_count.is_empty() {
        let full_text = element_text(&card);

        if duration.is_empty() {
            if let Some(found) = find_duration(&full_text) {
                duration = found.to_string();
            }
        }

        if let Some((play, danmaku)) = find_trailing_stats(&full_text) {
            if play_count.is_empty() {
                play_count = play.to_string();
            }
            if danmaku_count.is_empty() {
                danmaku_count = danmaku.to_string();
            }
        }
    }

    if !duration.is_empty() {
        if let Some(rest) = title.strip_prefix(duration.as_str()) {
            title = rest.trim().to_string();
        }
    }

    Some(VideoInfo {
        title,
        duration,
        play_count,
        danmaku_count,
        link: resolve_video_link(item, &card),
    })
}

/// Parse the quoted original post of a repost, or `None`.
#[must_use]
pub fn parse_forward(item: &ElementRef<'_>) -> Option<ForwardInfo> {
    let original = item.select(&selectors::ORIGINAL).next()?;

    Some(ForwardInfo {
        original_author: optional_text(original.select(&selectors::ORIGINAL_AUTHOR).next()),
        original_text: optional_text(select_first(
            &original,
            &selectors::ORIGINAL_TEXT,
            &selectors::CARD_TEXT,
        )),
    })
}

/// Raw element text kept for the debug block.
#[must_use]
pub fn capture_debug_raw(item: &ElementRef<'_>, has_video: bool) -> DebugRaw {
    DebugRaw {
        author_raw: first_non_empty(item, &selectors::AUTHOR, &selectors::AUTHOR_FALLBACK),
        content_raw: first_non_empty(item, &selectors::CONTENT, &selectors::CARD_TEXT),
        video_raw: has_video
            .then(|| optional_text(item.select(&selectors::VIDEO_CARD).next())),
    }
}

fn first_non_empty(
    item: &ElementRef<'_>,
    primary: &scraper::Selector,
    fallback: &scraper::Selector,
) -> String {
    let text = optional_text(item.select(primary).next());
    if text.is_empty() {
        optional_text(item.select(fallback).next())
    } else {
        text
    }
}

fn find_duration(text: &str) -> Option<&str> {
    DURATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn find_trailing_stats(text: &str) -> Option<(&str, &str)> {
    let caps = TRAILING_STATS.captures(text)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Enclosing link of the card, else first link inside it, else the first
/// video-path link anywhere in the item.
fn resolve_video_link(item: &ElementRef<'_>, card: &ElementRef<'_>) -> String {
    let link = closest_link(card)
        .or_else(|| card.select(&selectors::ANY_LINK).next())
        .or_else(|| item.select(&selectors::VIDEO_PATH_LINK).next());

    link.and_then(|el| el.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| strip_query(&absolutize_url(href)))
        .unwrap_or_default()
}

fn closest_link<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    std::iter::once(**element)
        .chain(element.ancestors())
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::snapshot::FeedSnapshot;

    fn with_item<T>(body: &str, f: impl FnOnce(&ElementRef<'_>) -> T) -> T {
        let snapshot = FeedSnapshot::parse(&format!(
            r#"<html><body><div data-testid="dyn-item">{body}</div></body></html>"#
        ));
        let items = snapshot.items();
        f(&items[0])
    }

    #[test]
    fn test_author_with_protocol_relative_link() {
        let author = with_item(
            r#"<a class="bili-dyn-title__text" href="//space.bilibili.com/42"> Some  UP </a>"#,
            parse_author,
        );
        assert_eq!(author.display_name, "Some UP");
        assert_eq!(author.profile_url, "https://space.bilibili.com/42");
    }

    #[test]
    fn test_author_fallback_without_link() {
        let author = with_item(
            r#"<span class="bili-dyn-author__name">Fallback</span>"#,
            parse_author,
        );
        assert_eq!(author.display_name, "Fallback");
        assert_eq!(author.profile_url, "");
    }

    #[test]
    fn test_author_missing_is_sentinel() {
        let author = with_item(r#"<div class="bili-dyn-content__text">hi</div>"#, parse_author);
        assert_eq!(author, AuthorRef::unknown());
    }

    #[test]
    fn test_video_absent_without_card() {
        let video = with_item(
            r#"<div class="bili-dyn-content__text">12:34 1.2万 3400</div>
               <a href="https://www.bilibili.com/video/BV1">link</a>"#,
            parse_video,
        );
        assert!(video.is_none());
    }

    #[test]
    fn test_video_primary_fields() {
        let video = with_item(
            r#"<a href="//www.bilibili.com/video/BV1xx?spm_id_from=333">
                 <div class="bili-dyn-card-video">
                   <div class="bili-dyn-card-video__duration">12:34</div>
                   <div class="bili-dyn-card-video__title">A title</div>
                   <span class="bili-dyn-card-video__stat-item">5.6万</span>
                   <span class="bili-dyn-card-video__stat-item">789</span>
                 </div>
               </a>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.title, "A title");
        assert_eq!(video.duration, "12:34");
        assert_eq!(video.play_count, "5.6万");
        assert_eq!(video.danmaku_count, "789");
        assert_eq!(video.link, "https://www.bilibili.com/video/BV1xx");
    }

    #[test]
    fn test_video_title_duration_prefix_stripped() {
        let video = with_item(
            r#"<div class="bili-dyn-card-video">
                 <div class="bili-dyn-card-video__duration">03:21</div>
                 <div class="bili-dyn-card-video__title">03:21Real title</div>
               </div>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.duration, "03:21");
        assert_eq!(video.title, "Real title");
    }

    #[test]
    fn test_video_fallback_fills_empty_fields() {
        let video = with_item(
            r#"<div class="bili-dyn-card-video">
                 <div class="bili-dyn-card-video__title">Title</div>
                 <div class="cover">1:02:03</div>
                 <div class="meta">1.2万 3400</div>
               </div>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.duration, "1:02:03");
        assert_eq!(video.play_count, "1.2万");
        assert_eq!(video.danmaku_count, "3400");
    }

    #[test]
    fn test_video_fallback_never_overwrites_primary() {
        let video = with_item(
            r#"<div class="bili-dyn-card-video">
                 <div class="bili-dyn-card-video__duration">10:00</div>
                 <div class="bili-dyn-card-video__title">Title</div>
                 <span class="bili-dyn-card-video__stat-item"></span>
                 <span class="bili-dyn-card-video__stat-item">42</span>
                 <div class="meta">9.9万 8888</div>
               </div>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.duration, "10:00");
        assert_eq!(video.play_count, "9.9万");
        assert_eq!(video.danmaku_count, "42");
    }

    #[test]
    fn test_video_fallback_skipped_when_primary_complete() {
        let video = with_item(
            r#"<div class="bili-dyn-card-video">
                 <div class="bili-dyn-card-video__duration">10:00</div>
                 <div class="bili-dyn-card-video__title">Title</div>
                 <span class="bili-dyn-card-video__stat-item">100</span>
                 <div class="meta">9.9万 8888</div>
               </div>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.play_count, "100");
        assert_eq!(video.danmaku_count, "");
    }

    #[test]
    fn test_video_duration_ignores_dates() {
        let video = with_item(
            r#"<div class="bili-dyn-card-video">
                 <div class="bili-dyn-card-video__title">Trip 2025-01-08</div>
               </div>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.duration, "");
        assert_eq!(video.title, "Trip 2025-01-08");
    }

    #[test]
    fn test_video_link_first_inner_link() {
        let video = with_item(
            r#"<div class="bili-dyn-card-video">
                 <a href="https://www.bilibili.com/video/BV2?from=feed">cover</a>
                 <a href="https://www.bilibili.com/video/BV3">other</a>
               </div>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.link, "https://www.bilibili.com/video/BV2");
    }

    #[test]
    fn test_video_link_item_level_video_path() {
        let video = with_item(
            r#"<a href="https://space.bilibili.com/1">space</a>
               <div class="bili-dyn-card-video">
                 <div class="bili-dyn-card-video__title">Title</div>
               </div>
               <a href="//www.bilibili.com/video/BV4?p=1">watch</a>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.link, "https://www.bilibili.com/video/BV4");
    }

    #[test]
    fn test_video_link_empty_when_none() {
        let video = with_item(
            r#"<div class="bili-dyn-card-video">
                 <div class="bili-dyn-card-video__title">Title</div>
               </div>"#,
            parse_video,
        )
        .unwrap();
        assert_eq!(video.link, "");
    }

    #[test]
    fn test_forward_parsed() {
        let forward = with_item(
            r#"<div class="bili-dyn-content__text">look at this</div>
               <div class="bili-dyn-item__orig">
                 <span class="bili-dyn-orig-author__name">Origin</span>
                 <div class="bili-dyn-content__orig__text">quoted  text</div>
               </div>"#,
            parse_forward,
        )
        .unwrap();
        assert_eq!(forward.original_author, "Origin");
        assert_eq!(forward.original_text, "quoted text");
    }

    #[test]
    fn test_forward_content_fallback() {
        let forward = with_item(
            r#"<div class="bili-dyn-item__orig">
                 <div class="bili-dyn-card-text">card text</div>
               </div>"#,
            parse_forward,
        )
        .unwrap();
        assert_eq!(forward.original_author, "");
        assert_eq!(forward.original_text, "card text");
    }

    #[test]
    fn test_forward_absent() {
        assert!(with_item(r#"<div class="bili-dyn-content__text">x</div>"#, parse_forward).is_none());
    }

    #[test]
    fn test_debug_raw() {
        let raw = with_item(
            r#"<span class="bili-dyn-author__name">Name</span>
               <div class="bili-dyn-content"><div class="bili-dyn-content__text">body</div></div>
               <div class="bili-dyn-card-video">card</div>"#,
            |item| capture_debug_raw(item, true),
        );
        assert_eq!(raw.author_raw, "Name");
        assert_eq!(raw.content_raw, "body");
        assert_eq!(raw.video_raw.as_deref(), Some("card"));
    }

    #[test]
    fn test_find_duration_not_adjacent_to_digits() {
        assert_eq!(find_duration("12:34"), Some("12:34"));
        assert_eq!(find_duration("abc 1:05 x"), Some("1:05"));
        assert_eq!(find_duration("123:45"), None);
        assert_eq!(find_duration("12:345"), None);
    }

    #[test]
    fn test_numeric_patterns_are_ascii_only() {
        assert_eq!(find_duration("１２:３４"), None);
        assert_eq!(find_duration("٣:٤٥"), None);
        assert_eq!(find_duration("１2:34"), Some("2:34"));
        assert_eq!(find_trailing_stats("１.２万 ３４"), None);
        assert_eq!(find_trailing_stats("x 1.2万 34"), Some(("1.2万", "34")));
    }
}
