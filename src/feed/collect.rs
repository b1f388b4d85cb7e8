use tracing::debug;

use super::model::{FeedItem, ItemKind};
use super::parse::{capture_debug_raw, parse_author, parse_forward, parse_video};
use super::snapshot::{content_text, time_label, FeedSnapshot};
use crate::timeclass::{classify, is_today, is_yesterday, TimeBucket};

/// Which day's items a collection pass keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    Today,
    Yesterday,
}

impl CollectMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
        }
    }

    fn accepts(self, label: &str) -> bool {
        match self {
            Self::Today => is_today(label),
            Self::Yesterday => is_yesterday(label),
        }
    }
}

/// Collect every rendered item whose time label matches `mode`, in
/// document order. Non-matching items contribute nothing.
#[must_use]
pub fn collect(snapshot: &FeedSnapshot, mode: CollectMode) -> Vec<FeedItem> {
    let rendered = snapshot.items();
    let mut items = Vec::new();

    for element in &rendered {
        let time = time_label(element);
        if time.is_empty() || !mode.accepts(&time) {
            continue;
        }

        let author = parse_author(element);
        let video = parse_video(element);
        let forward = parse_forward(element);
        let debug_raw = capture_debug_raw(element, video.is_some());

        let kind = match (video, forward) {
            (Some(video), _) => ItemKind::Video(video),
            (None, Some(forward)) => ItemKind::Repost(forward),
            (None, None) => ItemKind::Note,
        };

        items.push(FeedItem {
            author,
            time,
            text: content_text(element),
            kind,
            debug_raw,
        });
    }

    debug!(
        mode = mode.as_str(),
        rendered = rendered.len(),
        collected = items.len(),
        "Collected feed items"
    );

    items
}

/// Per-round counts read by the scroll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTally {
    pub yesterday: usize,
    pub saw_two_days_ago: bool,
}

/// Count yesterday items and note whether two-days-ago content is rendered.
#[must_use]
pub fn tally(snapshot: &FeedSnapshot) -> RoundTally {
    snapshot
        .items()
        .iter()
        .map(|element| classify(&time_label(element)))
        .fold(RoundTally::default(), |mut acc, bucket| {
            match bucket {
                TimeBucket::Yesterday => acc.yesterday += 1,
                TimeBucket::TwoDaysAgo => acc.saw_two_days_ago = true,
                TimeBucket::Today | TimeBucket::Other => {}
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::model::Category;

    fn page(items: &[&str]) -> FeedSnapshot {
        let body: String = items
            .iter()
            .map(|inner| format!(r#"<div data-testid="dyn-item">{inner}</div>"#))
            .collect();
        FeedSnapshot::parse(&format!("<html><body>{body}</body></html>"))
    }

    fn note(time: &str, text: &str) -> String {
        format!(
            r#"<span class="bili-dyn-title__text">UP</span>
               <div class="bili-dyn-time">{time}</div>
               <div class="bili-dyn-content__text">{text}</div>"#
        )
    }

    #[test]
    fn test_mode_filter_keeps_only_matching() {
        let snapshot = page(&[
            &note("昨天 09:00", "a"),
            &note("3小时前", "b"),
            &note("昨天 23:59", "c"),
            &note("2天前", "d"),
            &note("", "e"),
        ]);

        let yesterday = collect(&snapshot, CollectMode::Yesterday);
        let texts: Vec<_> = yesterday.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert!(yesterday.iter().all(|i| is_yesterday(&i.time)));

        let today = collect(&snapshot, CollectMode::Today);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].text, "b");
    }

    #[test]
    fn test_category_precedence() {
        let video_and_forward = r#"
            <div class="bili-dyn-time">昨天 10:00</div>
            <div class="bili-dyn-card-video"><div class="bili-dyn-card-video__title">V</div></div>
            <div class="bili-dyn-item__orig"><div class="bili-dyn-card-text">O</div></div>"#;
        let forward_only = r#"
            <div class="bili-dyn-time">昨天 10:00</div>
            <div class="bili-dyn-item__orig"><div class="bili-dyn-card-text">O</div></div>"#;
        let snapshot = page(&[video_and_forward, forward_only, &note("昨天 10:00", "n")]);

        let categories: Vec<_> = collect(&snapshot, CollectMode::Yesterday)
            .iter()
            .map(FeedItem::category)
            .collect();
        assert_eq!(
            categories,
            vec![Category::Video, Category::Repost, Category::Note]
        );
    }

    #[test]
    fn test_item_without_author_still_collected() {
        let snapshot = page(&[r#"<time>昨天 1:00</time><div class="bili-dyn-card-text">x</div>"#]);
        let items = collect(&snapshot, CollectMode::Yesterday);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].author.display_name, "未知作者");
        assert_eq!(items[0].text, "x");
    }

    #[test]
    fn test_items_with_either_marker_collected() {
        let snapshot = FeedSnapshot::parse(&format!(
            r#"<html><body>
                <div data-testid="dyn-item">{}</div>
                <div class="bili-dyn-item">{}</div>
            </body></html>"#,
            note("昨天 10:00", "primary"),
            note("昨天 11:00", "fallback"),
        ));
        let texts: Vec<_> = collect(&snapshot, CollectMode::Yesterday)
            .into_iter()
            .map(|i| i.text)
            .collect();
        assert_eq!(texts, vec!["primary", "fallback"]);
    }

    #[test]
    fn test_tally() {
        let snapshot = page(&[
            &note("昨天 09:00", "a"),
            &note("昨天 08:00", "b"),
            &note("刚刚", "c"),
        ]);
        assert_eq!(
            tally(&snapshot),
            RoundTally {
                yesterday: 2,
                saw_two_days_ago: false
            }
        );

        let snapshot = page(&[&note("昨天 09:00", "a"), &note("2天前", "d")]);
        assert_eq!(
            tally(&snapshot),
            RoundTally {
                yesterday: 1,
                saw_two_days_ago: true
            }
        );
    }
}
