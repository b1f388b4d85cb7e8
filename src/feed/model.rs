use serde::Serialize;

/// Display name used when a feed item has no author element.
pub const UNKNOWN_AUTHOR: &str = "未知作者";

/// Kind of post a feed item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "视频")]
    Video,
    #[serde(rename = "动态")]
    Note,
    #[serde(rename = "转发")]
    Repost,
}

impl Category {
    /// Label used for the category in the rendered report.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "视频",
            Self::Note => "动态",
            Self::Repost => "转发",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    pub display_name: String,
    /// Absolute profile URL, or empty when the author element has no link.
    pub profile_url: String,
}

impl AuthorRef {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            display_name: UNKNOWN_AUTHOR.to_string(),
            profile_url: String::new(),
        }
    }
}

/// Structured data from an embedded video card.
///
/// Every field may be empty; `title` never starts with `duration`
/// when `duration` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    pub duration: String,
    pub play_count: String,
    pub danmaku_count: String,
    /// Absolute, query-free video URL, or empty.
    pub link: String,
}

/// The quoted post inside a repost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardInfo {
    pub original_author: String,
    pub original_text: String,
}

/// Raw element text captured alongside a parsed item, for the debug block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugRaw {
    pub author_raw: String,
    pub content_raw: String,
    pub video_raw: Option<String>,
}

/// Post payload. Holding the sub-record inside the variant keeps
/// category and sub-record in agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Video(VideoInfo),
    Note,
    Repost(ForwardInfo),
}

/// One collected post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub author: AuthorRef,
    /// Time label exactly as displayed.
    pub time: String,
    pub text: String,
    pub kind: ItemKind,
    pub debug_raw: DebugRaw,
}

impl FeedItem {
    #[must_use]
    pub fn category(&self) -> Category {
        match self.kind {
            ItemKind::Video(_) => Category::Video,
            ItemKind::Note => Category::Note,
            ItemKind::Repost(_) => Category::Repost,
        }
    }

    #[must_use]
    pub fn video(&self) -> Option<&VideoInfo> {
        match &self.kind {
            ItemKind::Video(video) => Some(video),
            _ => None,
        }
    }

    #[must_use]
    pub fn forward(&self) -> Option<&ForwardInfo> {
        match &self.kind {
            ItemKind::Repost(forward) => Some(forward),
            _ => None,
        }
    }

    /// Category-specific one-line summary used in the debug block.
    #[must_use]
    pub fn headline(&self) -> &str {
        match &self.kind {
            ItemKind::Video(video) => &video.title,
            ItemKind::Repost(forward) => &forward.original_text,
            ItemKind::Note => &self.text,
        }
    }
}
