//! Markdown rendering of collected feed items.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use crate::feed::{AuthorRef, Category, CollectMode, DebugRaw, FeedItem};
use crate::normalize::escape_cell;
use crate::scroll::{ScrollOutcome, STOP_REASON};

/// Run metadata embedded in the report's debug block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugTrace {
    pub mode: &'static str,
    pub start_time: String,
    pub version: &'static str,
    /// Set only when the scroll loop converged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_collected: Option<usize>,
}

impl DebugTrace {
    #[must_use]
    pub fn new(mode: CollectMode, started_at: DateTime<Utc>) -> Self {
        Self {
            mode: mode.as_str(),
            start_time: started_at.to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            scroll_rounds: None,
            stop_reason: None,
            total_collected: None,
        }
    }

    /// Record a converged scroll; an exhausted one leaves no trace.
    pub fn record_scroll(&mut self, outcome: &ScrollOutcome) {
        if let Some(round) = outcome.converged_at {
            self.scroll_rounds = Some(round);
            self.stop_reason = Some(STOP_REASON.to_string());
        }
    }
}

#[derive(Serialize)]
struct DebugBlock<'a> {
    #[serde(flatten)]
    trace: &'a DebugTrace,
    items: Vec<ItemSummary<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary<'a> {
    #[serde(rename = "type")]
    category: Category,
    author: &'a str,
    title: &'a str,
    debug_raw: &'a DebugRaw,
}

/// Render the full Markdown report.
///
/// Each category gets a table only when it has items; order within a
/// category follows `items`.
#[must_use]
pub fn render(items: &[FeedItem], trace: &DebugTrace) -> String {
    let of = move |category: Category| {
        items
            .iter()
            .filter(move |i| i.category() == category)
            .collect::<Vec<_>>()
    };
    let videos = of(Category::Video);
    let notes = of(Category::Note);
    let reposts = of(Category::Repost);

    let mut md = String::from("# Bilibili 关注动态 (V2)\n\n");

    if !videos.is_empty() {
        md.push_str("## 📺 视频\n");
        md.push_str("| UP主 | 标题 | 时长 | 播放 | 弹幕 | 链接 |\n");
        md.push_str("| ---- | ---- | ---- | ---- | ---- | ---- |\n");
        for item in videos {
            if let Some(video) = item.video() {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    author_cell(&item.author),
                    escape_cell(&video.title),
                    escape_cell(&video.duration),
                    escape_cell(&video.play_count),
                    escape_cell(&video.danmaku_count),
                    video.link,
                ));
            }
        }
        md.push('\n');
    }

    if !notes.is_empty() {
        md.push_str("## 📝 动态\n");
        md.push_str("| UP主 | 内容 | 时间 | 链接 |\n");
        md.push_str("| ---- | ---- | ---- | ---- |\n");
        for item in notes {
            md.push_str(&format!(
                "| {} | {} | {} | - |\n",
                author_cell(&item.author),
                escape_cell(&item.text),
                escape_cell(&item.time),
            ));
        }
        md.push('\n');
    }

    if !reposts.is_empty() {
        md.push_str("## 🔁 转发\n");
        md.push_str("| UP主 | 转发理由 | 原作者 | 原内容 |\n");
        md.push_str("| ---- | ---- | ---- | ---- |\n");
        for item in reposts {
            if let Some(forward) = item.forward() {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    author_cell(&item.author),
                    escape_cell(&item.text),
                    escape_cell(&forward.original_author),
                    escape_cell(&forward.original_text),
                ));
            }
        }
        md.push('\n');
    }

    md.push_str("\n---\n## Debug 信息\n```json\n");
    md.push_str(&debug_json(items, trace));
    md.push_str("\n```\n");

    md
}

/// Suggested file name. The report covers yesterday, so the name carries
/// yesterday's date rather than today's.
#[must_use]
pub fn suggested_filename(today: NaiveDate) -> String {
    let yesterday = today.pred_opt().unwrap_or(today);
    format!("bilibili_v2_{}.md", yesterday.format("%Y-%m-%d"))
}

fn author_cell(author: &AuthorRef) -> String {
    let name = escape_cell(&author.display_name);
    if author.profile_url.is_empty() {
        name
    } else {
        format!("[{name}]({})", author.profile_url)
    }
}

fn debug_json(items: &[FeedItem], trace: &DebugTrace) -> String {
    let block = DebugBlock {
        trace,
        items: items
            .iter()
            .map(|item| ItemSummary {
                category: item.category(),
                author: &item.author.display_name,
                title: item.headline(),
                debug_raw: &item.debug_raw,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&block).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize debug block");
        "{}".to_string()
    })
}
