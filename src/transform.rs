use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::model::{
    Access, AccessKind, ActivityLevel, Author, Community, DisplayTopic, SidebarEntry,
};
use crate::row::{CommunityRow, MembershipRow, TopicRow};

/// Relative age of a post: "Just now", "{n} hours ago" or "{n} day(s) ago".
pub fn humanize_elapsed(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = now.signed_duration_since(created).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else {
        let days = hours / 24;
        format!("{days} day{} ago", if days > 1 { "s" } else { "" })
    }
}

/// Parses an RFC 3339 instant; offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn humanize_raw(raw: Option<&str>, now: DateTime<Utc>) -> String {
    match raw.and_then(parse_timestamp) {
        Some(created) => humanize_elapsed(created, now),
        None => {
            tracing::debug!(created_at = ?raw, "no usable creation time");
            String::new()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn display_topic(row: TopicRow, now: DateTime<Utc>) -> DisplayTopic {
    let timestamp = humanize_raw(row.created_at.as_deref(), now);
    DisplayTopic {
        id: row.id,
        title: row.title,
        content: row.content,
        author: Author {
            name: row.author_name,
            avatar: non_empty(row.author_avatar),
        },
        community: non_empty(row.community),
        sub_community: non_empty(row.sub_community),
        timestamp,
        likes: row.likes.unwrap_or(0),
        comments: row.comments.unwrap_or(0),
        is_featured: row.is_featured.unwrap_or(false),
        is_new: row.is_new.unwrap_or(false),
        is_pinned: row.is_pinned.unwrap_or(false),
    }
}

pub fn display_topics(rows: Vec<TopicRow>, now: DateTime<Utc>) -> Vec<DisplayTopic> {
    rows.into_iter().map(|row| display_topic(row, now)).collect()
}

/// Converts a community row, rejecting rows whose type and price disagree.
pub fn community(row: CommunityRow) -> Result<Community, String> {
    let kind = match row.kind.as_deref() {
        None => AccessKind::Free,
        Some(raw) => AccessKind::parse(raw)
            .ok_or_else(|| format!("community {}: unknown type {raw:?}", row.id))?,
    };
    let access = match kind {
        AccessKind::Free => Access::Free,
        AccessKind::Introductory => Access::Introductory,
        AccessKind::Paid => match row.price {
            Some(price) if price.is_finite() && price >= 0.0 => Access::Paid { price },
            Some(price) => return Err(format!("community {}: invalid price {price}", row.id)),
            None => return Err(format!("community {}: paid without a price", row.id)),
        },
    };
    if kind != AccessKind::Paid && row.price.is_some() {
        tracing::debug!(community = %row.id, "ignoring price on non-paid community");
    }

    let activity = match row.activity_level.as_deref() {
        None => ActivityLevel::Low,
        Some(raw) => ActivityLevel::parse(raw)
            .ok_or_else(|| format!("community {}: unknown activity level {raw:?}", row.id))?,
    };

    Ok(Community {
        id: row.id,
        name: row.name,
        description: row.description.unwrap_or_default(),
        member_count: row.member_count.unwrap_or(0),
        topic_count: row.topic_count.unwrap_or(0),
        activity,
        access,
        cover_image: non_empty(row.cover_image),
        featured_members: Vec::new(),
        joined: false,
    })
}

/// Joins memberships to their communities, keeping membership order.
pub fn sidebar_entries(memberships: Vec<MembershipRow>, communities: &[Community]) -> Vec<SidebarEntry> {
    let by_id: HashMap<&str, &Community> =
        communities.iter().map(|c| (c.id.as_str(), c)).collect();

    memberships
        .into_iter()
        .filter_map(|m| {
            let id = m.community_id?;
            let Some(community) = by_id.get(id.as_str()) else {
                tracing::debug!(community = %id, "membership without a known community");
                return None;
            };
            let subscription = m
                .subscription_type
                .as_deref()
                .and_then(AccessKind::parse)
                .unwrap_or_else(|| community.access.kind());
            Some(SidebarEntry {
                community_id: id,
                name: community.name.clone(),
                subscription,
                has_new_activity: m.has_new_activity.unwrap_or(false),
                unread_count: m.unread_count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn ago(d: Duration) -> String {
        humanize_elapsed(now() - d, now())
    }

    #[test]
    fn humanize_boundaries() {
        assert_eq!(ago(Duration::zero()), "Just now");
        assert_eq!(ago(Duration::minutes(59)), "Just now");
        assert_eq!(ago(Duration::minutes(60)), "1 hours ago");
        assert_eq!(ago(Duration::hours(23) + Duration::minutes(59)), "23 hours ago");
        assert_eq!(ago(Duration::hours(24)), "1 day ago");
        assert_eq!(ago(Duration::hours(47)), "1 day ago");
        assert_eq!(ago(Duration::hours(48)), "2 days ago");
        assert_eq!(ago(Duration::days(30)), "30 days ago");
    }

    #[test]
    fn future_instants_are_just_now() {
        assert_eq!(humanize_elapsed(now() + Duration::hours(3), now()), "Just now");
    }

    #[test]
    fn parses_store_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 9, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-09T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-09T08:30:00.000+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-09T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-09T08:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    fn topic_row() -> TopicRow {
        serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Hello",
            "content": "Body",
            "author_name": "Sarah",
            "author_avatar": "",
            "community": "General",
            "sub_community": "Discussions",
            "likes": 4,
            "comments": null,
            "is_new": true,
            "created_at": "2026-03-10T07:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn display_topic_fills_defaults() {
        let t = display_topic(topic_row(), now());
        assert_eq!(t.timestamp, "5 hours ago");
        assert_eq!(t.author.avatar, None);
        assert_eq!(t.likes, 4);
        assert_eq!(t.comments, 0);
        assert!(t.is_new);
        assert!(!t.is_featured);
        assert!(!t.is_pinned);
        assert_eq!(t.community.as_deref(), Some("General"));
    }

    #[test]
    fn display_topic_without_creation_time_has_empty_timestamp() {
        let mut row = topic_row();
        row.created_at = None;
        assert_eq!(display_topic(row, now()).timestamp, "");
    }

    fn community_row(kind: Option<&str>, price: Option<f64>) -> CommunityRow {
        CommunityRow {
            id: "c1".to_string(),
            name: "Rust".to_string(),
            description: None,
            member_count: Some(10),
            topic_count: None,
            activity_level: Some("medium".to_string()),
            kind: kind.map(str::to_string),
            price,
            cover_image: Some(" ".to_string()),
        }
    }

    #[test]
    fn community_price_follows_type() {
        let paid = community(community_row(Some("paid"), Some(9.99))).unwrap();
        assert_eq!(paid.access, Access::Paid { price: 9.99 });

        let free = community(community_row(Some("free"), Some(5.0))).unwrap();
        assert_eq!(free.access, Access::Free);
        assert_eq!(free.access.price(), None);
        assert_eq!(free.cover_image, None);

        let untyped = community(community_row(None, None)).unwrap();
        assert_eq!(untyped.access, Access::Free);

        assert!(community(community_row(Some("paid"), None)).is_err());
        assert!(community(community_row(Some("vip"), None)).is_err());
    }

    #[test]
    fn sidebar_joins_by_community_id() {
        let communities = vec![
            community(community_row(Some("paid"), Some(3.0))).unwrap(),
        ];
        let memberships: Vec<MembershipRow> = serde_json::from_value(serde_json::json!([
            { "user_id": "u1", "community_id": "c1", "unread_count": 2, "has_new_activity": true },
            { "user_id": "u1", "community_id": "gone" },
            { "user_id": "u1" }
        ]))
        .unwrap();

        let entries = sidebar_entries(memberships, &communities);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Rust");
        assert_eq!(entries[0].subscription, AccessKind::Paid);
        assert_eq!(entries[0].unread_count, Some(2));
        assert!(entries[0].has_new_activity);
    }
}
