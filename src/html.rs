use maud::{DOCTYPE, Markup, html};
use url::Url;

use crate::bucket::FeedBuckets;
use crate::fallback::CATEGORIES;
use crate::load::{CommunityPage, Directory, LoadState};
use crate::model::{Access, AccessKind, Author, Community, DisplayTopic, SidebarEntry};

/// Where links point: flat files on disk or routes of the live server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Links {
    Static,
    Served,
}

impl Links {
    pub fn home(self) -> &'static str {
        match self {
            Links::Static => "index.html",
            Links::Served => "/",
        }
    }

    pub fn community(self, id: &str) -> String {
        match self {
            Links::Static => format!("community-{}.html", file_safe_id(id)),
            Links::Served => served_path(&["community", id]),
        }
    }

    /// Form target for joining; static pages have nowhere to post to.
    pub fn join(self, id: &str) -> Option<String> {
        match self {
            Links::Static => None,
            Links::Served => Some(format!("{}/join", self.community(id))),
        }
    }

    pub fn stylesheet(self) -> &'static str {
        match self {
            Links::Static => "assets/css/site.css",
            Links::Served => "/assets/site.css",
        }
    }

    /// Reloading a served page fetches again; a static page cannot.
    fn retry(self, page_href: &str) -> Option<String> {
        match self {
            Links::Static => None,
            Links::Served => Some(format!("{page_href}?retry=true")),
        }
    }
}

/// Absolute path with each segment percent-encoded as a path segment.
fn served_path(segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return "/".to_string();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

/// File-name form of an id. ASCII letters, digits and `-` pass through; every
/// other byte becomes `_XX` (hex), so distinct ids never share a file.
pub fn file_safe_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("_{b:02X}"));
        }
    }
    out
}

fn page(title: &str, links: Links, body: Markup) -> String {
    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href=(links.stylesheet());
            }
            body class="fh" {
                header class="fh-topbar" {
                    div class="fh-container fh-topbar-inner" {
                        a class="fh-brand" href=(links.home()) { "ForumHub" }
                    }
                }
                (body)
                footer class="fh-footer" {
                    div class="fh-container" { "© ForumHub. All rights reserved." }
                }
            }
        }
    };
    markup.into_string()
}

pub fn build_home(
    feed: &LoadState<FeedBuckets>,
    directory: &LoadState<Directory>,
    links: Links,
) -> String {
    let sidebar_entries = directory.content().map(|d| d.sidebar.as_slice()).unwrap_or(&[]);
    let body = html! {
        div class="fh-container fh-layout" {
            (render_sidebar(sidebar_entries, links))
            main class="fh-main" {
                (tabs("home", &[
                    ("feed", "Feed".to_string(), render_feed(feed, links)),
                    ("discover", "Discover".to_string(), render_discover(directory, links)),
                    ("subscribed", "My Communities".to_string(), render_joined(directory, links)),
                ]))
            }
        }
    };
    page("Community Forum", links, body)
}

pub fn build_community(state: &LoadState<CommunityPage>, page_id: &str, links: Links) -> String {
    match state.content() {
        None => page(
            "Community",
            links,
            html! { main class="fh-container fh-main" { p class="fh-loading" { "Loading community..." } } },
        ),
        Some(CommunityPage::NotFound) => build_not_found(links),
        Some(CommunityPage::Found { community, topics }) => {
            let body = html! {
                main class="fh-container fh-main" {
                    @if let Some(message) = state.error() {
                        (error_banner(message, links.retry(&links.community(page_id))))
                    }
                    (render_community_header(community, links))
                    (tabs("community", &[
                        ("topics", format!("Topics ({})", topics.len()), render_community_topics(topics)),
                        ("about", "About".to_string(), render_about(community)),
                        ("members", "Members".to_string(), render_members(community)),
                    ]))
                }
            };
            page(&community.name, links, body)
        }
    }
}

pub fn build_not_found(links: Links) -> String {
    let body = html! {
        main class="fh-container fh-main fh-center" {
            p class="fh-muted" { "Community not found" }
            a class="fh-btn fh-btn-outline" href=(links.home()) { "← Back to Home" }
        }
    };
    page("Community not found", links, body)
}

pub fn build_subscription_required(c: &Community, links: Links) -> String {
    let body = html! {
        main class="fh-container fh-main fh-center" {
            h1 { (c.name) }
            p class="fh-muted" { "This community needs a subscription: " (c.access.badge()) }
            a class="fh-btn fh-btn-outline" href=(links.community(&c.id)) { "← Back to Community" }
        }
    };
    page("Subscription required", links, body)
}

/// CSS-only tab strip: radio inputs, labels, then panels in the same order.
fn tabs(group: &str, tabs: &[(&str, String, Markup)]) -> Markup {
    html! {
        div class="fh-tabs" {
            @for (i, (key, label, _)) in tabs.iter().enumerate() {
                @let id = format!("{group}-tab-{key}");
                input type="radio" class="fh-tab-toggle" name=(format!("{group}-tabs")) id=(id) checked[i == 0];
                label class="fh-tab-label" for=(id) { (label) }
            }
            @for (key, _, panel) in tabs {
                div class=(format!("fh-tab-panel fh-panel-{key}")) { (panel) }
            }
        }
    }
}

fn error_banner(message: &str, retry_href: Option<String>) -> Markup {
    html! {
        div class="fh-error" role="alert" {
            p { (message) }
            @if let Some(href) = retry_href {
                a class="fh-btn fh-btn-outline" href=(href) { "Try Again" }
            }
        }
    }
}

pub fn render_feed(state: &LoadState<FeedBuckets>, links: Links) -> Markup {
    let Some(feed) = state.content() else {
        return html! { p class="fh-loading" { "Loading topics..." } };
    };
    html! {
        section class="fh-feed" {
            h1 { "Community Forum" }
            p class="fh-muted" { "Discover discussions and connect with community members" }
            @if let Some(message) = state.error() {
                (error_banner(message, links.retry(links.home())))
            }
            (tabs("feed", &[
                ("featured", format!("Featured ({})", feed.featured.len()),
                    topic_list(&feed.featured, "No featured topics available")),
                ("recent", format!("Recent ({})", feed.recent.len()),
                    topic_list(&feed.recent, "No recent discussions available")),
                ("announcements", format!("Announcements ({})", feed.announcements.len()),
                    topic_list(&feed.announcements, "No announcements available")),
            ]))
        }
    }
}

fn topic_list(topics: &[DisplayTopic], empty: &str) -> Markup {
    html! {
        @if topics.is_empty() {
            p class="fh-empty" { (empty) }
        } @else {
            div class="fh-topic-list" {
                @for t in topics { (render_topic_card(t)) }
            }
        }
    }
}

fn avatar(src: Option<&str>, name: &str, fallback: String) -> Markup {
    html! {
        @if let Some(src) = src {
            img class="fh-avatar" width="32" height="32" src=(src) alt=(name);
        } @else {
            span class="fh-avatar fh-avatar-fallback" title=(name) { (fallback) }
        }
    }
}

fn author_avatar(author: &Author) -> Markup {
    avatar(author.avatar.as_deref(), &author.name, author.initial())
}

pub fn render_topic_card(t: &DisplayTopic) -> Markup {
    html! {
        article class="fh-topic-card" id=(format!("topic-{}", t.id)) {
            header class="fh-card-header" {
                div class="fh-topic-author" {
                    (author_avatar(&t.author))
                    div {
                        p class="fh-author-name" { (t.author.name) }
                        @if !t.timestamp.is_empty() {
                            p class="fh-timestamp" { (t.timestamp) }
                        }
                    }
                }
                div class="fh-badges" {
                    @if t.is_pinned { span class="fh-badge fh-badge-pinned" { "Pinned" } }
                    @if t.is_featured { span class="fh-badge fh-badge-featured" { "Featured" } }
                    @if t.is_new { span class="fh-badge fh-badge-new" { "New" } }
                    @match (&t.community, &t.sub_community) {
                        (Some(c), Some(s)) => {
                            span class="fh-badge fh-badge-outline" { (c) " / " (s) }
                        }
                        (Some(c), None) | (None, Some(c)) => {
                            span class="fh-badge fh-badge-outline" { (c) }
                        }
                        (None, None) => {}
                    }
                }
            }
            h3 class="fh-topic-title" { (t.title) }
            p class="fh-topic-content" { (t.content) }
            footer class="fh-topic-stats" {
                span class="fh-stat fh-likes" title="Likes" { "♥ " (t.likes) }
                span class="fh-stat fh-comments" title="Comments" { "💬 " (t.comments) }
            }
        }
    }
}

fn access_badge(access: &Access) -> Markup {
    let class = match access.kind() {
        AccessKind::Free => "fh-badge fh-badge-free",
        AccessKind::Paid => "fh-badge fh-badge-price",
        AccessKind::Introductory => "fh-badge fh-badge-trial",
    };
    html! { span class=(class) { (access.badge()) } }
}

fn community_action(c: &Community, links: Links) -> Markup {
    html! {
        @if c.joined {
            span class="fh-btn fh-btn-outline fh-joined" { "Joined" }
        } @else if c.access.kind() == AccessKind::Free {
            @if let Some(action) = links.join(&c.id) {
                form method="post" action=(action) class="fh-inline" {
                    button type="submit" class="fh-btn fh-btn-primary" { "Join Community" }
                }
            } @else {
                a class="fh-btn fh-btn-primary" href=(links.community(&c.id)) { "Join Community" }
            }
        } @else {
            a class="fh-btn fh-btn-accent" href=(links.community(&c.id)) { "Subscribe" }
        }
    }
}

fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

pub fn render_community_card(c: &Community, links: Links) -> Markup {
    let href = links.community(&c.id);
    let hidden = c.hidden_member_count();
    html! {
        article class="fh-community-card" id=(format!("community-{}", c.id)) {
            @if let Some(cover) = &c.cover_image {
                a class="fh-cover" href=(href) {
                    img src=(cover) alt=(format!("{} cover", c.name));
                }
            }
            div class="fh-card-body" {
                div class="fh-card-title" {
                    h3 { a href=(href) { (c.name) } }
                    (access_badge(&c.access))
                }
                p class="fh-description" { (c.description) }
                ul class="fh-community-stats" {
                    li { (c.member_count) " members" }
                    li { (c.topic_count) " topics" }
                    li class="fh-activity" { (c.activity.as_str()) }
                }
                @if !c.featured_members.is_empty() {
                    div class="fh-featured-members" {
                        p class="fh-muted" { "Featured members" }
                        div class="fh-avatar-stack" {
                            @for m in &c.featured_members {
                                span class="fh-member" data-member-id=(m.id) {
                                    (avatar(m.avatar.as_deref(), &m.name, initials(&m.name)))
                                }
                            }
                            @if hidden > 0 {
                                span class="fh-avatar fh-avatar-more" { "+" (hidden) }
                            }
                        }
                    }
                }
            }
            footer class="fh-card-footer" { (community_action(c, links)) }
        }
    }
}

fn community_grid(communities: &[Community], empty: &str, links: Links) -> Markup {
    html! {
        @if communities.is_empty() {
            p class="fh-empty" { (empty) }
        } @else {
            div class="fh-community-grid" {
                @for c in communities { (render_community_card(c, links)) }
            }
        }
    }
}

fn render_discover(state: &LoadState<Directory>, links: Links) -> Markup {
    let Some(dir) = state.content() else {
        return html! { p class="fh-loading" { "Loading communities..." } };
    };
    html! {
        section class="fh-discover" {
            h2 { "Discover Communities" }
            p class="fh-muted" { "Find and join communities that match your interests" }
            @if let Some(message) = state.error() {
                (error_banner(message, links.retry(links.home())))
            }
            (community_grid(&dir.communities.discoverable, "No communities to discover", links))
        }
    }
}

fn render_joined(state: &LoadState<Directory>, links: Links) -> Markup {
    let Some(dir) = state.content() else {
        return html! { p class="fh-loading" { "Loading communities..." } };
    };
    html! {
        section class="fh-joined-communities" {
            h2 { "My Communities" }
            p class="fh-muted" { "Communities you've joined" }
            (community_grid(&dir.communities.joined, "You haven't joined any communities yet", links))
        }
    }
}

fn subscription_icon(kind: AccessKind) -> Markup {
    let (glyph, class) = match kind {
        AccessKind::Free => ("●", "fh-sub-free"),
        AccessKind::Paid => ("★", "fh-sub-paid"),
        AccessKind::Introductory => ("◆", "fh-sub-introductory"),
    };
    html! { span class=(format!("fh-sub-icon {class}")) title=(kind.as_str()) { (glyph) } }
}

pub fn render_sidebar(entries: &[SidebarEntry], links: Links) -> Markup {
    html! {
        aside class="fh-sidebar" {
            h2 { "My Communities" }
            a class="fh-btn fh-btn-outline fh-block" href=(links.home()) { "+ Join New Community" }
            @if entries.is_empty() {
                p class="fh-muted" { "No communities yet" }
            } @else {
                ul class="fh-sidebar-communities" {
                    @for e in entries {
                        li {
                            a class="fh-sidebar-item" href=(links.community(&e.community_id)) {
                                (subscription_icon(e.subscription))
                                span class="fh-sidebar-name" { (e.name) }
                                @if e.has_new_activity {
                                    span class="fh-badge fh-unread" {
                                        @if let Some(n) = e.unread_count.filter(|n| *n > 0) { (n) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            hr;
            h3 { "Categories" }
            ul class="fh-categories" {
                @for category in CATEGORIES { li { (category) } }
            }
        }
    }
}

fn render_community_header(c: &Community, links: Links) -> Markup {
    html! {
        header class="fh-community-header" {
            a class="fh-back" href=(links.home()) { "← Back to Communities" }
            @if let Some(cover) = &c.cover_image {
                img class="fh-community-cover" src=(cover) alt=(format!("{} cover", c.name));
            }
            div class="fh-card-title" {
                h1 { (c.name) }
                (access_badge(&c.access))
            }
            p class="fh-description" { (c.description) }
            ul class="fh-community-stats" {
                li { (c.member_count) " members" }
                li { (c.topic_count) " topics" }
                li class="fh-activity" { (c.activity.as_str()) " activity" }
            }
            div class="fh-actions" {
                (community_action(c, links))
                button type="button" class="fh-btn fh-btn-primary" disabled { "+ New Topic" }
            }
        }
    }
}

fn render_community_topics(topics: &[DisplayTopic]) -> Markup {
    html! {
        @if topics.is_empty() {
            div class="fh-empty fh-empty-topics" {
                h3 { "No topics yet" }
                p class="fh-muted" { "Be the first to start a discussion in this community!" }
                button type="button" class="fh-btn fh-btn-primary" disabled { "+ Create First Topic" }
            }
        } @else {
            div class="fh-topic-list" {
                @for t in topics { (render_topic_card(t)) }
            }
        }
    }
}

fn render_about(c: &Community) -> Markup {
    let price = match (c.access.kind(), c.access.price()) {
        (_, Some(price)) => format!("${price}"),
        (AccessKind::Free, None) => "Free".to_string(),
        _ => "Trial".to_string(),
    };
    html! {
        section class="fh-about" {
            h2 { "About " (c.name) }
            p class="fh-description" { (c.description) }
            dl class="fh-about-grid" {
                div { dt { "Members" } dd { (c.member_count) } }
                div { dt { "Topics" } dd { (c.topic_count) } }
                div { dt { "Activity" } dd class="fh-activity" { (c.activity.as_str()) } }
                div { dt { "Price" } dd { (price) } }
            }
        }
    }
}

fn render_members(c: &Community) -> Markup {
    html! {
        section class="fh-members" {
            h2 { "Community Members" }
            p class="fh-muted" { (c.member_count) " members in this community" }
            p class="fh-empty" { "Member list feature coming soon!" }
        }
    }
}
