//! Sample content shown whenever a live fetch fails.

use crate::bucket::FeedBuckets;
use crate::model::{
    Access, AccessKind, ActivityLevel, Author, Community, DisplayTopic, Member, SidebarEntry,
};

fn avatar(seed: &str) -> Option<String> {
    Some(format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}"))
}

fn cover(photo: &str) -> Option<String> {
    Some(format!("https://images.unsplash.com/{photo}?w=800&q=80"))
}

#[allow(clippy::too_many_arguments)]
fn topic(
    id: &str,
    title: &str,
    content: &str,
    (author, seed): (&str, &str),
    labels: Option<(&str, &str)>,
    timestamp: &str,
    (likes, comments): (u64, u64),
    (is_featured, is_new, is_pinned): (bool, bool, bool),
) -> DisplayTopic {
    DisplayTopic {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        author: Author {
            name: author.to_string(),
            avatar: avatar(seed),
        },
        community: labels.map(|(c, _)| c.to_string()),
        sub_community: labels.map(|(_, s)| s.to_string()),
        timestamp: timestamp.to_string(),
        likes,
        comments,
        is_featured,
        is_new,
        is_pinned,
    }
}

pub fn featured_topics() -> Vec<DisplayTopic> {
    vec![
        topic(
            "1",
            "Welcome to our new forum platform!",
            "We are excited to launch our new community forum platform. Join the discussion and connect with other members.",
            ("Admin", "admin"),
            Some(("General", "Announcements")),
            "2 days ago",
            (42, 15),
            (true, false, false),
        ),
        topic(
            "2",
            "Tips for getting the most out of the community",
            "Here are some tips to help you get the most out of your community experience and connect with other members.",
            ("Moderator", "moderator"),
            Some(("Help", "Getting Started")),
            "3 days ago",
            (38, 22),
            (true, false, false),
        ),
    ]
}

pub fn recent_topics() -> Vec<DisplayTopic> {
    vec![
        topic(
            "3",
            "What is your favorite feature so far?",
            "I am curious to hear what features everyone is enjoying the most on our new platform!",
            ("Sarah", "sarah"),
            Some(("General", "Discussions")),
            "5 hours ago",
            (12, 8),
            (false, true, false),
        ),
        topic(
            "4",
            "Introducing myself to the community",
            "Hello everyone! I am new here and wanted to introduce myself. I am excited to be part of this community.",
            ("NewMember", "newmember"),
            Some(("General", "Introductions")),
            "1 day ago",
            (24, 18),
            (false, false, false),
        ),
    ]
}

pub fn announcements() -> Vec<DisplayTopic> {
    vec![topic(
        "6",
        "Upcoming maintenance window",
        "We will be performing scheduled maintenance this weekend. The platform may be unavailable for a short period.",
        ("System", "system"),
        Some(("General", "Announcements")),
        "1 day ago",
        (5, 3),
        (false, false, false),
    )]
}

/// The sample feed, already split into its tabs.
pub fn feed() -> FeedBuckets {
    FeedBuckets {
        featured: featured_topics(),
        recent: recent_topics(),
        announcements: announcements(),
    }
}

fn member(id: &str, name: &str, seed: &str) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
        avatar: avatar(seed),
    }
}

#[allow(clippy::too_many_arguments)]
fn community(
    id: &str,
    name: &str,
    description: &str,
    (member_count, topic_count): (u64, u64),
    activity: ActivityLevel,
    access: Access,
    photo: &str,
    featured_members: Vec<Member>,
) -> Community {
    Community {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        member_count,
        topic_count,
        activity,
        access,
        cover_image: cover(photo),
        featured_members,
        joined: false,
    }
}

pub fn communities() -> Vec<Community> {
    vec![
        community(
            "1",
            "Web Development",
            "A community for web developers to share knowledge and discuss the latest trends.",
            (1250, 342),
            ActivityLevel::High,
            Access::Free,
            "photo-1579546929518-9e396f3cc809",
            vec![
                member("u1", "Alex Johnson", "Alex"),
                member("u2", "Maria Garcia", "Maria"),
                member("u3", "David Kim", "David"),
            ],
        ),
        community(
            "2",
            "UX/UI Design",
            "For designers focused on creating beautiful and functional user experiences.",
            (875, 218),
            ActivityLevel::High,
            Access::Paid { price: 9.99 },
            "photo-1561070791-2526d30994b5",
            vec![
                member("u4", "Emma Wilson", "Emma"),
                member("u5", "James Lee", "James"),
            ],
        ),
        community(
            "3",
            "Data Science",
            "Explore data analysis, machine learning, and AI with fellow data enthusiasts.",
            (620, 175),
            ActivityLevel::Medium,
            Access::Introductory,
            "photo-1551288049-bebda4e38f71",
            vec![
                member("u6", "Sophia Chen", "Sophia"),
                member("u7", "Michael Brown", "Michael"),
                member("u8", "Olivia Smith", "Olivia"),
            ],
        ),
        community(
            "4",
            "Mobile Development",
            "For iOS, Android, and cross-platform mobile app developers.",
            (945, 287),
            ActivityLevel::High,
            Access::Free,
            "photo-1601972599720-36938d4ecd31",
            vec![
                member("u9", "Daniel Park", "Daniel"),
                member("u10", "Isabella Lopez", "Isabella"),
            ],
        ),
        community(
            "5",
            "DevOps & Cloud",
            "Discuss cloud platforms, CI/CD, containerization, and infrastructure as code.",
            (530, 142),
            ActivityLevel::Medium,
            Access::Paid { price: 12.99 },
            "photo-1451187580459-43490279c0fa",
            vec![
                member("u11", "Noah Taylor", "Noah"),
                member("u12", "Ava Martinez", "Ava"),
            ],
        ),
        community(
            "6",
            "Game Development",
            "For game developers working with engines like Unity, Unreal, and more.",
            (780, 210),
            ActivityLevel::High,
            Access::Introductory,
            "photo-1552820728-8b83bb6b773f",
            vec![
                member("u13", "Liam Wilson", "Liam"),
                member("u14", "Charlotte Davis", "Charlotte"),
                member("u15", "Ethan Rodriguez", "Ethan"),
            ],
        ),
    ]
}

fn sidebar_entry(id: &str, name: &str, kind: AccessKind, unread: Option<u64>) -> SidebarEntry {
    SidebarEntry {
        community_id: id.to_string(),
        name: name.to_string(),
        subscription: kind,
        has_new_activity: unread.is_some(),
        unread_count: unread,
    }
}

pub fn sidebar() -> Vec<SidebarEntry> {
    vec![
        sidebar_entry("1", "Web Development", AccessKind::Free, Some(3)),
        sidebar_entry("2", "UI/UX Design", AccessKind::Paid, None),
        sidebar_entry("3", "Mobile App Development", AccessKind::Free, Some(12)),
        sidebar_entry("4", "Data Science", AccessKind::Introductory, None),
        sidebar_entry("5", "DevOps & Cloud", AccessKind::Paid, Some(5)),
        sidebar_entry("6", "Blockchain Technology", AccessKind::Introductory, None),
        sidebar_entry("7", "Artificial Intelligence", AccessKind::Paid, Some(8)),
    ]
}

pub const CATEGORIES: [&str; 5] = [
    "All Communities",
    "Free Communities",
    "Paid Subscriptions",
    "Recently Active",
    "Favorites",
];

/// Community shown on a community page whose fetch failed. Unknown ids get
/// the first sample community.
pub fn community_page(id: &str) -> Community {
    match id {
        "2" => community(
            "2",
            "UX/UI Design",
            "For designers focused on creating beautiful and functional user experiences.",
            (875, 218),
            ActivityLevel::High,
            Access::Paid { price: 9.99 },
            "photo-1561070791-2526d30994b5",
            Vec::new(),
        ),
        _ => community(
            "1",
            "Web Development",
            "A community for web developers to share knowledge and discuss the latest trends in web development.",
            (1250, 342),
            ActivityLevel::High,
            Access::Free,
            "photo-1579546929518-9e396f3cc809",
            Vec::new(),
        ),
    }
}

pub fn community_page_topics() -> Vec<DisplayTopic> {
    vec![
        topic(
            "1",
            "Welcome to the community!",
            "This is a pinned welcome message for new members. Feel free to introduce yourself and ask any questions.",
            ("Moderator", "moderator"),
            None,
            "2 days ago",
            (45, 23),
            (false, false, true),
        ),
        topic(
            "2",
            "Best practices for modern web development",
            "Let's discuss the current best practices and trends in web development. What are your thoughts on the latest frameworks?",
            ("Alex Johnson", "Alex"),
            None,
            "5 hours ago",
            (12, 8),
            (false, true, false),
        ),
        topic(
            "3",
            "Help with React hooks",
            "I'm having trouble understanding useEffect. Can someone explain the dependency array?",
            ("Sarah Chen", "Sarah"),
            None,
            "1 day ago",
            (8, 15),
            (false, false, false),
        ),
    ]
}
