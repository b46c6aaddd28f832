//! Display records shared by the loaders and the HTML renderer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Free,
    Paid,
    Introductory,
}

impl AccessKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => Some(AccessKind::Free),
            "paid" => Some(AccessKind::Paid),
            "introductory" => Some(AccessKind::Introductory),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessKind::Free => "free",
            AccessKind::Paid => "paid",
            AccessKind::Introductory => "introductory",
        }
    }
}

/// How a community is accessed. A price exists only for paid communities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Access {
    Free,
    Paid { price: f64 },
    Introductory,
}

impl Access {
    pub fn kind(&self) -> AccessKind {
        match self {
            Access::Free => AccessKind::Free,
            Access::Paid { .. } => AccessKind::Paid,
            Access::Introductory => AccessKind::Introductory,
        }
    }

    pub fn price(&self) -> Option<f64> {
        match self {
            Access::Paid { price } => Some(*price),
            _ => None,
        }
    }

    /// Short badge text: "Free", "$9.99/mo" or "Trial".
    pub fn badge(&self) -> String {
        match self {
            Access::Free => "Free".to_string(),
            Access::Paid { price } => format!("${price}/mo"),
            Access::Introductory => "Trial".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    High,
    Medium,
    Low,
}

impl ActivityLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(ActivityLevel::High),
            "medium" => Some(ActivityLevel::Medium),
            "low" => Some(ActivityLevel::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::High => "high",
            ActivityLevel::Medium => "medium",
            ActivityLevel::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Community {
    pub id: String,
    pub name: String,
    pub description: String,
    pub member_count: u64,
    pub topic_count: u64,
    pub activity: ActivityLevel,
    pub access: Access,
    pub cover_image: Option<String>,
    pub featured_members: Vec<Member>,
    pub joined: bool,
}

impl Community {
    /// Members beyond the ones shown as avatars.
    pub fn hidden_member_count(&self) -> u64 {
        self.member_count
            .saturating_sub(self.featured_members.len() as u64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub name: String,
    pub avatar: Option<String>,
}

impl Author {
    /// First character of the name, used when there is no avatar.
    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }
}

/// A topic ready for display, with its relative timestamp already computed.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTopic {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub community: Option<String>,
    pub sub_community: Option<String>,
    pub timestamp: String,
    pub likes: u64,
    pub comments: u64,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SidebarEntry {
    pub community_id: String,
    pub name: String,
    pub subscription: AccessKind,
    pub has_new_activity: bool,
    pub unread_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_text_per_access() {
        assert_eq!(Access::Free.badge(), "Free");
        assert_eq!(Access::Paid { price: 9.99 }.badge(), "$9.99/mo");
        assert_eq!(Access::Paid { price: 10.0 }.badge(), "$10/mo");
        assert_eq!(Access::Introductory.badge(), "Trial");
    }

    #[test]
    fn price_only_for_paid() {
        assert_eq!(Access::Paid { price: 12.5 }.price(), Some(12.5));
        assert_eq!(Access::Free.price(), None);
        assert_eq!(Access::Introductory.price(), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(AccessKind::parse(" Paid "), Some(AccessKind::Paid));
        assert_eq!(AccessKind::parse("gold"), None);
        assert_eq!(ActivityLevel::parse("HIGH"), Some(ActivityLevel::High));
    }
}
