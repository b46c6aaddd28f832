use serde::Deserialize;

pub const COMMUNITIES: &str = "communities";
pub const TOPICS: &str = "topics";
pub const COMMUNITY_MEMBERSHIPS: &str = "community_memberships";

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub topic_count: Option<u64>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub sub_community: Option<String>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub is_pinned: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipRow {
    #[serde(default)]
    pub community_id: Option<String>,
    #[serde(default)]
    pub subscription_type: Option<String>,
    #[serde(default)]
    pub unread_count: Option<u64>,
    #[serde(default)]
    pub has_new_activity: Option<bool>,
}
