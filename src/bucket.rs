use std::collections::HashSet;

use crate::model::{Community, DisplayTopic};

/// The three feed tabs. Every topic lands in exactly one of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedBuckets {
    pub featured: Vec<DisplayTopic>,
    pub recent: Vec<DisplayTopic>,
    pub announcements: Vec<DisplayTopic>,
}

impl FeedBuckets {
    pub fn partition(topics: Vec<DisplayTopic>) -> Self {
        let mut buckets = Self::default();
        for topic in topics {
            if topic.is_featured {
                buckets.featured.push(topic);
            } else if topic.is_new {
                buckets.recent.push(topic);
            } else {
                buckets.announcements.push(topic);
            }
        }
        buckets
    }

    pub fn len(&self) -> usize {
        self.featured.len() + self.recent.len() + self.announcements.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityBuckets {
    pub joined: Vec<Community>,
    pub discoverable: Vec<Community>,
}

impl CommunityBuckets {
    /// Splits communities by membership; joined ones get `joined = true`.
    pub fn partition(communities: Vec<Community>, joined_ids: &HashSet<String>) -> Self {
        let mut buckets = Self::default();
        for mut community in communities {
            if community.joined || joined_ids.contains(&community.id) {
                community.joined = true;
                buckets.joined.push(community);
            } else {
                buckets.discoverable.push(community);
            }
        }
        buckets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Community> {
        self.joined.iter().chain(self.discoverable.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback;

    fn topic(id: &str, featured: bool, new: bool) -> DisplayTopic {
        let mut t = fallback::featured_topics().remove(0);
        t.id = id.to_string();
        t.is_featured = featured;
        t.is_new = new;
        t
    }

    #[test]
    fn feed_partition_is_disjoint_and_ordered() {
        let input = vec![
            topic("a", true, true),
            topic("b", false, true),
            topic("c", false, false),
            topic("d", true, false),
            topic("e", false, true),
        ];
        let buckets = FeedBuckets::partition(input.clone());

        let ids = |v: &[DisplayTopic]| v.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&buckets.featured), ["a", "d"]);
        assert_eq!(ids(&buckets.recent), ["b", "e"]);
        assert_eq!(ids(&buckets.announcements), ["c"]);
        assert_eq!(buckets.len(), input.len());
    }

    #[test]
    fn empty_feed_partitions_to_empty_buckets() {
        let buckets = FeedBuckets::partition(Vec::new());
        assert_eq!(buckets.len(), 0);
    }

    #[test]
    fn community_partition_marks_joined() {
        let communities = fallback::communities();
        let total = communities.len();
        let joined: HashSet<String> = ["2".to_string(), "5".to_string()].into_iter().collect();

        let buckets = CommunityBuckets::partition(communities, &joined);
        assert_eq!(
            buckets.joined.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            ["2", "5"]
        );
        assert!(buckets.joined.iter().all(|c| c.joined));
        assert!(buckets.discoverable.iter().all(|c| !c.joined));
        assert_eq!(buckets.iter().count(), total);
    }
}
