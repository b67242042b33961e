//! Tree-id lookup over one feed generation.

use std::sync::Arc;

use mbet_feed::{Event, Feed};
use tracing::warn;

/// Sorted event index of one generation.
///
/// The diff walks the other generation's tree and probes this index by
/// tree id, so lookups dominate; a sorted vector with binary search keeps
/// the whole structure one allocation.
pub struct SnapshotIndex {
    events: Vec<Arc<Event>>,
}

impl SnapshotIndex {
    /// Index every event of `feed`. Duplicate tree ids should not happen;
    /// when they do the later occurrence wins.
    pub fn build(feed: &Feed) -> SnapshotIndex {
        let mut events = Vec::with_capacity(feed.count_events());
        feed.for_each_event(|_, event| events.push(Arc::clone(event)));
        events.sort_by_key(|event| event.tree_id);
        events.dedup_by(|current, kept| {
            if current.tree_id != kept.tree_id {
                return false;
            }
            warn!(tree_id = current.tree_id, "duplicate event id in feed");
            *kept = Arc::clone(current);
            true
        });
        SnapshotIndex { events }
    }

    pub fn find(&self, tree_id: i64) -> Option<&Arc<Event>> {
        self.events
            .binary_search_by_key(&tree_id, |event| event.tree_id)
            .ok()
            .map(|position| &self.events[position])
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbet_feed::{Category, Group, Member, Sport};

    fn member(name: &str) -> Member {
        Member {
            id: 0,
            selkey: String::new(),
            role: String::new(),
            ocid: 0,
            name: name.to_string(),
            flag: String::new(),
            ranking: 0,
            odds: 0.0,
            category: Category::ATP,
        }
    }

    fn event(tree_id: i64, name: &str) -> Arc<Event> {
        Arc::new(Event {
            tree_id,
            name: name.to_string(),
            url: None,
            date: None,
            score: None,
            home: member("A"),
            away: member("B"),
            markets: Vec::new(),
            octour: -1,
            ocround: -1,
            ocrank: -1,
            category: Category::ATP,
        })
    }

    fn feed_of(events: Vec<Arc<Event>>) -> Feed {
        Feed {
            sports: vec![Sport {
                code: "te".to_string(),
                name: "Tennis".to_string(),
                groups: vec![Group {
                    tree_id: 1,
                    name: Some("Open".to_string()),
                    flag: String::new(),
                    court: String::new(),
                    is_american: false,
                    ocid: 7,
                    ocround: 4,
                    ocrank: 2,
                    category: Category::ATP,
                    events,
                }],
            }],
        }
    }

    #[test]
    fn finds_by_tree_id() {
        let feed = feed_of(vec![event(30, "c"), event(10, "a"), event(20, "b")]);
        let index = SnapshotIndex::build(&feed);
        assert_eq!(index.len(), 3);
        assert_eq!(index.find(10).unwrap().name, "a");
        assert_eq!(index.find(30).unwrap().name, "c");
        assert!(index.find(15).is_none());
    }

    #[test]
    fn duplicate_ids_keep_the_later_event() {
        let feed = feed_of(vec![event(10, "first"), event(10, "second")]);
        let index = SnapshotIndex::build(&feed);
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(10).unwrap().name, "second");
    }

    #[test]
    fn empty_feed_indexes_nothing() {
        let index = SnapshotIndex::build(&Feed::default());
        assert!(index.is_empty());
        assert!(index.find(1).is_none());
    }
}
