//! Generation diffing.
//!
//! Walks the previous generation's tree against the current index and
//! builds the incremental documents: `"u"` score/odds updates and `"d"`
//! departures. Arrivals need the full event serializer and live in
//! [`crate::patch`].

use std::sync::Arc;

use mbet_feed::{Event, Feed, ScoreBoard};
use serde_json::{Map, Value};

use crate::index::SnapshotIndex;

/// Archive intent produced by the update builder: the superseded event
/// state together with the odds it was trading at.
pub struct PointSave {
    pub event: Arc<Event>,
    pub odds: (f64, f64),
}

/// Build the `"u"` document: one entry per event whose score or odds
/// changed between generations.
///
/// Every changed event also queues a [`PointSave`] so the previous state
/// reaches the archive. `None` when nothing changed.
pub fn update_document(
    prev: &Feed,
    index: &SnapshotIndex,
    saves: &mut Vec<PointSave>,
) -> Option<Value> {
    let mut doc = Map::new();
    doc.insert("mt".to_string(), Value::from("u"));
    prev.for_each_event(|_, event| {
        let Some(current) = index.find(event.tree_id) else {
            return;
        };
        let Some(entry) = update_entry(event, current, saves) else {
            return;
        };
        doc.insert(event.tree_id.to_string(), entry);
    });
    if doc.len() == 1 {
        // Only the method tag.
        return None;
    }
    Some(Value::Object(doc))
}

/// Build the `"d"` document listing the tree ids present in the previous
/// generation but absent from the current index. `None` when empty.
pub fn delete_document(prev: &Feed, index: &SnapshotIndex) -> Option<Value> {
    let mut gone = Vec::new();
    prev.for_each_event(|_, event| {
        if index.find(event.tree_id).is_none() {
            gone.push(Value::from(event.tree_id));
        }
    });
    if gone.is_empty() {
        return None;
    }
    let mut doc = Map::new();
    doc.insert("mt".to_string(), Value::from("d"));
    doc.insert("l".to_string(), Value::Array(gone));
    Some(Value::Object(doc))
}

fn update_entry(
    prev: &Arc<Event>,
    current: &Arc<Event>,
    saves: &mut Vec<PointSave>,
) -> Option<Value> {
    let old = prev.score.as_ref()?;
    let new = current.score.as_ref()?;
    let mut delta = compare_scores(old, new)?;
    let odds = check_odds(&mut delta, prev, current)?;
    prune_empty_side(&mut delta, "a");
    prune_empty_side(&mut delta, "h");
    if delta.is_empty() {
        return None;
    }
    saves.push(PointSave {
        event: Arc::clone(prev),
        odds,
    });
    let mut entry = Map::new();
    entry.insert("s".to_string(), Value::Object(delta));
    Some(Value::Object(entry))
}

/// Per-side score deltas between two generations of one event.
///
/// Only changed values appear: the game in progress under `"g"` (wire
/// encoding, so advantage is −2) and the freshest set under its 1-based
/// number. When a new set has started, its opening games are always
/// reported under the new set count so subscribers can grow their
/// scoreboards. `None` when either side has no sets yet.
fn compare_scores(old: &ScoreBoard, new: &ScoreBoard) -> Option<Map<String, Value>> {
    if old.sets.is_empty() || new.sets.is_empty() {
        return None;
    }
    let mut delta = Map::new();
    delta.insert("h".to_string(), Value::Object(Map::new()));
    delta.insert("a".to_string(), Value::Object(Map::new()));

    value_cmp(&mut delta, "h", "g", old.game.home.to_wire(), new.game.home.to_wire());
    value_cmp(&mut delta, "a", "g", old.game.away.to_wire(), new.game.away.to_wire());

    let old_count = old.sets.len();
    let old_last = old.sets[old_count - 1];
    // The set that was in progress, compared at its old position. The
    // feed occasionally shrinks the list; nothing to compare then.
    if let Some(new_last) = new.sets.get(old_count - 1) {
        let key = old_count.to_string();
        value_cmp(&mut delta, "h", &key, old_last.home, new_last.home);
        value_cmp(&mut delta, "a", &key, old_last.away, new_last.away);
    }
    if old_count < new.sets.len() {
        let started = new.sets[old_count];
        let key = new.sets.len().to_string();
        if let Some(side) = side_entry(&mut delta, "h") {
            side.insert(key.clone(), Value::from(started.home));
        }
        if let Some(side) = side_entry(&mut delta, "a") {
            side.insert(key, Value::from(started.away));
        }
    }
    Some(delta)
}

/// Attach `"o"` to both sides when the match-result prices moved.
///
/// Returns the previous prices; an event without a readable market on
/// either side produces no update entry at all.
fn check_odds(
    delta: &mut Map<String, Value>,
    prev: &Event,
    current: &Event,
) -> Option<(f64, f64)> {
    let old = prev.result_odds()?;
    let new = current.result_odds()?;
    if old == new {
        return Some(old);
    }
    for (key, price) in [("h", new.0), ("a", new.1)] {
        side_entry(delta, key)?.insert("o".to_string(), Value::from(price));
    }
    Some(old)
}

fn side_entry<'a>(delta: &'a mut Map<String, Value>, side: &str) -> Option<&'a mut Map<String, Value>> {
    delta.get_mut(side)?.as_object_mut()
}

fn value_cmp(delta: &mut Map<String, Value>, side: &str, key: &str, old: i8, new: i8) {
    if old == new {
        return;
    }
    if let Some(target) = side_entry(delta, side) {
        target.insert(key.to_string(), Value::from(new));
    }
}

fn prune_empty_side(delta: &mut Map<String, Value>, side: &str) {
    let empty = delta
        .get(side)
        .and_then(Value::as_object)
        .is_some_and(|object| object.is_empty());
    if empty {
        delta.remove(side);
    }
}
