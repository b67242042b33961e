//! Feed markup to [`Feed`] tree.
//!
//! Traversal is deterministic: sports in document order, then groups,
//! then events. Groups and events are sorted by tree id after the walk
//! and market selections by coefficient id, so lookups elsewhere can
//! binary search.
//!
//! Events degrade individually. A member that cannot be matched to a
//! known player, or a home/away category mismatch before the group is
//! resolved, drops that event and nothing else. Dropped events are
//! counted and reported once per parse.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::directory::{Directory, TournamentKey};
use crate::model::{Category, Event, Feed, Group, Market, Member, Selection, Sport};
use crate::score;
use crate::Result;

/// Parse one feed document, resolving members through `directory`.
pub async fn parse(xml: &str, directory: &dyn Directory) -> Result<Feed> {
    let document = Document::parse(xml)?;
    let mut sports = Vec::new();
    let mut dropped = 0usize;
    for node in document.descendants().filter(|n| n.has_tag_name("sport")) {
        sports.push(parse_sport(node, directory, &mut dropped).await);
    }
    if dropped > 0 {
        warn!(dropped, "events dropped during feed parse");
    }
    Ok(Feed { sports })
}

/// Tournament identity accumulated while walking a group's events.
///
/// The lookup is retried on each event until it succeeds; once `key`
/// is resolved every later event reuses it without touching the
/// directory again.
#[derive(Default)]
struct Resolution {
    key: TournamentKey,
    category: Category,
    name: Option<String>,
    flag: String,
    court: String,
}

async fn parse_sport(node: Node<'_, '_>, directory: &dyn Directory, dropped: &mut usize) -> Sport {
    let mut groups = Vec::new();
    // Materialized: holding the adapter across the await would demand
    // `Children: Iterator` for arbitrary lifetimes in the Send proof.
    let group_nodes: Vec<Node> = nested(node, "groups", "group").collect();
    for group_node in group_nodes {
        groups.push(parse_group(group_node, directory, dropped).await);
    }
    groups.sort_by_key(|g| g.tree_id);
    Sport {
        code: attr_string(node, "code"),
        name: attr_string(node, "name"),
        groups,
    }
}

async fn parse_group(node: Node<'_, '_>, directory: &dyn Directory, dropped: &mut usize) -> Group {
    let mut state = Resolution::default();
    let mut events = Vec::new();
    // Materialized: holding the adapter across the await would demand
    // `Children: Iterator` for arbitrary lifetimes in the Send proof.
    let event_nodes: Vec<Node> = nested(node, "events", "event").collect();
    for event_node in event_nodes {
        match parse_event(event_node, directory, &mut state).await {
            Some(event) => events.push(Arc::new(event)),
            None => *dropped += 1,
        }
    }
    events.sort_by_key(|e| e.tree_id);
    Group {
        tree_id: attr_i64(node, "treeId"),
        name: state.name,
        flag: state.flag,
        court: state.court,
        is_american: attr_i32(node, "isAmerican") == 1,
        ocid: state.key.tour,
        ocround: state.key.round,
        ocrank: state.key.rank,
        category: state.category,
        events,
    }
}

async fn parse_event(
    node: Node<'_, '_>,
    directory: &dyn Directory,
    state: &mut Resolution,
) -> Option<Event> {
    let tree_id = attr_i64(node, "treeId");
    let home_node = member_node(node, "HOME")?;
    let away_node = member_node(node, "AWAY")?;
    let mut home = parse_member(home_node, directory).await?;
    let mut away = parse_member(away_node, directory).await?;

    if !state.key.is_resolved() {
        if home.category != away.category {
            warn!(event = tree_id, "member categories do not match");
            return None;
        }
        let mut category = home.category;
        let key = directory
            .tournament_for(category, home.ocid, away.ocid)
            .await;
        // Rank 0 and 1 are the qualifying tiers, anything above is
        // main tour and the base category stands.
        match key.rank {
            0 => category.insert(Category::ITF),
            1 => category.insert(Category::CHALLENGER),
            _ => {}
        }
        if key.is_resolved() {
            if let Some(info) = directory.tournament_info(category, key.tour).await {
                state.name = Some(info.name);
                state.flag = info.flag;
                state.court = info.court;
            }
        }
        state.key = key;
        state.category = category;
    }

    if let Some((home_odds, away_odds)) = directory
        .player_odds(home.category, home.ocid, away.ocid, state.key.tour, state.key.round)
        .await
    {
        home.odds = home_odds;
        away.odds = away_odds;
    }

    let markets: Vec<Market> = nested(node, "markets", "market").map(parse_market).collect();

    Some(Event {
        tree_id,
        name: attr_string(node, "name"),
        url: child_text(node, "url"),
        date: attr_date(node, "date"),
        score: child_text(node, "liveresult").map(|raw| score::parse_live(&raw)),
        home,
        away,
        markets,
        octour: state.key.tour,
        ocround: state.key.round,
        ocrank: state.key.rank,
        category: state.category,
    })
}

async fn parse_member(node: Node<'_, '_>, directory: &dyn Directory) -> Option<Member> {
    let feed_name = node.attribute("name")?;
    let (ocid, category) = match directory.player_id(feed_name).await {
        Some(found) => found,
        None => {
            debug!(name = feed_name, "player not in the directory, skipping event");
            return None;
        }
    };
    let data = match directory.player_data(category, ocid).await {
        Some(data) => data,
        None => {
            debug!(ocid, "no player data, skipping event");
            return None;
        }
    };
    Some(Member {
        id: attr_i64(node, "id"),
        selkey: attr_string(node, "selkey"),
        role: attr_string(node, "role"),
        ocid,
        name: data.name,
        flag: data.flag,
        ranking: data.ranking,
        odds: 0.0,
        category,
    })
}

fn parse_market(node: Node<'_, '_>) -> Market {
    let mut selections: Vec<Selection> = node
        .children()
        .filter(|c| c.has_tag_name("sel"))
        .map(parse_selection)
        .collect();
    selections.sort_by_key(|s| s.coeff_id);
    Market {
        model: attr_string(node, "model"),
        name: attr_string(node, "name"),
        kind: attr_string(node, "type"),
        value: attr_f64(node, "value"),
        selections,
    }
}

fn parse_selection(node: Node<'_, '_>) -> Selection {
    Selection {
        name: attr_string(node, "name"),
        value: attr_f64(node, "value"),
        coeff_id: attr_i64(node, "coeffId"),
        coeff: attr_f64(node, "coeff"),
        selkey: attr_string(node, "selkey"),
        score_home: attr_i32(node, "scoreHome"),
        score_away: attr_i32(node, "scoreAway"),
        uid: attr_string(node, "uid"),
    }
}

/// The member with the given `selkey`; `None` unless exactly one matches.
fn member_node<'a, 'i>(node: Node<'a, 'i>, selkey: &str) -> Option<Node<'a, 'i>> {
    let mut found = None;
    for member in nested(node, "members", "member") {
        if member.attribute("selkey") == Some(selkey) {
            if found.is_some() {
                return None;
            }
            found = Some(member);
        }
    }
    found
}

fn nested<'a, 'i>(
    node: Node<'a, 'i>,
    outer: &'static str,
    inner: &'static str,
) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children()
        .filter(move |c| c.has_tag_name(outer))
        .flat_map(move |c| c.children().filter(move |n| n.has_tag_name(inner)))
}

/// Text of the single child element with this name; `None` unless
/// exactly one exists.
fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    let mut matches = node.children().filter(|c| c.has_tag_name(name));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.text().unwrap_or_default().to_string())
}

fn attr_string(node: Node<'_, '_>, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

fn attr_i64(node: Node<'_, '_>, name: &str) -> i64 {
    node.attribute(name)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(-1)
}

fn attr_i32(node: Node<'_, '_>, name: &str) -> i32 {
    node.attribute(name)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(-1)
}

fn attr_f64(node: Node<'_, '_>, name: &str) -> f64 {
    node.attribute(name)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(f64::NAN)
}

fn attr_date(node: Node<'_, '_>, name: &str) -> Option<DateTime<Utc>> {
    let raw = node.attribute(name)?;
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    let trimmed = raw.trim_end_matches("UTC").trim_end();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
