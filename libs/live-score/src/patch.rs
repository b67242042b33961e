//! Full-event document serializer.
//!
//! Everything that ships a complete event rather than a delta: arrivals
//! (`"a"`), the pre-match snapshot (`"s"`), the live snapshot (`"i"`) and
//! the finished/yesterday documents (`"f"` / `"y"`) read back from the
//! OnCourt mirror. Events are grouped by display class (ATP, WTA,
//! Challenger, ITF), then by tournament, with the tournament's display
//! fields written once on first occurrence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mbet_feed::score::parse_plain;
use mbet_feed::{Category, Event, Feed, Group, Member, ScoreBoard, Side};
use oncourt::{MatchArchive, MatchRow, OncourtDatabase, PlayerRow};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::index::SnapshotIndex;

/// Odds write-back intent: prices seen on the feed for a pairing whose
/// stored odds are still unset.
pub struct OddsWrite {
    pub category: Category,
    pub home: i32,
    pub away: i32,
    pub tour: i32,
    pub round: i32,
    pub odds: (f64, f64),
}

/// Source of tournament elevations for the `"a"` tournament field.
#[async_trait]
pub trait Elevations: Send + Sync {
    async fn elevation(&self, tour: i32) -> Option<f64>;
}

#[async_trait]
impl Elevations for MatchArchive {
    async fn elevation(&self, tour: i32) -> Option<f64> {
        match MatchArchive::elevation(self, tour).await {
            Ok(value) => value,
            Err(error) => {
                debug!(%error, tour, "elevation lookup failed");
                None
            }
        }
    }
}

/// Serializer for full-event documents.
pub struct Patcher {
    elevations: Arc<dyn Elevations>,
}

impl Patcher {
    pub fn new(elevations: Arc<dyn Elevations>) -> Patcher {
        Patcher { elevations }
    }

    /// Build a snapshot of every event in `feed` under the given method
    /// tag. Sent even when empty so subscribers can reset their state.
    pub async fn snapshot_document(
        &self,
        feed: &Feed,
        method: &str,
        writes: &mut Vec<OddsWrite>,
    ) -> Value {
        let mut doc = Map::new();
        doc.insert("mt".to_string(), Value::from(method));
        let mut altitudes = HashMap::new();
        for sport in &feed.sports {
            for group in &sport.groups {
                for event in &group.events {
                    self.add_event(&mut doc, group, event, &mut altitudes, writes)
                        .await;
                }
            }
        }
        Value::Object(doc)
    }

    /// Build the arrivals document: every event of `feed` absent from
    /// `index`. Without an index every event qualifies. `None` when no
    /// event made it in.
    pub async fn append_document(
        &self,
        feed: &Feed,
        index: Option<&SnapshotIndex>,
        method: &str,
        writes: &mut Vec<OddsWrite>,
    ) -> Option<Value> {
        let mut doc = Map::new();
        doc.insert("mt".to_string(), Value::from(method));
        let mut altitudes = HashMap::new();
        let mut count = 0;
        for sport in &feed.sports {
            for group in &sport.groups {
                for event in &group.events {
                    if let Some(index) = index {
                        if index.find(event.tree_id).is_some() {
                            continue;
                        }
                    }
                    if self
                        .add_event(&mut doc, group, event, &mut altitudes, writes)
                        .await
                        .is_some()
                    {
                        count += 1;
                    }
                }
            }
        }
        if count == 0 {
            return None;
        }
        Some(Value::Object(doc))
    }

    /// Build the finished/yesterday document from OnCourt rows, ATP first.
    ///
    /// Event keys run downward from `rows + 1` per category, newest
    /// tournament last. A row whose result does not decode aborts the rest
    /// of its category; the document keeps what was already built.
    pub async fn results_document(
        &self,
        method: &str,
        atp: &[MatchRow],
        wta: &[MatchRow],
    ) -> Value {
        let mut doc = Map::new();
        doc.insert("mt".to_string(), Value::from(method));
        let mut altitudes = HashMap::new();
        self.add_result_rows(&mut doc, atp, Category::ATP, &mut altitudes)
            .await;
        self.add_result_rows(&mut doc, wta, Category::WTA, &mut altitudes)
            .await;
        Value::Object(doc)
    }

    async fn add_result_rows(
        &self,
        doc: &mut Map<String, Value>,
        rows: &[MatchRow],
        category: Category,
        altitudes: &mut HashMap<i32, Value>,
    ) {
        for (position, row) in rows.iter().enumerate() {
            let eid = rows.len() + 1 - position;
            if self
                .add_result_row(doc, row, category, eid, altitudes)
                .await
                .is_none()
            {
                warn!(
                    tour = row.tour_id,
                    home = row.home.id,
                    away = row.away.id,
                    "undecodable result, dropping the remaining rows"
                );
                break;
            }
        }
    }

    async fn add_result_row(
        &self,
        doc: &mut Map<String, Value>,
        row: &MatchRow,
        category: Category,
        eid: usize,
        altitudes: &mut HashMap<i32, Value>,
    ) -> Option<()> {
        let tour_name = category.tour_name()?;

        let mut element = Map::new();
        element.insert(
            "id".to_string(),
            Value::from(format!(
                "{}.{}.{}.{}.{}",
                tour_name, row.tour_id, row.round, row.home.id, row.away.id
            )),
        );
        let mut players = Map::new();
        players.insert("h".to_string(), db_player(&row.home, tour_name));
        players.insert("a".to_string(), db_player(&row.away, tour_name));
        element.insert("p".to_string(), Value::Object(players));
        let score = parse_plain(&row.result)?;
        element.insert("s".to_string(), score_sides(Some(&score)));

        let label = db_class_label(row.tour_rank, category);
        let class = doc
            .entry(label.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()?;
        let key = format!("S{}", row.tour_id);
        if !class.contains_key(&key) {
            let altitude = self.altitude(row.tour_id, altitudes).await;
            let mut tour = Map::new();
            tour.insert("n".to_string(), Value::from(row.tour_name.clone()));
            tour.insert("r".to_string(), Value::from(round_name(row.round)));
            tour.insert("f".to_string(), Value::from(row.tour_flag.clone()));
            tour.insert("id".to_string(), Value::from(row.tour_id));
            tour.insert("q".to_string(), Value::from(tour_name));
            tour.insert("a".to_string(), altitude);
            tour.insert("c".to_string(), Value::from(row.court.clone()));
            tour.insert(
                "sc".to_string(),
                Value::from(set_count(row.tour_rank, category)),
            );
            class.insert(key.clone(), Value::Object(tour));
        }
        let tour = class.get_mut(&key)?.as_object_mut()?;
        let events = tour
            .entry("e".to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()?;
        events.insert(format!("E{eid}"), Value::Object(element));
        Some(())
    }

    /// Serialize one feed event into the class/tournament hierarchy of
    /// `doc`. Skips events whose tournament never resolved.
    async fn add_event(
        &self,
        doc: &mut Map<String, Value>,
        group: &Group,
        event: &Event,
        altitudes: &mut HashMap<i32, Value>,
        writes: &mut Vec<OddsWrite>,
    ) -> Option<()> {
        let name = group.name.clone()?;
        let label = event.category.class_label()?;
        let tour_q = group.category.tour_name()?;
        let id = event_id(event)?;

        let market = event.result_odds();
        let mut element = Map::new();
        let mut market_doc = Map::new();
        if let Some((home, away)) = market {
            market_doc.insert("h".to_string(), Value::from(home));
            market_doc.insert("a".to_string(), Value::from(away));
        }
        element.insert("o".to_string(), Value::Object(market_doc));
        element.insert("id".to_string(), Value::from(id));

        let (home_odds, away_odds) = effective_odds(event, group, market, writes);
        let mut players = Map::new();
        players.insert("h".to_string(), player_doc(&event.home, home_odds)?);
        players.insert("a".to_string(), player_doc(&event.away, away_odds)?);
        element.insert("p".to_string(), Value::Object(players));

        let time = event
            .date
            .map(|date| date.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();
        element.insert("t".to_string(), Value::from(time));
        element.insert("s".to_string(), score_sides(event.score.as_ref()));

        let events = self
            .group_events(doc, group, &name, label, tour_q, altitudes)
            .await?;
        events.insert(event.tree_id.to_string(), Value::Object(element));
        Some(())
    }

    /// Get or create the `"e"` events container of the event's tournament
    /// branch, writing the tournament's display fields on first occurrence.
    async fn group_events<'doc>(
        &self,
        doc: &'doc mut Map<String, Value>,
        group: &Group,
        name: &str,
        label: &str,
        tour_q: &str,
        altitudes: &mut HashMap<i32, Value>,
    ) -> Option<&'doc mut Map<String, Value>> {
        let class = doc
            .entry(label.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()?;
        let key = group.tree_id.to_string();
        if !class.contains_key(&key) {
            let altitude = self.altitude(group.ocid, altitudes).await;
            let mut tour = Map::new();
            tour.insert("r".to_string(), Value::from(round_name(group.ocround)));
            tour.insert("n".to_string(), Value::from(name));
            tour.insert("c".to_string(), Value::from(group.court.clone()));
            tour.insert("a".to_string(), altitude);
            tour.insert("id".to_string(), Value::from(group.ocid));
            tour.insert("f".to_string(), Value::from(group.flag.clone()));
            tour.insert(
                "sc".to_string(),
                Value::from(set_count(group.ocrank, group.category)),
            );
            tour.insert("q".to_string(), Value::from(tour_q));
            class.insert(key.clone(), Value::Object(tour));
        }
        let tour = class.get_mut(&key)?.as_object_mut()?;
        let events = tour
            .entry("e".to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()?;
        Some(events)
    }

    /// Tournament elevation in meters, memoized per document. Misses
    /// serialize as an empty string.
    async fn altitude(&self, tour: i32, memo: &mut HashMap<i32, Value>) -> Value {
        if let Some(value) = memo.get(&tour) {
            return value.clone();
        }
        let value = match self.elevations.elevation(tour).await {
            Some(meters) => Value::from(meters),
            None => Value::from(""),
        };
        memo.insert(tour, value.clone());
        value
    }
}

/// Prices to show in the player documents.
///
/// Members keep their stored odds once both sides are set; otherwise the
/// feed's market prices are queued for write-back and shown instead.
/// Pairings outside both tours are never written.
fn effective_odds(
    event: &Event,
    group: &Group,
    market: Option<(f64, f64)>,
    writes: &mut Vec<OddsWrite>,
) -> (f64, f64) {
    if event.home.odds >= 1.0 && event.away.odds >= 1.0 {
        return (event.home.odds, event.away.odds);
    }
    if event.category.tour_name().is_none() {
        return (event.home.odds, event.away.odds);
    }
    let odds = market.unwrap_or((0.0, 0.0));
    writes.push(OddsWrite {
        category: event.category,
        home: event.home.ocid,
        away: event.away.ocid,
        tour: group.ocid,
        round: group.ocround,
        odds,
    });
    odds
}

/// Stable external event id over OnCourt identifiers.
fn event_id(event: &Event) -> Option<String> {
    let tour = event.category.tour_name()?;
    Some(format!(
        "{}.{}.{}.{}.{}",
        tour, event.octour, event.ocround, event.home.ocid, event.away.ocid
    ))
}

fn player_doc(member: &Member, odds: f64) -> Option<Value> {
    let mut doc = Map::new();
    doc.insert("n".to_string(), Value::from(member.name.clone()));
    doc.insert("f".to_string(), Value::from(member.flag.clone()));
    doc.insert("i".to_string(), Value::from(member.ocid));
    doc.insert("c".to_string(), Value::from(member.category.tour_name()?));
    doc.insert("r".to_string(), Value::from(member.ranking));
    doc.insert("o".to_string(), Value::from(odds));
    Some(Value::Object(doc))
}

fn db_player(player: &PlayerRow, tour: &str) -> Value {
    let mut doc = Map::new();
    doc.insert("n".to_string(), Value::from(player.name.clone()));
    doc.insert("f".to_string(), Value::from(player.flag.clone()));
    doc.insert("i".to_string(), Value::from(player.id));
    doc.insert("c".to_string(), Value::from(tour));
    doc.insert("r".to_string(), Value::from(player.ranking));
    doc.insert("o".to_string(), Value::from(player.odds));
    Value::Object(doc)
}

/// The `"s"` member of a full event element: both per-side boards, or an
/// empty object when the event has no score yet.
fn score_sides(score: Option<&ScoreBoard>) -> Value {
    let Some(score) = score else {
        return Value::Object(Map::new());
    };
    let mut doc = Map::new();
    doc.insert("h".to_string(), side_score(score, Side::Home));
    doc.insert("a".to_string(), side_score(score, Side::Away));
    Value::Object(doc)
}

/// One side of a full scoreboard: each set under its 1-based number, the
/// current game under `"g"` (wire encoding), the serve flag under `"s"`
/// and the sets-won tally under `"r"`.
fn side_score(score: &ScoreBoard, side: Side) -> Value {
    let mut doc = Map::new();
    for (position, set) in score.sets.iter().enumerate() {
        doc.insert((position + 1).to_string(), Value::from(set.side(side)));
    }
    doc.insert("g".to_string(), Value::from(score.game.side(side).to_wire()));
    doc.insert("s".to_string(), Value::from(score.service.serves(side)));
    doc.insert("r".to_string(), Value::from(score.summary.side(side)));
    Value::Object(doc)
}

/// Display class for a mirror row; the tier overrides the tour.
fn db_class_label(rank: i32, category: Category) -> &'static str {
    match rank {
        0 => "ITF",
        1 => "Challenger",
        _ if category.contains(Category::ATP) => "ATP",
        _ => "WTA",
    }
}

/// OnCourt round id to display name.
fn round_name(round: i32) -> &'static str {
    match round {
        0 => "Pre",
        1 => "Q-1",
        2 => "Q-2",
        3 => "Qualy",
        4 => "R32",
        5 => "Octavos",
        6 => "R32",
        7 => "Octavos",
        8 => "Round Robin",
        9 => "Cuartos",
        10 => "Semi Final",
        12 => "Final",
        _ => "",
    }
}

/// Best-of set count: three everywhere except the men's top-tier events.
fn set_count(rank: i32, category: Category) -> i64 {
    if category.contains(Category::WTA) {
        return 3;
    }
    match rank {
        4 | 5 => 5,
        _ => 3,
    }
}

/// Run the collected odds write-backs. Failures are logged and dropped;
/// the same prices come around again next cycle.
pub async fn record_odds(database: &OncourtDatabase, writes: &[OddsWrite]) {
    for write in writes {
        if let Err(error) = database
            .write_odds(
                write.category,
                write.home,
                write.away,
                write.tour,
                write.round,
                write.odds.0,
                write.odds.1,
            )
            .await
        {
            warn!(
                %error,
                home = write.home,
                away = write.away,
                "odds write failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mbet_feed::{
        GamePoint, GameScore, Market, Selection, Service, SetScore, Sport, MATCH_RESULT_MODEL,
    };
    use serde_json::json;

    struct StaticElevations(HashMap<i32, f64>);

    #[async_trait]
    impl Elevations for StaticElevations {
        async fn elevation(&self, tour: i32) -> Option<f64> {
            self.0.get(&tour).copied()
        }
    }

    fn patcher(elevations: &[(i32, f64)]) -> Patcher {
        Patcher::new(Arc::new(StaticElevations(
            elevations.iter().copied().collect(),
        )))
    }

    fn member(name: &str, ocid: i32, odds: f64) -> Member {
        Member {
            id: 0,
            selkey: String::new(),
            role: String::new(),
            ocid,
            name: name.to_string(),
            flag: "ESP".to_string(),
            ranking: 11,
            odds,
            category: Category::ATP,
        }
    }

    fn board() -> ScoreBoard {
        ScoreBoard {
            sets: vec![SetScore::new(6, 4), SetScore::new(2, 1)],
            summary: SetScore::new(1, 0),
            game: GameScore {
                home: GamePoint::Points(40),
                away: GamePoint::Advantage,
            },
            service: Service::Home,
        }
    }

    fn event(tree_id: i64, member_odds: f64) -> Arc<Event> {
        Arc::new(Event {
            tree_id,
            name: "A - B".to_string(),
            url: None,
            date: Some(chrono::Utc.with_ymd_and_hms(2024, 5, 11, 14, 30, 0).unwrap()),
            score: Some(board()),
            home: member("Alcaraz C.", 101, member_odds),
            away: member("Sinner J.", 102, member_odds),
            markets: vec![Market {
                model: MATCH_RESULT_MODEL.to_string(),
                name: String::new(),
                kind: String::new(),
                value: 0.0,
                selections: vec![
                    Selection {
                        name: String::new(),
                        value: 0.0,
                        coeff_id: 0,
                        coeff: 1.45,
                        selkey: "H1".to_string(),
                        uid: String::new(),
                        score_home: 0,
                        score_away: 0,
                    },
                    Selection {
                        name: String::new(),
                        value: 0.0,
                        coeff_id: 1,
                        coeff: 2.65,
                        selkey: "A2".to_string(),
                        uid: String::new(),
                        score_home: 0,
                        score_away: 0,
                    },
                ],
            }],
            octour: 33,
            ocround: 4,
            ocrank: 2,
            category: Category::ATP,
        })
    }

    fn feed_of(events: Vec<Arc<Event>>) -> Feed {
        Feed {
            sports: vec![Sport {
                code: "te".to_string(),
                name: "Tennis".to_string(),
                groups: vec![Group {
                    tree_id: 70,
                    name: Some("Madrid Open".to_string()),
                    flag: "ESP".to_string(),
                    court: "Clay".to_string(),
                    is_american: false,
                    ocid: 33,
                    ocround: 4,
                    ocrank: 2,
                    category: Category::ATP,
                    events,
                }],
            }],
        }
    }

    #[test]
    fn round_names() {
        assert_eq!(round_name(0), "Pre");
        assert_eq!(round_name(3), "Qualy");
        assert_eq!(round_name(10), "Semi Final");
        assert_eq!(round_name(12), "Final");
        assert_eq!(round_name(11), "");
        assert_eq!(round_name(99), "");
    }

    #[test]
    fn set_counts() {
        assert_eq!(set_count(4, Category::ATP), 5);
        assert_eq!(set_count(5, Category::ATP), 5);
        assert_eq!(set_count(2, Category::ATP), 3);
        assert_eq!(set_count(4, Category::WTA), 3);
    }

    #[test]
    fn side_scores_carry_sets_game_serve_and_tally() {
        let score = board();
        assert_eq!(
            side_score(&score, Side::Home),
            json!({ "1": 6, "2": 2, "g": 40, "s": true, "r": 1 })
        );
        assert_eq!(
            side_score(&score, Side::Away),
            json!({ "1": 4, "2": 1, "g": -2, "s": false, "r": 0 })
        );
        assert_eq!(score_sides(None), json!({}));
    }

    #[test]
    fn ids_and_players_need_a_tour() {
        let mut tourless = (*event(9, 1.5)).clone();
        tourless.category = Category::CHALLENGER;
        assert!(event_id(&tourless).is_none());

        let mut member = member("X", 1, 1.5);
        member.category = Category::NONE;
        assert!(player_doc(&member, 1.5).is_none());
    }

    #[tokio::test]
    async fn snapshot_serializes_the_whole_tree() {
        let patcher = patcher(&[(33, 650.0)]);
        let feed = feed_of(vec![event(9, 1.5)]);
        let mut writes = Vec::new();

        let doc = patcher.snapshot_document(&feed, "i", &mut writes).await;
        assert_eq!(
            doc,
            json!({
                "mt": "i",
                "ATP": { "70": {
                    "r": "R32",
                    "n": "Madrid Open",
                    "c": "Clay",
                    "a": 650.0,
                    "id": 33,
                    "f": "ESP",
                    "sc": 3,
                    "q": "atp",
                    "e": { "9": {
                        "o": { "h": 1.45, "a": 2.65 },
                        "id": "atp.33.4.101.102",
                        "p": {
                            "h": { "n": "Alcaraz C.", "f": "ESP", "i": 101, "c": "atp", "r": 11, "o": 1.5 },
                            "a": { "n": "Sinner J.", "f": "ESP", "i": 102, "c": "atp", "r": 11, "o": 1.5 },
                        },
                        "t": "2024-05-11 14:30:00 UTC",
                        "s": {
                            "h": { "1": 6, "2": 2, "g": 40, "s": true, "r": 1 },
                            "a": { "1": 4, "2": 1, "g": -2, "s": false, "r": 0 },
                        },
                    } },
                } },
            })
        );
        assert!(writes.is_empty());
    }

    #[tokio::test]
    async fn snapshot_of_nothing_is_just_the_method_tag() {
        let patcher = patcher(&[]);
        let mut writes = Vec::new();
        let doc = patcher
            .snapshot_document(&Feed::default(), "i", &mut writes)
            .await;
        assert_eq!(doc, json!({ "mt": "i" }));
    }

    #[tokio::test]
    async fn append_skips_events_already_indexed() {
        let patcher = patcher(&[]);
        let known = feed_of(vec![event(9, 1.5)]);
        let index = SnapshotIndex::build(&known);
        let feed = feed_of(vec![event(9, 1.5), event(10, 1.5)]);
        let mut writes = Vec::new();

        let doc = patcher
            .append_document(&feed, Some(&index), "a", &mut writes)
            .await
            .unwrap();
        let events = &doc["ATP"]["70"]["e"];
        assert!(events.get("9").is_none());
        assert!(events.get("10").is_some());

        assert!(patcher
            .append_document(&known, Some(&index), "a", &mut writes)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn append_without_an_index_takes_everything() {
        let patcher = patcher(&[]);
        let feed = feed_of(vec![event(9, 1.5), event(10, 1.5)]);
        let mut writes = Vec::new();

        let doc = patcher
            .append_document(&feed, None, "s", &mut writes)
            .await
            .unwrap();
        assert_eq!(doc["mt"], json!("s"));
        assert!(doc["ATP"]["70"]["e"].get("9").is_some());
        assert!(doc["ATP"]["70"]["e"].get("10").is_some());

        assert!(patcher
            .append_document(&Feed::default(), None, "s", &mut writes)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn unresolved_tournament_is_skipped() {
        let patcher = patcher(&[]);
        let mut feed = feed_of(vec![event(9, 1.5)]);
        feed.sports[0].groups[0].name = None;
        let mut writes = Vec::new();

        assert!(patcher
            .append_document(&feed, None, "s", &mut writes)
            .await
            .is_none());
        let doc = patcher.snapshot_document(&feed, "i", &mut writes).await;
        assert_eq!(doc, json!({ "mt": "i" }));
    }

    #[tokio::test]
    async fn unset_member_odds_queue_a_write_and_show_market_prices() {
        let patcher = patcher(&[]);
        let feed = feed_of(vec![event(9, 0.0)]);
        let mut writes = Vec::new();

        let doc = patcher.snapshot_document(&feed, "i", &mut writes).await;
        let players = &doc["ATP"]["70"]["e"]["9"]["p"];
        assert_eq!(players["h"]["o"], json!(1.45));
        assert_eq!(players["a"]["o"], json!(2.65));

        assert_eq!(writes.len(), 1);
        let write = &writes[0];
        assert_eq!((write.home, write.away), (101, 102));
        assert_eq!((write.tour, write.round), (33, 4));
        assert_eq!(write.odds, (1.45, 2.65));
        assert_eq!(write.category.tour_name(), Some("atp"));
    }

    #[tokio::test]
    async fn unknown_elevation_serializes_empty() {
        let patcher = patcher(&[]);
        let feed = feed_of(vec![event(9, 1.5)]);
        let mut writes = Vec::new();

        let doc = patcher.snapshot_document(&feed, "i", &mut writes).await;
        assert_eq!(doc["ATP"]["70"]["a"], json!(""));
    }

    fn row(tour_id: i32, rank: i32, result: &str) -> MatchRow {
        MatchRow {
            tour_name: "Madrid".to_string(),
            tour_id,
            tour_flag: "ESP".to_string(),
            court: "Clay".to_string(),
            home: PlayerRow {
                id: 101,
                flag: "ESP".to_string(),
                ranking: 2,
                name: "Alcaraz C.".to_string(),
                odds: 1.3,
            },
            away: PlayerRow {
                id: 102,
                flag: "ITA".to_string(),
                ranking: 1,
                name: "Sinner J.".to_string(),
                odds: 3.4,
            },
            tour_rank: rank,
            round: 12,
            result: result.to_string(),
        }
    }

    #[tokio::test]
    async fn results_group_by_tier_with_descending_event_keys() {
        let patcher = patcher(&[(40, 1200.0)]);
        let rows = [row(40, 2, "6-4 6-3"), row(40, 2, "7-5 6-2"), row(41, 0, "6-1 6-1")];

        let doc = patcher.results_document("f", &rows, &[]).await;
        assert_eq!(doc["mt"], json!("f"));

        let tour = &doc["ATP"]["S40"];
        assert_eq!(tour["n"], json!("Madrid"));
        assert_eq!(tour["r"], json!("Final"));
        assert_eq!(tour["q"], json!("atp"));
        assert_eq!(tour["a"], json!(1200.0));
        assert_eq!(tour["sc"], json!(3));
        assert!(tour["e"].get("E4").is_some());
        assert!(tour["e"].get("E3").is_some());
        // Rank 0 rows land under ITF even on the ATP pass.
        assert!(doc["ITF"]["S41"]["e"].get("E2").is_some());

        let element = &tour["e"]["E4"];
        assert_eq!(element["id"], json!("atp.40.12.101.102"));
        assert_eq!(
            element["p"]["h"],
            json!({ "n": "Alcaraz C.", "f": "ESP", "i": 101, "c": "atp", "r": 2, "o": 1.3 })
        );
        assert_eq!(element["s"]["h"]["r"], json!(2));
        assert_eq!(element["s"]["h"]["g"], json!(-1));
    }

    #[tokio::test]
    async fn empty_result_aborts_the_remaining_rows() {
        let patcher = patcher(&[]);
        let rows = [row(40, 2, "6-4 6-3"), row(40, 2, ""), row(40, 2, "6-2 6-2")];

        let doc = patcher.results_document("y", &rows, &[]).await;
        let events = &doc["ATP"]["S40"]["e"];
        assert!(events.get("E4").is_some());
        assert!(events.get("E3").is_none());
        assert!(events.get("E2").is_none());
    }

    #[tokio::test]
    async fn wta_rows_follow_the_atp_rows() {
        let patcher = patcher(&[]);
        let mut wta_row = row(50, 2, "6-0 6-0");
        wta_row.tour_name = "Rome".to_string();

        let doc = patcher
            .results_document("f", &[row(40, 2, "6-4 6-3")], &[wta_row])
            .await;
        assert!(doc["ATP"]["S40"]["e"].get("E2").is_some());
        assert_eq!(doc["WTA"]["S50"]["q"], json!("wta"));
        assert_eq!(doc["WTA"]["S50"]["e"]["E2"]["id"], json!("wta.50.12.101.102"));
    }
}
