//! In-memory model of one feed snapshot.
//!
//! A [`Feed`] owns everything below it and is never mutated after parsing.
//! Events carry denormalized copies of their group's resolved tournament
//! identity so that consumers never need a child→parent link.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Tennis category bit set: one tour bit (ATP/WTA), optionally a tier bit
/// (Challenger/ITF) and the doubles marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Category(u16);

impl Category {
    pub const NONE: Category = Category(0x000);
    pub const DOUBLES: Category = Category(0x001);
    pub const ATP: Category = Category(0x002);
    pub const CHALLENGER: Category = Category(0x004);
    pub const ITF: Category = Category(0x008);
    pub const WTA: Category = Category(0x010);

    pub fn contains(self, other: Category) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Category) {
        self.0 |= other.0;
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Lowercase tour name used in table suffixes and player documents.
    /// `None` when neither tour bit is set.
    pub fn tour_name(self) -> Option<&'static str> {
        if self.contains(Category::ATP) {
            Some("atp")
        } else if self.contains(Category::WTA) {
            Some("wta")
        } else {
            None
        }
    }

    /// Display class used as the top-level grouping key in serialized
    /// documents. Tier bits take precedence over the tour bits.
    pub fn class_label(self) -> Option<&'static str> {
        if self.contains(Category::CHALLENGER) {
            Some("Challenger")
        } else if self.contains(Category::ITF) {
            Some("ITF")
        } else if self.contains(Category::ATP) {
            Some("ATP")
        } else if self.contains(Category::WTA) {
            Some("WTA")
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// Point count for one side of the game in progress.
///
/// The feed writes `A` for advantage and occasionally garbage; both were
/// sentinel integers upstream (−2 / −1) and still are on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GamePoint {
    #[default]
    Unknown,
    Advantage,
    Points(i8),
}

impl GamePoint {
    pub fn to_wire(self) -> i8 {
        match self {
            GamePoint::Unknown => -1,
            GamePoint::Advantage => -2,
            GamePoint::Points(value) => value,
        }
    }

    pub fn from_wire(value: i8) -> GamePoint {
        match value {
            -1 => GamePoint::Unknown,
            -2 => GamePoint::Advantage,
            other => GamePoint::Points(other),
        }
    }
}

/// Who is serving; `0`/`1`/`2` on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Service {
    #[default]
    Unknown,
    Home,
    Away,
}

impl Service {
    pub fn to_wire(self) -> u8 {
        match self {
            Service::Unknown => 0,
            Service::Home => 1,
            Service::Away => 2,
        }
    }

    pub fn serves(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Service::Home, Side::Home) | (Service::Away, Side::Away)
        )
    }
}

/// Games won in one set (or a sets-won tally); −1 marks an unparsable value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetScore {
    pub home: i8,
    pub away: i8,
}

impl SetScore {
    pub fn new(home: i8, away: i8) -> SetScore {
        SetScore { home, away }
    }

    pub fn side(self, side: Side) -> i8 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

/// The game currently in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameScore {
    pub home: GamePoint,
    pub away: GamePoint,
}

impl GameScore {
    pub fn side(self, side: Side) -> GamePoint {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

impl Default for GameScore {
    // The feed's "no parenthesized game yet" shape is 0-0, not unknown.
    fn default() -> GameScore {
        GameScore {
            home: GamePoint::Points(0),
            away: GamePoint::Points(0),
        }
    }
}

/// Decoded score of one event. `sets` lists every set in document order;
/// the last entry is the set in progress or just completed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreBoard {
    pub sets: Vec<SetScore>,
    /// Sets-won tally; only the three-block encoding and the plain-text
    /// decoder fill it, otherwise it stays 0-0.
    pub summary: SetScore,
    pub game: GameScore,
    pub service: Service,
}

/// One priced outcome inside a market.
#[derive(Clone, Debug)]
pub struct Selection {
    pub name: String,
    pub value: f64,
    pub coeff_id: i64,
    pub coeff: f64,
    /// `H…` marks the home side.
    pub selkey: String,
    pub uid: String,
    pub score_home: i32,
    pub score_away: i32,
}

/// Model code of the market the engine reads odds from.
pub const MATCH_RESULT_MODEL: &str = "MTCH_R";

#[derive(Clone, Debug)]
pub struct Market {
    pub model: String,
    pub name: String,
    pub kind: String,
    pub value: f64,
    /// Sorted by `coeff_id`.
    pub selections: Vec<Selection>,
}

/// A player as resolved against the OnCourt directory. Display name, flag
/// and ranking come from the directory, not from the feed.
#[derive(Clone, Debug)]
pub struct Member {
    /// Feed-local id.
    pub id: i64,
    pub selkey: String,
    pub role: String,
    /// External (OnCourt) player id.
    pub ocid: i32,
    pub name: String,
    pub flag: String,
    pub ranking: i32,
    /// Last stored decimal odds; anything below 1.0 means "not yet known".
    pub odds: f64,
    pub category: Category,
}

#[derive(Clone, Debug)]
pub struct Event {
    /// Feed-assigned id, stable across polls; the diff key.
    pub tree_id: i64,
    pub name: String,
    pub url: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub score: Option<ScoreBoard>,
    pub home: Member,
    pub away: Member,
    pub markets: Vec<Market>,
    // Denormalized from the owning group at construction time.
    pub octour: i32,
    pub ocround: i32,
    pub ocrank: i32,
    pub category: Category,
}

impl Event {
    pub fn member(&self, side: Side) -> &Member {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Decimal odds of the first match-result market, as `(home, away)`.
    ///
    /// `Some((0.0, 0.0))` when the event lists markets but no match-result
    /// one; `None` when the event lists no markets at all or the market is
    /// malformed (selection count other than two).
    pub fn result_odds(&self) -> Option<(f64, f64)> {
        if self.markets.is_empty() {
            return None;
        }
        for market in &self.markets {
            if market.model != MATCH_RESULT_MODEL {
                continue;
            }
            let [first, second] = market.selections.as_slice() else {
                return None;
            };
            if first.selkey.starts_with('H') {
                return Some((first.coeff, second.coeff));
            }
            return Some((second.coeff, first.coeff));
        }
        Some((0.0, 0.0))
    }
}

/// A tournament. Display fields come from the directory once the first
/// event's member pair resolves; `name` stays `None` until then and such
/// groups are skipped by the serializers.
#[derive(Clone, Debug)]
pub struct Group {
    pub tree_id: i64,
    pub name: Option<String>,
    pub flag: String,
    pub court: String,
    pub is_american: bool,
    pub ocid: i32,
    pub ocround: i32,
    pub ocrank: i32,
    pub category: Category,
    /// Sorted by `tree_id`.
    pub events: Vec<Arc<Event>>,
}

#[derive(Clone, Debug)]
pub struct Sport {
    pub code: String,
    pub name: String,
    /// Sorted by `tree_id`.
    pub groups: Vec<Group>,
}

/// One parsed feed generation.
#[derive(Clone, Debug, Default)]
pub struct Feed {
    pub sports: Vec<Sport>,
}

impl Feed {
    /// Visit every event with its owning group, in tree order.
    pub fn for_each_event<F>(&self, mut visit: F)
    where
        F: FnMut(&Group, &Arc<Event>),
    {
        for sport in &self.sports {
            for group in &sport.groups {
                for event in &group.events {
                    visit(group, event);
                }
            }
        }
    }

    pub fn count_events(&self) -> usize {
        self.sports
            .iter()
            .flat_map(|sport| &sport.groups)
            .map(|group| group.events.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_class_label_prefers_tier_bits() {
        let mut category = Category::ATP;
        assert_eq!(category.class_label(), Some("ATP"));
        category.insert(Category::CHALLENGER);
        assert_eq!(category.class_label(), Some("Challenger"));

        let mut itf = Category::WTA;
        itf.insert(Category::ITF);
        assert_eq!(itf.class_label(), Some("ITF"));
        assert_eq!(itf.tour_name(), Some("wta"));

        assert_eq!(Category::NONE.class_label(), None);
    }

    #[test]
    fn game_point_wire_round_trip() {
        assert_eq!(GamePoint::from_wire(-2), GamePoint::Advantage);
        assert_eq!(GamePoint::from_wire(-1), GamePoint::Unknown);
        assert_eq!(GamePoint::from_wire(40), GamePoint::Points(40));
        assert_eq!(GamePoint::Advantage.to_wire(), -2);
        assert_eq!(GamePoint::Points(15).to_wire(), 15);
    }

    #[test]
    fn service_sides() {
        assert!(Service::Home.serves(Side::Home));
        assert!(!Service::Home.serves(Side::Away));
        assert!(Service::Away.serves(Side::Away));
        assert!(!Service::Unknown.serves(Side::Home));
        assert_eq!(Service::Away.to_wire(), 2);
    }

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

    fn event_with_markets(markets: Vec<Market>) -> Event {
        Event {
            tree_id: 1,
            name: "A - B".to_string(),
            url: None,
            date: None,
            score: None,
            home: member("A"),
            away: member("B"),
            markets,
            octour: -1,
            ocround: -1,
            ocrank: -1,
            category: Category::ATP,
        }
    }

    fn selection(selkey: &str, coeff: f64) -> Selection {
        Selection {
            name: String::new(),
            value: 0.0,
            coeff_id: 0,
            coeff,
            selkey: selkey.to_string(),
            uid: String::new(),
            score_home: 0,
            score_away: 0,
        }
    }

    fn market(model: &str, selections: Vec<Selection>) -> Market {
        Market {
            model: model.to_string(),
            name: String::new(),
            kind: String::new(),
            value: 0.0,
            selections,
        }
    }

    #[test]
    fn result_odds_orient_by_selkey() {
        let event = event_with_markets(vec![market(
            MATCH_RESULT_MODEL,
            vec![selection("A2", 2.5), selection("H1", 1.4)],
        )]);
        assert_eq!(event.result_odds(), Some((1.4, 2.5)));

        let event = event_with_markets(vec![market(
            MATCH_RESULT_MODEL,
            vec![selection("H1", 1.4), selection("A2", 2.5)],
        )]);
        assert_eq!(event.result_odds(), Some((1.4, 2.5)));
    }

    #[test]
    fn result_odds_without_a_match_result_market_read_unpriced() {
        let event = event_with_markets(vec![market(
            "SETS_W",
            vec![selection("H1", 1.8), selection("A2", 1.9)],
        )]);
        assert_eq!(event.result_odds(), Some((0.0, 0.0)));
    }

    #[test]
    fn result_odds_need_markets_and_two_selections() {
        assert_eq!(event_with_markets(Vec::new()).result_odds(), None);

        let event = event_with_markets(vec![market(
            MATCH_RESULT_MODEL,
            vec![selection("H1", 1.4)],
        )]);
        assert_eq!(event.result_odds(), None);
    }
}
