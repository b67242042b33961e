//! Score text decoders.
//!
//! The live feed packs a whole scoreboard into one string, e.g.
//! `"6:4, 2:1 (*40:30)"` or `"2:1 (6:4, 2:6, 2:1) (A:40)"`. The feed is
//! occasionally malformed and a partially-decoded board must still
//! display, so neither decoder here ever fails: unparsable fragments
//! become sentinels (−1 unknown, advantage) instead of errors.

use crate::model::{GamePoint, GameScore, ScoreBoard, Service, SetScore};

/// Decode one value of a `H:A` pair. A leading `_` is stripped (meaning
/// unknown upstream, preserved as-is), a bare `A` before the separator or
/// the end is the advantage marker, and trailing garbage after the digits
/// turns the value into "unknown".
fn score_value(raw: &str) -> i8 {
    let text = raw.strip_prefix('_').unwrap_or(raw);
    let bytes = text.as_bytes();
    if !bytes.is_empty() && bytes[0] == b'A' && (bytes.len() == 1 || bytes[1] == b':') {
        return GamePoint::Advantage.to_wire();
    }
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end += 1;
    }
    let digits = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits {
        // No digits consumed; the terminator check below runs against the
        // first character, matching strtol-with-endptr behavior.
        end = 0;
    }
    let value = if end == 0 {
        0
    } else {
        text[..end].parse::<i32>().unwrap_or(0) as i8
    };
    match bytes.get(end) {
        None | Some(b':') | Some(b'_') => value,
        _ => -1,
    }
}

/// Split a `H:A` pair at the first colon. No colon at all means both
/// values are unknown.
fn split_values(text: &str) -> SetScore {
    match text.find(':') {
        None => SetScore::new(-1, -1),
        Some(pos) => SetScore::new(score_value(text), score_value(&text[pos + 1..])),
    }
}

/// Decode one score item. Truncates at the closing parenthesis, then
/// interprets the serve marker: `*` at the start means the home side
/// serves, after the values the away side.
fn extract_score(raw: &str) -> (SetScore, Option<Service>) {
    let mut text = raw;
    if let Some(pos) = text.find(')') {
        text = &text[..pos];
    }
    let mut service = None;
    if let Some(pos) = text.find('*') {
        if pos > 0 {
            text = &text[..pos];
            service = Some(Service::Away);
        } else {
            text = &text[1..];
            service = Some(Service::Home);
        }
    }
    (split_values(text), service)
}

/// Decode a `", "`-separated list of completed-set scores.
fn extract_sets(raw: &str) -> Vec<SetScore> {
    let mut text = raw;
    if let Some(pos) = text.find(')') {
        text = &text[..pos];
    }
    text.split(", ").map(|item| extract_score(item).0).collect()
}

fn apply_game(board: &mut ScoreBoard, block: &str) {
    let (points, service) = extract_score(block);
    board.game = GameScore {
        home: GamePoint::from_wire(points.home),
        away: GamePoint::from_wire(points.away),
    };
    if let Some(service) = service {
        board.service = service;
    }
}

/// Decode the live feed's `liveresult` text.
///
/// One parenthesized block means "completed sets + current game", two mean
/// a leading sets-won tally as well. Without any block the board keeps its
/// zero defaults (the feed does this for matches that have not started).
pub fn parse_live(content: &str) -> ScoreBoard {
    let mut board = ScoreBoard::default();
    let parts: Vec<&str> = content.split(" (").collect();
    if parts.len() >= 3 {
        board.summary = extract_score(parts[0]).0;
        board.sets = extract_sets(parts[1]);
        apply_game(&mut board, parts[2]);
    } else if parts.len() == 2 {
        board.sets = extract_sets(parts[0]);
        apply_game(&mut board, parts[1]);
    }
    board
}

fn leading_int(text: &str) -> (i8, usize) {
    let end = text
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(text.len());
    (text[..end].parse().unwrap_or(0), end)
}

/// Decode the plain-text encoding used for archived results: space-separated
/// `H-A` set tokens, e.g. `"6-4 3-6 7-5"`. The sets-won tally is derived by
/// counting which side took each set; the in-progress game is unknown.
pub fn parse_plain(source: &str) -> Option<ScoreBoard> {
    if source.is_empty() {
        return None;
    }
    let mut board = ScoreBoard {
        game: GameScore {
            home: GamePoint::Unknown,
            away: GamePoint::Unknown,
        },
        ..ScoreBoard::default()
    };
    for token in source.split(' ') {
        let (home, end) = leading_int(token);
        let rest = &token[end..];
        let away = if rest.len() > 1 {
            leading_int(&rest[1..]).0
        } else {
            0
        };
        board.sets.push(SetScore::new(home, away));
        if home > away {
            board.summary.home += 1;
        } else {
            board.summary.away += 1;
        }
    }
    Some(board)
}
