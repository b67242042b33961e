//! Long-term archives in MongoDB.
//!
//! Two stores: `bt.point2point` accumulates the odds attached to every
//! observed in-game score state, one document per pairing per tournament
//! round; `elevation.tournaments` is a scraped altitude table keyed by
//! OnCourt tournament id.

use futures::TryStreamExt;
use mbet_feed::{Event, GamePoint, ScoreBoard};
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::UpdateOptions;
use mongodb::{Client, Collection};
use tracing::info;

use crate::Result;

/// Handle to the Mongo archives.
#[derive(Clone)]
pub struct MatchArchive {
    client: Client,
}

/// Pairing identity of a point2point document; `None` while the event's
/// tournament is unresolved.
fn point_filter(event: &Event) -> Option<Document> {
    if event.octour == -1 {
        return None;
    }
    let category = event.category.tour_name()?;
    Some(doc! {
        "h": event.home.ocid,
        "a": event.away.ocid,
        "t": event.octour,
        "r": event.ocround,
        "c": category,
    })
}

/// Field key and value for one score state. The key reads
/// `<set>.<game>.<HH><AA>` with `AD` standing in for a side on advantage;
/// the game number counts games in the recorded set plus one.
fn point_entry(score: &ScoreBoard, odds: (f64, f64)) -> Option<(String, Document)> {
    let set = score.sets.last()?;
    let game = i32::from(set.home) + i32::from(set.away) + 1;
    let key = match (score.game.home, score.game.away) {
        (GamePoint::Advantage, away) => {
            format!("{}.{}.AD{:02}", score.sets.len(), game, away.to_wire())
        }
        (home, GamePoint::Advantage) => {
            format!("{}.{}.{:02}AD", score.sets.len(), game, home.to_wire())
        }
        (home, away) => format!(
            "{}.{}.{:02}{:02}",
            score.sets.len(),
            game,
            home.to_wire(),
            away.to_wire()
        ),
    };
    let value = doc! {
        "h": odds.0,
        "a": odds.1,
        "s": f64::from(score.service.to_wire()),
        "H": f64::from(set.home),
        "A": f64::from(set.away),
    };
    Some((key, value))
}

impl MatchArchive {
    pub async fn connect(uri: &str) -> Result<MatchArchive> {
        info!("connecting to the match archive");
        let client = Client::with_uri_str(uri).await?;
        Ok(MatchArchive { client })
    }

    fn points(&self) -> Collection<Document> {
        self.client.database("bt").collection("point2point")
    }

    fn tournaments(&self) -> Collection<Document> {
        self.client.database("elevation").collection("tournaments")
    }

    /// Upserts one score state of a superseded event generation together
    /// with the odds that were on offer while it held.
    pub async fn save_point(&self, event: &Event, odds: (f64, f64)) -> Result<()> {
        let Some(filter) = point_filter(event) else {
            return Ok(());
        };
        let Some(score) = &event.score else {
            return Ok(());
        };
        let Some((key, value)) = point_entry(score, odds) else {
            return Ok(());
        };
        let mut point = Document::new();
        point.insert(key, value);
        let options = UpdateOptions::builder().upsert(true).build();
        self.points()
            .update_one(filter, doc! { "$set": point }, options)
            .await?;
        Ok(())
    }

    /// Tournament altitude in meters; `None` when the tournament was never
    /// scraped or carries no elevation array.
    pub async fn elevation(&self, tour: i32) -> Result<Option<f64>> {
        let pipeline = [
            doc! { "$match": { "id_t": tour } },
            doc! { "$project": { "elevation": "$results.elevation" } },
        ];
        let mut cursor = self.tournaments().aggregate(pipeline, None).await?;
        let Some(document) = cursor.try_next().await? else {
            return Ok(None);
        };
        Ok(document
            .get_array("elevation")
            .ok()
            .and_then(|values| values.first())
            .and_then(Bson::as_f64))
    }
}
