//! Relational directory against the OnCourt mirror.
//!
//! The mirror keeps one table family per tour (`today_atp`, `players_wta`,
//! ...), so every template here carries a `{category}` token substituted
//! with the tour suffix before the query runs.

use std::time::Duration;

use mbet_feed::{Category, PlayerData, TournamentInfo, TournamentKey};
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use tracing::{debug, info};

use crate::{OncourtError, Result};

const TOURNAMENT_FOR: &str = r#"
SELECT TOUR, ROUND, RANK_T
FROM today_{category}
JOIN tours_{category} ON ID_T = TOUR
WHERE (ID1 = ? AND ID2 = ?) OR (ID1 = ? AND ID2 = ?)
ORDER BY ROUND DESC
LIMIT 1
"#;

const TOURNAMENT_INFO: &str = r#"
SELECT NAME_T, COUNTRY_T, NAME_C
FROM tours_{category}
JOIN courts ON ID_C = ID_C_T
WHERE ID_T = ?
"#;

const PLAYER_DATA: &str = r#"
SELECT NAME_P, COUNTRY_P,
       COALESCE((SELECT POS_R FROM ratings_{category}
                 WHERE ID_P_R = ID_P ORDER BY DATE_R DESC LIMIT 1), 0)
FROM players_{category}
WHERE ID_P = ?
"#;

const PLAYER_ODDS: &str = r#"
SELECT CASE WHEN ID1_O = ? THEN K1 ELSE K2 END,
       CASE WHEN ID1_O = ? THEN K2 ELSE K1 END
FROM odds_{category}
WHERE ((ID1_O = ? AND ID2_O = ?) OR (ID1_O = ? AND ID2_O = ?))
  AND ID_B_O = 1 AND ID_T_O = ? AND ID_R_O = ?
"#;

const INSERT_ODDS: &str = r#"
INSERT IGNORE INTO odds_{category}
VALUES (1, ?, ?, ?, ?, ?, ?, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00,
        0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00)
"#;

// Result rows for the finished-match documents. The LEFT JOIN keeps rows
// whose pairing was never priced; their K columns come back NULL.
const MATCH_RESULTS: &str = r#"
SELECT NAME_T AS TOUR, ID_T_G AS ID_T, COUNTRY_T AS FLAG, NAME_C AS COURT,
       P1.ID_P, P1.COUNTRY_P AS PFLAG1,
       COALESCE((SELECT POS_R FROM ratings_{category}
                 WHERE ID_P_R = ID1_G ORDER BY DATE_R DESC LIMIT 1), 0) AS R1,
       P1.NAME_P,
       CASE WHEN ID1_G = ID1_O THEN K1 ELSE K2 END AS K1,
       P2.ID_P, P2.COUNTRY_P AS PFLAG2,
       COALESCE((SELECT COALESCE(POS_R, 0) FROM ratings_{category}
                 WHERE ID_P_R = ID2_G ORDER BY DATE_R DESC LIMIT 1), 0) AS R2,
       P2.NAME_P,
       CASE WHEN ID2_G = ID1_O THEN K1 ELSE K2 END AS K2,
       (SELECT RANK_T FROM tours_{category} WHERE ID_T = ID_T_G) AS T_RANK,
       ID_R_G, RESULT_G
FROM games_{category}
JOIN players_{category} P1 ON P1.ID_P = ID1_G
JOIN players_{category} P2 ON P2.ID_P = ID2_G
JOIN tours_{category} ON ID_T = ID_T_G
JOIN courts ON ID_C = ID_C_T
LEFT JOIN odds_{category}
       ON ((ID1_O = ID1_G AND ID2_O = ID2_G) OR (ID2_O = ID1_G AND ID1_O = ID2_G))
      AND ID_T_O = ID_T_G AND ID_R_O = ID_R_G AND ID_B_O = 1
WHERE P1.NAME_P NOT LIKE '%/%' AND P2.NAME_P NOT LIKE '%/%'
  AND DATE_G = {day}
ORDER BY ID_T_G
"#;

/// Which day's finished matches to pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchDay {
    Today,
    Yesterday,
}

impl MatchDay {
    fn sql_date(self) -> &'static str {
        match self {
            MatchDay::Today => "CURRENT_DATE",
            MatchDay::Yesterday => "SUBDATE(CURRENT_DATE, 1)",
        }
    }
}

/// One side of a finished match.
#[derive(Clone, Debug)]
pub struct PlayerRow {
    pub id: i32,
    pub flag: String,
    pub ranking: i32,
    pub name: String,
    pub odds: f64,
}

/// One finished match, already joined with tournament and player data.
#[derive(Clone, Debug)]
pub struct MatchRow {
    pub tour_name: String,
    pub tour_id: i32,
    pub tour_flag: String,
    pub court: String,
    pub home: PlayerRow,
    pub away: PlayerRow,
    pub tour_rank: i32,
    pub round: i32,
    pub result: String,
}

fn for_category(template: &str, category: Category) -> Result<String> {
    let suffix = category.tour_name().ok_or(OncourtError::UnknownCategory)?;
    Ok(template.replace("{category}", suffix))
}

fn decode_match_row(row: &MySqlRow) -> sqlx::Result<MatchRow> {
    Ok(MatchRow {
        tour_name: row.try_get(0)?,
        tour_id: row.try_get(1)?,
        tour_flag: row.try_get(2)?,
        court: row.try_get(3)?,
        home: PlayerRow {
            id: row.try_get(4)?,
            flag: row.try_get(5)?,
            ranking: row.try_get(6)?,
            name: row.try_get(7)?,
            odds: row.try_get::<Option<f64>, _>(8)?.unwrap_or(0.0),
        },
        away: PlayerRow {
            id: row.try_get(9)?,
            flag: row.try_get(10)?,
            ranking: row.try_get(11)?,
            name: row.try_get(12)?,
            odds: row.try_get::<Option<f64>, _>(13)?.unwrap_or(0.0),
        },
        tour_rank: row.try_get(14)?,
        round: row.try_get(15)?,
        result: row.try_get(16)?,
    })
}

/// Pooled MySQL access to the OnCourt mirror.
#[derive(Clone)]
pub struct OncourtDatabase {
    pool: MySqlPool,
}

impl OncourtDatabase {
    pub async fn connect(url: &str) -> Result<OncourtDatabase> {
        info!("connecting to the OnCourt mirror");
        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        Ok(OncourtDatabase { pool })
    }

    /// Like [`OncourtDatabase::connect`] but without touching the server;
    /// connections are opened on first use.
    pub fn connect_lazy(url: &str) -> Result<OncourtDatabase> {
        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)?;
        Ok(OncourtDatabase { pool })
    }

    /// Tournament identity for a pairing, either ordering; all fields stay
    /// −1 when today's schedule has no such match.
    pub async fn tournament_for(
        &self,
        category: Category,
        home: i32,
        away: i32,
    ) -> Result<TournamentKey> {
        let query = for_category(TOURNAMENT_FOR, category)?;
        let row = sqlx::query_as::<_, (i32, i32, i32)>(&query)
            .bind(home)
            .bind(away)
            .bind(away)
            .bind(home)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match row {
            Some((tour, round, rank)) => TournamentKey { tour, round, rank },
            None => TournamentKey::default(),
        })
    }

    pub async fn tournament_info(
        &self,
        category: Category,
        tour: i32,
    ) -> Result<Option<TournamentInfo>> {
        let query = for_category(TOURNAMENT_INFO, category)?;
        let row = sqlx::query_as::<_, (String, String, String)>(&query)
            .bind(tour)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(name, flag, court)| TournamentInfo { name, flag, court }))
    }

    pub async fn player(&self, category: Category, id: i32) -> Result<Option<PlayerData>> {
        let query = for_category(PLAYER_DATA, category)?;
        let row = sqlx::query_as::<_, (String, String, i32)>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(name, flag, ranking)| PlayerData {
            name,
            flag,
            ranking,
        }))
    }

    /// Stored bookmaker odds for a pairing, oriented as `(home, away)`
    /// whichever way the row was written.
    pub async fn player_odds(
        &self,
        category: Category,
        home: i32,
        away: i32,
        tour: i32,
        round: i32,
    ) -> Result<Option<(f64, f64)>> {
        let query = for_category(PLAYER_ODDS, category)?;
        let row = sqlx::query_as::<_, (f64, f64)>(&query)
            .bind(home)
            .bind(home)
            .bind(home)
            .bind(away)
            .bind(away)
            .bind(home)
            .bind(tour)
            .bind(round)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Records the first observed price for a pairing. `INSERT IGNORE`
    /// keeps the write idempotent across cycles and subscribers.
    pub async fn write_odds(
        &self,
        category: Category,
        home: i32,
        away: i32,
        tour: i32,
        round: i32,
        home_odds: f64,
        away_odds: f64,
    ) -> Result<()> {
        let query = for_category(INSERT_ODDS, category)?;
        let result = sqlx::query(&query)
            .bind(home)
            .bind(away)
            .bind(tour)
            .bind(round)
            .bind(home_odds)
            .bind(away_odds)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            debug!(home, away, tour, round, "odds were already stored");
        }
        Ok(())
    }

    /// Finished matches of the given day, tournament-ordered.
    pub async fn match_results(
        &self,
        category: Category,
        day: MatchDay,
    ) -> Result<Vec<MatchRow>> {
        let query = for_category(MATCH_RESULTS, category)?.replace("{day}", day.sql_date());
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let mut matches = Vec::with_capacity(rows.len());
        for row in &rows {
            matches.push(decode_match_row(row)?);
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_the_table_suffix() {
        let query = for_category(TOURNAMENT_FOR, Category::ATP).unwrap();
        assert!(query.contains("FROM today_atp"));
        assert!(query.contains("JOIN tours_atp"));
        assert!(!query.contains("{category}"));

        let query = for_category(PLAYER_DATA, Category::WTA).unwrap();
        assert!(query.contains("FROM players_wta"));
        assert!(query.contains("ratings_wta"));
    }

    #[test]
    fn tier_bits_do_not_change_the_suffix() {
        let mut category = Category::ATP;
        category.insert(Category::CHALLENGER);
        let query = for_category(TOURNAMENT_INFO, category).unwrap();
        assert!(query.contains("tours_atp"));
    }

    #[test]
    fn tourless_category_is_an_error() {
        assert!(matches!(
            for_category(PLAYER_ODDS, Category::NONE),
            Err(OncourtError::UnknownCategory)
        ));
    }

    #[test]
    fn match_day_picks_the_date_clause() {
        assert_eq!(MatchDay::Today.sql_date(), "CURRENT_DATE");
        assert_eq!(MatchDay::Yesterday.sql_date(), "SUBDATE(CURRENT_DATE, 1)");
        let query = for_category(MATCH_RESULTS, Category::ATP)
            .unwrap()
            .replace("{day}", MatchDay::Yesterday.sql_date());
        assert!(query.contains("DATE_G = SUBDATE(CURRENT_DATE, 1)"));
    }
}
