use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// team_id -> actual table position, built once per recalculation run.
pub type StandingsLookup = HashMap<String, i32>;

#[derive(Serialize, Deserialize, Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::models::schema::standings)]
pub struct StandingsEntry {
    pub team_id: String,
    pub season: String,
    pub position: i32,
    pub played: i32,
    pub wins: i32,
    pub draws: i32,
    pub losses: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
    #[serde(rename = "createdAt")]
    pub created_at: Option<chrono::NaiveDateTime>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::NaiveDateTime>,
}

pub fn build_standings_lookup(entries: &[StandingsEntry]) -> StandingsLookup {
    entries
        .iter()
        .map(|entry| (entry.team_id.clone(), entry.position))
        .collect()
}
