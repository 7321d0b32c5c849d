//! Plain-text output for the player-facing commands.

use crate::leaderboard::Leaderboard;
use crate::session::SessionRecord;

pub const SESSION_STARTED_MESSAGE: &str = "[Stats] Your statistics are now being recorded.";
pub const LEADERBOARD_UNAVAILABLE_MESSAGE: &str =
    "[Stats] The leaderboard is unavailable right now, try again later.";
pub const LEADERBOARD_EMPTY_MESSAGE: &str = "[Stats] No statistics recorded for this map yet.";

/// Lines printed for "show my stats"
pub fn session_lines(record: &SessionRecord) -> Vec<String> {
    vec![
        "Stats:".to_string(),
        format!("Kills: {}", record.kills()),
        format!("Deaths: {}", record.deaths()),
        format!("KDR: {:.2}", record.kill_death_ratio()),
        format!("KPR: {:.2}", record.kills_per_round()),
        format!("Rounds: {}", record.rounds()),
        format!("Opps: {:.2}", record.average_opponents()),
        format!("Knives: {}", record.knife_kills()),
        format!("GLV: {}", record.rating()),
        format!("Map: {}", record.map()),
    ]
}

/// Lines printed for "show top N for this map"
pub fn leaderboard_lines(map: &str, leaderboard: &Leaderboard) -> Vec<String> {
    let rows = match leaderboard {
        Leaderboard::Unavailable => return vec![LEADERBOARD_UNAVAILABLE_MESSAGE.to_string()],
        Leaderboard::Ranked(rows) if rows.is_empty() => {
            return vec![LEADERBOARD_EMPTY_MESSAGE.to_string()]
        }
        Leaderboard::Ranked(rows) => rows,
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("Top {} on {}:", rows.len(), map));
    lines.push(format!(
        "{:>3}  {:<24} {:>6} {:>6} {:>6} {:>6}",
        "#", "Name", "Kills", "Deaths", "KDR", "GLV"
    ));
    for (index, row) in rows.iter().enumerate() {
        lines.push(format!(
            "{:>3}  {:<24} {:>6} {:>6} {:>6.2} {:>6}",
            index + 1,
            row.name,
            row.kills,
            row.deaths,
            row.kdr,
            row.glv
        ));
    }
    lines
}
