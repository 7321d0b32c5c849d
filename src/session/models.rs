use super::metrics;

/// Accumulating statistics for one player over one map
///
/// Counters only ever grow. Ratios, the opponent average and the rating are
/// derived and refreshed every time a counter changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    name: String,
    map: String,
    kills: u32,
    deaths: u32,
    rounds: u32,
    knife_kills: u32,
    opponent_counts: Vec<u32>,
    kill_death_ratio: f64,
    kills_per_round: f64,
    average_opponents: f64,
    rating: i64,
}

impl SessionRecord {
    pub fn new(name: String, map: String) -> Self {
        Self {
            name,
            map,
            kills: 0,
            deaths: 0,
            rounds: 0,
            knife_kills: 0,
            opponent_counts: Vec::new(),
            kill_death_ratio: 0.0,
            kills_per_round: 0.0,
            average_opponents: 0.0,
            rating: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn knife_kills(&self) -> u32 {
        self.knife_kills
    }

    pub fn opponent_counts(&self) -> &[u32] {
        &self.opponent_counts
    }

    pub fn kill_death_ratio(&self) -> f64 {
        self.kill_death_ratio
    }

    pub fn kills_per_round(&self) -> f64 {
        self.kills_per_round
    }

    pub fn average_opponents(&self) -> f64 {
        self.average_opponents
    }

    pub fn rating(&self) -> i64 {
        self.rating
    }

    pub(crate) fn add_round(&mut self) {
        self.rounds += 1;
        self.refresh_ratios();
    }

    pub(crate) fn add_kill(&mut self, is_knife: bool) {
        self.kills += 1;
        if is_knife {
            self.knife_kills += 1;
        }
        self.refresh_ratios();
    }

    pub(crate) fn add_death(&mut self) {
        self.deaths += 1;
        self.refresh_ratios();
    }

    pub(crate) fn add_opponent_count(&mut self, count: u32) {
        self.opponent_counts.push(count);
        self.average_opponents = metrics::average(&self.opponent_counts);
    }

    fn refresh_ratios(&mut self) {
        self.kill_death_ratio = metrics::ratio(self.kills, self.deaths);
        self.kills_per_round = metrics::ratio(self.kills, self.rounds);
        self.rating = metrics::rating(self.kill_death_ratio, self.kills);
    }
}
