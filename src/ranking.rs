// 🏆 Ranking Engine - derived columns + competition ("min") ranking
//
// Official rank: (gold, silver, bronze) compared lexicographically, per edition.
// Points/Total ranks: single scalar key, computed per requested subset and
// never stored on the record.

use crate::entities::CountryRegistry;
use crate::error::EngineError;
use crate::record::{Edition, MedalRecord, MergedRow};
use crate::table::MedalTable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RANKING PRIMITIVE
// ============================================================================

/// Competition ranking over `items`, best first according to `cmp`
///
/// Ties share the lowest position of their group and the next group skips
/// ahead: 1, 1, 3 (never 1, 1, 2). Ranks are aligned with the input order.
pub fn competition_rank<T, F>(items: &[T], mut cmp: F) -> Vec<u32>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| cmp(&items[a], &items[b]));

    let mut ranks = vec![0u32; items.len()];
    for (pos, &idx) in order.iter().enumerate() {
        ranks[idx] = match pos.checked_sub(1).map(|p| order[p]) {
            Some(prev) if cmp(&items[prev], &items[idx]) == Ordering::Equal => ranks[prev],
            _ => pos as u32 + 1,
        };
    }
    ranks
}

// ============================================================================
// RANK KEY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankKey {
    /// Gold, then silver, then bronze
    #[default]
    Official,
    Points,
    Total,
}

impl RankKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankKey::Official => "official",
            RankKey::Points => "points",
            RankKey::Total => "total",
        }
    }

    /// Best-first ordering of two records under this key
    pub fn compare(&self, a: &MedalRecord, b: &MedalRecord) -> Ordering {
        match self {
            RankKey::Official => b.medal_key().cmp(&a.medal_key()),
            RankKey::Points => b.points.cmp(&a.points),
            RankKey::Total => b.total.cmp(&a.total),
        }
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RankKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "official" => Ok(RankKey::Official),
            "points" => Ok(RankKey::Points),
            "total" => Ok(RankKey::Total),
            other => Err(EngineError::UnknownRankKey(other.to_string())),
        }
    }
}

// ============================================================================
// RANKED VIEW
// ============================================================================

/// View-local rank annotation over a borrowed record
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry<'a> {
    #[serde(rename = "view_rank")]
    pub rank: u32,

    #[serde(flatten)]
    pub record: &'a MedalRecord,
}

// ============================================================================
// RANKING ENGINE
// ============================================================================

pub struct RankingEngine;

impl RankingEngine {
    pub fn new() -> Self {
        RankingEngine
    }

    /// Derive Points/Total, official rank per edition and flag codes
    pub fn build_table(&self, rows: Vec<MergedRow>, registry: &CountryRegistry) -> MedalTable {
        let mut partitions: BTreeMap<Edition, Vec<MergedRow>> = BTreeMap::new();
        for row in rows {
            partitions.entry(row.edition()).or_default().push(row);
        }

        // Flag resolution is pure per name
        let mut flags: HashMap<String, String> = HashMap::new();
        let mut records = Vec::new();

        for (edition, partition) in partitions {
            let ranks = competition_rank(&partition, |a, b| {
                (b.gold, b.silver, b.bronze).cmp(&(a.gold, a.silver, a.bronze))
            });

            tracing::debug!(%edition, nations = partition.len(), "ranked edition");

            for (row, rank) in partition.into_iter().zip(ranks) {
                let flag = if row.country_missing {
                    registry.flag_code(None)
                } else {
                    flags
                        .entry(row.nation.clone())
                        .or_insert_with(|| registry.flag_for(&row.nation))
                        .clone()
                };

                records.push(MedalRecord {
                    rank,
                    flag,
                    points: row.points(),
                    total: row.total(),
                    nation: row.nation,
                    gold: row.gold,
                    silver: row.silver,
                    bronze: row.bronze,
                    year: row.year,
                    season: row.season,
                    host_city: row.host_city,
                    host_country: row.host_country,
                    country_missing: row.country_missing,
                });
            }
        }

        MedalTable::new(records)
    }

    /// Rank any subset under `key`, sorted by rank (input order kept within ties)
    pub fn rank_view<'a, I>(&self, records: I, key: RankKey) -> Vec<RankedEntry<'a>>
    where
        I: IntoIterator<Item = &'a MedalRecord>,
    {
        let records: Vec<&MedalRecord> = records.into_iter().collect();
        let ranks = competition_rank(&records, |a, b| key.compare(a, b));

        let mut view: Vec<RankedEntry<'a>> = records
            .into_iter()
            .zip(ranks)
            .map(|(record, rank)| RankedEntry { rank, record })
            .collect();
        view.sort_by_key(|entry| entry.rank);
        view
    }

    /// First `limit` entries of `rank_view` (all of them when `None`)
    pub fn top<'a, I>(&self, records: I, key: RankKey, limit: Option<usize>) -> Vec<RankedEntry<'a>>
    where
        I: IntoIterator<Item = &'a MedalRecord>,
    {
        let mut view = self.rank_view(records, key);
        if let Some(limit) = limit {
            view.truncate(limit);
        }
        view
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Season;
    use pretty_assertions::assert_eq;

    fn row(nation: &str, gold: u32, silver: u32, bronze: u32, year: i32, season: Season) -> MergedRow {
        MergedRow {
            nation: nation.to_string(),
            gold,
            silver,
            bronze,
            year,
            season,
            host_city: "City".to_string(),
            host_country: "Country".to_string(),
            country_missing: false,
        }
    }

    fn summer(nation: &str, gold: u32, silver: u32, bronze: u32) -> MergedRow {
        row(nation, gold, silver, bronze, 2024, Season::Summer)
    }

    fn rank_of(table: &MedalTable, nation: &str) -> u32 {
        table
            .records()
            .iter()
            .find(|r| r.nation == nation)
            .map(|r| r.rank)
            .unwrap()
    }

    #[test]
    fn test_competition_rank_min_method() {
        let values = [10, 7, 10, 3, 7];
        let ranks = competition_rank(&values, |a, b| b.cmp(a));
        assert_eq!(ranks, vec![1, 3, 1, 5, 3]);
    }

    #[test]
    fn test_competition_rank_edge_cases() {
        let empty: [u32; 0] = [];
        assert!(competition_rank(&empty, |a, b| b.cmp(a)).is_empty());
        assert_eq!(competition_rank(&[42], |a: &i32, b: &i32| b.cmp(a)), vec![1]);
        assert_eq!(competition_rank(&[5, 5, 5], |a: &i32, b: &i32| b.cmp(a)), vec![1, 1, 1]);
    }

    #[test]
    fn test_official_rank_example() {
        let registry = CountryRegistry::builtin().unwrap();
        let table = RankingEngine::new().build_table(
            vec![
                summer("A", 5, 3, 1),
                summer("B", 5, 3, 1),
                summer("C", 4, 6, 6),
                summer("D", 3, 9, 9),
            ],
            &registry,
        );

        let ranks: Vec<u32> = ["A", "B", "C", "D"].iter().map(|n| rank_of(&table, n)).collect();
        assert_eq!(ranks, vec![1, 1, 3, 4]);
    }

    #[test]
    fn test_gold_outranks_any_silver_count() {
        let registry = CountryRegistry::builtin().unwrap();
        let table = RankingEngine::new().build_table(
            vec![summer("Silver Nation", 0, 100, 100), summer("Gold Nation", 1, 0, 0)],
            &registry,
        );

        assert_eq!(rank_of(&table, "Gold Nation"), 1);
        assert_eq!(rank_of(&table, "Silver Nation"), 2);
    }

    #[test]
    fn test_silver_then_bronze_tie_breaks() {
        let registry = CountryRegistry::builtin().unwrap();
        let table = RankingEngine::new().build_table(
            vec![summer("A", 2, 1, 9), summer("B", 2, 2, 0), summer("C", 2, 2, 1)],
            &registry,
        );

        assert_eq!(rank_of(&table, "C"), 1);
        assert_eq!(rank_of(&table, "B"), 2);
        assert_eq!(rank_of(&table, "A"), 3);
    }

    #[test]
    fn test_official_rank_is_per_edition() {
        let registry = CountryRegistry::builtin().unwrap();
        let table = RankingEngine::new().build_table(
            vec![
                row("Norway", 16, 8, 13, 2022, Season::Winter),
                row("Germany", 12, 10, 5, 2022, Season::Winter),
                row("Japan", 27, 14, 17, 2020, Season::Summer),
                row("Norway", 4, 2, 2, 2020, Season::Summer),
            ],
            &registry,
        );

        let winter = table.edition(2022, Season::Winter);
        assert_eq!(winter[0].nation, "Norway");
        assert_eq!(winter[0].rank, 1);

        let summer = table.edition(2020, Season::Summer);
        assert_eq!(summer[0].nation, "Japan");
        assert_eq!(summer[1].nation, "Norway");
        assert_eq!(summer[1].rank, 2);
    }

    #[test]
    fn test_zero_medal_rows_rank_last() {
        let registry = CountryRegistry::builtin().unwrap();
        let table = RankingEngine::new().build_table(
            vec![summer("Zero A", 0, 0, 0), summer("One", 0, 0, 1), summer("Zero B", 0, 0, 0)],
            &registry,
        );

        assert_eq!(rank_of(&table, "One"), 1);
        assert_eq!(rank_of(&table, "Zero A"), 2);
        assert_eq!(rank_of(&table, "Zero B"), 2);
    }

    #[test]
    fn test_derived_columns_and_flags() {
        let registry = CountryRegistry::builtin().unwrap();
        let table = RankingEngine::new().build_table(
            vec![summer("Japan", 20, 12, 13), summer("Refugee Olympic Team", 0, 0, 1)],
            &registry,
        );

        let japan = &table.records()[0];
        assert_eq!(japan.points, 20 * 3 + 12 * 2 + 13);
        assert_eq!(japan.total, 45);
        assert_eq!(japan.flag, "jp");
        assert_eq!(japan.flag_url(), "https://flagcdn.com/120x90/jp.png");
        assert_eq!(table.records()[1].flag, "un");
    }

    #[test]
    fn test_points_view_differs_from_official() {
        let registry = CountryRegistry::builtin().unwrap();
        let engine = RankingEngine::new();
        let table = engine.build_table(
            vec![
                summer("Golden", 3, 0, 0),   // 9 points, 3 total
                summer("Plenty", 2, 5, 5),   // 21 points, 12 total
                summer("Bronzes", 0, 0, 12), // 12 points, 12 total
            ],
            &registry,
        );
        let edition = table.edition(2024, Season::Summer);

        let points = engine.rank_view(edition.iter().copied(), RankKey::Points);
        let order: Vec<(&str, u32)> = points.iter().map(|e| (e.record.nation.as_str(), e.rank)).collect();
        assert_eq!(order, vec![("Plenty", 1), ("Bronzes", 2), ("Golden", 3)]);

        let total = engine.rank_view(edition.iter().copied(), RankKey::Total);
        let ranks: Vec<u32> = total.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);

        // Official rank on the record is untouched by views
        assert_eq!(rank_of(&table, "Golden"), 1);
    }

    #[test]
    fn test_official_view_matches_stored_rank() {
        let registry = CountryRegistry::builtin().unwrap();
        let engine = RankingEngine::new();
        let table = engine.build_table(
            vec![summer("A", 1, 1, 1), summer("B", 1, 1, 1), summer("C", 0, 5, 0)],
            &registry,
        );

        let view = engine.rank_view(table.records(), RankKey::Official);
        for entry in view {
            assert_eq!(entry.rank, entry.record.rank);
        }
    }

    #[test]
    fn test_row_without_country_gets_sentinel_flag() {
        let registry = CountryRegistry::builtin().unwrap();
        let mut unnamed = summer("Japan", 1, 0, 0);
        unnamed.country_missing = true;

        let table = RankingEngine::new().build_table(vec![summer("Japan", 2, 0, 0), unnamed], &registry);

        // Same placeholder text as a real nation, but never resolved through the tables
        assert_eq!(table.records()[0].flag, "jp");
        assert_eq!(table.records()[1].flag, "un");
        assert!(table.records()[1].country_missing);
    }

    #[test]
    fn test_points_view_with_large_counts() {
        let registry = CountryRegistry::builtin().unwrap();
        let engine = RankingEngine::new();
        let table = engine.build_table(
            vec![summer("Big", 2_000_000_000, 0, 0), summer("Bigger", 0, 3_500_000_000, 0)],
            &registry,
        );

        let view = engine.rank_view(table.records(), RankKey::Points);
        assert_eq!(view[0].record.nation, "Bigger");
        assert_eq!(view[0].record.points, 7_000_000_000);
        assert_eq!(view[1].record.points, 6_000_000_000);
    }

    #[test]
    fn test_top_limits_view() {
        let registry = CountryRegistry::builtin().unwrap();
        let engine = RankingEngine::new();
        let table = engine.build_table(
            vec![summer("A", 1, 0, 0), summer("B", 0, 2, 0), summer("C", 0, 0, 5)],
            &registry,
        );

        let top = engine.top(table.records(), RankKey::Points, Some(2));
        let nations: Vec<&str> = top.iter().map(|e| e.record.nation.as_str()).collect();
        assert_eq!(nations, vec!["C", "B"]);

        assert_eq!(engine.top(table.records(), RankKey::Points, None).len(), 3);
        assert_eq!(engine.top(table.records(), RankKey::Points, Some(10)).len(), 3);
    }

    #[test]
    fn test_rank_key_parse() {
        assert_eq!("Points".parse::<RankKey>().unwrap(), RankKey::Points);
        assert_eq!("official".parse::<RankKey>().unwrap(), RankKey::Official);
        assert!("medals".parse::<RankKey>().is_err());
    }
}
