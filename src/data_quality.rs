// ✅ Data Quality Engine - audit of the merged medal table
//
// Nothing here blocks the pipeline: lookups already fell back to placeholders.
// The audit makes those fallbacks visible.

use crate::entities::{CountryRegistry, SENTINEL_FLAG, UNKNOWN_HOST};
use crate::merge::find_duplicates;
use crate::record::{Edition, MedalRecord};
use crate::table::MedalTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Ranking of the edition is unreliable
    Warning,  // Display data is incomplete
    Info,     // Valid but worth a look
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub rule_name: String,
    pub nation: Option<String>,
    pub edition: Edition,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub records_checked: usize,
    pub editions_checked: usize,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn summary(&self) -> String {
        format!(
            "{} records over {} editions: {} issues ({} critical, {} warnings, {} info)",
            self.records_checked,
            self.editions_checked,
            self.issues.len(),
            self.count(Severity::Critical),
            self.count(Severity::Warning),
            self.count(Severity::Info)
        )
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.count(Severity::Critical) > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

// ============================================================================
// DATA QUALITY ENGINE
// ============================================================================

pub struct DataQualityEngine {
    /// Host text the merger used for missing metadata
    host_placeholder: String,
}

impl DataQualityEngine {
    pub fn new() -> Self {
        DataQualityEngine {
            host_placeholder: UNKNOWN_HOST.to_string(),
        }
    }

    pub fn with_host_placeholder(placeholder: impl Into<String>) -> Self {
        DataQualityEngine {
            host_placeholder: placeholder.into(),
        }
    }

    pub fn audit(&self, table: &MedalTable, registry: &CountryRegistry) -> QualityReport {
        let mut issues = Vec::new();

        // Rule 1: one record per (nation, year, season)
        let keys = table
            .records()
            .iter()
            .filter(|r| !r.country_missing)
            .map(|r| (r.nation.as_str(), r.year, r.season));
        for dup in find_duplicates(keys) {
            issues.push(QualityIssue {
                severity: Severity::Critical,
                rule_name: "duplicate_record".to_string(),
                nation: Some(dup.nation.clone()),
                edition: Edition::new(dup.year, dup.season),
                issue: format!("{} rows for the same nation and edition", dup.count),
                recommendation: "Remove the overlapping rows from one of the sources".to_string(),
            });
        }

        // Rule 2: host metadata present (once per edition)
        let mut placeholder_editions = BTreeSet::new();
        for record in table.records() {
            if self.is_placeholder_host(record) && placeholder_editions.insert(record.edition()) {
                issues.push(QualityIssue {
                    severity: Severity::Warning,
                    rule_name: "host_placeholder".to_string(),
                    nation: None,
                    edition: record.edition(),
                    issue: "Host city and country are unknown".to_string(),
                    recommendation: "Add the edition to the host metadata file".to_string(),
                });
            }
        }

        for record in table.records() {
            // Rule 3: sentinel flag only where the override table intends it
            if let Some(issue) = self.validate_flag(record, registry) {
                issues.push(issue);
            }

            // Rule 4: the source gave this row no country at all
            if let Some(issue) = self.validate_country(record) {
                issues.push(issue);
            }

            // Rule 5: all-zero rows are valid but usually a source artifact
            if let Some(issue) = self.validate_medals(record) {
                issues.push(issue);
            }
        }

        issues.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then(a.edition.cmp(&b.edition))
                .then_with(|| a.nation.cmp(&b.nation))
        });

        let report = QualityReport {
            records_checked: table.len(),
            editions_checked: table.editions().len(),
            issues,
        };

        tracing::info!("{}", report.summary());
        report
    }

    fn is_placeholder_host(&self, record: &MedalRecord) -> bool {
        record.host_city == self.host_placeholder && record.host_country == self.host_placeholder
    }

    fn validate_flag(&self, record: &MedalRecord, registry: &CountryRegistry) -> Option<QualityIssue> {
        if record.flag != SENTINEL_FLAG || record.country_missing || registry.is_neutral_team(&record.nation) {
            return None;
        }

        Some(QualityIssue {
            severity: Severity::Info,
            rule_name: "flag_unresolved".to_string(),
            nation: Some(record.nation.clone()),
            edition: record.edition(),
            issue: format!("No flag code for '{}', using placeholder", record.nation),
            recommendation: "Add a flag override or a canonical alias for this name".to_string(),
        })
    }

    fn validate_country(&self, record: &MedalRecord) -> Option<QualityIssue> {
        if !record.country_missing {
            return None;
        }

        Some(QualityIssue {
            severity: Severity::Warning,
            rule_name: "country_missing".to_string(),
            nation: None,
            edition: record.edition(),
            issue: format!(
                "Row with {} gold, {} silver, {} bronze has no country",
                record.gold, record.silver, record.bronze
            ),
            recommendation: "Fill in the country cell in the source sheet".to_string(),
        })
    }

    fn validate_medals(&self, record: &MedalRecord) -> Option<QualityIssue> {
        if record.total > 0 {
            return None;
        }

        Some(QualityIssue {
            severity: Severity::Info,
            rule_name: "no_medals".to_string(),
            nation: Some(record.nation.clone()),
            edition: record.edition(),
            issue: "Row has zero gold, silver and bronze".to_string(),
            recommendation: "Check whether the source lists participants without medals".to_string(),
        })
    }
}

impl Default for DataQualityEngine {
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
    use crate::entities::UNKNOWN_NATION;
    use crate::record::{medal_points, Season};

    fn record(nation: &str, flag: &str, gold: u32, host: &str) -> MedalRecord {
        MedalRecord {
            rank: 1,
            flag: flag.to_string(),
            nation: nation.to_string(),
            gold,
            silver: 0,
            bronze: 0,
            total: u64::from(gold),
            points: medal_points(gold, 0, 0),
            year: 2024,
            season: Season::Summer,
            host_city: host.to_string(),
            host_country: host.to_string(),
            country_missing: false,
        }
    }

    fn registry() -> CountryRegistry {
        CountryRegistry::builtin().unwrap()
    }

    #[test]
    fn test_clean_table() {
        let table = MedalTable::new(vec![record("Japan", "jp", 20, "Paris"), record("France", "fr", 16, "Paris")]);
        let report = DataQualityEngine::new().audit(&table, &registry());

        assert!(report.is_clean());
        assert_eq!(report.records_checked, 2);
        assert_eq!(report.editions_checked, 1);
        assert!(!report.has_critical_issues());
    }

    #[test]
    fn test_duplicate_is_critical() {
        let table = MedalTable::new(vec![record("Japan", "jp", 20, "Paris"), record("Japan", "jp", 1, "Paris")]);
        let report = DataQualityEngine::new().audit(&table, &registry());

        assert!(report.has_critical_issues());
        assert_eq!(report.issues[0].rule_name, "duplicate_record");
        assert_eq!(report.issues[0].nation.as_deref(), Some("Japan"));
    }

    #[test]
    fn test_placeholder_host_reported_once_per_edition() {
        let table = MedalTable::new(vec![
            record("Japan", "jp", 20, UNKNOWN_HOST),
            record("France", "fr", 16, UNKNOWN_HOST),
        ]);
        let report = DataQualityEngine::new().audit(&table, &registry());

        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.issues[0].rule_name, "host_placeholder");
    }

    #[test]
    fn test_sentinel_flag_for_neutral_team_is_fine() {
        let table = MedalTable::new(vec![
            record("Refugee Olympic Team", "un", 0, "Paris"),
            record("Atlantis", "un", 1, "Paris"),
        ]);
        let report = DataQualityEngine::new().audit(&table, &registry());

        let flags: Vec<&QualityIssue> = report
            .issues
            .iter()
            .filter(|i| i.rule_name == "flag_unresolved")
            .collect();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].nation.as_deref(), Some("Atlantis"));

        // The refugee row has no medals: informational only
        assert_eq!(report.count(Severity::Info), 2);
    }

    #[test]
    fn test_row_without_country_is_a_warning() {
        let mut first = record(UNKNOWN_NATION, SENTINEL_FLAG, 2, "Paris");
        first.country_missing = true;
        let second = MedalRecord { gold: 1, total: 1, points: 3, ..first.clone() };
        let table = MedalTable::new(vec![record("Japan", "jp", 20, "Paris"), first, second]);

        let report = DataQualityEngine::new().audit(&table, &registry());

        // Two placeholder rows: neither a duplicate nor an unresolved flag
        assert!(!report.has_critical_issues());
        assert_eq!(report.count(Severity::Warning), 2);
        assert_eq!(report.count(Severity::Info), 0);
        assert!(report.issues.iter().all(|i| i.rule_name == "country_missing"));
    }
}
