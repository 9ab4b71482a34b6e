// 🚚 Pipeline - load → merge → rank, shared by the CLI and the server

use crate::config::EngineConfig;
use crate::entities::{CountryRegistry, HostRegistry};
use crate::merge::{MergeEngine, MergeReport};
use crate::parser::{load_hosts, load_recent, HistoricalCsvParser};
use crate::ranking::RankingEngine;
use crate::table::MedalTable;
use anyhow::{Context as AnyhowContext, Result};
use std::path::PathBuf;

/// Input files for one run
#[derive(Debug, Clone)]
pub struct SourcePaths {
    pub historical: PathBuf,
    pub recent: PathBuf,
    /// Without host metadata every sheet edition gets the placeholder
    pub hosts: Option<PathBuf>,
}

pub struct PipelineOutput {
    pub registry: CountryRegistry,
    pub table: MedalTable,
    pub report: MergeReport,
}

pub fn build_medal_table(paths: &SourcePaths, config: &EngineConfig) -> Result<PipelineOutput> {
    let registry = config.country_registry()?;

    let historical = HistoricalCsvParser::new()
        .parse(&paths.historical)
        .with_context(|| format!("Failed to load historical source: {:?}", paths.historical))?;

    let recent = load_recent(&paths.recent)
        .with_context(|| format!("Failed to load recent source: {:?}", paths.recent))?;

    let hosts = match &paths.hosts {
        Some(path) => load_hosts(path)
            .with_context(|| format!("Failed to load host metadata: {:?}", path))?,
        None => HostRegistry::new(),
    }
    .with_placeholder(config.host_placeholder.clone());

    let outcome = MergeEngine::with_policy(config.duplicate_policy)
        .merge(&registry, &hosts, &historical, &recent)
        .context("Merge failed")?;

    let table = RankingEngine::new().build_table(outcome.rows, &registry);

    Ok(PipelineOutput {
        registry,
        table,
        report: outcome.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::record::Season;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn sources(dir: &TempDir, recent: &str) -> SourcePaths {
        SourcePaths {
            historical: write(
                dir,
                "historical.csv",
                "country,gold,silver,bronze,year,games_type,host_city,host_country\n\
                 Great Britain,29,17,19,2012,Summer,London,United Kingdom\n",
            ),
            recent: write(dir, "recent.csv", recent),
            hosts: None,
        }
    }

    #[test]
    fn test_builds_table_from_files() {
        let dir = TempDir::new().unwrap();
        let paths = sources(
            &dir,
            "country,gold,silver,bronze,year,games_type,host_city,host_country\n\
             United Kingdom,14,22,29,2024,Summer,Paris,France\n",
        );

        let output = build_medal_table(&paths, &EngineConfig::default()).unwrap();

        assert_eq!(output.table.len(), 2);
        assert_eq!(output.report.total_rows(), 2);
        let paris = output.table.edition(2024, Season::Summer);
        assert_eq!(paris[0].nation, "Great Britain");
        assert_eq!(paris[0].flag, "gb");
    }

    #[test]
    fn test_duplicate_policy_from_config() {
        let dir = TempDir::new().unwrap();
        let paths = sources(
            &dir,
            "country,gold,silver,bronze,year,games_type,host_city,host_country\n\
             United Kingdom,1,0,0,2012,Summer,London,United Kingdom\n",
        );

        assert!(build_medal_table(&paths, &EngineConfig::default()).is_err());

        let config = EngineConfig {
            duplicate_policy: DuplicatePolicy::Keep,
            ..EngineConfig::default()
        };
        let output = build_medal_table(&paths, &config).unwrap();
        assert_eq!(output.report.duplicates.len(), 1);
    }

    #[test]
    fn test_unsupported_recent_source() {
        let dir = TempDir::new().unwrap();
        let mut paths = sources(&dir, "");
        paths.recent = write(&dir, "recent.json", "{}");

        assert!(build_medal_table(&paths, &EngineConfig::default()).is_err());
    }
}
