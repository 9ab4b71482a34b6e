// Olympic Medal Table - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod data_quality;
pub mod entities;
pub mod error;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod table;
pub mod trajectory;

// Re-export commonly used types
pub use config::{DuplicatePolicy, EngineConfig};
pub use data_quality::{DataQualityEngine, QualityIssue, QualityReport, Severity};
pub use entities::{
    clean_country_name, AliasTable, CountryAlias, CountryRegistry, FlagOverride, FlagTable,
    HostInfo, HostRegistry, IsoCountries, SENTINEL_FLAG, UNKNOWN_HOST, UNKNOWN_NATION,
};
pub use error::{EngineError, Result};
pub use merge::{
    find_duplicates, parse_sheet_key, DuplicateKey, MergeEngine, MergeOutcome, MergeReport,
    MissingCountryRow, RecentRows,
};
pub use parser::{
    detect_source, get_parser, load_hosts, load_recent, sheet_from_rows, FlatCsvParser,
    HistoricalCsvParser, RecentParser, SourceType, WorkbookParser,
};
pub use pipeline::{build_medal_table, PipelineOutput, SourcePaths};
pub use ranking::{competition_rank, RankKey, RankedEntry, RankingEngine};
pub use record::{
    medal_points, medal_total, Edition, HistoricalRow, MedalRecord, MergedRow, RecentSource, Season, Sheet,
    SheetRow,
};
pub use table::{EditionSummary, MedalTable};
pub use trajectory::{
    cumulative_points, CumulativeTrajectory, NationSeries, NationValue, TrajectoryRequest,
    TrajectoryRow,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
