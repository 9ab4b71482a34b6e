// 🌍 Country Identity - canonical names + flag codes
//
// Two independent resolutions over two independent tables:
// - AliasTable: raw spelling → canonical display name (grouping identity)
// - FlagTable + IsoCountries: name → two-letter flag code (rendering only)
//
// Problem solved:
// - "United States of America", "United States" → one nation across editions
// - "Refugee Olympic Team", "ROC" → olympic placeholder flag, not a nation

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder flag for neutral/mixed teams and unresolvable names
pub const SENTINEL_FLAG: &str = "un";

/// Nation text for a source row whose country cell held no text
pub const UNKNOWN_NATION: &str = "Unknown";

const DEFAULT_ALIASES: &str = include_str!("../../data/country_aliases.json");
const DEFAULT_FLAG_OVERRIDES: &str = include_str!("../../data/flag_overrides.json");
const ISO_COUNTRIES: &str = include_str!("../../data/iso3166.json");

/// Strip non-breaking spaces and surrounding whitespace
pub fn clean_country_name(raw: &str) -> String {
    raw.replace('\u{a0}', "").trim().to_string()
}

// ============================================================================
// CANONICAL NAME ALIASES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAlias {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    aliases: Vec<CountryAlias>,
}

/// Raw name → canonical name (many-to-one, never chained)
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    map: HashMap<String, String>,
}

impl AliasTable {
    /// Build from pairs, rejecting conflicts and chains
    pub fn from_aliases(aliases: Vec<CountryAlias>) -> Result<Self> {
        let mut map: HashMap<String, String> = HashMap::new();

        for alias in aliases {
            let from = clean_country_name(&alias.from);
            let to = clean_country_name(&alias.to);

            if let Some(existing) = map.get(&from) {
                if existing != &to {
                    return Err(EngineError::AliasConflict {
                        from,
                        first: existing.clone(),
                        second: to,
                    });
                }
                continue;
            }
            map.insert(from, to);
        }

        // A canonical name used as a key would make normalization non-idempotent
        for (from, to) in &map {
            if map.contains_key(to) {
                return Err(EngineError::AliasChain {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }

        Ok(AliasTable { map })
    }

    pub fn parse(json: &str) -> Result<Self> {
        let file: AliasFile = serde_json::from_str(json)?;
        Self::from_aliases(file.aliases)
    }

    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_ALIASES)
    }

    /// Canonical name for a raw string (cleaned; unchanged when not an alias)
    pub fn canonical(&self, raw: &str) -> String {
        let name = clean_country_name(raw);
        match self.map.get(&name) {
            Some(canonical) => canonical.clone(),
            None => name,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ============================================================================
// FLAG OVERRIDES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagOverride {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
struct FlagFile {
    overrides: Vec<FlagOverride>,
}

/// Exact-name flag codes for ISO mismatches and historical/neutral teams
#[derive(Debug, Clone, Default)]
pub struct FlagTable {
    map: HashMap<String, String>,
}

impl FlagTable {
    pub fn from_overrides(overrides: Vec<FlagOverride>) -> Self {
        let map = overrides
            .into_iter()
            .map(|o| (clean_country_name(&o.name), o.code.trim().to_lowercase()))
            .collect();
        FlagTable { map }
    }

    pub fn parse(json: &str) -> Result<Self> {
        let file: FlagFile = serde_json::from_str(json)?;
        Ok(Self::from_overrides(file.overrides))
    }

    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_FLAG_OVERRIDES)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ============================================================================
// ISO 3166-1 NAME DATABASE
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct IsoCountry {
    alpha2: String,
    name: String,
    #[serde(default)]
    common_name: Option<String>,
    #[serde(default)]
    official_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IsoFile {
    countries: Vec<IsoCountry>,
}

/// Case-insensitive country name → alpha-2 lookup
#[derive(Debug, Clone, Default)]
pub struct IsoCountries {
    by_name: HashMap<String, String>,
}

impl IsoCountries {
    pub fn builtin() -> Result<Self> {
        let file: IsoFile = serde_json::from_str(ISO_COUNTRIES)?;
        let mut by_name = HashMap::new();

        for country in file.countries {
            let code = country.alpha2.to_lowercase();
            let names = std::iter::once(country.name)
                .chain(country.common_name)
                .chain(country.official_name);
            for name in names {
                by_name.entry(name.to_lowercase()).or_insert_with(|| code.clone());
            }
        }

        Ok(IsoCountries { by_name })
    }

    /// Lower-case alpha-2 code for a name, if the database knows it
    pub fn alpha2(&self, name: &str) -> Option<&str> {
        self.by_name.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ============================================================================
// COUNTRY REGISTRY
// ============================================================================

/// Immutable resolver over the alias table, flag overrides and ISO database.
/// Built once and passed explicitly to the merger and ranking engine.
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    aliases: AliasTable,
    flags: FlagTable,
    iso: IsoCountries,
}

impl CountryRegistry {
    pub fn new(aliases: AliasTable, flags: FlagTable, iso: IsoCountries) -> Self {
        CountryRegistry { aliases, flags, iso }
    }

    /// Registry with the embedded default tables
    pub fn builtin() -> Result<Self> {
        Ok(CountryRegistry {
            aliases: AliasTable::builtin()?,
            flags: FlagTable::builtin()?,
            iso: IsoCountries::builtin()?,
        })
    }

    /// Normalize a raw country string to its canonical display name
    ///
    /// Example: "United States of America" → "United States"
    pub fn canonical_name(&self, raw: &str) -> String {
        self.aliases.canonical(raw)
    }

    /// Flag code for a country cell; `None` stands for a non-string cell
    ///
    /// Order: override table, ISO name lookup, sentinel "un".
    pub fn flag_code(&self, name: Option<&str>) -> String {
        let Some(raw) = name else {
            return SENTINEL_FLAG.to_string();
        };
        let name = clean_country_name(raw);

        if let Some(code) = self.flags.get(&name) {
            return code.to_string();
        }

        match self.iso.alpha2(&name) {
            Some(code) => code.to_string(),
            None => {
                tracing::trace!(country = %name, "no flag mapping, using sentinel");
                SENTINEL_FLAG.to_string()
            }
        }
    }

    pub fn flag_for(&self, name: &str) -> String {
        self.flag_code(Some(name))
    }

    /// True when the override table pins this name to the sentinel on purpose
    pub fn is_neutral_team(&self, name: &str) -> bool {
        self.flags.get(&clean_country_name(name)) == Some(SENTINEL_FLAG)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn flags(&self) -> &FlagTable {
        &self.flags
    }
}

// ============================================================================
// TESTS
// ============================================================================
