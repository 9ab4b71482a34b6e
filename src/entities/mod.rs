// Entity Models
//
// Each entity is immutable configuration built once and passed explicitly:
// - CountryRegistry: canonical names + flag codes
// - HostRegistry: host city/country per edition

pub mod country;
pub mod host;

pub use country::{
    clean_country_name, AliasTable, CountryAlias, CountryRegistry, FlagOverride, FlagTable,
    IsoCountries, SENTINEL_FLAG, UNKNOWN_NATION,
};
pub use host::{HostInfo, HostRegistry, UNKNOWN_HOST};
