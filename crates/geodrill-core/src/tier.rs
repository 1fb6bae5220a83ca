//! Selection tiers, fetch kinds and dashboard tabs

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four selection levels, ordered from shallowest to deepest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Continent,
    Country,
    State,
    City,
}

impl Tier {
    /// All tiers, shallowest first
    pub const ALL: [Tier; 4] = [Tier::Continent, Tier::Country, Tier::State, Tier::City];

    /// Zero-based depth (continent = 0)
    pub fn depth(self) -> usize {
        match self {
            Tier::Continent => 0,
            Tier::Country => 1,
            Tier::State => 2,
            Tier::City => 3,
        }
    }

    /// Column header / entity label used in detail tables
    pub fn label(self) -> &'static str {
        match self {
            Tier::Continent => "Continent",
            Tier::Country => "Country",
            Tier::State => "State/Province",
            Tier::City => "City",
        }
    }

    /// Lower-case noun used in prompts and error messages
    pub fn noun(self) -> &'static str {
        match self {
            Tier::Continent => "continent",
            Tier::Country => "country",
            Tier::State => "state/province",
            Tier::City => "city",
        }
    }

    /// Short key used in the URL query and notification text
    pub fn key(self) -> &'static str {
        match self {
            Tier::Continent => "continent",
            Tier::Country => "country",
            Tier::State => "state",
            Tier::City => "city",
        }
    }

    /// The tab that displays this tier
    pub fn tab(self) -> ActiveTab {
        match self {
            Tier::Continent => ActiveTab::Continent,
            Tier::Country => ActiveTab::Country,
            Tier::State => ActiveTab::State,
            Tier::City => ActiveTab::City,
        }
    }

    /// Tiers strictly deeper than this one
    pub fn deeper(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |t| *t > self)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The eight provider lookups the cache is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Continents,
    Countries,
    States,
    Cities,
    ContinentData,
    CountryData,
    StateData,
    CityData,
}

impl FetchKind {
    pub const ALL: [FetchKind; 8] = [
        FetchKind::Continents,
        FetchKind::Countries,
        FetchKind::States,
        FetchKind::Cities,
        FetchKind::ContinentData,
        FetchKind::CountryData,
        FetchKind::StateData,
        FetchKind::CityData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FetchKind::Continents => "continents",
            FetchKind::Countries => "countries",
            FetchKind::States => "states",
            FetchKind::Cities => "cities",
            FetchKind::ContinentData => "continent_data",
            FetchKind::CountryData => "country_data",
            FetchKind::StateData => "state_data",
            FetchKind::CityData => "city_data",
        }
    }

    /// Whether this kind yields an ordered list of names (vs a detail record)
    pub fn is_list(self) -> bool {
        matches!(
            self,
            FetchKind::Continents | FetchKind::Countries | FetchKind::States | FetchKind::Cities
        )
    }

    /// Whether the lookup takes a parent key
    pub fn takes_parent(self) -> bool {
        self != FetchKind::Continents
    }

    /// The tier whose entities this kind returns
    pub fn tier(self) -> Tier {
        match self {
            FetchKind::Continents | FetchKind::ContinentData => Tier::Continent,
            FetchKind::Countries | FetchKind::CountryData => Tier::Country,
            FetchKind::States | FetchKind::StateData => Tier::State,
            FetchKind::Cities | FetchKind::CityData => Tier::City,
        }
    }

    /// List lookup returning the entities of `tier`
    pub fn list_for(tier: Tier) -> FetchKind {
        match tier {
            Tier::Continent => FetchKind::Continents,
            Tier::Country => FetchKind::Countries,
            Tier::State => FetchKind::States,
            Tier::City => FetchKind::Cities,
        }
    }

    /// Detail lookup for an entity of `tier`
    pub fn detail_for(tier: Tier) -> FetchKind {
        match tier {
            Tier::Continent => FetchKind::ContinentData,
            Tier::Country => FetchKind::CountryData,
            Tier::State => FetchKind::StateData,
            Tier::City => FetchKind::CityData,
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard tab, one per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveTab {
    #[default]
    #[serde(rename = "continent-tab")]
    Continent,
    #[serde(rename = "country-tab")]
    Country,
    #[serde(rename = "state-tab")]
    State,
    #[serde(rename = "city-tab")]
    City,
}

impl ActiveTab {
    pub fn as_str(self) -> &'static str {
        match self {
            ActiveTab::Continent => "continent-tab",
            ActiveTab::Country => "country-tab",
            ActiveTab::State => "state-tab",
            ActiveTab::City => "city-tab",
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            ActiveTab::Continent => Tier::Continent,
            ActiveTab::Country => Tier::Country,
            ActiveTab::State => Tier::State,
            ActiveTab::City => Tier::City,
        }
    }
}

impl fmt::Display for ActiveTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
