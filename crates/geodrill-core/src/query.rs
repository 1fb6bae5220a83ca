//! URL query string codec for bookmarkable selections

use url::form_urlencoded;

use crate::selection::Selection;
use crate::tier::Tier;

/// Selection fields carried in a query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl QueryParams {
    pub fn get(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Continent => self.continent.as_deref(),
            Tier::Country => self.country.as_deref(),
            Tier::State => self.state.as_deref(),
            Tier::City => self.city.as_deref(),
        }
    }

    fn slot(&mut self, tier: Tier) -> &mut Option<String> {
        match tier {
            Tier::Continent => &mut self.continent,
            Tier::Country => &mut self.country,
            Tier::State => &mut self.state,
            Tier::City => &mut self.city,
        }
    }
}

/// Parse a `?continent=..&country=..` search string
///
/// The leading `?` is optional. Blank values are ignored and, for repeated
/// keys, the first non-blank value wins. Unknown keys are dropped.
pub fn parse_query(search: &str) -> QueryParams {
    let raw = search.strip_prefix('?').unwrap_or(search);
    let mut params = QueryParams::default();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        let Some(tier) = Tier::ALL.into_iter().find(|t| t.key() == key) else {
            continue;
        };
        let slot = params.slot(tier);
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    params
}

/// Encode the set fields of `selection` in continent, country, state, city order
///
/// Returns `?`-prefixed output, or an empty string when nothing is selected.
pub fn encode_query(selection: &Selection) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for tier in Tier::ALL {
        if let Some(value) = selection.get(tier) {
            serializer.append_pair(tier.key(), value);
            any = true;
        }
    }
    if any {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}
