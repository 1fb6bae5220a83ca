//! Pure renderers from (selection, fetched data) to displayable content
//!
//! Nothing here performs I/O: the same inputs always produce the same view.

use serde::Serialize;

use crate::chart::ClimateSeries;
use crate::provider::DetailRecord;
use crate::selection::Selection;
use crate::tier::{ActiveTab, Tier};

/// Prompt shown when no entity is selected for the chart
pub const EMPTY_CHART_PROMPT: &str = "Select a geographic entity to view data visualization.";

/// One entry of a dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    pub fn from_names(names: &[String]) -> Vec<Self> {
        names
            .iter()
            .map(|name| DropdownOption {
                label: name.clone(),
                value: name.clone(),
            })
            .collect()
    }
}

/// Result of the last detail fetch for a tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    Loaded(DetailRecord),
    Failed(String),
}

/// Single-row detail grid for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailTable {
    pub title: String,
    pub grid_id: String,
    /// Field names; the first is the tier label
    pub columns: Vec<String>,
    pub row: Vec<String>,
}

impl DetailTable {
    /// The record with the selected entity prepended as a leading column
    pub fn build(tier: Tier, name: &str, record: &DetailRecord) -> Self {
        let mut columns = Vec::with_capacity(record.len() + 1);
        let mut row = Vec::with_capacity(record.len() + 1);
        columns.push(tier.label().to_string());
        row.push(name.to_string());
        for (key, value) in record.iter() {
            columns.push(key.to_string());
            row.push(value.to_string());
        }
        Self {
            title: format!("{name} Information"),
            grid_id: format!("{}-grid", tier.key()),
            columns,
            row,
        }
    }

    /// Display header for a field name
    pub fn header(column: &str) -> String {
        column.replace('_', " ")
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.row[i].as_str())
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.row.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TableView {
    /// Nothing selected at this tier
    Empty { prompt: String },
    /// Selected, fetch still in flight
    Loading { message: String },
    /// Fetched an empty record
    NoData { message: String },
    /// The last fetch failed
    Error { message: String },
    Detail(DetailTable),
}

/// Render the detail panel of `tier`
///
/// `outcome` is `None` while the fetch for the selected entity is pending.
pub fn render_table(tier: Tier, selection: &Selection, outcome: Option<&TierOutcome>) -> TableView {
    let Some(name) = selection.get(tier) else {
        return TableView::Empty {
            prompt: format!("Please select a {} to view information.", tier.noun()),
        };
    };
    match outcome {
        None => TableView::Loading {
            message: format!("Loading {} data...", tier.noun()),
        },
        Some(TierOutcome::Failed(_)) => TableView::Error {
            message: format!("Error loading data for {name}."),
        },
        Some(TierOutcome::Loaded(record)) if record.is_empty() => TableView::NoData {
            message: format!("No data available for {name}."),
        },
        Some(TierOutcome::Loaded(record)) => {
            TableView::Detail(DetailTable::build(tier, name, record))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateChart {
    pub heading: String,
    pub title: String,
    pub subtitle: String,
    pub series: ClimateSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartView {
    Empty { prompt: String },
    Climate(ClimateChart),
}

/// Render the climate chart for the active tab
///
/// The chart needs a selection at the active tab's tier; anything else
/// renders the empty prompt.
pub fn render_chart(selection: &Selection, active_tab: ActiveTab) -> ChartView {
    let tier = active_tab.tier();
    match selection.get(tier) {
        Some(entity) => ChartView::Climate(ClimateChart {
            heading: format!("Climate Data for {entity}"),
            title: format!("Monthly Climate Data for {entity}"),
            subtitle: "Monthly temperature and precipitation patterns".to_string(),
            series: ClimateSeries::generate(entity, tier),
        }),
        None => ChartView::Empty {
            prompt: EMPTY_CHART_PROMPT.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> Selection {
        let mut s = Selection::default();
        s.hydrate("?continent=Europe&country=UK&state=England&city=London");
        s
    }

    #[test]
    fn test_empty_prompt_per_tier() {
        let view = render_table(Tier::State, &Selection::default(), None);
        assert_eq!(
            view,
            TableView::Empty {
                prompt: "Please select a state/province to view information.".to_string()
            }
        );
    }

    #[test]
    fn test_outcomes() {
        let s = london();
        assert!(matches!(render_table(Tier::City, &s, None), TableView::Loading { .. }));
        assert_eq!(
            render_table(Tier::City, &s, Some(&TierOutcome::Failed("x".into()))),
            TableView::Error {
                message: "Error loading data for London.".to_string()
            }
        );
        assert_eq!(
            render_table(Tier::Country, &s, Some(&TierOutcome::Loaded(DetailRecord::new()))),
            TableView::NoData {
                message: "No data available for UK.".to_string()
            }
        );
    }

    #[test]
    fn test_detail_table_leading_column() {
        let record =
            DetailRecord::from_pairs([("Population", "8.9 million"), ("Famous For", "Big Ben")]);
        let outcome = TierOutcome::Loaded(record);
        let TableView::Detail(table) = render_table(Tier::City, &london(), Some(&outcome)) else {
            panic!("expected detail view");
        };
        assert_eq!(table.title, "London Information");
        assert_eq!(table.columns, vec!["City", "Population", "Famous For"]);
        assert_eq!(table.value("City"), Some("London"));
        assert_eq!(table.value("Famous For"), Some("Big Ben"));
        assert_eq!(table.cells().count(), 3);
        assert_eq!(DetailTable::header("year_founded"), "year founded");
        assert_eq!(DetailTable::header("GDP"), "GDP");
    }

    #[test]
    fn test_chart_requires_selection_on_active_tab() {
        let mut s = Selection::default();
        s.set_continent(Some("Europe".into()));
        assert!(matches!(render_chart(&s, ActiveTab::City), ChartView::Empty { .. }));

        let ChartView::Climate(chart) = render_chart(&s, ActiveTab::Continent) else {
            panic!("expected chart");
        };
        assert_eq!(chart.title, "Monthly Climate Data for Europe");
        assert_eq!(chart.series.tier, Tier::Continent);
    }

    #[test]
    fn test_renderers_are_pure() {
        let s = london();
        assert_eq!(render_chart(&s, ActiveTab::State), render_chart(&s, ActiveTab::State));
    }

    #[test]
    fn test_dropdown_options() {
        let options = DropdownOption::from_names(&["USA".to_string()]);
        assert_eq!(options[0].label, "USA");
        assert_eq!(options[0].value, "USA");
    }
}
