use std::collections::{BTreeMap, BTreeSet};

use crate::records::{NormalizedRecord, Record, normalize};

/// Sentinel meaning "no constraint" for a filter field.
pub const ALL: &str = "all";
/// Reserved filter key carrying the open-interval year constraint.
pub const YEAR_FIELD: &str = "selectedYear";

const COUNTRY_FIELD: &str = "Country";
const CITY_FIELD: &str = "City";

/// Active filter values. One entry per field name observed in the collection,
/// each either [`ALL`] or a specific value (stored verbatim, compared
/// normalized), plus the reserved year interval.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    values: BTreeMap<String, String>,
    selected_year: Option<i32>,
}

impl FilterState {
    fn from_collection(records: &[Record]) -> Self {
        let values = records
            .iter()
            .flat_map(|record| record.fields.keys())
            .map(|field| (field.clone(), ALL.to_string()))
            .collect();
        Self {
            values,
            selected_year: None,
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map_or(ALL, String::as_str)
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_clear(&self) -> bool {
        self.selected_year.is_none() && self.values.values().all(|value| value == ALL)
    }

    /// Sets a field unconditionally. The engine's [`ConstellationEngine::update_filter`]
    /// is the validated entry point; this one exists so the pure
    /// [`apply_filters`] can be exercised with hand-built states.
    pub fn set_value(&mut self, field: &str, value: &str) {
        self.values.insert(field.to_string(), value.to_string());
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.selected_year = year;
    }

    fn reset(&mut self) {
        for value in self.values.values_mut() {
            *value = ALL.to_string();
        }
        self.selected_year = None;
    }
}

/// Pure filter application: returns the indices of records satisfying every
/// active constraint. Predicates AND together, so application order never
/// affects the result.
///
/// The year constraint keeps a record when its active interval
/// `[Creation, Closure]` contains the year, with an absent or non-numeric
/// bound treated as open on that side.
pub fn apply_filters(
    records: &[Record],
    normalized: &[NormalizedRecord],
    filters: &FilterState,
) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(index, record)| {
            if let Some(year) = filters.selected_year {
                let created_by_year = record
                    .field_year("Creation")
                    .is_none_or(|creation| creation <= year);
                let open_in_year = record
                    .field_year("Closure")
                    .is_none_or(|closure| closure >= year);
                if !(created_by_year && open_in_year) {
                    return false;
                }
            }

            filters
                .values
                .iter()
                .filter(|(_, value)| value.as_str() != ALL)
                .all(|(field, value)| {
                    let wanted = value.trim().to_lowercase();
                    let actual = normalized
                        .get(*index)
                        .and_then(|entry| entry.fields.get(field))
                        .map_or("", String::as_str);
                    actual == wanted
                })
        })
        .map(|(index, _)| index)
        .collect()
}

/// Year span of the collection for bounding a year slider: minimum parseable
/// `Creation` (1800 when only closures carry years, the source data's floor)
/// through maximum parseable `Closure`. `None` when no record carries a year.
pub fn year_extent(records: &[Record]) -> Option<(i32, i32)> {
    let mut creation_min: Option<i32> = None;
    let mut creation_max: Option<i32> = None;
    let mut closure_max: Option<i32> = None;

    for record in records {
        if let Some(year) = record.field_year("Creation") {
            creation_min = Some(creation_min.map_or(year, |min| min.min(year)));
            creation_max = Some(creation_max.map_or(year, |max| max.max(year)));
        }
        if let Some(year) = record.field_year("Closure") {
            closure_max = Some(closure_max.map_or(year, |max| max.max(year)));
        }
    }

    let max = closure_max.into_iter().chain(creation_max).max()?;
    let min = creation_min.unwrap_or(1800);
    Some((min, max.max(min)))
}

/// Owner of the canonical collection, the active [`FilterState`], and the
/// derived filtered subset. Every transition replaces the subset wholesale;
/// readers always observe a fully formed snapshot.
#[derive(Debug, Default)]
pub struct ConstellationEngine {
    records: Vec<Record>,
    normalized: Vec<NormalizedRecord>,
    filters: FilterState,
    filtered: Vec<Record>,
}

impl ConstellationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new canonical collection: rebuilds the normalized side
    /// table, resets every filter to [`ALL`], and exposes the full collection
    /// as the current subset. An empty collection is "no data yet", not an
    /// error.
    pub fn set_collection(&mut self, records: Vec<Record>) {
        self.normalized = normalize(&records);
        self.filters = FilterState::from_collection(&records);
        self.filtered = records.clone();
        self.records = records;
        tracing::info!(records = self.records.len(), "collection loaded");
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filtered(&self) -> &[Record] {
        &self.filtered
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filters
    }

    /// Applies one filter change and recomputes the subset from the full
    /// normalized collection. Returns whether anything actually changed, the
    /// caller's cue to re-seed layout and animate.
    ///
    /// Changing `Country` first forces `City` back to [`ALL`] so a stale
    /// (country, city) pair can never linger.
    pub fn update_filter(&mut self, field: &str, value: &str) -> bool {
        if field == YEAR_FIELD {
            let next = value.trim().parse::<i32>().ok();
            if next == self.filters.selected_year {
                return false;
            }
            self.filters.selected_year = next;
            self.recompute();
            return true;
        }

        if !self.filters.values.contains_key(field) {
            tracing::warn!(field, "ignoring filter for unknown field");
            return false;
        }

        let mut changed = false;
        if field == COUNTRY_FIELD && self.filters.value(CITY_FIELD) != ALL {
            self.filters.set_value(CITY_FIELD, ALL);
            changed = true;
        }

        if self.filters.value(field) != value {
            self.filters.set_value(field, value);
            changed = true;
        }

        if changed {
            self.recompute();
        }
        changed
    }

    /// Resets every filter (year included) and reverts the subset to the full
    /// collection. Returns whether any filter was active.
    pub fn clear_filters(&mut self) -> bool {
        let changed = !self.filters.is_clear();
        self.filters.reset();
        self.filtered = self.records.clone();
        if changed {
            tracing::debug!("filters cleared");
        }
        changed
    }

    /// Distinct selectable values for a field, original casing preserved,
    /// sorted lexicographically. For `City` with an active country filter the
    /// enumeration is restricted to that country's records first.
    pub fn field_values(&self, field: &str) -> Vec<String> {
        let country = (field == CITY_FIELD)
            .then(|| self.filters.value(COUNTRY_FIELD))
            .filter(|value| *value != ALL)
            .map(|value| value.trim().to_lowercase());

        let mut values = BTreeSet::new();
        for (record, normalized) in self.records.iter().zip(&self.normalized) {
            if let Some(wanted) = &country {
                let actual = normalized
                    .fields
                    .get(COUNTRY_FIELD)
                    .map_or("", String::as_str);
                if actual != wanted {
                    continue;
                }
            }

            if let Some(text) = record.field_text(field) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    values.insert(trimmed.to_string());
                }
            }
        }

        values.into_iter().collect()
    }

    fn recompute(&mut self) {
        let kept = apply_filters(&self.records, &self.normalized, &self.filters);
        self.filtered = kept
            .into_iter()
            .map(|index| self.records[index].clone())
            .collect();
        tracing::debug!(
            filtered = self.filtered.len(),
            total = self.records.len(),
            "subset recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> Vec<Record> {
        serde_json::from_value(json!([
            {
                "id": "rex",
                "fields": { "Name": "Rex", "Country": "Ghana", "City": "Accra",
                            "Creation": 1960, "Closure": 1980 }
            },
            {
                "id": "roxy",
                "fields": { "Name": "Roxy", "Country": "Ghana", "City": "Kumasi",
                            "Creation": 1952 }
            },
            {
                "id": "lagos-odeon",
                "fields": { "Name": "Odeon", "Country": "Nigeria", "City": "Lagos",
                            "Creation": "unknown", "Closure": 1999 }
            },
        ]))
        .unwrap()
    }

    fn engine() -> ConstellationEngine {
        let mut engine = ConstellationEngine::new();
        engine.set_collection(collection());
        engine
    }

    fn filtered_ids(engine: &ConstellationEngine) -> Vec<&str> {
        engine
            .filtered()
            .iter()
            .map(|record| record.id.as_str())
            .collect()
    }

    #[test]
    fn set_collection_defaults_every_observed_field_to_all() {
        let engine = engine();
        let state = engine.filter_state();
        assert!(state.is_clear());
        for field in ["Name", "Country", "City", "Creation", "Closure"] {
            assert_eq!(state.value(field), ALL);
        }
        assert_eq!(engine.filtered().len(), 3);
    }

    #[test]
    fn categorical_filter_compares_normalized_values() {
        let mut engine = engine();
        assert!(engine.update_filter("Country", "  GHANA "));
        assert_eq!(filtered_ids(&engine), ["rex", "roxy"]);
    }

    #[test]
    fn city_narrows_a_country_subset() {
        let mut engine = engine();
        engine.update_filter("Country", "Ghana");
        engine.update_filter("City", "Accra");
        assert_eq!(filtered_ids(&engine), ["rex"]);
    }

    #[test]
    fn country_change_resets_city() {
        let mut engine = engine();
        engine.update_filter("Country", "Nigeria");
        engine.update_filter("City", "Lagos");
        assert!(engine.update_filter("Country", "Ghana"));
        assert_eq!(engine.filter_state().value("City"), ALL);
        assert_eq!(filtered_ids(&engine), ["rex", "roxy"]);
    }

    #[test]
    fn year_interval_is_inclusive_on_both_bounds() {
        let mut engine = engine();
        for (year, expected) in [
            ("1959", false),
            ("1960", true),
            ("1970", true),
            ("1980", true),
            ("1981", false),
        ] {
            engine.update_filter(YEAR_FIELD, year);
            assert_eq!(
                filtered_ids(&engine).contains(&"rex"),
                expected,
                "year {year}"
            );
        }
    }

    #[test]
    fn missing_closure_means_still_open() {
        let mut engine = engine();
        engine.update_filter(YEAR_FIELD, "2024");
        assert!(filtered_ids(&engine).contains(&"roxy"));
    }

    #[test]
    fn non_numeric_creation_is_treated_as_always_existed() {
        let mut engine = engine();
        engine.update_filter(YEAR_FIELD, "1940");
        assert!(filtered_ids(&engine).contains(&"lagos-odeon"));
        engine.update_filter(YEAR_FIELD, "2000");
        assert!(!filtered_ids(&engine).contains(&"lagos-odeon"));
    }

    #[test]
    fn year_all_removes_the_constraint() {
        let mut engine = engine();
        engine.update_filter(YEAR_FIELD, "1800");
        assert!(engine.update_filter(YEAR_FIELD, ALL));
        assert_eq!(engine.filtered().len(), 3);
    }

    #[test]
    fn update_signals_change_only_when_the_value_differs() {
        let mut engine = engine();
        assert!(engine.update_filter("Country", "Ghana"));
        assert!(!engine.update_filter("Country", "Ghana"));
        assert!(!engine.update_filter(YEAR_FIELD, ALL));
    }

    #[test]
    fn unknown_field_is_ignored() {
        let mut engine = engine();
        assert!(!engine.update_filter("Mood", "good"));
        assert_eq!(engine.filtered().len(), 3);
    }

    #[test]
    fn clear_filters_restores_the_full_collection() {
        let mut engine = engine();
        engine.update_filter("Country", "Nigeria");
        engine.update_filter(YEAR_FIELD, "1999");
        assert!(engine.clear_filters());
        assert!(engine.filter_state().is_clear());
        assert_eq!(engine.filtered().len(), 3);
        assert!(!engine.clear_filters());
    }

    #[test]
    fn field_values_preserve_original_casing() {
        let engine = engine();
        assert_eq!(engine.field_values("Country"), ["Ghana", "Nigeria"]);
    }

    #[test]
    fn city_values_follow_the_active_country() {
        let mut engine = engine();
        assert_eq!(engine.field_values("City"), ["Accra", "Kumasi", "Lagos"]);
        engine.update_filter("Country", "Ghana");
        assert_eq!(engine.field_values("City"), ["Accra", "Kumasi"]);
    }

    #[test]
    fn apply_filters_is_pure_and_order_independent() {
        let records = collection();
        let normalized = normalize(&records);

        let mut country_first = FilterState::from_collection(&records);
        country_first.set_value("Country", "Ghana");
        country_first.set_year(Some(1970));

        let mut year_first = FilterState::from_collection(&records);
        year_first.set_year(Some(1970));
        year_first.set_value("Country", "Ghana");

        assert_eq!(
            apply_filters(&records, &normalized, &country_first),
            apply_filters(&records, &normalized, &year_first),
        );
        assert_eq!(apply_filters(&records, &normalized, &country_first), [0, 1]);
    }

    #[test]
    fn year_extent_spans_creation_to_closure() {
        assert_eq!(year_extent(&collection()), Some((1952, 1999)));
        assert_eq!(year_extent(&[]), None);

        let closure_only: Vec<Record> = serde_json::from_value(json!([
            { "id": "x", "fields": { "Closure": 1930 } }
        ]))
        .unwrap();
        assert_eq!(year_extent(&closure_only), Some((1800, 1930)));
    }
}
