use serde_json::Value;

use crate::records::Record;

const PRESENCE_FIELDS: [&str; 9] = [
    "Name",
    "City",
    "Country",
    "Creation",
    "Closure",
    "Condition",
    "Image Credits",
    "Sound Links",
    "Sound Credits",
];

const RICH_TEXT_FIELDS: [&str; 2] = ["Website description", "Additional resources"];

/// Information-density score of a record: +1 per present checklist field,
/// +2 per rich content block (image list, long-form text). Deterministic,
/// bounded, never fails; a record with no fields scores 0.
pub fn score(record: &Record) -> u32 {
    let mut total = 0;

    for field in PRESENCE_FIELDS {
        if record
            .field_text(field)
            .is_some_and(|text| !text.trim().is_empty())
        {
            total += 1;
        }
    }

    for field in RICH_TEXT_FIELDS {
        if record
            .field_text(field)
            .is_some_and(|text| !text.trim().is_empty())
        {
            total += 2;
        }
    }

    if matches!(record.fields.get("Images"), Some(Value::Array(items)) if !items.is_empty()) {
        total += 2;
    }

    total
}

/// Score extent of a reference population, used to map scores onto `[0, 1]`.
/// Always derived from the full unfiltered collection so relative point sizes
/// stay stable while filters narrow the subset.
#[derive(Clone, Copy, Debug)]
pub struct RichnessRange {
    min: u32,
    max: u32,
}

impl RichnessRange {
    pub fn from_collection(population: &[Record]) -> Self {
        let mut min = u32::MAX;
        let mut max = 0;
        for record in population {
            let value = score(record);
            min = min.min(value);
            max = max.max(value);
        }

        if population.is_empty() {
            Self { min: 0, max: 0 }
        } else {
            Self { min, max }
        }
    }

    pub fn normalized(&self, record: &Record) -> f64 {
        // Degenerate range (uniform population) divides by 1, not 0.
        let range = self.max.saturating_sub(self.min).max(1) as f64;
        let offset = score(record).saturating_sub(self.min) as f64;
        (offset / range).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> Record {
        serde_json::from_value(json!({ "id": "rec", "fields": fields })).unwrap()
    }

    #[test]
    fn empty_record_scores_zero() {
        assert_eq!(score(&Record::default()), 0);
    }

    #[test]
    fn presence_fields_add_one_and_rich_fields_add_two() {
        let plain = record(json!({ "Name": "Rex", "City": "Accra" }));
        assert_eq!(score(&plain), 2);

        let rich = record(json!({
            "Name": "Rex",
            "City": "Accra",
            "Website description": "An open-air cinema.",
            "Images": [{ "url": "a.jpg" }],
        }));
        assert_eq!(score(&rich), 6);
    }

    #[test]
    fn blank_and_empty_values_do_not_count() {
        let blank = record(json!({
            "Name": "   ",
            "Website description": "",
            "Images": [],
        }));
        assert_eq!(score(&blank), 0);
    }

    #[test]
    fn description_strictly_increases_score() {
        let without = record(json!({ "Name": "Rex" }));
        let with = record(json!({ "Name": "Rex", "Website description": "text" }));
        assert!(score(&with) > score(&without));
    }

    #[test]
    fn normalization_clamps_to_unit_interval() {
        let low = record(json!({}));
        let high = record(json!({ "Name": "Rex", "City": "Accra", "Country": "Ghana" }));
        let range = RichnessRange::from_collection(&[low.clone(), high.clone()]);

        assert_eq!(range.normalized(&low), 0.0);
        assert_eq!(range.normalized(&high), 1.0);

        // A record outside the reference population still clamps.
        let richer = record(json!({
            "Name": "a", "City": "b", "Country": "c", "Creation": 1900,
            "Closure": 1950, "Condition": "ruin",
        }));
        assert_eq!(range.normalized(&richer), 1.0);
    }

    #[test]
    fn uniform_population_avoids_division_by_zero() {
        let record = record(json!({ "Name": "Rex" }));
        let range = RichnessRange::from_collection(&[record.clone(), record.clone()]);
        assert_eq!(range.normalized(&record), 0.0);

        let empty = RichnessRange::from_collection(&[]);
        assert_eq!(empty.normalized(&record), 1.0);
    }
}
