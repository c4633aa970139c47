use crate::records::PostRecord;
use chrono::NaiveDate;

/// A conjunction of row predicates for the content table
///
/// Each categorical field holds the accepted values for one column; an empty
/// list means the column is unconstrained. Constraints AND across columns and
/// OR within one. With no date range and all lists empty the filter is the
/// identity.
#[derive(Clone, Debug, Default)]
pub struct FilterSpec {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub years: Vec<String>,
    pub months: Vec<String>,
    pub days: Vec<String>,
    pub times: Vec<String>,
    pub categories: Vec<String>,
    pub sub_categories: Vec<String>,
    pub emojis: Vec<String>,
}

impl FilterSpec {
    /// Build a spec from decoded query parameters
    ///
    /// Repeated parameters accumulate (`years=2023&years=2024`), matching how
    /// the filter panel submits multi-selects. The date range only applies
    /// when both endpoints are present and parse as ISO dates.
    pub fn from_params(params: &[(String, String)]) -> Self {
        let mut spec = FilterSpec::default();
        let mut start = None;
        let mut end = None;

        for (key, value) in params {
            match key.as_str() {
                "start_date" => start = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
                "end_date" => end = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
                "years" => spec.years.push(value.clone()),
                "months" => spec.months.push(value.clone()),
                "days" => spec.days.push(value.clone()),
                "times" => spec.times.push(value.clone()),
                "categories" => spec.categories.push(value.clone()),
                "sub_categories" => spec.sub_categories.push(value.clone()),
                "emojis" => spec.emojis.push(value.clone()),
                _ => {}
            }
        }

        if let (Some(s), Some(e)) = (start, end) {
            spec.date_range = Some((s, e));
        }

        spec
    }

    /// Apply the filter, keeping the rows that satisfy every constraint
    ///
    /// The date range is inclusive on both ends. An empty result is valid and
    /// flows through to aggregation as-is.
    pub fn apply(&self, posts: &[PostRecord]) -> Vec<PostRecord> {
        posts
            .iter()
            .filter(|p| self.accepts(p))
            .cloned()
            .collect()
    }

    fn accepts(&self, post: &PostRecord) -> bool {
        if let Some((start, end)) = self.date_range {
            if post.created < start || post.created > end {
                return false;
            }
        }

        accepts_value(&self.years, &post.year)
            && accepts_value(&self.months, &post.month_label)
            && accepts_value(&self.days, &post.day_of_week)
            && accepts_value(&self.times, &post.time_slot)
            && accepts_value(&self.categories, &post.category)
            && accepts_value(&self.sub_categories, &post.sub_category)
            && accepts_value(&self.emojis, &post.emoji_tag)
    }
}

// Empty constraint list = no filtering on that column
fn accepts_value(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(created: (i32, u32, u32), category: &str, day: &str) -> PostRecord {
        PostRecord {
            created: NaiveDate::from_ymd_opt(created.0, created.1, created.2).unwrap(),
            year: created.0.to_string(),
            month_label: format!("M{} {}", created.1, created.0),
            day_of_week: day.to_string(),
            time_slot: "Morning".to_string(),
            category: category.to_string(),
            sub_category: "General".to_string(),
            emoji_tag: "🚀".to_string(),
            impressions: 100.0,
            clicks: 10.0,
            ctr: 0.1,
            engagement_rate: 0.05,
            post_count: 1,
        }
    }

    #[test]
    fn empty_spec_is_identity() {
        let posts = vec![
            post((2024, 1, 1), "Tech", "Monday"),
            post((2024, 2, 1), "Business", "Friday"),
        ];
        let filtered = FilterSpec::default().apply(&posts);
        assert_eq!(filtered, posts);
    }

    #[test]
    fn category_constraint_is_sound_and_complete() {
        let posts = vec![
            post((2024, 1, 1), "Tech", "Monday"),
            post((2024, 2, 1), "Business", "Friday"),
            post((2024, 3, 1), "Tech", "Sunday"),
        ];
        let spec = FilterSpec {
            categories: vec!["Tech".to_string()],
            ..Default::default()
        };
        let filtered = spec.apply(&posts);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|p| p.category == "Tech"));
        // every excluded row really had a different category
        assert!(posts
            .iter()
            .filter(|p| !filtered.contains(p))
            .all(|p| p.category != "Tech"));
    }

    #[test]
    fn constraints_and_across_columns() {
        let posts = vec![
            post((2024, 1, 1), "Tech", "Monday"),
            post((2024, 2, 1), "Tech", "Friday"),
        ];
        let spec = FilterSpec {
            categories: vec!["Tech".to_string()],
            days: vec!["Friday".to_string()],
            ..Default::default()
        };
        assert_eq!(spec.apply(&posts).len(), 1);
    }

    #[test]
    fn date_range_is_inclusive() {
        let posts = vec![
            post((2024, 1, 1), "Tech", "Monday"),
            post((2024, 1, 15), "Tech", "Monday"),
            post((2024, 2, 1), "Tech", "Monday"),
        ];
        let spec = FilterSpec {
            date_range: Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            )),
            ..Default::default()
        };
        assert_eq!(spec.apply(&posts).len(), 2);
    }

    #[test]
    fn empty_result_propagates() {
        let posts = vec![post((2024, 1, 1), "Tech", "Monday")];
        let spec = FilterSpec {
            categories: vec!["Sports".to_string()],
            ..Default::default()
        };
        assert!(spec.apply(&posts).is_empty());
    }

    #[test]
    fn params_accumulate_repeated_keys() {
        let params = vec![
            ("years".to_string(), "2023".to_string()),
            ("years".to_string(), "2024".to_string()),
            ("start_date".to_string(), "2024-01-01".to_string()),
            ("end_date".to_string(), "2024-06-30".to_string()),
            ("chart_category".to_string(), "Category".to_string()),
        ];
        let spec = FilterSpec::from_params(&params);
        assert_eq!(spec.years, ["2023", "2024"]);
        assert!(spec.date_range.is_some());
    }

    #[test]
    fn half_open_date_params_are_ignored() {
        let params = vec![("start_date".to_string(), "2024-01-01".to_string())];
        assert!(FilterSpec::from_params(&params).date_range.is_none());
    }
}
