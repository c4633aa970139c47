use crate::error::{BoardError, BoardResult};
use crate::records::{GroupColumn, Metric, PostRecord};
use crate::table::DataTable;
use std::collections::HashMap;

/// One aggregated group: key, summed post count, scaled metric value
///
/// Rows come out in the order each key first appears in the source data,
/// never sorted by key or value.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupRow {
    pub key: String,
    pub post_count: u32,
    pub value: f64,
}

/// Group posts by a categorical column and aggregate one metric
///
/// Partitions `posts` by `group`, preserving first-seen key order. Each group
/// gets the mean of the chosen metric, scaled per the metric's display rule
/// (whole numbers for Impressions/Clicks, percent with two decimals for the
/// rate metrics), and the sum of its post counts.
///
/// An empty input yields an empty output, not an error.
///
/// # Arguments
/// * `posts` - The (already filtered) content rows
/// * `group` - Column to partition by
/// * `metric` - Metric to average per group
///
/// # Examples
/// ```
/// use postboard::aggregate::aggregate;
/// use postboard::records::{GroupColumn, Metric};
///
/// let rows = aggregate(&[], GroupColumn::Category, Metric::Impressions);
/// assert!(rows.is_empty());
/// ```
pub fn aggregate(posts: &[PostRecord], group: GroupColumn, metric: Metric) -> Vec<GroupRow> {
    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut sums: Vec<(f64, u32, u32)> = Vec::new(); // (metric sum, row count, post count)

    for post in posts {
        let key = group.value(post);
        let slot = match index.get(key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.to_string(), order.len());
                order.push(key.to_string());
                sums.push((0.0, 0, 0));
                sums.len() - 1
            }
        };
        sums[slot].0 += metric.value(post);
        sums[slot].1 += 1;
        sums[slot].2 += post.post_count;
    }

    order
        .into_iter()
        .zip(sums)
        .map(|(key, (sum, rows, post_count))| GroupRow {
            key,
            post_count,
            value: metric.scaled(sum / rows as f64),
        })
        .collect()
}

/// Build the label/value pair for a pie chart from a lookup table
///
/// Groups `table` by `category`, sums `aggregate` per group, then resolves
/// exactly the `requested` keys in caller order. A requested key with no
/// corresponding group is an `UnknownKey` error rather than a silent null;
/// an empty request is `Ok(None)`.
///
/// # Arguments
/// * `table` - A demographics lookup table (location / job function / industry)
/// * `category` - Column to group by
/// * `aggregate` - Numeric column to sum per group
/// * `requested` - Dimension values selected on the page, in display order
pub fn pie_subset(
    table: &DataTable,
    category: &str,
    aggregate: &str,
    requested: &[String],
) -> BoardResult<Option<(Vec<String>, Vec<f64>)>> {
    if requested.is_empty() {
        return Ok(None);
    }

    let keys = table.column_values(category)?;
    let cells = table.column_values(aggregate)?;

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (key, cell) in keys.iter().copied().zip(&cells) {
        let value = cell.trim().replace(',', "").parse::<f64>().map_err(|_| {
            BoardError::FetchFailure(format!("unparsable number in {}: {:?}", aggregate, cell))
        })?;
        *totals.entry(key).or_insert(0.0) += value;
    }

    let mut values = Vec::with_capacity(requested.len());
    for key in requested {
        match totals.get(key.as_str()) {
            Some(&total) => values.push(total),
            None => return Err(BoardError::UnknownKey(key.clone())),
        }
    }

    Ok(Some((requested.to_vec(), values)))
}

/// Distinct values of one categorical column, in first-seen order
///
/// Feeds the filter panel's multi-select options.
pub fn distinct_values(posts: &[PostRecord], column: GroupColumn) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for post in posts {
        let value = column.value(post);
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Posting frequency by month label, oldest first
///
/// The content sheet lists the newest posts at the top, so first-seen month
/// order is newest-to-oldest; the index page's frequency chart wants the
/// reverse.
pub fn monthly_post_counts(posts: &[PostRecord]) -> Vec<(String, u32)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();

    for post in posts {
        if !counts.contains_key(&post.month_label) {
            order.push(post.month_label.clone());
        }
        *counts.entry(post.month_label.clone()).or_insert(0) += post.post_count;
    }

    order
        .into_iter()
        .rev()
        .map(|month| {
            let count = counts[&month];
            (month, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(category: &str, month: &str, impressions: f64, engagement: f64) -> PostRecord {
        PostRecord {
            created: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            year: "2024".to_string(),
            month_label: month.to_string(),
            day_of_week: "Monday".to_string(),
            time_slot: "Morning".to_string(),
            category: category.to_string(),
            sub_category: "General".to_string(),
            emoji_tag: "🚀".to_string(),
            impressions,
            clicks: impressions / 10.0,
            ctr: 0.05,
            engagement_rate: engagement,
            post_count: 1,
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let posts = vec![
            post("B", "Jan 2024", 10.0, 0.1),
            post("A", "Jan 2024", 20.0, 0.1),
            post("C", "Jan 2024", 30.0, 0.1),
            post("A", "Jan 2024", 40.0, 0.1),
        ];
        let rows = aggregate(&posts, GroupColumn::Category, Metric::Impressions);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["B", "A", "C"]);
    }

    #[test]
    fn post_counts_are_conserved() {
        let posts = vec![
            post("A", "Jan 2024", 100.0, 0.1),
            post("A", "Jan 2024", 200.0, 0.1),
            post("B", "Jan 2024", 50.0, 0.1),
        ];
        let rows = aggregate(&posts, GroupColumn::Category, Metric::Impressions);
        let total: u32 = rows.iter().map(|r| r.post_count).sum();
        assert_eq!(total as usize, posts.len());
    }

    #[test]
    fn means_are_scaled_per_metric() {
        let posts = vec![
            post("A", "Jan 2024", 100.0, 0.0537),
            post("A", "Jan 2024", 200.0, 0.0537),
            post("B", "Jan 2024", 50.0, 0.0537),
        ];
        let rows = aggregate(&posts, GroupColumn::Category, Metric::Impressions);
        assert_eq!(
            rows,
            vec![
                GroupRow {
                    key: "A".to_string(),
                    post_count: 2,
                    value: 150.0
                },
                GroupRow {
                    key: "B".to_string(),
                    post_count: 1,
                    value: 50.0
                },
            ]
        );

        let rates = aggregate(&posts, GroupColumn::Category, Metric::EngagementRate);
        assert_eq!(rates[0].value, 5.37);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[], GroupColumn::Category, Metric::Clicks).is_empty());
    }

    fn lookup() -> DataTable {
        DataTable::from_csv(
            "Location,Total followers,Location View,Total views\nUS,300,US,2000\nUK,150,UK,900",
        )
        .unwrap()
    }

    #[test]
    fn pie_subset_resolves_requested_keys_in_order() {
        let (labels, values) = pie_subset(
            &lookup(),
            "Location",
            "Total followers",
            &["US".to_string(), "UK".to_string()],
        )
        .unwrap()
        .unwrap();
        assert_eq!(labels, ["US", "UK"]);
        assert_eq!(values, [300.0, 150.0]);
    }

    #[test]
    fn pie_subset_empty_request_is_none() {
        assert!(pie_subset(&lookup(), "Location", "Total followers", &[])
            .unwrap()
            .is_none());
    }

    #[test]
    fn pie_subset_unknown_key_errors() {
        let result = pie_subset(
            &lookup(),
            "Location",
            "Total followers",
            &["France".to_string()],
        );
        assert!(matches!(result, Err(BoardError::UnknownKey(_))));
    }

    #[test]
    fn pie_subset_sums_duplicate_dimension_rows() {
        let table = DataTable::from_csv("Location,Total followers\nUS,300\nUS,100").unwrap();
        let (_, values) = pie_subset(&table, "Location", "Total followers", &["US".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(values, [400.0]);
    }

    #[test]
    fn monthly_counts_run_oldest_first() {
        let posts = vec![
            post("A", "Mar 2024", 1.0, 0.1),
            post("A", "Mar 2024", 1.0, 0.1),
            post("A", "Feb 2024", 1.0, 0.1),
            post("A", "Jan 2024", 1.0, 0.1),
        ];
        assert_eq!(
            monthly_post_counts(&posts),
            vec![
                ("Jan 2024".to_string(), 1),
                ("Feb 2024".to_string(), 1),
                ("Mar 2024".to_string(), 2),
            ]
        );
    }
}
