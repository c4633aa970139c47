use crate::aggregate::GroupRow;
use crate::error::{BoardError, BoardResult};
use serde::Serialize;

/// Declarative chart description handed to the browser charting library
///
/// This enum defines the different visualization formats the dashboard
/// produces. Nothing here draws anything: each variant is a structural
/// description (labels, series, title) that the front end feeds to its
/// renderer verbatim, so every variant keeps its label and value arrays the
/// same length by construction.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartDescriptor {
    /// Line chart - one named series of (label, value) points in axis order
    Line {
        title: String,
        x_label: String,
        y_label: String,
        labels: Vec<String>,
        values: Vec<f64>,
    },

    /// Bar chart - grouped data with a post-count series and a metric series
    Bar {
        title: String,
        x_label: String,
        y_label: String,
        labels: Vec<String>,
        post_counts: Vec<u32>,
        values: Vec<f64>,
    },

    /// Pie chart - one series of (label, value) slices, values all >= 0
    Pie {
        title: String,
        labels: Vec<String>,
        values: Vec<f64>,
    },
}

/// Create a bar chart descriptor from aggregated groups
///
/// X-axis labels are the group keys in group order; the descriptor carries
/// the integer post-count series alongside the scaled metric series.
///
/// # Arguments
/// * `group_label` - Display name of the grouping column (x-axis label)
/// * `metric_label` - Display name of the aggregated metric (y-axis label)
/// * `rows` - Ordered output of the aggregation stage
///
/// # Examples
/// ```
/// use postboard::aggregate::GroupRow;
/// use postboard::chart::bar_chart;
///
/// let rows = vec![GroupRow { key: "Monday".to_string(), post_count: 3, value: 120.0 }];
/// let chart = bar_chart("Day of the week", "Impressions", &rows);
/// ```
pub fn bar_chart(group_label: &str, metric_label: &str, rows: &[GroupRow]) -> ChartDescriptor {
    ChartDescriptor::Bar {
        title: format!("{} by {}", metric_label, group_label),
        x_label: group_label.to_string(),
        y_label: metric_label.to_string(),
        labels: rows.iter().map(|r| r.key.clone()).collect(),
        post_counts: rows.iter().map(|r| r.post_count).collect(),
        values: rows.iter().map(|r| r.value).collect(),
    }
}

/// Create a line chart descriptor from (label, value) points
pub fn line_chart(title: &str, x_label: &str, y_label: &str, points: &[(String, f64)]) -> ChartDescriptor {
    ChartDescriptor::Line {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        labels: points.iter().map(|(l, _)| l.clone()).collect(),
        values: points.iter().map(|&(_, v)| v).collect(),
    }
}

/// Create a pie chart descriptor from parallel label and value arrays
///
/// # Arguments
/// * `title` - Display title
/// * `labels` - Slice labels, as resolved by the pie subset builder
/// * `values` - Slice values, parallel to `labels`
///
/// # Returns
/// * `BoardResult<ChartDescriptor>` - The descriptor, or `InvalidSeriesValue`
///   if any value is negative or not finite
pub fn pie_chart(title: &str, labels: Vec<String>, values: Vec<f64>) -> BoardResult<ChartDescriptor> {
    debug_assert_eq!(labels.len(), values.len());

    for &value in &values {
        if !value.is_finite() || value < 0.0 {
            return Err(BoardError::InvalidSeriesValue(value));
        }
    }

    Ok(ChartDescriptor::Pie {
        title: title.to_string(),
        labels,
        values,
    })
}

impl ChartDescriptor {
    /// Render the descriptor as a figure for the browser charting library
    ///
    /// The front end passes the result straight to `Plotly.newPlot`, so the
    /// shape here is the library's `{data, layout}` figure object.
    pub fn to_plotly(&self) -> serde_json::Value {
        match self {
            ChartDescriptor::Line {
                title,
                x_label,
                y_label,
                labels,
                values,
            } => serde_json::json!({
                "data": [{
                    "type": "scatter",
                    "mode": "lines+markers",
                    "x": labels,
                    "y": values,
                    "name": y_label,
                }],
                "layout": {
                    "title": title,
                    "xaxis": { "title": x_label },
                    "yaxis": { "title": y_label },
                },
            }),
            ChartDescriptor::Bar {
                title,
                x_label,
                y_label,
                labels,
                post_counts,
                values,
            } => serde_json::json!({
                "data": [
                    {
                        "type": "bar",
                        "x": labels,
                        "y": values,
                        "name": y_label,
                    },
                    {
                        "type": "bar",
                        "x": labels,
                        "y": post_counts,
                        "name": "Number of Posts",
                        "visible": "legendonly",
                    },
                ],
                "layout": {
                    "title": title,
                    "barmode": "group",
                    "xaxis": { "title": x_label },
                    "yaxis": { "title": y_label },
                },
            }),
            ChartDescriptor::Pie {
                title,
                labels,
                values,
            } => serde_json::json!({
                "data": [{
                    "type": "pie",
                    "labels": labels,
                    "values": values,
                }],
                "layout": { "title": title },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_chart_keeps_group_order() {
        let rows = vec![
            GroupRow {
                key: "B".to_string(),
                post_count: 2,
                value: 150.0,
            },
            GroupRow {
                key: "A".to_string(),
                post_count: 1,
                value: 50.0,
            },
        ];
        let chart = bar_chart("Category", "Impressions", &rows);
        match chart {
            ChartDescriptor::Bar {
                labels,
                post_counts,
                values,
                ..
            } => {
                assert_eq!(labels, ["B", "A"]);
                assert_eq!(post_counts, [2, 1]);
                assert_eq!(values, [150.0, 50.0]);
            }
            other => panic!("expected bar chart, got {:?}", other),
        }
    }

    #[test]
    fn pie_chart_rejects_negative_values() {
        let result = pie_chart("Followers", vec!["US".to_string()], vec![-1.0]);
        assert!(matches!(result, Err(BoardError::InvalidSeriesValue(_))));
    }

    #[test]
    fn pie_chart_accepts_zero() {
        assert!(pie_chart("Followers", vec!["US".to_string()], vec![0.0]).is_ok());
    }

    #[test]
    fn plotly_figure_has_data_and_layout() {
        let chart = line_chart(
            "Followers Over Time",
            "Month",
            "Followers",
            &[("Jan".to_string(), 1000.0), ("Feb".to_string(), 1050.0)],
        );
        let fig = chart.to_plotly();
        assert!(fig["data"].is_array());
        assert_eq!(fig["data"][0]["x"][1], "Feb");
        assert_eq!(fig["layout"]["title"], "Followers Over Time");
    }
}
