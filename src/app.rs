use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
    routing::get,
};
use handlebars::Handlebars;
use lazy_static::lazy_static;
use log::{error, warn};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::aggregate::{aggregate, distinct_values, monthly_post_counts, pie_subset};
use crate::chart::{bar_chart, line_chart, pie_chart};
use crate::error::BoardError;
use crate::filter::FilterSpec;
use crate::records::{GroupColumn, Metric};
use crate::source::{DataSource, Snapshot};
use crate::table::DataTable;

/// Shared application state: the configured data source and the page templates
///
/// The source holds no data of its own; every request fetches a fresh
/// snapshot, so nothing here needs a lock.
pub struct AppState {
    source: DataSource,
    templates: Handlebars<'static>,
}

// Which lookup table a demographics chart type reads from
#[derive(Clone, Copy)]
enum Lookup {
    Location,
    JobFunction,
    Industry,
}

impl Lookup {
    fn table<'a>(&self, snapshot: &'a Snapshot) -> &'a DataTable {
        match self {
            Lookup::Location => &snapshot.location,
            Lookup::JobFunction => &snapshot.job_function,
            Lookup::Industry => &snapshot.industry,
        }
    }
}

lazy_static! {
    // chart type -> (category column, aggregate column, lookup table)
    static ref CHART_MAP: Vec<(&'static str, &'static str, &'static str, Lookup)> = vec![
        ("location_followers", "Location", "Total followers", Lookup::Location),
        ("location_views", "Location View", "Total views", Lookup::Location),
        ("job_followers", "Job function", "Total followers", Lookup::JobFunction),
        ("job_views", "Job View", "Total views", Lookup::JobFunction),
        ("industry_followers", "Industry", "Total followers", Lookup::Industry),
        ("industry_views", "Industry View", "Total views", Lookup::Industry),
    ];
}

/// Build the dashboard router around a data source
///
/// Registers the page templates from the `templates/` directory and wires up
/// the page and API routes. Separate from [`run`] so tests can drive the
/// router without binding a socket.
pub fn build_router(source: DataSource) -> Result<Router, Box<dyn std::error::Error>> {
    let mut templates = Handlebars::new();
    templates.register_templates_directory(".hbs", "templates")?;

    let app_state = Arc::new(AppState { source, templates });

    Ok(Router::new()
        .route("/", get(index))
        .route("/filtered", get(filtered))
        .route("/api/demographics/:chart_type", get(api_demographics))
        .route("/api/filtered_chart", get(api_filtered_chart))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}

/// Start the dashboard server
///
/// # Arguments
/// * `source` - Data source variant chosen at startup
/// * `bind_addr` - Address to listen on, e.g. `127.0.0.1:3000`
pub async fn run(source: DataSource, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(source)?;

    // Start server
    let listener = TcpListener::bind(bind_addr).await?;
    println!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// Render a page template, falling back to plain text if rendering itself fails
fn render_page(state: &AppState, name: &str, data: &serde_json::Value) -> Html<String> {
    match state.templates.render(name, data) {
        Ok(body) => Html(body),
        Err(e) => {
            error!("template {} failed to render: {}", name, e);
            Html(format!("template error: {}", e))
        }
    }
}

fn error_page(state: &AppState, message: &str) -> Html<String> {
    render_page(state, "error", &json!({ "message": message }))
}

/// Main page: follower trend, posting frequency, demographics tables
async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = match state.source.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("snapshot load failed: {}", e);
            return error_page(&state, "Failed to load data from the spreadsheet");
        }
    };

    let follower_points: Vec<(String, f64)> = snapshot
        .followers
        .iter()
        .map(|p| (p.date.to_string(), p.count as f64))
        .collect();
    let follower_chart = line_chart(
        "Followers Over Time",
        "Month",
        "Followers",
        &follower_points,
    );

    let frequency_counts = monthly_post_counts(&snapshot.posts);
    let frequency_points: Vec<(String, f64)> = frequency_counts
        .iter()
        .map(|(month, count)| (month.clone(), *count as f64))
        .collect();
    let frequency_chart = line_chart(
        "Posting Frequency Over Time",
        "Month",
        "Number of Posts",
        &frequency_points,
    );

    // Option lists for the demographics pie selectors
    let demographics = json!({
        "locations": snapshot.location.column_values("Location").unwrap_or_default(),
        "locations_view": snapshot.location.column_values("Location View").unwrap_or_default(),
        "job_functions": snapshot.job_function.column_values("Job function").unwrap_or_default(),
        "job_views": snapshot.job_function.column_values("Job View").unwrap_or_default(),
        "industries": snapshot.industry.column_values("Industry").unwrap_or_default(),
        "industry_views": snapshot.industry.column_values("Industry View").unwrap_or_default(),
    });

    render_page(
        &state,
        "index",
        &json!({
            "follower_chart": follower_chart.to_plotly().to_string(),
            "frequency_chart": frequency_chart.to_plotly().to_string(),
            "frequency_rows": frequency_counts,
            "demographics": demographics,
            "location_rows": snapshot.location.to_records(),
            "job_function_rows": snapshot.job_function.to_records(),
            "industry_rows": snapshot.industry.to_records(),
        }),
    )
}

/// Filter page: the distinct values of every filterable column
async fn filtered(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = match state.source.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("snapshot load failed: {}", e);
            return error_page(&state, "Failed to load data from the spreadsheet");
        }
    };

    let start_date = snapshot.posts.iter().map(|p| p.created).min();
    let end_date = snapshot.posts.iter().map(|p| p.created).max();

    let metric_names: Vec<&str> = Metric::all().iter().map(|m| m.as_str()).collect();
    let filter_options = json!({
        "years": distinct_values(&snapshot.posts, GroupColumn::Year),
        "months": distinct_values(&snapshot.posts, GroupColumn::MonthLabel),
        "days": distinct_values(&snapshot.posts, GroupColumn::DayOfWeek),
        "times": distinct_values(&snapshot.posts, GroupColumn::TimeSlot),
        "categories": distinct_values(&snapshot.posts, GroupColumn::Category),
        "sub_categories": distinct_values(&snapshot.posts, GroupColumn::SubCategory),
        "emojis": distinct_values(&snapshot.posts, GroupColumn::EmojiTag),
        "aggregates": metric_names,
        "group_columns": [
            "Year",
            "Month & Year",
            "Day of the week",
            "Interval Times",
            "Category",
            "Sub-Category",
            "Type Emoji",
        ],
    });

    render_page(
        &state,
        "filtered",
        &json!({
            "filter_options": filter_options,
            "start_date": start_date.map(|d| d.to_string()).unwrap_or_default(),
            "end_date": end_date.map(|d| d.to_string()).unwrap_or_default(),
        }),
    )
}

/// Demographics pie endpoint
///
/// `chart_type` selects one of the six fixed (category, aggregate, table)
/// triples; the repeated `items` parameters pick the slices. Errors other
/// than the snapshot load come back as an `error` field, never a failed
/// response.
async fn api_demographics(
    Path(chart_type): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let snapshot = match state.source.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("snapshot load failed: {}", e);
            return Json(json!({ "error": "Failed to load data" }));
        }
    };

    let entry = CHART_MAP.iter().find(|(key, ..)| *key == chart_type);
    let (_, category, aggregate_column, lookup) = match entry {
        Some(entry) => entry,
        None => return Json(json!({ "error": "Invalid chart type" })),
    };

    let items: Vec<String> = params
        .into_iter()
        .filter(|(key, _)| key == "items")
        .map(|(_, value)| value)
        .collect();

    match pie_subset(lookup.table(&snapshot), category, aggregate_column, &items) {
        Ok(None) => Json(json!({ "chart": null })),
        Ok(Some((labels, values))) => match pie_chart(aggregate_column, labels, values) {
            Ok(chart) => Json(json!({ "chart": chart.to_plotly() })),
            Err(e) => Json(json!({ "error": e.to_string() })),
        },
        Err(e) => {
            warn!("pie subset for {} failed: {}", chart_type, e);
            Json(json!({ "error": e.to_string() }))
        }
    }
}

/// Filtered bar-chart endpoint
///
/// Applies the filter spec from the query string, then builds one chart and
/// one table per requested metric, keyed `"{group column}_{metric}"`. A
/// metric that fails only produces an error entry under its own key; the
/// sibling metrics still render.
async fn api_filtered_chart(
    Query(params): Query<Vec<(String, String)>>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let snapshot = match state.source.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("snapshot load failed: {}", e);
            return Json(json!({ "error": "Failed to load data" }));
        }
    };

    let chart_category = params
        .iter()
        .find(|(key, _)| key == "chart_category")
        .map(|(_, value)| value.clone());
    let group = match chart_category {
        Some(name) => match GroupColumn::from_name(&name) {
            Ok(group) => group,
            Err(e) => return Json(json!({ "error": e.to_string() })),
        },
        None => {
            return Json(json!({
                "error": BoardError::MissingParameter("chart_category").to_string()
            }))
        }
    };

    let spec = FilterSpec::from_params(&params);
    let posts = spec.apply(&snapshot.posts);

    let requested: Vec<String> = params
        .into_iter()
        .filter(|(key, _)| key == "aggregates")
        .map(|(_, value)| value)
        .collect();

    let mut charts = serde_json::Map::new();
    let mut tables = serde_json::Map::new();

    for name in requested {
        let key = format!("{}_{}", group.as_str(), name);
        match Metric::from_name(&name) {
            Ok(metric) => {
                let rows = aggregate(&posts, group, metric);
                let chart = bar_chart(group.as_str(), metric.as_str(), &rows);
                charts.insert(key.clone(), chart.to_plotly());

                // Parallel tabular echo of the same data for on-page tables
                let mut table = serde_json::Map::new();
                table.insert(
                    group.as_str().to_string(),
                    json!(rows.iter().map(|r| r.key.clone()).collect::<Vec<_>>()),
                );
                table.insert(
                    "Number of Posts".to_string(),
                    json!(rows.iter().map(|r| r.post_count).collect::<Vec<_>>()),
                );
                table.insert(
                    metric.as_str().to_string(),
                    json!(rows.iter().map(|r| r.value).collect::<Vec<_>>()),
                );
                tables.insert(key, serde_json::Value::Object(table));
            }
            Err(e) => {
                warn!("skipping metric {}: {}", name, e);
                charts.insert(key, json!({ "error": e.to_string() }));
            }
        }
    }

    Json(json!({ "charts": charts, "tables": tables }))
}
