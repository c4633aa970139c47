use crate::error::{BoardError, BoardResult};
use crate::records::{self, FollowerPoint, PostRecord};
use crate::table::DataTable;
use chrono::{Datelike, Duration, Local, NaiveDate};
use log::{debug, info};
use rand::Rng;
use std::env;

// Sheet tab names as exported by the analytics spreadsheet
const CONTENT_TAB: &str = "Content";
const FOLLOWER_TAB: &str = "Sheet24";
const LOCATION_TAB: &str = "Sheet25";
const JOB_FUNCTION_TAB: &str = "Sheet26";
const INDUSTRY_TAB: &str = "Sheet27";

const DEFAULT_SHEET_ID: &str = "1thMQ4ndtgzyEM6qfoA2tfrt3MEzZY2CtxhjpCTNcS0U";

/// One request's worth of data: the five tables, loaded fresh and discarded
/// when the response goes out
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub posts: Vec<PostRecord>,
    pub followers: Vec<FollowerPoint>,
    pub location: DataTable,
    pub job_function: DataTable,
    pub industry: DataTable,
}

/// Where the dashboard's rows come from
///
/// The three variants are interchangeable behind `fetch_snapshot`: the live
/// spreadsheet export, a randomized demo set, or a fixed snapshot embedded in
/// the binary. The variant is chosen once at startup from the command line.
#[derive(Clone, Debug)]
pub enum DataSource {
    /// Live CSV exports of the configured spreadsheet
    Sheets { sheet_id: String },
    /// Randomized data in the same shape, no network required
    Demo,
    /// Fixed snapshot compiled into the binary
    Fixed,
}

impl DataSource {
    /// Build the live source, honoring the `SHEET_ID` environment variable
    pub fn sheets_from_env() -> Self {
        let sheet_id = env::var("SHEET_ID").unwrap_or_else(|_| DEFAULT_SHEET_ID.to_string());
        DataSource::Sheets { sheet_id }
    }

    /// Load a fresh snapshot of all five tables
    ///
    /// Any transport error, missing column, or unparsable date/number in the
    /// fetched data is a `FetchFailure`; the caller aborts the whole request
    /// on it. Nothing is cached between calls.
    pub async fn fetch_snapshot(&self) -> BoardResult<Snapshot> {
        match self {
            DataSource::Sheets { sheet_id } => fetch_sheets(sheet_id).await,
            DataSource::Demo => Ok(generate_demo_snapshot()),
            DataSource::Fixed => fixed_snapshot(),
        }
    }
}

// CSV export URL for one tab of a Google Sheets document. The base is
// overridable so tests can point the fetch at a dead endpoint.
fn export_url(sheet_id: &str, tab: &str) -> String {
    let base = env::var("SHEETS_BASE_URL")
        .unwrap_or_else(|_| "https://docs.google.com/spreadsheets".to_string());
    format!(
        "{}/d/{}/gviz/tq?tqx=out:csv&sheet={}",
        base, sheet_id, tab
    )
}

async fn fetch_sheets(sheet_id: &str) -> BoardResult<Snapshot> {
    let client = reqwest::Client::new();

    let content = fetch_table(&client, sheet_id, CONTENT_TAB).await?;
    let followers = fetch_table(&client, sheet_id, FOLLOWER_TAB).await?;
    let location = fetch_table(&client, sheet_id, LOCATION_TAB).await?;
    let job_function = fetch_table(&client, sheet_id, JOB_FUNCTION_TAB).await?;
    let industry = fetch_table(&client, sheet_id, INDUSTRY_TAB).await?;

    let posts = records::parse_posts(&content)?;
    let follower_points = records::parse_followers(&followers)?;
    info!(
        "loaded snapshot: {} posts, {} follower samples",
        posts.len(),
        follower_points.len()
    );

    Ok(Snapshot {
        posts,
        followers: follower_points,
        location,
        job_function,
        industry,
    })
}

async fn fetch_table(
    client: &reqwest::Client,
    sheet_id: &str,
    tab: &str,
) -> BoardResult<DataTable> {
    let url = export_url(sheet_id, tab);
    debug!("fetching {}", url);

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(BoardError::FetchFailure(format!(
            "sheet tab {} returned HTTP {}",
            tab,
            response.status()
        )));
    }

    let text = response.text().await?;
    DataTable::from_csv(&text)
}

const DEMO_LOCATIONS: [&str; 5] = [
    "United States",
    "United Kingdom",
    "Canada",
    "Australia",
    "Germany",
];
const DEMO_JOB_FUNCTIONS: [&str; 5] = ["Marketing", "Sales", "Engineering", "HR", "Finance"];
const DEMO_INDUSTRIES: [&str; 5] = [
    "Technology",
    "Healthcare",
    "Finance",
    "Education",
    "Manufacturing",
];
const DEMO_CATEGORIES: [&str; 4] = ["Technology", "Business", "Marketing", "Education"];
const DEMO_SUB_CATEGORIES: [&str; 4] = ["AI/ML", "Web Dev", "Data Science", "Cloud"];
const DEMO_EMOJIS: [&str; 5] = ["💼", "🚀", "💡", "📈", "🎯"];
const DEMO_TIME_SLOTS: [&str; 3] = ["Morning", "Afternoon", "Evening"];

// Randomized snapshot in the same shape as the live sheet
fn generate_demo_snapshot() -> Snapshot {
    let mut rng = rand::thread_rng();
    let today = Local::now().date_naive();

    // Twelve months of follower history, oldest first
    let mut followers = Vec::new();
    for i in 0..12 {
        let date = today - Duration::days((11 - i) * 30);
        followers.push(FollowerPoint {
            date,
            count: 1000 + i * 50 + rng.gen_range(-20..=20),
        });
    }

    // Posts spanning the last year, newest first like the sheet export
    let mut posts = Vec::new();
    for i in 0..180 {
        let created = today - Duration::days(i * 2);
        posts.push(demo_post(&mut rng, created));
    }

    Snapshot {
        posts,
        followers,
        location: demo_lookup("Location", "Location View", &DEMO_LOCATIONS, &mut rng),
        job_function: demo_lookup("Job function", "Job View", &DEMO_JOB_FUNCTIONS, &mut rng),
        industry: demo_lookup("Industry", "Industry View", &DEMO_INDUSTRIES, &mut rng),
    }
}

fn demo_post(rng: &mut impl Rng, created: NaiveDate) -> PostRecord {
    let impressions = rng.gen_range(200..5000) as f64;
    let clicks = (impressions * rng.gen_range(0.01..0.08)).round();

    PostRecord {
        created,
        year: created.year().to_string(),
        month_label: created.format("%b %Y").to_string(),
        day_of_week: created.format("%A").to_string(),
        time_slot: DEMO_TIME_SLOTS[rng.gen_range(0..DEMO_TIME_SLOTS.len())].to_string(),
        category: DEMO_CATEGORIES[rng.gen_range(0..DEMO_CATEGORIES.len())].to_string(),
        sub_category: DEMO_SUB_CATEGORIES[rng.gen_range(0..DEMO_SUB_CATEGORIES.len())].to_string(),
        emoji_tag: DEMO_EMOJIS[rng.gen_range(0..DEMO_EMOJIS.len())].to_string(),
        impressions,
        clicks,
        ctr: clicks / impressions,
        engagement_rate: rng.gen_range(0.01..0.12),
        post_count: 1,
    }
}

fn demo_lookup(
    dimension: &str,
    view_alias: &str,
    values: &[&str],
    rng: &mut impl Rng,
) -> DataTable {
    let columns = vec![
        dimension.to_string(),
        "Total followers".to_string(),
        view_alias.to_string(),
        "Total views".to_string(),
    ];
    let rows = values
        .iter()
        .map(|value| {
            vec![
                value.to_string(),
                rng.gen_range(50..500).to_string(),
                value.to_string(),
                rng.gen_range(500..5000).to_string(),
            ]
        })
        .collect();

    DataTable::new(columns, rows).expect("demo lookup rows match columns")
}

// Fixed snapshot compiled into the binary, for offline runs and tests
fn fixed_snapshot() -> BoardResult<Snapshot> {
    let content = DataTable::from_csv(include_str!("./data/content.csv"))?;
    let followers = DataTable::from_csv(include_str!("./data/followers.csv"))?;

    Ok(Snapshot {
        posts: records::parse_posts(&content)?,
        followers: records::parse_followers(&followers)?,
        location: DataTable::from_csv(include_str!("./data/location.csv"))?,
        job_function: DataTable::from_csv(include_str!("./data/job_function.csv"))?,
        industry: DataTable::from_csv(include_str!("./data/industry.csv"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_url_targets_the_tab() {
        let url = export_url("abc123", "Content");
        assert!(url.contains("/d/abc123/"));
        assert!(url.ends_with("sheet=Content"));
    }

    #[test]
    fn sheets_source_reads_env_sheet_id() {
        env::set_var("SHEET_ID", "custom-sheet");
        let source = DataSource::sheets_from_env();
        env::remove_var("SHEET_ID");
        match source {
            DataSource::Sheets { sheet_id } => assert_eq!(sheet_id, "custom-sheet"),
            other => panic!("expected sheets source, got {:?}", other),
        }
    }

    #[test]
    fn demo_snapshot_has_all_tables() {
        let snapshot = generate_demo_snapshot();
        assert_eq!(snapshot.followers.len(), 12);
        assert_eq!(snapshot.posts.len(), 180);
        assert_eq!(snapshot.location.len(), 5);
        assert_eq!(snapshot.job_function.len(), 5);
        assert_eq!(snapshot.industry.len(), 5);
        assert!(snapshot.location.column_index("Total followers").is_ok());
    }

    #[test]
    fn demo_posts_are_newest_first() {
        let snapshot = generate_demo_snapshot();
        assert!(snapshot.posts[0].created > snapshot.posts.last().unwrap().created);
    }

    #[test]
    fn fixed_snapshot_parses() {
        let snapshot = fixed_snapshot().unwrap();
        assert!(!snapshot.posts.is_empty());
        assert!(!snapshot.followers.is_empty());
        assert_eq!(snapshot.location.len(), 5);
    }
}
