use crate::error::{BoardError, BoardResult};
use crate::table::DataTable;
use chrono::NaiveDate;

/// One posted item from the content sheet
///
/// Each row of the content tab becomes one record. Categorical columns stay
/// as the strings the sheet exported; numeric metrics are parsed up front so
/// a malformed cell fails the whole snapshot load instead of surfacing later
/// as a bogus aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct PostRecord {
    pub created: NaiveDate,
    pub year: String,
    pub month_label: String,
    pub day_of_week: String,
    pub time_slot: String,
    pub category: String,
    pub sub_category: String,
    pub emoji_tag: String,
    pub impressions: f64,
    pub clicks: f64,
    pub ctr: f64,
    pub engagement_rate: f64,
    pub post_count: u32,
}

/// One follower-history sample from the follower sheet
#[derive(Clone, Debug, PartialEq)]
pub struct FollowerPoint {
    pub date: NaiveDate,
    pub count: i64,
}

/// Numeric metrics that can be aggregated per group
///
/// The enumeration is fixed; requesting anything else is `UnsupportedMetric`.
/// The display names match the sheet's column headers, which is also what the
/// filter page sends back in `aggregates` parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Impressions,
    Clicks,
    ClickThroughRate,
    EngagementRate,
}

impl Metric {
    pub fn from_name(name: &str) -> BoardResult<Self> {
        match name {
            "Impressions" => Ok(Metric::Impressions),
            "Clicks" => Ok(Metric::Clicks),
            "Click through rate (CTR)" => Ok(Metric::ClickThroughRate),
            "Engagement rate" => Ok(Metric::EngagementRate),
            other => Err(BoardError::UnsupportedMetric(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Impressions => "Impressions",
            Metric::Clicks => "Clicks",
            Metric::ClickThroughRate => "Click through rate (CTR)",
            Metric::EngagementRate => "Engagement rate",
        }
    }

    /// All metrics, in the order the filter page lists them
    pub fn all() -> [Metric; 4] {
        [
            Metric::Impressions,
            Metric::Clicks,
            Metric::ClickThroughRate,
            Metric::EngagementRate,
        ]
    }

    pub fn value(&self, record: &PostRecord) -> f64 {
        match self {
            Metric::Impressions => record.impressions,
            Metric::Clicks => record.clicks,
            Metric::ClickThroughRate => record.ctr,
            Metric::EngagementRate => record.engagement_rate,
        }
    }

    /// Scale a per-group mean for display
    ///
    /// Count-like metrics round to whole numbers; the rate metrics are stored
    /// as fractions, so they scale to percent and keep two decimals.
    pub fn scaled(&self, mean: f64) -> f64 {
        match self {
            Metric::Impressions | Metric::Clicks => mean.round(),
            Metric::ClickThroughRate | Metric::EngagementRate => (mean * 100.0 * 100.0).round() / 100.0,
        }
    }
}

/// Categorical columns a chart can group by and a filter can constrain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupColumn {
    Year,
    MonthLabel,
    DayOfWeek,
    TimeSlot,
    Category,
    SubCategory,
    EmojiTag,
}

impl GroupColumn {
    pub fn from_name(name: &str) -> BoardResult<Self> {
        match name {
            "Year" => Ok(GroupColumn::Year),
            "Month & Year" => Ok(GroupColumn::MonthLabel),
            "Day of the week" => Ok(GroupColumn::DayOfWeek),
            "Interval Times" => Ok(GroupColumn::TimeSlot),
            "Category" => Ok(GroupColumn::Category),
            "Sub-Category" => Ok(GroupColumn::SubCategory),
            "Type Emoji" => Ok(GroupColumn::EmojiTag),
            other => Err(BoardError::UnsupportedColumn(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColumn::Year => "Year",
            GroupColumn::MonthLabel => "Month & Year",
            GroupColumn::DayOfWeek => "Day of the week",
            GroupColumn::TimeSlot => "Interval Times",
            GroupColumn::Category => "Category",
            GroupColumn::SubCategory => "Sub-Category",
            GroupColumn::EmojiTag => "Type Emoji",
        }
    }

    pub fn value<'a>(&self, record: &'a PostRecord) -> &'a str {
        match self {
            GroupColumn::Year => &record.year,
            GroupColumn::MonthLabel => &record.month_label,
            GroupColumn::DayOfWeek => &record.day_of_week,
            GroupColumn::TimeSlot => &record.time_slot,
            GroupColumn::Category => &record.category,
            GroupColumn::SubCategory => &record.sub_category,
            GroupColumn::EmojiTag => &record.emoji_tag,
        }
    }
}

/// Parse the content table into post records
///
/// # Arguments
/// * `table` - The raw content sheet snapshot
///
/// # Returns
/// * `BoardResult<Vec<PostRecord>>` - One record per row, or `FetchFailure`
///   if a date or numeric cell does not parse
pub fn parse_posts(table: &DataTable) -> BoardResult<Vec<PostRecord>> {
    let mut posts = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let created = parse_date(cell(table, row, "Created date")?)?;
        posts.push(PostRecord {
            created,
            year: cell(table, row, "Year")?.to_string(),
            month_label: cell(table, row, "Month & Year")?.to_string(),
            day_of_week: cell(table, row, "Day of the week")?.to_string(),
            time_slot: cell(table, row, "Interval Times")?.to_string(),
            category: cell(table, row, "Category")?.to_string(),
            sub_category: cell(table, row, "Sub-Category")?.to_string(),
            emoji_tag: cell(table, row, "Type Emoji")?.to_string(),
            impressions: parse_number(table, row, "Impressions")?,
            clicks: parse_number(table, row, "Clicks")?,
            ctr: parse_number(table, row, "Click through rate (CTR)")?,
            engagement_rate: parse_number(table, row, "Engagement rate")?,
            post_count: parse_number(table, row, "Number of Post")? as u32,
        });
    }

    Ok(posts)
}

/// Parse the follower-history table
pub fn parse_followers(table: &DataTable) -> BoardResult<Vec<FollowerPoint>> {
    let mut points = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let date = parse_date(cell(table, row, "Date")?)?;
        let raw = cell(table, row, "Follower Count")?;
        let count = raw.trim().parse::<i64>().map_err(|_| {
            BoardError::FetchFailure(format!("unparsable follower count: {:?}", raw))
        })?;
        points.push(FollowerPoint { date, count });
    }

    Ok(points)
}

// Sheets export dates either ISO or US-style depending on the cell format
pub fn parse_date(raw: &str) -> BoardResult<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .map_err(|_| BoardError::FetchFailure(format!("unparsable date: {:?}", raw)))
}

fn cell<'a>(table: &'a DataTable, row: usize, column: &str) -> BoardResult<&'a str> {
    table.column_index(column)?;
    table
        .get(row, column)
        .ok_or_else(|| BoardError::FetchFailure(format!("missing row {} in column {}", row, column)))
}

fn parse_number(table: &DataTable, row: usize, column: &str) -> BoardResult<f64> {
    let raw = cell(table, row, column)?;
    raw.trim().replace(',', "").parse::<f64>().map_err(|_| {
        BoardError::FetchFailure(format!("unparsable number in {}: {:?}", column, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "\
Created date,Year,Month & Year,Day of the week,Interval Times,Category,Sub-Category,Type Emoji,Impressions,Clicks,Click through rate (CTR),Engagement rate,Number of Post
2024-03-04,2024,Mar 2024,Monday,Morning,Technology,AI/ML,🚀,1200,48,0.04,0.061,1
2024-02-12,2024,Feb 2024,Tuesday,Evening,Business,Web Dev,💼,800,16,0.02,0.034,1";

    #[test]
    fn parses_content_rows() {
        let table = DataTable::from_csv(CONTENT).unwrap();
        let posts = parse_posts(&table).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].created, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(posts[0].category, "Technology");
        assert_eq!(posts[1].clicks, 16.0);
        assert_eq!(posts[1].post_count, 1);
    }

    #[test]
    fn bad_date_fails_the_load() {
        let table = DataTable::from_csv(CONTENT.replace("2024-03-04", "soon").as_str()).unwrap();
        assert!(matches!(
            parse_posts(&table),
            Err(BoardError::FetchFailure(_))
        ));
    }

    #[test]
    fn bad_number_fails_the_load() {
        let table = DataTable::from_csv(CONTENT.replace(",48,", ",n/a,").as_str()).unwrap();
        assert!(parse_posts(&table).is_err());
    }

    #[test]
    fn accepts_us_style_dates() {
        assert_eq!(
            parse_date("3/4/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
    }

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::all() {
            assert_eq!(Metric::from_name(metric.as_str()).unwrap(), metric);
        }
        assert!(matches!(
            Metric::from_name("Likes"),
            Err(BoardError::UnsupportedMetric(_))
        ));
    }

    #[test]
    fn group_column_names_round_trip() {
        for name in [
            "Year",
            "Month & Year",
            "Day of the week",
            "Interval Times",
            "Category",
            "Sub-Category",
            "Type Emoji",
        ] {
            assert_eq!(GroupColumn::from_name(name).unwrap().as_str(), name);
        }
        assert!(GroupColumn::from_name("Impressions").is_err());
    }

    #[test]
    fn rate_metrics_scale_to_percent() {
        assert_eq!(Metric::EngagementRate.scaled(0.0537), 5.37);
        assert_eq!(Metric::Impressions.scaled(123.4), 123.0);
    }

    #[test]
    fn parses_follower_history() {
        let table =
            DataTable::from_csv("Date,Follower Count\n2024-01-01,1000\n2024-02-01,1050").unwrap();
        let points = parse_followers(&table).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].count, 1050);
    }
}
