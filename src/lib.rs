/*!
# Postboard

A social post analytics dashboard, built in Rust.

## Overview

Postboard pulls tabular analytics data — post performance, follower history
and audience demographics — from spreadsheet CSV exports, reshapes it with
group-by aggregations, and serves interactive chart descriptions plus HTML
tables to a browser front end. A filter panel narrows the underlying rows
before re-aggregating.

## Architecture

Each request runs one synchronous pipeline to completion:

```text
Row Source -> Filter Stage -> Aggregation Stage -> Chart Descriptor Builder -> Pages/JSON
```

Every snapshot is loaded fresh per request and discarded with the response;
there is no shared mutable state and no persistence.

## Modules

- **table**: named-column string tables and the quoted-CSV parser
- **records**: typed post/follower rows, metric and group-column enumerations
- **source**: the three data-source variants (live sheet, demo, fixed)
- **filter**: row predicates built from the filter panel's query parameters
- **aggregate**: group-by mean/sum, pie subsets, posting frequency
- **chart**: declarative line/bar/pie descriptors for the browser renderer
- **error**: the typed error enumeration and propagation policy
- **app**: routing and request handlers

## REST API Endpoints

- `/` - Main page with follower trend, posting frequency and demographics
- `/filtered` - Filter panel page
- `/api/demographics/{chart_type}` - Pie chart for one demographics slice set
- `/api/filtered_chart` - Bar charts and tables for the filtered content rows
*/

pub mod aggregate;
pub mod app;
pub mod chart;
pub mod error;
pub mod filter;
pub mod records;
pub mod source;
pub mod table;

/// Re-export the core pipeline types for convenience
pub use aggregate::{GroupRow, aggregate as aggregate_posts, pie_subset};
pub use chart::ChartDescriptor;
pub use error::{BoardError, BoardResult};
pub use filter::FilterSpec;
pub use records::{FollowerPoint, GroupColumn, Metric, PostRecord};
pub use source::{DataSource, Snapshot};
pub use table::DataTable;
