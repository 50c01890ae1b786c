//! Football league season tables: loading, filtering and the derived
//! views behind the dashboard charts.

pub mod config;
pub mod data;
