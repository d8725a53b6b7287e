use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};

use crate::config::Config;
use crate::services::ReportParams;
use crate::state::SharedState;

pub async fn cmd_report(
    config: Config,
    start: Option<&str>,
    end: Option<&str>,
    category_id: Option<i32>,
    include_subcategories: bool,
) -> anyhow::Result<()> {
    let end_date = match end {
        Some(value) => parse_day(value)?,
        None => Utc::now().date_naive(),
    };
    let start_date = match start {
        Some(value) => parse_day(value)?,
        None => end_date - Duration::days(30),
    };

    let state = SharedState::new(config).await?;
    let report = state
        .reports
        .accepted_solutions(&ReportParams {
            start_date,
            end_date,
            category_id,
            include_subcategories,
        })
        .await?;

    println!("Accepted solutions {start_date} .. {end_date}");
    println!("{:-<40}", "");
    if report.data.is_empty() {
        println!("No accepted solutions in range.");
    }
    for day in &report.data {
        println!("{}  {:>6}", day.day, day.count);
    }
    println!("{:-<40}", "");
    println!("Total (all time):   {}", report.total);
    println!("Previous 30 days:   {}", report.prev30_days);

    Ok(())
}

fn parse_day(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{value}', expected YYYY-MM-DD"))
}
