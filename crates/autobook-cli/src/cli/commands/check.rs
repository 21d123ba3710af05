//! `autobook check`: validate config and show what a run would do.

use anyhow::Result;
use autobook_core::config::Settings;
use autobook_core::schedule::compute_target;
use chrono::Utc;
use std::process::ExitCode;

pub fn run_check(settings: &Settings) -> Result<ExitCode> {
    let offset = settings.criteria.utc_offset;
    let target = compute_target(Utc::now(), &settings.run.schedule, offset);

    println!("Configuration OK");
    println!("  account:       {}", settings.credentials.email);
    println!("  api:           {}", settings.api.base_url);
    println!("  location:      {}", target.location_id);
    println!("  target date:   {}", target.target_date);
    println!(
        "  deadline:      {}",
        target.deadline.with_timezone(&offset).format("%Y-%m-%d %H:%M %:z")
    );
    println!("  poll interval: {}s", settings.run.poll_interval.as_secs());
    println!("  filters:       {}", settings.criteria.describe());
    println!(
        "  retries:       read {} / write {}",
        settings.read_retry.max_retries, settings.write_retry.max_retries
    );
    Ok(ExitCode::SUCCESS)
}
