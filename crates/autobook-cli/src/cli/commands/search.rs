//! `autobook search`: one listing, each class with its filter verdict.

use anyhow::Result;
use autobook_core::clock::SystemClock;
use autobook_core::config::Settings;
use autobook_core::filter::{evaluate, select};
use autobook_core::model::Outcome;
use autobook_core::retry::{run_with_retry, ApiError};
use autobook_core::schedule::compute_target;
use chrono::{NaiveDate, Utc};
use std::process::ExitCode;

use super::run::exit_status;
use super::{api_client, cancel_on_ctrl_c};

pub async fn run_search(settings: Settings, date: Option<NaiveDate>) -> Result<ExitCode> {
    let offset = settings.criteria.utc_offset;
    let date = date.unwrap_or_else(|| {
        compute_target(Utc::now(), &settings.run.schedule, offset).target_date
    });
    let location_id = settings.run.schedule.location_id;

    let (cancel, signal_task) = cancel_on_ctrl_c();
    let listed = tokio::task::spawn_blocking(move || {
        let client = api_client(&settings);
        run_with_retry(&settings.read_retry, "search", &SystemClock, &cancel, || {
            client.search(location_id, date, settings.run.page_size)
        })
        .map(|items| {
            let picked = select(&items, &settings.criteria).map(|item| item.id.clone());
            let rows = items
                .into_iter()
                .map(|item| {
                    let verdict = evaluate(&item, &settings.criteria);
                    (item, verdict)
                })
                .collect::<Vec<_>>();
            (rows, picked)
        })
    })
    .await?;
    signal_task.abort();

    let (items, picked) = match listed {
        Ok(listed) => listed,
        Err(ApiError::Interrupted) => {
            println!("{}", Outcome::Interrupted);
            return Ok(ExitCode::from(exit_status(&Outcome::Interrupted)));
        }
        Err(e) => return Err(e.into()),
    };

    println!("{} classes at location {} on {}", items.len(), location_id, date);
    for (item, verdict) in &items {
        let mark = if picked.as_ref() == Some(&item.id) { "*" } else { " " };
        println!(
            "{} {:>8}  {:<25}  {:<30}  {:<20}  {:>3}/{:<3}  {}",
            mark,
            item.id.to_string(),
            item.start_time.to_string(),
            item.title,
            item.instructor_name.as_deref().unwrap_or("-"),
            item.free_spots,
            item.capacity,
            verdict.as_str()
        );
    }
    match picked {
        Some(id) => println!("would book: {}", id),
        None => println!("no eligible class"),
    }
    Ok(ExitCode::SUCCESS)
}
