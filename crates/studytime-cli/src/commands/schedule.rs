use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;
use serde::Deserialize;
use studytime_core::{
    AvailabilityMap, Config, FixedCommitment, Preferences, ScheduleReport, ScheduleStatus,
    SchedulingInput, StudyScheduler, Task, Urgency,
};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Generate a study schedule from a plan file
    Generate {
        /// Plan file (JSON with commitments, tasks and optional preferences)
        #[arg(long)]
        plan: PathBuf,
        /// Treat this instant as now (YYYY-MM-DDTHH:MM[:SS]); defaults to local time
        #[arg(long, value_parser = parse_now)]
        now: Option<NaiveDateTime>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show free time per date up to the latest pending deadline
    Free {
        /// Plan file
        #[arg(long)]
        plan: PathBuf,
        /// Treat this instant as now
        #[arg(long, value_parser = parse_now)]
        now: Option<NaiveDateTime>,
        /// Print the availability map as JSON
        #[arg(long)]
        json: bool,
    },
}

/// On-disk plan: what the student has to fit into their week.
#[derive(Debug, Deserialize)]
struct Plan {
    #[serde(default)]
    commitments: Vec<FixedCommitment>,
    #[serde(default)]
    tasks: Vec<Task>,
    /// Overrides the config file when present
    #[serde(default)]
    preferences: Option<Preferences>,
}

fn parse_now(raw: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("invalid datetime '{raw}', expected YYYY-MM-DDTHH:MM[:SS]"))
}

fn load_input(path: &Path, now: Option<NaiveDateTime>) -> Result<SchedulingInput, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read plan {}: {e}", path.display()))?;
    let plan: Plan = serde_json::from_str(&content)
        .map_err(|e| format!("invalid plan {}: {e}", path.display()))?;

    let config = Config::load_or_default();
    let now = now.unwrap_or_else(|| chrono::Local::now().naive_local());
    tracing::debug!(plan = %path.display(), %now, "loaded plan");

    let input = SchedulingInput::new(now)
        .with_commitments(plan.commitments)
        .with_tasks(plan.tasks)
        .with_preferences(plan.preferences.unwrap_or(config.preferences))
        .with_ranking(config.ranking);
    input.validate()?;
    Ok(input)
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Generate { plan, now, json } => {
            let input = load_input(&plan, now)?;
            let report = studytime_core::generate_schedule(&input);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        ScheduleAction::Free { plan, now, json } => {
            let input = load_input(&plan, now)?;
            let availability = StudyScheduler::new(input.preferences.clone()).build_availability(
                &input.commitments,
                &input.tasks,
                input.now,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&availability)?);
            } else {
                print_availability(&availability);
            }
        }
    }
    Ok(())
}

fn urgency_label(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Overdue => "overdue",
        Urgency::DueToday => "due today",
        Urgency::DueTomorrow => "due tomorrow",
        Urgency::Normal => "",
    }
}

fn day_header(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}

fn print_report(report: &ScheduleReport) {
    println!("Schedule generated at {}", report.generated_at.format("%Y-%m-%d %H:%M"));

    let mut current: Option<NaiveDate> = None;
    for event in &report.events {
        if current != Some(event.date) {
            println!();
            println!("{}", day_header(event.date));
            current = Some(event.date);
        }

        let span = if event.duration_minutes == 0 {
            format!("{}      ", event.start.format("%H:%M"))
        } else {
            format!("{}-{}", event.start.format("%H:%M"), event.end.format("%H:%M"))
        };
        let note = match event.status {
            ScheduleStatus::Scheduled => urgency_label(event.urgency),
            _ => "",
        };
        println!(
            "  {span}  {:<40} [{}] {note}",
            event.title,
            event.difficulty.label()
        );
    }

    let s = report.summary;
    println!();
    println!(
        "{} tasks: {} scheduled, {} incomplete, {} overdue, {} exams",
        s.total, s.scheduled, s.incomplete, s.overdue, s.exams
    );
}

fn print_availability(availability: &AvailabilityMap) {
    if availability.is_empty() {
        println!("No free time before the latest pending deadline");
        return;
    }

    for (date, intervals) in availability.iter() {
        let slots: Vec<String> = intervals
            .iter()
            .map(|iv| format!("{}-{}", iv.start.format("%H:%M"), iv.end.format("%H:%M")))
            .collect();
        println!(
            "{}  {:>4} min  {}",
            day_header(date),
            availability.free_minutes(date),
            slots.join(", ")
        );
    }
    println!("Total: {} min", availability.total_free_minutes());
}
