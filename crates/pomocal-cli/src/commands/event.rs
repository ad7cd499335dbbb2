//! Event management commands for CLI.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use pomocal_core::calendar::parse_date;
use pomocal_core::Event;

use super::{open_store, warn_if_volatile};

#[derive(Subcommand)]
pub enum EventAction {
    /// Add an event
    Add {
        /// Event title
        title: String,
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List events
    List {
        /// Only events on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List today's events
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle the done flag of an event
    Toggle {
        /// Event ID
        id: String,
    },
}

fn resolve_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn print_events(events: &[&Event], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(events)?);
        return Ok(());
    }
    if events.is_empty() {
        println!("No events.");
        return Ok(());
    }
    for event in events {
        println!("{}", format_event(event));
    }
    Ok(())
}

pub fn format_event(event: &Event) -> String {
    let mark = if event.done { "x" } else { " " };
    format!("[{mark}] {}  {}  ({})", event.date, event.title, event.id)
}

pub fn run(action: EventAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store()?;

    match action {
        EventAction::Add { title, date } => {
            let date = resolve_date(date.as_deref())?;
            let Some(event) = store.add(&title, date) else {
                return Err("nothing added: title is empty".into());
            };
            println!("Event added: {}", format_event(event));
            warn_if_volatile(&store);
        }
        EventAction::List { date, json } => {
            let events: Vec<&Event> = match date {
                Some(d) => store.events_on(parse_date(&d)?),
                None => store.events().iter().collect(),
            };
            print_events(&events, json)?;
        }
        EventAction::Today { json } => {
            print_events(&store.today(), json)?;
        }
        EventAction::Toggle { id } => {
            if !store.toggle_done(&id) {
                return Err(format!("no event with id: {id}").into());
            }
            if let Some(event) = store.get(&id) {
                println!("{}", format_event(event));
            }
            warn_if_volatile(&store);
        }
    }
    Ok(())
}
