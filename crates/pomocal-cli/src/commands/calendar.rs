use chrono::{Datelike, Local};
use clap::Args;
use pomocal_core::{GridDay, Language, Month, MonthGrid};

use super::event::format_event;
use super::open_store;

#[derive(Args)]
pub struct CalendarArgs {
    /// Month as YYYY-MM (default: current month)
    #[arg(long)]
    month: Option<String>,
    /// Shift the month by this many months (negative for earlier)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset: i32,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

const WEEKDAYS_EN: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const WEEKDAYS_ZH: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];
const CELL_WIDTH: usize = 7;

fn pad(text: &str) -> String {
    // Wide CJK glyphs take two columns.
    let columns: usize = text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
    format!("{text}{}", " ".repeat(CELL_WIDTH.saturating_sub(columns)))
}

fn cell(day: &GridDay) -> String {
    let number = day.date.day().to_string();
    let mut text = if day.is_today {
        format!("[{number}]")
    } else if day.in_month {
        number
    } else {
        format!("({number})")
    };
    let open = day.events.iter().filter(|e| !e.done).count();
    if open > 0 {
        text.push_str(&format!("*{open}"));
    }
    pad(&text)
}

pub fn render(grid: &MonthGrid, language: Language) -> String {
    let weekdays = match language {
        Language::En => WEEKDAYS_EN,
        Language::Zh => WEEKDAYS_ZH,
    };
    let mut out = String::new();
    out.push_str(&grid.month.label(language));
    out.push('\n');
    for name in weekdays {
        out.push_str(&pad(name));
    }
    out.push('\n');
    for week in grid.weeks() {
        for day in week {
            out.push_str(&cell(day));
        }
        out.push('\n');
    }

    let listed: Vec<_> = grid
        .days
        .iter()
        .filter(|d| d.in_month)
        .flat_map(|d| d.events.iter())
        .collect();
    if !listed.is_empty() {
        out.push('\n');
        for event in listed {
            out.push_str(&format_event(event));
            out.push('\n');
        }
    }
    out
}

pub fn run(args: CalendarArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let today = Local::now().date_naive();
    let base = match args.month {
        Some(m) => m.parse::<Month>()?,
        None => Month::containing(today),
    };
    let month = base
        .offset(args.offset)
        .ok_or_else(|| format!("month offset {} from {base} is out of range", args.offset))?;
    let grid = MonthGrid::build(month, &store, today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
    } else {
        let language = Language::load(store.storage());
        print!("{}", render(&grid, language));
    }
    Ok(())
}
