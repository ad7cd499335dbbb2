//! Foreground focus timer.
//!
//! The timer session lives only as long as this command runs. Input is
//! read line by line from stdin while the driver ticks in the background.

use std::io::Write;

use chrono::Local;
use clap::Subcommand;
use pomocal_core::timer::format_clock;
use pomocal_core::{
    Config, Database, Event, EventStore, Phase, TimerDriver, TimerEvent, TimerSession,
    TimerSnapshot,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::event::format_event;
use super::{open_store, warn_if_volatile};

const HELP: &str = "commands: p pause/start | f focus | s short break | l long break | r reset | \
t today | a <title> add today | x <n> toggle today #n | q quit";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer in the foreground, reading commands from stdin
    Run {
        /// Phase to begin with: focus, short or long
        #[arg(long, default_value = "focus")]
        phase: Phase,
        /// Start counting immediately
        #[arg(long)]
        start: bool,
        /// Do not start the next phase automatically
        #[arg(long)]
        no_auto_resume: bool,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show the configured phase durations
    Durations {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Toggle,
    Select(Phase),
    Reset,
    Today,
    Add(String),
    ToggleToday(usize),
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match cmd {
        "" | "p" => Input::Toggle,
        "f" => Input::Select(Phase::Focus),
        "s" => Input::Select(Phase::ShortBreak),
        "l" => Input::Select(Phase::LongBreak),
        "r" => Input::Reset,
        "t" => Input::Today,
        "a" => Input::Add(rest.to_string()),
        "x" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Input::ToggleToday(n),
            _ => Input::Unknown(line.to_string()),
        },
        "q" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

fn describe(event: &TimerEvent) -> Option<String> {
    let text = match event {
        TimerEvent::TimerStarted { phase, remaining_secs, .. } => {
            format!("{phase} started, {} left", format_clock(*remaining_secs))
        }
        TimerEvent::TimerPaused { phase, remaining_secs, .. } => {
            format!("{phase} paused at {}", format_clock(*remaining_secs))
        }
        TimerEvent::AutoResumed { phase, .. } => format!("{phase} started automatically"),
        TimerEvent::PhaseSelected { phase, duration_secs, .. } => {
            format!("switched to {phase} ({})", format_clock(*duration_secs))
        }
        TimerEvent::TimerReset { phase, duration_secs, .. } => {
            format!("{phase} reset to {}", format_clock(*duration_secs))
        }
        TimerEvent::PhaseCompleted {
            completed,
            next,
            completed_focus_count,
            ..
        } => format!("{completed} complete, next: {next} (cycles: {completed_focus_count})"),
        TimerEvent::StateSnapshot(_) => return None,
    };
    Some(text)
}

fn status_line(snap: &TimerSnapshot) -> String {
    let state = if snap.is_running { "running" } else { "paused" };
    format!(
        "{:<11} {}  {:>3.0}%  {state}  cycles: {}",
        snap.phase.label(),
        snap.clock,
        snap.progress * 100.0,
        snap.completed_focus_count
    )
}

/// Replies to stdin commands, as emitted in `--json` mode.
#[derive(Serialize)]
#[serde(tag = "type")]
enum Notice<'a> {
    Message { text: &'a str },
    EventAdded { event: &'a Event },
    Today { events: Vec<&'a Event> },
}

/// Terminal output. The status line is redrawn in place; with `json` every
/// stdout line is a JSON object instead.
struct View {
    json: bool,
    status_open: bool,
}

type ViewResult = Result<(), Box<dyn std::error::Error>>;

impl View {
    fn status(&mut self, snap: &TimerSnapshot) -> std::io::Result<()> {
        if self.json {
            return Ok(());
        }
        let mut out = std::io::stdout().lock();
        write!(out, "\r{}   ", status_line(snap))?;
        out.flush()?;
        self.status_open = true;
        Ok(())
    }

    fn print(&mut self, text: &str) {
        if self.status_open {
            println!();
            self.status_open = false;
        }
        println!("{text}");
    }

    fn json_line<T: Serialize>(&mut self, value: &T) -> ViewResult {
        println!("{}", serde_json::to_string(value)?);
        Ok(())
    }

    fn message(&mut self, text: &str) -> ViewResult {
        if self.json {
            return self.json_line(&Notice::Message { text });
        }
        self.print(text);
        Ok(())
    }

    fn added(&mut self, event: &Event) -> ViewResult {
        if self.json {
            return self.json_line(&Notice::EventAdded { event });
        }
        self.print(&format!("added: {}", format_event(event)));
        Ok(())
    }

    fn event(&mut self, event: &TimerEvent) -> ViewResult {
        if self.json {
            return self.json_line(event);
        }
        match event {
            TimerEvent::StateSnapshot(snap) => self.status(snap)?,
            other => {
                if let Some(text) = describe(other) {
                    self.print(&text);
                }
            }
        }
        Ok(())
    }

    fn today(&mut self, store: &EventStore<Database>) -> ViewResult {
        let today = store.today();
        if self.json {
            return self.json_line(&Notice::Today { events: today });
        }
        if today.is_empty() {
            self.print("No events today.");
            return Ok(());
        }
        self.print("Today:");
        for (i, event) in today.iter().enumerate() {
            self.print(&format!("{:>3}. {}", i + 1, format_event(event)));
        }
        Ok(())
    }
}

struct RunOptions {
    phase: Phase,
    start: bool,
    no_auto_resume: bool,
    json: bool,
}

async fn run_foreground(opts: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Config::load()?.timer_settings();
    if opts.no_auto_resume {
        settings.auto_resume = false;
    }
    let mut store = open_store()?;
    let (driver, mut events) = TimerDriver::new(TimerSession::new(settings));
    let mut view = View {
        json: opts.json,
        status_open: false,
    };

    if opts.phase != Phase::Focus {
        driver.select_phase(opts.phase);
    }
    if opts.start {
        driver.toggle_run();
    }
    if opts.json {
        view.json_line(&TimerEvent::StateSnapshot(driver.snapshot()))?;
    } else {
        view.print(HELP);
        view.today(&store)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    debug!("stdin closed, timer keeps running until interrupted");
                    stdin_open = false;
                    continue;
                };
                let input = parse_input(&line);
                debug!(?input, "timer input");
                match input {
                    Input::Quit => break,
                    Input::Toggle => {
                        if driver.toggle_run().is_none() {
                            view.message("nothing left to run in this phase")?;
                        }
                    }
                    Input::Select(phase) => {
                        driver.select_phase(phase);
                    }
                    Input::Reset => {
                        driver.reset();
                    }
                    Input::Today => {
                        store.reload();
                        view.today(&store)?;
                    }
                    Input::Add(title) => {
                        // Other `pomocal` processes may have written since.
                        store.reload();
                        match store.add(&title, Local::now().date_naive()) {
                            Some(event) => view.added(event)?,
                            None => view.message("nothing added: title is empty")?,
                        }
                        warn_if_volatile(&store);
                    }
                    Input::ToggleToday(n) => {
                        store.reload();
                        let id = store.today().get(n - 1).map(|e| e.id.clone());
                        match id {
                            Some(id) => {
                                store.toggle_done(&id);
                                view.today(&store)?;
                                warn_if_volatile(&store);
                            }
                            None => view.message(&format!("no event #{n} today"))?,
                        }
                    }
                    Input::Unknown(cmd) => {
                        view.message(&format!("unknown command: {cmd}"))?;
                        if !view.json {
                            view.print(HELP);
                        }
                    }
                }
            }
            Some(event) = events.recv() => view.event(&event)?,
            _ = tokio::signal::ctrl_c() => break,
        }
        view.status(&driver.snapshot())?;
    }

    driver.shutdown();
    if view.status_open {
        println!();
    }
    Ok(())
}

#[derive(Serialize)]
struct DurationsView {
    focus: String,
    short_break: String,
    long_break: String,
    long_break_interval: u32,
    auto_resume: bool,
    auto_resume_delay_secs: u64,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            phase,
            start,
            no_auto_resume,
            json,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(run_foreground(RunOptions {
                phase,
                start,
                no_auto_resume,
                json,
            }));
            // A pending stdin read must not keep the process alive.
            runtime.shutdown_background();
            result
        }
        TimerAction::Durations { json } => {
            let settings = Config::load()?.timer_settings();
            let d = settings.durations;
            let view = DurationsView {
                focus: format_clock(d.duration_of(Phase::Focus)),
                short_break: format_clock(d.duration_of(Phase::ShortBreak)),
                long_break: format_clock(d.duration_of(Phase::LongBreak)),
                long_break_interval: settings.long_break_interval,
                auto_resume: settings.auto_resume,
                auto_resume_delay_secs: settings.auto_resume_delay.as_secs(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                for phase in Phase::ALL {
                    println!("{:<11} {}", phase.label(), format_clock(d.duration_of(phase)));
                }
                println!("long break every {} focus phases", view.long_break_interval);
                if view.auto_resume {
                    println!("next phase starts after {}s", view.auto_resume_delay_secs);
                } else {
                    println!("next phase waits for you");
                }
            }
            Ok(())
        }
    }
}
