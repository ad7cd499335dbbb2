use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "pomocal", version, about = "Pomocal focus timer and calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Dated events and today's tasks
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Month view of events
    Calendar(commands::calendar::CalendarArgs),
    /// UI language preference
    Lang {
        #[command(subcommand)]
        action: commands::lang::LangAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Event { action } => commands::event::run(action),
        Commands::Calendar(args) => commands::calendar::run(args),
        Commands::Lang { action } => commands::lang::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pomocal", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
