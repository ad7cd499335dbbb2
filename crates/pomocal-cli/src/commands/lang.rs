use clap::Subcommand;
use pomocal_core::{Database, Language};

#[derive(Subcommand)]
pub enum LangAction {
    /// Print the current language
    Get,
    /// Set the language (en or zh)
    Set {
        language: Language,
    },
    /// Switch between en and zh
    Toggle,
}

pub fn run(action: LangAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open()?;

    match action {
        LangAction::Get => {
            println!("{}", Language::load(&db));
        }
        LangAction::Set { language } => {
            language.save(&mut db)?;
            println!("{language}");
        }
        LangAction::Toggle => {
            let language = Language::load(&db).toggled();
            language.save(&mut db)?;
            println!("{language}");
        }
    }
    Ok(())
}
