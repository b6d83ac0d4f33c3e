use crate::demo::{run_demo, DemoArgs};
use crate::inspect::{
    discard_draft, print_document_checklist, print_eligibility, show_draft, DocumentsArgs,
    EligibilityArgs,
};
use childcare_subsidy::config::AppConfig;
use childcare_subsidy::error::AppError;
use childcare_subsidy::telemetry;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Childcare Subsidy Intake",
    about = "Walk through and inspect childcare subsidy application drafts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scripted application wizard end to end (default command)
    Demo(DemoArgs),
    /// Estimate the household's federal poverty level percentage
    Eligibility(EligibilityArgs),
    /// List the documents an application must include
    Documents(DocumentsArgs),
    /// Inspect or remove the stored application draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Print the stored draft's progress
    Show,
    /// Delete the stored draft without submitting it
    Discard,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Demo(args) => run_demo(&config, args),
        Command::Eligibility(args) => {
            print_eligibility(&config, args);
            Ok(())
        }
        Command::Documents(args) => {
            print_document_checklist(args);
            Ok(())
        }
        Command::Draft {
            command: DraftCommand::Show,
        } => show_draft(&config),
        Command::Draft {
            command: DraftCommand::Discard,
        } => discard_draft(&config),
    }
}
