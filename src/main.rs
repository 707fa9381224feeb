use clap::Parser;
use repovault::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    repovault::logging::init();

    let result = match cli.command {
        Commands::Set {
            ref repo,
            ref key,
            ref value,
        } => commands::set::execute(&cli, repo, key, value.as_deref()),
        Commands::Import {
            ref repo,
            ref file,
            ref format,
        } => commands::import_cmd::execute(&cli, repo, file, format.as_deref()),
        Commands::Reveal { ref record_id } => commands::reveal::execute(&cli, record_id),
        Commands::Get { ref repo, ref key } => commands::get::execute(&cli, repo, key),
        Commands::List { ref repo } => commands::list::execute(&cli, repo),
        Commands::DeleteRepo { ref repo, force } => {
            commands::delete_repo::execute(&cli, repo, force)
        }
        Commands::Activity { last, ref since } => {
            commands::activity_cmd::execute(&cli, last, since.as_deref())
        }
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
