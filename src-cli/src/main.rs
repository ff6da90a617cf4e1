mod app;
mod commands;
mod error;
mod repl;

use app::App;
use error::CliError;
use studio_engine::STUDIOS;
use studio_store::{EnvDefaults, StudioKind};
use studio_upload::UploadConfig;

const USAGE: &str = "\
Usage: creative-studio [COMMAND]

Commands:
  <studio>        open a studio session (text, code, document, creative)
  studios         list the available studios
  projects [--studio <s>] [q]
                  list saved projects, optionally filtered by studio and q
  serve-uploads   run the file upload server
  help            show this message

With no command, the default studio from your profile is opened.";

#[tokio::main]
async fn main() {
    // Initialize logging - RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<(), CliError> {
    let command = args.first().map(String::as_str);
    match command {
        None => {
            let mut app = App::open(EnvDefaults::from_env()).await?;
            let studio = app.default_studio().await?;
            repl::run(&mut app, studio).await
        }
        Some("help" | "-h" | "--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some("-V" | "--version") => {
            println!("creative-studio {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some("studios") => {
            for studio in STUDIOS.iter() {
                println!("{:<10} {}", studio.kind.id(), studio.description);
            }
            Ok(())
        }
        Some("projects") => {
            let app = App::open(EnvDefaults::from_env()).await?;
            let filter = commands::project_filter(args[1..].iter().map(String::as_str))
                .map_err(|e| CliError::Usage(e.to_string()))?;
            repl::print_projects(&app.projects.search(&filter).await?);
            Ok(())
        }
        Some("serve-uploads") => {
            let (_, handle) = studio_upload::serve(UploadConfig::from_env()).await?;
            if let Err(e) = handle.await {
                log::error!("Upload server task failed: {}", e);
            }
            Ok(())
        }
        Some(other) => match other.parse::<StudioKind>() {
            Ok(studio) => {
                let mut app = App::open(EnvDefaults::from_env()).await?;
                repl::run(&mut app, studio).await
            }
            Err(_) => Err(CliError::Usage(format!(
                "unknown command '{}'\n\n{}",
                other, USAGE
            ))),
        },
    }
}
