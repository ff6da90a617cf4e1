//! Interactive studio session on the terminal.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

use studio_engine::{
    GenerateOutcome, GenerationState, NotificationLevel, SelectedFile, StudioEvent, StudioSession,
};
use studio_store::{Project, StudioKind, UserPatch};

use crate::app::App;
use crate::commands::{self, Command, SettingField, HELP};
use crate::error::CliError;

enum Flow {
    Continue,
    Quit,
}

/// Run a session for `studio` until `:quit` or end of input.
pub async fn run(app: &mut App, studio: StudioKind) -> Result<(), CliError> {
    let mut session = app.session(studio).await?;
    let mut events = app.events.subscribe();
    print_banner(app, &session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt_marker(&session).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let result = if session.state() == GenerationState::AwaitingCredential
            && !line.trim_start().starts_with(':')
        {
            submit_key(&mut session, &line).await
        } else {
            match commands::parse(&line) {
                Ok(Some(command)) => handle(app, &mut session, command).await,
                Ok(None) => Ok(Flow::Continue),
                Err(e) => {
                    println!("{}", e);
                    Ok(Flow::Continue)
                }
            }
        };

        drain_events(&mut events);
        match result {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => println!("error: {}", e),
        }
    }
    Ok(())
}

async fn handle(app: &mut App, session: &mut StudioSession, command: Command) -> Result<Flow, CliError> {
    match command {
        Command::Prompt(prompt) => {
            session.set_prompt(prompt);
            generate(session).await?;
        }
        Command::Generate => generate(session).await?,
        Command::Title(title) => session.set_title(title),
        Command::Attach(paths) => {
            let mut files = Vec::with_capacity(paths.len());
            for path in paths {
                files.push(SelectedFile::from_path(path).await?);
            }
            let outcome = session.attach(files)?;
            println!(
                "Attached {} file(s); {} pending.",
                outcome.accepted,
                session.attachments().len()
            );
        }
        Command::Detach(index) => match session.detach(index) {
            Some(file) => println!("Removed {}", file.name),
            None => println!("No attachment {}", index + 1),
        },
        Command::Files => print_files(session),
        Command::Temperature(value) => {
            println!("temperature = {}", session.settings_mut().set_temperature(value))
        }
        Command::MaxTokens(value) => {
            println!("max tokens = {}", session.settings_mut().set_max_tokens(value))
        }
        Command::TopP(value) => println!("top-p = {}", session.settings_mut().set_top_p(value)),
        Command::Examples => {
            for (i, example) in session.descriptor().examples.iter().enumerate() {
                println!("  {}. {}", i + 1, example);
            }
        }
        Command::Example(index) => {
            let prompt = session.use_example(index)?;
            println!("Prompt: {}", prompt);
        }
        Command::Show => print_form(session),
        Command::Save => {
            let project = session.save().await?;
            println!("Saved {} ({})", project.title, project.id);
        }
        Command::Export(path) => {
            session.export_generated(&path).await?;
            println!("Wrote {}", path.display());
        }
        Command::Projects(filter) => {
            print_projects(&app.projects.search(&filter).await?);
        }
        Command::Delete(id) => {
            let existed = app.projects.get_by_id(&id).await?.is_some();
            app.projects.delete(&id).await?;
            if existed {
                println!("Deleted {}", id);
            } else {
                println!("No project {}", id);
            }
        }
        Command::Key(key) => {
            submit_key(session, &key).await?;
        }
        Command::ClearKey => {
            app.credentials.clear();
            println!("API key cleared.");
        }
        Command::Cancel => session.dismiss_credential_prompt(),
        Command::Reset => session.reset(),
        Command::Settings => print_settings(app),
        Command::Set(field, value) => {
            let settings = &mut app.settings;
            match field {
                SettingField::ApiUrl => settings.api_url = value,
                SettingField::AppName => settings.app_name = value,
                SettingField::Version => settings.version = value,
                SettingField::Environment => settings.environment = value,
            }
            app.save_settings().await?;
            if field == SettingField::ApiUrl {
                *session = rebuild(app, session).await?;
            }
            println!("Settings saved successfully!");
        }
        Command::Login(email) => {
            let user = app.users.login(&email).await?;
            *session = rebuild(app, session).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Logout => {
            app.users.logout().await?;
            *session = rebuild(app, session).await?;
            println!("Signed out.");
        }
        Command::Name(name) => {
            let user = app
                .users
                .update(UserPatch {
                    name: Some(name),
                    ..UserPatch::default()
                })
                .await?;
            println!("Name set to {}", user.name);
        }
        Command::DefaultStudio(studio) => {
            let mut preferences = app.users.me().await?.preferences;
            preferences.default_studio = studio;
            app.users
                .update(UserPatch {
                    preferences: Some(preferences),
                    ..UserPatch::default()
                })
                .await?;
            println!("Default studio set to {}", studio);
        }
        Command::WhoAmI => {
            let user = app.users.me().await?;
            println!(
                "{} <{}> (default studio: {})",
                user.name, user.email, user.preferences.default_studio
            );
        }
        Command::ClearData => {
            app.clear_data().await?;
            *session = app.session(session.studio()).await?;
            println!("All data cleared. You have been logged out.");
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn generate(session: &mut StudioSession) -> Result<(), CliError> {
    if !session.can_generate() {
        println!("Enter a prompt first.");
        return Ok(());
    }
    if !session.credentials().is_required() {
        println!("Generating...");
    }
    let outcome = session.generate().await?;
    print_outcome(session, outcome);
    Ok(())
}

async fn submit_key(session: &mut StudioSession, key: &str) -> Result<Flow, CliError> {
    if let Some(outcome) = session.submit_credential(key).await? {
        print_outcome(session, outcome);
    }
    Ok(Flow::Continue)
}

/// New session for the same studio carrying over the form
async fn rebuild(app: &App, old: &StudioSession) -> Result<StudioSession, CliError> {
    let mut session = app.session(old.studio()).await?;
    session.set_title(old.title());
    session.set_prompt(old.prompt());
    *session.settings_mut() = *old.settings();
    if !old.attachments().is_empty() {
        println!("Attachments were cleared.");
    }
    Ok(session)
}

fn print_outcome(session: &StudioSession, outcome: GenerateOutcome) {
    match outcome {
        GenerateOutcome::AwaitingCredential => {}
        GenerateOutcome::Generated | GenerateOutcome::Failed => {
            println!("\n{}\n", session.content());
            if session.can_save() {
                println!("Use :save to keep this as a project.");
            } else if outcome == GenerateOutcome::Generated && session.title().trim().is_empty() {
                println!("Set a :title to save this as a project.");
            }
        }
    }
}

fn drain_events(events: &mut broadcast::Receiver<StudioEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => render_event(&event),
            Err(TryRecvError::Lagged(skipped)) => {
                log::debug!("Skipped {} studio events", skipped);
            }
            Err(_) => break,
        }
    }
}

fn render_event(event: &StudioEvent) {
    match event {
        StudioEvent::Notification { level, message, .. } => {
            let tag = match level {
                NotificationLevel::Info => "info",
                NotificationLevel::Success => "ok",
                NotificationLevel::Error => "error",
            };
            println!("[{}] {}", tag, message);
        }
        StudioEvent::CredentialRequested { .. } => {
            println!("An API key is required. Enter it below, or :cancel.");
        }
        _ => {}
    }
}

async fn prompt_marker(session: &StudioSession) -> Result<(), CliError> {
    let marker = if session.state() == GenerationState::AwaitingCredential {
        "api key> ".to_string()
    } else {
        format!("{}> ", session.studio())
    };
    let mut stdout = tokio::io::stdout();
    stdout.write_all(marker.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

fn print_banner(app: &App, session: &StudioSession) {
    let studio = session.descriptor();
    println!("{} {} ({})", app.settings.app_name, app.settings.version, app.settings.environment);
    println!("{}: {}", studio.name, studio.description);
    println!("{}", studio.placeholder);
    if session.credentials().is_required() {
        println!("No API key set; you will be asked for one on first generate.");
    }
    println!("Type :help for commands.\n");
}

fn print_files(session: &StudioSession) {
    let attachments = session.attachments();
    if attachments.is_empty() {
        println!("No attachments. Accepted: {}", attachments.policy().accepted_types);
        return;
    }
    for (i, file) in attachments.files().iter().enumerate() {
        println!("  {}. {} ({} bytes, {})", i + 1, file.name, file.size, file.mime_type);
    }
}

fn print_form(session: &StudioSession) {
    let settings = session.settings();
    println!("Title:   {}", session.title());
    println!("Prompt:  {}", session.prompt());
    println!(
        "Settings: temperature {}, max tokens {}, top-p {}",
        settings.temperature(),
        settings.max_tokens(),
        settings.top_p()
    );
    println!("Attachments: {}", session.attachments().len());
    if !session.content().is_empty() {
        println!("\n{}\n", session.content());
    }
}

fn print_settings(app: &App) {
    let settings = &app.settings;
    println!("api-url:     {}", settings.api_url);
    println!("app-name:    {}", settings.app_name);
    println!("version:     {}", settings.version);
    println!("environment: {}", settings.environment);
    println!("model:       {}", app.api_config().model);
    println!(
        "api key:     {}",
        if app.credentials.is_required() { "not set" } else { "set for this session" }
    );
}

/// One line per project, newest last
pub fn print_projects(projects: &[Project]) {
    if projects.is_empty() {
        println!("No projects yet.");
        return;
    }
    for project in projects {
        println!(
            "{}  {:<8}  {}  {}",
            project.id,
            project.studio.id(),
            project.updated_date.format("%Y-%m-%d %H:%M"),
            if project.title.is_empty() { "(untitled)" } else { project.title.as_str() }
        );
    }
}
