//! Parsing of interactive session input.
//!
//! Lines starting with `:` are commands; anything else is a prompt.

use std::path::PathBuf;

use studio_store::{ProjectFilter, StudioKind, UnknownStudio};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown command ':{0}'. Type :help for a list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error(transparent)]
    Studio(#[from] UnknownStudio),
}

/// Settings field addressed by `:set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    ApiUrl,
    AppName,
    Version,
    Environment,
}

impl SettingField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "api-url" | "apiUrl" => Some(Self::ApiUrl),
            "app-name" | "appName" => Some(Self::AppName),
            "version" => Some(Self::Version),
            "environment" | "env" => Some(Self::Environment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the prompt and generate
    Prompt(String),
    /// Generate again with the current prompt
    Generate,
    Title(String),
    Attach(Vec<PathBuf>),
    Detach(usize),
    Files,
    Temperature(f32),
    MaxTokens(u32),
    TopP(f32),
    Examples,
    /// One-based example number
    Example(usize),
    Show,
    Save,
    Export(PathBuf),
    Projects(ProjectFilter),
    Delete(String),
    Key(String),
    ClearKey,
    Cancel,
    Reset,
    Settings,
    Set(SettingField, String),
    Login(String),
    Logout,
    Name(String),
    DefaultStudio(StudioKind),
    WhoAmI,
    ClearData,
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(arg: &str, usage: &'static str) -> Result<T, ParseError> {
    if arg.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    arg.parse().map_err(|_| ParseError::InvalidNumber(arg.to_string()))
}

fn required(arg: &str, usage: &'static str) -> Result<String, ParseError> {
    if arg.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(arg.to_string())
    }
}

/// Build a project filter from `[--studio <studio>] [search words...]`.
pub fn project_filter<'a>(
    args: impl IntoIterator<Item = &'a str>,
) -> Result<ProjectFilter, ParseError> {
    let mut filter = ProjectFilter::default();
    let mut words = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--studio" || arg == "-s" {
            let studio = args
                .next()
                .ok_or(ParseError::Usage("projects [--studio <studio>] [search]"))?;
            filter.studio = Some(studio.parse()?);
        } else {
            words.push(arg);
        }
    }
    if !words.is_empty() {
        filter.search = Some(words.join(" "));
    }
    Ok(filter)
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Some(Command::Prompt(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "generate" | "g" => Command::Generate,
        "title" => Command::Title(required(arg, ":title <text>")?),
        "attach" => {
            let paths: Vec<PathBuf> = arg.split_whitespace().map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err(ParseError::Usage(":attach <path> [path...]"));
            }
            Command::Attach(paths)
        }
        "detach" => {
            let n: usize = number(arg, ":detach <n>")?;
            if n == 0 {
                return Err(ParseError::Usage(":detach <n> (counting from 1)"));
            }
            Command::Detach(n - 1)
        }
        "files" => Command::Files,
        "temp" | "temperature" => Command::Temperature(number(arg, ":temp <0.0-1.0>")?),
        "tokens" => Command::MaxTokens(number(arg, ":tokens <100-2000>")?),
        "topp" | "top-p" => Command::TopP(number(arg, ":topp <0.0-1.0>")?),
        "examples" => Command::Examples,
        "example" => {
            let n: usize = number(arg, ":example <n>")?;
            if n == 0 {
                return Err(ParseError::Usage(":example <n> (counting from 1)"));
            }
            Command::Example(n - 1)
        }
        "show" => Command::Show,
        "save" => Command::Save,
        "export" => Command::Export(PathBuf::from(required(arg, ":export <path>")?)),
        "projects" | "ls" => Command::Projects(project_filter(arg.split_whitespace())?),
        "delete" | "rm" => Command::Delete(required(arg, ":delete <project id>")?),
        "key" => Command::Key(required(arg, ":key <api key>")?),
        "clear-key" => Command::ClearKey,
        "cancel" => Command::Cancel,
        "reset" => Command::Reset,
        "settings" => Command::Settings,
        "set" => {
            const USAGE: &str = ":set <api-url|app-name|version|environment> <value>";
            let (field, value) = arg.split_once(char::is_whitespace).ok_or(ParseError::Usage(USAGE))?;
            let field = SettingField::parse(field).ok_or(ParseError::Usage(USAGE))?;
            Command::Set(field, value.trim().to_string())
        }
        "login" => Command::Login(required(arg, ":login <email>")?),
        "logout" => Command::Logout,
        "name" => Command::Name(required(arg, ":name <display name>")?),
        "default-studio" => {
            Command::DefaultStudio(required(arg, ":default-studio <studio>")?.parse()?)
        }
        "whoami" => Command::WhoAmI,
        "clear-data" => Command::ClearData,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

pub const HELP: &str = "\
Type a prompt and press Enter to generate. Commands:
  :generate            generate again with the current prompt
  :title <text>        set the project title
  :attach <path>...    attach files to the next generation
  :detach <n>          remove attachment n
  :files               list attachments
  :temp <v>            temperature, 0.0-1.0
  :tokens <n>          max tokens, 100-2000
  :topp <v>            top-p, 0.0-1.0
  :examples            list example prompts
  :example <n>         use example prompt n
  :show                show the current form and output
  :save                save the output as a project
  :export <path>       write the output to a file
  :projects [--studio <s>] [search]
                       list saved projects
  :delete <id>         delete a project
  :key <key>           set the API key for this session
  :clear-key           forget the API key
  :cancel              dismiss the API key prompt
  :reset               clear the form
  :settings            show settings
  :set <field> <value> change api-url, app-name, version or environment
  :login <email>       sign in locally
  :logout              sign out
  :name <text>         change your display name
  :default-studio <s>  studio opened when none is named
  :whoami              show the current profile
  :clear-data          delete all stored data
  :quit                leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_prompt() {
        assert_eq!(
            parse("  Write a haiku ").unwrap(),
            Some(Command::Prompt("Write a haiku".to_string()))
        );
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse(":title My poem").unwrap(),
            Some(Command::Title("My poem".to_string()))
        );
        assert_eq!(
            parse(":attach a.txt b.md").unwrap(),
            Some(Command::Attach(vec![PathBuf::from("a.txt"), PathBuf::from("b.md")]))
        );
        assert_eq!(parse(":detach 2").unwrap(), Some(Command::Detach(1)));
        assert_eq!(parse(":tokens 500").unwrap(), Some(Command::MaxTokens(500)));
        assert_eq!(
            parse(":projects").unwrap(),
            Some(Command::Projects(ProjectFilter::default()))
        );
        assert_eq!(
            parse(":projects --studio code merge sort").unwrap(),
            Some(Command::Projects(ProjectFilter {
                search: Some("merge sort".to_string()),
                studio: Some(StudioKind::Code),
            }))
        );
        assert_eq!(
            parse(":default-studio code").unwrap(),
            Some(Command::DefaultStudio(StudioKind::Code))
        );
        assert_eq!(
            parse(":set api-url http://localhost:8080/v1").unwrap(),
            Some(Command::Set(
                SettingField::ApiUrl,
                "http://localhost:8080/v1".to_string()
            ))
        );
    }

    #[test]
    fn test_bad_input() {
        assert_eq!(parse(":frobnicate"), Err(ParseError::Unknown("frobnicate".to_string())));
        assert!(matches!(parse(":title"), Err(ParseError::Usage(_))));
        assert!(matches!(parse(":detach 0"), Err(ParseError::Usage(_))));
        assert_eq!(parse(":temp hot"), Err(ParseError::InvalidNumber("hot".to_string())));
        assert!(matches!(parse(":set colour blue"), Err(ParseError::Usage(_))));
        assert!(matches!(parse(":default-studio video"), Err(ParseError::Studio(_))));
        assert!(matches!(parse(":projects --studio"), Err(ParseError::Usage(_))));
        assert!(matches!(parse(":projects -s video"), Err(ParseError::Studio(_))));
    }
}
