//! Parsing of typed commands and form validation.

use client_core::FormInput;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Logout,
    Company(String),
    Website(String),
    Submit,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}'; type `help` for a list")]
    UnknownCommand(String),
    #[error("`{0}` needs a value")]
    MissingArgument(&'static str),
    #[error("Company name is required")]
    CompanyNameRequired,
    #[error("Website URL is required")]
    WebsiteRequired,
    #[error("Website URL must be an absolute http(s) URL")]
    WebsiteNotUrl,
}

pub const HELP: &str = "\
Commands:
  login             sign in
  logout            sign out
  company <name>    set the company name
  website <url>     set the website URL
  submit            enrich the lead
  show              redraw the view
  help              this list
  quit              exit";

pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "login" => Command::Login,
        "logout" => Command::Logout,
        "company" => Command::Company(required(rest, "company")?),
        "website" => Command::Website(required(rest, "website")?),
        "submit" => Command::Submit,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(InputError::UnknownCommand(word.to_string())),
    };
    Ok(Some(command))
}

fn required(value: &str, command: &'static str) -> Result<String, InputError> {
    if value.is_empty() {
        Err(InputError::MissingArgument(command))
    } else {
        Ok(value.to_string())
    }
}

/// The form's required and URL-shaped checks.
pub fn validate_form(form: &FormInput) -> Result<(), InputError> {
    if form.company_name.trim().is_empty() {
        return Err(InputError::CompanyNameRequired);
    }
    let website = form.website_url.trim();
    if website.is_empty() {
        return Err(InputError::WebsiteRequired);
    }
    match Url::parse(website) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(InputError::WebsiteNotUrl),
    }
}
