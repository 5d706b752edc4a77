//! Terminal prompts built on `dialoguer`.
//!
//! Pressing Esc on a selection cancels the whole run.

use dialoguer::{theme::ColorfulTheme, Input, Select};

use create_openfort::error::{Error, Result};
use create_openfort::framework::{Template, THEMES};
use create_openfort::keys::{self, KeyKind};
use create_openfort::package_name::is_valid_name;
use create_openfort::prompt::{OverwritePolicy, Prompter};

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt {
        message: e.to_string(),
    }
}

/// Interactive terminal session.
pub struct Interactive {
    theme: ColorfulTheme,
    /// Whether key and endpoint answers are checked
    validate: bool,
}

impl Interactive {
    pub fn new(validate: bool) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            validate,
        }
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or_else(Error::cancelled)
    }

    fn yes_no(&self, prompt: &str, options: [(bool, &str, &str); 2]) -> Result<bool> {
        let items: Vec<String> = options
            .iter()
            .map(|(_, label, hint)| format!("{} ({})", label, hint))
            .collect();
        let index = self.select(prompt, &items, 0)?;
        Ok(options[index].0)
    }

    pub fn template(&self, invalid_arg: Option<&str>) -> Result<Template> {
        let prompt = match invalid_arg {
            Some(name) => format!("\"{}\" isn't a valid template. Please choose from below: ", name),
            None => "Select a template:".to_string(),
        };
        let items: Vec<String> = Template::ALL
            .iter()
            .map(|template| format!("{} ({})", template.display(), template.hint()))
            .collect();
        let index = self.select(&prompt, &items, 0)?;
        Ok(Template::ALL[index])
    }

    pub fn automatic_recovery(&self) -> Result<bool> {
        self.yes_no(
            "Do you want to create a backend for automatic account recovery?",
            [
                (true, "Yes", "Better user experience"),
                (false, "No", "Users will recover their account with a password or passkey"),
            ],
        )
    }

    /// `true` when a sample backend should be created.
    pub fn create_backend(&self) -> Result<bool> {
        self.yes_no(
            "Do you already have a backend to create an encryption session?",
            [
                (true, "No", "We will create a sample backend for you"),
                (
                    false,
                    "Yes",
                    "You will need to provide an endpoint to create an encryption session",
                ),
            ],
        )
    }

    pub fn api_endpoint(&self, placeholder: &str) -> Result<String> {
        let validate = self.validate;
        Input::<String>::with_theme(&self.theme)
            .with_prompt("Please provide your API endpoint to create an encryption session")
            .default(placeholder.to_string())
            .validate_with(move |value: &String| -> std::result::Result<(), String> {
                if !validate {
                    return Ok(());
                }
                if value.is_empty() {
                    return Err("API endpoint is required".to_string());
                }
                keys::validate_endpoint(value)
            })
            .interact_text()
            .map_err(prompt_error)
    }

    pub fn theme(&self) -> Result<String> {
        let items: Vec<String> = THEMES.iter().map(|(_, label)| label.to_string()).collect();
        let index = self.select("Select a theme:", &items, 0)?;
        Ok(THEMES[index].0.to_string())
    }

    pub fn key(&self, kind: KeyKind) -> Result<String> {
        let validate = self.validate;
        Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("{} ({})", kind.label(), kind.placeholder()))
            .validate_with(move |value: &String| -> std::result::Result<(), String> {
                if validate {
                    keys::validate_key(kind, value)
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map_err(prompt_error)
    }
}

impl Prompter for Interactive {
    fn project_name(&self, default: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt("Project name")
            .default(default.to_string())
            .interact_text()
            .map_err(prompt_error)
    }

    fn overwrite_policy(&self, target: &str) -> Result<OverwritePolicy> {
        let options = [
            (OverwritePolicy::Abort, "Cancel operation"),
            (OverwritePolicy::Purge, "Remove existing files and continue"),
            (OverwritePolicy::Keep, "Ignore files and continue"),
        ];
        let items: Vec<String> = options.iter().map(|(_, label)| label.to_string()).collect();
        let prompt = format!("{} is not empty. Please choose how to proceed:", target);
        let index = self.select(&prompt, &items, 0)?;
        Ok(options[index].0)
    }

    fn package_name(&self, suggested: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt("Package name")
            .default(suggested.to_string())
            .validate_with(|value: &String| -> std::result::Result<(), String> {
                if value.is_empty() || is_valid_name(value) {
                    Ok(())
                } else {
                    Err("Invalid package.json name".to_string())
                }
            })
            .interact_text()
            .map_err(prompt_error)
    }
}
