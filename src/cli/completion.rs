//! Shell completion generation for typeahead
//!
//! Generates completion scripts for bash, zsh and fish, with dynamic
//! completion of lookup names taken from the config file.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ConfigError, LookupError, Result};

/// Generate shell completion script and print it
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    print!("{}", completion_script(shell)?);
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(LookupError::Config(ConfigError::Generic(format!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish",
            shell_name
        )))),
    }
}

/// Full script for `shell`: clap's output plus lookup-name completion
fn completion_script(shell: Shell) -> Result<String> {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, "typeahead", &mut buffer);
    let basic = String::from_utf8_lossy(&buffer);

    let extra = match shell {
        Shell::Bash => BASH_LOOKUPS,
        Shell::Zsh => ZSH_LOOKUPS,
        Shell::Fish => FISH_LOOKUPS,
        _ => {
            return Err(LookupError::Config(ConfigError::Generic(
                "Unsupported shell. Supported shells: bash, zsh, fish".to_string(),
            )));
        }
    };

    Ok(format!("{}\n{}", basic, extra))
}

const BASH_LOOKUPS: &str = r#"
# Lookup names from the config file
_typeahead_list_lookups() {
    typeahead config --list-lookups 2>/dev/null
}

_typeahead_enhanced() {
    local cur prev words cword
    _init_completion || return

    if [[ "$prev" == "-l" || "$prev" == "--lookup" ]]; then
        COMPREPLY=($(compgen -W "$(_typeahead_list_lookups)" -- "$cur"))
        return 0
    fi

    _typeahead "$@"
}

complete -F _typeahead_enhanced typeahead
"#;

const ZSH_LOOKUPS: &str = r#"
# Lookup names from the config file
_typeahead_lookups() {
    local -a lookups
    lookups=($(typeahead config --list-lookups 2>/dev/null))
    _describe 'lookups' lookups
}

_typeahead_enhanced() {
    if [[ ${words[CURRENT-1]} == "-l" || ${words[CURRENT-1]} == "--lookup" ]]; then
        _typeahead_lookups
        return 0
    fi

    _typeahead "$@"
}

compdef _typeahead_enhanced typeahead
"#;

const FISH_LOOKUPS: &str = r#"
# Lookup names from the config file
function __typeahead_list_lookups
    typeahead config --list-lookups 2>/dev/null
end

complete -c typeahead -s l -l lookup -f -a "(__typeahead_list_lookups)" -d "Lookup name from config file"
"#;
