//! Runtime configuration: flags first, then environment, then defaults

use crossterm::tty::IsTty;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::prompt::ConfirmPolicy;

pub const DATA_DIR_ENV: &str = "DIAGRAMPAD_DATA_DIR";
pub const RENDERER_ENV: &str = "DIAGRAMPAD_RENDERER";
pub const DEFAULT_RENDERER: &str = "figurehead convert";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub renderer: String,
    pub confirm: ConfirmPolicy,
}

impl Config {
    /// Resolve against the process environment and terminal
    pub fn resolve(cli: &Cli) -> Self {
        Self::resolve_with(
            cli,
            |key| std::env::var(key).ok(),
            IsTty::is_tty(&std::io::stdin()),
        )
    }

    /// Resolve with an injected environment lookup
    pub fn resolve_with(
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
        interactive: bool,
    ) -> Self {
        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| env(DATA_DIR_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let renderer = cli
            .renderer
            .clone()
            .or_else(|| env(RENDERER_ENV).filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_RENDERER.to_string());

        let confirm = if cli.yes {
            ConfirmPolicy::AssumeYes
        } else if interactive {
            ConfirmPolicy::Prompt
        } else {
            ConfirmPolicy::Decline
        };

        Self {
            data_dir,
            renderer,
            confirm,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("diagrampad"))
        .unwrap_or_else(|| PathBuf::from(".diagrampad"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["diagrampad"];
        argv.extend_from_slice(args);
        argv.push("list");
        Cli::try_parse_from(argv).unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_flags_win_over_environment() {
        let config = Config::resolve_with(
            &cli(&["--data-dir", "/flag", "--renderer", "cat"]),
            env(&[(DATA_DIR_ENV, "/env"), (RENDERER_ENV, "tac")]),
            true,
        );
        assert_eq!(config.data_dir, PathBuf::from("/flag"));
        assert_eq!(config.renderer, "cat");
    }

    #[test]
    fn test_environment_wins_over_defaults() {
        let config = Config::resolve_with(
            &cli(&[]),
            env(&[(DATA_DIR_ENV, "/env"), (RENDERER_ENV, "mmdc -i -")]),
            true,
        );
        assert_eq!(config.data_dir, PathBuf::from("/env"));
        assert_eq!(config.renderer, "mmdc -i -");
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve_with(&cli(&[]), env(&[(RENDERER_ENV, "  ")]), true);
        assert_eq!(config.renderer, DEFAULT_RENDERER);
        assert!(config.data_dir.ends_with("diagrampad") || config.data_dir.ends_with(".diagrampad"));
    }

    #[test]
    fn test_confirm_policy() {
        assert_eq!(
            Config::resolve_with(&cli(&["--yes"]), env(&[]), false).confirm,
            ConfirmPolicy::AssumeYes
        );
        assert_eq!(
            Config::resolve_with(&cli(&[]), env(&[]), true).confirm,
            ConfirmPolicy::Prompt
        );
        assert_eq!(
            Config::resolve_with(&cli(&[]), env(&[]), false).confirm,
            ConfirmPolicy::Decline
        );
    }
}
