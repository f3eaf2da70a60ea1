//! Command-line interface.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use clap::Parser;

use crate::platform::ProfilePaths;
use crate::types::settings::ThemeMode;

/// Options that take a value and belong to the browser, not the toolkit.
const OWN_OPTIONS: [&str; 2] = ["--theme", "--profile"];

#[derive(Debug, Clone, Parser)]
#[command(
    name = "driftwood",
    version,
    about = "A desktop browser around the system web engine",
    args_override_self = true
)]
pub struct Cli {
    /// Theme for this session only; the saved setting is left alone
    #[arg(long, value_enum, value_name = "MODE")]
    pub theme: Option<ThemeMode>,

    /// Keep settings and history under DIR instead of the user directories
    #[arg(long, value_name = "DIR")]
    pub profile: Option<PathBuf>,

    /// Remaining arguments, handed to the windowing toolkit untouched
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "TOOLKIT_ARGS")]
    pub toolkit_args: Vec<String>,
}

impl Cli {
    /// Parses the process arguments. Exits with usage on error.
    pub fn from_env() -> Self {
        Self::parse_from(hoist_own_options(std::env::args_os()))
    }

    /// Parses `args` (program name first), accepting the browser's own
    /// options anywhere before `--`.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(hoist_own_options(args))
    }

    pub fn profile_paths(&self) -> ProfilePaths {
        match &self.profile {
            Some(root) => ProfilePaths::in_profile(root),
            None => ProfilePaths::platform_default(),
        }
    }
}

enum ArgKind {
    Separator,
    /// `--theme dark`: the value is the next argument.
    OwnSplit,
    /// `--theme=dark`
    OwnJoined,
    Other,
}

fn classify(arg: &OsStr) -> ArgKind {
    let text = match arg.to_str() {
        Some(text) => text,
        None => return ArgKind::Other,
    };
    if text == "--" {
        return ArgKind::Separator;
    }
    for option in OWN_OPTIONS {
        match text.strip_prefix(option) {
            Some("") => return ArgKind::OwnSplit,
            Some(rest) if rest.starts_with('=') => return ArgKind::OwnJoined,
            _ => {}
        }
    }
    ArgKind::Other
}

/// Moves the browser's own options, with their values, in front of
/// everything else so the trailing toolkit capture cannot swallow them.
/// Relative order is kept within both groups; nothing after `--` moves.
pub fn hoist_own_options<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut own: Vec<OsString> = args.next().into_iter().collect();
    let mut rest = Vec::new();
    while let Some(arg) = args.next() {
        match classify(&arg) {
            ArgKind::Separator => {
                rest.push(arg);
                rest.extend(args.by_ref());
            }
            ArgKind::OwnSplit => {
                own.push(arg);
                own.extend(args.next());
            }
            ArgKind::OwnJoined => own.push(arg),
            ArgKind::Other => rest.push(arg),
        }
    }
    own.extend(rest);
    own
}
