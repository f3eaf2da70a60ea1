//! Driftwood, a privacy-minded desktop browser around the system web engine.
//!
//! Entry point: parses the command line and opens the browser window. When
//! built without the `gui` feature, runs the shell over the headless engine
//! and reads address-bar input from stdin.

use log::debug;

use driftwood::cli::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::from_env();
    if !cli.toolkit_args.is_empty() {
        debug!("toolkit arguments: {:?}", cli.toolkit_args);
    }

    #[cfg(feature = "gui")]
    driftwood::ui::webview_app::run(cli);

    #[cfg(not(feature = "gui"))]
    console::run(cli);
}

#[cfg(not(feature = "gui"))]
mod console {
    use std::io::{self, BufRead, Write};

    use log::{error, warn};

    use driftwood::app::App;
    use driftwood::cli::Cli;
    use driftwood::engine::headless::{HeadlessFactory, SharedLog};
    use driftwood::shell::{ChromeCommand, Shell};

    pub fn run(cli: Cli) {
        let app = match App::new(cli.profile_paths(), cli.theme) {
            Ok(app) => app,
            Err(e) => {
                error!("failed to start: {}", e);
                std::process::exit(1);
            }
        };
        let factory = HeadlessFactory::new();
        let log = factory.log();
        let mut shell = Shell::new(app, factory);

        shell.open_window();
        pump(&mut shell, &log);
        print_state(&shell);

        println!("Type an address or search, a JSON command like {{\"cmd\":\"new_tab\"}}, or :quit");
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("stdin: {}", e);
                    break;
                }
            };
            let line = line.trim();
            if line == ":quit" {
                break;
            }
            let result = if line.starts_with('{') {
                shell.dispatch_message(line)
            } else {
                shell.dispatch(ChromeCommand::Navigate {
                    input: line.to_string(),
                })
            };
            if let Err(e) = result {
                warn!("{}", e);
            }
            pump(&mut shell, &log);
            print_state(&shell);
        }
        shell.shutdown();
    }

    /// Feeds queued engine callbacks into the shell.
    fn pump(shell: &mut Shell<HeadlessFactory>, log: &SharedLog) {
        loop {
            let events: Vec<_> = log.borrow_mut().events.drain(..).collect();
            if events.is_empty() {
                break;
            }
            for (tab_id, event) in events {
                if let Err(e) = shell.handle_engine_event(&tab_id, event) {
                    warn!("{}", e);
                }
            }
        }
    }

    fn print_state(shell: &Shell<HeadlessFactory>) {
        let state = shell.chrome_state();
        let mut out = io::stdout().lock();
        for tab in &state.tabs {
            let marker = if tab.active { '*' } else { ' ' };
            let _ = writeln!(out, "{} [{}] {} - {}", marker, tab.id, tab.title, tab.url);
        }
        if let Some(reason) = &state.error {
            let _ = writeln!(out, "  error: {}", reason);
        }
        let _ = out.flush();
    }
}
