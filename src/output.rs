use std::io::{self, Write};

use serde::Serialize;

use crate::app::RunResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

impl OutputMode {
    pub fn detect(interactive: bool) -> Self {
        if interactive {
            OutputMode::Interactive
        } else {
            OutputMode::NonInteractive
        }
    }
}

pub fn print_run(result: &RunResult, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::NonInteractive => JsonOutput::print_run(result),
        OutputMode::Interactive => {
            print_summary(result);
            Ok(())
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

fn print_summary(result: &RunResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    match result {
        RunResult::Guides(categories) => {
            for item in categories {
                let reconcile = &item.reconcile;
                let guide = &item.guide;
                println!("{cyan}{} guide: {}{reset}", reconcile.category, guide.path);
                println!(
                    "{green}  channels: {}, programmes: {}{reset}",
                    guide.channels, guide.programmes
                );
                if !reconcile.added.is_empty() {
                    println!("{green}  added: {}{reset}", reconcile.added.join(", "));
                }
                if !reconcile.removed.is_empty() {
                    println!("{green}  removed: {}{reset}", reconcile.removed.join(", "));
                }
                if !reconcile.kept.is_empty() {
                    println!("{yellow}  kept: {}{reset}", reconcile.kept.join(", "));
                }
                if !reconcile.unresolved.is_empty() {
                    println!(
                        "{yellow}  no match: {}{reset}",
                        reconcile.unresolved.join(", ")
                    );
                }
                if !guide.skipped.is_empty() {
                    println!(
                        "{yellow}  without channel: {}{reset}",
                        guide.skipped.join(", ")
                    );
                }
            }
        }
        RunResult::Cleared { removed } => {
            println!("{cyan}cache cleared: {removed} items removed{reset}");
        }
        RunResult::DeletedItem { name: Some(name) } => {
            println!("{cyan}removed from cache: {name}{reset}");
        }
        RunResult::DeletedItem { name: None } => {
            println!("{yellow}nothing removed{reset}");
        }
    }
}
