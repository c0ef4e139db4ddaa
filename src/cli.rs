//! Interactive text menu
//!
//! Reads from any `BufRead` and writes to any `Write` so the menu can be
//! driven from tests.

use std::io::{self, BufRead, Write};

use crate::application::RunMode;
use crate::domain::Storefront;

pub const BANNER: &str = r"
    ╔══════════════════════════════════════════════════════════════╗
    ║        ACTIVEWEAR CRAWLER - FABRIC DETAILS EXTRACTOR         ║
    ║                                                              ║
    ║  Crawls: Kica, BlissClub, SilverTraq, Terra-active           ║
    ║  Focus: FABRIC DETAILS + Product Information                 ║
    ╚══════════════════════════════════════════════════════════════╝
";

/// Printed when a run fails
pub const FAILURE_GUIDANCE: &str = "\nPlease check:\n\
- Chrome/Chromium is installed and can be launched\n\
- Internet connection is stable\n\
- The configuration file is valid (it is reset to defaults when unreadable)";

/// What the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Run(RunMode),
    Exit,
    /// Unrecognized choice, as typed
    Invalid(String),
    /// Custom selection with no site picked
    NoSelection,
}

/// Menu number of a single-site choice (`2`..=`5`)
fn single_site_choice(choice: &str) -> Option<Storefront> {
    let index: usize = choice.parse().ok()?;
    index
        .checked_sub(2)
        .and_then(|i| Storefront::ALL.get(i))
        .copied()
}

pub fn print_menu<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "{BANNER}")?;
    writeln!(output, "\nSelect crawl mode:")?;
    writeln!(output, "1. Full Crawl (All brands, all categories) - RECOMMENDED")?;
    for (i, site) in Storefront::ALL.iter().enumerate() {
        writeln!(output, "{}. {} only", i + 2, site.brand())?;
    }
    writeln!(output, "6. Custom selection")?;
    writeln!(output, "0. Exit")?;
    Ok(())
}

/// Show the menu and read a choice
///
/// End of input at the main prompt counts as exit; at a custom-selection
/// question it counts as "no".
pub fn prompt_run_mode<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<MenuOutcome> {
    print_menu(output)?;
    write!(output, "\nEnter your choice (0-6): ")?;
    output.flush()?;

    let Some(choice) = read_line(input)? else {
        return Ok(MenuOutcome::Exit);
    };

    let outcome = match choice.as_str() {
        "0" => MenuOutcome::Exit,
        "1" => MenuOutcome::Run(RunMode::Full),
        "6" => prompt_custom_selection(input, output)?,
        other => match single_site_choice(other) {
            Some(site) => MenuOutcome::Run(RunMode::Single(site)),
            None => MenuOutcome::Invalid(other.to_string()),
        },
    };
    Ok(outcome)
}

fn prompt_custom_selection<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<MenuOutcome> {
    writeln!(output, "\n📋 Custom Selection:")?;

    let mut sites = Vec::new();
    for site in Storefront::ALL {
        write!(output, "Crawl {}? (y/n): ", site.brand())?;
        output.flush()?;
        let answer = read_line(input)?.unwrap_or_default();
        if answer.eq_ignore_ascii_case("y") {
            sites.push(site);
        }
    }

    if sites.is_empty() {
        Ok(MenuOutcome::NoSelection)
    } else {
        Ok(MenuOutcome::Run(RunMode::Custom(sites)))
    }
}

/// Trimmed line, `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
