// =============================================================================
// Interactive Menu
// =============================================================================
//
// 1 Fetch · 2 Analyze · 3 Charts · 4 Forecast · 5 Export · 6 Quit
//
// Blank answers keep the previous value. Failed actions are printed and the
// loop continues; end of input behaves like Quit.
// =============================================================================

use std::io::Write as _;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use crate::action_log::Action;
use crate::display;
use crate::forecast::check_horizon;
use crate::session::Session;

type Input = Lines<BufReader<Stdin>>;

/// A parsed menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Fetch,
    Analyze,
    Visualize,
    Forecast,
    Export,
    Quit,
}

impl Choice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Fetch),
            "2" => Some(Self::Analyze),
            "3" => Some(Self::Visualize),
            "4" => Some(Self::Forecast),
            "5" => Some(Self::Export),
            "6" | "q" | "Q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Keep `current` when the answer is blank.
pub fn or_keep(answer: &str, current: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    }
}

/// Parse the forecast-days answer; blank keeps `current`.
pub fn parse_days(answer: &str, current: usize) -> std::result::Result<usize, String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(current);
    }
    let days = answer
        .parse::<usize>()
        .map_err(|_| format!("'{answer}' is not a number of days"))?;
    check_horizon(days).map_err(|e| e.to_string())
}

fn print_menu() {
    println!();
    println!("=== StockSense CLI ===");
    println!("1. Fetch/Update Data");
    println!("2. Analyze Indicators");
    println!("3. Visualize Charts");
    println!("4. Forecast Next N Days");
    println!("5. Export Report");
    println!("6. Quit");
}

/// Print `prompt` and read one line. `None` on end of input.
async fn ask(input: &mut Input, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush().context("failed to flush stdout")?;
    input.next_line().await.context("failed to read stdin")
}

pub async fn run(mut session: Session) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    info!(ticker = %session.ticker, "menu started");

    loop {
        print_menu();
        let Some(line) = ask(&mut input, "Select option (1-6): ").await? else {
            break;
        };

        let Some(choice) = Choice::parse(&line) else {
            println!("[!] Invalid choice. Please pick between 1-6.");
            continue;
        };

        if choice == Choice::Quit {
            break;
        }

        if choice != Choice::Fetch && session.data().is_none() {
            println!("[!] No data yet. Please fetch first.");
            continue;
        }

        match choice {
            Choice::Fetch => {
                let prompts = [
                    format!("Enter ticker (default {}): ", session.ticker),
                    format!("Start date (default {}): ", session.start),
                    format!("End date (default {}): ", session.end),
                ];
                let mut answers = Vec::with_capacity(prompts.len());
                for prompt in &prompts {
                    match ask(&mut input, prompt).await? {
                        Some(a) => answers.push(a),
                        None => {
                            goodbye();
                            return Ok(());
                        }
                    }
                }
                session.ticker = or_keep(&answers[0], &session.ticker).to_uppercase();
                session.start = or_keep(&answers[1], &session.start);
                session.end = or_keep(&answers[2], &session.end);

                println!(
                    "\nFetching {} from {} → {} ...",
                    session.ticker, session.start, session.end
                );
                match session.fetch().await {
                    Ok(rows) => println!("✓ Data ready. Rows: {rows}"),
                    Err(e) => println!("[x] Failed to fetch data: {e:#}"),
                }
            }
            Choice::Analyze => match session.analyze() {
                Ok(summary) => println!(
                    "{}",
                    display::format_summary(&summary, &session.ticker, &session.start, &session.end)
                ),
                Err(e) => println!("[x] Analysis failed: {e:#}"),
            },
            Choice::Visualize => match session.visualize() {
                Ok(paths) => {
                    println!("✓ Charts saved in {}", session.config().export_dir.display());
                    for p in paths {
                        println!("  - {}", p.display());
                    }
                }
                Err(e) => println!("[x] Chart generation failed: {e:#}"),
            },
            Choice::Forecast => {
                let prompt = format!("Forecast days (default {}): ", session.forecast_days);
                let Some(answer) = ask(&mut input, &prompt).await? else {
                    break;
                };
                let days = match parse_days(&answer, session.forecast_days) {
                    Ok(d) => d,
                    Err(reason) => {
                        println!("[x] Forecasting failed: {reason}");
                        session.log_rejected(Action::Forecast, &reason);
                        continue;
                    }
                };
                session.forecast_days = days;
                match session.forecast(days) {
                    Ok(out) => println!("{}", display::format_forecast(&out.results, &out.dates)),
                    Err(e) => println!("[x] Forecasting failed: {e:#}"),
                }
            }
            Choice::Export => match session.export() {
                Ok(path) => println!("✓ Report exported to {}", path.display()),
                Err(e) => println!("[x] Export failed: {e:#}"),
            },
            Choice::Quit => break,
        }
    }

    goodbye();
    Ok(())
}

fn goodbye() {
    println!("Goodbye 👋");
}
