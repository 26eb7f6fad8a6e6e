use clap::{Parser, Subcommand};
use colored::Colorize;
use lite_regex::{RegexBuilder, RegexError, Strategy, explain};
use log::debug;
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "lite-regex")]
#[command(about = "lite-regex - full-string regex matching over NFA/DFA automata")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test whether each input matches the whole pattern
    Match {
        /// The regex pattern
        pattern: String,
        /// Input strings to test
        #[arg(required = true)]
        inputs: Vec<String>,
        /// Simulate the NFA instead of building a DFA
        #[arg(long)]
        nfa: bool,
        /// Show length bounds and automaton size
        #[arg(short, long)]
        verbose: bool,
    },
    /// Explain a pattern token by token
    Explain {
        /// The pattern to explain
        pattern: String,
    },
    /// Read a pattern, then test lines from stdin against it
    Repl {
        /// Simulate the NFA instead of building a DFA
        #[arg(long)]
        nfa: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            pattern,
            inputs,
            nfa,
            verbose,
        } => cmd_match(&pattern, &inputs, nfa, verbose),
        Commands::Explain { pattern } => cmd_explain(&pattern),
        Commands::Repl { nfa } => {
            if let Err(e) = cmd_repl(nfa) {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
    }
}

fn strategy(nfa: bool) -> Strategy {
    if nfa { Strategy::Nfa } else { Strategy::Dfa }
}

fn builder(pattern: &str, nfa: bool) -> RegexBuilder {
    let mut builder = RegexBuilder::new(pattern);
    builder.strategy(strategy(nfa));
    builder
}

fn report_error(e: &RegexError) {
    eprintln!("{} {}", "Error:".red().bold(), e);
}

fn cmd_match(pattern: &str, inputs: &[String], nfa: bool, verbose: bool) {
    let builder = builder(pattern, nfa);
    let regex = match builder.build() {
        Ok(r) => r,
        Err(e) => {
            report_error(&e);
            std::process::exit(2);
        }
    };

    if verbose {
        println!("{}", "Compiled pattern:".bold());
        println!("  Pattern:  {}", pattern.cyan());
        match builder.parse() {
            Ok(ast) => println!("  Parsed:   {}", ast),
            Err(e) => report_error(&e),
        }
        println!("  Strategy: {}", regex.strategy());
        println!("  States:   {}", regex.state_count());
        println!(
            "  Length:   [{}, {}]",
            regex.min_length(),
            regex
                .max_length()
                .map_or_else(|| "unbounded".to_string(), |max| max.to_string())
        );
        println!();
    }

    let mut all_matched = true;
    for input in inputs {
        if regex.matches(input) {
            println!("{} {}", "✓".green().bold(), input.green());
        } else {
            all_matched = false;
            println!("{} {}", "✗".red().bold(), input.red());
        }
    }

    if !all_matched {
        std::process::exit(1);
    }
}

fn cmd_explain(pattern: &str) {
    match explain(pattern) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            report_error(&e);
            std::process::exit(2);
        }
    }
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{}", text.bold());
    io::stdout().flush()
}

/// Next line without its terminator; `None` on EOF or `exit`
fn next_line(lines: &mut impl Iterator<Item = io::Result<String>>) -> io::Result<Option<String>> {
    match lines.next().transpose()? {
        Some(line) if line.trim().eq_ignore_ascii_case("exit") => Ok(None),
        other => Ok(other),
    }
}

fn cmd_repl(nfa: bool) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let (pattern, regex) = loop {
        prompt("Enter regex pattern (or 'exit' to quit): ")?;
        let Some(pattern) = next_line(&mut lines)? else {
            return Ok(());
        };
        match builder(&pattern, nfa).build() {
            Ok(regex) => break (pattern, regex),
            Err(e) => report_error(&e),
        }
    };

    println!("{}", "Pattern compiled successfully!".green());
    debug!("repl using {} with {} states", regex.strategy(), regex.state_count());
    if let Ok(text) = explain(&pattern) {
        println!();
        println!("{}", "=== Pattern Explanation ===".bold());
        print!("{}", text);
        println!("{}", "===========================".bold());
        println!();
    }

    loop {
        prompt("Enter text to test (or 'exit' to quit): ")?;
        let Some(input) = next_line(&mut lines)? else {
            return Ok(());
        };
        if regex.matches(&input) {
            println!("'{}' {} pattern '{}'", input, "matches".green(), pattern);
        } else {
            println!("'{}' {} pattern '{}'", input, "does not match".red(), pattern);
        }
    }
}
