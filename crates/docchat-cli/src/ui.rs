//! Terminal UI utilities

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use docchat_core::Result;

use crate::app::Outcome;

/// Display the startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(64, terminal_width.saturating_sub(4)).max(16);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "docchat - Chat with your PDF";
    let title_line = format!(
        "│  {}{}│",
        title.blue().bold(),
        " ".repeat(banner_width.saturating_sub(title.len() + 4))
    );
    println!("{}", title_line);

    println!("{}", empty_line.blue());

    let feature_lines = vec![
        "📄 Ask questions about any PDF, answered by Gemini",
        "",
        "Flow:",
        "• 🔑 Submit your Gemini API key",
        "• 📤 open <path> to build the knowledge base",
        "• ❓ Type a question, get a grounded answer",
        "",
        "v0.1.0 • Powered by the Gemini API",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let pad = banner_width.saturating_sub(display_len(line) + 4);
            let content = if line.starts_with("v0.1.0") {
                format!("│  {}{}│", line.dimmed(), " ".repeat(pad))
            } else {
                format!("│  {}{}│", line, " ".repeat(pad))
            };
            println!("{}", content.blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "💡 Tip: Enter your API key and open your PDF to start chatting.".dimmed()
    );
    println!();
}

// Emoji take two columns; good enough for banner padding
fn display_len(line: &str) -> usize {
    line.chars()
        .map(|c| if (c as u32) > 0x2600 { 2 } else { 1 })
        .sum()
}

/// Prompt for a secret, echoing `*` per keystroke
pub fn prompt_secret(label: &str) -> Result<String> {
    print!("{} ", format!("{}:", label).bold());
    io::stdout().flush()?;

    // Piped input (tests, scripts) cannot be masked
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        return Ok(input.trim().to_string());
    }

    enable_raw_mode()?;
    let mut secret = String::new();

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(secret);
                }
                KeyCode::Char(c) => {
                    secret.push(c);
                    print!("*");
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if secret.pop().is_some() {
                        print!("\u{8} \u{8}");
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

/// Handle input with command history navigation
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Check if stdin is a terminal (interactive) or piped
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    let mut cursor_pos = 0;

    print!("{} ", "docchat>".green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    input.insert(cursor_pos, c);
                    cursor_pos += 1;
                    print!("\r{} {}", "docchat>".green().bold(), input);
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if cursor_pos > 0 {
                        input.remove(cursor_pos - 1);
                        cursor_pos -= 1;
                        print!(
                            "\r{} {}  \r{} {}",
                            "docchat>".green().bold(),
                            input,
                            "docchat>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "docchat>".green().bold(),
                            " ".repeat(50),
                            "docchat>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx < history.len() - 1 {
                            let new_index = idx + 1;
                            history_index = Some(new_index);
                            input = history[new_index].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "docchat>".green().bold(),
                            " ".repeat(50),
                            "docchat>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!(
        "  {} - Ingest a PDF (or .txt/.md) into the knowledge base",
        "open <path>".green()
    );
    println!(
        "  {} - Anything else is treated as a question about the document",
        "<question>".green()
    );
    println!(
        "  {} - Choose the Gemini model (applies after reset once a session exists)",
        "model <id>".green()
    );
    println!("  {} - Show the knowledge-base status", "status".green());
    println!(
        "  {} - Clear the session, key, and knowledge base",
        "reset".green()
    );
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  open report.pdf");
    println!("  What is the summary?");
    println!("  model gemini-2.5-pro");
}

/// Render a dispatch outcome
pub fn render_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Info(msg) => println!("{}", msg),
        Outcome::Success(msg) => println!("{} {}", "✅".green(), msg.green()),
        Outcome::Warning(msg) => println!("{} {}", "⚠️".yellow(), msg.yellow()),
        Outcome::Failure(msg) => println!("{} {}", "❌".red(), msg.red()),
        Outcome::Answer(text) => {
            println!();
            println!("{}", "🤖 Answer".bold());
            println!("{}", text);
            println!();
        }
        Outcome::Help => print_help(),
        Outcome::Quit => {}
    }
}
