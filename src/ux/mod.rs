use colored::Colorize;
use std::io::{self, Write};

pub fn print_banner(model: &str, user: &str) {
    println!("{}", "=== wingman ===".bold());
    println!("model: {}   profile: {}", model.cyan(), user.cyan());
    println!("commands: /image <path> [who] [help], /replies <path> [who] [help], /suggest <context>, /reset, /quit");
    println!();
}

pub fn print_reply(reply: &str) {
    println!("{} {}", "wingman:".green().bold(), reply);
    println!();
}

pub fn print_suggestions(suggestions: &[String]) {
    println!("{}", "suggestions:".magenta().bold());
    for (i, s) in suggestions.iter().enumerate() {
        println!("  {}. {}", i + 1, s);
    }
    println!();
}

/// Blocking prompt-and-read; None on EOF.
pub fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut s = String::new();
    if io::stdin().read_line(&mut s)? == 0 {
        Ok(None)
    } else {
        Ok(Some(s))
    }
}
