use std::io::{self, BufRead, Write};

use client_core::{CardSurface, PageHost, QuizBoard};
use tracing::{info, warn};

/// Plays the page on a terminal: alerts print, confirmations prompt on stdin.
pub struct TerminalHost {
    assume_yes: bool,
}

impl TerminalHost {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl PageHost for TerminalHost {
    fn alert(&self, message: &str) {
        println!("{message}");
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            println!("{message} [y/N] y");
            return true;
        }
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(err) => {
                warn!("host: could not read confirmation: {err}");
                false
            }
        }
    }

    fn reload(&self) {
        info!("page reload requested");
    }

    fn navigate(&self, url: &str) {
        println!("-> {url}");
    }

    fn celebrate(&self) {
        println!("*** All requirements met! ***");
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Keeps a [`QuizBoard`] current and echoes every countdown change.
pub struct PrintingBoard {
    pub board: QuizBoard,
}

impl CardSurface for PrintingBoard {
    fn is_mounted(&self, button_id: &str) -> bool {
        self.board.is_mounted(button_id)
    }

    fn set_label(&mut self, button_id: &str, label: &str) {
        self.board.set_label(button_id, label);
        println!("{button_id}: {label}");
    }

    fn replace_with_retry(&mut self, button_id: &str, href: &str) {
        self.board.replace_with_retry(button_id, href);
        println!("{button_id}: Retry Quiz ({href})");
    }
}
