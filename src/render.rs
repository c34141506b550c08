//! Terminal rendering for router replies.

use eventbot_core::Reply;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Reply {
    fn render(&self) -> String {
        if self.is_error {
            return self.text.red().to_string();
        }
        if self.broadcast {
            return format!("{} {}", "[broadcast]".yellow().bold(), self.text);
        }
        self.text.clone()
    }
}
