use dialoguer::{theme::ColorfulTheme, Input, Select};

use super::text_gradient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    SearchAndDownload,
    JustDownload,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::SearchAndDownload, Direction::JustDownload];

    pub fn label(self) -> &'static str {
        match self {
            Direction::SearchAndDownload => "Search and download a video",
            Direction::JustDownload => "Just download",
        }
    }
}

/// Interactive questions asked during a session.
pub struct Prompts {
    theme: ColorfulTheme,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompts {
    pub fn direction(&self) -> Result<Direction, dialoguer::Error> {
        let labels: Vec<&str> = Direction::ALL.iter().map(|d| d.label()).collect();
        let index = self.choose("What do you want?", &labels)?;
        Ok(Direction::ALL[index])
    }

    pub fn choose<T: ToString>(&self, question: &str, items: &[T]) -> Result<usize, dialoguer::Error> {
        Select::with_theme(&self.theme)
            .with_prompt(text_gradient(question))
            .items(items)
            .default(0)
            .interact()
    }

    pub fn text(&self, question: &str, default: &str) -> Result<String, dialoguer::Error> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(text_gradient(question))
            .default(default.to_string())
            .interact_text()
    }
}
