use serde::{Deserialize, Serialize};

pub type Rgb = [u8; 3];

/// A full-screen text display shown between trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageScreen {
    pub text: String,
    pub background: Rgb,
    pub foreground: Rgb,
    /// Whether the screen stays up until the continue key is pressed.
    pub wait_for_input: bool,
}

impl MessageScreen {
    pub fn new(text: impl Into<String>, background: Rgb, foreground: Rgb) -> Self {
        Self {
            text: text.into(),
            background,
            foreground,
            wait_for_input: true,
        }
    }

    pub fn without_input(mut self) -> Self {
        self.wait_for_input = false;
        self
    }
}
