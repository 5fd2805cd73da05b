pub mod prompts;
pub mod spinner;

use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

use console::style;

pub use prompts::{Direction, Prompts};
pub use spinner::{progress_message, Spinner};

pub type Rgb = (u8, u8, u8);

const ORANGE: Rgb = (0xed, 0x9e, 0x4e);
const PURPLE: Rgb = (0xab, 0x55, 0xf2);

/// Delay between characters when typing text out.
const TYPE_DELAY: Duration = Duration::from_millis(20);

fn lerp(start: Rgb, end: Rgb, t: f64) -> Rgb {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (
        channel(start.0, end.0),
        channel(start.1, end.1),
        channel(start.2, end.2),
    )
}

/// `length` colors from `start` towards `end`; the last one stops short of `end`.
pub fn linear_gradient(start: Rgb, end: Rgb, length: usize) -> Vec<Rgb> {
    (0..length)
        .map(|index| lerp(start, end, index as f64 / length as f64))
        .collect()
}

/// Nearest entry of the xterm 6x6x6 color cube.
pub fn rgb_to_ansi256((r, g, b): Rgb) -> u8 {
    let level = |c: u8| match c {
        0..=47 => 0,
        48..=114 => 1,
        _ => (c - 35) / 40,
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

fn gradient_chars(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    linear_gradient(ORANGE, PURPLE, chars.len())
        .into_iter()
        .zip(chars)
        .map(|(color, c)| style(c).color256(rgb_to_ansi256(color)).to_string())
        .collect()
}

/// Color `text` from orange to purple.
pub fn text_gradient(text: &str) -> String {
    gradient_chars(text).concat()
}

/// Print `text` in gradient colors, one character at a time when `animate`.
pub async fn type_gradient(text: &str, animate: bool) -> io::Result<()> {
    let mut stdout = io::stdout();
    if !animate {
        writeln!(stdout, "{}", text_gradient(text))?;
        return stdout.flush();
    }

    for c in gradient_chars(text) {
        write!(stdout, "{}", c)?;
        stdout.flush()?;
        tokio::time::sleep(TYPE_DELAY).await;
    }
    writeln!(stdout)
}

pub fn print_error(error: &impl Display) {
    eprintln!(
        "{}\n{}",
        style("Error!").white().on_red(),
        style(error).red()
    );
}
