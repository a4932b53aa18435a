//! Status messages on stderr.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;

static COLOR: AtomicBool = AtomicBool::new(true);

/// Decide once whether status messages are colored.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` enables them off a terminal.
pub fn init_colors(no_color: bool) {
    COLOR.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

fn colored() -> bool {
    COLOR.load(Ordering::Relaxed)
}

pub fn success(message: &str) {
    if colored() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {message}");
    }
}

/// Stage listing row: position, key, plugin name.
pub fn stage_row(position: usize, key: &str, plugin: &str) -> String {
    if colored() {
        format!("{position:>2}. {:<12}{}", key.bold(), plugin.dimmed())
    } else {
        format!("{position:>2}. {key:<12}{plugin}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rows_are_aligned() {
        COLOR.store(false, Ordering::Relaxed);
        assert_eq!(stage_row(1, "styles", "postcss"), " 1. styles      postcss");
        assert_eq!(stage_row(10, "minify", "terser"), "10. minify      terser");
    }
}
