//! Terminal logging with colored module prefixes and a render progress bar.
//!
//! ```ignore
//! log!("client"; "running `{}`", name);
//!
//! let progress = ProgressBars::new(&[("render", routes.len())]);
//! progress.inc(0);
//! progress.finish();
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

// Progress bar layout: "[render] [████░░░░] 42/100"

/// "[" + "]" + trailing space around the module name.
const PREFIX_OVERHEAD: usize = 3;
/// " []" around the bar plus the space before the counter.
const BAR_OVERHEAD: usize = 4;
const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;

fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120)) as usize
}

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::utils::log::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Progress Bars
// ============================================================================

/// Progress bars drawn on consecutive terminal lines, updated in place.
///
/// Bars are indexed by creation order. Safe to update from rayon workers.
pub struct ProgressBars {
    bars: Vec<ProgressBar>,
    lock: Mutex<()>,
}

struct ProgressBar {
    prefix: ColoredString,
    prefix_len: usize,
    total: usize,
    current: AtomicUsize,
    row: usize,
}

impl ProgressBars {
    /// Reserve one terminal line per `(module, total)` pair.
    pub fn new(modules: &[(&'static str, usize)]) -> Self {
        let mut stdout = stdout().lock();
        for _ in modules {
            writeln!(stdout).ok();
        }
        stdout.flush().ok();

        let bars = modules
            .iter()
            .enumerate()
            .map(|(row, (module, total))| ProgressBar {
                prefix: colorize_prefix(module),
                prefix_len: module.len() + PREFIX_OVERHEAD,
                total: *total,
                current: AtomicUsize::new(0),
                row,
            })
            .collect();

        Self {
            bars,
            lock: Mutex::new(()),
        }
    }

    /// Advance the bar at `index` by one.
    #[inline]
    pub fn inc(&self, index: usize) {
        if let Some(bar) = self.bars.get(index) {
            let current = bar.current.fetch_add(1, Ordering::Relaxed) + 1;
            self.display(bar, current);
        }
    }

    fn display(&self, bar: &ProgressBar, current: usize) {
        let _guard = self.lock.lock();

        let counter = format!("{}/{}", current, bar.total);
        let width = bar_width(terminal_width(), bar.prefix_len, counter.len());
        let filled = filled_cells(current, bar.total, width);
        let cells = "█".repeat(filled) + &"░".repeat(width - filled);

        let mut stdout = stdout().lock();
        let lines_up = (self.bars.len() - bar.row) as u16;
        execute!(stdout, cursor::MoveUp(lines_up), Clear(ClearType::CurrentLine)).ok();
        write!(stdout, "{} [{}] {}", bar.prefix, cells, counter).ok();
        execute!(stdout, cursor::MoveDown(lines_up)).ok();
        write!(stdout, "\r").ok();
        stdout.flush().ok();
    }

    /// Clear all bars from the terminal.
    pub fn finish(&self) {
        let _guard = self.lock.lock();
        let rows = self.bars.len() as u16;

        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveUp(rows)).ok();
        for _ in &self.bars {
            execute!(stdout, Clear(ClearType::CurrentLine), cursor::MoveDown(1)).ok();
        }
        execute!(stdout, cursor::MoveUp(rows)).ok();
        stdout.flush().ok();
    }
}

/// Width of the bar body given the terminal width and the surrounding text.
fn bar_width(terminal: usize, prefix_len: usize, counter_len: usize) -> usize {
    terminal
        .saturating_sub(prefix_len + BAR_OVERHEAD + counter_len)
        .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

fn filled_cells(current: usize, total: usize, width: usize) -> usize {
    if total == 0 {
        0
    } else {
        (current.min(total) * width) / total
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Print `[module] message`, truncated to the terminal width.
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let max_len = terminal_width().saturating_sub(module.len() + PREFIX_OVERHEAD);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {}", truncate_str(message, max_len)).ok();
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "client" => prefix.bright_cyan().bold(),
        "server" => prefix.bright_magenta().bold(),
        "render" | "done" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate to at most `max_len` bytes on a UTF-8 boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
