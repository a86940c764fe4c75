//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one spinner line per dimension or load, cleared on completion.
//! Non-TTY mode: hidden bars; the log is the only progress indicator.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::paging::PageInfo;

/// Central progress context managing multi-progress bars.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// Spinner line for one unit of work (a dimension build, a data load).
    ///
    /// Update with [`PageProgress`] or `set_message`; hidden when not a TTY.
    pub fn task_line(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix:<12.cyan.bold} {wide_msg}")
                .expect("invalid template"),
        );
        pb.set_prefix(name.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Print a line above managed progress bars.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for the log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;

/// Tracks pages and items seen by a paged fetch and mirrors them on a bar.
pub struct PageProgress<'a> {
    pb: &'a ProgressBar,
    pages: usize,
    items: usize,
    total: Option<u64>,
}

impl<'a> PageProgress<'a> {
    pub fn new(pb: &'a ProgressBar) -> Self {
        Self {
            pb,
            pages: 0,
            items: 0,
            total: None,
        }
    }

    /// Record one handled page of `items` entries
    pub fn page(&mut self, items: usize, info: &PageInfo) {
        self.pages += 1;
        self.items += items;
        if self.total.is_none() {
            self.total = info.count;
        }
        self.pb.set_message(self.message());
    }

    pub fn items(&self) -> usize {
        self.items
    }

    fn message(&self) -> String {
        match self.total {
            Some(total) => format!(
                "{}/{} items, {} pages",
                fmt_num(self.items),
                fmt_num(total as usize),
                self.pages
            ),
            None => format!("{} items, {} pages", fmt_num(self.items), self.pages),
        }
    }
}

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
