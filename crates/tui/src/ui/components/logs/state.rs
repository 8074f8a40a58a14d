use chrono::{DateTime, Local};
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use workbench_util::redact_sensitive;

/// Oldest entries are dropped beyond this many.
const MAX_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    /// Already redacted.
    pub message: String,
}

#[derive(Debug)]
pub struct LogsState {
    pub entries: Vec<LogEntry>,
    /// Index into `entries` of the highlighted line.
    pub selected: Option<usize>,
    pub is_visible: bool,
    pub focus: FocusFlag,
    pub last_area: Rect,
}

impl Default for LogsState {
    fn default() -> Self {
        let mut state = LogsState {
            entries: Vec::new(),
            selected: None,
            is_visible: false,
            focus: FocusFlag::named("root.logs"),
            last_area: Rect::default(),
        };
        state.push(LogLevel::Info, "Welcome to Workbench");
        state
    }
}

impl LogsState {
    pub fn push(&mut self, level: LogLevel, message: impl AsRef<str>) {
        self.entries.push(LogEntry {
            at: Local::now(),
            level,
            message: redact_sensitive(message.as_ref()),
        });
        if self.entries.len() > MAX_ENTRIES {
            let overflow = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..overflow);
            self.selected = self.selected.and_then(|index| index.checked_sub(overflow));
        }
    }

    pub fn select_previous(&mut self) {
        let last = self.entries.len().checked_sub(1);
        self.selected = match self.selected {
            Some(index) => Some(index.saturating_sub(1)),
            None => last,
        };
    }

    pub fn select_next(&mut self) {
        let Some(last) = self.entries.len().checked_sub(1) else {
            return;
        };
        self.selected = Some(self.selected.map_or(last, |index| (index + 1).min(last)));
    }
}

impl HasFocus for LogsState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.leaf_widget(self);
    }

    fn focus(&self) -> FocusFlag {
        self.focus.clone()
    }

    fn area(&self) -> Rect {
        self.last_area
    }
}
