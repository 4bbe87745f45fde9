//! Plain-text formatting shared by the CLI and the TUI.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::task::Task;
use crate::view::Stats;

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Creation time as a long local date, e.g. `15 January 2024, 10:30`.
pub fn format_created(at: DateTime<Utc>) -> String {
    format_created_in(at, &Local)
}

pub fn format_created_in<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%-d %B %Y, %H:%M").to_string()
}

pub fn status_mark(task: &Task) -> &'static str {
    if task.completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Print tasks as a fixed-width table on stdout.
pub fn print_table(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    println!("{:<14} {:<4} {:<24} {}", "ID", "Done", "Created", "Title");
    for t in tasks {
        println!(
            "{:<14} {:<4} {:<24} {}",
            t.id,
            status_mark(t),
            format_created(t.created_at),
            truncate(&t.title, 60)
        );
        if t.has_description() {
            println!("{:<44} {}", "", truncate(&t.description, 60));
        }
    }
}

pub fn print_stats(stats: &Stats) {
    println!("Total:     {}", stats.total);
    println!("Completed: {}", stats.completed);
    println!("Pending:   {}", stats.pending);
    println!("Progress:  {}%", stats.percent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("a longer title", 6), "a lon…");
        assert_eq!(truncate("çğüşöı", 3), "çğ…");
    }

    #[test]
    fn created_date_uses_long_month_name() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_created_in(at, &Utc), "15 January 2024, 10:30");

        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(format_created_in(at, &plus_three), "15 January 2024, 13:30");
    }

    #[test]
    fn status_marks() {
        let mut task = Task {
            id: 1,
            title: "t".into(),
            description: String::new(),
            completed: false,
            created_at: Utc::now(),
        };
        assert_eq!(status_mark(&task), "[ ]");
        task.completed = true;
        assert_eq!(status_mark(&task), "[x]");
    }
}
