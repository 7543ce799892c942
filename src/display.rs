//! Display utilities for formatting study output.
//!
//! Shared formatting functions used by the CLI for summaries, subject
//! progress, history and the Jalali month grid.
//!
//! # Functions
//!
//! - [`truncate`] - Truncate strings to a maximum length with ellipsis
//! - [`make_bar`] - Create visual bar charts for relative values
//! - [`format_summary`] / [`display_summary`] - Per-subject totals of a window
//! - [`render_month_grid`] - Saturday-first month grid with study days marked
//! - [`print_section_simple`] - Print section headers

use chrono::Datelike;

use crate::analytics::{DayReport, PeriodSummary, StudyDaySet};
use crate::calendar::{JalaliDate, JalaliMonth};
use crate::date_range::days_since_week_start;
use crate::error::Result;
use crate::store::{Subject, SubjectSession};

/// Weekday headers of the month grid, Saturday first.
pub const WEEKDAY_HEADERS: [&str; 7] = ["Sh", "Ye", "Do", "Se", "Ch", "Pa", "Jo"];

const CELL_WIDTH: usize = 4;

/// Truncate a string to a maximum length, adding "..." if truncated.
///
/// Counts characters rather than bytes, so Persian subject names are safe.
/// For `max_len < 3`, truncates without ellipsis since there's no room for "...".
///
/// # Examples
///
/// ```
/// use study_tracker::display::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello world", 8), "hello...");
/// assert_eq!(truncate("hello", 2), "he");
/// ```
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len < 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

/// Create a visual bar for displaying relative values.
///
/// # Arguments
///
/// * `value` - The value to represent (negative values treated as 0)
/// * `max_value` - The maximum value (determines 100% width)
/// * `width` - The total width of the bar in characters
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn make_bar(value: i64, max_value: i64, width: usize) -> String {
    if max_value <= 0 || value <= 0 {
        return " ".repeat(width);
    }
    let ratio = (value as f64 / max_value as f64).clamp(0.0, 1.0);
    let filled = (ratio * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Print a simple section header with dashes.
pub fn print_section_simple(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(30));
}

/// Body lines of a period summary, without the header.
#[must_use]
pub fn format_summary(summary: &PeriodSummary, show_bar: bool) -> Vec<String> {
    let Some(top) = summary.most_studied() else {
        return vec![format!("  No study sessions in {}", summary.label())];
    };

    let mut lines = vec![
        format!(
            "  Total:         {:>8} min ({})",
            summary.total.to_minutes_string(),
            summary.total
        ),
        format!(
            "  Most studied:  {} ({} min)",
            top.subject,
            top.total.to_minutes_string()
        ),
        String::new(),
    ];

    let max = top.total.get();
    for (i, entry) in summary.subjects.iter().enumerate() {
        let name = truncate(&entry.subject, 24);
        if show_bar {
            lines.push(format!(
                "  {:2}. {:<24} {} {:>8} min",
                i + 1,
                name,
                make_bar(entry.total.get(), max, 20),
                entry.total.to_minutes_string()
            ));
        } else {
            lines.push(format!(
                "  {:2}. {:<24} {:>8} min",
                i + 1,
                name,
                entry.total.to_minutes_string()
            ));
        }
    }
    lines
}

/// Display a day, week or month summary.
pub fn display_summary(summary: &PeriodSummary, show_bar: bool) {
    print_section_simple(summary.label());
    for line in format_summary(summary, show_bar) {
        println!("{line}");
    }
}

/// Display every session of a day followed by the day's totals.
pub fn display_day_report(report: &DayReport, show_bar: bool) {
    print_section_simple(report.summary.label());
    if report.sessions.is_empty() {
        println!("  No study sessions on this day");
        return;
    }

    for session in &report.sessions {
        println!(
            "  {}  {:<24} {:>8} min",
            session.time_of_day(),
            truncate(&session.subject, 24),
            session.duration.to_minutes_string()
        );
    }
    println!();
    for line in format_summary(&report.summary, show_bar) {
        println!("{line}");
    }
}

/// One line of the subject list.
#[must_use]
pub fn format_subject(subject: &Subject, show_bar: bool) -> String {
    let percent = subject.progress_percent();
    let bar = if show_bar {
        format!("{} ", make_bar(i64::from(percent), 100, 15))
    } else {
        String::new()
    };
    let flag = if subject.is_completed() { " ✓" } else { "" };
    format!(
        "  {:<24} target {:>5} min  done {:>8} min  {}{:>3}%{}",
        truncate(&subject.name, 24),
        subject.target_minutes,
        subject.done.to_minutes_string(),
        bar,
        percent,
        flag
    )
}

/// Display all subjects with their progress.
pub fn display_subjects(subjects: &[Subject], show_bar: bool) {
    print_section_simple("Subjects");
    if subjects.is_empty() {
        println!("  No subjects yet. Add one with `study-tracker subject add NAME`");
        return;
    }
    for subject in subjects {
        println!("{}", format_subject(subject, show_bar));
    }
}

/// Display the most recent `last` sessions of a subject, newest last.
pub fn display_history(subject: &Subject, sessions: &[SubjectSession], last: usize) {
    print_section_simple(&format!("History: {}", subject.name));
    if sessions.is_empty() {
        println!("  No sessions recorded");
        return;
    }

    let skip = sessions.len().saturating_sub(last);
    for session in &sessions[skip..] {
        let jalali = JalaliDate::from_gregorian(session.timestamp.date());
        println!(
            "  {} {}  {:>8} min",
            jalali,
            session.timestamp.format("%H:%M"),
            session.duration.to_minutes_string()
        );
    }
    println!(
        "\n  Showing {} of {} sessions, {} min in total",
        sessions.len() - skip,
        sessions.len(),
        subject.done.to_minutes_string()
    );
}

/// Render a Jalali month as a Saturday-first grid.
///
/// Days in `study_days` are drawn in brackets, e.g. `[ 2]`.
pub fn render_month_grid(month: JalaliMonth, study_days: &StudyDaySet) -> Result<String> {
    let range = month.date_range()?;
    let lead = days_since_week_start(range.start.weekday()) as usize;
    let width = CELL_WIDTH * WEEKDAY_HEADERS.len();

    let mut lines = vec![
        format!("{:^width$}", month.to_string()).trim_end().to_string(),
        WEEKDAY_HEADERS
            .iter()
            .map(|h| format!(" {h} "))
            .collect::<String>()
            .trim_end()
            .to_string(),
    ];

    let mut row = " ".repeat(CELL_WIDTH * lead);
    let mut column = lead;
    for day in 1..=month.length() {
        if study_days.contains(day) {
            row.push_str(&format!("[{day:>2}]"));
        } else {
            row.push_str(&format!(" {day:>2} "));
        }
        column += 1;
        if column == WEEKDAY_HEADERS.len() {
            lines.push(row.trim_end().to_string());
            row.clear();
            column = 0;
        }
    }
    if column > 0 {
        lines.push(row.trim_end().to_string());
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{compute_study_days, SubjectTotal};
    use crate::date_range::DateRange;
    use crate::types::Seconds;
    use chrono::NaiveDate;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("ریاضیات گسسته", 8), "ریاضی...");
    }

    #[test]
    fn test_truncate_small_max_len() {
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("hello", 0), "");
        assert_eq!(truncate("hello", 3), "...");
    }

    #[test]
    fn test_make_bar() {
        assert_eq!(make_bar(100, 100, 10), "██████████");
        assert_eq!(make_bar(50, 100, 10), "█████░░░░░");
        assert_eq!(make_bar(50, 0, 10), "          ");
    }

    fn summary(subjects: &[(&str, i64)]) -> PeriodSummary {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let subjects: Vec<SubjectTotal> = subjects
            .iter()
            .map(|(name, secs)| SubjectTotal {
                subject: (*name).to_string(),
                total: Seconds::new(*secs),
            })
            .collect();
        PeriodSummary {
            range: DateRange::new(date, date, "Farvardin 1403"),
            total: subjects.iter().map(|s| s.total).sum(),
            subjects,
        }
    }

    #[test]
    fn test_format_summary_empty_state() {
        let lines = format_summary(&summary(&[]), true);
        assert_eq!(lines, vec!["  No study sessions in Farvardin 1403"]);
    }

    #[test]
    fn test_format_summary_lists_subjects() {
        let lines = format_summary(&summary(&[("Math", 2430), ("Art", 600)]), false);
        assert!(lines[0].contains("50.50 min"));
        assert!(lines[1].contains("Most studied:  Math (40.50 min)"));
        assert!(lines[3].contains("1. Math"));
        assert!(lines[4].contains("2. Art"));
        assert!(lines[4].ends_with("10.00 min"));
    }

    #[test]
    fn test_format_subject_marks_completion() {
        let done = Subject {
            id: 1,
            name: "Math".to_string(),
            target_minutes: 30,
            done: Seconds::from_mins(45),
        };
        let line = format_subject(&done, false);
        assert!(line.contains("45.00 min"));
        assert!(line.contains("100%"));
        assert!(line.ends_with('✓'));

        let pending = Subject {
            target_minutes: 90,
            ..done
        };
        let line = format_subject(&pending, false);
        assert!(line.ends_with(" 50%"));
    }

    #[test]
    fn test_month_grid_layout() {
        // 1403/01/01 is a Wednesday, the fifth column
        let farvardin = JalaliMonth { year: 1403, month: 1 };
        let day = NaiveDate::from_ymd_opt(2024, 3, 21)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let study = compute_study_days(farvardin, vec![day]);

        let grid = render_month_grid(farvardin, &study).unwrap();
        let lines: Vec<&str> = grid.lines().collect();

        assert_eq!(lines[0].trim(), "Farvardin 1403");
        assert_eq!(lines[1], " Sh  Ye  Do  Se  Ch  Pa  Jo");
        assert_eq!(lines[2], format!("{}  1 [ 2]  3", " ".repeat(16)));
        assert_eq!(lines[3], "  4   5   6   7   8   9  10");
        assert_eq!(lines.last().copied(), Some(" 25  26  27  28  29  30  31"));
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_month_grid_short_month() {
        // Esfand 1402 has 29 days and starts on a Tuesday
        let esfand = JalaliMonth { year: 1402, month: 12 };
        let grid = render_month_grid(esfand, &StudyDaySet::default()).unwrap();
        let last = grid.lines().last().unwrap();
        assert!(last.trim_end().ends_with("29"));
        assert!(!grid.contains('['));
    }

    #[test]
    fn test_month_grid_invalid_month() {
        let bad = JalaliMonth { year: 1403, month: 0 };
        assert!(render_month_grid(bad, &StudyDaySet::default()).is_err());
    }
}
