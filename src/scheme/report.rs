use super::*;

/// One `## Term T Week W` block per calendar slot, each listing
/// `<subject> - <task>` lines in subject order and closed by a blank line.
/// Slots without work keep their heading.
pub fn render_report(calendar: &AcademicCalendar, schedules: &[SubjectSchedule]) -> String {
    let mut report = String::new();

    for (term, week) in calendar.grid() {
        report.push_str(&format!("## Term {term} Week {week}\n"));

        let slot_items = schedules
            .iter()
            .flat_map(|schedule| schedule.items.iter())
            .filter(|item| item.term == term && item.week == week);

        for item in slot_items {
            for task in &item.tasks {
                report.push_str(&format!("{} - {}\n", item.subject, task));
            }
        }

        report.push('\n');
    }

    report
}
