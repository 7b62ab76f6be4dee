use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::cli::CalendarArgs;

/// Term/week layout of the academic year. Terms and weeks are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicCalendar {
    pub term_start: NaiveDate,
    pub terms: u32,
    pub weeks_per_term: u32,
    pub short_break_weeks: u32,
    pub long_break_weeks: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermStart {
    pub term: u32,
    pub starts_on: NaiveDate,
}

impl AcademicCalendar {
    pub fn from_args(args: &CalendarArgs) -> Self {
        Self {
            term_start: args.term_start,
            terms: args.terms,
            weeks_per_term: args.weeks_per_term,
            short_break_weeks: args.short_break_weeks,
            long_break_weeks: args.long_break_weeks,
        }
    }

    /// Every (term, week) slot in calendar order.
    pub fn grid(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (1..=self.terms).flat_map(move |term| (1..=self.weeks_per_term).map(move |week| (term, week)))
    }

    pub fn contains(&self, term: u32, week: u32) -> bool {
        (1..=self.terms).contains(&term) && (1..=self.weeks_per_term).contains(&week)
    }

    /// Weeks of holiday following `term`; the long break sits after term 2.
    pub fn break_after(&self, term: u32) -> u32 {
        if term >= self.terms {
            0
        } else if term == 2 {
            self.long_break_weeks
        } else {
            self.short_break_weeks
        }
    }

    pub fn term_starts_on(&self, term: u32) -> Option<NaiveDate> {
        if term == 0 || term > self.terms {
            return None;
        }
        let weeks: u32 = (1..term)
            .map(|previous| self.weeks_per_term + self.break_after(previous))
            .sum();
        self.term_start
            .checked_add_days(Days::new(u64::from(weeks) * 7))
    }

    pub fn term_starts(&self) -> Vec<TermStart> {
        (1..=self.terms)
            .filter_map(|term| {
                self.term_starts_on(term)
                    .map(|starts_on| TermStart { term, starts_on })
            })
            .collect()
    }

    /// Numbering rules handed to the model so returned weeks line up with the
    /// school calendar.
    pub fn prompt_clause(&self) -> String {
        let start = self.term_start.format("%-d %B");
        let short_terms = (1..self.terms)
            .filter(|term| *term != 2)
            .map(|term| format!("term {term}"))
            .collect::<Vec<_>>()
            .join(" and ");

        let mut clause = format!(
            "term and week should be numeric and note that Term 1 Week 1 starts on {start} and each term has {} weeks. ",
            self.weeks_per_term
        );
        if !short_terms.is_empty() {
            clause.push_str(&format!(
                "There is a {} week-long holiday AFTER the end of {short_terms}",
                self.short_break_weeks
            ));
        }
        if self.terms > 2 {
            clause.push_str(&format!(
                " and there is a {} week-long holiday AFTER the end of term 2",
                self.long_break_weeks
            ));
        }
        clause.push_str(" so for each subject's scheme of work, it should start at term 1 week 2.");
        clause
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> AcademicCalendar {
        AcademicCalendar {
            term_start: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            terms: 4,
            weeks_per_term: 10,
            short_break_weeks: 1,
            long_break_weeks: 4,
        }
    }

    #[test]
    fn grid_covers_every_term_week_in_order() {
        let grid = calendar().grid().collect::<Vec<_>>();
        assert_eq!(grid.len(), 40);
        assert_eq!(grid[0], (1, 1));
        assert_eq!(grid[9], (1, 10));
        assert_eq!(grid[10], (2, 1));
        assert_eq!(grid[39], (4, 10));
    }

    #[test]
    fn term_starts_account_for_breaks() {
        let calendar = calendar();
        let starts = calendar.term_starts();
        assert_eq!(starts.len(), 4);
        // 10 weeks + 1 week break
        assert_eq!(starts[1].starts_on, NaiveDate::from_ymd_opt(2025, 3, 23).unwrap());
        // + 10 weeks + 4 week break
        assert_eq!(starts[2].starts_on, NaiveDate::from_ymd_opt(2025, 6, 29).unwrap());
        assert_eq!(starts[3].starts_on, NaiveDate::from_ymd_opt(2025, 9, 14).unwrap());
        assert_eq!(calendar.term_starts_on(5), None);
    }

    #[test]
    fn prompt_clause_names_offsets() {
        let clause = calendar().prompt_clause();
        assert!(clause.contains("Term 1 Week 1 starts on 5 January"));
        assert!(clause.contains("each term has 10 weeks"));
        assert!(clause.contains("1 week-long holiday AFTER the end of term 1 and term 3"));
        assert!(clause.contains("4 week-long holiday AFTER the end of term 2"));
        assert!(clause.ends_with("it should start at term 1 week 2."));
    }
}
