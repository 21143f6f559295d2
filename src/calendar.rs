use chrono::{Datelike, Duration, NaiveDate};

/// Cells of the active month laid out for a 7-column grid starting Monday.
/// Leading `None`s pad the first week so day 1 lands on its weekday column.
pub fn month_cells(cursor: NaiveDate) -> Vec<Option<NaiveDate>> {
    let first = cursor.with_day(1).unwrap_or(cursor);
    let lead = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<Option<NaiveDate>> = vec![None; lead];
    let mut day = first;
    while day.month() == first.month() {
        cells.push(Some(day));
        day += Duration::days(1);
    }
    cells
}

pub fn month_label(cursor: NaiveDate) -> String {
    cursor.format("%B %Y").to_string()
}

/// First day of the previous month.
pub fn prev_month(cursor: NaiveDate) -> NaiveDate {
    let first = cursor.with_day(1).unwrap_or(cursor);
    let back = first - Duration::days(1);
    back.with_day(1).unwrap_or(back)
}

/// First day of the next month.
pub fn next_month(cursor: NaiveDate) -> NaiveDate {
    let first = cursor.with_day(1).unwrap_or(cursor);
    // Day 28 exists in every month, so stepping 31 days from it always lands
    // in the following month.
    let forward = first.with_day(28).unwrap_or(first) + Duration::days(31);
    forward.with_day(1).unwrap_or(forward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_month_cells_pads_to_monday_start() {
        // 2025-06-01 is a Sunday: six leading blanks.
        let cells = month_cells(date("2025-06-15"));
        assert_eq!(cells.len(), 6 + 30);
        assert_eq!(cells[0], None);
        assert_eq!(cells[5], None);
        assert_eq!(cells[6], Some(date("2025-06-01")));
        assert_eq!(cells[35], Some(date("2025-06-30")));
    }

    #[test]
    fn test_month_cells_no_padding_when_month_starts_monday() {
        // 2025-09-01 is a Monday.
        let cells = month_cells(date("2025-09-01"));
        assert_eq!(cells[0], Some(date("2025-09-01")));
        assert_eq!(cells.len(), 30);
    }

    #[test]
    fn test_month_navigation() {
        assert_eq!(prev_month(date("2025-01-15")), date("2024-12-01"));
        assert_eq!(next_month(date("2024-12-25")), date("2025-01-01"));
        assert_eq!(next_month(date("2025-01-31")), date("2025-02-01"));
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(date("2025-06-01")), "June 2025");
    }
}
