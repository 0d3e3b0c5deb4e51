use time::{Date, Duration};

/// First due date for a schedule, computed once at creation. Unknown
/// frequencies fall back to the start date itself.
pub fn first_due_date(start_date: Date, frequency: &str) -> Date {
    match frequency {
        "monthly" => start_date + Duration::days(30),
        "quarterly" => start_date + Duration::days(90),
        "yearly" => start_date + Duration::days(365),
        _ => start_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn monthly_adds_thirty_days() {
        assert_eq!(
            first_due_date(date!(2024 - 01 - 15), "monthly"),
            date!(2024 - 02 - 14)
        );
    }

    #[test]
    fn quarterly_adds_ninety_days() {
        assert_eq!(
            first_due_date(date!(2024 - 01 - 01), "quarterly"),
            date!(2024 - 03 - 31)
        );
    }

    #[test]
    fn yearly_adds_365_days() {
        assert_eq!(
            first_due_date(date!(2024 - 01 - 01), "yearly"),
            date!(2024 - 12 - 31)
        );
    }

    #[test]
    fn unknown_frequency_keeps_start_date() {
        assert_eq!(
            first_due_date(date!(2024 - 01 - 01), "weekly"),
            date!(2024 - 01 - 01)
        );
    }
}
