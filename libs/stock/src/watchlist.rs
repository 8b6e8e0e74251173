use std::fmt;

use crate::Quote;

/// Shown in place of a table when there are no quotes.
pub const NOTHING_HERE: &str = "There's nothing here";

/// Quotes ordered by percent change, biggest gainer first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchList(Vec<Quote>);

impl WatchList {
    pub fn new(mut quotes: Vec<Quote>) -> Self {
        quotes.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
        Self(quotes)
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.0
    }

    /// Mean percent change across all rows, in percent (1.0 = 1%).
    /// `None` for an empty list.
    pub fn average_percent(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }

        let total: f64 = self.0.iter().map(|q| q.change_percent * 100.0).sum();
        Some(total / self.0.len() as f64)
    }
}

impl fmt::Display for WatchList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(average) = self.average_percent() else {
            return f.write_str(NOTHING_HERE);
        };

        writeln!(
            f,
            "{:<8}{:>15}{:>15}{:>16}",
            "Company", "Current Price", "Todays Change", "Percent Change"
        )?;
        writeln!(f, "{}", "-".repeat(54))?;
        for q in &self.0 {
            writeln!(
                f,
                "{:<8}{:>15.2}{:>15.2}{:>16.3}",
                q.ticker,
                q.latest_price,
                q.change,
                q.change_percent * 100.0
            )?;
        }
        write!(
            f,
            "{:<8}{:>15}{:>15}{:>16}",
            "Avg.",
            "---",
            "---",
            format!("{average:.3}%")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(ticker: &str, change_percent: f64) -> Quote {
        Quote {
            ticker: ticker.to_string(),
            latest_price: 10.0,
            change: 0.1,
            change_percent,
        }
    }

    #[test]
    fn sorts_by_percent_change_descending() {
        let list = WatchList::new(vec![
            quote("AMD", 0.01),
            quote("TSLA", 0.03),
            quote("GOOG", -0.02),
        ]);

        let order: Vec<&str> = list.quotes().iter().map(|q| q.ticker.as_str()).collect();
        assert_eq!(order, vec!["TSLA", "AMD", "GOOG"]);
    }

    #[test]
    fn average_row_is_mean_of_percent_changes() {
        let list = WatchList::new(vec![
            quote("AMD", 0.01),
            quote("TSLA", 0.03),
            quote("GOOG", -0.02),
        ]);

        let average = list.average_percent().unwrap();
        assert!((average - 2.0 / 3.0).abs() < 1e-9);

        let rendered = list.to_string();
        let last = rendered.lines().last().unwrap();
        assert!(last.starts_with("Avg."));
        assert!(last.ends_with("0.667%"));
    }

    #[test]
    fn empty_list_has_no_average_row() {
        let list = WatchList::new(vec![]);

        assert_eq!(list.average_percent(), None);
        assert_eq!(list.to_string(), NOTHING_HERE);
    }

    #[test]
    fn rows_show_percent_scaled_by_hundred() {
        let list = WatchList::new(vec![quote("AMD", 0.05)]);
        let rendered = list.to_string();

        let row = rendered.lines().nth(2).unwrap();
        assert!(row.starts_with("AMD"));
        assert!(row.ends_with("5.000"));
    }
}
