use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The selector value that shows every category.
pub const ALL: &str = "all";

/// The category selection that narrows the displayed transaction list. It never affects totals.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub enum Filter {
    /// Every transaction is shown.
    #[default]
    All,
    /// Only transactions whose category equals this string exactly.
    Category(String),
}

impl Filter {
    pub fn category(category: impl Into<String>) -> Self {
        Filter::Category(category.into())
    }

    /// Returns true if a transaction with `category` passes this filter.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(c) => c == category,
        }
    }
}

impl FromStr for Filter {
    type Err = Infallible;

    /// Parses a selector value. `all` selects everything, anything else is a category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            Ok(Filter::All)
        } else {
            Ok(Filter::Category(s.to_string()))
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => f.write_str(ALL),
            Filter::Category(c) => f.write_str(c),
        }
    }
}

#[test]
fn filter_selector_values() {
    assert_eq!(Filter::from_str("all").unwrap(), Filter::All);
    assert_eq!(
        Filter::from_str("Housing").unwrap(),
        Filter::category("Housing")
    );
    assert_eq!(Filter::category("Job").to_string(), "Job");
    assert_eq!(Filter::default().to_string(), "all");
}

#[test]
fn filter_matches_exactly() {
    let f = Filter::category("Food");
    assert!(f.matches("Food"));
    assert!(!f.matches("food"));
    assert!(!f.matches("Food "));
    assert!(Filter::All.matches(""));
}
