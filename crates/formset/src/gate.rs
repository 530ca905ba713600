use std::fmt;

/// Upper bound on the number of rows, read once from the max-count field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxCount {
    Unbounded,
    Limit(usize),
}

impl MaxCount {
    /// Interpret the raw max-count field value.
    ///
    /// An absent field or the exact empty string means unbounded. A number is a
    /// limit, `0` included (the add affordance is then never shown). Anything
    /// else cannot be compared with a count and is treated as a limit of zero.
    pub fn from_field(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return MaxCount::Unbounded;
        };
        if raw.is_empty() {
            return MaxCount::Unbounded;
        }
        match raw.trim().parse::<usize>() {
            Ok(limit) => MaxCount::Limit(limit),
            Err(err) => {
                log::warn!(
                    target: "formset",
                    "max-count value {raw:?} is not a row count ({err}); adding rows is disabled"
                );
                MaxCount::Limit(0)
            }
        }
    }

    pub fn limit(self) -> Option<usize> {
        match self {
            MaxCount::Unbounded => None,
            MaxCount::Limit(limit) => Some(limit),
        }
    }
}

impl fmt::Display for MaxCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxCount::Unbounded => f.write_str("unbounded"),
            MaxCount::Limit(limit) => write!(f, "{limit}"),
        }
    }
}

/// Whether the add affordance is available at `total` rows.
pub fn add_allowed(total: usize, max: MaxCount) -> bool {
    match max {
        MaxCount::Unbounded => true,
        MaxCount::Limit(limit) => limit > total,
    }
}
