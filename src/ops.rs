use std::fmt;
use std::str::FromStr;

/// One scripted step, as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Add a row from the template.
    Add,
    /// Remove the row at this position (0-based, document order).
    Remove(usize),
    /// Click the element with this id and let the listener registry route it.
    Click(String),
}

impl FromStr for Op {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw == "add" {
            return Ok(Op::Add);
        }
        match raw.split_once(':') {
            Some(("remove", position)) => position
                .parse()
                .map(Op::Remove)
                .map_err(|err| format!("bad row position in {raw:?}: {err}")),
            Some(("click", id)) if !id.is_empty() => Ok(Op::Click(id.to_string())),
            _ => Err(format!(
                "unknown op {raw:?} (expected add, remove:<position> or click:<element-id>)"
            )),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Add => f.write_str("add"),
            Op::Remove(position) => write!(f, "remove:{position}"),
            Op::Click(id) => write!(f, "click:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ops() {
        assert_eq!("add".parse(), Ok(Op::Add));
        assert_eq!(" remove:2 ".parse(), Ok(Op::Remove(2)));
        assert_eq!("click:item-add".parse(), Ok(Op::Click("item-add".to_string())));
        assert_eq!(Op::Click("a:b".to_string()).to_string(), "click:a:b");
    }

    #[test]
    fn rejects_malformed_ops() {
        assert!("remove:x".parse::<Op>().unwrap_err().contains("bad row position"));
        assert!("remove".parse::<Op>().is_err());
        assert!("click:".parse::<Op>().is_err());
        assert!("drop:1".parse::<Op>().is_err());
    }
}
