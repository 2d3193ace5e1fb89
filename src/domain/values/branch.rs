use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three fixture outcomes a strategy can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Home,
    Draw,
    Away,
}

impl Branch {
    /// Evaluation and tie-break priority: earlier wins a tie.
    pub const PRIORITY: [Branch; 3] = [Branch::Home, Branch::Draw, Branch::Away];

    pub fn index(self) -> usize {
        match self {
            Branch::Home => 0,
            Branch::Draw => 1,
            Branch::Away => 2,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Home => write!(f, "home"),
            Branch::Draw => write!(f, "draw"),
            Branch::Away => write!(f, "away"),
        }
    }
}

impl FromStr for Branch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" | "1" => Ok(Branch::Home),
            "draw" | "x" => Ok(Branch::Draw),
            "away" | "2" => Ok(Branch::Away),
            _ => Err(format!("Unknown branch: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_matches_index() {
        for (i, branch) in Branch::PRIORITY.iter().enumerate() {
            assert_eq!(branch.index(), i);
        }
    }

    #[test]
    fn test_parse_slip_notation() {
        assert_eq!("1".parse::<Branch>().unwrap(), Branch::Home);
        assert_eq!("X".parse::<Branch>().unwrap(), Branch::Draw);
        assert_eq!("Away".parse::<Branch>().unwrap(), Branch::Away);
        assert!("both".parse::<Branch>().is_err());
    }
}
