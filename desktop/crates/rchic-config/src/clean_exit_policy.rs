use std::str::FromStr;

use serde::Deserialize;

/// What to do when the backend exits with code 0 before printing a ready signal.
///
/// `Proceed` keeps the historical launcher behaviour: the boot continues and
/// the readiness probe decides. `Fail` treats the exit as a startup failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanExitPolicy {
    #[default]
    Proceed,
    Fail,
}

impl FromStr for CleanExitPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "proceed" => Ok(Self::Proceed),
            "fail" => Ok(Self::Fail),
            _ => Err(()),
        }
    }
}
