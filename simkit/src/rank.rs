//! Comparative ("ALL") mode shared by every family.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::Error;

/// A policy with the scalar it scored in one comparative run. Lower is better.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranked<P> {
    pub policy: P,
    pub score: f64,
}

/// Orders per-policy scores ascending. The sort is stable, so policies with
/// equal scores keep the order they were run in. Scores are never touched.
pub fn rank<P, I>(scores: I) -> Vec<Ranked<P>>
where
    I: IntoIterator<Item = (P, f64)>,
{
    let mut ranked: Vec<Ranked<P>> =
        scores.into_iter().map(|(policy, score)| Ranked { policy, score }).collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked
}

/// What the caller asked for: one named policy, or all of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection<P> {
    One(P),
    All,
}

impl<P> FromStr for Selection<P>
where
    P: FromStr<Err = Error>,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            name.parse().map(Selection::One)
        }
    }
}

impl<P: Display> Display for Selection<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::One(policy) => policy.fmt(f),
            Selection::All => f.write_str("ALL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Toy {
        A,
        B,
    }

    impl FromStr for Toy {
        type Err = Error;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "A" => Ok(Toy::A),
                "B" => Ok(Toy::B),
                _ => Err(Error::UnknownPolicy(s.to_string())),
            }
        }
    }

    #[test]
    fn rank_is_a_pure_ascending_sort() {
        let scores = vec![("fcfs", 640.0), ("sstf", 236.0), ("scan", 331.0), ("look", 299.0)];
        let ranked = rank(scores.clone());

        let mut expected: Vec<f64> = scores.iter().map(|(_, s)| *s).collect();
        expected.sort_by(|a, b| a.total_cmp(b));
        let got: Vec<f64> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(got, expected);
        assert_eq!(ranked[0].policy, "sstf");
        assert_eq!(ranked[3].policy, "fcfs");
    }

    #[test]
    fn ties_keep_run_order() {
        let ranked = rank(vec![("x", 2.0), ("y", 1.0), ("z", 2.0)]);
        let order: Vec<&str> = ranked.iter().map(|r| r.policy).collect();
        assert_eq!(order, vec!["y", "x", "z"]);
    }

    #[test]
    fn selection_parses_all_case_insensitively() {
        assert_eq!("all".parse::<Selection<Toy>>(), Ok(Selection::All));
        assert_eq!(" ALL ".parse::<Selection<Toy>>(), Ok(Selection::All));
        assert_eq!("A".parse::<Selection<Toy>>(), Ok(Selection::One(Toy::A)));
        assert_eq!("B".parse::<Selection<Toy>>(), Ok(Selection::One(Toy::B)));
        assert_eq!(
            "Q".parse::<Selection<Toy>>(),
            Err(Error::UnknownPolicy("Q".to_string()))
        );
    }
}
