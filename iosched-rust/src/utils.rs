use lazy_static::lazy_static;
use regex::Regex;
use simkit::settings::DiskSettings;
use simkit::{Error, Result, Selection};

use crate::{Direction, Policy, Workload};

lazy_static! {
    static ref HEAD: Regex = Regex::new(r"^(?i)(?:head\s*:\s*)?(\d+)$").unwrap();
}

/// A parsed input line: what to run and on what.
#[derive(Debug, PartialEq)]
pub struct DiskInput {
    pub selection: Selection<Policy>,
    pub workload: Workload,
}

// The input line is `requests | algorithm | Head:<n> | direction`, e.g.
// `98, 183, 37, 122 | SSTF | Head:53 | ASC`. Head and direction are optional
// and default from the settings. Requests are comma separated and may be empty.
pub fn parse_line(line: &str, defaults: &DiskSettings) -> Result<DiskInput> {
    let sections: Vec<&str> = line.split('|').map(str::trim).collect();
    if sections.len() < 2 {
        return Err(Error::Underflow(format!(
            "expected `requests | algorithm [| Head:n] [| direction]`, got {:?}",
            line.trim()
        )));
    }

    let requests = parse_requests(sections[0])?;
    let selection: Selection<Policy> = sections[1].parse()?;
    let head = match sections.get(2) {
        Some(token) => parse_head(token)?,
        None => defaults.head,
    };
    let direction = sections.get(3).copied().unwrap_or(defaults.direction.as_str());
    let direction = Direction::from_token(direction);

    Ok(DiskInput {
        selection,
        workload: Workload { requests, head, direction, max_cylinder: defaults.max_cylinder },
    })
}

pub fn parse_requests(section: &str) -> Result<Vec<usize>> {
    section
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.parse().map_err(|_| Error::malformed(token, "a cylinder number")))
        .collect()
}

fn parse_head(token: &str) -> Result<usize> {
    HEAD.captures(token)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| Error::malformed(token, "Head:<cylinder>"))
}
