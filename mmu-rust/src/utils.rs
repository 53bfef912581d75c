use lazy_static::lazy_static;
use regex::Regex;
use simkit::{Error, Result};

use crate::memory::{Access, DEFAULT_FRAME_COUNT};

lazy_static! {
    static ref PAGE: Regex = Regex::new(r"^(\d+)(\*)?$").unwrap();
}

fn tokens(input: &str) -> impl Iterator<Item = &str> {
    input
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// An access sequence looks like `[2,6,1*,8]`: brackets and blanks are
// optional, a trailing `*` marks the access as a write.
pub fn parse_accesses(input: &str) -> Result<Vec<Access>> {
    tokens(input)
        .map(|token| {
            let caps = PAGE.captures(token).ok_or_else(|| Error::malformed(token, "a page number"))?;
            let page = caps[1].parse().map_err(|_| Error::malformed(token, "a page number"))?;
            Ok(Access { page, modified: caps.get(2).is_some() })
        })
        .collect()
}

/// `0` (or nothing) means an empty memory, otherwise a page list in the
/// access notation; write marks are ignored since preloaded pages are clean.
pub fn parse_initial_state(input: &str) -> Result<Vec<usize>> {
    if input.trim().is_empty() || input.trim() == "0" {
        return Ok(Vec::new());
    }
    Ok(parse_accesses(input)?.into_iter().map(|access| access.page).collect())
}

/// Blank or `0` picks the default frame count.
pub fn parse_frame_count(input: &str) -> Result<usize> {
    let token = input.trim();
    if token.is_empty() {
        return Ok(DEFAULT_FRAME_COUNT);
    }
    match token.parse() {
        Ok(0) => Ok(DEFAULT_FRAME_COUNT),
        Ok(count) => Ok(count),
        Err(_) => Err(Error::malformed(token, "a frame count")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_writes_and_brackets() {
        assert_eq!(
            parse_accesses("[2, 6,1*,8]").unwrap(),
            vec![Access::read(2), Access::read(6), Access::write(1), Access::read(8)]
        );
        assert_eq!(parse_accesses("3*").unwrap(), vec![Access::write(3)]);
        assert!(parse_accesses("[]").unwrap().is_empty());
    }

    #[test]
    fn reports_the_offending_token() {
        assert_eq!(parse_accesses("[1,2,x*,4]"), Err(Error::malformed("x*", "a page number")));
        assert_eq!(parse_accesses("1,-2"), Err(Error::malformed("-2", "a page number")));
    }

    #[test]
    fn initial_state_and_frame_count_defaults() {
        assert!(parse_initial_state("0").unwrap().is_empty());
        assert_eq!(parse_initial_state("[0,5,2,8]").unwrap(), vec![0, 5, 2, 8]);
        assert_eq!(parse_frame_count("").unwrap(), DEFAULT_FRAME_COUNT);
        assert_eq!(parse_frame_count("0").unwrap(), DEFAULT_FRAME_COUNT);
        assert_eq!(parse_frame_count(" 3 ").unwrap(), 3);
        assert!(matches!(parse_frame_count("three"), Err(Error::MalformedToken { .. })));
    }
}
