use std::fs;
use std::path::Path;

use simkit::{Error, Result};

/// Replays a fixed list of random numbers, wrapping around at the end, so
/// "random" choices are reproducible. The file format is the lab one: the
/// count on the first line, then the numbers, whitespace separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandGenerator {
    values: Vec<usize>,
    ofs: usize,
}

impl RandGenerator {
    pub fn new(values: Vec<usize>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidInput("random number list is empty".to_string()));
        }
        Ok(RandGenerator { values, ofs: 0 })
    }

    pub fn from_file(filename: &Path) -> Result<Self> {
        let contents = fs::read_to_string(filename)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut tokens = contents.split_whitespace();
        let count: usize = match tokens.next() {
            Some(token) => token.parse().map_err(|_| Error::malformed(token, "a count"))?,
            None => return Err(Error::Underflow("random file is empty".to_string())),
        };

        let values = tokens
            .take(count)
            .map(|token| token.parse().map_err(|_| Error::malformed(token, "a random number")))
            .collect::<Result<Vec<usize>>>()?;
        if values.len() < count {
            return Err(Error::Underflow(format!(
                "random file announces {} numbers but holds {}",
                count,
                values.len()
            )));
        }
        Self::new(values)
    }

    /// Next number reduced to `0..bound`.
    pub fn next(&mut self, bound: usize) -> usize {
        let value = self.values[self.ofs];
        self.ofs = (self.ofs + 1) % self.values.len();
        value % bound.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn wraps_around() {
        let mut rng = RandGenerator::parse("3\n10\n11\n12\n").unwrap();
        let drawn: Vec<usize> = (0..4).map(|_| rng.next(4)).collect();
        assert_eq!(drawn, vec![2, 3, 0, 2]);
    }

    #[test]
    fn short_files_are_rejected() {
        assert!(matches!(RandGenerator::parse("4\n1 2"), Err(Error::Underflow(_))));
        assert!(matches!(RandGenerator::parse(""), Err(Error::Underflow(_))));
        assert_eq!(
            RandGenerator::parse("2\n1 x"),
            Err(Error::malformed("x", "a random number"))
        );
    }

    #[test]
    fn reads_from_disk() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "2\n5\n8\n")?;
        let mut rng = RandGenerator::from_file(file.path())?;
        assert_eq!(rng.next(3), 2);
        assert_eq!(rng.next(3), 2);
        Ok(())
    }
}
