use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use simkit::{Error, Result, Selection};

use crate::{Policy, Process};

lazy_static! {
    /// `RR4`, `R4` or `RR:4`: round robin with an explicit quantum.
    static ref RR_QUANTUM: Regex = Regex::new(r"^(?i)rr?\s*:?\s*(\d+)$").unwrap();
}

#[derive(Debug, PartialEq)]
pub struct CpuInput {
    pub selection: Selection<Policy>,
    /// quantum named in the algorithm column, if any
    pub quantum: Option<usize>,
    pub processes: Vec<Process>,
}

// The input line is `n | bursts | priorities | arrivals | algorithm`, e.g.
// `5 | 10,1,2,1,3 | 3,1,4,5,2 | 0 | Priority`. A priority or arrival column
// that is `0` or missing means all zeros. Pids are assigned from 1 in
// declaration order.
pub fn parse_line(line: &str) -> Result<CpuInput> {
    let sections: Vec<&str> = line.split('|').map(str::trim).collect();
    if sections.len() < 3 {
        return Err(Error::Underflow(format!(
            "expected `n | bursts [| priorities] [| arrivals] | algorithm`, got {:?}",
            line.trim()
        )));
    }
    if sections.len() > 5 {
        return Err(Error::InvalidInput(format!("too many sections in {:?}", line.trim())));
    }

    let count: usize =
        sections[0].parse().map_err(|_| Error::malformed(sections[0], "a process count"))?;
    let bursts: Vec<usize> = column(sections[1], count, "a burst time")?;
    let columns = &sections[2..sections.len() - 1];
    let priorities: Vec<i32> = optional_column(columns.first(), count, "a priority")?;
    let arrivals: Vec<usize> = optional_column(columns.get(1), count, "an arrival time")?;
    let (selection, quantum) = parse_algorithm(sections[sections.len() - 1])?;

    let processes = (0..count)
        .map(|i| Process::new(i + 1, bursts[i], priorities[i], arrivals[i]))
        .collect();
    Ok(CpuInput { selection, quantum, processes })
}

pub fn parse_algorithm(token: &str) -> Result<(Selection<Policy>, Option<usize>)> {
    let token = token.trim();
    if let Some(caps) = RR_QUANTUM.captures(token) {
        let quantum = caps[1].parse().map_err(|_| Error::malformed(token, "RR<quantum>"))?;
        return Ok((Selection::One(Policy::RoundRobin), Some(quantum)));
    }
    Ok((token.parse()?, None))
}

fn column<T: FromStr>(section: &str, count: usize, expected: &'static str) -> Result<Vec<T>> {
    let values = section
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.parse().map_err(|_| Error::malformed(token, expected)))
        .collect::<Result<Vec<T>>>()?;
    if values.len() != count {
        return Err(Error::Underflow(format!(
            "expected {} values for {}, got {}",
            count,
            expected,
            values.len()
        )));
    }
    Ok(values)
}

fn optional_column<T>(section: Option<&&str>, count: usize, expected: &'static str) -> Result<Vec<T>>
where
    T: FromStr + Default + Clone,
{
    match section {
        Some(&section) if !section.is_empty() && section != "0" => column(section, count, expected),
        _ => Ok(vec![T::default(); count]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_lab_example() -> Result<()> {
        let input = parse_line("5 | 10,1,2,1,3 | 3,1,4,5,2 | 0 | Priority")?;
        assert_eq!(input.selection, Selection::One(Policy::Priority));
        assert_eq!(input.quantum, None);
        assert_eq!(input.processes.len(), 5);
        assert_eq!(input.processes[0], Process::new(1, 10, 3, 0));
        assert_eq!(input.processes[4], Process::new(5, 3, 2, 0));
        Ok(())
    }

    #[test]
    fn missing_columns_default_to_zero() -> Result<()> {
        let input = parse_line("3 | 4,2,1 | all")?;
        assert_eq!(input.selection, Selection::All);
        assert!(input.processes.iter().all(|p| p.priority == 0 && p.arrival == 0));

        let input = parse_line("2 | 4,2 | 1,2 | SJF")?;
        assert_eq!(input.processes[1], Process::new(2, 2, 2, 0));
        Ok(())
    }

    #[test]
    fn reads_arrivals() -> Result<()> {
        let input = parse_line("2 | 4, 2 | 0 | 0, 3 | FCFS")?;
        assert_eq!(input.processes[1].arrival, 3);
        assert_eq!(input.processes[1].priority, 0);
        Ok(())
    }

    #[test]
    fn round_robin_quantum_in_algorithm() -> Result<()> {
        assert_eq!(parse_algorithm("RR")?, (Selection::One(Policy::RoundRobin), None));
        assert_eq!(parse_algorithm("rr4")?, (Selection::One(Policy::RoundRobin), Some(4)));
        assert_eq!(parse_algorithm("R:3")?, (Selection::One(Policy::RoundRobin), Some(3)));
        assert_eq!(parse_algorithm("mlfq")?, (Selection::One(Policy::Mlfq), None));
        Ok(())
    }

    #[test]
    fn count_mismatch_is_underflow() {
        assert!(matches!(parse_line("3 | 4,2 | FCFS"), Err(Error::Underflow(_))));
        assert!(matches!(parse_line("2 | 4,2 | 1 | FCFS"), Err(Error::Underflow(_))));
        assert!(matches!(parse_line("2 | FCFS"), Err(Error::Underflow(_))));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse_line("x | 4 | FCFS"), Err(Error::MalformedToken { .. })));
        assert!(matches!(parse_line("1 | 4a | FCFS"), Err(Error::MalformedToken { .. })));
        assert!(matches!(parse_line("1 | 4 | LCFS"), Err(Error::UnknownPolicy(_))));
        assert!(matches!(parse_line("1 | 4 | 0 | 0 | 0 | FCFS"), Err(Error::InvalidInput(_))));
    }
}
