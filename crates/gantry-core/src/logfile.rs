//! Reading back the host's log file.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Last `count` lines of the file at `path`, oldest first.
pub fn tail_lines(path: &Path, count: usize) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    let mut lines = VecDeque::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if count == 0 {
            continue;
        }
        if lines.len() == count {
            lines.pop_front();
        }
        lines.push_back(line);
    }
    Ok(lines.into())
}
