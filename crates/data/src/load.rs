use anyhow::{bail, Context};
use deckopt_core::{OpponentMatrix, DECK_SIZE};
use deckopt_search::SolverSettings;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Parse a headerless comma-separated grid of integers. Blank lines are
/// skipped; every data row must be the same width as the row count.
pub fn parse_matrix(text: &str) -> anyhow::Result<OpponentMatrix> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for (col, cell) in line.split(',').enumerate() {
            let value: i32 = cell.trim().parse().with_context(|| {
                format!("row {} column {}: bad cell {:?}", line_no + 1, col + 1, cell)
            })?;
            row.push(value);
        }
        rows.push(row);
    }
    let matrix = OpponentMatrix::from_rows(rows)?;
    Ok(matrix)
}

/// Load the production opponent matrix. Anything that is not exactly
/// `DECK_SIZE x DECK_SIZE` is fatal here, never truncated or padded.
pub fn load_opponent_matrix(path: &Path) -> anyhow::Result<OpponentMatrix> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let matrix = parse_matrix(&raw).with_context(|| format!("parse {}", path.display()))?;
    if matrix.size() != DECK_SIZE {
        bail!(
            "{}: expected a {}x{} opponent matrix, found {}x{}",
            path.display(),
            DECK_SIZE,
            DECK_SIZE,
            matrix.size(),
            matrix.size()
        );
    }
    Ok(matrix)
}

pub fn load_solver_settings(path: &Path) -> anyhow::Result<SolverSettings> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_square_grid() {
        let matrix = parse_matrix("1,2,3\n4,5,6\n7,8,9\n").unwrap();
        assert_eq!(matrix.size(), 3);
        assert_eq!(matrix.value(1, 2), 6);
        assert_eq!(matrix.value(2, 0), 7);
    }

    #[test]
    fn tolerates_whitespace_and_blank_lines() {
        let matrix = parse_matrix(" 1 , 2 \n\n 3 , 4 \n").unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.value(0, 1), 2);
    }

    #[test]
    fn reports_the_bad_cell() {
        let err = parse_matrix("1,2\n3,x\n").unwrap_err();
        assert!(format!("{err:#}").contains("row 2 column 2"));
    }

    #[test]
    fn rejects_ragged_grids() {
        assert!(parse_matrix("1,2,3\n4,5\n6,7,8\n").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_matrix("").is_err());
    }

    #[test]
    fn settings_default_missing_fields() {
        let settings: SolverSettings = serde_json::from_str("{\"seed\": 9}").unwrap();
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.beam.width, 100);
        assert_eq!(settings.genetic.population, 20);
    }
}
