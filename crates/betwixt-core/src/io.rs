//! Graph input and output.
//!
//! - Matrix Market coordinate files (`pattern`, `real`, `integer`; `general`,
//!   `symmetric`, `skew-symmetric`). Values are ignored: only the pattern
//!   matters for betweenness. Indices are 1-based on disk.
//! - Whitespace-separated edge lists with 0-based vertex ids and `#` or `%`
//!   comment lines.

use std::io::{BufRead, Write};

use betwixt_algebra::{AlgebraError, Matrix};
use tracing::debug;

/// Errors from reading or writing graph files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unsupported `%%MatrixMarket` banner or size line.
    #[error("invalid Matrix Market header: {0}")]
    Header(String),

    /// A data line that does not parse or is out of range.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Engine(#[from] AlgebraError),
}

fn parse_error(line: usize, message: impl Into<String>) -> IoError {
    IoError::Parse {
        line,
        message: message.into(),
    }
}

/// A pattern read from a Matrix Market file.
#[derive(Debug, Clone)]
pub struct MatrixMarket {
    pub pattern: Matrix<bool>,
    /// The banner declared `symmetric` or `skew-symmetric`; the mirrored
    /// entries have already been added to `pattern`.
    pub symmetric: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Pattern,
    Valued,
}

fn parse_banner(line: &str) -> Result<(Field, bool), IoError> {
    let tokens: Vec<String> = line
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    let [banner, object, format, field, symmetry] = tokens.as_slice() else {
        return Err(IoError::Header(format!(
            "expected 5 banner tokens, found {}",
            tokens.len()
        )));
    };
    if banner != "%%matrixmarket" {
        return Err(IoError::Header(format!("unknown banner '{banner}'")));
    }
    if object != "matrix" || format != "coordinate" {
        return Err(IoError::Header(format!(
            "only 'matrix coordinate' is supported, got '{object} {format}'"
        )));
    }
    let field = match field.as_str() {
        "pattern" => Field::Pattern,
        "real" | "integer" | "double" => Field::Valued,
        other => return Err(IoError::Header(format!("unsupported field '{other}'"))),
    };
    let symmetric = match symmetry.as_str() {
        "general" => false,
        "symmetric" | "skew-symmetric" => true,
        other => return Err(IoError::Header(format!("unsupported symmetry '{other}'"))),
    };
    Ok((field, symmetric))
}

fn parse_index(token: Option<&str>, bound: usize, line: usize) -> Result<usize, IoError> {
    let token = token.ok_or_else(|| parse_error(line, "missing index"))?;
    let one_based: usize = token
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index '{token}'")))?;
    if one_based == 0 || one_based > bound {
        return Err(parse_error(
            line,
            format!("index {one_based} outside 1..={bound}"),
        ));
    }
    Ok(one_based - 1)
}

/// Read a Matrix Market coordinate file into a boolean pattern.
///
/// # Errors
///
/// [`IoError::Header`] for a bad banner or size line, [`IoError::Parse`] for
/// bad entries or a wrong entry count, [`IoError::Io`] on read failure.
pub fn read_matrix_market<R: BufRead>(reader: R) -> Result<MatrixMarket, IoError> {
    let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (_, banner) = lines
        .next()
        .ok_or_else(|| IoError::Header("empty input".into()))?;
    let (field, symmetric) = parse_banner(&banner?)?;

    let mut size: Option<(usize, usize, usize)> = None;
    let mut cells = Vec::new();
    let mut count = 0usize;
    let mut last_line = 1;
    for (line_no, line) in lines {
        last_line = line_no;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let mut tokens = trimmed.split_whitespace();

        let Some((nrows, ncols, nnz)) = size else {
            let dims: Vec<usize> = tokens
                .map(str::parse::<usize>)
                .collect::<Result<_, _>>()
                .map_err(|_| IoError::Header(format!("line {line_no}: invalid size line")))?;
            let [nrows, ncols, nnz] = dims.as_slice() else {
                return Err(IoError::Header(format!(
                    "line {line_no}: size line needs 3 numbers, found {}",
                    dims.len()
                )));
            };
            size = Some((*nrows, *ncols, *nnz));
            continue;
        };

        if count == nnz {
            return Err(parse_error(line_no, format!("more than {nnz} entries")));
        }
        let i = parse_index(tokens.next(), nrows, line_no)?;
        let j = parse_index(tokens.next(), ncols, line_no)?;
        if field == Field::Valued && tokens.next().is_none() {
            return Err(parse_error(line_no, "missing value"));
        }
        cells.push((i, j, true));
        if symmetric && i != j {
            cells.push((j, i, true));
        }
        count += 1;
    }

    let (nrows, ncols, nnz) =
        size.ok_or_else(|| IoError::Header("missing size line".into()))?;
    if count != nnz {
        return Err(parse_error(
            last_line,
            format!("expected {nnz} entries, found {count}"),
        ));
    }
    let pattern = Matrix::from_triplets(nrows, ncols, cells)?;
    debug!(nrows, ncols, nvals = pattern.nvals(), symmetric, "read Matrix Market");
    Ok(MatrixMarket { pattern, symmetric })
}

/// Write `pattern` as a `pattern general` Matrix Market file.
///
/// # Errors
///
/// [`IoError::Io`] on write failure.
pub fn write_matrix_market<W: Write>(mut writer: W, pattern: &Matrix<bool>) -> Result<(), IoError> {
    writeln!(writer, "%%MatrixMarket matrix coordinate pattern general")?;
    writeln!(
        writer,
        "{} {} {}",
        pattern.nrows(),
        pattern.ncols(),
        pattern.nvals()
    )?;
    for (i, j, _) in pattern.entries() {
        writeln!(writer, "{} {}", i + 1, j + 1)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an edge list: one `u v` pair per line, 0-based. The vertex count is
/// one more than the largest id seen.
///
/// # Errors
///
/// [`IoError::Parse`] for a malformed line, [`IoError::Io`] on read failure.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<(usize, Vec<(usize, usize)>), IoError> {
    let mut edges = Vec::new();
    let mut n = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }
        let mut tokens = trimmed.split_whitespace();
        let mut endpoint = || -> Result<usize, IoError> {
            let token = tokens
                .next()
                .ok_or_else(|| parse_error(line_no, "expected two vertex ids"))?;
            token
                .parse()
                .map_err(|_| parse_error(line_no, format!("invalid vertex id '{token}'")))
        };
        let u = endpoint()?;
        let v = endpoint()?;
        n = n.max(u.saturating_add(1)).max(v.saturating_add(1));
        edges.push((u, v));
    }
    Ok((n, edges))
}
