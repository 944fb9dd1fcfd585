//! Holdings table adapter: CSV rows → validated `PortfolioSnapshot`.
//!
//! Expects a header row containing `symbol`, `quantity` and `avg_price`
//! (matched after trimming and lowercasing). Extra columns are ignored and
//! blank lines are skipped. Row numbers in errors are 1-based data rows,
//! not counting the header.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use foliolab_core::{EngineError, Holding, PortfolioSnapshot};

pub const REQUIRED_COLUMNS: [&str; 3] = ["symbol", "quantity", "avg_price"];

#[derive(Debug, Error)]
pub enum HoldingsError {
    #[error("failed to open holdings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV decode error: {0}")]
    Csv(#[from] csv::Error),
    #[error("holdings file is empty")]
    Empty,
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: column '{column}' value '{value}' is not a number")]
    NotANumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: EngineError,
    },
    #[error(transparent)]
    Snapshot(#[from] EngineError),
}

/// Load holdings from a CSV file on disk.
pub fn load_holdings(path: &Path) -> Result<PortfolioSnapshot, HoldingsError> {
    let file = std::fs::File::open(path).map_err(|source| HoldingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = read_holdings(file)?;
    debug!(path = %path.display(), holdings = snapshot.len(), "loaded holdings");
    Ok(snapshot)
}

/// Decode holdings from any CSV reader.
pub fn read_holdings<R: Read>(reader: R) -> Result<PortfolioSnapshot, HoldingsError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&c| column(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(HoldingsError::Empty);
    }
    if !missing.is_empty() {
        return Err(HoldingsError::MissingColumns(missing));
    }
    let (Some(symbol_col), Some(quantity_col), Some(price_col)) =
        (column("symbol"), column("quantity"), column("avg_price"))
    else {
        return Err(HoldingsError::MissingColumns(missing));
    };

    let mut holdings = Vec::new();
    for (index, record) in csv.records().enumerate() {
        let record = record?;
        let row = index + 1;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let field = |col: usize| record.get(col).unwrap_or("");
        let holding = Holding::new(
            field(symbol_col),
            parse_number(row, "quantity", field(quantity_col))?,
            parse_number(row, "avg_price", field(price_col))?,
        );
        holding
            .validate()
            .map_err(|source| HoldingsError::InvalidRow { row, source })?;
        holdings.push(holding);
    }

    if holdings.is_empty() {
        return Err(HoldingsError::Empty);
    }
    Ok(PortfolioSnapshot::new(holdings)?)
}

fn parse_number(row: usize, column: &'static str, value: &str) -> Result<f64, HoldingsError> {
    value.parse::<f64>().map_err(|_| HoldingsError::NotANumber {
        row,
        column,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_required_columns_in_any_order() {
        let csv = "Avg_Price, Symbol ,quantity,sector\n100,AAPL,10,tech\n200,GOOG,5,tech\n";
        let snap = read_holdings(csv.as_bytes()).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.holdings()[0], Holding::new("AAPL", 10.0, 100.0));
        assert_eq!(snap.holdings()[1], Holding::new("GOOG", 5.0, 200.0));
    }

    #[test]
    fn trims_fields_and_skips_blank_lines() {
        let csv = "symbol,quantity,avg_price\n  AAPL , 10 , 100.5 \n\n,,\nMSFT,1,400\n";
        let snap = read_holdings(csv.as_bytes()).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.holdings()[0].avg_price, 100.5);
    }

    #[test]
    fn missing_columns_listed() {
        let err = read_holdings("symbol,qty\nAAPL,1\n".as_bytes()).unwrap_err();
        match err {
            HoldingsError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["quantity".to_string(), "avg_price".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_reports_row() {
        let csv = "symbol,quantity,avg_price\nAAPL,10,100\nGOOG,five,200\n";
        let err = read_holdings(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "row 2: column 'quantity' value 'five' is not a number"
        );
    }

    #[test]
    fn negative_quantity_rejected_with_row() {
        let csv = "symbol,quantity,avg_price\nAAPL,-1,100\n";
        let err = read_holdings(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            HoldingsError::InvalidRow {
                row: 1,
                source: EngineError::InvalidHolding { .. }
            }
        ));
    }

    #[test]
    fn duplicate_symbol_rejected() {
        let csv = "symbol,quantity,avg_price\nAAPL,1,100\nAAPL,2,100\n";
        let err = read_holdings(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            HoldingsError::Snapshot(EngineError::DuplicateSymbol(_))
        ));
    }

    #[test]
    fn header_only_is_empty() {
        let err = read_holdings("symbol,quantity,avg_price\n".as_bytes()).unwrap_err();
        assert!(matches!(err, HoldingsError::Empty));
        let err = read_holdings("".as_bytes()).unwrap_err();
        assert!(matches!(err, HoldingsError::Empty));
    }
}
