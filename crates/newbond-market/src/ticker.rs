//! Ticker symbol normalization

use crate::error::{MarketError, Result};

const MAX_TICKER_LEN: usize = 12;

/// Trim and uppercase a user-supplied symbol.
///
/// Accepts ASCII letters, digits and the separators Yahoo uses for share
/// classes, indices and FX (`.`, `-`, `^`, `=`).
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(MarketError::InvalidInput("ticker is empty".to_string()));
    }
    if ticker.len() > MAX_TICKER_LEN {
        return Err(MarketError::InvalidInput(format!("ticker '{ticker}' is too long")));
    }
    if let Some(bad) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(MarketError::InvalidInput(format!(
            "ticker '{ticker}' contains '{bad}'"
        )));
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_ticker("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_ticker("^gspc").unwrap(), "^GSPC");
    }

    #[test]
    fn test_rejects_bad_tickers() {
        for bad in ["", "   ", "AAPL;DROP", "../etc", "ABCDEFGHIJKLMN"] {
            assert!(
                matches!(normalize_ticker(bad), Err(MarketError::InvalidInput(_))),
                "{bad:?} accepted"
            );
        }
    }
}
