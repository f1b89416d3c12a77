use std::fmt;

/// Coin balances and amounts are whole integers. There is no fractional coin.
pub type Coins = i64;

/// Balance credited to every newly registered account.
pub const STARTING_BALANCE: Coins = 1000;

/// Parse a user-supplied coin amount.
/// Only strictly positive whole numbers are accepted: "100" -> 100.
pub fn parse_coins(input: &str) -> Result<Coins, ParseCoinsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCoinsError::Empty);
    }

    let amount: Coins = input.parse().map_err(|_| ParseCoinsError::InvalidFormat)?;
    if amount <= 0 {
        return Err(ParseCoinsError::NotPositive(amount));
    }
    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCoinsError {
    Empty,
    InvalidFormat,
    NotPositive(Coins),
}

impl fmt::Display for ParseCoinsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCoinsError::Empty => write!(f, "amount is empty"),
            ParseCoinsError::InvalidFormat => write!(f, "amount must be a whole number of coins"),
            ParseCoinsError::NotPositive(n) => write!(f, "amount must be positive, got {}", n),
        }
    }
}

impl std::error::Error for ParseCoinsError {}
