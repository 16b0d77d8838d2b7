// Crypto payment quotes for the checkout flow
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CryptoCurrency {
    Btc,
    Eth,
    Usdt,
}

impl CryptoCurrency {
    /// Fixed demo exchange rate in USD per coin
    pub fn usd_rate(&self) -> f64 {
        match self {
            CryptoCurrency::Btc => 65_000.0,
            CryptoCurrency::Eth => 3_500.0,
            CryptoCurrency::Usdt => 1.0,
        }
    }

    pub fn precision(&self) -> i32 {
        match self {
            CryptoCurrency::Btc => 8,
            CryptoCurrency::Eth => 6,
            CryptoCurrency::Usdt => 2,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CryptoCurrency::Btc => "BTC",
            CryptoCurrency::Eth => "ETH",
            CryptoCurrency::Usdt => "USDT",
        }
    }
}

/// Deposit addresses shown on the payment step
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentAddresses {
    #[serde(default = "default_btc_address")]
    pub btc_address: String,
    #[serde(default = "default_eth_address")]
    pub eth_address: String,
    #[serde(default = "default_usdt_address")]
    pub usdt_address: String,
}

impl Default for PaymentAddresses {
    fn default() -> Self {
        Self {
            btc_address: default_btc_address(),
            eth_address: default_eth_address(),
            usdt_address: default_usdt_address(),
        }
    }
}

impl PaymentAddresses {
    pub fn for_currency(&self, currency: CryptoCurrency) -> &str {
        match currency {
            CryptoCurrency::Btc => &self.btc_address,
            CryptoCurrency::Eth => &self.eth_address,
            CryptoCurrency::Usdt => &self.usdt_address,
        }
    }
}

fn default_btc_address() -> String {
    "bc1qdemo0000000000000000000000000000000000".to_string()
}

fn default_eth_address() -> String {
    "0xDEMO000000000000000000000000000000000000".to_string()
}

fn default_usdt_address() -> String {
    "TDemo00000000000000000000000000000".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub usd: f64,
    pub currency: CryptoCurrency,
    pub amount: f64,
    pub address: String,
}

pub fn quote(usd: f64, currency: CryptoCurrency, addresses: &PaymentAddresses) -> Quote {
    Quote {
        usd,
        currency,
        amount: round_to(usd / currency.usd_rate(), currency.precision()),
        address: addresses.for_currency(currency).to_string(),
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
