//! Oracle assets, fixed-point prices and the price-feed seam.

use thiserror::Error;

/// Number of decimal places carried by every fixed-point value.
pub const PRICE_DECIMALS: u32 = 8;

/// Multiplier between a decimal price and its fixed-point form (10^8).
pub const PRICE_SCALE: u64 = 100_000_000;

/// Number of assets quoted in a record.
pub const ASSET_COUNT: usize = 20;

/// An asset quoted by the oracle. Declaration order is the canonical record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Asset {
    /// The network's base token.
    Pnt,
    Usd,
    Eur,
    Jpy,
    Gbp,
    Cad,
    Chf,
    Inr,
    Sgd,
    Cny,
    Hkd,
    /// Gold.
    Xau,
    /// Silver.
    Xag,
    /// Palladium.
    Xpd,
    /// Platinum.
    Xpt,
    /// Bitcoin.
    Xbt,
    Eth,
    Ltc,
    /// Bitcoin Cash.
    Xbc,
    /// Factoid.
    Fct,
}

impl Asset {
    /// All assets in canonical order.
    pub const ALL: [Asset; ASSET_COUNT] = [
        Asset::Pnt,
        Asset::Usd,
        Asset::Eur,
        Asset::Jpy,
        Asset::Gbp,
        Asset::Cad,
        Asset::Chf,
        Asset::Inr,
        Asset::Sgd,
        Asset::Cny,
        Asset::Hkd,
        Asset::Xau,
        Asset::Xag,
        Asset::Xpd,
        Asset::Xpt,
        Asset::Xbt,
        Asset::Eth,
        Asset::Ltc,
        Asset::Xbc,
        Asset::Fct,
    ];

    /// Position of this asset in the canonical order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Pnt => "PNT",
            Asset::Usd => "USD",
            Asset::Eur => "EUR",
            Asset::Jpy => "JPY",
            Asset::Gbp => "GBP",
            Asset::Cad => "CAD",
            Asset::Chf => "CHF",
            Asset::Inr => "INR",
            Asset::Sgd => "SGD",
            Asset::Cny => "CNY",
            Asset::Hkd => "HKD",
            Asset::Xau => "XAU",
            Asset::Xag => "XAG",
            Asset::Xpd => "XPD",
            Asset::Xpt => "XPT",
            Asset::Xbt => "XBT",
            Asset::Eth => "ETH",
            Asset::Ltc => "LTC",
            Asset::Xbc => "XBC",
            Asset::Fct => "FCT",
        }
    }

    /// Parse a ticker symbol, case-insensitively.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|asset| asset.symbol().eq_ignore_ascii_case(symbol))
    }
}

impl core::fmt::Display for Asset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Errors reported by a price feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("no price available for {0}")]
    Unavailable(Asset),

    #[error("price source failed: {0}")]
    Source(String),
}

/// Supplies fixed-point prices for assets.
pub trait PriceFeed {
    fn price(&self, asset: Asset) -> Result<u64, FeedError>;
}

impl<F> PriceFeed for F
where
    F: Fn(Asset) -> Result<u64, FeedError>,
{
    fn price(&self, asset: Asset) -> Result<u64, FeedError> {
        self(asset)
    }
}

/// Fixed-point prices for every asset, in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AssetPrices([u64; ASSET_COUNT]);

impl AssetPrices {
    /// Build from values already in canonical order.
    pub const fn from_values(values: [u64; ASSET_COUNT]) -> Self {
        AssetPrices(values)
    }

    /// Query the feed for every asset, stopping at the first failure.
    pub fn pull<F: PriceFeed + ?Sized>(feed: &F) -> Result<Self, FeedError> {
        let mut prices = AssetPrices::default();
        for asset in Asset::ALL {
            prices.set(asset, feed.price(asset)?);
        }
        Ok(prices)
    }

    pub fn get(&self, asset: Asset) -> u64 {
        self.0[asset.index()]
    }

    pub fn set(&mut self, asset: Asset, value: u64) {
        self.0[asset.index()] = value;
    }

    /// Values in canonical order.
    pub fn values(&self) -> &[u64; ASSET_COUNT] {
        &self.0
    }

    /// Iterate `(asset, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Asset, u64)> + '_ {
        Asset::ALL.into_iter().zip(self.0.iter().copied())
    }
}

/// Convert a decimal price to its fixed-point form.
///
/// Rounds to the nearest 10^-8; `0.29 * 1e8` is `28999999.999999996` in binary.
/// Negative, NaN and out-of-range inputs saturate; keeping prices in range is up to
/// the caller.
pub fn to_fixed_point(price: f64) -> u64 {
    (price * PRICE_SCALE as f64).round() as u64
}

/// Render a fixed-point value as `integer.fraction` with eight fraction digits.
pub fn format_fixed_point(value: u64) -> String {
    format!("{}.{:08}", value / PRICE_SCALE, value % PRICE_SCALE)
}
