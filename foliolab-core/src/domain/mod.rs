//! Domain types for FolioLab

pub mod holding;
pub mod prices;
pub mod signal;
pub mod snapshot;
pub mod trade;

pub use holding::Holding;
pub use prices::{DayPrices, PricePath};
pub use signal::{Signal, SignalKind, SignalMap};
pub use snapshot::PortfolioSnapshot;
pub use trade::{Trade, TradeAction};
