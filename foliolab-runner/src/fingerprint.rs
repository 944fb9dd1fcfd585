//! Run fingerprinting and per-portfolio seed derivation.
//!
//! Both hash with BLAKE3. The fingerprint covers canonical JSON of
//! (snapshot, config, effective seed): two refreshes with the same fingerprint
//! produce identical reports.

use serde::Serialize;

use foliolab_core::PortfolioSnapshot;

use crate::config::AnalysisConfig;

/// Seeds are reduced to the generator's 31 significant bits.
const SEED_MASK: u64 = 0x7fff_ffff;

#[derive(Serialize)]
struct FingerprintInput<'a> {
    snapshot: &'a PortfolioSnapshot,
    config: &'a AnalysisConfig,
    seed: u64,
}

/// Hex BLAKE3 digest identifying one analysis run.
pub fn run_fingerprint(
    snapshot: &PortfolioSnapshot,
    config: &AnalysisConfig,
    seed: u64,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(&FingerprintInput {
        snapshot,
        config,
        seed,
    })?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

/// Derive a snapshot-specific seed from `master_seed`.
///
/// Depends on every holding's symbol, quantity and average price, in order.
pub fn portfolio_seed(master_seed: u64, snapshot: &PortfolioSnapshot) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    for holding in snapshot.holdings() {
        hasher.update(holding.symbol.as_bytes());
        hasher.update(&[0]);
        hasher.update(&holding.quantity.to_le_bytes());
        hasher.update(&holding.avg_price.to_le_bytes());
    }
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes) & SEED_MASK
}
