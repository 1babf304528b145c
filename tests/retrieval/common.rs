//! Shared fixtures for the retrieval suite

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use sift::{
    Document, EstimateError, InMemorySharedStore, Query, RawEntry, RelevanceEstimator,
    SharedStore, StoreError,
};

/// The two advanced-model distillers
pub fn advanced_models() -> Vec<RawEntry> {
    vec![
        RawEntry::text(
            "10 Gallon Advanced Model\n\
             Copper column still with 220V electric heating.\n\
             Capacity: 10 gallons\n\
             Price: $899",
        ),
        RawEntry::text(
            "15 Gallon Advanced Model\n\
             Copper column still for larger batches.\n\
             Capacity: 15 gallons\n\
             Price: $1,199",
        ),
    ]
}

/// A small mixed shop corpus
pub fn shop() -> Vec<RawEntry> {
    let mut corpus = advanced_models();
    corpus.extend([
        RawEntry::text(
            "220v Electric Heating Element with Controller\n\
             Drop-in element with digital temperature controller.\n\
             In stock, ships next day.\n\
             Price: $299",
        ),
        RawEntry::text(
            "Silicone Gasket Set\n\
             Food grade seals for lids and clamps.\n\
             Price: $12",
        ),
        RawEntry::text(
            "Copper Pot Still\n\
             Hand hammered copper pot still, 5 gallon.\n\
             Free shipping.\n\
             Price: $499",
        ),
        RawEntry::text("Shipping Policy\nOrders ship within two business days."),
        RawEntry::catalog(
            "Thumper Keg\n\
             Copper doubler for pot stills.\n\
             Variant: 1 Gallon | $149 | In stock\n\
             Variant: 3 Gallon | $199 | Out of stock",
        ),
    ]);
    corpus
}

/// One copper pot still at `price` next to an unrelated part
pub fn priced_still(price: &str) -> Vec<RawEntry> {
    vec![
        RawEntry::text(format!(
            "Copper Pot Still\n\
             Hand hammered copper pot still, 5 gallon.\n\
             Price: {price}"
        )),
        RawEntry::text("Silicone Gasket Set\nFood grade seals.\nPrice: $12"),
    ]
}

/// `n` distinct documents with long descriptions
pub fn long_corpus(n: usize) -> Vec<RawEntry> {
    (0..n)
        .map(|i| {
            RawEntry::text(format!(
                "Reflux Column Model {i}\n{}\nPrice: ${}",
                "Stainless reflux column with copper packing and dephlegmator. ".repeat(12),
                300 + i
            ))
        })
        .collect()
}

// ============================================================================
// Estimators
// ============================================================================

/// Returns the same estimate for every document
pub struct FixedEstimator(pub f32);

impl RelevanceEstimator for FixedEstimator {
    fn estimate(&self, _query: &Query, _doc: &Document) -> Result<f32, EstimateError> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Always fails; counts calls
#[derive(Default)]
pub struct FailingEstimator {
    pub calls: AtomicUsize,
}

impl RelevanceEstimator for FailingEstimator {
    fn estimate(&self, _query: &Query, _doc: &Document) -> Result<f32, EstimateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EstimateError::Unavailable("model offline".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Rejects every document after a delay
pub struct SlowEstimator(pub Duration);

impl RelevanceEstimator for SlowEstimator {
    fn estimate(&self, _query: &Query, _doc: &Document) -> Result<f32, EstimateError> {
        std::thread::sleep(self.0);
        Ok(0.0)
    }

    fn name(&self) -> &str {
        "slow"
    }
}

// ============================================================================
// Shared store
// ============================================================================

/// Shared store that can be switched off
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemorySharedStore,
    pub down: AtomicBool,
}

impl FlakyStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Timeout)
        } else {
            Ok(())
        }
    }
}

impl SharedStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(key)
    }

    fn name(&self) -> &str {
        "flaky"
    }
}
