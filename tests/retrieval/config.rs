//! Builder configuration and `sift.toml` loading

use sift::{Error, Retriever, SiftConfig, CONFIG_FILE_NAME};
use tempfile::TempDir;

use crate::common::*;

#[test]
fn test_config_file_written_when_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    assert!(!path.exists());

    let r = Retriever::builder().config_file(path.clone()).build().unwrap();
    assert!(path.exists());
    assert_eq!(r.config(), &SiftConfig::default());
    assert_eq!(SiftConfig::from_file(&path).unwrap(), SiftConfig::default());
}

#[test]
fn test_config_file_values_applied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "[gate]\nthreshold = 0.9\n\n[format]\nmax_block_chars = 800\n",
    )
    .unwrap();

    let r = Retriever::builder()
        .config(SiftConfig::default())
        .config_file(path)
        .build()
        .unwrap();
    assert_eq!(r.config().gate.threshold, 0.9);
    assert_eq!(r.config().format.max_block_chars, 800);
    assert_eq!(r.config().bm25, SiftConfig::default().bm25);

    let corpus = r.rebuild_index(&long_corpus(10));
    let text = r.retrieve("reflux column", &corpus, 10).unwrap();
    assert!(text.starts_with("[1] Reflux Column Model"));
    assert!(text.chars().count() <= 800);
}

#[test]
fn test_out_of_range_config_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[gate]\nthreshold = 1.5\n").unwrap();

    let err = Retriever::builder().config_file(path).build().err().unwrap();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("gate.threshold")));
}

#[test]
fn test_malformed_config_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[gate\nthreshold = ").unwrap();

    let result = Retriever::builder().config_file(path).build();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_invalid_explicit_config_rejected() {
    let mut config = SiftConfig::default();
    config.diversity.lambda = -0.1;
    assert!(matches!(
        Retriever::builder().config(config).build(),
        Err(Error::Config(_))
    ));

    let mut config = SiftConfig::default();
    config.cache.eviction_fraction = 0.0;
    assert!(matches!(
        Retriever::builder().config(config).build(),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_disabled_gate_ignores_estimator() {
    let mut config = SiftConfig::default();
    config.gate.enabled = false;
    let r = Retriever::builder()
        .config(config)
        .estimator(std::sync::Arc::new(FixedEstimator(0.0)))
        .build()
        .unwrap();
    assert!(!r.gating_enabled());

    let corpus = r.rebuild_index(&shop());
    let text = r.retrieve("copper still", &corpus, 3).unwrap();
    assert!(text.starts_with("[1] "));
}

#[test]
fn test_builder_publishes_initial_corpus() {
    let r = Retriever::builder().corpus(shop()).build().unwrap();
    assert_eq!(r.current().version(), 1);
    assert!(r.retrieve_current("gasket", 1).unwrap().contains("Silicone Gasket Set"));
}
