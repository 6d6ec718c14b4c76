#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_owned())
    }
}

// === Defaults ===

#[test]
fn defaults_match_inference_defaults() {
    let config = AnalysisConfig::default();
    assert_eq!(config.perl_version, PerlVersion::MINIMUM);
    assert_eq!(config.infer_options(), InferOptions::default());
    assert_eq!(config.cache_dir, None);
    assert_eq!(config.threads, None);
}

#[test]
fn features_start_at_the_version_floor() {
    let mut config = AnalysisConfig::default();
    config.apply_flags(&args(&["--perl=v5.10"])).unwrap();
    assert_eq!(config.features().min_version(), PerlVersion::new(5, 10, 0));
    assert_eq!(config.parse_options().features, config.features());
}

// === Environment ===

#[test]
fn environment_overrides_defaults() {
    let mut config = AnalysisConfig::default();
    config
        .apply_env(env(&[
            ("PERLC_PERL_VERSION", "v5.36"),
            ("PERLC_MAX_DEPTH", "8"),
            ("PERLC_CACHE_DIR", "/tmp/stubs"),
            ("PERLC_THREADS", "4"),
        ]))
        .unwrap();
    assert_eq!(
        config,
        AnalysisConfig {
            perl_version: PerlVersion::new(5, 36, 0),
            max_depth: 8,
            cache_dir: Some(PathBuf::from("/tmp/stubs")),
            threads: Some(4),
        }
    );
}

#[test]
fn invalid_environment_value_names_the_variable() {
    let mut config = AnalysisConfig::default();
    let err = config
        .apply_env(env(&[("PERLC_MAX_DEPTH", "deep")]))
        .unwrap_err();
    assert!(matches!(
        err,
        CliError::InvalidOption {
            option: "PERLC_MAX_DEPTH",
            ..
        }
    ));
}

// === Flags ===

#[test]
fn flags_override_environment() {
    let mut config = AnalysisConfig::default();
    config
        .apply_env(env(&[("PERLC_MAX_DEPTH", "8"), ("PERLC_THREADS", "4")]))
        .unwrap();
    let rest = config
        .apply_flags(&args(&["a.pl", "--max-depth=3", "b.pm"]))
        .unwrap();
    assert_eq!(rest, args(&["a.pl", "b.pm"]));
    assert_eq!(config.max_depth, 3);
    assert_eq!(config.threads, Some(4));
}

#[test]
fn zero_threads_means_default() {
    let mut config = AnalysisConfig::default();
    config.apply_flags(&args(&["--threads=0"])).unwrap();
    assert_eq!(config.threads, None);
}

#[test]
fn empty_cache_dir_disables_caching() {
    let mut config = AnalysisConfig::default();
    config
        .apply_env(env(&[("PERLC_CACHE_DIR", "/tmp/stubs")]))
        .unwrap();
    config.apply_flags(&args(&["--cache-dir="])).unwrap();
    assert_eq!(config.cache_dir, None);
}

#[test]
fn rejects_bad_values() {
    let mut config = AnalysisConfig::default();
    for flag in ["--max-depth=0", "--max-depth=x", "--perl=six", "--perl=v6.0", "--threads=-1"] {
        let err = config.apply_flags(&args(&[flag])).unwrap_err();
        assert!(
            matches!(err, CliError::InvalidOption { .. }),
            "{flag} gave {err}"
        );
    }
    assert_eq!(config, AnalysisConfig::default());
}

#[test]
fn depth_is_capped_by_the_stub_codec() {
    let mut config = AnalysisConfig::default();
    config.apply_flags(&args(&["--max-depth=64"])).unwrap();
    assert_eq!(config.infer_options().max_depth, MAX_DEPTH);
    let err = config.apply_flags(&args(&["--max-depth=71"])).unwrap_err();
    assert!(matches!(
        err,
        CliError::InvalidOption {
            option: "--max-depth",
            ..
        }
    ));
    assert_eq!(config.max_depth, 64);
    config.max_depth = 71;
    assert_eq!(config.infer_options().max_depth, MAX_DEPTH);
}

#[test]
fn rejects_unknown_flags() {
    let mut config = AnalysisConfig::default();
    let err = config.apply_flags(&args(&["--fast"])).unwrap_err();
    assert_eq!(err.to_string(), "unknown option '--fast'");
}
