//! Analysis configuration.
//!
//! One [`AnalysisConfig`] is threaded through the driver. It starts from
//! defaults, then takes `PERLC_*` environment variables, then command-line
//! flags; later sources override earlier ones.
//!
//! | Setting | Environment | Flag |
//! |---|---|---|
//! | Perl version floor | `PERLC_PERL_VERSION` | `--perl=` |
//! | Inference depth limit | `PERLC_MAX_DEPTH` | `--max-depth=` |
//! | Stub cache directory | `PERLC_CACHE_DIR` | `--cache-dir=` |
//! | Worker threads | `PERLC_THREADS` | `--threads=` |

use std::path::PathBuf;

use perl_infer::InferOptions;
use perl_ir::{FeatureTable, PerlVersion};
use perl_parse::ParseOptions;
use perl_types::codec::MAX_DEPTH;

use crate::CliError;

/// Settings for one analysis run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Version floor every file starts from before its own `use VERSION`.
    pub perl_version: PerlVersion,
    /// Values are truncated below this nesting depth. Never above the
    /// stub codec's [`MAX_DEPTH`].
    pub max_depth: u32,
    /// Where registry stubs are persisted. No caching when unset.
    pub cache_dir: Option<PathBuf>,
    /// Worker threads for parallel analysis. Rayon's default when unset.
    pub threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            perl_version: PerlVersion::MINIMUM,
            max_depth: InferOptions::DEFAULT_MAX_DEPTH,
            cache_dir: None,
            threads: None,
        }
    }
}

/// A setting that can come from the environment or from a flag.
#[derive(Copy, Clone, Debug)]
enum Setting {
    PerlVersion,
    MaxDepth,
    CacheDir,
    Threads,
}

impl Setting {
    const ALL: [Setting; 4] = [
        Setting::PerlVersion,
        Setting::MaxDepth,
        Setting::CacheDir,
        Setting::Threads,
    ];

    const fn env_var(self) -> &'static str {
        match self {
            Setting::PerlVersion => "PERLC_PERL_VERSION",
            Setting::MaxDepth => "PERLC_MAX_DEPTH",
            Setting::CacheDir => "PERLC_CACHE_DIR",
            Setting::Threads => "PERLC_THREADS",
        }
    }

    const fn flag(self) -> &'static str {
        match self {
            Setting::PerlVersion => "--perl=",
            Setting::MaxDepth => "--max-depth=",
            Setting::CacheDir => "--cache-dir=",
            Setting::Threads => "--threads=",
        }
    }
}

impl AnalysisConfig {
    /// Defaults, then the process environment, then `args`.
    ///
    /// Returns the configuration and the arguments that are not flags.
    pub fn load(args: &[String]) -> Result<(Self, Vec<String>), CliError> {
        let mut config = AnalysisConfig::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        let rest = config.apply_flags(args)?;
        Ok((config, rest))
    }

    /// Override settings from environment variables read through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for setting in Setting::ALL {
            let key = setting.env_var();
            if let Some(value) = var(key) {
                self.set(setting, key, &value)?;
            }
        }
        Ok(())
    }

    /// Override settings from `--name=value` flags.
    ///
    /// Returns the positional arguments in order. Any other argument
    /// starting with `--` is rejected.
    pub fn apply_flags(&mut self, args: &[String]) -> Result<Vec<String>, CliError> {
        let mut rest = Vec::new();
        'args: for arg in args {
            for setting in Setting::ALL {
                let flag = setting.flag();
                if let Some(value) = arg.strip_prefix(flag) {
                    self.set(setting, flag.trim_end_matches('='), value)?;
                    continue 'args;
                }
            }
            if arg.starts_with("--") {
                return Err(CliError::UnknownOption(arg.clone()));
            }
            rest.push(arg.clone());
        }
        Ok(rest)
    }

    fn set(
        &mut self,
        setting: Setting,
        option: &'static str,
        value: &str,
    ) -> Result<(), CliError> {
        let invalid = |reason| CliError::InvalidOption {
            option,
            value: value.to_owned(),
            reason,
        };
        match setting {
            Setting::PerlVersion => {
                let version =
                    PerlVersion::parse(value).ok_or_else(|| invalid("not a Perl version"))?;
                if version.major != 5 {
                    return Err(invalid("only Perl 5 is supported"));
                }
                self.perl_version = version;
            }
            Setting::MaxDepth => {
                let depth: u32 = value.parse().map_err(|_| invalid("not a number"))?;
                if depth == 0 {
                    return Err(invalid("must be at least 1"));
                }
                if depth > MAX_DEPTH {
                    return Err(invalid("deeper than persisted stubs can hold"));
                }
                self.max_depth = depth;
            }
            Setting::CacheDir => {
                self.cache_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            Setting::Threads => {
                let threads: usize = value.parse().map_err(|_| invalid("not a number"))?;
                self.threads = (threads > 0).then_some(threads);
            }
        }
        Ok(())
    }

    /// Pragmas in effect at the top of every file.
    pub fn features(&self) -> FeatureTable {
        FeatureTable::for_version(self.perl_version)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            features: self.features(),
        }
    }

    pub fn infer_options(&self) -> InferOptions {
        InferOptions {
            max_depth: self.max_depth.min(MAX_DEPTH),
        }
    }
}

#[cfg(test)]
mod tests;
