use clap::{Args, ValueEnum};
use std::time::Duration;

/// How the assignment model is optimised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Resolve every course group on its own; groups share no variables.
    #[default]
    Decomposed,
    /// Build the full 0/1 model and hand it to HiGHS.
    Ilp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverConfig {
    pub backend: Backend,
    /// Wall-clock budget for one solve. `None` means unbounded.
    pub time_limit: Option<Duration>,
}

/// Solver flags shared by every subcommand that runs a solve.
#[derive(Debug, Clone, Args)]
pub struct SolverArgs {
    #[arg(long, value_enum, default_value_t = Backend::Decomposed, env = "SCHEDULER_BACKEND")]
    pub backend: Backend,
    /// Give up with a system error once a solve runs longer than this.
    #[arg(long, env = "SCHEDULER_TIME_LIMIT_SECS")]
    pub time_limit_secs: Option<f64>,
}

impl From<&SolverArgs> for SolverConfig {
    fn from(args: &SolverArgs) -> Self {
        Self {
            backend: args.backend,
            time_limit: args
                .time_limit_secs
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_limits_are_ignored() {
        let args = SolverArgs {
            backend: Backend::Ilp,
            time_limit_secs: Some(-1.0),
        };
        let config = SolverConfig::from(&args);
        assert_eq!(config.backend, Backend::Ilp);
        assert_eq!(config.time_limit, None);
    }

    #[test]
    fn out_of_range_limits_are_ignored() {
        for secs in [1e30, f64::INFINITY, f64::NAN] {
            let args = SolverArgs {
                backend: Backend::Decomposed,
                time_limit_secs: Some(secs),
            };
            assert_eq!(SolverConfig::from(&args).time_limit, None);
        }
    }

    #[test]
    fn fractional_limits_are_kept() {
        let args = SolverArgs {
            backend: Backend::Decomposed,
            time_limit_secs: Some(2.5),
        };
        assert_eq!(
            SolverConfig::from(&args).time_limit,
            Some(Duration::from_millis(2500))
        );
    }
}
