//! Subscriber installation

use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output style of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines on stderr
    Development,
    /// One JSON object per event on stderr
    Production,
    /// Nothing is printed; tests install their own capture layer
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "arbor=debug",
            Profile::Production => "arbor=info",
            Profile::Test => "off",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" | "development" => Ok(Profile::Development),
            "prod" | "production" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown log profile '{}'", other)),
        }
    }
}

static INSTALLED: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call in a process has any effect. `RUST_LOG` takes
/// precedence over [`Profile::default_directive`].
pub fn init(profile: Profile) {
    INSTALLED.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(profile.filter())
            .with_writer(std::io::stderr);
        match profile {
            Profile::Development => builder.init(),
            Profile::Production => builder.json().init(),
            Profile::Test => tracing_subscriber::registry().init(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_aliases() {
        assert_eq!("dev".parse::<Profile>(), Ok(Profile::Development));
        assert_eq!("development".parse::<Profile>(), Ok(Profile::Development));
        assert_eq!("prod".parse::<Profile>(), Ok(Profile::Production));
        assert_eq!("test".parse::<Profile>(), Ok(Profile::Test));
    }

    #[test]
    fn test_unknown_profile_names_the_input() {
        let err = "verbose".parse::<Profile>().unwrap_err();
        assert!(err.contains("verbose"));
    }

    #[test]
    fn test_default_directives() {
        assert_eq!(Profile::Development.default_directive(), "arbor=debug");
        assert_eq!(Profile::Production.default_directive(), "arbor=info");
    }
}
