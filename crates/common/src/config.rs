use anyhow::{Context, Result, anyhow};
use std::{env, fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_vars<F>(vars: &EnvVars<F>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match vars
            .string_or("ENVIRONMENT", "development")
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Typed access to configuration variables.
///
/// Wraps a lookup function so configuration can be loaded from the process
/// environment in production and from a fixed table in tests. Blank values
/// are treated as unset.
pub struct EnvVars<F> {
    lookup: F,
}

impl EnvVars<fn(&str) -> Option<String>> {
    pub fn process() -> Self {
        fn lookup(key: &str) -> Option<String> {
            env::var(key).ok()
        }
        EnvVars {
            lookup: lookup as fn(&str) -> Option<String>,
        }
    }
}

impl<F> EnvVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn parse_opt<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.string(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| anyhow!("{}", e))
                    .with_context(|| format!("Invalid value {:?} for {}", raw, key))
            })
            .transpose()
    }

    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse_opt(key)?.unwrap_or(default))
    }

    /// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitive.
    pub fn flag_or(&self, key: &str, default: bool) -> Result<bool> {
        let Some(raw) = self.string(key) else {
            return Ok(default);
        };

        match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Invalid boolean {:?} for {}", raw, key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> EnvVars<impl Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvVars::new(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn environment_defaults_to_development() {
        assert_eq!(Environment::from_vars(&vars(&[])), Environment::Development);
    }

    #[test]
    fn environment_accepts_prod_alias() {
        let v = vars(&[("ENVIRONMENT", "PROD")]);
        assert_eq!(Environment::from_vars(&v), Environment::Production);
    }

    #[test]
    fn blank_values_are_unset() {
        let v = vars(&[("FOLDER", "   ")]);
        assert_eq!(v.string("FOLDER"), None);
        assert_eq!(v.string_or("FOLDER", "root"), "root");
    }

    #[test]
    fn parse_or_falls_back_only_when_unset() {
        let v = vars(&[("INTERVAL", "2.5"), ("BROKEN", "abc")]);
        assert_eq!(v.parse_or("INTERVAL", 6.0).unwrap(), 2.5);
        assert_eq!(v.parse_or("MISSING", 6.0).unwrap(), 6.0);

        let err = v.parse_or::<f64>("BROKEN", 6.0).unwrap_err();
        assert!(
            format!("{:#}", err).contains("BROKEN"),
            "error should name the variable: {:#}",
            err
        );
    }

    #[test]
    fn flags_parse_common_spellings() {
        let v = vars(&[("A", "Yes"), ("B", "off"), ("C", "maybe")]);
        assert!(v.flag_or("A", false).unwrap());
        assert!(!v.flag_or("B", true).unwrap());
        assert!(v.flag_or("UNSET", true).unwrap());
        assert!(v.flag_or("C", true).is_err());
    }
}
