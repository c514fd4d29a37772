use std::env;
use std::str::FromStr;

use crate::{Error, Result};

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset, and an
/// [`Error::InvalidArgument`] when it is set but not valid unicode or does
/// not parse as `T`.
pub fn read_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(e) => {
            return Err(Error::InvalidArgument(format!(
                "failed to read {name}: {e}"
            )))
        }
    };

    let trimmed = raw.trim();
    trimmed.parse().map(Some).map_err(|_| {
        Error::InvalidArgument(format!(
            "{name} must be a valid {}, got '{raw}'",
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_env_missing_is_none() {
        let v: Option<f32> = read_env("TS_CORE_TEST_DEFINITELY_UNSET").unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn test_read_env_parses_and_rejects() {
        env::set_var("TS_CORE_TEST_PARSE_OK", " 0.25 ");
        let v: Option<f32> = read_env("TS_CORE_TEST_PARSE_OK").unwrap();
        assert_eq!(v, Some(0.25));

        env::set_var("TS_CORE_TEST_PARSE_BAD", "quarter");
        let err = read_env::<f32>("TS_CORE_TEST_PARSE_BAD").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("TS_CORE_TEST_PARSE_BAD"));
    }
}
