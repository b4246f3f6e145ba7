use super::types::Migr8Error;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// Fatal errors end the run; the rest only cost a single probe.
    pub fatal: bool,
}

impl Migr8Error {
    /// Classify this error to decide whether it ends the run or just one probe.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Per-probe noise
            Migr8Error::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                fatal: false,
            },
            Migr8Error::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                fatal: false,
            },
            Migr8Error::Http(_) => ErrorClassification {
                error_type: "HttpError",
                fatal: false,
            },

            // Run-ending errors
            Migr8Error::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                fatal: true,
            },
            Migr8Error::InvalidTarget(_) => ErrorClassification {
                error_type: "InvalidTargetError",
                fatal: true,
            },
            Migr8Error::Wordlist(_) => ErrorClassification {
                error_type: "WordlistError",
                fatal: true,
            },
            Migr8Error::Payload(_) => ErrorClassification {
                error_type: "PayloadError",
                fatal: true,
            },
            Migr8Error::Cancelled(_) => ErrorClassification {
                error_type: "CancelledError",
                fatal: true,
            },
            Migr8Error::Io(_) => ErrorClassification {
                error_type: "IoError",
                fatal: true,
            },
            Migr8Error::Json(_) => ErrorClassification {
                error_type: "JsonError",
                fatal: true,
            },
            Migr8Error::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                fatal: true,
            },
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Migr8Error::Config(_) | Migr8Error::Wordlist(_) | Migr8Error::Payload(_) => 2,
            Migr8Error::InvalidTarget(_) => 5,
            Migr8Error::Cancelled(_) => 130,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_not_fatal() {
        let err = Migr8Error::Network("connection refused".into());
        let class = err.classify();
        assert!(!class.fatal);
        assert_eq!(class.error_type, "NetworkError");
    }

    #[test]
    fn test_timeout_not_fatal() {
        let err = Migr8Error::Timeout("timed out".into());
        assert!(!err.classify().fatal);
    }

    #[test]
    fn test_config_error_fatal() {
        let err = Migr8Error::Config("invalid config".into());
        let class = err.classify();
        assert!(class.fatal);
        assert_eq!(class.error_type, "ConfigError");
    }

    #[test]
    fn test_wordlist_error_fatal() {
        let err = Migr8Error::Wordlist("empty".into());
        assert!(err.classify().fatal);
    }

    #[test]
    fn test_bad_request_not_fatal_io_fatal() {
        assert!(!Migr8Error::Http("invalid content type".into()).classify().fatal);
        let io = Migr8Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(io.classify().fatal);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Migr8Error::Config("x".into()).exit_code(), 2);
        assert_eq!(Migr8Error::Payload("x".into()).exit_code(), 2);
        assert_eq!(Migr8Error::InvalidTarget("x".into()).exit_code(), 5);
        assert_eq!(Migr8Error::Cancelled("x".into()).exit_code(), 130);
        assert_eq!(Migr8Error::Network("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_url_parse_error_is_invalid_target() {
        let err: Migr8Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Migr8Error::InvalidTarget(_)));
    }
}
