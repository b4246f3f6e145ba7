use crate::cli::commands::ValidateArgs;
use crate::config;
use crate::errors::Migr8Error;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), Migr8Error> {
    let config = config::parse_config(&args.config).await?;
    println!("Configuration is valid: {}", args.config.display());

    let rules = config.rules();
    if rules.upload.is_some() {
        println!("  custom upload rules");
    }
    if let Some(execution) = &rules.execution {
        println!("  custom execution rules ({} extension sets)", execution.by_extension.len());
    }
    if let Some(dirs) = config.paths().upload_dirs {
        println!("  {} upload directories", dirs.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_accepts_good_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migr8.yaml");
        std::fs::write(&path, "http:\n  concurrency: 4\npaths:\n  upload_dirs: [\"media/\"]\n").unwrap();
        assert!(handle_validate(ValidateArgs { config: path }).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_rejects_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/migr8.yaml".into(),
        };
        assert!(matches!(handle_validate(args).await, Err(Migr8Error::Config(_))));
    }

    #[tokio::test]
    async fn test_validate_rejects_zero_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migr8.yaml");
        std::fs::write(&path, "http:\n  concurrency: 0\n").unwrap();
        assert!(handle_validate(ValidateArgs { config: path }).await.is_err());
    }
}
