use clap::Parser;
use dupesweep::cli::{Cli, Commands};
use dupesweep::config::{Config, ConfigError};
use dupesweep::scanner::HashAlgorithm;
use figment::Jail;
use std::path::{Path, PathBuf};

#[test]
fn test_missing_default_file_uses_defaults() {
    Jail::expect_with(|_jail| {
        let config =
            Config::load_from_path(Path::new("absent.toml")).map_err(|e| e.to_string())?;
        assert_eq!(config, Config::default());
        Ok(())
    });
}

#[test]
fn test_hierarchy_file_env_cli() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "dupesweep.toml",
            r#"
            algorithm = "md5"
            max_concurrency = 4
            list_path = "from-file.txt"
            "#,
        )?;
        jail.set_env("DUPESWEEP_ALGORITHM", "sha512");

        let mut config =
            Config::load(Some(Path::new("dupesweep.toml"))).map_err(|e| e.to_string())?;
        assert_eq!(config.algorithm, "sha512");
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.list_path, PathBuf::from("from-file.txt"));

        let cli = Cli::try_parse_from([
            "dupesweep", "scan", "-d", ".", "-a", "blake3", "--list", "cli.txt", "--threads", "2",
        ])
        .map_err(|e| e.to_string())?;
        let Commands::Scan(args) = &cli.command else {
            return Err("expected scan".into());
        };
        config.merge_scan_args(args);

        assert_eq!(config.algorithm, "blake3");
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.list_path, PathBuf::from("cli.txt"));
        assert_eq!(config.validate().map_err(|e| e.to_string())?, HashAlgorithm::Blake3);
        Ok(())
    });
}

#[test]
fn test_env_bool_and_size_overrides() {
    Jail::expect_with(|jail| {
        jail.set_env("DUPESWEEP_SKIP_HIDDEN", "true");
        jail.set_env("DUPESWEEP_MIN_SIZE", "4096");
        jail.set_env("DUPESWEEP_TRASH", "true");

        let config =
            Config::load_from_path(Path::new("none.toml")).map_err(|e| e.to_string())?;
        assert!(config.skip_hidden);
        assert_eq!(config.min_size, Some(4096));
        assert!(config.trash);
        Ok(())
    });
}

#[test]
fn test_malformed_file_is_error() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "max_concurrency = \"lots\"")?;
        let result = Config::load(Some(Path::new("bad.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
        Ok(())
    });
}

#[test]
fn test_unknown_algorithm_from_file_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_file("c.toml", "algorithm = \"foo123\"")?;
        let config = Config::load(Some(Path::new("c.toml"))).map_err(|e| e.to_string())?;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedAlgorithm(_))
        ));
        Ok(())
    });
}

#[test]
fn test_delete_args_merge() {
    let mut config = Config::default();
    let cli = Cli::try_parse_from(["dupesweep", "delete", "--list", "x.txt", "--trash"]).unwrap();
    let Commands::Delete(args) = &cli.command else {
        panic!("expected delete");
    };
    config.merge_delete_args(args);
    assert_eq!(config.list_path, PathBuf::from("x.txt"));
    assert!(config.trash);
}
