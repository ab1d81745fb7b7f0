//! Pinpoint - native entry point

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Result;
    use clap::Parser;
    use pinpoint_core::config::{load_config, save_default_config};
    use std::path::PathBuf;
    use tracing::{info, Level};
    use tracing_subscriber::FmtSubscriber;

    #[derive(Parser, Debug)]
    #[command(name = "pinpoint")]
    #[command(about = "3D model viewer with named surface hotspots")]
    #[command(version)]
    pub struct Args {
        /// Path to configuration file
        #[arg(short, long, default_value = "pinpoint.toml")]
        pub config: PathBuf,

        /// GLB model to open on startup
        #[arg(short, long)]
        pub model: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error); overrides the config
        #[arg(short, long)]
        pub log_level: Option<String>,

        /// Write a configuration file with default values and exit
        #[arg(long)]
        pub write_default_config: bool,
    }

    pub fn parse_level(level: &str) -> Level {
        match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        if args.write_default_config {
            save_default_config(&args.config)?;
            println!("Wrote default configuration to {}", args.config.display());
            return Ok(());
        }

        let config = load_config(&args.config)?;

        let level = parse_level(args.log_level.as_deref().unwrap_or(&config.logging.level));
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;

        info!("Pinpoint v{}", env!("CARGO_PKG_VERSION"));
        info!(
            config = %args.config.display(),
            fov = config.camera.fov_degrees,
            "Configuration loaded"
        );

        pinpoint_viewer::app::run(config, args.model);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_level() {
            assert_eq!(parse_level("DEBUG"), Level::DEBUG);
            assert_eq!(parse_level("warn"), Level::WARN);
            assert_eq!(parse_level("nonsense"), Level::INFO);
        }

        #[test]
        fn test_args_defaults() {
            let args = Args::try_parse_from(["pinpoint"]).unwrap();
            assert_eq!(args.config, PathBuf::from("pinpoint.toml"));
            assert!(args.model.is_none());
            assert!(args.log_level.is_none());
            assert!(!args.write_default_config);

            let args =
                Args::try_parse_from(["pinpoint", "--model", "car.glb", "-l", "debug"]).unwrap();
            assert_eq!(args.model, Some(PathBuf::from("car.glb")));
            assert_eq!(args.log_level.as_deref(), Some("debug"));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

// The browser build starts from the wasm-bindgen entry in lib.rs
#[cfg(target_arch = "wasm32")]
fn main() {}
