use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Personal dashboard with a caching image proxy")]
pub struct Args {
    /// Address the HTTP server binds to
    #[arg(long, env = "LISTEN_ADDRESS", default_value = "0.0.0.0:8080")]
    pub listen_address: String,

    /// JSON config file, defaults to ./config.json when present
    #[arg(long, env = "CONFIG_FILEPATH")]
    pub config_filepath: Option<PathBuf>,

    /// Directory holding cached images
    #[arg(long, env = "CACHE_DIR", default_value = "/tmp/launcher-cache")]
    pub cache_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["launcher"]).unwrap();

        assert_eq!(args.cache_dir, PathBuf::from("/tmp/launcher-cache"));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "launcher",
            "--listen-address",
            "127.0.0.1:9000",
            "--config-filepath",
            "/etc/launcher.json",
            "--cache-dir",
            "/var/cache/launcher",
        ])
        .unwrap();

        assert_eq!(args.listen_address, "127.0.0.1:9000");
        assert_eq!(
            args.config_filepath,
            Some(PathBuf::from("/etc/launcher.json"))
        );
        assert_eq!(args.cache_dir, PathBuf::from("/var/cache/launcher"));
    }
}
