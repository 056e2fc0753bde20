//! Command line interface for the `simple-fileserver` binary.

use clap::Parser;
use std::path::PathBuf;

use simple_fileserver::config::Overrides;

/// Serve a directory read-only over HTTP.
#[derive(Debug, Parser)]
#[command(name = "simple-fileserver", version, about)]
pub struct Cli {
    /// Configuration file, without extension.
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Directory to serve.
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on; 0 picks a free port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Tokio worker threads (defaults to the number of CPU cores).
    #[arg(short, long)]
    pub workers: Option<usize>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            host: self.host.clone(),
            port: self.port,
            workers: self.workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn parses_defaults() {
        let cli = Cli::parse_from(["simple-fileserver"]);
        assert_eq!(cli.config, "config");
        assert!(cli.root.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "simple-fileserver",
            "--root",
            "/srv/www",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "-w",
            "2",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.root.as_deref(), Some(std::path::Path::new("/srv/www")));
        assert_eq!(overrides.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(overrides.port, Some(9000));
        assert_eq!(overrides.workers, Some(2));
    }
}
