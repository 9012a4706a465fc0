//! Command-line and environment settings of the HTTP server

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "newbond")]
#[command(about = "Macro charts, earnings analysis and market news over HTTP", long_about = None)]
#[command(version)]
pub struct ServerConfig {
    /// Interface to listen on
    #[arg(long, env = "NEWBOND_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(long, env = "NEWBOND_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory served under /static
    #[arg(long, env = "NEWBOND_STATIC_DIR", default_value = "chartHtml")]
    pub static_dir: PathBuf,

    /// TTF/OTF font for chart text in place of the bundled DejaVu Sans
    #[arg(long, env = "NEWBOND_CHART_FONT")]
    pub chart_font: Option<PathBuf>,
}

impl ServerConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.bind, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["newbond"]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.static_dir, PathBuf::from("chartHtml"));
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_flags() {
        let config = ServerConfig::try_parse_from([
            "newbond",
            "--bind",
            "0.0.0.0",
            "--port",
            "9000",
            "--chart-font",
            "/usr/share/fonts/DejaVuSans.ttf",
        ])
        .unwrap();
        assert_eq!(config.addr().unwrap().port(), 9000);
        assert!(config.chart_font.is_some());

        let bad = ServerConfig::try_parse_from(["newbond", "--bind", "not an ip"]).unwrap();
        assert!(bad.addr().is_err());
    }
}
