//! Offline route resolution.
//!
//! Loads a configuration, builds its routers and reports what a request
//! would resolve to, without binding a listener.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::{json, Value};

use route_dispatch::config::{load_config, ConfigError, ServerConfig};
use route_dispatch::lifecycle::build_routers;
use route_dispatch::observability::logging;
use route_dispatch::routing::{DispatchError, Params, Resolution};

#[derive(Parser)]
#[command(name = "route-check")]
#[command(about = "Show how a request would be routed", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Host header to route on. Ignored when no hosts are configured.
    #[arg(long)]
    host: Option<String>,

    /// Request method, e.g. GET.
    method: String,

    /// Request target: path plus optional query.
    target: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init("warn");

    match check(&cli) {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn check(cli: &Cli) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;
    Ok(report(&config, &cli.method, &cli.target, cli.host.as_deref())?)
}

/// Resolve one request against the routers built from `config`.
fn report(
    config: &ServerConfig,
    method: &str,
    target: &str,
    host: Option<&str>,
) -> Result<Value, ConfigError> {
    let routers = build_routers(config)?;

    let mut host_report = Value::Null;
    let mut outer = Params::new();
    if let (Some(hosts), Some(host)) = (&routers.hosts, host) {
        match hosts.resolve(host) {
            Ok(matched) => {
                host_report = json!({"pattern": matched.pattern, "params": &matched.params});
                outer = matched.params;
            }
            Err(err) => return Ok(error_report(&err)),
        }
    }

    let mut report = match routers.path.resolve_target(target, method) {
        Resolution::Redirect(location) => json!({
            "outcome": "redirect",
            "status": 301,
            "location": location,
        }),
        Resolution::Error(err) => error_report(&err),
        Resolution::Dispatch { pattern, params, .. } => json!({
            "outcome": "dispatched",
            "status": 200,
            "pattern": pattern,
            "params": outer.merge(params),
        }),
    };

    if !host_report.is_null() {
        report["host"] = host_report;
    }
    Ok(report)
}

fn error_report(err: &DispatchError) -> Value {
    json!({
        "outcome": err.outcome(),
        "status": err.status().as_u16(),
        "error": err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_dispatch::config::parse_config;

    const ROUTES: &str = r#"
        [[routes]]
        name = "file"
        pattern = "/files/<path:.+>"

        [[routes]]
        name = "docs"
        pattern = "/docs/"
    "#;

    #[test]
    fn test_report_cleans_and_decodes_by_default() {
        let config = parse_config(ROUTES).unwrap();

        let out = report(&config, "GET", "/files//a", None).unwrap();
        assert_eq!(out["outcome"], "redirect");
        assert_eq!(out["location"], "/files/a");

        let out = report(&config, "GET", "/files/a%2Fb", None).unwrap();
        assert_eq!(out["outcome"], "dispatched");
        assert_eq!(out["params"], json!({"path": "a/b"}));
    }

    #[test]
    fn test_report_with_url_path_mode() {
        let config = parse_config(&format!("[router]\nuse_url_path = true\n{}", ROUTES)).unwrap();

        let out = report(&config, "GET", "/files//a%20b?x=1", None).unwrap();
        assert_eq!(out["outcome"], "dispatched");
        assert_eq!(out["params"], json!({"path": "/a b"}));

        let out = report(&config, "GET", "/docs?x=1", None).unwrap();
        assert_eq!(out["outcome"], "redirect");
        assert_eq!(out["location"], "/docs/?x=1");

        let out = report(&config, "GET", "/files/%zz", None).unwrap();
        assert_eq!(out["status"], 400);
    }

    #[test]
    fn test_report_host_miss() {
        let config = parse_config(&format!(
            "{}\n[[hosts]]\nname = \"api\"\npattern = \"api.example.com\"\n",
            ROUTES
        ))
        .unwrap();

        let out = report(&config, "GET", "/docs/", Some("api.example.com:443")).unwrap();
        assert_eq!(out["outcome"], "dispatched");
        assert_eq!(out["host"]["pattern"], "api.example.com");

        let out = report(&config, "GET", "/docs/", Some("www.example.com")).unwrap();
        assert_eq!(out["outcome"], "not_found");
        assert_eq!(out["status"], 404);
    }
}
