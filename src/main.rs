//! cnc-monitor - poll a CNC API server and log machine status.
//!
//! ```text
//! cnc-monitor [ENDPOINT] [--count N] [--config PATH]
//! ```
//!
//! `ENDPOINT` is `tcp://host:port`, `tls://host:port` or `host:port`. When
//! omitted, the endpoint from the configuration file is used.

use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cnc_api_client::{
    default_config_path, ClientConfig, CncApiClient, ConnectionMonitor, ConnectionState,
    Endpoint, InfoContext,
};

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    endpoint: Option<Endpoint>,
    count: Option<u64>,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--count" | "-n" => {
                let value = args.next().context("--count needs a value")?;
                parsed.count = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid cycle count {:?}", value))?,
                );
            }
            "--config" | "-c" => {
                let value = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                println!("usage: cnc-monitor [ENDPOINT] [--count N] [--config PATH]");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("Unknown option {}", other),
            other => {
                if parsed.endpoint.is_some() {
                    bail!("Only one endpoint may be given");
                }
                parsed.endpoint = Some(other.parse()?);
            }
        }
    }
    Ok(parsed)
}

fn log_status(context: &InfoContext) {
    if let Some(cnc) = context.cnc_info().data() {
        tracing::info!(
            "state={} units={} line={} feed={:.1} spindle={:.0}",
            cnc.machine_state().as_str(),
            cnc.units().as_str(),
            cnc.gcode_line,
            cnc.feed.target,
            cnc.spindle.actual,
        );
    }
    if let Some(axes) = context.axes_info().data() {
        tracing::info!(
            "machine={:?} homed={:#x}",
            axes.machine_position,
            axes.homing_done_mask
        );
    }
    if let Some(compile) = context.compile_info().data() {
        tracing::debug!("compile state={}", compile.compile_state().as_str());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cnc_api_client=info,cnc_monitor=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = ClientConfig::load_or_default(&config_path)?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = Some(endpoint);
    }
    let Some(endpoint) = config.endpoint.clone() else {
        bail!(
            "No endpoint given and none configured in {}",
            config_path.display()
        );
    };

    tracing::info!("Starting cnc-monitor v{}", env!("CARGO_PKG_VERSION"));

    let interval = config.refresh_interval();
    let mut client = CncApiClient::new(config);
    let mut monitor = ConnectionMonitor::new();
    if monitor.opened(client.connect_endpoint(&endpoint)) != ConnectionState::Connected {
        let reason = client
            .last_error()
            .map(ToString::to_string)
            .unwrap_or_default();
        bail!("Could not connect to {}: {}", endpoint, reason);
    }

    let mut context = InfoContext::new();
    let mut cycles = 0u64;
    loop {
        context.refresh(&mut client);
        if monitor.observe(client.is_connected()) == ConnectionState::Error {
            tracing::error!("Connection to {} lost", endpoint);
            break;
        }
        log_status(&context);

        cycles += 1;
        if args.count.is_some_and(|count| cycles >= count) {
            break;
        }
        thread::sleep(interval);
    }

    client.close();
    monitor.closed();
    tracing::info!("cnc-monitor stopped after {} cycles", cycles);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_endpoint_and_count() {
        let parsed = args(&["tls://cnc.local:9000", "--count", "3"]).unwrap();
        assert_eq!(parsed.endpoint, Some(Endpoint::new("cnc.local", 9000, true)));
        assert_eq!(parsed.count, Some(3));
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(args(&["--count"]).is_err());
        assert!(args(&["--count", "many"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a:1", "b:2"]).is_err());
    }
}
