use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use swapper3d::console::{execute, render_event, ConsoleCommand, HELP};
use swapper3d::{init_logging, transport_config, HttpTransport, PanelConfig, SwapperPanel};
use swapper3d_core::EventFilter;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => PanelConfig::default_path()?,
    };
    let mut config = PanelConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.apply_env_overrides();
    config.validate()?;

    init_logging(&config.logging)?;
    tracing::info!(
        version = swapper3d::VERSION,
        build_date = swapper3d::BUILD_DATE,
        server = %config.server.base_url,
        "starting Swapper3D console"
    );

    let transport = HttpTransport::new(&transport_config(&config))?;
    tracing::info!(endpoint = %transport.endpoint(), "command endpoint");
    let panel = SwapperPanel::new(config.plugin.identifier.clone(), Arc::new(transport));

    panel.bus().subscribe(EventFilter::All, |event| {
        if let Some(line) = render_event(&event) {
            println!("{}", line);
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                eprintln!("{} (try 'help')", error);
                continue;
            }
        };
        if command == ConsoleCommand::Quit {
            break;
        }
        match execute(&panel, &command).await {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            // Already reported in the activity log
            Err(error) => tracing::debug!("{}", error),
        }
    }

    Ok(())
}
