//! # Swapper3D
//!
//! Control core for the Swapper3D insert-swapping printer accessory. The
//! device is reached through a print server plugin: commands go out as
//! HTTP posts, device reports come back as push messages.
//!
//! ## Architecture
//!
//! 1. **swapper3d-core** - State, activity log, event bus, errors
//! 2. **swapper3d-communication** - Commands, transport, connection lifecycle,
//!    dispatch and push-event reconciliation
//! 3. **swapper3d-settings** - Configuration files and overrides
//! 4. **swapper3d** - Logging setup and the interactive console

pub mod console;

pub use swapper3d_communication::{
    Command, CommandDispatcher, CommandRequest, CommandTransport, ConnectionController,
    EventReconciler, HttpTransport, HttpTransportConfig, InsertSelector, PluginMessage,
    PushEvent, SwapperPanel, TransportError,
};
pub use swapper3d_core::{
    ActivityLog, ConnectionState, DeviceStatus, EventBus, LoadedInsert, PanelError, PanelEvent,
    PanelResult, PanelState,
};
pub use swapper3d_settings::{LoggingSettings, PanelConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize diagnostic logging
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so it does not interleave with console output.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    if settings.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// HTTP transport settings for a loaded config
pub fn transport_config(config: &PanelConfig) -> HttpTransportConfig {
    HttpTransportConfig {
        base_url: config.server.base_url.clone(),
        command_path: config.command_path(),
        api_key: config.server.api_key.clone(),
        timeout: config.timeout(),
    }
}
