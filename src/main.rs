use std::env;

use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use topup_wizard::csv::{read_session, write_summary};
use topup_wizard::{Wizard, WizardConfig, WizardHost};

/// Host that reports wizard callbacks through the log.
struct ConsoleHost;

impl WizardHost for ConsoleHost {
    fn on_complete(&mut self) {
        info!("top-up complete, refreshing balance");
    }

    fn on_cancel(&mut self) {
        info!("top-up cancelled");
    }

    fn on_view_history(&mut self) {
        info!("transaction history requested");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: topup-wizard <session.csv>");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let config = WizardConfig::from_env().unwrap_or_else(|e| {
        warn!("{e}, using defaults");
        WizardConfig::default()
    });

    let session = match read_session(path) {
        Ok(session) => session,
        Err(e) => {
            warn!("{e}");
            std::process::exit(1);
        }
    };

    let mut wizard = Wizard::with_config(config).with_host(ConsoleHost);
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in session {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    wizard.run(ReceiverStream::new(cmd_receiver)).await;

    if let Err(e) = write_summary(wizard.state()) {
        warn!("failed to write summary: {e}");
    }
}
