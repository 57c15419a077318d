//! `lfm-node`: runs one coordinator over stdin/stdout.
//!
//! Configuration comes from the environment (`SIMULATION_COMPONENT_NAME`,
//! `MarketOpeningTime`, `MarketClosingTime`, `FlexibilityProcurerList`,
//! `FlexibilityProviderList`).

use std::process::ExitCode;

use lfm_node::{LogFormat, MarketNode, init_logging, stdio};
use lfm_types::{LfmError, MarketConfig, Result};
use tokio::io::BufReader;
use tokio::sync::mpsc;

const INPUT_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = init_logging(LogFormat::from_env()) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "LFM node failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = MarketConfig::from_env()?;
    tracing::info!(
        component = %config.component_name,
        open_hour = config.open_hour,
        close_hour = config.close_hour,
        procurers = config.procurers.len(),
        producers = config.producers.len(),
        version = lfm_types::constants::VERSION,
        "Starting LFM node"
    );

    let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER);
    let (output_tx, output_rx) = mpsc::unbounded_channel();

    let node = MarketNode::new(&config, output_tx)?;
    let node_task = tokio::spawn(node.run(input_rx));
    let writer_task = tokio::spawn(stdio::write_outputs(output_rx, tokio::io::stdout()));

    let read = stdio::read_inputs(BufReader::new(tokio::io::stdin()), input_tx).await?;
    tracing::info!(inputs = read, "Input exhausted");

    node_task
        .await
        .map_err(|e| LfmError::Internal(format!("market node task: {e}")))??;
    let written = writer_task
        .await
        .map_err(|e| LfmError::Internal(format!("output writer task: {e}")))??;
    tracing::info!(outputs = written, "LFM node finished");
    Ok(())
}
