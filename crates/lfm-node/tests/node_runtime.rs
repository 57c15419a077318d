//! Runtime tests: the node task, its channels, and the NDJSON adapter.

use lfm_node::{MarketNode, NodeInput, NodeOutput, stdio};
use lfm_types::*;
use tokio::sync::mpsc;

fn config() -> MarketConfig {
    MarketConfig {
        component_name: "LFM1".to_string(),
        open_hour: 8,
        close_hour: 20,
        procurers: vec![ParticipantId::new("pgo-1")],
        producers: vec![ParticipantId::new("der-1")],
    }
}

fn event(event: InboundEvent) -> NodeInput {
    NodeInput::Event(event)
}

fn ready(participant: &str) -> NodeInput {
    event(InboundEvent::Status(StatusEvent {
        participant_id: ParticipantId::new(participant),
        message_id: MessageId::new(format!("ready-{participant}")),
    }))
}

async fn collect(mut rx: mpsc::UnboundedReceiver<NodeOutput>) -> Vec<NodeOutput> {
    let mut outputs = Vec::new();
    while let Some(output) = rx.recv().await {
        outputs.push(output);
    }
    outputs
}

fn topics(outputs: &[NodeOutput]) -> Vec<&str> {
    outputs
        .iter()
        .map(|output| match output {
            NodeOutput::Published { topic, .. } => topic.as_str(),
            NodeOutput::EpochCompleted { .. } => "completed",
        })
        .collect()
}

#[tokio::test]
async fn node_runs_a_full_epoch() {
    let (input_tx, input_rx) = mpsc::channel(16);
    let (output_tx, output_rx) = mpsc::unbounded_channel();
    let node = MarketNode::new(&config(), output_tx).unwrap();
    let task = tokio::spawn(node.run(input_rx));

    let inputs = [
        NodeInput::Epoch(EpochTick::dummy(1, 10)),
        event(InboundEvent::Need(FlexibilityNeed::dummy("c-1", "pgo-1"))),
        event(InboundEvent::Offer(Offer::dummy("o-1", "c-1", "der-1", 1))),
        event(InboundEvent::Selection(SelectionEvent {
            offer_ids: vec![OfferId::new("o-1")],
            message_id: MessageId::new("sel-1"),
        })),
        ready("pgo-1"),
        // Ignored: the epoch is already complete.
        ready("pgo-1"),
    ];
    for input in inputs {
        input_tx.send(input).await.unwrap();
    }
    drop(input_tx);

    task.await.unwrap().unwrap();
    let outputs = collect(output_rx).await;
    assert_eq!(
        topics(&outputs),
        vec![
            "LFMMarketResult.LFM1",
            "Request.LFM1",
            "LFMOffering.pgo-1",
            "LFMMarketResult.LFM1",
            "completed",
        ]
    );
    assert_eq!(
        outputs.last(),
        Some(&NodeOutput::EpochCompleted {
            epoch: EpochNumber(1)
        })
    );
}

#[tokio::test]
async fn consecutive_epochs_each_report_completion() {
    let (input_tx, input_rx) = mpsc::channel(16);
    let (output_tx, output_rx) = mpsc::unbounded_channel();
    let node = MarketNode::new(&config(), output_tx).unwrap();
    let task = tokio::spawn(node.run(input_rx));

    input_tx.send(NodeInput::Epoch(EpochTick::dummy(0, 0))).await.unwrap();
    input_tx.send(NodeInput::Epoch(EpochTick::dummy(1, 2))).await.unwrap();
    input_tx.send(NodeInput::Epoch(EpochTick::dummy(2, 9))).await.unwrap();
    input_tx.send(ready("pgo-1")).await.unwrap();
    drop(input_tx);

    task.await.unwrap().unwrap();
    let completed: Vec<_> = collect(output_rx)
        .await
        .into_iter()
        .filter_map(|output| match output {
            NodeOutput::EpochCompleted { epoch } => Some(epoch.0),
            NodeOutput::Published { .. } => None,
        })
        .collect();
    assert_eq!(completed, vec![0, 1, 2]);
}

#[tokio::test]
async fn closed_output_channel_stops_the_node() {
    let (input_tx, input_rx) = mpsc::channel(4);
    let (output_tx, output_rx) = mpsc::unbounded_channel();
    drop(output_rx);
    let node = MarketNode::new(&config(), output_tx).unwrap();
    let task = tokio::spawn(node.run(input_rx));

    input_tx.send(NodeInput::Epoch(EpochTick::dummy(1, 10))).await.unwrap();
    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, LfmError::PublishFailed { .. }));
}

#[test]
fn invalid_config_is_rejected() {
    let (output_tx, _output_rx) = mpsc::unbounded_channel();
    let mut bad = config();
    bad.close_hour = 24;
    assert!(matches!(
        MarketNode::new(&bad, output_tx),
        Err(LfmError::Configuration(_))
    ));
}

#[tokio::test]
async fn reader_skips_blank_and_undecodable_lines() {
    let tick = serde_json::to_string(&NodeInput::Epoch(EpochTick::dummy(1, 9))).unwrap();
    let status = serde_json::to_string(&ready("pgo-1")).unwrap();
    let text = format!(
        "{tick}\n\n{{\"event\":{{\"type\":\"weather\",\"message_id\":\"m\"}}}}\nnot json\n{status}\n"
    );

    let (tx, mut rx) = mpsc::channel(8);
    let forwarded = stdio::read_inputs(text.as_bytes(), tx).await.unwrap();
    assert_eq!(forwarded, 2);
    assert!(matches!(rx.recv().await, Some(NodeInput::Epoch(_))));
    assert!(matches!(
        rx.recv().await,
        Some(NodeInput::Event(InboundEvent::Status(_)))
    ));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn writer_emits_one_json_line_per_output() {
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(NodeOutput::Published {
        topic: "LFMMarketResult.LFM1".to_string(),
        event: OutboundEvent::MarketResult(MarketResultEvent::empty(EpochNumber(1), vec![])),
    })
    .unwrap();
    tx.send(NodeOutput::EpochCompleted {
        epoch: EpochNumber(1),
    })
    .unwrap();
    drop(tx);

    let mut buf = Vec::new();
    let written = stdio::write_outputs(rx, &mut buf).await.unwrap();
    assert_eq!(written, 2);

    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines[0]["kind"], "published");
    assert_eq!(lines[0]["event"]["type"], "market_result");
    assert_eq!(lines[1]["kind"], "epoch_completed");
}
