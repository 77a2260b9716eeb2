mod common;

use common::{connected_panel, count_lines, device, panel};
use swapper3d_communication::{Command, DEFAULT_PLUGIN_ID};
use swapper3d_core::{ConnectionState, LoadedInsert, PanelError};

#[tokio::test]
async fn test_commands_refused_while_disconnected() {
    let (panel, transport) = panel();

    for result in [
        panel.unload().await,
        panel.swap_to_insert("3").await,
        panel.bore_alignment(true).await,
        panel.bore_alignment(false).await,
        panel.send_line("M118 hello").await,
    ] {
        assert!(matches!(
            result,
            Err(PanelError::PreconditionViolation {
                state: ConnectionState::Disconnected,
                ..
            })
        ));
    }

    assert_eq!(transport.call_count(), 0);
    assert_eq!(panel.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_commands_refused_while_connecting() {
    let (panel, transport) = panel();
    panel.connect().await.unwrap();
    assert_eq!(panel.connection_state(), ConnectionState::Connecting);

    let result = panel.unload().await;
    assert!(result.unwrap_err().is_precondition_violation());
    assert_eq!(transport.sent_commands(), vec!["connect"]);
}

#[tokio::test]
async fn test_second_connect_is_refused() {
    let (panel, transport) = panel();
    panel.connect().await.unwrap();

    let result = panel.connect().await;
    assert!(matches!(
        result,
        Err(PanelError::PreconditionViolation {
            state: ConnectionState::Connecting,
            ..
        })
    ));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_connect_refused_while_connected() {
    let (panel, transport) = connected_panel().await;
    let before = transport.call_count();

    let result = panel.connect().await;
    assert!(matches!(
        result,
        Err(PanelError::PreconditionViolation {
            state: ConnectionState::Connected,
            ..
        })
    ));
    assert_eq!(transport.call_count(), before);
    assert_eq!(panel.connection_state(), ConnectionState::Connected);

    let refusals = panel
        .log()
        .messages()
        .iter()
        .filter(|m| m.starts_with("Connect command not sent"))
        .count();
    assert_eq!(refusals, 1);
}

#[tokio::test]
async fn test_lifecycle_commands_reject_insert_number() {
    let (panel, transport) = panel();
    for command in [Command::Connect, Command::Disconnect] {
        let result = panel.dispatcher().send(command, Some(2)).await;
        assert!(matches!(result, Err(PanelError::Other(_))));
    }
    assert_eq!(transport.call_count(), 0);
    assert_eq!(panel.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_success_line_logged_once() {
    let (panel, _) = connected_panel().await;
    panel.bore_alignment(true).await.unwrap();

    assert_eq!(count_lines(&panel, "Borealignon command successful"), 1);
    assert_eq!(count_lines(&panel, "Connect command successful"), 1);
}

#[tokio::test]
async fn test_failure_body_logged_verbatim() {
    let (panel, transport) = connected_panel().await;
    let body = r#"{"error": "Insert carousel jammed"}"#;
    transport.fail_next(500, body);

    let error = panel.unload().await.unwrap_err();
    assert!(error.is_transport_failure());
    assert_eq!(error.transport_body(), Some(body));

    let line = format!("Unload command failed: {}", body);
    assert_eq!(count_lines(&panel, &line), 1);
    assert_eq!(count_lines(&panel, "Unload command successful"), 0);
}

#[tokio::test]
async fn test_failed_connect_reverts_to_disconnected() {
    let (panel, transport) = panel();
    transport.fail_next(503, "Service Unavailable");

    assert!(panel.connect().await.is_err());
    assert_eq!(panel.connection_state(), ConnectionState::Disconnected);
    assert_eq!(
        count_lines(&panel, "Connect command failed: Service Unavailable"),
        1
    );

    // Lifecycle is usable again
    panel.connect().await.unwrap();
    assert_eq!(panel.connection_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn test_swap_sends_zero_based_index() {
    let (panel, transport) = connected_panel().await;
    panel.swap_to_insert("1").await.unwrap();
    panel.swap_to_insert(" 12 ").await.unwrap();

    let loads: Vec<_> = transport
        .sent()
        .into_iter()
        .filter(|p| p.command == "load_insert")
        .map(|p| p.insert_number)
        .collect();
    assert_eq!(loads, vec![Some(0), Some(11)]);
    assert_eq!(count_lines(&panel, "Swap to insert requested: 0"), 1);
}

#[tokio::test]
async fn test_swap_rejects_bad_identifiers() {
    let (panel, transport) = connected_panel().await;
    let before = transport.call_count();

    for raw in ["abc", "", "2.5", "0"] {
        assert!(matches!(
            panel.swap_to_insert(raw).await,
            Err(PanelError::InvalidInsertIdentifier { .. })
        ));
    }
    assert_eq!(transport.call_count(), before);
}

#[tokio::test]
async fn test_unload_clears_insert() {
    let (panel, _) = connected_panel().await;
    panel
        .handle_push(DEFAULT_PLUGIN_ID, &device("currentlyLoadedInsert", "4"))
        .await
        .unwrap();
    assert_eq!(
        panel.snapshot().loaded_insert,
        LoadedInsert::Insert("4".to_string())
    );

    panel.unload().await.unwrap();
    assert!(panel.snapshot().loaded_insert.is_none());
}

#[tokio::test]
async fn test_failed_unload_keeps_insert() {
    let (panel, transport) = connected_panel().await;
    panel
        .handle_push(DEFAULT_PLUGIN_ID, &device("currentlyLoadedInsert", "4"))
        .await
        .unwrap();

    transport.fail_next(500, "busy");
    assert!(panel.unload().await.is_err());
    assert_eq!(
        panel.snapshot().loaded_insert,
        LoadedInsert::Insert("4".to_string())
    );
}

#[tokio::test]
async fn test_disconnect_clears_session() {
    let (panel, transport) = connected_panel().await;
    panel
        .handle_push(DEFAULT_PLUGIN_ID, &device("currentlyLoadedInsert", "2"))
        .await
        .unwrap();

    panel.disconnect().await.unwrap();
    let state = panel.snapshot();
    assert_eq!(state.connection, ConnectionState::Disconnected);
    assert!(state.loaded_insert.is_none());
    assert_eq!(transport.sent_commands().last().map(String::as_str), Some("disconnect"));
}

#[tokio::test]
async fn test_disconnect_allowed_while_disconnected() {
    let (panel, transport) = panel();
    panel.disconnect().await.unwrap();
    assert_eq!(transport.sent_commands(), vec!["disconnect"]);
}

#[tokio::test]
async fn test_send_line_payload() {
    let (panel, transport) = connected_panel().await;
    panel.send_line("M118 ping").await.unwrap();

    let payload = transport.sent().pop().unwrap();
    assert_eq!(payload.command, "send");
    assert_eq!(payload.message.as_deref(), Some("M118 ping"));
    assert_eq!(payload.insert_number, None);
}
