use loqa_converse::client::{ClientMessage, ClientMultiplexer, Outbound};

#[test]
fn test_caption_serialization() {
    let msg = ClientMessage::Caption {
        output: "I feel anxious today".to_string(),
    };

    let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "caption", "output": "I feel anxious today"})
    );
}

#[test]
fn test_audio_session_omits_missing_sid2() {
    let announce = ClientMessage::AudioSession { sid1: 3, sid2: None };
    let json = announce.to_json().unwrap();
    assert_eq!(json, r#"{"type":"audio_session","sid1":3}"#);

    let committed = ClientMessage::AudioSession {
        sid1: 3,
        sid2: Some(3),
    };
    assert_eq!(
        committed.to_json().unwrap(),
        r#"{"type":"audio_session","sid1":3,"sid2":3}"#
    );
}

#[test]
fn test_audio_chunk_is_byte_array() {
    let msg = ClientMessage::Audio {
        output: vec![0, 127, 255],
        sid1: 2,
        sid2: 2,
    };

    let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "audio");
    assert_eq!(json["output"], serde_json::json!([0, 127, 255]));
    assert_eq!(json["sid1"], 2);
    assert_eq!(json["sid2"], 2);
}

#[test]
fn test_stop_and_metadata_shapes() {
    assert_eq!(
        ClientMessage::AudioStop { stop: true }.to_json().unwrap(),
        r#"{"type":"audio_stop","stop":true}"#
    );

    let metadata = ClientMessage::Metadata {
        metadata: serde_json::json!({"request_id": "abc"}),
    };
    let json: serde_json::Value = serde_json::from_str(&metadata.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "metadata");
    assert_eq!(json["metadata"]["request_id"], "abc");
}

#[test]
fn test_multiplexer_preserves_enqueue_order() {
    let (client, mut rx) = ClientMultiplexer::new();

    client.audio(vec![1], 1, 1);
    client.stop();
    client.caption("next");
    client.close();

    assert_eq!(
        rx.try_recv().unwrap(),
        Outbound::Message(ClientMessage::Audio {
            output: vec![1],
            sid1: 1,
            sid2: 1
        })
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        Outbound::Message(ClientMessage::AudioStop { stop: true })
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        Outbound::Message(ClientMessage::Caption {
            output: "next".to_string()
        })
    );
    assert_eq!(rx.try_recv().unwrap(), Outbound::Close);
}

#[test]
fn test_multiplexer_reports_closed_writer() {
    let (client, rx) = ClientMultiplexer::new();
    drop(rx);

    assert!(!client.caption("nobody listening"));
}
