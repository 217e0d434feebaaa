//! Scenario tests across all codecs.

use clap::ValueEnum;

use super::mock::{ScriptedTransport, flip_byte, reference_packet};
use super::{Codec, NavProtocol, ProtocolError, ProtocolKind, egts, navtelecom, ndtp, wialon};

/// Replies that satisfy a fresh session's first call.
fn first_call_replies(kind: ProtocolKind) -> Vec<Vec<u8>> {
    match kind {
        ProtocolKind::Ndtp => vec![vec![0u8; 16], vec![0u8; 16]],
        ProtocolKind::Wialon => vec![wialon::LOGIN_OK.to_vec(), wialon::SHORT_DATA_OK.to_vec()],
        ProtocolKind::Egts => vec![egts::ACK.to_vec()],
        ProtocolKind::Navtelecom => vec![navtelecom::AUTH_OK.to_vec(), navtelecom::DATA_OK.to_vec()],
    }
}

/// Reply that satisfies one call of an authenticated session.
fn data_reply(kind: ProtocolKind) -> Vec<u8> {
    match kind {
        ProtocolKind::Ndtp => ndtp::NEGATIVE_ACK.to_vec(),
        ProtocolKind::Wialon => wialon::SHORT_DATA_OK.to_vec(),
        ProtocolKind::Egts => egts::ACK.to_vec(),
        ProtocolKind::Navtelecom => navtelecom::DATA_OK.to_vec(),
    }
}

#[test]
fn test_protocol_names_round_trip() {
    for kind in ProtocolKind::ALL {
        assert_eq!(kind.name().parse::<ProtocolKind>().unwrap(), kind);
        assert_eq!(Codec::new(kind).kind(), kind);
    }
}

#[test]
fn test_command_line_values_match_names() {
    let names: Vec<String> = ProtocolKind::value_variants()
        .iter()
        .filter_map(|kind| kind.to_possible_value())
        .map(|value| value.get_name().to_string())
        .collect();
    assert_eq!(names, ["ndtp", "wialon", "egts", "navtelecom"]);

    for kind in ProtocolKind::ALL {
        assert_eq!(<ProtocolKind as ValueEnum>::from_str(kind.name(), false).unwrap(), kind);
    }
    assert!(<ProtocolKind as ValueEnum>::from_str("wialon_ips", false).is_err());
}

#[test]
fn test_unknown_protocol_name() {
    let err = "teltonika".parse::<ProtocolKind>().unwrap_err();
    assert_eq!(err.0, "teltonika");
    assert!("NDTP".parse::<ProtocolKind>().is_err());
}

#[test]
fn test_handshake_on_first_call_only() {
    for kind in ProtocolKind::ALL {
        let mut codec = Codec::new(kind);
        let mut transport = ScriptedTransport::new(first_call_replies(kind));
        let packet = reference_packet();

        let first = codec.send(&packet, &mut transport).unwrap();
        let expected_first = if kind == ProtocolKind::Egts { 1 } else { 2 };
        assert_eq!(first.len(), expected_first, "{kind}");

        for _ in 0..3 {
            transport.push_reply(data_reply(kind));
            let frames = codec.send(&packet, &mut transport).unwrap();
            assert_eq!(frames.len(), 1, "{kind}");
        }
        assert_eq!(transport.written.len(), expected_first + 3, "{kind}");
    }
}

#[test]
fn test_fresh_sessions_are_independent() {
    for kind in ProtocolKind::ALL {
        let packet = reference_packet();

        let mut first = Codec::new(kind);
        let mut transport = ScriptedTransport::new(first_call_replies(kind));
        let frames_a = first.send(&packet, &mut transport).unwrap();

        let mut second = Codec::new(kind);
        let mut transport = ScriptedTransport::new(first_call_replies(kind));
        let frames_b = second.send(&packet, &mut transport).unwrap();

        assert_eq!(frames_a, frames_b, "{kind}");
    }
}

#[test]
fn test_packet_is_not_mutated() {
    let packet = reference_packet();
    let snapshot = packet.clone();

    for kind in ProtocolKind::ALL {
        let mut codec = Codec::new(kind);
        let mut transport = ScriptedTransport::new(first_call_replies(kind));
        codec.send(&packet, &mut transport).unwrap();
    }

    assert_eq!(packet, snapshot);
}

#[test]
fn test_write_failure_is_transport_error() {
    for kind in ProtocolKind::ALL {
        let mut codec = Codec::new(kind);
        let err = codec
            .send(&reference_packet(), &mut ScriptedTransport::broken())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Transport(_)), "{kind}");
    }
}

#[test]
fn test_wialon_echo_scenario() {
    let mut codec = Codec::new(ProtocolKind::Wialon);
    let mut transport = ScriptedTransport::new([b"#AL#1\r\n".to_vec(), b"#ASD#1\r\n".to_vec()]);

    let frames = codec.send(&reference_packet(), &mut transport).unwrap();

    assert_eq!(frames.len(), 2);
}

#[test]
fn test_wialon_bad_login_reply_stops_before_data() {
    for index in 0..wialon::LOGIN_OK.len() {
        let mut codec = Codec::new(ProtocolKind::Wialon);
        let mut transport =
            ScriptedTransport::new([flip_byte(wialon::LOGIN_OK, index), wialon::SHORT_DATA_OK.to_vec()]);

        let err = codec.send(&reference_packet(), &mut transport).unwrap_err();

        assert!(matches!(err, ProtocolError::WrongResponse { protocol: ProtocolKind::Wialon, .. }));
        assert_eq!(transport.written.len(), 1);
    }
}

#[test]
fn test_wrong_response_message_names_protocol() {
    let err = ProtocolError::wrong_response(ProtocolKind::Egts, &[0x01, 0xAB]);
    assert_eq!(err.to_string(), "egts: wrong response (2 bytes): [01, AB]");
}
