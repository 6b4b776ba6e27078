use playlist_engine::{SseFrame, SseParser};
use pretty_assertions::assert_eq;

fn frame(event: &str, data: &str) -> SseFrame {
    SseFrame {
        event: Some(event.to_string()),
        data: data.to_string(),
        ..SseFrame::default()
    }
}

#[test]
fn frames_split_across_chunks_are_reassembled() {
    let mut parser = SseParser::new();
    assert!(parser.push(b"event: download_sta").is_empty());
    assert!(parser.push(b"tus\ndata: {\"current\":1,").is_empty());
    let frames = parser.push(b"\"total\":2}\n\nevent: download_stopped\n");

    assert_eq!(
        frames,
        vec![frame("download_status", "{\"current\":1,\"total\":2}")]
    );
    assert_eq!(parser.push(b"\n"), vec![frame("download_stopped", "")]);
}

#[test]
fn crlf_comments_and_multiline_data() {
    let mut parser = SseParser::new();
    let frames = parser.push(b": keep-alive\r\n\r\nid: 7\r\nretry: 1500\r\nevent: x\r\ndata: a\r\ndata: b\r\n\r\n");

    assert_eq!(
        frames,
        vec![SseFrame {
            event: Some("x".to_string()),
            id: Some("7".to_string()),
            retry: Some(1500),
            data: "a\nb".to_string(),
        }]
    );
}

#[test]
fn utf8_split_inside_a_character_survives() {
    let payload = "data: {\"title\":\"caf\u{e9}\"}\n\n".as_bytes();
    let split = payload.iter().position(|b| *b == 0xC3).unwrap() + 1;
    let mut parser = SseParser::new();

    assert!(parser.push(&payload[..split]).is_empty());
    let frames = parser.push(&payload[split..]);
    assert_eq!(frames[0].data, "{\"title\":\"caf\u{e9}\"}");
}

#[test]
fn finish_flushes_unterminated_frame() {
    let mut parser = SseParser::new();
    assert!(parser.push(b"event: download_stopped\ndata: {}").is_empty());
    assert_eq!(parser.finish(), Some(frame("download_stopped", "{}")));
    assert_eq!(parser.finish(), None);
}

#[test]
fn unknown_fields_and_blank_lines_emit_nothing() {
    let mut parser = SseParser::new();
    assert!(parser.push(b"\n\nfoo: bar\n\n").is_empty());
}

#[test]
fn oversized_line_is_dropped_and_parsing_resumes() {
    let mut parser = SseParser::with_max_line_bytes(16);
    assert!(parser.push(b"event: download_status\n").is_empty());
    assert!(parser.push(b"data: 0123456789abcdef").is_empty());
    assert!(parser.push(b"0123456789").is_empty());
    assert!(parser.push(b"still the same line\n\n").is_empty());

    let frames = parser.push(b"event: download_stopped\ndata: {}\n\n");
    assert_eq!(frames, vec![frame("download_stopped", "{}")]);
}
