#![no_main]

use libfuzzer_sys::fuzz_target;
use rollcall::http::framing::RequestFramer;
use rollcall::http::request::Request;

fuzz_target!{|chunks: Vec<Vec<u8>>| {
    let mut framer = RequestFramer::new();
    let mut received = Vec::new();
    for chunk in &chunks {
        received.extend_from_slice(chunk);
        if framer.push(chunk) {
            break
        }
    }
    let complete = framer.is_complete();
    let message = framer.into_message();

    // The message is always a prefix of what was received.
    assert!(received.starts_with(&message));
    if !complete {
        assert_eq!(message.len(), received.len());
    }

    if let Some(req) = Request::parse(&message) {
        if let Some(body) = req.declared_body() {
            assert!(body.len() <= req.body().len());
        }
        assert!(!req.path().contains(' '));
    }
}}
