//! Wire-level output of the emitter through a raw HTTP stream channel.

use std::io::{self, Write};

use response_emitter::response::SeekBody;
use response_emitter::{
    respond, EmitError, Emitter, HttpResponse, OutputChannel, OutputMode, StreamChannel,
};

fn emit_to_string(mode: OutputMode) -> String {
    let channel = StreamChannel::new(Vec::new());
    let handle = channel.clone();
    let app = move || {
        handle.write(b"[notice]").unwrap();
        respond(
            HttpResponse::new(200)
                .with_header("Content-Type", "text/plain")
                .with_header("Set-Cookie", "a=1")
                .with_header("Set-Cookie", "b=2")
                .with_body(SeekBody::from_bytes(b"hello".to_vec())),
        )
    };

    let emitter = Emitter::with_mode(app, mode);
    emitter.run(&channel).unwrap();
    drop(emitter);

    let bytes = channel.into_inner().expect("emitter dropped its handle");
    String::from_utf8(bytes).unwrap()
}

const HEAD: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n";

#[test]
fn test_prepend_on_the_wire() {
    assert_eq!(emit_to_string(OutputMode::Prepend), format!("{HEAD}[notice]hello"));
}

#[test]
fn test_append_on_the_wire() {
    assert_eq!(emit_to_string(OutputMode::Append), format!("{HEAD}hello[notice]"));
}

#[test]
fn test_clean_on_the_wire() {
    assert_eq!(emit_to_string(OutputMode::Clean), format!("{HEAD}hello"));
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_transport_failure_propagates() {
    let channel = StreamChannel::new(BrokenPipe);
    let app = || respond(HttpResponse::new(200).with_body(SeekBody::from_bytes(b"x".to_vec())));

    let err = Emitter::with_mode(app, OutputMode::Prepend)
        .run(&channel)
        .unwrap_err();

    match err {
        EmitError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn test_pipe_backed_body_is_streamed_from_cursor() {
    use std::cell::RefCell;
    use std::fs::File;
    use std::os::fd::OwnedFd;
    use std::process::{Command, Stdio};

    let mut child = Command::new("printf")
        .arg("piped-body")
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let pipe = File::from(OwnedFd::from(child.stdout.take().unwrap()));
    let body = RefCell::new(Some(SeekBody::new(pipe)));

    let channel = StreamChannel::new(Vec::new());
    let app = move || {
        let body = body.borrow_mut().take().expect("app called once");
        respond(HttpResponse::new(200).with_body(body))
    };

    let emitter = Emitter::with_mode(app, OutputMode::Prepend);
    let report = emitter.run(&channel).unwrap();
    drop(emitter);
    child.wait().unwrap();

    assert_eq!(report.body_bytes, 10);
    let bytes = channel.into_inner().expect("emitter dropped its handle");
    assert_eq!(String::from_utf8(bytes).unwrap(), "HTTP/1.1 200 OK\r\n\r\npiped-body");
}
