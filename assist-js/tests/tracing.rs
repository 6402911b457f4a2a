use assist_js::ContentAssist;
use assist_js::ProposalOptions;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedWriter {
  buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
  fn contents(&self) -> String {
    String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap()
  }
}

struct SharedWriterGuard<'a> {
  buffer: &'a Arc<Mutex<Vec<u8>>>,
}

impl<'a> io::Write for SharedWriterGuard<'a> {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.buffer.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> MakeWriter<'a> for SharedWriter {
  type Writer = SharedWriterGuard<'a>;

  fn make_writer(&'a self) -> Self::Writer {
    SharedWriterGuard {
      buffer: &self.buffer,
    }
  }
}

fn capture(f: impl FnOnce()) -> String {
  let writer = SharedWriter::default();
  let subscriber = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(tracing::Level::DEBUG)
    .with_ansi(false)
    .with_writer(writer.clone())
    .finish();
  let guard = tracing::subscriber::set_default(subscriber);
  f();
  drop(guard);
  writer.contents()
}

#[test]
fn requests_emit_spans() {
  let assist = ContentAssist::new();
  let output = capture(|| {
    let props = assist
      .compute_proposals("var zzz = 1;\nzz", 15, &ProposalOptions::with_prefix("zz"))
      .unwrap();
    assert_eq!(props.len(), 1);
    assist.compute_hover("var zzz = 1;\nzzz", 15).unwrap();
    assist.compute_summary("var zzz = 1;", "z.js").unwrap();
  });
  assert!(
    output.contains("assist_js.compute_proposals"),
    "expected compute_proposals span, got: {output}"
  );
  assert!(output.contains("proposals=1"), "got: {output}");
  assert!(output.contains("assist_js.compute_hover"));
  assert!(output.contains("assist_js.compute_summary"));
  assert!(output.contains("inference finished"));
}

#[test]
fn recoverable_problems_are_logged() {
  let assist = ContentAssist::new();
  let output = capture(|| {
    let hover = assist
      .compute_hover("/** @type {Number */\nvar m = 'x';\nm", 34)
      .unwrap();
    assert_eq!(hover.as_deref(), Some("m :: String"));
    assist
      .compute_proposals("var = ;\nx", 9, &ProposalOptions::default())
      .unwrap();
  });
  assert!(output.contains("ignoring malformed JSDoc"), "got: {output}");
  assert!(output.contains("recovered from syntax error"), "got: {output}");
}
