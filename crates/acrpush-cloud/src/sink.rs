use tokio::sync::mpsc;

/// Something a gateway call wants the user to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// The exact invocation, published before the process starts.
    Command(String),
    /// One line of merged stdout/stderr, in arrival order.
    Output(String),
}

/// Observer for gateway calls.
///
/// Publishing never fails: with no receiver attached, or once the receiver
/// is dropped, events are discarded.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    tx: Option<mpsc::UnboundedSender<GatewayEvent>>,
}

impl OutputSink {
    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self::default()
    }

    /// A sink plus the receiving end of its events.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GatewayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::from_sender(tx), rx)
    }

    pub fn from_sender(tx: mpsc::UnboundedSender<GatewayEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn command(&self, program: &str, args: &[String]) {
        self.publish(GatewayEvent::Command(render_command(program, args)));
    }

    pub fn output(&self, line: &str) {
        self.publish(GatewayEvent::Output(line.to_owned()));
    }

    fn publish(&self, event: GatewayEvent) {
        if let Some(tx) = &self.tx
            && tx.send(event).is_err()
        {
            tracing::trace!("gateway event receiver closed");
        }
    }
}

/// Render an invocation the way a POSIX shell would accept it.
pub fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(quote)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if safe {
        word.to_owned()
    } else {
        format!("'{}'", word.replace('\'', r#"'"'"'"#))
    }
}
