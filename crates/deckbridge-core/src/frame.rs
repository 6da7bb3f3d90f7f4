use crate::events::TriggerEvent;

/// One unit of the streaming wire format. Comment frames (`Hello`,
/// `KeepAlive`) carry no payload; `Data` carries a JSON-encoded event.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Sent exactly once, immediately after a subscription is established.
    Hello,
    /// Emitted when a stream has been idle for a full wait window.
    KeepAlive,
    Data(TriggerEvent),
}

impl Frame {
    const HELLO: &'static str = ": connected\n\n";
    const KEEP_ALIVE: &'static str = ": ping\n\n";

    /// Encode to wire text: UTF-8, blank-line terminated, comment lines
    /// prefixed `:`, data lines prefixed `data: `. Fails only if the event
    /// fails to serialize.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        match self {
            Frame::Hello => Ok(Self::HELLO.to_owned()),
            Frame::KeepAlive => Ok(Self::KEEP_ALIVE.to_owned()),
            Frame::Data(event) => {
                let json = serde_json::to_string(event)?;
                Ok(format!("data: {json}\n\n"))
            }
        }
    }
}
