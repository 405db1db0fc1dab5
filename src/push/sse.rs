use crate::push::hub::PushEvent;

/// Encodes one event as a `text/event-stream` frame.
pub fn encode(event: &PushEvent) -> String {
    let data = event.payload().to_string();
    let mut frame = format!("event: {}\n", event.name());
    for line in data.lines() {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}
