mod stream_event;

pub use stream_event::{StreamEvent, StreamEventType};
