//! Shows the two everyday situations for a fingers-crossed handler.
//!
//! Run with `cargo run -p fingers-crossed --example fingers_crossed_demo`.

use std::io;

use fingers_crossed::{FingersCrossed, Level, Record, Sink, SinkError, WriterSink};

fn main() -> Result<(), SinkError> {
    // Nothing goes wrong: records stay buffered until flushed by hand.
    {
        let handler = FingersCrossed::new(WriterSink::new(io::stderr()));

        handler.handle(&Record::new(Level::Debug, "debug msg"))?; // no output
        handler.handle(&Record::new(Level::Info, "info msg"))?; // no output
        handler.handle(&Record::new(Level::Warn, "warn msg"))?; // no output

        // Prints "info msg" and "warn msg"; "debug msg" is dropped.
        handler.flush_logs(Level::Info)?;
    }

    // Something fails: the error reveals everything before it.
    {
        let handler = FingersCrossed::new(WriterSink::new(io::stderr()));

        handler.handle(&Record::new(Level::Debug, "debug msg"))?; // no output
        handler.handle(&Record::new(Level::Info, "info msg"))?; // no output
        handler.handle(&Record::new(Level::Error, "error msg"))?; // prints debug, info and error
        handler.handle(&Record::new(Level::Warn, "warn msg"))?; // printed immediately

        // Everything is already out; nothing happens.
        handler.flush_logs(Level::Info)?;
    }

    Ok(())
}
