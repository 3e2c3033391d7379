//! Line-oriented command console
//!
//! Each stdin line is one request:
//! - `read <attribute>` prints the latest reading
//! - `list` prints configured attributes and commands
//! - `<COMMAND> [payload]` invokes a command with an optional JSON payload

use devsim_engine::{CommandInvoker, SimulatedDevice};

/// A parsed console line
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleRequest<'a> {
    Read(&'a str),
    List,
    Invoke { command: &'a str, payload: &'a str },
}

/// Parse one line, or `None` for a blank line
pub fn parse_line(line: &str) -> Option<ConsoleRequest<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    Some(match head {
        "read" if !rest.is_empty() => ConsoleRequest::Read(rest),
        "list" if rest.is_empty() => ConsoleRequest::List,
        command => ConsoleRequest::Invoke {
            command,
            payload: rest,
        },
    })
}

/// Execute a request against the device and render the reply
pub fn execute(device: &SimulatedDevice, request: &ConsoleRequest<'_>) -> String {
    match request {
        ConsoleRequest::Read(name) => match device.read_attribute(name) {
            Some(reading) => format!("{name}={}", reading.value),
            None => format!("ERROR: unknown attribute {name}"),
        },
        ConsoleRequest::List => format!(
            "attributes: {}\ncommands: {}",
            device.attribute_names().join(", "),
            device.command_names().join(", ")
        ),
        ConsoleRequest::Invoke { command, payload } => {
            match device.invoke(command, payload) {
                Ok(response) => response,
                Err(e) => format!("ERROR: {e}"),
            }
        }
    }
}
