//! Built‑in functions defined in every fresh interpreter.

use std::io::{self, BufRead};
use std::thread;
use std::time::{Duration, SystemTime, SystemTimeError, UNIX_EPOCH};

use log::debug;

use crate::object::NativeFunction;
use crate::value::Value;

/// The default global natives: `clock`, `read` and `wait`.
pub fn standard() -> Vec<NativeFunction> {
    vec![
        NativeFunction {
            name: "clock",
            arity: 0,
            func: clock,
        },
        NativeFunction {
            name: "read",
            arity: 0,
            func: read,
        },
        NativeFunction {
            name: "wait",
            arity: 1,
            func: wait,
        },
    ]
}

/// Seconds since the Unix epoch, with sub‑second precision.
fn clock(_args: &[Value]) -> Result<Value, String> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
        .as_secs_f64();

    debug!("Native function 'clock' returned: {}", timestamp);
    Ok(Value::Number(timestamp))
}

/// One line from stdin without its line ending, or `nil` at end of input.
fn read(_args: &[Value]) -> Result<Value, String> {
    let mut line = String::new();

    let bytes: usize = io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("Read error: {}", e))?;

    if bytes == 0 {
        return Ok(Value::Nil);
    }

    let trimmed: &str = line.trim_end_matches(['\n', '\r']);
    Ok(Value::String(trimmed.to_string()))
}

/// Block for the given number of seconds; negative waits return at once.
fn wait(args: &[Value]) -> Result<Value, String> {
    match args.first() {
        Some(Value::Number(seconds)) if !seconds.is_finite() => {
            Err("wait() duration must be finite.".to_string())
        }
        Some(Value::Number(seconds)) => {
            let duration: Duration = Duration::try_from_secs_f64(seconds.max(0.0))
                .map_err(|_| "wait() duration is out of range.".to_string())?;

            thread::sleep(duration);
            Ok(Value::Nil)
        }
        Some(other) => Err(format!(
            "wait() expects a number of seconds, got {}.",
            other.type_name()
        )),
        None => Err("wait() expects a number of seconds.".to_string()),
    }
}
