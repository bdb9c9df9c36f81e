//! `VISIBLE` and `GIMMEH`.

use std::io::{BufRead, Write};

use crate::{Error, Result, Value};

/// Writes every value's text form, back to back, then a newline unless
/// `newline` is false (the `!` suffix).
pub fn print(out: &mut impl Write, values: &[Value], newline: bool) -> Result<()> {
    write_values(out, values, newline).map_err(|e| Error::io("print", &e))
}

fn write_values(out: &mut impl Write, values: &[Value], newline: bool) -> std::io::Result<()> {
    for value in values {
        write!(out, "{value}")?;
    }
    if newline {
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Reads one line as a YARN, without its line terminator. End of input reads
/// as the empty YARN.
pub fn read_line(input: &mut impl BufRead) -> Result<Value> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| Error::io("read input", &e))?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::from(line))
}
