use std::{
    fmt::{self, Write as _},
    io,
};

use crate::{parser::char::is_unquoted_char, Dictionary, Value};

const HEADER: &str = "// !$*UTF8*$!";

/// Record types that Xcode writes on a single line.
const INLINE_ISA: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Serialises a property list the way Xcode lays out `project.pbxproj`.
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, value);
    out
}

/// Serialises a property list to the given writer.
pub fn write<W: io::Write>(mut writer: W, value: &Value) -> io::Result<()> {
    writer.write_all(to_string(value).as_bytes())
}

fn write_document(out: &mut String, value: &Value) -> fmt::Result {
    writeln!(out, "{}", HEADER)?;
    write_value(out, value, 0)?;
    out.push('\n');
    Ok(())
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::String(s) => write_string(out, s),
        Value::Data(data) => write!(out, "<{}>", hex::encode(data)),
        Value::Array(array) => write_array(out, array, depth),
        Value::Dictionary(dict) if is_inline(dict) => write_inline_dictionary(out, dict),
        Value::Dictionary(dict) => write_dictionary(out, dict, depth),
    }
}

fn write_dictionary(out: &mut String, dict: &Dictionary, depth: usize) -> fmt::Result {
    out.push_str("{\n");
    for (key, value) in dict.iter() {
        indent(out, depth + 1);
        write_string(out, key)?;
        out.push_str(" = ");
        write_value(out, value, depth + 1)?;
        out.push_str(";\n");
    }
    indent(out, depth);
    out.push('}');
    Ok(())
}

fn write_inline_dictionary(out: &mut String, dict: &Dictionary) -> fmt::Result {
    out.push('{');
    for (key, value) in dict.iter() {
        write_string(out, key)?;
        out.push_str(" = ");
        match value {
            Value::Array(array) => {
                out.push('(');
                for item in array {
                    write_value(out, item, 0)?;
                    out.push_str(", ");
                }
                out.push(')');
            }
            Value::Dictionary(inner) => write_inline_dictionary(out, inner)?,
            _ => write_value(out, value, 0)?,
        }
        out.push_str("; ");
    }
    out.push('}');
    Ok(())
}

fn write_array(out: &mut String, array: &[Value], depth: usize) -> fmt::Result {
    out.push_str("(\n");
    for item in array {
        indent(out, depth + 1);
        write_value(out, item, depth + 1)?;
        out.push_str(",\n");
    }
    indent(out, depth);
    out.push(')');
    Ok(())
}

fn write_string(out: &mut String, s: &str) -> fmt::Result {
    if !needs_quotes(s) {
        out.push_str(s);
        return Ok(());
    }

    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => write!(out, "\\U{:04x}", c as u32)?,
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty() || s.contains("//") || s.contains("/*") || !s.chars().all(is_unquoted_char)
}

fn is_inline(dict: &Dictionary) -> bool {
    dict.get_str("isa")
        .map(|isa| INLINE_ISA.contains(&isa))
        .unwrap_or(false)
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}
