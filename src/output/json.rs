//
//  bosh-cli
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output Formatting
//!
//! `--json` output for scripting. Values are printed pretty, one document
//! per command.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`write_json`] | Pretty JSON to stdout |
//! | [`write_json_to`] | Pretty JSON to any writer |

use std::io::Write;

use serde::Serialize;

pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn write_json_to<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_to_ends_with_newline() {
        let mut buf = Vec::new();
        write_json_to(&mut buf, &serde_json::json!({"name": "dep"})).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"name\": \"dep\""));
    }
}
