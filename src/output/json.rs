//
//  jenkins-cli
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use serde::Serialize;
use std::io::Write;

/// Prints `value` as pretty JSON to stdout.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value)
}

/// Writes `value` as pretty JSON followed by a newline.
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_to() {
        let mut buffer = Vec::new();
        write_json_to(&mut buffer, &serde_json::json!({"name": "alpha"})).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "{\n  \"name\": \"alpha\"\n}\n"
        );
    }

    #[test]
    fn test_write_slice() {
        let mut buffer = Vec::new();
        write_json_to(&mut buffer, &[1, 2][..]).unwrap();
        assert!(String::from_utf8(buffer).unwrap().starts_with('['));
    }
}
