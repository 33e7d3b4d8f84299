use std::io::{Read, Write};
use std::path::Path;

use crate::codec::CodecError;

/// Read a whole file, or standard input when no path (or `-`) is given
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CodecError> {
    match path {
        Some(p) if p != Path::new("-") => {
            tracing::debug!("Reading input from {:?}", p);
            Ok(std::fs::read(p)?)
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write bytes to a file, or standard output when no path (or `-`) is given
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<(), CodecError> {
    match path {
        Some(p) if p != Path::new("-") => {
            tracing::debug!("Writing {} bytes to {:?}", bytes.len(), p);
            std::fs::write(p, bytes)?;
        }
        _ => {
            let mut out = std::io::stdout().lock();
            out.write_all(bytes)?;
            out.flush()?;
        }
    }
    Ok(())
}
