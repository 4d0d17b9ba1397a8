//! Static asset serving and the attachment download helper.
//!
//! Files are read fully into memory — no streaming, no caching headers, no
//! range support. Content type comes from a fixed extension table; anything
//! unknown goes out as `text/plain`.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::Fault;
use crate::response::Response;

/// Serves the file at `path` (as resolved by the router, relative to the
/// process working directory).
///
/// Missing file → [`Fault::FileNotFound`] (code `2`).
pub fn serve(path: &Path) -> Result<Response, Fault> {
    if !path.exists() {
        return Err(Fault::FileNotFound);
    }
    let data = fs::read(path).map_err(read_fault)?;
    let content_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(mime_for)
        .unwrap_or("text/plain");
    Ok(Response::builder().body(content_type, data))
}

/// Builds an attachment response for the file at `path`, prompting the client
/// to download it.
///
/// Missing file → [`Fault::FileNotFound`] (code `2`); unreadable →
/// [`Fault::PermissionDenied`] (code `13`). The download name defaults to the
/// path's final component.
pub fn send_file(path: &Path, file_name: Option<&str>) -> Result<Response, Fault> {
    if !path.exists() {
        return Err(Fault::FileNotFound);
    }
    let data = fs::read(path).map_err(read_fault)?;
    let name = file_name
        .or_else(|| path.file_name().and_then(|n| n.to_str()))
        .unwrap_or("download");
    Ok(Response::builder()
        .header("content-disposition", &format!("attachment; filename={name}"))
        .body("application/octet-stream", data))
}

/// The fixed extension → MIME table.
///
/// The historical table mapped `.js` to `text/css`; that was a transcription
/// bug, not a contract, and is corrected here.
fn mime_for(ext: &str) -> &'static str {
    match ext {
        "css"          => "text/css",
        "js"           => "text/javascript",
        "png"          => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _              => "text/plain",
    }
}

fn read_fault(e: io::Error) -> Fault {
    match e.kind() {
        io::ErrorKind::PermissionDenied => Fault::PermissionDenied,
        _ => Fault::FileNotFound,
    }
}
