//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the PlacementPro REST API. The output path
//! defaults to `openapi.json` and can be overridden by the first argument.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, document)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}
