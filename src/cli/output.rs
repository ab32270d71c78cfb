//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Initialization { .. } => {
            format!("{}\nhint: check the [[shared_roots]] entries of the definition file", e)
        }
        ApiError::InvalidIdentifier { .. } => format!(
            "{}\nhint: identifiers look like perspective:<id>, simple:<node>, generator:<node>, \
             grouping:<node>;k=v or record:<type>:<key>",
            e
        ),
        _ => e.to_string(),
    }
}
