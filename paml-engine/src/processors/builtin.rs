//! Processors that run in-process.

use super::{ForeignProcessor, ProcessRequest, Processed};
use crate::error::{PamlError, Result};
use crate::model::{FormatFlag, FormatFlags};

/// `@raw`: the block body verbatim, trailing newlines and tabs removed.
///
/// Asks for `PRESERVE` and `COMPACT`, so ancestors' normalising or
/// wrapping flags never touch the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawProcessor;

impl ForeignProcessor for RawProcessor {
    fn name(&self) -> &str {
        "raw"
    }

    fn description(&self) -> &str {
        "Verbatim block, emitted byte for byte"
    }

    fn process(&self, request: &ProcessRequest<'_>) -> Result<Processed> {
        let text = request.text.trim_end_matches(['\n', '\t', '\r']);
        Ok(Processed::new(text, "text/plain").with_flags(
            FormatFlags::empty()
                .with(FormatFlag::Preserve)
                .with(FormatFlag::Compact),
        ))
    }
}

/// `@json`: validates the block and emits compact JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonProcessor;

impl ForeignProcessor for JsonProcessor {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "JSON data, validated and compacted"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn process(&self, request: &ProcessRequest<'_>) -> Result<Processed> {
        let value: serde_json::Value = serde_json::from_str(request.text)
            .map_err(|e| PamlError::processor("json", e.to_string()))?;
        let text =
            serde_json::to_string(&value).map_err(|e| PamlError::processor("json", e.to_string()))?;
        Ok(Processed::new(text, "application/json").with_flags(FormatFlags::empty().with(FormatFlag::Preserve)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmbedKind, EmbedMode};

    #[test]
    fn raw_trims_trailing_newlines_only() {
        let mode = EmbedMode::new(EmbedKind::Raw);
        let request = ProcessRequest {
            text: "  a\n    b\n\n\t",
            path: None,
            mode: &mode,
        };
        let out = RawProcessor.process(&request).unwrap();
        assert_eq!(out.text, "  a\n    b");
        assert!(out.flags.contains(FormatFlag::Preserve));
        assert!(out.flags.contains(FormatFlag::Compact));
    }

    #[test]
    fn json_is_compacted_and_validated() {
        let mode = EmbedMode::new(EmbedKind::Json);
        let request = ProcessRequest {
            text: "{\n  \"a\": [1, 2]\n}\n",
            path: None,
            mode: &mode,
        };
        assert_eq!(JsonProcessor.process(&request).unwrap().text, "{\"a\":[1,2]}");

        let bad = ProcessRequest {
            text: "{a:",
            path: None,
            mode: &mode,
        };
        assert!(JsonProcessor.process(&bad).is_err());
    }
}
