use crate::error::ParseError;
use crate::types::PlatformManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedManifest {
    pub manifest: PlatformManifest,
    pub format: DocumentFormat,
}

pub fn parse_manifest_str(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedManifest, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedManifest {
            manifest: serde_json::from_str::<PlatformManifest>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedManifest {
            manifest: serde_yaml::from_str::<PlatformManifest>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_manifest_auto(input),
    }
}

fn parse_manifest_auto(input: &str) -> Result<ParsedManifest, ParseError> {
    // Heuristic: JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<PlatformManifest>(input) {
            Ok(manifest) => {
                return Ok(ParsedManifest {
                    manifest,
                    format: DocumentFormat::Json,
                });
            }
            Err(e) => {
                // JSON-looking input that fails JSON parsing may still be YAML.
                if let Ok(manifest) = serde_yaml::from_str::<PlatformManifest>(input) {
                    return Ok(ParsedManifest {
                        manifest,
                        format: DocumentFormat::Yaml,
                    });
                }
                return Err(ParseError::Json(e));
            }
        }
    }

    match serde_yaml::from_str::<PlatformManifest>(input) {
        Ok(manifest) => Ok(ParsedManifest {
            manifest,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => {
            if let Ok(manifest) = serde_json::from_str::<PlatformManifest>(input) {
                return Ok(ParsedManifest {
                    manifest,
                    format: DocumentFormat::Json,
                });
            }
            Err(ParseError::Yaml(e))
        }
    }
}
