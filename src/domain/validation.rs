use url::Url;

use super::types::{ServiceLimits, Submission, SubmissionInput, ZipSelection};
use crate::error::ValidationError;

const GITHUB_PREFIX: &str = "https://github.com/";

/// Check the active tab's input and turn it into a submission.
///
/// Pure: the ZIP path has already been inspected into a [`ZipSelection`].
/// Only the first problem is reported.
pub fn validate(
    input: &SubmissionInput,
    limits: &ServiceLimits,
) -> Result<Submission, ValidationError> {
    match input {
        SubmissionInput::Paste { code, filename } => {
            if code.is_empty() {
                return Err(ValidationError::CodeRequired);
            }
            if filename.is_empty() {
                return Err(ValidationError::FilenameRequired);
            }
            Ok(Submission::Paste {
                code: code.clone(),
                filename: filename.clone(),
            })
        }
        SubmissionInput::ZipUpload(selection) => match selection {
            ZipSelection::None => Err(ValidationError::ZipRequired),
            ZipSelection::NotAFile(_) => Err(ValidationError::ZipNotAFile),
            ZipSelection::File { size_bytes, .. } if *size_bytes > limits.max_zip_size_bytes => {
                Err(ValidationError::ZipTooLarge {
                    max_mb: limits.max_zip_size_mb,
                })
            }
            ZipSelection::File { path, size_bytes } => Ok(Submission::Zip {
                path: path.clone(),
                size_bytes: *size_bytes,
            }),
        },
        SubmissionInput::GithubRepo { url } => {
            if !url.starts_with(GITHUB_PREFIX) {
                return Err(ValidationError::NotGithubUrl);
            }
            let parsed = Url::parse(url).map_err(|_| ValidationError::NotGithubUrl)?;
            if parsed.host_str() != Some("github.com") || parsed.port().is_some() {
                return Err(ValidationError::NotGithubUrl);
            }
            Ok(Submission::Github { url: parsed })
        }
    }
}
