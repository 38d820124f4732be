// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `${id}` placeholder substitution for redirect URLs and messages to sign.
//!
//! There is exactly one placeholder. Anything else that opens a `${`
//! sequence is rejected so a typo such as `${ id}` or a missing closing
//! brace never ends up in a stored URL.

use super::AuthorizationError;
use crate::models::AuthorizationRequestId;

/// The only placeholder recognised in templates.
pub const ID_PLACEHOLDER: &str = "${id}";

/// Check that `template` contains no placeholder syntax other than `${id}`.
pub fn validate(template: &str) -> Result<(), AuthorizationError> {
    // Scan the template as written: removing `${id}` first would join the
    // text around it into new `${` sequences.
    let mut rest = template;
    while let Some(pos) = rest.find("${") {
        let candidate = &rest[pos..];
        if let Some(after) = candidate.strip_prefix(ID_PLACEHOLDER) {
            rest = after;
            continue;
        }
        let fragment = match candidate.find('}') {
            Some(end) => &candidate[..=end],
            None => candidate,
        };
        return Err(AuthorizationError::InvalidTemplate(format!(
            "unsupported or unterminated placeholder `{fragment}`"
        )));
    }
    Ok(())
}

/// Replace every `${id}` with the hyphenated request id.
///
/// Single non-recursive pass; the template must already be validated.
pub fn resolve(template: &str, id: AuthorizationRequestId) -> String {
    template.replace(ID_PLACEHOLDER, &id.0.hyphenated().to_string())
}
