//! Copy-then-edit rendering of session templates.
//!
//! A template is never edited in place: it is first copied to its
//! destination, and the placeholder substitutions are then applied to the
//! copy. Placeholders are literal strings. Substitution is a single scan of
//! the template text, so a value that happens to contain a placeholder is
//! written as-is.

use log::{debug, error};
use std::fs;
use std::path::Path;

use crate::error_handling::types::TemplateError;

pub const LAB_TITLE: &str = "CHANGEME_LAB_TITLE";
pub const NODE_LABEL: &str = "CHANGEME_NODE_LABEL";
pub const USER: &str = "CHANGEME_USER";
pub const CONTROLLER: &str = "CHANGEME_CONTR";
pub const COMMAND: &str = "CHANGEME_CMD";

/// Placeholders used by the credential store seed, alongside [`USER`].
pub const SEED_PASSWORD: &str = "CHANGEME_PASS";
pub const SEED_CONTROLLER: &str = "CHANGEME_CML";

/// Ordered (placeholder, value) pairs.
pub type Substitutions<'a> = [(&'a str, String)];

/// Replaces every placeholder occurrence in `content` with its value.
///
/// The text is scanned once from left to right and inserted values are
/// never rescanned. When two placeholders start at the same position the
/// one listed first wins.
pub fn apply_substitutions(content: &str, substitutions: &Substitutions<'_>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    loop {
        let next = substitutions
            .iter()
            .enumerate()
            .filter(|(_, (placeholder, _))| !placeholder.is_empty())
            .filter_map(|(order, (placeholder, value))| {
                rest.find(*placeholder)
                    .map(|at| (at, order, placeholder.len(), value))
            })
            .min_by_key(|(at, order, _, _)| (*at, *order));

        match next {
            Some((at, _, len, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + len..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Copies `template` to `destination` and rewrites the copy with
/// `substitutions` applied. An existing destination is overwritten.
pub fn render(
    template: &Path,
    destination: &Path,
    substitutions: &Substitutions<'_>,
) -> Result<(), TemplateError> {
    fs::copy(template, destination).map_err(|e| {
        error!(
            "Failed to copy {} to {}: {}",
            template.display(),
            destination.display(),
            e
        );
        if template.exists() {
            TemplateError::WriteFailed(destination.to_path_buf(), e)
        } else {
            TemplateError::ReadFailed(template.to_path_buf(), e)
        }
    })?;

    let content = fs::read_to_string(destination)
        .map_err(|e| TemplateError::ReadFailed(destination.to_path_buf(), e))?;
    let rendered = apply_substitutions(&content, substitutions);
    fs::write(destination, rendered)
        .map_err(|e| TemplateError::WriteFailed(destination.to_path_buf(), e))?;

    debug!(
        "Rendered {} -> {} ({} substitutions)",
        template.display(),
        destination.display(),
        substitutions.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let out = apply_substitutions(
            "open /CHANGEME_LAB_TITLE/CHANGEME_NODE_LABEL/0 # CHANGEME_NODE_LABEL",
            &[(LAB_TITLE, "Lab: 1".to_string()), (NODE_LABEL, "R1".to_string())],
        );
        assert_eq!(out, "open /Lab: 1/R1/0 # R1");
    }

    #[test]
    fn test_apply_is_literal_not_pattern() {
        let out = apply_substitutions("a.*b a.*b", &[(".*", "X".to_string())]);
        assert_eq!(out, "aXb aXb");
    }

    #[test]
    fn test_apply_does_not_rescan_values() {
        let subs = [
            (USER, "CHANGEME_PASS".to_string()),
            (SEED_PASSWORD, "xCHANGEME_CMLx".to_string()),
            (SEED_CONTROLLER, "cml.lab".to_string()),
        ];
        assert_eq!(
            apply_substitutions("u=CHANGEME_USER p=CHANGEME_PASS c=CHANGEME_CML", &subs),
            "u=CHANGEME_PASS p=xCHANGEME_CMLx c=cml.lab"
        );
    }

    #[test]
    fn test_apply_first_listed_wins_at_same_position() {
        let out = apply_substitutions(
            "CHANGEME_CMD",
            &[("CHANGEME_C", "short".to_string()), (COMMAND, "long".to_string())],
        );
        assert_eq!(out, "shortMD");
    }

    #[test]
    fn test_apply_without_placeholders_is_identity() {
        assert_eq!(apply_substitutions("S:\"Hostname\"=cml", &[(USER, "x".to_string())]), "S:\"Hostname\"=cml");
        assert_eq!(apply_substitutions("abc", &[("", "x".to_string())]), "abc");
    }

    #[test]
    fn test_render_leaves_template_untouched() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template");
        let dest = dir.path().join("out.ini");
        fs::write(&template, "S:\"Username\"=CHANGEME_USER\n").unwrap();

        render(&template, &dest, &[(USER, "admin".to_string())]).unwrap();

        assert_eq!(fs::read_to_string(&template).unwrap(), "S:\"Username\"=CHANGEME_USER\n");
        assert_eq!(fs::read_to_string(&dest).unwrap(), "S:\"Username\"=admin\n");
    }

    #[test]
    fn test_render_output_independent_of_destination() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template");
        fs::write(&template, "CHANGEME_CONTR").unwrap();
        let subs = [(CONTROLLER, "10.0.0.1".to_string())];

        let a = dir.path().join("a.ini");
        let b = dir.path().join("b.ini");
        render(&template, &a, &subs).unwrap();
        render(&template, &b, &subs).unwrap();
        assert_eq!(fs::read_to_string(a).unwrap(), fs::read_to_string(b).unwrap());
    }

    #[test]
    fn test_render_missing_template() {
        let dir = TempDir::new().unwrap();
        let err = render(
            &dir.path().join("nope"),
            &dir.path().join("out"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::ReadFailed(_, _)));
    }

    #[test]
    fn test_render_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template");
        fs::write(&template, "x").unwrap();
        let err = render(&template, &dir.path().join("missing").join("out"), &[]).unwrap_err();
        assert!(matches!(err, TemplateError::WriteFailed(_, _)));
    }
}
