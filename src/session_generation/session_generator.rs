use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::controller_api::types::LabTopology;
use crate::error_handling::types::GeneratorError;
use crate::session_generation::sanitizer::SanitizedName;
use crate::session_generation::template_renderer::{self, COMMAND, LAB_TITLE, NODE_LABEL};

/// Device classes without console access.
pub const EXCLUDED_DEVICE_CLASSES: [&str; 2] = ["external_connector", "unmanaged_switch"];

/// Extension of every generated session file.
pub const SESSION_EXTENSION: &str = "ini";

/// Console command opening `label` in `lab_title` on the controller's console server.
pub fn connect_command(lab_title: &str, label: &str) -> String {
    format!("open /{}/{}/0", lab_title, label)
}

/// Outcome of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub lab_dir: PathBuf,
    pub created: usize,
    pub skipped: usize,
    pub files: Vec<PathBuf>,
}

/// Turns a lab topology into one session file per console-capable node.
///
/// Files land in `<controller_dir>/<sanitized lab title>/<sanitized label>.ini`.
/// Running twice over the same topology overwrites the same files.
pub struct SessionGenerator<'a> {
    controller_dir: &'a Path,
    node_template: &'a Path,
    excluded: &'a [&'a str],
}

impl<'a> SessionGenerator<'a> {
    pub fn new(controller_dir: &'a Path, node_template: &'a Path) -> Self {
        Self {
            controller_dir,
            node_template,
            excluded: &EXCLUDED_DEVICE_CLASSES,
        }
    }

    pub fn with_excluded(mut self, excluded: &'a [&'a str]) -> Self {
        self.excluded = excluded;
        self
    }

    fn is_excluded(&self, device_class: &str) -> bool {
        self.excluded.contains(&device_class)
    }

    /// Creates (or reuses) the lab directory, then renders every eligible node.
    ///
    /// The first template failure aborts the pass; files already written stay
    /// on disk and are overwritten by the next run.
    pub fn generate(&self, topology: &LabTopology) -> Result<GenerationReport, GeneratorError> {
        let title = SanitizedName::new(&topology.title);
        let lab_dir = self.controller_dir.join(&title.sanitized);

        fs::create_dir_all(&lab_dir).map_err(|e| {
            error!("Directory for lab '{}' can not be created: {}", title.sanitized, e);
            GeneratorError::DirectoryCreation(lab_dir.clone(), e)
        })?;
        info!("Directory for lab '{}' ready at {}", title.sanitized, lab_dir.display());

        let mut report = GenerationReport {
            lab_dir: lab_dir.clone(),
            created: 0,
            skipped: 0,
            files: Vec::new(),
        };
        let mut seen: HashSet<String> = HashSet::new();

        for node in &topology.nodes {
            if self.is_excluded(&node.node_definition) {
                debug!(
                    "Skipping node '{}' ({}): no console access",
                    node.label, node.node_definition
                );
                report.skipped += 1;
                continue;
            }

            let label = SanitizedName::new(&node.label);
            if !seen.insert(label.sanitized.clone()) {
                warn!(
                    "Node '{}' maps to an existing session name '{}'; the earlier file is overwritten",
                    label.original, label.sanitized
                );
            }

            let destination = lab_dir.join(format!("{}.{}", label.sanitized, SESSION_EXTENSION));
            let substitutions = [
                (COMMAND, connect_command(&title.original, &label.original)),
                (LAB_TITLE, title.original.clone()),
                (NODE_LABEL, label.original.clone()),
            ];
            template_renderer::render(self.node_template, &destination, &substitutions)?;
            debug!("Created session {}", destination.display());

            report.created += 1;
            report.files.push(destination);
        }

        info!(
            "Generation of node session files for lab '{}' complete: {} created, {} skipped",
            title.original, report.created, report.skipped
        );
        Ok(report)
    }
}
