use std::path::PathBuf;

use crate::error::WorkflowError;
use crate::plan::BuildPlan;

/// A value picked at one wizard stage.
///
/// Both variants collapse to the same plain string once resolved; the
/// distinction only matters while the value is being collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// One of the options the wizard listed.
    Listed(String),
    /// Free text typed into the input box.
    Custom(String),
}

impl Choice {
    pub fn resolve(self) -> String {
        match self {
            Choice::Listed(value) => value,
            Choice::Custom(text) => text.trim().to_owned(),
        }
    }
}

/// Choices accumulated while walking the wizard.
///
/// Choosing a stage again discards every choice below it, so the record
/// always describes one root-to-leaf path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub acr_name: Option<String>,
    pub acr_resource_group: Option<String>,
    pub registry_server: Option<String>,
    pub repository: Option<String>,
    pub tag: Option<String>,
    pub dockerfile_path: Option<PathBuf>,
    pub build_context: Option<PathBuf>,
}

impl Selection {
    pub fn choose_registry(&mut self, name: &str, resource_group: &str, login_server: &str) {
        *self = Self {
            acr_name: Some(name.to_owned()),
            acr_resource_group: Some(resource_group.to_owned()),
            registry_server: Some(login_server.to_owned()),
            ..Self::default()
        };
    }

    pub fn choose_repository(&mut self, choice: Choice) {
        self.repository = Some(choice.resolve());
        self.tag = None;
        self.dockerfile_path = None;
        self.build_context = None;
    }

    pub fn choose_tag(&mut self, choice: Choice) {
        self.tag = Some(choice.resolve());
        self.dockerfile_path = None;
        self.build_context = None;
    }

    pub fn choose_dockerfile(&mut self, choice: Choice) {
        self.dockerfile_path = Some(PathBuf::from(choice.resolve()));
        self.build_context = None;
    }

    pub fn choose_context(&mut self, context: PathBuf) {
        self.build_context = Some(context);
    }

    /// Turn the selection into a validated plan.
    ///
    /// A missing stage is reported as [`WorkflowError::Incomplete`]; path
    /// problems surface from [`crate::validate_paths`].
    pub fn to_plan(&self, skip_latest: bool, platform: Option<String>) -> crate::Result<BuildPlan> {
        let registry_server = self
            .registry_server
            .as_deref()
            .ok_or(WorkflowError::Incomplete("registry"))?;
        let repository = self
            .repository
            .as_deref()
            .ok_or(WorkflowError::Incomplete("repository"))?;
        let tag = self.tag.as_deref().ok_or(WorkflowError::Incomplete("tag"))?;
        let dockerfile_path = self
            .dockerfile_path
            .as_deref()
            .ok_or(WorkflowError::Incomplete("Dockerfile"))?;
        let build_context = self
            .build_context
            .as_deref()
            .ok_or(WorkflowError::Incomplete("build context"))?;

        Ok(
            BuildPlan::new(registry_server, repository, tag, dockerfile_path, build_context)?
                .with_skip_latest(skip_latest)
                .with_platform(platform),
        )
    }
}
