//! Selection wizard.
//!
//! Walks the user through registry, repository, tag, Dockerfile and build
//! context, one tree level per stage. Each activation fills the next level
//! from the gateway or the filesystem and records the choice in a
//! [`Selection`]. The terminal front end in [`crate::tui`] only draws the
//! tree and forwards keys.

mod tree;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use acrpush_build::{find_dockerfiles, resume_session, tenant_mismatch};
use acrpush_cloud::{Account, CommandExecutor, Gateway, Registry, ToolError};
use acrpush_core::{
    BuildPlan, CUSTOM_TAG, Choice, Selection, Settings, WorkflowError, build_tag_options,
    max_semantic_version,
};

pub use tree::{Node, NodeKind, NodePath, Row};

const ROOT_LABEL: &str = "ACR Push";

/// How far along the decision path the selection is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Root,
    RegistrySelected,
    RepositorySelected,
    TagSelected,
    DockerfileSelected,
    ContextSelected,
    Confirmed,
}

/// What the front end has to do after an activation.
#[derive(Debug)]
pub enum Activation {
    Done,
    /// A free-text value is needed; see [`Wizard::prompt`].
    AwaitingInput,
    /// The plan passed validation. The caller runs it and reports back
    /// through [`Wizard::build_finished`].
    StartBuild(BuildPlan),
}

struct Prompt {
    path: NodePath,
    placeholder: &'static str,
}

pub struct Wizard<E: CommandExecutor> {
    gateway: Arc<Gateway<E>>,
    settings: Settings,
    cwd: PathBuf,
    tree: Node,
    selection: Selection,
    account: Option<Account>,
    status: String,
    session_busy: bool,
    building: bool,
    prompt: Option<Prompt>,
}

impl<E: CommandExecutor> Wizard<E> {
    pub fn new(gateway: Arc<Gateway<E>>, settings: Settings, cwd: PathBuf) -> Self {
        let mut tree = Node::new(NodeKind::Root, ROOT_LABEL);
        tree.expanded = true;
        Self {
            gateway,
            settings,
            cwd,
            tree,
            selection: Selection::default(),
            account: None,
            status: "Checking Azure session...".to_owned(),
            session_busy: true,
            building: false,
            prompt: None,
        }
    }

    // ── Read access for the front end ──

    pub fn gateway(&self) -> Arc<Gateway<E>> {
        Arc::clone(&self.gateway)
    }

    pub fn rows(&self) -> Vec<Row> {
        self.tree.visible()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Placeholder of the open input, if any.
    pub fn prompt(&self) -> Option<&'static str> {
        self.prompt.as_ref().map(|p| p.placeholder)
    }

    /// The tree refuses activations while this is true.
    pub fn is_busy(&self) -> bool {
        self.session_busy || self.building
    }

    pub fn stage(&self) -> Stage {
        let s = &self.selection;
        if self.building {
            Stage::Confirmed
        } else if s.build_context.is_some() {
            Stage::ContextSelected
        } else if s.dockerfile_path.is_some() {
            Stage::DockerfileSelected
        } else if s.tag.is_some() {
            Stage::TagSelected
        } else if s.repository.is_some() {
            Stage::RepositorySelected
        } else if s.registry_server.is_some() {
            Stage::RegistrySelected
        } else {
            Stage::Root
        }
    }

    // ── Session ──

    /// Bootstrap the session and list registries under the root.
    pub async fn start(&mut self) {
        self.session_busy = true;
        let loaded = self.load_registries().await;
        self.session_busy = false;

        let registries = match loaded {
            Ok(registries) => registries,
            Err(e) => {
                tracing::error!(error = %e, "session bootstrap failed");
                self.status = e.to_string();
                return;
            }
        };

        if let Some(account) = &self.account {
            self.tree.label = format!("{} - {}", account.tenant_name, account.account_name);
        }
        let children = registries
            .into_iter()
            .map(|r| {
                let label = format!("{} (rg: {})", r.name, r.resource_group);
                Node::new(NodeKind::Registry(r), label)
            })
            .collect();
        self.tree.set_children(children);
        self.status = self.tenant_status();
    }

    async fn load_registries(&mut self) -> Result<Vec<Registry>, WorkflowError> {
        let gateway: &Gateway<E> = &self.gateway;
        let account = resume_session(gateway, self.settings.subscription.as_deref()).await?;
        self.account = Some(account);
        Ok(gateway.list_registries().await?)
    }

    fn tenant_status(&self) -> String {
        let Some(a) = &self.account else {
            return "Select a registry and press Enter to expand.".to_owned();
        };
        match tenant_mismatch(a, self.settings.tenant_id.as_deref()) {
            Some(tenant) => {
                tracing::warn!(active = %a.tenant_id, requested = tenant, "tenant differs");
                format!(
                    "Current tenant: {} ({}), not {tenant}. Run `az login --tenant {tenant}` and restart acr-push.",
                    a.tenant_name, a.tenant_id
                )
            }
            None => format!(
                "Current tenant: {} ({}). Select a registry and press Enter to expand.",
                a.tenant_name, a.tenant_id
            ),
        }
    }

    // ── Activation ──

    /// Show the loading marker on `path` if activating it will call out.
    ///
    /// The front end calls this and redraws before awaiting [`Self::activate`].
    pub fn mark_loading(&mut self, path: &NodePath) -> bool {
        if self.is_busy() {
            return false;
        }
        let Some(node) = self.tree.get_mut(path) else {
            return false;
        };
        let fetches = matches!(
            node.kind,
            NodeKind::Registry(_) | NodeKind::Repository(_) | NodeKind::Tag(_)
        );
        let toggles = node.expanded && !node.children.is_empty();
        node.loading = fetches && !toggles;
        // Registry login is session-level: the whole tree waits for it.
        if node.loading && matches!(node.kind, NodeKind::Registry(_)) {
            self.session_busy = true;
        }
        node.loading
    }

    pub async fn activate(&mut self, path: &NodePath) -> Activation {
        let marked = self.tree.get(path).is_some_and(|n| n.loading);
        if self.building || (self.session_busy && !marked) || self.prompt.is_some() {
            return Activation::Done;
        }
        let Some(node) = self.tree.get(path) else {
            return Activation::Done;
        };
        let kind = node.kind.clone();
        let toggles = node.expanded && !node.children.is_empty();

        self.tree.collapse_unrelated(path);

        if toggles {
            self.set_loading(path, false);
            if let Some(node) = self.tree.get_mut(path) {
                node.collapse();
            }
            self.status = "Collapsed.".to_owned();
            return Activation::Done;
        }

        let activation = match kind {
            NodeKind::Root => {
                self.tree.expanded = true;
                Activation::Done
            }
            NodeKind::Registry(registry) => {
                self.expand_registry(path, registry).await;
                Activation::Done
            }
            NodeKind::Repository(name) => {
                self.expand_tags(path, Choice::Listed(name)).await;
                Activation::Done
            }
            NodeKind::Tag(tag) => {
                self.expand_dockerfiles(path, Choice::Listed(tag));
                Activation::Done
            }
            NodeKind::Dockerfile(dockerfile) => {
                self.expand_context(path, Choice::Listed(dockerfile));
                Activation::Done
            }
            NodeKind::Context(context) => {
                self.select_context(path, PathBuf::from(context));
                Activation::Done
            }
            NodeKind::ContextCurrentDirectory => {
                self.select_context(path, self.cwd.clone());
                Activation::Done
            }
            NodeKind::RepositoryCustom => self.open_prompt(path, "Enter repository name"),
            NodeKind::TagCustom => self.open_prompt(path, "Enter tag"),
            NodeKind::DockerfileCustom => self.open_prompt(path, "Enter Dockerfile path"),
            NodeKind::ContextCustom => self.open_prompt(path, "Enter build context path"),
            NodeKind::Confirm => self.confirm(),
        };
        self.set_loading(path, false);
        activation
    }

    async fn expand_registry(&mut self, path: &NodePath, registry: Registry) {
        self.session_busy = true;
        let loaded = self.load_repositories(&registry.name).await;
        self.session_busy = false;

        let repositories = match loaded {
            Ok(repositories) => repositories,
            Err(e) => {
                self.status = e.message();
                return;
            }
        };
        self.selection
            .choose_registry(&registry.name, &registry.resource_group, &registry.login_server);

        let mut children = Vec::with_capacity(repositories.len() + 1);
        for repository in repositories {
            let label = self.repository_label(&registry.name, &repository).await;
            children.push(Node::new(NodeKind::Repository(repository), label));
        }
        children.push(Node::new(NodeKind::RepositoryCustom, "Create new repository"));
        self.replace_children(path, children);
        self.status = "Select a repository and press Enter to expand.".to_owned();
    }

    async fn load_repositories(&self, registry: &str) -> Result<Vec<String>, ToolError> {
        self.gateway.login_to_registry(registry).await?;
        self.gateway.list_repositories(registry).await
    }

    /// `"<repo> - <highest version>"`. A failed lookup only costs the label.
    async fn repository_label(&self, registry: &str, repository: &str) -> String {
        let suffix = match self.gateway.list_tags(registry, repository).await {
            Ok(tags) if tags.is_empty() => "no-tags".to_owned(),
            Ok(tags) => match max_semantic_version(&tags) {
                Some(version) => version.to_string(),
                None => "no-semver".to_owned(),
            },
            Err(e) => {
                tracing::warn!(repository, error = %e.message(), "tag lookup failed");
                "unknown".to_owned()
            }
        };
        format!("{repository} - {suffix}")
    }

    async fn expand_tags(&mut self, path: &NodePath, repository: Choice) {
        let Some(registry) = self.selection.acr_name.clone() else {
            self.status = "Registry selection missing.".to_owned();
            return;
        };
        self.selection.choose_repository(repository);
        let repository = self.selection.repository.clone().unwrap_or_default();

        let tags = match self.gateway.list_tags(&registry, &repository).await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(%repository, error = %e.message(), "tag lookup failed");
                Vec::new()
            }
        };
        self.populate_tags(path, &tags);
    }

    fn populate_tags(&mut self, path: &NodePath, tags: &[String]) {
        let children = build_tag_options(tags)
            .into_iter()
            .map(|option| {
                if option == CUSTOM_TAG {
                    Node::new(NodeKind::TagCustom, option)
                } else {
                    Node::new(NodeKind::Tag(option.clone()), option)
                }
            })
            .collect();
        self.replace_children(path, children);
        self.status = "Select a tag and press Enter to expand.".to_owned();
    }

    fn expand_dockerfiles(&mut self, path: &NodePath, tag: Choice) {
        self.selection.choose_tag(tag);

        let mut children: Vec<Node> = find_dockerfiles(&self.cwd)
            .into_iter()
            .map(|dockerfile| {
                let label = relative_to(&dockerfile, &self.cwd);
                Node::new(NodeKind::Dockerfile(dockerfile.display().to_string()), label)
            })
            .collect();
        children.push(Node::new(NodeKind::DockerfileCustom, "Custom path"));
        self.replace_children(path, children);
        self.status = "Select a Dockerfile and press Enter to expand.".to_owned();
    }

    fn expand_context(&mut self, path: &NodePath, dockerfile: Choice) {
        self.selection.choose_dockerfile(dockerfile);
        self.replace_children(
            path,
            vec![
                Node::new(NodeKind::ContextCurrentDirectory, "Use current directory"),
                Node::new(NodeKind::ContextCustom, "Custom path"),
            ],
        );
        self.status = "Select a build context and press Enter to expand.".to_owned();
    }

    fn select_context(&mut self, path: &NodePath, context: PathBuf) {
        self.selection.choose_context(context);
        self.replace_children(
            path,
            vec![Node::new(NodeKind::Confirm, "Confirm build and push")],
        );
        self.status = self.summary();
    }

    fn confirm(&mut self) -> Activation {
        let plan = self
            .selection
            .to_plan(self.settings.skip_latest, self.settings.platform.clone());
        match plan {
            Ok(plan) => {
                self.building = true;
                self.status = "Building and pushing...".to_owned();
                Activation::StartBuild(plan)
            }
            Err(e) => {
                self.status = e.to_string();
                Activation::Done
            }
        }
    }

    pub fn build_finished(&mut self, result: Result<(), WorkflowError>) {
        self.building = false;
        self.status = match result {
            Ok(()) => "Build and push completed.".to_owned(),
            Err(e) => format!("Build failed: {e}"),
        };
    }

    pub fn summary(&self) -> String {
        let s = &self.selection;
        let shown = |p: &Option<PathBuf>| p.as_deref().map(Path::display).map(|d| d.to_string());
        format!(
            "Press Enter to confirm build and push. Registry={} Repo={} Tag={} Dockerfile={} Context={} SkipLatest={} Platform={}",
            s.registry_server.as_deref().unwrap_or_default(),
            s.repository.as_deref().unwrap_or_default(),
            s.tag.as_deref().unwrap_or_default(),
            shown(&s.dockerfile_path).unwrap_or_default(),
            shown(&s.build_context).unwrap_or_default(),
            self.settings.skip_latest,
            self.settings.platform.as_deref().unwrap_or("default"),
        )
    }

    // ── Free-text input ──

    fn open_prompt(&mut self, path: &NodePath, placeholder: &'static str) -> Activation {
        if let Some(node) = self.tree.get_mut(path) {
            node.awaiting_input = true;
        }
        self.prompt = Some(Prompt {
            path: path.clone(),
            placeholder,
        });
        self.status = placeholder.to_owned();
        Activation::AwaitingInput
    }

    /// Use `text` as the value of the node that opened the prompt.
    ///
    /// The node turns into a regular choice carrying the value and the
    /// wizard moves on as if it had been listed. Blank input keeps the
    /// prompt open.
    pub fn submit_input(&mut self, text: &str) -> Activation {
        let value = text.trim();
        if value.is_empty() {
            return Activation::AwaitingInput;
        }
        let Some(prompt) = self.prompt.take() else {
            return Activation::Done;
        };
        let path = prompt.path;
        let Some(node) = self.tree.get_mut(&path) else {
            return Activation::Done;
        };

        let value = value.to_owned();
        let custom = node.kind.clone();
        node.awaiting_input = false;
        node.label = value.clone();
        node.kind = match &custom {
            NodeKind::RepositoryCustom => NodeKind::Repository(value.clone()),
            NodeKind::TagCustom => NodeKind::Tag(value.clone()),
            NodeKind::DockerfileCustom => NodeKind::Dockerfile(value.clone()),
            NodeKind::ContextCustom => NodeKind::Context(value.clone()),
            other => other.clone(),
        };

        let choice = Choice::Custom(value.clone());
        match custom {
            NodeKind::RepositoryCustom => {
                self.selection.choose_repository(choice);
                self.populate_tags(&path, &[]);
            }
            NodeKind::TagCustom => self.expand_dockerfiles(&path, choice),
            NodeKind::DockerfileCustom => self.expand_context(&path, choice),
            NodeKind::ContextCustom => self.select_context(&path, PathBuf::from(value)),
            _ => {}
        }
        Activation::Done
    }

    pub fn cancel_input(&mut self) {
        if let Some(prompt) = self.prompt.take()
            && let Some(node) = self.tree.get_mut(&prompt.path)
        {
            node.awaiting_input = false;
        }
        self.status = "Input cancelled.".to_owned();
    }

    // ── Tree helpers ──

    fn replace_children(&mut self, path: &NodePath, children: Vec<Node>) {
        if let Some(node) = self.tree.get_mut(path) {
            node.set_children(children);
        }
    }

    fn set_loading(&mut self, path: &NodePath, loading: bool) {
        if let Some(node) = self.tree.get_mut(path) {
            node.loading = loading;
        }
    }
}

fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
