//! Entity addressing
//!
//! Typed references into the project → pipeline → (branch) → run → node → step
//! hierarchy. Refs are built fresh for every request from the raw path
//! parameters and are never checked for existence here: the backend is
//! authoritative on whether an identifier exists. Identifiers that are relative
//! path segments (`.` or `..`) can never name an entity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Raw path-parameter mapping as extracted by the transport layer
pub type PathParams = HashMap<String, String>;

/// Path parameter names shared by the router and the addressing scheme
pub mod param {
    pub const PROJECT: &str = "devops";
    pub const PIPELINE: &str = "pipeline";
    pub const BRANCH: &str = "branch";
    pub const RUN: &str = "run";
    pub const NODE: &str = "node";
    pub const STEP: &str = "step";
}

/// True for identifiers that would be collapsed out of a URL path
pub fn is_relative_segment(id: &str) -> bool {
    id == "." || id == ".."
}

fn lookup(params: &PathParams, key: &str) -> String {
    params.get(key).cloned().unwrap_or_default()
}

/// A pipeline, or one branch of a multi-branch pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRef {
    pub project: String,
    pub pipeline: String,
    pub branch: Option<String>,
}

impl PipelineRef {
    pub fn new(project: impl Into<String>, pipeline: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            pipeline: pipeline.into(),
            branch: None,
        }
    }

    /// Scope this ref to a single branch. An empty branch name keeps the trunk.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        self.branch = if branch.is_empty() { None } else { Some(branch) };
        self
    }

    pub fn from_params(params: &PathParams) -> Self {
        Self::new(lookup(params, param::PROJECT), lookup(params, param::PIPELINE))
            .with_branch(lookup(params, param::BRANCH))
    }

    pub fn run(&self, run: impl Into<String>) -> RunRef {
        RunRef {
            pipeline: self.clone(),
            run: run.into(),
        }
    }
}

impl fmt::Display for PipelineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.pipeline)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{}", branch)?;
        }
        Ok(())
    }
}

/// A single execution of a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunRef {
    pub pipeline: PipelineRef,
    pub run: String,
}

impl RunRef {
    pub fn from_params(params: &PathParams) -> Self {
        PipelineRef::from_params(params).run(lookup(params, param::RUN))
    }

    pub fn node(&self, node: impl Into<String>) -> NodeRef {
        NodeRef {
            run: self.clone(),
            node: node.into(),
        }
    }
}

impl fmt::Display for RunRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.pipeline, self.run)
    }
}

/// A stage or parallel branch within a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub run: RunRef,
    pub node: String,
}

impl NodeRef {
    pub fn from_params(params: &PathParams) -> Self {
        RunRef::from_params(params).node(lookup(params, param::NODE))
    }

    pub fn step(&self, step: impl Into<String>) -> StepRef {
        StepRef {
            node: self.clone(),
            step: step.into(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/nodes/{}", self.run, self.node)
    }
}

/// The finest-grained unit of execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepRef {
    pub node: NodeRef,
    pub step: String,
}

impl StepRef {
    pub fn from_params(params: &PathParams) -> Self {
        NodeRef::from_params(params).step(lookup(params, param::STEP))
    }

    pub fn run(&self) -> &RunRef {
        &self.node.run
    }

    pub fn pipeline(&self) -> &PipelineRef {
        &self.node.run.pipeline
    }

    /// Every identifier along the path from project down to this step
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        let pipeline = self.pipeline();
        [
            Some(pipeline.project.as_str()),
            Some(pipeline.pipeline.as_str()),
            pipeline.branch.as_deref(),
            Some(self.run().run.as_str()),
            Some(self.node.node.as_str()),
            Some(self.step.as_str()),
        ]
        .into_iter()
        .flatten()
    }

    /// False when any identifier is a relative path segment
    pub fn is_addressable(&self) -> bool {
        !self.identifiers().any(is_relative_segment)
    }
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/steps/{}", self.node, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> PathParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_step_ref_from_params() {
        let p = params(&[
            ("devops", "proj"),
            ("pipeline", "build"),
            ("run", "7"),
            ("node", "n1"),
            ("step", "s1"),
        ]);

        let step = StepRef::from_params(&p);
        assert_eq!(step.pipeline().project, "proj");
        assert_eq!(step.pipeline().pipeline, "build");
        assert_eq!(step.pipeline().branch, None);
        assert_eq!(step.run().run, "7");
        assert_eq!(step.node.node, "n1");
        assert_eq!(step.step, "s1");
    }

    #[test]
    fn test_branch_param_selects_branch_family() {
        let p = params(&[("devops", "proj"), ("pipeline", "build"), ("branch", "main")]);
        let pipeline = PipelineRef::from_params(&p);
        assert_eq!(pipeline.branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_empty_branch_is_trunk() {
        let p = params(&[("devops", "proj"), ("pipeline", "build"), ("branch", "")]);
        assert_eq!(PipelineRef::from_params(&p).branch, None);
    }

    #[test]
    fn test_missing_params_become_empty() {
        let step = StepRef::from_params(&PathParams::new());
        assert_eq!(step.pipeline().project, "");
        assert_eq!(step.run().run, "");
        assert_eq!(step.node.node, "");
        assert_eq!(step.step, "");
    }

    #[test]
    fn test_display() {
        let step = PipelineRef::new("proj", "build")
            .with_branch("main")
            .run("3")
            .node("n1")
            .step("s1");
        assert_eq!(step.to_string(), "proj/build@main#3/nodes/n1/steps/s1");
    }

    #[test]
    fn test_relative_identifiers_are_not_addressable() {
        let pipeline = PipelineRef::new("proj", "build");
        assert!(pipeline.run("3").node("n1").step("s1").is_addressable());
        assert!(!pipeline.run("3").node("n1").step("..").is_addressable());
        assert!(!pipeline.run(".").node("n1").step("s1").is_addressable());
        assert!(!PipelineRef::new("proj", "..").run("3").node("n1").step("s1").is_addressable());
        assert!(
            !pipeline
                .clone()
                .with_branch("..")
                .run("3")
                .node("n1")
                .step("s1")
                .is_addressable()
        );
        // dots inside a name are ordinary characters
        assert!(pipeline.run("3").node("n.1").step("...").is_addressable());
    }
}
