//! Backend path layout
//!
//! One builder per level of the hierarchy. A branch-scoped ref gets a
//! `branches/{branch}` segment pair right after the pipeline, so every
//! operation has a single implementation for trunk and branch pipelines.

use sluice_core::domain::{NodeRef, PipelineRef, RunRef, StepRef};

pub(crate) fn project(project: &str) -> Vec<String> {
    vec!["projects".to_string(), project.to_string()]
}

/// The pipeline itself, ignoring any branch scope
pub(crate) fn trunk(pipeline: &PipelineRef) -> Vec<String> {
    let mut segments = project(&pipeline.project);
    segments.extend(["pipelines".to_string(), pipeline.pipeline.clone()]);
    segments
}

pub(crate) fn pipeline(pipeline: &PipelineRef) -> Vec<String> {
    let mut segments = trunk(pipeline);
    if let Some(branch) = &pipeline.branch {
        segments.extend(["branches".to_string(), branch.clone()]);
    }
    segments
}

pub(crate) fn run(run: &RunRef) -> Vec<String> {
    let mut segments = pipeline(&run.pipeline);
    segments.extend(["runs".to_string(), run.run.clone()]);
    segments
}

pub(crate) fn node(node: &NodeRef) -> Vec<String> {
    let mut segments = run(&node.run);
    segments.extend(["nodes".to_string(), node.node.clone()]);
    segments
}

pub(crate) fn step(step: &StepRef) -> Vec<String> {
    let mut segments = node(&step.node);
    segments.extend(["steps".to_string(), step.step.clone()]);
    segments
}

pub(crate) fn scm(scm: &str) -> Vec<String> {
    vec!["scms".to_string(), scm.to_string()]
}

/// Append trailing segments to a base path
pub(crate) fn join(mut base: Vec<String>, tail: &[&str]) -> Vec<String> {
    base.extend(tail.iter().map(|s| s.to_string()));
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_step_path() {
        let step = PipelineRef::new("proj", "build").run("4").node("n1").step("s1");
        assert_eq!(
            super::step(&step).join("/"),
            "projects/proj/pipelines/build/runs/4/nodes/n1/steps/s1"
        );
    }

    #[test]
    fn test_branch_inserts_branch_segment() {
        let run = PipelineRef::new("proj", "build").with_branch("main").run("4");
        assert_eq!(
            super::run(&run).join("/"),
            "projects/proj/pipelines/build/branches/main/runs/4"
        );
    }

    #[test]
    fn test_trunk_ignores_branch() {
        let pipeline = PipelineRef::new("proj", "build").with_branch("main");
        assert_eq!(trunk(&pipeline).join("/"), "projects/proj/pipelines/build");
    }
}
