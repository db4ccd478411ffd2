//! crates/placement_core/src/projects.rs
//!
//! The community project board: publish a project, like it once per actor.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::error::{require, GuidanceError, GuidanceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub github_url: String,
    pub likes: u32,
    pub author: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectBoard {
    projects: Vec<Project>,
    liked_by: HashMap<Uuid, HashSet<String>>,
}

impl ProjectBoard {
    pub fn publish(
        &mut self,
        name: &str,
        description: &str,
        github_url: &str,
        author: &str,
    ) -> GuidanceResult<&Project> {
        require(name, "Project name")?;
        require(description, "Project description")?;
        self.projects.push(Project {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            github_url: github_url.trim().to_string(),
            likes: 0,
            author: author.to_string(),
        });
        Ok(&self.projects[self.projects.len() - 1])
    }

    /// Records a like from `actor`. Returns `false` when the actor already liked it.
    pub fn like(&mut self, project_id: Uuid, actor: &str) -> GuidanceResult<bool> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| {
                GuidanceError::Validation(format!("No project with id {}", project_id))
            })?;
        if !self
            .liked_by
            .entry(project_id)
            .or_default()
            .insert(actor.to_string())
        {
            return Ok(false);
        }
        project.likes += 1;
        Ok(true)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}
