//! Read-only diagnostics about a project's structure.

use std::{collections::HashSet, fmt::Display, path::Path};

use structopt::StructOpt;
use xcodeproj_sync_project::{Error, Isa, ObjectId, Project};

#[derive(Debug, StructOpt)]
pub(crate) struct Opt {
    #[structopt(
        short,
        long,
        default_value = "ContentView.swift",
        help = "file name to look for in the group tree"
    )]
    file: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Report {
    pub main_group: ObjectId,
    pub main_group_children: usize,
    pub target_name: String,
    pub target: Option<TargetReport>,
    pub file_name: String,
    pub containing_group: Option<GroupReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TargetReport {
    pub id: ObjectId,
    pub sources_build_phase: Option<(ObjectId, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupReport {
    pub id: ObjectId,
    pub label: Option<String>,
}

pub(crate) fn run(project_path: &Path, target: &str, opt: &Opt) -> anyhow::Result<Report> {
    log::info!("loading {}", project_path.display());
    let project = Project::open(project_path)?;

    let report = inspect(&project, target, &opt.file)?;
    print!("{}", report);

    Ok(report)
}

pub(crate) fn inspect(project: &Project, target: &str, file_name: &str) -> Result<Report, Error> {
    let main_group = project.main_group()?;
    let main_group_children = project.object(&main_group)?.children().len();

    let target_report = match find_native_target(project, target)? {
        Some(id) => Some(TargetReport {
            sources_build_phase: find_sources_build_phase(project, &id)?,
            id,
        }),
        None => None,
    };

    let mut visited = HashSet::new();
    let containing_group =
        match find_group_with_file(project, &main_group, file_name, &mut visited)? {
            Some(id) => Some(GroupReport {
                label: project.object(&id)?.label().map(String::from),
                id,
            }),
            None => None,
        };

    Ok(Report {
        main_group,
        main_group_children,
        target_name: String::from(target),
        target: target_report,
        file_name: String::from(file_name),
        containing_group,
    })
}

fn find_native_target(project: &Project, name: &str) -> Result<Option<ObjectId>, Error> {
    for id in project.targets()? {
        let target = project.object(&id)?;
        if target.isa() == Isa::NativeTarget && target.name() == Some(name) {
            return Ok(Some(id));
        }
    }

    Ok(None)
}

fn find_sources_build_phase(
    project: &Project,
    target: &ObjectId,
) -> Result<Option<(ObjectId, usize)>, Error> {
    for id in project.object(target)?.references("buildPhases") {
        let phase = project.object(&id)?;
        if phase.isa() == Isa::SourcesBuildPhase {
            let count = phase.references("files").len();
            return Ok(Some((id, count)));
        }
    }

    Ok(None)
}

/// Depth first search for the first group that directly contains a file
/// reference to `file_name`.
fn find_group_with_file(
    project: &Project,
    group: &ObjectId,
    file_name: &str,
    visited: &mut HashSet<ObjectId>,
) -> Result<Option<ObjectId>, Error> {
    if !visited.insert(group.clone()) {
        return Ok(None);
    }

    for child in project.object(group)?.children() {
        let object = project.object(&child)?;
        if object.isa() == Isa::FileReference && object.path() == Some(file_name) {
            return Ok(Some(group.clone()));
        }

        if object.is_group() {
            if let Some(found) = find_group_with_file(project, &child, file_name, visited)? {
                return Ok(Some(found));
            }
        }
    }

    Ok(None)
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Main group: {}", self.main_group)?;
        writeln!(f, "Main group children: {}", self.main_group_children)?;

        match &self.target {
            Some(target) => {
                writeln!(f, "Target '{}': {}", self.target_name, target.id)?;
                match &target.sources_build_phase {
                    Some((id, count)) => {
                        writeln!(f, "Sources build phase: {}", id)?;
                        writeln!(f, "  Count: {}", count)?;
                    }
                    None => writeln!(
                        f,
                        "Target '{}' has no sources build phase",
                        self.target_name
                    )?,
                }
            }
            None => writeln!(f, "No native target named '{}'", self.target_name)?,
        }

        match &self.containing_group {
            Some(group) => {
                writeln!(f, "Group containing {}: {}", self.file_name, group.id)?;
                writeln!(f, "  Path: {}", group.label.as_deref().unwrap_or("N/A"))
            }
            None => writeln!(f, "Could not find a group containing {}", self.file_name),
        }
    }
}
