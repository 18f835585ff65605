//! Mirrors a source directory into a project's group tree and sources build
//! phase.

use std::path::{Path, PathBuf};

use structopt::StructOpt;
use walkdir::{DirEntry, WalkDir};
use xcodeproj_sync_project::{records, Isa, ObjectId, Project};

mod error;
pub(crate) use self::error::{Error, Result};

#[derive(Debug, StructOpt)]
pub(crate) struct Opt {
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "ETPattern",
        help = "directory to scan for source files"
    )]
    source_dir: PathBuf,

    #[structopt(
        short,
        long,
        default_value = "ETPattern",
        help = "name or path of the group under the main group that mirrors the source directory"
    )]
    group: String,

    #[structopt(
        short,
        long,
        default_value = "swift",
        help = "extension of the files to add"
    )]
    extension: String,

    #[structopt(
        long,
        default_value = "sourcecode.swift",
        help = "lastKnownFileType to give new file references"
    )]
    file_type: String,

    #[structopt(
        short = "n",
        long,
        help = "report what would be added without writing the project file"
    )]
    dry_run: bool,
}

/// What [`synchronize`] needs to know beyond the directory and the project.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub anchor: String,
    pub target: String,
    pub extension: String,
    pub file_type: String,
}

impl Settings {
    fn from_opt(opt: &Opt, target: &str) -> Self {
        Self {
            anchor: opt.group.clone(),
            target: String::from(target),
            extension: opt.extension.clone(),
            file_type: opt.file_type.clone(),
        }
    }

    fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&format!(".{}", self.extension))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Summary {
    pub groups_added: usize,
    pub files_added: usize,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.groups_added == 0 && self.files_added == 0
    }
}

/// Loads the project, synchronises it with the source directory, and writes
/// it back if anything changed.
///
/// Any error is returned before the project file is touched. A missing or
/// unreadable source directory is not an error: nothing is added and the
/// file is left alone.
pub(crate) fn run(project_path: &Path, target: &str, opt: &Opt) -> anyhow::Result<Summary> {
    log::info!("loading {}", project_path.display());
    let mut project = Project::open(project_path)?;

    let settings = Settings::from_opt(opt, target);
    let summary = synchronize(&mut project, &opt.source_dir, &settings)?;
    println!("Total files added: {}", summary.files_added);

    if opt.dry_run {
        log::info!("dry run; not saving {}", project_path.display());
    } else if summary.is_empty() {
        log::info!("nothing to add; {} left untouched", project_path.display());
    } else {
        project.save(project_path)?;
        log::info!("saved {}", project_path.display());
    }

    Ok(summary)
}

/// Ensures every matching file under `source_dir` has a file reference in the
/// group mirroring its directory, and a build file in the target's sources
/// build phase.
///
/// Both preconditions are checked before the first record is added, so an
/// error from them leaves `project` as it was.
pub(crate) fn synchronize(
    project: &mut Project,
    source_dir: &Path,
    settings: &Settings,
) -> Result<Summary> {
    let anchor = find_anchor_group(project, &settings.anchor)?;
    log::info!("found {} group: {}", &settings.anchor, anchor);

    let build_phase = find_sources_build_phase(project, &settings.target)?;
    log::info!("found sources build phase: {}", build_phase);

    let mut summary = Summary::default();

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        // An unreadable entry, the source directory itself included, is
        // reported and skipped.
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        let relative = entry.path().strip_prefix(source_dir)?;

        if entry.file_type().is_dir() {
            let components = match path_components(relative) {
                Some(components) => components,
                None => {
                    log::warn!("skipping non UTF-8 directory {}", entry.path().display());
                    continue;
                }
            };
            resolve_group(project, &anchor, &components, &mut summary)?;
        } else if is_file(&entry) {
            let file_name = match entry.file_name().to_str() {
                Some(file_name) => file_name,
                None => {
                    log::warn!("skipping non UTF-8 file {}", entry.path().display());
                    continue;
                }
            };
            if !settings.matches(file_name) {
                continue;
            }

            let components = match relative.parent().and_then(path_components) {
                Some(components) => components,
                None => {
                    log::warn!(
                        "skipping file in non UTF-8 directory {}",
                        entry.path().display()
                    );
                    continue;
                }
            };
            let group = resolve_group(project, &anchor, &components, &mut summary)?;

            if has_file_reference(project, &group, file_name)? {
                log::debug!("skipping {}: already in group {}", file_name, group);
                continue;
            }

            add_file(project, &group, &build_phase, file_name, &settings.file_type)?;
            log::info!("added {} to group {}", file_name, group);
            summary.files_added += 1;
        }
    }

    Ok(summary)
}

/// Regular files, and symlinks that resolve to one. Links to directories are
/// not followed.
fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// The direct child of the main group named or pathed `label`.
fn find_anchor_group(project: &Project, label: &str) -> Result<ObjectId> {
    let main_group = project.main_group()?;
    for child in project.object(&main_group)?.children() {
        if project.object(&child)?.has_label(label) {
            return Ok(child);
        }
    }

    Err(Error::MissingAnchorGroup(String::from(label)))
}

/// The sources build phase of the first target named `target` that has one.
fn find_sources_build_phase(project: &Project, target: &str) -> Result<ObjectId> {
    for target_id in project.targets()? {
        let object = project.object(&target_id)?;
        if object.name() != Some(target) {
            continue;
        }

        for phase in object.references("buildPhases") {
            if project.object(&phase)?.isa() == Isa::SourcesBuildPhase {
                return Ok(phase);
            }
        }
    }

    Err(Error::MissingSourcesBuildPhase(String::from(target)))
}

/// Walks down from `anchor` one path component at a time, creating any group
/// that doesn't exist yet, and returns the group for the last component.
fn resolve_group(
    project: &mut Project,
    anchor: &ObjectId,
    components: &[&str],
    summary: &mut Summary,
) -> Result<ObjectId> {
    let mut current = anchor.clone();

    for component in components {
        current = match find_child_group(project, &current, component)? {
            Some(group) => group,
            None => {
                let group = project.add_object(records::group(component));
                project.append_reference(&current, "children", &group)?;
                log::info!("created group '{}': {}", component, group);
                summary.groups_added += 1;
                group
            }
        };
    }

    Ok(current)
}

/// Only groups count: a folder reference with the same path is not a place we
/// can put files.
fn find_child_group(
    project: &Project,
    parent: &ObjectId,
    name: &str,
) -> Result<Option<ObjectId>> {
    for child in project.object(parent)?.children() {
        let object = project.object(&child)?;
        if object.is_group() && object.has_label(name) {
            return Ok(Some(child));
        }
    }

    Ok(None)
}

fn has_file_reference(project: &Project, group: &ObjectId, file_name: &str) -> Result<bool> {
    for child in project.object(group)?.children() {
        let object = project.object(&child)?;
        if object.isa() == Isa::FileReference && object.path() == Some(file_name) {
            return Ok(true);
        }
    }

    Ok(false)
}

fn add_file(
    project: &mut Project,
    group: &ObjectId,
    build_phase: &ObjectId,
    file_name: &str,
    file_type: &str,
) -> Result<()> {
    let file_ref = project.add_object(records::file_reference(file_name, file_type));
    project.append_reference(group, "children", &file_ref)?;

    let build_file = project.add_object(records::build_file(&file_ref));
    project.append_reference(build_phase, "files", &build_file)?;

    Ok(())
}

/// Splits a relative path into its components, or returns `None` if any of
/// them isn't valid UTF-8.
fn path_components(path: &Path) -> Option<Vec<&str>> {
    path.components()
        .map(|component| component.as_os_str().to_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const FIXTURE: &str = include_str!("../../pbxproj/src/fixtures/project.pbxproj");

    const ANCHOR: &str = "A40000000000000000000002";
    const SOURCES_PHASE: &str = "A60000000000000000000001";

    fn settings() -> Settings {
        Settings {
            anchor: String::from("ETPattern"),
            target: String::from("ETPattern"),
            extension: String::from("swift"),
            file_type: String::from("sourcecode.swift"),
        }
    }

    fn source_tree(files: &[&str]) -> anyhow::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "")?;
        }
        Ok(dir)
    }

    fn sources_count(project: &Project) -> anyhow::Result<usize> {
        Ok(project
            .object(&ObjectId::from(SOURCES_PHASE))?
            .references("files")
            .len())
    }

    /// Follows `components` down from the anchor group, groups only.
    fn group_at(project: &Project, components: &[&str]) -> anyhow::Result<Option<ObjectId>> {
        let mut current = ObjectId::from(ANCHOR);
        for component in components {
            let matches: Vec<ObjectId> = project
                .object(&current)?
                .children()
                .into_iter()
                .filter(|child| {
                    project
                        .get(child)
                        .map(|o| o.is_group() && o.has_label(component))
                        .unwrap_or(false)
                })
                .collect();
            match matches.as_slice() {
                [] => return Ok(None),
                [only] => current = only.clone(),
                _ => anyhow::bail!("more than one group for {}", component),
            }
        }
        Ok(Some(current))
    }

    fn file_ref_in(
        project: &Project,
        group: &ObjectId,
        file_name: &str,
    ) -> anyhow::Result<Vec<ObjectId>> {
        Ok(project
            .object(group)?
            .children()
            .into_iter()
            .filter(|child| {
                project
                    .get(child)
                    .map(|o| o.isa() == Isa::FileReference && o.path() == Some(file_name))
                    .unwrap_or(false)
            })
            .collect())
    }

    fn build_file_for(project: &Project, file_ref: &ObjectId) -> anyhow::Result<usize> {
        Ok(project
            .object(&ObjectId::from(SOURCES_PHASE))?
            .references("files")
            .into_iter()
            .filter(|id| {
                project
                    .get(id)
                    .and_then(|o| o.string("fileRef"))
                    == Some(file_ref.as_str())
            })
            .count())
    }

    #[test]
    fn test_empty_tree() -> anyhow::Result<()> {
        let dir = source_tree(&[])?;
        let mut project = Project::parse(FIXTURE)?;
        let before = project.to_value();

        let summary = synchronize(&mut project, dir.path(), &settings())?;

        assert_eq!(summary, Summary::default());
        assert!(summary.is_empty());
        assert_eq!(project.to_value(), before);

        Ok(())
    }

    #[test]
    fn test_existing_files_are_skipped() -> anyhow::Result<()> {
        let dir = source_tree(&["ContentView.swift", "ETPatternApp.swift"])?;
        let mut project = Project::parse(FIXTURE)?;

        let summary = synchronize(&mut project, dir.path(), &settings())?;

        assert_eq!(summary.files_added, 0);
        assert_eq!(project.len(), 13);
        assert_eq!(sources_count(&project)?, 2);

        Ok(())
    }

    #[test]
    fn test_new_nested_directory() -> anyhow::Result<()> {
        let dir = source_tree(&["Models/Study/Card.swift", "Models/README.md"])?;
        let mut project = Project::parse(FIXTURE)?;

        let summary = synchronize(&mut project, dir.path(), &settings())?;

        assert_eq!(
            summary,
            Summary {
                groups_added: 2,
                files_added: 1
            }
        );
        // Two groups, one file reference, one build file.
        assert_eq!(project.len(), 13 + 4);
        assert_eq!(sources_count(&project)?, 3);

        let models = group_at(&project, &["Models"])?.unwrap();
        assert_eq!(project.object(&models)?.path(), Some("Models"));
        assert_eq!(project.object(&models)?.children().len(), 1);

        let study = group_at(&project, &["Models", "Study"])?.unwrap();
        let card = file_ref_in(&project, &study, "Card.swift")?;
        assert_eq!(card.len(), 1);
        assert_eq!(build_file_for(&project, &card[0])?, 1);

        let card = project.object(&card[0])?;
        assert_eq!(card.string("lastKnownFileType"), Some("sourcecode.swift"));
        assert_eq!(card.string("sourceTree"), Some("<group>"));

        Ok(())
    }

    #[test]
    fn test_idempotent() -> anyhow::Result<()> {
        let dir = source_tree(&[
            "ContentView.swift",
            "Views/CardView.swift",
            "Views/Components/Button.swift",
            "Services/Empty/.keep",
            "Services/CardService.swift",
        ])?;
        let mut project = Project::parse(FIXTURE)?;

        let first = synchronize(&mut project, dir.path(), &settings())?;
        assert_eq!(first.files_added, 3);
        assert_eq!(first.groups_added, 4);
        let count = project.len();
        let after_first = project.to_value();

        let second = synchronize(&mut project, dir.path(), &settings())?;
        assert!(second.is_empty());
        assert_eq!(project.len(), count);
        assert_eq!(project.to_value(), after_first);

        // Every directory has exactly one group, every file one reference and
        // one build file.
        for components in &[
            &["Views"][..],
            &["Views", "Components"][..],
            &["Services"][..],
            &["Services", "Empty"][..],
        ] {
            assert!(
                group_at(&project, components)?.is_some(),
                "no group for {:?}",
                components
            );
        }
        for (components, file) in &[
            (&["Views"][..], "CardView.swift"),
            (&["Views", "Components"][..], "Button.swift"),
            (&["Services"][..], "CardService.swift"),
        ] {
            let group = group_at(&project, components)?.unwrap();
            let refs = file_ref_in(&project, &group, file)?;
            assert_eq!(refs.len(), 1);
            assert_eq!(build_file_for(&project, &refs[0])?, 1);
        }

        Ok(())
    }

    #[test]
    fn test_existing_group_is_reused() -> anyhow::Result<()> {
        // A group that only carries a name, and a folder reference whose path
        // collides with a directory name.
        let fixture = FIXTURE
            .replace(
                "A20000000000000000000004 /* Assets.xcassets */,",
                "A20000000000000000000004 /* Assets.xcassets */,\n\t\t\t\tB00000000000000000000001,\n\t\t\t\tB00000000000000000000002,",
            )
            .replace(
                "/* End PBXGroup section */",
                "\t\tB00000000000000000000001 = {isa = PBXGroup; children = (); name = Helpers; sourceTree = \"<group>\"; };\n/* End PBXGroup section */",
            )
            .replace(
                "/* End PBXFileReference section */",
                "\t\tB00000000000000000000002 = {isa = PBXFileReference; lastKnownFileType = folder; path = Resources; sourceTree = \"<group>\"; };\n/* End PBXFileReference section */",
            );
        let dir = source_tree(&["Helpers/Date.swift", "Resources/Strings.swift"])?;
        let mut project = Project::parse(&fixture)?;

        let summary = synchronize(&mut project, dir.path(), &settings())?;

        assert_eq!(summary.groups_added, 1);
        assert_eq!(summary.files_added, 2);

        let helpers = ObjectId::from("B00000000000000000000001");
        assert_eq!(group_at(&project, &["Helpers"])?, Some(helpers.clone()));
        assert_eq!(file_ref_in(&project, &helpers, "Date.swift")?.len(), 1);

        let resources = group_at(&project, &["Resources"])?.unwrap();
        assert_ne!(resources, ObjectId::from("B00000000000000000000002"));
        assert_eq!(file_ref_in(&project, &resources, "Strings.swift")?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_missing_anchor_group() -> anyhow::Result<()> {
        let dir = source_tree(&["New.swift"])?;
        let mut project = Project::parse(FIXTURE)?;
        let before = project.to_value();

        let mut elsewhere = settings();
        elsewhere.anchor = String::from("Elsewhere");
        assert!(matches!(
            synchronize(&mut project, dir.path(), &elsewhere),
            Err(Error::MissingAnchorGroup(label)) if label == "Elsewhere"
        ));
        assert_eq!(project.to_value(), before);

        Ok(())
    }

    #[test]
    fn test_missing_sources_build_phase() -> anyhow::Result<()> {
        let dir = source_tree(&["New.swift"])?;

        let mut tests_target = settings();
        tests_target.target = String::from("ETPatternTests");
        let mut project = Project::parse(FIXTURE)?;
        assert!(matches!(
            synchronize(&mut project, dir.path(), &tests_target),
            Err(Error::MissingSourcesBuildPhase(_))
        ));

        let fixture = FIXTURE.replace(
            "\t\t\t\tA60000000000000000000001 /* Sources */,\n",
            "",
        );
        let mut project = Project::parse(&fixture)?;
        let before = project.to_value();
        assert!(matches!(
            synchronize(&mut project, dir.path(), &settings()),
            Err(Error::MissingSourcesBuildPhase(_))
        ));
        assert_eq!(project.to_value(), before);

        Ok(())
    }

    #[test]
    fn test_same_file_name_in_two_directories() -> anyhow::Result<()> {
        let dir = source_tree(&["A/Util.swift", "B/Util.swift"])?;
        let mut project = Project::parse(FIXTURE)?;

        let summary = synchronize(&mut project, dir.path(), &settings())?;

        assert_eq!(
            summary,
            Summary {
                groups_added: 2,
                files_added: 2
            }
        );
        assert_eq!(sources_count(&project)?, 4);

        let a = file_ref_in(&project, &group_at(&project, &["A"])?.unwrap(), "Util.swift")?;
        let b = file_ref_in(&project, &group_at(&project, &["B"])?.unwrap(), "Util.swift")?;
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_ne!(a[0], b[0]);
        assert_eq!(build_file_for(&project, &a[0])?, 1);
        assert_eq!(build_file_for(&project, &b[0])?, 1);

        Ok(())
    }

    #[test]
    fn test_missing_source_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut project = Project::parse(FIXTURE)?;
        let before = project.to_value();

        let summary = synchronize(&mut project, &dir.path().join("Nope"), &settings())?;

        assert!(summary.is_empty());
        assert_eq!(project.to_value(), before);

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file() -> anyhow::Result<()> {
        use std::os::unix::fs::symlink;

        let outside = source_tree(&["Real.swift", "Shared/Hidden.swift"])?;
        let dir = source_tree(&["Views/CardView.swift"])?;
        symlink(outside.path().join("Real.swift"), dir.path().join("Linked.swift"))?;
        symlink(outside.path().join("Shared"), dir.path().join("Shared"))?;
        symlink(dir.path().join("Gone.swift"), dir.path().join("Dangling.swift"))?;

        let mut project = Project::parse(FIXTURE)?;
        let summary = synchronize(&mut project, dir.path(), &settings())?;

        // The linked file is added under its own name; the linked directory
        // and the dangling link are not.
        assert_eq!(
            summary,
            Summary {
                groups_added: 1,
                files_added: 2
            }
        );
        let anchor = ObjectId::from(ANCHOR);
        assert_eq!(file_ref_in(&project, &anchor, "Linked.swift")?.len(), 1);
        assert_eq!(file_ref_in(&project, &anchor, "Dangling.swift")?.len(), 0);
        assert_eq!(group_at(&project, &["Shared"])?, None);

        Ok(())
    }

    fn opt(source_dir: &Path, group: &str, dry_run: bool) -> Opt {
        Opt {
            source_dir: source_dir.to_path_buf(),
            group: String::from(group),
            extension: String::from("swift"),
            file_type: String::from("sourcecode.swift"),
            dry_run,
        }
    }

    #[test]
    fn test_run_writes_project() -> anyhow::Result<()> {
        let dir = source_tree(&["Views/CardView.swift"])?;
        let project_dir = tempfile::tempdir()?;
        let path = project_dir.path().join("project.pbxproj");
        fs::write(&path, FIXTURE)?;

        let summary = run(&path, "ETPattern", &opt(dir.path(), "ETPattern", false))?;
        assert_eq!(summary.files_added, 1);

        let project = Project::open(&path)?;
        assert_eq!(project.len(), 13 + 3);
        let views = group_at(&project, &["Views"])?.unwrap();
        assert_eq!(file_ref_in(&project, &views, "CardView.swift")?.len(), 1);

        // A second run finds nothing to do and leaves the file alone.
        let written = fs::read(&path)?;
        let summary = run(&path, "ETPattern", &opt(dir.path(), "ETPattern", false))?;
        assert!(summary.is_empty());
        assert_eq!(fs::read(&path)?, written);

        Ok(())
    }

    #[test]
    fn test_run_leaves_file_untouched() -> anyhow::Result<()> {
        let dir = source_tree(&["Views/CardView.swift"])?;
        let project_dir = tempfile::tempdir()?;
        let path = project_dir.path().join("project.pbxproj");
        fs::write(&path, FIXTURE)?;

        // Missing anchor group.
        assert!(run(&path, "ETPattern", &opt(dir.path(), "Elsewhere", false)).is_err());
        assert_eq!(fs::read_to_string(&path)?, FIXTURE);

        // Missing target.
        assert!(run(&path, "Nope", &opt(dir.path(), "ETPattern", false)).is_err());
        assert_eq!(fs::read_to_string(&path)?, FIXTURE);

        // Dry run.
        let summary = run(&path, "ETPattern", &opt(dir.path(), "ETPattern", true))?;
        assert_eq!(summary.files_added, 1);
        assert_eq!(fs::read_to_string(&path)?, FIXTURE);

        // Missing source directory.
        let missing = dir.path().join("Nope");
        let summary = run(&path, "ETPattern", &opt(&missing, "ETPattern", false))?;
        assert!(summary.is_empty());
        assert_eq!(fs::read_to_string(&path)?, FIXTURE);

        Ok(())
    }

    #[test]
    fn test_path_components() {
        assert_eq!(path_components(Path::new("")), Some(vec![]));
        assert_eq!(
            path_components(Path::new("Models/Study")),
            Some(vec!["Models", "Study"])
        );
    }
}
