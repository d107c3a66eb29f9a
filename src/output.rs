//! Writing problem and scenario documents.
//!
//! Both documents are rendered before anything touches the disk, and both
//! are staged to temp paths before either is renamed into place, so a failed
//! run leaves no partial YAML behind.

use crate::models::{ConvertError, ProblemDocument, Result, ScenarioDocument};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which document a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Problem,
    Scenario,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Problem => "problem",
            DocumentKind::Scenario => "scenario",
        }
    }
}

/// Paths of one written problem/scenario pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPair {
    pub problem_path: PathBuf,
    pub scenario_path: PathBuf,
}

/// Writes documents into a single output directory.
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Create the writer, creating the directory if needed.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            ConvertError::io(format!("creating output dir {}", dir.display()), e)
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<stem>.yaml` and `<stem>-scenario.yaml`.
    pub fn paths_for(&self, stem: &str) -> WrittenPair {
        WrittenPair {
            problem_path: self.dir.join(format!("{stem}.yaml")),
            scenario_path: self.dir.join(format!("{stem}-scenario.yaml")),
        }
    }

    /// Render and write both documents.
    ///
    /// Both temp files are staged before either is renamed, and a failure
    /// after the problem file lands removes it again, so the pair appears
    /// together or not at all.
    pub fn write_pair(
        &self,
        stem: &str,
        problem: &ProblemDocument,
        scenario: &ScenarioDocument,
    ) -> Result<WrittenPair> {
        let problem_yaml = problem.to_yaml()?;
        let scenario_yaml = scenario.to_yaml()?;

        let paths = self.paths_for(stem);
        let problem_temp = self.stage(&paths.problem_path, &problem_yaml)?;
        let scenario_temp = match self.stage(&paths.scenario_path, &scenario_yaml) {
            Ok(temp) => temp,
            Err(e) => {
                discard(&problem_temp);
                return Err(e);
            }
        };

        if let Err(e) = commit(&problem_temp, &paths.problem_path) {
            discard(&problem_temp);
            discard(&scenario_temp);
            return Err(e);
        }
        if let Err(e) = commit(&scenario_temp, &paths.scenario_path) {
            discard(&scenario_temp);
            discard(&paths.problem_path);
            return Err(e);
        }

        debug!(
            problem = %paths.problem_path.display(),
            scenario = %paths.scenario_path.display(),
            bytes = problem_yaml.len() + scenario_yaml.len(),
            "Documents written"
        );
        Ok(paths)
    }

    fn temp_path_for(&self, path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir.join(format!(".{file_name}.tmp"))
    }

    /// Write `content` to the temp path for `path`, removing it on failure.
    fn stage(&self, path: &Path, content: &str) -> Result<PathBuf> {
        let temp_path = self.temp_path_for(path);

        let file = File::create(&temp_path)
            .map_err(|e| ConvertError::io(format!("creating {}", temp_path.display()), e))?;
        let mut writer = BufWriter::new(file);
        let written = writer.write_all(content.as_bytes()).and_then(|_| writer.flush());
        drop(writer);
        if let Err(e) = written {
            discard(&temp_path);
            return Err(ConvertError::io(format!("writing {}", temp_path.display()), e));
        }
        Ok(temp_path)
    }
}

fn commit(temp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(temp_path, path)
        .map_err(|e| ConvertError::io(format!("renaming into {}", path.display()), e))
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "Cleanup failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, PdcopProblem, ProblemOutline};
    use tempfile::TempDir;

    #[test]
    fn test_creates_nested_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("yaml-files");
        let writer = OutputWriter::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.dir(), dir.as_path());
    }

    #[test]
    fn test_write_pair() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path()).unwrap();

        let problem = ProblemDocument::from_pdcop("empty", &PdcopProblem::default());
        let scenario = ScenarioDocument::new(vec![Event::wait("w0", 1)]).with_origin("x.dzn");
        let paths = writer.write_pair("x.dzn", &problem, &scenario).unwrap();

        assert_eq!(paths.problem_path, temp_dir.path().join("x.dzn.yaml"));
        assert_eq!(
            paths.scenario_path,
            temp_dir.path().join("x.dzn-scenario.yaml")
        );

        let outline =
            ProblemOutline::from_yaml(&fs::read_to_string(&paths.problem_path).unwrap()).unwrap();
        assert_eq!(outline.name, "empty");

        let back =
            ScenarioDocument::from_yaml(&fs::read_to_string(&paths.scenario_path).unwrap()).unwrap();
        assert_eq!(back, scenario);

        // No temp files left behind
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_scenario_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path()).unwrap();
        // A directory squatting on the scenario temp path makes staging fail
        fs::create_dir(temp_dir.path().join(".x.dzn-scenario.yaml.tmp")).unwrap();

        let problem = ProblemDocument::from_pdcop("empty", &PdcopProblem::default());
        let scenario = ScenarioDocument::new(vec![Event::wait("w0", 1)]);
        let err = writer.write_pair("x.dzn", &problem, &scenario).unwrap_err();

        assert!(matches!(err, ConvertError::Io { .. }));
        assert!(!temp_dir.path().join("x.dzn.yaml").exists());
        assert!(!temp_dir.path().join(".x.dzn.yaml.tmp").exists());
        assert!(!temp_dir.path().join("x.dzn-scenario.yaml").exists());
    }

    #[test]
    fn test_failed_rename_removes_problem() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path()).unwrap();
        // A non-empty directory at the scenario path makes its rename fail
        let squatter = temp_dir.path().join("x.dzn-scenario.yaml");
        fs::create_dir(&squatter).unwrap();
        fs::write(squatter.join("keep"), "x").unwrap();

        let problem = ProblemDocument::from_pdcop("empty", &PdcopProblem::default());
        let scenario = ScenarioDocument::new(vec![Event::wait("w0", 1)]);
        assert!(writer.write_pair("x.dzn", &problem, &scenario).is_err());

        assert!(!temp_dir.path().join("x.dzn.yaml").exists());
        assert!(!temp_dir.path().join(".x.dzn.yaml.tmp").exists());
        assert!(!temp_dir.path().join(".x.dzn-scenario.yaml.tmp").exists());
    }

    #[test]
    fn test_unwritable_dir() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "not a dir").unwrap();
        let err = OutputWriter::new(&blocker.join("out")).err().unwrap();
        assert!(matches!(err, ConvertError::Io { .. }));
    }
}
