//! Pull-request title, body and commit message generation

use crate::domain::ReportedDependency;

/// Shown when a dependency carries no version
const UNKNOWN_VERSION: &str = "unknown";

/// Generated text for one change proposal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestText {
    pub title: String,
    pub body: String,
    pub commit_message: String,
}

/// Describe the updates made in `directory`
///
/// A single update is titled after the dependency itself; anything else is
/// titled after the directory and listed line by line in the body.
pub fn describe(directory: &str, updated: &[ReportedDependency]) -> PullRequestText {
    let lines: Vec<String> = updated.iter().map(change_line).collect();

    let (title, body) = match lines.as_slice() {
        [line] => (format!("Bump {}", line), format!("Bumps {}.", line)),
        _ => {
            let mut body = format!("Bumps the dependencies in {}:\n", directory);
            for line in &lines {
                body.push_str("\n- ");
                body.push_str(line);
            }
            (format!("Bump the dependencies in {}", directory), body)
        }
    };

    let commit_message = format!("{}\n\n{}", title, body);
    PullRequestText {
        title,
        body,
        commit_message,
    }
}

/// `NAME from A to B`
fn change_line(dependency: &ReportedDependency) -> String {
    format!(
        "{} from {} to {}",
        dependency.name,
        dependency
            .previous_version
            .as_deref()
            .unwrap_or(UNKNOWN_VERSION),
        dependency.version.as_deref().unwrap_or(UNKNOWN_VERSION),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(name: &str, from: &str, to: &str) -> ReportedDependency {
        ReportedDependency {
            name: name.to_string(),
            version: Some(to.to_string()),
            requirements: Vec::new(),
            previous_version: Some(from.to_string()),
            previous_requirements: None,
        }
    }

    #[test]
    fn test_single_dependency() {
        let text = describe("/src", &[bump("Some.Package", "1.0.0", "2.0.0")]);
        assert_eq!(text.title, "Bump Some.Package from 1.0.0 to 2.0.0");
        assert_eq!(text.body, "Bumps Some.Package from 1.0.0 to 2.0.0.");
        assert!(text
            .commit_message
            .starts_with("Bump Some.Package from 1.0.0 to 2.0.0\n\n"));
    }

    #[test]
    fn test_several_dependencies() {
        let text = describe(
            "/src",
            &[
                bump("Some.Package", "1.0.0", "2.0.0"),
                bump("Other.Package", "3.1.0", "3.2.0"),
            ],
        );
        assert_eq!(text.title, "Bump the dependencies in /src");
        assert!(text.body.contains("\n- Some.Package from 1.0.0 to 2.0.0"));
        assert!(text.body.contains("\n- Other.Package from 3.1.0 to 3.2.0"));
        assert!(text.commit_message.ends_with(&text.body));
    }

    #[test]
    fn test_no_dependencies() {
        let text = describe("/", &[]);
        assert_eq!(text.title, "Bump the dependencies in /");
        assert_eq!(text.body, "Bumps the dependencies in /:\n");
    }

    #[test]
    fn test_missing_previous_version() {
        let mut dependency = bump("Some.Package", "1.0.0", "2.0.0");
        dependency.previous_version = None;
        let text = describe("/", &[dependency]);
        assert_eq!(text.title, "Bump Some.Package from unknown to 2.0.0");
    }
}
