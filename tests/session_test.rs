//! End-to-end tests of the session pipeline against a real repository.

mod common;

use common::TestRepo;
use semlog::changelog::{PREAMBLE, Stager};
use semlog::git::{GitStager, fetch_raw_commits, list_tags, resolve_range};
use semlog::{BuildQuality, Config, PreconditionError, Session, SessionError};

fn session_for(test_repo: &TestRepo, config: Config) -> Session {
    let mut session = Session::new(config).expect("Default config must be valid");
    let range = resolve_range(&test_repo.repo, None, None).unwrap();
    let commits = fetch_raw_commits(&test_repo.repo, &range).unwrap();
    let tags = list_tags(&test_repo.repo).unwrap();
    session.build_history(range.boundaries(), commits, tags);
    session
}

#[test]
fn test_pipeline_recommends_and_renders() {
    let test_repo = TestRepo::new();
    let c1 = test_repo.commit("feat: initial release");
    test_repo.tag_annotated("v1.0.0", c1, "Release 1.0.0");
    test_repo.commit("fix(cli): handle missing args");
    test_repo.commit("chore: update deps");

    let mut config = Config::default();
    config.recommend.build_quality = BuildQuality::Beta;
    config.recommend.build_id = Some("99".to_string());
    let session = session_for(&test_repo, config);

    let history = session.history().unwrap();
    assert_eq!(history.unreleased().len(), 2);

    let rec = session.recommend_version().unwrap();
    assert_eq!(rec.current_release.to_string(), "1.0.0");
    assert_eq!(rec.recommended_release.to_string(), "1.0.1-beta-99");

    let doc = session.render_changelog().unwrap();
    assert!(doc.contains("## [Unreleased]"));
    assert!(doc.contains("- **cli:** handle missing args"));
    assert!(doc.contains("## [1.0.0]"));
    assert!(!doc.contains("update deps"));
}

#[test]
fn test_write_changelog_and_stage() {
    let test_repo = TestRepo::new();
    test_repo.commit("feat: first feature");
    let session = session_for(&test_repo, Config::default());

    let path = test_repo.dir.path().join("CHANGELOG.md");
    let stager = GitStager::new(&test_repo.repo);
    session
        .write_changelog(&path, Some(&stager as &dyn Stager))
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(PREAMBLE));
    assert!(content.contains("- first feature"));

    let index = test_repo.repo.index().unwrap();
    assert!(index.get_path(std::path::Path::new("CHANGELOG.md"), 0).is_some());

    // A second run leaves the file unchanged
    session.write_changelog(&path, None).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_operations_before_build_are_precondition_errors() {
    let session = Session::new(Config::default()).unwrap();

    assert!(matches!(
        session.history(),
        Err(PreconditionError::HistoryNotBuilt { .. })
    ));
    assert!(matches!(
        session.recommend_version(),
        Err(SessionError::Precondition(_))
    ));
    let dir = common::temp_test_dir();
    let path = dir.path().join("CHANGELOG.md");
    assert!(matches!(
        session.write_changelog(&path, None),
        Err(SessionError::Precondition(_))
    ));
    assert!(!path.exists());
}

#[test]
fn test_rebuild_replaces_history() {
    let test_repo = TestRepo::new();
    test_repo.commit("feat: one");
    let mut session = session_for(&test_repo, Config::default());
    assert_eq!(session.history().unwrap().commits().len(), 1);

    test_repo.commit("fix: two");
    let range = resolve_range(&test_repo.repo, None, None).unwrap();
    let commits = fetch_raw_commits(&test_repo.repo, &range).unwrap();
    let log = session.build_history(range.boundaries(), commits, Vec::new());
    assert_eq!(log.commits().len(), 2);
    assert_eq!(session.history().unwrap().commits().len(), 2);
}
