use rand::{rngs::StdRng, SeedableRng};
use tempfile::TempDir;

use xuci_trainer::bank::QuestionBank;
use xuci_trainer::seeds::seed_category_catalog;
use xuci_trainer::session::PracticeSession;
use xuci_trainer::store::{FileStore, SessionStore, STORAGE_KEY};

fn answer_correctly(s: &mut PracticeSession) {
  let keys = s.current_question().unwrap().answer.clone();
  for k in &keys {
    s.select_option(k);
  }
  s.submit().unwrap();
}

#[test]
fn file_store_survives_restart() {
  let dir = TempDir::new().expect("failed to create temp dir");
  let path = dir.path().join("nested").join("session.json");

  let mut first = PracticeSession::new(QuestionBank::load(None), Box::new(FileStore::new(&path)), 30)
    .with_rng(StdRng::seed_from_u64(11));
  first.start();
  for _ in 0..5 {
    answer_correctly(&mut first);
    first.advance();
  }
  let level = first.engine().current_level();
  let answered = first.engine().state().answered_ids.clone();

  let raw = std::fs::read_to_string(&path).unwrap();
  let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
  assert!(v[STORAGE_KEY]["engineState"]["fixedQuestionsCompleted"].is_boolean());
  assert_eq!(v[STORAGE_KEY]["session"]["records"].as_array().unwrap().len(), 5);

  let mut second = PracticeSession::new(QuestionBank::load(None), Box::new(FileStore::new(&path)), 30)
    .with_rng(StdRng::seed_from_u64(12));
  assert_eq!(second.stored_progress(), Some(5));
  assert!(second.resume());
  assert_eq!(second.engine().current_level(), level);
  assert_eq!(second.engine().state().answered_ids, answered);
  assert!(!answered.contains(&second.current_question().unwrap().id));

  second.finish(&seed_category_catalog());
  assert!(FileStore::new(&path).load().unwrap().is_none());
}

#[test]
fn other_keys_in_the_file_are_preserved() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("storage.json");
  std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

  let mut s = PracticeSession::new(QuestionBank::load(None), Box::new(FileStore::new(&path)), 30);
  s.start();
  answer_correctly(&mut s);
  s.reset();

  let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  assert_eq!(v["theme"], "dark");
  assert!(v.get(STORAGE_KEY).is_none());
}

#[test]
fn corrupt_file_starts_fresh() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("session.json");
  std::fs::write(&path, "{{{ not json").unwrap();

  let mut s = PracticeSession::new(QuestionBank::load(None), Box::new(FileStore::new(&path)), 30);
  assert_eq!(s.stored_progress(), None);
  assert!(!s.resume());
  assert!(s.start().is_some());
  answer_correctly(&mut s);

  // The corrupt file was replaced by a valid one on the first save.
  assert_eq!(FileStore::new(&path).load().unwrap().unwrap().session.records.len(), 1);
}
