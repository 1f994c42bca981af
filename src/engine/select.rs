//! Next-question selection: fixed queue, forced category, current level, other level.

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info, instrument, warn};

use super::{AdaptiveEngine, LevelChange};
use crate::domain::{Level, Question};

impl AdaptiveEngine {
  /// Pick the next question using the thread-local RNG.
  pub fn select_next_question<'a>(&mut self, pool: &'a [Question]) -> Option<&'a Question> {
    self.select_next_question_with(pool, &mut rand::thread_rng())
  }

  /// Pick the next question; `None` means the pool is exhausted.
  ///
  /// May mutate state: pops the fixed queue, drops an unsatisfiable forced
  /// category, or switches level when the current one has nothing left.
  #[instrument(level = "debug", skip_all, fields(pool_len = pool.len(), level = %self.state.current_level))]
  pub fn select_next_question_with<'a, R: Rng + ?Sized>(
    &mut self,
    pool: &'a [Question],
    rng: &mut R,
  ) -> Option<&'a Question> {
    if let Some(q) = self.next_fixed(pool) {
      debug!(target: "engine", id = %q.id, "Serving fixed question");
      return Some(q);
    }

    let level = self.state.current_level;

    if level == Level::Basic && self.in_forced_category_mode() {
      let forced = self.state.forced_category.clone().unwrap_or_default();
      let candidates = self.candidates(pool, Level::Basic, Some(&forced));
      if let Some(q) = candidates.choose(rng).copied() {
        debug!(target: "engine", id = %q.id, category = %forced, remaining = self.state.forced_category_remaining, "Serving forced-category question");
        return Some(q);
      }
      warn!(target: "engine", category = %forced, "Forced category has no unanswered Basic questions; dropping it");
      self.state.clear_forced_category();
    }

    let candidates = self.candidates(pool, level, None);
    if let Some(q) = candidates.choose(rng).copied() {
      debug!(target: "engine", id = %q.id, %level, available = candidates.len(), "Serving random question");
      return Some(q);
    }

    let other = level.other();
    let candidates = self.candidates(pool, other, None);
    let q = candidates.choose(rng).copied()?;
    let reason = format!("{}已做完，自动切换", level.display_name());
    info!(target: "engine", from = %level, to = %other, "Current level exhausted; switching");
    self.state.current_level = other;
    self.state.clear_forced_category();
    self.state.level_history.push(LevelChange::now(other, reason));
    Some(q)
  }

  /// Pop the fixed queue until an unanswered question from the pool turns up.
  fn next_fixed<'a>(&mut self, pool: &'a [Question]) -> Option<&'a Question> {
    while !self.state.fixed_questions_completed {
      let Some(id) = self.state.fixed_question_ids.pop_front() else { break };
      if self.state.fixed_question_ids.is_empty() {
        self.state.fixed_questions_completed = true;
      }
      if self.state.is_answered(&id) {
        continue;
      }
      match pool.iter().find(|q| q.id == id) {
        Some(q) => return Some(q),
        None => debug!(target: "engine", %id, "Fixed question not in pool; skipping"),
      }
    }
    self.state.fixed_questions_completed = true;
    None
  }

  fn candidates<'a>(&self, pool: &'a [Question], level: Level, category: Option<&str>) -> Vec<&'a Question> {
    pool
      .iter()
      .filter(|q| !q.fixed && q.level == level && !self.state.is_answered(&q.id))
      .filter(|q| category.map_or(true, |c| q.category == c))
      .collect()
  }
}
