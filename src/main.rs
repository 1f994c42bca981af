//! Xuci Trainer · terminal front end
//!
//! - Adaptive Basic/Advanced question selection
//! - Progress saved after every answer, offered for resume on next launch
//! - End-of-session report with weak points and study suggestions
//!
//! Important env variables:
//!   TRAINER_CONFIG_PATH : TOML config (session settings, extra questions, catalog overrides)
//!   SESSION_PATH        : session store file (default ./.xuci_session.json, ":memory:" disables)
//!   SESSION_LIMIT       : questions per session (default 30)
//!   SHOW_PINYIN         : "1" to print pinyin under each stem
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::io::{self, BufRead, Write};

use tracing::{info, instrument};

use xuci_trainer::bank::QuestionBank;
use xuci_trainer::config::{load_trainer_config_from_env, Settings};
use xuci_trainer::seeds::seed_category_catalog;
use xuci_trainer::session::PracticeSession;
use xuci_trainer::store::{FileStore, MemoryStore, SessionStore};
use xuci_trainer::telemetry;
use xuci_trainer::terminal::{parse_input, render_feedback, render_question, Command, HELP};

#[instrument(level = "info", skip_all)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = load_trainer_config_from_env();
  let settings = Settings::resolve(cfg.as_ref());
  let mut catalog = seed_category_catalog();
  if let Some(cfg) = &cfg {
    cfg.apply_to_catalog(&mut catalog);
  }
  let bank = QuestionBank::load(cfg.as_ref());
  if bank.is_empty() {
    return Err("question bank is empty".into());
  }

  let store: Box<dyn SessionStore> = if settings.store_path.as_os_str() == ":memory:" {
    Box::new(MemoryStore::new())
  } else {
    Box::new(FileStore::new(settings.store_path.clone()))
  };
  info!(target: "xuci_trainer", store = %settings.store_path.display(), limit = settings.session_limit, "Trainer starting");

  let mut session = PracticeSession::new(bank, store, settings.session_limit);
  let stdin = io::stdin();
  let mut lines = stdin.lock().lines();
  let mut out = io::stdout();

  writeln!(out, "现代汉语虚词练习 · 共 {} 题，本次 {} 题", session.bank().len(), session.session_limit())?;

  let mut resumed = false;
  if let Some(n) = session.stored_progress() {
    write!(out, "发现未完成的练习（已答 {} 题），是否继续？[Y/n] ", n)?;
    out.flush()?;
    let reply = lines.next().transpose()?.unwrap_or_default();
    if !matches!(reply.trim(), "n" | "N" | "no") {
      resumed = session.resume();
    }
  }
  if !resumed {
    session.start();
  }
  writeln!(out, "{}", HELP)?;

  loop {
    let Some(q) = session.current_question().cloned() else { break };
    let progress = session.engine().progress();
    write!(
      out,
      "{}",
      render_question(&q, session.answered_count() + 1, session.session_limit(), &progress, &catalog, settings.show_pinyin)
    )?;

    let answered = loop {
      write!(out, "> ")?;
      out.flush()?;
      let Some(line) = lines.next().transpose()? else {
        // EOF: progress is already saved after each answer.
        writeln!(out)?;
        return Ok(());
      };
      match parse_input(&q, &line) {
        Command::Answer(keys) => {
          for k in &keys {
            session.select_option(k);
          }
          match session.submit() {
            Ok(fb) => {
              write!(out, "{}", render_feedback(&fb, &catalog))?;
              break true;
            }
            Err(e) => writeln!(out, "{}", e)?,
          }
        }
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Invalid(msg) => writeln!(out, "{}", msg)?,
        Command::Quit => {
          writeln!(out, "进度已保存，下次启动可继续。")?;
          return Ok(());
        }
        Command::Reset => {
          session.reset();
          writeln!(out, "练习已重置。")?;
          session.start();
          break false;
        }
      }
    };

    if answered {
      writeln!(out, "当前正确率：{}%  进度：{}%", session.accuracy(), session.progress_percent())?;
      session.advance();
    }
  }

  let report = session.finish(&catalog);
  let text = xuci_trainer::report::ReportGenerator::new(&catalog).export_text(&report);
  write!(out, "\n{}", text)?;
  Ok(())
}
