//! `mnemo init` — create the context directory skeleton.
//!
//! Hooks no-op until the required files exist, so this is the arming
//! step. Existing files are never overwritten.

use crate::core::config::Config;
use crate::core::inject::{
    FILE_CONSTITUTION, FILE_DECISIONS, FILE_LEARNINGS, FILE_TASKS, INDEX_END, INDEX_START,
};

pub fn run(cfg: &Config) -> Result<(), String> {
    let dir = cfg.context_dir();
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;

    let starters: &[(&str, String)] = &[
        (
            FILE_CONSTITUTION,
            "# Constitution\n\nInviolable rules for agents working in this project.\n".to_string(),
        ),
        (
            FILE_TASKS,
            "# Tasks\n\n- [ ] Fill in the first work item\n".to_string(),
        ),
        (
            FILE_DECISIONS,
            format!("# Decisions\n\n{INDEX_START}\n{INDEX_END}\n"),
        ),
        (
            FILE_LEARNINGS,
            format!("# Learnings\n\n{INDEX_START}\n{INDEX_END}\n"),
        ),
    ];

    let mut created = 0;
    for (name, content) in starters {
        let path = dir.join(name);
        if path.exists() {
            continue;
        }
        std::fs::write(&path, content)
            .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        created += 1;
    }

    if created == 0 {
        println!("Context directory {} already initialized.", dir.display());
    } else {
        println!(
            "Initialized context directory {} ({created} files created).",
            dir.display()
        );
    }
    Ok(())
}
