//! `mnemo webhook` — manage the notification endpoint.
//!
//! The URL is stored in the context directory with owner-only
//! permissions. Forwarding additionally requires an event allow-list in
//! `.mnemorc` (`[notify] events`); an empty list keeps everything local.

use crate::core::config::Config;
use crate::core::notify;

pub fn run_set(cfg: &Config, url: &str) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("not an HTTP(S) URL: {url}"));
    }
    notify::save_url(&cfg.context_dir(), url)?;
    println!("Webhook URL saved.");
    if cfg.notify.events.is_empty() {
        println!("Note: no events are allow-listed; add [notify] events to .mnemorc to start forwarding.");
    }
    Ok(())
}

pub fn run_clear(cfg: &Config) {
    notify::clear_url(&cfg.context_dir());
    println!("Webhook URL removed.");
}

pub fn run_status(cfg: &Config) {
    match notify::load_url(&cfg.context_dir()) {
        Some(_) => {
            println!("Webhook: configured");
            if cfg.notify.events.is_empty() {
                println!("Events:  none allow-listed (nothing is sent)");
            } else {
                println!("Events:  {}", cfg.notify.events.join(", "));
            }
        }
        None => println!("Webhook: not configured"),
    }
}
