use helpline::engine::{Helpline, SubmitOutcome};
use helpline::{Config, Roster};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub const VALID_MESSAGE: &str = "Jeg har brug for at tale med nogen";

#[allow(dead_code)]
pub fn seeded_helpline(seed: u64) -> Helpline {
    let mut config = Config::default();
    config.session.seed = Some(seed);
    Helpline::new(config, Roster::builtin())
}

#[allow(dead_code)]
pub fn submit_chat(helpline: &mut Helpline, message: &str) -> SubmitOutcome {
    helpline.set_message(message);
    helpline.submit_chat()
}

#[allow(dead_code)]
pub fn temp_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("failed to write file");
    (temp_dir, path)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    temp_file("config.yaml", contents)
}
