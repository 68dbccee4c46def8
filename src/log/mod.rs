use std::io::Write;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde_json::json;
use uuid::Uuid;

use crate::config::Config;
use crate::gateway::CompletionRequest;

/// Per-turn debugging artifacts: the composed prompts and the raw model
/// text, saved under the data dir keyed by turn id. Off by default;
/// enabled with --save-request / --save-response.

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

fn turn_dir(root: &Path, turn_id: Uuid) -> PathBuf {
    root.join(".wingman").join("turns").join(turn_id.to_string())
}

pub fn save_turn(
    stage: &str,
    turn_id: Uuid,
    req: &CompletionRequest,
    response: Option<&str>,
    cfg: &Config,
) -> anyhow::Result<SavedPaths> {
    let dir = turn_dir(Path::new(&cfg.data_dir), turn_id);
    if !cfg.save_request && !cfg.save_response {
        return Ok(SavedPaths { dir, request: None, response: None });
    }
    fs::create_dir_all(&dir)?;

    let mut request_path = None;
    let mut response_path = None;

    if cfg.save_request {
        let p = dir.join(format!("{stage}.request.json"));
        let body = json!({
            "system": req.system,
            "user": req.user,
            "maxTokens": req.max_tokens,
            "imageMediaType": req.image.as_ref().map(|i| i.media_type),
            "imageBytes": req.image.as_ref().map(|i| i.data.len()),
        });
        fs::write(&p, serde_json::to_string_pretty(&body)?)?;
        request_path = Some(p);
    }

    if cfg.save_response {
        if let Some(text) = response {
            let p = dir.join(format!("{stage}.response.txt"));
            fs::write(&p, text)?;
            response_path = Some(p);
        }
    }

    Ok(SavedPaths { dir, request: request_path, response: response_path })
}

pub fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    println!("debug[{stage}]: artifacts directory: {}", saved.dir.display());
    if let Some(p) = &saved.request {
        println!("debug[{stage}]: request saved at: {}", p.display());
    }
    if let Some(p) = &saved.response {
        println!("debug[{stage}]: response saved at: {}", p.display());
    }
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_request_and_response_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            data_dir: dir.path().to_string_lossy().into_owned(),
            save_request: true,
            save_response: true,
            ..Default::default()
        };
        let req = CompletionRequest {
            system: Some("sys".into()),
            user: "hi".into(),
            image: None,
            max_tokens: 100,
        };
        let saved = save_turn("chat", Uuid::new_v4(), &req, Some("hello back"), &cfg).unwrap();
        assert!(saved.request.unwrap().exists());
        let resp = saved.response.unwrap();
        assert_eq!(fs::read_to_string(resp).unwrap(), "hello back");
    }

    #[test]
    fn writes_nothing_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            data_dir: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        let req = CompletionRequest { system: None, user: "hi".into(), image: None, max_tokens: 1 };
        let saved = save_turn("chat", Uuid::new_v4(), &req, None, &cfg).unwrap();
        assert!(saved.request.is_none());
        assert!(!saved.dir.exists());
    }
}
